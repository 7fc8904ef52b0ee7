//! Result extraction and reporting
//!
//! Turns solved posteriors into the evidence score, calibration metrics and
//! the display-scaled rating table.

pub mod display;
pub mod extractor;
pub mod report;

// Re-export commonly used types
pub use display::{DisplayRating, DisplayScale};
pub use extractor::{accuracy, likelihood, log_evidence_score, ResultExtractor};
pub use report::{PlayerRating, PosteriorSummary, RatingReport};
