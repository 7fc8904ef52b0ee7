//! Presentational rescaling of skill posteriors

use crate::config::DisplayConfig;
use crate::inference::Gaussian;
use serde::{Deserialize, Serialize};

/// A posterior on the display scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRating {
    pub rating: f64,
    pub uncertainty: f64,
}

/// `scale * skill + offset`; never fed back into inference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    scale: f64,
    offset: f64,
}

impl DisplayScale {
    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    pub fn apply(&self, skill: Gaussian) -> DisplayRating {
        let display = skill.affine(self.scale, self.offset);
        DisplayRating {
            rating: display.mean(),
            uncertainty: display.std_dev(),
        }
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        DisplayConfig::default().into()
    }
}

impl From<DisplayConfig> for DisplayScale {
    fn from(config: DisplayConfig) -> Self {
        Self::new(config.scale, config.offset)
    }
}
