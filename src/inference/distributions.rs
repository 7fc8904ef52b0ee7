//! Exponential-family beliefs and messages
//!
//! Gaussians are held in natural parameters (precision, precision x mean) so
//! that composing beliefs is addition and removing a message is subtraction.
//! Bernoullis are held as log-odds for the same reason.

use crate::utils::{logit, sigmoid};
use std::f64::consts::PI;
use std::ops::{Div, Mul};

/// Smallest variance a belief may carry
pub const MIN_VARIANCE: f64 = 1e-12;

/// Smallest precision a cavity may carry
pub const MIN_PRECISION: f64 = 1e-12;

/// Gaussian in natural parameters. Zero precision is the flat (uniform) message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    precision: f64,
    precision_mean: f64,
}

impl Gaussian {
    pub fn from_mean_variance(mean: f64, variance: f64) -> Self {
        if variance.is_infinite() {
            return Self::uniform();
        }
        let precision = 1.0 / variance.max(MIN_VARIANCE);
        Self {
            precision,
            precision_mean: precision * mean,
        }
    }

    pub fn from_natural(precision: f64, precision_mean: f64) -> Self {
        Self {
            precision,
            precision_mean,
        }
    }

    /// Flat message carrying no information
    pub fn uniform() -> Self {
        Self {
            precision: 0.0,
            precision_mean: 0.0,
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.precision == 0.0
    }

    /// A proper distribution has strictly positive precision
    pub fn is_proper(&self) -> bool {
        self.precision > 0.0 && self.precision.is_finite() && self.precision_mean.is_finite()
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn precision_mean(&self) -> f64 {
        self.precision_mean
    }

    /// Mean; zero for the flat message
    pub fn mean(&self) -> f64 {
        if self.precision == 0.0 {
            0.0
        } else {
            self.precision_mean / self.precision
        }
    }

    pub fn variance(&self) -> f64 {
        1.0 / self.precision
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Keep the variance of a belief within `[MIN_VARIANCE, 1 / MIN_PRECISION]`,
    /// preserving the mean where one is defined.
    pub fn clipped(self) -> Self {
        let mean = if self.precision > 0.0 { self.mean() } else { 0.0 };
        let precision = if self.precision.is_nan() {
            MIN_PRECISION
        } else {
            self.precision.clamp(MIN_PRECISION, 1.0 / MIN_VARIANCE)
        };
        if precision == self.precision {
            return self;
        }
        Self {
            precision,
            precision_mean: precision * mean,
        }
    }

    /// Weighted blend of natural parameters, `damping` of `previous` is kept
    pub fn damped(self, previous: Gaussian, damping: f64) -> Self {
        if damping == 0.0 {
            return self;
        }
        Self {
            precision: (1.0 - damping) * self.precision + damping * previous.precision,
            precision_mean: (1.0 - damping) * self.precision_mean
                + damping * previous.precision_mean,
        }
    }

    /// Largest change in mean or standard deviation between two proper beliefs
    pub fn max_delta(&self, other: &Gaussian) -> f64 {
        let mean = (self.mean() - other.mean()).abs();
        let std = (self.std_dev() - other.std_dev()).abs();
        mean.max(std)
    }

    /// Log partition function `ln ∫ exp(-τx²/2 + νx) dx` of a proper Gaussian
    pub fn log_normalizer(&self) -> f64 {
        debug_assert!(self.precision > 0.0);
        self.precision_mean * self.precision_mean / (2.0 * self.precision)
            - 0.5 * self.precision.ln()
            + 0.5 * (2.0 * PI).ln()
    }

    /// Affine transform `scale * x + offset` of the random variable
    pub fn affine(&self, scale: f64, offset: f64) -> Self {
        Self::from_mean_variance(scale * self.mean() + offset, scale * scale * self.variance())
    }
}

impl Default for Gaussian {
    fn default() -> Self {
        Self::uniform()
    }
}

impl Mul for Gaussian {
    type Output = Gaussian;

    fn mul(self, rhs: Gaussian) -> Gaussian {
        Gaussian {
            precision: self.precision + rhs.precision,
            precision_mean: self.precision_mean + rhs.precision_mean,
        }
    }
}

impl Div for Gaussian {
    type Output = Gaussian;

    fn div(self, rhs: Gaussian) -> Gaussian {
        Gaussian {
            precision: self.precision - rhs.precision,
            precision_mean: self.precision_mean - rhs.precision_mean,
        }
    }
}

impl std::fmt::Display for Gaussian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_uniform() {
            write!(f, "Gaussian.Uniform")
        } else {
            write!(f, "Gaussian({:.4}, {:.4})", self.mean(), self.variance())
        }
    }
}

/// Bernoulli in log-odds. Infinite log-odds are point masses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bernoulli {
    log_odds: f64,
}

impl Bernoulli {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            log_odds: logit(probability.clamp(0.0, 1.0)),
        }
    }

    pub fn from_log_odds(log_odds: f64) -> Self {
        Self { log_odds }
    }

    pub fn uniform() -> Self {
        Self { log_odds: 0.0 }
    }

    /// Point mass on an observed value
    pub fn point(value: bool) -> Self {
        Self {
            log_odds: if value {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            },
        }
    }

    pub fn log_odds(&self) -> f64 {
        self.log_odds
    }

    pub fn is_point_mass(&self) -> bool {
        self.log_odds.is_infinite()
    }

    pub fn prob_true(&self) -> f64 {
        sigmoid(self.log_odds)
    }

    pub fn prob_of(&self, value: bool) -> f64 {
        if value {
            sigmoid(self.log_odds)
        } else {
            sigmoid(-self.log_odds)
        }
    }

    /// `ln P(value)`, stable for large log-odds
    pub fn log_prob_of(&self, value: bool) -> f64 {
        let x = if value { self.log_odds } else { -self.log_odds };
        if x == f64::INFINITY {
            0.0
        } else if x >= 0.0 {
            -(-x).exp().ln_1p()
        } else {
            x - x.exp().ln_1p()
        }
    }
}

impl Default for Bernoulli {
    fn default() -> Self {
        Self::uniform()
    }
}

impl std::fmt::Display for Bernoulli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bernoulli({:.4})", self.prob_true())
    }
}
