//! Factor update rules for the good-vs-evil performance model
//!
//! Each factor type maps the cavity distributions of its neighbours to fresh
//! outgoing messages:
//! - [`PriorFactor`]: fixed message, never updated
//! - [`WeightedSum`]: exact linear Gaussian (team averages and the difference)
//! - [`GaussianNoise`]: exact, adds a fixed performance variance
//! - [`Threshold`]: `x > 0`, moment-matched back onto the real line
//! - [`EvidenceGate`]: model-on / model-off switch used for the evidence

use crate::inference::distributions::{Bernoulli, Gaussian, MIN_PRECISION, MIN_VARIANCE};
use crate::utils::{inverse_mills_ratio, log_normal_cdf, normal_cdf, normal_pdf};

/// A prior: the same message on every sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorFactor {
    distribution: Gaussian,
}

impl PriorFactor {
    pub fn new(mean: f64, variance: f64) -> Self {
        Self {
            distribution: Gaussian::from_mean_variance(mean, variance),
        }
    }

    pub fn message(&self) -> Gaussian {
        self.distribution
    }
}

/// `sum = offset + Σ weight_k · x_k`
///
/// Covers both the team-average factor (weights `1/|team|`) and the
/// performance-difference factor (weights `±NoiseFactor`).
pub struct WeightedSum;

impl WeightedSum {
    /// Message to the sum given the cavities of the terms
    pub fn forward(terms: &[(f64, Gaussian)], offset: f64) -> Gaussian {
        let mut mean = offset;
        let mut variance = 0.0;
        for (weight, cavity) in terms {
            if cavity.precision() <= 0.0 {
                return Gaussian::uniform();
            }
            mean += weight * cavity.mean();
            variance += weight * weight * cavity.variance();
        }
        Gaussian::from_mean_variance(mean, variance)
    }

    /// Message to term `target` given the message arriving at the sum and the
    /// cavities of every other term
    pub fn backward(
        terms: &[(f64, Gaussian)],
        offset: f64,
        target: usize,
        sum_message: Gaussian,
    ) -> Gaussian {
        if sum_message.precision() <= 0.0 {
            return Gaussian::uniform();
        }
        let weight = terms[target].0;

        let mut mean = sum_message.mean() - offset;
        let mut variance = sum_message.variance();
        for (k, (other_weight, cavity)) in terms.iter().enumerate() {
            if k == target {
                continue;
            }
            if cavity.precision() <= 0.0 {
                return Gaussian::uniform();
            }
            mean -= other_weight * cavity.mean();
            variance += other_weight * other_weight * cavity.variance();
        }

        Gaussian::from_mean_variance(mean / weight, variance / (weight * weight))
    }
}

/// `y ~ N(x, variance)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianNoise {
    variance: f64,
}

impl GaussianNoise {
    pub fn new(variance: f64) -> Self {
        Self { variance }
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Message to the noisy output from the clean input's cavity
    pub fn forward(&self, input: Gaussian) -> Gaussian {
        self.convolve(input)
    }

    /// Message to the clean input from the noisy output's message
    pub fn backward(&self, output: Gaussian) -> Gaussian {
        self.convolve(output)
    }

    fn convolve(&self, message: Gaussian) -> Gaussian {
        // Flat and improper messages carry no usable information through noise
        if message.precision() <= 0.0 {
            return Gaussian::uniform();
        }
        if self.variance == 0.0 {
            return message;
        }
        Gaussian::from_mean_variance(message.mean(), message.variance() + self.variance)
    }
}

/// Result of moment matching the real side of a threshold factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdMoments {
    /// Gaussian projection of the real variable's marginal
    pub posterior: Gaussian,
    /// `ln Z`, the log normaliser of the tilted distribution
    pub log_normalizer: f64,
}

/// `indicator = (x > 0)`
pub struct Threshold;

impl Threshold {
    /// Message to the Boolean: probability that the Gaussian is positive
    pub fn indicator_message(cavity: Gaussian) -> Bernoulli {
        if cavity.is_uniform() {
            return Bernoulli::uniform();
        }
        let t = cavity.mean() / cavity.std_dev();
        Bernoulli::from_log_odds(log_normal_cdf(t) - log_normal_cdf(-t))
    }

    /// Moment-match `N(x; cavity) · P(indicator | x)` onto a Gaussian.
    ///
    /// A point-mass indicator is an observation clamp; the update then uses the
    /// inverse Mills ratio so that outcomes far in the tail stay finite.
    pub fn moments(cavity: Gaussian, indicator: Bernoulli) -> ThresholdMoments {
        if cavity.is_uniform() {
            return ThresholdMoments {
                posterior: cavity,
                log_normalizer: 0.0,
            };
        }
        if indicator.is_point_mass() {
            return Self::observed(cavity, indicator.prob_true() > 0.5);
        }

        let mean = cavity.mean();
        let variance = cavity.variance();
        let std_dev = variance.sqrt();
        let t = mean / std_dev;
        let p = indicator.prob_true();

        let z = (1.0 - p) + (2.0 * p - 1.0) * normal_cdf(t);
        let alpha = (2.0 * p - 1.0) * normal_pdf(t) / (std_dev * z);
        let posterior_mean = mean + variance * alpha;
        let posterior_variance = variance - variance * alpha * (variance * alpha + mean);

        ThresholdMoments {
            posterior: Gaussian::from_mean_variance(
                posterior_mean,
                posterior_variance.max(MIN_VARIANCE),
            ),
            log_normalizer: z.ln(),
        }
    }

    /// Observation clamp: condition `x` on `(x > 0) == outcome`
    pub fn observed(cavity: Gaussian, outcome: bool) -> ThresholdMoments {
        let sign = if outcome { 1.0 } else { -1.0 };
        let mean = cavity.mean();
        let variance = cavity.variance();
        let std_dev = variance.sqrt();
        let t = sign * mean / std_dev;

        let v = inverse_mills_ratio(t);
        let w = (v * (v + t)).clamp(0.0, 1.0);

        ThresholdMoments {
            posterior: Gaussian::from_mean_variance(
                mean + sign * std_dev * v,
                (variance * (1.0 - w)).max(MIN_VARIANCE),
            ),
            log_normalizer: log_normal_cdf(t),
        }
    }

    /// Message to the real variable: moment-matched marginal over the cavity.
    ///
    /// Round-off can leave a vanishing or negative precision when the
    /// indicator carries (almost) no information; that is sent as flat.
    pub fn real_message(cavity: Gaussian, indicator: Bernoulli) -> Gaussian {
        let moments = Self::moments(cavity, indicator);
        let message = moments.posterior / cavity;
        if message.precision() < MIN_PRECISION {
            Gaussian::uniform()
        } else {
            message
        }
    }
}

/// Model-evidence gate: the model is either active or contributes nothing.
///
/// The active branch's log evidence comes from the solved model; the inactive
/// branch is flat (log evidence zero). The two are combined only here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidenceGate {
    prior: Bernoulli,
}

impl EvidenceGate {
    pub fn new(prior_probability: f64) -> Self {
        Self {
            prior: Bernoulli::from_probability(prior_probability),
        }
    }

    pub fn prior(&self) -> Bernoulli {
        self.prior
    }

    /// Posterior of the gate from the two branch log evidences
    pub fn posterior(&self, log_evidence_active: f64, log_evidence_inactive: f64) -> Bernoulli {
        Bernoulli::from_log_odds(
            self.prior.log_odds() + log_evidence_active - log_evidence_inactive,
        )
    }

    /// Gaussian projection of a variable's marginal mixed over both branches
    pub fn blend(&self, gate: Bernoulli, active: Gaussian, inactive: Gaussian) -> Gaussian {
        let w = gate.prob_true();
        let mean = w * active.mean() + (1.0 - w) * inactive.mean();
        let second_moment = w * (active.variance() + active.mean().powi(2))
            + (1.0 - w) * (inactive.variance() + inactive.mean().powi(2));
        Gaussian::from_mean_variance(mean, (second_moment - mean * mean).max(MIN_VARIANCE))
    }
}
