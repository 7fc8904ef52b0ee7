//! Numeric helpers for the standard normal distribution and log-odds

use std::f64::consts::{PI, SQRT_2};

/// Below this argument the density and CDF are evaluated through tail expansions
const TAIL_CUTOFF: f64 = -30.0;

/// Complementary error function.
///
/// Chebyshev-fitted rational approximation with fractional error below 1.2e-7
/// everywhere, including the far tails.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

/// Standard normal density
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal cumulative distribution
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Natural log of the standard normal CDF, accurate deep into the lower tail
pub fn log_normal_cdf(x: f64) -> f64 {
    if x > TAIL_CUTOFF {
        normal_cdf(x).ln()
    } else {
        let x2 = x * x;
        let series = 1.0 - 1.0 / x2 + 3.0 / (x2 * x2) - 15.0 / (x2 * x2 * x2);
        -0.5 * x2 - 0.5 * (2.0 * PI).ln() - (-x).ln() + series.ln()
    }
}

/// Ratio of the standard normal density to its CDF, pdf(x) / cdf(x)
pub fn inverse_mills_ratio(x: f64) -> f64 {
    if x > TAIL_CUTOFF {
        normal_pdf(x) / normal_cdf(x)
    } else {
        let x2 = x * x;
        -x / (1.0 - 1.0 / x2 + 3.0 / (x2 * x2) - 15.0 / (x2 * x2 * x2))
    }
}

/// Logistic function, stable for large magnitudes
pub fn sigmoid(log_odds: f64) -> f64 {
    if log_odds >= 0.0 {
        1.0 / (1.0 + (-log_odds).exp())
    } else {
        let e = log_odds.exp();
        e / (1.0 + e)
    }
}

/// Log-odds of a probability; 0 and 1 map to the infinities
pub fn logit(probability: f64) -> f64 {
    let p = probability.clamp(0.0, 1.0);
    p.ln() - (1.0 - p).ln()
}
