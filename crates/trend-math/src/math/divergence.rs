//! Kullback-Leibler surprise terms.
//!
//! The ranking signal uses a single term of the KL divergence,
//! `p · ln(p / e)`, comparing an observed rate `p` with an expected rate `e`.
//! It is positive when the observation exceeds the expectation and negative
//! when it falls short.

/// Single-term KL divergence `p · ln(p / e)` in nats.
///
/// Returns exactly `0.0` when `p == 0`, so a zero observation never evaluates a
/// logarithm of zero. Callers are expected to pass `e > 0`; a non-positive or
/// non-finite expectation yields `0.0` rather than an infinity or NaN.
pub fn kl_divergence(probability: f64, expectation: f64) -> f64 {
    if probability == 0.0 {
        return 0.0;
    }
    if !(expectation > 0.0) || !expectation.is_finite() || probability.is_nan() {
        return 0.0;
    }
    probability * (probability / expectation).ln()
}

/// Blend the instantaneous surprise with the decayed running peak.
pub fn blend(kl_score: f64, peak: f64) -> f64 {
    0.5 * (kl_score + peak)
}

/// Ratio of two counts, used as an empirical rate.
///
/// A zero denominator yields `0.0`.
pub fn rate(count: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    count / total
}
