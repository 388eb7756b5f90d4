//! Effect sizes and equivalence testing.

use super::descriptive::{mean, variance};
use super::dist::{t_cdf, t_quantile, t_sf};
use crate::error::{StatsError, StatsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cohen's d of `a` relative to `b`, using the pooled standard deviation.
///
/// The sign follows `mean(a) - mean(b)`, so swapping the arguments negates
/// the result.
pub fn cohens_d(a: &[f64], b: &[f64]) -> StatsResult<f64> {
    let (n1, n2) = (a.len(), b.len());
    if n1 < 2 || n2 < 2 {
        return Err(StatsError::InsufficientData {
            test: "Cohen's d",
            required: 2,
            actual: n1.min(n2),
        });
    }

    let (n1, n2) = (n1 as f64, n2 as f64);
    let pooled =
        (((n1 - 1.0) * variance(a) + (n2 - 1.0) * variance(b)) / (n1 + n2 - 2.0)).sqrt();
    if pooled == 0.0 {
        return Err(StatsError::ZeroVariance("Cohen's d"));
    }

    Ok((mean(a) - mean(b)) / pooled)
}

/// Conventional size classes for |d|.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    pub fn classify(d: f64) -> Self {
        let d = d.abs();
        if d < 0.2 {
            EffectMagnitude::Negligible
        } else if d < 0.5 {
            EffectMagnitude::Small
        } else if d < 0.8 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }

    /// Whether the difference is too small to matter in practice.
    pub fn is_trivial(&self) -> bool {
        matches!(self, EffectMagnitude::Negligible | EffectMagnitude::Small)
    }
}

impl fmt::Display for EffectMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectMagnitude::Negligible => "negligible",
            EffectMagnitude::Small => "small",
            EffectMagnitude::Medium => "medium",
            EffectMagnitude::Large => "large",
        };
        f.write_str(s)
    }
}

/// Outcome of a two one-sided tests (TOST) equivalence procedure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equivalence {
    /// Equivalence bounds are `[-margin, margin]`.
    pub margin: f64,
    pub mean_difference: f64,
    /// Lower end of the `1 - 2 * alpha` confidence interval.
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Confidence level of the interval, e.g. 0.90.
    pub confidence: f64,
    /// p-value of H0: difference <= -margin.
    pub p_lower: f64,
    /// p-value of H0: difference >= margin.
    pub p_upper: f64,
    pub equivalent: bool,
}

/// TOST equivalence of `a` and `b` within `margin`.
///
/// The interval is `diff ± t(1 - alpha, n1 + n2 - 2) * sqrt(s1²/n1 + s2²/n2)`;
/// the groups are equivalent iff it lies strictly inside the bounds.
pub fn equivalence_test(a: &[f64], b: &[f64], margin: f64, alpha: f64) -> StatsResult<Equivalence> {
    let (n1, n2) = (a.len(), b.len());
    if n1 < 2 || n2 < 2 {
        return Err(StatsError::InsufficientData {
            test: "equivalence test",
            required: 2,
            actual: n1.min(n2),
        });
    }

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let diff = mean(a) - mean(b);
    let se = (variance(a) / n1f + variance(b) / n2f).sqrt();
    if se == 0.0 {
        return Err(StatsError::ZeroVariance("equivalence test"));
    }

    let df = n1f + n2f - 2.0;
    let q = t_quantile(1.0 - alpha, df)?;
    let ci_lower = diff - q * se;
    let ci_upper = diff + q * se;

    Ok(Equivalence {
        margin,
        mean_difference: diff,
        ci_lower,
        ci_upper,
        confidence: 1.0 - 2.0 * alpha,
        p_lower: t_sf((diff + margin) / se, df)?,
        p_upper: t_cdf((diff - margin) / se, df)?,
        equivalent: ci_lower > -margin && ci_upper < margin,
    })
}
