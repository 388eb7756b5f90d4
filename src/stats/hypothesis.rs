//! Classical two-group and k-group hypothesis tests.

use super::descriptive::{mean, median, rank_average, variance};
use super::dist::{f_sf, normal_sf, t_two_sided};
use crate::error::{StatsError, StatsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a two-sample t-test pools the group variances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarianceAssumption {
    /// Pooled variance, Student's t-test.
    Equal,
    /// Separate variances, Welch's t-test.
    Unequal,
}

impl VarianceAssumption {
    /// Equal variances are assumed when Levene's test does not reject.
    pub fn from_levene(levene_p: f64, alpha: f64) -> Self {
        if levene_p > alpha {
            VarianceAssumption::Equal
        } else {
            VarianceAssumption::Unequal
        }
    }
}

impl fmt::Display for VarianceAssumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarianceAssumption::Equal => write!(f, "equal variances (Student)"),
            VarianceAssumption::Unequal => write!(f, "unequal variances (Welch)"),
        }
    }
}

/// Outcome of an independent two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    pub statistic: f64,
    pub p_value: f64,
    pub df: f64,
    pub assumption: VarianceAssumption,
}

/// Two-sided independent samples t-test of `a` against `b`.
pub fn t_test(a: &[f64], b: &[f64], assumption: VarianceAssumption) -> StatsResult<TTest> {
    for sample in [a, b] {
        if sample.len() < 2 {
            return Err(StatsError::InsufficientData {
                test: "t-test",
                required: 2,
                actual: sample.len(),
            });
        }
    }

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (v1, v2) = (variance(a), variance(b));

    let (se, df) = match assumption {
        VarianceAssumption::Equal => {
            let df = n1 + n2 - 2.0;
            let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
            ((pooled * (1.0 / n1 + 1.0 / n2)).sqrt(), df)
        }
        VarianceAssumption::Unequal => {
            let (q1, q2) = (v1 / n1, v2 / n2);
            let df = (q1 + q2).powi(2) / (q1 * q1 / (n1 - 1.0) + q2 * q2 / (n2 - 1.0));
            ((q1 + q2).sqrt(), df)
        }
    };

    if se == 0.0 {
        return Err(StatsError::ZeroVariance("t-test"));
    }

    let t = (mean(a) - mean(b)) / se;
    Ok(TTest {
        statistic: t,
        p_value: t_two_sided(t, df)?,
        df,
        assumption,
    })
}

/// Outcome of Levene's test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Levene {
    pub statistic: f64,
    pub p_value: f64,
}

/// Levene's test for equal variances, centred on group medians
/// (Brown-Forsythe variant).
pub fn levene(groups: &[&[f64]]) -> StatsResult<Levene> {
    let k = groups.len();
    if k < 2 {
        return Err(StatsError::InsufficientData {
            test: "Levene's test",
            required: 2,
            actual: k,
        });
    }
    if let Some(g) = groups.iter().find(|g| g.is_empty()) {
        return Err(StatsError::InsufficientData {
            test: "Levene's test",
            required: 1,
            actual: g.len(),
        });
    }

    let deviations: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let med = median(g);
            g.iter().map(|&v| (v - med).abs()).collect()
        })
        .collect();

    let total: usize = deviations.iter().map(Vec::len).sum();
    let grand_mean = deviations.iter().flatten().sum::<f64>() / total as f64;
    let group_means: Vec<f64> = deviations.iter().map(|z| mean(z)).collect();

    let between: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, &m)| z.len() as f64 * (m - grand_mean).powi(2))
        .sum();
    let within: f64 = deviations
        .iter()
        .zip(&group_means)
        .map(|(z, &m)| z.iter().map(|&v| (v - m).powi(2)).sum::<f64>())
        .sum();

    if within == 0.0 {
        return Err(StatsError::ZeroVariance("Levene's test"));
    }

    let df1 = (k - 1) as f64;
    let df2 = (total - k) as f64;
    let w = (df2 * between) / (df1 * within);

    Ok(Levene {
        statistic: w,
        p_value: f_sf(w, df1, df2)?,
    })
}

/// How the Mann-Whitney p-value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MannWhitneyMethod {
    Exact,
    Asymptotic,
}

/// Outcome of a Mann-Whitney U test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MannWhitney {
    /// U statistic of the first sample.
    pub statistic: f64,
    pub p_value: f64,
    pub method: MannWhitneyMethod,
}

/// Largest smaller-sample size for which the exact distribution is used.
const EXACT_MAX_SMALLER: usize = 8;

/// Two-sided Mann-Whitney U test.
///
/// Uses the exact null distribution when the smaller sample has at most
/// eight observations and there are no ties; otherwise the normal
/// approximation with tie and continuity corrections.
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> StatsResult<MannWhitney> {
    for sample in [a, b] {
        if sample.is_empty() {
            return Err(StatsError::InsufficientData {
                test: "Mann-Whitney U",
                required: 1,
                actual: 0,
            });
        }
    }

    let (n1, n2) = (a.len(), b.len());
    let combined: Vec<f64> = a.iter().chain(b).copied().collect();
    let (ranks, ties) = rank_average(&combined);

    let r1: f64 = ranks[..n1].iter().sum();
    let u1 = r1 - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let has_ties = ties.iter().any(|&t| t > 1);
    if n1.min(n2) <= EXACT_MAX_SMALLER && !has_ties {
        let p = 2.0 * exact_upper_tail(n1, n2, u.round() as usize);
        return Ok(MannWhitney {
            statistic: u1,
            p_value: p.min(1.0),
            method: MannWhitneyMethod::Exact,
        });
    }

    let n = (n1 + n2) as f64;
    let tie_term: f64 = ties
        .iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let sigma = ((n1 * n2) as f64 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();
    if sigma == 0.0 {
        return Err(StatsError::ZeroVariance("Mann-Whitney U"));
    }

    let mu = (n1 * n2) as f64 / 2.0;
    let z = (u - mu - 0.5) / sigma;
    Ok(MannWhitney {
        statistic: u1,
        p_value: (2.0 * normal_sf(z)).min(1.0),
        method: MannWhitneyMethod::Asymptotic,
    })
}

/// P(U >= u) under the null hypothesis for sample sizes `n1` and `n2`.
fn exact_upper_tail(n1: usize, n2: usize, u: usize) -> f64 {
    let freq = u_frequencies(n1.min(n2), n1.max(n2));
    let total: f64 = freq.iter().sum();
    freq.iter().skip(u).sum::<f64>() / total
}

/// Number of orderings producing each value of U, for sizes `m` and `n`.
///
/// Built from f(i, j, u) = f(i-1, j, u-j) + f(i, j-1, u), keeping one
/// row of `i` at a time.
fn u_frequencies(m: usize, n: usize) -> Vec<f64> {
    let mut prev: Vec<Vec<f64>> = (0..=n).map(|_| vec![1.0]).collect();

    for i in 1..=m {
        let mut row: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        row.push(vec![1.0]);
        for j in 1..=n {
            let mut f = vec![0.0; i * j + 1];
            for (u, slot) in f.iter_mut().enumerate() {
                let from_i = if u >= j {
                    prev[j].get(u - j).copied().unwrap_or(0.0)
                } else {
                    0.0
                };
                let from_j = row[j - 1].get(u).copied().unwrap_or(0.0);
                *slot = from_i + from_j;
            }
            row.push(f);
        }
        prev = row;
    }

    prev.pop().unwrap_or_else(|| vec![1.0])
}

/// One-way analysis of variance table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anova {
    pub ss_between: f64,
    pub df_between: f64,
    pub ss_within: f64,
    pub df_within: f64,
    pub f: f64,
    pub p_value: f64,
}

/// One-way ANOVA across `groups`.
pub fn one_way_anova(groups: &[&[f64]]) -> StatsResult<Anova> {
    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.len()).sum();
    if k < 2 || groups.iter().any(|g| g.is_empty()) || total <= k {
        return Err(StatsError::InsufficientData {
            test: "one-way ANOVA",
            required: k + 1,
            actual: total,
        });
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / total as f64;
    let ss_between: f64 = groups
        .iter()
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.iter().map(|&v| (v - m).powi(2)).sum::<f64>()
        })
        .sum();

    if ss_within == 0.0 {
        return Err(StatsError::ZeroVariance("one-way ANOVA"));
    }

    let df_between = (k - 1) as f64;
    let df_within = (total - k) as f64;
    let f = (ss_between / df_between) / (ss_within / df_within);

    Ok(Anova {
        ss_between,
        df_between,
        ss_within,
        df_within,
        f,
        p_value: f_sf(f, df_between, df_within)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
    const B: [f64; 5] = [2.0, 4.0, 6.0, 8.0, 10.0];

    const INDIAN: [f64; 10] = [3.5, 3.75, 4.0, 2.5, 3.0, 3.25, 4.25, 3.5, 2.75, 4.0];
    const FOREIGN: [f64; 12] = [
        4.0, 4.5, 3.75, 4.25, 5.0, 3.5, 4.75, 4.0, 3.25, 4.5, 4.0, 3.75,
    ];

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_variance_assumption_follows_levene() {
        assert_eq!(
            VarianceAssumption::from_levene(0.2, 0.05),
            VarianceAssumption::Equal
        );
        assert_eq!(
            VarianceAssumption::from_levene(0.05, 0.05),
            VarianceAssumption::Unequal
        );
        assert_eq!(
            VarianceAssumption::from_levene(0.01, 0.05),
            VarianceAssumption::Unequal
        );
    }

    #[test]
    fn test_pooled_t_test() {
        let r = t_test(&A, &B, VarianceAssumption::Equal).unwrap();
        assert!(approx(r.statistic, -1.897367, 1e-6));
        assert_eq!(r.df, 8.0);
        assert!(approx(r.p_value, 0.094350, 1e-5));
    }

    #[test]
    fn test_welch_t_test() {
        let r = t_test(&A, &B, VarianceAssumption::Unequal).unwrap();
        assert!(approx(r.statistic, -1.897367, 1e-6));
        assert!(approx(r.df, 5.882353, 1e-6));
        assert!(approx(r.p_value, 0.107531, 1e-5));
        assert_eq!(r.assumption, VarianceAssumption::Unequal);
    }

    #[test]
    fn test_t_test_on_survey_like_scores() {
        let pooled = t_test(&INDIAN, &FOREIGN, VarianceAssumption::Equal).unwrap();
        assert!(approx(pooled.statistic, -2.811179, 1e-6));
        assert!(approx(pooled.p_value, 0.010787, 1e-5));

        let welch = t_test(&INDIAN, &FOREIGN, VarianceAssumption::Unequal).unwrap();
        assert!(approx(welch.statistic, -2.782557, 1e-6));
        assert!(approx(welch.df, 18.372371, 1e-5));
        assert!(approx(welch.p_value, 0.012124, 1e-5));
    }

    #[test]
    fn test_t_test_errors() {
        assert!(matches!(
            t_test(&[1.0], &B, VarianceAssumption::Equal),
            Err(StatsError::InsufficientData { .. })
        ));
        assert_eq!(
            t_test(&[2.0, 2.0], &[2.0, 2.0], VarianceAssumption::Unequal),
            Err(StatsError::ZeroVariance("t-test"))
        );
    }

    #[test]
    fn test_levene() {
        let r = levene(&[&A, &B]).unwrap();
        assert!(approx(r.statistic, 2.057143, 1e-6));
        assert!(approx(r.p_value, 0.189404, 1e-5));

        let r = levene(&[&INDIAN, &FOREIGN]).unwrap();
        assert!(approx(r.statistic, 0.148369, 1e-6));
        assert!(approx(r.p_value, 0.704165, 1e-5));
    }

    #[test]
    fn test_levene_three_groups() {
        let r = levene(&[&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 9.0], &[1.0, 1.0, 2.0, 2.0]])
            .unwrap();
        assert!(approx(r.statistic, 3.774194, 1e-6));
        assert!(approx(r.p_value, 0.064519, 1e-5));
    }

    #[test]
    fn test_mann_whitney_exact() {
        let r = mann_whitney_u(&[1.1, 2.2, 3.3, 4.4], &[5.5, 6.6, 7.7, 0.5, 8.8]).unwrap();
        assert_eq!(r.method, MannWhitneyMethod::Exact);
        assert_eq!(r.statistic, 4.0);
        assert!(approx(r.p_value, 4.0 / 21.0, 1e-12));
    }

    #[test]
    fn test_mann_whitney_asymptotic_with_ties() {
        let r = mann_whitney_u(&INDIAN, &FOREIGN).unwrap();
        assert_eq!(r.method, MannWhitneyMethod::Asymptotic);
        assert_eq!(r.statistic, 25.0);
        assert!(approx(r.p_value, 0.021731, 1e-5));
    }

    #[test]
    fn test_u_frequencies_sum_to_binomial() {
        let freq = u_frequencies(3, 4);
        assert_eq!(freq.len(), 13);
        assert_eq!(freq.iter().sum::<f64>(), 35.0);
        // symmetric around m*n/2
        for u in 0..freq.len() {
            assert_eq!(freq[u], freq[freq.len() - 1 - u]);
        }
    }

    #[test]
    fn test_anova_two_groups_matches_pooled_t() {
        let r = one_way_anova(&[&A, &B]).unwrap();
        assert!(approx(r.ss_between, 22.5, 1e-9));
        assert!(approx(r.ss_within, 50.0, 1e-9));
        assert!(approx(r.f, 3.6, 1e-9));

        let t = t_test(&A, &B, VarianceAssumption::Equal).unwrap();
        assert!(approx(r.f, t.statistic * t.statistic, 1e-9));
        assert!(approx(r.p_value, t.p_value, 1e-9));
    }

    #[test]
    fn test_anova_three_groups() {
        let r = one_way_anova(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.5]]).unwrap();
        assert_eq!(r.df_between, 2.0);
        assert_eq!(r.df_within, 6.0);
        assert!(approx(r.f, 23.883721, 1e-5));
        assert!(approx(r.p_value, 0.001390, 1e-5));
    }
}
