//! Shapiro-Wilk test for normality.
//!
//! Coefficients and the p-value approximation follow Royston (1995),
//! "Remark AS R94", valid for 3 <= n <= 5000.

use super::descriptive::{mean, sorted};
use super::dist::{normal_quantile, normal_sf};
use crate::error::{StatsError, StatsResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

const MAX_N: usize = 5000;

/// Outcome of a Shapiro-Wilk test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapiroWilk {
    /// W statistic, in (0, 1].
    pub statistic: f64,
    pub p_value: f64,
}

fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Shapiro-Wilk W test that a sample comes from a normal distribution.
///
/// A sample with zero range is reported as W = 1, p = 1.
pub fn shapiro_wilk(xs: &[f64]) -> StatsResult<ShapiroWilk> {
    let n = xs.len();
    if n < 3 {
        return Err(StatsError::InsufficientData {
            test: "Shapiro-Wilk",
            required: 3,
            actual: n,
        });
    }
    if n > MAX_N {
        return Err(StatsError::Distribution(format!(
            "Shapiro-Wilk supports at most {} observations, got {}",
            MAX_N, n
        )));
    }

    let x = sorted(xs);
    if x[n - 1] - x[0] == 0.0 {
        return Ok(ShapiroWilk {
            statistic: 1.0,
            p_value: 1.0,
        });
    }

    let a = coefficients(n);
    let m = mean(&x);
    let ss: f64 = x.iter().map(|&v| (v - m) * (v - m)).sum();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, &ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / ss).min(1.0);

    Ok(ShapiroWilk {
        statistic: w,
        p_value: p_value(w, n),
    })
}

/// Coefficients for the upper half of the order statistics, largest first.
fn coefficients(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![0.5f64.sqrt()];
    }

    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| normal_quantile((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2: f64 = m.iter().map(|v| v * v).sum();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / nf.sqrt();

    let mut a = vec![0.0; half];
    a[0] = poly(&C1, rsn) - m[0] / ssumm2;

    let (start, fac) = if n > 5 {
        a[1] = poly(&C2, rsn) - m[1] / ssumm2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a[0] * a[0] - 2.0 * a[1] * a[1]))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a[0] * a[0])).sqrt();
        (1, fac)
    };

    for i in start..half {
        a[i] = -m[i] / fac;
    }
    a
}

fn p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        return p.max(0.0);
    }

    let nf = n as f64;
    let mut y = (1.0 - w).ln();
    let (mu, sigma) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let u = nf.ln();
        (poly(&C5, u), poly(&C6, u).exp())
    };

    normal_sf((y - mu) / sigma)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_reference_sample_large_n() {
        let x = [
            148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
        ];
        let r = shapiro_wilk(&x).unwrap();
        assert!(approx(r.statistic, 0.788815, 1e-5));
        assert!(approx(r.p_value, 0.006704, 1e-5));
    }

    #[test]
    fn test_evenly_spaced_sample_looks_normal() {
        let r = shapiro_wilk(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(approx(r.statistic, 0.986762, 1e-5));
        assert!(approx(r.p_value, 0.967174, 1e-4));
    }

    #[test]
    fn test_three_observations() {
        let r = shapiro_wilk(&[1.0, 2.0, 4.0]).unwrap();
        assert!(approx(r.statistic, 0.964286, 1e-5));
        assert!(approx(r.p_value, 0.636887, 1e-5));
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = shapiro_wilk(&[3.5, 2.5, 4.0, 3.0, 4.5, 3.25, 2.75]).unwrap();
        let b = shapiro_wilk(&[2.5, 2.75, 3.0, 3.25, 3.5, 4.0, 4.5]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constant_sample() {
        let r = shapiro_wilk(&[3.0, 3.0, 3.0, 3.0]).unwrap();
        assert_eq!(r.statistic, 1.0);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn test_too_few_observations() {
        assert_eq!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(StatsError::InsufficientData {
                test: "Shapiro-Wilk",
                required: 3,
                actual: 2
            })
        );
    }
}
