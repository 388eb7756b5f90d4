//! Gaussian kernel density estimation for the distribution charts.

use super::descriptive::std_dev;
use std::f64::consts::PI;

/// Gaussian KDE with Scott's rule bandwidth.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl GaussianKde {
    /// Fit a KDE. Returns `None` for samples that have no spread, where a
    /// density is undefined.
    pub fn new(samples: &[f64]) -> Option<Self> {
        if samples.len() < 2 {
            return None;
        }

        // Scott's factor n^(-1/5) scaled by the sample standard deviation
        let bandwidth = std_dev(samples) * (samples.len() as f64).powf(-0.2);
        if !(bandwidth > 0.0) {
            return None;
        }

        Some(Self {
            samples: samples.to_vec(),
            bandwidth,
        })
    }

    /// Density at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let norm = 1.0 / ((2.0 * PI).sqrt() * self.bandwidth * self.samples.len() as f64);
        self.samples
            .iter()
            .map(|&s| {
                let z = (x - s) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
            * norm
    }

    /// Density sampled at `points` evenly spaced values over `[lo, hi]`.
    pub fn curve(&self, lo: f64, hi: f64, points: usize) -> Vec<(f64, f64)> {
        let points = points.max(2);
        let step = (hi - lo) / (points - 1) as f64;
        (0..points)
            .map(|i| {
                let x = lo + step * i as f64;
                (x, self.evaluate(x))
            })
            .collect()
    }

    /// Support extended by `cut` bandwidths beyond the data extremes.
    pub fn support(&self, cut: f64) -> (f64, f64) {
        let min = self.samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min - cut * self.bandwidth, max + cut * self.bandwidth)
    }
}
