//! Thin wrappers over the `statrs` distributions used by the tests.

use crate::error::{StatsError, StatsResult};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};

fn students_t(df: f64) -> StatsResult<StudentsT> {
    StudentsT::new(0.0, 1.0, df)
        .map_err(|e| StatsError::Distribution(format!("Student's t with df={}: {}", df, e)))
}

/// Upper tail probability of Student's t.
pub fn t_sf(t: f64, df: f64) -> StatsResult<f64> {
    Ok(students_t(df)?.sf(t).clamp(0.0, 1.0))
}

/// Lower tail probability of Student's t.
pub fn t_cdf(t: f64, df: f64) -> StatsResult<f64> {
    Ok(students_t(df)?.cdf(t).clamp(0.0, 1.0))
}

/// Two-sided p-value of a t statistic.
pub fn t_two_sided(t: f64, df: f64) -> StatsResult<f64> {
    Ok((2.0 * t_sf(t.abs(), df)?).min(1.0))
}

/// Quantile function of Student's t.
pub fn t_quantile(p: f64, df: f64) -> StatsResult<f64> {
    Ok(students_t(df)?.inverse_cdf(p))
}

/// Upper tail probability of the F distribution.
pub fn f_sf(f: f64, df1: f64, df2: f64) -> StatsResult<f64> {
    let dist = FisherSnedecor::new(df1, df2).map_err(|e| {
        StatsError::Distribution(format!("F with df=({}, {}): {}", df1, df2, e))
    })?;
    Ok(dist.sf(f).clamp(0.0, 1.0))
}

fn standard_normal() -> Normal {
    // mean 0, sd 1 is always a valid parameterisation
    Normal::new(0.0, 1.0).unwrap_or_else(|_| unreachable!())
}

/// Upper tail probability of the standard normal.
pub fn normal_sf(z: f64) -> f64 {
    standard_normal().sf(z)
}

/// Quantile function of the standard normal.
pub fn normal_quantile(p: f64) -> f64 {
    standard_normal().inverse_cdf(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_t_quantile_reference_values() {
        assert!(approx(t_quantile(0.975, 10.0).unwrap(), 2.228139, 1e-5));
        assert!(approx(t_quantile(0.95, 20.0).unwrap(), 1.724718, 1e-5));
    }

    #[test]
    fn test_t_two_sided_is_symmetric() {
        let a = t_two_sided(2.0, 8.0).unwrap();
        let b = t_two_sided(-2.0, 8.0).unwrap();
        assert!(approx(a, b, 1e-12));
        assert!(approx(a, 0.080516, 1e-5));
    }

    #[test]
    fn test_f_sf_reference_value() {
        // F(1, 8) at 5.3177 is the 95th percentile
        assert!(approx(f_sf(5.317655, 1.0, 8.0).unwrap(), 0.05, 1e-5));
    }

    #[test]
    fn test_normal_helpers() {
        assert!(approx(normal_sf(1.959964), 0.025, 1e-6));
        assert!(approx(normal_quantile(0.975), 1.959964, 1e-5));
    }

    #[test]
    fn test_invalid_df_is_an_error() {
        assert!(t_sf(1.0, 0.0).is_err());
        assert!(f_sf(1.0, 0.0, 3.0).is_err());
    }
}
