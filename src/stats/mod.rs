//! Statistical routines.
//!
//! Closed-form tests over `f64` samples. Distribution functions come from
//! `statrs`; everything else is computed here.

pub mod density;
pub mod descriptive;
pub mod dist;
pub mod effect;
pub mod hypothesis;
pub mod normality;

pub use density::GaussianKde;
pub use descriptive::{describe, mean, standard_error, Describe};
pub use effect::{cohens_d, equivalence_test, EffectMagnitude, Equivalence};
pub use hypothesis::{
    levene, mann_whitney_u, one_way_anova, t_test, Anova, Levene, MannWhitney, MannWhitneyMethod,
    TTest, VarianceAssumption,
};
pub use normality::{shapiro_wilk, ShapiroWilk};
