//! Analysis modules.
//!
//! Groups the cleaned respondents, runs the statistical comparisons and
//! derives the written conclusion.

pub mod conclusion;
pub mod grouping;
pub mod pipeline;

pub use grouping::{proficiency_by_type, skill_by_type};
pub use pipeline::{analyze, Analysis, LevelOutcome};
