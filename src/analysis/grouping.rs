//! Grouping of respondents for the comparisons.
//!
//! This module splits the cleaned table by student type and level of study
//! and extracts the score vectors the tests run on.

use crate::models::{LevelOfStudy, Respondent, Skill, StudentType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Score vectors of the two groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupScores {
    pub indian: Vec<f64>,
    pub foreign: Vec<f64>,
}

impl GroupScores {
    /// Split `respondents` by student type, extracting one value each.
    pub fn collect<'a, I, F>(respondents: I, value: F) -> Self
    where
        I: IntoIterator<Item = &'a Respondent>,
        F: Fn(&Respondent) -> f64,
    {
        let mut scores = Self::default();
        for r in respondents {
            match r.student_type {
                StudentType::Indian => scores.indian.push(value(r)),
                StudentType::Foreign => scores.foreign.push(value(r)),
            }
        }
        scores
    }

    pub fn get(&self, group: StudentType) -> &[f64] {
        match group {
            StudentType::Indian => &self.indian,
            StudentType::Foreign => &self.foreign,
        }
    }
}

/// Proficiency scores split by student type.
pub fn proficiency_by_type(respondents: &[Respondent]) -> GroupScores {
    GroupScores::collect(respondents, |r| r.proficiency_score)
}

/// Ratings of one skill split by student type.
pub fn skill_by_type(respondents: &[Respondent], skill: Skill) -> GroupScores {
    GroupScores::collect(respondents, |r| f64::from(r.rating(skill)))
}

/// Number of respondents per student type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounts {
    pub indian: usize,
    pub foreign: usize,
    pub total: usize,
}

impl GroupCounts {
    pub fn from_respondents(respondents: &[Respondent]) -> Self {
        let indian = respondents
            .iter()
            .filter(|r| r.student_type == StudentType::Indian)
            .count();
        Self {
            indian,
            foreign: respondents.len() - indian,
            total: respondents.len(),
        }
    }
}

/// Group respondents by level of study, levels in enum order.
pub fn group_by_level(respondents: &[Respondent]) -> BTreeMap<LevelOfStudy, Vec<&Respondent>> {
    let mut grouped: BTreeMap<LevelOfStudy, Vec<&Respondent>> = BTreeMap::new();

    for r in respondents {
        grouped.entry(r.level).or_default().push(r);
    }

    grouped
}
