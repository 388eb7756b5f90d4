//! Data models for the proficiency analyzer.
//!
//! This module contains the survey record types shared by the data,
//! analysis, report and chart layers.

use crate::analysis::Analysis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nationality value that marks a respondent as an Indian student.
pub const INDIAN_NATIONALITY: &str = "Indian";

/// Binary grouping derived from nationality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StudentType {
    Indian,
    Foreign,
}

impl StudentType {
    /// Both groups, in the order they are compared (Indian first).
    pub const ALL: [StudentType; 2] = [StudentType::Indian, StudentType::Foreign];

    /// Derive the student type from a nationality cell.
    pub fn from_nationality(nationality: &str) -> Self {
        if nationality.trim() == INDIAN_NATIONALITY {
            StudentType::Indian
        } else {
            StudentType::Foreign
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentType::Indian => "Indian",
            StudentType::Foreign => "Foreign",
        }
    }
}

impl fmt::Display for StudentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Indian" => Ok(StudentType::Indian),
            "Foreign" => Ok(StudentType::Foreign),
            other => Err(format!("unknown student type '{}'", other)),
        }
    }
}

/// Level of study reported by the respondent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LevelOfStudy {
    Undergraduate,
    Postgraduate,
}

impl LevelOfStudy {
    pub const ALL: [LevelOfStudy; 2] = [LevelOfStudy::Undergraduate, LevelOfStudy::Postgraduate];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelOfStudy::Undergraduate => "Undergraduate",
            LevelOfStudy::Postgraduate => "Postgraduate",
        }
    }
}

impl fmt::Display for LevelOfStudy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelOfStudy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown level of study '{}'", s))
    }
}

/// The four self-rated English skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    Reading,
    Listening,
    Speaking,
    Writing,
}

impl Skill {
    pub const ALL: [Skill; 4] = [Skill::Reading, Skill::Listening, Skill::Speaking, Skill::Writing];

    /// Position of the skill in a ratings array.
    pub fn index(&self) -> usize {
        match self {
            Skill::Reading => 0,
            Skill::Listening => 1,
            Skill::Speaking => 2,
            Skill::Writing => 3,
        }
    }

    /// Short name used in chart labels.
    pub fn short_name(&self) -> &'static str {
        match self {
            Skill::Reading => "Reading",
            Skill::Listening => "Listening",
            Skill::Speaking => "Speaking",
            Skill::Writing => "Writing",
        }
    }

    /// Name used in report headings.
    pub fn title(&self) -> &'static str {
        match self {
            Skill::Reading => "Reading Comprehension",
            Skill::Listening => "Listening Skills",
            Skill::Speaking => "Speaking Skills",
            Skill::Writing => "Writing Skills",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Map an ordinal skill label to its 1..=5 rating.
///
/// Matching ignores case and surrounding whitespace, so `Very strong` and
/// `Very Strong` both map to 5.
pub fn rating_from_label(label: &str) -> Option<u8> {
    match label.trim().to_lowercase().as_str() {
        "very weak" => Some(1),
        "weak" => Some(2),
        "moderate" => Some(3),
        "strong" => Some(4),
        "very strong" => Some(5),
        _ => None,
    }
}

/// A cleaned survey respondent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Respondent {
    pub nationality: String,
    pub first_language: String,
    pub level: LevelOfStudy,
    /// Ratings indexed by [`Skill::index`].
    pub ratings: [u8; 4],
    pub student_type: StudentType,
    /// Mean of the four ratings.
    pub proficiency_score: f64,
}

impl Respondent {
    /// Build a respondent, deriving the student type and proficiency score.
    pub fn new(
        nationality: String,
        first_language: String,
        level: LevelOfStudy,
        ratings: [u8; 4],
    ) -> Self {
        let student_type = StudentType::from_nationality(&nationality);
        let proficiency_score = proficiency_score(&ratings);
        Self {
            nationality,
            first_language,
            level,
            ratings,
            student_type,
            proficiency_score,
        }
    }

    pub fn rating(&self, skill: Skill) -> u8 {
        self.ratings[skill.index()]
    }
}

/// Composite proficiency: the mean of the four skill ratings.
pub fn proficiency_score(ratings: &[u8; 4]) -> f64 {
    ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64
}

/// Metadata about an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the survey CSV.
    pub input_path: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Data rows in the input file.
    pub rows_read: usize,
    /// Rows kept after dropping incomplete respondents.
    pub rows_retained: usize,
    /// Wall-clock duration of the analysis in seconds.
    pub duration_seconds: f64,
}


/// A complete analysis report, written as text or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub analysis: Analysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_labels() {
        assert_eq!(rating_from_label("Very Weak"), Some(1));
        assert_eq!(rating_from_label("Weak"), Some(2));
        assert_eq!(rating_from_label("Moderate"), Some(3));
        assert_eq!(rating_from_label("Strong"), Some(4));
        assert_eq!(rating_from_label("Very Strong"), Some(5));
        assert_eq!(rating_from_label("Very strong"), Some(5));
        assert_eq!(rating_from_label("  strong "), Some(4));
        assert_eq!(rating_from_label("Excellent"), None);
        assert_eq!(rating_from_label(""), None);
    }

    #[test]
    fn test_proficiency_score_is_mean_of_ratings() {
        // Strong, Weak, Moderate, Very Strong
        let ratings = [4, 2, 3, 5];
        assert_eq!(proficiency_score(&ratings), 3.5);
    }

    #[test]
    fn test_student_type_from_nationality() {
        assert_eq!(StudentType::from_nationality("Indian"), StudentType::Indian);
        assert_eq!(StudentType::from_nationality(" Indian "), StudentType::Indian);
        assert_eq!(StudentType::from_nationality("Nepalese"), StudentType::Foreign);
        assert_eq!(StudentType::from_nationality("indian"), StudentType::Foreign);
    }

    #[test]
    fn test_respondent_derives_fields() {
        let r = Respondent::new(
            "Indian".to_string(),
            "Hindi".to_string(),
            LevelOfStudy::Postgraduate,
            [4, 2, 3, 5],
        );
        assert_eq!(r.student_type, StudentType::Indian);
        assert_eq!(r.proficiency_score, 3.5);
        assert_eq!(r.rating(Skill::Speaking), 3);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("Undergraduate".parse(), Ok(LevelOfStudy::Undergraduate));
        assert_eq!(" postgraduate".parse(), Ok(LevelOfStudy::Postgraduate));
        assert!("Diploma".parse::<LevelOfStudy>().is_err());
    }

    #[test]
    fn test_student_type_round_trip_through_display() {
        for st in StudentType::ALL {
            assert_eq!(st.to_string().parse::<StudentType>(), Ok(st));
        }
    }
}
