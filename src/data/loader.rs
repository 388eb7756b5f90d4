//! Survey CSV loading and cleaning.
//!
//! Reads the raw survey export, resolves the configured columns, drops
//! incomplete respondents and derives the proficiency fields.

use crate::config::ColumnConfig;
use crate::error::DataError;
use crate::models::{rating_from_label, LevelOfStudy, Respondent, Skill};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;
use tracing::{debug, info};

/// Raw survey rows, kept verbatim so the derived CSV can reproduce them.
#[derive(Debug, Clone)]
pub struct SurveyTable {
    /// Header row.
    pub headers: StringRecord,
    /// Data rows, with their source positions.
    pub rows: Vec<StringRecord>,
}

impl SurveyTable {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Positions of the analysis columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub nationality: usize,
    pub first_language: usize,
    pub level_of_study: usize,
    /// Indexed by [`Skill::index`].
    pub skills: [usize; 4],
}

impl ColumnIndex {
    /// Resolve every configured column, failing on the first one missing.
    pub fn resolve(
        headers: &StringRecord,
        columns: &ColumnConfig,
        file: &str,
    ) -> Result<Self, DataError> {
        let lookup = |name: &str| {
            find_column(headers, name).ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                file: file.to_string(),
            })
        };

        let mut skills = [0; 4];
        for skill in Skill::ALL {
            skills[skill.index()] = lookup(columns.skill(skill))?;
        }

        Ok(Self {
            nationality: lookup(&columns.nationality)?,
            first_language: lookup(&columns.first_language)?,
            level_of_study: lookup(&columns.level_of_study)?,
            skills,
        })
    }

    /// Whether the column at `position` holds a skill rating.
    pub fn is_skill(&self, position: usize) -> Option<Skill> {
        Skill::ALL
            .into_iter()
            .find(|skill| self.skills[skill.index()] == position)
    }
}

/// Find a header by exact name, falling back to a whitespace-insensitive match.
pub fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    if let Some(pos) = headers.iter().position(|h| h == name) {
        return Some(pos);
    }

    let wanted = normalize_header(name);
    headers.iter().position(|h| normalize_header(h) == wanted)
}

fn normalize_header(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Result of the cleaning step.
#[derive(Debug, Clone)]
pub struct CleanedData {
    /// Respondents kept for analysis, in file order.
    pub respondents: Vec<Respondent>,
    /// Index into [`SurveyTable::rows`] of each kept respondent.
    pub source_rows: Vec<usize>,
    /// Data rows read from the file.
    pub rows_read: usize,
    /// Rows dropped for missing nationality, first language or level of study.
    pub rows_excluded: usize,
}

/// Read the survey CSV into memory.
pub fn load_survey(path: &Path) -> Result<SurveyTable, DataError> {
    info!("Loading survey data from {}", path.display());

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }

    debug!("Read {} rows with {} columns", rows.len(), headers.len());
    Ok(SurveyTable { headers, rows })
}

/// Drop incomplete respondents and derive the proficiency fields.
///
/// Rows with an empty nationality, first language or level of study are
/// excluded. Any remaining row must carry a known level of study and four
/// mappable skill ratings.
pub fn clean(table: &SurveyTable, index: &ColumnIndex) -> Result<CleanedData, DataError> {
    let mut respondents = Vec::with_capacity(table.len());
    let mut source_rows = Vec::with_capacity(table.len());
    let mut rows_excluded = 0;

    for (row_idx, record) in table.rows.iter().enumerate() {
        let line = record_line(record);

        let (nationality, first_language, level) = match (
            cell(record, index.nationality),
            cell(record, index.first_language),
            cell(record, index.level_of_study),
        ) {
            (Some(n), Some(f), Some(l)) => (n, f, l),
            _ => {
                debug!("Excluding line {}: missing demographic field", line);
                rows_excluded += 1;
                continue;
            }
        };

        let level: LevelOfStudy = level.parse().map_err(|_| DataError::UnknownLevel {
            line,
            label: level.to_string(),
        })?;

        let mut ratings = [0u8; 4];
        for skill in Skill::ALL {
            let column = table
                .headers
                .get(index.skills[skill.index()])
                .unwrap_or_default()
                .to_string();
            let label = cell(record, index.skills[skill.index()])
                .ok_or_else(|| DataError::MissingRating {
                    line,
                    column: column.clone(),
                })?;
            ratings[skill.index()] =
                rating_from_label(label).ok_or_else(|| DataError::UnknownRating {
                    line,
                    column,
                    label: label.to_string(),
                })?;
        }

        respondents.push(Respondent::new(
            nationality.to_string(),
            first_language.to_string(),
            level,
            ratings,
        ));
        source_rows.push(row_idx);
    }

    info!(
        "Kept {} of {} respondents ({} excluded)",
        respondents.len(),
        table.len(),
        rows_excluded
    );

    Ok(CleanedData {
        respondents,
        source_rows,
        rows_read: table.len(),
        rows_excluded,
    })
}

/// Trimmed cell content, `None` when absent or blank.
pub(crate) fn cell(record: &StringRecord, position: usize) -> Option<&str> {
    record
        .get(position)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Source line of a record, for error messages.
pub(crate) fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentType;
    use std::io::Write;

    const HEADER: &str = "Nationality,First Language,Level of Study,\"Reading Comprehension \n(Understanding academic text)\",Listening Skills (Understanding lectures and spoken English),Speaking Skills (Fluency and confidence in spoken communication),Writing Skills (Ability to write academic papers and assignments)";

    fn write_csv(dir: &tempfile::TempDir, rows: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join("survey.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        path
    }

    fn load_and_clean(rows: &[&str]) -> Result<CleanedData, DataError> {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, rows);
        let table = load_survey(&path)?;
        let index = ColumnIndex::resolve(&table.headers, &ColumnConfig::default(), "survey.csv")?;
        clean(&table, &index)
    }

    #[test]
    fn test_clean_derives_score_and_type() {
        let cleaned = load_and_clean(&[
            "Indian,Hindi,Postgraduate,Strong,Weak,Moderate,Very Strong",
            "Nigerian,English,Undergraduate,Very strong,Strong,Strong,Moderate",
        ])
        .unwrap();

        assert_eq!(cleaned.rows_read, 2);
        assert_eq!(cleaned.rows_excluded, 0);
        assert_eq!(cleaned.respondents.len(), 2);

        let first = &cleaned.respondents[0];
        assert_eq!(first.student_type, StudentType::Indian);
        assert_eq!(first.proficiency_score, 3.5);
        assert_eq!(first.level, LevelOfStudy::Postgraduate);

        let second = &cleaned.respondents[1];
        assert_eq!(second.student_type, StudentType::Foreign);
        assert_eq!(second.ratings, [5, 4, 4, 3]);
    }

    #[test]
    fn test_clean_excludes_incomplete_rows() {
        let cleaned = load_and_clean(&[
            "Indian,Hindi,Postgraduate,Strong,Weak,Moderate,Very Strong",
            ",Hindi,Postgraduate,Strong,Weak,Moderate,Very Strong",
            "Indian,,Undergraduate,Strong,Weak,Moderate,Very Strong",
            "Nepalese,Nepali,  ,Strong,Weak,Moderate,Very Strong",
            "Nepalese,Nepali,Undergraduate,Weak,Weak,Weak,Weak",
        ])
        .unwrap();

        assert_eq!(cleaned.rows_read, 5);
        assert_eq!(cleaned.rows_excluded, 3);
        assert_eq!(cleaned.respondents.len(), 2);
        assert_eq!(cleaned.source_rows, vec![0, 4]);
    }

    #[test]
    fn test_clean_rejects_unknown_rating() {
        let err = load_and_clean(&["Indian,Hindi,Postgraduate,Strong,Superb,Moderate,Weak"])
            .unwrap_err();

        match err {
            DataError::UnknownRating { label, column, .. } => {
                assert_eq!(label, "Superb");
                assert!(column.starts_with("Listening"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_clean_rejects_missing_rating() {
        let err = load_and_clean(&["Indian,Hindi,Postgraduate,Strong,Weak,,Weak"]).unwrap_err();
        assert!(matches!(err, DataError::MissingRating { .. }));
    }

    #[test]
    fn test_clean_rejects_unknown_level() {
        let err = load_and_clean(&["Indian,Hindi,Diploma,Strong,Weak,Weak,Weak"]).unwrap_err();
        assert!(matches!(err, DataError::UnknownLevel { .. }));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let headers = StringRecord::from(vec!["Nationality", "Level of Study"]);
        let err = ColumnIndex::resolve(&headers, &ColumnConfig::default(), "x.csv").unwrap_err();
        assert!(err.to_string().contains("First Language") || err.to_string().contains("Reading"));
    }

    #[test]
    fn test_find_column_tolerates_whitespace() {
        let headers = StringRecord::from(vec!["Reading Comprehension (Understanding academic text)"]);
        assert_eq!(
            find_column(&headers, "Reading Comprehension \n(Understanding academic text)"),
            Some(0)
        );
        assert_eq!(find_column(&headers, "Writing"), None);
    }
}
