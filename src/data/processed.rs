//! The derived CSV shared by the analysis and chart stages.

use super::loader::{cell, find_column, record_line, CleanedData, ColumnIndex, SurveyTable};
use crate::config::ColumnConfig;
use crate::error::DataError;
use crate::models::{LevelOfStudy, Respondent, Skill, StudentType};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;
use tracing::{debug, info};

/// Header of the derived student type column.
pub const STUDENT_TYPE_COLUMN: &str = "Student_Type";

/// Header of the derived score column.
pub const PROFICIENCY_SCORE_COLUMN: &str = "Proficiency_Score";

/// Write the derived table.
///
/// Every original column is kept in order; skill columns carry the numeric
/// rating instead of the label, and the two derived columns are appended.
pub fn write_processed(
    path: &Path,
    table: &SurveyTable,
    index: &ColumnIndex,
    cleaned: &CleanedData,
) -> Result<(), DataError> {
    let mut writer = WriterBuilder::new().from_path(path)?;

    let mut header = table.headers.clone();
    header.push_field(STUDENT_TYPE_COLUMN);
    header.push_field(PROFICIENCY_SCORE_COLUMN);
    writer.write_record(&header)?;

    for (respondent, &row_idx) in cleaned.respondents.iter().zip(&cleaned.source_rows) {
        let source = &table.rows[row_idx];
        let mut fields: Vec<String> = Vec::with_capacity(header.len());

        for position in 0..table.headers.len() {
            let value = match index.is_skill(position) {
                Some(skill) => respondent.rating(skill).to_string(),
                None => source.get(position).unwrap_or_default().to_string(),
            };
            fields.push(value);
        }
        fields.push(respondent.student_type.to_string());
        fields.push(respondent.proficiency_score.to_string());

        writer.write_record(&fields)?;
    }

    writer.flush()?;
    info!(
        "Wrote {} processed rows to {}",
        cleaned.respondents.len(),
        path.display()
    );
    Ok(())
}

/// Load the derived table written by [`write_processed`].
pub fn read_processed(path: &Path, columns: &ColumnConfig) -> Result<Vec<Respondent>, DataError> {
    info!("Loading processed data from {}", path.display());

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let file = path.display().to_string();

    let index = ColumnIndex::resolve(&headers, columns, &file)?;
    let type_col = derived_column(&headers, STUDENT_TYPE_COLUMN, &file)?;
    let score_col = derived_column(&headers, PROFICIENCY_SCORE_COLUMN, &file)?;

    let mut respondents = Vec::new();
    for record in reader.records() {
        let record = record?;
        respondents.push(parse_processed_row(
            &record, &headers, &index, type_col, score_col,
        )?);
    }

    debug!("Loaded {} processed respondents", respondents.len());
    Ok(respondents)
}

fn derived_column(headers: &StringRecord, name: &str, file: &str) -> Result<usize, DataError> {
    find_column(headers, name).ok_or_else(|| DataError::MissingColumn {
        column: name.to_string(),
        file: file.to_string(),
    })
}

fn parse_processed_row(
    record: &StringRecord,
    headers: &StringRecord,
    index: &ColumnIndex,
    type_col: usize,
    score_col: usize,
) -> Result<Respondent, DataError> {
    let line = record_line(record);
    let invalid = |position: usize| DataError::InvalidValue {
        line,
        column: headers.get(position).unwrap_or_default().to_string(),
        value: record.get(position).unwrap_or_default().to_string(),
    };

    let level_raw = cell(record, index.level_of_study).unwrap_or_default();
    let level: LevelOfStudy = level_raw.parse().map_err(|_| DataError::UnknownLevel {
        line,
        label: level_raw.to_string(),
    })?;

    let mut ratings = [0u8; 4];
    for skill in Skill::ALL {
        let position = index.skills[skill.index()];
        ratings[skill.index()] = cell(record, position)
            .and_then(parse_rating)
            .ok_or_else(|| invalid(position))?;
    }

    let student_type: StudentType = cell(record, type_col)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| invalid(type_col))?;

    let proficiency_score: f64 = cell(record, score_col)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| invalid(score_col))?;

    Ok(Respondent {
        nationality: cell(record, index.nationality).unwrap_or_default().to_string(),
        first_language: cell(record, index.first_language)
            .unwrap_or_default()
            .to_string(),
        level,
        ratings,
        student_type,
        proficiency_score,
    })
}

/// Accept `4` as well as `4.0`, as long as the value is a whole rating.
fn parse_rating(value: &str) -> Option<u8> {
    let number: f64 = value.parse().ok()?;
    if number.fract() == 0.0 && (1.0..=5.0).contains(&number) {
        Some(number as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{clean, load_survey};
    use std::io::Write;

    fn survey_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("survey.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "Timestamp,Nationality,First Language,Level of Study,\"Reading Comprehension \n(Understanding academic text)\",Listening Skills (Understanding lectures and spoken English),Speaking Skills (Fluency and confidence in spoken communication),Writing Skills (Ability to write academic papers and assignments)"
        )
        .unwrap();
        writeln!(file, "2024-01-01,Indian,Hindi,Postgraduate,Strong,Weak,Moderate,Very Strong").unwrap();
        writeln!(file, "2024-01-02,,Hindi,Postgraduate,Strong,Weak,Moderate,Very Strong").unwrap();
        writeln!(file, "2024-01-03,Kenyan,Swahili,Undergraduate,Very strong,Strong,Strong,Strong").unwrap();
        path
    }

    #[test]
    fn test_processed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let columns = ColumnConfig::default();
        let table = load_survey(&survey_file(&dir)).unwrap();
        let index = ColumnIndex::resolve(&table.headers, &columns, "survey.csv").unwrap();
        let cleaned = clean(&table, &index).unwrap();

        let out = dir.path().join("processed.csv");
        write_processed(&out, &table, &index, &cleaned).unwrap();

        let loaded = read_processed(&out, &columns).unwrap();
        assert_eq!(loaded, cleaned.respondents);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].proficiency_score, 3.5);
        assert_eq!(loaded[1].student_type, StudentType::Foreign);
    }

    #[test]
    fn test_processed_keeps_original_columns() {
        let dir = tempfile::tempdir().unwrap();
        let columns = ColumnConfig::default();
        let table = load_survey(&survey_file(&dir)).unwrap();
        let index = ColumnIndex::resolve(&table.headers, &columns, "survey.csv").unwrap();
        let cleaned = clean(&table, &index).unwrap();

        let out = dir.path().join("processed.csv");
        write_processed(&out, &table, &index, &cleaned).unwrap();

        let mut reader = ReaderBuilder::new().from_path(&out).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(0), Some("Timestamp"));
        assert_eq!(headers.get(8), Some(STUDENT_TYPE_COLUMN));
        assert_eq!(headers.get(9), Some(PROFICIENCY_SCORE_COLUMN));

        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(first.get(0), Some("2024-01-01"));
        assert_eq!(first.get(4), Some("4"));
        assert_eq!(first.get(7), Some("5"));
        assert_eq!(first.get(8), Some("Indian"));
        assert_eq!(first.get(9), Some("3.5"));
    }

    #[test]
    fn test_read_processed_rejects_bad_rating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "Nationality,First Language,Level of Study,Reading Comprehension (Understanding academic text),Listening Skills (Understanding lectures and spoken English),Speaking Skills (Fluency and confidence in spoken communication),Writing Skills (Ability to write academic papers and assignments),Student_Type,Proficiency_Score"
        )
        .unwrap();
        writeln!(file, "Indian,Hindi,Postgraduate,4,7,3,5,Indian,4.75").unwrap();

        let err = read_processed(&path, &ColumnConfig::default()).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4"), Some(4));
        assert_eq!(parse_rating("4.0"), Some(4));
        assert_eq!(parse_rating("4.5"), None);
        assert_eq!(parse_rating("0"), None);
        assert_eq!(parse_rating("strong"), None);
    }
}
