//! Text report generation.
//!
//! This module renders an analysis [`Report`] as the plain-text results
//! file, or as JSON.

use crate::analysis::{Analysis, LevelOutcome};
use crate::models::{Report, ReportMetadata, StudentType};
use crate::stats::{MannWhitneyMethod, TTest};
use anyhow::Result;

const RULE: &str = "===================================";

/// Generate the complete plain-text report.
pub fn generate_text_report(report: &Report) -> String {
    let analysis = &report.analysis;
    let mut output = String::new();

    output.push_str("ENGLISH PROFICIENCY ANALYSIS RESULTS\n");
    output.push_str(RULE);
    output.push_str("\n\n");

    output.push_str(&generate_data_section(&report.metadata, analysis));
    output.push_str(&generate_descriptive_section(analysis));
    output.push_str(&generate_testing_section(analysis));
    output.push_str(&generate_skill_section(analysis));
    output.push_str(&generate_level_section(analysis));
    output.push_str(&generate_conclusion_section(analysis));

    output
}

fn heading(title: &str) -> String {
    format!("\n\n{}\n{}\n", title, "=".repeat(title.len()))
}

/// Generate the data loading section.
fn generate_data_section(metadata: &ReportMetadata, analysis: &Analysis) -> String {
    let mut section = String::new();

    section.push_str("Data Loading and Preparation:\n");
    section.push_str(&format!("Input file: {}\n", metadata.input_path));
    section.push_str(&format!(
        "Analysis date: {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("Rows read: {}\n", metadata.rows_read));
    section.push_str(&format!(
        "Rows retained after removing incomplete responses: {}\n",
        metadata.rows_retained
    ));

    let counts = &analysis.counts;
    section.push_str("\nStudent count by type:\n");
    section.push_str(&format!("Indian students: {}\n", counts.indian));
    section.push_str(&format!("Foreign students: {}\n", counts.foreign));
    section.push_str(&format!("Total: {}\n", counts.total));

    section
}

/// Generate the descriptive statistics table.
fn generate_descriptive_section(analysis: &Analysis) -> String {
    let mut section = String::new();

    section.push_str("\nDescriptive Statistics for English Proficiency by Student Type:\n");
    section.push_str(&format!(
        "{:<14}{:>7}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}{:>9}\n",
        "Student_Type", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    ));
    for d in &analysis.descriptives {
        let s = &d.stats;
        section.push_str(&format!(
            "{:<14}{:>7}{:>9.4}{:>9.4}{:>9.4}{:>9.4}{:>9.4}{:>9.4}{:>9.4}\n",
            d.group.as_str(),
            s.count,
            s.mean,
            s.std,
            s.min,
            s.q1,
            s.median,
            s.q3,
            s.max
        ));
    }

    section
}

fn t_line(t: &TTest) -> String {
    format!(
        "t={:.4}, p-value={:.4} (df={:.2}, {})",
        t.statistic, t.p_value, t.df, t.assumption
    )
}

/// Generate the statistical testing section: normality through TOST.
fn generate_testing_section(analysis: &Analysis) -> String {
    let alpha = analysis.alpha;
    let mut section = heading("STATISTICAL TESTING");

    section.push_str("\n1. Testing Normality Assumption\n");
    for (group, sw) in [
        (StudentType::Indian, &analysis.normality.indian),
        (StudentType::Foreign, &analysis.normality.foreign),
    ] {
        section.push_str(&format!(
            "Shapiro-Wilk test for {} students: W={:.4}, p-value={:.4}\n",
            group, sw.statistic, sw.p_value
        ));
    }
    if analysis.normality.both_normal {
        section.push_str(&format!(
            "Conclusion: Both distributions appear to be normally distributed (p > {})\n",
            alpha
        ));
    } else {
        section.push_str("Conclusion: At least one distribution deviates from normality\n");
    }

    section.push_str("\n2. Testing Homogeneity of Variances\n");
    let levene = &analysis.variance.levene;
    section.push_str(&format!(
        "Levene's test: W={:.4}, p-value={:.4}\n",
        levene.statistic, levene.p_value
    ));
    if levene.p_value > alpha {
        section.push_str(&format!(
            "Conclusion: Variances appear to be equal (p > {})\n",
            alpha
        ));
    } else {
        section.push_str("Conclusion: Variances appear to be unequal\n");
    }

    section.push_str("\n3. Hypothesis Testing\n");
    section.push_str(&format!(
        "Independent samples t-test: {}\n",
        t_line(&analysis.t_test)
    ));
    let mw = &analysis.mann_whitney;
    section.push_str(&format!(
        "Mann-Whitney U test: U={:.4}, p-value={:.4} ({})\n",
        mw.statistic,
        mw.p_value,
        match mw.method {
            MannWhitneyMethod::Exact => "exact",
            MannWhitneyMethod::Asymptotic => "normal approximation",
        }
    ));

    section.push_str("\n4. One-way ANOVA\n");
    let anova = &analysis.anova;
    section.push_str(&format!(
        "{:<14}{:>12}{:>8}{:>12}{:>10}\n",
        "", "sum_sq", "df", "F", "PR(>F)"
    ));
    section.push_str(&format!(
        "{:<14}{:>12.4}{:>8.1}{:>12.4}{:>10.4}\n",
        "Student_Type", anova.ss_between, anova.df_between, anova.f, anova.p_value
    ));
    section.push_str(&format!(
        "{:<14}{:>12.4}{:>8.1}{:>12}{:>10}\n",
        "Residual", anova.ss_within, anova.df_within, "", ""
    ));

    section.push_str("\n5. Effect Size Analysis\n");
    let effect = &analysis.effect;
    section.push_str(&format!(
        "Mean proficiency score (Indian): {:.4}\n",
        effect.mean_indian
    ));
    section.push_str(&format!(
        "Mean proficiency score (Foreign): {:.4}\n",
        effect.mean_foreign
    ));
    section.push_str(&format!("Mean difference: {:.4}\n", effect.mean_difference));
    section.push_str(&format!("Effect size (Cohen's d): {:.4}\n", effect.cohens_d));
    section.push_str(&format!("Effect size classification: {}\n", effect.magnitude));

    section.push_str("\n6. Equivalence Testing (TOST)\n");
    let eq = &analysis.equivalence;
    section.push_str(&format!(
        "{:.0}% Confidence Interval for mean difference: [{:.4}, {:.4}]\n",
        eq.confidence * 100.0,
        eq.ci_lower,
        eq.ci_upper
    ));
    section.push_str(&format!(
        "Equivalence bounds: [-{:.1}, {:.1}]\n",
        eq.margin, eq.margin
    ));
    section.push_str(&format!(
        "One-sided p-values: lower={:.4}, upper={:.4}\n",
        eq.p_lower, eq.p_upper
    ));
    if eq.equivalent {
        section.push_str(
            "Conclusion: The groups are statistically equivalent (scores differ by less than \
             the equivalence bound)\n",
        );
    } else {
        section.push_str("Conclusion: Cannot conclude that the groups are equivalent\n");
    }

    section
}

fn result_line(significant: bool) -> &'static str {
    if significant {
        "  Result: Significant difference detected\n"
    } else {
        "  Result: No significant difference\n"
    }
}

/// Generate the skill-by-skill section.
fn generate_skill_section(analysis: &Analysis) -> String {
    let mut section = heading("SKILL-BY-SKILL ANALYSIS");

    for skill in &analysis.skills {
        section.push_str(&format!("\n{}:\n", skill.skill.title()));
        section.push_str(&format!(
            "  Mean (Indian): {:.2}, Mean (Foreign): {:.2}\n",
            skill.mean_indian, skill.mean_foreign
        ));
        section.push_str(&format!(
            "  Mean difference: {:.2}\n",
            (skill.mean_indian - skill.mean_foreign).abs()
        ));
        match &skill.t_test {
            Some(t) => {
                section.push_str(&format!("  t-test: {}\n", t_line(t)));
            }
            None => section.push_str("  t-test: not computed (no variation in ratings)\n"),
        }
        if let Some(d) = skill.cohens_d {
            section.push_str(&format!("  Effect size (Cohen's d): {:.4}\n", d));
        }
        section.push_str(result_line(skill.significant));
    }

    section
}

/// Generate the level-of-study section.
fn generate_level_section(analysis: &Analysis) -> String {
    let mut section = heading("ANALYSIS BY LEVEL OF STUDY");

    for level in &analysis.levels {
        match &level.outcome {
            LevelOutcome::InsufficientData { n } => {
                section.push_str(&format!(
                    "\n{}: Insufficient data for analysis (n={})\n",
                    level.level, n
                ));
            }
            LevelOutcome::InsufficientGroups { indian, foreign } => {
                section.push_str(&format!(
                    "\n{}: Insufficient data in one or both groups (Indian: {}, Foreign: {})\n",
                    level.level, indian, foreign
                ));
            }
            LevelOutcome::Compared {
                indian,
                foreign,
                t_test,
                significant,
            } => {
                section.push_str(&format!("\n{}:\n", level.level));
                section.push_str(&format!(
                    "  Indian students: n={}, mean={:.2}\n",
                    indian.n, indian.mean
                ));
                section.push_str(&format!(
                    "  Foreign students: n={}, mean={:.2}\n",
                    foreign.n, foreign.mean
                ));
                section.push_str(&format!(
                    "  Mean difference: {:.2}\n",
                    (indian.mean - foreign.mean).abs()
                ));
                match t_test {
                    Some(t) => {
                        section.push_str(&format!("  t-test: {}\n", t_line(t)));
                    }
                    None => section.push_str("  t-test: not computed (no variation in scores)\n"),
                }
                section.push_str(result_line(*significant));
            }
        }
    }

    section
}

/// Generate the summary and conclusion section.
fn generate_conclusion_section(analysis: &Analysis) -> String {
    let c = &analysis.conclusion;
    let mut section = heading("SUMMARY AND CONCLUSION");

    section.push_str(&format!("\n{}\n", c.significance));
    section.push_str(&format!("\n{}\n", c.effect));
    section.push_str(&format!("\n{}\n", c.equivalence));
    section.push_str("\nInterpretation:\n");
    section.push_str(&format!("{}\n", c.interpretation));

    if !c.insights.is_empty() {
        section.push_str("\nKey insights:\n");
        for insight in &c.insights {
            section.push_str(&format!("- {}\n", insight));
        }
    }

    if !c.recommendations.is_empty() {
        section.push_str("\nRecommendations for future research:\n");
        for (i, rec) in c.recommendations.iter().enumerate() {
            section.push_str(&format!("{}. {}\n", i + 1, rec));
        }
    }

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::AnalysisConfig;
    use crate::models::{LevelOfStudy, Respondent};
    use chrono::Utc;

    fn create_test_report() -> Report {
        let mut respondents = Vec::new();
        for (i, ratings) in [
            [4, 3, 2, 4],
            [3, 3, 2, 3],
            [4, 4, 3, 4],
            [3, 4, 2, 3],
            [4, 3, 3, 3],
            [5, 4, 3, 4],
        ]
        .into_iter()
        .enumerate()
        {
            let level = if i < 2 {
                LevelOfStudy::Undergraduate
            } else {
                LevelOfStudy::Postgraduate
            };
            respondents.push(Respondent::new(
                "Indian".to_string(),
                "Hindi".to_string(),
                level,
                ratings,
            ));
        }
        for ratings in [
            [4, 4, 5, 4],
            [5, 4, 5, 4],
            [4, 5, 4, 4],
            [4, 3, 4, 3],
            [3, 4, 4, 4],
        ] {
            respondents.push(Respondent::new(
                "Nigerian".to_string(),
                "Yoruba".to_string(),
                LevelOfStudy::Postgraduate,
                ratings,
            ));
        }

        let analysis = analyze(&respondents, &AnalysisConfig::default()).unwrap();
        Report {
            metadata: ReportMetadata {
                input_path: "data/Data Collection.csv".to_string(),
                analysis_date: Utc::now(),
                rows_read: 13,
                rows_retained: 11,
                duration_seconds: 0.2,
            },
            analysis,
        }
    }

    #[test]
    fn test_generate_text_report_sections() {
        let text = generate_text_report(&create_test_report());

        assert!(text.starts_with("ENGLISH PROFICIENCY ANALYSIS RESULTS"));
        assert!(text.contains("Data Loading and Preparation:"));
        assert!(text.contains("Rows read: 13"));
        assert!(text.contains("Indian students: 6"));
        assert!(text.contains("Foreign students: 5"));
        assert!(text.contains("STATISTICAL TESTING"));
        assert!(text.contains("Shapiro-Wilk test for Indian students: W="));
        assert!(text.contains("4. One-way ANOVA"));
        assert!(text.contains("6. Equivalence Testing (TOST)"));
        assert!(text.contains("SKILL-BY-SKILL ANALYSIS"));
        assert!(text.contains("\nSpeaking Skills:\n"));
        assert!(text.contains("ANALYSIS BY LEVEL OF STUDY"));
        assert!(text.contains("Undergraduate: Insufficient data for analysis (n=2)"));
        assert!(text.contains("Postgraduate:\n  Indian students: n=4"));
        assert!(text.contains("SUMMARY AND CONCLUSION"));
        assert!(text.contains("Recommendations for future research:"));
    }

    #[test]
    fn test_interpretation_on_its_own_line() {
        let report = create_test_report();
        let text = generate_text_report(&report);
        let expected = format!(
            "\nInterpretation:\n{}\n",
            report.analysis.conclusion.interpretation
        );
        assert!(text.contains(&expected));
    }

    #[test]
    fn test_descriptive_table_rows() {
        let report = create_test_report();
        let section = generate_descriptive_section(&report.analysis);
        let lines: Vec<&str> = section.lines().collect();

        assert!(lines[2].starts_with("Student_Type"));
        assert!(lines[3].starts_with("Indian"));
        assert!(lines[4].starts_with("Foreign"));
        // 4 decimal places
        assert!(lines[3].contains(&format!("{:.4}", report.analysis.effect.mean_indian)));
    }

    #[test]
    fn test_skill_means_use_two_decimals() {
        let report = create_test_report();
        let section = generate_skill_section(&report.analysis);
        let reading = &report.analysis.skills[0];
        assert!(section.contains(&format!(
            "Mean (Indian): {:.2}, Mean (Foreign): {:.2}",
            reading.mean_indian, reading.mean_foreign
        )));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["rows_retained"], 11);
        assert_eq!(value["analysis"]["counts"]["indian"], 6);
        assert_eq!(value["analysis"]["skills"].as_array().unwrap().len(), 4);
        assert_eq!(
            value["analysis"]["levels"][0]["outcome"]["status"],
            "insufficient_data"
        );
        assert!(value["analysis"]["conclusion"]["recommendations"].is_array());
    }
}
