//! Plain-language summary of an [`Analysis`].

use super::pipeline::{Analysis, LevelOutcome};
use crate::models::{Skill, StudentType};
use serde::Serialize;

/// Sentences and bullet points closing the report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conclusion {
    pub significance: String,
    pub effect: String,
    pub equivalence: String,
    pub interpretation: String,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

fn group_name(group: StudentType) -> &'static str {
    match group {
        StudentType::Indian => "Indian",
        StudentType::Foreign => "foreign",
    }
}

fn join_skills(skills: &[Skill]) -> String {
    let names: Vec<String> = skills.iter().map(|s| s.short_name().to_lowercase()).collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Derive the conclusion from the test results.
pub fn conclude(analysis: &Analysis) -> Conclusion {
    let t = &analysis.t_test;
    let effect = &analysis.effect;
    let eq = &analysis.equivalence;
    let significant = analysis.is_significant();

    let significance = format!(
        "Based on the t-test (p = {:.4}), there {} statistically significant difference in \
         English proficiency between Indian and foreign students.",
        t.p_value,
        if significant { "IS a" } else { "is NO" }
    );

    let effect_text = format!(
        "The effect size is {} (Cohen's d = {:.4}), indicating that the practical \
         significance of any difference is {}.",
        effect.magnitude, effect.cohens_d, effect.magnitude
    );

    let equivalence = format!(
        "Equivalence testing suggests that the groups are {}. ({:.0}% CI for mean \
         difference: [{:.4}, {:.4}], equivalence bounds: [{:.1}, {:.1}])",
        if eq.equivalent {
            "equivalent"
        } else {
            "not equivalent"
        },
        eq.confidence * 100.0,
        eq.ci_lower,
        eq.ci_upper,
        -eq.margin,
        eq.margin
    );

    let interpretation = if !significant && eq.equivalent {
        "The data strongly supports the claim that there is no significant difference in \
         English proficiency between Indian and foreign students based on country of origin."
            .to_string()
    } else if !significant {
        "While we cannot reject the null hypothesis of no difference, we also cannot \
         confidently claim equivalence. More data may be needed."
            .to_string()
    } else if effect.magnitude.is_trivial() {
        format!(
            "Although a statistically significant difference was detected, the effect size is \
             {}, suggesting that the practical importance of this difference may be limited.",
            effect.magnitude
        )
    } else {
        match effect.higher_group() {
            Some(group) => format!(
                "There appears to be a meaningful difference in English proficiency between \
                 the groups, with {} students scoring higher on average.",
                group_name(group)
            ),
            None => "There appears to be a meaningful difference in English proficiency \
                     between the groups."
                .to_string(),
        }
    };

    let significant_skills: Vec<Skill> = analysis
        .skills
        .iter()
        .filter(|s| s.significant)
        .map(|s| s.skill)
        .collect();

    let mut insights = Vec::new();
    match significant_skills.as_slice() {
        [] => insights.push(
            "No individual skill area shows a statistically significant difference between \
             the groups."
                .to_string(),
        ),
        [skill] => {
            insights.push(format!(
                "{} is the only skill area showing a statistically significant difference \
                 between the groups.",
                skill.title()
            ));
            if let Some(cmp) = analysis.skills.iter().find(|s| s.skill == *skill) {
                if let Some(group) = cmp.higher_group() {
                    insights.push(format!(
                        "{} students report higher {} ratings ({:.2} vs {:.2}).",
                        capitalize(group_name(group)),
                        skill.short_name().to_lowercase(),
                        cmp.mean_indian.max(cmp.mean_foreign),
                        cmp.mean_indian.min(cmp.mean_foreign)
                    ));
                }
            }
        }
        many => insights.push(format!(
            "Skill areas showing a statistically significant difference: {}.",
            join_skills(many)
        )),
    }

    let significant_levels: Vec<_> = analysis
        .levels
        .iter()
        .filter(|l| l.is_significant())
        .map(|l| l.level)
        .collect();
    for level in &significant_levels {
        insights.push(format!(
            "At the {} level, there is a significant difference in proficiency between \
             Indian and foreign students.",
            level.as_str().to_lowercase()
        ));
    }
    if !significant_levels.is_empty() {
        for other in analysis.levels.iter().filter(|l| {
            !l.is_significant() && matches!(l.outcome, LevelOutcome::Compared { .. })
        }) {
            insights.push(format!(
                "This difference is not observed at the {} level.",
                other.level.as_str().to_lowercase()
            ));
        }
    }

    let mut recommendations = Vec::new();
    if significant_skills.is_empty() {
        recommendations.push(
            "Track the individual skill areas in future surveys; no single skill currently \
             stands out"
                .to_string(),
        );
    } else {
        recommendations.push(format!(
            "Focus on {} development, as this is the area with the most apparent differences",
            join_skills(&significant_skills)
        ));
    }
    for level in &significant_levels {
        recommendations.push(format!(
            "Investigate the reasons for {}-level differences in proficiency",
            level.as_str().to_lowercase()
        ));
    }
    if !significant && !eq.equivalent {
        recommendations
            .push("Collect more responses to narrow the confidence interval".to_string());
    }
    recommendations.push(
        "Consider controlling for years of English study and educational background in \
         future analyses"
            .to_string(),
    );
    recommendations.push(
        "Examine differences by specific country of origin rather than just 'Indian' vs. \
         'Foreign'"
            .to_string(),
    );

    Conclusion {
        significance,
        effect: effect_text,
        equivalence,
        interpretation,
        insights,
        recommendations,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
