//! The comparison of Indian and foreign respondents.

use super::conclusion::{conclude, Conclusion};
use super::grouping::{group_by_level, proficiency_by_type, skill_by_type, GroupCounts, GroupScores};
use crate::config::AnalysisConfig;
use crate::error::{StatsError, StatsResult};
use crate::models::{LevelOfStudy, Respondent, Skill, StudentType};
use crate::stats::{
    cohens_d, describe, equivalence_test, levene, mann_whitney_u, mean, one_way_anova,
    shapiro_wilk, t_test, Anova, Describe, EffectMagnitude, Equivalence, Levene, MannWhitney,
    ShapiroWilk, TTest, VarianceAssumption,
};
use serde::Serialize;
use tracing::{debug, info};

/// Descriptive statistics of one group's proficiency scores.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDescriptive {
    pub group: StudentType,
    #[serde(flatten)]
    pub stats: Describe,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalityCheck {
    pub indian: ShapiroWilk,
    pub foreign: ShapiroWilk,
    /// Both groups have p > alpha.
    pub both_normal: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VarianceCheck {
    pub levene: Levene,
    pub assumption: VarianceAssumption,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectSize {
    pub mean_indian: f64,
    pub mean_foreign: f64,
    /// Absolute difference of the group means.
    pub mean_difference: f64,
    /// Signed, Indian relative to foreign.
    pub cohens_d: f64,
    pub magnitude: EffectMagnitude,
}

impl EffectSize {
    /// The group with the higher mean score, if the means differ.
    pub fn higher_group(&self) -> Option<StudentType> {
        if self.mean_indian > self.mean_foreign {
            Some(StudentType::Indian)
        } else if self.mean_foreign > self.mean_indian {
            Some(StudentType::Foreign)
        } else {
            None
        }
    }
}

/// Comparison of one skill's ratings.
///
/// `t_test` and `cohens_d` are `None` when neither group's ratings vary.
#[derive(Debug, Clone, Serialize)]
pub struct SkillComparison {
    pub skill: Skill,
    pub mean_indian: f64,
    pub mean_foreign: f64,
    pub t_test: Option<TTest>,
    pub cohens_d: Option<f64>,
    pub significant: bool,
}

impl SkillComparison {
    pub fn higher_group(&self) -> Option<StudentType> {
        if self.mean_indian > self.mean_foreign {
            Some(StudentType::Indian)
        } else if self.mean_foreign > self.mean_indian {
            Some(StudentType::Foreign)
        } else {
            None
        }
    }
}

/// Size and mean score of one group within a level of study.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GroupMean {
    pub n: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LevelOutcome {
    /// Fewer respondents at this level than `min_level_size`.
    InsufficientData { n: usize },
    /// One of the groups is smaller than `min_group_size`.
    InsufficientGroups { indian: usize, foreign: usize },
    Compared {
        indian: GroupMean,
        foreign: GroupMean,
        /// Welch test; `None` when neither group's scores vary.
        t_test: Option<TTest>,
        significant: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelComparison {
    pub level: LevelOfStudy,
    pub outcome: LevelOutcome,
}

impl LevelComparison {
    pub fn is_significant(&self) -> bool {
        matches!(
            self.outcome,
            LevelOutcome::Compared {
                significant: true,
                ..
            }
        )
    }
}

/// Complete analysis results.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub alpha: f64,
    pub counts: GroupCounts,
    pub descriptives: Vec<GroupDescriptive>,
    pub normality: NormalityCheck,
    pub variance: VarianceCheck,
    pub t_test: TTest,
    pub mann_whitney: MannWhitney,
    pub anova: Anova,
    pub effect: EffectSize,
    pub equivalence: Equivalence,
    pub skills: Vec<SkillComparison>,
    pub levels: Vec<LevelComparison>,
    pub conclusion: Conclusion,
}

impl Analysis {
    /// Whether the main t-test rejects equality of the group means.
    pub fn is_significant(&self) -> bool {
        self.t_test.p_value < self.alpha
    }
}

/// Run every comparison over the cleaned respondents.
pub fn analyze(respondents: &[Respondent], settings: &AnalysisConfig) -> StatsResult<Analysis> {
    let alpha = settings.alpha;
    let counts = GroupCounts::from_respondents(respondents);
    info!(
        "Comparing {} Indian and {} foreign respondents",
        counts.indian, counts.foreign
    );

    let scores = proficiency_by_type(respondents);
    let (indian, foreign) = (scores.indian.as_slice(), scores.foreign.as_slice());

    let descriptives = StudentType::ALL
        .iter()
        .map(|&group| {
            Ok(GroupDescriptive {
                group,
                stats: describe(scores.get(group))?,
            })
        })
        .collect::<StatsResult<Vec<_>>>()?;

    let sw_indian = shapiro_wilk(indian)?;
    let sw_foreign = shapiro_wilk(foreign)?;
    let normality = NormalityCheck {
        indian: sw_indian,
        foreign: sw_foreign,
        both_normal: sw_indian.p_value > alpha && sw_foreign.p_value > alpha,
    };

    let lev = levene(&[indian, foreign])?;
    let assumption = VarianceAssumption::from_levene(lev.p_value, alpha);
    debug!("Levene p = {:.4}, assuming {}", lev.p_value, assumption);

    let t = t_test(indian, foreign, assumption)?;
    let mann_whitney = mann_whitney_u(indian, foreign)?;
    let anova = one_way_anova(&[indian, foreign])?;

    let d = cohens_d(indian, foreign)?;
    let (mean_indian, mean_foreign) = (mean(indian), mean(foreign));
    let effect = EffectSize {
        mean_indian,
        mean_foreign,
        mean_difference: (mean_indian - mean_foreign).abs(),
        cohens_d: d,
        magnitude: EffectMagnitude::classify(d),
    };

    let equivalence = equivalence_test(indian, foreign, settings.equivalence_margin, alpha)?;

    let skills = Skill::ALL
        .iter()
        .map(|&skill| compare_skill(respondents, skill, assumption, alpha))
        .collect::<StatsResult<Vec<_>>>()?;

    let levels = group_by_level(respondents)
        .into_iter()
        .map(|(level, members)| compare_level(level, &members, settings))
        .collect::<StatsResult<Vec<_>>>()?;

    let mut analysis = Analysis {
        alpha,
        counts,
        descriptives,
        normality,
        variance: VarianceCheck {
            levene: lev,
            assumption,
        },
        t_test: t,
        mann_whitney,
        anova,
        effect,
        equivalence,
        skills,
        levels,
        conclusion: Conclusion::default(),
    };
    analysis.conclusion = conclude(&analysis);

    info!(
        "t-test p = {:.4}, Cohen's d = {:.4}",
        analysis.t_test.p_value, analysis.effect.cohens_d
    );

    Ok(analysis)
}

fn compare_skill(
    respondents: &[Respondent],
    skill: Skill,
    assumption: VarianceAssumption,
    alpha: f64,
) -> StatsResult<SkillComparison> {
    let scores = skill_by_type(respondents, skill);
    let t = allow_constant(t_test(&scores.indian, &scores.foreign, assumption))?;
    let d = allow_constant(cohens_d(&scores.indian, &scores.foreign))?;

    Ok(SkillComparison {
        skill,
        mean_indian: mean(&scores.indian),
        mean_foreign: mean(&scores.foreign),
        significant: t.map_or(false, |t| t.p_value < alpha),
        t_test: t,
        cohens_d: d,
    })
}

fn compare_level(
    level: LevelOfStudy,
    members: &[&Respondent],
    settings: &AnalysisConfig,
) -> StatsResult<LevelComparison> {
    if members.len() < settings.min_level_size {
        debug!("{}: only {} respondents", level, members.len());
        return Ok(LevelComparison {
            level,
            outcome: LevelOutcome::InsufficientData { n: members.len() },
        });
    }

    let scores = GroupScores::collect(members.iter().copied(), |r| r.proficiency_score);
    if scores.indian.len() < settings.min_group_size
        || scores.foreign.len() < settings.min_group_size
    {
        return Ok(LevelComparison {
            level,
            outcome: LevelOutcome::InsufficientGroups {
                indian: scores.indian.len(),
                foreign: scores.foreign.len(),
            },
        });
    }

    let t = allow_constant(t_test(
        &scores.indian,
        &scores.foreign,
        VarianceAssumption::Unequal,
    ))?;

    Ok(LevelComparison {
        level,
        outcome: LevelOutcome::Compared {
            indian: GroupMean {
                n: scores.indian.len(),
                mean: mean(&scores.indian),
            },
            foreign: GroupMean {
                n: scores.foreign.len(),
                mean: mean(&scores.foreign),
            },
            significant: t.map_or(false, |t| t.p_value < settings.alpha),
            t_test: t,
        },
    })
}

/// Turn a zero-variance failure into `None` so one constant subgroup does
/// not abort the whole run.
fn allow_constant<T>(result: StatsResult<T>) -> StatsResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StatsError::ZeroVariance(test)) => {
            debug!("{} skipped: no variance in either group", test);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn respondent(nationality: &str, level: LevelOfStudy, ratings: [u8; 4]) -> Respondent {
        Respondent::new(nationality.to_string(), "Hindi".to_string(), level, ratings)
    }

    /// Foreign respondents rate themselves higher, mostly on speaking.
    fn sample() -> Vec<Respondent> {
        use LevelOfStudy::*;
        let mut data = vec![
            respondent("Indian", Postgraduate, [4, 3, 2, 4]),
            respondent("Indian", Postgraduate, [3, 3, 2, 3]),
            respondent("Indian", Postgraduate, [4, 4, 3, 4]),
            respondent("Indian", Postgraduate, [3, 4, 2, 3]),
            respondent("Indian", Postgraduate, [4, 3, 3, 3]),
            respondent("Indian", Undergraduate, [3, 3, 2, 4]),
            respondent("Indian", Undergraduate, [4, 4, 3, 3]),
            respondent("Indian", Postgraduate, [5, 4, 3, 4]),
            respondent("Indian", Postgraduate, [3, 3, 1, 3]),
            respondent("Indian", Postgraduate, [4, 3, 2, 4]),
        ];
        data.extend([
            respondent("Nigerian", Postgraduate, [4, 4, 5, 4]),
            respondent("Kenyan", Postgraduate, [5, 4, 5, 4]),
            respondent("Ghanaian", Postgraduate, [4, 5, 4, 4]),
            respondent("Nepalese", Postgraduate, [4, 3, 4, 3]),
            respondent("Chinese", Postgraduate, [3, 4, 4, 4]),
            respondent("Nigerian", Undergraduate, [5, 5, 5, 4]),
            respondent("Kenyan", Postgraduate, [4, 4, 4, 5]),
            respondent("Sri Lankan", Postgraduate, [4, 3, 5, 4]),
            respondent("Zambian", Postgraduate, [5, 4, 4, 4]),
        ]);
        data
    }

    fn settings() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_counts_and_descriptives() {
        let analysis = analyze(&sample(), &settings()).unwrap();
        assert_eq!(analysis.counts.indian, 10);
        assert_eq!(analysis.counts.foreign, 9);
        assert_eq!(analysis.counts.total, 19);

        let groups: Vec<_> = analysis.descriptives.iter().map(|d| d.group).collect();
        assert_eq!(groups, vec![StudentType::Indian, StudentType::Foreign]);
        assert_eq!(analysis.descriptives[0].stats.count, 10);
    }

    #[test]
    fn test_t_test_follows_levene() {
        let analysis = analyze(&sample(), &settings()).unwrap();
        let expected =
            VarianceAssumption::from_levene(analysis.variance.levene.p_value, analysis.alpha);
        assert_eq!(analysis.variance.assumption, expected);
        assert_eq!(analysis.t_test.assumption, expected);
        for skill in &analysis.skills {
            if let Some(t) = &skill.t_test {
                assert_eq!(t.assumption, expected);
            }
        }
    }

    #[test]
    fn test_effect_direction() {
        let analysis = analyze(&sample(), &settings()).unwrap();
        assert!(analysis.effect.cohens_d < 0.0);
        assert_eq!(analysis.effect.higher_group(), Some(StudentType::Foreign));
        assert!(analysis.effect.mean_difference > 0.0);
        assert!(analysis.is_significant());
    }

    #[test]
    fn test_speaking_is_significant() {
        let analysis = analyze(&sample(), &settings()).unwrap();
        let speaking = analysis
            .skills
            .iter()
            .find(|s| s.skill == Skill::Speaking)
            .unwrap();
        assert!(speaking.significant);
        assert_eq!(speaking.higher_group(), Some(StudentType::Foreign));
    }

    #[test]
    fn test_level_outcomes() {
        let analysis = analyze(&sample(), &settings()).unwrap();
        assert_eq!(analysis.levels.len(), 2);

        // 3 undergraduates: below min_level_size
        assert_eq!(analysis.levels[0].level, LevelOfStudy::Undergraduate);
        assert!(matches!(
            analysis.levels[0].outcome,
            LevelOutcome::InsufficientData { n: 3 }
        ));

        assert_eq!(analysis.levels[1].level, LevelOfStudy::Postgraduate);
        match &analysis.levels[1].outcome {
            LevelOutcome::Compared {
                indian,
                foreign,
                t_test,
                ..
            } => {
                assert_eq!(indian.n, 8);
                assert_eq!(foreign.n, 8);
                assert_eq!(t_test.unwrap().assumption, VarianceAssumption::Unequal);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_level_with_small_group() {
        let mut data = sample();
        data.extend([
            respondent("Indian", LevelOfStudy::Undergraduate, [3, 3, 3, 3]),
            respondent("Indian", LevelOfStudy::Undergraduate, [4, 3, 3, 3]),
        ]);
        let analysis = analyze(&data, &settings()).unwrap();
        assert!(matches!(
            analysis.levels[0].outcome,
            LevelOutcome::InsufficientGroups {
                indian: 4,
                foreign: 1
            }
        ));
    }

    #[test]
    fn test_constant_skill_is_not_fatal() {
        let data: Vec<_> = sample()
            .into_iter()
            .map(|mut r| {
                r.ratings[Skill::Writing.index()] = 4;
                r
            })
            .collect();
        let analysis = analyze(&data, &settings()).unwrap();
        let writing = &analysis.skills[Skill::Writing.index()];
        assert!(writing.t_test.is_none());
        assert!(!writing.significant);
    }

    #[test]
    fn test_too_few_respondents_is_an_error() {
        let data = vec![
            respondent("Indian", LevelOfStudy::Postgraduate, [4, 3, 2, 4]),
            respondent("Kenyan", LevelOfStudy::Postgraduate, [4, 4, 5, 4]),
        ];
        assert!(matches!(
            analyze(&data, &settings()),
            Err(StatsError::InsufficientData { .. })
        ));
    }
}
