//! Proficiency by level of study and student type.

use super::{category_label, group_color, mean_ci, FONT};
use crate::analysis::grouping::{group_by_level, GroupScores};
use crate::config::ChartConfig;
use crate::models::{LevelOfStudy, Respondent, StudentType};
use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const GROUP_OFFSET: f64 = 0.2;
const BAR_WIDTH: f64 = 0.35;

fn offset(group: StudentType) -> f64 {
    match group {
        StudentType::Indian => -GROUP_OFFSET,
        StudentType::Foreign => GROUP_OFFSET,
    }
}

pub fn draw(respondents: &[Respondent], path: &Path, config: &ChartConfig) -> Result<()> {
    let levels: Vec<(LevelOfStudy, GroupScores)> = group_by_level(respondents)
        .into_iter()
        .map(|(level, members)| {
            (
                level,
                GroupScores::collect(members.iter().copied(), |r| r.proficiency_score),
            )
        })
        .collect();
    let names: Vec<&str> = levels.iter().map(|(level, _)| level.as_str()).collect();
    let x_range = -0.6f64..(levels.len() as f64 - 0.4);

    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        "English Proficiency by Level of Study",
        (FONT, 28).into_font(),
    )?;
    let panels = root.split_evenly((1, 2));
    let label = |x: &f64| category_label(&names, *x);

    let mut boxes = ChartBuilder::on(&panels[0])
        .caption("Score distribution", (FONT, 20).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range.clone(), 0.5f32..5.5f32)?;

    boxes
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(40)
        .x_label_formatter(&label)
        .x_desc("Level of Study")
        .y_desc("Proficiency Score (1-5)")
        .draw()?;

    for group in StudentType::ALL {
        let color = group_color(group);
        boxes
            .draw_series(
                levels
                    .iter()
                    .enumerate()
                    .filter(|(_, (_, scores))| !scores.get(group).is_empty())
                    .map(|(i, (_, scores))| {
                        Boxplot::new_vertical(
                            i as f64 + offset(group),
                            &Quartiles::new(scores.get(group)),
                        )
                        .width(50)
                        .whisker_width(0.5)
                        .style(color.stroke_width(2))
                    }),
            )?
            .label(group.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    boxes
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    // Mean, CI half-width and size per (level, group)
    let mut stats = Vec::new();
    for (i, (_, scores)) in levels.iter().enumerate() {
        for group in StudentType::ALL {
            let values = scores.get(group);
            if values.is_empty() {
                continue;
            }
            let (mean, half) = mean_ci(values)?;
            stats.push((i as f64 + offset(group), group, mean, half, values.len()));
        }
    }
    let top = stats
        .iter()
        .map(|&(_, _, mean, half, _)| mean + half)
        .fold(5.0, f64::max);

    let mut bars = ChartBuilder::on(&panels[1])
        .caption("Mean score with 95% CI", (FONT, 20).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, 0.0f64..top * 1.15)?;

    bars.configure_mesh()
        .disable_x_mesh()
        .x_labels(40)
        .x_label_formatter(&label)
        .x_desc("Level of Study")
        .y_desc("Mean proficiency score")
        .draw()?;

    for group in StudentType::ALL {
        let color = group_color(group);
        bars.draw_series(
            stats
                .iter()
                .filter(|s| s.1 == group)
                .map(|&(x, _, mean, _, _)| {
                    Rectangle::new(
                        [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, mean)],
                        color.filled(),
                    )
                }),
        )?
        .label(group.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    bars.draw_series(
        stats
            .iter()
            .filter(|s| s.3 > 0.0)
            .map(|&(x, _, mean, half, _)| {
                ErrorBar::new_vertical(x, mean - half, mean, mean + half, BLACK.stroke_width(1), 10)
            }),
    )?;

    let annotation = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    bars.draw_series(stats.iter().map(|&(x, _, mean, half, n)| {
        Text::new(format!("n={}", n), (x, mean + half + 0.05), annotation.clone())
    }))?;

    bars.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tests::sample_respondents;

    #[test]
    fn test_group_offsets_are_symmetric() {
        assert_eq!(offset(StudentType::Indian), -offset(StudentType::Foreign));
    }

    #[test]
    fn test_draw_levels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("levels.svg");
        draw(&sample_respondents(), &path, &ChartConfig::default()).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Undergraduate"));
        assert!(svg.contains("Postgraduate"));
        assert!(svg.contains("n=4"));
        assert!(svg.contains("n=3"));
    }

    #[test]
    fn test_draw_levels_with_missing_group() {
        let data: Vec<_> = sample_respondents()
            .into_iter()
            .filter(|r| {
                !(r.level == LevelOfStudy::Undergraduate && r.student_type == StudentType::Foreign)
            })
            .collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("levels.svg");
        draw(&data, &path, &ChartConfig::default()).unwrap();
        assert!(path.exists());
    }
}
