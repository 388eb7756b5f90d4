//! Overall proficiency score per student type: box plot and violin plot.

use super::{category_label, group_color, FONT};
use crate::analysis::proficiency_by_type;
use crate::config::ChartConfig;
use crate::models::{Respondent, StudentType};
use crate::stats::descriptive::{quantile_sorted, sorted};
use crate::stats::GaussianKde;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

const GROUP_NAMES: [&str; 2] = ["Indian", "Foreign"];

/// Half the width of the widest part of a violin, in category units.
const VIOLIN_HALF_WIDTH: f64 = 0.4;

pub fn draw(respondents: &[Respondent], path: &Path, config: &ChartConfig) -> Result<()> {
    let scores = proficiency_by_type(respondents);

    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        "English Proficiency Score by Student Type",
        (FONT, 28).into_font(),
    )?;
    let panels = root.split_evenly((1, 2));
    let label = |x: &f64| category_label(&GROUP_NAMES, *x);

    let mut boxes = ChartBuilder::on(&panels[0])
        .caption("Box plot", (FONT, 20).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..1.5f64, 0.5f32..5.5f32)?;

    boxes
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(20)
        .x_label_formatter(&label)
        .x_desc("Student Type")
        .y_desc("Proficiency Score (1-5)")
        .draw()?;

    boxes.draw_series(
        StudentType::ALL
            .iter()
            .enumerate()
            .filter(|(_, group)| !scores.get(**group).is_empty())
            .map(|(i, &group)| {
                Boxplot::new_vertical(i as f64, &Quartiles::new(scores.get(group)))
                    .width(80)
                    .whisker_width(0.5)
                    .style(group_color(group).stroke_width(2))
            }),
    )?;

    let mut violins = ChartBuilder::on(&panels[1])
        .caption("Violin plot", (FONT, 20).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..1.5f64, 0.0f64..6.0f64)?;

    violins
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(20)
        .x_label_formatter(&label)
        .x_desc("Student Type")
        .y_desc("Proficiency Score (1-5)")
        .draw()?;

    for (i, &group) in StudentType::ALL.iter().enumerate() {
        let values = scores.get(group);
        if values.is_empty() {
            continue;
        }
        let center = i as f64;
        let color = group_color(group);

        let Some(kde) = GaussianKde::new(values) else {
            // No spread: a single line at the common value.
            let y = values[0];
            violins.draw_series(std::iter::once(PathElement::new(
                vec![(center - VIOLIN_HALF_WIDTH, y), (center + VIOLIN_HALF_WIDTH, y)],
                color.stroke_width(3),
            )))?;
            continue;
        };

        let (lo, hi) = kde.support(2.0);
        let curve = kde.curve(lo.max(0.0), hi.min(6.0), 200);
        let peak = curve.iter().map(|&(_, d)| d).fold(0.0, f64::max);
        let scale = VIOLIN_HALF_WIDTH / peak;

        let mut outline: Vec<(f64, f64)> = curve
            .iter()
            .map(|&(y, d)| (center - d * scale, y))
            .collect();
        outline.extend(curve.iter().rev().map(|&(y, d)| (center + d * scale, y)));

        violins.draw_series(std::iter::once(Polygon::new(
            outline.clone(),
            color.mix(0.7).filled(),
        )))?;
        outline.push(outline[0]);
        violins.draw_series(std::iter::once(PathElement::new(
            outline,
            BLACK.stroke_width(1),
        )))?;

        let ordered = sorted(values);
        for (q, style) in [
            (0.25, BLACK.mix(0.6).stroke_width(1)),
            (0.5, BLACK.stroke_width(2)),
            (0.75, BLACK.mix(0.6).stroke_width(1)),
        ] {
            let y = quantile_sorted(&ordered, q);
            let w = kde.evaluate(y) * scale;
            violins.draw_series(std::iter::once(PathElement::new(
                vec![(center - w, y), (center + w, y)],
                style,
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::tests::sample_respondents;

    #[test]
    fn test_draw_overall() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overall.svg");
        draw(&sample_respondents(), &path, &ChartConfig::default()).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Violin plot"));
        assert!(svg.contains("Indian"));
        assert!(svg.contains("Foreign"));
    }

    #[test]
    fn test_draw_overall_with_constant_group() {
        let data: Vec<_> = sample_respondents()
            .into_iter()
            .map(|r| {
                if r.student_type == StudentType::Foreign {
                    Respondent::new(r.nationality, r.first_language, r.level, [4, 4, 4, 4])
                } else {
                    r
                }
            })
            .collect();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overall.svg");
        draw(&data, &path, &ChartConfig::default()).unwrap();
        assert!(path.exists());
    }
}
