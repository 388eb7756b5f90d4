//! Per-skill comparison: grouped bars with 95% confidence intervals, and a
//! radar chart of the same means.

use super::{category_label, group_color, mean_ci, FONT};
use crate::analysis::skill_by_type;
use crate::config::ChartConfig;
use crate::models::{Respondent, Skill, StudentType};
use anyhow::Result;
use plotters::prelude::*;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::path::Path;

const BAR_WIDTH: f64 = 0.35;

/// Mean and CI half-width of every skill, per group.
struct SkillMeans {
    group: StudentType,
    values: [(f64, f64); 4],
}

fn skill_means(respondents: &[Respondent]) -> Result<Vec<SkillMeans>> {
    let by_skill: Vec<_> = Skill::ALL
        .iter()
        .map(|&skill| skill_by_type(respondents, skill))
        .collect();

    StudentType::ALL
        .iter()
        .map(|&group| {
            let mut values = [(0.0, 0.0); 4];
            for (slot, scores) in values.iter_mut().zip(&by_skill) {
                *slot = mean_ci(scores.get(group))?;
            }
            Ok(SkillMeans { group, values })
        })
        .collect()
}

/// Point on the radar chart for `value` (0..=5) on spoke `index`.
fn radar_point(index: usize, value: f64) -> (f64, f64) {
    let angle = FRAC_PI_2 - TAU * index as f64 / Skill::ALL.len() as f64;
    let r = value / 5.0;
    (r * angle.cos(), r * angle.sin())
}

pub fn draw(respondents: &[Respondent], path: &Path, config: &ChartConfig) -> Result<()> {
    let means = skill_means(respondents)?;
    let names: Vec<&str> = Skill::ALL.iter().map(|s| s.short_name()).collect();

    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        "English Skill Ratings by Student Type",
        (FONT, 28).into_font(),
    )?;
    let panels = root.split_evenly((1, 2));

    let top = means
        .iter()
        .flat_map(|m| m.values.iter().map(|&(mean, half)| mean + half))
        .filter(|v| v.is_finite())
        .fold(5.0, f64::max);

    let label = |x: &f64| category_label(&names, *x);
    let mut bars = ChartBuilder::on(&panels[0])
        .caption("Mean rating with 95% CI", (FONT, 20).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.6f64..3.6f64, 0.0f64..top * 1.1)?;

    bars.configure_mesh()
        .disable_x_mesh()
        .x_labels(40)
        .x_label_formatter(&label)
        .x_desc("Skill")
        .y_desc("Mean rating (1-5)")
        .draw()?;

    for (g, series) in means.iter().enumerate() {
        let color = group_color(series.group);
        let offset = (g as f64 - 0.5) * BAR_WIDTH;

        bars.draw_series(series.values.iter().enumerate().map(|(k, &(mean, _))| {
            let x = k as f64 + offset;
            Rectangle::new(
                [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, mean)],
                color.filled(),
            )
        }))?
        .label(series.group.as_str())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        bars.draw_series(
            series
                .values
                .iter()
                .enumerate()
                .filter(|(_, value)| value.1 > 0.0)
                .map(|(k, &(mean, half))| {
                    ErrorBar::new_vertical(
                        k as f64 + offset,
                        mean - half,
                        mean,
                        mean + half,
                        BLACK.stroke_width(1),
                        10,
                    )
                }),
        )?;
    }

    bars.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let mut radar = ChartBuilder::on(&panels[1])
        .caption("Skill profile", (FONT, 20).into_font())
        .margin(15)
        .build_cartesian_2d(-1.4f64..1.4f64, -1.3f64..1.3f64)?;

    let spokes = Skill::ALL.len();
    for ring in 1..=5 {
        let mut points: Vec<_> = (0..spokes).map(|k| radar_point(k, ring as f64)).collect();
        points.push(points[0]);
        radar.draw_series(std::iter::once(PathElement::new(points, BLACK.mix(0.2))))?;
    }
    for (k, skill) in Skill::ALL.iter().enumerate() {
        radar.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), radar_point(k, 5.0)],
            BLACK.mix(0.3),
        )))?;
        let (x, y) = radar_point(k, 5.6);
        radar.draw_series(std::iter::once(Text::new(
            skill.short_name(),
            (x - 0.12, y + 0.03),
            (FONT, 16).into_font(),
        )))?;
    }

    for series in &means {
        let color = group_color(series.group);
        let mut points: Vec<_> = series
            .values
            .iter()
            .enumerate()
            .map(|(k, &(mean, _))| radar_point(k, mean))
            .collect();

        radar
            .draw_series(std::iter::once(Polygon::new(
                points.clone(),
                color.mix(0.25).filled(),
            )))?
            .label(series.group.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        points.push(points[0]);
        radar.draw_series(std::iter::once(PathElement::new(
            points,
            color.stroke_width(2),
        )))?;
    }

    radar
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
