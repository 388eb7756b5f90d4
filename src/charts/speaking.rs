//! Speaking skills focus: speaking rating densities per group, and the four
//! skills side by side among Indian students.

use super::{category_label, group_color, FONT, PALETTE};
use crate::analysis::skill_by_type;
use crate::config::ChartConfig;
use crate::models::{Respondent, Skill, StudentType};
use crate::stats::GaussianKde;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

const DENSITY_POINTS: usize = 200;

pub fn draw(respondents: &[Respondent], path: &Path, config: &ChartConfig) -> Result<()> {
    let speaking = skill_by_type(respondents, Skill::Speaking);

    let densities: Vec<(StudentType, Vec<(f64, f64)>)> = StudentType::ALL
        .iter()
        .filter_map(|&group| match GaussianKde::new(speaking.get(group)) {
            Some(kde) => {
                let (lo, hi) = kde.support(3.0);
                Some((group, kde.curve(lo, hi, DENSITY_POINTS)))
            }
            None => {
                debug!("No speaking density for {} students", group);
                None
            }
        })
        .collect();

    let (x_lo, x_hi) = densities
        .iter()
        .flat_map(|(_, curve)| curve.iter().map(|&(x, _)| x))
        .fold((0.5f64, 5.5f64), |(lo, hi), x| (lo.min(x), hi.max(x)));
    let y_hi = densities
        .iter()
        .flat_map(|(_, curve)| curve.iter().map(|&(_, d)| d))
        .fold(0.0f64, f64::max)
        .max(0.1);

    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Speaking Skills Focus", (FONT, 28).into_font())?;
    let panels = root.split_evenly((1, 2));

    let mut density = ChartBuilder::on(&panels[0])
        .caption("Speaking rating density", (FONT, 20).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, 0.0f64..y_hi * 1.1)?;

    density
        .configure_mesh()
        .x_desc("Speaking rating (1-5)")
        .y_desc("Density")
        .draw()?;

    for (group, curve) in &densities {
        let color = group_color(*group);
        density
            .draw_series(
                AreaSeries::new(curve.iter().copied(), 0.0, color.mix(0.35)).border_style(color),
            )?
            .label(group.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    density
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let names: Vec<&str> = Skill::ALL.iter().map(|s| s.short_name()).collect();
    let label = |x: &f64| category_label(&names, *x);

    let mut skills = ChartBuilder::on(&panels[1])
        .caption("Skill ratings of Indian students", (FONT, 20).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.6f64..3.6f64, 0.5f32..5.5f32)?;

    skills
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(40)
        .x_label_formatter(&label)
        .x_desc("Skill")
        .y_desc("Rating (1-5)")
        .draw()?;

    let indian: Vec<(Skill, Vec<f64>)> = Skill::ALL
        .iter()
        .map(|&skill| {
            let scores = skill_by_type(respondents, skill);
            (skill, scores.indian)
        })
        .filter(|(_, values)| !values.is_empty())
        .collect();

    skills.draw_series(indian.iter().map(|(skill, values)| {
        Boxplot::new_vertical(skill.index() as f64, &Quartiles::new(values.as_slice()))
            .width(50)
            .whisker_width(0.5)
            .style(PALETTE[skill.index()].stroke_width(2))
    }))?;

    root.present()?;
    Ok(())
}
