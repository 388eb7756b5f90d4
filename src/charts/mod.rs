//! Chart rendering.
//!
//! Draws the four comparison figures as SVG files from the derived
//! respondent table.

pub mod levels;
pub mod overall;
pub mod skills;
pub mod speaking;

use crate::config::ChartConfig;
use crate::models::{Respondent, StudentType};
use crate::stats::{dist::t_quantile, mean, standard_error};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

pub const OVERALL_FILE: &str = "overall_proficiency.svg";
pub const SKILLS_FILE: &str = "skill_comparison.svg";
pub const LEVELS_FILE: &str = "study_level_comparison.svg";
pub const SPEAKING_FILE: &str = "speaking_skills_focus.svg";

/// Set2 qualitative palette.
pub(crate) const PALETTE: [RGBColor; 4] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
];

pub(crate) const FONT: &str = "sans-serif";

pub(crate) fn group_color(group: StudentType) -> RGBColor {
    match group {
        StudentType::Indian => PALETTE[0],
        StudentType::Foreign => PALETTE[1],
    }
}

/// Label for a category axis drawn on `f64` coordinates: the category name
/// at whole numbers, nothing in between.
pub(crate) fn category_label(names: &[&str], x: f64) -> String {
    if (x - x.round()).abs() > 1e-6 || x.round() < 0.0 {
        return String::new();
    }
    names
        .get(x.round() as usize)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Mean and 95% confidence half-width, `t(0.975, n-1) * SE`.
///
/// The half-width is zero for samples too small to estimate it.
pub(crate) fn mean_ci(values: &[f64]) -> Result<(f64, f64)> {
    if values.len() < 2 {
        return Ok((mean(values), 0.0));
    }
    let q = t_quantile(0.975, (values.len() - 1) as f64)?;
    Ok((mean(values), q * standard_error(values)))
}

/// Render every chart into `plots_dir`, creating it if needed.
pub fn render_all(
    respondents: &[Respondent],
    plots_dir: &Path,
    config: &ChartConfig,
    show_progress: bool,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(plots_dir)
        .with_context(|| format!("Failed to create plots directory {}", plots_dir.display()))?;

    type Draw = fn(&[Respondent], &Path, &ChartConfig) -> Result<()>;
    let charts: [(&'static str, Draw); 4] = [
        (OVERALL_FILE, overall::draw),
        (SKILLS_FILE, skills::draw),
        (LEVELS_FILE, levels::draw),
        (SPEAKING_FILE, speaking::draw),
    ];

    let progress_bar = if show_progress {
        let pb = ProgressBar::new(charts.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut written = Vec::with_capacity(charts.len());
    for (file, draw) in charts {
        let path = plots_dir.join(file);
        if let Some(ref pb) = progress_bar {
            pb.set_message(file);
        }

        draw(respondents, &path, config)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        info!("Saved {}", path.display());
        written.push(path);

        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Charts complete");
    }

    Ok(written)
}
