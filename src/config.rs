//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.proficiency.toml` files.

use crate::models::Skill;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".proficiency.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// File locations.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Survey column headers.
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Statistical settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Raw survey CSV.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Derived CSV written by `analyze` and read by `visualize`.
    #[serde(default = "default_processed")]
    pub processed: PathBuf,

    /// Report file.
    #[serde(default = "default_report")]
    pub report: PathBuf,

    /// Directory receiving the charts.
    #[serde(default = "default_plots_dir")]
    pub plots_dir: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            processed: default_processed(),
            report: default_report(),
            plots_dir: default_plots_dir(),
            verbose: false,
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("data/Data Collection.csv")
}

fn default_processed() -> PathBuf {
    PathBuf::from("processed_proficiency_data.csv")
}

fn default_report() -> PathBuf {
    PathBuf::from("proficiency_analysis_results.txt")
}

fn default_plots_dir() -> PathBuf {
    PathBuf::from("plots")
}

/// Header names of the survey columns used by the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    #[serde(default = "default_nationality")]
    pub nationality: String,

    #[serde(default = "default_first_language")]
    pub first_language: String,

    #[serde(default = "default_level_of_study")]
    pub level_of_study: String,

    #[serde(default = "default_reading")]
    pub reading: String,

    #[serde(default = "default_listening")]
    pub listening: String,

    #[serde(default = "default_speaking")]
    pub speaking: String,

    #[serde(default = "default_writing")]
    pub writing: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            nationality: default_nationality(),
            first_language: default_first_language(),
            level_of_study: default_level_of_study(),
            reading: default_reading(),
            listening: default_listening(),
            speaking: default_speaking(),
            writing: default_writing(),
        }
    }
}

impl ColumnConfig {
    /// Header of the column holding the given skill rating.
    pub fn skill(&self, skill: Skill) -> &str {
        match skill {
            Skill::Reading => &self.reading,
            Skill::Listening => &self.listening,
            Skill::Speaking => &self.speaking,
            Skill::Writing => &self.writing,
        }
    }
}

fn default_nationality() -> String {
    "Nationality".to_string()
}

fn default_first_language() -> String {
    "First Language".to_string()
}

fn default_level_of_study() -> String {
    "Level of Study".to_string()
}

fn default_reading() -> String {
    "Reading Comprehension \n(Understanding academic text)".to_string()
}

fn default_listening() -> String {
    "Listening Skills (Understanding lectures and spoken English)".to_string()
}

fn default_speaking() -> String {
    "Speaking Skills (Fluency and confidence in spoken communication)".to_string()
}

fn default_writing() -> String {
    "Writing Skills (Ability to write academic papers and assignments)".to_string()
}

/// Statistical settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Significance level for every test.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Half-width of the TOST equivalence interval, in score points.
    #[serde(default = "default_margin")]
    pub equivalence_margin: f64,

    /// Respondents needed at a level of study before it is compared.
    #[serde(default = "default_min_level_size")]
    pub min_level_size: usize,

    /// Respondents needed in each group at a level of study.
    #[serde(default = "default_min_group_size")]
    pub min_group_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            equivalence_margin: default_margin(),
            min_level_size: default_min_level_size(),
            min_group_size: default_min_group_size(),
        }
    }
}

fn default_alpha() -> f64 {
    0.05
}

fn default_margin() -> f64 {
    0.5
}

fn default_min_level_size() -> usize {
    5
}

fn default_min_group_size() -> usize {
    3
}

/// Chart rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Width of each chart in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Height of each chart in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    900
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let alpha = self.analysis.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            bail!("analysis.alpha must be between 0 and 1, got {}", alpha);
        }
        if !(self.analysis.equivalence_margin > 0.0) {
            bail!(
                "analysis.equivalence_margin must be positive, got {}",
                self.analysis.equivalence_margin
            );
        }
        if self.charts.width < 200 || self.charts.height < 200 {
            bail!(
                "chart dimensions must be at least 200x200, got {}x{}",
                self.charts.width,
                self.charts.height
            );
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(analyze) = args.analyze_args() {
            if let Some(ref input) = analyze.input {
                self.general.input = input.clone();
            }
            if let Some(ref output) = analyze.output {
                self.general.report = output.clone();
            }
            if let Some(alpha) = analyze.alpha {
                self.analysis.alpha = alpha;
            }
            if let Some(margin) = analyze.margin {
                self.analysis.equivalence_margin = margin;
            }
        }

        if let Some(processed) = args.processed_override() {
            self.general.processed = processed.clone();
        }
        if let Some(plots_dir) = args.plots_dir_override() {
            self.general.plots_dir = plots_dir.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
