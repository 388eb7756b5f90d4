//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Proficiency Analyzer - compare English proficiency of Indian and foreign students
///
/// Reads a survey CSV, derives a proficiency score per respondent, runs
/// normality, variance, t, Mann-Whitney, ANOVA and equivalence tests, and
/// renders comparison charts.
///
/// Examples:
///   proficiency-analyzer analyze --input "data/Data Collection.csv"
///   proficiency-analyzer analyze --format json --output results.json
///   proficiency-analyzer visualize --plots-dir plots
///   proficiency-analyzer run
///   proficiency-analyzer --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Stage to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .proficiency.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .proficiency.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Pipeline stages.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Clean the survey, write the derived CSV and the statistical report
    Analyze(AnalyzeArgs),
    /// Render charts from the derived CSV
    Visualize(VisualizeArgs),
    /// Analyze, then visualize
    Run(RunArgs),
}

/// Options of the analysis stage.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Survey CSV to analyze
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Where to write the derived CSV
    #[arg(short, long, value_name = "FILE")]
    pub processed: Option<PathBuf>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Significance level for all tests
    #[arg(long, value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Equivalence margin for the TOST procedure, in score points
    #[arg(long, value_name = "POINTS")]
    pub margin: Option<f64>,
}

/// Options of the chart stage.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct VisualizeArgs {
    /// Derived CSV to read
    #[arg(short, long, value_name = "FILE")]
    pub processed: Option<PathBuf>,

    /// Directory receiving the charts
    #[arg(long, value_name = "DIR")]
    pub plots_dir: Option<PathBuf>,
}

/// Options of the full pipeline.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub analyze: AnalyzeArgs,

    /// Directory receiving the charts
    #[arg(long, value_name = "DIR")]
    pub plots_dir: Option<PathBuf>,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Analysis options of the selected command, if it runs the analysis.
    pub fn analyze_args(&self) -> Option<&AnalyzeArgs> {
        match self.command {
            Some(Command::Analyze(ref a)) => Some(a),
            Some(Command::Run(ref r)) => Some(&r.analyze),
            _ => None,
        }
    }

    /// Derived CSV override, from whichever stage was selected.
    pub fn processed_override(&self) -> Option<&PathBuf> {
        match self.command {
            Some(Command::Visualize(ref v)) => v.processed.as_ref(),
            _ => self.analyze_args().and_then(|a| a.processed.as_ref()),
        }
    }

    /// Plots directory override, from whichever stage was selected.
    pub fn plots_dir_override(&self) -> Option<&PathBuf> {
        match self.command {
            Some(Command::Visualize(ref v)) => v.plots_dir.as_ref(),
            Some(Command::Run(ref r)) => r.plots_dir.as_ref(),
            _ => None,
        }
    }

    /// Report format of the selected command.
    pub fn format(&self) -> OutputFormat {
        self.analyze_args().map(|a| a.format).unwrap_or_default()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err("A command is required: analyze, visualize or run".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(analyze) = self.analyze_args() {
            if let Some(alpha) = analyze.alpha {
                if !(alpha > 0.0 && alpha < 1.0) {
                    return Err("Alpha must be between 0 and 1".to_string());
                }
            }

            if let Some(margin) = analyze.margin {
                if !(margin > 0.0) {
                    return Err("Equivalence margin must be positive".to_string());
                }
            }

            // Validate input file if provided
            if let Some(ref input) = analyze.input {
                if !input.is_file() {
                    return Err(format!("Input file does not exist: {}", input.display()));
                }
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
