//! Proficiency Analyzer - English proficiency of Indian and foreign students
//!
//! A CLI tool that cleans a self-assessment survey, compares the two groups
//! with a battery of statistical tests and renders comparison charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (arguments, config, unreadable data, failed analysis)

mod analysis;
mod charts;
mod cli;
mod config;
mod data;
mod error;
mod models;
mod report;
mod stats;

use analysis::Analysis;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use cli::{Args, Command, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use data::ColumnIndex;
use models::{Report, ReportMetadata};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config decides the log level, so it is loaded before logging starts
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("Proficiency Analyzer v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run(&args, &config) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .proficiency.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize file paths, column names, test settings, and chart size.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems with the default file are
/// reported on stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}

/// Dispatch the selected command.
fn run(args: &Args, config: &Config) -> Result<()> {
    match args.command {
        Some(Command::Analyze(_)) => run_analysis(args, config),
        Some(Command::Visualize(_)) => run_visualize(args, config),
        Some(Command::Run(_)) => {
            run_analysis(args, config)?;
            run_visualize(args, config)
        }
        None => bail!("A command is required: analyze, visualize or run"),
    }
}

/// Progress line on stdout, unless --quiet.
fn say(args: &Args, line: &str) {
    if !args.quiet {
        println!("{}", line);
    }
}

/// Load, clean, persist and analyze the survey, then write the report.
fn run_analysis(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();
    let input = &config.general.input;

    // Step 1: Load the survey
    say(args, &format!("📥 Loading survey: {}", input.display()));
    let table = data::load_survey(input)
        .with_context(|| format!("Failed to load survey from {}", input.display()))?;
    if table.is_empty() {
        bail!("{} has no data rows", input.display());
    }
    info!("Read {} data rows", table.len());

    // Step 2: Clean it
    let index = ColumnIndex::resolve(&table.headers, &config.columns, &input.display().to_string())?;
    let cleaned = data::clean(&table, &index)?;
    info!(
        "Retained {} of {} rows ({} incomplete)",
        cleaned.respondents.len(),
        cleaned.rows_read,
        cleaned.rows_excluded
    );

    // Step 3: Persist the derived table
    let processed = &config.general.processed;
    data::write_processed(processed, &table, &index, &cleaned)
        .with_context(|| format!("Failed to write derived data to {}", processed.display()))?;
    say(args, &format!("💾 Derived data saved to: {}", processed.display()));

    // Step 4: Run the statistics
    say(args, "🔬 Running statistical tests...");
    let analysis = analysis::analyze(&cleaned.respondents, &config.analysis)
        .context("Statistical analysis failed")?;

    // Step 5: Build and save the report
    let report = Report {
        metadata: ReportMetadata {
            input_path: input.display().to_string(),
            analysis_date: Utc::now(),
            rows_read: cleaned.rows_read,
            rows_retained: cleaned.respondents.len(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        analysis,
    };

    let output = match args.format() {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Text => report::generate_text_report(&report),
    };

    let report_path = &config.general.report;
    std::fs::write(report_path, &output)
        .with_context(|| format!("Failed to write report to {}", report_path.display()))?;

    if !args.quiet {
        print_summary(&report.analysis);
        println!(
            "\n✅ Analysis complete! Report saved to: {}",
            report_path.display()
        );
    }

    Ok(())
}

/// Echo the key results to the console.
fn print_summary(analysis: &Analysis) {
    let counts = &analysis.counts;
    let t = &analysis.t_test;
    let mw = &analysis.mann_whitney;
    let effect = &analysis.effect;
    let eq = &analysis.equivalence;

    println!("\n📊 Analysis Summary:");
    println!(
        "   Respondents: {} Indian, {} foreign ({} total)",
        counts.indian, counts.foreign, counts.total
    );
    println!(
        "   t-test: t={:.4}, p-value={:.4} ({})",
        t.statistic, t.p_value, t.assumption
    );
    println!("   Mann-Whitney U: U={:.4}, p-value={:.4}", mw.statistic, mw.p_value);
    println!(
        "   Cohen's d: {:.4} ({})",
        effect.cohens_d, effect.magnitude
    );
    println!(
        "   Equivalence: {} ({:.0}% CI [{:.4}, {:.4}], bounds ±{:.1})",
        if eq.equivalent {
            "equivalent"
        } else {
            "not equivalent"
        },
        eq.confidence * 100.0,
        eq.ci_lower,
        eq.ci_upper,
        eq.margin
    );

    let significant: Vec<&str> = analysis
        .skills
        .iter()
        .filter(|s| s.significant)
        .map(|s| s.skill.short_name())
        .collect();
    if significant.is_empty() {
        println!("   Significant skills: none");
    } else {
        println!("   Significant skills: {}", significant.join(", "));
    }

    println!("\n   {}", analysis.conclusion.interpretation);
}

/// Render the charts from the derived table.
fn run_visualize(args: &Args, config: &Config) -> Result<()> {
    let processed = &config.general.processed;

    say(args, &format!("📈 Rendering charts from: {}", processed.display()));
    let respondents = data::read_processed(processed, &config.columns)
        .with_context(|| format!("Failed to read derived data from {}", processed.display()))?;
    if respondents.is_empty() {
        bail!("No respondents in {}", processed.display());
    }
    debug!("Loaded {} respondents", respondents.len());

    let plots_dir = &config.general.plots_dir;
    let written = charts::render_all(&respondents, plots_dir, &config.charts, !args.quiet)?;

    say(
        args,
        &format!(
            "✅ {} charts saved to: {}",
            written.len(),
            plots_dir.display()
        ),
    );
    Ok(())
}
