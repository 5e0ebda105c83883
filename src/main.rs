//! Craft Report CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use craft_report::collector::{CompletionEvent, RunCollector};
use craft_report::config;
use craft_report::export::{capture_document, CommandSurface, ExportController, PrintOptions};
use craft_report::render::ReviewSession;
use craft_report::render::summary::format_duration;
use craft_report::report;
use craft_report::template::{self, TemplateAssets};
use craft_report::ReportError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Craft Report: test report generator with PDF export
#[derive(Parser, Debug)]
#[command(name = "craft-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the HTML report and JSON snapshot from a runner event stream
    Generate {
        /// JSON file with the recorded test-completion events
        events: PathBuf,

        /// Output directory (default: craft-report)
        #[arg(long, short)]
        out_dir: Option<PathBuf>,

        /// Report title shown in the header
        #[arg(long)]
        title: Option<String>,

        /// Open the report in a browser after generation
        #[arg(long)]
        open: bool,

        /// Logo image to embed in the header
        #[arg(long)]
        logo: Option<PathBuf>,

        /// Path to config file (default: search .craftreportrc.json upwards)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Capture a PDF from an HTML report or a JSON snapshot
    Pdf {
        /// Path to report.html or report-data.json
        input: PathBuf,

        /// Output PDF path
        #[arg(long, short, default_value = "report.pdf")]
        output: PathBuf,

        /// Page format (A4, Letter)
        #[arg(long, short, default_value = "A4")]
        format: String,

        /// Use landscape orientation
        #[arg(long, short)]
        landscape: bool,
    },

    /// Merge a comments JSON file into a report snapshot
    MergeComments {
        /// Path to the report JSON file
        report: PathBuf,

        /// Path to the comments JSON file
        comments: PathBuf,

        /// Output path (defaults to overwriting the report)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Display information about a report
    Info {
        /// Path to report HTML or JSON file
        report: PathBuf,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Commands::Generate { events, out_dir, title, open, logo, config } => {
            run_generate(&events, out_dir, title, open, logo, config.as_deref())
        }
        Commands::Pdf { input, output, format, landscape } => {
            run_pdf(&input, output, format, landscape)
        }
        Commands::MergeComments { report, comments, output } => {
            run_merge_comments(&report, &comments, output)
        }
        Commands::Info { report } => run_info(&report),
    }
}

fn run_generate(
    events_path: &Path,
    out_dir: Option<PathBuf>,
    title: Option<String>,
    open: bool,
    logo: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    let work_dir = std::env::current_dir().context("Failed to get current directory")?;
    let options = config::load_options(&work_dir, config_path)?
        .merge_with_cli(out_dir, title, open, logo);

    if !events_path.exists() {
        return Err(ReportError::InputNotFound(events_path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(events_path)
        .with_context(|| format!("Failed to read events: {}", events_path.display()))?;
    let events: Vec<CompletionEvent> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid events JSON: {}", events_path.display()))?;

    let mut collector = RunCollector::new();
    collector.on_begin(events.len());
    for event in &events {
        collector.on_test_end(event);
    }
    let comments = report::load_comments(&options.output_dir);
    let data = collector.on_end(comments);

    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("Failed to create {}", options.output_dir.display()))?;
    let json_path = report::save_report(&options.output_dir, &data)?;

    let assets = TemplateAssets::load(options.assets_dir.as_deref(), options.logo.as_deref());
    let session = ReviewSession::new(data.clone());
    let html = template::render_page(&assets, &options.title, &session.render_page_body(), &data);
    let html_path = options.output_path();
    std::fs::write(&html_path, html)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;

    println!("\n{} Test run completed", "[craft-report]".cyan());
    println!("  Total:    {}", data.total_tests);
    println!("  Passed:   {}", data.passed.to_string().green());
    println!("  Failed:   {}", data.failed.to_string().red());
    println!("  Skipped:  {}", data.skipped.to_string().yellow());
    println!("  Duration: {}", format_duration(data.duration));
    println!("\n{} Report generated: {}", "[craft-report]".cyan(), html_path.display());
    println!("{} Snapshot saved:   {}", "[craft-report]".cyan(), json_path.display());

    if options.open {
        open_in_browser(&html_path);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_pdf(input: &Path, output: PathBuf, format: String, landscape: bool) -> Result<ExitCode> {
    if !input.exists() {
        return Err(ReportError::InputNotFound(input.to_path_buf()).into());
    }
    let extension = input.extension().and_then(|e| e.to_str()).unwrap_or("");

    let print_options = PrintOptions { output_path: output.clone(), format, landscape };
    let scratch_dir = input
        .parent()
        .map(|p| p.join(".craft-report-temp"))
        .unwrap_or_else(|| PathBuf::from(".craft-report-temp"));
    let mut surface = match CommandSurface::from_env(&scratch_dir) {
        Some(surface) => surface,
        None => return Err(ReportError::NoSurface.into()),
    };

    println!("\nGenerating PDF from: {}", input.display());
    println!("Output: {}\n", output.display());

    match extension {
        "html" => {
            let document = std::fs::read_to_string(input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            capture_document(&document, &print_options, &mut surface)?;
        }
        "json" => {
            let data = report::load_report(input)?;
            let work_dir = std::env::current_dir().context("Failed to get current directory")?;
            let options = config::load_options(&work_dir, None).unwrap_or_default();
            let assets = TemplateAssets::load(options.assets_dir.as_deref(), options.logo.as_deref());
            let mut session = ReviewSession::new(data);
            let mut controller = ExportController::new().with_presentation(assets, &options.title);
            controller.export(&mut session, &mut surface, &print_options)?;
        }
        _ => return Err(ReportError::UnsupportedInput(input.to_path_buf()).into()),
    }

    println!("{}: PDF generated: {}", "Done".green().bold(), output.display());
    Ok(ExitCode::SUCCESS)
}

fn run_merge_comments(
    report_path: &Path,
    comments_path: &Path,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let data = report::load_report(report_path)?;
    let patch = report::load_comment_patch(comments_path)?;

    let merged = report::merge_comments(&data, &patch);
    let output_path = output.unwrap_or_else(|| report_path.to_path_buf());
    let content = serde_json::to_string_pretty(&merged).context("Failed to serialize report")?;
    std::fs::write(&output_path, content)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!(
        "{}: Comments merged: {}",
        "Done".green().bold(),
        output_path.display()
    );
    println!("Total comments: {}", merged.comments.len());
    Ok(ExitCode::SUCCESS)
}

fn run_info(report_path: &Path) -> Result<ExitCode> {
    let extension = report_path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let data = match extension {
        "json" => report::load_report(report_path)?,
        "html" => {
            // The HTML artifact is paired with its snapshot on disk
            let json_path = report_path
                .parent()
                .unwrap_or(Path::new("."))
                .join(report::REPORT_DATA_FILENAME);
            report::load_report(&json_path)?
        }
        _ => {
            if !report_path.exists() {
                return Err(ReportError::InputNotFound(report_path.to_path_buf()).into());
            }
            return Err(ReportError::UnsupportedInput(report_path.to_path_buf()).into());
        }
    };

    let percent = |count: usize| {
        if data.total_tests == 0 {
            0.0
        } else {
            count as f64 / data.total_tests as f64 * 100.0
        }
    };

    println!("\n=== Craft Test Report Info ===\n");
    println!("Timestamp: {}", data.timestamp);
    println!("Duration:  {}", format_duration(data.duration));
    println!();
    println!("Results:");
    println!("  Total:   {}", data.total_tests);
    println!("  Passed:  {} ({:.1}%)", data.passed, percent(data.passed));
    println!("  Failed:  {} ({:.1}%)", data.failed, percent(data.failed));
    println!("  Skipped: {} ({:.1}%)", data.skipped, percent(data.skipped));
    println!();
    println!("Comments: {} tests have comments", data.comments.len());

    let failed_tests: Vec<_> = data.tests.iter().filter(|t| t.status.is_failure()).collect();
    if !failed_tests.is_empty() {
        println!();
        println!("Failed Tests:");
        for test in failed_tests {
            println!("  - {}", test.name);
            if let Some(owner) = &test.metadata.owner {
                println!("    Owner: {}", owner);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn open_in_browser(path: &Path) {
    let command = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    if let Err(e) = std::process::Command::new(command).arg(path).spawn() {
        eprintln!(
            "{}: Could not open report in browser: {}",
            "Warning".yellow(),
            e
        );
    }
}
