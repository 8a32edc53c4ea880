use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use apidocs_markdown_converter::batch::{BatchReport, convert_directory};
use apidocs_markdown_converter::converter::ConversionOptions;
use apidocs_markdown_converter::error::BatchError;

#[derive(Parser)]
#[command(name = "apidocs2md")]
#[command(about = "Convert a directory of generated API-reference HTML pages to Markdown")]
#[command(version)]
struct Cli {
    /// Directory containing the .html pages
    #[arg(short = 'p', long)]
    path: PathBuf,

    /// Directory the .md files are written to (created if missing)
    #[arg(short = 'o', long)]
    out_path: PathBuf,

    /// Language tag for fenced code blocks
    #[arg(long, default_value = "csharp")]
    code_language: String,

    /// Spaces per tab inside code blocks
    #[arg(long, default_value = "5")]
    tab_width: usize,

    /// Keep template chrome (header, sidebar, feedback, footer)
    #[arg(long)]
    no_sanitize: bool,
}

fn main() -> Result<ExitCode> {
    // Log to stderr to keep stdout for the summary
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ConversionOptions {
        code_language: cli.code_language,
        tab_width: cli.tab_width,
        sanitize: !cli.no_sanitize,
        ..Default::default()
    };

    let report = match convert_directory(&cli.path, &cli.out_path, &options) {
        Ok(report) => report,
        Err(e @ BatchError::SourceMissing(_)) => {
            eprintln!("{}", e);
            let code = u8::try_from(e.exit_code()).unwrap_or(1);
            return Ok(ExitCode::from(code));
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to convert {} into {}",
                    cli.path.display(),
                    cli.out_path.display()
                )
            });
        }
    };

    print_summary(&report).context("Failed to write summary")?;
    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &BatchReport) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(
        out,
        "Converted {} in {:.2}s. Successful: {} | Failed {}",
        report.total,
        report.elapsed.as_secs_f64(),
        report.succeeded,
        report.failed.len()
    )?;
    if !report.failed.is_empty() {
        writeln!(out, "Failed files:")?;
        for failure in &report.failed {
            writeln!(out, "  {}: {}", failure.path.display(), failure.reason)?;
        }
    }
    Ok(())
}
