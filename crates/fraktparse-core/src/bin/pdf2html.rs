use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fraktparse_core::{
    ExtractOptions, ExtractionReport, InputFormat, Language, PageSelection, extract_tables,
    read_pdf_text, render, spreadsheet_document, tables_to_csv_string, write_tables_csv,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2html",
    version,
    about = "Extract freight price tables from PDFs or text into spreadsheet-ready HTML"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract tables and write HTML or CSV output.
    Extract(ExtractArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Html,
    Csv,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF, plain text or markdown path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// How to read the document text: auto, text or markdown.
    #[arg(long, default_value = "auto")]
    input_format: String,

    /// Page selection like 1-3,5 (PDF input only).
    #[arg(long)]
    pages: Option<String>,

    /// Literal marking page furniture lines. Repeatable; replaces the defaults.
    #[arg(long = "page-marker")]
    page_markers: Vec<String>,

    /// Re-cut single-column blocks into fixed-width chunks.
    #[arg(long)]
    fixed_width_fallback: bool,

    /// Chunk width used by the fixed-width fallback.
    #[arg(long, default_value_t = 20)]
    fixed_width: usize,

    /// Label language: nb or en.
    #[arg(long, default_value = "nb")]
    lang: String,

    /// Wrap HTML output in a spreadsheet-recognisable document.
    #[arg(long)]
    spreadsheet: bool,

    /// CSV delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    let input_format = InputFormat::from_str(&args.input_format)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --input-format")?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let mut options = ExtractOptions {
        pages,
        input_format,
        fixed_width_fallback: args.fixed_width_fallback,
        fixed_width: args.fixed_width,
        delimiter: args.delimiter as u8,
        ..ExtractOptions::default()
    };
    if !args.page_markers.is_empty() {
        options.page_markers.clone_from(&args.page_markers);
    }

    options.validate()?;
    Ok(options)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn read_document_text(path: &Path, options: &ExtractOptions) -> Result<String> {
    if is_pdf(path) {
        return read_pdf_text(path, options.pages.as_ref())
            .with_context(|| format!("failed to read PDF text from '{}'", path.display()));
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read text from '{}'", path.display()))
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {} table_id={:?} confidence={:?}: {}",
                warning.code.as_str(),
                warning.table_id,
                warning.confidence,
                warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    let language = Language::from_str(&args.lang)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --lang")?;

    let text = read_document_text(&args.input, &options)?;
    let result = extract_tables(&text, &options);

    match (args.format, &args.output) {
        (OutputFormat::Csv, Some(path)) => {
            write_tables_csv(path, &result.tables, options.delimiter, language)
                .with_context(|| format!("failed to write CSV '{}'", path.display()))?;
        }
        (OutputFormat::Csv, None) => {
            print!(
                "{}",
                tables_to_csv_string(&result.tables, options.delimiter, language)?
            );
        }
        (OutputFormat::Html, output) => {
            let fragment = render(&result.tables, language);
            let rendered = if args.spreadsheet {
                spreadsheet_document(&fragment)
            } else {
                fragment
            };
            match output {
                Some(path) => std::fs::write(path, rendered)
                    .with_context(|| format!("failed to write output '{}'", path.display()))?,
                None => println!("{rendered}"),
            }
        }
    }

    Ok(result.report())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::Extract(args) = cli.command;

    let default_level = if args.verbose {
        "fraktparse_core=debug"
    } else {
        "fraktparse_core=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match run_extract(&args) {
        Ok(report) => {
            log_report(&report, args.verbose);
            if report.table_count > 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
