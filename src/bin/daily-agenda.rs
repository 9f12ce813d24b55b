//! Daily Agenda CLI tool
//!
//! A command-line tool for generating one-page-per-day agenda PDFs.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use daily_agenda::agenda::{build_agenda, build_agenda_pdf, AgendaOptions};
use daily_agenda::date::{parse_date_expression, parse_time_zone, resolve_date, today_in};
use daily_agenda::layout::PageDimensions;
use daily_agenda::logging;
use daily_agenda::pdf::{extract_metadata, RecordingSurface};
use daily_agenda::typeface::{default_candidates, FontCandidate};

/// Daily Agenda - one PDF page per day, through the end of the year
#[derive(Parser)]
#[command(name = "daily-agenda")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Agenda from today (Europe/Paris) to Dec 31
    daily-agenda build

    # Agenda from a given date, without page numbers
    daily-agenda build --start 2025-08-28 --no-page-numbers -o Agenda_2025.pdf

    # Prefer a specific font file
    daily-agenda build --font \"Inter=/home/me/fonts/Inter-Regular.ttf\"

    # List the pages without writing a file
    daily-agenda build --start 28/08/2025 --dry-run")]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Paper {
    A4,
    Letter,
}

impl From<Paper> for PageDimensions {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::A4 => PageDimensions::a4(),
            Paper::Letter => PageDimensions::letter(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an agenda PDF
    Build {
        /// Output PDF file path (default: Agenda_<year>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// First day: "today", "2025-08-28" or "28/08/2025"
        #[arg(long, default_value = "today")]
        start: String,

        /// Time zone used to decide what "today" is
        #[arg(long, default_value = "Europe/Paris")]
        tz: String,

        /// Grid cell size in points
        #[arg(long, default_value_t = 20.0)]
        cell_size: f32,

        /// Date header font size in points
        #[arg(long, default_value_t = 36.0)]
        header_size: f32,

        /// Height of the header band in points
        #[arg(long, default_value_t = 100.0)]
        top_margin: f32,

        /// Leave out page numbers
        #[arg(long)]
        no_page_numbers: bool,

        /// Paper size
        #[arg(long, value_enum, default_value = "a4")]
        paper: Paper,

        /// Preferred font as NAME=PATH (repeatable, tried before the defaults).
        /// PATH may be a glob pattern.
        #[arg(long)]
        font: Vec<String>,

        /// Compose the pages and list their headers without writing a file
        #[arg(long)]
        dry_run: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a generated agenda
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Build {
            output, start, tz, cell_size, header_size, top_margin,
            no_page_numbers, paper, font, dry_run, open,
        } => {
            cmd_build(BuildArgs {
                output, start, tz, cell_size, header_size, top_margin,
                no_page_numbers, paper, font, dry_run, open,
            })
        }
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

struct BuildArgs {
    output: Option<PathBuf>,
    start: String,
    tz: String,
    cell_size: f32,
    header_size: f32,
    top_margin: f32,
    no_page_numbers: bool,
    paper: Paper,
    font: Vec<String>,
    dry_run: bool,
    open: bool,
}

/// Open a file with the system default application
fn open_file(path: &PathBuf) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Generate the agenda
fn cmd_build(args: BuildArgs) -> Result<()> {
    let time_zone = parse_time_zone(&args.tz)?;
    let start = resolve_date(&parse_date_expression(&args.start)?, time_zone);

    let mut font_candidates = args
        .font
        .iter()
        .map(|spec| FontCandidate::parse(spec))
        .collect::<daily_agenda::Result<Vec<_>>>()?;
    font_candidates.extend(default_candidates());

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("Agenda_{}.pdf", start.year())));

    // Header baseline stays 30pt above the grid whatever the margin
    let defaults = AgendaOptions::default();
    let options = AgendaOptions {
        output_path,
        start_date: Some(start),
        time_zone,
        grid_cell_size: args.cell_size,
        header_font_size: args.header_size,
        include_page_numbers: !args.no_page_numbers,
        top_margin: args.top_margin,
        header_baseline_offset: args.top_margin - (defaults.top_margin - defaults.header_baseline_offset),
        page: args.paper.into(),
        font_candidates,
        ..defaults
    };

    if args.dry_run {
        let mut surface = RecordingSurface::new();
        let summary = build_agenda(&mut surface, &options, today_in(time_zone))?;
        for (i, page) in surface.pages().iter().enumerate() {
            if let Some((_, _, header, _, _)) = page.texts().next() {
                println!("{:>4}  {}", i + 1, header);
            }
        }
        eprintln!("{} pages, font {} (dry run, nothing written)", summary.pages, summary.typeface.name());
        return Ok(());
    }

    let summary = build_agenda_pdf(&options)
        .with_context(|| format!("failed to build {}", options.output_path.display()))?;

    eprintln!(
        "Agenda saved to {} ({} pages, {} to {}, font {})",
        summary.output_path.display(),
        summary.pages,
        summary.first_date,
        summary.last_date,
        summary.typeface.name()
    );

    if args.open {
        open_file(&summary.output_path)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let metadata = extract_metadata(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(creator) = metadata.creator {
        println!("Creator: {}", creator);
    }

    Ok(())
}
