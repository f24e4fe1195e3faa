//! PDF Flashcards CLI tool
//!
//! A command-line tool for laying out front/back flashcard PDFs as duplex print sheets.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::Parser;

use pdf_flashcards::config::{ImposeOptions, SheetSpec};
use pdf_flashcards::cut::CutLocation;
use pdf_flashcards::layout::Length;
use pdf_flashcards::{impose, plan, ImposeReport};

/// PDF Flashcards - Create a print-ready PDF grid of flashcards from an input PDF
#[derive(Parser)]
#[command(name = "pdf-flashcards")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Letter sheets, orientation chosen automatically
    pdf-flashcards cards.pdf print.pdf

    # A4 sheets with cut lines on both sides
    pdf-flashcards cards.pdf print.pdf --width 8.27 --height 11.69 --lines both

    # Printer flips on the long edge
    pdf-flashcards cards.pdf print.pdf --flip-back

    # Show the layout without writing anything
    pdf-flashcards cards.pdf print.pdf --dry-run")]
struct Cli {
    /// Input PDF: each card is a front page followed by its back page
    input: PathBuf,

    /// Output PDF file path
    output: PathBuf,

    /// Paper width in inches (override; requires --height)
    #[arg(long)]
    width: Option<f64>,

    /// Paper height in inches (override; requires --width)
    #[arg(long)]
    height: Option<f64>,

    /// Margin in inches
    #[arg(long, default_value_t = 0.25)]
    margin: f64,

    /// Where to place cut-lines (if any): front, back, none, both
    #[arg(long, default_value_t = CutLocation::Front)]
    lines: CutLocation,

    /// Rotate every back sheet by 180° for duplex printing
    #[arg(long)]
    flip_back: bool,

    /// Validate and print the layout without writing the output
    #[arg(long)]
    dry_run: bool,

    /// Open the output file after creation
    #[arg(long)]
    open: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = ImposeOptions {
        input_path: cli.input,
        output_path: cli.output,
        sheet: SheetSpec::from_overrides(cli.width, cli.height)?,
        margin: Length::from_inches(cli.margin),
        cut_lines: cli.lines,
        flip_back: cli.flip_back,
    };

    if cli.dry_run {
        let report = plan(&options)
            .with_context(|| format!("Cannot lay out {}", options.input_path.display()))?;
        print_report(&report);
        return Ok(());
    }

    eprintln!("Laying out {}...", options.input_path.display());

    let report = impose(&options)
        .with_context(|| format!("Cannot lay out {}", options.input_path.display()))?;
    print_report(&report);

    eprintln!("Output: {}", options.output_path.display());

    if cli.open {
        open_file(&options.output_path)
            .with_context(|| format!("Cannot open {}", options.output_path.display()))?;
    }

    Ok(())
}

fn print_report(report: &ImposeReport) {
    let grid = &report.grid;
    println!("Cards: {}", report.card_count);
    println!(
        "Sheet: {}x{}in {}",
        grid.sheet.width.inches(),
        grid.sheet.height.inches(),
        grid.orientation()
    );
    println!(
        "Grid: {} columns x {} rows ({} cards per sheet)",
        grid.cols,
        grid.rows,
        grid.cards_per_sheet()
    );
    println!("Back offset: {:.2}pt", grid.extra_width());
    println!("Pages: {} ({} sheet pairs)", report.page_count(), report.sheet_pairs);
}

/// Open a file with the system default application
fn open_file(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}
