//! Turning a front/back flashcard PDF into duplex print sheets

use log::info;

use crate::canvas::RecordingCanvas;
use crate::config::ImposeOptions;
use crate::emit::lay_out_sheets;
use crate::error::Result;
use crate::layout::{solve_grid, Grid};
use crate::paginate::{card_pairs, CardPair};
use crate::pdf::canvas::PdfCanvas;
use crate::pdf::source::SourceDocument;

/// What a run produced (or would produce)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImposeReport {
    /// Number of cards (front/back page pairs) in the source
    pub card_count: usize,
    /// Front/back sheet pairs in the output
    pub sheet_pairs: usize,
    /// The grid every sheet uses
    pub grid: Grid,
}

impl ImposeReport {
    /// Pages in the output document
    pub fn page_count(&self) -> usize {
        self.sheet_pairs * 2
    }
}

/// Lay out the flashcards and write the print-ready PDF
///
/// All validation happens before anything is written; on error no output
/// file is created.
///
/// # Example
///
/// ```no_run
/// use pdf_flashcards::config::ImposeOptions;
/// use pdf_flashcards::pdf::impose;
/// use std::path::PathBuf;
///
/// let options = ImposeOptions {
///     input_path: PathBuf::from("cards.pdf"),
///     output_path: PathBuf::from("sheets.pdf"),
///     ..Default::default()
/// };
///
/// let report = impose(&options).expect("Failed to lay out cards");
/// println!("{} pages", report.page_count());
/// ```
pub fn impose(options: &ImposeOptions) -> Result<ImposeReport> {
    let (source, cards, grid) = prepare(options)?;

    let mut canvas = PdfCanvas::new(&source);
    let summary = lay_out_sheets(
        &mut canvas,
        &grid,
        &cards,
        options.cut_lines,
        options.flip_back,
    )?;
    canvas.save(&options.output_path)?;

    info!(
        "Wrote {} pages to {}",
        summary.page_count(),
        options.output_path.display()
    );

    Ok(ImposeReport {
        card_count: cards.len(),
        sheet_pairs: summary.sheet_pairs,
        grid,
    })
}

/// Run the whole layout against a [`RecordingCanvas`] without writing anything
pub fn plan(options: &ImposeOptions) -> Result<ImposeReport> {
    let (_, cards, grid) = prepare(options)?;

    let mut canvas = RecordingCanvas::new();
    let summary = lay_out_sheets(
        &mut canvas,
        &grid,
        &cards,
        options.cut_lines,
        options.flip_back,
    )?;

    Ok(ImposeReport {
        card_count: cards.len(),
        sheet_pairs: summary.sheet_pairs,
        grid,
    })
}

fn prepare(options: &ImposeOptions) -> Result<(SourceDocument, Vec<CardPair>, Grid)> {
    let source = SourceDocument::open(&options.input_path)?;
    let cards = card_pairs(source.page_count())?;
    let card = source.card_size()?;
    info!(
        "{}: {} cards of {}x{}pt",
        source.path().display(),
        cards.len(),
        card.width.pt(),
        card.height.pt()
    );

    let grid = solve_grid(card, options.margin, &options.sheet)?;
    Ok((source, cards, grid))
}
