//! Error types for the flashcard layout library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the flashcard layout library
#[derive(Error, Debug)]
pub enum Error {
    /// Source cannot be split into front/back pairs
    #[error("Input PDF must have an even number of pages (found {pages})")]
    OddPageCount { pages: usize },

    /// Only one of sheet width/height was given
    #[error("Must specify both --width and --height if overriding the sheet size")]
    IncompleteSheetSize,

    /// The card does not fit on the usable print area
    #[error(
        "Flashcards ({card_width}x{card_height}pt) do not fit on a \
         {sheet_width}x{sheet_height}pt sheet with a {margin}pt margin"
    )]
    NoFit {
        card_width: f64,
        card_height: f64,
        sheet_width: f64,
        sheet_height: f64,
        margin: f64,
    },

    /// A configured or measured length is unusable
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Requested a source page that does not exist
    #[error("Page {index} is out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// General error
    #[error("{0}")]
    General(String),
}
