//! PDF Flashcards Library
//!
//! Lays out a PDF of flashcards, where each card is a front page followed by
//! its back page, onto print-ready sheets. This library provides:
//! - A grid solver that picks the sheet orientation fitting the most cards
//! - Front sheets filled row by row
//! - Back sheets mirrored per row so each back lands behind its front after
//!   duplex printing and cutting
//! - Optional dashed cut outlines and 180° back-sheet rotation
//!
//! # Example
//!
//! ```no_run
//! use pdf_flashcards::config::ImposeOptions;
//! use pdf_flashcards::cut::CutLocation;
//! use pdf_flashcards::pdf::impose;
//! use std::path::PathBuf;
//!
//! let options = ImposeOptions {
//!     input_path: PathBuf::from("vocabulary.pdf"),
//!     output_path: PathBuf::from("vocabulary-print.pdf"),
//!     cut_lines: CutLocation::Both,
//!     ..Default::default()
//! };
//!
//! impose(&options).expect("Failed to lay out flashcards");
//! ```

pub mod canvas;
pub mod config;
pub mod cut;
pub mod emit;
pub mod error;
pub mod layout;
pub mod paginate;
pub mod pdf;

// Re-export commonly used items
pub use error::{Error, Result};
pub use pdf::{impose, plan, ImposeReport};
