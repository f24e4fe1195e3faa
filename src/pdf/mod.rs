//! PDF input and output using lopdf

pub mod canvas;
pub mod impose;
pub mod source;

// Re-export commonly used items
pub use canvas::PdfCanvas;
pub use impose::{impose, plan, ImposeReport};
pub use source::{PageBox, SourceDocument};
