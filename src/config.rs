//! Run configuration

use std::path::PathBuf;

use crate::cut::CutLocation;
use crate::error::{Error, Result};
use crate::layout::{Length, SheetSize};

/// Default margin on every side of the sheet
pub const DEFAULT_MARGIN_INCHES: f64 = 0.25;

/// How the output sheet size is chosen
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SheetSpec {
    /// Letter, portrait or landscape, whichever fits more cards
    #[default]
    Auto,
    /// A fixed sheet size
    Explicit(SheetSize),
}

impl SheetSpec {
    /// Build from optional width/height overrides in inches; both or neither must be given
    pub fn from_overrides(width_in: Option<f64>, height_in: Option<f64>) -> Result<Self> {
        match (width_in, height_in) {
            (None, None) => Ok(SheetSpec::Auto),
            (Some(width), Some(height)) => Ok(SheetSpec::Explicit(SheetSize {
                width: Length::from_inches(width),
                height: Length::from_inches(height),
            })),
            _ => Err(Error::IncompleteSheetSize),
        }
    }
}

/// Options for laying out a flashcard PDF
#[derive(Debug, Clone)]
pub struct ImposeOptions {
    /// Source PDF: card fronts on even pages, backs on odd pages (zero-based)
    pub input_path: PathBuf,
    /// Output PDF file path
    pub output_path: PathBuf,
    /// Output sheet size
    pub sheet: SheetSpec,
    /// Margin on every side of the sheet
    pub margin: Length,
    /// Which sheets get cut outlines
    pub cut_lines: CutLocation,
    /// Rotate every back sheet 180° for printers that flip on the long edge
    pub flip_back: bool,
}

impl Default for ImposeOptions {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_path: PathBuf::new(),
            sheet: SheetSpec::Auto,
            margin: Length::from_inches(DEFAULT_MARGIN_INCHES),
            cut_lines: CutLocation::Front,
            flip_back: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_overrides() {
        assert_eq!(SheetSpec::from_overrides(None, None).unwrap(), SheetSpec::Auto);

        let spec = SheetSpec::from_overrides(Some(11.0), Some(17.0)).unwrap();
        assert_eq!(
            spec,
            SheetSpec::Explicit(SheetSize {
                width: Length::from_pt(792.0),
                height: Length::from_pt(1224.0),
            })
        );
    }

    #[test]
    fn test_incomplete_override() {
        assert!(matches!(
            SheetSpec::from_overrides(Some(8.5), None),
            Err(Error::IncompleteSheetSize)
        ));
        assert!(matches!(
            SheetSpec::from_overrides(None, Some(11.0)),
            Err(Error::IncompleteSheetSize)
        ));
    }

    #[test]
    fn test_defaults() {
        let options = ImposeOptions::default();
        assert_eq!(options.margin.pt(), 18.0);
        assert_eq!(options.cut_lines, CutLocation::Front);
        assert!(!options.flip_back);
        assert_eq!(options.sheet, SheetSpec::Auto);
    }
}
