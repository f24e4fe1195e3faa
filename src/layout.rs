//! Sheet geometry and the grid solver
//!
//! All coordinates here use a top-left origin with y growing downwards,
//! measured in PDF points. The PDF canvas converts to the bottom-left origin
//! when it writes content streams.

use std::fmt;

use log::{debug, info, warn};

use crate::config::SheetSpec;
use crate::error::{Error, Result};

/// Points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Simple length type in points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from points
    pub fn from_pt(pt: f64) -> Self {
        Length(pt)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * POINTS_PER_INCH)
    }

    /// Get the value in points
    pub fn pt(&self) -> f64 {
        self.0
    }

    /// Get the value in inches
    pub fn inches(&self) -> f64 {
        self.0 / POINTS_PER_INCH
    }
}

/// Sheet orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// Dimensions of an output sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetSize {
    pub width: Length,
    pub height: Length,
}

impl SheetSize {
    /// US Letter size, portrait (8.5" × 11")
    pub fn letter() -> Self {
        Self {
            width: Length::from_inches(8.5),
            height: Length::from_inches(11.0),
        }
    }

    /// Same sheet turned on its side
    pub fn rotated(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.width.pt() > self.height.pt() {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// Size of one card, taken from the source document's pages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSize {
    pub width: Length,
    pub height: Length,
}

impl CardSize {
    pub fn from_pt(width: f64, height: f64) -> Self {
        Self {
            width: Length::from_pt(width),
            height: Length::from_pt(height),
        }
    }
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, width: f64, height: f64) -> Self {
        Self {
            x0,
            y0,
            x1: x0 + width,
            y1: y0 + height,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// The rows × columns tiling of cards on a sheet
///
/// Computed once per run and passed by value to the emitters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub sheet: SheetSize,
    pub margin: Length,
    pub card: CardSize,
}

impl Grid {
    /// Floor-divide the print area by the card size. May yield zero rows or columns.
    fn fit(card: CardSize, sheet: SheetSize, margin: Length) -> Self {
        let print_width = sheet.width.pt() - 2.0 * margin.pt();
        let print_height = sheet.height.pt() - 2.0 * margin.pt();

        Self {
            rows: whole_cards(print_height, card.height.pt()),
            cols: whole_cards(print_width, card.width.pt()),
            sheet,
            margin,
            card,
        }
    }

    /// Sheet width minus the margin on both sides
    pub fn print_width(&self) -> f64 {
        self.sheet.width.pt() - 2.0 * self.margin.pt()
    }

    /// Sheet height minus the margin on both sides
    pub fn print_height(&self) -> f64 {
        self.sheet.height.pt() - 2.0 * self.margin.pt()
    }

    pub fn cards_per_sheet(&self) -> usize {
        self.rows * self.cols
    }

    /// A grid with no rows or no columns must never be used to emit pages
    pub fn is_usable(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }

    pub fn orientation(&self) -> Orientation {
        self.sheet.orientation()
    }

    /// Horizontal correction added to every back-sheet cell.
    ///
    /// This is the IEEE remainder of the print width by the card width, so it
    /// is negative whenever the print width is closer to the next multiple of
    /// the card width. Back cells then shift left instead of right. Kept as-is
    /// for compatibility with sheets printed by earlier releases; changing the
    /// correction only needs this function to change.
    pub fn extra_width(&self) -> f64 {
        libm::remainder(self.print_width(), self.card.width.pt())
    }

    /// Card-sized rectangle of the cell at (row, col), before any back-sheet offset
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        let x0 = self.margin.pt() + col as f64 * self.card.width.pt();
        let y0 = self.margin.pt() + row as f64 * self.card.height.pt();
        Rect::new(x0, y0, self.card.width.pt(), self.card.height.pt())
    }

    /// Number of sheet pairs needed for `cards` card pairs
    pub fn sheet_count(&self, cards: usize) -> usize {
        let per_sheet = self.cards_per_sheet();
        if per_sheet == 0 {
            return 0;
        }
        cards.div_ceil(per_sheet)
    }
}

/// Choose the sheet size and grid for a card.
///
/// In auto mode both orientations of US Letter are tried and landscape only
/// wins when it fits strictly more cards. Fails with [`Error::NoFit`] when the
/// chosen grid has no rows or no columns.
pub fn solve_grid(card: CardSize, margin: Length, sheet: &SheetSpec) -> Result<Grid> {
    check_positive("card width", card.width.pt())?;
    check_positive("card height", card.height.pt())?;
    if !margin.pt().is_finite() || margin.pt() < 0.0 {
        return Err(Error::InvalidDimension(format!(
            "margin must be zero or positive, got {}pt",
            margin.pt()
        )));
    }

    let grid = match sheet {
        SheetSpec::Auto => {
            let portrait = Grid::fit(card, SheetSize::letter(), margin);
            let landscape = Grid::fit(card, SheetSize::letter().rotated(), margin);
            debug!(
                "Portrait fits {}x{} cards, landscape fits {}x{}",
                portrait.cols, portrait.rows, landscape.cols, landscape.rows
            );

            if landscape.cards_per_sheet() > portrait.cards_per_sheet() {
                landscape
            } else {
                portrait
            }
        }
        SheetSpec::Explicit(size) => {
            check_positive("sheet width", size.width.pt())?;
            check_positive("sheet height", size.height.pt())?;
            Grid::fit(card, *size, margin)
        }
    };

    if !grid.is_usable() {
        return Err(Error::NoFit {
            card_width: card.width.pt(),
            card_height: card.height.pt(),
            sheet_width: grid.sheet.width.pt(),
            sheet_height: grid.sheet.height.pt(),
            margin: margin.pt(),
        });
    }

    info!(
        "Using {} {}x{}pt sheets with {} columns x {} rows",
        grid.orientation(),
        grid.sheet.width.pt(),
        grid.sheet.height.pt(),
        grid.cols,
        grid.rows
    );
    if grid.extra_width() < 0.0 {
        warn!(
            "Back sheet offset is negative ({:.2}pt); backs shift left of the front grid",
            grid.extra_width()
        );
    }

    Ok(grid)
}

fn whole_cards(span: f64, card: f64) -> usize {
    if span <= 0.0 {
        return 0;
    }
    (span / card).floor() as usize
}

fn check_positive(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidDimension(format!("{what} must be positive, got {value}pt")))
    }
}
