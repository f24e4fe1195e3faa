//! Document canvas capability
//!
//! The layout core only talks to output documents through [`DocumentCanvas`],
//! so the grid solver, paginator and emitters never depend on lopdf directly.
//! [`RecordingCanvas`] implements the trait by remembering every call.

use crate::cut::LineStyle;
use crate::error::{Error, Result};
use crate::layout::{Rect, SheetSize};

/// A point in top-left-origin sheet coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Page display rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarters,
}

impl Rotation {
    pub fn degrees(self) -> i64 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarters => 270,
        }
    }

    /// Quarter turns swap a page's displayed width and height
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarters)
    }

    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Quarter),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::ThreeQuarters),
            _ => Err(Error::General(format!(
                "Rotation must be a multiple of 90 degrees, got {degrees}"
            ))),
        }
    }
}

/// Handle to a page created on a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetId(pub usize);

/// Output-side operations the emitters need from a document library
pub trait DocumentCanvas {
    /// Append a blank page of the given size
    fn new_page(&mut self, size: SheetSize) -> Result<SheetId>;

    /// Draw page `source_page` (zero-based) of the source document so that it
    /// exactly fills `rect` on `sheet`
    fn embed_page(&mut self, sheet: SheetId, source_page: usize, rect: Rect) -> Result<()>;

    /// Set the display rotation of a page
    fn set_rotation(&mut self, sheet: SheetId, rotation: Rotation) -> Result<()>;

    /// Draw a styled line segment
    fn draw_line(&mut self, sheet: SheetId, from: Point, to: Point, style: &LineStyle) -> Result<()>;
}

/// One recorded canvas call
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    NewPage { sheet: SheetId, size: SheetSize },
    Embed { sheet: SheetId, source_page: usize, rect: Rect },
    Rotate { sheet: SheetId, rotation: Rotation },
    Line { sheet: SheetId, from: Point, to: Point, style: LineStyle },
}

/// Canvas that writes nothing and keeps a log of every call
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<CanvasOp>,
    pages: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Embedded source pages and their rects on one sheet, in call order
    pub fn embeds_on(&self, sheet: SheetId) -> Vec<(usize, Rect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Embed { sheet: s, source_page, rect } if *s == sheet => {
                    Some((*source_page, *rect))
                }
                _ => None,
            })
            .collect()
    }

    pub fn lines_on(&self, sheet: SheetId) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, CanvasOp::Line { sheet: s, .. } if *s == sheet))
            .count()
    }

    pub fn rotation_of(&self, sheet: SheetId) -> Rotation {
        self.ops
            .iter()
            .rev()
            .find_map(|op| match op {
                CanvasOp::Rotate { sheet: s, rotation } if *s == sheet => Some(*rotation),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn check(&self, sheet: SheetId) -> Result<()> {
        if sheet.0 < self.pages {
            Ok(())
        } else {
            Err(Error::PageOutOfRange { index: sheet.0, count: self.pages })
        }
    }
}

impl DocumentCanvas for RecordingCanvas {
    fn new_page(&mut self, size: SheetSize) -> Result<SheetId> {
        let sheet = SheetId(self.pages);
        self.pages += 1;
        self.ops.push(CanvasOp::NewPage { sheet, size });
        Ok(sheet)
    }

    fn embed_page(&mut self, sheet: SheetId, source_page: usize, rect: Rect) -> Result<()> {
        self.check(sheet)?;
        self.ops.push(CanvasOp::Embed { sheet, source_page, rect });
        Ok(())
    }

    fn set_rotation(&mut self, sheet: SheetId, rotation: Rotation) -> Result<()> {
        self.check(sheet)?;
        self.ops.push(CanvasOp::Rotate { sheet, rotation });
        Ok(())
    }

    fn draw_line(&mut self, sheet: SheetId, from: Point, to: Point, style: &LineStyle) -> Result<()> {
        self.check(sheet)?;
        self.ops.push(CanvasOp::Line { sheet, from, to, style: style.clone() });
        Ok(())
    }
}
