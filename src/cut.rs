//! Cut lines: where they go and how they look

use std::fmt;
use std::str::FromStr;

use crate::canvas::{DocumentCanvas, Point, SheetId};
use crate::error::Result;
use crate::layout::Rect;

/// Which sheets get cut outlines drawn around each card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutLocation {
    None,
    #[default]
    Front,
    Back,
    Both,
}

impl CutLocation {
    pub const ALL: [CutLocation; 4] = [
        CutLocation::Front,
        CutLocation::Back,
        CutLocation::None,
        CutLocation::Both,
    ];

    pub fn applies_front(self) -> bool {
        matches!(self, CutLocation::Front | CutLocation::Both)
    }

    pub fn applies_back(self) -> bool {
        matches!(self, CutLocation::Back | CutLocation::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CutLocation::None => "none",
            CutLocation::Front => "front",
            CutLocation::Back => "back",
            CutLocation::Both => "both",
        }
    }
}

impl fmt::Display for CutLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown cut-line placement name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cut-line placement '{0}' (expected front, back, none or both)")]
pub struct ParseCutLocationError(pub String);

impl FromStr for CutLocation {
    type Err = ParseCutLocationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CutLocation::ALL
            .into_iter()
            .find(|loc| loc.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCutLocationError(s.to_string()))
    }
}

/// Stroke styling for a line segment
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    /// RGB, each component 0.0..=1.0
    pub color: [f64; 3],
    /// Stroke opacity 0.0..=1.0
    pub opacity: f64,
    /// Line width in points
    pub width: f64,
    /// Dash array (on, off, ...) in points; empty for a solid line
    pub dashes: Vec<f64>,
}

impl LineStyle {
    /// Faint black dashed line used for cut outlines
    pub fn cut_outline() -> Self {
        Self {
            color: [0.0, 0.0, 0.0],
            opacity: 0.1,
            width: 0.5,
            dashes: vec![1.0, 12.0],
        }
    }
}

/// Draw the four edges of `rect` as a cut outline
pub fn draw_cut_outline<C: DocumentCanvas>(canvas: &mut C, sheet: SheetId, rect: Rect) -> Result<()> {
    let style = LineStyle::cut_outline();
    let edges = [
        (Point::new(rect.x0, rect.y0), Point::new(rect.x1, rect.y0)), // top
        (Point::new(rect.x0, rect.y1), Point::new(rect.x1, rect.y1)), // bottom
        (Point::new(rect.x0, rect.y0), Point::new(rect.x0, rect.y1)), // left
        (Point::new(rect.x1, rect.y0), Point::new(rect.x1, rect.y1)), // right
    ];

    for (from, to) in edges {
        canvas.draw_line(sheet, from, to, &style)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasOp, RecordingCanvas};
    use crate::layout::SheetSize;

    #[test]
    fn test_predicates() {
        assert!(!CutLocation::None.applies_front());
        assert!(!CutLocation::None.applies_back());
        assert!(CutLocation::Front.applies_front());
        assert!(!CutLocation::Front.applies_back());
        assert!(!CutLocation::Back.applies_front());
        assert!(CutLocation::Back.applies_back());
        assert!(CutLocation::Both.applies_front());
        assert!(CutLocation::Both.applies_back());
    }

    #[test]
    fn test_parse() {
        assert_eq!("front".parse::<CutLocation>().unwrap(), CutLocation::Front);
        assert_eq!("BOTH".parse::<CutLocation>().unwrap(), CutLocation::Both);
        assert_eq!(" none ".parse::<CutLocation>().unwrap(), CutLocation::None);
        assert!("sideways".parse::<CutLocation>().is_err());
        assert_eq!(CutLocation::default(), CutLocation::Front);
        assert_eq!(CutLocation::Back.to_string(), "back");
    }

    #[test]
    fn test_outline_draws_four_edges() {
        let mut canvas = RecordingCanvas::new();
        let sheet = canvas.new_page(SheetSize::letter()).unwrap();
        let rect = Rect::new(18.0, 18.0, 216.0, 360.0);

        draw_cut_outline(&mut canvas, sheet, rect).unwrap();

        let lines: Vec<_> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::Line { from, to, style, .. } => Some((*from, *to, style.clone())),
                _ => None,
            })
            .collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].0, Point::new(18.0, 18.0));
        assert_eq!(lines[0].1, Point::new(234.0, 18.0));
        assert_eq!(lines[3].0, Point::new(234.0, 18.0));
        assert_eq!(lines[3].1, Point::new(234.0, 378.0));
        for (_, _, style) in lines {
            assert_eq!(style, LineStyle::cut_outline());
            assert_eq!(style.dashes, vec![1.0, 12.0]);
        }
    }
}
