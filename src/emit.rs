//! Front and back sheet emitters
//!
//! Placement is planned as plain data first ([`plan_front`], [`plan_back`])
//! and then drawn onto any [`DocumentCanvas`].
//!
//! Backs are mirrored per row: when a duplex sheet is turned over along its
//! vertical axis, column `c` on the front lands on column `cols - 1 - c` of
//! the back. Reversing each row of backs and pushing short rows to the right
//! edge puts every back behind its own front.

use log::{debug, info};

use crate::canvas::{DocumentCanvas, Rotation, SheetId};
use crate::cut::{draw_cut_outline, CutLocation};
use crate::error::Result;
use crate::layout::{Grid, Rect};
use crate::paginate::{paginate, CardPair};

/// Where one source page lands on a sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub source_page: usize,
    pub row: usize,
    pub col: usize,
    pub rect: Rect,
}

/// Fronts fill the grid row-major from the top-left; trailing cells stay empty.
pub fn plan_front(grid: &Grid, fronts: &[usize]) -> Vec<Placement> {
    if !grid.is_usable() {
        return Vec::new();
    }
    let mut placements = Vec::with_capacity(fronts.len());

    for (row, row_fronts) in fronts.chunks(grid.cols).take(grid.rows).enumerate() {
        for (col, &source_page) in row_fronts.iter().enumerate() {
            placements.push(Placement {
                source_page,
                row,
                col,
                rect: grid.cell_rect(row, col),
            });
        }
    }

    placements
}

/// Backs are reversed per row and right-aligned, then shifted by [`Grid::extra_width`].
pub fn plan_back(grid: &Grid, backs: &[usize]) -> Vec<Placement> {
    if !grid.is_usable() {
        return Vec::new();
    }
    let mut placements = Vec::with_capacity(backs.len());
    let extra_width = grid.extra_width();

    for (row, row_backs) in backs.chunks(grid.cols).take(grid.rows).enumerate() {
        let offset = grid.cols - row_backs.len();

        for (i, &source_page) in row_backs.iter().rev().enumerate() {
            let col = offset + i;
            let cell = grid.cell_rect(row, col);
            placements.push(Placement {
                source_page,
                row,
                col,
                rect: Rect::new(cell.x0 + extra_width, cell.y0, cell.width(), cell.height()),
            });
        }
    }

    placements
}

/// Create a front sheet and place `fronts` on it
pub fn emit_front<C: DocumentCanvas>(
    canvas: &mut C,
    grid: &Grid,
    fronts: &[usize],
    cut_lines: CutLocation,
) -> Result<SheetId> {
    let sheet = canvas.new_page(grid.sheet)?;
    place(canvas, sheet, &plan_front(grid, fronts), cut_lines.applies_front())?;
    Ok(sheet)
}

/// Create a back sheet, place `backs` mirrored on it, and rotate it 180° when `flip_back` is set
pub fn emit_back<C: DocumentCanvas>(
    canvas: &mut C,
    grid: &Grid,
    backs: &[usize],
    cut_lines: CutLocation,
    flip_back: bool,
) -> Result<SheetId> {
    let sheet = canvas.new_page(grid.sheet)?;
    place(canvas, sheet, &plan_back(grid, backs), cut_lines.applies_back())?;
    if flip_back {
        canvas.set_rotation(sheet, Rotation::Half)?;
    }
    Ok(sheet)
}

fn place<C: DocumentCanvas>(
    canvas: &mut C,
    sheet: SheetId,
    placements: &[Placement],
    outlines: bool,
) -> Result<()> {
    for placement in placements {
        debug!(
            "Sheet {}: page {} at row {}, column {}",
            sheet.0, placement.source_page, placement.row, placement.col
        );
        canvas.embed_page(sheet, placement.source_page, placement.rect)?;
        if outlines {
            draw_cut_outline(canvas, sheet, placement.rect)?;
        }
    }
    Ok(())
}

/// Counts from one layout run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSummary {
    /// Front/back sheet pairs emitted
    pub sheet_pairs: usize,
    pub fronts_placed: usize,
    pub backs_placed: usize,
}

impl LayoutSummary {
    pub fn page_count(&self) -> usize {
        self.sheet_pairs * 2
    }
}

/// Emit one front sheet and one back sheet per chunk of cards, in card order
pub fn lay_out_sheets<C: DocumentCanvas>(
    canvas: &mut C,
    grid: &Grid,
    cards: &[CardPair],
    cut_lines: CutLocation,
    flip_back: bool,
) -> Result<LayoutSummary> {
    let mut summary = LayoutSummary {
        sheet_pairs: 0,
        fronts_placed: 0,
        backs_placed: 0,
    };

    for chunk in paginate(cards, grid.cards_per_sheet())? {
        debug!("Sheet pair {}: {} cards", chunk.index + 1, chunk.len());
        emit_front(canvas, grid, &chunk.fronts, cut_lines)?;
        emit_back(canvas, grid, &chunk.backs, cut_lines, flip_back)?;

        summary.sheet_pairs += 1;
        summary.fronts_placed += chunk.fronts.len();
        summary.backs_placed += chunk.backs.len();
    }

    info!(
        "Laid out {} cards on {} sheet pairs",
        summary.fronts_placed, summary.sheet_pairs
    );
    Ok(summary)
}
