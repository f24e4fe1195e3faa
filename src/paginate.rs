//! Pairing source pages into cards and splitting them into sheets

use crate::error::{Error, Result};

/// One card: the zero-based source pages of its front and back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPair {
    pub front: usize,
    pub back: usize,
}

/// Pair up source pages as (0, 1), (2, 3), ...
///
/// Fails when the page count is odd.
pub fn card_pairs(page_count: usize) -> Result<Vec<CardPair>> {
    if page_count % 2 != 0 {
        return Err(Error::OddPageCount { pages: page_count });
    }

    Ok((0..page_count / 2)
        .map(|i| CardPair {
            front: 2 * i,
            back: 2 * i + 1,
        })
        .collect())
}

/// The cards that go on one front/back sheet pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetChunk {
    /// Zero-based position of this sheet pair in the output
    pub index: usize,
    /// Source pages of the fronts, in card order
    pub fronts: Vec<usize>,
    /// Source pages of the backs, in card order; `backs[k]` belongs with `fronts[k]`
    pub backs: Vec<usize>,
}

impl SheetChunk {
    pub fn len(&self) -> usize {
        self.fronts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fronts.is_empty()
    }
}

/// Split the cards into consecutive chunks of `per_sheet`; the last chunk may be shorter.
pub fn paginate(cards: &[CardPair], per_sheet: usize) -> Result<Vec<SheetChunk>> {
    if per_sheet == 0 {
        return Err(Error::InvalidDimension(
            "a sheet must hold at least one card".to_string(),
        ));
    }

    let fronts: Vec<usize> = cards.iter().map(|card| card.front).collect();
    let backs: Vec<usize> = cards.iter().map(|card| card.back).collect();

    let chunks = fronts
        .chunks(per_sheet)
        .zip(backs.chunks(per_sheet))
        .enumerate()
        .map(|(index, (fronts, backs))| SheetChunk {
            index,
            fronts: fronts.to_vec(),
            backs: backs.to_vec(),
        })
        .collect();

    Ok(chunks)
}
