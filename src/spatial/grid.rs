//! Assembled solution over a whole problem rectangle
//!
//! Sub-problem snapshots are written into one `ndarray` grid, each limited to
//! its renderable region, so overlapping margins never overwrite the
//! authoritative cells of a neighbouring band.

use crate::algorithm::state::SolverState;
use crate::spatial::rect::{Rect2i, Vec2i};
use ndarray::Array2;

/// Tile value of a cell with no committed solution
pub const UNSOLVED_TILE: i64 = -1;

/// Committed tiles of a rectangle, indexed `[row, col]` = `[y, x]` relative to the rect
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolvedGrid {
    rect: Rect2i,
    tiles: Array2<i64>,
}

impl SolvedGrid {
    /// Create a grid covering `rect` with every cell unsolved
    pub fn new(rect: Rect2i) -> Self {
        let rows = usize::try_from(rect.size.y).unwrap_or(0);
        let cols = usize::try_from(rect.size.x).unwrap_or(0);
        Self {
            rect,
            tiles: Array2::from_elem((rows, cols), UNSOLVED_TILE),
        }
    }

    /// Absolute region covered by the grid
    pub const fn rect(&self) -> Rect2i {
        self.rect
    }

    /// Raw tile values, [`UNSOLVED_TILE`] where nothing is committed
    pub const fn tiles(&self) -> &Array2<i64> {
        &self.tiles
    }

    /// Committed tile at an absolute position
    pub fn get(&self, position: Vec2i) -> Option<usize> {
        let index = self.index(position)?;
        self.tiles
            .get(index)
            .and_then(|&value| usize::try_from(value).ok())
    }

    fn index(&self, position: Vec2i) -> Option<(usize, usize)> {
        if !self.rect.has_point(position) {
            return None;
        }
        let local = position - self.rect.position;
        Some((usize::try_from(local.y).ok()?, usize::try_from(local.x).ok()?))
    }

    /// Copy committed tiles of `state`, solved over `source_rect`, that fall inside `region`
    ///
    /// Returns the number of cells written. Open and failed cells are skipped.
    pub fn write_region(&mut self, source_rect: Rect2i, state: &SolverState, region: Rect2i) -> usize {
        let region = region.intersection(&source_rect).intersection(&self.rect);
        let width = usize::try_from(source_rect.size.x).unwrap_or(0);
        let mut written = 0;

        for point in region.points() {
            let local = point - source_rect.position;
            let (Ok(x), Ok(y)) = (usize::try_from(local.x), usize::try_from(local.y)) else {
                continue;
            };
            let Some(tile) = state.solution(y * width + x) else {
                continue;
            };
            let Some(index) = self.index(point) else {
                continue;
            };
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile as i64;
                written += 1;
            }
        }

        written
    }

    /// Number of cells without a committed tile
    pub fn unsolved_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|&&value| value == UNSOLVED_TILE)
            .count()
    }

    /// Whether every cell holds a committed tile
    pub fn is_complete(&self) -> bool {
        self.unsolved_count() == 0
    }
}
