//! AC4 arc-consistency: grid constraint adapter and support-count propagator

use crate::algorithm::bitset::BitSet;
use crate::algorithm::matrix::BitMatrix;
use crate::algorithm::state::SolverState;
use crate::io::error::Result;
use crate::spatial::rect::{Rect2i, Vec2i};
use std::sync::Arc;

/// Binary constraint between each cell and its neighbour one `axis` step away
///
/// The neighbour at `+axis` is the cell's dependency; the cell at `-axis` is
/// its dependent. Cell ids follow the owning problem's row-major layout.
#[derive(Clone, Debug)]
pub struct Ac4BinaryConstraint {
    axis: Vec2i,
    bounds: Rect2i,
    allowed: Arc<BitMatrix>,
}

impl Ac4BinaryConstraint {
    /// Create a constraint over a grid of `size` cells
    pub const fn new(axis: Vec2i, size: Vec2i, allowed: Arc<BitMatrix>) -> Self {
        Self {
            axis,
            bounds: Rect2i {
                position: Vec2i::ZERO,
                size,
            },
            allowed,
        }
    }

    /// Displacement from a cell to its dependency
    pub const fn axis(&self) -> Vec2i {
        self.axis
    }

    /// Cell id of a local position, `None` outside the grid
    pub fn get_cell_id(&self, pos: Vec2i) -> Option<usize> {
        if self.bounds.has_point(pos) {
            usize::try_from(pos.x + pos.y * self.bounds.size.x).ok()
        } else {
            None
        }
    }

    /// Local position of a cell id
    pub fn get_cell_pos(&self, cell_id: usize) -> Vec2i {
        let width = self.bounds.size.x.max(1) as usize;
        Vec2i::new((cell_id % width) as i32, (cell_id / width) as i32)
    }

    /// Cell constrained by `cell_id`, one step against the axis
    pub fn get_dependent(&self, cell_id: usize) -> Option<usize> {
        self.get_cell_id(self.get_cell_pos(cell_id) - self.axis)
    }

    /// Cell constraining `cell_id`, one step along the axis
    pub fn get_dependency(&self, cell_id: usize) -> Option<usize> {
        self.get_cell_id(self.get_cell_pos(cell_id) + self.axis)
    }

    /// Tiles supported by a dependency holding `dependency_tile`
    pub fn get_allowed(&self, dependency_tile: usize) -> Option<&BitSet> {
        self.allowed.row(dependency_tile)
    }
}

/// Support counters for AC4 propagation
///
/// For every cell, constraint and tile the counter holds how many tiles in
/// the dependency's domain still allow that tile. When a counter drops to
/// zero the tile loses its support and must leave the cell's domain.
/// Failed dependencies count as unconstrained.
#[derive(Clone, Debug)]
pub struct Ac4Propagator {
    constraints: Vec<Ac4BinaryConstraint>,
    tile_count: usize,
    supports: Vec<u32>,
}

impl Ac4Propagator {
    /// Create a propagator with zeroed counters; call [`Ac4Propagator::rebuild`] before use
    pub fn new(constraints: Vec<Ac4BinaryConstraint>, cell_count: usize, tile_count: usize) -> Self {
        let supports = vec![0; cell_count * constraints.len() * tile_count];
        Self {
            constraints,
            tile_count,
            supports,
        }
    }

    /// Constraints the counters are kept for
    pub fn constraints(&self) -> &[Ac4BinaryConstraint] {
        &self.constraints
    }

    /// Remaining support for `tile` in `cell_id` under constraint `constraint_index`
    pub fn support(&self, cell_id: usize, constraint_index: usize, tile: usize) -> Option<u32> {
        self.supports
            .get(self.offset(cell_id, constraint_index) + tile)
            .copied()
    }

    const fn offset(&self, cell_id: usize, constraint_index: usize) -> usize {
        (cell_id * self.constraints.len() + constraint_index) * self.tile_count
    }

    /// Recount every support from the state's current domains
    ///
    /// Returns, per cell, the tiles left without any support. These must be
    /// removed through [`Ac4Propagator::remove`] like any other change.
    pub fn rebuild(&mut self, state: &SolverState) -> Vec<(usize, BitSet)> {
        self.supports.fill(0);
        let full = BitSet::new(self.tile_count, true);
        let mut unsupported = Vec::new();

        for cell_id in 0..state.cell_count() {
            let mut lost = BitSet::new(self.tile_count, false);
            for (index, constraint) in self.constraints.iter().enumerate() {
                let Some(dependency) = constraint.get_dependency(cell_id) else {
                    continue;
                };
                let dependency_domain = if state.is_failed(dependency) {
                    &full
                } else {
                    match state.domain(dependency) {
                        Some(domain) => domain,
                        None => continue,
                    }
                };

                let offset = (cell_id * self.constraints.len() + index) * self.tile_count;
                for dependency_tile in dependency_domain {
                    let Some(allowed) = constraint.get_allowed(dependency_tile) else {
                        continue;
                    };
                    for tile in allowed {
                        if let Some(count) = self.supports.get_mut(offset + tile) {
                            *count += 1;
                        }
                    }
                }

                if state.is_failed(cell_id) {
                    continue;
                }
                if let Some(domain) = state.domain(cell_id) {
                    for tile in domain {
                        if self.supports.get(offset + tile) == Some(&0) {
                            lost.set_bit(tile, true);
                        }
                    }
                }
            }
            if !lost.is_empty() {
                unsupported.push((cell_id, lost));
            }
        }

        unsupported
    }

    /// Account for `added` tiles returning to `cell_id` when a guess is undone
    ///
    /// Inverse of [`Ac4Propagator::remove`] for the same tiles.
    pub fn restore(&mut self, state: &SolverState, cell_id: usize, added: &BitSet) {
        for index in 0..self.constraints.len() {
            let Some(constraint) = self.constraints.get(index) else {
                continue;
            };
            let Some(dependent) = constraint.get_dependent(cell_id) else {
                continue;
            };
            if state.is_failed(dependent) {
                continue;
            }

            let offset = self.offset(dependent, index);
            for dependency_tile in added {
                let Some(allowed) = constraint.get_allowed(dependency_tile) else {
                    continue;
                };
                for tile in allowed {
                    if let Some(count) = self.supports.get_mut(offset + tile) {
                        *count += 1;
                    }
                }
            }
        }
    }

    /// Account for `removed` tiles leaving `cell_id`
    ///
    /// Returns the dependents that lost support for some tile still in their
    /// domain, together with those tiles.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if a dependent's domain does not
    /// match the tile count
    pub fn remove(
        &mut self,
        state: &SolverState,
        cell_id: usize,
        removed: &BitSet,
    ) -> Result<Vec<(usize, BitSet)>> {
        let mut unsupported = Vec::new();

        for index in 0..self.constraints.len() {
            let Some(constraint) = self.constraints.get(index) else {
                continue;
            };
            let Some(dependent) = constraint.get_dependent(cell_id) else {
                continue;
            };
            if state.is_failed(dependent) {
                continue;
            }

            let offset = self.offset(dependent, index);
            let mut lost = BitSet::new(self.tile_count, false);
            for dependency_tile in removed {
                let Some(allowed) = constraint.get_allowed(dependency_tile) else {
                    continue;
                };
                for tile in allowed {
                    if let Some(count) = self.supports.get_mut(offset + tile) {
                        *count = count.saturating_sub(1);
                        if *count == 0 {
                            lost.set_bit(tile, true);
                        }
                    }
                }
            }

            if let Some(domain) = state.domain(dependent) {
                lost.intersect_in_place(domain)?;
            }
            if !lost.is_empty() {
                unsupported.push((dependent, lost));
            }
        }

        Ok(unsupported)
    }
}
