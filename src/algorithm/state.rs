//! Per-cell solver state with an undo trail for backtracking

use crate::algorithm::bitset::{BitSet, OnlyBit};
use bitvec::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

/// Marker stored in place of a solution for a permanently failed cell
pub const CELL_SOLUTION_FAILED: i64 = i64::MIN;

#[derive(Clone, Debug)]
struct TrailEntry {
    cell_id: usize,
    domain: BitSet,
    solution_or_entropy: i64,
}

/// Open cells keyed by option count, then id; entries go stale when a cell changes
type EntropyQueue = BinaryHeap<Reverse<(u64, usize)>>;

#[derive(Clone, Copy, Debug)]
struct Branch {
    cell_id: usize,
    tile: usize,
    trail_len: usize,
    unsolved_cells: usize,
}

/// Domains and solutions of every cell in one problem
///
/// `cell_solution_or_entropy` holds the committed tile for solved cells,
/// the negated option count for open cells, and [`CELL_SOLUTION_FAILED`]
/// for cells given up as unsatisfiable. Changes made after a divergence are
/// recorded on a trail so [`SolverState::pop_branch`] can restore the state
/// that existed before the guess.
#[derive(Clone, Debug, Default)]
pub struct SolverState {
    cell_domains: Vec<BitSet>,
    cell_solution_or_entropy: Vec<i64>,
    unsolved_cells: usize,
    changed_cells: Vec<usize>,
    changed_mask: BitVec,
    trail: Vec<TrailEntry>,
    branches: Vec<Branch>,
    entropy_queue: EntropyQueue,
}

fn classify(domain: &BitSet) -> i64 {
    match domain.get_only_set_bit() {
        OnlyBit::Single(tile) => tile as i64,
        OnlyBit::NoneSet => CELL_SOLUTION_FAILED,
        OnlyBit::Multiple => -(domain.count() as i64),
    }
}

const fn is_unsolved(value: i64) -> bool {
    value < 0 && value != CELL_SOLUTION_FAILED
}

const fn entropy_key(cell_id: usize, value: i64) -> Option<Reverse<(u64, usize)>> {
    if is_unsolved(value) {
        Some(Reverse((value.unsigned_abs(), cell_id)))
    } else {
        None
    }
}

fn build_entropy_queue(values: &[i64]) -> EntropyQueue {
    values
        .iter()
        .enumerate()
        .filter_map(|(cell_id, &value)| entropy_key(cell_id, value))
        .collect()
}

impl SolverState {
    /// Create a state where every cell may hold any of `tile_count` tiles
    pub fn new(cell_count: usize, tile_count: usize) -> Self {
        let full = BitSet::new(tile_count, true);
        let value = classify(&full);
        let cell_solution_or_entropy = vec![value; cell_count];
        Self {
            cell_domains: vec![full; cell_count],
            entropy_queue: build_entropy_queue(&cell_solution_or_entropy),
            cell_solution_or_entropy,
            unsolved_cells: if is_unsolved(value) { cell_count } else { 0 },
            changed_cells: Vec::new(),
            changed_mask: bitvec![0; cell_count],
            trail: Vec::new(),
            branches: Vec::new(),
        }
    }

    /// Number of cells in the state
    pub fn cell_count(&self) -> usize {
        self.cell_domains.len()
    }

    /// Domains of all cells, indexed by cell id
    pub fn get_cell_domains(&self) -> &[BitSet] {
        &self.cell_domains
    }

    /// Solution-or-entropy values of all cells, indexed by cell id
    pub fn get_cell_solution_or_entropy(&self) -> &[i64] {
        &self.cell_solution_or_entropy
    }

    /// Domain of one cell
    pub fn domain(&self, cell_id: usize) -> Option<&BitSet> {
        self.cell_domains.get(cell_id)
    }

    /// Committed tile of one cell, if any
    pub fn solution(&self, cell_id: usize) -> Option<usize> {
        self.cell_solution_or_entropy
            .get(cell_id)
            .and_then(|&value| usize::try_from(value).ok())
    }

    /// Whether the cell has been given up as unsatisfiable
    pub fn is_failed(&self, cell_id: usize) -> bool {
        self.cell_solution_or_entropy.get(cell_id) == Some(&CELL_SOLUTION_FAILED)
    }

    /// Number of cells with neither a committed tile nor a failure mark
    pub const fn get_unsolved_cells(&self) -> usize {
        self.unsolved_cells
    }

    /// Replace a cell's domain
    ///
    /// A single remaining option commits the cell and an empty domain fails
    /// it. Failed cells and out-of-range ids are left untouched. Returns
    /// whether anything changed; changed cells are appended to the change log.
    pub fn set_domain(&mut self, cell_id: usize, domain: BitSet) -> bool {
        let value = classify(&domain);
        self.write_cell(cell_id, domain, value)
    }

    /// Commit a cell to one tile
    ///
    /// Tiles outside the domain's size are ignored.
    pub fn set_solution(&mut self, cell_id: usize, tile: usize) -> bool {
        let Some(size) = self.cell_domains.get(cell_id).map(BitSet::size) else {
            return false;
        };
        if tile >= size {
            return false;
        }
        self.set_domain(cell_id, BitSet::from_bits(size, [tile]))
    }

    /// Give up on a cell; its domain is cleared and it no longer counts as unsolved
    pub fn mark_failed(&mut self, cell_id: usize) -> bool {
        let Some(size) = self.cell_domains.get(cell_id).map(BitSet::size) else {
            return false;
        };
        self.write_cell(cell_id, BitSet::new(size, false), CELL_SOLUTION_FAILED)
    }

    fn write_cell(&mut self, cell_id: usize, domain: BitSet, value: i64) -> bool {
        let (Some(slot), Some(current)) = (
            self.cell_domains.get_mut(cell_id),
            self.cell_solution_or_entropy.get_mut(cell_id),
        ) else {
            return false;
        };
        if *current == CELL_SOLUTION_FAILED || (*slot == domain && *current == value) {
            return false;
        }

        let previous_domain = std::mem::replace(slot, domain);
        let previous_value = std::mem::replace(current, value);

        if is_unsolved(previous_value) && !is_unsolved(value) {
            self.unsolved_cells = self.unsolved_cells.saturating_sub(1);
        } else if !is_unsolved(previous_value) && is_unsolved(value) {
            self.unsolved_cells += 1;
        }

        if let Some(key) = entropy_key(cell_id, value) {
            self.entropy_queue.push(key);
        }
        if !self.branches.is_empty() {
            self.trail.push(TrailEntry {
                cell_id,
                domain: previous_domain,
                solution_or_entropy: previous_value,
            });
        }

        self.mark_changed(cell_id);
        true
    }

    /// Queue a cell in the change log unless it is already queued
    pub fn mark_changed(&mut self, cell_id: usize) {
        if let Some(mut flag) = self.changed_mask.get_mut(cell_id) {
            if !*flag {
                *flag = true;
                self.changed_cells.push(cell_id);
            }
        }
    }

    /// Changed cells in the order they were first changed
    pub fn changed_cells(&self) -> &[usize] {
        &self.changed_cells
    }

    /// Drain the change log
    pub fn take_changed_cells(&mut self) -> Vec<usize> {
        self.changed_mask.fill(false);
        std::mem::take(&mut self.changed_cells)
    }

    /// Open cell with the fewest remaining options, lowest id first on ties
    ///
    /// Stale queue entries are discarded on the way.
    pub fn lowest_entropy_cell(&mut self) -> Option<usize> {
        if self.entropy_queue.len() > 2 * self.cell_count() + 64 {
            self.entropy_queue = build_entropy_queue(&self.cell_solution_or_entropy);
        }

        while let Some(&Reverse((count, cell_id))) = self.entropy_queue.peek() {
            let current = self
                .cell_solution_or_entropy
                .get(cell_id)
                .and_then(|&value| entropy_key(cell_id, value));
            if current == Some(Reverse((count, cell_id))) {
                return Some(cell_id);
            }
            self.entropy_queue.pop();
        }
        None
    }

    /// Cells overwritten since the latest guess, each listed once in id order
    pub fn cells_changed_since_branch(&self) -> Vec<usize> {
        let start = self
            .branches
            .last()
            .map_or(self.trail.len(), |branch| branch.trail_len);
        let mut cells: Vec<usize> = self
            .trail
            .get(start..)
            .unwrap_or_default()
            .iter()
            .map(|entry| entry.cell_id)
            .collect();
        cells.sort_unstable();
        cells.dedup();
        cells
    }

    /// Record a guess so that later changes can be undone
    ///
    /// Call this before committing `cell_id` to `tile`.
    pub fn push_branch(&mut self, cell_id: usize, tile: usize) {
        self.branches.push(Branch {
            cell_id,
            tile,
            trail_len: self.trail.len(),
            unsolved_cells: self.unsolved_cells,
        });
    }

    /// Undo everything since the latest guess and return `(cell_id, tile)` of that guess
    pub fn pop_branch(&mut self) -> Option<(usize, usize)> {
        let branch = self.branches.pop()?;
        for entry in self.trail.drain(branch.trail_len..).rev() {
            if let Some(domain) = self.cell_domains.get_mut(entry.cell_id) {
                *domain = entry.domain;
            }
            if let Some(value) = self.cell_solution_or_entropy.get_mut(entry.cell_id) {
                *value = entry.solution_or_entropy;
            }
            if let Some(key) = entropy_key(entry.cell_id, entry.solution_or_entropy) {
                self.entropy_queue.push(key);
            }
        }
        self.unsolved_cells = branch.unsolved_cells;
        self.take_changed_cells();
        Some((branch.cell_id, branch.tile))
    }

    /// Number of guesses that can still be undone
    pub fn history_depth(&self) -> usize {
        self.branches.len()
    }

    /// Immutable, history-free copy that can be shared across threads
    pub fn make_snapshot(&self) -> Arc<Self> {
        Arc::new(Self {
            cell_domains: self.cell_domains.clone(),
            cell_solution_or_entropy: self.cell_solution_or_entropy.clone(),
            unsolved_cells: self.unsolved_cells,
            changed_cells: Vec::new(),
            changed_mask: bitvec![0; self.cell_count()],
            trail: Vec::new(),
            branches: Vec::new(),
            entropy_queue: build_entropy_queue(&self.cell_solution_or_entropy),
        })
    }

    /// Drop the backtracking history, making every guess so far final
    pub fn unlink_from_previous(&mut self) {
        self.trail = Vec::new();
        self.branches = Vec::new();
    }
}
