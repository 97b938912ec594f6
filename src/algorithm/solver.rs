//! Step-wise solver: propagation, divergence and backtracking over one problem

use crate::algorithm::ac4::Ac4Propagator;
use crate::algorithm::bitset::BitSet;
use crate::algorithm::state::SolverState;
use crate::io::error::Result;
use crate::spatial::problem::Grid2DProblem;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Solver behaviour switches
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverSettings {
    /// Undo guesses that lead to contradictions instead of failing cells
    pub allow_backtracking: bool,
    /// Maximum number of backtracks, `None` for no limit
    pub backtracking_limit: Option<usize>,
    /// Propagate by revising neighbour domains instead of AC4 support counting
    pub force_ac3: bool,
    /// Seed for divergence choices
    pub seed: u64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            allow_backtracking: true,
            backtracking_limit: None,
            force_ac3: false,
            seed: crate::io::configuration::DEFAULT_SEED,
        }
    }
}

enum Propagation {
    Stable,
    Contradiction(usize),
}

/// Solves one [`Grid2DProblem`] a step at a time
pub struct Solver {
    problem: Arc<Grid2DProblem>,
    settings: SolverSettings,
    state: SolverState,
    propagator: Option<Ac4Propagator>,
    removals: VecDeque<(usize, BitSet)>,
    rng: StdRng,
    backtrack_count: usize,
}

impl Solver {
    /// Build the initial state and propagate preconditions and borders to a fixpoint
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if a precondition domain does not
    /// match the problem's tile count
    pub fn new(problem: Arc<Grid2DProblem>, settings: SolverSettings) -> Result<Self> {
        let mut state = SolverState::new(problem.cell_count(), problem.tile_count());
        problem.populate_initial_state(&mut state)?;
        for cell_id in 0..state.cell_count() {
            state.mark_changed(cell_id);
        }

        let propagator = (!settings.force_ac3).then(|| {
            Ac4Propagator::new(
                problem.get_ac4_binary_constraints(),
                problem.cell_count(),
                problem.tile_count(),
            )
        });

        let mut solver = Self {
            rng: StdRng::seed_from_u64(settings.seed),
            problem,
            settings,
            state,
            propagator,
            removals: VecDeque::new(),
            backtrack_count: 0,
        };

        while let Propagation::Contradiction(cell_id) = solver.propagate_ac3()? {
            tracing::warn!(cell_id, "cell has no consistent tile after preconditions");
            solver.state.mark_failed(cell_id);
        }
        solver.reset_support()?;
        Ok(solver)
    }

    /// Problem being solved
    pub fn problem(&self) -> &Arc<Grid2DProblem> {
        &self.problem
    }

    /// Settings the solver was created with
    pub const fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// State after the latest step
    pub const fn get_current_state(&self) -> &SolverState {
        &self.state
    }

    /// Mutable access to the state, e.g. to drop history once solving ends
    pub const fn current_state_mut(&mut self) -> &mut SolverState {
        &mut self.state
    }

    /// Number of guesses undone so far
    pub const fn backtrack_count(&self) -> usize {
        self.backtrack_count
    }

    /// Advance by one propagation and, when stable, one divergence
    ///
    /// Returns `true` once no unsolved cell remains.
    ///
    /// # Errors
    ///
    /// Propagates bit-set size mismatches, which indicate inconsistent rules
    pub fn solve_step(&mut self) -> Result<bool> {
        let propagation = if self.propagator.is_some() {
            self.propagate_ac4()?
        } else {
            self.propagate_ac3()?
        };

        if let Propagation::Contradiction(cell_id) = propagation {
            self.resolve_contradiction(cell_id)?;
            return Ok(false);
        }

        if self.state.get_unsolved_cells() == 0 {
            return Ok(true);
        }

        self.diverge()?;
        Ok(false)
    }

    fn propagate_ac3(&mut self) -> Result<Propagation> {
        loop {
            let changed = self.state.take_changed_cells();
            if changed.is_empty() {
                return Ok(Propagation::Stable);
            }

            let mut pending = changed.into_iter();
            while let Some(cell_id) = pending.next() {
                for related in self.problem.get_related_cells(cell_id) {
                    if self.state.is_failed(related) {
                        continue;
                    }
                    let domain = self.problem.compute_cell_domain(&self.state, related)?;
                    if domain.is_empty() {
                        self.state.mark_changed(cell_id);
                        pending.for_each(|rest| self.state.mark_changed(rest));
                        return Ok(Propagation::Contradiction(related));
                    }
                    self.state.set_domain(related, domain);
                }
            }
        }
    }

    fn propagate_ac4(&mut self) -> Result<Propagation> {
        self.state.take_changed_cells();

        while let Some((cell_id, removed)) = self.removals.pop_front() {
            let Some(propagator) = self.propagator.as_mut() else {
                break;
            };
            let unsupported = propagator.remove(&self.state, cell_id, &removed)?;

            for (target, lost) in unsupported {
                let Some(current) = self.state.domain(target) else {
                    continue;
                };
                let next = current.difference(&lost)?;
                if next.is_empty() {
                    return Ok(Propagation::Contradiction(target));
                }
                self.apply_domain(target, next)?;
            }
        }

        Ok(Propagation::Stable)
    }

    fn apply_domain(&mut self, cell_id: usize, domain: BitSet) -> Result<()> {
        let Some(current) = self.state.domain(cell_id) else {
            return Ok(());
        };
        let removed = current.difference(&domain)?;
        if self.state.set_domain(cell_id, domain) && self.propagator.is_some() && !removed.is_empty()
        {
            self.removals.push_back((cell_id, removed));
        }
        Ok(())
    }

    /// Recount AC4 supports after the state changed outside normal propagation
    fn reset_support(&mut self) -> Result<()> {
        self.removals.clear();
        let Some(propagator) = self.propagator.as_mut() else {
            return Ok(());
        };
        for (cell_id, lost) in propagator.rebuild(&self.state) {
            let Some(current) = self.state.domain(cell_id) else {
                continue;
            };
            let next = current.difference(&lost)?;
            if next.is_empty() {
                self.state.mark_failed(cell_id);
            } else {
                self.apply_domain(cell_id, next)?;
            }
        }
        Ok(())
    }

    fn may_backtrack(&self) -> bool {
        self.settings.allow_backtracking
            && self
                .settings
                .backtracking_limit
                .is_none_or(|limit| self.backtrack_count < limit)
    }

    /// Domains the AC4 counters account for, per cell changed since the latest guess
    ///
    /// Queued removals are not yet counted, so their tiles are added back.
    /// Returns `None` when a failed cell is involved and only a full recount is exact.
    fn counted_domains_since_branch(&self) -> Result<Option<Vec<(usize, BitSet)>>> {
        if self.propagator.is_none() {
            return Ok(Some(Vec::new()));
        }

        let mut pending: HashMap<usize, BitSet> = HashMap::new();
        for (cell_id, removed) in &self.removals {
            match pending.get_mut(cell_id) {
                Some(tiles) => tiles.union_in_place(removed)?,
                None => {
                    pending.insert(*cell_id, removed.clone());
                }
            }
        }

        let mut counted = Vec::new();
        for cell_id in self.state.cells_changed_since_branch() {
            if self.state.is_failed(cell_id) {
                return Ok(None);
            }
            let Some(domain) = self.state.domain(cell_id) else {
                continue;
            };
            let mut tiles = domain.clone();
            if let Some(removed) = pending.get(&cell_id) {
                tiles.union_in_place(removed)?;
            }
            counted.push((cell_id, tiles));
        }
        Ok(Some(counted))
    }

    /// Bring AC4 counters back in line after [`SolverState::pop_branch`]
    fn restore_support(&mut self, counted: Option<Vec<(usize, BitSet)>>) -> Result<()> {
        let Some(counted) = counted else {
            return self.reset_support();
        };
        self.removals.clear();
        let Some(propagator) = self.propagator.as_mut() else {
            return Ok(());
        };
        for (cell_id, before) in counted {
            let Some(restored) = self.state.domain(cell_id) else {
                continue;
            };
            let added = restored.difference(&before)?;
            if !added.is_empty() {
                propagator.restore(&self.state, cell_id, &added);
            }
        }
        Ok(())
    }

    fn resolve_contradiction(&mut self, cell_id: usize) -> Result<()> {
        while self.may_backtrack() {
            let counted = self.counted_domains_since_branch()?;
            let Some((branch_cell, tile)) = self.state.pop_branch() else {
                break;
            };
            self.backtrack_count += 1;
            tracing::trace!(branch_cell, tile, "backtracking");
            self.restore_support(counted)?;

            let Some(mut domain) = self.state.domain(branch_cell).cloned() else {
                continue;
            };
            domain.set_bit(tile, false);
            if domain.is_empty() {
                continue;
            }
            self.apply_domain(branch_cell, domain)?;
            return Ok(());
        }

        tracing::warn!(cell_id, "marking unsatisfiable cell as failed");
        self.state.mark_failed(cell_id);
        self.reset_support()
    }

    fn diverge(&mut self) -> Result<()> {
        let Some(cell_id) = self.state.lowest_entropy_cell() else {
            return Ok(());
        };
        let mut options = self
            .state
            .domain(cell_id)
            .map(BitSet::to_vec)
            .unwrap_or_default();
        let Some(tile) = self
            .problem
            .pick_divergence_option(&mut options, &mut self.rng)
        else {
            return Ok(());
        };

        self.state.push_branch(cell_id, tile);
        let domain = BitSet::from_bits(self.problem.tile_count(), [tile]);
        self.apply_domain(cell_id, domain)
    }
}
