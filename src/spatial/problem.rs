//! Rectangular WFC problem: geometry, adjacency relations and preconditions

use crate::algorithm::ac4::Ac4BinaryConstraint;
use crate::algorithm::bitset::BitSet;
use crate::algorithm::matrix::BitMatrix;
use crate::algorithm::selection::DivergenceStrategy;
use crate::algorithm::state::SolverState;
use crate::analysis::rules::Rules2D;
use crate::io::error::{Result, ensure_same_size};
use crate::spatial::rect::{Rect2i, Vec2i};
use rand::Rng;
use std::sync::Arc;

/// One directional adjacency relation between a cell and its neighbour at `axis`
#[derive(Clone, Debug)]
pub struct AxisRelation {
    /// Displacement from a cell to the neighbour constraining it
    pub axis: Vec2i,
    /// Row `i`: tiles allowed in the cell when the neighbour holds tile `i`
    pub matrix: Arc<BitMatrix>,
}

/// A grid of cells to fill with tiles under adjacency rules
///
/// Cells are addressed by local id `y * rect.size.x + x` for coordinates
/// relative to `rect.position`. Each declared rule axis contributes a
/// forward relation and a reverse relation built from the transposed
/// matrix.
#[derive(Clone, Debug)]
pub struct Grid2DProblem {
    rules: Arc<Rules2D>,
    rect: Rect2i,
    renderable_rect: Rect2i,
    edges_rect: Rect2i,
    init_read_rects: Vec<Rect2i>,
    relations: Arc<[AxisRelation]>,
    divergence: DivergenceStrategy,
    precondition_domains: Vec<Option<BitSet>>,
    precondition_solutions: Vec<Option<usize>>,
}

impl Grid2DProblem {
    /// Build a problem covering `rect` from a rule set
    pub fn new(rules: Arc<Rules2D>, rect: Rect2i) -> Self {
        let relations: Vec<AxisRelation> = rules
            .axes()
            .iter()
            .zip(rules.axis_matrices())
            .flat_map(|(&axis, matrix)| {
                [
                    AxisRelation {
                        axis,
                        matrix: Arc::new(matrix.clone()),
                    },
                    AxisRelation {
                        axis: -axis,
                        matrix: Arc::new(matrix.transpose()),
                    },
                ]
            })
            .collect();
        let divergence = rules.divergence_strategy();

        Self {
            rules,
            rect,
            renderable_rect: rect,
            edges_rect: rect,
            init_read_rects: Vec::new(),
            relations: relations.into(),
            divergence,
            precondition_domains: Vec::new(),
            precondition_solutions: Vec::new(),
        }
    }

    /// Same rules and relations over a different rectangle, without preconditions
    pub(crate) fn with_rect(&self, rect: Rect2i) -> Self {
        Self {
            rules: Arc::clone(&self.rules),
            rect,
            renderable_rect: rect,
            edges_rect: self.edges_rect,
            init_read_rects: Vec::new(),
            relations: Arc::clone(&self.relations),
            divergence: self.divergence.clone(),
            precondition_domains: Vec::new(),
            precondition_solutions: Vec::new(),
        }
    }

    /// Rule set the problem was built from
    pub fn rules(&self) -> &Arc<Rules2D> {
        &self.rules
    }

    /// Solvable cell region in absolute coordinates
    pub const fn rect(&self) -> Rect2i {
        self.rect
    }

    /// Region whose solutions are authoritative for export and boundary sharing
    pub const fn renderable_rect(&self) -> Rect2i {
        self.renderable_rect
    }

    /// Replace the renderable region
    pub const fn set_renderable_rect(&mut self, rect: Rect2i) {
        self.renderable_rect = rect;
    }

    /// Bounds of the whole problem this one may be part of
    ///
    /// Informational only. Sub-problems inherit it from the problem they were
    /// split from, while neighbour lookups stay bounded by [`Self::rect`].
    pub const fn edges_rect(&self) -> Rect2i {
        self.edges_rect
    }

    /// Replace the global problem bounds
    pub const fn set_edges_rect(&mut self, rect: Rect2i) {
        self.edges_rect = rect;
    }

    /// Regions to import from each dependency, in dependency order
    pub fn init_read_rects(&self) -> &[Rect2i] {
        &self.init_read_rects
    }

    /// Replace the dependency read regions
    pub fn set_init_read_rects(&mut self, rects: Vec<Rect2i>) {
        self.init_read_rects = rects;
    }

    /// Number of distinct tiles
    pub fn tile_count(&self) -> usize {
        self.rules.tile_count()
    }

    /// Number of cells in the solvable region
    pub const fn cell_count(&self) -> usize {
        self.rect.area()
    }

    /// Forward and reverse relations, forward first for each declared axis
    pub fn relations(&self) -> &[AxisRelation] {
        &self.relations
    }

    /// Domain of an unconstrained cell
    pub fn default_domain(&self) -> BitSet {
        BitSet::new(self.tile_count(), true)
    }

    /// Local cell id of a local coordinate, `None` outside the rect
    pub fn coord_to_id(&self, coord: Vec2i) -> Option<usize> {
        if coord.x < 0 || coord.y < 0 || coord.x >= self.rect.size.x || coord.y >= self.rect.size.y
        {
            return None;
        }
        usize::try_from(coord.y * self.rect.size.x + coord.x).ok()
    }

    /// Local coordinate of a cell id, `None` for out-of-range ids
    pub fn id_to_coord(&self, cell_id: usize) -> Option<Vec2i> {
        if cell_id >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.rect.size.x).ok()?;
        Some(Vec2i::new((cell_id % width) as i32, (cell_id / width) as i32))
    }

    /// Largest absolute axis displacement on each dimension
    pub fn get_dependencies_range(&self) -> Vec2i {
        self.relations
            .iter()
            .fold(Vec2i::ZERO, |range, relation| range.max(relation.axis.abs()))
    }

    fn neighbour(&self, coord: Vec2i, axis: Vec2i) -> Option<usize> {
        self.coord_to_id(coord + axis)
    }

    /// Restrict a cell to `domain` before solving; out-of-range ids are ignored
    pub fn set_precondition_domain(&mut self, cell_id: usize, domain: BitSet) {
        self.ensure_precondition_storage();
        if let Some(slot) = self.precondition_domains.get_mut(cell_id) {
            *slot = Some(domain);
        }
    }

    /// Fix a cell to `tile` before solving; out-of-range ids are ignored
    pub fn set_precondition_solution(&mut self, cell_id: usize, tile: usize) {
        self.ensure_precondition_storage();
        if let Some(slot) = self.precondition_solutions.get_mut(cell_id) {
            *slot = Some(tile);
        }
    }

    /// Remove every precondition
    pub fn clear_preconditions(&mut self) {
        self.precondition_domains.clear();
        self.precondition_solutions.clear();
    }

    /// Pre-solved tile of a cell, if any
    pub fn precondition_solution(&self, cell_id: usize) -> Option<usize> {
        self.precondition_solutions.get(cell_id).copied().flatten()
    }

    /// Precondition domain of a cell, if any
    pub fn precondition_domain(&self, cell_id: usize) -> Option<&BitSet> {
        self.precondition_domains.get(cell_id)?.as_ref()
    }

    fn ensure_precondition_storage(&mut self) {
        let cell_count = self.cell_count();
        if self.precondition_domains.len() != cell_count {
            self.precondition_domains.resize(cell_count, None);
        }
        if self.precondition_solutions.len() != cell_count {
            self.precondition_solutions.resize(cell_count, None);
        }
    }

    /// Apply preconditions to a fresh state
    ///
    /// Cells are visited column by column (outer x, inner y), so the state's
    /// change log lists them in that order. A pre-solved tile wins over a
    /// domain on the same cell; empty domains are skipped.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if a precondition domain does not
    /// have one bit per tile
    pub fn populate_initial_state(&self, state: &mut SolverState) -> Result<()> {
        let width = self.rect.size.x.max(0);
        let height = self.rect.size.y.max(0);

        for x in 0..width {
            for y in 0..height {
                let Some(cell_id) = self.coord_to_id(Vec2i::new(x, y)) else {
                    continue;
                };
                if let Some(tile) = self.precondition_solution(cell_id) {
                    state.set_solution(cell_id, tile);
                } else if let Some(domain) = self.precondition_domain(cell_id) {
                    if !domain.is_empty() {
                        ensure_same_size(
                            "Grid2DProblem::populate_initial_state",
                            self.tile_count(),
                            domain.size(),
                        )?;
                        state.set_domain(cell_id, domain.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Domain of `cell_id` pruned by the current domains of its neighbours
    ///
    /// Neighbours outside the rect and failed neighbours impose nothing. An
    /// empty result signals a contradiction; out-of-range ids yield an empty set.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the state's domains do not match
    /// the tile count
    pub fn compute_cell_domain(&self, state: &SolverState, cell_id: usize) -> Result<BitSet> {
        let (Some(current), Some(coord)) = (state.domain(cell_id), self.id_to_coord(cell_id))
        else {
            return Ok(BitSet::new(self.tile_count(), false));
        };
        let mut result = current.clone();

        for relation in self.relations.iter() {
            let Some(other_id) = self.neighbour(coord, relation.axis) else {
                continue;
            };
            if state.is_failed(other_id) {
                continue;
            }
            if let Some(other_domain) = state.domain(other_id) {
                result.intersect_in_place(&relation.matrix.transform(other_domain)?)?;
            }
        }

        Ok(result)
    }

    /// In-bounds neighbours of a cell, one per relation
    ///
    /// These are the cells to revisit after `cell_id` changes.
    pub fn get_related_cells(&self, cell_id: usize) -> Vec<usize> {
        let Some(coord) = self.id_to_coord(cell_id) else {
            return Vec::new();
        };
        self.relations
            .iter()
            .filter_map(|relation| self.neighbour(coord, relation.axis))
            .collect()
    }

    /// Remove one tile from `options` and return it, using the rules' weights when enabled
    pub fn pick_divergence_option<R: Rng>(
        &self,
        options: &mut Vec<usize>,
        rng: &mut R,
    ) -> Option<usize> {
        self.divergence.pick(options, rng)
    }

    /// One AC4 constraint per relation, in relation order
    pub fn get_ac4_binary_constraints(&self) -> Vec<Ac4BinaryConstraint> {
        self.relations
            .iter()
            .map(|relation| {
                Ac4BinaryConstraint::new(relation.axis, self.rect.size, Arc::clone(&relation.matrix))
            })
            .collect()
    }
}
