//! Adjacency rule sets, declared by hand or learned from a labeled sample grid

use crate::algorithm::matrix::BitMatrix;
use crate::algorithm::selection::DivergenceStrategy;
use crate::io::error::{Result, WfcError, invalid_argument};
use crate::spatial::rect::Vec2i;
use ndarray::Array2;

/// Tile adjacency rules for 2D problems
///
/// Each declared axis carries a `tile_count` x `tile_count` matrix whose row
/// `i` lists the tiles allowed in a cell when the cell one `axis` step away
/// holds tile `i`. Only one direction per axis is declared; problems derive
/// the opposite direction from the transposed matrix.
#[derive(Clone, Debug, Default)]
pub struct Rules2D {
    tile_count: usize,
    axes: Vec<Vec2i>,
    axis_matrices: Vec<BitMatrix>,
    probabilities: Vec<f32>,
    probabilities_enabled: bool,
    influence_range: Option<Vec2i>,
}

impl Rules2D {
    /// Create an empty rule set over `tile_count` tiles
    pub fn new(tile_count: usize) -> Self {
        Self {
            tile_count,
            ..Self::default()
        }
    }

    /// Declare one adjacency direction
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if `axis` is zero or the matrix is
    /// not `tile_count` x `tile_count`
    pub fn add_axis(&mut self, axis: Vec2i, matrix: BitMatrix) -> Result<()> {
        if axis == Vec2i::ZERO {
            return Err(invalid_argument("Rules2D::add_axis", &"axis must be non-zero"));
        }
        if matrix.height() != self.tile_count || matrix.width() != self.tile_count {
            return Err(invalid_argument(
                "Rules2D::add_axis",
                &format!(
                    "matrix is {}x{} but there are {} tiles",
                    matrix.height(),
                    matrix.width(),
                    self.tile_count
                ),
            ));
        }
        self.axes.push(axis);
        self.axis_matrices.push(matrix);
        Ok(())
    }

    /// Set per-tile weights and enable weighted divergence
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if there is not one weight per tile
    pub fn set_probabilities(&mut self, probabilities: Vec<f32>) -> Result<()> {
        if probabilities.len() != self.tile_count {
            return Err(invalid_argument(
                "Rules2D::set_probabilities",
                &format!(
                    "{} weights for {} tiles",
                    probabilities.len(),
                    self.tile_count
                ),
            ));
        }
        self.probabilities = probabilities;
        self.probabilities_enabled = true;
        Ok(())
    }

    /// Toggle weighted divergence without discarding the weights
    pub const fn set_probabilities_enabled(&mut self, enabled: bool) {
        self.probabilities_enabled = enabled;
    }

    /// Override how far one tile's constraint can reach
    pub const fn set_influence_range(&mut self, range: Vec2i) {
        self.influence_range = Some(range);
    }

    /// Number of distinct tiles
    pub const fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Declared axes, in declaration order
    pub fn axes(&self) -> &[Vec2i] {
        &self.axes
    }

    /// Matrices matching [`Rules2D::axes`]
    pub fn axis_matrices(&self) -> &[BitMatrix] {
        &self.axis_matrices
    }

    /// Per-tile weights
    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// Whether divergence samples by weight
    pub const fn probabilities_enabled(&self) -> bool {
        self.probabilities_enabled
    }

    /// Reach of a single tile's constraint, used to size split overlaps
    ///
    /// Defaults to the largest absolute axis component per dimension.
    pub fn influence_range(&self) -> Vec2i {
        self.influence_range.unwrap_or_else(|| {
            self.axes
                .iter()
                .fold(Vec2i::ZERO, |range, axis| range.max(axis.abs()))
        })
    }

    /// Strategy used to pick a tile when the solver must guess
    pub fn divergence_strategy(&self) -> DivergenceStrategy {
        if self.probabilities_enabled {
            DivergenceStrategy::Weighted(self.probabilities.clone())
        } else {
            DivergenceStrategy::Uniform
        }
    }

    /// Learn rules from a sample grid of tile labels indexed `[row, col]`
    ///
    /// Declares axes (1, 0) and (0, 1) with every neighbour pair observed in
    /// the sample, and weights tiles by how often they occur.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample is empty or holds a label `>= tile_count`
    pub fn from_sample(sample: &Array2<usize>, tile_count: usize) -> Result<Self> {
        if sample.is_empty() || tile_count == 0 {
            return Err(WfcError::InvalidSourceData {
                reason: "Sample grid is empty".to_string(),
            });
        }
        if let Some(&label) = sample.iter().find(|&&label| label >= tile_count) {
            return Err(WfcError::InvalidSourceData {
                reason: format!("Sample label {label} exceeds tile count {tile_count}"),
            });
        }

        let mut horizontal = BitMatrix::new(tile_count, tile_count);
        let mut vertical = BitMatrix::new(tile_count, tile_count);
        let mut counts = vec![0usize; tile_count];

        for ((row, col), &tile) in sample.indexed_iter() {
            if let Some(count) = counts.get_mut(tile) {
                *count += 1;
            }
            if let Some(&right) = sample.get((row, col + 1)) {
                horizontal.set(right, tile, true);
            }
            if let Some(&below) = sample.get((row + 1, col)) {
                vertical.set(below, tile, true);
            }
        }

        let total = sample.len() as f32;
        let mut rules = Self::new(tile_count);
        rules.add_axis(Vec2i::new(1, 0), horizontal)?;
        rules.add_axis(Vec2i::new(0, 1), vertical)?;
        rules.set_probabilities(counts.iter().map(|&count| count as f32 / total).collect())?;
        Ok(rules)
    }
}
