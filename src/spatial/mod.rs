//! Spatial data structures and grid decomposition
//!
//! This module contains spatial-related functionality including:
//! - Integer vectors and rectangles
//! - Grid problems with adjacency relations and preconditions
//! - Splitting problems into dependent sub-problems
//! - Assembling solved sub-problems into one grid

/// Assembled solutions over a rectangle
pub mod grid;
/// Rectangular WFC problems
pub mod problem;
/// Integer vectors and rectangles
pub mod rect;
/// Problem splitting for parallel solving
pub mod split;

pub use grid::SolvedGrid;
pub use problem::Grid2DProblem;
pub use rect::{Rect2i, Vec2i};
