//! Wave function collapse over 2D grids with spatial splitting and parallel solving
//!
//! Adjacency rules map each tile to the tiles allowed next to it along an
//! axis. A [`spatial::problem::Grid2DProblem`] applies them to a rectangle,
//! [`Grid2DProblem::split`](spatial::problem::Grid2DProblem::split) cuts it
//! into overlapping bands with a dependency graph, and
//! [`algorithm::runner::MultithreadedRunner`] solves the bands on worker
//! threads, seeding dependent bands with the borders of finished ones.

#![forbid(unsafe_code)]

/// Bit-set algebra, solver state, propagation and the multithreaded runner
pub mod algorithm;
/// Adjacency rule sets
pub mod analysis;
/// Input/output operations, configuration and error handling
pub mod io;
/// Grid geometry, problems, splitting and solved-grid assembly
pub mod spatial;

pub use io::error::{Result, WfcError};
