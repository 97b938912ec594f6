/// AC4 binary constraints and support-count propagation
pub mod ac4;
/// Fixed-capacity bit set used for cell domains
pub mod bitset;
/// Bit matrices for adjacency relations
pub mod matrix;
/// Dependency-ordered parallel solving of sub-problems
pub mod runner;
/// Divergence option selection
pub mod selection;
/// Step-wise solver over one problem
pub mod solver;
/// Per-cell domains, solutions and backtracking history
pub mod state;
