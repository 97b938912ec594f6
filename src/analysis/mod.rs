//! Rule sets describing which tiles may neighbour each other

/// Adjacency rules declared by hand or learned from a sample
pub mod rules;
