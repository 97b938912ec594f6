pub mod bitset;
pub mod matrix;
pub mod selection;
