use crate::algorithm::bitset::BitSet;
use crate::io::error::{Result, ensure_same_size, invalid_argument};

/// Dense boolean matrix stored as rows of [`BitSet`]
///
/// For adjacency rules, row `i` lists the tiles allowed in a cell when its
/// neighbour along the rule axis holds tile `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitMatrix {
    rows: Vec<BitSet>,
    width: usize,
}

impl BitMatrix {
    /// Create an all-zero matrix
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            rows: vec![BitSet::new(width, false); height],
            width,
        }
    }

    /// Build a matrix from existing rows
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the rows differ in length
    pub fn from_rows(rows: Vec<BitSet>) -> Result<Self> {
        let width = rows.first().map_or(0, BitSet::size);
        if let Some(row) = rows.iter().find(|row| row.size() != width) {
            return Err(invalid_argument(
                "BitMatrix::from_rows",
                &format!("row of width {} in matrix of width {width}", row.size()),
            ));
        }
        Ok(Self { rows, width })
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of bits per row
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Borrow a row, or `None` when out of range
    pub fn row(&self, index: usize) -> Option<&BitSet> {
        self.rows.get(index)
    }

    /// All rows in order
    pub fn rows(&self) -> &[BitSet] {
        &self.rows
    }

    /// Read one element; out-of-range reads as unset
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.rows.get(row).is_some_and(|bits| bits.get_bit(col))
    }

    /// Write one element; out-of-range writes are ignored
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        if let Some(bits) = self.rows.get_mut(row) {
            bits.set_bit(col, value);
        }
    }

    /// Swap rows and columns
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut result = Self::new(self.width, self.height());
        for (i, row) in self.rows.iter().enumerate() {
            for j in row {
                result.set(j, i, true);
            }
        }
        result
    }

    /// Project a set of row indices through the matrix
    ///
    /// Output bit `j` is set when some `i` in `vector` has bit `j` set in row `i`.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if `vector` is not `height` bits long
    pub fn transform(&self, vector: &BitSet) -> Result<BitSet> {
        ensure_same_size("BitMatrix::transform", self.height(), vector.size())?;
        let mut result = BitSet::new(self.width, false);
        for i in vector {
            if let Some(row) = self.rows.get(i) {
                result.union_in_place(row)?;
            }
        }
        Ok(result)
    }
}
