//! Tests for `BitMatrix` transposition and vector transform

#[cfg(test)]
mod tests {
    use gridwfc::algorithm::bitset::BitSet;
    use gridwfc::algorithm::matrix::BitMatrix;

    fn matrix(height: usize, width: usize, cells: &[(usize, usize)]) -> BitMatrix {
        let mut result = BitMatrix::new(height, width);
        for &(row, col) in cells {
            result.set(row, col, true);
        }
        result
    }

    // Verifies transposing twice returns the original matrix
    #[test]
    fn test_transpose_is_involution() {
        let original = matrix(3, 5, &[(0, 4), (1, 0), (2, 2), (2, 3)]);
        let transposed = original.transpose();

        assert_eq!(transposed.height(), 5);
        assert_eq!(transposed.width(), 3);
        assert!(transposed.get(4, 0));
        assert!(transposed.get(3, 2));
        assert_eq!(transposed.transpose(), original);
    }

    // Tests transform ORs the rows selected by the vector
    // Verified by intersecting rows instead of uniting them
    #[test]
    fn test_transform_unites_selected_rows() {
        let m = matrix(3, 4, &[(0, 0), (0, 1), (1, 2), (2, 3)]);

        let both = m.transform(&BitSet::from_bits(3, [0, 1])).unwrap();
        assert_eq!(both.to_vec(), vec![0, 1, 2]);

        let none = m.transform(&BitSet::new(3, false)).unwrap();
        assert!(none.is_empty());
        assert_eq!(none.size(), 4);
    }

    // Tests a vector of the wrong length is rejected
    #[test]
    fn test_transform_rejects_wrong_length() {
        let m = BitMatrix::new(3, 3);
        assert!(m.transform(&BitSet::new(4, true)).is_err());
    }

    // Tests rows must share one width
    #[test]
    fn test_from_rows_validates_width() {
        let ok = BitMatrix::from_rows(vec![BitSet::new(2, true), BitSet::new(2, false)]).unwrap();
        assert_eq!(ok.height(), 2);
        assert_eq!(ok.width(), 2);
        assert_eq!(ok.rows().len(), 2);

        assert!(BitMatrix::from_rows(vec![BitSet::new(2, true), BitSet::new(3, true)]).is_err());
    }

    // Tests out-of-range access is harmless
    #[test]
    fn test_out_of_range_access() {
        let mut m = BitMatrix::new(2, 2);
        m.set(5, 0, true);
        m.set(0, 5, true);
        assert!(!m.get(5, 0));
        assert!(m.row(5).is_none());
        assert!(m.row(0).is_some_and(BitSet::is_empty));
    }
}
