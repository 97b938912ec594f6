//! Tests for rule declaration and learning rules from a sample grid

#[cfg(test)]
mod tests {
    use gridwfc::WfcError;
    use gridwfc::algorithm::matrix::BitMatrix;
    use gridwfc::algorithm::selection::DivergenceStrategy;
    use gridwfc::analysis::rules::Rules2D;
    use gridwfc::spatial::rect::Vec2i;
    use ndarray::{Array2, array};

    // Verifies axis declarations are validated against the tile count
    #[test]
    fn test_add_axis_validation() {
        let mut rules = Rules2D::new(2);
        assert!(rules.add_axis(Vec2i::ZERO, BitMatrix::new(2, 2)).is_err());
        assert!(rules.add_axis(Vec2i::new(1, 0), BitMatrix::new(3, 2)).is_err());
        assert!(rules.add_axis(Vec2i::new(1, 0), BitMatrix::new(2, 2)).is_ok());
        assert_eq!(rules.axes(), &[Vec2i::new(1, 0)]);
        assert_eq!(rules.axis_matrices().len(), 1);
    }

    // Tests the influence range defaults to the largest axis extent and can be overridden
    #[test]
    fn test_influence_range() {
        let mut rules = Rules2D::new(1);
        rules.add_axis(Vec2i::new(-2, 1), BitMatrix::new(1, 1)).unwrap();
        assert_eq!(rules.influence_range(), Vec2i::new(2, 1));

        rules.set_influence_range(Vec2i::new(5, 5));
        assert_eq!(rules.influence_range(), Vec2i::new(5, 5));
    }

    // Tests probabilities need one weight per tile and switch divergence to weighted
    #[test]
    fn test_probabilities() {
        let mut rules = Rules2D::new(2);
        assert_eq!(rules.divergence_strategy(), DivergenceStrategy::Uniform);
        assert!(rules.set_probabilities(vec![1.0]).is_err());

        rules.set_probabilities(vec![0.25, 0.75]).unwrap();
        assert!(rules.probabilities_enabled());
        assert_eq!(
            rules.divergence_strategy(),
            DivergenceStrategy::Weighted(vec![0.25, 0.75])
        );

        rules.set_probabilities_enabled(false);
        assert_eq!(rules.divergence_strategy(), DivergenceStrategy::Uniform);
        assert_eq!(rules.probabilities(), &[0.25, 0.75]);
    }

    // Tests learned matrices record each observed neighbour pair in the right direction
    // Verified by swapping the row and column arguments when recording pairs
    #[test]
    fn test_from_sample_adjacency() {
        let sample = array![[0, 1], [2, 2]];
        let rules = Rules2D::from_sample(&sample, 3).unwrap();

        assert_eq!(rules.axes(), &[Vec2i::new(1, 0), Vec2i::new(0, 1)]);
        let horizontal = &rules.axis_matrices()[0];
        let vertical = &rules.axis_matrices()[1];

        // A 1 to the right allows a 0; a 2 to the right allows a 2
        assert!(horizontal.get(1, 0));
        assert!(horizontal.get(2, 2));
        assert!(!horizontal.get(0, 1));
        // A 2 below allows a 0 and a 1
        assert!(vertical.get(2, 0));
        assert!(vertical.get(2, 1));
        assert!(!vertical.get(0, 2));
    }

    // Tests learned weights are tile frequencies
    #[test]
    fn test_from_sample_frequencies() {
        let sample = array![[0, 0, 0, 1]];
        let rules = Rules2D::from_sample(&sample, 2).unwrap();
        assert!(rules.probabilities_enabled());
        assert_eq!(rules.probabilities(), &[0.75, 0.25]);
        assert_eq!(rules.tile_count(), 2);
    }

    // Tests unusable samples are rejected
    #[test]
    fn test_from_sample_rejects_bad_input() {
        let empty: Array2<usize> = Array2::zeros((0, 0));
        assert!(matches!(
            Rules2D::from_sample(&empty, 1),
            Err(WfcError::InvalidSourceData { .. })
        ));
        assert!(Rules2D::from_sample(&array![[0, 3]], 2).is_err());
    }
}
