//! Tests for uniform and weighted divergence selection

#[cfg(test)]
mod tests {
    use gridwfc::algorithm::selection::{DivergenceStrategy, select_by_cumulative};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Verifies cumulative selection uses a strict comparison at boundaries
    // Verified by changing `>` to `>=`
    #[test]
    fn test_select_by_cumulative_strict_boundary() {
        let weights = [1.0, 1.0, 2.0];
        assert_eq!(select_by_cumulative(&weights, 0.0), 0);
        assert_eq!(select_by_cumulative(&weights, 0.5), 0);
        assert_eq!(select_by_cumulative(&weights, 1.0), 1);
        assert_eq!(select_by_cumulative(&weights, 2.0), 2);
        assert_eq!(select_by_cumulative(&weights, 3.9), 2);
    }

    // Tests a draw past every cumulative sum falls back to the first index
    #[test]
    fn test_select_by_cumulative_fallback() {
        assert_eq!(select_by_cumulative(&[1.0, 1.0], 5.0), 0);
        assert_eq!(select_by_cumulative(&[], 0.0), 0);
    }

    // Tests picking removes the chosen option from the list
    #[test]
    fn test_pick_removes_option() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut options = vec![2, 4, 6];
        let chosen = DivergenceStrategy::Uniform.pick(&mut options, &mut rng);

        let tile = chosen.unwrap_or(usize::MAX);
        assert!([2, 4, 6].contains(&tile), "picked {chosen:?}");
        assert_eq!(options.len(), 2);
        assert!(!options.contains(&tile));
    }

    // Tests an empty option list yields nothing
    #[test]
    fn test_pick_from_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut options = Vec::new();
        assert_eq!(DivergenceStrategy::Uniform.pick(&mut options, &mut rng), None);
        assert_eq!(
            DivergenceStrategy::Weighted(vec![1.0]).pick(&mut options, &mut rng),
            None
        );
    }

    // Tests zero-weight tiles are never chosen while others remain
    // Verified by ignoring the weights and picking uniformly
    #[test]
    fn test_weighted_pick_skips_zero_weights() {
        let strategy = DivergenceStrategy::Weighted(vec![0.0, 1.0, 0.0, 3.0]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut options = vec![0, 1, 2, 3];
            let chosen = strategy.pick(&mut options, &mut rng);
            assert!(matches!(chosen, Some(1 | 3)), "picked {chosen:?}");
        }
    }

    // Tests weighted sampling roughly follows the weights
    #[test]
    fn test_weighted_pick_follows_weights() {
        let strategy = DivergenceStrategy::Weighted(vec![1.0, 9.0]);
        let mut rng = StdRng::seed_from_u64(3);
        let heavy = (0..2000)
            .filter(|_| {
                let mut options = vec![0, 1];
                strategy.pick(&mut options, &mut rng) == Some(1)
            })
            .count();
        assert!(heavy > 1600, "heavy tile picked {heavy} times");
    }

    // Tests an all-zero weight sum degrades to the first option
    #[test]
    fn test_weighted_pick_all_zero() {
        let strategy = DivergenceStrategy::Weighted(vec![0.0, 0.0, 0.0]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut options = vec![2, 1];
        assert_eq!(strategy.pick(&mut options, &mut rng), Some(2));
        assert_eq!(options, vec![1]);
    }

    // Tests the same seed reproduces the same choices
    #[test]
    fn test_pick_is_deterministic_per_seed() {
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| {
                    let mut options: Vec<usize> = (0..8).collect();
                    DivergenceStrategy::Uniform.pick(&mut options, &mut rng)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(11), picks(11));
    }
}
