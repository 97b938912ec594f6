//! Divergence option selection, uniform or weighted by per-tile probabilities

use rand::Rng;

/// How a tile is chosen when the solver has to guess a cell's value
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DivergenceStrategy {
    /// Every remaining option is equally likely
    #[default]
    Uniform,
    /// Options are sampled proportionally to these per-tile weights
    Weighted(Vec<f32>),
}

impl DivergenceStrategy {
    /// Remove one option from `options` and return it
    ///
    /// Returns `None` only when `options` is empty. Weighted sampling treats
    /// tiles without a weight as weight zero.
    pub fn pick<R: Rng>(&self, options: &mut Vec<usize>, rng: &mut R) -> Option<usize> {
        if options.is_empty() {
            return None;
        }

        let chosen_index = match self {
            Self::Uniform => rng.random_range(0..options.len()),
            Self::Weighted(_) if options.len() == 1 => 0,
            Self::Weighted(probabilities) => {
                let weights: Vec<f32> = options
                    .iter()
                    .map(|&option| probabilities.get(option).copied().unwrap_or(0.0))
                    .collect();
                let total: f32 = weights.iter().sum();
                if total > 0.0 && total.is_finite() {
                    select_by_cumulative(&weights, rng.random_range(0.0..total))
                } else {
                    0
                }
            }
        };

        (chosen_index < options.len()).then(|| options.remove(chosen_index))
    }
}

/// Index of the first weight whose running sum is strictly greater than `value`
///
/// A draw landing exactly on a cumulative boundary resolves to the next
/// option. Falls back to index 0 if no running sum exceeds `value`.
pub fn select_by_cumulative(weights: &[f32], value: f32) -> usize {
    let mut cumulative = 0.0;
    for (index, &weight) in weights.iter().enumerate() {
        cumulative += weight;
        if cumulative > value {
            return index;
        }
    }
    0
}
