//! Spatial decomposition of one problem into overlapping, dependency-ordered bands
//!
//! Even-indexed bands are wide and independent; odd-indexed bands sit between
//! two even neighbours and start only after both finish, importing the
//! solved cells along their shared borders.

use crate::spatial::problem::Grid2DProblem;
use crate::spatial::rect::{Rect2i, Vec2i};

/// A problem produced by [`Grid2DProblem::split`] with its dependencies
#[derive(Clone, Debug)]
pub struct SubProblem {
    /// The band to solve
    pub problem: Grid2DProblem,
    /// Indices, within the same split result, of bands that must finish first
    pub dependencies: Vec<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SplitAxis {
    X,
    Y,
}

impl SplitAxis {
    const fn component(self, vector: Vec2i) -> i32 {
        match self {
            Self::X => vector.x,
            Self::Y => vector.y,
        }
    }

    const fn along(self, amount: i32) -> Vec2i {
        match self {
            Self::X => Vec2i::new(amount, 0),
            Self::Y => Vec2i::new(0, amount),
        }
    }

    const fn band(self, rect: Rect2i, start: i32, end: i32) -> Rect2i {
        match self {
            Self::X => Rect2i::new(start, rect.position.y, end - start, rect.size.y),
            Self::Y => Rect2i::new(rect.position.x, start, rect.size.x, end - start),
        }
    }
}

/// Cut `first .. first + size` into at most `partitions` ranges of at least `min_partition_size`
///
/// Returns the partition boundaries, first and last included. When even two
/// partitions would be too small the whole range comes back as one.
pub fn split_range(first: i32, size: i32, partitions: i32, min_partition_size: i32) -> Vec<i32> {
    if partitions <= 0 {
        return Vec::new();
    }

    let approx_partition_size = size / partitions;
    if approx_partition_size < min_partition_size {
        if partitions <= 2 {
            return vec![first, first + size];
        }
        return split_range(first, size, partitions - 1, min_partition_size);
    }

    (0..partitions)
        .map(|partition| first + (size * partition) / partitions)
        .chain(std::iter::once(first + size))
        .collect()
}

impl Grid2DProblem {
    /// Decompose the problem for up to `concurrency_limit` parallel workers
    ///
    /// Falls back to one dependency-free copy of the whole problem when the
    /// limit is below two or no axis yields at least three bands.
    pub fn split(&self, concurrency_limit: usize) -> Vec<SubProblem> {
        if concurrency_limit < 2 {
            return vec![self.whole()];
        }

        let rect = self.rect();
        let dependency_range = self.get_dependencies_range();
        let overlap_min = Vec2i::new(dependency_range.x / 2, dependency_range.y / 2);
        let overlap_max = overlap_min + Vec2i::new(dependency_range.x % 2, dependency_range.y % 2);
        let influence_range = self.rules().influence_range();

        let split_x_overhead = i64::from(influence_range.x) * i64::from(rect.size.y);
        let split_y_overhead = i64::from(influence_range.y) * i64::from(rect.size.x);

        let mut candidates = Vec::with_capacity(2);
        if split_x_overhead <= split_y_overhead {
            candidates.extend([SplitAxis::X, SplitAxis::Y]);
        } else {
            candidates.extend([SplitAxis::Y, SplitAxis::X]);
        }
        candidates.retain(|&axis| axis.component(influence_range) < axis.component(rect.size));

        if candidates.is_empty() {
            tracing::debug!(
                %influence_range,
                split_x_overhead,
                split_y_overhead,
                "could not split the problem"
            );
            return vec![self.whole()];
        }

        let partitions = i32::try_from(concurrency_limit.saturating_mul(2)).unwrap_or(i32::MAX);
        let chosen = candidates.iter().find_map(|&axis| {
            let extra = axis.component(influence_range) * 2;
            let min_size = (axis.component(dependency_range) + extra * 2).max(1);
            let bounds = split_range(
                axis.component(rect.position),
                axis.component(rect.size),
                partitions,
                min_size,
            );
            let bands: Vec<Rect2i> = bounds
                .windows(2)
                .filter_map(|pair| match *pair {
                    [start, end] => Some(axis.band(rect, start, end)),
                    _ => None,
                })
                .collect();
            if bands.len() < 3 {
                tracing::debug!(?axis, produced_rects = bands.len(), "could not split along axis");
                None
            } else {
                Some((bands, axis.along(extra)))
            }
        });

        let Some((bands, extra_overlap)) = chosen else {
            return vec![self.whole()];
        };

        let mut result: Vec<SubProblem> = bands
            .iter()
            .enumerate()
            .map(|(index, band)| {
                let renderable = band.expanded(overlap_min, overlap_max).intersection(&rect);
                let is_even = index % 2 == 0;
                let sub_rect = if is_even {
                    renderable
                        .expanded(extra_overlap, extra_overlap)
                        .intersection(&rect)
                } else {
                    renderable
                };

                let mut problem = self.with_rect(sub_rect);
                problem.set_renderable_rect(renderable);
                self.copy_preconditions_into(&mut problem);

                let dependencies = if is_even {
                    Vec::new()
                } else {
                    std::iter::once(index - 1)
                        .chain((index + 1 < bands.len()).then_some(index + 1))
                        .collect()
                };

                SubProblem {
                    problem,
                    dependencies,
                }
            })
            .collect();

        let renderable_rects: Vec<Rect2i> = result
            .iter()
            .map(|sub| sub.problem.renderable_rect())
            .collect();
        for sub in &mut result {
            let own_rect = sub.problem.rect();
            let read_rects = sub
                .dependencies
                .iter()
                .filter_map(|&dependency| renderable_rects.get(dependency))
                .map(|renderable| own_rect.intersection(renderable))
                .collect();
            sub.problem.set_init_read_rects(read_rects);
        }

        result
    }

    fn whole(&self) -> SubProblem {
        let mut problem = self.with_rect(self.rect());
        problem.set_renderable_rect(self.renderable_rect());
        self.copy_preconditions_into(&mut problem);
        SubProblem {
            problem,
            dependencies: Vec::new(),
        }
    }

    /// Carry preconditions over to a problem covering part of this one
    fn copy_preconditions_into(&self, target: &mut Grid2DProblem) {
        let offset = target.rect().position - self.rect().position;
        for point in target.rect().points() {
            let local = point - target.rect().position;
            let (Some(source_id), Some(target_id)) =
                (self.coord_to_id(local + offset), target.coord_to_id(local))
            else {
                continue;
            };
            if let Some(tile) = self.precondition_solution(source_id) {
                target.set_precondition_solution(target_id, tile);
            } else if let Some(domain) = self.precondition_domain(source_id) {
                target.set_precondition_domain(target_id, domain.clone());
            }
        }
    }
}
