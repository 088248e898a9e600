//! Resource planner (component C).
//!
//! Before the first iteration, the engine decides how many fits fit in one
//! chunk's working memory and how rayon should partition within a chunk.
//! On a real GPU backend these numbers would come from a device query;
//! here they come from [`crate::config::EngineLimits`], but the arithmetic
//! is exercised identically either way (see `SPEC_FULL.md`).

use crate::config::EngineLimits;
use crate::error::FitError;

/// Sizing decisions made once per [`crate::fit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    /// Smallest power of two ≥ `n_points`; the zero-padded reduction width
    /// used by the chi-square and gradient kernels.
    pub power_of_two_n_points: usize,
    /// How many fits rayon's scoped pool should group together for a
    /// single dispatch unit within a chunk.
    pub n_fits_per_block: usize,
    /// How many fits to process per chunk, rounded down to the largest
    /// power of ten ≤ itself.
    pub max_chunk_size: usize,
}

/// Compute the chunk plan for one [`crate::fit`] call.
///
/// # Errors
/// Returns [`FitError::ChunkBudgetExceeded`] if a single fit's working set
/// does not fit in `limits.available_memory_bytes`.
pub fn plan(
    n_fits: usize,
    n_points: usize,
    n_parameters: usize,
    n_parameters_to_fit: usize,
    use_weights: bool,
    limits: &EngineLimits,
) -> Result<ChunkPlan, FitError> {
    let power_of_two_n_points = n_points.next_power_of_two();

    let one_fit_footprint = one_fit_footprint_bytes(n_points, n_parameters, n_parameters_to_fit, use_weights);
    if one_fit_footprint == 0 {
        return Err(FitError::ChunkBudgetExceeded {
            bytes_per_fit: one_fit_footprint,
            budget: limits.available_memory_bytes,
        });
    }
    let by_memory = limits.available_memory_bytes / one_fit_footprint;
    if by_memory == 0 {
        return Err(FitError::ChunkBudgetExceeded {
            bytes_per_fit: one_fit_footprint,
            budget: limits.available_memory_bytes,
        });
    }

    let scaling_factor = if n_parameters_to_fit > 0 {
        n_points * n_parameters_to_fit * n_parameters_to_fit
    } else {
        n_points * n_parameters
    };
    let by_scaling = if scaling_factor == 0 { usize::MAX } else { usize::MAX / scaling_factor };

    let raw_chunk_size = by_memory
        .min(limits.max_concurrent_blocks)
        .min(by_scaling)
        .min(n_fits)
        .max(1);
    let max_chunk_size = round_down_to_power_of_ten(raw_chunk_size);

    let n_fits_per_block = fits_per_block(max_chunk_size, n_points, limits.max_threads);

    Ok(ChunkPlan {
        power_of_two_n_points,
        n_fits_per_block,
        max_chunk_size,
    })
}

fn one_fit_footprint_bytes(n_points: usize, n_parameters: usize, n_parameters_to_fit: usize, use_weights: bool) -> usize {
    let core = 4 * (2 * n_points
        + 2 * n_parameters
        + 2 * n_parameters_to_fit
        + n_parameters_to_fit * n_parameters_to_fit
        + n_points * n_parameters
        + 4)
        + 4 * 3;
    let weights = if use_weights { 4 * n_points } else { 0 };
    core + weights
}

fn fits_per_block(chunk_size: usize, n_points: usize, max_threads: usize) -> usize {
    let mut n_fits_per_block = 8_usize.min(chunk_size.max(1));
    while n_fits_per_block > 1 {
        let divides_evenly = chunk_size % n_fits_per_block == 0;
        let fits_thread_budget = n_fits_per_block * n_points < max_threads / 4;
        if divides_evenly && fits_thread_budget {
            break;
        }
        n_fits_per_block /= 2;
    }
    n_fits_per_block.max(1)
}

fn round_down_to_power_of_ten(value: usize) -> usize {
    if value == 0 {
        return 0;
    }
    let mut power_of_ten = 1_usize;
    while power_of_ten.saturating_mul(10) <= value {
        power_of_ten *= 10;
    }
    (value / power_of_ten) * power_of_ten
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_two_rounds_up() {
        let plan = plan(1, 50, 4, 4, false, &EngineLimits::default()).expect("plan succeeds");
        assert_eq!(plan.power_of_two_n_points, 64);
    }

    #[test]
    fn max_chunk_size_rounds_down_to_a_power_of_ten() {
        assert_eq!(round_down_to_power_of_ten(37_421), 30_000);
        assert_eq!(round_down_to_power_of_ten(9), 9);
        assert_eq!(round_down_to_power_of_ten(10), 10);
        assert_eq!(round_down_to_power_of_ten(999), 900);
    }

    #[test]
    fn chunk_never_exceeds_n_fits() {
        let plan = plan(3, 10, 2, 2, false, &EngineLimits::default()).expect("plan succeeds");
        assert!(plan.max_chunk_size <= 3);
    }

    #[test]
    fn rejects_a_footprint_larger_than_the_memory_budget() {
        let tiny = EngineLimits {
            available_memory_bytes: 1,
            ..EngineLimits::default()
        };
        let err = plan(10, 10, 4, 4, false, &tiny).expect_err("footprint exceeds budget");
        assert!(matches!(err, FitError::ChunkBudgetExceeded { .. }));
    }
}
