//! Numeric kernels (component E), §4.5 (a)-(d) and (f).
//!
//! Damping's rollback-undo/apply is folded into [`damping`] (e). The
//! linear solve (f in the spec's lettering, §4.6) lives in
//! `crate::solver` since it is a distinct enough algorithm (batched
//! Gauss-Jordan) to deserve its own module. Parameter update (f here,
//! §4.5f) is [`update_parameters`].
//!
//! Every kernel dispatches one `rayon` work item per live fit; a fit with
//! `finished == true` is never touched, matching the "no writes past
//! finished" invariant.

use rayon::prelude::*;

use crate::buffers::ChunkState;
use crate::estimators::{ChiSquareSummand, Estimator};
use crate::models::Model;
use crate::types::{FitState as TerminalState, UserInfo};

/// (a) Curve values and derivatives.
pub fn evaluate(chunk: &mut ChunkState, model: &dyn Model, user_info: &UserInfo) {
    chunk.items.par_iter_mut().filter(|item| !item.finished).for_each(|item| {
        model.evaluate(&item.parameters, user_info, &mut item.values, &mut item.derivatives);
    });
}

/// Pairwise-halving tree reduction over a power-of-two-length buffer,
/// matching the zero-before-write reduction-padding rule (§9).
fn tree_reduce_sum(buffer: &mut [f64]) -> f64 {
    let mut width = buffer.len();
    while width > 1 {
        let half = width / 2;
        let (lo, hi) = buffer.split_at_mut(half);
        for (l, h) in lo.iter_mut().zip(hi.iter()) {
            *l += *h;
        }
        width = half;
    }
    buffer[0]
}

/// (b) Chi-square. Also sets `iteration_failed` and fans out
/// [`TerminalState::NegCurvatureMle`] for MLE fits that saw a non-positive
/// model value.
pub fn chi_square(chunk: &mut ChunkState, estimator: &dyn Estimator) {
    let n_points = chunk.n_points;
    let power_of_two_n_points = chunk.power_of_two_n_points;
    let use_weights = chunk.use_weights;
    chunk.items.par_iter_mut().filter(|item| !item.finished).for_each(|item| {
        let mut reduction_buffer = vec![0.0; power_of_two_n_points];
        let mut saw_non_positive_model = false;
        for point in 0..n_points {
            let weight = if use_weights { item.weights[point] } else { 1.0 };
            match estimator.chi_square_summand(item.data[point], item.values[point], weight, use_weights) {
                ChiSquareSummand::Value(contribution) => reduction_buffer[point] = contribution,
                ChiSquareSummand::NonPositiveModel => saw_non_positive_model = true,
            }
        }
        let chi_square = tree_reduce_sum(&mut reduction_buffer);
        item.iteration_failed = item.prev_chi_square != 0.0 && chi_square >= item.prev_chi_square;
        item.chi_square = chi_square;
        if saw_non_positive_model {
            tracing::warn!(fit_chi_square = chi_square, "MLE fit evaluated a non-positive model value");
            item.terminal_state = TerminalState::NegCurvatureMle;
        }
    });
}

/// (c) Gradient over the free-parameter index table. Skipped for any fit
/// that is finished or whose last step failed.
pub fn gradient(chunk: &mut ChunkState, estimator: &dyn Estimator) {
    let n_points = chunk.n_points;
    let use_weights = chunk.use_weights;
    let free_index_table = &chunk.free_index_table;
    chunk
        .items
        .par_iter_mut()
        .filter(|item| !item.finished && !item.iteration_failed)
        .for_each(|item| {
            for (p, &free_index) in free_index_table.iter().enumerate() {
                let mut reduction = 0.0;
                for point in 0..n_points {
                    let weight = if use_weights { item.weights[point] } else { 1.0 };
                    let d_value = item.derivatives[free_index * n_points + point];
                    reduction += estimator.gradient_summand(item.data[point], item.values[point], weight, use_weights, d_value);
                }
                item.gradient[p] = reduction;
            }
        });
}

/// (d) Gauss-Newton Hessian approximation over free parameters.
/// Accumulated in `f64` per point, matching the double-accumulation rule.
pub fn hessian(chunk: &mut ChunkState, estimator: &dyn Estimator) {
    let n_points = chunk.n_points;
    let use_weights = chunk.use_weights;
    let free_index_table = &chunk.free_index_table;
    let n_parameters_to_fit = free_index_table.len();
    chunk
        .items
        .par_iter_mut()
        .filter(|item| !item.finished && !item.iteration_failed)
        .for_each(|item| {
            for i in 0..n_parameters_to_fit {
                let free_i = free_index_table[i];
                for j in 0..n_parameters_to_fit {
                    let free_j = free_index_table[j];
                    let mut accumulator = 0.0_f64;
                    for point in 0..n_points {
                        let weight = if use_weights { item.weights[point] } else { 1.0 };
                        let d_i = item.derivatives[free_i * n_points + point];
                        let d_j = item.derivatives[free_j * n_points + point];
                        accumulator += estimator.hessian_summand(item.data[point], item.values[point], weight, use_weights, d_i, d_j);
                    }
                    item.hessian[i * n_parameters_to_fit + j] = accumulator;
                }
            }
        });
}

/// (e) Damping: undo the previous iteration's diagonal scaling on a
/// rejected step, then apply the current one, for every live fit.
pub fn damping(chunk: &mut ChunkState) {
    let n_parameters_to_fit = chunk.n_parameters_to_fit();
    chunk.items.par_iter_mut().filter(|item| !item.finished).for_each(|item| {
        if n_parameters_to_fit == 0 {
            return;
        }
        if item.iteration_failed {
            for d in 0..n_parameters_to_fit {
                item.hessian[d * n_parameters_to_fit + d] /= 1.0 + item.lambda / 10.0;
            }
        }
        for d in 0..n_parameters_to_fit {
            item.hessian[d * n_parameters_to_fit + d] *= 1.0 + item.lambda;
        }
    });
}

/// (f, in §4.5's lettering) Parameter update. Every slot unconditionally
/// snapshots `parameters` into `prev_parameters` first — including fits
/// that just became finished this iteration — so rollback always has a
/// valid snapshot to restore from; only non-finished fits then add their
/// solved delta.
pub fn update_parameters(chunk: &mut ChunkState) {
    let free_index_table = &chunk.free_index_table;
    chunk.items.par_iter_mut().for_each(|item| {
        item.prev_parameters.copy_from_slice(&item.parameters);
        if item.finished {
            return;
        }
        for (p, &free_index) in free_index_table.iter().enumerate() {
            item.parameters[free_index] += item.delta[p];
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_reduce_sums_a_padded_power_of_two_buffer() {
        let mut buffer = vec![1.0, 2.0, 3.0, 0.0];
        assert!((tree_reduce_sum(&mut buffer) - 6.0).abs() < 1e-12);
    }

    #[test]
    fn tree_reduce_single_element_returns_itself() {
        let mut buffer = vec![7.0];
        assert!((tree_reduce_sum(&mut buffer) - 7.0).abs() < 1e-12);
    }
}
