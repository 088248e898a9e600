//! Linear solver (component F), §4.6.
//!
//! Batched Gauss-Jordan elimination with partial pivoting: one `N × N`
//! system per fit, `N = n_parameters_to_fit`, solved independently on its
//! own `rayon` work item. A singular pivot marks that fit's
//! [`crate::buffers::FitWorkItem::singular`] flag and abandons the solve
//! for this iteration — the fit keeps its current parameters and is
//! caught by the singularity fan-out in `crate::driver`.

use rayon::prelude::*;

use crate::buffers::ChunkState;

/// Threshold below which a pivot is treated as zero. Named after the
/// teacher's `MATRIX_SINGULAR_EPS`, which plays the same role for its
/// (unrelated) SVD-based solve.
const SINGULAR_PIVOT_EPS: f64 = 1e-14;

/// Solve `H · δ = −g` for every non-finished fit in the chunk.
///
/// `gradient` holds `∇χ²` (the estimator summands are written so that a
/// *positive* entry means increasing that parameter increases chi-square),
/// so the descending LM step solves against its negation — the teacher's
/// ODR solve builds its right-hand side the same way (`let rhs = -&gradient_vector;`
/// before `solve_linear_system`). Solving against `gradient` directly would
/// walk every fit uphill.
pub fn solve(chunk: &mut ChunkState) {
    let n = chunk.n_parameters_to_fit();
    if n == 0 {
        return;
    }
    chunk.items.par_iter_mut().filter(|item| !item.finished).for_each(|item| {
        let negative_gradient: Vec<f64> = item.gradient.iter().map(|&g| -g).collect();
        item.singular = !gauss_jordan_solve(&item.hessian, &negative_gradient, n, &mut item.delta);
    });
}

/// Solve one fit's `n × n` system in place into `delta`. Returns `false`
/// (and leaves `delta` unspecified) if a singular pivot was hit.
fn gauss_jordan_solve(hessian: &[f64], gradient: &[f64], n: usize, delta: &mut [f64]) -> bool {
    // Augmented matrix [H | g], row-major, n columns of H plus one of g.
    let mut augmented = vec![0.0; n * (n + 1)];
    for row in 0..n {
        augmented[row * (n + 1)..row * (n + 1) + n].copy_from_slice(&hessian[row * n..row * n + n]);
        augmented[row * (n + 1) + n] = gradient[row];
    }

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_value = augmented[col * (n + 1) + col].abs();
        for row in (col + 1)..n {
            let candidate = augmented[row * (n + 1) + col].abs();
            if candidate > pivot_value {
                pivot_value = candidate;
                pivot_row = row;
            }
        }
        if pivot_value < SINGULAR_PIVOT_EPS {
            return false;
        }

        if pivot_row != col {
            for c in 0..=n {
                augmented.swap(col * (n + 1) + c, pivot_row * (n + 1) + c);
            }
        }

        let pivot = augmented[col * (n + 1) + col];
        for c in 0..=n {
            augmented[col * (n + 1) + c] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = augmented[row * (n + 1) + col];
            if factor == 0.0 {
                continue;
            }
            for c in 0..=n {
                augmented[row * (n + 1) + c] -= factor * augmented[col * (n + 1) + c];
            }
        }
    }

    for row in 0..n {
        delta[row] = augmented[row * (n + 1) + n];
    }
    true
}
