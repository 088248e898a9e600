//! Massively parallel Levenberg-Marquardt curve-fitting engine.
//!
//! Fits many independent non-linear least-squares (or maximum-likelihood)
//! problems in one call, dispatching each fit's work across a `rayon`
//! thread pool the way the reference engine dispatches it across a GPU's
//! SIMT cores. See [`fit`] for the entry point and `SPEC_FULL.md` for the
//! full design.

pub mod buffers;
pub mod config;
pub mod driver;
pub mod error;
pub mod estimators;
pub mod kernels;
pub mod models;
pub mod planner;
pub mod solver;
pub mod types;

use buffers::ChunkState;
use config::{EngineLimits, SolverTuning};
use error::FitError;
use types::{EstimatorId, FitOutput, FitRequest, FitState, ModelId, UserInfo};

/// Run a batch of independent curve fits.
///
/// Conceptually equivalent to the reference engine's C entry point
///
/// ```text
/// fit(n_fits, n_points, data, weights_or_null, model_id, initial_parameters,
///     tolerance, max_iterations, parameters_to_fit, estimator_id,
///     user_info_size, user_info, out_parameters, out_states,
///     out_chi_squares, out_n_iterations) -> status_code
/// ```
///
/// but rendered as a `Result`-returning function: `Ok` corresponds to
/// `status_code == 0`, `Err(FitError)` to `status_code == -1`, and the
/// error's `Display` message plays the role of `get_last_error()`.
///
/// Per-fit failures (singular Hessian, non-positive MLE model value,
/// iteration budget exhaustion) are never a `FitError` — they are
/// recorded in [`FitOutput::states`] and the call still returns `Ok`.
///
/// # Errors
/// Returns [`FitError`] if the request is shaped incorrectly (buffer
/// length mismatches, zero fits/points/iterations, a mismatched
/// parameter count, or a `user_info` grid that does not fit the model),
/// or if a single fit's working set does not fit the configured memory
/// budget.
pub fn fit(request: &FitRequest, limits: &EngineLimits, tuning: &SolverTuning) -> Result<FitOutput, FitError> {
    validate(request)?;

    let model = models::registry(request.model_id);
    let estimator = estimators::registry(request.estimator_id);
    let n_parameters = model.parameter_count();
    let free_index_table: Vec<usize> = request
        .parameters_to_fit
        .iter()
        .enumerate()
        .filter(|&(_, &flag)| flag != 0)
        .map(|(index, _)| index)
        .collect();
    let use_weights = !request.weights.is_empty();

    let plan = planner::plan(
        request.n_fits,
        request.n_points,
        n_parameters,
        free_index_table.len(),
        use_weights,
        limits,
    )?;

    let mut parameters = vec![0.0; request.n_fits * n_parameters];
    let mut states = vec![FitState::Converged; request.n_fits];
    let mut chi_squares = vec![0.0; request.n_fits];
    let mut n_iterations = vec![0; request.n_fits];

    let mut start = 0;
    while start < request.n_fits {
        let chunk_len = plan.max_chunk_size.min(request.n_fits - start);
        let mut chunk = ChunkState::new(
            start,
            chunk_len,
            request.n_points,
            n_parameters,
            free_index_table.clone(),
            use_weights,
            plan.power_of_two_n_points,
            &request.data,
            &request.weights,
            &request.initial_parameters,
            tuning.default_damping,
        );

        driver::run_chunk(
            &mut chunk,
            model,
            estimator,
            &request.user_info,
            request.tolerance,
            request.max_iterations,
            tuning,
        );

        for (local, item) in chunk.items.into_iter().enumerate() {
            let fit_index = start + local;
            parameters[fit_index * n_parameters..(fit_index + 1) * n_parameters].copy_from_slice(&item.parameters);
            states[fit_index] = item.terminal_state;
            chi_squares[fit_index] = item.chi_square;
            n_iterations[fit_index] = item.n_iterations;
        }

        start += chunk_len;
    }

    Ok(FitOutput {
        parameters,
        states,
        chi_squares,
        n_iterations,
    })
}

fn validate(request: &FitRequest) -> Result<(), FitError> {
    if request.n_fits == 0 {
        return Err(FitError::EmptyBatch);
    }
    if request.n_points == 0 {
        return Err(FitError::EmptyPointSet);
    }
    if request.max_iterations == 0 {
        return Err(FitError::ZeroIterationBudget);
    }
    if request.tolerance <= 0.0 {
        return Err(FitError::NonPositiveTolerance { actual: request.tolerance });
    }

    let model = models::registry(request.model_id);
    let n_parameters = model.parameter_count();

    if request.parameters_to_fit.len() != n_parameters {
        return Err(FitError::ParameterMaskLengthMismatch {
            expected: n_parameters,
            actual: request.parameters_to_fit.len(),
        });
    }

    let expected_data_len = request.n_fits * request.n_points;
    if request.data.len() != expected_data_len {
        return Err(FitError::BufferLengthMismatch {
            field: "data",
            expected: expected_data_len,
            actual: request.data.len(),
        });
    }
    if !request.weights.is_empty() && request.weights.len() != expected_data_len {
        return Err(FitError::BufferLengthMismatch {
            field: "weights",
            expected: expected_data_len,
            actual: request.weights.len(),
        });
    }
    let expected_parameters_len = request.n_fits * n_parameters;
    if request.initial_parameters.len() != expected_parameters_len {
        return Err(FitError::BufferLengthMismatch {
            field: "initial_parameters",
            expected: expected_parameters_len,
            actual: request.initial_parameters.len(),
        });
    }

    match (&request.user_info, model.grid_dims()) {
        (UserInfo::Grid1D(grid), models::GridDims::OneD) if grid.len() == request.n_points => {}
        (UserInfo::Grid2D { x, y }, models::GridDims::TwoD) if x.len() == request.n_points && y.len() == request.n_points => {}
        _ => {
            return Err(FitError::InvalidUserInfo {
                model: request.model_id,
                reason: "user_info grid shape or length does not match the model's required grid",
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_request(n_fits: usize, n_points: usize) -> FitRequest {
        let x: Vec<f64> = (0..n_points).map(|i| i as f64).collect();
        let data: Vec<f64> = (0..n_fits).flat_map(|_| x.iter().map(|&xi| 1.0 + xi)).collect();
        FitRequest {
            n_fits,
            n_points,
            model_id: ModelId::Linear1D,
            estimator_id: EstimatorId::LeastSquares,
            data,
            weights: Vec::new(),
            initial_parameters: vec![0.0, 0.0].repeat(n_fits),
            parameters_to_fit: vec![1, 1],
            user_info: UserInfo::Grid1D(x),
            tolerance: 1e-9,
            max_iterations: 20,
        }
    }

    #[test]
    fn tiny_linear_fit_converges_to_the_exact_line() {
        let request = linear_request(1, 5);
        let output = fit(&request, &EngineLimits::default(), &SolverTuning::default()).expect("fit succeeds");
        assert_eq!(output.states[0], FitState::Converged);
        assert!((output.parameters[0] - 1.0).abs() < 1e-6);
        assert!((output.parameters[1] - 1.0).abs() < 1e-6);
        assert!(output.chi_squares[0] < 1e-9);
        assert!(output.n_iterations[0] <= 5);
    }

    #[test]
    fn rejects_an_empty_batch() {
        let mut request = linear_request(1, 5);
        request.n_fits = 0;
        let err = fit(&request, &EngineLimits::default(), &SolverTuning::default()).expect_err("empty batch");
        assert_eq!(err, FitError::EmptyBatch);
    }

    #[test]
    fn rejects_a_data_buffer_of_the_wrong_length() {
        let mut request = linear_request(2, 5);
        request.data.pop();
        let err = fit(&request, &EngineLimits::default(), &SolverTuning::default()).expect_err("short data buffer");
        assert!(matches!(err, FitError::BufferLengthMismatch { field: "data", .. }));
    }

    #[test]
    fn trivial_all_fixed_mask_converges_in_one_iteration_unchanged() {
        let mut request = linear_request(3, 5);
        request.parameters_to_fit = vec![0, 0];
        request.initial_parameters = vec![2.0, 3.0].repeat(3);
        let output = fit(&request, &EngineLimits::default(), &SolverTuning::default()).expect("fit succeeds");
        for fit_index in 0..3 {
            assert_eq!(output.states[fit_index], FitState::Converged);
            assert_eq!(output.n_iterations[fit_index], 1);
            assert!((output.parameters[fit_index * 2] - 2.0).abs() < f64::EPSILON);
            assert!((output.parameters[fit_index * 2 + 1] - 3.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn chunk_boundary_does_not_change_any_fit_s_outcome() {
        let request = linear_request(25, 5);
        let small_chunks = EngineLimits {
            available_memory_bytes: 4096,
            ..EngineLimits::default()
        };
        let a = fit(&request, &small_chunks, &SolverTuning::default()).expect("fit succeeds");
        let b = fit(&request, &EngineLimits::default(), &SolverTuning::default()).expect("fit succeeds");
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.states, b.states);
    }
}
