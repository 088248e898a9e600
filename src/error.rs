//! Call-level error type.
//!
//! A [`FitError`] aborts the whole [`crate::fit`] call before any fit is
//! attempted. Per-fit outcomes that do not abort the call are reported
//! through [`crate::types::FitState`] instead.

use thiserror::Error;

/// Everything that can go wrong before or while dispatching a batch of fits.
///
/// These are request-shape and resource problems, not numerical ones: a
/// fit that fails to converge, or that hits a singular Hessian, is not a
/// `FitError` — it is recorded as a [`crate::types::FitState`] on that fit
/// alone and the call still returns `Ok`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FitError {
    /// `n_fits` was zero.
    #[error("n_fits must be at least 1")]
    EmptyBatch,

    /// `n_points` was zero.
    #[error("n_points must be at least 1")]
    EmptyPointSet,

    /// A data, weights, or initial-parameters buffer was not sized
    /// `n_fits * n_points` (or `n_fits * n_parameters`) as required.
    #[error("{field} has length {actual}, expected {expected}")]
    BufferLengthMismatch {
        /// Name of the offending field.
        field: &'static str,
        /// Length required given `n_fits`/`n_points`/`n_parameters`.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The free-parameter mask for a fit was longer/shorter than
    /// `n_parameters`. An all-zero mask is not an error: see
    /// [`crate::types::FitState::Converged`]'s trivial-fit case.
    #[error("parameters_to_fit has length {actual}, expected {expected}")]
    ParameterMaskLengthMismatch {
        /// Length required (`n_parameters`).
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// `user_info` did not decode into the grid shape the model needs.
    #[error("user_info is not a valid coordinate grid for model {model:?}: {reason}")]
    InvalidUserInfo {
        /// The model that rejected the grid.
        model: crate::types::ModelId,
        /// Human-readable explanation.
        reason: &'static str,
    },

    /// `max_iterations` was zero.
    #[error("max_iterations must be at least 1")]
    ZeroIterationBudget,

    /// `tolerance` was zero or negative.
    #[error("tolerance must be positive, got {actual}")]
    NonPositiveTolerance {
        /// The offending value.
        actual: f64,
    },

    /// The resource planner could not fit even a single point of a single
    /// fit within the configured memory budget.
    #[error("one fit's working set ({bytes_per_fit} bytes) exceeds the configured memory budget ({budget} bytes)")]
    ChunkBudgetExceeded {
        /// Bytes required for one fit's scratch state.
        bytes_per_fit: usize,
        /// Configured memory budget.
        budget: usize,
    },
}
