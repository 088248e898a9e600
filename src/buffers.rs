//! Per-fit state and per-iteration scratch (component D).
//!
//! The reference engine keeps these as flat device buffers indexed by
//! `fit * n_points + point`. This CPU implementation keeps one
//! [`FitWorkItem`] per fit instead: each owns its own scratch, so `rayon`
//! can hand one item to one thread with no cross-fit aliasing and no
//! manual slice splitting. The two representations hold the same data —
//! see `DESIGN.md`.

use crate::types::FitState as TerminalState;

/// One fit's persistent state plus its per-iteration scratch.
#[derive(Debug, Clone)]
pub struct FitWorkItem {
    /// Observed data, length `n_points`.
    pub data: Vec<f64>,
    /// Per-point weights, length `n_points` if weighting is enabled, empty
    /// otherwise.
    pub weights: Vec<f64>,

    /// Current parameter guess, length `n_parameters`, overwritten in
    /// place every iteration.
    pub parameters: Vec<f64>,
    /// Snapshot of `parameters` at the start of the current iteration,
    /// used to roll back a rejected step.
    pub prev_parameters: Vec<f64>,

    /// Current chi-square.
    pub chi_square: f64,
    /// Chi-square from the last accepted iteration.
    pub prev_chi_square: f64,
    /// Levenberg-Marquardt damping factor, always strictly positive.
    pub lambda: f64,

    /// Sticky: once true, no further writes touch `parameters`,
    /// `chi_square`, `terminal_state`, or `n_iterations`.
    pub finished: bool,
    /// True if the most recent step raised chi-square.
    pub iteration_failed: bool,
    /// Iteration count recorded the moment `finished` became true.
    pub n_iterations: usize,
    /// Terminal classification; defaults to [`TerminalState::Converged`]
    /// and is only ever overwritten, never reset, by the driver (see
    /// `DESIGN.md`'s note on Open Question (i)).
    pub terminal_state: TerminalState,

    /// Model values at `parameters`, length `n_points`.
    pub values: Vec<f64>,
    /// Parameter-major derivatives: `derivatives[p * n_points + point]`,
    /// length `n_parameters * n_points`.
    pub derivatives: Vec<f64>,
    /// Gradient over free parameters, length `n_parameters_to_fit`.
    pub gradient: Vec<f64>,
    /// Gauss-Newton Hessian approximation over free parameters, row-major,
    /// length `n_parameters_to_fit²`.
    pub hessian: Vec<f64>,
    /// Parameter step from the linear solve, length `n_parameters_to_fit`.
    pub delta: Vec<f64>,
    /// Set by the linear solver when the Hessian was singular this
    /// iteration.
    pub singular: bool,
}

impl FitWorkItem {
    fn new(
        data: Vec<f64>,
        weights: Vec<f64>,
        initial_parameters: Vec<f64>,
        n_points: usize,
        n_parameters: usize,
        n_parameters_to_fit: usize,
        default_damping: f64,
    ) -> Self {
        Self {
            data,
            weights,
            prev_parameters: initial_parameters.clone(),
            parameters: initial_parameters,
            chi_square: 0.0,
            prev_chi_square: 0.0,
            lambda: default_damping,
            finished: false,
            iteration_failed: false,
            n_iterations: 0,
            terminal_state: TerminalState::Converged,
            values: vec![0.0; n_points],
            derivatives: vec![0.0; n_parameters * n_points],
            gradient: vec![0.0; n_parameters_to_fit],
            hessian: vec![0.0; n_parameters_to_fit * n_parameters_to_fit],
            delta: vec![0.0; n_parameters_to_fit],
            singular: false,
        }
    }
}

/// One chunk's worth of fits plus the call-wide constants every kernel
/// needs (point count, free-parameter index table).
pub struct ChunkState {
    /// One entry per fit in this chunk.
    pub items: Vec<FitWorkItem>,
    /// Data points per fit (identical for every fit in the call).
    pub n_points: usize,
    /// Total parameters the model exposes.
    pub n_parameters: usize,
    /// Indices of `parameters_to_fit` equal to 1, in ascending order.
    pub free_index_table: Vec<usize>,
    /// Whether caller-supplied weights are in effect.
    pub use_weights: bool,
    /// Reduction width for the chi-square/gradient kernels (§4.5b/c).
    pub power_of_two_n_points: usize,
}

impl ChunkState {
    /// Build the working state for fits `[start, start + chunk_len)` of
    /// the call's flattened input buffers.
    #[allow(clippy::too_many_arguments, reason = "mirrors the call-level request fields one-for-one")]
    #[must_use]
    pub fn new(
        start: usize,
        chunk_len: usize,
        n_points: usize,
        n_parameters: usize,
        free_index_table: Vec<usize>,
        use_weights: bool,
        power_of_two_n_points: usize,
        data: &[f64],
        weights: &[f64],
        initial_parameters: &[f64],
        default_damping: f64,
    ) -> Self {
        let n_parameters_to_fit = free_index_table.len();
        let items = (0..chunk_len)
            .map(|local| {
                let fit = start + local;
                let point_range = fit * n_points..(fit + 1) * n_points;
                let param_range = fit * n_parameters..(fit + 1) * n_parameters;
                let fit_weights = if use_weights { weights[point_range.clone()].to_vec() } else { Vec::new() };
                FitWorkItem::new(
                    data[point_range].to_vec(),
                    fit_weights,
                    initial_parameters[param_range].to_vec(),
                    n_points,
                    n_parameters,
                    n_parameters_to_fit,
                    default_damping,
                )
            })
            .collect();
        Self {
            items,
            n_points,
            n_parameters,
            free_index_table,
            use_weights,
            power_of_two_n_points,
        }
    }

    /// Number of free parameters every fit in this chunk shares.
    #[must_use]
    pub fn n_parameters_to_fit(&self) -> usize {
        self.free_index_table.len()
    }
}
