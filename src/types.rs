//! Request, response, and per-fit state types shared across the engine.

use serde::{Deserialize, Serialize};

/// Identifies one of the built-in fit models.
///
/// The registry in [`crate::models`] maps each variant to its parameter
/// count and its `evaluate` kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    /// `p0 + p1 * x`. 2 parameters.
    Linear1D,
    /// 1-D Gaussian peak with amplitude, center, width, and offset. 4 parameters.
    Gauss1D,
    /// Circular 2-D Gaussian peak (single shared width). 5 parameters.
    Gauss2D,
    /// 2-D Gaussian peak with independent x/y widths. 6 parameters.
    Gauss2DElliptic,
    /// 2-D Gaussian peak with independent x/y widths and a rotation angle. 7 parameters.
    Gauss2DRotated,
    /// 2-D Cauchy (Lorentzian) peak with independent x/y widths. 6 parameters.
    Cauchy2DElliptic,
}

/// Identifies one of the two built-in goodness-of-fit estimators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstimatorId {
    /// Least-squares estimator: chi-square summand `w·(data − value)²`.
    LeastSquares,
    /// Maximum-likelihood estimator for Poisson-distributed data.
    MaximumLikelihood,
}

/// Terminal classification of a single fit.
///
/// Numeric values mirror the reference status codes so that
/// [`FitState`] round-trips through [`u8`] the way the external contract's
/// call-level status code does (see [`crate::fit`]'s documentation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FitState {
    /// The tolerance test passed: `|chi_square - prev_chi_square| <
    /// tolerance * max(1, chi_square)`.
    Converged = 0,
    /// The iteration budget was exhausted before the tolerance test passed.
    MaxIteration = 1,
    /// The Gauss-Jordan solve detected a singular (or numerically singular)
    /// Hessian and the fit was terminated rather than given a meaningless
    /// update.
    SingularHessian = 2,
    /// An MLE fit evaluated a non-positive model value at some point during
    /// the run. This state is sticky: once set it is not cleared by a later
    /// iteration that evaluates only positive values (see Open Question (i)
    /// in the design notes).
    NegCurvatureMle = 3,
    /// Reserved terminal state for a fit that could not be scheduled onto
    /// the compute substrate at all. The CPU/rayon substrate used by this
    /// implementation always schedules every fit placed in a chunk, so this
    /// variant is never produced today; it is kept so the state enum stays
    /// a faithful superset of the reference status codes for callers that
    /// match on all five.
    GpuNotReady = 4,
}

/// The independent-variable grid a model evaluates against.
///
/// The external contract describes this as an opaque `user_info` byte
/// buffer; this crate decodes it once, at the start of [`crate::fit`],
/// into one of these typed shapes rather than re-interpreting raw bytes on
/// every kernel call (`unsafe` pointer reinterpretation is denied by this
/// crate's lints — see `DESIGN.md`).
#[derive(Debug, Clone, PartialEq)]
pub enum UserInfo {
    /// No coordinate grid; the model works from point indices alone. None
    /// of the required built-in models use this, but it is kept for
    /// forward compatibility with index-only models.
    None,
    /// One coordinate per point, length `n_points`, shared by every fit in
    /// the call.
    Grid1D(Vec<f64>),
    /// One `(x, y)` coordinate pair per point, each of length `n_points`,
    /// shared by every fit in the call.
    Grid2D {
        /// x-coordinate of each point.
        x: Vec<f64>,
        /// y-coordinate of each point.
        y: Vec<f64>,
    },
}

impl Default for UserInfo {
    fn default() -> Self {
        Self::None
    }
}

/// Parameters controlling one call to [`crate::fit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitRequest {
    /// Number of independent fits in the batch.
    pub n_fits: usize,
    /// Number of data points per fit.
    pub n_points: usize,
    /// Model shared by every fit in the batch.
    pub model_id: ModelId,
    /// Estimator shared by every fit in the batch.
    pub estimator_id: EstimatorId,
    /// Observed data, length `n_fits * n_points`, fit-major.
    pub data: Vec<f64>,
    /// Per-point weights, length `n_fits * n_points` fit-major, or empty to
    /// disable weighting.
    pub weights: Vec<f64>,
    /// Starting parameters, length `n_fits * n_parameters` fit-major.
    pub initial_parameters: Vec<f64>,
    /// Free-parameter mask shared by every fit, length `n_parameters`;
    /// `1` marks a parameter as free, `0` holds it fixed at its initial
    /// value for the whole run.
    pub parameters_to_fit: Vec<u8>,
    /// Coordinate grid passed to the model's `evaluate` kernel.
    #[serde(skip, default)]
    pub user_info: UserInfo,
    /// Convergence tolerance (see [`FitState::Converged`]).
    pub tolerance: f64,
    /// Maximum Levenberg-Marquardt iterations per fit.
    pub max_iterations: usize,
}

/// Result of one call to [`crate::fit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitOutput {
    /// Fitted parameters, length `n_fits * n_parameters` fit-major. For a
    /// fit that exited via [`FitState::SingularHessian`] or
    /// [`FitState::MaxIteration`] these are the last *accepted* parameters,
    /// never a rejected trial step.
    pub parameters: Vec<f64>,
    /// Terminal state of each fit, length `n_fits`.
    pub states: Vec<FitState>,
    /// Chi-square of each fit at its last accepted iteration, length
    /// `n_fits`.
    pub chi_squares: Vec<f64>,
    /// Number of iterations each fit actually ran, length `n_fits`.
    pub n_iterations: Vec<usize>,
}
