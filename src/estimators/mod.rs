//! Estimator registry (component B).
//!
//! Maps an [`crate::types::EstimatorId`] to its three per-point summand
//! functions: chi-square, gradient, and Hessian. Every summand contributes
//! one term per data point; the kernels in `crate::kernels` tree-reduce
//! those contributions across points.

mod lse;
mod mle;

use crate::types::EstimatorId;

/// Outcome of a chi-square summand evaluation at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChiSquareSummand {
    /// The ordinary contribution for this point.
    Value(f64),
    /// MLE only: the model value was non-positive. The caller must record
    /// [`crate::types::FitState::NegCurvatureMle`] for this fit and treat
    /// this point's contribution as zero.
    NonPositiveModel,
}

/// Per-point summand functions for one estimator.
pub trait Estimator: Send + Sync {
    /// Chi-square contribution of one point.
    fn chi_square_summand(&self, data: f64, value: f64, weight: f64, use_weights: bool) -> ChiSquareSummand;

    /// Gradient contribution of one point for one free parameter, given
    /// that parameter's `∂value/∂parameter`.
    fn gradient_summand(&self, data: f64, value: f64, weight: f64, use_weights: bool, d_value: f64) -> f64;

    /// Hessian contribution of one point for one pair of free parameters,
    /// given each parameter's `∂value/∂parameter`. Accumulated in `f64` by
    /// the caller per the double-precision accumulation rule.
    fn hessian_summand(
        &self,
        data: f64,
        value: f64,
        weight: f64,
        use_weights: bool,
        d_value_i: f64,
        d_value_j: f64,
    ) -> f64;
}

/// Look up the estimator implementation for an [`EstimatorId`].
#[must_use]
pub fn registry(estimator_id: EstimatorId) -> &'static dyn Estimator {
    match estimator_id {
        EstimatorId::LeastSquares => &lse::LeastSquares,
        EstimatorId::MaximumLikelihood => &mle::MaximumLikelihood,
    }
}
