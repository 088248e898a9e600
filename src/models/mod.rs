//! Built-in model registry (component A).
//!
//! Each model is a zero-sized type implementing [`Model`]; [`registry`]
//! maps a [`crate::types::ModelId`] to the corresponding `&'static dyn
//! Model`. All required models are implemented: `GAUSS_1D`, `GAUSS_2D`,
//! `GAUSS_2D_ELLIPTIC`, `GAUSS_2D_ROTATED`, `CAUCHY_2D_ELLIPTIC`,
//! `LINEAR_1D`.

mod cauchy_2d_elliptic;
mod gauss_1d;
mod gauss_2d;
mod gauss_2d_elliptic;
mod gauss_2d_rotated;
mod linear_1d;

use crate::types::{ModelId, UserInfo};

/// The coordinate-grid shape a model requires from `user_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridDims {
    /// One coordinate per point ([`UserInfo::Grid1D`]).
    OneD,
    /// One `(x, y)` pair per point ([`UserInfo::Grid2D`]).
    TwoD,
}

/// The curve-values-and-derivatives kernel contract (§4.1).
///
/// A model is evaluated one fit at a time: the batched dispatch over fits
/// is the caller's `rayon` parallel iterator (`crate::kernels`), not a
/// concern of the model itself.
pub trait Model: Send + Sync {
    /// Number of parameters this model exposes.
    fn parameter_count(&self) -> usize;

    /// The grid shape this model's `evaluate` expects from `user_info`.
    fn grid_dims(&self) -> GridDims;

    /// Evaluate model values and parameter derivatives for one fit.
    ///
    /// `parameters` has length `parameter_count()`. `values_out` has
    /// length `n_points`. `derivatives_out` is parameter-major: index
    /// `p * n_points + point`, total length `parameter_count() *
    /// n_points`.
    fn evaluate(
        &self,
        parameters: &[f64],
        user_info: &UserInfo,
        values_out: &mut [f64],
        derivatives_out: &mut [f64],
    );
}

/// Look up the model implementation for a [`ModelId`].
#[must_use]
pub fn registry(model_id: ModelId) -> &'static dyn Model {
    match model_id {
        ModelId::Linear1D => &linear_1d::Linear1D,
        ModelId::Gauss1D => &gauss_1d::Gauss1D,
        ModelId::Gauss2D => &gauss_2d::Gauss2D,
        ModelId::Gauss2DElliptic => &gauss_2d_elliptic::Gauss2DElliptic,
        ModelId::Gauss2DRotated => &gauss_2d_rotated::Gauss2DRotated,
        ModelId::Cauchy2DElliptic => &cauchy_2d_elliptic::Cauchy2DElliptic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_model_id_resolves_and_reports_its_own_arity() {
        let expectations = [
            (ModelId::Linear1D, 2, GridDims::OneD),
            (ModelId::Gauss1D, 4, GridDims::OneD),
            (ModelId::Gauss2D, 5, GridDims::TwoD),
            (ModelId::Gauss2DElliptic, 6, GridDims::TwoD),
            (ModelId::Gauss2DRotated, 7, GridDims::TwoD),
            (ModelId::Cauchy2DElliptic, 6, GridDims::TwoD),
        ];
        for (id, expected_params, expected_dims) in expectations {
            let model = registry(id);
            assert_eq!(model.parameter_count(), expected_params);
            assert_eq!(model.grid_dims(), expected_dims);
        }
    }
}
