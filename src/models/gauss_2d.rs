use super::{GridDims, Model};
use crate::types::UserInfo;

/// Circular 2-D Gaussian peak with a single shared width.
///
/// `f(x, y) = amplitude * exp(-((x - cx)^2 + (y - cy)^2) / (2 * sigma^2)) + offset`.
pub struct Gauss2D;

impl Model for Gauss2D {
    fn parameter_count(&self) -> usize {
        5
    }

    fn grid_dims(&self) -> GridDims {
        GridDims::TwoD
    }

    fn evaluate(
        &self,
        parameters: &[f64],
        user_info: &UserInfo,
        values_out: &mut [f64],
        derivatives_out: &mut [f64],
    ) {
        let UserInfo::Grid2D { x, y } = user_info else {
            return;
        };
        let (amplitude, cx, cy, sigma, offset) = (
            parameters[0],
            parameters[1],
            parameters[2],
            parameters[3],
            parameters[4],
        );
        let n_points = x.len();
        let (d_amplitude, rest) = derivatives_out.split_at_mut(n_points);
        let (d_cx, rest) = rest.split_at_mut(n_points);
        let (d_cy, rest) = rest.split_at_mut(n_points);
        let (d_sigma, rest) = rest.split_at_mut(n_points);
        let d_offset = &mut rest[..n_points];

        let sigma2 = sigma * sigma;
        for point in 0..n_points {
            let dx = x[point] - cx;
            let dy = y[point] - cy;
            let radial2 = dx * dx + dy * dy;
            let gauss = (-radial2 / (2.0 * sigma2)).exp();
            values_out[point] = amplitude.mul_add(gauss, offset);
            d_amplitude[point] = gauss;
            d_cx[point] = amplitude * gauss * dx / sigma2;
            d_cy[point] = amplitude * gauss * dy / sigma2;
            d_sigma[point] = amplitude * gauss * radial2 / (sigma2 * sigma);
            d_offset[point] = 1.0;
        }
    }
}
