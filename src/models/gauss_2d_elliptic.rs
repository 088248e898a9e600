use super::{GridDims, Model};
use crate::types::UserInfo;

/// 2-D Gaussian peak with independent x/y widths.
///
/// `f(x, y) = amplitude * exp(-((x-cx)^2/(2*sx^2) + (y-cy)^2/(2*sy^2))) + offset`.
pub struct Gauss2DElliptic;

impl Model for Gauss2DElliptic {
    fn parameter_count(&self) -> usize {
        6
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
        let (amplitude, cx, cy, sigma_x, sigma_y, offset) = (
            parameters[0],
            parameters[1],
            parameters[2],
            parameters[3],
            parameters[4],
            parameters[5],
        );
        let n_points = x.len();
        let (d_amplitude, rest) = derivatives_out.split_at_mut(n_points);
        let (d_cx, rest) = rest.split_at_mut(n_points);
        let (d_cy, rest) = rest.split_at_mut(n_points);
        let (d_sx, rest) = rest.split_at_mut(n_points);
        let (d_sy, rest) = rest.split_at_mut(n_points);
        let d_offset = &mut rest[..n_points];

        let sx2 = sigma_x * sigma_x;
        let sy2 = sigma_y * sigma_y;
        for point in 0..n_points {
            let dx = x[point] - cx;
            let dy = y[point] - cy;
            let exponent = dx.mul_add(dx, dy * dy * (sx2 / sy2)) / (2.0 * sx2);
            let gauss = (-exponent).exp();
            values_out[point] = amplitude.mul_add(gauss, offset);
            d_amplitude[point] = gauss;
            d_cx[point] = amplitude * gauss * dx / sx2;
            d_cy[point] = amplitude * gauss * dy / sy2;
            d_sx[point] = amplitude * gauss * dx * dx / (sx2 * sigma_x);
            d_sy[point] = amplitude * gauss * dy * dy / (sy2 * sigma_y);
            d_offset[point] = 1.0;
        }
    }
}
