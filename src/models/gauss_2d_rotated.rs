use super::{GridDims, Model};
use crate::types::UserInfo;

/// 2-D Gaussian peak with independent x/y widths and a rotation angle.
///
/// Coordinates are rotated into the peak's own frame before the elliptic
/// Gaussian is evaluated:
/// `x' =  (x-cx)*cos(theta) + (y-cy)*sin(theta)`
/// `y' = -(x-cx)*sin(theta) + (y-cy)*cos(theta)`
/// `f = amplitude * exp(-(x'^2/(2*sx^2) + y'^2/(2*sy^2))) + offset`.
pub struct Gauss2DRotated;

impl Model for Gauss2DRotated {
    fn parameter_count(&self) -> usize {
        7
    }

    fn grid_dims(&self) -> GridDims {
        GridDims::TwoD
    }

    #[allow(
        clippy::too_many_lines,
        reason = "one closed-form evaluator covering values and all seven derivatives"
    )]
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
        let (amplitude, cx, cy, sigma_x, sigma_y, theta, offset) = (
            parameters[0],
            parameters[1],
            parameters[2],
            parameters[3],
            parameters[4],
            parameters[5],
            parameters[6],
        );
        let n_points = x.len();
        let (d_amplitude, rest) = derivatives_out.split_at_mut(n_points);
        let (d_cx, rest) = rest.split_at_mut(n_points);
        let (d_cy, rest) = rest.split_at_mut(n_points);
        let (d_sx, rest) = rest.split_at_mut(n_points);
        let (d_sy, rest) = rest.split_at_mut(n_points);
        let (d_theta, rest) = rest.split_at_mut(n_points);
        let d_offset = &mut rest[..n_points];

        let (sin_theta, cos_theta) = theta.sin_cos();
        let sx2 = sigma_x * sigma_x;
        let sy2 = sigma_y * sigma_y;

        for point in 0..n_points {
            let dx = x[point] - cx;
            let dy = y[point] - cy;
            let rotated_x = dx * cos_theta + dy * sin_theta;
            let rotated_y = -dx * sin_theta + dy * cos_theta;
            let exponent = rotated_x * rotated_x / (2.0 * sx2) + rotated_y * rotated_y / (2.0 * sy2);
            let gauss = (-exponent).exp();
            values_out[point] = amplitude.mul_add(gauss, offset);

            let d_rotated_x_d_cx = -cos_theta;
            let d_rotated_y_d_cx = sin_theta;
            let d_rotated_x_d_cy = -sin_theta;
            let d_rotated_y_d_cy = -cos_theta;
            let d_exponent_d_cx = rotated_x * d_rotated_x_d_cx / sx2 + rotated_y * d_rotated_y_d_cx / sy2;
            let d_exponent_d_cy = rotated_x * d_rotated_x_d_cy / sx2 + rotated_y * d_rotated_y_d_cy / sy2;
            let d_rotated_x_d_theta = -dx * sin_theta + dy * cos_theta;
            let d_rotated_y_d_theta = -dx * cos_theta - dy * sin_theta;
            let d_exponent_d_theta =
                rotated_x * d_rotated_x_d_theta / sx2 + rotated_y * d_rotated_y_d_theta / sy2;

            d_amplitude[point] = gauss;
            d_cx[point] = -amplitude * gauss * d_exponent_d_cx;
            d_cy[point] = -amplitude * gauss * d_exponent_d_cy;
            d_sx[point] = amplitude * gauss * rotated_x * rotated_x / (sx2 * sigma_x);
            d_sy[point] = amplitude * gauss * rotated_y * rotated_y / (sy2 * sigma_y);
            d_theta[point] = -amplitude * gauss * d_exponent_d_theta;
            d_offset[point] = 1.0;
        }
    }
}
