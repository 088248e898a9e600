use super::{GridDims, Model};
use crate::types::UserInfo;

/// 2-D Cauchy (Lorentzian) peak with independent x/y widths.
///
/// `f(x, y) = amplitude / (1 + ((x-cx)/gx)^2 + ((y-cy)/gy)^2) + offset`.
pub struct Cauchy2DElliptic;

impl Model for Cauchy2DElliptic {
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
        let (amplitude, cx, cy, gamma_x, gamma_y, offset) = (
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
        let (d_gx, rest) = rest.split_at_mut(n_points);
        let (d_gy, rest) = rest.split_at_mut(n_points);
        let d_offset = &mut rest[..n_points];

        for point in 0..n_points {
            let rx = (x[point] - cx) / gamma_x;
            let ry = (y[point] - cy) / gamma_y;
            let denom = 1.0 + rx * rx + ry * ry;
            let lorentz = denom.recip();
            let lorentz2 = lorentz * lorentz;
            values_out[point] = amplitude.mul_add(lorentz, offset);
            d_amplitude[point] = lorentz;
            d_cx[point] = 2.0 * amplitude * rx * lorentz2 / gamma_x;
            d_cy[point] = 2.0 * amplitude * ry * lorentz2 / gamma_y;
            d_gx[point] = 2.0 * amplitude * rx * rx * lorentz2 / gamma_x;
            d_gy[point] = 2.0 * amplitude * ry * ry * lorentz2 / gamma_y;
            d_offset[point] = 1.0;
        }
    }
}
