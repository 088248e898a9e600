use super::{GridDims, Model};
use crate::types::UserInfo;

/// `f(x) = amplitude * exp(-(x - center)^2 / (2 * sigma^2)) + offset`.
pub struct Gauss1D;

impl Model for Gauss1D {
    fn parameter_count(&self) -> usize {
        4
    }

    fn grid_dims(&self) -> GridDims {
        GridDims::OneD
    }

    fn evaluate(
        &self,
        parameters: &[f64],
        user_info: &UserInfo,
        values_out: &mut [f64],
        derivatives_out: &mut [f64],
    ) {
        let UserInfo::Grid1D(x) = user_info else {
            return;
        };
        let (amplitude, center, sigma, offset) =
            (parameters[0], parameters[1], parameters[2], parameters[3]);
        let n_points = x.len();
        let (d_amplitude, rest) = derivatives_out.split_at_mut(n_points);
        let (d_center, rest) = rest.split_at_mut(n_points);
        let (d_sigma, rest) = rest.split_at_mut(n_points);
        let d_offset = &mut rest[..n_points];

        for point in 0..n_points {
            let delta = x[point] - center;
            let gauss = (-(delta * delta) / (2.0 * sigma * sigma)).exp();
            values_out[point] = amplitude.mul_add(gauss, offset);
            d_amplitude[point] = gauss;
            d_center[point] = amplitude * gauss * delta / (sigma * sigma);
            d_sigma[point] = amplitude * gauss * delta * delta / (sigma * sigma * sigma);
            d_offset[point] = 1.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_value_is_amplitude_plus_offset_at_the_center() {
        let model = Gauss1D;
        let x = vec![-1.0, 0.0, 1.0];
        let user_info = UserInfo::Grid1D(x);
        let mut values = vec![0.0; 3];
        let mut derivatives = vec![0.0; 4 * 3];
        model.evaluate(&[2.0, 0.0, 1.0, 0.5], &user_info, &mut values, &mut derivatives);
        assert!((values[1] - 2.5).abs() < 1e-12);
    }
}
