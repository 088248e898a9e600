use super::{GridDims, Model};
use crate::types::UserInfo;

/// `f(x) = p0 + p1 * x`.
pub struct Linear1D;

impl Model for Linear1D {
    fn parameter_count(&self) -> usize {
        2
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
        let (offset, slope) = (parameters[0], parameters[1]);
        let n_points = x.len();
        let (d_offset, rest) = derivatives_out.split_at_mut(n_points);
        let d_slope = &mut rest[..n_points];

        for point in 0..n_points {
            values_out[point] = offset + slope * x[point];
            d_offset[point] = 1.0;
            d_slope[point] = x[point];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_a_known_line() {
        let model = Linear1D;
        let x = vec![0.0, 1.0, 2.0, 3.0];
        let user_info = UserInfo::Grid1D(x.clone());
        let mut values = vec![0.0; 4];
        let mut derivatives = vec![0.0; 2 * 4];
        model.evaluate(&[1.0, 2.0], &user_info, &mut values, &mut derivatives);
        assert_eq!(values, vec![1.0, 3.0, 5.0, 7.0]);
        assert_eq!(&derivatives[0..4], &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(&derivatives[4..8], &x[..]);
    }
}
