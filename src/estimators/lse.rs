use super::{ChiSquareSummand, Estimator};

/// Least-squares estimator: minimizes `Σ w·(d−v)²`.
pub struct LeastSquares;

impl Estimator for LeastSquares {
    fn chi_square_summand(&self, data: f64, value: f64, weight: f64, use_weights: bool) -> ChiSquareSummand {
        let residual = data - value;
        let w = if use_weights { weight } else { 1.0 };
        ChiSquareSummand::Value(w * residual * residual)
    }

    fn gradient_summand(&self, data: f64, value: f64, weight: f64, use_weights: bool, d_value: f64) -> f64 {
        let w = if use_weights { weight } else { 1.0 };
        -2.0 * w * (data - value) * d_value
    }

    fn hessian_summand(
        &self,
        _data: f64,
        _value: f64,
        weight: f64,
        use_weights: bool,
        d_value_i: f64,
        d_value_j: f64,
    ) -> f64 {
        let w = if use_weights { weight } else { 1.0 };
        2.0 * w * d_value_i * d_value_j
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chi_square_ignores_weight_when_disabled() {
        let est = LeastSquares;
        let weighted = est.chi_square_summand(2.0, 1.0, 5.0, true);
        let unweighted = est.chi_square_summand(2.0, 1.0, 5.0, false);
        assert_eq!(weighted, ChiSquareSummand::Value(5.0));
        assert_eq!(unweighted, ChiSquareSummand::Value(1.0));
    }

    #[test]
    fn gradient_summand_vanishes_at_zero_residual() {
        let est = LeastSquares;
        assert_eq!(est.gradient_summand(3.0, 3.0, 1.0, true, 2.0), 0.0);
    }
}
