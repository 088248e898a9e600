use super::{ChiSquareSummand, Estimator};

/// Maximum-likelihood estimator under Poisson noise: minimizes the Poisson
/// deviance `2·Σ (v − d − d·ln(v/d))`.
pub struct MaximumLikelihood;

impl Estimator for MaximumLikelihood {
    fn chi_square_summand(&self, data: f64, value: f64, _weight: f64, _use_weights: bool) -> ChiSquareSummand {
        if value <= 0.0 {
            return ChiSquareSummand::NonPositiveModel;
        }
        let deviance_term = if data == 0.0 { 0.0 } else { data * (value / data).ln() };
        ChiSquareSummand::Value(2.0 * (value - data - deviance_term))
    }

    fn gradient_summand(&self, data: f64, value: f64, _weight: f64, _use_weights: bool, d_value: f64) -> f64 {
        if value <= 0.0 {
            return 0.0;
        }
        2.0 * (1.0 - data / value) * d_value
    }

    fn hessian_summand(
        &self,
        data: f64,
        value: f64,
        _weight: f64,
        _use_weights: bool,
        d_value_i: f64,
        d_value_j: f64,
    ) -> f64 {
        if value <= 0.0 {
            return 0.0;
        }
        2.0 * (data / (value * value)) * d_value_i * d_value_j
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_model_value_is_flagged_not_nan() {
        let est = MaximumLikelihood;
        assert_eq!(
            est.chi_square_summand(3.0, -1.0, 1.0, false),
            ChiSquareSummand::NonPositiveModel
        );
    }

    #[test]
    fn zero_data_drops_the_deviance_log_term() {
        let est = MaximumLikelihood;
        assert_eq!(est.chi_square_summand(0.0, 2.0, 1.0, false), ChiSquareSummand::Value(4.0));
    }

    #[test]
    fn chi_square_is_zero_at_the_exact_poisson_mean() {
        let est = MaximumLikelihood;
        assert_eq!(est.chi_square_summand(5.0, 5.0, 1.0, false), ChiSquareSummand::Value(0.0));
    }
}
