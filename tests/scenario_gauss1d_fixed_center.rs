//! Scenario 2: a batch of `GAUSS_1D` fits with a frozen center parameter.
//! Every fit must converge, the frozen parameter must stay exactly at its
//! initial value, and the free parameters must land within 5% of truth.

mod common;

use batchfit::config::{EngineLimits, SolverTuning};
use batchfit::types::{EstimatorId, FitRequest, FitState, ModelId, UserInfo};
use rand::Rng;
use rand_pcg::Pcg64;

const N_FITS: usize = 100;
const N_POINTS: usize = 50;
const TRUE_CENTER: f64 = 5.0;

#[test]
fn frozen_center_fits_converge_within_tolerance_of_truth() {
    common::init_test_logging();

    let mut rng = Pcg64::new(0xcafe_f00d_d15e_a5e5, 0xa02b_dbf7_bb3c_0a7);
    let x: Vec<f64> = (0..N_POINTS).map(|i| i as f64 * 10.0 / N_POINTS as f64).collect();

    let mut data = Vec::with_capacity(N_FITS * N_POINTS);
    let mut initial_parameters = Vec::with_capacity(N_FITS * 4);
    let mut truths = Vec::with_capacity(N_FITS);

    for _ in 0..N_FITS {
        let amplitude: f64 = rng.gen_range(2.0..10.0);
        let sigma: f64 = rng.gen_range(0.5..2.0);
        let offset: f64 = rng.gen_range(-1.0..1.0);
        truths.push((amplitude, sigma, offset));

        for &xi in &x {
            let delta = xi - TRUE_CENTER;
            let value = amplitude * (-(delta * delta) / (2.0 * sigma * sigma)).exp() + offset;
            data.push(value);
        }

        let perturb = |truth: f64| truth * rng.gen_range(0.8..1.2);
        initial_parameters.extend_from_slice(&[perturb(amplitude), TRUE_CENTER, perturb(sigma), perturb(offset)]);
    }

    let request = FitRequest {
        n_fits: N_FITS,
        n_points: N_POINTS,
        model_id: ModelId::Gauss1D,
        estimator_id: EstimatorId::LeastSquares,
        data,
        weights: Vec::new(),
        initial_parameters,
        parameters_to_fit: vec![1, 0, 1, 1],
        user_info: UserInfo::Grid1D(x),
        tolerance: 1e-9,
        max_iterations: 200,
    };

    let output = batchfit::fit(&request, &EngineLimits::default(), &SolverTuning::default()).expect("fit succeeds");

    for (fit_index, &(amplitude, sigma, offset)) in truths.iter().enumerate() {
        assert_eq!(output.states[fit_index], FitState::Converged, "fit {fit_index} did not converge");
        let p = &output.parameters[fit_index * 4..(fit_index + 1) * 4];
        assert!((p[1] - TRUE_CENTER).abs() < f64::EPSILON, "center must stay frozen exactly");
        assert!((p[0] - amplitude).abs() / amplitude < 0.05, "amplitude out of tolerance");
        assert!((p[2] - sigma).abs() / sigma < 0.05, "sigma out of tolerance");
        assert!((p[3] - offset).abs() < 0.1, "offset out of tolerance");
    }
}
