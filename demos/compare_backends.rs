//! Trains the same linear regression with every gradient strategy and compares
//! the learned coefficients and train/test error.
//!
//! Data is synthetic: 8 features drawn uniformly from `[0, 1)` (already
//! min-max scaled), targets from a fixed linear rule plus Gaussian noise.
//! 25% of the rows are held out for testing.
//!
//! Run with: RUST_LOG=info cargo run --example compare_backends

use linreg_parity::{
    config::TrainingConfig,
    metrics::Metrics,
    regressor::LinearRegressor,
    strategy::{EagerAutodiff, GradientStrategy, GraphAutodiff, ManualGradient},
    CpuBackend, NdarrayBackend,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::error::Error;

const SEED: u64 = 71;
const N_SAMPLES: usize = 2000;
const TRUE_WEIGHTS: [f32; 8] = [4.0, -2.0, 0.5, 1.5, 0.0, -3.0, 2.5, 1.0];
const TRUE_BIAS: f32 = 0.75;

type Split = (Vec<Vec<f32>>, Vec<f32>, Vec<Vec<f32>>, Vec<f32>);

fn synthetic_split() -> Result<Split, Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let noise = Normal::new(0.0f32, 0.1)?;

    let mut rows: Vec<(Vec<f32>, f32)> = (0..N_SAMPLES)
        .map(|_| {
            let x: Vec<f32> = (0..TRUE_WEIGHTS.len()).map(|_| rng.random::<f32>()).collect();
            let y = x.iter().zip(TRUE_WEIGHTS).map(|(xi, wi)| xi * wi).sum::<f32>()
                + TRUE_BIAS
                + noise.sample(&mut rng);
            (x, y)
        })
        .collect();
    rows.shuffle(&mut rng);

    let n_test = N_SAMPLES / 4;
    let test = rows.split_off(N_SAMPLES - n_test);
    let (x_train, y_train) = rows.into_iter().unzip();
    let (x_test, y_test) = test.into_iter().unzip();
    Ok((x_train, y_train, x_test, y_test))
}

fn evaluate<S: GradientStrategy>(
    label: &str,
    strategy: S,
    config: &TrainingConfig,
    split: &Split,
) -> Result<(), Box<dyn Error>> {
    let (x_train, y_train, x_test, y_test) = split;

    let mut model = LinearRegressor::new(strategy, config.clone())?;
    model.ingest(x_train.clone(), y_train.clone())?;
    let report = model.fit()?;

    let to_f64 = |y: &[f32]| y.iter().map(|&v| f64::from(v)).collect::<Vec<_>>();
    let train_mse = Metrics::mse(&to_f64(y_train), &model.predict(x_train)?)?;
    let test_mse = Metrics::mse(&to_f64(y_test), &model.predict(x_test)?)?;
    let c = model.coefficients()?;

    println!("--- {label} ---");
    println!("bias:    {:.6}", c.bias);
    println!("weights: {:.6?}", c.weights);
    println!(
        "final epoch loss: {:.6}",
        report.final_loss().unwrap_or(f64::NAN)
    );
    println!("Training mean squared error: {train_mse:.6}");
    println!("Test mean squared error:     {test_mse:.6}\n");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let split = synthetic_split()?;
    let config = TrainingConfig::default()
        .batch_size(64)
        .learning_rate(0.1)
        .n_epochs(1000)
        .seed(SEED);

    println!("true bias: {TRUE_BIAS}, true weights: {TRUE_WEIGHTS:?}\n");
    evaluate("manual (cpu)", ManualGradient::<CpuBackend>::new(), &config, &split)?;
    evaluate("manual (ndarray)", ManualGradient::<NdarrayBackend>::new(), &config, &split)?;
    evaluate("eager autodiff", EagerAutodiff::new(), &config, &split)?;
    evaluate("graph autodiff", GraphAutodiff::new(), &config, &split)?;
    Ok(())
}
