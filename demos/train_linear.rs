//! Fits one model from a JSON config and writes a checkpoint.
//!
//! Usage: cargo run --example train_linear -- [config.json] [strategy]
//!
//! `strategy` is one of `manual`, `eager`, `graph` (default `graph`). Without a
//! config file the defaults are used with a 200-epoch budget and a checkpoint
//! at `target/linreg.bin`.

use linreg_parity::{
    config::TrainingConfig,
    regressor::LinearRegressor,
    strategy::{EagerAutodiff, GradientStrategy, GraphAutodiff, ManualGradient},
    CpuBackend,
};
use std::error::Error;

fn line_data() -> (Vec<Vec<f32>>, Vec<f32>) {
    let x: Vec<Vec<f32>> = (0..500)
        .map(|i| {
            let t = i as f32 / 500.0;
            vec![t, 1.0 - t * t]
        })
        .collect();
    let y = x.iter().map(|r| 1.5 * r[0] - 0.5 * r[1] + 2.0).collect();
    (x, y)
}

fn run<S: GradientStrategy>(strategy: S, config: TrainingConfig) -> Result<(), Box<dyn Error>> {
    let checkpoint = config.checkpoint.clone();
    let mut model = LinearRegressor::new(strategy, config)?;
    let (x, y) = line_data();
    model.ingest(x, y)?;
    let report = model.fit()?;

    println!("strategy: {}", model.strategy().name());
    println!("epochs:   {}", report.n_epochs());
    println!("coefficients: {:?}", model.coefficients()?);
    println!("prediction at [0.5, 0.75]: {:?}", model.predict(&[vec![0.5, 0.75]])?);

    if let Some(path) = checkpoint {
        let mut restored = LinearRegressor::new(GraphAutodiff::new(), TrainingConfig::default())?;
        restored.restore_checkpoint(&path)?;
        println!(
            "restored from {}: {:?}",
            path.display(),
            restored.coefficients()?
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => TrainingConfig::default()
            .learning_rate(0.5)
            .n_epochs(200)
            .report_every(20)
            .seed(7)
            .checkpoint("target/linreg.bin"),
    };

    match args.next().as_deref().unwrap_or("graph") {
        "manual" => run(ManualGradient::<CpuBackend>::new(), config),
        "eager" => run(EagerAutodiff::new(), config),
        "graph" => run(GraphAutodiff::new(), config),
        other => Err(format!("unknown strategy `{other}`").into()),
    }
}
