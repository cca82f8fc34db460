//! Offline trainer: mini-batch gradient descent on mean squared error.

use super::artifact::ModelArtifact;
use super::linear::LinearSequenceModel;
use crate::config::PipelineConfig;
use crate::domain::PriceSeries;
use crate::enrich::enrich;
use crate::features::{build_training_set, TrainingSet, WindowError};
use ndarray::{s, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("window building failed: {0}")]
    Window(#[from] WindowError),

    #[error("no training samples: need more than window_size clean rows")]
    NoSamples,

    #[error("invalid training options: {0}")]
    InvalidOptions(String),

    #[error("training diverged at epoch {epoch} (loss is not finite)")]
    Diverged { epoch: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// L2 penalty on the weights (not the bias).
    pub l2: f64,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 32,
            learning_rate: 0.01,
            l2: 1e-4,
            seed: 42,
        }
    }
}

impl TrainOptions {
    fn validate(&self) -> Result<(), TrainError> {
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(TrainError::InvalidOptions(
                "epochs and batch_size must be >= 1".into(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(TrainError::InvalidOptions(
                "learning_rate must be a positive number".into(),
            ));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(TrainError::InvalidOptions("l2 must be >= 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub samples: usize,
    pub epochs: usize,
    /// Full-set MSE after each epoch.
    pub loss_history: Vec<f64>,
    pub final_loss: f64,
}

/// Fit a [`LinearSequenceModel`] to a training set. Deterministic for a given seed.
pub fn fit(
    set: &TrainingSet,
    opts: &TrainOptions,
) -> Result<(LinearSequenceModel, TrainReport), TrainError> {
    opts.validate()?;
    if set.is_empty() {
        return Err(TrainError::NoSamples);
    }

    let (samples, window, n_features) = set.windows.dim();
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let init = Array2::from_shape_fn((window, n_features), |_| rng.gen_range(-0.01_f64..0.01));
    let mut model = LinearSequenceModel::from_parts(init, set.targets.mean().unwrap_or(0.0));

    let mut order: Vec<usize> = (0..samples).collect();
    let mut loss_history = Vec::with_capacity(opts.epochs);

    for epoch in 0..opts.epochs {
        order.shuffle(&mut rng);
        for batch in order.chunks(opts.batch_size) {
            let mut grad_w = Array2::<f64>::zeros((window, n_features));
            let mut grad_b = 0.0;
            for &i in batch {
                let x = set.windows.slice(s![i, .., ..]);
                let err = model.forward(x) - set.targets[i];
                grad_w.scaled_add(err, &x);
                grad_b += err;
            }
            let scale = 2.0 / batch.len() as f64;
            grad_w *= scale;
            grad_w.scaled_add(2.0 * opts.l2, model.weights());

            let lr = opts.learning_rate;
            model.weights_mut().scaled_add(-lr, &grad_w);
            model.set_bias(model.bias() - lr * scale * grad_b);
        }

        let loss = mse(&model, set);
        if !loss.is_finite() {
            return Err(TrainError::Diverged { epoch });
        }
        tracing::debug!(epoch, loss, "epoch complete");
        loss_history.push(loss);
    }

    let final_loss = loss_history.last().copied().unwrap_or(f64::NAN);
    Ok((
        model,
        TrainReport {
            samples,
            epochs: opts.epochs,
            loss_history,
            final_loss,
        },
    ))
}

fn mse(model: &LinearSequenceModel, set: &TrainingSet) -> f64 {
    let samples = set.len();
    let total: f64 = (0..samples)
        .map(|i| {
            let err = model.forward(set.windows.slice(s![i, .., ..])) - set.targets[i];
            err * err
        })
        .sum();
    total / samples as f64
}

/// Enrich, window, fit, and package the model with its contract and scaler.
pub fn train_from_series(
    series: PriceSeries,
    config: &PipelineConfig,
    opts: &TrainOptions,
) -> Result<(ModelArtifact, TrainReport), TrainError> {
    let symbol = series.symbol().to_string();
    let timeframe = series.timeframe();
    let enriched = enrich(series, &config.indicators);
    let set = build_training_set(&enriched, config)?;
    let (model, report) = fit(&set, opts)?;
    tracing::info!(
        symbol = %symbol,
        samples = report.samples,
        epochs = report.epochs,
        final_loss = report.final_loss,
        "model trained"
    );
    let artifact = ModelArtifact::new(
        config.clone(),
        set.scaler,
        model,
        symbol,
        timeframe,
        report.samples,
        report.final_loss,
    );
    Ok((artifact, report))
}
