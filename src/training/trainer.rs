//! Training loop for the logistic win-probability model

use burn::data::dataloader::DataLoaderBuilder;
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor};

use crate::data::dataset::{StateBatcher, StateDataset};
use crate::model::{WinProbConfig, WinProbModel};
use crate::training::metrics::{Metrics, TrainingHistory};
use crate::Result;

/// Trainer using plain SGD over the full batch. The dataset is two features
/// wide, so full-batch gradient descent converges quickly and keeps the
/// loop deterministic.
pub struct Trainer<B: AutodiffBackend> {
    model: WinProbModel<B>,
    optimizer: burn::optim::adaptor::OptimizerAdaptor<
        burn::optim::Sgd<B::InnerBackend>,
        WinProbModel<B>,
        B,
    >,
    learning_rate: f64,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Create a new trainer
    pub fn new(device: B::Device, learning_rate: f64) -> Self {
        let model = WinProbModel::new(&device, WinProbConfig::default());
        let optimizer = SgdConfig::new().init();

        Trainer {
            model,
            optimizer,
            learning_rate,
            device,
        }
    }

    /// Train the model, returning the best model by validation loss.
    pub fn train(
        mut self,
        train_dataset: StateDataset,
        val_dataset: StateDataset,
        epochs: usize,
        early_stopping_patience: usize,
    ) -> Result<(WinProbModel<B>, TrainingHistory)> {
        let feature_norm = train_dataset.norm.clone();
        log::info!(
            "Feature normalization: mean={:?}, std={:?}",
            feature_norm.mean,
            feature_norm.std
        );

        let batcher_train = StateBatcher::<B>::new(self.device.clone());
        let batcher_val = StateBatcher::<B>::new(self.device.clone());

        // Full batch, no shuffle: gradients are stable and runs repeat.
        let train_loader = DataLoaderBuilder::new(batcher_train)
            .batch_size(train_dataset.len())
            .build(train_dataset);

        let val_loader = DataLoaderBuilder::new(batcher_val)
            .batch_size(val_dataset.len())
            .build(val_dataset);

        let mut history = TrainingHistory::new();
        let mut best_model = self.model.clone();

        log::info!("Starting training for {} epochs", epochs);

        for epoch in 0..epochs {
            let train_batch = train_loader.iter().next().unwrap();
            let val_batch = val_loader.iter().next().unwrap();

            let x_train = feature_norm.normalize(train_batch.features.clone());
            let y_train = train_batch.home_win.clone().unsqueeze_dim(1);

            let x_val = feature_norm.normalize(val_batch.features.clone());
            let y_val = val_batch.home_win.clone().unsqueeze_dim(1);

            // Forward pass
            let logits = self.model.forward(x_train);
            let probs = sigmoid(logits);

            let loss = self.binary_cross_entropy(probs.clone(), y_train.clone());
            let loss_val: f32 = loss.clone().into_scalar().elem();

            let mut train_metrics = Metrics::new();
            let (correct, total) = self.count_correct(&probs, &y_train);
            train_metrics.update(loss_val, correct, total);

            // Backward pass
            let grads = loss.backward();
            let grads_params = GradientsParams::from_grads(grads, &self.model);
            self.model = self
                .optimizer
                .step(self.learning_rate, self.model, grads_params);

            // Validation
            let val_logits = self.model.forward(x_val);
            let val_probs = sigmoid(val_logits);
            let val_loss = self.binary_cross_entropy(val_probs.clone(), y_val.clone());
            let val_loss_val: f32 = val_loss.into_scalar().elem();

            let mut val_metrics = Metrics::new();
            let (correct, total) = self.count_correct(&val_probs, &y_val);
            val_metrics.update(val_loss_val, correct, total);

            history.record_epoch(epoch, &train_metrics, &val_metrics);

            if val_metrics.avg_loss() <= history.best_val_loss {
                best_model = self.model.clone();
            }

            if epoch % 25 == 0 || epoch == epochs - 1 {
                log::info!(
                    "Epoch {}/{}: Train: {} | Val: {}",
                    epoch + 1,
                    epochs,
                    train_metrics,
                    val_metrics
                );
            }

            if history.should_early_stop(early_stopping_patience) {
                log::info!(
                    "Early stopping at epoch {} (best was epoch {})",
                    epoch + 1,
                    history.best_epoch + 1
                );
                break;
            }
        }

        Ok((best_model, history))
    }

    fn binary_cross_entropy(&self, probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        let eps = 1e-7;
        let probs_clamped = probs.clamp(eps, 1.0 - eps);
        let loss = targets.clone().neg() * probs_clamped.clone().log()
            - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
        loss.mean()
    }

    fn count_correct(&self, probs: &Tensor<B, 2>, targets: &Tensor<B, 2>) -> (usize, usize) {
        let probs_data = probs.clone().into_data();
        let targets_data = targets.clone().into_data();
        let probs_slice: &[f32] = probs_data.as_slice().unwrap();
        let targets_slice: &[f32] = targets_data.as_slice().unwrap();

        let correct = probs_slice
            .iter()
            .zip(targets_slice.iter())
            .filter(|(p, t)| (**p >= 0.5) == (**t >= 0.5))
            .count();

        (correct, probs_slice.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::database::TrainingRow;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray<f32>>;

    /// Synthetic games where the leader at any point goes on to win; the
    /// trained model must learn that a positive margin favors the home side.
    fn synthetic_rows(games: usize) -> Vec<TrainingRow> {
        let mut rows = Vec::new();
        for g in 0..games {
            let home_win = g % 2 == 0;
            for step in 0..20i64 {
                let lead = 2 + (step * 18) / 19;
                let (home, away) = if home_win {
                    (50 + lead, 50)
                } else {
                    (50, 50 + lead)
                };
                rows.push(TrainingRow {
                    game_id: format!("{:04}", g),
                    home_score: home,
                    away_score: away,
                    time_remaining_sec: 2880 - step * 144,
                    home_win: home_win as i64,
                });
            }
        }
        rows
    }

    #[test]
    fn test_learns_margin_direction() {
        let rows = synthetic_rows(20);
        let (train_rows, val_rows) = StateDataset::split_rows_by_game(rows, 0.8);

        let train = StateDataset::from_rows(&train_rows);
        let val = StateDataset::with_norm(&val_rows, train.norm.clone());
        let norm = train.norm.clone();

        let device = Default::default();
        let trainer = Trainer::<TestBackend>::new(device, 0.5);
        let (model, history) = trainer.train(train, val, 300, 0).unwrap();

        assert!(history.best_val_loss < 0.5);

        // Home up 20 with two minutes left must be comfortably above even.
        let device = Default::default();
        let point = norm.normalize_point(20.0, 120.0);
        let features =
            Tensor::<TestBackend, 1>::from_floats(point.as_slice(), &device).reshape([1, 2]);
        let prob: f32 = sigmoid(model.forward(features)).into_scalar().elem();
        assert!(prob > 0.5, "got {}", prob);

        let point = norm.normalize_point(-20.0, 120.0);
        let features =
            Tensor::<TestBackend, 1>::from_floats(point.as_slice(), &device).reshape([1, 2]);
        let prob: f32 = sigmoid(model.forward(features)).into_scalar().elem();
        assert!(prob < 0.5, "got {}", prob);
    }
}
