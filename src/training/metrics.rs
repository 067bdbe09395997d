//! Training metrics and evaluation

use std::fmt;

/// Metrics accumulated during training/evaluation
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    /// Total loss
    pub total_loss: f64,
    /// Number of correct win predictions
    pub correct_wins: usize,
    /// Total predictions
    pub total_predictions: usize,
    /// Number of batches accumulated
    pub batch_count: usize,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update metrics with a batch result
    pub fn update(&mut self, loss: f32, correct_wins: usize, batch_size: usize) {
        self.total_loss += loss as f64;
        self.correct_wins += correct_wins;
        self.total_predictions += batch_size;
        self.batch_count += 1;
    }

    /// Get average loss
    pub fn avg_loss(&self) -> f64 {
        if self.batch_count == 0 {
            0.0
        } else {
            self.total_loss / self.batch_count as f64
        }
    }

    /// Get win prediction accuracy
    pub fn accuracy(&self) -> f64 {
        if self.total_predictions == 0 {
            0.0
        } else {
            self.correct_wins as f64 / self.total_predictions as f64
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loss: {:.4} | Acc: {:.2}%",
            self.avg_loss(),
            self.accuracy() * 100.0
        )
    }
}

/// Training history for tracking progress
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    pub train_losses: Vec<f64>,
    pub val_losses: Vec<f64>,
    pub train_accuracies: Vec<f64>,
    pub val_accuracies: Vec<f64>,
    pub best_val_loss: f64,
    pub best_epoch: usize,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self {
            best_val_loss: f64::INFINITY,
            ..Default::default()
        }
    }

    /// Record metrics for an epoch
    pub fn record_epoch(&mut self, epoch: usize, train: &Metrics, val: &Metrics) {
        self.train_losses.push(train.avg_loss());
        self.val_losses.push(val.avg_loss());
        self.train_accuracies.push(train.accuracy());
        self.val_accuracies.push(val.accuracy());

        if val.avg_loss() < self.best_val_loss {
            self.best_val_loss = val.avg_loss();
            self.best_epoch = epoch;
        }
    }

    /// Check if we should early stop
    pub fn should_early_stop(&self, patience: usize) -> bool {
        if patience == 0 || self.val_losses.len() < patience {
            return false;
        }
        let current_epoch = self.val_losses.len() - 1;
        current_epoch - self.best_epoch >= patience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let mut metrics = Metrics::new();
        metrics.update(0.5, 3, 4);
        metrics.update(0.3, 4, 4);
        assert!((metrics.accuracy() - 7.0 / 8.0).abs() < 1e-9);
        assert!((metrics.avg_loss() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_early_stopping() {
        let mut history = TrainingHistory::new();
        let mut improving = Metrics::new();
        improving.update(0.2, 1, 1);
        let mut flat = Metrics::new();
        flat.update(0.5, 1, 1);

        history.record_epoch(0, &improving, &improving);
        for epoch in 1..=4 {
            history.record_epoch(epoch, &flat, &flat);
        }

        assert_eq!(history.best_epoch, 0);
        assert!(!history.should_early_stop(5));
        assert!(history.should_early_stop(4));
        assert!(!history.should_early_stop(0));
    }
}
