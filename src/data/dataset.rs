//! Burn Dataset over stored game states
//!
//! Each training sample is a (score margin, time remaining) pair with the
//! game's final home-win outcome as target. Splits are game-granular so no
//! game contributes rows to both sides of a split.

use crate::data::database::TrainingRow;
use burn::data::dataset::Dataset;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// One training sample.
#[derive(Debug, Clone, Copy)]
pub struct StateSample {
    pub margin: f32,
    pub time_remaining: f32,
    /// Target: 1.0 if the home team won the game.
    pub home_win: f32,
}

/// Z-score normalization parameters for the (margin, time remaining)
/// feature pair, computed from training rows and reused verbatim for
/// validation and inference.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureNormalization {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl FeatureNormalization {
    pub const DIM: usize = 2;

    /// Compute from training rows.
    pub fn from_rows(rows: &[TrainingRow]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }

        let mut sum = vec![0.0f64; Self::DIM];
        let mut sum_sq = vec![0.0f64; Self::DIM];

        for row in rows {
            let features = [row.margin() as f64, row.time_remaining_sec as f64];
            for (j, value) in features.iter().enumerate() {
                sum[j] += value;
                sum_sq[j] += value * value;
            }
        }

        let n = rows.len() as f64;
        let mean: Vec<f32> = sum.iter().map(|s| (s / n) as f32).collect();
        let std: Vec<f32> = sum_sq
            .iter()
            .zip(mean.iter())
            .map(|(sq, m)| {
                let var = (sq / n) as f32 - m * m;
                var.max(0.0).sqrt().max(0.001)
            })
            .collect();

        FeatureNormalization { mean, std }
    }

    /// Normalize a feature tensor [batch, 2].
    pub fn normalize<B: Backend>(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = features.device();
        let mean = Tensor::<B, 1>::from_floats(self.mean.as_slice(), &device).unsqueeze_dim(0);
        let std = Tensor::<B, 1>::from_floats(self.std.as_slice(), &device).unsqueeze_dim(0);
        (features - mean) / std
    }

    /// Normalize a single (margin, time remaining) point.
    pub fn normalize_point(&self, margin: f32, time_remaining: f32) -> [f32; 2] {
        [
            (margin - self.mean[0]) / self.std[0],
            (time_remaining - self.mean[1]) / self.std[1],
        ]
    }
}

impl Default for FeatureNormalization {
    fn default() -> Self {
        // Roughly the spread of NBA margins and a regulation clock.
        FeatureNormalization {
            mean: vec![0.0, 1440.0],
            std: vec![10.0, 830.0],
        }
    }
}

/// Game-state dataset for training
#[derive(Clone)]
pub struct StateDataset {
    samples: Vec<StateSample>,
    pub norm: FeatureNormalization,
}

impl StateDataset {
    /// Build from training rows, computing normalization from them.
    pub fn from_rows(rows: &[TrainingRow]) -> Self {
        let norm = FeatureNormalization::from_rows(rows);
        Self::with_norm(rows, norm)
    }

    /// Build with normalization carried over from the training split.
    pub fn with_norm(rows: &[TrainingRow], norm: FeatureNormalization) -> Self {
        let samples = rows
            .iter()
            .map(|row| StateSample {
                margin: row.margin() as f32,
                time_remaining: row.time_remaining_sec as f32,
                home_win: if row.home_win != 0 { 1.0 } else { 0.0 },
            })
            .collect();

        StateDataset { samples, norm }
    }

    /// Split rows by game: the first `train_ratio` of games (in id order)
    /// train, the remainder validate. Row-level splits would leak each
    /// game's outcome across the boundary.
    pub fn split_rows_by_game(
        rows: Vec<TrainingRow>,
        train_ratio: f64,
    ) -> (Vec<TrainingRow>, Vec<TrainingRow>) {
        let mut game_ids: Vec<String> = rows.iter().map(|r| r.game_id.clone()).collect();
        game_ids.sort();
        game_ids.dedup();

        let cutoff = ((game_ids.len() as f64) * train_ratio).round() as usize;
        let cutoff = cutoff.min(game_ids.len());
        let train_games: std::collections::HashSet<&String> =
            game_ids[..cutoff].iter().collect();

        rows.into_iter()
            .partition(|row| train_games.contains(&row.game_id))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Dataset<StateSample> for StateDataset {
    fn get(&self, index: usize) -> Option<StateSample> {
        self.samples.get(index).copied()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Batch of samples: features [batch, 2], targets [batch].
#[derive(Debug, Clone)]
pub struct StateBatch<B: Backend> {
    pub features: Tensor<B, 2>,
    pub home_win: Tensor<B, 1>,
}

/// Batcher for creating training batches
#[derive(Clone)]
pub struct StateBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> StateBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        StateBatcher { device }
    }
}

impl<B: Backend> burn::data::dataloader::batcher::Batcher<B, StateSample, StateBatch<B>>
    for StateBatcher<B>
{
    fn batch(&self, items: Vec<StateSample>, _device: &B::Device) -> StateBatch<B> {
        let batch_size = items.len();

        let mut feature_data = Vec::with_capacity(batch_size * FeatureNormalization::DIM);
        let mut target_data = Vec::with_capacity(batch_size);

        for sample in &items {
            feature_data.push(sample.margin);
            feature_data.push(sample.time_remaining);
            target_data.push(sample.home_win);
        }

        let features = Tensor::<B, 1>::from_floats(feature_data.as_slice(), &self.device)
            .reshape([batch_size, FeatureNormalization::DIM]);
        let home_win = Tensor::<B, 1>::from_floats(target_data.as_slice(), &self.device);

        StateBatch { features, home_win }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(game: &str, home: i64, away: i64, secs: i64, win: i64) -> TrainingRow {
        TrainingRow {
            game_id: game.to_string(),
            home_score: home,
            away_score: away,
            time_remaining_sec: secs,
            home_win: win,
        }
    }

    #[test]
    fn test_normalization_stats() {
        let rows = vec![row("001", 10, 0, 100, 1), row("001", 0, 10, 300, 1)];
        let norm = FeatureNormalization::from_rows(&rows);

        assert!((norm.mean[0] - 0.0).abs() < 1e-5);
        assert!((norm.std[0] - 10.0).abs() < 1e-4);
        assert!((norm.mean[1] - 200.0).abs() < 1e-4);
        assert!((norm.std[1] - 100.0).abs() < 1e-3);

        let point = norm.normalize_point(10.0, 300.0);
        assert!((point[0] - 1.0).abs() < 1e-4);
        assert!((point[1] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_split_keeps_games_whole() {
        let rows = vec![
            row("001", 1, 0, 100, 1),
            row("001", 2, 0, 50, 1),
            row("002", 0, 1, 100, 0),
            row("002", 0, 2, 50, 0),
            row("003", 3, 0, 100, 1),
            row("004", 0, 3, 100, 0),
        ];

        let (train, val) = StateDataset::split_rows_by_game(rows, 0.5);
        assert_eq!(train.len(), 4);
        assert_eq!(val.len(), 2);
        assert!(train.iter().all(|r| r.game_id == "001" || r.game_id == "002"));
        assert!(val.iter().all(|r| r.game_id == "003" || r.game_id == "004"));
    }

    #[test]
    fn test_dataset_samples() {
        let rows = vec![row("001", 80, 70, 120, 1)];
        let dataset = StateDataset::from_rows(&rows);

        assert_eq!(dataset.len(), 1);
        let sample = Dataset::get(&dataset, 0).unwrap();
        assert_eq!(sample.margin, 10.0);
        assert_eq!(sample.time_remaining, 120.0);
        assert_eq!(sample.home_win, 1.0);
    }
}
