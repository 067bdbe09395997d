//! Model inference
//!
//! Wraps the trained model behind a call that can always answer: malformed
//! inputs or any inference fault fall back to a neutral 0.5 instead of
//! surfacing an error into the replay loop.

use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor};

use crate::data::dataset::FeatureNormalization;
use crate::data::Database;
use crate::model::{WinProbConfig, WinProbModel};
use crate::{HoopsError, Result};

/// Probability returned when the model cannot produce a usable answer.
pub const NEUTRAL_PROB: f32 = 0.5;

/// Predictor for win probabilities
pub struct Predictor<B: Backend> {
    model: WinProbModel<B>,
    norm: FeatureNormalization,
    device: B::Device,
}

impl<B: Backend> Predictor<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Create a predictor from a model and the normalization it was trained
    /// with.
    pub fn new(model: WinProbModel<B>, norm: FeatureNormalization, device: B::Device) -> Self {
        Predictor {
            model,
            norm,
            device,
        }
    }

    /// Load the saved model and recompute normalization from the stored
    /// game states.
    pub fn load(db: &Database, model_path: &str, device: B::Device) -> Result<Self> {
        // Burn writes models with an .mpk extension.
        let model_file = format!("{}.mpk", model_path);
        if !std::path::Path::new(&model_file).exists() {
            return Err(HoopsError::NoModel);
        }

        let model = WinProbModel::load(&device, model_path, WinProbConfig::default())?;
        let rows = db.training_rows()?;
        let norm = FeatureNormalization::from_rows(&rows);

        Ok(Self::new(model, norm, device))
    }

    /// P(home win) for a score margin and seconds remaining.
    ///
    /// Never fails: non-finite inputs and non-finite model output both
    /// yield the neutral probability.
    pub fn win_probability(&self, margin: f32, time_remaining: f32) -> f32 {
        if !margin.is_finite() || !time_remaining.is_finite() {
            return NEUTRAL_PROB;
        }

        let point = self.norm.normalize_point(margin, time_remaining);
        if point.iter().any(|v| !v.is_finite()) {
            return NEUTRAL_PROB;
        }

        let features =
            Tensor::<B, 1>::from_floats(point.as_slice(), &self.device).reshape([1, 2]);
        let prob: f32 = sigmoid(self.model.forward(features)).into_scalar().elem();

        if prob.is_finite() {
            prob.clamp(0.0, 1.0)
        } else {
            NEUTRAL_PROB
        }
    }
}
