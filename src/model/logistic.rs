//! Logistic win-probability model
//!
//! A single linear layer over the normalized (score margin, time remaining)
//! pair. The forward pass returns the logit; callers apply sigmoid to get
//! P(home win).

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, Recorder};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Configuration for the win-probability model
#[derive(Debug, Clone)]
pub struct WinProbConfig {
    /// Input dimension (margin, time remaining).
    pub input_dim: usize,
}

impl Default for WinProbConfig {
    fn default() -> Self {
        WinProbConfig {
            input_dim: crate::data::dataset::FeatureNormalization::DIM,
        }
    }
}

/// Logistic regression over game state
#[derive(Module, Debug)]
pub struct WinProbModel<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> WinProbModel<B> {
    /// Create a new model
    pub fn new(device: &B::Device, config: WinProbConfig) -> Self {
        WinProbModel {
            linear: LinearConfig::new(config.input_dim, 1).init(device),
        }
    }

    /// Forward pass: normalized features [batch, 2] -> win logit [batch, 1].
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(features)
    }

    /// Save model to file
    pub fn save(&self, path: &str) -> crate::Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.into())
            .map_err(|e| crate::HoopsError::Io(std::io::Error::other(e.to_string())))
    }

    /// Load model from file
    pub fn load(device: &B::Device, path: &str, config: WinProbConfig) -> crate::Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(path.into(), device)
            .map_err(|e| crate::HoopsError::Io(std::io::Error::other(e.to_string())))?;

        let model = Self::new(device, config);
        Ok(model.load_record(record))
    }
}
