//! Training hyperparameters.
//!
//! [`TrainingConfig`] can be built in code with chained setters or loaded from
//! JSON; every field is optional in JSON and falls back to its default.
//!
//! ```
//! use linreg_parity::config::TrainingConfig;
//!
//! let cfg = TrainingConfig::default()
//!     .learning_rate(0.1)
//!     .batch_size(32)
//!     .seed(7);
//! assert!(cfg.validate().is_ok());
//!
//! let from_json = TrainingConfig::from_json_str(r#"{ "n_epochs": 50 }"#).unwrap();
//! assert_eq!(from_json.n_epochs, 50);
//! assert_eq!(from_json.batch_size, 64);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LinRegError, Result};

/// How model weights are initialised before the first epoch. The bias always
/// starts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    #[default]
    Zeros,
    /// Draw each weight from `N(0, std_dev²)`.
    Normal { std_dev: f64 },
}

/// Hyperparameters shared by every gradient strategy.
///
/// Defaults:
/// - `batch_size`: 64
/// - `learning_rate`: 0.01
/// - `n_epochs`: 1000
/// - `shuffle`: true (once, at ingestion)
/// - `report_every`: 100 (0 disables epoch reports)
/// - `seed`: none (OS entropy)
/// - `weight_init`: zeros
/// - `checkpoint`: none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub batch_size: usize,
    pub learning_rate: f64,
    pub n_epochs: usize,
    pub shuffle: bool,
    pub report_every: usize,
    pub seed: Option<u64>,
    pub weight_init: WeightInit,
    /// When set, `fit` saves the coefficients here after the last epoch.
    pub checkpoint: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            learning_rate: 0.01,
            n_epochs: 1000,
            shuffle: true,
            report_every: 100,
            seed: None,
            weight_init: WeightInit::Zeros,
            checkpoint: None,
        }
    }
}

impl TrainingConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn n_epochs(mut self, epochs: usize) -> Self {
        self.n_epochs = epochs;
        self
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Emit an epoch report every `every` epochs; `0` turns reporting off.
    pub fn report_every(mut self, every: usize) -> Self {
        self.report_every = every;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn weight_init(mut self, init: WeightInit) -> Self {
        self.weight_init = init;
        self
    }

    pub fn checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    /// Rejects hyperparameters that cannot drive a fit.
    ///
    /// # Errors
    /// [`LinRegError::InvalidConfig`] for a zero `batch_size` or `n_epochs`, a
    /// non-positive or non-finite `learning_rate`, or a negative or non-finite
    /// initialisation standard deviation.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LinRegError::InvalidConfig(
                "batch_size must be positive".into(),
            ));
        }
        if self.n_epochs == 0 {
            return Err(LinRegError::InvalidConfig(
                "n_epochs must be positive".into(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(LinRegError::InvalidConfig(format!(
                "learning_rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if let WeightInit::Normal { std_dev } = self.weight_init {
            if !std_dev.is_finite() || std_dev < 0.0 {
                return Err(LinRegError::InvalidConfig(format!(
                    "weight init std_dev must be non-negative and finite, got {std_dev}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = TrainingConfig::default();
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.learning_rate, 0.01);
        assert_eq!(cfg.n_epochs, 1000);
        assert!(cfg.shuffle);
        assert_eq!(cfg.report_every, 100);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.weight_init, WeightInit::Zeros);
        assert!(cfg.checkpoint.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_chained_setters() {
        let cfg = TrainingConfig::default()
            .batch_size(8)
            .learning_rate(0.5)
            .n_epochs(3)
            .shuffle(false)
            .report_every(0)
            .seed(42)
            .weight_init(WeightInit::Normal { std_dev: 0.1 })
            .checkpoint("model.bin");
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.learning_rate, 0.5);
        assert_eq!(cfg.n_epochs, 3);
        assert!(!cfg.shuffle);
        assert_eq!(cfg.report_every, 0);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.checkpoint, Some(PathBuf::from("model.bin")));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            TrainingConfig::default().batch_size(0),
            TrainingConfig::default().n_epochs(0),
            TrainingConfig::default().learning_rate(0.0),
            TrainingConfig::default().learning_rate(-0.1),
            TrainingConfig::default().learning_rate(f64::NAN),
            TrainingConfig::default().weight_init(WeightInit::Normal { std_dev: -1.0 }),
        ];
        for cfg in bad {
            assert!(
                matches!(cfg.validate(), Err(LinRegError::InvalidConfig(_))),
                "{cfg:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = TrainingConfig::from_json_str(
            r#"{ "learning_rate": 0.1, "weight_init": { "normal": { "std_dev": 0.5 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.learning_rate, 0.1);
        assert_eq!(cfg.weight_init, WeightInit::Normal { std_dev: 0.5 });
        assert_eq!(cfg.batch_size, 64);
    }

    #[test]
    fn test_from_json_invalid_values() {
        let err = TrainingConfig::from_json_str(r#"{ "batch_size": 0 }"#).unwrap_err();
        assert!(matches!(err, LinRegError::InvalidConfig(_)));

        let err = TrainingConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, LinRegError::Config(_)));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "n_epochs": 5, "seed": 9 }}"#).unwrap();

        let cfg = TrainingConfig::from_json_file(file.path()).unwrap();
        assert_eq!(cfg.n_epochs, 5);
        assert_eq!(cfg.seed, Some(9));
    }
}
