use crate::HamspamError;
use crate::naive_bayes::DEFAULT_ALPHA;
use crate::vectorizer::VectorizerParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROBE: &str = "Can you please update the project timeline by end of day?";

#[derive(Debug, Deserialize, Default)]
pub struct HamspamConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_data_path")]
    pub data: PathBuf,
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: default_data_path(),
            model_dir: default_model_dir(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data").join("spam.csv")
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model")
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrainingConfig {
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_ngram_min")]
    pub ngram_min: usize,
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
    #[serde(default = "default_min_df")]
    pub min_df: usize,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Messages classified and logged after each training run.
    #[serde(default = "default_probes")]
    pub probes: Vec<String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            ngram_min: default_ngram_min(),
            ngram_max: default_ngram_max(),
            min_df: default_min_df(),
            alpha: default_alpha(),
            probes: default_probes(),
        }
    }
}

impl TrainingConfig {
    pub fn vectorizer_params(&self) -> VectorizerParams {
        VectorizerParams {
            ngram_range: [self.ngram_min, self.ngram_max],
            min_df: self.min_df,
        }
    }
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

fn default_ngram_min() -> usize {
    1
}

fn default_ngram_max() -> usize {
    3
}

fn default_min_df() -> usize {
    1
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_probes() -> Vec<String> {
    vec![DEFAULT_PROBE.into()]
}

/// Load config from HAMSPAM_CONFIG env var, ~/.hamspam/config.toml, or defaults.
pub fn load_config() -> Result<HamspamConfig, HamspamError> {
    let path = config_path();
    match path {
        Some(p) if p.exists() => {
            let content = std::fs::read_to_string(&p)?;
            let config: HamspamConfig = toml::from_str(&content)
                .map_err(|e| HamspamError::Config(format!("{}: {e}", p.display())))?;
            validate_config(&config)?;
            log::debug!("loaded config from {}", p.display());
            Ok(config)
        }
        _ => Ok(HamspamConfig::default()),
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("HAMSPAM_CONFIG") {
        return Some(PathBuf::from(p));
    }
    let home = std::env::var("HOME").ok()?;
    Some(Path::new(&home).join(".hamspam").join("config.toml"))
}

pub fn validate_config(config: &HamspamConfig) -> Result<(), HamspamError> {
    validate_training(&config.training)
}

/// Range checks shared by the config file and CLI overrides.
pub fn validate_training(t: &TrainingConfig) -> Result<(), HamspamError> {
    if !(0.0..1.0).contains(&t.test_fraction) {
        return Err(HamspamError::Config(format!(
            "training.test_fraction must be in [0, 1), got {}",
            t.test_fraction
        )));
    }
    if !t.alpha.is_finite() || t.alpha <= 0.0 {
        return Err(HamspamError::Config(format!(
            "training.alpha must be positive, got {}",
            t.alpha
        )));
    }
    t.vectorizer_params()
        .validate()
        .map_err(|e| HamspamError::Config(format!("training: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_when_no_file() {
        let config = HamspamConfig::default();
        assert_eq!(config.paths.data, PathBuf::from("data/spam.csv"));
        assert_eq!(config.paths.model_dir, PathBuf::from("model"));
        assert_eq!(config.training.test_fraction, 0.2);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.training.alpha, 0.1);
        assert_eq!(config.training.vectorizer_params(), VectorizerParams::default());
        assert_eq!(config.training.probes, vec![DEFAULT_PROBE.to_string()]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[paths]
data = "/srv/corpus/sms.tsv"
model_dir = "/srv/models/spam"

[training]
test_fraction = 0.25
seed = 7
ngram_min = 1
ngram_max = 2
min_df = 2
alpha = 0.5
probes = ["free entry", "see you soon"]
"#;
        let config: HamspamConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.paths.data, PathBuf::from("/srv/corpus/sms.tsv"));
        assert_eq!(config.paths.model_dir, PathBuf::from("/srv/models/spam"));
        assert_eq!(config.training.test_fraction, 0.25);
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.vectorizer_params().ngram_range, [1, 2]);
        assert_eq!(config.training.min_df, 2);
        assert_eq!(config.training.alpha, 0.5);
        assert_eq!(config.training.probes.len(), 2);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config: HamspamConfig = toml::from_str("[training]\nseed = 1\n").unwrap();
        assert_eq!(config.training.seed, 1);
        assert_eq!(config.training.ngram_max, 3);
        assert_eq!(config.paths.model_dir, PathBuf::from("model"));
    }

    #[test]
    fn invalid_values_rejected() {
        for bad in [
            "[training]\ntest_fraction = 1.0\n",
            "[training]\nalpha = 0.0\n",
            "[training]\nalpha = -1.0\n",
            "[training]\nngram_min = 3\nngram_max = 1\n",
            "[training]\nngram_min = 0\n",
            "[training]\nmin_df = 0\n",
        ] {
            let config: HamspamConfig = toml::from_str(bad).unwrap();
            assert!(validate_config(&config).is_err(), "{bad}");
        }
    }
}
