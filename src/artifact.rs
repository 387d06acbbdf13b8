//! Persisted model pair: `vectorizer.json` + `classifier.json`.
//!
//! The classifier's feature space only means something next to the
//! vectorizer that produced it, so the two files are always written and
//! loaded together and their dimensions must agree.

use crate::HamspamError;
use crate::naive_bayes::MultinomialNb;
use crate::vectorizer::TfidfVectorizer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
const FORMAT_VERSION: u32 = 1;

/// Provenance recorded alongside the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMeta {
    /// Unix epoch seconds.
    pub created_at: u64,
    pub seed: u64,
    pub test_fraction: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub train_accuracy: f64,
    pub test_accuracy: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    format_version: u32,
    n_features: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<TrainingMeta>,
    model: T,
}

/// Fitted vectorizer and classifier that share one feature space.
#[derive(Debug, Clone)]
pub struct ModelPair {
    pub vectorizer: TfidfVectorizer,
    pub classifier: MultinomialNb,
    pub meta: TrainingMeta,
    /// SipHash of the artifact bytes, set when loaded from disk.
    pub fingerprint: Option<String>,
}

impl ModelPair {
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: MultinomialNb,
        meta: TrainingMeta,
    ) -> Result<Self, HamspamError> {
        check_dimensions(&vectorizer, &classifier)?;
        Ok(Self {
            vectorizer,
            classifier,
            meta,
            fingerprint: None,
        })
    }

    pub fn n_features(&self) -> usize {
        self.vectorizer.n_features()
    }
}

fn check_dimensions(v: &TfidfVectorizer, c: &MultinomialNb) -> Result<(), HamspamError> {
    if v.n_features() != c.n_features() {
        return Err(HamspamError::Model(format!(
            "artifact mismatch: vectorizer has {} features, classifier expects {}",
            v.n_features(),
            c.n_features()
        )));
    }
    Ok(())
}

pub fn vectorizer_path(dir: &Path) -> PathBuf {
    dir.join(VECTORIZER_FILE)
}

pub fn classifier_path(dir: &Path) -> PathBuf {
    dir.join(CLASSIFIER_FILE)
}

/// Compute a SipHash fingerprint of raw bytes, returned as 16-char hex string.
fn siphash_hex(parts: &[&[u8]]) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::hash::DefaultHasher::new();
    for part in parts {
        part.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

/// Write both artifacts, replacing any previous pair.
///
/// Both files are staged under temporary names first, then renamed into
/// place, so a failed serialization leaves the old pair untouched.
pub fn save_pair(dir: &Path, pair: &ModelPair) -> Result<(), HamspamError> {
    check_dimensions(&pair.vectorizer, &pair.classifier)?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        log::info!("created model directory {}", dir.display());
    }

    let vectorizer = serde_json::to_vec(&Envelope {
        format_version: FORMAT_VERSION,
        n_features: pair.vectorizer.n_features(),
        meta: None,
        model: &pair.vectorizer,
    })?;
    let classifier = serde_json::to_vec_pretty(&Envelope {
        format_version: FORMAT_VERSION,
        n_features: pair.classifier.n_features(),
        meta: Some(pair.meta.clone()),
        model: &pair.classifier,
    })?;

    let staged = [
        (vectorizer_path(dir), vectorizer),
        (classifier_path(dir), classifier),
    ];
    for (path, bytes) in &staged {
        std::fs::write(path.with_extension("json.tmp"), bytes)?;
    }
    for (path, _) in &staged {
        std::fs::rename(path.with_extension("json.tmp"), path)?;
    }
    Ok(())
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, HamspamError> {
    if !path.is_file() {
        return Err(HamspamError::Model(format!(
            "missing artifact {} (run `hamspam train` first)",
            path.display()
        )));
    }
    Ok(std::fs::read(path)?)
}

fn parse_envelope<T: serde::de::DeserializeOwned>(
    path: &Path,
    raw: &[u8],
) -> Result<Envelope<T>, HamspamError> {
    let envelope: Envelope<T> = serde_json::from_slice(raw)
        .map_err(|e| HamspamError::Model(format!("{}: {e}", path.display())))?;
    if envelope.format_version != FORMAT_VERSION {
        return Err(HamspamError::Model(format!(
            "{}: unsupported format version {}",
            path.display(),
            envelope.format_version
        )));
    }
    Ok(envelope)
}

/// Load and cross-check both artifacts from `dir`.
pub fn load_pair(dir: &Path) -> Result<ModelPair, HamspamError> {
    let v_path = vectorizer_path(dir);
    let c_path = classifier_path(dir);
    let v_raw = read_artifact(&v_path)?;
    let c_raw = read_artifact(&c_path)?;

    let v_env: Envelope<TfidfVectorizer> = parse_envelope(&v_path, &v_raw)?;
    let c_env: Envelope<MultinomialNb> = parse_envelope(&c_path, &c_raw)?;

    let vectorizer = v_env.model;
    let classifier = c_env.model;
    vectorizer.validate()?;
    classifier.validate()?;

    if v_env.n_features != vectorizer.n_features() {
        return Err(HamspamError::Model(format!(
            "{}: header says {} features, body has {}",
            v_path.display(),
            v_env.n_features,
            vectorizer.n_features()
        )));
    }
    if c_env.n_features != classifier.n_features() {
        return Err(HamspamError::Model(format!(
            "{}: header says {} features, body has {}",
            c_path.display(),
            c_env.n_features,
            classifier.n_features()
        )));
    }
    let meta = c_env.meta.ok_or_else(|| {
        HamspamError::Model(format!("{}: no training metadata", c_path.display()))
    })?;

    let mut pair = ModelPair::new(vectorizer, classifier, meta)?;
    pair.fingerprint = Some(siphash_hex(&[v_raw.as_slice(), c_raw.as_slice()]));
    Ok(pair)
}
