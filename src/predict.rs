//! Load-once, serve-many predictor handle.
//!
//! A `Predictor` owns an immutable model pair. Construct it at startup and
//! share it by reference or `Arc`; inference never mutates it.

use crate::HamspamError;
use crate::artifact::{ModelPair, load_pair};
use crate::cli::PredictArgs;
use crate::dataset::{Label, decode_text};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Predictor {
    pair: ModelPair,
}

impl Predictor {
    /// Load the artifact pair from `model_dir`. Any failure is returned;
    /// there is no fallback model.
    pub fn load(model_dir: &Path) -> Result<Self, HamspamError> {
        let pair = load_pair(model_dir)?;
        log::info!(
            "loaded classifier model ({} features, fingerprint {})",
            pair.n_features(),
            pair.fingerprint.as_deref().unwrap_or("-")
        );
        Ok(Self { pair })
    }

    pub fn from_pair(pair: ModelPair) -> Self {
        Self { pair }
    }

    pub fn predict(&self, text: &str) -> Label {
        let x = self.pair.vectorizer.transform(text);
        self.pair.classifier.predict(&x)
    }

    /// `"Spam"` or `"Ham"`.
    pub fn predict_email(&self, text: &str) -> &'static str {
        self.predict(text).as_str()
    }

    /// Predicted label and its posterior probability.
    pub fn predict_with_confidence(&self, text: &str) -> (Label, f64) {
        let x = self.pair.vectorizer.transform(text);
        let label = self.pair.classifier.predict(&x);
        let proba = self.pair.classifier.predict_proba(&x);
        (label, proba[label.index()])
    }
}

/// Classify text from the command line, or stdin when no words are given.
pub fn handle_predict(model_dir: &Path, args: &PredictArgs) -> Result<(), HamspamError> {
    let text = if args.text.is_empty() {
        let mut raw = Vec::new();
        std::io::stdin().read_to_end(&mut raw)?;
        decode_text(&raw)
    } else {
        args.text.join(" ")
    };
    if text.trim().is_empty() {
        return Err(HamspamError::Data("no text to classify".into()));
    }

    let predictor = Predictor::load(model_dir)?;
    if args.confidence {
        let (label, confidence) = predictor.predict_with_confidence(&text);
        println!("{label}\t{confidence:.4}");
    } else {
        println!("{}", predictor.predict_email(&text));
    }
    Ok(())
}
