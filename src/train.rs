//! Offline training run: load, split, fit, evaluate, persist.
//!
//! Artifacts are written only after both models are fitted, so a failed
//! run leaves any previous pair in place.

use crate::HamspamError;
use crate::artifact::{ModelPair, TrainingMeta, save_pair};
use crate::cli::TrainArgs;
use crate::config::{HamspamConfig, TrainingConfig, validate_training};
use crate::dataset::{DropStats, Example, Label, load_dataset, train_test_split};
use crate::naive_bayes::MultinomialNb;
use crate::predict::Predictor;
use crate::report::ClassificationReport;
use crate::vectorizer::TfidfVectorizer;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub data_path: PathBuf,
    pub model_dir: PathBuf,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub records: usize,
    pub dropped: DropStats,
    pub train_size: usize,
    pub test_size: usize,
    pub n_features: usize,
    pub train_accuracy: f64,
    pub test_accuracy: Option<f64>,
    /// Evaluation-subset report; `None` when that subset is empty.
    pub report: Option<ClassificationReport>,
}

fn split_columns(examples: &[Example]) -> (Vec<&str>, Vec<Label>) {
    examples
        .iter()
        .map(|e| (e.text.as_str(), e.label))
        .unzip()
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Fit a model pair on cleaned examples. Pure: no filesystem access.
pub fn fit_pair(
    examples: &[Example],
    training: &TrainingConfig,
) -> Result<(ModelPair, Option<ClassificationReport>), HamspamError> {
    validate_training(training)?;

    let split = train_test_split(examples, training.test_fraction, training.seed)?;
    log::info!(
        "training set size: {}, test set size: {}",
        split.train.len(),
        split.test.len()
    );
    if split.train.is_empty() {
        return Err(HamspamError::Data("training subset is empty".into()));
    }

    let (train_docs, train_labels) = split_columns(&split.train);
    let (test_docs, test_labels) = split_columns(&split.test);

    let [lo, hi] = training.vectorizer_params().ngram_range;
    log::info!("vectorizing text with TF-IDF ({lo}-{hi} grams)...");
    let (vectorizer, x_train) =
        TfidfVectorizer::fit_transform(&train_docs, &training.vectorizer_params())?;
    let x_test: Vec<_> = test_docs.iter().map(|d| vectorizer.transform(d)).collect();
    log::info!("vocabulary size: {}", vectorizer.n_features());

    log::info!("training MultinomialNB with alpha={}...", training.alpha);
    let classifier = MultinomialNb::fit(&x_train, &train_labels, training.alpha)?;

    let train_accuracy = classifier.score(&x_train, &train_labels);
    log::info!("training accuracy: {train_accuracy:.4}");

    let report = if x_test.is_empty() {
        log::info!("test subset empty, skipping evaluation");
        None
    } else {
        let predicted: Vec<Label> = x_test.iter().map(|x| classifier.predict(x)).collect();
        let report = ClassificationReport::new(&test_labels, &predicted);
        log::info!("test accuracy: {:.4}", report.accuracy);
        log::info!("classification report:\n{report}");
        Some(report)
    };

    let meta = TrainingMeta {
        created_at: epoch_secs(),
        seed: training.seed,
        test_fraction: training.test_fraction,
        train_size: split.train.len(),
        test_size: split.test.len(),
        train_accuracy,
        test_accuracy: report.as_ref().map(|r| r.accuracy),
    };
    let pair = ModelPair::new(vectorizer, classifier, meta)?;
    Ok((pair, report))
}

fn check_input(data_path: &Path) -> Result<(), HamspamError> {
    if let Some(dir) = data_path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.is_dir()
    {
        return Err(HamspamError::Data(format!(
            "data directory {} not found",
            dir.display()
        )));
    }
    if !data_path.is_file() {
        return Err(HamspamError::Data(format!(
            "{} not found",
            data_path.display()
        )));
    }
    Ok(())
}

/// Run a full training pass and write the artifact pair.
pub fn train(opts: &TrainOptions) -> Result<TrainSummary, HamspamError> {
    check_input(&opts.data_path)?;

    log::info!("loading data from {}...", opts.data_path.display());
    let (examples, dropped) = load_dataset(&opts.data_path)?;
    log::info!(
        "data loaded: {} records ({} missing a field, {} with unknown label dropped)",
        examples.len(),
        dropped.missing_field,
        dropped.unknown_label
    );

    let (pair, report) = fit_pair(&examples, &opts.training)?;

    log::info!("saving model and vectorizer to {}...", opts.model_dir.display());
    save_pair(&opts.model_dir, &pair)?;
    log::info!("model and vectorizer saved");

    let summary = TrainSummary {
        records: examples.len(),
        dropped,
        train_size: pair.meta.train_size,
        test_size: pair.meta.test_size,
        n_features: pair.n_features(),
        train_accuracy: pair.meta.train_accuracy,
        test_accuracy: pair.meta.test_accuracy,
        report,
    };

    let predictor = Predictor::from_pair(pair);
    for probe in &opts.training.probes {
        let (label, confidence) = predictor.predict_with_confidence(probe);
        log::info!("probe {probe:?}: {label} (confidence: {confidence:.2})");
    }

    Ok(summary)
}

/// CLI entry: merge config with flag overrides, then train.
pub fn handle_train(
    model_dir: &Path,
    args: &TrainArgs,
    config: &HamspamConfig,
) -> Result<(), HamspamError> {
    let mut training = config.training.clone();
    args.apply(&mut training);
    validate_training(&training)?;

    let opts = TrainOptions {
        data_path: args.data.clone().unwrap_or_else(|| config.paths.data.clone()),
        model_dir: model_dir.to_path_buf(),
        training,
    };
    let summary = train(&opts)?;

    println!(
        "Trained on {} records ({} train / {} test, {} dropped): {} features, train accuracy {:.4}{}",
        summary.records,
        summary.train_size,
        summary.test_size,
        summary.dropped.total(),
        summary.n_features,
        summary.train_accuracy,
        summary
            .test_accuracy
            .map(|a| format!(", test accuracy {a:.4}"))
            .unwrap_or_default()
    );
    Ok(())
}
