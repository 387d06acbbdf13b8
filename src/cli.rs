use crate::config::TrainingConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hamspam", version, about = "Classify text as spam or ham")]
pub struct Cli {
    /// Model artifact directory
    #[arg(long, env = "HAMSPAM_MODEL_DIR", global = true)]
    pub model_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fit vectorizer + classifier on a labeled file and save the artifacts
    Train(TrainArgs),
    /// Classify text from arguments or stdin
    Predict(PredictArgs),
    /// Score the saved model against a labeled file
    Evaluate(EvaluateArgs),
    /// Show what the saved artifacts contain
    Status,
}

#[derive(Parser)]
pub struct TrainArgs {
    /// Tab-separated `label<TAB>message` file (default: data/spam.csv)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Random seed for the train/test split (default 42)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of records held out for evaluation (default 0.2)
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Additive smoothing for Naive Bayes (default 0.1)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Minimum document frequency for a vocabulary term (default 1)
    #[arg(long)]
    pub min_df: Option<usize>,

    /// Longest word n-gram (default 3)
    #[arg(long)]
    pub ngram_max: Option<usize>,
}

impl TrainArgs {
    /// Overlay flags that were given onto the configured values.
    pub fn apply(&self, training: &mut TrainingConfig) {
        if let Some(seed) = self.seed {
            training.seed = seed;
        }
        if let Some(f) = self.test_fraction {
            training.test_fraction = f;
        }
        if let Some(alpha) = self.alpha {
            training.alpha = alpha;
        }
        if let Some(min_df) = self.min_df {
            training.min_df = min_df;
        }
        if let Some(n) = self.ngram_max {
            training.ngram_max = n;
        }
    }
}

#[derive(Parser)]
pub struct PredictArgs {
    /// Text to classify (reads stdin when omitted)
    pub text: Vec<String>,

    /// Also print the posterior probability of the predicted label
    #[arg(long)]
    pub confidence: bool,
}

#[derive(Parser)]
pub struct EvaluateArgs {
    /// Tab-separated `label<TAB>message` file to score against
    #[arg(long)]
    pub data: PathBuf,
}
