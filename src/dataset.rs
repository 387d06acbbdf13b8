//! Labeled message corpus: tab-separated `label<TAB>message` records.
//!
//! Input files come from older spam corpora and are frequently Latin-1
//! rather than UTF-8, so decoding falls back to Windows-1252 (a superset
//! of Latin-1) instead of rejecting the file.

use crate::HamspamError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::Path;

/// Binary class. The discriminant is the classifier's class index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Ham = 0,
    Spam = 1,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Label> {
        match idx {
            0 => Some(Label::Ham),
            1 => Some(Label::Spam),
            _ => None,
        }
    }

    /// Display form returned to callers of the predictor.
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Ham => "Ham",
            Label::Spam => "Spam",
        }
    }

    /// Lowercase form used in datasets and reports.
    pub fn name(self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }

    /// Strict parse of a dataset label column.
    fn from_column(raw: &str) -> Option<Label> {
        match raw.trim() {
            "ham" => Some(Label::Ham),
            "spam" => Some(Label::Spam),
            _ => None,
        }
    }

    /// Case-insensitive parse, for labels coming back from callers.
    pub fn normalize(raw: &str) -> Option<Label> {
        let lower = raw.trim().to_lowercase();
        Label::from_column(&lower)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub text: String,
    pub label: Label,
}

/// Counts of records discarded while cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropStats {
    pub missing_field: usize,
    pub unknown_label: usize,
}

impl DropStats {
    pub fn total(&self) -> usize {
        self.missing_field + self.unknown_label
    }
}

#[derive(Debug, Clone)]
pub struct Split {
    pub train: Vec<Example>,
    pub test: Vec<Example>,
}

/// Decode raw file bytes: UTF-8 when valid, Windows-1252 otherwise.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

/// Parse `label<TAB>message` lines, dropping malformed or unknown rows.
pub fn parse_dataset(text: &str) -> (Vec<Example>, DropStats) {
    let mut examples = Vec::new();
    let mut dropped = DropStats::default();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        let Some((label, message)) = line.split_once('\t') else {
            log::debug!("line {}: no message field, dropped", lineno + 1);
            dropped.missing_field += 1;
            continue;
        };
        if label.trim().is_empty() || message.trim().is_empty() {
            log::debug!("line {}: empty field, dropped", lineno + 1);
            dropped.missing_field += 1;
            continue;
        }

        match Label::from_column(label) {
            Some(label) => examples.push(Example {
                text: message.to_string(),
                label,
            }),
            None => {
                log::debug!("line {}: unknown label {label:?}, dropped", lineno + 1);
                dropped.unknown_label += 1;
            }
        }
    }

    (examples, dropped)
}

/// Read and clean a dataset file. Zero usable records is an error.
pub fn load_dataset(path: &Path) -> Result<(Vec<Example>, DropStats), HamspamError> {
    if !path.is_file() {
        return Err(HamspamError::Data(format!(
            "{} not found",
            path.display()
        )));
    }
    let raw = std::fs::read(path)?;
    let (examples, dropped) = parse_dataset(&decode_text(&raw));
    if examples.is_empty() {
        return Err(HamspamError::Data(format!(
            "{}: no usable records ({} dropped)",
            path.display(),
            dropped.total()
        )));
    }
    Ok((examples, dropped))
}

/// Seeded shuffle, then the first `floor(n * test_fraction)` records
/// become the evaluation subset.
pub fn train_test_split(
    examples: &[Example],
    test_fraction: f64,
    seed: u64,
) -> Result<Split, HamspamError> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(HamspamError::Config(format!(
            "test_fraction must be in [0, 1), got {test_fraction}"
        )));
    }

    let mut order: Vec<usize> = (0..examples.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let n_test = (examples.len() as f64 * test_fraction).floor() as usize;
    let test = order[..n_test].iter().map(|&i| examples[i].clone()).collect();
    let train = order[n_test..].iter().map(|&i| examples[i].clone()).collect();

    Ok(Split { train, test })
}
