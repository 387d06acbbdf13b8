//! TF-IDF vectorizer over word n-grams.
//!
//! Tokens are runs of two or more word characters after lowercasing;
//! n-grams are built over that token stream. IDF is smoothed
//! (`ln((1 + n) / (1 + df)) + 1`) and every output row is L2-normalized.

use crate::HamspamError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Fit-time settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorizerParams {
    pub ngram_range: [usize; 2],
    pub min_df: usize,
}

impl Default for VectorizerParams {
    fn default() -> Self {
        Self {
            ngram_range: [1, 3],
            min_df: 1,
        }
    }
}

impl VectorizerParams {
    pub fn validate(&self) -> Result<(), HamspamError> {
        let [lo, hi] = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(HamspamError::Config(format!(
                "invalid ngram range {lo}..={hi}"
            )));
        }
        if self.min_df == 0 {
            return Err(HamspamError::Config("min_df must be at least 1".into()));
        }
        Ok(())
    }
}

/// Sparse feature row: index-sorted `(feature, weight)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn new(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(idx, _)| *idx);
        Self { dim, entries }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: [usize; 2],
    min_df: usize,
}

/// Lowercase and split into tokens of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Generate word n-grams and count occurrences.
fn word_ngrams(tokens: &[String], lo: usize, hi: usize) -> HashMap<String, u32> {
    let mut ngrams = HashMap::new();

    for n in lo..=hi {
        if n > tokens.len() {
            continue;
        }
        for window in tokens.windows(n) {
            let gram = window.join(" ");
            *ngrams.entry(gram).or_insert(0) += 1;
        }
    }

    ngrams
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from a corpus.
    pub fn fit<S: AsRef<str>>(
        documents: &[S],
        params: &VectorizerParams,
    ) -> Result<Self, HamspamError> {
        params.validate()?;
        if documents.is_empty() {
            return Err(HamspamError::Data("cannot fit vectorizer on an empty corpus".into()));
        }

        let [lo, hi] = params.ngram_range;
        let mut df: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let grams = word_ngrams(&tokenize(doc.as_ref()), lo, hi);
            for gram in grams.into_keys() {
                *df.entry(gram).or_insert(0) += 1;
            }
        }

        // BTreeMap iteration gives lexicographic feature order
        let kept: BTreeMap<String, usize> = df
            .into_iter()
            .filter(|(_, count)| *count >= params.min_df)
            .collect();
        if kept.is_empty() {
            return Err(HamspamError::Data(format!(
                "empty vocabulary after fitting {} documents (min_df = {})",
                documents.len(),
                params.min_df
            )));
        }

        let n_docs = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, (gram, count)) in kept.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + count as f64)).ln() + 1.0);
            vocabulary.insert(gram, idx);
        }

        Ok(Self {
            vocabulary,
            idf,
            ngram_range: params.ngram_range,
            min_df: params.min_df,
        })
    }

    /// Map text into the fitted feature space. Unknown n-grams are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let [lo, hi] = self.ngram_range;
        let grams = word_ngrams(&tokenize(text), lo, hi);

        let mut entries: Vec<(usize, f64)> = grams
            .iter()
            .filter_map(|(gram, &count)| {
                self.vocabulary
                    .get(gram)
                    .map(|&idx| (idx, count as f64 * self.idf[idx]))
            })
            .collect();
        // sum in index order so the norm is identical run to run
        entries.sort_by_key(|(idx, _)| *idx);

        // L2 normalize
        let norm_sq: f64 = entries.iter().map(|(_, v)| v * v).sum();
        if norm_sq > 0.0 {
            let norm = norm_sq.sqrt();
            for (_, v) in &mut entries {
                *v /= norm;
            }
        }

        SparseVector::new(self.n_features(), entries)
    }

    pub fn fit_transform<S: AsRef<str>>(
        documents: &[S],
        params: &VectorizerParams,
    ) -> Result<(Self, Vec<SparseVector>), HamspamError> {
        let vectorizer = Self::fit(documents, params)?;
        let rows = documents
            .iter()
            .map(|d| vectorizer.transform(d.as_ref()))
            .collect();
        Ok((vectorizer, rows))
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn ngram_range(&self) -> [usize; 2] {
        self.ngram_range
    }

    pub fn min_df(&self) -> usize {
        self.min_df
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Check a deserialized vectorizer for internal consistency.
    pub(crate) fn validate(&self) -> Result<(), HamspamError> {
        VectorizerParams {
            ngram_range: self.ngram_range,
            min_df: self.min_df,
        }
        .validate()
        .map_err(|e| HamspamError::Model(format!("vectorizer: {e}")))?;

        if self.vocabulary.len() != self.idf.len() {
            return Err(HamspamError::Model(format!(
                "vectorizer: {} vocabulary entries but {} idf weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        let mut seen = vec![false; self.idf.len()];
        for (gram, &idx) in &self.vocabulary {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(HamspamError::Model(format!(
                        "vectorizer: bad feature index {idx} for {gram:?}"
                    )));
                }
            }
        }
        if let Some(w) = self.idf.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(HamspamError::Model(format!("vectorizer: invalid idf weight {w}")));
        }
        Ok(())
    }
}
