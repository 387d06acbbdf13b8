use crate::HamspamError;
use crate::artifact::{classifier_path, load_pair, vectorizer_path};
use crate::dataset::Label;
use std::path::Path;

pub fn handle_status(model_dir: &Path) -> Result<(), HamspamError> {
    let v_path = vectorizer_path(model_dir);
    let c_path = classifier_path(model_dir);
    if !v_path.exists() && !c_path.exists() {
        eprintln!("hamspam: no model at {}", model_dir.display());
        return Ok(());
    }

    // File sizes
    let v_size = std::fs::metadata(&v_path).map(|m| m.len()).ok();
    let c_size = std::fs::metadata(&c_path).map(|m| m.len()).ok();
    eprintln!(
        "hamspam: artifacts — vectorizer {}, classifier {}",
        v_size.map(fmt_size).unwrap_or_else(|| "missing".into()),
        c_size.map(fmt_size).unwrap_or_else(|| "missing".into())
    );

    // Fails on a missing or mismatched half
    let pair = load_pair(model_dir)?;
    let [lo, hi] = pair.vectorizer.ngram_range();
    eprintln!(
        "hamspam: vectorizer — {} features ({lo}-{hi} grams, min_df {})",
        pair.n_features(),
        pair.vectorizer.min_df()
    );
    eprintln!(
        "hamspam: classifier — multinomial NB, alpha {} ({} ham / {} spam training docs)",
        pair.classifier.alpha(),
        pair.classifier.class_count(Label::Ham),
        pair.classifier.class_count(Label::Spam)
    );

    let meta = &pair.meta;
    match meta.test_accuracy {
        Some(test) => eprintln!(
            "hamspam: accuracy — train {:.4}, test {test:.4} ({} / {} split, seed {})",
            meta.train_accuracy, meta.train_size, meta.test_size, meta.seed
        ),
        None => eprintln!(
            "hamspam: accuracy — train {:.4} (no held-out records, seed {})",
            meta.train_accuracy, meta.seed
        ),
    }
    eprintln!(
        "hamspam: trained — {}",
        format_epoch_date(meta.created_at as i64)
    );
    if let Some(fp) = &pair.fingerprint {
        eprintln!("hamspam: fingerprint — {fp}");
    }

    Ok(())
}

fn format_epoch_date(epoch_secs: i64) -> String {
    // Convert epoch seconds to YYYY-MM-DD
    // Days from unix epoch, then civil date
    let days = epoch_secs / 86400;
    let (y, m, d) = civil_from_days(days);
    format!("{y:04}-{m:02}-{d:02}")
}

/// Convert days since 1970-01-01 to (year, month, day).
/// Algorithm from Howard Hinnant's chrono-compatible date library.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

fn fmt_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
