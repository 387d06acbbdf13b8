use crate::HamspamError;
use crate::cli::EvaluateArgs;
use crate::dataset::{Example, Label, load_dataset};
use crate::predict::Predictor;
use crate::report::ClassificationReport;
use std::path::Path;

/// Score a loaded predictor against labeled examples.
pub fn evaluate(predictor: &Predictor, examples: &[Example]) -> ClassificationReport {
    let truth: Vec<Label> = examples.iter().map(|e| e.label).collect();
    let predicted: Vec<Label> = examples.iter().map(|e| predictor.predict(&e.text)).collect();
    ClassificationReport::new(&truth, &predicted)
}

pub fn handle_evaluate(model_dir: &Path, args: &EvaluateArgs) -> Result<(), HamspamError> {
    let predictor = Predictor::load(model_dir)?;
    let (examples, dropped) = load_dataset(&args.data)?;
    if dropped.total() > 0 {
        log::info!("{} malformed records skipped", dropped.total());
    }

    let report = evaluate(&predictor, &examples);
    println!("Evaluated {} records: accuracy {:.4}", examples.len(), report.accuracy);
    println!();
    print!("{report}");
    Ok(())
}
