use clap::Parser;
use std::process::ExitCode;

use hamspam::HamspamError;
use hamspam::cli::{Cli, Command};
use hamspam::config::load_config;
use hamspam::{evaluate, predict, status, train};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();
}

fn run() -> Result<(), HamspamError> {
    let cli = Cli::parse();
    let config = load_config()?;
    let model_dir = cli
        .model_dir
        .unwrap_or_else(|| config.paths.model_dir.clone());

    match cli.command {
        Command::Train(args) => train::handle_train(&model_dir, &args, &config),
        Command::Predict(args) => predict::handle_predict(&model_dir, &args),
        Command::Evaluate(args) => evaluate::handle_evaluate(&model_dir, &args),
        Command::Status => status::handle_status(&model_dir),
    }
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hamspam: {e}");
            ExitCode::from(1)
        }
    }
}
