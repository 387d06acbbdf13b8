pub mod artifact;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod evaluate;
pub mod naive_bayes;
pub mod predict;
pub mod report;
pub mod status;
pub mod train;
pub mod vectorizer;

pub use dataset::Label;
pub use predict::Predictor;

#[derive(Debug)]
pub enum HamspamError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Config(String),
    Data(String),
    Model(String),
}

impl std::fmt::Display for HamspamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HamspamError::Io(e) => write!(f, "io: {e}"),
            HamspamError::Json(e) => write!(f, "json: {e}"),
            HamspamError::Config(msg) => write!(f, "config: {msg}"),
            HamspamError::Data(msg) => write!(f, "data: {msg}"),
            HamspamError::Model(msg) => write!(f, "model: {msg}"),
        }
    }
}

impl std::error::Error for HamspamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HamspamError::Io(e) => Some(e),
            HamspamError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HamspamError {
    fn from(e: std::io::Error) -> Self {
        HamspamError::Io(e)
    }
}

impl From<serde_json::Error> for HamspamError {
    fn from(e: serde_json::Error) -> Self {
        HamspamError::Json(e)
    }
}
