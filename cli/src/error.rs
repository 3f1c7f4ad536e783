//! Failure classification for the command pipelines.

use std::path::Path;

use cutline_engine::EngineError;
use paper_palette::PaletteError;

/// A pipeline failure, classified by how the run should react to it.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Bad palette or settings; nothing can be produced with them.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An input image that cannot be used; other inputs may still succeed.
    #[error("Input error in {path}: {reason}")]
    Input { path: String, reason: String },

    /// A logic defect. Aborts the whole run.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Output could not be written.
    #[error("Output error at {path}: {reason}")]
    Io { path: String, reason: String },
}

impl PipelineError {
    /// Whether the run must stop instead of moving on to the next input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::Invariant(_))
    }

    /// Classify an engine error raised while processing `input`.
    pub fn from_engine(err: EngineError, input: &Path) -> Self {
        if err.is_invariant_violation() {
            return PipelineError::Invariant(err.to_string());
        }
        match err {
            EngineError::InvalidOption { .. } | EngineError::Palette(_) => {
                PipelineError::Configuration(err.to_string())
            }
            EngineError::UnsupportedInput(reason) => PipelineError::Input {
                path: input.display().to_string(),
                reason,
            },
            EngineError::Decode { path, source } => PipelineError::Input {
                path,
                reason: source.to_string(),
            },
            EngineError::Io { path, source } => PipelineError::Io {
                path,
                reason: source.to_string(),
            },
            EngineError::Save { path, source } => PipelineError::Io {
                path,
                reason: source.to_string(),
            },
            EngineError::PngEncode { path, source } => PipelineError::Io {
                path,
                reason: source.to_string(),
            },
            EngineError::Invariant(msg) => PipelineError::Invariant(msg),
        }
    }
}

impl From<PaletteError> for PipelineError {
    fn from(err: PaletteError) -> Self {
        if err.is_invariant_violation() {
            PipelineError::Invariant(err.to_string())
        } else {
            PipelineError::Configuration(err.to_string())
        }
    }
}
