use thiserror::Error;

/// Errors raised by the analysis pipeline. All of them are properties of
/// the input, never transient conditions, so callers should fix the input
/// instead of retrying.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Malformed geometry or Hessian (shape, symmetry, masses).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The projection produced an unexpected number of near-zero modes.
    #[error("projection removed an unexpected number of modes: expected {expected}, found {found}")]
    DataInconsistency { expected: usize, found: usize },
    /// Imaginary frequencies outside a transition-state context.
    #[error("{count} imaginary mode(s) outside a transition-state context")]
    NegativeFrequency { count: usize },
    /// The transition state carries no imaginary frequency.
    #[error("no imaginary frequency found, cannot identify the reaction coordinate")]
    MissingMode,
    /// Non-physical parameter, e.g. a temperature <= 0.
    #[error("non-physical parameter: {0}")]
    Domain(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
