/// Domain-specific error types for the spread analysis.
/// Recoverable conditions (inverted pairs, missing quotes) are filtered during
/// enumeration and never reach the caller as errors. What remains here:
/// - bad configuration or input files (fail fast before evaluation)
/// - direct misuse of the evaluator with an invalid candidate
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("no quote for strike {strike}")]
    MissingQuote { strike: f64 },

    #[error("invalid candidate: upper strike {upper} must exceed lower strike {lower}")]
    InvalidCandidate { lower: f64, upper: f64 },
}

impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        AnalysisError::Parse(e.to_string())
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
