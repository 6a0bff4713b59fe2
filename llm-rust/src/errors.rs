use thiserror::Error;

#[derive(Error, Debug)]
pub enum LanguageModelError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the provider failed, timed out, or its body could not be
    /// decoded. The request URL is stripped from the inner error.
    #[error("Transport error: {0}")]
    Transport(reqwest::Error),
    /// The request returns a non-OK status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The response from the provider was unexpected. (e.g. no candidate
    /// returned by Gemini)
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

impl From<reqwest::Error> for LanguageModelError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.without_url())
    }
}

pub type LanguageModelResult<T> = Result<T, LanguageModelError>;
