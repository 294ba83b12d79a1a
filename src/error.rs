use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum GrooveError {
    #[error("unknown drum pattern: {0}")]
    PatternNotFound(String),

    #[error("unknown scale: {0}")]
    ScaleNotFound(String),

    #[error("unknown note: {0}")]
    NoteNotFound(String),

    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    #[error("no audio session is open")]
    SessionUnavailable,
}
