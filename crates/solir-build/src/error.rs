use thiserror::Error;

/// Hard build failures. Everything recoverable (parse errors, unresolved
/// names, duplicate definitions) is recorded as a diagnostic on the root
/// instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no sources supplied")]
    InputMissing,

    #[error("build cancelled")]
    Cancelled,

    #[error("parser failure: {0}")]
    Parser(String),
}
