use collections::DictError;
use thiserror::Error;

pub mod args;
pub mod hashing;
pub mod words;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Derived IO error
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    /// The dictionary refused an operation
    #[error("Dictionary error: {0}")]
    Dict(#[from] DictError),

    /// Bad command line; the binary prints its usage after this
    #[error("{0}")]
    Usage(String),

    /// A value read back right after `put` was not the one just stored
    #[error("Found value '{found}', was expecting '{expected}' for key '{key}'")]
    Mismatch {
        key: String,
        expected: String,
        found: String,
    },
}
