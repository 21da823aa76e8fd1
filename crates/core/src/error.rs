//! Error types for slide text extraction and quiz generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a deck or generating a quiz.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The upload is not a slide deck we can read.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// A part the deck refers to is missing from the archive.
    #[error("Missing part in deck: {0}")]
    MissingPart(String),

    /// The chat-completion request failed or returned something unusable.
    #[error("{0}")]
    Generation(String),
}
