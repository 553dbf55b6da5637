//! Error taxonomy for reading TSurf input and writing OBJ output
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TsurfError>;

#[derive(Error, Debug)]
pub enum TsurfError {
    /// The input path is missing or unreadable
    #[error("cannot read input {path}: {source}")]
    InputUnavailable { path: PathBuf, source: io::Error },

    /// A vertex, alias or face line carries a missing or non-numeric field
    #[error("malformed record on line {line}: {reason}: `{content}`")]
    MalformedRecord {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("no surfaces found (no 'GOCAD TSurf' blocks detected)")]
    NoSurfacesFound,

    #[error("failed to write {path}: {source}")]
    OutputWrite { path: PathBuf, source: io::Error },
}

impl TsurfError {
    pub(crate) fn malformed(line: usize, content: &str, reason: impl Into<String>) -> Self {
        TsurfError::MalformedRecord {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}
