use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Split;

/// Sequence reader error types
#[derive(Error, Debug)]
pub enum SequenceError {
    #[error("No sequence data at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed data in {}: {reason}", .file.display())]
    MalformedData { file: PathBuf, reason: String },

    #[error("Init table {} has no rows", .file.display())]
    MissingInitRow { file: PathBuf },

    #[error("Failed to load image {}: {source}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Row {index} out of range for {table} table ({len} rows)")]
    IndexOutOfRange {
        table: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Ground truth is not recorded for the {split} split")]
    GroundTruthUnavailable { split: Split },

    #[error("Coordinate ({latitude}, {longitude}) is outside the UTM domain")]
    ProjectionOutOfRange { latitude: f64, longitude: f64 },

    #[error("CSV error in {}: {source}", .file.display())]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure classes callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MalformedData,
    ImageLoad,
    Index,
    Unavailable,
    Projection,
    Io,
}

impl SequenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SequenceError::NotFound { .. } => ErrorKind::NotFound,
            SequenceError::MalformedData { .. }
            | SequenceError::MissingInitRow { .. }
            | SequenceError::Csv { .. } => ErrorKind::MalformedData,
            SequenceError::ImageLoad { .. } => ErrorKind::ImageLoad,
            SequenceError::IndexOutOfRange { .. } => ErrorKind::Index,
            SequenceError::GroundTruthUnavailable { .. } => ErrorKind::Unavailable,
            SequenceError::ProjectionOutOfRange { .. } => ErrorKind::Projection,
            SequenceError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn malformed(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SequenceError::MalformedData {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Resolve bare table file names against the sequence directory
    pub(crate) fn rooted(self, dir: &Path) -> Self {
        match self {
            SequenceError::MalformedData { file, reason } if file.is_relative() => {
                SequenceError::MalformedData {
                    file: dir.join(file),
                    reason,
                }
            }
            SequenceError::MissingInitRow { file } if file.is_relative() => {
                SequenceError::MissingInitRow {
                    file: dir.join(file),
                }
            }
            other => other,
        }
    }
}

/// Result type for sequence operations
pub type Result<T> = std::result::Result<T, SequenceError>;
