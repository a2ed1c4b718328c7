use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CityError>;

#[derive(Error, Debug)]
pub enum CityError {
    #[error("Invalid source root: {0}")]
    InvalidSourceRoot(String),

    #[error("No source files found under {0}")]
    NoSourceFiles(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid snapshot id: {0}")]
    InvalidSnapshotId(String),

    #[error("No analyzable files could be processed ({attempted} attempted)")]
    NoAnalyzableFiles { attempted: usize },

    #[error("Layout produced {rectangles} rectangles for {metrics} metrics")]
    LayoutMismatch { metrics: usize, rectangles: usize },

    #[error("Layout error: {0}")]
    Layout(#[from] codecity_layout::LayoutError),

    #[error("Analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Coarse error category reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad source root, empty file set, bad configuration
    Input,
    /// Every enumerated file was dropped during analysis
    Aggregate,
    /// Broken internal contract; indicates a bug
    Internal,
    Timeout,
    Io,
}

/// Serializable `{kind, message}` form of a [`CityError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl CityError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CityError::InvalidSourceRoot(_)
            | CityError::NoSourceFiles(_)
            | CityError::InvalidConfig(_)
            | CityError::InvalidSnapshotId(_) => ErrorKind::Input,
            CityError::NoAnalyzableFiles { .. } => ErrorKind::Aggregate,
            CityError::LayoutMismatch { .. } | CityError::Layout(_) => ErrorKind::Internal,
            CityError::Timeout(_) => ErrorKind::Timeout,
            CityError::IoError(_) | CityError::JsonError(_) => ErrorKind::Io,
        }
    }

    #[must_use]
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            CityError::NoSourceFiles("/x".into()).kind(),
            ErrorKind::Input
        );
        assert_eq!(
            CityError::NoAnalyzableFiles { attempted: 3 }.kind(),
            ErrorKind::Aggregate
        );
        assert_eq!(
            CityError::LayoutMismatch {
                metrics: 2,
                rectangles: 1
            }
            .kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            CityError::Timeout(Duration::from_secs(1)).kind(),
            ErrorKind::Timeout
        );
    }

    #[test]
    fn report_serializes_kind_and_message() {
        let report = CityError::NoAnalyzableFiles { attempted: 2 }.report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "aggregate");
        assert_eq!(
            json["message"],
            "No analyzable files could be processed (2 attempted)"
        );
    }
}
