use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complexity score of a single detected function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionComplexity {
    /// Function name, when the backend can resolve one
    pub name: Option<String>,

    /// Line where the function starts (1-indexed)
    pub line: usize,

    /// Cyclomatic-style score (1 + decision points)
    pub complexity: u32,
}

/// Size and complexity of one analyzed source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetric {
    /// Base file name
    pub name: String,

    /// Path relative to the analyzed root, `/`-separated
    pub path: String,

    /// Detected language
    pub language: Language,

    /// Number of lines, never below 1
    pub line_count: usize,

    /// Sum of function scores, never below 1
    pub complexity: u32,

    /// Number of functions the backend detected
    pub functions: usize,
}

/// Outcome of analyzing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Measured(FileMetric),
    Absent(AbsentReason),
}

/// Why a file could not be measured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsentReason {
    Empty,
    Binary,
    TooLarge { bytes: u64, limit: u64 },
    Unreadable(String),
    Backend(String),
}

impl fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbsentReason::Empty => write!(f, "empty file"),
            AbsentReason::Binary => write!(f, "binary content"),
            AbsentReason::TooLarge { bytes, limit } => {
                write!(f, "file too large ({bytes} bytes > {limit})")
            }
            AbsentReason::Unreadable(msg) => write!(f, "unreadable: {msg}"),
            AbsentReason::Backend(msg) => write!(f, "backend failure: {msg}"),
        }
    }
}
