use codecity_analyzer::FileMetric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about one city build
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunStats {
    /// Files returned by the scanner
    pub files_found: usize,

    /// Files that produced a metric
    pub files_analyzed: usize,

    /// Files dropped during analysis
    pub files_dropped: usize,

    /// Scanner hit the file cap
    pub truncated: bool,

    /// Side of the square canvas
    pub canvas_side: f64,

    /// Total lines across analyzed files
    pub total_lines: usize,

    /// Analyzed files per language
    pub languages: BTreeMap<String, usize>,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl RunStats {
    pub fn add_file(&mut self, metric: &FileMetric) {
        self.files_analyzed += 1;
        self.total_lines += metric.line_count;
        *self
            .languages
            .entry(metric.language.as_str().to_string())
            .or_insert(0) += 1;
    }
}
