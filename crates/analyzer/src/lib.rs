//! # Code City Analyzer
//!
//! Per-file size and complexity measurement.
//!
//! ## Architecture
//!
//! ```text
//! Raw bytes
//!     │
//!     ├──> Guards (empty / binary / size limit) → Absent
//!     │
//!     ├──> Lenient UTF-8 decoding
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> ComplexityBackend
//!     │    ├─> TreeSitterBackend (Rust, Python, JS, TS)
//!     │    └─> KeywordBackend (everything else)
//!     │
//!     └──> FileMetric { line_count ≥ 1, complexity ≥ 1 }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use codecity_analyzer::{Analysis, Analyzer};
//!
//! let analyzer = Analyzer::new();
//! let code = b"fn check(x: i32) -> bool {\n    x > 0 && x < 10\n}\n";
//!
//! if let Analysis::Measured(metric) = analyzer.analyze("check.rs", "src/check.rs", code) {
//!     assert_eq!(metric.complexity, 2);
//!     assert_eq!(metric.line_count, 3);
//! }
//! ```

mod analyzer;
mod backend;
mod error;
mod keyword;
mod language;
mod types;

pub use analyzer::{decode_lossy, Analyzer};
pub use backend::{ComplexityBackend, TreeSitterBackend};
pub use error::{AnalyzerError, Result};
pub use keyword::KeywordBackend;
pub use language::Language;
pub use types::{AbsentReason, Analysis, FileMetric, FunctionComplexity};
