use crate::backend::{ComplexityBackend, TreeSitterBackend};
use crate::keyword::KeywordBackend;
use crate::language::Language;
use crate::types::{AbsentReason, Analysis, FileMetric};
use std::borrow::Cow;
use std::sync::Arc;

/// Bytes inspected when sniffing for binary content
const BINARY_SNIFF_BYTES: usize = 8192;

/// Turns raw file content into a [`FileMetric`].
///
/// Backend failures never escape: every problem with a single file is
/// reported as [`Analysis::Absent`].
#[derive(Clone)]
pub struct Analyzer {
    ast: Arc<dyn ComplexityBackend>,
    fallback: Arc<dyn ComplexityBackend>,
    max_bytes: Option<u64>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Tree-sitter for grammar-backed languages, keyword scan for the rest
    pub fn new() -> Self {
        Self {
            ast: Arc::new(TreeSitterBackend::new()),
            fallback: Arc::new(KeywordBackend::new()),
            max_bytes: None,
        }
    }

    /// Use one backend for every language
    pub fn with_backend(backend: Arc<dyn ComplexityBackend>) -> Self {
        Self {
            ast: Arc::clone(&backend),
            fallback: backend,
            max_bytes: None,
        }
    }

    /// Files above `limit` bytes are reported as absent
    #[must_use]
    pub fn with_max_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_bytes = limit;
        self
    }

    fn backend_for(&self, language: Language) -> &dyn ComplexityBackend {
        if self.ast.supports(language) {
            self.ast.as_ref()
        } else {
            self.fallback.as_ref()
        }
    }

    /// Measure one file; `path` is relative to the analyzed root
    pub fn analyze(&self, name: &str, path: &str, bytes: &[u8]) -> Analysis {
        if let Some(limit) = self.max_bytes {
            let len = bytes.len() as u64;
            if len > limit {
                return Analysis::Absent(AbsentReason::TooLarge { bytes: len, limit });
            }
        }
        if bytes.is_empty() {
            return Analysis::Absent(AbsentReason::Empty);
        }
        if looks_binary(bytes) {
            return Analysis::Absent(AbsentReason::Binary);
        }

        let content = decode_lossy(bytes);
        let line_count = content.lines().count();
        if line_count == 0 {
            return Analysis::Absent(AbsentReason::Empty);
        }

        let language = Language::from_path(path);
        let backend = self.backend_for(language);
        let functions = match backend.functions(&content, language) {
            Ok(functions) => functions,
            Err(e) => {
                return Analysis::Absent(AbsentReason::Backend(format!("{}: {e}", backend.name())))
            }
        };

        let total: u32 = functions
            .iter()
            .fold(0u32, |acc, f| acc.saturating_add(f.complexity));

        Analysis::Measured(FileMetric {
            name: name.to_string(),
            path: path.to_string(),
            language,
            line_count: line_count.max(1),
            complexity: total.max(1),
            functions: functions.len(),
        })
    }
}

/// Decode as UTF-8, replacing invalid sequences
pub fn decode_lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn looks_binary(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
    window.contains(&0)
}
