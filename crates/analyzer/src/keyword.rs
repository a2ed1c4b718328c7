use crate::backend::ComplexityBackend;
use crate::error::{AnalyzerError, Result};
use crate::language::Language;
use crate::types::FunctionComplexity;
use regex::Regex;
use std::sync::OnceLock;

/// Line-oriented fallback for languages without a bundled grammar.
///
/// Function headers are recognised per language family; decision keywords
/// and short-circuit operators are credited to the closest header above
/// them. Strings are not stripped, so keywords inside literals count.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordBackend;

impl KeywordBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ComplexityBackend for KeywordBackend {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn supports(&self, _language: Language) -> bool {
        true
    }

    fn functions(&self, content: &str, language: Language) -> Result<Vec<FunctionComplexity>> {
        let header = header_pattern(language)?;
        let decisions = decision_pattern()?;

        let mut functions: Vec<FunctionComplexity> = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim_start();
            if is_comment(trimmed) {
                continue;
            }

            if let Some(caps) = header.captures(line) {
                let name = ["name", "bare", "cname"]
                    .iter()
                    .find_map(|group| caps.name(group))
                    .map(|m| m.as_str().to_string());
                let rejected = starts_with_control(trimmed)
                    || name.as_deref().is_some_and(|n| CONTROL_KEYWORDS.contains(&n));
                if !rejected {
                    functions.push(FunctionComplexity {
                        name,
                        line: idx + 1,
                        complexity: 1,
                    });
                }
            }

            if let Some(current) = functions.last_mut() {
                let hits = decisions.find_iter(line).count();
                current.complexity += u32::try_from(hits).unwrap_or(u32::MAX);
            }
        }

        Ok(functions)
    }
}

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "else", "for", "foreach", "while", "switch", "catch", "return", "do", "new", "throw",
    "case", "sizeof", "elif", "until", "unless",
];

fn starts_with_control(trimmed: &str) -> bool {
    if trimmed.starts_with('}') {
        return true;
    }
    let first = trimmed
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default();
    CONTROL_KEYWORDS.contains(&first)
}

fn is_comment(trimmed: &str) -> bool {
    ["//", "/*", "*", "#", "--", ";"]
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
        && !trimmed.starts_with("#!")
        && !trimmed.starts_with("#include")
}

#[derive(Clone, Copy)]
enum Family {
    Go,
    Ruby,
    Python,
    Rust,
    Function,
    Kotlin,
    Scala,
    Swift,
    Perl,
    Shell,
    CLike,
    ObjectiveC,
}

impl Family {
    fn of(language: Language) -> Self {
        match language {
            Language::Go => Family::Go,
            Language::Ruby => Family::Ruby,
            Language::Python => Family::Python,
            Language::Rust => Family::Rust,
            Language::JavaScript | Language::Php | Language::Lua => Family::Function,
            Language::Kotlin => Family::Kotlin,
            Language::Scala => Family::Scala,
            Language::Swift => Family::Swift,
            Language::Perl => Family::Perl,
            Language::Shell => Family::Shell,
            Language::ObjectiveC => Family::ObjectiveC,
            Language::TypeScript
            | Language::Tsx
            | Language::Java
            | Language::C
            | Language::Cpp
            | Language::CSharp
            | Language::Other => Family::CLike,
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Family::Go => r"^\s*func\b\s*(?:\([^)]*\)\s*)?(?P<name>\w+)?",
            Family::Ruby => r"^\s*def\s+(?:self\.)?(?P<name>[\w?!]+)",
            Family::Python => r"^\s*(?:async\s+)?def\s+(?P<name>\w+)",
            Family::Rust => r"\bfn\s+(?P<name>\w+)",
            Family::Function => r"\bfunction\b\s*&?\s*(?P<name>[\w.:]+)?\s*\(",
            Family::Kotlin => r"\bfun\s+(?:<[^>]*>\s*)?(?:[\w.]+\.)?(?P<name>\w+)\s*\(",
            Family::Scala => r"\bdef\s+(?P<name>\w+)",
            Family::Swift => r"\bfunc\s+(?P<name>\w+)",
            Family::Perl => r"^\s*sub\s+(?P<name>\w+)",
            Family::Shell => r"^\s*(?:function\s+(?P<name>[\w-]+)|(?P<bare>[\w-]+)\s*\(\s*\))",
            Family::CLike => {
                r"^\s*(?:[\w*&<>\[\],:~]+\s+)+\**(?P<name>[A-Za-z_~][\w:~]*)\s*\([^;]*\)\s*(?:const\b\s*)?(?:throws\s+[\w\s,.]+)?\{?\s*$"
            }
            Family::ObjectiveC => {
                r"^\s*(?:[-+]\s*\([^)]*\)\s*(?P<name>\w+)|(?:[\w*&<>\[\],:~]+\s+)+\**(?P<cname>[A-Za-z_]\w*)\s*\([^;]*\)\s*\{?\s*$)"
            }
        }
    }
}

const FAMILIES: [Family; 12] = [
    Family::Go,
    Family::Ruby,
    Family::Python,
    Family::Rust,
    Family::Function,
    Family::Kotlin,
    Family::Scala,
    Family::Swift,
    Family::Perl,
    Family::Shell,
    Family::CLike,
    Family::ObjectiveC,
];

fn header_pattern(language: Language) -> Result<&'static Regex> {
    static HEADERS: OnceLock<std::result::Result<Vec<Regex>, String>> = OnceLock::new();
    let compiled = HEADERS.get_or_init(|| {
        FAMILIES
            .iter()
            .map(|family| Regex::new(family.pattern()).map_err(|e| e.to_string()))
            .collect()
    });
    let family = Family::of(language);
    match compiled {
        Ok(patterns) => Ok(&patterns[family as usize]),
        Err(e) => Err(AnalyzerError::Other(format!("invalid header pattern: {e}"))),
    }
}

fn decision_pattern() -> Result<&'static Regex> {
    static DECISIONS: OnceLock<std::result::Result<Regex, String>> = OnceLock::new();
    DECISIONS
        .get_or_init(|| {
            Regex::new(
                r"\b(?:if|elif|elsif|for|foreach|while|until|unless|case|when|catch|except|rescue)\b|&&|\|\||\?\?",
            )
            .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| AnalyzerError::Other(format!("invalid decision pattern: {e}")))
}
