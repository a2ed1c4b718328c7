use crate::error::{AnalyzerError, Result};
use crate::language::Language;
use crate::types::FunctionComplexity;
use tree_sitter::{Node, Parser};

/// Source of per-function complexity scores.
///
/// Implementations must be cheap to share across worker threads; any
/// per-call state (parsers, scratch buffers) is created inside `functions`.
pub trait ComplexityBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Whether this backend can score the given language
    fn supports(&self, language: Language) -> bool;

    /// Score every function detected in `content`
    fn functions(&self, content: &str, language: Language) -> Result<Vec<FunctionComplexity>>;
}

/// AST-based scoring for languages with a bundled tree-sitter grammar
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterBackend;

impl TreeSitterBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ComplexityBackend for TreeSitterBackend {
    fn name(&self) -> &'static str {
        "tree-sitter"
    }

    fn supports(&self, language: Language) -> bool {
        language.supports_ast()
    }

    fn functions(&self, content: &str, language: Language) -> Result<Vec<FunctionComplexity>> {
        let rules = NodeRules::for_language(language)
            .ok_or_else(|| AnalyzerError::unsupported_language(language.as_str()))?;

        let ts_language = language.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| AnalyzerError::tree_sitter(format!("Failed to set language: {e}")))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| AnalyzerError::parse("Failed to parse source code"))?;
        let root = tree.root_node();
        if root.has_error() {
            log::debug!("{} source contains syntax errors", language.as_str());
        }

        Ok(score_functions(root, content, &rules))
    }
}

/// Node kinds that open a function scope or add a decision point
struct NodeRules {
    functions: &'static [&'static str],
    decisions: &'static [&'static str],
    /// Node kind whose `operator` field marks a short-circuit branch
    boolean_node: &'static str,
    boolean_operators: &'static [&'static str],
}

const RUST_RULES: NodeRules = NodeRules {
    functions: &["function_item"],
    decisions: &[
        "if_expression",
        "while_expression",
        "for_expression",
        "match_arm",
    ],
    boolean_node: "binary_expression",
    boolean_operators: &["&&", "||"],
};

const PYTHON_RULES: NodeRules = NodeRules {
    functions: &["function_definition"],
    decisions: &[
        "if_statement",
        "elif_clause",
        "for_statement",
        "while_statement",
        "except_clause",
        "conditional_expression",
        "for_in_clause",
        "if_clause",
        "case_clause",
    ],
    boolean_node: "boolean_operator",
    boolean_operators: &["and", "or"],
};

const JS_RULES: NodeRules = NodeRules {
    functions: &[
        "function_declaration",
        "function_expression",
        "function",
        "generator_function_declaration",
        "arrow_function",
        "method_definition",
    ],
    decisions: &[
        "if_statement",
        "for_statement",
        "for_in_statement",
        "while_statement",
        "do_statement",
        "switch_case",
        "catch_clause",
        "ternary_expression",
    ],
    boolean_node: "binary_expression",
    boolean_operators: &["&&", "||", "??"],
};

impl NodeRules {
    fn for_language(language: Language) -> Option<&'static NodeRules> {
        match language {
            Language::Rust => Some(&RUST_RULES),
            Language::Python => Some(&PYTHON_RULES),
            Language::JavaScript | Language::TypeScript | Language::Tsx => Some(&JS_RULES),
            _ => None,
        }
    }

    /// `function` is also an anonymous keyword token in the JS grammars
    fn is_function(&self, node: Node) -> bool {
        node.is_named() && self.functions.contains(&node.kind())
    }

    fn is_decision(&self, node: Node) -> bool {
        let kind = node.kind();
        if self.decisions.contains(&kind) {
            return true;
        }
        if kind != self.boolean_node {
            return false;
        }
        node.child_by_field_name("operator")
            .is_some_and(|op| self.boolean_operators.contains(&op.kind()))
    }
}

/// Pre-order walk; decisions are credited to the innermost enclosing function.
fn score_functions(root: Node, content: &str, rules: &NodeRules) -> Vec<FunctionComplexity> {
    let mut functions: Vec<FunctionComplexity> = Vec::new();
    let mut stack: Vec<(Node, Option<usize>)> = vec![(root, None)];

    while let Some((node, owner)) = stack.pop() {
        let mut owner = owner;
        if rules.is_function(node) {
            functions.push(FunctionComplexity {
                name: function_name(node, content),
                line: node.start_position().row + 1,
                complexity: 1,
            });
            owner = Some(functions.len() - 1);
        } else if let Some(idx) = owner {
            if rules.is_decision(node) {
                functions[idx].complexity += 1;
            }
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push((child, owner));
        }
    }

    functions
}

fn function_name(node: Node, content: &str) -> Option<String> {
    let source = content.as_bytes();
    let text = |n: Node| n.utf8_text(source).ok().map(str::to_string);

    if let Some(name) = node.child_by_field_name("name").and_then(text) {
        return Some(name);
    }

    // Anonymous functions bound to a variable or object key
    let parent = node.parent()?;
    match parent.kind() {
        "variable_declarator" => parent.child_by_field_name("name").and_then(text),
        "pair" => parent.child_by_field_name("key").and_then(text),
        "assignment_expression" => parent.child_by_field_name("left").and_then(text),
        _ => None,
    }
}
