//! Parsing Sea source and collecting syntax diagnostics.

use crate::loader::load_language;
use crate::{Error, Result};
use serde::Serialize;
use tree_sitter::{Language, Node, Parser, Tree};

/// A parser bound to the verified Sea grammar.
pub struct SeaParser {
    parser: Parser,
    language: Language,
}

impl SeaParser {
    /// Create a parser for the built-in grammar
    pub fn new() -> Result<Self> {
        Self::with_language(load_language()?)
    }

    /// Create a parser for an already verified language handle
    pub fn with_language(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| Error::GrammarLoad(e.to_string()))?;
        Ok(Self { parser, language })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Parse a complete source file
    pub fn parse(&mut self, source: impl Into<String>) -> Result<ParsedSource> {
        let source = source.into();
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| Error::Parse("parser returned no tree".to_string()))?;
        tracing::debug!(bytes = source.len(), has_error = tree.root_node().has_error(), "Parsed Sea source");
        Ok(ParsedSource { tree, source })
    }
}

/// A syntax tree together with the text it was parsed from.
pub struct ParsedSource {
    tree: Tree,
    source: String,
}

impl ParsedSource {
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Text covered by a node of this tree
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    pub fn to_sexp(&self) -> String {
        self.root().to_sexp()
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// All ERROR and MISSING nodes, in document order.
    ///
    /// An ERROR node is reported once; nodes nested inside it are not.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if self.has_errors() {
            self.collect_diagnostics(self.root(), &mut diagnostics);
        }
        diagnostics
    }

    fn collect_diagnostics(&self, node: Node<'_>, out: &mut Vec<Diagnostic>) {
        if node.is_error() {
            out.push(Diagnostic::at(node, &self.source, DiagnosticKind::Error, self.text(node)));
            return;
        }
        if node.is_missing() {
            out.push(Diagnostic::at(node, &self.source, DiagnosticKind::Missing(node.kind().to_string()), ""));
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.has_error() || child.is_missing() {
                self.collect_diagnostics(child, out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Text the grammar could not fit anywhere
    Error,
    /// A token the parser inserted to recover
    Missing(String),
}

/// A syntax problem, positioned with 1-based line and column.
///
/// The column counts characters, not bytes, from the start of the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub column: usize,
    pub text: String,
}

impl Diagnostic {
    fn at(node: Node<'_>, source: &str, kind: DiagnosticKind, text: &str) -> Self {
        let start = node.start_position();
        let text = text.lines().next().unwrap_or("").trim();
        Self {
            kind,
            line: start.row + 1,
            column: char_column(source, node.start_byte(), start.column) + 1,
            text: text.chars().take(60).collect(),
        }
    }
}

/// Characters between the start of the line and `byte`, where tree-sitter
/// reports `byte_column` bytes.
fn char_column(source: &str, byte: usize, byte_column: usize) -> usize {
    source
        .get(byte.saturating_sub(byte_column)..byte)
        .map_or(byte_column, |prefix| prefix.chars().count())
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::Error => write!(f, "{}:{}: syntax error near `{}`", self.line, self.column, self.text),
            DiagnosticKind::Missing(kind) => write!(f, "{}:{}: missing `{}`", self.line, self.column, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
use std/io

rec Point(x: int, y: int)

tag Color(Red, Green, Blue)

def Name = ^char

// entry point
fun main(): int {
    let p: Point = new Point(1, 2)
    var total = 0
    for i in 0 to 10 {
        total = total + i
    }
    if total > 10 {
        printf(c"big\n")
    } else {
        printf(c"small\n")
    }
    ret 0
}
"#;

    #[test]
    fn test_parse_valid_source() {
        let mut parser = SeaParser::new().unwrap();
        let parsed = parser.parse(SAMPLE).unwrap();

        assert_eq!(parsed.root().kind(), "source_file");
        assert!(!parsed.has_errors(), "unexpected errors: {}", parsed.to_sexp());
        assert!(parsed.diagnostics().is_empty());

        let sexp = parsed.to_sexp();
        assert!(sexp.contains("(top_use"));
        assert!(sexp.contains("(top_rec"));
        assert!(sexp.contains("(top_tag"));
        assert!(sexp.contains("(top_def"));
        assert!(sexp.contains("(top_fun"));
        assert!(sexp.contains("(statement_for"));
        assert!(sexp.contains("(statement_ret"));
    }

    #[test]
    fn test_parse_reports_errors() {
        let mut parser = SeaParser::new().unwrap();
        let parsed = parser.parse("fun main() { ret }\n").unwrap();

        assert!(parsed.has_errors());
        let diagnostics = parsed.diagnostics();
        assert!(!diagnostics.is_empty());
        assert!(diagnostics.iter().all(|d| d.line == 1));
    }

    #[test]
    fn test_parser_reuse() {
        let mut parser = SeaParser::new().unwrap();
        for _ in 0..10 {
            let parsed = parser.parse("fun id(x: int): int -> ret x\n").unwrap();
            assert!(!parsed.has_errors(), "{}", parsed.to_sexp());
        }
    }

    #[test]
    fn test_empty_source() {
        let mut parser = SeaParser::new().unwrap();
        let parsed = parser.parse("").unwrap();
        assert_eq!(parsed.root().kind(), "source_file");
        assert_eq!(parsed.root().named_child_count(), 0);
        assert!(parsed.diagnostics().is_empty());
    }

    #[test]
    fn test_column_counts_characters() {
        let mut parser = SeaParser::new().unwrap();
        let ascii = parser.parse("fun main() { ret c\"hello\" ) }\n").unwrap();
        let accented = parser.parse("fun main() { ret c\"héllö\" ) }\n").unwrap();

        let expected = ascii.diagnostics();
        assert!(!expected.is_empty(), "{}", ascii.to_sexp());
        assert!(expected.iter().any(|d| d.column > 25));

        let positions = |ds: Vec<Diagnostic>| ds.iter().map(|d| (d.line, d.column)).collect::<Vec<_>>();
        assert_eq!(positions(accented.diagnostics()), positions(expected));
    }

    #[test]
    fn test_char_column() {
        let line = "let é = ö";
        let byte = line.find('=').unwrap();
        assert_eq!(byte, 7);
        assert_eq!(char_column(line, byte, byte), 6);

        let two_lines = "x\nà b";
        let byte = two_lines.find('b').unwrap();
        assert_eq!(char_column(two_lines, byte, byte - 2), 2);
        assert_eq!(char_column("", 0, 0), 0);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic {
            kind: DiagnosticKind::Missing(")".to_string()),
            line: 3,
            column: 7,
            text: String::new(),
        };
        assert_eq!(d.to_string(), "3:7: missing `)`");
    }
}
