//! Query-based outline of top-level definitions
//!
//! Definitions are found with the tags query. Capture naming convention:
//! - `name` → the defined identifier
//! - `parameters` → a function's parameter list
//! - `definition.<kind>` → the whole definition, `<kind>` being a
//!   [`SymbolKind`] string

use crate::parse::ParsedSource;
use crate::symbol::{Symbol, SymbolKind};
use crate::{Error, Result, TAGS_QUERY};
use std::collections::HashMap;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Query, QueryCursor};

const DEFINITION_PREFIX: &str = "definition.";

/// Extracts [`Symbol`]s from parsed Sea source.
pub struct Outline {
    query: Query,
}

impl Outline {
    /// Compile the tags query for the built-in grammar
    pub fn new() -> Result<Self> {
        Self::for_language(&crate::language())
    }

    pub fn for_language(language: &Language) -> Result<Self> {
        let query = Query::new(language, TAGS_QUERY)
            .map_err(|e| Error::Query(format!("tags query: {}", e)))?;
        Ok(Self { query })
    }

    /// Top-level definitions in document order
    pub fn extract(&self, parsed: &ParsedSource) -> Vec<Symbol> {
        let mut cursor = QueryCursor::new();
        let source_bytes = parsed.source().as_bytes();
        let capture_names = self.query.capture_names();

        let mut found: Vec<(usize, Symbol)> = Vec::new();

        let mut matches = cursor.matches(&self.query, parsed.root(), source_bytes);
        while let Some(query_match) = matches.next() {
            let mut captures: HashMap<&str, Node> = HashMap::new();
            for capture in query_match.captures {
                captures.insert(capture_names[capture.index as usize], capture.node);
            }

            let Some((kind, def_node)) = captures.iter().find_map(|(name, node)| {
                name.strip_prefix(DEFINITION_PREFIX)
                    .and_then(SymbolKind::from_capture)
                    .map(|kind| (kind, *node))
            }) else {
                continue;
            };
            let Some(name_node) = captures.get("name") else {
                continue;
            };

            let mut symbol = Symbol::new(
                kind,
                parsed.text(*name_node),
                def_node.start_position().row as u32 + 1,
                def_node.end_position().row as u32 + 1,
            );

            if let Some(params) = captures.get("parameters") {
                let mut signature = parsed.text(*params).to_string();
                if let Some(return_type) = return_type(def_node) {
                    signature.push_str(": ");
                    signature.push_str(parsed.text(return_type));
                }
                symbol = symbol.with_signature(signature);
            }

            found.push((def_node.start_byte(), symbol));
        }

        found.sort_by_key(|(start, _)| *start);
        found.into_iter().map(|(_, symbol)| symbol).collect()
    }
}

/// The `type` child following `:` in a function definition
fn return_type(def_node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = def_node.walk();
    def_node
        .named_children(&mut cursor)
        .find(|child| child.kind() == "type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::SeaParser;

    fn outline(source: &str) -> Vec<Symbol> {
        let mut parser = SeaParser::new().unwrap();
        let parsed = parser.parse(source).unwrap();
        Outline::new().unwrap().extract(&parsed)
    }

    #[test]
    fn test_outline_definitions() {
        let symbols = outline(
            r#"
rec Point(x: int, y: int)
def Index = int
tag Color(Red, Green)
tag rec Shape(Circle(r: f32) Square(side: f32))
pragma add_library("m")

fun add(a: int, b: int): int {
    ret a + b
}

fun main() -> ret 0
"#,
        );

        let names: Vec<_> = symbols.iter().map(|s| (s.kind, s.name.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (SymbolKind::Record, "Point"),
                (SymbolKind::Alias, "Index"),
                (SymbolKind::Tag, "Color"),
                (SymbolKind::TagRecord, "Shape"),
                (SymbolKind::Pragma, "add_library"),
                (SymbolKind::Function, "add"),
                (SymbolKind::Function, "main"),
            ]
        );

        let add = &symbols[5];
        assert_eq!(add.signature.as_deref(), Some("(a: int, b: int): int"));
        assert_eq!(add.line_start, 8);
        assert_eq!(add.line_end, 10);

        assert_eq!(symbols[6].signature.as_deref(), Some("()"));
    }

    #[test]
    fn test_outline_empty_file() {
        assert!(outline("// nothing here\n").is_empty());
    }
}
