//! Symbol types for Sea outlines
//!
//! Every top-level Sea definition maps to one of these kinds:
//! - `Function`: `fun name(...)`
//! - `Record`: `rec name(...)`
//! - `Alias`: `def name = type`
//! - `Tag`: `tag name(...)`
//! - `TagRecord`: `tag rec name(...)`
//! - `Pragma`: `pragma name(...)`

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of a top-level Sea definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Function definition
    Function,
    /// Record (struct) definition
    Record,
    /// Type alias
    Alias,
    /// Plain tag (enum)
    Tag,
    /// Tag whose variants carry fields
    TagRecord,
    /// Compiler pragma
    Pragma,
}

impl SymbolKind {
    /// Get the string representation of the symbol kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Record => "record",
            SymbolKind::Alias => "alias",
            SymbolKind::Tag => "tag",
            SymbolKind::TagRecord => "tag_record",
            SymbolKind::Pragma => "pragma",
        }
    }

    /// Get all symbol kinds
    pub fn all() -> &'static [SymbolKind] {
        &[
            SymbolKind::Function,
            SymbolKind::Record,
            SymbolKind::Alias,
            SymbolKind::Tag,
            SymbolKind::TagRecord,
            SymbolKind::Pragma,
        ]
    }

    /// Map a `definition.*` tag capture suffix to a kind
    pub fn from_capture(suffix: &str) -> Option<Self> {
        SymbolKind::all().iter().copied().find(|k| k.as_str() == suffix)
    }
}

impl FromStr for SymbolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "function" | "fun" | "fn" => Ok(SymbolKind::Function),
            "record" | "rec" | "struct" => Ok(SymbolKind::Record),
            "alias" | "def" | "type" => Ok(SymbolKind::Alias),
            "tag" | "enum" => Ok(SymbolKind::Tag),
            "tag_record" | "tag-rec" | "tag_rec" => Ok(SymbolKind::TagRecord),
            "pragma" => Ok(SymbolKind::Pragma),
            _ => Err(Error::Parse(format!("Unknown symbol kind: {}", s))),
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A top-level definition found in a Sea source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Definition name
    pub name: String,
    pub kind: SymbolKind,
    /// Starting line number (1-indexed)
    pub line_start: u32,
    /// Ending line number (1-indexed, inclusive)
    pub line_end: u32,
    /// Parameter list and return type (functions only)
    pub signature: Option<String>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>, line_start: u32, line_end: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            line_start,
            line_end,
            signature: None,
        }
    }

    /// Set the signature
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Get a short description for display
    pub fn short_description(&self) -> String {
        if let Some(sig) = &self.signature {
            format!("{} {}{}", self.kind, self.name, sig)
        } else {
            format!("{} {}", self.kind, self.name)
        }
    }
}
