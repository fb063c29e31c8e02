use super::ast::ASTNode;
use thiserror::Error;

pub mod pest_minnow_parser;

/// Syntax error produced while parsing, carrying the rendered location
/// report of the underlying grammar engine.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Parser handles interpretation of source text into the intermediate
/// representation. Put another way the parser turns a source string into
/// an abstract syntax tree.
pub trait AstParser {
    /// Creates a default configuration of an AstParser
    fn default() -> Self;

    /// Parse a source string into an Abstract Syntax Tree
    fn parse(self, source: &str) -> Result<ASTNode, ParseError>;
}

// Concrete Definition Export
pub use self::pest_minnow_parser::PestMinnowParser;
