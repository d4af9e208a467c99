pub mod ast;
pub mod error;
pub mod lexer;
mod parser;
pub mod visit;

use ast::Node;
use error::ParseError;

/// Parses a dice expression into its syntax tree.
pub fn parse(source: &str) -> Result<Node, ParseError> {
    let result = parser::Parser::new(source).and_then(parser::Parser::parse);
    match &result {
        Ok(ast) => tracing::debug!(target: "dicelang::parse", source, %ast, "parsed"),
        Err(e) => tracing::debug!(target: "dicelang::parse", source, error = %e, "parse failed"),
    }
    result
}
