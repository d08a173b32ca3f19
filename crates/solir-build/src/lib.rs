/*! Builds the typed AST out of tree-sitter-solidity parse trees.
 *
 * The grammar parser is an external collaborator: this crate walks the parse
 * contexts it produces and emits `solir_ast` nodes with fresh dense ids,
 * resolved references and canonical type descriptions. A build is
 * single-threaded and deterministic; concurrent builds on disjoint inputs
 * need no synchronization.
 */

mod builder;
mod error;
mod expr;
mod linearize;
mod members;
mod resolve;
mod sources;
mod stmt;
mod type_resolver;

#[cfg(test)]
mod tests;

pub use builder::AstBuilder;
pub use error::Error;
pub use sources::{CancelToken, SourceInput, Sources};

use solir_ast::Root;

pub type Result<T> = std::result::Result<T, Error>;

/// Parses a single in-memory source into an AST root. Convenience entry for
/// tests and tooling; multi-file builds go through [`AstBuilder`].
pub fn parse_source(source: &str) -> Result<Root> {
    let sources = Sources::from_single("source.sol", source);
    AstBuilder::new().build(&sources)
}
