/*! Unified interface for the solir pipeline.
 *
 * Single import for everything you need: building the typed AST from
 * Solidity sources, lowering to the flat contract IR with standards
 * detection, emitting ABI JSON, and verifying bytecode against a compile.
 */

pub use solir_abi as abi;
pub use solir_ast as ast;
pub use solir_build as build;
pub use solir_ir as ir;
pub use solir_verify as verify;

pub use solir_ast::{Node, NodeType, Root, TypeDescription};
pub use solir_build::{parse_source, AstBuilder, CancelToken, Sources};
pub use solir_ir::{lower, Standard};
pub use solir_verify::{Verifier, VerifyResult};

/// Builds the AST and lowers it in one call.
pub fn analyze(sources: &Sources) -> build::Result<(ast::Root, ir::Root)> {
    let ast_root = AstBuilder::new().build(sources)?;
    let ir_root = lower(&ast_root);
    Ok((ast_root, ir_root))
}
