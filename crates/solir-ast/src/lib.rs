/*! Typed AST model for Solidity sources.
 *
 * Downstream analysis (IR lowering, ABI emission, bytecode verification) needs more
 * than a parse tree: it needs stable node identities, resolved cross-references and
 * canonical type descriptions. This crate provides the node model those consumers
 * share; `solir-build` is what populates it from a parse tree.
 */

pub mod contract;
pub mod declarations;
pub mod diagnostics;
pub mod expressions;
pub mod function;
pub mod node;
pub mod root;
pub mod statements;
pub mod types;

pub use contract::{BaseContract, Contract, ContractKind, Import, Pragma, SourceUnit, Symbol};
pub use declarations::{
    EnumDefinition, EnumValue, ErrorDefinition, EventDefinition, StructDefinition,
    VariableDeclaration,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use expressions::{
    Assignment, BinaryOperation, Conditional, FunctionCall, Identifier, IndexAccess, Literal,
    LiteralKind, MemberAccess, NewExpression, TupleExpression, TypeConversion, UnaryOperation,
};
pub use function::{
    FunctionDefinition, FunctionKind, ModifierDefinition, ModifierInvocation, Mutability,
    Parameter, StateMutability, StorageLocation, Visibility,
};
pub use node::{IdGenerator, Node, NodeType, SrcNode};
pub use root::Root;
pub use statements::{
    Assembly, Block, EmitStatement, ExpressionStatement, ForStatement, IfStatement,
    ReturnStatement, RevertStatement, TryStatement, WhileStatement,
};
pub use types::{
    is_mapping_type, normalize_type_name, normalize_type_name_with_status,
    normalize_struct_type_name, parse_mapping_type, Definition, DefinitionKind,
    DefinitionRegistry, TypeDescription,
};
