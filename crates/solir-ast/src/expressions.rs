use crate::node::{Node, SrcNode};
use crate::types::TypeDescription;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    /// Id of the declaration this name resolves to, or 0 when unresolved.
    pub referenced_declaration: i64,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    Number,
    String,
    Bool,
    HexString,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub id: i64,
    pub src: SrcNode,
    pub kind: LiteralKind,
    pub value: String,
    pub type_description: TypeDescription,
}

/// Shared payload of every binary operator kind. Chained operators of the
/// same kind are flattened, so `expressions` can hold more than two operands;
/// `type_descriptions` carries one entry per operand and `type_description`
/// the result type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOperation {
    pub id: i64,
    pub src: SrcNode,
    pub operator: String,
    pub expressions: Vec<Node>,
    pub type_descriptions: Vec<TypeDescription>,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOperation {
    pub id: i64,
    pub src: SrcNode,
    pub operator: String,
    pub prefix: bool,
    pub expression: Box<Node>,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexAccess {
    pub id: i64,
    pub src: SrcNode,
    pub base: Box<Node>,
    pub index: Option<Box<Node>>,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAccess {
    pub id: i64,
    pub src: SrcNode,
    pub expression: Box<Node>,
    pub member_name: String,
    pub referenced_declaration: i64,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub id: i64,
    pub src: SrcNode,
    pub expression: Box<Node>,
    pub arguments: Vec<Node>,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TupleExpression {
    pub id: i64,
    pub src: SrcNode,
    pub components: Vec<Node>,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub id: i64,
    pub src: SrcNode,
    pub condition: Box<Node>,
    pub true_expression: Box<Node>,
    pub false_expression: Box<Node>,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub src: SrcNode,
    pub operator: String,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub type_description: TypeDescription,
}

/// An elementary-type conversion such as `address(x)` or `uint256(y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeConversion {
    pub id: i64,
    pub src: SrcNode,
    pub type_name: String,
    pub expression: Box<Node>,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpression {
    pub id: i64,
    pub src: SrcNode,
    pub type_name: String,
    pub type_description: TypeDescription,
}
