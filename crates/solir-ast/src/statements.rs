use crate::node::{Node, SrcNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: i64,
    pub src: SrcNode,
    pub statements: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub id: i64,
    pub src: SrcNode,
    pub expression: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub id: i64,
    pub src: SrcNode,
    pub condition: Box<Node>,
    pub body: Box<Node>,
    pub else_body: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStatement {
    pub id: i64,
    pub src: SrcNode,
    pub initializer: Option<Box<Node>>,
    pub condition: Option<Box<Node>>,
    pub update: Option<Box<Node>>,
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub id: i64,
    pub src: SrcNode,
    pub condition: Box<Node>,
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub id: i64,
    pub src: SrcNode,
    pub expression: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitStatement {
    pub id: i64,
    pub src: SrcNode,
    /// The emitted event call.
    pub expression: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevertStatement {
    pub id: i64,
    pub src: SrcNode,
    pub expression: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStatement {
    pub id: i64,
    pub src: SrcNode,
    pub expression: Box<Node>,
    pub body: Box<Node>,
    pub catch_clauses: Vec<Node>,
}

/// Inline assembly is kept opaque: the raw body text is enough for the
/// downstream pattern checks (proxy slot references).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub id: i64,
    pub src: SrcNode,
    pub body: String,
}
