use crate::contract::{Contract, Import, Pragma, SourceUnit};
use crate::declarations::{
    EnumDefinition, EnumValue, ErrorDefinition, EventDefinition, StructDefinition,
    VariableDeclaration,
};
use crate::expressions::{
    Assignment, BinaryOperation, Conditional, FunctionCall, Identifier, IndexAccess, Literal,
    MemberAccess, NewExpression, TupleExpression, TypeConversion, UnaryOperation,
};
use crate::function::{FunctionDefinition, ModifierDefinition, Parameter};
use crate::statements::{
    Assembly, Block, EmitStatement, ExpressionStatement, ForStatement, IfStatement,
    ReturnStatement, RevertStatement, TryStatement, WhileStatement,
};
use crate::types::TypeDescription;
use serde::{Deserialize, Serialize};

/// Fresh node ids for one build. Ids are dense, start at 1 and are stable
/// within a build only; 0 is reserved for "no parent".
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> i64 {
        self.next - 1
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Source range descriptor attached to every node. `parent_index` is a
/// back-edge to the logical parent's id, never an owning reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SrcNode {
    pub id: i64,
    pub line: i64,
    pub column: i64,
    pub start: i64,
    pub end: i64,
    pub length: i64,
    pub parent_index: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    SourceUnit,
    Pragma,
    Import,
    ContractDefinition,
    InterfaceDefinition,
    LibraryDefinition,
    BaseContract,
    FunctionDefinition,
    ModifierDefinition,
    EventDefinition,
    ErrorDefinition,
    StructDefinition,
    EnumDefinition,
    EnumValue,
    VariableDeclaration,
    Parameter,
    Block,
    ExpressionStatement,
    IfStatement,
    ForStatement,
    WhileStatement,
    ReturnStatement,
    EmitStatement,
    RevertStatement,
    TryStatement,
    Assembly,
    Identifier,
    Literal,
    AddOperation,
    SubtractOperation,
    MultiplyOperation,
    DivideOperation,
    ModuloOperation,
    ExponentOperation,
    BitAndOperation,
    BitOrOperation,
    BitXorOperation,
    ShiftLeftOperation,
    ShiftRightOperation,
    LogicalAndOperation,
    LogicalOrOperation,
    EqualityOperation,
    ComparisonOperation,
    UnaryOperation,
    IndexAccess,
    MemberAccess,
    FunctionCall,
    TupleExpression,
    ConditionalExpression,
    Assignment,
    TypeConversion,
    NewExpression,
}

/// One AST node. The variant tag is the node kind; the payload struct carries
/// the kind-specific fields. Children are owned through payload vectors and
/// boxes; every cross-node relation (`parent_index`, `referenced_declaration`,
/// `linearized_base_contracts`) is an id lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type")]
pub enum Node {
    #[serde(rename = "SOURCE_UNIT")]
    SourceUnit(SourceUnit),
    #[serde(rename = "PRAGMA")]
    Pragma(Pragma),
    #[serde(rename = "IMPORT")]
    Import(Import),
    #[serde(rename = "CONTRACT_DEFINITION")]
    ContractDefinition(Contract),
    #[serde(rename = "INTERFACE_DEFINITION")]
    InterfaceDefinition(Contract),
    #[serde(rename = "LIBRARY_DEFINITION")]
    LibraryDefinition(Contract),
    #[serde(rename = "FUNCTION_DEFINITION")]
    FunctionDefinition(FunctionDefinition),
    #[serde(rename = "MODIFIER_DEFINITION")]
    ModifierDefinition(ModifierDefinition),
    #[serde(rename = "EVENT_DEFINITION")]
    EventDefinition(EventDefinition),
    #[serde(rename = "ERROR_DEFINITION")]
    ErrorDefinition(ErrorDefinition),
    #[serde(rename = "STRUCT_DEFINITION")]
    StructDefinition(StructDefinition),
    #[serde(rename = "ENUM_DEFINITION")]
    EnumDefinition(EnumDefinition),
    #[serde(rename = "ENUM_VALUE")]
    EnumValue(EnumValue),
    #[serde(rename = "VARIABLE_DECLARATION")]
    VariableDeclaration(VariableDeclaration),
    #[serde(rename = "PARAMETER")]
    Parameter(Parameter),
    #[serde(rename = "BLOCK")]
    Block(Block),
    #[serde(rename = "EXPRESSION_STATEMENT")]
    ExpressionStatement(ExpressionStatement),
    #[serde(rename = "IF_STATEMENT")]
    IfStatement(IfStatement),
    #[serde(rename = "FOR_STATEMENT")]
    ForStatement(ForStatement),
    #[serde(rename = "WHILE_STATEMENT")]
    WhileStatement(WhileStatement),
    #[serde(rename = "RETURN_STATEMENT")]
    ReturnStatement(ReturnStatement),
    #[serde(rename = "EMIT_STATEMENT")]
    EmitStatement(EmitStatement),
    #[serde(rename = "REVERT_STATEMENT")]
    RevertStatement(RevertStatement),
    #[serde(rename = "TRY_STATEMENT")]
    TryStatement(TryStatement),
    #[serde(rename = "ASSEMBLY")]
    Assembly(Assembly),
    #[serde(rename = "IDENTIFIER")]
    Identifier(Identifier),
    #[serde(rename = "LITERAL")]
    Literal(Literal),
    #[serde(rename = "ADD_OPERATION")]
    AddOperation(BinaryOperation),
    #[serde(rename = "SUBTRACT_OPERATION")]
    SubtractOperation(BinaryOperation),
    #[serde(rename = "MULTIPLY_OPERATION")]
    MultiplyOperation(BinaryOperation),
    #[serde(rename = "DIVIDE_OPERATION")]
    DivideOperation(BinaryOperation),
    #[serde(rename = "MODULO_OPERATION")]
    ModuloOperation(BinaryOperation),
    #[serde(rename = "EXPONENT_OPERATION")]
    ExponentOperation(BinaryOperation),
    #[serde(rename = "BIT_AND_OPERATION")]
    BitAndOperation(BinaryOperation),
    #[serde(rename = "BIT_OR_OPERATION")]
    BitOrOperation(BinaryOperation),
    #[serde(rename = "BIT_XOR_OPERATION")]
    BitXorOperation(BinaryOperation),
    #[serde(rename = "SHIFT_LEFT_OPERATION")]
    ShiftLeftOperation(BinaryOperation),
    #[serde(rename = "SHIFT_RIGHT_OPERATION")]
    ShiftRightOperation(BinaryOperation),
    #[serde(rename = "LOGICAL_AND_OPERATION")]
    LogicalAndOperation(BinaryOperation),
    #[serde(rename = "LOGICAL_OR_OPERATION")]
    LogicalOrOperation(BinaryOperation),
    #[serde(rename = "EQUALITY_OPERATION")]
    EqualityOperation(BinaryOperation),
    #[serde(rename = "COMPARISON_OPERATION")]
    ComparisonOperation(BinaryOperation),
    #[serde(rename = "UNARY_OPERATION")]
    UnaryOperation(UnaryOperation),
    #[serde(rename = "INDEX_ACCESS")]
    IndexAccess(IndexAccess),
    #[serde(rename = "MEMBER_ACCESS")]
    MemberAccess(MemberAccess),
    #[serde(rename = "FUNCTION_CALL")]
    FunctionCall(FunctionCall),
    #[serde(rename = "TUPLE_EXPRESSION")]
    TupleExpression(TupleExpression),
    #[serde(rename = "CONDITIONAL_EXPRESSION")]
    ConditionalExpression(Conditional),
    #[serde(rename = "ASSIGNMENT")]
    Assignment(Assignment),
    #[serde(rename = "TYPE_CONVERSION")]
    TypeConversion(TypeConversion),
    #[serde(rename = "NEW_EXPRESSION")]
    NewExpression(NewExpression),
}

macro_rules! for_all_variants {
    ($node:expr, $n:ident => $body:expr) => {
        match $node {
            Node::SourceUnit($n) => $body,
            Node::Pragma($n) => $body,
            Node::Import($n) => $body,
            Node::ContractDefinition($n) => $body,
            Node::InterfaceDefinition($n) => $body,
            Node::LibraryDefinition($n) => $body,
            Node::FunctionDefinition($n) => $body,
            Node::ModifierDefinition($n) => $body,
            Node::EventDefinition($n) => $body,
            Node::ErrorDefinition($n) => $body,
            Node::StructDefinition($n) => $body,
            Node::EnumDefinition($n) => $body,
            Node::EnumValue($n) => $body,
            Node::VariableDeclaration($n) => $body,
            Node::Parameter($n) => $body,
            Node::Block($n) => $body,
            Node::ExpressionStatement($n) => $body,
            Node::IfStatement($n) => $body,
            Node::ForStatement($n) => $body,
            Node::WhileStatement($n) => $body,
            Node::ReturnStatement($n) => $body,
            Node::EmitStatement($n) => $body,
            Node::RevertStatement($n) => $body,
            Node::TryStatement($n) => $body,
            Node::Assembly($n) => $body,
            Node::Identifier($n) => $body,
            Node::Literal($n) => $body,
            Node::AddOperation($n) => $body,
            Node::SubtractOperation($n) => $body,
            Node::MultiplyOperation($n) => $body,
            Node::DivideOperation($n) => $body,
            Node::ModuloOperation($n) => $body,
            Node::ExponentOperation($n) => $body,
            Node::BitAndOperation($n) => $body,
            Node::BitOrOperation($n) => $body,
            Node::BitXorOperation($n) => $body,
            Node::ShiftLeftOperation($n) => $body,
            Node::ShiftRightOperation($n) => $body,
            Node::LogicalAndOperation($n) => $body,
            Node::LogicalOrOperation($n) => $body,
            Node::EqualityOperation($n) => $body,
            Node::ComparisonOperation($n) => $body,
            Node::UnaryOperation($n) => $body,
            Node::IndexAccess($n) => $body,
            Node::MemberAccess($n) => $body,
            Node::FunctionCall($n) => $body,
            Node::TupleExpression($n) => $body,
            Node::ConditionalExpression($n) => $body,
            Node::Assignment($n) => $body,
            Node::TypeConversion($n) => $body,
            Node::NewExpression($n) => $body,
        }
    };
}

impl Node {
    pub fn id(&self) -> i64 {
        for_all_variants!(self, n => n.id)
    }

    pub fn src(&self) -> &SrcNode {
        for_all_variants!(self, n => &n.src)
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::SourceUnit(_) => NodeType::SourceUnit,
            Node::Pragma(_) => NodeType::Pragma,
            Node::Import(_) => NodeType::Import,
            Node::ContractDefinition(_) => NodeType::ContractDefinition,
            Node::InterfaceDefinition(_) => NodeType::InterfaceDefinition,
            Node::LibraryDefinition(_) => NodeType::LibraryDefinition,
            Node::FunctionDefinition(_) => NodeType::FunctionDefinition,
            Node::ModifierDefinition(_) => NodeType::ModifierDefinition,
            Node::EventDefinition(_) => NodeType::EventDefinition,
            Node::ErrorDefinition(_) => NodeType::ErrorDefinition,
            Node::StructDefinition(_) => NodeType::StructDefinition,
            Node::EnumDefinition(_) => NodeType::EnumDefinition,
            Node::EnumValue(_) => NodeType::EnumValue,
            Node::VariableDeclaration(_) => NodeType::VariableDeclaration,
            Node::Parameter(_) => NodeType::Parameter,
            Node::Block(_) => NodeType::Block,
            Node::ExpressionStatement(_) => NodeType::ExpressionStatement,
            Node::IfStatement(_) => NodeType::IfStatement,
            Node::ForStatement(_) => NodeType::ForStatement,
            Node::WhileStatement(_) => NodeType::WhileStatement,
            Node::ReturnStatement(_) => NodeType::ReturnStatement,
            Node::EmitStatement(_) => NodeType::EmitStatement,
            Node::RevertStatement(_) => NodeType::RevertStatement,
            Node::TryStatement(_) => NodeType::TryStatement,
            Node::Assembly(_) => NodeType::Assembly,
            Node::Identifier(_) => NodeType::Identifier,
            Node::Literal(_) => NodeType::Literal,
            Node::AddOperation(_) => NodeType::AddOperation,
            Node::SubtractOperation(_) => NodeType::SubtractOperation,
            Node::MultiplyOperation(_) => NodeType::MultiplyOperation,
            Node::DivideOperation(_) => NodeType::DivideOperation,
            Node::ModuloOperation(_) => NodeType::ModuloOperation,
            Node::ExponentOperation(_) => NodeType::ExponentOperation,
            Node::BitAndOperation(_) => NodeType::BitAndOperation,
            Node::BitOrOperation(_) => NodeType::BitOrOperation,
            Node::BitXorOperation(_) => NodeType::BitXorOperation,
            Node::ShiftLeftOperation(_) => NodeType::ShiftLeftOperation,
            Node::ShiftRightOperation(_) => NodeType::ShiftRightOperation,
            Node::LogicalAndOperation(_) => NodeType::LogicalAndOperation,
            Node::LogicalOrOperation(_) => NodeType::LogicalOrOperation,
            Node::EqualityOperation(_) => NodeType::EqualityOperation,
            Node::ComparisonOperation(_) => NodeType::ComparisonOperation,
            Node::UnaryOperation(_) => NodeType::UnaryOperation,
            Node::IndexAccess(_) => NodeType::IndexAccess,
            Node::MemberAccess(_) => NodeType::MemberAccess,
            Node::FunctionCall(_) => NodeType::FunctionCall,
            Node::TupleExpression(_) => NodeType::TupleExpression,
            Node::ConditionalExpression(_) => NodeType::ConditionalExpression,
            Node::Assignment(_) => NodeType::Assignment,
            Node::TypeConversion(_) => NodeType::TypeConversion,
            Node::NewExpression(_) => NodeType::NewExpression,
        }
    }

    pub fn type_description(&self) -> Option<&TypeDescription> {
        match self {
            Node::EnumDefinition(n) => Some(&n.type_description),
            Node::StructDefinition(n) => Some(&n.type_description),
            Node::EnumValue(n) => Some(&n.type_description),
            Node::VariableDeclaration(n) => Some(&n.type_description),
            Node::Parameter(n) => Some(&n.type_description),
            Node::Identifier(n) => Some(&n.type_description),
            Node::Literal(n) => Some(&n.type_description),
            Node::AddOperation(n)
            | Node::SubtractOperation(n)
            | Node::MultiplyOperation(n)
            | Node::DivideOperation(n)
            | Node::ModuloOperation(n)
            | Node::ExponentOperation(n)
            | Node::BitAndOperation(n)
            | Node::BitOrOperation(n)
            | Node::BitXorOperation(n)
            | Node::ShiftLeftOperation(n)
            | Node::ShiftRightOperation(n)
            | Node::LogicalAndOperation(n)
            | Node::LogicalOrOperation(n)
            | Node::EqualityOperation(n)
            | Node::ComparisonOperation(n) => Some(&n.type_description),
            Node::UnaryOperation(n) => Some(&n.type_description),
            Node::IndexAccess(n) => Some(&n.type_description),
            Node::MemberAccess(n) => Some(&n.type_description),
            Node::FunctionCall(n) => Some(&n.type_description),
            Node::TupleExpression(n) => Some(&n.type_description),
            Node::ConditionalExpression(n) => Some(&n.type_description),
            Node::Assignment(n) => Some(&n.type_description),
            Node::TypeConversion(n) => Some(&n.type_description),
            Node::NewExpression(n) => Some(&n.type_description),
            _ => None,
        }
    }

    /// Direct children in declaration order.
    pub fn children(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        self.push_children(&mut out);
        out
    }

    fn push_children<'a>(&'a self, out: &mut Vec<&'a Node>) {
        match self {
            Node::SourceUnit(n) => out.extend(n.nodes.iter()),
            Node::Pragma(_) | Node::Import(_) => {}
            Node::ContractDefinition(n)
            | Node::InterfaceDefinition(n)
            | Node::LibraryDefinition(n) => {
                for base in &n.base_contracts {
                    out.extend(base.modifier_args.iter());
                }
                out.extend(n.nodes.iter());
            }
            Node::FunctionDefinition(n) => {
                out.extend(n.parameters.iter());
                out.extend(n.return_parameters.iter());
                for m in &n.modifiers {
                    out.extend(m.arguments.iter());
                }
                if let Some(body) = &n.body {
                    out.push(body);
                }
            }
            Node::ModifierDefinition(n) => {
                out.extend(n.parameters.iter());
                if let Some(body) = &n.body {
                    out.push(body);
                }
            }
            Node::EventDefinition(n) => out.extend(n.parameters.iter()),
            Node::ErrorDefinition(n) => out.extend(n.parameters.iter()),
            Node::StructDefinition(n) => out.extend(n.members.iter()),
            Node::EnumDefinition(n) => out.extend(n.members.iter()),
            Node::EnumValue(_) => {}
            Node::VariableDeclaration(n) => {
                if let Some(value) = &n.initial_value {
                    out.push(value);
                }
            }
            Node::Parameter(_) => {}
            Node::Block(n) => out.extend(n.statements.iter()),
            Node::ExpressionStatement(n) => out.push(&n.expression),
            Node::IfStatement(n) => {
                out.push(&n.condition);
                out.push(&n.body);
                if let Some(e) = &n.else_body {
                    out.push(e);
                }
            }
            Node::ForStatement(n) => {
                if let Some(i) = &n.initializer {
                    out.push(i);
                }
                if let Some(c) = &n.condition {
                    out.push(c);
                }
                if let Some(u) = &n.update {
                    out.push(u);
                }
                out.push(&n.body);
            }
            Node::WhileStatement(n) => {
                out.push(&n.condition);
                out.push(&n.body);
            }
            Node::ReturnStatement(n) => {
                if let Some(e) = &n.expression {
                    out.push(e);
                }
            }
            Node::EmitStatement(n) => out.push(&n.expression),
            Node::RevertStatement(n) => {
                if let Some(e) = &n.expression {
                    out.push(e);
                }
            }
            Node::TryStatement(n) => {
                out.push(&n.expression);
                out.push(&n.body);
                out.extend(n.catch_clauses.iter());
            }
            Node::Assembly(_) => {}
            Node::Identifier(_) | Node::Literal(_) => {}
            Node::AddOperation(n)
            | Node::SubtractOperation(n)
            | Node::MultiplyOperation(n)
            | Node::DivideOperation(n)
            | Node::ModuloOperation(n)
            | Node::ExponentOperation(n)
            | Node::BitAndOperation(n)
            | Node::BitOrOperation(n)
            | Node::BitXorOperation(n)
            | Node::ShiftLeftOperation(n)
            | Node::ShiftRightOperation(n)
            | Node::LogicalAndOperation(n)
            | Node::LogicalOrOperation(n)
            | Node::EqualityOperation(n)
            | Node::ComparisonOperation(n) => out.extend(n.expressions.iter()),
            Node::UnaryOperation(n) => out.push(&n.expression),
            Node::IndexAccess(n) => {
                out.push(&n.base);
                if let Some(i) = &n.index {
                    out.push(i);
                }
            }
            Node::MemberAccess(n) => out.push(&n.expression),
            Node::FunctionCall(n) => {
                out.push(&n.expression);
                out.extend(n.arguments.iter());
            }
            Node::TupleExpression(n) => out.extend(n.components.iter()),
            Node::ConditionalExpression(n) => {
                out.push(&n.condition);
                out.push(&n.true_expression);
                out.push(&n.false_expression);
            }
            Node::Assignment(n) => {
                out.push(&n.left);
                out.push(&n.right);
            }
            Node::TypeConversion(n) => out.push(&n.expression),
            Node::NewExpression(_) => {}
        }
    }

    /// Depth-first walk over this node and everything it owns.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Mutable depth-first walk. Used by the reference-resolution fixup pass.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        match self {
            Node::SourceUnit(n) => {
                for c in &mut n.nodes {
                    c.walk_mut(f);
                }
            }
            Node::Pragma(_) | Node::Import(_) => {}
            Node::ContractDefinition(n)
            | Node::InterfaceDefinition(n)
            | Node::LibraryDefinition(n) => {
                for base in &mut n.base_contracts {
                    for a in &mut base.modifier_args {
                        a.walk_mut(f);
                    }
                }
                for c in &mut n.nodes {
                    c.walk_mut(f);
                }
            }
            Node::FunctionDefinition(n) => {
                for c in &mut n.parameters {
                    c.walk_mut(f);
                }
                for c in &mut n.return_parameters {
                    c.walk_mut(f);
                }
                for m in &mut n.modifiers {
                    for a in &mut m.arguments {
                        a.walk_mut(f);
                    }
                }
                if let Some(body) = &mut n.body {
                    body.walk_mut(f);
                }
            }
            Node::ModifierDefinition(n) => {
                for c in &mut n.parameters {
                    c.walk_mut(f);
                }
                if let Some(body) = &mut n.body {
                    body.walk_mut(f);
                }
            }
            Node::EventDefinition(n) => {
                for c in &mut n.parameters {
                    c.walk_mut(f);
                }
            }
            Node::ErrorDefinition(n) => {
                for c in &mut n.parameters {
                    c.walk_mut(f);
                }
            }
            Node::StructDefinition(n) => {
                for c in &mut n.members {
                    c.walk_mut(f);
                }
            }
            Node::EnumDefinition(n) => {
                for c in &mut n.members {
                    c.walk_mut(f);
                }
            }
            Node::EnumValue(_) | Node::Parameter(_) => {}
            Node::VariableDeclaration(n) => {
                if let Some(v) = &mut n.initial_value {
                    v.walk_mut(f);
                }
            }
            Node::Block(n) => {
                for c in &mut n.statements {
                    c.walk_mut(f);
                }
            }
            Node::ExpressionStatement(n) => n.expression.walk_mut(f),
            Node::IfStatement(n) => {
                n.condition.walk_mut(f);
                n.body.walk_mut(f);
                if let Some(e) = &mut n.else_body {
                    e.walk_mut(f);
                }
            }
            Node::ForStatement(n) => {
                if let Some(i) = &mut n.initializer {
                    i.walk_mut(f);
                }
                if let Some(c) = &mut n.condition {
                    c.walk_mut(f);
                }
                if let Some(u) = &mut n.update {
                    u.walk_mut(f);
                }
                n.body.walk_mut(f);
            }
            Node::WhileStatement(n) => {
                n.condition.walk_mut(f);
                n.body.walk_mut(f);
            }
            Node::ReturnStatement(n) => {
                if let Some(e) = &mut n.expression {
                    e.walk_mut(f);
                }
            }
            Node::EmitStatement(n) => n.expression.walk_mut(f),
            Node::RevertStatement(n) => {
                if let Some(e) = &mut n.expression {
                    e.walk_mut(f);
                }
            }
            Node::TryStatement(n) => {
                n.expression.walk_mut(f);
                n.body.walk_mut(f);
                for c in &mut n.catch_clauses {
                    c.walk_mut(f);
                }
            }
            Node::Assembly(_) | Node::Identifier(_) | Node::Literal(_) => {}
            Node::AddOperation(n)
            | Node::SubtractOperation(n)
            | Node::MultiplyOperation(n)
            | Node::DivideOperation(n)
            | Node::ModuloOperation(n)
            | Node::ExponentOperation(n)
            | Node::BitAndOperation(n)
            | Node::BitOrOperation(n)
            | Node::BitXorOperation(n)
            | Node::ShiftLeftOperation(n)
            | Node::ShiftRightOperation(n)
            | Node::LogicalAndOperation(n)
            | Node::LogicalOrOperation(n)
            | Node::EqualityOperation(n)
            | Node::ComparisonOperation(n) => {
                for c in &mut n.expressions {
                    c.walk_mut(f);
                }
            }
            Node::UnaryOperation(n) => n.expression.walk_mut(f),
            Node::IndexAccess(n) => {
                n.base.walk_mut(f);
                if let Some(i) = &mut n.index {
                    i.walk_mut(f);
                }
            }
            Node::MemberAccess(n) => n.expression.walk_mut(f),
            Node::FunctionCall(n) => {
                n.expression.walk_mut(f);
                for c in &mut n.arguments {
                    c.walk_mut(f);
                }
            }
            Node::TupleExpression(n) => {
                for c in &mut n.components {
                    c.walk_mut(f);
                }
            }
            Node::ConditionalExpression(n) => {
                n.condition.walk_mut(f);
                n.true_expression.walk_mut(f);
                n.false_expression.walk_mut(f);
            }
            Node::Assignment(n) => {
                n.left.walk_mut(f);
                n.right.walk_mut(f);
            }
            Node::TypeConversion(n) => n.expression.walk_mut(f),
            Node::NewExpression(_) => {}
        }
    }

    pub fn as_contract(&self) -> Option<&Contract> {
        match self {
            Node::ContractDefinition(c)
            | Node::InterfaceDefinition(c)
            | Node::LibraryDefinition(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_source_unit(&self) -> Option<&SourceUnit> {
        match self {
            Node::SourceUnit(u) => Some(u),
            _ => None,
        }
    }

    pub fn is_binary_operation(&self) -> bool {
        matches!(
            self,
            Node::AddOperation(_)
                | Node::SubtractOperation(_)
                | Node::MultiplyOperation(_)
                | Node::DivideOperation(_)
                | Node::ModuloOperation(_)
                | Node::ExponentOperation(_)
                | Node::BitAndOperation(_)
                | Node::BitOrOperation(_)
                | Node::BitXorOperation(_)
                | Node::ShiftLeftOperation(_)
                | Node::ShiftRightOperation(_)
                | Node::LogicalAndOperation(_)
                | Node::LogicalOrOperation(_)
                | Node::EqualityOperation(_)
                | Node::ComparisonOperation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_generator_is_dense_from_one() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn node_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&NodeType::BitXorOperation).unwrap();
        assert_eq!(json, "\"BIT_XOR_OPERATION\"");
        let json = serde_json::to_string(&NodeType::ContractDefinition).unwrap();
        assert_eq!(json, "\"CONTRACT_DEFINITION\"");
    }

    #[test]
    fn identifier_node_round_trips_with_kind_tag() {
        let node = Node::Identifier(Identifier {
            id: 4,
            src: SrcNode::default(),
            name: "total".to_string(),
            referenced_declaration: 2,
            type_description: TypeDescription::elementary("uint"),
        });
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"node_type\":\"IDENTIFIER\""));
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
        assert_eq!(back.node_type(), NodeType::Identifier);
        assert_eq!(back.id(), 4);
    }
}
