use crate::node::{Node, SrcNode};
use crate::types::TypeDescription;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Internal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Payable,
    Nonpayable,
}

impl Default for StateMutability {
    fn default() -> Self {
        StateMutability::Nonpayable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageLocation {
    Default,
    Memory,
    Storage,
    Calldata,
}

impl Default for StorageLocation {
    fn default() -> Self {
        StorageLocation::Default
    }
}

/// State-variable mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    Mutable,
    Immutable,
    Constant,
}

impl Default for Mutability {
    fn default() -> Self {
        Mutability::Mutable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Function,
    Constructor,
    Receive,
    Fallback,
}

/// A modifier attached to a function signature, e.g. `onlyOwner(msg.sender)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierInvocation {
    pub name: String,
    pub referenced_declaration: i64,
    pub arguments: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub kind: FunctionKind,
    pub visibility: Visibility,
    pub state_mutability: StateMutability,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    #[serde(rename = "override")]
    pub overrides: bool,
    pub implemented: bool,
    pub modifiers: Vec<ModifierInvocation>,
    pub parameters: Vec<Node>,
    pub return_parameters: Vec<Node>,
    pub body: Option<Box<Node>>,
}

impl FunctionDefinition {
    pub fn parameter_list(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter_map(|n| match n {
            Node::Parameter(p) => Some(p),
            _ => None,
        })
    }

    pub fn return_parameter_list(&self) -> impl Iterator<Item = &Parameter> {
        self.return_parameters.iter().filter_map(|n| match n {
            Node::Parameter(p) => Some(p),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierDefinition {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub implemented: bool,
    pub parameters: Vec<Node>,
    pub body: Option<Box<Node>>,
}

/// Function, event and error parameters. `indexed` only applies to event
/// parameters; everything else leaves it false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub type_name: String,
    pub type_description: TypeDescription,
    pub storage_location: StorageLocation,
    pub indexed: bool,
}
