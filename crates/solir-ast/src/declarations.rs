use crate::function::{Mutability, StorageLocation, Visibility};
use crate::node::{Node, SrcNode};
use crate::types::TypeDescription;
use serde::{Deserialize, Serialize};

/// State variables, struct members and local declarations all share this
/// shape; `state_variable` distinguishes contract storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub state_variable: bool,
    pub visibility: Visibility,
    pub mutability: Mutability,
    pub storage_location: StorageLocation,
    pub type_name: String,
    pub type_description: TypeDescription,
    pub initial_value: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDefinition {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub canonical_name: String,
    pub type_description: TypeDescription,
    /// Statically typed member declarations, in source order.
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub canonical_name: String,
    pub type_description: TypeDescription,
    pub members: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub type_description: TypeDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub anonymous: bool,
    pub parameters: Vec<Node>,
}

impl EventDefinition {
    pub fn parameter_list(&self) -> impl Iterator<Item = &crate::function::Parameter> {
        self.parameters.iter().filter_map(|n| match n {
            Node::Parameter(p) => Some(p),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDefinition {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub parameters: Vec<Node>,
}
