use crate::node::{Node, NodeType, SrcNode};
use serde::{Deserialize, Serialize};

/// A symbol exported by a source unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: i64,
    pub name: String,
    pub absolute_path: String,
}

/// One source unit per contract-level declaration. The unit is named after
/// the contract and carries the file's pragmas, imports and the contract
/// node in `nodes`, in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub absolute_path: String,
    pub license: Option<String>,
    pub exported_symbols: Vec<Symbol>,
    pub nodes: Vec<Node>,
}

impl SourceUnit {
    pub fn pragmas(&self) -> impl Iterator<Item = &Pragma> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Pragma(p) => Some(p),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Import(i) => Some(i),
            _ => None,
        })
    }

    /// The contract declaration this unit was created for.
    pub fn contract(&self) -> Option<&Contract> {
        self.nodes.iter().find_map(|n| n.as_contract())
    }

    pub fn contract_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.as_contract().is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pragma {
    pub id: i64,
    pub src: SrcNode,
    pub text: String,
    pub literals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub id: i64,
    pub src: SrcNode,
    /// Import path as written in the source.
    pub path: String,
    pub unit_alias: Option<String>,
    /// Id of the imported source unit when it resolves inside this build.
    pub source_unit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Contract,
    Interface,
    Library,
}

impl ContractKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            ContractKind::Contract => NodeType::ContractDefinition,
            ContractKind::Interface => NodeType::InterfaceDefinition,
            ContractKind::Library => NodeType::LibraryDefinition,
        }
    }
}

/// A base named in a contract's inheritance list, with constructor-style
/// arguments when present. `referenced_declaration` is the resolved base
/// contract id, or 0 while unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseContract {
    pub id: i64,
    pub node_type: NodeType,
    pub src: SrcNode,
    pub base_name: String,
    pub referenced_declaration: i64,
    pub modifier_args: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub src: SrcNode,
    pub name: String,
    pub kind: ContractKind,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub fully_implemented: bool,
    pub base_contracts: Vec<BaseContract>,
    /// Method-resolution order: own id first, then C3 over the bases.
    pub linearized_base_contracts: Vec<i64>,
    /// Import-derived dependency ids, in declaration order.
    pub contract_dependencies: Vec<i64>,
    pub nodes: Vec<Node>,
}

impl Contract {
    pub fn functions(&self) -> impl Iterator<Item = &crate::function::FunctionDefinition> {
        self.nodes.iter().filter_map(|n| match n {
            Node::FunctionDefinition(f) => Some(f),
            _ => None,
        })
    }

    pub fn state_variables(&self) -> impl Iterator<Item = &crate::declarations::VariableDeclaration> {
        self.nodes.iter().filter_map(|n| match n {
            Node::VariableDeclaration(v) if v.state_variable => Some(v),
            _ => None,
        })
    }

    pub fn events(&self) -> impl Iterator<Item = &crate::declarations::EventDefinition> {
        self.nodes.iter().filter_map(|n| match n {
            Node::EventDefinition(e) => Some(e),
            _ => None,
        })
    }
}
