use serde::{Deserialize, Serialize};
use solir_ast::{ContractKind, FunctionKind, Mutability, StateMutability, Visibility};

/// One lowered contract: the flat, serializable summary of a source unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub name: String,
    pub kind: ContractKind,
    pub license: Option<String>,
    pub language: String,
    pub absolute_path: String,
    pub state_variables: Vec<StateVariable>,
    pub structs: Vec<Struct>,
    pub enums: Vec<Enum>,
    pub errors: Vec<Error>,
    pub events: Vec<Event>,
    pub modifiers: Vec<Modifier>,
    pub constructor: Option<Function>,
    pub functions: Vec<Function>,
    pub receive: Option<Function>,
    pub fallback: Option<Function>,
    pub linearized_base_contracts: Vec<i64>,
    pub base_contracts: Vec<String>,
    /// Raw inline-assembly bodies, kept for slot-pattern heuristics.
    pub assembly: Vec<String>,
}

impl Contract {
    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn event_by_name(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    pub fn has_function_signature(&self, signature_raw: &str) -> bool {
        self.functions.iter().any(|f| f.signature_raw == signature_raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateVariable {
    pub id: i64,
    pub name: String,
    pub visibility: Visibility,
    pub mutability: Mutability,
    pub type_name: String,
    pub type_identifier: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Struct {
    pub id: i64,
    pub name: String,
    pub canonical_name: String,
    pub members: Vec<Parameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enum {
    pub id: i64,
    pub name: String,
    pub canonical_name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub anonymous: bool,
    pub parameters: Vec<Parameter>,
    pub signature_raw: String,
    /// Full 32-byte keccak topic hash.
    pub topic_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Error {
    pub id: i64,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub signature_raw: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modifier {
    pub id: i64,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub id: i64,
    pub name: String,
    pub kind: FunctionKind,
    pub visibility: Visibility,
    pub state_mutability: StateMutability,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    #[serde(rename = "override")]
    pub overrides: bool,
    pub implemented: bool,
    /// `name(type,type,...)` over canonical parameter types.
    pub signature_raw: String,
    /// Hex-encoded 4-byte selector; empty for constructors and the
    /// receive/fallback pair, which are not externally selectable.
    pub signature: String,
    pub parameters: Vec<Parameter>,
    pub return_parameters: Vec<Parameter>,
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Canonical type, e.g. `uint256` for a source-level `uint`.
    pub type_name: String,
    pub indexed: bool,
}
