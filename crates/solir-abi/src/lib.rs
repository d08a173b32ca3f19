/*! Standard Solidity ABI JSON from the lowered contract IR.
 *
 * Structs lower to `tuple` with recursive `components`, enums to `uint8`,
 * contract references to `address`. Mappings are not ABI-expressible as
 * parameters; public mapping state variables become getters whose flattened
 * key list forms the inputs.
 */

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use solir_ast::{is_mapping_type, normalize_type_name_with_status, parse_mapping_type, Mutability,
    StateMutability, Visibility};
use solir_ir::{Contract, Root, Struct};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<AbiParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<AbiParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<AbiParameter>>,
    #[serde(rename = "stateMutability", skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
}

/// Emits the ABI for every contract in the root, keyed by contract name.
pub fn emit(root: &Root) -> IndexMap<String, Vec<AbiEntry>> {
    root.contracts()
        .iter()
        .map(|c| (c.name.clone(), emit_contract(root, c)))
        .collect()
}

/// Emits one contract's ABI in declaration order: constructor, getters,
/// functions, events, errors, then receive/fallback.
pub fn emit_contract(root: &Root, contract: &Contract) -> Vec<AbiEntry> {
    let emitter = Emitter::new(root, contract);
    emitter.emit()
}

/// Pretty-printed JSON for an [`emit`] result, keyed by contract name.
pub fn to_json(abis: &IndexMap<String, Vec<AbiEntry>>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(abis)
}

struct Emitter<'a> {
    root: &'a Root,
    contract: &'a Contract,
    structs: IndexMap<String, &'a Struct>,
    enums: IndexMap<String, ()>,
}

impl<'a> Emitter<'a> {
    fn new(root: &'a Root, contract: &'a Contract) -> Self {
        // Base contract definitions are visible through inheritance.
        let mut structs = IndexMap::new();
        let mut enums = IndexMap::new();
        for id in &contract.linearized_base_contracts {
            if let Some(member) = root.contract_by_id(*id) {
                for s in &member.structs {
                    structs.entry(s.name.clone()).or_insert(s);
                }
                for e in &member.enums {
                    enums.entry(e.name.clone()).or_insert(());
                }
            }
        }
        Self {
            root,
            contract,
            structs,
            enums,
        }
    }

    fn emit(&self) -> Vec<AbiEntry> {
        let mut entries = Vec::new();

        if let Some(constructor) = &self.contract.constructor {
            entries.push(AbiEntry {
                kind: "constructor".to_string(),
                name: None,
                inputs: Some(self.parameters(&constructor.parameters)),
                outputs: None,
                state_mutability: Some(mutability_str(constructor.state_mutability)),
                anonymous: None,
            });
        }

        for variable in &self.contract.state_variables {
            if variable.visibility != Visibility::Public {
                continue;
            }
            if let Some(entry) = self.getter(variable) {
                entries.push(entry);
            }
        }

        for function in &self.contract.functions {
            if !matches!(function.visibility, Visibility::Public | Visibility::External) {
                continue;
            }
            if function.parameters.iter().any(|p| is_mapping_type(&p.type_name)) {
                // Mappings cannot cross the ABI boundary.
                continue;
            }
            entries.push(AbiEntry {
                kind: "function".to_string(),
                name: Some(function.name.clone()),
                inputs: Some(self.parameters(&function.parameters)),
                outputs: Some(self.parameters(&function.return_parameters)),
                state_mutability: Some(mutability_str(function.state_mutability)),
                anonymous: None,
            });
        }

        for event in &self.contract.events {
            entries.push(AbiEntry {
                kind: "event".to_string(),
                name: Some(event.name.clone()),
                inputs: Some(self.event_parameters(&event.parameters)),
                outputs: None,
                state_mutability: None,
                anonymous: Some(event.anonymous),
            });
        }

        for error in &self.contract.errors {
            entries.push(AbiEntry {
                kind: "error".to_string(),
                name: Some(error.name.clone()),
                inputs: Some(self.parameters(&error.parameters)),
                outputs: None,
                state_mutability: None,
                anonymous: None,
            });
        }

        if self.contract.receive.is_some() {
            entries.push(AbiEntry {
                kind: "receive".to_string(),
                name: None,
                inputs: None,
                outputs: None,
                state_mutability: Some("payable".to_string()),
                anonymous: None,
            });
        }
        if let Some(fallback) = &self.contract.fallback {
            entries.push(AbiEntry {
                kind: "fallback".to_string(),
                name: None,
                inputs: None,
                outputs: None,
                state_mutability: Some(mutability_str(fallback.state_mutability)),
                anonymous: None,
            });
        }

        entries
    }

    /// Getter entry for a public state variable. Mapping getters flatten the
    /// key chain into the input list; array getters take one index per
    /// dimension.
    fn getter(&self, variable: &solir_ir::StateVariable) -> Option<AbiEntry> {
        let type_name = variable.type_name.replace(' ', "");
        let mut inputs = Vec::new();
        let output_type;

        if is_mapping_type(&type_name) {
            let (ok, keys, values) = parse_mapping_type(&type_name);
            if !ok || values.is_empty() {
                return None;
            }
            for key in keys {
                inputs.push(self.parameter("", &key, None)?);
            }
            output_type = values[0].clone();
        } else if let Some(open) = type_name.find('[') {
            let dimensions = type_name[open..].matches('[').count();
            for _ in 0..dimensions {
                inputs.push(AbiParameter {
                    name: String::new(),
                    type_name: "uint256".to_string(),
                    components: None,
                    indexed: None,
                });
            }
            output_type = type_name[..open].to_string();
        } else {
            output_type = type_name;
        }

        let output = self.parameter("", &output_type, None)?;
        Some(AbiEntry {
            kind: "function".to_string(),
            name: Some(variable.name.clone()),
            inputs: Some(inputs),
            outputs: Some(vec![output]),
            state_mutability: Some(
                if variable.mutability == Mutability::Constant {
                    "pure".to_string()
                } else {
                    "view".to_string()
                },
            ),
            anonymous: None,
        })
    }

    fn parameters(&self, parameters: &[solir_ir::Parameter]) -> Vec<AbiParameter> {
        parameters
            .iter()
            .filter_map(|p| self.parameter(&p.name, &p.type_name, None))
            .collect()
    }

    fn event_parameters(&self, parameters: &[solir_ir::Parameter]) -> Vec<AbiParameter> {
        parameters
            .iter()
            .filter_map(|p| self.parameter(&p.name, &p.type_name, Some(p.indexed)))
            .collect()
    }

    /// Maps one source-level type to its ABI form. Returns `None` only for
    /// mappings, which have no parameter encoding.
    fn parameter(&self, name: &str, raw: &str, indexed: Option<bool>) -> Option<AbiParameter> {
        let compact = raw.replace(' ', "");
        if is_mapping_type(&compact) {
            return None;
        }

        let (base, suffix) = match compact.find('[') {
            Some(open) if open > 0 => compact.split_at(open),
            _ => (compact.as_str(), ""),
        };

        let (canonical, recognized) = normalize_type_name_with_status(base);
        if recognized {
            return Some(AbiParameter {
                name: name.to_string(),
                type_name: format!("{}{}", canonical, suffix),
                components: None,
                indexed,
            });
        }

        if self.enums.contains_key(base) {
            return Some(AbiParameter {
                name: name.to_string(),
                type_name: format!("uint8{}", suffix),
                components: None,
                indexed,
            });
        }

        if let Some(definition) = self.structs.get(base) {
            let components = definition
                .members
                .iter()
                .filter_map(|m| self.parameter(&m.name, &m.type_name, None))
                .collect();
            return Some(AbiParameter {
                name: name.to_string(),
                type_name: format!("tuple{}", suffix),
                components: Some(components),
                indexed,
            });
        }

        if self.root.contract_by_name(base).is_some() {
            return Some(AbiParameter {
                name: name.to_string(),
                type_name: format!("address{}", suffix),
                components: None,
                indexed,
            });
        }

        // Unknown user-defined types widen to tuple, the status flag from
        // normalization marking them as such.
        Some(AbiParameter {
            name: name.to_string(),
            type_name: format!("tuple{}", suffix),
            components: Some(Vec::new()),
            indexed,
        })
    }
}

fn mutability_str(mutability: StateMutability) -> String {
    match mutability {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::Payable => "payable",
        StateMutability::Nonpayable => "nonpayable",
    }
    .to_string()
}
