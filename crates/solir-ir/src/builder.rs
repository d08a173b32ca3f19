use crate::contract::{
    Contract, Enum, Error, Event, Function, Modifier, Parameter, StateVariable, Struct,
};
use crate::root::Root;
use crate::selectors::{event_topic, function_selector};
use crate::standards;
use solir_ast as ast;
use solir_ast::{FunctionKind, Node};
use tracing::debug;

/// Lowers an AST root into the flat IR and runs standards detection.
/// Single deterministic pass; member order follows AST declaration order.
pub fn lower(source: &ast::Root) -> Root {
    let mut root = Root::default();

    for unit in source.units() {
        let Some(contract_node) = unit.contract_node() else {
            continue;
        };
        let Some(contract) = contract_node.as_contract() else {
            continue;
        };
        root.contracts.push(lower_contract(unit, contract_node, contract));
    }
    root.contracts_count = root.contracts.len() as i32;

    if let Some(entry) = source.entry_unit() {
        if let Some(contract) = entry.contract() {
            root.entry_contract_id = contract.id;
            root.entry_contract_name = contract.name.clone();
        }
    }

    standards::detect(&mut root);
    debug!(
        contracts = root.contracts_count,
        eips = root.eips.len(),
        "ir lowering finished"
    );
    root
}

fn lower_contract(
    unit: &ast::SourceUnit,
    contract_node: &Node,
    contract: &ast::Contract,
) -> Contract {
    let mut lowered = Contract {
        id: contract.id,
        name: contract.name.clone(),
        kind: contract.kind,
        license: unit.license.clone(),
        language: "solidity".to_string(),
        absolute_path: unit.absolute_path.clone(),
        state_variables: Vec::new(),
        structs: Vec::new(),
        enums: Vec::new(),
        errors: Vec::new(),
        events: Vec::new(),
        modifiers: Vec::new(),
        constructor: None,
        functions: Vec::new(),
        receive: None,
        fallback: None,
        linearized_base_contracts: contract.linearized_base_contracts.clone(),
        base_contracts: contract
            .base_contracts
            .iter()
            .map(|b| b.base_name.clone())
            .collect(),
        assembly: Vec::new(),
    };

    for node in &contract.nodes {
        match node {
            Node::VariableDeclaration(v) if v.state_variable => {
                lowered.state_variables.push(StateVariable {
                    id: v.id,
                    name: v.name.clone(),
                    visibility: v.visibility,
                    mutability: v.mutability,
                    type_name: v.type_name.clone(),
                    type_identifier: v.type_description.type_identifier.clone(),
                });
            }
            Node::StructDefinition(s) => {
                lowered.structs.push(Struct {
                    id: s.id,
                    name: s.name.clone(),
                    canonical_name: s.canonical_name.clone(),
                    members: s
                        .members
                        .iter()
                        .filter_map(|m| match m {
                            Node::VariableDeclaration(v) => Some(Parameter {
                                name: v.name.clone(),
                                type_name: v.type_name.clone(),
                                indexed: false,
                            }),
                            _ => None,
                        })
                        .collect(),
                });
            }
            Node::EnumDefinition(e) => {
                lowered.enums.push(Enum {
                    id: e.id,
                    name: e.name.clone(),
                    canonical_name: e.canonical_name.clone(),
                    members: e
                        .members
                        .iter()
                        .filter_map(|m| match m {
                            Node::EnumValue(v) => Some(v.name.clone()),
                            _ => None,
                        })
                        .collect(),
                });
            }
            Node::ErrorDefinition(e) => {
                let parameters = lower_parameters(&e.parameters);
                let signature_raw = raw_signature(&e.name, &parameters);
                let signature = function_selector(&signature_raw);
                lowered.errors.push(Error {
                    id: e.id,
                    name: e.name.clone(),
                    parameters,
                    signature_raw,
                    signature,
                });
            }
            Node::EventDefinition(e) => {
                let parameters = lower_parameters(&e.parameters);
                let signature_raw = raw_signature(&e.name, &parameters);
                let topic_hash = event_topic(&signature_raw);
                lowered.events.push(Event {
                    id: e.id,
                    name: e.name.clone(),
                    anonymous: e.anonymous,
                    parameters,
                    signature_raw,
                    topic_hash,
                });
            }
            Node::ModifierDefinition(m) => {
                lowered.modifiers.push(Modifier {
                    id: m.id,
                    name: m.name.clone(),
                    parameters: lower_parameters(&m.parameters),
                });
            }
            Node::FunctionDefinition(f) => {
                let function = lower_function(f);
                match f.kind {
                    FunctionKind::Constructor => lowered.constructor = Some(function),
                    FunctionKind::Receive => lowered.receive = Some(function),
                    FunctionKind::Fallback => lowered.fallback = Some(function),
                    FunctionKind::Function => lowered.functions.push(function),
                }
            }
            _ => {}
        }
    }

    contract_node.walk(&mut |node| {
        if let Node::Assembly(assembly) = node {
            lowered.assembly.push(assembly.body.clone());
        }
    });

    lowered
}

fn lower_function(f: &ast::FunctionDefinition) -> Function {
    let parameters = lower_parameters(&f.parameters);
    let return_parameters = lower_parameters(&f.return_parameters);

    // Only regular functions are externally selectable.
    let (signature_raw, signature) = if f.kind == FunctionKind::Function {
        let raw = raw_signature(&f.name, &parameters);
        let selector = function_selector(&raw);
        (raw, selector)
    } else {
        (String::new(), String::new())
    };

    Function {
        id: f.id,
        name: f.name.clone(),
        kind: f.kind,
        visibility: f.visibility,
        state_mutability: f.state_mutability,
        is_virtual: f.is_virtual,
        overrides: f.overrides,
        implemented: f.implemented,
        signature_raw,
        signature,
        parameters,
        return_parameters,
        modifiers: f.modifiers.iter().map(|m| m.name.clone()).collect(),
    }
}

fn lower_parameters(nodes: &[Node]) -> Vec<Parameter> {
    nodes
        .iter()
        .filter_map(|node| match node {
            Node::Parameter(p) => Some(Parameter {
                name: p.name.clone(),
                type_name: canonical_type(&p.type_name),
                indexed: p.indexed,
            }),
            _ => None,
        })
        .collect()
}

fn raw_signature(name: &str, parameters: &[Parameter]) -> String {
    let types: Vec<&str> = parameters.iter().map(|p| p.type_name.as_str()).collect();
    format!("{}({})", name, types.join(","))
}

/// Canonical ABI spelling of a source-level type reference. Trailing array
/// suffixes stay put while the base normalizes, so `uint[]` becomes
/// `uint256[]`.
pub(crate) fn canonical_type(raw: &str) -> String {
    let compact: String = raw.split_whitespace().collect::<Vec<_>>().join("");
    if let Some(open) = compact.find('[') {
        let (base, suffix) = compact.split_at(open);
        if !base.is_empty() {
            return format!("{}{}", ast::normalize_type_name(base), suffix);
        }
    }
    ast::normalize_type_name(&compact)
}

#[cfg(test)]
mod tests {
    use super::canonical_type;

    #[test]
    fn canonical_types_for_signatures() {
        assert_eq!(canonical_type("uint"), "uint256");
        assert_eq!(canonical_type("address payable"), "address");
        assert_eq!(canonical_type("uint256"), "uint256");
        assert_eq!(canonical_type("bytes"), "bytes");
        assert_eq!(canonical_type("uint[]"), "uint256[]");
        assert_eq!(canonical_type("int[4][]"), "int256[4][]");
    }
}
