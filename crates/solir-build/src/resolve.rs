use crate::builder::AstBuilder;
use crate::type_resolver::resolve_type_text;
use indexmap::IndexMap;
use solir_ast::{
    DefinitionRegistry, Diagnostic, DiagnosticKind, Node, Root, TypeDescription,
};
use std::collections::HashMap;

/// One contract member as seen by name resolution.
#[derive(Debug, Clone)]
pub(crate) struct MemberEntry {
    pub id: i64,
    pub type_description: TypeDescription,
}

/// Identifier that could not be resolved against lexical scope during the
/// first pass. Settled here once every definition is known.
#[derive(Debug, Clone)]
pub(crate) struct PendingReference {
    pub node_id: i64,
    pub name: String,
    pub contract: String,
}

#[derive(Debug, Clone)]
pub(crate) struct PendingModifier {
    pub function_id: i64,
    pub index: usize,
    pub name: String,
    pub contract: String,
}

/// Fills `referenced_declaration` on base contracts once every contract in
/// the build has been registered.
pub(crate) fn resolve_bases(root: &mut Root, registry: &DefinitionRegistry) {
    for unit in &mut root.source_units {
        unit.walk_mut(&mut |node| {
            let contract = match node {
                Node::ContractDefinition(c)
                | Node::InterfaceDefinition(c)
                | Node::LibraryDefinition(c) => c,
                _ => return,
            };
            for base in &mut contract.base_contracts {
                if base.referenced_declaration == 0 {
                    if let Some(definition) = registry.get(&base.base_name) {
                        base.referenced_declaration = definition.id;
                    }
                }
            }
        });
    }
}

/// Links import nodes to the source units they name, when those units are
/// part of this build.
pub(crate) fn resolve_imports(root: &mut Root) {
    let paths: Vec<(String, i64)> = root
        .units()
        .map(|u| (u.absolute_path.clone(), u.id))
        .collect();

    for unit in &mut root.source_units {
        unit.walk_mut(&mut |node| {
            if let Node::Import(import) = node {
                if import.source_unit != 0 || import.path.is_empty() {
                    return;
                }
                let wanted = import.path.trim_start_matches("./");
                if let Some((_, id)) = paths
                    .iter()
                    .find(|(p, _)| p == &import.path || p.ends_with(wanted))
                {
                    import.source_unit = *id;
                }
            }
        });
    }
}

/// Second resolution pass: settles pending identifiers against contract
/// members (walking the linearized bases), then the global registry; fixes
/// up modifier references and re-resolves type descriptions that were
/// forward references during the first pass.
pub(crate) fn resolve_references(builder: &mut AstBuilder, root: &mut Root) {
    let pending = std::mem::take(&mut builder.pending);
    let pending_modifiers = std::mem::take(&mut builder.pending_modifiers);

    let pending_by_node: HashMap<i64, PendingReference> =
        pending.into_iter().map(|p| (p.node_id, p)).collect();
    let mut modifiers_by_function: HashMap<i64, Vec<PendingModifier>> = HashMap::new();
    for pm in pending_modifiers {
        modifiers_by_function.entry(pm.function_id).or_default().push(pm);
    }

    // contract name -> linearized base ids, to search inherited members.
    let mut linearized: IndexMap<String, Vec<i64>> = IndexMap::new();
    root.walk(&mut |node| {
        if let Some(contract) = node.as_contract() {
            linearized.insert(contract.name.clone(), contract.linearized_base_contracts.clone());
        }
    });

    let members = std::mem::take(&mut builder.members);
    let contract_names = builder.contract_names.clone();
    let registry = &builder.registry;
    let mut diagnostics = Vec::new();

    let lookup = |contract: &str, name: &str| -> Option<MemberEntry> {
        let chain = linearized.get(contract);
        if let Some(chain) = chain {
            for contract_id in chain {
                let Some(base_name) = contract_names.get(contract_id) else {
                    continue;
                };
                if let Some(entry) = members.get(base_name).and_then(|t| t.get(name)) {
                    return Some(entry.clone());
                }
            }
            None
        } else {
            members.get(contract).and_then(|t| t.get(name)).cloned()
        }
    };

    for unit in &mut root.source_units {
        unit.walk_mut(&mut |node| match node {
            Node::Identifier(identifier) => {
                let Some(p) = pending_by_node.get(&identifier.id) else {
                    return;
                };
                if let Some(entry) = lookup(&p.contract, &p.name) {
                    identifier.referenced_declaration = entry.id;
                    identifier.type_description = entry.type_description;
                } else if let Some(definition) = registry.get(&p.name) {
                    identifier.referenced_declaration = definition.id;
                    identifier.type_description = definition.type_description.clone();
                } else {
                    diagnostics.push(Diagnostic::warning(
                        DiagnosticKind::ResolutionWarning,
                        format!("unresolved identifier: {}", p.name),
                        identifier.src,
                    ));
                }
            }
            Node::FunctionDefinition(function) => {
                let Some(pending) = modifiers_by_function.get(&function.id) else {
                    return;
                };
                for pm in pending {
                    if let Some(entry) = lookup(&pm.contract, &pm.name) {
                        if let Some(invocation) = function.modifiers.get_mut(pm.index) {
                            invocation.referenced_declaration = entry.id;
                        }
                    }
                }
            }
            Node::Parameter(parameter) => {
                if parameter.type_description.is_unknown() && !parameter.type_name.is_empty() {
                    let (_, td) = resolve_type_text(&parameter.type_name, registry);
                    if !td.is_unknown() {
                        parameter.type_description = td;
                    }
                }
            }
            Node::VariableDeclaration(variable) => {
                if variable.type_description.is_unknown() && !variable.type_name.is_empty() {
                    let (_, td) = resolve_type_text(&variable.type_name, registry);
                    if !td.is_unknown() {
                        variable.type_description = td;
                    }
                }
            }
            _ => {}
        });
    }

    builder.members = members;
    builder.diagnostics.extend(diagnostics);
}

/// An unimplemented base leaves every derived contract unimplemented too.
/// Iterates to a fixpoint; hierarchies are shallow so this settles fast.
pub(crate) fn propagate_implementation(root: &mut Root) {
    let mut implemented: IndexMap<i64, bool> = IndexMap::new();
    let mut chains: IndexMap<i64, Vec<i64>> = IndexMap::new();
    root.walk(&mut |node| {
        if let Some(contract) = node.as_contract() {
            implemented.insert(contract.id, contract.fully_implemented);
            chains.insert(contract.id, contract.linearized_base_contracts.clone());
        }
    });

    loop {
        let mut changed = false;
        let snapshot = implemented.clone();
        for (id, chain) in &chains {
            if !snapshot.get(id).copied().unwrap_or(true) {
                continue;
            }
            let broken = chain
                .iter()
                .filter(|base| *base != id)
                .any(|base| !snapshot.get(base).copied().unwrap_or(true));
            if broken {
                implemented.insert(*id, false);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    for unit in &mut root.source_units {
        unit.walk_mut(&mut |node| {
            let contract = match node {
                Node::ContractDefinition(c)
                | Node::InterfaceDefinition(c)
                | Node::LibraryDefinition(c) => c,
                _ => return,
            };
            if let Some(value) = implemented.get(&contract.id) {
                contract.fully_implemented = *value;
            }
        });
    }
}
