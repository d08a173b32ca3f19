use indexmap::IndexMap;
use solir_ast::{Diagnostic, DiagnosticKind, Node, Root};
use std::collections::HashSet;

/// Computes the C3 linearization for every contract and writes it into
/// `linearized_base_contracts`. Solidity merges base lists in reverse
/// declaration order, so `contract D is B, C` linearizes to `[D, C, B, ...]`.
/// Cycles and unmergeable hierarchies get a diagnostic and fall back to the
/// contract's own id.
pub(crate) fn apply(root: &mut Root, diagnostics: &mut Vec<Diagnostic>) {
    let mut bases: IndexMap<i64, Vec<i64>> = IndexMap::new();
    let mut names: IndexMap<i64, String> = IndexMap::new();
    let mut srcs: IndexMap<i64, solir_ast::SrcNode> = IndexMap::new();

    root.walk(&mut |node| {
        if let Some(contract) = node.as_contract() {
            let resolved: Vec<i64> = contract
                .base_contracts
                .iter()
                .map(|b| b.referenced_declaration)
                .filter(|&id| id != 0)
                .collect();
            bases.insert(contract.id, resolved);
            names.insert(contract.id, contract.name.clone());
            srcs.insert(contract.id, contract.src);
        }
    });

    let mut linearizer = Linearizer {
        bases: &bases,
        memo: IndexMap::new(),
        visiting: HashSet::new(),
    };
    let ids: Vec<i64> = bases.keys().copied().collect();
    for id in &ids {
        linearizer.linearize(*id);
    }
    let memo = linearizer.memo;

    for unit in &mut root.source_units {
        unit.walk_mut(&mut |node| {
            let contract = match node {
                Node::ContractDefinition(c)
                | Node::InterfaceDefinition(c)
                | Node::LibraryDefinition(c) => c,
                _ => return,
            };
            match memo.get(&contract.id) {
                Some(Some(order)) => contract.linearized_base_contracts = order.clone(),
                Some(None) => {
                    let name = names.get(&contract.id).cloned().unwrap_or_default();
                    diagnostics.push(Diagnostic::error(
                        DiagnosticKind::InheritanceCycle,
                        format!("inheritance of {name} cannot be linearized"),
                        srcs.get(&contract.id).copied().unwrap_or_default(),
                    ));
                    contract.linearized_base_contracts = vec![contract.id];
                }
                None => contract.linearized_base_contracts = vec![contract.id],
            }
        });
    }
}

struct Linearizer<'a> {
    bases: &'a IndexMap<i64, Vec<i64>>,
    memo: IndexMap<i64, Option<Vec<i64>>>,
    visiting: HashSet<i64>,
}

impl Linearizer<'_> {
    fn linearize(&mut self, id: i64) -> Option<Vec<i64>> {
        if let Some(known) = self.memo.get(&id) {
            return known.clone();
        }
        if !self.visiting.insert(id) {
            // Cycle through this contract.
            return None;
        }

        let base_list = self.bases.get(&id).cloned().unwrap_or_default();
        let reversed: Vec<i64> = base_list.iter().rev().copied().collect();

        let mut sequences: Vec<Vec<i64>> = Vec::new();
        let mut failed = false;
        for &base in &reversed {
            if !self.bases.contains_key(&base) {
                // Base resolved to something outside this build; treat it as
                // a leaf.
                sequences.push(vec![base]);
                continue;
            }
            match self.linearize(base) {
                Some(order) => sequences.push(order),
                None => {
                    failed = true;
                    break;
                }
            }
        }
        if !reversed.is_empty() {
            sequences.push(reversed);
        }

        let result = if failed { None } else { merge(sequences) };
        let result = result.map(|tail| {
            let mut order = vec![id];
            order.extend(tail);
            order
        });

        self.visiting.remove(&id);
        self.memo.insert(id, result.clone());
        result
    }
}

/// Standard C3 merge. Returns `None` when no consistent order exists.
fn merge(mut sequences: Vec<Vec<i64>>) -> Option<Vec<i64>> {
    let mut result = Vec::new();
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }

        let candidate = sequences
            .iter()
            .map(|s| s[0])
            .find(|&head| !sequences.iter().any(|s| s[1..].contains(&head)))?;

        if !result.contains(&candidate) {
            result.push(candidate);
        }
        for sequence in &mut sequences {
            sequence.retain(|&x| x != candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::merge;

    #[test]
    fn merge_single_chain() {
        assert_eq!(merge(vec![vec![2], vec![2]]), Some(vec![2]));
    }

    #[test]
    fn merge_diamond_prefers_later_bases() {
        // D is B, C where both derive from A: reversed base order puts C
        // before B, and A comes last.
        let b = vec![2, 1];
        let c = vec![3, 1];
        let heads = vec![3, 2];
        assert_eq!(merge(vec![c, b, heads]), Some(vec![3, 2, 1]));
    }

    #[test]
    fn merge_detects_inconsistency() {
        // X wants [1, 2] and Y wants [2, 1]; no order satisfies both.
        assert_eq!(merge(vec![vec![1, 2], vec![2, 1]]), None);
    }
}
