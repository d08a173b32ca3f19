use crate::contract::SourceUnit;
use crate::diagnostics::Diagnostic;
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// Root of one build: the source units in declaration order plus the
/// diagnostics the build accumulated. The whole tree is owned here and
/// released together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub id: i64,
    pub entry_source_unit: i64,
    pub source_units: Vec<Node>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Root {
    pub fn source_unit_count(&self) -> usize {
        self.source_units.len()
    }

    pub fn has_source_units(&self) -> bool {
        !self.source_units.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.source_units.iter().filter_map(|n| n.as_source_unit())
    }

    pub fn source_unit_by_name(&self, name: &str) -> Option<&SourceUnit> {
        self.units().find(|u| u.name == name)
    }

    pub fn source_unit_by_id(&self, id: i64) -> Option<&SourceUnit> {
        self.units().find(|u| u.id == id)
    }

    pub fn entry_unit(&self) -> Option<&SourceUnit> {
        self.source_unit_by_id(self.entry_source_unit)
    }

    /// Depth-first walk over every node in every unit.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        for unit in &self.source_units {
            unit.walk(f);
        }
    }

    /// Id lookup over the tree. Traversal order is deterministic, so the
    /// first match is stable across runs.
    pub fn node_by_id(&self, id: i64) -> Option<&Node> {
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() && node.id() == id {
                found = Some(node);
            }
        });
        found
    }
}
