use crate::error::Error;
use crate::resolve::{self, MemberEntry, PendingModifier, PendingReference};
use crate::sources::{CancelToken, SourceInput, Sources};
use crate::type_resolver::node_text;
use crate::{linearize, Result};
use indexmap::IndexMap;
use solir_ast::{
    BaseContract, Contract, ContractKind, Definition, DefinitionKind, DefinitionRegistry,
    Diagnostic, DiagnosticKind, IdGenerator, Import, Node, NodeType, Pragma, Root, SourceUnit,
    SrcNode, Symbol, TypeDescription,
};
use tracing::{debug, warn};
use tree_sitter::Node as ParseNode;

/// Walks tree-sitter-solidity parse trees and produces the typed AST.
///
/// All build-scoped state lives here: the id generator, the definition
/// registry, lexical scopes, pending cross-references and the diagnostics
/// list. One builder performs one build.
pub struct AstBuilder {
    pub(crate) ids: IdGenerator,
    pub(crate) registry: DefinitionRegistry,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) pending: Vec<PendingReference>,
    pub(crate) pending_modifiers: Vec<PendingModifier>,
    /// Per-contract member tables for name resolution across inheritance.
    pub(crate) members: IndexMap<String, IndexMap<String, MemberEntry>>,
    pub(crate) contract_names: IndexMap<i64, String>,
    pub(crate) scopes: Vec<IndexMap<String, MemberEntry>>,
    pub(crate) current_contract: String,
    pub(crate) current_unit_name: String,
    cancel: CancelToken,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::with_cancel(CancelToken::new())
    }

    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            ids: IdGenerator::new(),
            registry: DefinitionRegistry::new(),
            diagnostics: Vec::new(),
            pending: Vec::new(),
            pending_modifiers: Vec::new(),
            members: IndexMap::new(),
            contract_names: IndexMap::new(),
            scopes: Vec::new(),
            current_contract: String::new(),
            current_unit_name: String::new(),
            cancel,
        }
    }

    /// Builds the AST for the given sources. Hard failures are missing input
    /// and cancellation; everything else lands in `root.diagnostics`.
    pub fn build(mut self, sources: &Sources) -> Result<Root> {
        if sources.is_empty()
            || sources.inputs.iter().all(|s| s.content.trim().is_empty())
        {
            return Err(Error::InputMissing);
        }

        let root_id = self.ids.next_id();
        let mut units = Vec::new();

        for input in &sources.inputs {
            self.check_cancelled()?;
            self.process_file(input, root_id, &mut units)?;
        }

        let mut root = Root {
            id: root_id,
            entry_source_unit: 0,
            source_units: units,
            diagnostics: Vec::new(),
        };

        resolve::resolve_bases(&mut root, &self.registry);
        resolve::resolve_imports(&mut root);
        linearize::apply(&mut root, &mut self.diagnostics);
        resolve::resolve_references(&mut self, &mut root);
        resolve::propagate_implementation(&mut root);

        root.entry_source_unit = entry_unit_id(&root, sources);
        root.diagnostics = std::mem::take(&mut self.diagnostics);

        debug!(
            units = root.source_unit_count(),
            diagnostics = root.diagnostics.len(),
            "ast build finished"
        );
        Ok(root)
    }

    pub(crate) fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Fresh source descriptor for a parse context. Descriptors draw ids
    /// from the same generator as nodes.
    pub(crate) fn src_for(&mut self, ctx: ParseNode, parent: i64) -> SrcNode {
        let start = ctx.start_byte() as i64;
        let end = ctx.end_byte() as i64;
        SrcNode {
            id: self.ids.next_id(),
            line: ctx.start_position().row as i64 + 1,
            column: ctx.start_position().column as i64,
            start,
            end,
            length: end - start,
            parent_index: parent,
        }
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn declare_local(&mut self, name: &str, id: i64, td: TypeDescription) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name.to_string(),
                MemberEntry {
                    id,
                    type_description: td,
                },
            );
        }
    }

    pub(crate) fn lookup_local(&self, name: &str) -> Option<&MemberEntry> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    pub(crate) fn add_member(&mut self, name: &str, id: i64, td: TypeDescription) {
        let table = self
            .members
            .entry(self.current_contract.clone())
            .or_default();
        table.entry(name.to_string()).or_insert(MemberEntry {
            id,
            type_description: td,
        });
    }

    fn process_file(
        &mut self,
        input: &SourceInput,
        root_id: i64,
        units: &mut Vec<Node>,
    ) -> Result<()> {
        let tree = parse_tree(&input.content)?;
        let ts_root = tree.root_node();

        if ts_root.has_error() {
            let src = self.error_src(ts_root, root_id);
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::ParseError,
                format!("syntax error in {}", input.path),
                src,
            ));
            warn!(path = %input.path, "parse errors reported; continuing with partial tree");
        }

        let license = scan_license(&input.content);

        let mut pragmas = Vec::new();
        let mut imports = Vec::new();
        let mut contracts = Vec::new();
        let mut cursor = ts_root.walk();
        for child in ts_root.children(&mut cursor) {
            match child.kind() {
                "pragma_directive" => pragmas.push(child),
                "import_directive" => imports.push(child),
                "contract_declaration" | "interface_declaration" | "library_declaration" => {
                    contracts.push(child)
                }
                _ => {}
            }
        }

        for ctx in contracts {
            self.check_cancelled()?;
            let unit = self.process_unit(input, license.as_deref(), &pragmas, &imports, ctx, root_id)?;
            units.push(Node::SourceUnit(unit));
        }
        Ok(())
    }

    /// One source unit per contract declaration, named after the contract and
    /// carrying the file's pragmas and imports.
    fn process_unit(
        &mut self,
        input: &SourceInput,
        license: Option<&str>,
        pragmas: &[ParseNode],
        imports: &[ParseNode],
        ctx: ParseNode,
        root_id: i64,
    ) -> Result<SourceUnit> {
        let source = &input.content;
        let name = ctx
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_else(|| "UnnamedContract".to_string());

        self.current_unit_name = name.clone();
        self.current_contract = name.clone();

        let unit_id = self.ids.next_id();
        let unit_src = self.src_for(ctx, root_id);

        let mut nodes = Vec::new();
        for pragma in pragmas {
            nodes.push(self.parse_pragma(*pragma, source, unit_id));
        }

        let mut import_ids = Vec::new();
        for import in imports {
            let node = self.parse_import(*import, source, unit_id);
            import_ids.push(node.id());
            nodes.push(node);
        }

        let contract = self.parse_contract(ctx, source, unit_id, &import_ids)?;
        nodes.push(contract);

        Ok(SourceUnit {
            id: unit_id,
            src: unit_src,
            name: name.clone(),
            absolute_path: input.path.clone(),
            license: license.map(|l| l.to_string()),
            exported_symbols: vec![Symbol {
                id: unit_id,
                name,
                absolute_path: input.path.clone(),
            }],
            nodes,
        })
    }

    fn parse_pragma(&mut self, ctx: ParseNode, source: &str, unit_id: i64) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, unit_id);
        let text = node_text(ctx, source);
        let literals = text
            .trim_start_matches("pragma")
            .trim_end_matches(';')
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        Node::Pragma(Pragma {
            id,
            src,
            text,
            literals,
        })
    }

    fn parse_import(&mut self, ctx: ParseNode, source: &str, unit_id: i64) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, unit_id);

        let mut path = String::new();
        let mut unit_alias = None;
        let mut cursor = ctx.walk();
        for child in ctx.children(&mut cursor) {
            match child.kind() {
                "string" | "string_literal" => {
                    path = node_text(child, source)
                        .trim_matches(|c| c == '"' || c == '\'')
                        .to_string();
                }
                "identifier" => unit_alias = Some(node_text(child, source)),
                _ => {}
            }
        }
        if path.is_empty() {
            if let Some(n) = ctx.child_by_field_name("source") {
                path = node_text(n, source)
                    .trim_matches(|c| c == '"' || c == '\'')
                    .to_string();
            }
        }

        Node::Import(Import {
            id,
            src,
            path,
            unit_alias,
            source_unit: 0,
        })
    }

    fn parse_contract(
        &mut self,
        ctx: ParseNode,
        source: &str,
        unit_id: i64,
        import_ids: &[i64],
    ) -> Result<Node> {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, unit_id);

        let kind = match ctx.kind() {
            "interface_declaration" => ContractKind::Interface,
            "library_declaration" => ContractKind::Library,
            _ => ContractKind::Contract,
        };
        let name = ctx
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_else(|| "UnnamedContract".to_string());

        let mut cursor = ctx.walk();
        let is_abstract = ctx
            .children(&mut cursor)
            .any(|c| c.kind() == "abstract");

        let definition_kind = match kind {
            ContractKind::Contract => DefinitionKind::Contract,
            ContractKind::Interface => DefinitionKind::Interface,
            ContractKind::Library => DefinitionKind::Library,
        };
        let registered = self.registry.register(
            &name,
            Definition {
                id,
                kind: definition_kind,
                canonical_name: name.clone(),
                type_description: TypeDescription::contract_type(&name, id),
            },
        );
        if !registered {
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticKind::AmbiguousDefinition,
                format!("duplicate definition of {name}; keeping the first"),
                src,
            ));
        }
        self.members.entry(name.clone()).or_default();
        self.contract_names.insert(id, name.clone());

        // Provisionally complete; body elements and base contracts can both
        // revoke this.
        let mut contract = Contract {
            id,
            src,
            name: name.clone(),
            kind,
            is_abstract,
            fully_implemented: true,
            base_contracts: Vec::new(),
            linearized_base_contracts: vec![id],
            contract_dependencies: import_ids.to_vec(),
            nodes: Vec::new(),
        };

        self.parse_inheritance(ctx, source, unit_id, &mut contract);

        if let Some(body) = ctx.child_by_field_name("body").or_else(|| {
            let mut cursor = ctx.walk();
            let found = ctx.children(&mut cursor)
                .find(|c| c.kind() == "contract_body");
            found
        }) {
            let mut cursor = body.walk();
            let children: Vec<ParseNode> = body.children(&mut cursor).collect();
            for member in children {
                self.check_cancelled()?;
                if !member.is_named() || member.kind() == "comment" {
                    continue;
                }
                self.parse_body_element(member, source, unit_id, &mut contract);
            }
        }

        Ok(match kind {
            ContractKind::Contract => Node::ContractDefinition(contract),
            ContractKind::Interface => Node::InterfaceDefinition(contract),
            ContractKind::Library => Node::LibraryDefinition(contract),
        })
    }

    fn parse_inheritance(
        &mut self,
        ctx: ParseNode,
        source: &str,
        unit_id: i64,
        contract: &mut Contract,
    ) {
        let mut specifiers = Vec::new();
        let mut cursor = ctx.walk();
        for child in ctx.children(&mut cursor) {
            if child.kind() == "inheritance_specifier" {
                specifiers.push(child);
            } else if child.kind() == "class_heritage" {
                let mut inner = child.walk();
                for spec in child.children(&mut inner) {
                    if spec.kind() == "inheritance_specifier" {
                        specifiers.push(spec);
                    }
                }
            }
        }

        for spec in specifiers {
            let base_name = spec
                .child_by_field_name("ancestor")
                .map(|n| node_text(n, source))
                .or_else(|| {
                    let mut cursor = spec.walk();
                    let found = spec.children(&mut cursor)
                        .find(|c| c.kind() == "user_defined_type" || c.kind() == "identifier")
                        .map(|n| node_text(n, source));
                    found
                })
                .unwrap_or_default();

            let referenced = self
                .registry
                .get(&base_name)
                .map(|d| d.id)
                .unwrap_or(0);

            let id = self.ids.next_id();
            let src = self.src_for(spec, contract.id);
            let scope = crate::expr::ExprScope {
                contract: Some(contract.id),
                source_unit: unit_id,
                ..Default::default()
            };
            let modifier_args = self
                .call_argument_ctxs(spec)
                .into_iter()
                .map(|arg| self.parse_expression(arg, source, scope))
                .collect();

            contract.base_contracts.push(BaseContract {
                id,
                node_type: NodeType::BaseContract,
                src,
                base_name,
                referenced_declaration: referenced,
                modifier_args,
            });
        }
    }

    fn error_src(&mut self, ts_root: ParseNode, parent: i64) -> SrcNode {
        fn first_error(node: ParseNode) -> Option<ParseNode> {
            if node.is_error() || node.is_missing() {
                return Some(node);
            }
            let mut cursor = node.walk();
            let children: Vec<ParseNode> = node.children(&mut cursor).collect();
            children.into_iter().find_map(first_error)
        }

        let target = first_error(ts_root).unwrap_or(ts_root);
        let start = target.start_byte() as i64;
        let end = target.end_byte() as i64;
        // Diagnostic ranges do not consume node ids.
        SrcNode {
            id: 0,
            line: target.start_position().row as i64 + 1,
            column: target.start_position().column as i64,
            start,
            end,
            length: end - start,
            parent_index: parent,
        }
    }

    /// Collects `call_argument` contexts either directly below `ctx` or one
    /// level down inside an argument-list node.
    pub(crate) fn call_argument_ctxs<'t>(&self, ctx: ParseNode<'t>) -> Vec<ParseNode<'t>> {
        let mut out = Vec::new();
        let mut cursor = ctx.walk();
        for child in ctx.children(&mut cursor) {
            if child.kind() == "call_argument" {
                out.push(child);
            } else if child.kind() == "call_arguments" || child.kind() == "arguments" {
                let mut inner = child.walk();
                for arg in child.children(&mut inner) {
                    if arg.kind() == "call_argument" {
                        out.push(arg);
                    }
                }
            }
        }
        out
    }
}

fn parse_tree(content: &str) -> Result<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    let language = tree_sitter_solidity::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| Error::Parser(format!("failed to load solidity grammar: {e}")))?;
    parser
        .parse(content, None)
        .ok_or_else(|| Error::Parser("parser returned no tree".to_string()))
}

/// SPDX license line, e.g. `// SPDX-License-Identifier: MIT`.
fn scan_license(content: &str) -> Option<String> {
    for line in content.lines() {
        if let Some(idx) = line.find("SPDX-License-Identifier:") {
            let license = line[idx + "SPDX-License-Identifier:".len()..].trim();
            if !license.is_empty() {
                return Some(license.to_string());
            }
        }
    }
    None
}

fn entry_unit_id(root: &Root, sources: &Sources) -> i64 {
    if let Some(entry) = &sources.entry_contract {
        if let Some(unit) = root.source_unit_by_name(entry) {
            return unit.id;
        }
    }
    root.units().last().map(|u| u.id).unwrap_or(0)
}
