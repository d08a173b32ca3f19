use crate::builder::AstBuilder;
use crate::expr::ExprScope;
use crate::type_resolver::{is_type_kind, node_text, resolve_type_node};
use solir_ast::{
    Contract, EnumDefinition, EnumValue, ErrorDefinition, EventDefinition, FunctionDefinition,
    FunctionKind, ModifierDefinition, ModifierInvocation, Mutability, Node, Parameter,
    StateMutability, StorageLocation, StructDefinition, TypeDescription, VariableDeclaration,
    Visibility,
};
use tree_sitter::Node as ParseNode;

impl AstBuilder {
    /// Dispatches one contract body element and keeps the
    /// `fully_implemented` bookkeeping: a function or modifier without a
    /// body marks the contract incomplete.
    pub(crate) fn parse_body_element(
        &mut self,
        ctx: ParseNode,
        source: &str,
        unit_id: i64,
        contract: &mut Contract,
    ) {
        match ctx.kind() {
            "function_definition" => {
                let function =
                    self.parse_function(ctx, source, unit_id, contract.id, FunctionKind::Function);
                if !function.implemented {
                    contract.fully_implemented = false;
                }
                contract.nodes.push(Node::FunctionDefinition(function));
            }
            "constructor_definition" => {
                let function = self.parse_function(
                    ctx,
                    source,
                    unit_id,
                    contract.id,
                    FunctionKind::Constructor,
                );
                contract.nodes.push(Node::FunctionDefinition(function));
            }
            "fallback_receive_definition" => {
                let text = node_text(ctx, source);
                let kind = if text.trim_start().starts_with("receive") {
                    FunctionKind::Receive
                } else {
                    FunctionKind::Fallback
                };
                let function = self.parse_function(ctx, source, unit_id, contract.id, kind);
                if !function.implemented {
                    contract.fully_implemented = false;
                }
                contract.nodes.push(Node::FunctionDefinition(function));
            }
            "modifier_definition" => {
                let modifier = self.parse_modifier(ctx, source, unit_id, contract.id);
                if !modifier.implemented {
                    contract.fully_implemented = false;
                }
                contract.nodes.push(Node::ModifierDefinition(modifier));
            }
            "state_variable_declaration" => {
                let variable = self.parse_state_variable(ctx, source, unit_id, contract.id);
                contract.nodes.push(Node::VariableDeclaration(variable));
            }
            "struct_declaration" => {
                let def = self.parse_struct(ctx, source, contract.id);
                contract.nodes.push(Node::StructDefinition(def));
            }
            "enum_declaration" => {
                let def = self.parse_enum(ctx, source, contract.id);
                contract.nodes.push(Node::EnumDefinition(def));
            }
            "event_definition" => {
                let def = self.parse_event(ctx, source, contract.id);
                contract.nodes.push(Node::EventDefinition(def));
            }
            "error_declaration" | "error_definition" => {
                let def = self.parse_error(ctx, source, contract.id);
                contract.nodes.push(Node::ErrorDefinition(def));
            }
            // Type bindings carry no member surface of their own.
            "using_directive" | "user_defined_type_definition" => {}
            _ => {}
        }
    }

    fn parse_function(
        &mut self,
        ctx: ParseNode,
        source: &str,
        unit_id: i64,
        contract_id: i64,
        kind: FunctionKind,
    ) -> FunctionDefinition {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, contract_id);

        let name = match kind {
            FunctionKind::Constructor => "constructor".to_string(),
            FunctionKind::Receive => "receive".to_string(),
            FunctionKind::Fallback => "fallback".to_string(),
            FunctionKind::Function => ctx
                .child_by_field_name("name")
                .map(|n| node_text(n, source))
                .unwrap_or_default(),
        };

        let mut visibility = Visibility::default();
        let mut state_mutability = StateMutability::default();
        let mut is_virtual = false;
        let mut overrides = false;
        let mut modifiers: Vec<ModifierInvocation> = Vec::new();
        let mut parameters = Vec::new();

        self.push_scope();

        let scope = ExprScope {
            function: Some(id),
            contract: Some(contract_id),
            source_unit: unit_id,
            ..Default::default()
        };

        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        for child in &children {
            match child.kind() {
                "visibility" => visibility = parse_visibility(&node_text(*child, source)),
                "state_mutability" => {
                    state_mutability = parse_mutability(&node_text(*child, source))
                }
                "virtual" => is_virtual = true,
                "override_specifier" => overrides = true,
                "modifier_invocation" => {
                    let index = modifiers.len();
                    let invocation = self.parse_modifier_invocation(*child, source, scope);
                    self.pending_modifiers.push(crate::resolve::PendingModifier {
                        function_id: id,
                        index,
                        name: invocation.name.clone(),
                        contract: self.current_contract.clone(),
                    });
                    modifiers.push(invocation);
                }
                "parameter" => {
                    let parameter = self.parse_parameter(*child, source, id);
                    self.declare_local(
                        &parameter.name,
                        parameter.id,
                        parameter.type_description.clone(),
                    );
                    parameters.push(Node::Parameter(parameter));
                }
                _ => match node_text(*child, source).as_str() {
                    "public" => visibility = Visibility::Public,
                    "external" => visibility = Visibility::External,
                    "internal" => visibility = Visibility::Internal,
                    "private" => visibility = Visibility::Private,
                    "pure" => state_mutability = StateMutability::Pure,
                    "view" => state_mutability = StateMutability::View,
                    "payable" => state_mutability = StateMutability::Payable,
                    _ => {}
                },
            }
        }

        let mut return_parameters = Vec::new();
        let return_ctx = ctx.child_by_field_name("return_type").or_else(|| {
            children
                .iter()
                .copied()
                .find(|c| c.kind() == "return_type_definition")
        });
        if let Some(return_ctx) = return_ctx {
            let mut cursor = return_ctx.walk();
            for child in return_ctx.children(&mut cursor) {
                if child.kind() == "parameter" {
                    let parameter = self.parse_parameter(child, source, id);
                    return_parameters.push(Node::Parameter(parameter));
                } else if is_type_kind(child.kind()) {
                    // Bare `returns (type)` without a parameter wrapper.
                    let parameter = self.parameter_from_type(child, source, id);
                    return_parameters.push(Node::Parameter(parameter));
                }
            }
        }

        let body_ctx = ctx.child_by_field_name("body").or_else(|| {
            children
                .iter()
                .copied()
                .find(|c| c.kind() == "function_body")
        });
        let body = body_ctx.map(|b| Box::new(self.parse_block(b, source, scope, id)));
        let implemented = body.is_some();

        self.pop_scope();

        let param_tds: Vec<TypeDescription> = parameters
            .iter()
            .filter_map(|p| p.type_description().cloned())
            .collect();
        let return_tds: Vec<TypeDescription> = return_parameters
            .iter()
            .filter_map(|p| p.type_description().cloned())
            .collect();
        let member_td = TypeDescription::function_type(
            visibility_str(visibility),
            mutability_str(state_mutability),
            &param_tds,
            &return_tds,
        );
        if !name.is_empty() {
            self.add_member(&name, id, member_td);
        }

        FunctionDefinition {
            id,
            src,
            name,
            kind,
            visibility,
            state_mutability,
            is_virtual,
            overrides,
            implemented,
            modifiers,
            parameters,
            return_parameters,
            body,
        }
    }

    fn parse_modifier_invocation(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
    ) -> ModifierInvocation {
        let mut cursor = ctx.walk();
        let name = ctx
            .children(&mut cursor)
            .find(|c| c.kind() == "identifier" || c.kind() == "identifier_path")
            .map(|n| node_text(n, source))
            .unwrap_or_default();

        let arguments = self
            .call_argument_ctxs(ctx)
            .into_iter()
            .map(|arg| self.parse_expression(arg, source, scope))
            .collect();

        ModifierInvocation {
            name,
            referenced_declaration: 0,
            arguments,
        }
    }

    fn parse_modifier(
        &mut self,
        ctx: ParseNode,
        source: &str,
        unit_id: i64,
        contract_id: i64,
    ) -> ModifierDefinition {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, contract_id);
        let name = ctx
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_default();

        self.push_scope();

        let mut is_virtual = false;
        let mut parameters = Vec::new();
        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        for child in &children {
            match child.kind() {
                "virtual" => is_virtual = true,
                "parameter" => {
                    let parameter = self.parse_parameter(*child, source, id);
                    self.declare_local(
                        &parameter.name,
                        parameter.id,
                        parameter.type_description.clone(),
                    );
                    parameters.push(Node::Parameter(parameter));
                }
                _ => {}
            }
        }

        let scope = ExprScope {
            function: Some(id),
            contract: Some(contract_id),
            source_unit: unit_id,
            ..Default::default()
        };
        let body_ctx = ctx.child_by_field_name("body").or_else(|| {
            children
                .iter()
                .copied()
                .find(|c| c.kind() == "function_body")
        });
        let body = body_ctx.map(|b| Box::new(self.parse_block(b, source, scope, id)));
        let implemented = body.is_some();

        self.pop_scope();

        if !name.is_empty() {
            self.add_member(&name, id, TypeDescription::new("t_modifier", "modifier"));
        }

        ModifierDefinition {
            id,
            src,
            name,
            is_virtual,
            implemented,
            parameters,
            body,
        }
    }

    pub(crate) fn parse_parameter(
        &mut self,
        ctx: ParseNode,
        source: &str,
        parent: i64,
    ) -> Parameter {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, parent);

        let type_ctx = ctx.child_by_field_name("type").or_else(|| {
            let mut cursor = ctx.walk();
            let found = ctx.children(&mut cursor).find(|c| is_type_kind(c.kind()));
            found
        });
        let (type_name, type_description) = match type_ctx {
            Some(t) => resolve_type_node(t, source, &self.registry),
            None => (String::new(), TypeDescription::unknown()),
        };

        let type_end = type_ctx.map(|t| t.end_byte()).unwrap_or(0);
        let name = ctx
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .or_else(|| {
                // The type itself may contain identifiers; only a trailing
                // identifier names the parameter.
                let mut cursor = ctx.walk();
                ctx.children(&mut cursor)
                    .filter(|c| c.kind() == "identifier" && c.start_byte() >= type_end)
                    .last()
                    .map(|n| node_text(n, source))
            })
            .unwrap_or_default();

        let mut storage_location = StorageLocation::Default;
        let mut indexed = false;
        let mut cursor = ctx.walk();
        for child in ctx.children(&mut cursor) {
            match node_text(child, source).as_str() {
                "memory" => storage_location = StorageLocation::Memory,
                "storage" => storage_location = StorageLocation::Storage,
                "calldata" => storage_location = StorageLocation::Calldata,
                "indexed" => indexed = true,
                _ => {}
            }
        }

        Parameter {
            id,
            src,
            name,
            type_name,
            type_description,
            storage_location,
            indexed,
        }
    }

    /// Parameter node for a bare type in a `returns (...)` list.
    fn parameter_from_type(&mut self, ctx: ParseNode, source: &str, parent: i64) -> Parameter {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, parent);
        let (type_name, type_description) = resolve_type_node(ctx, source, &self.registry);
        Parameter {
            id,
            src,
            name: String::new(),
            type_name,
            type_description,
            storage_location: StorageLocation::Default,
            indexed: false,
        }
    }

    fn parse_state_variable(
        &mut self,
        ctx: ParseNode,
        source: &str,
        unit_id: i64,
        contract_id: i64,
    ) -> VariableDeclaration {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, contract_id);

        let type_ctx = ctx.child_by_field_name("type").or_else(|| {
            let mut cursor = ctx.walk();
            let found = ctx.children(&mut cursor).find(|c| is_type_kind(c.kind()));
            found
        });
        let (type_name, type_description) = match type_ctx {
            Some(t) => resolve_type_node(t, source, &self.registry),
            None => (String::new(), TypeDescription::unknown()),
        };

        let type_end = type_ctx.map(|t| t.end_byte()).unwrap_or(0);
        let name = ctx
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .or_else(|| {
                let mut cursor = ctx.walk();
                ctx.children(&mut cursor)
                    .filter(|c| c.kind() == "identifier" && c.start_byte() >= type_end)
                    .last()
                    .map(|n| node_text(n, source))
            })
            .unwrap_or_default();

        let mut visibility = Visibility::Internal;
        let mut mutability = Mutability::Mutable;
        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        for child in &children {
            match node_text(*child, source).as_str() {
                "public" => visibility = Visibility::Public,
                "private" => visibility = Visibility::Private,
                "internal" => visibility = Visibility::Internal,
                "constant" => mutability = Mutability::Constant,
                "immutable" => mutability = Mutability::Immutable,
                _ => {}
            }
        }

        let scope = ExprScope {
            variable_declaration: Some(id),
            contract: Some(contract_id),
            source_unit: unit_id,
            ..Default::default()
        };
        let initial_value = ctx
            .child_by_field_name("value")
            .or_else(|| {
                let mut after_assign = false;
                for child in &children {
                    if !child.is_named() && node_text(*child, source) == "=" {
                        after_assign = true;
                        continue;
                    }
                    if after_assign && child.is_named() {
                        return Some(*child);
                    }
                }
                None
            })
            .map(|value| Box::new(self.parse_expression(value, source, scope)));

        if !name.is_empty() {
            self.add_member(&name, id, type_description.clone());
        }

        VariableDeclaration {
            id,
            src,
            name,
            state_variable: true,
            visibility,
            mutability,
            storage_location: StorageLocation::Default,
            type_name,
            type_description,
            initial_value,
        }
    }

    fn parse_struct(&mut self, ctx: ParseNode, source: &str, contract_id: i64) -> StructDefinition {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, contract_id);
        let name = ctx
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .unwrap_or_default();
        let canonical_name = format!("{}.{}", self.current_unit_name, name);
        let type_description =
            TypeDescription::struct_type(&self.current_contract, &name, id);

        // Register before the members parse so self-referential fields
        // resolve.
        self.registry.register(
            &name,
            solir_ast::Definition {
                id,
                kind: solir_ast::DefinitionKind::Struct,
                canonical_name: canonical_name.clone(),
                type_description: type_description.clone(),
            },
        );
        self.add_member(&name, id, type_description.clone());

        let mut members = Vec::new();
        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        for child in children {
            if child.kind() != "struct_member" {
                continue;
            }
            let member_id = self.ids.next_id();
            let member_src = self.src_for(child, id);
            let type_ctx = child.child_by_field_name("type").or_else(|| {
                let mut cursor = child.walk();
                let found = child.children(&mut cursor).find(|c| is_type_kind(c.kind()));
                found
            });
            let (type_name, member_td) = match type_ctx {
                Some(t) => resolve_type_node(t, source, &self.registry),
                None => (String::new(), TypeDescription::unknown()),
            };
            let type_end = type_ctx.map(|t| t.end_byte()).unwrap_or(0);
            let member_name = child
                .child_by_field_name("name")
                .map(|n| node_text(n, source))
                .or_else(|| {
                    let mut cursor = child.walk();
                    child
                        .children(&mut cursor)
                        .filter(|c| c.kind() == "identifier" && c.start_byte() >= type_end)
                        .last()
                        .map(|n| node_text(n, source))
                })
                .unwrap_or_default();

            members.push(Node::VariableDeclaration(VariableDeclaration {
                id: member_id,
                src: member_src,
                name: member_name,
                state_variable: false,
                visibility: Visibility::Internal,
                mutability: Mutability::Mutable,
                storage_location: StorageLocation::Default,
                type_name,
                type_description: member_td,
                initial_value: None,
            }));
        }

        StructDefinition {
            id,
            src,
            name,
            canonical_name,
            type_description,
            members,
        }
    }

    fn parse_enum(&mut self, ctx: ParseNode, source: &str, contract_id: i64) -> EnumDefinition {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, contract_id);
        let name_ctx = ctx.child_by_field_name("name");
        let name = name_ctx
            .map(|n| node_text(n, source))
            .unwrap_or_default();
        let canonical_name = format!("{}.{}", self.current_unit_name, name);
        let type_description = TypeDescription::enum_type(&name, &canonical_name, id);

        self.registry.register(
            &name,
            solir_ast::Definition {
                id,
                kind: solir_ast::DefinitionKind::Enum,
                canonical_name: canonical_name.clone(),
                type_description: type_description.clone(),
            },
        );
        self.add_member(&name, id, type_description.clone());

        let mut members = Vec::new();
        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        for child in children {
            let is_value = child.kind() == "enum_value"
                || (child.kind() == "identifier"
                    && name_ctx.map(|n| n.id() != child.id()).unwrap_or(true));
            if !is_value {
                continue;
            }
            let member_id = self.ids.next_id();
            let member_src = self.src_for(child, id);
            let member_name = node_text(child, source);
            let member_td = TypeDescription::enum_member(&name, &canonical_name, &member_name, member_id);
            members.push(Node::EnumValue(EnumValue {
                id: member_id,
                src: member_src,
                name: member_name,
                type_description: member_td,
            }));
        }

        EnumDefinition {
            id,
            src,
            name,
            canonical_name,
            type_description,
            members,
        }
    }

    fn parse_event(&mut self, ctx: ParseNode, source: &str, contract_id: i64) -> EventDefinition {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, contract_id);
        let name = ctx
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .or_else(|| {
                let mut cursor = ctx.walk();
                let found = ctx.children(&mut cursor)
                    .find(|c| c.kind() == "identifier")
                    .map(|n| node_text(n, source));
                found
            })
            .unwrap_or_default();

        let mut anonymous = false;
        let mut parameters = Vec::new();
        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        for child in children {
            // Both spellings occur across grammar versions.
            if child.kind().contains("param") {
                let parameter = self.parse_parameter(child, source, id);
                parameters.push(Node::Parameter(parameter));
            } else if node_text(child, source) == "anonymous" {
                anonymous = true;
            }
        }

        if !name.is_empty() {
            self.add_member(
                &name,
                id,
                TypeDescription::new(format!("t_event$_{}_${}", name, id), format!("event {}", name)),
            );
        }

        EventDefinition {
            id,
            src,
            name,
            anonymous,
            parameters,
        }
    }

    fn parse_error(&mut self, ctx: ParseNode, source: &str, contract_id: i64) -> ErrorDefinition {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, contract_id);
        let name = ctx
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
            .or_else(|| {
                let mut cursor = ctx.walk();
                let found = ctx.children(&mut cursor)
                    .find(|c| c.kind() == "identifier")
                    .map(|n| node_text(n, source));
                found
            })
            .unwrap_or_default();

        let mut parameters = Vec::new();
        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        for child in children {
            if child.kind().contains("param") {
                let parameter = self.parse_parameter(child, source, id);
                parameters.push(Node::Parameter(parameter));
            }
        }

        if !name.is_empty() {
            self.add_member(
                &name,
                id,
                TypeDescription::new(format!("t_error$_{}_${}", name, id), format!("error {}", name)),
            );
        }

        ErrorDefinition {
            id,
            src,
            name,
            parameters,
        }
    }
}

fn parse_visibility(text: &str) -> Visibility {
    match text {
        "public" => Visibility::Public,
        "external" => Visibility::External,
        "private" => Visibility::Private,
        _ => Visibility::Internal,
    }
}

fn parse_mutability(text: &str) -> StateMutability {
    match text {
        "pure" => StateMutability::Pure,
        "view" => StateMutability::View,
        "payable" => StateMutability::Payable,
        _ => StateMutability::Nonpayable,
    }
}

fn visibility_str(v: Visibility) -> &'static str {
    match v {
        Visibility::Public => "public",
        Visibility::External => "external",
        Visibility::Internal => "internal",
        Visibility::Private => "private",
    }
}

fn mutability_str(m: StateMutability) -> &'static str {
    match m {
        StateMutability::Pure => "pure",
        StateMutability::View => "view",
        StateMutability::Payable => "payable",
        StateMutability::Nonpayable => "nonpayable",
    }
}
