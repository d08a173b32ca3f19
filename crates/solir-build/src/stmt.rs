use crate::builder::AstBuilder;
use crate::expr::ExprScope;
use crate::type_resolver::{is_type_kind, node_text, resolve_type_node};
use solir_ast::{
    Assembly, Block, EmitStatement, ExpressionStatement, ForStatement, IfStatement, Mutability,
    Node, ReturnStatement, RevertStatement, StorageLocation, TryStatement, TypeDescription,
    VariableDeclaration, Visibility, WhileStatement,
};
use tree_sitter::Node as ParseNode;

impl AstBuilder {
    pub(crate) fn parse_block(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
        parent: i64,
    ) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, parent);
        let inner = scope.with_body(id);

        self.push_scope();
        let mut statements = Vec::new();
        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        for child in children {
            if !child.is_named() || child.kind() == "comment" {
                continue;
            }
            if let Some(statement) = self.parse_statement(child, source, inner, id) {
                statements.push(statement);
            }
        }
        self.pop_scope();

        Node::Block(Block {
            id,
            src,
            statements,
        })
    }

    pub(crate) fn empty_block(&mut self, ctx: ParseNode, parent: i64) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, parent);
        Node::Block(Block {
            id,
            src,
            statements: Vec::new(),
        })
    }

    pub(crate) fn parse_statement(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
        parent: i64,
    ) -> Option<Node> {
        // Some grammar versions wrap each statement in a `statement` node.
        let ctx = if ctx.kind() == "statement" && ctx.child_count() > 0 {
            ctx.child(0)?
        } else {
            ctx
        };

        match ctx.kind() {
            "block_statement" | "statement_block" | "block" | "function_body"
            | "unchecked_block" => Some(self.parse_block(ctx, source, scope, parent)),
            "expression_statement" => {
                let expr_ctx = ctx.child(0)?;
                let id = self.ids.next_id();
                let src = self.src_for(ctx, parent);
                let expression =
                    self.parse_expression(expr_ctx, source, scope.with_expression(id));
                Some(Node::ExpressionStatement(ExpressionStatement {
                    id,
                    src,
                    expression: Box::new(expression),
                }))
            }
            "variable_declaration_statement" => {
                Some(self.parse_local_declaration(ctx, source, scope, parent))
            }
            "if_statement" => Some(self.parse_if(ctx, source, scope, parent)),
            "for_statement" => Some(self.parse_for(ctx, source, scope, parent)),
            "while_statement" | "do_while_statement" => {
                let condition_ctx = ctx.child_by_field_name("condition")?;
                let id = self.ids.next_id();
                let src = self.src_for(ctx, parent);
                let condition =
                    self.parse_expression(condition_ctx, source, scope.with_expression(id));
                let body = self
                    .statement_body(ctx, source, scope, id, &["body"])
                    .unwrap_or_else(|| self.empty_block(ctx, id));
                Some(Node::WhileStatement(WhileStatement {
                    id,
                    src,
                    condition: Box::new(condition),
                    body: Box::new(body),
                }))
            }
            "return_statement" => {
                let id = self.ids.next_id();
                let src = self.src_for(ctx, parent);
                let expression = first_named(ctx)
                    .map(|e| Box::new(self.parse_expression(e, source, scope.with_expression(id))));
                Some(Node::ReturnStatement(ReturnStatement {
                    id,
                    src,
                    expression,
                }))
            }
            "emit_statement" => {
                let call = first_named(ctx)?;
                let id = self.ids.next_id();
                let src = self.src_for(ctx, parent);
                let expression =
                    self.parse_invocation(ctx, call, source, scope.with_expression(id));
                Some(Node::EmitStatement(EmitStatement {
                    id,
                    src,
                    expression: Box::new(expression),
                }))
            }
            "revert_statement" => {
                let id = self.ids.next_id();
                let src = self.src_for(ctx, parent);
                let expression = first_named(ctx).map(|e| {
                    Box::new(self.parse_invocation(ctx, e, source, scope.with_expression(id)))
                });
                Some(Node::RevertStatement(RevertStatement {
                    id,
                    src,
                    expression,
                }))
            }
            "try_statement" => Some(self.parse_try(ctx, source, scope, parent)),
            "assembly_statement" => {
                let id = self.ids.next_id();
                let src = self.src_for(ctx, parent);
                Some(Node::Assembly(Assembly {
                    id,
                    src,
                    body: node_text(ctx, source),
                }))
            }
            _ => None,
        }
    }

    fn parse_local_declaration(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
        parent: i64,
    ) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, parent);

        let declaration = ctx.child_by_field_name("declaration").or_else(|| {
            let mut cursor = ctx.walk();
            let found = ctx.children(&mut cursor)
                .find(|c| c.kind() == "variable_declaration" || c.kind() == "variable_declaration_tuple");
            found
        });

        let mut type_name = String::new();
        let mut type_description = TypeDescription::unknown();
        let mut name = String::new();
        let mut storage_location = StorageLocation::Default;

        if let Some(declaration) = declaration {
            let type_ctx = declaration.child_by_field_name("type").or_else(|| {
                let mut cursor = declaration.walk();
                let found = declaration
                    .children(&mut cursor)
                    .find(|c| is_type_kind(c.kind()));
                found
            });
            if let Some(type_ctx) = type_ctx {
                let resolved = resolve_type_node(type_ctx, source, &self.registry);
                type_name = resolved.0;
                type_description = resolved.1;
            }
            let type_end = type_ctx.map(|t| t.end_byte()).unwrap_or(0);
            name = declaration
                .child_by_field_name("name")
                .map(|n| node_text(n, source))
                .or_else(|| {
                    let mut cursor = declaration.walk();
                    declaration
                        .children(&mut cursor)
                        .filter(|c| c.kind() == "identifier" && c.start_byte() >= type_end)
                        .last()
                        .map(|n| node_text(n, source))
                })
                .unwrap_or_default();
            let mut cursor = declaration.walk();
            for child in declaration.children(&mut cursor) {
                match node_text(child, source).as_str() {
                    "memory" => storage_location = StorageLocation::Memory,
                    "storage" => storage_location = StorageLocation::Storage,
                    "calldata" => storage_location = StorageLocation::Calldata,
                    _ => {}
                }
            }
        }

        let value_scope = ExprScope {
            variable_declaration: Some(id),
            ..scope
        };
        let initial_value = ctx
            .child_by_field_name("value")
            .or_else(|| {
                let mut cursor = ctx.walk();
                let mut after_assign = false;
                let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
                for child in children {
                    if !child.is_named() && node_text(child, source) == "=" {
                        after_assign = true;
                        continue;
                    }
                    if after_assign && child.is_named() {
                        return Some(child);
                    }
                }
                None
            })
            .map(|value| Box::new(self.parse_expression(value, source, value_scope)));

        if !name.is_empty() {
            self.declare_local(&name, id, type_description.clone());
        }

        Node::VariableDeclaration(VariableDeclaration {
            id,
            src,
            name,
            state_variable: false,
            visibility: Visibility::Internal,
            mutability: Mutability::Mutable,
            storage_location,
            type_name,
            type_description,
            initial_value,
        })
    }

    fn parse_if(&mut self, ctx: ParseNode, source: &str, scope: ExprScope, parent: i64) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, parent);

        let condition = ctx
            .child_by_field_name("condition")
            .map(|c| self.parse_expression(c, source, scope.with_expression(id)))
            .unwrap_or_else(|| self.unresolved_identifier(ctx, source, scope.with_expression(id)));

        let body = self
            .statement_body(ctx, source, scope, id, &["body", "consequence"])
            .unwrap_or_else(|| self.empty_block(ctx, id));

        let else_ctx = ctx
            .child_by_field_name("else")
            .or_else(|| ctx.child_by_field_name("alternative"));
        let else_body = else_ctx.and_then(|e| {
            // `else` may arrive wrapped in an else-clause node.
            let target = if e.kind() == "else_clause" && e.child_count() > 0 {
                e.child(e.child_count() - 1)?
            } else {
                e
            };
            self.parse_statement(target, source, scope, id)
        });

        Node::IfStatement(IfStatement {
            id,
            src,
            condition: Box::new(condition),
            body: Box::new(body),
            else_body: else_body.map(Box::new),
        })
    }

    fn parse_for(&mut self, ctx: ParseNode, source: &str, scope: ExprScope, parent: i64) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, parent);

        let initializer = ctx
            .child_by_field_name("initial")
            .and_then(|c| self.parse_statement(c, source, scope, id));
        let condition = ctx.child_by_field_name("condition").map(|c| {
            let c = if c.kind() == "expression_statement" && c.child_count() > 0 {
                c.child(0).unwrap_or(c)
            } else {
                c
            };
            self.parse_expression(c, source, scope.with_expression(id))
        });
        let update = ctx
            .child_by_field_name("update")
            .map(|c| self.parse_expression(c, source, scope.with_expression(id)));
        let body = self
            .statement_body(ctx, source, scope, id, &["body"])
            .unwrap_or_else(|| self.empty_block(ctx, id));

        Node::ForStatement(ForStatement {
            id,
            src,
            initializer: initializer.map(Box::new),
            condition: condition.map(Box::new),
            update: update.map(Box::new),
            body: Box::new(body),
        })
    }

    fn parse_try(&mut self, ctx: ParseNode, source: &str, scope: ExprScope, parent: i64) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, parent);

        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();

        let expression = ctx
            .child_by_field_name("attempt")
            .or_else(|| {
                children
                    .iter()
                    .copied()
                    .find(|c| c.is_named() && c.kind().ends_with("expression"))
            })
            .map(|e| self.parse_expression(e, source, scope.with_expression(id)))
            .unwrap_or_else(|| self.unresolved_identifier(ctx, source, scope.with_expression(id)));

        let body = children
            .iter()
            .copied()
            .find(|c| matches!(c.kind(), "function_body" | "block_statement" | "block"))
            .map(|b| self.parse_block(b, source, scope, id))
            .unwrap_or_else(|| self.empty_block(ctx, id));

        let mut catch_clauses = Vec::new();
        for child in children {
            if child.kind() == "catch_clause" {
                let mut inner = child.walk();
                let block = child
                    .children(&mut inner)
                    .find(|c| matches!(c.kind(), "function_body" | "block_statement" | "block"));
                if let Some(block) = block {
                    catch_clauses.push(self.parse_block(block, source, scope, id));
                }
            }
        }

        Node::TryStatement(TryStatement {
            id,
            src,
            expression: Box::new(expression),
            body: Box::new(body),
            catch_clauses,
        })
    }

    /// Resolves a statement body by field name, falling back to the first
    /// statement-shaped named child after the condition.
    fn statement_body(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
        parent: i64,
        fields: &[&str],
    ) -> Option<Node> {
        for field in fields {
            if let Some(body) = ctx.child_by_field_name(field) {
                return self.parse_statement(body, source, scope, parent);
            }
        }
        let mut cursor = ctx.walk();
        let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
        let body = children.into_iter().find(|c| {
            matches!(
                c.kind(),
                "statement" | "block_statement" | "statement_block" | "block" | "function_body"
            )
        })?;
        self.parse_statement(body, source, scope, parent)
    }
}

pub(crate) fn first_named(ctx: ParseNode) -> Option<ParseNode> {
    let mut cursor = ctx.walk();
    let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
    children.into_iter().find(|c| c.is_named())
}
