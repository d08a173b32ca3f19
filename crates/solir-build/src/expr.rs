use crate::builder::AstBuilder;
use crate::resolve::PendingReference;
use crate::type_resolver::{is_type_kind, node_text, resolve_type_node, resolve_type_text};
use solir_ast::{
    Assignment, BinaryOperation, Conditional, FunctionCall, Identifier, IndexAccess, Literal,
    LiteralKind, MemberAccess, NewExpression, Node, NodeType, TupleExpression, TypeConversion,
    TypeDescription, UnaryOperation,
};
use tree_sitter::Node as ParseNode;

/// Enclosing context for expression parsing. `parent_id` walks the priority
/// list from tightest to loosest: variable declaration, enclosing
/// expression, body block, function, contract, source unit.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ExprScope {
    pub variable_declaration: Option<i64>,
    pub expression: Option<i64>,
    pub body: Option<i64>,
    pub function: Option<i64>,
    pub contract: Option<i64>,
    pub source_unit: i64,
}

impl ExprScope {
    pub fn parent_id(&self) -> i64 {
        self.variable_declaration
            .or(self.expression)
            .or(self.body)
            .or(self.function)
            .or(self.contract)
            .unwrap_or(self.source_unit)
    }

    pub fn with_expression(mut self, id: i64) -> Self {
        self.expression = Some(id);
        self
    }

    pub fn with_body(mut self, id: i64) -> Self {
        self.body = Some(id);
        self
    }
}

/// Globals and built-in functions never resolve to a declaration and should
/// not produce resolution warnings.
const BUILTINS: &[&str] = &[
    "msg", "block", "tx", "abi", "this", "super", "now", "require", "assert", "revert",
    "keccak256", "sha256", "ripemd160", "ecrecover", "addmod", "mulmod", "selfdestruct",
    "gasleft", "blockhash", "type", "payable", "_",
];

impl AstBuilder {
    pub(crate) fn parse_expression(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
    ) -> Node {
        let ctx = unwrap_expression(ctx);

        match ctx.kind() {
            "binary_expression" => self.parse_binary(ctx, source, scope),
            "unary_expression" | "update_expression" => self.parse_unary(ctx, source, scope),
            "assignment_expression" | "augmented_assignment_expression" => {
                self.parse_assignment(ctx, source, scope)
            }
            "call_expression" | "function_call_expression" | "struct_expression" => {
                self.parse_call(ctx, source, scope)
            }
            "member_expression" | "member_access_expression" => {
                self.parse_member_access(ctx, source, scope)
            }
            "array_access" | "index_access_expression" | "subscript_expression"
            | "index_expression" => self.parse_index_access(ctx, source, scope),
            "parenthesized_expression" | "tuple_expression" => {
                self.parse_tuple(ctx, source, scope)
            }
            "ternary_expression" | "conditional_expression" => {
                self.parse_conditional(ctx, source, scope)
            }
            "number_literal" | "hex_number" => {
                self.literal(ctx, source, scope, LiteralKind::Number)
            }
            "string_literal" | "unicode_string_literal" => {
                self.literal(ctx, source, scope, LiteralKind::String)
            }
            "hex_string_literal" => self.literal(ctx, source, scope, LiteralKind::HexString),
            "boolean_literal" | "true" | "false" => {
                self.literal(ctx, source, scope, LiteralKind::Bool)
            }
            "identifier" => self.parse_identifier(ctx, source, scope),
            "new_expression" => self.parse_new(ctx, source, scope),
            "type_cast_expression" => self.parse_type_cast(ctx, source, scope),
            "payable_conversion_expression" => self.parse_payable_conversion(ctx, source, scope),
            "call_argument" => match first_named_child(ctx) {
                Some(inner) => self.parse_expression(inner, source, scope),
                None => self.unresolved_identifier(ctx, source, scope),
            },
            _ => {
                // A single named child usually means a thin wrapper rule.
                let named: Vec<ParseNode> = named_children(ctx);
                if named.len() == 1 {
                    self.parse_expression(named[0], source, scope)
                } else {
                    self.unresolved_identifier(ctx, source, scope)
                }
            }
        }
    }

    /// Emit and revert statements carry the callee expression and the
    /// argument list as siblings rather than a nested call; reassemble them
    /// into one call node.
    pub(crate) fn parse_invocation(
        &mut self,
        stmt_ctx: ParseNode,
        callee_ctx: ParseNode,
        source: &str,
        scope: ExprScope,
    ) -> Node {
        let callee = unwrap_expression(callee_ctx);
        if matches!(callee.kind(), "call_expression" | "function_call_expression") {
            return self.parse_expression(callee, source, scope);
        }

        let id = self.ids.next_id();
        let src = self.src_for(stmt_ctx, scope.parent_id());
        let child_scope = scope.with_expression(id);

        let expression = self.parse_expression(callee, source, child_scope);
        let arguments: Vec<Node> = self
            .call_argument_ctxs(stmt_ctx)
            .into_iter()
            .map(|arg| self.parse_expression(arg, source, child_scope))
            .collect();

        Node::FunctionCall(FunctionCall {
            id,
            src,
            expression: Box::new(expression),
            arguments,
            type_description: TypeDescription::unknown(),
        })
    }

    /// Fallback node for contexts with no usable expression shape. Keeps the
    /// raw text as the name so nothing is silently dropped.
    pub(crate) fn unresolved_identifier(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
    ) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        Node::Identifier(Identifier {
            id,
            src,
            name: node_text(ctx, source),
            referenced_declaration: 0,
            type_description: TypeDescription::unknown(),
        })
    }

    fn parse_identifier(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let name = node_text(ctx, source);
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());

        let (referenced_declaration, type_description) =
            if let Some(entry) = self.lookup_local(&name) {
                (entry.id, entry.type_description.clone())
            } else if BUILTINS.contains(&name.as_str()) {
                (0, TypeDescription::magic(&name))
            } else {
                // Forward references are legal at contract scope; the second
                // pass settles these against the full registry.
                self.pending.push(PendingReference {
                    node_id: id,
                    name: name.clone(),
                    contract: self.current_contract.clone(),
                });
                (0, TypeDescription::unknown())
            };

        Node::Identifier(Identifier {
            id,
            src,
            name,
            referenced_declaration,
            type_description,
        })
    }

    fn parse_binary(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let operator = ctx
            .child_by_field_name("operator")
            .map(|n| node_text(n, source))
            .or_else(|| ctx.child(1).map(|n| node_text(n, source)))
            .unwrap_or_default();

        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let child_scope = scope.with_expression(id);

        // Same-operator chains parse left-nested; flatten them into one node
        // so `a + b + c` carries three operands.
        let mut operand_ctxs = Vec::new();
        collect_operands(ctx, &operator, source, &mut operand_ctxs);

        let expressions: Vec<Node> = operand_ctxs
            .into_iter()
            .map(|operand| self.parse_expression(operand, source, child_scope))
            .collect();
        let type_descriptions: Vec<TypeDescription> = expressions
            .iter()
            .map(|e| {
                e.type_description()
                    .cloned()
                    .unwrap_or_else(TypeDescription::unknown)
            })
            .collect();

        let node_type = binary_node_type(&operator);
        let type_description = binary_result_type(node_type, &type_descriptions);

        let payload = BinaryOperation {
            id,
            src,
            operator,
            expressions,
            type_descriptions,
            type_description,
        };

        match node_type {
            NodeType::AddOperation => Node::AddOperation(payload),
            NodeType::SubtractOperation => Node::SubtractOperation(payload),
            NodeType::MultiplyOperation => Node::MultiplyOperation(payload),
            NodeType::DivideOperation => Node::DivideOperation(payload),
            NodeType::ModuloOperation => Node::ModuloOperation(payload),
            NodeType::ExponentOperation => Node::ExponentOperation(payload),
            NodeType::BitAndOperation => Node::BitAndOperation(payload),
            NodeType::BitOrOperation => Node::BitOrOperation(payload),
            NodeType::BitXorOperation => Node::BitXorOperation(payload),
            NodeType::ShiftLeftOperation => Node::ShiftLeftOperation(payload),
            NodeType::ShiftRightOperation => Node::ShiftRightOperation(payload),
            NodeType::LogicalAndOperation => Node::LogicalAndOperation(payload),
            NodeType::LogicalOrOperation => Node::LogicalOrOperation(payload),
            NodeType::EqualityOperation => Node::EqualityOperation(payload),
            _ => Node::ComparisonOperation(payload),
        }
    }

    fn parse_unary(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());

        let operand_ctx = ctx
            .child_by_field_name("argument")
            .or_else(|| ctx.child_by_field_name("operand"))
            .or_else(|| first_named_child(ctx));
        let operator = ctx
            .child_by_field_name("operator")
            .map(|n| node_text(n, source))
            .or_else(|| {
                let mut cursor = ctx.walk();
                let found = ctx.children(&mut cursor)
                    .find(|c| !c.is_named())
                    .map(|n| node_text(n, source));
                found
            })
            .unwrap_or_default();
        let prefix = ctx
            .child(0)
            .map(|c| !c.is_named())
            .unwrap_or(true);

        let expression = match operand_ctx {
            Some(operand) => self.parse_expression(operand, source, scope.with_expression(id)),
            None => self.unresolved_identifier(ctx, source, scope.with_expression(id)),
        };
        let type_description = if operator == "!" {
            TypeDescription::bool()
        } else {
            expression
                .type_description()
                .cloned()
                .unwrap_or_else(TypeDescription::unknown)
        };

        Node::UnaryOperation(UnaryOperation {
            id,
            src,
            operator,
            prefix,
            expression: Box::new(expression),
            type_description,
        })
    }

    fn parse_assignment(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let child_scope = scope.with_expression(id);

        let left_ctx = ctx.child_by_field_name("left").or_else(|| ctx.child(0));
        let right_ctx = ctx
            .child_by_field_name("right")
            .or_else(|| ctx.child(ctx.child_count().saturating_sub(1)));
        let operator = ctx
            .child(1)
            .filter(|c| !c.is_named())
            .map(|n| node_text(n, source))
            .unwrap_or_else(|| "=".to_string());

        let left = match left_ctx {
            Some(l) => self.parse_expression(l, source, child_scope),
            None => self.unresolved_identifier(ctx, source, child_scope),
        };
        let right = match right_ctx {
            Some(r) => self.parse_expression(r, source, child_scope),
            None => self.unresolved_identifier(ctx, source, child_scope),
        };

        let type_description = left
            .type_description()
            .cloned()
            .unwrap_or_else(TypeDescription::unknown);

        Node::Assignment(Assignment {
            id,
            src,
            operator,
            left: Box::new(left),
            right: Box::new(right),
            type_description,
        })
    }

    fn parse_call(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let callee_ctx = ctx
            .child_by_field_name("function")
            .or_else(|| ctx.child(0))
            .map(unwrap_expression);

        let argument_ctxs = self.call_argument_ctxs(ctx);

        // `address(x)` and friends are conversions, not calls.
        if let Some(callee) = callee_ctx {
            let callee_text = node_text(callee, source);
            let elementary = callee.kind() == "primitive_type"
                || (callee.kind() == "identifier" && is_elementary_type_name(&callee_text));
            if elementary && argument_ctxs.len() == 1 {
                return self.type_conversion(ctx, source, scope, &callee_text, argument_ctxs[0]);
            }
        }

        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let child_scope = scope.with_expression(id);

        let expression = match callee_ctx {
            Some(callee) => self.parse_expression(callee, source, child_scope),
            None => self.unresolved_identifier(ctx, source, child_scope),
        };
        let arguments: Vec<Node> = argument_ctxs
            .into_iter()
            .map(|arg| self.parse_expression(arg, source, child_scope))
            .collect();

        Node::FunctionCall(FunctionCall {
            id,
            src,
            expression: Box::new(expression),
            arguments,
            type_description: TypeDescription::unknown(),
        })
    }

    fn type_conversion(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
        type_text: &str,
        argument: ParseNode,
    ) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let (type_name, type_description) = resolve_type_text(type_text, &self.registry);
        let expression = self.parse_expression(argument, source, scope.with_expression(id));
        Node::TypeConversion(TypeConversion {
            id,
            src,
            type_name,
            expression: Box::new(expression),
            type_description,
        })
    }

    fn parse_payable_conversion(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
    ) -> Node {
        let argument = self
            .call_argument_ctxs(ctx)
            .into_iter()
            .next()
            .or_else(|| first_named_child(ctx));
        match argument {
            Some(argument) => self.type_conversion(ctx, source, scope, "address", argument),
            None => self.unresolved_identifier(ctx, source, scope),
        }
    }

    fn parse_type_cast(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let type_ctx = named_children(ctx).into_iter().find(|c| is_type_kind(c.kind()));
        let argument = named_children(ctx)
            .into_iter()
            .find(|c| !is_type_kind(c.kind()));
        match (type_ctx, argument) {
            (Some(t), Some(argument)) => {
                let type_text = node_text(t, source);
                self.type_conversion(ctx, source, scope, &type_text, argument)
            }
            _ => self.unresolved_identifier(ctx, source, scope),
        }
    }

    fn parse_member_access(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let child_scope = scope.with_expression(id);

        let object_ctx = ctx.child_by_field_name("object").or_else(|| ctx.child(0));
        let member_name = ctx
            .child_by_field_name("property")
            .or_else(|| ctx.child_by_field_name("member"))
            .or_else(|| ctx.child(2))
            .map(|n| node_text(n, source))
            .unwrap_or_default();

        let object_text = object_ctx.map(|o| node_text(o, source)).unwrap_or_default();
        let expression = match object_ctx {
            Some(object) => self.parse_expression(object, source, child_scope),
            None => self.unresolved_identifier(ctx, source, child_scope),
        };

        let type_description = builtin_member_type(&object_text, &member_name)
            .unwrap_or_else(TypeDescription::unknown);

        Node::MemberAccess(MemberAccess {
            id,
            src,
            expression: Box::new(expression),
            member_name,
            referenced_declaration: 0,
            type_description,
        })
    }

    fn parse_index_access(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let child_scope = scope.with_expression(id);

        let base_ctx = ctx
            .child_by_field_name("base")
            .or_else(|| ctx.child_by_field_name("object"))
            .or_else(|| ctx.child(0));
        let index_ctx = ctx.child_by_field_name("index").or_else(|| {
            let mut cursor = ctx.walk();
            let mut inside = false;
            let children: Vec<ParseNode> = ctx.children(&mut cursor).collect();
            for child in children {
                match child.kind() {
                    "[" => inside = true,
                    "]" => inside = false,
                    _ if inside && child.is_named() => return Some(child),
                    _ => {}
                }
            }
            None
        });

        let base = match base_ctx {
            Some(base) => self.parse_expression(base, source, child_scope),
            None => self.unresolved_identifier(ctx, source, child_scope),
        };
        let index = index_ctx.map(|i| Box::new(self.parse_expression(i, source, child_scope)));

        Node::IndexAccess(IndexAccess {
            id,
            src,
            base: Box::new(base),
            index,
            type_description: TypeDescription::unknown(),
        })
    }

    fn parse_tuple(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let child_scope = scope.with_expression(id);

        let components: Vec<Node> = named_children(ctx)
            .into_iter()
            .map(|c| self.parse_expression(c, source, child_scope))
            .collect();
        let type_description = components
            .first()
            .and_then(|c| c.type_description())
            .cloned()
            .unwrap_or_else(TypeDescription::unknown);

        Node::TupleExpression(TupleExpression {
            id,
            src,
            components,
            type_description,
        })
    }

    fn parse_conditional(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let child_scope = scope.with_expression(id);

        let named = named_children(ctx);
        let condition = named
            .first()
            .map(|c| self.parse_expression(*c, source, child_scope))
            .unwrap_or_else(|| self.unresolved_identifier(ctx, source, child_scope));
        let true_expression = named
            .get(1)
            .map(|c| self.parse_expression(*c, source, child_scope))
            .unwrap_or_else(|| self.unresolved_identifier(ctx, source, child_scope));
        let false_expression = named
            .get(2)
            .map(|c| self.parse_expression(*c, source, child_scope))
            .unwrap_or_else(|| self.unresolved_identifier(ctx, source, child_scope));

        let type_description = true_expression
            .type_description()
            .cloned()
            .unwrap_or_else(TypeDescription::unknown);

        Node::ConditionalExpression(Conditional {
            id,
            src,
            condition: Box::new(condition),
            true_expression: Box::new(true_expression),
            false_expression: Box::new(false_expression),
            type_description,
        })
    }

    fn parse_new(&mut self, ctx: ParseNode, source: &str, scope: ExprScope) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let type_ctx = named_children(ctx).into_iter().find(|c| is_type_kind(c.kind()));
        let (type_name, type_description) = match type_ctx {
            Some(t) => resolve_type_node(t, source, &self.registry),
            None => (
                node_text(ctx, source)
                    .trim_start_matches("new")
                    .trim()
                    .to_string(),
                TypeDescription::unknown(),
            ),
        };
        Node::NewExpression(NewExpression {
            id,
            src,
            type_name,
            type_description,
        })
    }

    fn literal(
        &mut self,
        ctx: ParseNode,
        source: &str,
        scope: ExprScope,
        kind: LiteralKind,
    ) -> Node {
        let id = self.ids.next_id();
        let src = self.src_for(ctx, scope.parent_id());
        let raw = node_text(ctx, source);
        let (value, type_description) = match kind {
            LiteralKind::Number => (raw, TypeDescription::elementary("uint256")),
            LiteralKind::Bool => (raw, TypeDescription::bool()),
            LiteralKind::HexString => (
                raw.trim_matches(|c| c == '"' || c == '\'').to_string(),
                TypeDescription::new("t_string_literal", "literal_string"),
            ),
            LiteralKind::String => (
                raw.trim_matches(|c| c == '"' || c == '\'').to_string(),
                TypeDescription::new("t_string_literal", "literal_string"),
            ),
        };
        Node::Literal(Literal {
            id,
            src,
            kind,
            value,
            type_description,
        })
    }
}

fn unwrap_expression(mut ctx: ParseNode) -> ParseNode {
    while ctx.kind() == "expression" && ctx.child_count() > 0 {
        match ctx.child(0) {
            Some(child) => ctx = child,
            None => break,
        }
    }
    ctx
}

fn named_children(ctx: ParseNode) -> Vec<ParseNode> {
    let mut cursor = ctx.walk();
    ctx.children(&mut cursor).filter(|c| c.is_named()).collect()
}

fn first_named_child(ctx: ParseNode) -> Option<ParseNode> {
    named_children(ctx).into_iter().next()
}

/// Flattens left-nested chains of the same operator into one operand list.
fn collect_operands<'t>(
    ctx: ParseNode<'t>,
    operator: &str,
    source: &str,
    out: &mut Vec<ParseNode<'t>>,
) {
    let left = ctx
        .child_by_field_name("left")
        .or_else(|| ctx.child(0))
        .map(unwrap_expression);
    let right = ctx
        .child_by_field_name("right")
        .or_else(|| ctx.child(ctx.child_count().saturating_sub(1)))
        .map(unwrap_expression);

    if let Some(left) = left {
        let left_operator = left
            .child_by_field_name("operator")
            .map(|n| source[n.byte_range()].to_string());
        if left.kind() == "binary_expression" && left_operator.as_deref() == Some(operator) {
            collect_operands(left, operator, source, out);
        } else {
            out.push(left);
        }
    }
    if let Some(right) = right {
        out.push(right);
    }
}

fn binary_node_type(operator: &str) -> NodeType {
    match operator {
        "+" => NodeType::AddOperation,
        "-" => NodeType::SubtractOperation,
        "*" => NodeType::MultiplyOperation,
        "/" => NodeType::DivideOperation,
        "%" => NodeType::ModuloOperation,
        "**" => NodeType::ExponentOperation,
        "&" => NodeType::BitAndOperation,
        "|" => NodeType::BitOrOperation,
        "^" => NodeType::BitXorOperation,
        "<<" => NodeType::ShiftLeftOperation,
        ">>" | ">>>" => NodeType::ShiftRightOperation,
        "&&" => NodeType::LogicalAndOperation,
        "||" => NodeType::LogicalOrOperation,
        "==" | "!=" => NodeType::EqualityOperation,
        _ => NodeType::ComparisonOperation,
    }
}

/// Usual arithmetic conversions: comparisons and logical operators yield
/// bool, arithmetic widens to the widest operand.
fn binary_result_type(node_type: NodeType, operands: &[TypeDescription]) -> TypeDescription {
    match node_type {
        NodeType::LogicalAndOperation
        | NodeType::LogicalOrOperation
        | NodeType::EqualityOperation
        | NodeType::ComparisonOperation => TypeDescription::bool(),
        _ => {
            let widest = operands
                .iter()
                .filter_map(|td| int_width(&td.type_identifier).map(|w| (w, td)))
                .max_by_key(|(w, _)| *w)
                .map(|(_, td)| td.clone());
            widest.or_else(|| operands.first().cloned()).unwrap_or_else(TypeDescription::unknown)
        }
    }
}

fn int_width(type_identifier: &str) -> Option<u32> {
    let bits = type_identifier
        .strip_prefix("t_uint")
        .or_else(|| type_identifier.strip_prefix("t_int"))?;
    bits.parse().ok()
}

/// Exact elementary type names only. A prefix check would swallow ordinary
/// identifiers like `interest`.
fn is_elementary_type_name(text: &str) -> bool {
    match text {
        "address" | "bool" | "string" | "bytes" | "uint" | "int" | "payable" => true,
        _ => {
            if let Some(bits) = text.strip_prefix("uint").or_else(|| text.strip_prefix("int")) {
                return !bits.is_empty() && bits.bytes().all(|b| b.is_ascii_digit());
            }
            if let Some(size) = text.strip_prefix("bytes") {
                return !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit());
            }
            false
        }
    }
}

fn builtin_member_type(object: &str, member: &str) -> Option<TypeDescription> {
    let td = match (object, member) {
        ("msg", "sender") => TypeDescription::elementary("address"),
        ("msg", "value") => TypeDescription::elementary("uint256"),
        ("msg", "data") => TypeDescription::elementary("bytes"),
        ("msg", "sig") => TypeDescription::elementary("bytes4"),
        ("block", "timestamp") | ("block", "number") | ("block", "gaslimit") => {
            TypeDescription::elementary("uint256")
        }
        ("block", "coinbase") => TypeDescription::elementary("address"),
        ("tx", "origin") => TypeDescription::elementary("address"),
        ("tx", "gasprice") => TypeDescription::elementary("uint256"),
        _ => return None,
    };
    Some(td)
}
