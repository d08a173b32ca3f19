use solir_ast::{normalize_type_name_with_status, DefinitionRegistry, TypeDescription};
use tree_sitter::Node;

/// Resolves a parse-tree type reference to its source text and canonical
/// description. Unrecognized user-defined names yield `t_unknown`; the
/// builder's second pass re-resolves those once every definition has been
/// registered.
pub(crate) fn resolve_type_node(
    node: Node,
    source: &str,
    registry: &DefinitionRegistry,
) -> (String, TypeDescription) {
    let text = node_text(node, source);

    match node.kind() {
        "mapping" | "mapping_type" => {
            let mut parts = Vec::new();
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if is_type_kind(child.kind()) {
                    parts.push(child);
                }
            }
            if parts.len() >= 2 {
                let (_, key) = resolve_type_node(parts[0], source, registry);
                let (_, value) = resolve_type_node(parts[parts.len() - 1], source, registry);
                return (text, TypeDescription::mapping_of(&key, &value));
            }
            resolve_type_text(&text, registry)
        }
        "type_name" => {
            // Array form: the element type is the first child, the size (if
            // any) sits between the brackets.
            if text.ends_with(']') {
                if let Some(element_node) = node.child(0) {
                    if is_type_kind(element_node.kind()) {
                        let (_, element) = resolve_type_node(element_node, source, registry);
                        let size = array_size(node, source);
                        let td = TypeDescription::array_of(&element, size.as_deref());
                        return (text, td);
                    }
                }
                return resolve_type_text(&text, registry);
            }
            if let Some(child) = node.child(0) {
                if is_type_kind(child.kind()) {
                    let (_, td) = resolve_type_node(child, source, registry);
                    return (text, td);
                }
            }
            resolve_type_text(&text, registry)
        }
        "array_type" => {
            let element_node = node
                .child_by_field_name("element")
                .or_else(|| node.child(0));
            if let Some(element_node) = element_node {
                let (_, element) = resolve_type_node(element_node, source, registry);
                let size = node
                    .child_by_field_name("size")
                    .map(|n| node_text(n, source));
                return (text, TypeDescription::array_of(&element, size.as_deref()));
            }
            resolve_type_text(&text, registry)
        }
        "primitive_type" | "elementary_type" | "user_defined_type" | "identifier" => {
            resolve_type_text(&text, registry)
        }
        _ => {
            if let Some(inner) = node.child_by_field_name("type") {
                return resolve_type_node(inner, source, registry);
            }
            resolve_type_text(&text, registry)
        }
    }
}

/// Text-only fallback used where no structured type node is available.
pub(crate) fn resolve_type_text(
    raw: &str,
    registry: &DefinitionRegistry,
) -> (String, TypeDescription) {
    let text = raw.trim().to_string();
    let compact = text.replace(' ', "");

    if let Some(inner) = compact
        .strip_prefix("mapping(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        if let Some((key, value)) = split_mapping(inner) {
            let (_, key_td) = resolve_type_text(key, registry);
            let (_, value_td) = resolve_type_text(value, registry);
            return (text, TypeDescription::mapping_of(&key_td, &value_td));
        }
    }

    if let Some(base) = compact.strip_suffix("[]") {
        let (_, element) = resolve_type_text(base, registry);
        return (text, TypeDescription::array_of(&element, None));
    }
    if compact.ends_with(']') {
        if let Some(open) = compact.rfind('[') {
            let size = &compact[open + 1..compact.len() - 1];
            if !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()) {
                let (_, element) = resolve_type_text(&compact[..open], registry);
                return (text, TypeDescription::array_of(&element, Some(size)));
            }
        }
    }

    let (canonical, recognized) = normalize_type_name_with_status(&compact);
    if recognized {
        return (text, TypeDescription::elementary(&canonical));
    }
    if let Some(definition) = registry.get(&compact) {
        return (text, definition.type_description.clone());
    }
    (text, TypeDescription::unknown())
}

/// Splits `K => V` at the top level, ignoring `=>` inside a nested mapping.
fn split_mapping(inner: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let bytes = inner.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 && bytes[i + 1] == b'>' => {
                return Some((&inner[..i], &inner[i + 2..]));
            }
            _ => {}
        }
    }
    None
}

fn array_size(node: Node, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let mut inside = false;
    for child in node.children(&mut cursor) {
        match child.kind() {
            "[" => inside = true,
            "]" => inside = false,
            _ if inside => return Some(node_text(child, source)),
            _ => {}
        }
    }
    None
}

pub(crate) fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "type_name"
            | "primitive_type"
            | "elementary_type"
            | "user_defined_type"
            | "mapping"
            | "mapping_type"
            | "array_type"
    )
}

pub(crate) fn node_text(node: Node, source: &str) -> String {
    source[node.byte_range()].to_string()
}
