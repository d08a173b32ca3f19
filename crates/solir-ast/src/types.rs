use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical description of a Solidity type. Two descriptions are equal iff
/// their `type_identifier` strings are identical; `type_string` is the
/// human-readable echo of the source syntax.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct TypeDescription {
    pub type_identifier: String,
    pub type_string: String,
}

impl PartialEq for TypeDescription {
    fn eq(&self, other: &Self) -> bool {
        self.type_identifier == other.type_identifier
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_string)
    }
}

impl TypeDescription {
    pub fn new(type_identifier: impl Into<String>, type_string: impl Into<String>) -> Self {
        Self {
            type_identifier: type_identifier.into(),
            type_string: type_string.into(),
        }
    }

    /// Elementary type by normalized name, e.g. `uint256` -> `t_uint256`.
    pub fn elementary(name: &str) -> Self {
        let canonical = normalize_type_name(name);
        Self::new(format!("t_{}", canonical), canonical)
    }

    pub fn bool() -> Self {
        Self::elementary("bool")
    }

    pub fn unknown() -> Self {
        Self::new("t_unknown", "unknown")
    }

    pub fn is_unknown(&self) -> bool {
        self.type_identifier == "t_unknown"
    }

    /// Built-in globals (`msg`, `block`, ...) resolve to a magic type rather
    /// than a declaration.
    pub fn magic(name: &str) -> Self {
        Self::new(format!("t_magic_{}", name), name)
    }

    /// Array of `element`; `size` is `None` for dynamic arrays.
    pub fn array_of(element: &TypeDescription, size: Option<&str>) -> Self {
        match size {
            Some(n) => Self::new(
                format!("t_array$_{}_${}", element.type_identifier, n),
                format!("{}[{}]", element.type_string, n),
            ),
            None => Self::new(
                format!("t_array$_{}_$dyn", element.type_identifier),
                format!("{}[]", element.type_string),
            ),
        }
    }

    pub fn mapping_of(key: &TypeDescription, value: &TypeDescription) -> Self {
        Self::new(
            format!(
                "t_mapping$_{}_$_{}_$",
                key.type_identifier, value.type_identifier
            ),
            format!("mapping({} => {})", key.type_string, value.type_string),
        )
    }

    pub fn struct_type(contract_name: &str, struct_name: &str, definition_id: i64) -> Self {
        Self::new(
            format!("t_struct$_{}_{}_${}", contract_name, struct_name, definition_id),
            format!("struct {}.{}", contract_name, struct_name),
        )
    }

    pub fn enum_type(enum_name: &str, canonical_name: &str, definition_id: i64) -> Self {
        Self::new(
            format!("t_enum_$_{}_${}", enum_name, definition_id),
            format!("enum {}", canonical_name),
        )
    }

    pub fn enum_member(
        enum_name: &str,
        canonical_name: &str,
        member_name: &str,
        member_id: i64,
    ) -> Self {
        Self::new(
            format!("t_enum_$_{}$_{}_${}", enum_name, member_name, member_id),
            format!("enum {}.{}", canonical_name, member_name),
        )
    }

    pub fn contract_type(name: &str, definition_id: i64) -> Self {
        Self::new(
            format!("t_contract$_{}_${}", name, definition_id),
            format!("contract {}", name),
        )
    }

    pub fn function_type(
        visibility: &str,
        state_mutability: &str,
        inputs: &[TypeDescription],
        outputs: &[TypeDescription],
    ) -> Self {
        let ins = inputs
            .iter()
            .map(|t| t.type_identifier.as_str())
            .collect::<Vec<_>>()
            .join("_");
        let outs = outputs
            .iter()
            .map(|t| t.type_identifier.as_str())
            .collect::<Vec<_>>()
            .join("_");
        let in_strings = inputs
            .iter()
            .map(|t| t.type_string.as_str())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(
            format!(
                "t_function_{}_{}$_{}_$_{}_$",
                visibility, state_mutability, ins, outs
            ),
            format!("function ({})", in_strings),
        )
    }
}

/// Normalizes a textual Solidity type reference to its canonical form:
/// `uint` -> `uint256`, `addresspayable` -> `address`, array prefixes recurse
/// into the element type. Unrecognized names pass through unchanged.
pub fn normalize_type_name(type_name: &str) -> String {
    normalize_impl(type_name).0
}

/// Like [`normalize_type_name`] but also reports whether the name hit a
/// recognized rule. ABI emission uses the status to decide when a
/// user-defined type has to widen to `tuple`.
pub fn normalize_type_name_with_status(type_name: &str) -> (String, bool) {
    normalize_impl(type_name)
}

fn normalize_impl(type_name: &str) -> (String, bool) {
    if let Some(rest) = type_name.strip_prefix('[') {
        if let Some((size, element)) = rest.split_once(']') {
            if !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()) {
                return (format!("[{}]{}", size, normalize_type_name(element)), true);
            }
            if size.is_empty() {
                return (format!("[]{}", normalize_type_name(element)), true);
            }
        }
    }

    match type_name {
        "uint" => ("uint256".to_string(), true),
        "int" => ("int256".to_string(), true),
        "string" | "address" | "tuple" => (type_name.to_string(), true),
        "addresspayable" => ("address".to_string(), true),
        n if n.starts_with("uint")
            || n.starts_with("int")
            || n.starts_with("bool")
            || n.starts_with("bytes") =>
        {
            (n.to_string(), true)
        }
        other => (other.to_string(), false),
    }
}

/// Struct references lower to `tuple` in the ABI; arrays of a known struct
/// lower to `tuple[]`.
pub fn normalize_struct_type_name(defined_structs: &IndexMap<String, ()>, type_name: &str) -> String {
    match type_name.strip_suffix("[]") {
        Some(base) if defined_structs.contains_key(base) => "tuple[]".to_string(),
        _ => "tuple".to_string(),
    }
}

pub fn is_mapping_type(type_name: &str) -> bool {
    type_name.contains("mapping")
}

/// Parses `mapping(K => V)`. Nested value mappings are flattened: keys
/// accumulate left to right, values keep only the innermost non-mapping
/// value. Returns `(false, [], [])` when the text is not a mapping.
pub fn parse_mapping_type(type_name: &str) -> (bool, Vec<String>, Vec<String>) {
    let trimmed = type_name.trim();
    let inner = match trimmed
        .strip_prefix("mapping(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => inner,
        None => return (false, Vec::new(), Vec::new()),
    };

    let (key, value) = match inner.split_once("=>") {
        Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
        None => return (false, Vec::new(), Vec::new()),
    };

    let mut keys = vec![key];
    let mut values = vec![value.clone()];

    if is_mapping_type(&value) {
        let (_, nested_keys, nested_values) = parse_mapping_type(&value);
        keys.extend(nested_keys);
        values = nested_values;
    }

    (true, keys, values)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Struct,
    Enum,
    Contract,
    Interface,
    Library,
}

/// Registered user-defined type: the definition node's id plus its canonical
/// type description, as seeded while the builder walks definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definition {
    pub id: i64,
    pub kind: DefinitionKind,
    pub canonical_name: String,
    pub type_description: TypeDescription,
}

/// Build-scoped name -> definition table. Insertion-ordered so every
/// iteration over it is deterministic.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: IndexMap<String, Definition>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition under `name`. The first definition wins;
    /// returns `false` when the name was already taken.
    pub fn register(&mut self, name: &str, definition: Definition) -> bool {
        if self.definitions.contains_key(name) {
            return false;
        }
        self.definitions.insert(name.to_string(), definition);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn is_struct(&self, name: &str) -> bool {
        self.is_kind(name, DefinitionKind::Struct)
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.is_kind(name, DefinitionKind::Enum)
    }

    pub fn is_contract(&self, name: &str) -> bool {
        self.is_kind(name, DefinitionKind::Contract)
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.is_kind(name, DefinitionKind::Interface)
    }

    pub fn is_library(&self, name: &str) -> bool {
        self.is_kind(name, DefinitionKind::Library)
    }

    fn is_kind(&self, name: &str, kind: DefinitionKind) -> bool {
        self.definitions
            .get(name)
            .map(|d| d.kind == kind)
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Definition)> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Names of registered structs, for ABI tuple widening.
    pub fn struct_names(&self) -> IndexMap<String, ()> {
        self.definitions
            .iter()
            .filter(|(_, d)| d.kind == DefinitionKind::Struct)
            .map(|(name, _)| (name.clone(), ()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_elementary_widths() {
        assert_eq!(normalize_type_name("uint"), "uint256");
        assert_eq!(normalize_type_name("int"), "int256");
        assert_eq!(normalize_type_name("uint8"), "uint8");
        assert_eq!(normalize_type_name("int128"), "int128");
        assert_eq!(normalize_type_name("bytes32"), "bytes32");
        assert_eq!(normalize_type_name("bool"), "bool");
        assert_eq!(normalize_type_name("addresspayable"), "address");
        assert_eq!(normalize_type_name("tuple"), "tuple");
        assert_eq!(normalize_type_name("MyStruct"), "MyStruct");
    }

    #[test]
    fn normalize_array_prefixes() {
        assert_eq!(normalize_type_name("[3]uint"), "[3]uint256");
        assert_eq!(normalize_type_name("[]uint"), "[]uint256");
        assert_eq!(normalize_type_name("[]addresspayable"), "[]address");
        assert_eq!(normalize_type_name("[2][]int"), "[2][]int256");
    }

    #[test]
    fn normalize_is_idempotent() {
        let corpus = [
            "uint", "uint256", "int", "int8", "bool", "bytes", "bytes4", "string", "address",
            "addresspayable", "tuple", "[3]uint", "[]uint", "[2][]int", "Custom", "[]Custom",
        ];
        for t in corpus {
            let once = normalize_type_name(t);
            assert_eq!(normalize_type_name(&once), once, "not idempotent for {t}");
        }
    }

    #[test]
    fn normalize_status_flags_unknown_names() {
        assert_eq!(
            normalize_type_name_with_status("uint"),
            ("uint256".to_string(), true)
        );
        assert_eq!(
            normalize_type_name_with_status("Vault"),
            ("Vault".to_string(), false)
        );
        assert_eq!(
            normalize_type_name_with_status("[]Vault"),
            ("[]Vault".to_string(), true)
        );
    }

    #[test]
    fn struct_names_widen_to_tuple() {
        let mut defined = IndexMap::new();
        defined.insert("Position".to_string(), ());
        assert_eq!(normalize_struct_type_name(&defined, "Position[]"), "tuple[]");
        assert_eq!(normalize_struct_type_name(&defined, "Position"), "tuple");
        assert_eq!(normalize_struct_type_name(&defined, "Other[]"), "tuple");
    }

    #[test]
    fn parse_simple_mapping() {
        let (ok, keys, values) = parse_mapping_type("mapping(address => uint256)");
        assert!(ok);
        assert_eq!(keys, vec!["address"]);
        assert_eq!(values, vec!["uint256"]);
    }

    #[test]
    fn parse_nested_mapping_flattens_keys() {
        let (ok, keys, values) =
            parse_mapping_type("mapping(address => mapping(uint256 => bytes32))");
        assert!(ok);
        assert_eq!(keys, vec!["address", "uint256"]);
        assert_eq!(values, vec!["bytes32"]);
    }

    #[test]
    fn parse_mapping_rejects_non_mappings() {
        let (ok, keys, values) = parse_mapping_type("uint256");
        assert!(!ok);
        assert!(keys.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn type_description_equality_is_identifier_only() {
        let a = TypeDescription::new("t_uint256", "uint256");
        let b = TypeDescription::new("t_uint256", "uint");
        let c = TypeDescription::new("t_uint128", "uint128");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn mapping_description_shape() {
        let key = TypeDescription::elementary("address");
        let value = TypeDescription::elementary("uint");
        let mapping = TypeDescription::mapping_of(&key, &value);
        assert_eq!(mapping.type_identifier, "t_mapping$_t_address_$_t_uint256_$");
        assert_eq!(mapping.type_string, "mapping(address => uint256)");
    }

    #[test]
    fn array_description_shape() {
        let elem = TypeDescription::elementary("uint256");
        assert_eq!(
            TypeDescription::array_of(&elem, None).type_identifier,
            "t_array$_t_uint256_$dyn"
        );
        assert_eq!(
            TypeDescription::array_of(&elem, Some("4")).type_string,
            "uint256[4]"
        );
    }

    #[test]
    fn registry_first_definition_wins() {
        let mut registry = DefinitionRegistry::new();
        let first = Definition {
            id: 7,
            kind: DefinitionKind::Struct,
            canonical_name: "Unit.Point".to_string(),
            type_description: TypeDescription::struct_type("Unit", "Point", 7),
        };
        let second = Definition {
            id: 9,
            kind: DefinitionKind::Enum,
            canonical_name: "Unit.Point".to_string(),
            type_description: TypeDescription::unknown(),
        };
        assert!(registry.register("Point", first));
        assert!(!registry.register("Point", second));
        assert!(registry.is_struct("Point"));
        assert!(!registry.is_enum("Point"));
        assert_eq!(registry.get("Point").unwrap().id, 7);
    }
}
