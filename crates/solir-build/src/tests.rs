use crate::{parse_source, AstBuilder, CancelToken, Error, Sources};
use solir_ast::{Node, NodeType};
use std::collections::HashSet;

#[test]
fn minimal_contract() {
    let root = parse_source("contract Foo { uint x; }").unwrap();
    assert_eq!(root.source_unit_count(), 1);

    let unit = root.units().next().unwrap();
    assert_eq!(unit.name, "Foo");

    let contract = unit.contract().unwrap();
    assert_eq!(contract.name, "Foo");
    assert!(contract.fully_implemented);

    let state_vars: Vec<_> = contract.state_variables().collect();
    assert_eq!(state_vars.len(), 1);
    assert_eq!(state_vars[0].name, "x");
    assert_eq!(state_vars[0].type_description.type_identifier, "t_uint256");
}

#[test]
fn empty_input_is_rejected() {
    let sources = Sources::new();
    assert!(matches!(
        AstBuilder::new().build(&sources),
        Err(Error::InputMissing)
    ));

    let blank = Sources::from_single("a.sol", "   \n  ");
    assert!(matches!(
        AstBuilder::new().build(&blank),
        Err(Error::InputMissing)
    ));
}

#[test]
fn cancellation_aborts_the_build() {
    let token = CancelToken::new();
    token.cancel();
    let sources = Sources::from_single("a.sol", "contract A {}");
    assert!(matches!(
        AstBuilder::with_cancel(token).build(&sources),
        Err(Error::Cancelled)
    ));
}

#[test]
fn license_is_scanned_from_spdx_comment() {
    let root = parse_source("// SPDX-License-Identifier: MIT\ncontract A {}").unwrap();
    let unit = root.units().next().unwrap();
    assert_eq!(unit.license.as_deref(), Some("MIT"));
}

#[test]
fn simple_inheritance_linearizes_base_after_self() {
    let root = parse_source("contract A {} contract B is A {}").unwrap();
    assert_eq!(root.source_unit_count(), 2);

    let a = root.source_unit_by_name("A").unwrap().contract().unwrap();
    let b = root.source_unit_by_name("B").unwrap().contract().unwrap();

    assert_eq!(b.base_contracts.len(), 1);
    assert_eq!(b.base_contracts[0].base_name, "A");
    assert_eq!(b.base_contracts[0].referenced_declaration, a.id);
    assert_eq!(b.linearized_base_contracts, vec![b.id, a.id]);
    assert_eq!(a.linearized_base_contracts, vec![a.id]);
}

#[test]
fn diamond_inheritance_follows_solidity_mro() {
    let source = r#"
        contract A {}
        contract B is A {}
        contract C is A {}
        contract D is B, C {}
    "#;
    let root = parse_source(source).unwrap();

    let a = root.source_unit_by_name("A").unwrap().contract().unwrap();
    let b = root.source_unit_by_name("B").unwrap().contract().unwrap();
    let c = root.source_unit_by_name("C").unwrap().contract().unwrap();
    let d = root.source_unit_by_name("D").unwrap().contract().unwrap();

    // Solidity merges bases right to left: D, C, B, A.
    assert_eq!(d.linearized_base_contracts, vec![d.id, c.id, b.id, a.id]);
}

#[test]
fn inheritance_cycle_is_reported() {
    let root = parse_source("contract A is B {} contract B is A {}").unwrap();
    let a = root.source_unit_by_name("A").unwrap().contract().unwrap();
    assert_eq!(a.linearized_base_contracts, vec![a.id]);
    assert!(root
        .diagnostics
        .iter()
        .any(|d| d.kind == solir_ast::DiagnosticKind::InheritanceCycle));
}

#[test]
fn forward_references_resolve_in_second_pass() {
    let source = r#"
        contract Caller {
            function first() public returns (uint) {
                return second();
            }
            function second() public returns (uint) {
                return 1;
            }
        }
    "#;
    let root = parse_source(source).unwrap();
    let contract = root.units().next().unwrap().contract().unwrap();
    let second_id = contract
        .functions()
        .find(|f| f.name == "second")
        .unwrap()
        .id;

    let mut resolved = false;
    root.walk(&mut |node| {
        if let Node::Identifier(identifier) = node {
            if identifier.name == "second" {
                assert_eq!(identifier.referenced_declaration, second_id);
                resolved = true;
            }
        }
    });
    assert!(resolved, "call target identifier not found");
}

#[test]
fn unresolved_identifier_warns_but_does_not_fail() {
    let source = r#"
        contract Foo {
            function f() public returns (uint) {
                return missing();
            }
        }
    "#;
    let root = parse_source(source).unwrap();
    let mut saw_unresolved = false;
    root.walk(&mut |node| {
        if let Node::Identifier(identifier) = node {
            if identifier.name == "missing" {
                assert_eq!(identifier.referenced_declaration, 0);
                assert_eq!(identifier.type_description.type_identifier, "t_unknown");
                saw_unresolved = true;
            }
        }
    });
    assert!(saw_unresolved);
    assert!(root
        .diagnostics
        .iter()
        .any(|d| d.kind == solir_ast::DiagnosticKind::ResolutionWarning));
}

#[test]
fn duplicate_top_level_names_keep_first_definition() {
    let root = parse_source("contract Twin { uint a; } contract Twin { uint b; }").unwrap();
    assert_eq!(root.source_unit_count(), 2);
    assert!(root
        .diagnostics
        .iter()
        .any(|d| d.kind == solir_ast::DiagnosticKind::AmbiguousDefinition));
}

#[test]
fn enum_members_carry_mangled_identifiers() {
    let source = r#"
        contract C {
            enum E { X, Y }
        }
    "#;
    let root = parse_source(source).unwrap();
    let contract = root.units().next().unwrap().contract().unwrap();

    let definition = contract
        .nodes
        .iter()
        .find_map(|n| match n {
            Node::EnumDefinition(e) => Some(e),
            _ => None,
        })
        .expect("enum definition");

    assert_eq!(definition.name, "E");
    assert_eq!(definition.canonical_name, "C.E");
    assert_eq!(definition.members.len(), 2);

    let first = match &definition.members[0] {
        Node::EnumValue(v) => v,
        other => panic!("expected enum value, got {:?}", other.node_type()),
    };
    assert_eq!(first.name, "X");
    assert!(first
        .type_description
        .type_identifier
        .starts_with("t_enum_$_E$_X_$"));
    assert_eq!(first.src.parent_index, definition.id);
}

#[test]
fn struct_definition_registers_members() {
    let source = r#"
        contract Vault {
            struct Position {
                uint256 amount;
                address owner;
            }
        }
    "#;
    let root = parse_source(source).unwrap();
    let contract = root.units().next().unwrap().contract().unwrap();

    let definition = contract
        .nodes
        .iter()
        .find_map(|n| match n {
            Node::StructDefinition(s) => Some(s),
            _ => None,
        })
        .expect("struct definition");

    assert_eq!(definition.name, "Position");
    assert_eq!(definition.canonical_name, "Vault.Position");
    assert!(definition
        .type_description
        .type_identifier
        .starts_with("t_struct$_Vault_Position_$"));
    assert_eq!(definition.members.len(), 2);
    let first = match &definition.members[0] {
        Node::VariableDeclaration(v) => v,
        other => panic!("expected member declaration, got {:?}", other.node_type()),
    };
    assert_eq!(first.name, "amount");
    assert_eq!(first.type_description.type_identifier, "t_uint256");
    assert!(!first.state_variable);
}

#[test]
fn chained_addition_flattens_into_one_node() {
    let source = r#"
        contract Math {
            function sum(uint a, uint b, uint c) public pure returns (uint) {
                return a + b + c;
            }
        }
    "#;
    let root = parse_source(source).unwrap();
    let mut found = false;
    root.walk(&mut |node| {
        if let Node::AddOperation(op) = node {
            assert_eq!(op.expressions.len(), 3);
            assert_eq!(op.type_descriptions.len(), 3);
            assert_eq!(op.operator, "+");
            assert_eq!(op.type_description.type_identifier, "t_uint256");
            found = true;
        }
    });
    assert!(found, "no flattened addition found");
}

#[test]
fn comparison_results_are_boolean() {
    let source = r#"
        contract Cmp {
            function lt(uint a, uint b) public pure returns (bool) {
                return a < b;
            }
        }
    "#;
    let root = parse_source(source).unwrap();
    let mut found = false;
    root.walk(&mut |node| {
        if let Node::ComparisonOperation(op) = node {
            assert_eq!(op.type_description.type_identifier, "t_bool");
            assert_eq!(op.operator, "<");
            found = true;
        }
    });
    assert!(found);
}

#[test]
fn interface_functions_leave_contract_unimplemented() {
    let source = r#"
        interface IToken {
            function totalSupply() external view returns (uint256);
        }
    "#;
    let root = parse_source(source).unwrap();
    let contract = root.units().next().unwrap().contract().unwrap();
    assert_eq!(contract.kind, solir_ast::ContractKind::Interface);
    assert!(!contract.fully_implemented);
}

#[test]
fn unimplemented_base_propagates_through_inheritance() {
    let source = r#"
        interface IBase {
            function f() external;
        }
        contract Impl is IBase {
            function g() public {}
        }
    "#;
    let root = parse_source(source).unwrap();
    let derived = root.source_unit_by_name("Impl").unwrap().contract().unwrap();
    assert!(!derived.fully_implemented);
}

#[test]
fn node_ids_are_unique_and_parents_exist() {
    let source = r#"
        contract Ids {
            uint total;
            event Changed(uint value);
            function bump(uint by) public returns (uint) {
                total = total + by;
                emit Changed(total);
                return total;
            }
        }
    "#;
    let root = parse_source(source).unwrap();

    let mut ids = Vec::new();
    root.walk(&mut |node| ids.push(node.id()));
    let unique: HashSet<i64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate node ids");
    assert!(ids.iter().all(|&id| id > 0));

    let mut known: HashSet<i64> = unique.clone();
    known.insert(root.id);
    root.walk(&mut |node| {
        let parent = node.src().parent_index;
        assert!(
            known.contains(&parent),
            "node {} has dangling parent {}",
            node.id(),
            parent
        );
    });
}

#[test]
fn linearization_starts_with_self() {
    let source = r#"
        contract A {}
        contract B is A {}
        contract C is B {}
    "#;
    let root = parse_source(source).unwrap();
    root.walk(&mut |node| {
        if let Some(contract) = node.as_contract() {
            assert_eq!(contract.linearized_base_contracts[0], contract.id);
        }
    });
}

#[test]
fn same_input_builds_identical_serializations() {
    let source = r#"
        contract Stable {
            uint value;
            function set(uint v) public { value = v; }
        }
    "#;
    let first = parse_source(source).unwrap();
    let second = parse_source(source).unwrap();
    let a = serde_json::to_string(&first).unwrap();
    let b = serde_json::to_string(&second).unwrap();
    assert_eq!(a, b);
}

#[test]
fn serialization_round_trips() {
    let source = "contract Round { uint x; function get() public view returns (uint) { return x; } }";
    let root = parse_source(source).unwrap();
    let encoded = serde_json::to_string(&root).unwrap();
    let decoded: solir_ast::Root = serde_json::from_str(&encoded).unwrap();
    let re_encoded = serde_json::to_string(&decoded).unwrap();
    assert_eq!(encoded, re_encoded);
}

#[test]
fn entry_unit_defaults_to_last_and_honors_override() {
    let source = "contract First {} contract Second {}";
    let root = parse_source(source).unwrap();
    assert_eq!(root.entry_unit().unwrap().name, "Second");

    let sources = Sources::from_single("x.sol", source).with_entry("First");
    let root = AstBuilder::new().build(&sources).unwrap();
    assert_eq!(root.entry_unit().unwrap().name, "First");
}

#[test]
fn parse_errors_become_diagnostics_not_failures() {
    let source = "contract Broken { function ( } ";
    let root = parse_source(source);
    // Either a best-effort tree with a diagnostic, or nothing parseable at
    // all; never a hard error.
    let root = root.unwrap();
    assert!(root
        .diagnostics
        .iter()
        .any(|d| d.kind == solir_ast::DiagnosticKind::ParseError));
}

#[test]
fn expression_statement_parent_chain() {
    let source = r#"
        contract P {
            function f(uint a) public pure returns (uint) {
                uint doubled = a + a;
                return doubled;
            }
        }
    "#;
    let root = parse_source(source).unwrap();

    // The declaration's initializer hangs off the declaration itself, per
    // the tightest-enclosing-context rule.
    let mut declaration_id = 0;
    root.walk(&mut |node| {
        if let Node::VariableDeclaration(v) = node {
            if v.name == "doubled" {
                declaration_id = v.id;
            }
        }
    });
    assert!(declaration_id > 0);

    let mut checked = false;
    root.walk(&mut |node| {
        if let Node::AddOperation(op) = node {
            assert_eq!(op.src.parent_index, declaration_id);
            checked = true;
        }
    });
    assert!(checked);
}

#[test]
fn node_type_tags_match_kinds() {
    let root = parse_source("contract Tags { uint x; }").unwrap();
    let unit_node = &root.source_units[0];
    assert_eq!(unit_node.node_type(), NodeType::SourceUnit);
    let contract_node = unit_node
        .as_source_unit()
        .unwrap()
        .contract_node()
        .unwrap();
    assert_eq!(contract_node.node_type(), NodeType::ContractDefinition);
}
