use solir_abi::{emit_contract, AbiEntry};
use solir_build::parse_source;
use solir_ir::lower;

fn abi_for(source: &str, contract: &str) -> Vec<AbiEntry> {
    let ast = parse_source(source).unwrap();
    let ir = lower(&ast);
    let target = ir.contract_by_name(contract).unwrap();
    emit_contract(&ir, target)
}

fn entry<'a>(entries: &'a [AbiEntry], name: &str) -> &'a AbiEntry {
    entries
        .iter()
        .find(|e| e.name.as_deref() == Some(name))
        .unwrap_or_else(|| panic!("no abi entry named {name}"))
}

#[test]
fn function_types_normalize() {
    let entries = abi_for(
        r#"
        contract C {
            function set(uint value, address payable who) public {}
        }
        "#,
        "C",
    );
    let set = entry(&entries, "set");
    let inputs = set.inputs.as_ref().unwrap();
    assert_eq!(inputs[0].type_name, "uint256");
    assert_eq!(inputs[1].type_name, "address");
    assert_eq!(set.state_mutability.as_deref(), Some("nonpayable"));
}

#[test]
fn internal_functions_are_not_exported() {
    let entries = abi_for(
        r#"
        contract C {
            function visible() public {}
            function hidden() internal {}
        }
        "#,
        "C",
    );
    assert!(entries.iter().any(|e| e.name.as_deref() == Some("visible")));
    assert!(!entries.iter().any(|e| e.name.as_deref() == Some("hidden")));
}

#[test]
fn struct_parameters_lower_to_tuples() {
    let entries = abi_for(
        r#"
        contract Vault {
            struct Position {
                uint256 amount;
                address owner;
            }
            function open(Position memory p) public {}
        }
        "#,
        "Vault",
    );
    let open = entry(&entries, "open");
    let input = &open.inputs.as_ref().unwrap()[0];
    assert_eq!(input.type_name, "tuple");
    let components = input.components.as_ref().unwrap();
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].name, "amount");
    assert_eq!(components[0].type_name, "uint256");
    assert_eq!(components[1].type_name, "address");
}

#[test]
fn enums_lower_to_uint8() {
    let entries = abi_for(
        r#"
        contract Machine {
            enum State { Idle, Running }
            function advance(State next) public {}
        }
        "#,
        "Machine",
    );
    let advance = entry(&entries, "advance");
    assert_eq!(advance.inputs.as_ref().unwrap()[0].type_name, "uint8");
}

#[test]
fn public_mapping_becomes_flattened_getter() {
    let entries = abi_for(
        r#"
        contract Bank {
            mapping(address => mapping(uint256 => bytes32)) public records;
        }
        "#,
        "Bank",
    );
    let getter = entry(&entries, "records");
    let inputs = getter.inputs.as_ref().unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].type_name, "address");
    assert_eq!(inputs[1].type_name, "uint256");
    let outputs = getter.outputs.as_ref().unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].type_name, "bytes32");
    assert_eq!(getter.state_mutability.as_deref(), Some("view"));
}

#[test]
fn array_state_variable_takes_index_input() {
    let entries = abi_for(
        r#"
        contract List {
            uint256[] public items;
        }
        "#,
        "List",
    );
    let getter = entry(&entries, "items");
    let inputs = getter.inputs.as_ref().unwrap();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].type_name, "uint256");
    assert_eq!(getter.outputs.as_ref().unwrap()[0].type_name, "uint256");
}

#[test]
fn private_state_variables_have_no_getter() {
    let entries = abi_for(
        r#"
        contract Quiet {
            uint256 internal hidden;
            uint256 public shown;
        }
        "#,
        "Quiet",
    );
    assert!(!entries.iter().any(|e| e.name.as_deref() == Some("hidden")));
    assert!(entries.iter().any(|e| e.name.as_deref() == Some("shown")));
}

#[test]
fn events_carry_indexed_flags() {
    let entries = abi_for(
        r#"
        contract Logs {
            event Moved(address indexed from, uint256 amount);
        }
        "#,
        "Logs",
    );
    let moved = entry(&entries, "Moved");
    assert_eq!(moved.kind, "event");
    assert_eq!(moved.anonymous, Some(false));
    let inputs = moved.inputs.as_ref().unwrap();
    assert_eq!(inputs[0].indexed, Some(true));
    assert_eq!(inputs[1].indexed, Some(false));
}

#[test]
fn constructor_and_receive_entries() {
    let entries = abi_for(
        r#"
        contract Payable {
            constructor(uint256 start) {}
            receive() external payable {}
        }
        "#,
        "Payable",
    );
    let constructor = entries.iter().find(|e| e.kind == "constructor").unwrap();
    assert_eq!(constructor.inputs.as_ref().unwrap()[0].type_name, "uint256");
    let receive = entries.iter().find(|e| e.kind == "receive").unwrap();
    assert_eq!(receive.state_mutability.as_deref(), Some("payable"));
}

#[test]
fn to_json_keys_by_contract_name() {
    let ast = parse_source("contract A { uint256 public x; } contract B {}").unwrap();
    let ir = lower(&ast);
    let abis = solir_abi::emit(&ir);
    let json = solir_abi::to_json(&abis).unwrap();
    assert!(json.contains("\"A\""));
    assert!(json.contains("\"B\""));
    assert!(json.contains("\"name\": \"x\""));
}

#[test]
fn contract_references_lower_to_address() {
    let entries = abi_for(
        r#"
        contract Other {}
        contract User {
            function link(Other target) public {}
        }
        "#,
        "User",
    );
    let link = entry(&entries, "link");
    assert_eq!(link.inputs.as_ref().unwrap()[0].type_name, "address");
}
