use solir_build::parse_source;
use solir_ir::{lower, Standard};

#[test]
fn minimal_contract_has_no_standards() {
    let ast = parse_source("contract Foo { uint x; }").unwrap();
    let ir = lower(&ast);

    assert_eq!(ir.contracts_count, 1);
    let contract = &ir.contracts[0];
    assert_eq!(contract.name, "Foo");
    assert_eq!(contract.language, "solidity");
    assert_eq!(contract.state_variables.len(), 1);
    assert_eq!(contract.state_variables[0].name, "x");
    assert_eq!(contract.state_variables[0].type_identifier, "t_uint256");
    assert!(ir.eips.is_empty());
    assert!(ir.contract_types.is_empty());
}

#[test]
fn erc20_surface_is_detected() {
    let source = r#"
        contract T {
            function transfer(address to, uint amount) public returns (bool) {}
            function balanceOf(address) public view returns (uint) {}
            function totalSupply() public view returns (uint) {}
            function approve(address, uint) public returns (bool) {}
            function transferFrom(address, address, uint) public returns (bool) {}
            event Transfer(address indexed, address indexed, uint);
            event Approval(address indexed, address indexed, uint);
        }
    "#;
    let ast = parse_source(source).unwrap();
    let ir = lower(&ast);

    assert!(ir.has_eip(Standard::Erc20), "eips: {:?}", ir.eips);
    assert!(ir.has_contract_type("token"));

    let contract = ir.contract_by_name("T").unwrap();
    let transfer = contract.function_by_name("transfer").unwrap();
    assert_eq!(transfer.signature_raw, "transfer(address,uint256)");
    assert_eq!(transfer.signature, "0xa9059cbb");

    let event = contract.event_by_name("Transfer").unwrap();
    assert_eq!(event.signature_raw, "Transfer(address,address,uint256)");
    assert_eq!(
        event.topic_hash,
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
    );
}

#[test]
fn erc20_members_may_come_from_bases() {
    let source = r#"
        contract Base {
            function totalSupply() public view returns (uint) {}
            function balanceOf(address) public view returns (uint) {}
            event Transfer(address indexed, address indexed, uint);
            event Approval(address indexed, address indexed, uint);
        }
        contract Token is Base {
            function transfer(address, uint) public returns (bool) {}
            function transferFrom(address, address, uint) public returns (bool) {}
            function approve(address, uint) public returns (bool) {}
        }
    "#;
    let ast = parse_source(source).unwrap();
    let ir = lower(&ast);

    assert!(ir.has_eip(Standard::Erc20));
    let hit = ir
        .eips
        .iter()
        .find(|e| e.standard == Standard::Erc20)
        .unwrap();
    assert_eq!(hit.contract_name, "Token");
    assert_eq!(hit.confidence, 1.0);
}

#[test]
fn erc1820_registry_contract_is_tagged_proxy() {
    let source = r#"
        contract Registry {
            function canImplementInterfaceForAddress(bytes32 hash, address addr) public view returns (bytes32) {}
        }
    "#;
    let ast = parse_source(source).unwrap();
    let ir = lower(&ast);

    assert!(ir.has_eip(Standard::Erc1820));
    assert_eq!(ir.contract_types, vec!["proxy", "upgradeable"]);
}

#[test]
fn erc1967_accessor_and_slot_detection() {
    let accessor = r#"
        contract Proxy {
            function implementation() public view returns (address) {}
        }
    "#;
    let ast = parse_source(accessor).unwrap();
    let ir = lower(&ast);
    assert!(ir.has_eip(Standard::Erc1967));
    let hit = ir
        .eips
        .iter()
        .find(|e| e.standard == Standard::Erc1967)
        .unwrap();
    assert_eq!(hit.confidence, 1.0);

    let slot_proxy = r#"
        contract SlotProxy {
            function impl_() public view returns (address a) {
                assembly {
                    a := sload(0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc)
                }
            }
        }
    "#;
    let ast = parse_source(slot_proxy).unwrap();
    let ir = lower(&ast);
    assert!(ir.has_eip(Standard::Erc1967), "eips: {:?}", ir.eips);
    let hit = ir
        .eips
        .iter()
        .find(|e| e.standard == Standard::Erc1967)
        .unwrap();
    assert_eq!(hit.confidence, 0.75);
}

#[test]
fn constructor_and_modifiers_lower_into_dedicated_slots() {
    let source = r#"
        contract Owned {
            address owner;
            modifier onlyOwner() {
                _;
            }
            constructor(address initial) {
                owner = initial;
            }
            function renounce() public onlyOwner {
                owner = address(0);
            }
        }
    "#;
    let ast = parse_source(source).unwrap();
    let ir = lower(&ast);
    let contract = ir.contract_by_name("Owned").unwrap();

    let constructor = contract.constructor.as_ref().expect("constructor");
    assert_eq!(constructor.parameters.len(), 1);
    assert_eq!(constructor.signature, "");

    assert_eq!(contract.modifiers.len(), 1);
    assert_eq!(contract.modifiers[0].name, "onlyOwner");

    let renounce = contract.function_by_name("renounce").unwrap();
    assert_eq!(renounce.modifiers, vec!["onlyOwner".to_string()]);
}

#[test]
fn entry_contract_tracks_ast_entry_unit() {
    let ast = parse_source("contract A {} contract B {}").unwrap();
    let ir = lower(&ast);
    assert_eq!(ir.entry_contract_name, "B");
    assert_eq!(
        ir.entry_contract().unwrap().id,
        ir.entry_contract_id
    );
}

#[test]
fn lowering_is_deterministic() {
    let source = r#"
        contract D {
            uint a;
            uint b;
            event E(uint);
            function f() public {}
            function g() public {}
        }
    "#;
    let first = serde_json::to_string(&lower(&parse_source(source).unwrap())).unwrap();
    let second = serde_json::to_string(&lower(&parse_source(source).unwrap())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn signature_raw_parses_back_to_parameter_types() {
    let source = r#"
        contract P {
            function mix(uint a, address b, bytes32 c, uint8[] d) public {}
        }
    "#;
    let ast = parse_source(source).unwrap();
    let ir = lower(&ast);
    let function = ir.contracts[0].function_by_name("mix").unwrap();

    let inner = function
        .signature_raw
        .strip_prefix("mix(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap();
    let parsed: Vec<&str> = inner.split(',').collect();
    let expected: Vec<String> = function
        .parameters
        .iter()
        .map(|p| p.type_name.clone())
        .collect();
    assert_eq!(parsed, expected);
    assert_eq!(parsed, vec!["uint256", "address", "bytes32", "uint8[]"]);
}
