use solir::{analyze, Sources, Standard};

#[test]
fn minimal_contract_end_to_end() {
    let sources = Sources::from_single("Foo.sol", "contract Foo { uint x; }");
    let (ast, ir) = analyze(&sources).unwrap();

    assert_eq!(ast.source_unit_count(), 1);
    let contract = ast.units().next().unwrap().contract().unwrap();
    assert!(contract.fully_implemented);

    assert_eq!(ir.contracts_count, 1);
    assert!(ir.eips.is_empty());
    let lowered = &ir.contracts[0];
    assert_eq!(lowered.state_variables[0].type_identifier, "t_uint256");
    assert_eq!(lowered.absolute_path, "Foo.sol");
}

#[test]
fn token_pipeline_detects_erc20_and_emits_abi() {
    let source = r#"
        // SPDX-License-Identifier: MIT
        contract Coin {
            mapping(address => uint256) balances;
            function totalSupply() public view returns (uint) {}
            function balanceOf(address owner) public view returns (uint) {}
            function transfer(address to, uint amount) public returns (bool) {}
            function transferFrom(address from, address to, uint amount) public returns (bool) {}
            function approve(address spender, uint amount) public returns (bool) {}
            event Transfer(address indexed from, address indexed to, uint value);
            event Approval(address indexed owner, address indexed spender, uint value);
        }
    "#;
    let sources = Sources::from_single("Coin.sol", source);
    let (_, ir) = analyze(&sources).unwrap();

    assert!(ir.has_eip(Standard::Erc20));
    assert!(ir.has_contract_type("token"));
    assert_eq!(ir.contracts[0].license.as_deref(), Some("MIT"));

    let abi = solir::abi::emit_contract(&ir, &ir.contracts[0]);
    let transfer = abi
        .iter()
        .find(|e| e.name.as_deref() == Some("transfer"))
        .unwrap();
    let inputs = transfer.inputs.as_ref().unwrap();
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[1].type_name, "uint256");
}

#[test]
fn multi_file_build_resolves_cross_file_bases() {
    let mut sources = Sources::new();
    sources.push("Base.sol", "contract Base { function f() public {} }");
    sources.push("Child.sol", "contract Child is Base {}");
    let (ast, ir) = analyze(&sources).unwrap();

    let base = ast.source_unit_by_name("Base").unwrap().contract().unwrap();
    let child = ast.source_unit_by_name("Child").unwrap().contract().unwrap();
    assert_eq!(child.linearized_base_contracts, vec![child.id, base.id]);

    let lowered_child = ir.contract_by_name("Child").unwrap();
    assert_eq!(lowered_child.base_contracts, vec!["Base".to_string()]);
}

#[test]
fn whole_pipeline_is_deterministic() {
    let source = r#"
        contract Stable {
            uint counter;
            event Tick(uint value);
            function tick() public returns (uint) {
                counter = counter + 1;
                emit Tick(counter);
                return counter;
            }
        }
    "#;
    let run = || {
        let sources = Sources::from_single("Stable.sol", source);
        let (ast, ir) = analyze(&sources).unwrap();
        (
            serde_json::to_string(&ast).unwrap(),
            serde_json::to_string(&ir).unwrap(),
        )
    };
    let (ast_a, ir_a) = run();
    let (ast_b, ir_b) = run();
    assert_eq!(ast_a, ast_b);
    assert_eq!(ir_a, ir_b);
}

#[test]
fn ast_serialization_round_trips_byte_identical() {
    let sources = Sources::from_single(
        "Round.sol",
        "contract Round { uint x; function get() public view returns (uint) { return x; } }",
    );
    let (ast, _) = analyze(&sources).unwrap();

    let encoded = serde_json::to_string(&ast).unwrap();
    let decoded: solir::Root = serde_json::from_str(&encoded).unwrap();
    assert_eq!(encoded, serde_json::to_string(&decoded).unwrap());
}
