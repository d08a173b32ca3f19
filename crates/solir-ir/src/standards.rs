use crate::contract::Contract;
use crate::root::{Eip, Root};
use crate::selectors::{event_topic, function_selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Storage slot of an ERC-1967 implementation pointer,
/// `keccak256("eip1967.proxy.implementation") - 1`.
const ERC1967_IMPLEMENTATION_SLOT: &str =
    "360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standard {
    #[serde(rename = "ERC-20")]
    Erc20,
    #[serde(rename = "ERC-721")]
    Erc721,
    #[serde(rename = "ERC-1155")]
    Erc1155,
    #[serde(rename = "ERC-1967")]
    Erc1967,
    #[serde(rename = "ERC-1820")]
    Erc1820,
}

impl Standard {
    pub fn name(&self) -> &'static str {
        match self {
            Standard::Erc20 => "ERC-20",
            Standard::Erc721 => "ERC-721",
            Standard::Erc1155 => "ERC-1155",
            Standard::Erc1967 => "ERC-1967",
            Standard::Erc1820 => "ERC-1820",
        }
    }
}

/// A function pattern a standard requires: name, canonical input types and
/// (when the standard pins them) canonical output types.
#[derive(Debug, Clone)]
pub struct StandardFunction {
    pub name: &'static str,
    pub inputs: &'static [&'static str],
    pub outputs: &'static [&'static str],
}

impl StandardFunction {
    pub fn signature_raw(&self) -> String {
        format!("{}({})", self.name, self.inputs.join(","))
    }

    pub fn selector(&self) -> String {
        function_selector(&self.signature_raw())
    }
}

#[derive(Debug, Clone)]
pub struct StandardEvent {
    pub name: &'static str,
    pub inputs: &'static [&'static str],
}

impl StandardEvent {
    pub fn signature_raw(&self) -> String {
        format!("{}({})", self.name, self.inputs.join(","))
    }

    pub fn topic(&self) -> String {
        event_topic(&self.signature_raw())
    }
}

#[derive(Debug, Clone)]
pub struct StandardDefinition {
    pub standard: Standard,
    pub functions: Vec<StandardFunction>,
    pub events: Vec<StandardEvent>,
}

/// The registry of detectable standards.
pub fn registry() -> Vec<StandardDefinition> {
    vec![
        StandardDefinition {
            standard: Standard::Erc20,
            functions: vec![
                function("totalSupply", &[], &["uint256"]),
                function("balanceOf", &["address"], &["uint256"]),
                function("transfer", &["address", "uint256"], &["bool"]),
                function("transferFrom", &["address", "address", "uint256"], &["bool"]),
                function("approve", &["address", "uint256"], &["bool"]),
            ],
            events: vec![
                event("Transfer", &["address", "address", "uint256"]),
                event("Approval", &["address", "address", "uint256"]),
            ],
        },
        StandardDefinition {
            standard: Standard::Erc721,
            functions: vec![
                function("balanceOf", &["address"], &["uint256"]),
                function("ownerOf", &["uint256"], &["address"]),
                function("safeTransferFrom", &["address", "address", "uint256"], &[]),
                function("transferFrom", &["address", "address", "uint256"], &[]),
                function("approve", &["address", "uint256"], &[]),
            ],
            events: vec![event("Transfer", &["address", "address", "uint256"])],
        },
        StandardDefinition {
            standard: Standard::Erc1155,
            functions: vec![
                function(
                    "safeTransferFrom",
                    &["address", "address", "uint256", "uint256", "bytes"],
                    &[],
                ),
                function(
                    "safeBatchTransferFrom",
                    &["address", "address", "uint256[]", "uint256[]", "bytes"],
                    &[],
                ),
            ],
            events: vec![
                event(
                    "TransferSingle",
                    &["address", "address", "address", "uint256", "uint256"],
                ),
                event(
                    "TransferBatch",
                    &["address", "address", "address", "uint256[]", "uint256[]"],
                ),
                event("URI", &["string", "uint256"]),
            ],
        },
        StandardDefinition {
            standard: Standard::Erc1967,
            functions: vec![function("implementation", &[], &["address"])],
            events: vec![],
        },
        StandardDefinition {
            standard: Standard::Erc1820,
            functions: vec![function(
                "canImplementInterfaceForAddress",
                &["bytes32", "address"],
                &["bytes32"],
            )],
            events: vec![],
        },
    ]
}

fn function(
    name: &'static str,
    inputs: &'static [&'static str],
    outputs: &'static [&'static str],
) -> StandardFunction {
    StandardFunction {
        name,
        inputs,
        outputs,
    }
}

fn event(name: &'static str, inputs: &'static [&'static str]) -> StandardEvent {
    StandardEvent { name, inputs }
}

/// Matches every contract against the registry and records the hits on the
/// root. A contract satisfies a standard when every required function and
/// event is present in the union of its own surface and that of its
/// linearized bases.
pub(crate) fn detect(root: &mut Root) {
    let definitions = registry();
    let mut hits = Vec::new();

    for contract in &root.contracts {
        let surface = Surface::collect(contract, root);

        for definition in &definitions {
            if let Some(confidence) = matches(definition, &surface) {
                debug!(
                    contract = %contract.name,
                    standard = definition.standard.name(),
                    confidence,
                    "standard detected"
                );
                hits.push(Eip {
                    standard: definition.standard,
                    contract_id: contract.id,
                    contract_name: contract.name.clone(),
                    confidence,
                });
            }
        }
    }

    for hit in hits {
        let standard = hit.standard;
        root.eips.push(hit);
        root.set_contract_type(standard);
    }
}

/// The callable/observable surface of a contract plus its linearized bases.
struct Surface {
    function_signatures: HashSet<String>,
    function_outputs: Vec<(String, Vec<String>)>,
    event_signatures: HashSet<String>,
    assembly: String,
}

impl Surface {
    fn collect(contract: &Contract, root: &Root) -> Self {
        let mut function_signatures = HashSet::new();
        let mut function_outputs = Vec::new();
        let mut event_signatures = HashSet::new();
        let mut assembly = String::new();

        let mut chain: Vec<&Contract> = vec![contract];
        for base_id in &contract.linearized_base_contracts {
            if *base_id != contract.id {
                if let Some(base) = root.contract_by_id(*base_id) {
                    chain.push(base);
                }
            }
        }

        for member in chain {
            for f in &member.functions {
                function_signatures.insert(f.signature_raw.clone());
                function_outputs.push((
                    f.signature_raw.clone(),
                    f.return_parameters.iter().map(|p| p.type_name.clone()).collect(),
                ));
            }
            for e in &member.events {
                event_signatures.insert(e.signature_raw.clone());
            }
            for chunk in &member.assembly {
                assembly.push_str(chunk);
            }
        }

        Self {
            function_signatures,
            function_outputs,
            event_signatures,
            assembly,
        }
    }

    fn has_function(&self, required: &StandardFunction) -> bool {
        let signature = required.signature_raw();
        if !self.function_signatures.contains(&signature) {
            return false;
        }
        if required.outputs.is_empty() {
            return true;
        }
        self.function_outputs.iter().any(|(sig, outputs)| {
            sig == &signature && outputs.iter().map(String::as_str).eq(required.outputs.iter().copied())
        })
    }

    fn has_event(&self, required: &StandardEvent) -> bool {
        self.event_signatures.contains(&required.signature_raw())
    }
}

fn matches(definition: &StandardDefinition, surface: &Surface) -> Option<f64> {
    let all_functions = definition.functions.iter().all(|f| surface.has_function(f));
    let all_events = definition.events.iter().all(|e| surface.has_event(e));

    if all_functions && all_events {
        return Some(1.0);
    }

    // Proxies frequently hide the implementation pointer behind assembly
    // loads of the well-known slot instead of an accessor.
    if definition.standard == Standard::Erc1967
        && surface.assembly.contains(ERC1967_IMPLEMENTATION_SLOT)
    {
        return Some(0.75);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_selectors_match_known_values() {
        let definitions = registry();
        let erc20 = definitions
            .iter()
            .find(|d| d.standard == Standard::Erc20)
            .unwrap();

        let transfer = erc20
            .functions
            .iter()
            .find(|f| f.name == "transfer")
            .unwrap();
        assert_eq!(transfer.selector(), "0xa9059cbb");

        let approval = erc20.events.iter().find(|e| e.name == "Approval").unwrap();
        assert_eq!(approval.signature_raw(), "Approval(address,address,uint256)");
    }

    #[test]
    fn standard_names_serialize_with_dashes() {
        let json = serde_json::to_string(&Standard::Erc20).unwrap();
        assert_eq!(json, "\"ERC-20\"");
    }
}
