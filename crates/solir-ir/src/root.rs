use crate::contract::Contract;
use crate::standards::Standard;
use serde::{Deserialize, Serialize};

/// One detected standard on one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eip {
    pub standard: Standard,
    pub contract_id: i64,
    pub contract_name: String,
    pub confidence: f64,
}

/// Root of the lowered representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Root {
    pub entry_contract_id: i64,
    pub entry_contract_name: String,
    pub contracts_count: i32,
    pub contract_types: Vec<String>,
    pub eips: Vec<Eip>,
    pub contracts: Vec<Contract>,
}

impl Root {
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn has_contracts(&self) -> bool {
        !self.contracts.is_empty()
    }

    pub fn contract_by_name(&self, name: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.name == name)
    }

    pub fn contract_by_id(&self, id: i64) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.id == id)
    }

    pub fn entry_contract(&self) -> Option<&Contract> {
        self.contract_by_id(self.entry_contract_id)
    }

    pub fn eips(&self) -> &[Eip] {
        &self.eips
    }

    pub fn has_eip(&self, standard: Standard) -> bool {
        self.eips.iter().any(|e| e.standard == standard)
    }

    pub fn contract_types(&self) -> &[String] {
        &self.contract_types
    }

    pub fn has_contract_type(&self, contract_type: &str) -> bool {
        self.contract_types.iter().any(|t| t == contract_type)
    }

    /// Tags the root with the contract type a detected standard implies.
    pub fn set_contract_type(&mut self, standard: Standard) {
        match standard {
            Standard::Erc20 => self.append_contract_type("token"),
            Standard::Erc721 | Standard::Erc1155 => self.append_contract_type("nft"),
            Standard::Erc1967 | Standard::Erc1820 => {
                self.append_contract_type("proxy");
                self.append_contract_type("upgradeable");
            }
        }
    }

    /// De-duplicated, insertion-ordered.
    fn append_contract_type(&mut self, contract_type: &str) {
        if !self.has_contract_type(contract_type) {
            self.contract_types.push(contract_type.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_types_deduplicate_and_keep_order() {
        let mut root = Root::default();
        root.set_contract_type(Standard::Erc1967);
        root.set_contract_type(Standard::Erc1820);
        root.set_contract_type(Standard::Erc20);
        assert_eq!(root.contract_types, vec!["proxy", "upgradeable", "token"]);
    }
}
