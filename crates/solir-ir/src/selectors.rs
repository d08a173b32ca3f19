use sha3::{Digest, Keccak256};

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of the Keccak-256 of the canonical signature,
/// hex-encoded with a `0x` prefix: the function selector.
pub fn function_selector(signature: &str) -> String {
    let digest = keccak256(signature.as_bytes());
    format!("0x{}", hex::encode(&digest[..4]))
}

/// Full 32-byte topic hash for an event signature.
pub fn event_topic(signature: &str) -> String {
    let digest = keccak256(signature.as_bytes());
    format!("0x{}", hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_selector() {
        assert_eq!(function_selector("transfer(address,uint256)"), "0xa9059cbb");
        assert_eq!(
            function_selector("transferFrom(address,address,uint256)"),
            "0x23b872dd"
        );
        assert_eq!(function_selector("approve(address,uint256)"), "0x095ea7b3");
        assert_eq!(function_selector("balanceOf(address)"), "0x70a08231");
        assert_eq!(function_selector("totalSupply()"), "0x18160ddd");
    }

    #[test]
    fn erc20_transfer_topic() {
        assert_eq!(
            event_topic("Transfer(address,address,uint256)"),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }
}
