//! Fixed table of public networks the tool can talk to.

use crate::prelude::*;
use ethers::types::H256;

/// Static configuration for one network: RPC endpoint, chain id, and the
/// block-explorer prefix used to render transaction links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: &'static str,
    pub rpc_url: &'static str,
    pub chain_id: u64,
    pub explorer: &'static str,
}

/// Public RPC endpoints. Sepolia is recommended for testing.
pub const NETWORKS: [NetworkProfile; 3] = [
    NetworkProfile {
        name: "sepolia",
        rpc_url: "https://rpc.sepolia.org",
        chain_id: 11155111,
        explorer: "https://sepolia.etherscan.io/tx/",
    },
    NetworkProfile {
        name: "goerli",
        rpc_url: "https://rpc.ankr.com/eth_goerli",
        chain_id: 5,
        explorer: "https://goerli.etherscan.io/tx/",
    },
    NetworkProfile {
        name: "mainnet",
        rpc_url: "https://eth.llamarpc.com",
        chain_id: 1,
        explorer: "https://etherscan.io/tx/",
    },
];

pub const DEFAULT_NETWORK: &str = "sepolia";

impl NetworkProfile {
    /// Look up a profile by name. Unknown names are a usage error that
    /// lists the valid choices.
    pub fn by_name(name: &str) -> Result<&'static NetworkProfile> {
        NETWORKS.iter().find(|n| n.name == name).ok_or_else(|| {
            Error::UnknownNetwork(format!("{name}. Available: {}", names().join(", ")))
        })
    }

    /// Explorer link for a transaction hash on this network.
    pub fn explorer_url(&self, tx_hash: &H256) -> String {
        format!("{}{tx_hash:#x}", self.explorer)
    }
}

/// The valid `--network` choices, in table order.
pub fn names() -> Vec<&'static str> {
    NETWORKS.iter().map(|n| n.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_networks_resolve() {
        assert_eq!(NetworkProfile::by_name("sepolia").unwrap().chain_id, 11155111);
        assert_eq!(NetworkProfile::by_name("goerli").unwrap().chain_id, 5);
        assert_eq!(NetworkProfile::by_name("mainnet").unwrap().chain_id, 1);
    }

    #[test]
    fn default_network_is_in_table() {
        assert!(NetworkProfile::by_name(DEFAULT_NETWORK).is_ok());
    }

    #[test]
    fn unknown_network_lists_choices() {
        let err = NetworkProfile::by_name("holesky").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown network: holesky"), "got: {msg}");
        assert!(msg.contains("sepolia, goerli, mainnet"), "got: {msg}");
    }

    #[test]
    fn explorer_url_appends_full_hash() {
        let sepolia = NetworkProfile::by_name("sepolia").unwrap();
        let url = sepolia.explorer_url(&H256::zero());
        assert_eq!(
            url,
            format!("https://sepolia.etherscan.io/tx/0x{}", "0".repeat(64))
        );
    }
}
