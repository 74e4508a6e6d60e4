//! Raw transaction submission.

use crate::networks::NetworkProfile;
use crate::prelude::*;
use crate::transfer::SignedTransfer;
use crate::ui;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::H256;

/// Outcome of a successful broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastResult {
    pub tx_hash: H256,
    pub explorer_url: String,
}

/// Submit the signed raw bytes. Errors from the node (stale nonce,
/// insufficient funds, malformed encoding) propagate unchanged; there is
/// exactly one submission pass, no retry. The hash the network reports
/// must equal the one computed at signing time.
pub async fn broadcast_transfer(
    provider: &Provider<Http>,
    network: &NetworkProfile,
    signed: &SignedTransfer,
) -> Result<BroadcastResult> {
    ui::info("Broadcasting transaction...");
    let pending = provider
        .send_raw_transaction(signed.raw.clone())
        .await
        .map_err(|e| Error::Broadcast(e.to_string()))?;
    let tx_hash = pending.tx_hash();

    if tx_hash != signed.hash {
        return Err(Error::HashMismatch {
            local: signed.hash,
            remote: tx_hash,
        });
    }

    let explorer_url = network.explorer_url(&tx_hash);
    ui::info("Transaction broadcast!");
    println!("  Tx Hash: {tx_hash:#x}");
    println!("  Explorer: {explorer_url}");

    Ok(BroadcastResult {
        tx_hash,
        explorer_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::KeyMaterial;
    use crate::transfer::{sign_transfer, DEFAULT_GAS_LIMIT};
    use ethers::signers::Signer;
    use ethers::types::{Address, TransactionRequest};
    use ethers::utils::parse_ether;

    #[tokio::test]
    async fn unreachable_endpoint_propagates_broadcast_error() {
        let wallet = KeyMaterial::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .wallet()
        .unwrap()
        .with_chain_id(11155111u64);
        let tx = TransactionRequest::new()
            .to("0x000000000000000000000000000000000000dEaD".parse::<Address>().unwrap())
            .value(parse_ether("0.001").unwrap())
            .nonce(0u64)
            .gas(DEFAULT_GAS_LIMIT)
            .gas_price(20_000_000_000u64)
            .chain_id(11155111u64);
        let signed = sign_transfer(&wallet, &tx).unwrap();

        // Nothing listens here; the call must fail with a Broadcast error
        // rather than panic or retry.
        let provider = Provider::<Http>::try_from("http://127.0.0.1:1").unwrap();
        let network = NetworkProfile::by_name("sepolia").unwrap();
        let err = broadcast_transfer(&provider, network, &signed)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Broadcast(_)));
    }
}
