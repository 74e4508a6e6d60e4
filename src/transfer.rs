//! Legacy transfer construction and signing.
//!
//! Construction performs fresh RPC queries every invocation: nonce, gas
//! price, and balance are never cached, so concurrent invocations against
//! the same sender can race on nonce selection. That limitation is
//! inherent to the single-fetch approach and is left as-is.

use crate::keystore::KeyMaterial;
use crate::networks::NetworkProfile;
use crate::prelude::*;
use crate::ui;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, Signature, TransactionRequest, H256, U256};
use ethers::utils::{format_ether, format_units, keccak256, parse_ether, to_checksum};
use log::debug;
use std::fmt;

/// Gas limit of a plain value transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

/// A signed transfer ready for submission. Immutable once produced.
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    pub tx: TypedTransaction,
    pub signature: Signature,
    /// keccak256 of the raw encoding; must match the hash the network
    /// reports on broadcast.
    pub hash: H256,
    pub raw: Bytes,
}

/// Builds transfers against one network with one sender key. Holds the
/// live provider handle so a later broadcast reuses the same endpoint.
pub struct TransferBuilder {
    pub provider: Provider<Http>,
    pub wallet: LocalWallet,
    pub network: &'static NetworkProfile,
}

impl TransferBuilder {
    /// Resolve the network by name, connect to its RPC endpoint, and bind
    /// the sender key to its chain id. The `eth_chainId` call doubles as
    /// the liveness check; an unreachable endpoint is fatal here.
    pub async fn connect(network_name: &str, key: &KeyMaterial) -> Result<Self> {
        let network = NetworkProfile::by_name(network_name)?;
        let provider = Provider::<Http>::try_from(network.rpc_url).map_err(|e| {
            Error::RpcConnect(format!("invalid RPC URL {}: {e}", network.rpc_url))
        })?;

        let remote_chain_id = provider.get_chainid().await.map_err(|e| {
            Error::RpcConnect(format!(
                "cannot connect to {} RPC {}: {e}",
                network.name, network.rpc_url
            ))
        })?;
        if remote_chain_id != U256::from(network.chain_id) {
            ui::warn(format!(
                "RPC reports chain id {remote_chain_id}, expected {}",
                network.chain_id
            ));
        }

        let wallet = key.wallet()?.with_chain_id(network.chain_id);
        ui::info(format!("From address: {}", to_checksum(&wallet.address(), None)));
        ui::info(format!("Network: {} (chain_id: {})", network.name, network.chain_id));

        Ok(Self {
            provider,
            wallet,
            network,
        })
    }

    /// Sender address derived from the key.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Assemble an unsigned transfer: fetch nonce, gas price, and balance
    /// from the network, convert the whole-unit amount to wei, and warn
    /// (without failing) when the balance cannot cover the total cost.
    pub async fn build(
        &self,
        to: &str,
        value_eth: &str,
        gas_limit: u64,
    ) -> Result<TransactionRequest> {
        let to: Address = to
            .parse()
            .map_err(|e| Error::InvalidAddress(format!("{to}: {e}")))?;
        let from = self.wallet.address();

        let nonce = self
            .provider
            .get_transaction_count(from, None)
            .await
            .map_err(|e| Error::RpcRequest(format!("failed to get nonce: {e}")))?;
        ui::info(format!("Nonce: {nonce}"));

        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| Error::RpcRequest(format!("failed to get gas price: {e}")))?;
        let gas_price_gwei =
            format_units(gas_price, "gwei").map_err(|e| Error::Conversion(e.to_string()))?;
        ui::info(format!("Gas price: {gas_price_gwei} Gwei"));

        let balance = self
            .provider
            .get_balance(from, None)
            .await
            .map_err(|e| Error::RpcRequest(format!("failed to get balance: {e}")))?;
        ui::info(format!("Balance: {} ETH", format_ether(balance)));

        let value_wei =
            parse_ether(value_eth).map_err(|e| Error::InvalidAmount(format!("{value_eth}: {e}")))?;
        let total_cost = transfer_cost(value_wei, gas_limit, gas_price);
        if balance < total_cost {
            ui::warn(format!("Insufficient balance! Need {} ETH", format_ether(total_cost)));
            ui::warn("Transaction will be signed but will fail if broadcast");
        }

        let tx = TransactionRequest::new()
            .to(to)
            .value(value_wei)
            .nonce(nonce)
            .gas(gas_limit)
            .gas_price(gas_price)
            .chain_id(self.network.chain_id);

        ui::info("Transaction built:");
        println!("  To:       {}", to_checksum(&to, None));
        println!("  Value:    {value_eth} ETH ({value_wei} wei)");
        println!("  Gas:      {gas_limit}");
        println!(
            "  Gas Cost: ~{} ETH",
            format_ether(gas_price * U256::from(gas_limit))
        );

        Ok(tx)
    }
}

impl fmt::Debug for TransferBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferBuilder")
            .field("network", &self.network.name)
            .field("rpc_url", &self.network.rpc_url)
            .field("from", &self.wallet.address())
            .finish()
    }
}

/// Total wei the sender must hold: value plus worst-case gas cost.
pub fn transfer_cost(value: U256, gas_limit: u64, gas_price: U256) -> U256 {
    value + gas_price * U256::from(gas_limit)
}

/// Sign a transfer with the legacy sighash scheme. Deterministic for fixed
/// inputs and usable offline: no provider involved.
pub fn sign_transfer(wallet: &LocalWallet, tx: &TransactionRequest) -> Result<SignedTransfer> {
    let typed: TypedTransaction = tx.clone().into();
    let signature = wallet
        .sign_transaction_sync(&typed)
        .map_err(|e| Error::SignatureFailure(e.to_string()))?;
    let raw = typed.rlp_signed(&signature);
    let hash = H256::from(keccak256(&raw));
    debug!("signed transfer, {} raw bytes", raw.len());

    ui::info("Transaction signed!");
    let raw_hex = hex::encode(&raw);
    println!("  Tx Hash:  {hash:#x}");
    println!("  Raw Tx:   0x{}...", &raw_hex[..raw_hex.len().min(80)]);

    Ok(SignedTransfer {
        tx: typed,
        signature,
        hash,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::KeyMaterial;

    // secp256k1 private key 0x...01; its address is the reference vector
    // 0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf.
    const TEST_KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";
    const BURN_ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";
    const SEPOLIA_CHAIN_ID: u64 = 11155111;
    const TWENTY_GWEI: u64 = 20_000_000_000;

    fn test_wallet() -> LocalWallet {
        KeyMaterial::from_hex(TEST_KEY)
            .wallet()
            .unwrap()
            .with_chain_id(SEPOLIA_CHAIN_ID)
    }

    // The fixed scenario: 0.001 ETH to the burn address on Sepolia,
    // nonce 0, 21000 gas at 20 gwei.
    fn demo_tx() -> TransactionRequest {
        TransactionRequest::new()
            .to(BURN_ADDRESS.parse::<Address>().unwrap())
            .value(parse_ether("0.001").unwrap())
            .nonce(0u64)
            .gas(DEFAULT_GAS_LIMIT)
            .gas_price(TWENTY_GWEI)
            .chain_id(SEPOLIA_CHAIN_ID)
    }

    #[test]
    fn signing_is_deterministic() {
        let wallet = test_wallet();
        let first = sign_transfer(&wallet, &demo_tx()).unwrap();
        let second = sign_transfer(&wallet, &demo_tx()).unwrap();
        assert_eq!(first.signature, second.signature);
        assert_eq!(first.hash, second.hash);
        assert_eq!(first.raw, second.raw);
    }

    #[test]
    fn hash_is_keccak_of_raw_encoding() {
        let signed = sign_transfer(&test_wallet(), &demo_tx()).unwrap();
        assert_eq!(signed.hash, H256::from(keccak256(&signed.raw)));
    }

    #[test]
    fn raw_encoding_is_a_legacy_rlp_list() {
        let signed = sign_transfer(&test_wallet(), &demo_tx()).unwrap();
        // A signed legacy transfer of this size encodes as an RLP list
        // with a one-byte length prefix (0xf8).
        assert_eq!(signed.raw[0], 0xf8);
    }

    #[test]
    fn signature_recovers_sender_address() {
        let wallet = test_wallet();
        let signed = sign_transfer(&wallet, &demo_tx()).unwrap();
        let recovered = signed.signature.recover(signed.tx.sighash()).unwrap();
        assert_eq!(recovered, wallet.address());
        assert_eq!(
            recovered,
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".parse().unwrap()
        );
    }

    #[test]
    fn signature_v_encodes_chain_id_eip155() {
        let signed = sign_transfer(&test_wallet(), &demo_tx()).unwrap();
        let base = SEPOLIA_CHAIN_ID * 2 + 35;
        assert!(signed.signature.v == base || signed.signature.v == base + 1);
    }

    #[test]
    fn transfer_cost_adds_worst_case_gas() {
        let value = parse_ether("0.001").unwrap();
        let cost = transfer_cost(value, DEFAULT_GAS_LIMIT, U256::from(TWENTY_GWEI));
        let expected = value + U256::from(TWENTY_GWEI) * U256::from(DEFAULT_GAS_LIMIT);
        assert_eq!(cost, expected);
        // 0.001 ETH + 21000 * 20 gwei = 0.00142 ETH
        assert_eq!(cost, parse_ether("0.00142").unwrap());
    }
}
