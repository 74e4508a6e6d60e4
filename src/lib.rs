//! Sign Ethereum value transfers with a private key loaded from an
//! encrypted secrets mount.
//!
//! ECDSA signing, RLP encoding, and JSON-RPC are delegated to [`ethers`];
//! this crate supplies key discovery on the mount, legacy transfer
//! assembly against a fixed set of networks, and broadcast plumbing.

mod broadcast;
mod errors;
pub mod keystore;
mod networks;
pub mod prelude;
mod transfer;
pub mod ui;

pub use broadcast::{broadcast_transfer, BroadcastResult};
pub use errors::Error;
pub use keystore::{load_private_key, KeyMaterial, KeySource, SecretsConfig};
pub use networks::{names as network_names, NetworkProfile, DEFAULT_NETWORK, NETWORKS};
pub use transfer::{sign_transfer, SignedTransfer, TransferBuilder, DEFAULT_GAS_LIMIT};
