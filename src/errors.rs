use ethers::types::H256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    #[error("No private key found: {0}")]
    KeyNotFound(String),
    #[error("Private key parse error: {0}")]
    PrivateKeyParse(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unit conversion error: {0}")]
    Conversion(String),
    #[error("RPC connection error: {0}")]
    RpcConnect(String),
    #[error("RPC request error: {0}")]
    RpcRequest(String),
    #[error("Signature failure: {0}")]
    SignatureFailure(String),
    #[error("Broadcast error: {0}")]
    Broadcast(String),
    #[error("Broadcast returned hash {remote:#x}, expected locally computed {local:#x}")]
    HashMismatch { local: H256, remote: H256 },
    #[error("{0}")]
    Usage(String),
    #[error("I/O error: {0}")]
    Io(String),
}
