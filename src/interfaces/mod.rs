use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    Success,
    Error,
}

impl std::fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapStatus::Success => write!(f, "success"),
            SwapStatus::Error => write!(f, "error"),
        }
    }
}

/// Outcome of one approve-and-swap leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResult {
    pub status: SwapStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_in: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SwapResult {
    pub fn success(transaction_hash: TxHash, amount_in: U256) -> Self {
        Self {
            status: SwapStatus::Success,
            transaction_hash: Some(transaction_hash),
            amount_in: Some(amount_in),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SwapStatus::Error,
            transaction_hash: None,
            amount_in: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SwapStatus::Success
    }
}

/// The two fixed round trips a session can farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapPair {
    /// Stablecoin <-> token A (USDT/ETH on Newton).
    StableTokenA,
    /// Stablecoin <-> token B (USDT/BTC on Newton).
    StableTokenB,
}

/// Which direction of a round trip a leg belongs to. Selects the gas limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegDirection {
    Forward,
    Reverse,
}

/// Parameters of the router's `exactInputSingle`. `sqrtPriceLimitX96` is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactInputSingleArgs {
    pub router: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub deadline: u64,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

/// A contract call the session asks the client to sign and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxCall {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    ExactInputSingle(ExactInputSingleArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOverrides {
    pub gas_limit: u64,
    pub gas_price: u128,
    /// `None` lets the provider fill the nonce itself.
    pub nonce: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("invalid rpc endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("proxy setup failed: {0}")]
    Proxy(String),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    /// Raw message from the underlying provider, passed through untouched.
    #[error("{0}")]
    Rpc(String),
}

/// Capability surface the swap session needs from a blockchain client.
///
/// `EvmClient` implements this over alloy; tests substitute a recording mock.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address derived from the wallet's private key.
    fn address(&self) -> Address;

    /// RPC endpoint currently in use.
    fn endpoint(&self) -> &str;

    /// Re-establish the network connection against `endpoint`.
    async fn connect(&mut self, endpoint: &str) -> Result<(), ClientError>;

    /// Current network gas price in wei.
    async fn gas_price(&self) -> Result<u128, ClientError>;

    /// Current transaction count (next nonce) of the wallet.
    async fn transaction_count(&self) -> Result<u64, ClientError>;

    /// Sign and broadcast `call`, returning its hash without waiting.
    async fn submit(&self, call: TxCall, overrides: TxOverrides) -> Result<TxHash, ClientError>;

    /// Block until `tx_hash` is mined. A reverted receipt is an error.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ClientError>;
}
