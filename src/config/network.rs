//! Network profiles: every constant a swap session needs for one chain.

use alloy::primitives::{address, Address};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

use crate::interfaces::{LegDirection, SwapPair};

pub const NEWTON_RPC_URL: &str = "https://evmrpc-testnet.0g.ai";
pub const NEWTON_EXPLORER_TX_URL: &str = "https://chainscan-newton.0g.ai/tx/";

const NEWTON_ROUTER: Address = address!("D86b764618c6E3C078845BE3c3fCe50CE9535Da7");
const NEWTON_USDT: Address = address!("9A87C2412d500343c073E5Ae5394E3bE3874F76b");
const NEWTON_ETH: Address = address!("ce830D0905e0f7A9b300401729761579c5FB6bd6");
const NEWTON_BTC: Address = address!("1e0d871472973c562650e991ed8006549f8cbefc");

/// 0.3% pool.
pub const DEFAULT_FEE_TIER: u32 = 3000;
pub const DEFAULT_DEADLINE_SECS: u64 = 300;
const FIXED_GAS_PRICE_WEI: u128 = 20_000_000_000;

/// Inclusive range a random swap amount is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountBand {
    pub min: Decimal,
    pub max: Decimal,
    /// Decimal places kept on the sampled amount.
    pub display_precision: u32,
}

impl AmountBand {
    pub const fn new(min: Decimal, max: Decimal, display_precision: u32) -> Self {
        Self { min, max, display_precision }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
    pub amount_band: AmountBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPrice {
    Fixed(u128),
    /// Ask the node before every transaction.
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    pub price: GasPrice,
    /// Query the account nonce and pin it on every transaction.
    pub explicit_nonce: bool,
    pub approve_gas_limit: u64,
    pub forward_swap_gas_limit: u64,
    pub reverse_swap_gas_limit: u64,
}

impl GasPolicy {
    pub fn swap_gas_limit(&self, direction: LegDirection) -> u64 {
        match direction {
            LegDirection::Forward => self.forward_swap_gas_limit,
            LegDirection::Reverse => self.reverse_swap_gas_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total approve-and-swap attempts per leg, first try included.
    pub max_attempts: u32,
    pub rotate_on_pool_full: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause between a confirmed approval and the swap that spends it.
    pub approval_settle: Duration,
    /// Pause between the forward and reverse legs of a round trip.
    pub between_legs: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            approval_settle: Duration::from_secs(5),
            between_legs: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: String,
    pub rpc_endpoints: Vec<String>,
    pub router: Address,
    pub stable: TokenConfig,
    pub token_a: TokenConfig,
    pub token_b: TokenConfig,
    pub fee_tier: u32,
    pub deadline_secs: u64,
    pub gas: GasPolicy,
    pub retry: RetryPolicy,
    pub pacing: Pacing,
    pub explorer_tx_url: String,
}

impl NetworkProfile {
    /// Single RPC, fixed 20 gwei gas price, provider-managed nonces, no failover.
    pub fn newton_simple() -> Self {
        Self {
            name: "simple".to_string(),
            rpc_endpoints: vec![NEWTON_RPC_URL.to_string()],
            router: NEWTON_ROUTER,
            stable: newton_usdt(),
            token_a: newton_eth(),
            token_b: newton_btc(),
            fee_tier: DEFAULT_FEE_TIER,
            deadline_secs: DEFAULT_DEADLINE_SECS,
            gas: GasPolicy {
                price: GasPrice::Fixed(FIXED_GAS_PRICE_WEI),
                explicit_nonce: false,
                approve_gas_limit: 100_000,
                forward_swap_gas_limit: 300_000,
                reverse_swap_gas_limit: 500_000,
            },
            retry: RetryPolicy {
                max_attempts: 1,
                rotate_on_pool_full: false,
            },
            pacing: Pacing::default(),
            explorer_tx_url: NEWTON_EXPLORER_TX_URL.to_string(),
        }
    }

    /// Network gas price, pinned nonces, rotate once when a mempool is full.
    ///
    /// Ships with the public endpoint only; extra endpoints come from `RPC_URLS`.
    pub fn newton_failover() -> Self {
        Self {
            name: "failover".to_string(),
            gas: GasPolicy {
                price: GasPrice::Network,
                explicit_nonce: true,
                ..Self::newton_simple().gas
            },
            retry: RetryPolicy {
                max_attempts: 2,
                rotate_on_pool_full: true,
            },
            ..Self::newton_simple()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "simple" => Some(Self::newton_simple()),
            "failover" => Some(Self::newton_failover()),
            _ => None,
        }
    }

    /// `(input, output)` tokens of the forward leg of `pair`.
    pub fn pair_tokens(&self, pair: SwapPair) -> (&TokenConfig, &TokenConfig) {
        match pair {
            SwapPair::StableTokenA => (&self.stable, &self.token_a),
            SwapPair::StableTokenB => (&self.stable, &self.token_b),
        }
    }

    pub fn explorer_url(&self, tx_hash: impl std::fmt::Display) -> String {
        format!("{}{}", self.explorer_tx_url, tx_hash)
    }
}

fn newton_usdt() -> TokenConfig {
    TokenConfig {
        symbol: "USDT".to_string(),
        address: NEWTON_USDT,
        decimals: 18,
        amount_band: AmountBand::new(dec!(0.5), dec!(2.0), 2),
    }
}

fn newton_eth() -> TokenConfig {
    TokenConfig {
        symbol: "ETH".to_string(),
        address: NEWTON_ETH,
        decimals: 18,
        amount_band: AmountBand::new(dec!(0.0002), dec!(0.0005), 6),
    }
}

fn newton_btc() -> TokenConfig {
    TokenConfig {
        symbol: "BTC".to_string(),
        address: NEWTON_BTC,
        decimals: 8,
        amount_band: AmountBand::new(dec!(0.0002), dec!(0.0005), 6),
    }
}
