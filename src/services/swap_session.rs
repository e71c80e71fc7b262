//! One wallet's swap session: approve, swap, and swap back through the router.

use alloy::primitives::{Address, TxHash, U256};
use chrono::{Local, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use tokio::time::sleep;

use crate::config::{GasPrice, NetworkProfile, TokenConfig};
use crate::interfaces::{
    ChainClient, ClientError, ExactInputSingleArgs, LegDirection, SwapPair, SwapResult, TxCall,
    TxOverrides,
};
use crate::utils::amount::{sample_amount, to_base_units, AmountError};
use crate::utils::evm_client::EvmClient;
use crate::utils::logger::{LogLevel, Logger};
use crate::utils::proxy::{build_http_client, redact_proxy};

const MEMPOOL_FULL: &str = "mempool is full";

/// True when a node rejected a transaction because its pending pool is saturated.
pub fn is_mempool_full(message: &str) -> bool {
    message.to_lowercase().contains(MEMPOOL_FULL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundTripState {
    Idle,
    ApprovingForward,
    SwappingForward,
    Waiting,
    ApprovingReverse,
    SwappingReverse,
    Done,
    Failed,
}

/// Everything needed to run one leg, sampled fresh per leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPlan {
    pub input: TokenConfig,
    pub output: TokenConfig,
    pub direction: LegDirection,
    /// Human-readable amount, at the input band's display precision.
    pub amount: Decimal,
    /// `amount` scaled to the input token's decimals.
    pub amount_in: U256,
    pub gas_limit: u64,
    pub fee_tier: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripReport {
    pub pair: SwapPair,
    pub state: RoundTripState,
    pub forward: Option<SwapResult>,
    /// `None` when the reverse leg was never attempted.
    pub reverse: Option<SwapResult>,
}

impl RoundTripReport {
    pub fn is_complete(&self) -> bool {
        self.state == RoundTripState::Done
    }
}

pub struct SwapSession<C: ChainClient> {
    client: C,
    profile: NetworkProfile,
    endpoint_index: usize,
    /// Outbound proxy baked into the client's transport, kept for labels.
    proxy: Option<String>,
    state: RoundTripState,
    current: usize,
    total: usize,
    rng: StdRng,
}

impl SwapSession<EvmClient> {
    /// Build a session backed by alloy, on the profile's first endpoint and through `proxy` if set.
    pub fn connect(
        private_key: &str,
        profile: NetworkProfile,
        proxy: Option<&str>,
        current: usize,
        total: usize,
    ) -> Result<Self, ClientError> {
        let endpoint = profile
            .rpc_endpoints
            .first()
            .cloned()
            .ok_or_else(|| ClientError::InvalidEndpoint {
                endpoint: String::new(),
                reason: format!("profile {} has no rpc endpoints", profile.name),
            })?;
        let http = build_http_client(proxy, current, total)?;
        let client = EvmClient::new(private_key, &endpoint, http)?;
        let mut session = Self::new(client, profile, current, total);
        session.proxy = proxy.map(str::to_string);
        Ok(session)
    }
}

impl<C: ChainClient> SwapSession<C> {
    pub fn new(client: C, profile: NetworkProfile, current: usize, total: usize) -> Self {
        let endpoint_index = profile
            .rpc_endpoints
            .iter()
            .position(|endpoint| endpoint == client.endpoint())
            .unwrap_or(0);
        Self {
            client,
            profile,
            endpoint_index,
            proxy: None,
            state: RoundTripState::Idle,
            current,
            total,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic amount sampling.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn address(&self) -> Address {
        self.client.address()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn endpoint_index(&self) -> usize {
        self.endpoint_index
    }

    pub fn current_endpoint(&self) -> &str {
        self.profile
            .rpc_endpoints
            .get(self.endpoint_index)
            .map(String::as_str)
            .unwrap_or_else(|| self.client.endpoint())
    }

    pub fn state(&self) -> RoundTripState {
        self.state
    }

    fn log(&self, message: &str, level: LogLevel) {
        Logger::log(self.current, self.total, message, level);
    }

    fn enter(&mut self, state: RoundTripState) {
        tracing::debug!(wallet = self.current, from = ?self.state, to = ?state, "round trip state");
        self.state = state;
    }

    /// Sample an amount from `input`'s band and size the leg.
    pub fn plan_leg(
        &mut self,
        input: &TokenConfig,
        output: &TokenConfig,
        direction: LegDirection,
    ) -> Result<SwapPlan, AmountError> {
        let amount = sample_amount(&input.amount_band, &mut self.rng)?;
        let amount_in = to_base_units(amount, input.decimals)?;
        Ok(SwapPlan {
            input: input.clone(),
            output: output.clone(),
            direction,
            amount,
            amount_in,
            gas_limit: self.profile.gas.swap_gas_limit(direction),
            fee_tier: self.profile.fee_tier,
        })
    }

    /// Advance to the next RPC endpoint (wrapping) and reconnect the client to it.
    ///
    /// The index only moves once the client is connected to the new endpoint.
    pub async fn rotate_endpoint(&mut self) {
        let count = self.profile.rpc_endpoints.len();
        if count == 0 {
            return;
        }
        let previous = self.current_endpoint().to_string();
        let next_index = (self.endpoint_index + 1) % count;
        let next = self.profile.rpc_endpoints[next_index].clone();

        match self.client.connect(&next).await {
            Ok(()) => {
                self.endpoint_index = next_index;
                let route = self.proxy().map(redact_proxy).unwrap_or_else(|| "direct".to_string());
                self.log(
                    &format!("Switched RPC endpoint: {} -> {} ({})", previous, next, route),
                    LogLevel::Warning,
                )
            }
            Err(e) => self.log(
                &format!("Failed to switch RPC endpoint to {}, staying on {}: {}", next, previous, e),
                LogLevel::Error,
            ),
        }
    }

    async fn overrides(&self, gas_limit: u64) -> Result<TxOverrides, ClientError> {
        let gas_price = match self.profile.gas.price {
            GasPrice::Fixed(wei) => wei,
            GasPrice::Network => self.client.gas_price().await?,
        };
        let nonce = if self.profile.gas.explicit_nonce {
            Some(self.client.transaction_count().await?)
        } else {
            None
        };
        Ok(TxOverrides { gas_limit, gas_price, nonce })
    }

    async fn try_approve_and_swap(&mut self, plan: &SwapPlan) -> Result<TxHash, ClientError> {
        let (approving, swapping) = match plan.direction {
            LegDirection::Forward => (RoundTripState::ApprovingForward, RoundTripState::SwappingForward),
            LegDirection::Reverse => (RoundTripState::ApprovingReverse, RoundTripState::SwappingReverse),
        };
        let router = self.profile.router;

        self.enter(approving);
        self.log(&format!("Approving {}", plan.input.symbol), LogLevel::Debug);
        let overrides = self.overrides(self.profile.gas.approve_gas_limit).await?;
        let approve_hash = self
            .client
            .submit(
                TxCall::Approve {
                    token: plan.input.address,
                    spender: router,
                    amount: plan.amount_in,
                },
                overrides,
            )
            .await?;
        self.client.wait_for_confirmation(approve_hash).await?;

        sleep(self.profile.pacing.approval_settle).await;

        self.enter(swapping);
        self.log(
            &format!("Swapping {} to {}", plan.input.symbol, plan.output.symbol),
            LogLevel::Debug,
        );
        let deadline = Utc::now().timestamp().max(0) as u64 + self.profile.deadline_secs;
        let overrides = self.overrides(plan.gas_limit).await?;
        let swap_hash = self
            .client
            .submit(
                TxCall::ExactInputSingle(ExactInputSingleArgs {
                    router,
                    token_in: plan.input.address,
                    token_out: plan.output.address,
                    fee: plan.fee_tier,
                    recipient: self.client.address(),
                    deadline,
                    amount_in: plan.amount_in,
                    amount_out_minimum: U256::ZERO,
                }),
                overrides,
            )
            .await?;
        self.client.wait_for_confirmation(swap_hash).await?;

        Ok(swap_hash)
    }

    /// Approve the router for `plan.amount_in`, then swap it, each confirmed before moving on.
    ///
    /// A full mempool rotates the endpoint and retries the whole leg, bounded by
    /// the profile's retry policy. Every other failure is returned as an error
    /// result carrying the client's message.
    pub async fn approve_and_swap(&mut self, plan: &SwapPlan) -> SwapResult {
        let max_attempts = self.profile.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match self.try_approve_and_swap(plan).await {
                Ok(tx_hash) => return SwapResult::success(tx_hash, plan.amount_in),
                Err(e) => e.to_string(),
            };

            let can_retry = self.profile.retry.rotate_on_pool_full && attempt < max_attempts;
            if !(can_retry && is_mempool_full(&error)) {
                return SwapResult::error(error);
            }

            self.log(
                &format!(
                    "Mempool is full on {} (attempt {}/{}), rotating RPC endpoint",
                    self.current_endpoint(),
                    attempt,
                    max_attempts
                ),
                LogLevel::Warning,
            );
            self.rotate_endpoint().await;
            attempt += 1;
        }
    }

    fn log_leg_success(&self, plan: &SwapPlan, result: &SwapResult) {
        let tx_hash = result
            .transaction_hash
            .map(|hash| hash.to_string())
            .unwrap_or_default();
        self.log(&format!("Status: {}", result.status), LogLevel::Success);
        self.log(&format!("Transaction Hash: {}", tx_hash), LogLevel::Success);
        self.log(&format!("Amount: {}", plan.amount), LogLevel::Success);
        self.log(
            &format!("Blockhash URL: {}", self.profile.explorer_url(&tx_hash)),
            LogLevel::Success,
        );
        Logger::separator();
    }

    fn fail(&mut self, pair: SwapPair, forward: Option<SwapResult>, reverse: Option<SwapResult>) -> RoundTripReport {
        self.enter(RoundTripState::Failed);
        RoundTripReport {
            pair,
            state: RoundTripState::Failed,
            forward,
            reverse,
        }
    }

    /// Swap a random stablecoin amount into the pair's other token and, if that
    /// succeeds, a fresh random amount of that token back.
    pub async fn process_round_trip(&mut self, pair: SwapPair) -> RoundTripReport {
        self.enter(RoundTripState::Idle);
        let (stable, other) = {
            let (stable, other) = self.profile.pair_tokens(pair);
            (stable.clone(), other.clone())
        };

        let forward_plan = match self.plan_leg(&stable, &other, LegDirection::Forward) {
            Ok(plan) => plan,
            Err(e) => {
                self.log(&format!("Transaction failed: {}", e), LogLevel::Error);
                return self.fail(pair, None, None);
            }
        };

        self.log(
            &format!(
                "Transaction {}/{} started at {}",
                stable.symbol,
                other.symbol,
                Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            LogLevel::Success,
        );

        let forward = self.approve_and_swap(&forward_plan).await;
        if !forward.is_success() {
            self.log(
                &format!("Transaction failed: {}", forward.message.as_deref().unwrap_or_default()),
                LogLevel::Error,
            );
            return self.fail(pair, Some(forward), None);
        }
        self.log_leg_success(&forward_plan, &forward);

        self.enter(RoundTripState::Waiting);
        sleep(self.profile.pacing.between_legs).await;

        let reverse_plan = match self.plan_leg(&other, &stable, LegDirection::Reverse) {
            Ok(plan) => plan,
            Err(e) => {
                self.log(&format!("Transaction failed: {}", e), LogLevel::Error);
                return self.fail(pair, Some(forward), None);
            }
        };

        let reverse = self.approve_and_swap(&reverse_plan).await;
        if !reverse.is_success() {
            self.log(
                &format!("Transaction failed: {}", reverse.message.as_deref().unwrap_or_default()),
                LogLevel::Error,
            );
            return self.fail(pair, Some(forward), Some(reverse));
        }
        self.log_leg_success(&reverse_plan, &reverse);

        self.enter(RoundTripState::Done);
        RoundTripReport {
            pair,
            state: RoundTripState::Done,
            forward: Some(forward),
            reverse: Some(reverse),
        }
    }
}
