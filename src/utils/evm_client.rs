//! `ChainClient` over alloy: signer, HTTP provider (optionally proxied), and contract encoding.

use alloy::network::TransactionBuilder;
use alloy::primitives::aliases::{U160, U24};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use alloy::transports::http::{reqwest, Http};
use async_trait::async_trait;
use std::str::FromStr;
use std::time::Duration;

use crate::config::abi::{IERC20, ISwapRouter};
use crate::interfaces::{ChainClient, ClientError, TxCall, TxOverrides};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub fn parse_signer(private_key: &str) -> Result<PrivateKeySigner, ClientError> {
    let private_key = if private_key.starts_with("0x") {
        private_key.to_string()
    } else {
        format!("0x{}", private_key)
    };
    PrivateKeySigner::from_str(&private_key).map_err(|e| ClientError::InvalidKey(e.to_string()))
}

pub fn derive_address(private_key: &str) -> Result<Address, ClientError> {
    Ok(parse_signer(private_key)?.address())
}

/// Target contract and ABI-encoded calldata for `call`.
pub fn encode_call(call: &TxCall) -> Result<(Address, Bytes), ClientError> {
    match call {
        TxCall::Approve { token, spender, amount } => {
            let input = IERC20::approveCall {
                spender: *spender,
                amount: *amount,
            }
            .abi_encode();
            Ok((*token, input.into()))
        }
        TxCall::ExactInputSingle(args) => {
            let fee = U24::try_from(args.fee)
                .map_err(|e| ClientError::Rpc(format!("fee tier {} out of range: {}", args.fee, e)))?;
            let params = ISwapRouter::ExactInputSingleParams {
                tokenIn: args.token_in,
                tokenOut: args.token_out,
                fee,
                recipient: args.recipient,
                deadline: U256::from(args.deadline),
                amountIn: args.amount_in,
                amountOutMinimum: args.amount_out_minimum,
                sqrtPriceLimitX96: U160::ZERO,
            };
            let input = ISwapRouter::exactInputSingleCall { params }.abi_encode();
            Ok((args.router, input.into()))
        }
    }
}

pub struct EvmClient {
    signer: PrivateKeySigner,
    http: reqwest::Client,
    endpoint: String,
    provider: DynProvider,
}

impl EvmClient {
    pub fn new(private_key: &str, endpoint: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        let signer = parse_signer(private_key)?;
        let provider = build_provider(&signer, &http, endpoint)?;
        Ok(Self {
            signer,
            http,
            endpoint: endpoint.to_string(),
            provider,
        })
    }

    /// Read-only access for diagnostics (balances, allowances).
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

fn rpc_client(http: &reqwest::Client, endpoint: &str) -> Result<RpcClient, ClientError> {
    let url: url::Url = endpoint.parse().map_err(|e: url::ParseError| ClientError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    Ok(RpcClient::new(Http::with_client(http.clone(), url), false))
}

fn build_provider(
    signer: &PrivateKeySigner,
    http: &reqwest::Client,
    endpoint: &str,
) -> Result<DynProvider, ClientError> {
    Ok(ProviderBuilder::new()
        .wallet(signer.clone())
        .connect_client(rpc_client(http, endpoint)?)
        .erased())
}

/// Provider without a wallet, for probing an endpoint.
pub fn read_only_provider(endpoint: &str, http: &reqwest::Client) -> Result<DynProvider, ClientError> {
    Ok(ProviderBuilder::new()
        .connect_client(rpc_client(http, endpoint)?)
        .erased())
}

fn rpc_error(e: impl std::fmt::Display) -> ClientError {
    ClientError::Rpc(e.to_string())
}

#[async_trait]
impl ChainClient for EvmClient {
    fn address(&self) -> Address {
        self.signer.address()
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn connect(&mut self, endpoint: &str) -> Result<(), ClientError> {
        self.provider = build_provider(&self.signer, &self.http, endpoint)?;
        self.endpoint = endpoint.to_string();
        tracing::debug!(endpoint, "provider reconnected");
        Ok(())
    }

    async fn gas_price(&self) -> Result<u128, ClientError> {
        let price = self.provider.get_gas_price().await.map_err(rpc_error)?;
        tracing::debug!(price = %price, endpoint = %self.endpoint, "network gas price");
        Ok(price)
    }

    async fn transaction_count(&self) -> Result<u64, ClientError> {
        let nonce = self
            .provider
            .get_transaction_count(self.address())
            .await
            .map_err(rpc_error)?;
        tracing::debug!(nonce, address = %self.address(), "account nonce");
        Ok(nonce)
    }

    async fn submit(&self, call: TxCall, overrides: TxOverrides) -> Result<TxHash, ClientError> {
        let (to, input) = encode_call(&call)?;
        let mut tx = TransactionRequest::default()
            .with_from(self.address())
            .with_to(to)
            .with_input(input)
            .with_gas_limit(overrides.gas_limit)
            .with_gas_price(overrides.gas_price);
        if let Some(nonce) = overrides.nonce {
            tx = tx.with_nonce(nonce);
        }

        let pending = self.provider.send_transaction(tx).await.map_err(rpc_error)?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(%tx_hash, %to, "transaction broadcast");
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ClientError> {
        loop {
            match self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(rpc_error)?
            {
                Some(receipt) if receipt.status() => return Ok(()),
                Some(_) => return Err(ClientError::Reverted(tx_hash)),
                None => {
                    tracing::trace!(%tx_hash, "receipt not yet available");
                    tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::ExactInputSingleArgs;
    use alloy::primitives::address;

    const TEST_KEY: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";

    #[test]
    fn derives_same_address_with_or_without_prefix() {
        let with_prefix = derive_address(TEST_KEY).unwrap();
        let without_prefix = derive_address(TEST_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(with_prefix, without_prefix);
        assert!(derive_address("0x1234").is_err());
    }

    #[test]
    fn approve_targets_token_with_erc20_selector() {
        let token = address!("9A87C2412d500343c073E5Ae5394E3bE3874F76b");
        let (to, input) = encode_call(&TxCall::Approve {
            token,
            spender: address!("D86b764618c6E3C078845BE3c3fCe50CE9535Da7"),
            amount: U256::from(1_000u64),
        })
        .unwrap();
        assert_eq!(to, token);
        assert_eq!(&input[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(input.len(), 4 + 32 * 2);
    }

    #[test]
    fn exact_input_single_targets_router_and_decodes_back() {
        let router = address!("D86b764618c6E3C078845BE3c3fCe50CE9535Da7");
        let args = ExactInputSingleArgs {
            router,
            token_in: address!("9A87C2412d500343c073E5Ae5394E3bE3874F76b"),
            token_out: address!("ce830D0905e0f7A9b300401729761579c5FB6bd6"),
            fee: 3000,
            recipient: Address::repeat_byte(0x11),
            deadline: 1_700_000_300,
            amount_in: U256::from(5u64),
            amount_out_minimum: U256::ZERO,
        };
        let (to, input) = encode_call(&TxCall::ExactInputSingle(args.clone())).unwrap();
        assert_eq!(to, router);

        let decoded = ISwapRouter::exactInputSingleCall::abi_decode(&input).unwrap();
        assert_eq!(decoded.params.fee, U24::from(3000u32));
        assert_eq!(decoded.params.deadline, U256::from(args.deadline));
        assert_eq!(decoded.params.amountOutMinimum, U256::ZERO);
        assert_eq!(decoded.params.sqrtPriceLimitX96, U160::ZERO);
    }

    #[test]
    fn rejects_fee_tier_wider_than_uint24() {
        let args = ExactInputSingleArgs {
            router: Address::ZERO,
            token_in: Address::ZERO,
            token_out: Address::ZERO,
            fee: 1 << 24,
            recipient: Address::ZERO,
            deadline: 0,
            amount_in: U256::ZERO,
            amount_out_minimum: U256::ZERO,
        };
        assert!(encode_call(&TxCall::ExactInputSingle(args)).is_err());
    }
}
