use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use alloy::providers::Provider;
use alloy::transports::http::reqwest;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Env;
use crate::interfaces::ChainClient;
use crate::utils::evm_client::{derive_address, read_only_provider, EvmClient};
use crate::utils::logger::Logger;
use crate::utils::proxy::build_http_client;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub checks: HealthChecks,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub rpc: Vec<EndpointCheck>,
    pub balances: Vec<BalanceCheckResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: String, // "ok" | "error"
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointCheck {
    pub endpoint: String,
    #[serde(flatten)]
    pub result: CheckResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceCheckResult {
    pub address: String,
    pub status: String, // "ok" | "error" | "warning"
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self { status: "ok".to_string(), message: message.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { status: "error".to_string(), message: message.into() }
    }
}

async fn within_timeout<T, E: std::fmt::Display>(
    request: impl std::future::IntoFuture<Output = Result<T, E>>,
) -> Result<T> {
    match tokio::time::timeout(CHECK_TIMEOUT, request).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => anyhow::bail!("{}", e),
        Err(_) => anyhow::bail!("timeout after {}s", CHECK_TIMEOUT.as_secs()),
    }
}

/// Classify a native balance: zero is an error, under 0.01 is a warning.
pub fn classify_balance(address: Address, balance: U256) -> BalanceCheckResult {
    let low_water = U256::from(10_000_000_000_000_000u64);
    let formatted = format_ether(balance);
    let (status, message) = if balance.is_zero() {
        ("error", "Zero balance, cannot pay gas".to_string())
    } else if balance < low_water {
        ("warning", format!("Low balance: {} A0GI", formatted))
    } else {
        ("ok", format!("Balance: {} A0GI", formatted))
    };

    BalanceCheckResult {
        address: address.to_string(),
        status: status.to_string(),
        message,
        balance: Some(formatted),
    }
}

async fn check_endpoint(endpoint: &str, http: &reqwest::Client) -> CheckResult {
    let provider = match read_only_provider(endpoint, http) {
        Ok(provider) => provider,
        Err(e) => return CheckResult::error(e.to_string()),
    };

    let request = async {
        let chain_id = within_timeout(provider.get_chain_id()).await?;
        let height = within_timeout(provider.get_block_number()).await?;
        Ok::<_, anyhow::Error>((chain_id, height))
    };

    match request.await {
        Ok((chain_id, height)) => {
            CheckResult::ok(format!("chain {} responding at block {}", chain_id, height))
        }
        Err(e) => CheckResult::error(format!("RPC check failed: {}", e)),
    }
}

async fn check_balance(client: &EvmClient) -> BalanceCheckResult {
    let address = client.address();
    match within_timeout(client.provider().get_balance(address)).await {
        Ok(balance) => classify_balance(address, balance),
        Err(e) => BalanceCheckResult {
            address: address.to_string(),
            status: "error".to_string(),
            message: format!("Balance check failed: {}", e),
            balance: None,
        },
    }
}

/// Check every endpoint directly, then read each wallet's balance through its own proxy.
pub async fn perform_health_check(env: &Env) -> Result<HealthCheckResult> {
    let total = env.private_keys.len();
    let direct = build_http_client(None, 0, total)?;

    let mut rpc = Vec::with_capacity(env.profile.rpc_endpoints.len());
    for endpoint in &env.profile.rpc_endpoints {
        rpc.push(EndpointCheck {
            endpoint: endpoint.clone(),
            result: check_endpoint(endpoint, &direct).await,
        });
    }

    // Balances are read through the first endpoint that answered.
    let live_endpoint = rpc
        .iter()
        .find(|check| check.result.status == "ok")
        .map(|check| check.endpoint.clone());

    let mut balances = Vec::with_capacity(total);
    for (index, key) in env.private_keys.iter().enumerate() {
        let address = derive_address(key)?;
        let unavailable = |message: String| BalanceCheckResult {
            address: address.to_string(),
            status: "error".to_string(),
            message,
            balance: None,
        };

        let result = match &live_endpoint {
            Some(endpoint) => {
                let client = build_http_client(env.proxy_for(index), index + 1, total)
                    .and_then(|http| EvmClient::new(key, endpoint, http));
                match client {
                    Ok(client) => check_balance(&client).await,
                    Err(e) => unavailable(e.to_string()),
                }
            }
            None => unavailable("No RPC endpoint available".to_string()),
        };
        balances.push(result);
    }

    let healthy = rpc.iter().any(|check| check.result.status == "ok")
        && balances.iter().all(|check| check.status != "error");

    Ok(HealthCheckResult {
        healthy,
        checks: HealthChecks { rpc, balances },
        timestamp: chrono::Utc::now().timestamp(),
    })
}

pub fn log_health_check(result: &HealthCheckResult) {
    Logger::separator();
    Logger::header("🏥 HEALTH CHECK");
    Logger::info(&format!(
        "Overall Status: {}",
        if result.healthy { "✅ Healthy" } else { "❌ Unhealthy" }
    ));
    for check in &result.checks.rpc {
        Logger::info(&format!(
            "RPC {}: {} {}",
            check.endpoint,
            if check.result.status == "ok" { "✅" } else { "❌" },
            check.result.message
        ));
    }
    for check in &result.checks.balances {
        let icon = match check.status.as_str() {
            "ok" => "✅",
            "warning" => "⚠️",
            _ => "❌",
        };
        Logger::info(&format!(
            "Wallet {}: {} {}",
            Logger::format_address(&check.address),
            icon,
            check.message
        ));
    }
    Logger::separator();
}
