//! Token balances of every wallet and what the swap router may spend

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;
use anyhow::{Context, Result};
use og_swap_farmer::config::abi::IERC20;
use og_swap_farmer::config::{load_env, TokenConfig};
use og_swap_farmer::interfaces::ChainClient;
use og_swap_farmer::utils::{build_http_client, EvmClient, Logger};

async fn print_token(client: &EvmClient, token: &TokenConfig, router: alloy::primitives::Address) -> Result<()> {
    let contract = IERC20::new(token.address, client.provider().clone());
    let owner = client.address();

    let balance = contract
        .balanceOf(owner)
        .call()
        .await
        .with_context(|| format!("balanceOf failed for {}", token.symbol))?;
    let allowance = contract
        .allowance(owner, router)
        .call()
        .await
        .with_context(|| format!("allowance failed for {}", token.symbol))?;

    let allowance_label = if allowance == U256::MAX {
        "∞ (unlimited)".to_string()
    } else {
        format_units(allowance, token.decimals)?
    };

    println!(
        "   {:<5} balance {:>28}   allowance {}",
        token.symbol,
        format_units(balance, token.decimals)?,
        allowance_label
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("🔍 Checking token balances and router allowances...\n");

    let env = load_env()?;
    let profile = &env.profile;
    let endpoint = profile
        .rpc_endpoints
        .first()
        .context("No RPC endpoint configured")?;
    let total = env.private_keys.len();

    println!("📍 Router: {}", profile.router);
    println!("🌐 RPC:    {}\n", endpoint);

    for (index, key) in env.private_keys.iter().enumerate() {
        let http = build_http_client(env.proxy_for(index), index + 1, total)?;
        let client = EvmClient::new(key, endpoint, http)?;
        println!("💼 Wallet {}: {}", index + 1, Logger::format_address(&client.address().to_string()));

        for token in [&profile.stable, &profile.token_a, &profile.token_b] {
            if let Err(e) = print_token(&client, token, profile.router).await {
                println!("   ⚠️  {}: {}", token.symbol, e);
            }
        }
        println!();
    }

    println!("💡 Allowances are granted per swap by the bot itself; zero here is normal between runs.");
    Ok(())
}
