use anyhow::{Context, Result};
use colored::Colorize;
use og_swap_farmer::config::load_env;
use og_swap_farmer::services::run_farm;
use og_swap_farmer::utils::{derive_address, log_health_check, perform_health_check, Logger};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    // Load environment variables
    let env = Arc::new(load_env()?);

    println!("\n{} First time running the bot?", "💡".yellow());
    println!("   Run health check: {}", "cargo run --bin health_check".cyan());
    println!("   List commands:    {}\n", "cargo run --bin help".cyan());

    let wallets = env
        .private_keys
        .iter()
        .map(|key| derive_address(key).map(|address| address.to_string()))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to derive wallet addresses")?;
    Logger::startup(&wallets, &env.profile.name, &env.profile.rpc_endpoints);

    Logger::info("Performing initial health check...");
    let health_result = perform_health_check(&env).await?;
    log_health_check(&health_result);
    if !health_result.healthy {
        Logger::warning("Health check failed, but continuing startup...");
    }

    if env.rounds == 0 {
        Logger::info("Running until interrupted (ROUNDS=0)");
    } else {
        Logger::info(&format!(
            "Running {} round(s), {}s apart",
            env.rounds, env.round_delay_seconds
        ));
    }
    Logger::separator();

    run_farm(env).await?;

    Logger::success("Shutdown completed");
    Ok(())
}
