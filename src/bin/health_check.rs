//! Standalone health check utility

use anyhow::Result;
use colored::*;
use og_swap_farmer::config::{load_env, Env};
use og_swap_farmer::utils::{health_check::HealthCheckResult, log_health_check, perform_health_check};

fn print_header() {
    println!("\n{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".cyan().bold());
    println!("{}", "     🏥 0G SWAP FARMER - HEALTH CHECK".cyan().bold());
    println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".cyan().bold());
}

fn print_recommendations(result: &HealthCheckResult) {
    let mut issues = Vec::new();

    if result.checks.rpc.iter().all(|check| check.result.status != "ok") {
        issues.push("❌ No RPC endpoint responding");
        println!("{}\n", "📋 RPC Issue:".red().bold());
        println!("   • Check RPC_URLS in your .env file");
        println!("   • The public endpoint is https://evmrpc-testnet.0g.ai");
        println!("   • Testnet nodes are often saturated, add more endpoints and use NETWORK_PROFILE=failover\n");
    } else if result.checks.rpc.iter().any(|check| check.result.status != "ok") {
        println!("{}\n", "⚠️  Some RPC endpoints are down:".yellow().bold());
        for check in result.checks.rpc.iter().filter(|check| check.result.status != "ok") {
            println!("   • {}", check.endpoint);
        }
        println!();
    }

    let empty: Vec<_> = result
        .checks
        .balances
        .iter()
        .filter(|check| check.status == "error")
        .collect();
    if !empty.is_empty() {
        issues.push("❌ Wallets without gas");
        println!("{}\n", "📋 Balance Issue:".red().bold());
        for check in &empty {
            println!("   • {}: {}", check.address, check.message);
        }
        println!("   • Claim A0GI from the 0G Newton faucet for gas\n");
    }

    if issues.is_empty() {
        println!("{}\n", "🎉 All Systems Operational!".green().bold());
        println!("{}", "You're ready to start farming:".cyan());
        println!("   {}\n", "cargo run --release".green());
    } else {
        println!("{}\n", format!("⚠️  {} Issue(s) Found", issues.len()).red().bold());
        println!("{}\n", "Fix the issues above before starting the bot.".yellow());
    }
}

fn print_configuration(env: &Env) {
    println!("{}", "📊 Configuration Summary:".cyan());
    println!();
    println!("   Profile: {}", env.profile.name);
    println!("   Wallets: {}", env.private_keys.len());
    println!("   Proxies: {}", env.proxies.len());
    println!(
        "   Rounds: {}",
        if env.rounds == 0 { "until interrupted".to_string() } else { env.rounds.to_string() }
    );
    println!("   Round delay: {}s", env.round_delay_seconds);
    println!("   Attempts per leg: {}", env.profile.retry.max_attempts);
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    print_header();
    println!("{}\n", "⏳ Running diagnostic checks...".yellow());

    let env = load_env()?;
    let result = perform_health_check(&env).await?;

    log_health_check(&result);
    print_configuration(&env);
    print_recommendations(&result);

    if result.healthy {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
