//! Help command - displays all available bot commands

use colored::*;

fn main() {
    println!("{}", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".cyan().bold());
    println!("{}", "     🌾 0G NEWTON SWAP FARMER - COMMANDS".cyan().bold());
    println!("{}\n", "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".cyan().bold());

    println!("{}\n", "📖 GETTING STARTED".yellow().bold());
    println!("  {}   Verify RPC endpoints and wallet gas balances", "cargo run --bin health_check".green());
    println!("  {}          Compile Rust project", "cargo build --release".green());
    println!("  {}              Start swap farming", "cargo run --release".green());
    println!();

    println!("{}\n", "💰 WALLETS".yellow().bold());
    println!("  {}    Show the address of every configured key", "cargo run --bin find_my_eoa".green());
    println!("  {} Token balances and router allowances", "cargo run --bin check_allowance".green());
    println!();

    println!("{}\n", "⚙️  CONFIGURATION (.env)".yellow().bold());
    println!("  {}          Comma-separated or JSON list of keys (required)", "PRIVATE_KEYS".cyan());
    println!("  {}               Proxies, assigned to wallets round-robin", "PROXIES".cyan());
    println!("  {}       simple | failover", "NETWORK_PROFILE".cyan());
    println!("  {}              Override the profile's RPC endpoints", "RPC_URLS".cyan());
    println!("  {}                Rounds per wallet, 0 runs forever", "ROUNDS".cyan());
    println!("  {}   Pause between rounds", "ROUND_DELAY_SECONDS".cyan());
    println!("  {}   Stablecoin amount range, e.g. 0.5-2.0", "STABLE_AMOUNT_RANGE".cyan());
    println!("  {}  ETH amount range", "TOKEN_A_AMOUNT_RANGE".cyan());
    println!("  {}  BTC amount range", "TOKEN_B_AMOUNT_RANGE".cyan());
    println!("  {}           Attempts per leg when a mempool is full (1-10)", "RETRY_LIMIT".cyan());
    println!("  {}              tracing filter, e.g. og_swap_farmer=debug", "RUST_LOG".cyan());
    println!();

    println!("{}\n", "━".repeat(65).blue());
    println!("{}\n", "💡 Quick Tips:".yellow());
    println!("  • Before farming: cargo run --bin health_check");
    println!("  • Crowded node? Set NETWORK_PROFILE=failover and list several RPC_URLS");
    println!("  • Logs are written to logs/bot-YYYY-MM-DD.log");
    println!();
}
