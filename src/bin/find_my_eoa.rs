//! Print the address behind every configured private key

use anyhow::Result;
use og_swap_farmer::config::load_env;
use og_swap_farmer::utils::derive_address;
use og_swap_farmer::utils::proxy::redact_proxy;

fn main() -> Result<()> {
    println!("\n🔍 WALLET ADDRESSES\n");
    println!("{}\n", "━".repeat(65));

    let env = load_env()?;

    for (index, key) in env.private_keys.iter().enumerate() {
        let address = derive_address(key)?;
        let route = env
            .proxy_for(index)
            .map(redact_proxy)
            .unwrap_or_else(|| "direct connection".to_string());
        println!("   {}. {}", index + 1, address);
        println!("      via {}\n", route);
    }

    println!("{}\n", "━".repeat(65));
    println!("⚠️  WARNING: Never share your private keys!\n");
    Ok(())
}
