use anyhow::{Context, Result};
use regex::Regex;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use super::network::{AmountBand, NetworkProfile, TokenConfig};

#[derive(Debug, Clone)]
pub struct Env {
    pub private_keys: Vec<String>,
    pub proxies: Vec<String>,
    pub profile: NetworkProfile,
    /// 0 means run until interrupted.
    pub rounds: u32,
    pub round_delay_seconds: u64,
}

impl Env {
    /// Proxies are handed out round-robin over the wallets.
    pub fn proxy_for(&self, wallet_index: usize) -> Option<&str> {
        if self.proxies.is_empty() {
            return None;
        }
        Some(self.proxies[wallet_index % self.proxies.len()].as_str())
    }

    /// Build the configuration from any key/value source. `load_env` feeds it the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Env>
    where
        F: Fn(&str) -> Option<String>,
    {
        validate_required_env(&lookup)?;

        let private_keys = parse_private_keys(
            &lookup("PRIVATE_KEYS").context("PRIVATE_KEYS is required")?,
        )?;

        let proxies = match lookup("PROXIES") {
            Some(raw) if !raw.trim().is_empty() => parse_list(&raw, "PROXIES")?
                .into_iter()
                .map(|p| normalize_proxy(&p))
                .collect(),
            _ => Vec::new(),
        };

        let profile_name = lookup("NETWORK_PROFILE").unwrap_or_else(|| "simple".to_string());
        let mut profile = NetworkProfile::by_name(&profile_name).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid NETWORK_PROFILE: {} (expected simple or failover)",
                profile_name
            )
        })?;

        if let Some(raw) = lookup("RPC_URLS").filter(|v| !v.trim().is_empty()) {
            let urls = parse_list(&raw, "RPC_URLS")?;
            for url in &urls {
                validate_rpc_url(url)?;
            }
            if urls.is_empty() {
                anyhow::bail!("RPC_URLS must contain at least one endpoint");
            }
            profile.rpc_endpoints = urls;
        }

        if let Some(raw) = lookup("STABLE_AMOUNT_RANGE") {
            profile.stable.amount_band = parse_amount_range(&raw, profile.stable.amount_band)
                .context("Invalid STABLE_AMOUNT_RANGE")?;
        }
        if let Some(raw) = lookup("TOKEN_A_AMOUNT_RANGE") {
            profile.token_a.amount_band = parse_amount_range(&raw, profile.token_a.amount_band)
                .context("Invalid TOKEN_A_AMOUNT_RANGE")?;
        }
        if let Some(raw) = lookup("TOKEN_B_AMOUNT_RANGE") {
            profile.token_b.amount_band = parse_amount_range(&raw, profile.token_b.amount_band)
                .context("Invalid TOKEN_B_AMOUNT_RANGE")?;
        }

        for (token, var) in [
            (&profile.stable, "STABLE_AMOUNT_RANGE"),
            (&profile.token_a, "TOKEN_A_AMOUNT_RANGE"),
            (&profile.token_b, "TOKEN_B_AMOUNT_RANGE"),
        ] {
            validate_band_precision(token, var)?;
        }

        if let Some(raw) = lookup("RETRY_LIMIT") {
            let retry_limit = raw.trim().parse::<u32>().context("Invalid RETRY_LIMIT")?;
            if !(1..=10).contains(&retry_limit) {
                anyhow::bail!("Invalid RETRY_LIMIT: must be between 1 and 10");
            }
            profile.retry.max_attempts = retry_limit;
        }

        let rounds = lookup("ROUNDS")
            .unwrap_or_else(|| "1".to_string())
            .trim()
            .parse::<u32>()
            .context("Invalid ROUNDS")?;

        let round_delay_seconds = lookup("ROUND_DELAY_SECONDS")
            .unwrap_or_else(|| "30".to_string())
            .trim()
            .parse::<u64>()
            .context("Invalid ROUND_DELAY_SECONDS")?;

        Ok(Env {
            private_keys,
            proxies,
            profile,
            rounds,
            round_delay_seconds,
        })
    }
}

fn is_valid_private_key(key: &str) -> bool {
    let re = Regex::new(r"^(0x)?[a-fA-F0-9]{64}$").expect("static regex");
    re.is_match(key)
}

fn validate_required_env<F>(lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let required = ["PRIVATE_KEYS"];

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|key| lookup(key).map_or(true, |v| v.trim().is_empty()))
        .collect();

    if !missing.is_empty() {
        eprintln!("\n❌ Configuration Error: Missing required environment variables\n");
        eprintln!("Missing variables: {}\n", missing.join(", "));
        eprintln!("🔧 Quick fix:");
        eprintln!("   Create a .env file with PRIVATE_KEYS=0x...,0x...\n");
        anyhow::bail!("Missing required environment variables: {}", missing.join(", "));
    }

    Ok(())
}

fn validate_rpc_url(url: &str) -> Result<()> {
    if !url.starts_with("http") {
        eprintln!("\n❌ Invalid RPC URL\n");
        eprintln!("Current value: {}", url);
        eprintln!("Must start with: http:// or https://\n");
        anyhow::bail!("Invalid RPC URL: {} must be a valid HTTP/HTTPS URL", url);
    }
    url::Url::parse(url).with_context(|| format!("Invalid RPC URL: {}", url))?;
    Ok(())
}

/// A sampled amount must be representable in the token's base units.
fn validate_band_precision(token: &TokenConfig, var: &str) -> Result<()> {
    if token.amount_band.display_precision > token.decimals as u32 {
        anyhow::bail!(
            "Invalid {}: {} supports at most {} decimal places, range uses {}",
            var,
            token.symbol,
            token.decimals,
            token.amount_band.display_precision
        );
    }
    Ok(())
}

/// Accepts a JSON array or a comma-separated list.
fn parse_list(input: &str, name: &str) -> Result<Vec<String>> {
    let trimmed = input.trim();

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        let parsed: Vec<String> = serde_json::from_str(trimmed)
            .with_context(|| format!("Invalid JSON format for {}", name))?;
        return Ok(parsed
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect());
    }

    Ok(trimmed
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

pub fn parse_private_keys(input: &str) -> Result<Vec<String>> {
    let keys = parse_list(input, "PRIVATE_KEYS")?;

    if keys.is_empty() {
        anyhow::bail!("PRIVATE_KEYS must contain at least one key");
    }

    for (index, key) in keys.iter().enumerate() {
        if !is_valid_private_key(key) {
            eprintln!("\n❌ Invalid private key in PRIVATE_KEYS\n");
            eprintln!("Entry #{} is not 64 hexadecimal characters (optionally 0x-prefixed)\n", index + 1);
            anyhow::bail!("Invalid private key at position {} in PRIVATE_KEYS", index + 1);
        }
    }

    Ok(keys
        .into_iter()
        .map(|key| {
            if key.starts_with("0x") {
                key
            } else {
                format!("0x{}", key)
            }
        })
        .collect())
}

/// Bare `host:port` or `user:pass@host:port` entries default to plain HTTP proxies.
pub fn normalize_proxy(proxy: &str) -> String {
    let proxy = proxy.trim();
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}

/// Parse `min-max` into a band, widening precision to fit the bounds as written.
pub fn parse_amount_range(input: &str, base: AmountBand) -> Result<AmountBand> {
    let (min_raw, max_raw) = input
        .trim()
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("expected min-max, got {}", input))?;

    let min = Decimal::from_str(min_raw.trim()).with_context(|| format!("bad minimum {}", min_raw))?;
    let max = Decimal::from_str(max_raw.trim()).with_context(|| format!("bad maximum {}", max_raw))?;

    if min <= Decimal::ZERO {
        anyhow::bail!("minimum must be positive");
    }
    if min > max {
        anyhow::bail!("minimum {} is greater than maximum {}", min, max);
    }

    let display_precision = base.display_precision.max(min.scale()).max(max.scale());
    Ok(AmountBand::new(min, max, display_precision))
}

pub fn load_env() -> Result<Env> {
    dotenvy::dotenv().ok(); // Load .env file if it exists
    Env::from_lookup(|key| env::var(key).ok())
}
