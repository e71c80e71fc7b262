use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinSet;

use crate::config::Env;
use crate::interfaces::{ChainClient, SwapPair};
use crate::services::swap_session::SwapSession;
use crate::utils::logger::{LogLevel, Logger};

const PAIRS: [SwapPair; 2] = [SwapPair::StableTokenA, SwapPair::StableTokenB];

/// Round trips one wallet got through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletStats {
    pub rounds: u32,
    pub completed: u32,
    pub failed: u32,
}

/// Run `rounds` rounds of every pair on one session, or forever when `rounds` is 0.
pub async fn run_wallet<C: ChainClient>(
    session: &mut SwapSession<C>,
    rounds: u32,
    round_delay: Duration,
) -> WalletStats {
    let mut stats = WalletStats::default();

    loop {
        stats.rounds += 1;
        for pair in PAIRS {
            let report = session.process_round_trip(pair).await;
            if report.is_complete() {
                stats.completed += 1;
            } else {
                stats.failed += 1;
            }
        }

        if rounds != 0 && stats.rounds >= rounds {
            return stats;
        }
        tokio::time::sleep(round_delay).await;
    }
}

/// One concurrent session per configured wallet, until every wallet finishes or Ctrl-C.
pub async fn run_farm(env: Arc<Env>) -> Result<()> {
    let total = env.private_keys.len();
    let round_delay = Duration::from_secs(env.round_delay_seconds);
    let mut tasks = JoinSet::new();

    for (index, key) in env.private_keys.iter().enumerate() {
        let current = index + 1;
        let mut session = match SwapSession::connect(
            key,
            env.profile.clone(),
            env.proxy_for(index),
            current,
            total,
        ) {
            Ok(session) => session,
            Err(e) => {
                Logger::log(current, total, &format!("Failed to start session: {}", e), LogLevel::Error);
                continue;
            }
        };

        Logger::log(
            current,
            total,
            &format!("Session started for {}", Logger::format_address(&session.address().to_string())),
            LogLevel::Debug,
        );

        let rounds = env.rounds;
        tasks.spawn(async move {
            let stats = run_wallet(&mut session, rounds, round_delay).await;
            (current, stats)
        });
    }

    if tasks.is_empty() {
        anyhow::bail!("No wallet session could be started");
    }

    let join_all = async {
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((current, stats)) => Logger::log(
                    current,
                    total,
                    &format!(
                        "Finished {} round(s): {} round trip(s) completed, {} failed",
                        stats.rounds, stats.completed, stats.failed
                    ),
                    LogLevel::Success,
                ),
                Err(e) => Logger::error(&format!("Wallet task aborted: {}", e)),
            }
        }
    };

    tokio::select! {
        _ = join_all => {
            Logger::success("All wallets finished");
        }
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => {
                    Logger::separator();
                    Logger::info("Received SIGINT, stopping all wallets...");
                }
                Err(err) => {
                    eprintln!("Unable to listen for shutdown signal: {}", err);
                }
            }
        }
    }

    Ok(())
}
