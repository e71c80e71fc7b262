//! Common test utilities and helpers

#![allow(dead_code)]

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use og_swap_farmer::config::{Env, NetworkProfile};
use og_swap_farmer::interfaces::{ChainClient, ClientError, TxCall, TxOverrides};
use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::time::Instant;

pub const TEST_KEY_A: &str = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef";
pub const TEST_KEY_B: &str = "abcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890";

/// Create a temporary directory holding `.env` with `content`
pub fn create_test_env_file(content: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    fs::write(temp_dir.path().join(".env"), content).expect("Failed to write test .env file");
    temp_dir
}

/// Parse the `.env` inside `dir` without touching the process environment
pub fn env_from_dotenv(dir: &TempDir) -> anyhow::Result<Env> {
    let vars: HashMap<String, String> = dotenvy::from_path_iter(dir.path().join(".env"))?
        .collect::<Result<_, _>>()?;
    Env::from_lookup(|key| vars.get(key).cloned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connect(String),
    GasPrice,
    Nonce,
    Submit(TxCall, TxOverrides),
    Wait(TxHash),
}

#[derive(Default)]
struct MockState {
    events: Vec<(Event, Instant)>,
    submits: usize,
    failures: HashMap<usize, String>,
    waits: usize,
    reverted_waits: Vec<usize>,
    connect_failure: Option<String>,
    nonce: u64,
}

/// Shared view of what a `MockChainClient` was asked to do.
#[derive(Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    /// Make the `nth` submit (1-based) fail with `message`.
    pub fn fail_submit(&self, nth: usize, message: &str) {
        self.state.lock().unwrap().failures.insert(nth, message.to_string());
    }

    /// Make the `nth` confirmation wait (1-based) report a reverted receipt.
    pub fn revert_wait(&self, nth: usize) {
        self.state.lock().unwrap().reverted_waits.push(nth);
    }

    /// Make every `connect` fail with `message`.
    pub fn fail_connect(&self, message: &str) {
        self.state.lock().unwrap().connect_failure = Some(message.to_string());
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.iter().map(|(event, _)| event.clone()).collect()
    }

    pub fn timed_events(&self) -> Vec<(Event, Instant)> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn submits(&self) -> Vec<(TxCall, TxOverrides, Instant)> {
        self.timed_events()
            .into_iter()
            .filter_map(|(event, at)| match event {
                Event::Submit(call, overrides) => Some((call, overrides, at)),
                _ => None,
            })
            .collect()
    }

    pub fn connects(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Connect(endpoint) => Some(endpoint),
                _ => None,
            })
            .collect()
    }
}

/// In-memory `ChainClient`: every transaction confirms at once unless told to fail.
pub struct MockChainClient {
    address: Address,
    endpoint: String,
    state: Arc<Mutex<MockState>>,
}

impl MockChainClient {
    pub fn new(endpoint: &str) -> (Self, MockHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        let client = Self {
            address: Address::repeat_byte(0xaa),
            endpoint: endpoint.to_string(),
            state: state.clone(),
        };
        (client, MockHandle { state })
    }

    fn record(&self, event: Event) {
        self.state.lock().unwrap().events.push((event, Instant::now()));
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn address(&self) -> Address {
        self.address
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn connect(&mut self, endpoint: &str) -> Result<(), ClientError> {
        self.record(Event::Connect(endpoint.to_string()));
        if let Some(message) = self.state.lock().unwrap().connect_failure.clone() {
            return Err(ClientError::Rpc(message));
        }
        self.endpoint = endpoint.to_string();
        Ok(())
    }

    async fn gas_price(&self) -> Result<u128, ClientError> {
        self.record(Event::GasPrice);
        Ok(7_000_000_000)
    }

    async fn transaction_count(&self) -> Result<u64, ClientError> {
        self.record(Event::Nonce);
        Ok(self.state.lock().unwrap().nonce)
    }

    async fn submit(&self, call: TxCall, overrides: TxOverrides) -> Result<TxHash, ClientError> {
        self.record(Event::Submit(call, overrides));
        let mut state = self.state.lock().unwrap();
        state.submits += 1;
        let nth = state.submits;
        if let Some(message) = state.failures.remove(&nth) {
            return Err(ClientError::Rpc(message));
        }
        state.nonce += 1;
        Ok(TxHash::repeat_byte(nth as u8))
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ClientError> {
        self.record(Event::Wait(tx_hash));
        let mut state = self.state.lock().unwrap();
        state.waits += 1;
        let nth = state.waits;
        if state.reverted_waits.contains(&nth) {
            return Err(ClientError::Reverted(tx_hash));
        }
        Ok(())
    }
}

/// Simple profile over the given endpoints.
pub fn simple_profile(endpoints: &[&str]) -> NetworkProfile {
    let mut profile = NetworkProfile::newton_simple();
    profile.rpc_endpoints = endpoints.iter().map(|e| e.to_string()).collect();
    profile
}

/// Failover profile over the given endpoints.
pub fn failover_profile(endpoints: &[&str]) -> NetworkProfile {
    let mut profile = NetworkProfile::newton_failover();
    profile.rpc_endpoints = endpoints.iter().map(|e| e.to_string()).collect();
    profile
}
