//! Swap session behaviour against a recording mock client

mod common;

use alloy::primitives::{Address, TxHash, U256};
use common::{failover_profile, simple_profile, Event, MockChainClient};
use og_swap_farmer::interfaces::{ChainClient, LegDirection, SwapPair, SwapStatus, TxCall};
use og_swap_farmer::services::{run_wallet, RoundTripState, SwapSession};
use std::time::Duration;

const RPC_A: &str = "https://rpc-a.test";
const RPC_B: &str = "https://rpc-b.test";
const RPC_C: &str = "https://rpc-c.test";

const PACING: Duration = Duration::from_secs(5);

#[tokio::test(start_paused = true)]
async fn swap_is_submitted_only_after_approval_confirms() {
    let (client, handle) = MockChainClient::new(RPC_A);
    let mut session = SwapSession::new(client, simple_profile(&[RPC_A]), 1, 1).with_rng_seed(1);
    let profile = session.profile().clone();
    let plan = session
        .plan_leg(&profile.stable, &profile.token_a, LegDirection::Forward)
        .unwrap();

    let result = session.approve_and_swap(&plan).await;
    assert!(result.is_success());
    assert_eq!(result.amount_in, Some(plan.amount_in));

    let events = handle.timed_events();
    assert_eq!(events.len(), 4, "{:?}", events);

    match (&events[0].0, &events[1].0, &events[2].0, &events[3].0) {
        (
            Event::Submit(TxCall::Approve { token, spender, amount }, approve_overrides),
            Event::Wait(approve_hash),
            Event::Submit(TxCall::ExactInputSingle(args), swap_overrides),
            Event::Wait(swap_hash),
        ) => {
            assert_eq!(*token, profile.stable.address);
            assert_eq!(*spender, profile.router);
            assert_eq!(*amount, plan.amount_in);
            assert_eq!(*approve_hash, TxHash::repeat_byte(1));
            assert_eq!(approve_overrides.gas_limit, 100_000);
            assert_eq!(approve_overrides.gas_price, 20_000_000_000);
            assert_eq!(approve_overrides.nonce, None);

            assert_eq!(args.router, profile.router);
            assert_eq!(args.token_in, profile.stable.address);
            assert_eq!(args.token_out, profile.token_a.address);
            assert_eq!(args.fee, 3000);
            assert_eq!(args.recipient, Address::repeat_byte(0xaa));
            assert_eq!(args.amount_in, plan.amount_in);
            assert_eq!(args.amount_out_minimum, U256::ZERO);
            assert_eq!(swap_overrides.gas_limit, 300_000);
            assert_eq!(Some(*swap_hash), result.transaction_hash);
        }
        other => panic!("unexpected call sequence: {:?}", other),
    }

    assert!(events[2].1 - events[1].1 >= PACING);
}

#[tokio::test]
async fn rotation_advances_modulo_endpoint_count() {
    let (client, handle) = MockChainClient::new(RPC_A);
    let mut session = SwapSession::new(client, failover_profile(&[RPC_A, RPC_B, RPC_C]), 1, 1);
    assert_eq!(session.endpoint_index(), 0);

    session.rotate_endpoint().await;
    assert_eq!(session.endpoint_index(), 1);
    assert_eq!(session.client().endpoint(), RPC_B);

    session.rotate_endpoint().await;
    session.rotate_endpoint().await;
    assert_eq!(session.endpoint_index(), 0);
    assert_eq!(handle.connects(), vec![RPC_B, RPC_C, RPC_A]);
}

#[tokio::test]
async fn session_starts_at_the_clients_endpoint() {
    let (client, _handle) = MockChainClient::new(RPC_C);
    let mut session = SwapSession::new(client, failover_profile(&[RPC_A, RPC_B, RPC_C]), 1, 1);
    assert_eq!(session.endpoint_index(), 2);

    session.rotate_endpoint().await;
    assert_eq!(session.endpoint_index(), 0);
    assert_eq!(session.current_endpoint(), RPC_A);
}

#[tokio::test(start_paused = true)]
async fn failed_forward_approval_never_starts_reverse_leg() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_submit(1, "execution reverted: STF");
    let mut session = SwapSession::new(client, simple_profile(&[RPC_A]), 1, 1).with_rng_seed(2);

    let report = session.process_round_trip(SwapPair::StableTokenA).await;

    assert_eq!(report.state, RoundTripState::Failed);
    let forward = report.forward.unwrap();
    assert_eq!(forward.status, SwapStatus::Error);
    assert_eq!(forward.message.as_deref(), Some("execution reverted: STF"));
    assert!(report.reverse.is_none());
    assert_eq!(handle.submits().len(), 1);
    assert!(!handle.events().iter().any(|e| matches!(e, Event::Wait(_))));
}

#[tokio::test(start_paused = true)]
async fn failed_forward_swap_never_starts_reverse_leg() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_submit(2, "insufficient funds for gas * price + value");
    let mut session = SwapSession::new(client, simple_profile(&[RPC_A]), 1, 1).with_rng_seed(3);

    let report = session.process_round_trip(SwapPair::StableTokenB).await;

    assert!(!report.is_complete());
    assert!(report.reverse.is_none());
    assert_eq!(handle.submits().len(), 2);
    assert_eq!(session.state(), RoundTripState::Failed);
}

#[tokio::test(start_paused = true)]
async fn full_mempool_rotates_once_and_retries_with_same_arguments() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_submit(1, "server returned an error response: Mempool Is Full");
    let mut session = SwapSession::new(client, failover_profile(&[RPC_A, RPC_B]), 1, 1).with_rng_seed(4);
    let profile = session.profile().clone();
    let plan = session
        .plan_leg(&profile.stable, &profile.token_b, LegDirection::Forward)
        .unwrap();

    let result = session.approve_and_swap(&plan).await;

    assert!(result.is_success(), "{:?}", result);
    assert_eq!(handle.connects(), vec![RPC_B]);
    assert_eq!(session.endpoint_index(), 1);

    let submits = handle.submits();
    assert_eq!(submits.len(), 3);
    assert_eq!(submits[0].0, submits[1].0);
    assert!(matches!(submits[2].0, TxCall::ExactInputSingle(_)));

    // Network gas price and pinned nonces on every attempt.
    assert_eq!(submits[0].1.gas_price, 7_000_000_000);
    assert_eq!(submits[0].1.nonce, Some(0));
    assert_eq!(submits[1].1.nonce, Some(0));
    assert_eq!(submits[2].1.nonce, Some(1));
}

#[tokio::test(start_paused = true)]
async fn full_mempool_gives_up_after_max_attempts() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_submit(1, "mempool is full");
    handle.fail_submit(2, "mempool is full");
    let mut session = SwapSession::new(client, failover_profile(&[RPC_A, RPC_B]), 1, 1).with_rng_seed(5);
    let profile = session.profile().clone();
    let plan = session
        .plan_leg(&profile.stable, &profile.token_a, LegDirection::Forward)
        .unwrap();

    let result = session.approve_and_swap(&plan).await;

    assert_eq!(result.status, SwapStatus::Error);
    assert_eq!(result.message.as_deref(), Some("mempool is full"));
    assert_eq!(handle.connects().len(), 1);
    assert_eq!(handle.submits().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn full_mempool_is_not_retried_without_rotation() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_submit(1, "mempool is full");
    let mut session = SwapSession::new(client, simple_profile(&[RPC_A, RPC_B]), 1, 1).with_rng_seed(6);
    let profile = session.profile().clone();
    let plan = session
        .plan_leg(&profile.stable, &profile.token_a, LegDirection::Forward)
        .unwrap();

    let result = session.approve_and_swap(&plan).await;

    assert!(!result.is_success());
    assert!(handle.connects().is_empty());
    assert_eq!(handle.submits().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn other_errors_do_not_rotate() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_submit(1, "nonce too low");
    let mut session = SwapSession::new(client, failover_profile(&[RPC_A, RPC_B]), 1, 1).with_rng_seed(7);

    let report = session.process_round_trip(SwapPair::StableTokenA).await;

    assert_eq!(report.forward.and_then(|r| r.message), Some("nonce too low".to_string()));
    assert!(handle.connects().is_empty());
    assert_eq!(session.endpoint_index(), 0);
}

#[tokio::test(start_paused = true)]
async fn round_trip_swaps_there_and_back_with_paced_steps() {
    let (client, handle) = MockChainClient::new(RPC_A);
    let mut session = SwapSession::new(client, simple_profile(&[RPC_A]), 1, 1).with_rng_seed(8);
    let profile = session.profile().clone();

    let report = session.process_round_trip(SwapPair::StableTokenA).await;

    assert!(report.is_complete());
    let forward = report.forward.unwrap();
    let reverse = report.reverse.unwrap();
    assert!(forward.is_success() && reverse.is_success());
    assert!(forward.transaction_hash.is_some());
    assert!(reverse.transaction_hash.is_some());
    assert_ne!(forward.transaction_hash, reverse.transaction_hash);

    // USDT: 18 decimals, sampled at 2 dp within 0.5-2.0.
    let forward_amount = forward.amount_in.unwrap();
    assert_eq!(forward_amount % U256::from(10_000_000_000_000_000u64), U256::ZERO);
    assert!(forward_amount >= U256::from(500_000_000_000_000_000u64));
    assert!(forward_amount <= U256::from(2_000_000_000_000_000_000u64));

    // ETH: 18 decimals, sampled at 6 dp within 0.0002-0.0005.
    let reverse_amount = reverse.amount_in.unwrap();
    assert_eq!(reverse_amount % U256::from(1_000_000_000_000u64), U256::ZERO);
    assert!(reverse_amount >= U256::from(200_000_000_000_000u64));
    assert!(reverse_amount <= U256::from(500_000_000_000_000u64));

    let submits = handle.submits();
    assert_eq!(submits.len(), 4);
    match (&submits[2].0, &submits[3].0) {
        (TxCall::Approve { token, amount, .. }, TxCall::ExactInputSingle(args)) => {
            assert_eq!(*token, profile.token_a.address);
            assert_eq!(*amount, reverse_amount);
            assert_eq!(args.token_in, profile.token_a.address);
            assert_eq!(args.token_out, profile.stable.address);
        }
        other => panic!("unexpected reverse leg: {:?}", other),
    }
    assert_eq!(submits[3].1.gas_limit, 500_000);

    for pair in submits.windows(2) {
        assert!(pair[1].2 - pair[0].2 >= PACING);
    }
}

#[tokio::test(start_paused = true)]
async fn btc_reverse_leg_is_scaled_to_eight_decimals() {
    let (client, _handle) = MockChainClient::new(RPC_A);
    let mut session = SwapSession::new(client, simple_profile(&[RPC_A]), 1, 1).with_rng_seed(9);

    let report = session.process_round_trip(SwapPair::StableTokenB).await;

    let reverse_amount = report.reverse.unwrap().amount_in.unwrap();
    assert_eq!(reverse_amount % U256::from(100u64), U256::ZERO);
    assert!(reverse_amount >= U256::from(20_000u64));
    assert!(reverse_amount <= U256::from(50_000u64));
}

#[tokio::test(start_paused = true)]
async fn wallet_runs_both_pairs_every_round() {
    let (client, handle) = MockChainClient::new(RPC_A);
    let mut session = SwapSession::new(client, simple_profile(&[RPC_A]), 1, 2).with_rng_seed(10);
    let profile = session.profile().clone();

    let stats = run_wallet(&mut session, 2, Duration::from_secs(30)).await;

    assert_eq!(stats.rounds, 2);
    assert_eq!(stats.completed, 4);
    assert_eq!(stats.failed, 0);

    let submits = handle.submits();
    assert_eq!(submits.len(), 16);
    let swapped_into: Vec<Address> = submits
        .iter()
        .filter_map(|(call, _, _)| match call {
            TxCall::ExactInputSingle(args) if args.token_in == profile.stable.address => Some(args.token_out),
            _ => None,
        })
        .collect();
    assert_eq!(
        swapped_into,
        vec![
            profile.token_a.address,
            profile.token_b.address,
            profile.token_a.address,
            profile.token_b.address,
        ]
    );
}

#[tokio::test]
async fn failed_reconnect_keeps_the_current_endpoint() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_connect("connection refused");
    let mut session = SwapSession::new(client, failover_profile(&[RPC_A, RPC_B]), 1, 1);

    session.rotate_endpoint().await;

    assert_eq!(handle.connects(), vec![RPC_B]);
    assert_eq!(session.endpoint_index(), 0);
    assert_eq!(session.current_endpoint(), session.client().endpoint());
    assert_eq!(session.current_endpoint(), RPC_A);
}

#[tokio::test(start_paused = true)]
async fn reverted_approval_never_submits_the_swap() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.revert_wait(1);
    let mut session = SwapSession::new(client, failover_profile(&[RPC_A, RPC_B]), 1, 1).with_rng_seed(11);

    let report = session.process_round_trip(SwapPair::StableTokenA).await;

    assert_eq!(report.state, RoundTripState::Failed);
    let forward = report.forward.unwrap();
    assert_eq!(
        forward.message,
        Some(format!("transaction {} reverted", TxHash::repeat_byte(1)))
    );
    assert!(report.reverse.is_none());

    let submits = handle.submits();
    assert_eq!(submits.len(), 1);
    assert!(matches!(submits[0].0, TxCall::Approve { .. }));
    assert!(handle.connects().is_empty());
}

#[tokio::test(start_paused = true)]
async fn failed_reverse_leg_keeps_the_forward_result() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_submit(3, "execution reverted: STF");
    let mut session = SwapSession::new(client, simple_profile(&[RPC_A]), 1, 1).with_rng_seed(12);

    let report = session.process_round_trip(SwapPair::StableTokenA).await;

    assert_eq!(report.state, RoundTripState::Failed);
    assert_eq!(session.state(), RoundTripState::Failed);

    let forward = report.forward.unwrap();
    assert!(forward.is_success());
    assert_eq!(forward.transaction_hash, Some(TxHash::repeat_byte(2)));

    let reverse = report.reverse.unwrap();
    assert_eq!(reverse.status, SwapStatus::Error);
    assert_eq!(reverse.message.as_deref(), Some("execution reverted: STF"));
    assert_eq!(handle.submits().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn full_mempool_on_swap_reapproves_with_same_arguments() {
    let (client, handle) = MockChainClient::new(RPC_A);
    handle.fail_submit(2, "Mempool is full");
    let mut session = SwapSession::new(client, failover_profile(&[RPC_A, RPC_B]), 1, 1).with_rng_seed(13);
    let profile = session.profile().clone();
    let plan = session
        .plan_leg(&profile.stable, &profile.token_a, LegDirection::Forward)
        .unwrap();

    let result = session.approve_and_swap(&plan).await;

    assert!(result.is_success(), "{:?}", result);
    assert_eq!(result.transaction_hash, Some(TxHash::repeat_byte(4)));
    assert_eq!(handle.connects(), vec![RPC_B]);

    let submits = handle.submits();
    assert_eq!(submits.len(), 4);
    assert!(matches!(submits[0].0, TxCall::Approve { .. }));
    assert_eq!(submits[0].0, submits[2].0);

    match (&submits[1].0, &submits[3].0) {
        (TxCall::ExactInputSingle(first), TxCall::ExactInputSingle(retry)) => {
            assert_eq!(first.token_in, retry.token_in);
            assert_eq!(first.token_out, retry.token_out);
            assert_eq!(first.amount_in, retry.amount_in);
            assert_eq!(first.fee, retry.fee);
            assert_eq!(first.recipient, retry.recipient);
        }
        other => panic!("unexpected swap calls: {:?}", other),
    }
}
