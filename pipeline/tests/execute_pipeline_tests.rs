use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use serde_json::json;

use guards::{AttackType, MevAssessment};
use pipeline::error::GatewayError;
use pipeline::execute::{ExecutePipeline, SwapStatus};
use pipeline::request::RawSwapRequest;
use pipeline::{CallTimeouts, PipelineKind, response};

use mock_guards::{
    CountingLedger, FixedTxIds, MockMevGuard, MockOracle, MockSlippageGuard, valid_price,
};

const SENDER: &str = "0x00112233445566778899aabbccddeeff00112233";
const TX_HASH: &str = "0xfeedfacefeedfacefeedfacefeedfacefeedfacefeedfacefeedfacefeedface";

struct Fixture {
    mev: Arc<MockMevGuard>,
    oracle: Arc<MockOracle>,
    slippage: Arc<MockSlippageGuard>,
    ledger: Arc<CountingLedger>,
    timeouts: CallTimeouts,
}

impl Fixture {
    fn new() -> Self {
        Self {
            mev: Arc::new(MockMevGuard::clear()),
            oracle: Arc::new(MockOracle::returning(valid_price(dec!(1000)))),
            slippage: Arc::new(MockSlippageGuard::recommending(dec!(0.5))),
            ledger: Arc::new(CountingLedger::default()),
            timeouts: CallTimeouts::default(),
        }
    }

    fn pipeline(
        &self,
    ) -> ExecutePipeline<MockMevGuard, MockOracle, MockSlippageGuard, CountingLedger, FixedTxIds>
    {
        ExecutePipeline::new(
            self.mev.clone(),
            self.oracle.clone(),
            self.slippage.clone(),
            self.ledger.clone(),
            Arc::new(FixedTxIds(TX_HASH)),
            self.timeouts,
        )
    }
}

fn raw_execute() -> RawSwapRequest {
    RawSwapRequest {
        token_in: Some("ETH".into()),
        token_out: Some("USDC".into()),
        amount_in: Some(json!(1)),
        from: Some(SENDER.into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn happy_path_records_exactly_once() {
    let fx = Fixture::new();

    let out = fx.pipeline().run(&raw_execute()).await.unwrap();

    assert_eq!(out.record.hash, TX_HASH);
    assert_eq!(out.record.status, SwapStatus::Pending);
    assert_eq!(out.record.expected_amount_out.to_string(), "1000.00000000");
    // No floor and no max given: the default 5% tolerance applies.
    assert_eq!(out.record.min_amount_out.to_string(), "950.00000000");
    assert_eq!(out.record.slippage, dec!(5.0));
    assert_eq!(out.record.from, SENDER);
    assert!(out.metadata.protection_applied);
    assert!(out.metadata.slippage_valid);

    let entries = fx.ledger.recorded();
    assert_eq!(entries.len(), 1, "exactly one ledger append");
    assert_eq!(entries[0].tx_hash, TX_HASH);
    assert_eq!(entries[0].amount_out, out.record.expected_amount_out);
    assert_eq!(entries[0].from, SENDER);
}

#[tokio::test]
async fn missing_sender_fails_before_any_collaborator() {
    let fx = Fixture::new();
    let mut raw = raw_execute();
    raw.from = None;

    let err = fx.pipeline().run(&raw).await.unwrap_err();

    assert!(matches!(err, GatewayError::Validation(_)));
    assert_eq!(fx.mev.call_count(), 0);
    assert_eq!(fx.oracle.call_count(), 0);
    assert_eq!(fx.ledger.attempt_count(), 0);

    let reply = response::failure(PipelineKind::Execute, &err);
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["code"], json!("MISSING_PARAMS"));
}

#[tokio::test]
async fn mev_block_short_circuits_everything() {
    let fx = Fixture {
        mev: Arc::new(MockMevGuard::blocking(MevAssessment::blocked(
            "sandwich pattern detected",
            Some(AttackType::Sandwich),
        ))),
        ..Fixture::new()
    };

    let err = fx.pipeline().run(&raw_execute()).await.unwrap_err();

    match &err {
        GatewayError::MevBlocked {
            reason,
            attack_type,
        } => {
            assert_eq!(reason, "sandwich pattern detected");
            assert_eq!(*attack_type, Some(AttackType::Sandwich));
        }
        other => panic!("expected MevBlocked, got {other:?}"),
    }

    // Hard gate: no further stage runs and nothing is recorded.
    assert_eq!(fx.oracle.call_count(), 0);
    assert_eq!(fx.slippage.validate_count(), 0);
    assert_eq!(fx.ledger.attempt_count(), 0);

    let reply = response::failure(PipelineKind::Execute, &err);
    assert_eq!(reply.status, 403);
    assert_eq!(reply.body["reason"], json!("sandwich pattern detected"));
    assert_eq!(reply.body["attackType"], json!("SANDWICH"));
}

#[tokio::test]
async fn mev_timeout_fails_closed() {
    let mut fx = Fixture::new();
    let mut slow = MockMevGuard::clear();
    slow.delay = Duration::from_millis(200);
    fx.mev = Arc::new(slow);
    fx.timeouts.mev = Duration::from_millis(10);

    let err = fx.pipeline().run(&raw_execute()).await.unwrap_err();

    match err {
        GatewayError::MevBlocked { reason, .. } => {
            assert_eq!(reason, "mev screening unavailable")
        }
        other => panic!("expected MevBlocked, got {other:?}"),
    }
    assert_eq!(fx.oracle.call_count(), 0);
    assert_eq!(fx.ledger.attempt_count(), 0);
}

#[tokio::test]
async fn oracle_timeout_at_execution_is_price_unavailable() {
    let mut fx = Fixture::new();
    let mut slow = MockOracle::returning(valid_price(dec!(1000)));
    slow.delay = Duration::from_millis(200);
    fx.oracle = Arc::new(slow);
    fx.timeouts.oracle = Duration::from_millis(10);

    let err = fx.pipeline().run(&raw_execute()).await.unwrap_err();

    let reply = response::failure(PipelineKind::Execute, &err);
    assert_eq!(reply.status, 503);
    assert_eq!(reply.body["code"], json!("PRICE_UNAVAILABLE"));

    match err {
        GatewayError::PriceUnavailable { reason } => {
            assert_eq!(reason, "price oracle timed out")
        }
        other => panic!("expected PriceUnavailable, got {other:?}"),
    }
    assert_eq!(fx.slippage.validate_count(), 0);
    assert_eq!(fx.ledger.attempt_count(), 0);
}

#[tokio::test]
async fn dust_output_is_rejected_as_slippage_not_validation() {
    let fx = Fixture::new();
    let mut raw = raw_execute();
    raw.amount_in = Some(json!("0.000000000001"));

    let err = fx.pipeline().run(&raw).await.unwrap_err();

    // The fresh price was needed to detect this, so both gates already ran;
    // classifying it as a validation error would be a lie.
    assert!(matches!(err, GatewayError::SlippageExceeded(_)));
    assert_eq!(fx.mev.call_count(), 1);
    assert_eq!(fx.oracle.call_count(), 1);
    assert_eq!(fx.ledger.attempt_count(), 0);

    let reply = response::failure(PipelineKind::Execute, &err);
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["code"], json!("SLIPPAGE_EXCEEDED"));
}

#[tokio::test]
async fn invalid_price_stops_before_slippage_validation() {
    let mut fx = Fixture::new();
    fx.oracle = Arc::new(MockOracle::returning(guards::PriceQuote::invalid(
        "consensus not reached",
    )));

    let err = fx.pipeline().run(&raw_execute()).await.unwrap_err();

    assert!(matches!(err, GatewayError::PriceUnavailable { .. }));
    assert_eq!(
        fx.slippage.validate_count(),
        0,
        "slippage validation is meaningless without a fresh price"
    );
    assert_eq!(fx.ledger.attempt_count(), 0);
    assert_eq!(response::failure(PipelineKind::Execute, &err).status, 503);
}

#[tokio::test]
async fn caller_floor_implies_slippage_and_can_be_rejected() {
    let mut fx = Fixture::new();
    fx.slippage = Arc::new(MockSlippageGuard::rejecting(
        "slippage 2% exceeds maximum 1%",
    ));

    let mut raw = raw_execute();
    raw.min_amount_out = Some(json!(980));
    raw.max_slippage = Some(json!(1.0));

    let err = fx.pipeline().run(&raw).await.unwrap_err();

    match &err {
        GatewayError::SlippageExceeded(message) => {
            assert_eq!(message, "slippage 2% exceeds maximum 1%")
        }
        other => panic!("expected SlippageExceeded, got {other:?}"),
    }

    // The guard saw the implied-floor check: 980 of 1000 at max 1%.
    let check = fx.slippage.last_check.lock().unwrap().clone().unwrap();
    assert_eq!(check.expected_amount_out.to_string(), "1000.00000000");
    assert_eq!(check.actual_amount_out, dec!(980));
    assert_eq!(check.max_slippage_pct, dec!(1.0));
    assert!(!check.correlation_id.is_empty());

    assert_eq!(fx.ledger.attempt_count(), 0);
    let reply = response::failure(PipelineKind::Execute, &err);
    assert_eq!(reply.status, 400);
    assert_eq!(reply.body["code"], json!("SLIPPAGE_EXCEEDED"));
}

#[tokio::test]
async fn ledger_failure_is_internal_and_not_retried() {
    let mut fx = Fixture::new();
    fx.ledger = Arc::new(CountingLedger::failing());

    let err = fx.pipeline().run(&raw_execute()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Internal(_)));
    assert_eq!(
        fx.ledger.attempt_count(),
        1,
        "append attempted at most once per run"
    );

    let reply = response::failure(PipelineKind::Execute, &err);
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body["code"], json!("SWAP_EXECUTE_ERROR"));
}

#[tokio::test]
async fn gas_fields_are_carried_into_the_record() {
    let fx = Fixture::new();
    let mut raw = raw_execute();
    raw.gas_price = Some(json!("30.5"));
    raw.priority_fee = Some(json!(2));

    let out = fx.pipeline().run(&raw).await.unwrap();

    assert_eq!(out.record.gas_price, Some(dec!(30.5)));
    assert_eq!(out.record.priority_fee, Some(dec!(2)));
}
