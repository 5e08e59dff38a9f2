//! Cancellation Tests
//!
//! Canceling a broadcast keeps completed outcomes, marks the rest canceled,
//! stops dispatching and leaves no delivery in flight.

use herald_broadcast::{BroadcastCoordinator, CancellationToken, DeliveryFailure};
use herald_core::BroadcastConfig;
use herald_testkit::{node_ids, wait_until, DeliveryBehavior, ScriptedDelivery, ScriptedMembership};
use std::sync::Arc;
use std::time::Duration;

const SETTLE: Duration = Duration::from_secs(2);

#[tokio::test]
async fn cancel_after_two_deliveries_keeps_them_and_cancels_the_rest() {
    let ids = node_ids(10);
    let membership = Arc::new(ScriptedMembership::with_nodes(10));
    let delivery = Arc::new(
        ScriptedDelivery::new(DeliveryBehavior::Hang)
            .script_all(&ids[..2], DeliveryBehavior::Succeed),
    );
    let coordinator = BroadcastCoordinator::new(
        BroadcastConfig::default().with_max_concurrent_deliveries(10),
        membership.clone(),
        delivery.clone(),
    )
    .unwrap();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn({
        let coordinator = coordinator.clone();
        let cancel = cancel.clone();
        async move {
            coordinator
                .broadcast_to_reliable("shutting down".into(), &cancel)
                .await
        }
    });

    assert!(
        wait_until(SETTLE, || delivery.completed() == 2 && delivery.in_flight() == 8).await,
        "expected 2 completed and 8 hanging deliveries"
    );
    cancel.cancel();

    let result = tokio::time::timeout(SETTLE, handle)
        .await
        .expect("broadcast must return promptly after cancellation")
        .unwrap()
        .unwrap();

    assert_eq!(result.attempted(), 10);
    assert_eq!(result.succeeded(), 2);
    assert_eq!(result.delivered(), &ids[..2]);
    assert_eq!(result.breakdown().canceled, 8);
    for id in &ids[2..] {
        assert_eq!(result.failure_for(*id), Some(&DeliveryFailure::Canceled));
    }
    assert_eq!(delivery.in_flight(), 0);
}

#[tokio::test]
async fn cancel_stops_dispatching_queued_nodes() {
    let membership = Arc::new(ScriptedMembership::with_nodes(10));
    let delivery = Arc::new(ScriptedDelivery::new(DeliveryBehavior::Hang));
    let coordinator = BroadcastCoordinator::new(
        BroadcastConfig::default().with_max_concurrent_deliveries(2),
        membership.clone(),
        delivery.clone(),
    )
    .unwrap();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn({
        let coordinator = coordinator.clone();
        let cancel = cancel.clone();
        async move { coordinator.broadcast_to_reliable("hello".into(), &cancel).await }
    });

    assert!(wait_until(SETTLE, || delivery.in_flight() == 2).await);
    cancel.cancel();

    let result = tokio::time::timeout(SETTLE, handle)
        .await
        .expect("broadcast must return promptly after cancellation")
        .unwrap()
        .unwrap();

    assert_eq!(result.attempted(), 10);
    assert_eq!(result.breakdown().canceled, 10);
    assert_eq!(delivery.calls(), 2);
    assert_eq!(membership.resolve_calls(), 2);
    assert_eq!(delivery.in_flight(), 0);
}

#[tokio::test]
async fn cancel_during_slow_deliveries_returns_before_deadline() {
    let membership = Arc::new(ScriptedMembership::with_nodes(4));
    let delivery = Arc::new(ScriptedDelivery::delayed(Duration::from_secs(30)));
    let coordinator = BroadcastCoordinator::new(
        BroadcastConfig::default().with_delivery_timeout(Duration::from_secs(60)),
        membership.clone(),
        delivery.clone(),
    )
    .unwrap();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn({
        let coordinator = coordinator.clone();
        let cancel = cancel.clone();
        async move { coordinator.broadcast_to_reliable("hello".into(), &cancel).await }
    });

    assert!(wait_until(SETTLE, || delivery.in_flight() == 4).await);
    cancel.cancel();

    let result = tokio::time::timeout(SETTLE, handle)
        .await
        .expect("cancellation must not wait for the delivery deadline")
        .unwrap()
        .unwrap();

    assert_eq!(result.breakdown().canceled, 4);
    assert_eq!(result.breakdown().timed_out, 0);
}
