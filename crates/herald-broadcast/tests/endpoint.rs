//! Notification Endpoint Tests

use assert_matches::assert_matches;
use herald_broadcast::{BroadcastCoordinator, BroadcastStatus, CancellationToken, NotificationEndpoint};
use herald_core::{BroadcastConfig, BroadcastError, NotificationRequest, NotificationResponse};
use herald_testkit::{node_ids, ScriptedDelivery, ScriptedMembership};
use std::sync::Arc;

fn endpoint(membership: &Arc<ScriptedMembership>, delivery: &Arc<ScriptedDelivery>) -> NotificationEndpoint {
    let coordinator =
        BroadcastCoordinator::new(BroadcastConfig::default(), membership.clone(), delivery.clone())
            .unwrap();
    NotificationEndpoint::new(coordinator)
}

#[tokio::test]
async fn request_payload_is_delivered_as_text() {
    let membership = Arc::new(ScriptedMembership::with_nodes(3));
    let delivery = Arc::new(ScriptedDelivery::succeeding());
    let endpoint = endpoint(&membership, &delivery);

    let response = endpoint
        .process_notification(
            NotificationRequest::new(b"please update your node".to_vec()),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response, NotificationResponse::default());
    let delivered = delivery.delivered();
    assert_eq!(delivered.len(), 3);
    assert_eq!(delivered[0].1.as_str(), "please update your node");
}

#[tokio::test]
async fn partial_delivery_is_still_acknowledged() {
    let membership = Arc::new(ScriptedMembership::with_nodes(5).unresolvable(&node_ids(2)));
    let delivery = Arc::new(ScriptedDelivery::succeeding());
    let endpoint = endpoint(&membership, &delivery);

    let result = endpoint
        .dispatch(NotificationRequest::new("hello"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.status(), BroadcastStatus::Partial);

    let response = endpoint
        .process_notification(NotificationRequest::new("hello"), &CancellationToken::new())
        .await;
    assert!(response.is_ok());
}

#[tokio::test]
async fn membership_outage_is_surfaced_to_the_caller() {
    let membership = Arc::new(ScriptedMembership::unavailable());
    let delivery = Arc::new(ScriptedDelivery::succeeding());
    let endpoint = endpoint(&membership, &delivery);

    let response = endpoint
        .process_notification(NotificationRequest::new("hello"), &CancellationToken::new())
        .await;

    assert_matches!(response, Err(BroadcastError::MembershipUnavailable { .. }));
    assert_eq!(delivery.calls(), 0);
}

#[tokio::test]
async fn membership_recovery_allows_the_next_request() {
    let membership = Arc::new(ScriptedMembership::with_nodes(2));
    membership.set_listing_fails(true);
    let delivery = Arc::new(ScriptedDelivery::succeeding());
    let endpoint = endpoint(&membership, &delivery);
    let cancel = CancellationToken::new();

    assert!(endpoint
        .process_notification(NotificationRequest::new("first"), &cancel)
        .await
        .is_err());

    membership.set_listing_fails(false);
    let result = endpoint
        .dispatch(NotificationRequest::new("second"), &cancel)
        .await
        .unwrap();
    assert_eq!(result.succeeded(), 2);
}

#[tokio::test]
async fn request_canceled_before_listing_is_acknowledged_empty() {
    let membership = Arc::new(ScriptedMembership::with_nodes(4));
    let delivery = Arc::new(ScriptedDelivery::succeeding());
    let endpoint = endpoint(&membership, &delivery);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let response = endpoint
        .process_notification(NotificationRequest::new("x"), &cancel)
        .await;
    assert_eq!(response, Ok(NotificationResponse::default()));

    let result = endpoint
        .dispatch(NotificationRequest::new("x"), &cancel)
        .await
        .unwrap();
    assert_eq!(result.status(), BroadcastStatus::Empty);
    assert_eq!(result.attempted(), 0);
    assert_eq!(delivery.calls(), 0);
}
