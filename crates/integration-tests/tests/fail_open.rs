//! Remote failures during the funnel never block the participant.

#![allow(clippy::unwrap_used)]

use prize_funnel::Step;
use prize_funnel::gateway::GatewayOp;
use prize_funnel_integration_tests::{TestContext, jane_shipping};

#[tokio::test]
async fn test_funnel_completes_while_store_is_down() {
    let ctx = TestContext::new();
    let mut app = ctx.open();
    app.register("5551234567", "pw123").await.unwrap();
    ctx.gateway.fail_everything();

    app.on_win("Free Sample");
    assert_eq!(app.on_feedback(5, "").unwrap().settled().await, None);
    assert_eq!(app.on_shipping(jane_shipping()).unwrap().settled().await, None);

    assert_eq!(app.step(), Step::Success);
    assert!(app.user_state().has_order());
    assert!(ctx.gateway.orders().is_empty());
    assert!(ctx.gateway.feedbacks().is_empty());
}

#[tokio::test]
async fn test_failed_rating_write_does_not_stop_the_order() {
    let ctx = TestContext::new();
    let mut app = ctx.open();
    app.register("5551234567", "pw123").await.unwrap();
    ctx.gateway.fail(GatewayOp::InsertFeedback);

    app.on_win("Free Sample");
    app.on_feedback(3, "Arrived a little late").unwrap().settled().await;
    let order = app.on_shipping(jane_shipping()).unwrap().settled().await;

    assert!(order.is_some());
    assert!(ctx.gateway.feedbacks().is_empty());
    assert_eq!(ctx.gateway.orders().len(), 1);
}

#[tokio::test]
async fn test_order_history_fails_closed() {
    let ctx = TestContext::new();
    let mut app = ctx.open();
    app.register("5551234567", "pw123").await.unwrap();
    app.on_win("Free Sample");
    app.on_shipping(jane_shipping()).unwrap().settled().await.unwrap();

    ctx.gateway.fail(GatewayOp::ListOrders);
    assert!(app.orders().await.is_empty());

    ctx.gateway.recover();
    assert_eq!(app.orders().await.len(), 1);
}

#[tokio::test]
async fn test_address_change_surfaces_remote_errors() {
    let ctx = TestContext::new();
    let mut app = ctx.open();
    app.register("5551234567", "pw123").await.unwrap();
    app.on_win("Free Sample");
    let order = app
        .on_shipping(jane_shipping())
        .unwrap()
        .settled()
        .await
        .unwrap();

    ctx.gateway.fail(GatewayOp::UpdateOrder);
    let err = app
        .update_order_shipping(order.id, jane_shipping())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), prize_funnel::ErrorKind::RemoteError);
}
