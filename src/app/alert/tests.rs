use std::time::Duration;

use crate::app::config::{Config, Data, U64Opt};
use crate::log::Log;
use crate::ArcStr;

use super::data::AlertKind;
use super::Alerts;

async fn alerts_with_ttl(ttl: u64) -> Alerts {
    let mut data = Data::default();
    data.set_u64(U64Opt::AlertTtlSecs, ttl);
    Alerts::spawn(Config::mock(data), Log::Mock).await
}

#[tokio::test]
async fn dispatch_fills_the_slot() {
    let alerts = alerts_with_ttl(0).await;
    alerts.success(ArcStr::from("Blog created successfully")).await;

    let current = alerts.current().await.unwrap();
    assert_eq!(current.kind, AlertKind::Success);
    assert_eq!(current.text.as_ref(), "Blog created successfully");
}

#[tokio::test]
async fn newest_alert_replaces_the_previous_one() {
    let alerts = alerts_with_ttl(0).await;
    let first = alerts.error(ArcStr::from("first")).await;
    let second = alerts.success(ArcStr::from("second")).await;

    assert!(second > first);
    let current = alerts.current().await.unwrap();
    assert_eq!(current.id, second);
    assert_eq!(current.text.as_ref(), "second");
}

#[tokio::test]
async fn alert_expires_after_its_ttl() {
    let alerts = alerts_with_ttl(1).await;
    alerts.success(ArcStr::from("short-lived")).await;
    assert!(alerts.current().await.is_some());

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(alerts.current().await.is_none());
}

#[tokio::test]
async fn expiry_of_a_replaced_alert_spares_the_newer_one() {
    let alerts = alerts_with_ttl(1).await;
    alerts.error(ArcStr::from("old")).await;
    tokio::time::sleep(Duration::from_millis(700)).await;
    let newer = alerts.success(ArcStr::from("new")).await;

    // The first alert's timer fires here; the slot must keep the newer one.
    tokio::time::sleep(Duration::from_millis(600)).await;
    let current = alerts.current().await.unwrap();
    assert_eq!(current.id, newer);
}

#[tokio::test]
async fn dismiss_clears_the_slot() {
    let alerts = alerts_with_ttl(0).await;
    alerts.success(ArcStr::from("done")).await;
    alerts.dismiss().await;
    assert!(alerts.current().await.is_none());
}

#[tokio::test]
async fn mock_records_history() {
    let alerts = Alerts::mock();
    alerts.success(ArcStr::from("a")).await;
    alerts.error(ArcStr::from("b")).await;

    let history = alerts.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].kind, AlertKind::Error);
}
