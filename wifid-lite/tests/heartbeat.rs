use std::sync::Arc;
use std::time::Duration;

use wifid_lite::{InMemoryPlatform, PlatformCall, SessionConfig, WifiDLite};

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn discoveries(platform: &InMemoryPlatform) -> usize {
    platform.count(&PlatformCall::DiscoverPeers)
}

#[tokio::test(start_paused = true)]
async fn test_session_heartbeat_discovers_on_schedule() {
    let platform = Arc::new(InMemoryPlatform::new());
    let _session = WifiDLite::builder(platform.clone())
        .heartbeat_delay_secs(5)
        .await
        .unwrap();
    settle().await;
    assert_eq!(discoveries(&platform), 1);

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    settle().await;
    assert_eq!(discoveries(&platform), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    settle().await;
    assert_eq!(discoveries(&platform), 2);

    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(discoveries(&platform), 3);
}

#[tokio::test(start_paused = true)]
async fn test_dispose_stops_heartbeat() {
    let platform = Arc::new(InMemoryPlatform::new());
    let session = WifiDLite::builder(platform.clone())
        .heartbeat_delay_secs(5)
        .await
        .unwrap();
    settle().await;

    session.dispose().await.unwrap();
    session.dispose().await.unwrap();
    let before = discoveries(&platform);

    tokio::time::sleep(Duration::from_secs(30)).await;
    settle().await;
    assert_eq!(discoveries(&platform), before);
}

#[tokio::test(start_paused = true)]
async fn test_reinitialize_keeps_first_heartbeat() {
    let platform = Arc::new(InMemoryPlatform::new());
    let session = WifiDLite::builder(platform.clone())
        .heartbeat_delay_secs(10)
        .await
        .unwrap();
    session
        .initialize(SessionConfig::new().with_heartbeat_delay_secs(1))
        .await
        .unwrap();
    settle().await;
    assert_eq!(discoveries(&platform), 1);

    tokio::time::sleep(Duration::from_millis(9_500)).await;
    settle().await;
    assert_eq!(discoveries(&platform), 1);
}
