//! Periodic peer discovery

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::platform::{log_action_result, P2pChannel};

/// Repeating task that issues one discovery request per period
///
/// The first request goes out as soon as the heartbeat starts. At most one
/// task runs per heartbeat; it is aborted on [`stop`](Heartbeat::stop) or drop.
#[derive(Debug, Default)]
pub struct Heartbeat {
    task: Option<JoinHandle<()>>,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start beating on `channel` every `period`
    ///
    /// Returns false without doing anything if already running.
    /// Must be called within a tokio runtime.
    pub fn start(&mut self, channel: P2pChannel, period: Duration) -> bool {
        if self.task.is_some() {
            return false;
        }
        tracing::debug!("Heartbeat starting with period {:?}", period);
        self.task = Some(tokio::spawn(beat(channel, period)));
        true
    }

    /// Cancel the task and forget it. Returns false if not running
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                tracing::debug!("Heartbeat stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn beat(channel: P2pChannel, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        let result = channel.discover_peers().await;
        log_action_result("Heartbeat - Discover Peers", &result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::{InMemoryPlatform, PlatformCall};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_immediately_then_every_period() {
        let platform = Arc::new(InMemoryPlatform::new());
        let mut heartbeat = Heartbeat::new();
        assert!(heartbeat.start(P2pChannel::open(platform.clone()), Duration::from_secs(5)));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(platform.count(&PlatformCall::DiscoverPeers), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(platform.count(&PlatformCall::DiscoverPeers), 2);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(platform.count(&PlatformCall::DiscoverPeers), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_noop() {
        let platform = Arc::new(InMemoryPlatform::new());
        let mut heartbeat = Heartbeat::new();
        assert!(heartbeat.start(P2pChannel::open(platform.clone()), Duration::from_secs(5)));
        assert!(!heartbeat.start(P2pChannel::open(platform.clone()), Duration::from_secs(5)));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(platform.count(&PlatformCall::DiscoverPeers), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_task() {
        let platform = Arc::new(InMemoryPlatform::new());
        let mut heartbeat = Heartbeat::new();
        heartbeat.start(P2pChannel::open(platform.clone()), Duration::from_secs(5));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(heartbeat.stop());
        assert!(!heartbeat.stop());
        assert!(!heartbeat.is_running());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(platform.count(&PlatformCall::DiscoverPeers), 1);

        // A stopped heartbeat can be started again
        assert!(heartbeat.start(P2pChannel::open(platform.clone()), Duration::from_secs(5)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(platform.count(&PlatformCall::DiscoverPeers), 2);
    }
}
