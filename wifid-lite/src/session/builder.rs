use std::sync::Arc;

use crate::config::SessionConfig;
use crate::error::Result;
use crate::platform::WifiP2pPlatform;
use crate::session::WifiDLite;

/// Builder for initialized sessions
///
/// Awaiting the builder opens a session and initializes it with the
/// accumulated configuration.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use wifid_lite::{InMemoryPlatform, WifiDLite};
///
/// # async fn example() -> wifid_lite::Result<()> {
/// let session = WifiDLite::builder(Arc::new(InMemoryPlatform::new()))
///     .heartbeat_delay_secs(10)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[must_use = "SessionBuilder does nothing unless you `.await` it"]
pub struct SessionBuilder {
    platform: Arc<dyn WifiP2pPlatform>,
    config: SessionConfig,
}

impl SessionBuilder {
    pub(crate) fn new(platform: Arc<dyn WifiP2pPlatform>) -> Self {
        Self {
            platform,
            config: SessionConfig::default(),
        }
    }

    /// Set the heartbeat delay in seconds
    pub fn heartbeat_delay_secs(mut self, secs: u64) -> Self {
        self.config.heartbeat_delay_secs = secs;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }
}

impl std::future::IntoFuture for SessionBuilder {
    type Output = Result<WifiDLite>;
    type IntoFuture = std::pin::Pin<Box<dyn std::future::Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let session = WifiDLite::open(self.platform);
            session.initialize(self.config).await?;
            Ok(session)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WifiDError;
    use crate::platform::memory::{InMemoryPlatform, PlatformCall};

    #[tokio::test]
    async fn test_builder_initializes_session() {
        let platform = Arc::new(InMemoryPlatform::new());
        let session = WifiDLite::builder(platform.clone())
            .heartbeat_delay_secs(30)
            .await
            .unwrap();

        assert!(platform.has_receiver());
        assert_eq!(platform.count(&PlatformCall::RegisterReceiver), 1);
        assert!(!session.is_enabled().await.unwrap());
    }

    #[tokio::test]
    async fn test_builder_rejects_invalid_config() {
        let platform = Arc::new(InMemoryPlatform::new());
        let result = WifiDLite::builder(platform.clone())
            .config(SessionConfig::new().with_heartbeat_delay_secs(0))
            .await;

        assert!(matches!(result, Err(WifiDError::InvalidConfig(_))));
        assert!(!platform.has_receiver());
    }
}
