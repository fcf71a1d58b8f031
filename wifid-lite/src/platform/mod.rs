//! Platform layer for wifid-lite

pub mod memory;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::broadcast::{BroadcastKind, P2pBroadcast};
use crate::types::{P2pConfig, P2pInfo, P2pStatus};

/// Outcome of a platform action: success, or the platform's failure reason
pub type ActionResult = std::result::Result<(), P2pStatus>;

/// Trait for the platform WiFi Direct service
///
/// Actions complete asynchronously; their futures resolve when the platform
/// reports success or failure. State changes are pushed separately as
/// [`P2pBroadcast`] values to the receiver registered with
/// [`register_receiver`](WifiP2pPlatform::register_receiver).
pub trait WifiP2pPlatform: Send + Sync {
    /// Start forwarding broadcasts of the given kinds to `sender`
    ///
    /// Replaces any previously registered receiver.
    fn register_receiver(&self, kinds: &[BroadcastKind], sender: flume::Sender<P2pBroadcast>);

    /// Stop forwarding broadcasts. Returns false if no receiver was registered
    fn unregister_receiver(&self) -> bool;

    /// Start a peer discovery round
    fn discover_peers(&self) -> BoxFuture<'_, ActionResult>;

    /// Remove the current group, if any
    fn remove_group(&self) -> BoxFuture<'_, ActionResult>;

    /// Create a group with this device as owner
    fn create_group(&self) -> BoxFuture<'_, ActionResult>;

    /// Connection info of this device
    fn request_connection_info(&self) -> BoxFuture<'_, P2pInfo>;

    /// Invite the device named in `config` to connect
    fn connect(&self, config: P2pConfig) -> BoxFuture<'_, ActionResult>;

    /// Show the system WiFi settings
    fn open_wifi_settings(&self) -> ActionResult;
}

/// Handle bound to the platform through which all outbound requests go
///
/// Cheap to clone; every [`Peer`](crate::Peer) carries one.
#[derive(Clone)]
pub struct P2pChannel {
    platform: Arc<dyn WifiP2pPlatform>,
}

impl std::fmt::Debug for P2pChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("P2pChannel").finish_non_exhaustive()
    }
}

impl P2pChannel {
    /// Open a channel on the given platform
    pub fn open(platform: Arc<dyn WifiP2pPlatform>) -> Self {
        tracing::debug!("P2P channel opened");
        Self { platform }
    }

    pub async fn discover_peers(&self) -> ActionResult {
        self.platform.discover_peers().await
    }

    pub async fn remove_group(&self) -> ActionResult {
        self.platform.remove_group().await
    }

    pub async fn create_group(&self) -> ActionResult {
        self.platform.create_group().await
    }

    pub async fn request_connection_info(&self) -> P2pInfo {
        self.platform.request_connection_info().await
    }

    pub async fn connect(&self, config: P2pConfig) -> ActionResult {
        self.platform.connect(config).await
    }
}

/// Log the outcome of a fire-and-forget platform action
pub(crate) fn log_action_result(action: &str, result: &ActionResult) {
    match result {
        Ok(()) => tracing::debug!("{} successful", action),
        Err(status) => tracing::debug!("{}. WifiP2pManager status: {}", action, status),
    }
}
