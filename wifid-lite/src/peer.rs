//! Discovered peer handle

use crate::listener::PeerConnectionListener;
use crate::platform::P2pChannel;
use crate::types::{non_empty, P2pConfig, P2pDevice};

/// A discovered remote device plus the channel it was discovered on
///
/// Peers are rebuilt on every peer-list update and never mutated.
#[derive(Debug, Clone)]
pub struct Peer {
    device: P2pDevice,
    channel: P2pChannel,
}

impl Peer {
    pub fn new(device: P2pDevice, channel: P2pChannel) -> Self {
        Self { device, channel }
    }

    /// The underlying platform device
    pub fn device(&self) -> &P2pDevice {
        &self.device
    }

    pub fn name(&self) -> Option<&str> {
        self.device.name.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.device.address.as_deref()
    }

    /// Invite the peer to connect to this device
    ///
    /// The remote user must accept the invitation. Exactly one listener
    /// method is called once the platform answers. A peer lacking a name or
    /// address is skipped with a warning: the listener is never called and
    /// `false` is returned.
    pub async fn connect(&self, listener: &dyn PeerConnectionListener) -> bool {
        let (Some(name), Some(address)) = (non_empty(self.name()), non_empty(self.address()))
        else {
            tracing::warn!(
                "Cannot attempt connection to peer. Device name ({:?}) and/or address ({:?}) not available.",
                self.name(),
                self.address()
            );
            return false;
        };

        let info = self.channel.request_connection_info().await;
        tracing::debug!("Connection info before connecting to {}: {}", name, info);

        match self.channel.connect(P2pConfig::new(address)).await {
            Ok(()) => {
                tracing::debug!(
                    "connect to device successful. deviceName:{} deviceAddress:{}",
                    name,
                    address
                );
                listener.on_peer_connection_success(self, &info);
            }
            Err(status) => {
                tracing::warn!(
                    "connect to device unsuccessful. deviceName:{} deviceAddress:{} status:{}",
                    name,
                    address,
                    status
                );
                listener.on_peer_connection_failure(status);
            }
        }
        true
    }
}

impl PartialEq for Peer {
    fn eq(&self, other: &Self) -> bool {
        self.device.name == other.device.name && self.device.address == other.device.address
    }
}

impl Eq for Peer {}

impl std::fmt::Display for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.name().unwrap_or("null"),
            self.address().unwrap_or("null")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::{InMemoryPlatform, PlatformAction, PlatformCall};
    use crate::types::{P2pInfo, P2pStatus};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingListener {
        outcomes: Mutex<Vec<Result<String, P2pStatus>>>,
    }

    impl PeerConnectionListener for RecordingListener {
        fn on_peer_connection_success(&self, peer: &Peer, _info: &P2pInfo) {
            self.outcomes.lock().unwrap().push(Ok(peer.to_string()));
        }

        fn on_peer_connection_failure(&self, status: P2pStatus) {
            self.outcomes.lock().unwrap().push(Err(status));
        }
    }

    fn peer_on(platform: &Arc<InMemoryPlatform>, device: P2pDevice) -> Peer {
        Peer::new(device, P2pChannel::open(platform.clone()))
    }

    #[tokio::test]
    async fn test_connect_success() {
        let platform = Arc::new(InMemoryPlatform::new());
        let peer = peer_on(&platform, P2pDevice::new("Aldric", "02:00:00:00:00:0a"));
        let listener = RecordingListener::default();

        assert!(peer.connect(&listener).await);
        assert_eq!(
            *listener.outcomes.lock().unwrap(),
            vec![Ok("Aldric (02:00:00:00:00:0a)".to_string())]
        );
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::RequestConnectionInfo,
                PlatformCall::Connect {
                    device_address: "02:00:00:00:00:0a".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_connect_failure_reported_once() {
        let platform = Arc::new(InMemoryPlatform::new());
        platform.fail(PlatformAction::Connect, P2pStatus::Busy);
        let peer = peer_on(&platform, P2pDevice::new("Aldric", "02:00:00:00:00:0a"));
        let listener = RecordingListener::default();

        assert!(peer.connect(&listener).await);
        assert_eq!(*listener.outcomes.lock().unwrap(), vec![Err(P2pStatus::Busy)]);
    }

    #[tokio::test]
    async fn test_connect_with_logging_listener() {
        let platform = Arc::new(InMemoryPlatform::new());
        let peer = peer_on(&platform, P2pDevice::new("Rowan", "02:00:00:00:00:0b"));

        assert!(peer.connect(&crate::listener::LoggingPeerConnectionListener).await);
        platform.fail(PlatformAction::Connect, P2pStatus::P2pUnsupported);
        assert!(peer.connect(&crate::listener::LoggingPeerConnectionListener).await);

        assert_eq!(
            platform.count(&PlatformCall::Connect {
                device_address: "02:00:00:00:00:0b".to_string()
            }),
            2
        );
    }

    #[tokio::test]
    async fn test_connect_without_address_is_dropped() {
        let platform = Arc::new(InMemoryPlatform::new());
        let listener = RecordingListener::default();

        let missing = peer_on(
            &platform,
            P2pDevice {
                name: Some("Ghost".to_string()),
                ..P2pDevice::default()
            },
        );
        assert!(!missing.connect(&listener).await);

        let empty = peer_on(&platform, P2pDevice::new("Ghost", ""));
        assert!(!empty.connect(&listener).await);

        assert!(listener.outcomes.lock().unwrap().is_empty());
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn test_display_and_equality() {
        let platform = Arc::new(InMemoryPlatform::new());
        let a = peer_on(&platform, P2pDevice::new("Isolde", "02:00:00:00:00:01"));
        let b = peer_on(
            &platform,
            P2pDevice::new("Isolde", "02:00:00:00:00:01")
                .with_status(crate::types::DeviceStatus::Invited),
        );
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "Isolde (02:00:00:00:00:01)");

        let nameless = peer_on(&platform, P2pDevice::default());
        assert_eq!(nameless.to_string(), "null (null)");
    }
}
