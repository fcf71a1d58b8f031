//! Listener traits for session callbacks
//!
//! Listeners are registered as `Arc<dyn ...>`. Registration identity is the
//! `Arc` allocation: registering clones of the same `Arc` twice is a no-op,
//! while two separately allocated listeners are always distinct.

use crate::peer::Peer;
use crate::types::{P2pGroup, P2pInfo, P2pStatus};

/// Receives peer lists produced by peers-changed broadcasts
pub trait PeerListAcquisitionListener: Send + Sync {
    /// Called with the current peers; an empty slice is a valid result
    fn on_peer_list_acquisition_success(&self, peers: &[Peer]);
}

impl<F> PeerListAcquisitionListener for F
where
    F: Fn(&[Peer]) + Send + Sync,
{
    fn on_peer_list_acquisition_success(&self, peers: &[Peer]) {
        self(peers)
    }
}

/// Receives the outcome of a group creation request
pub trait CreateGroupListener: Send + Sync {
    /// Group formed with this device as owner
    fn on_create_group_success(&self, group: &P2pGroup);

    /// Platform refused to create the group
    fn on_create_group_failure(&self, status: P2pStatus);
}

/// Receives the outcome of [`Peer::connect`]
pub trait PeerConnectionListener: Send + Sync {
    fn on_peer_connection_success(&self, peer: &Peer, info: &P2pInfo);

    fn on_peer_connection_failure(&self, status: P2pStatus);
}

/// Connection listener that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingPeerConnectionListener;

impl PeerConnectionListener for LoggingPeerConnectionListener {
    fn on_peer_connection_success(&self, peer: &Peer, info: &P2pInfo) {
        tracing::info!("Connection to device {} succeeded. info: {}", peer, info);
    }

    fn on_peer_connection_failure(&self, status: P2pStatus) {
        tracing::warn!(
            "Connection to device failed. reason: {} ({})",
            status,
            status.code()
        );
    }
}
