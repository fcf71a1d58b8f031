//! Broadcast events pushed by the platform

use crate::types::{P2pDevice, P2pGroup, P2pState};

/// Kind of platform broadcast, used as the registration filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadcastKind {
    StateChanged,
    PeersChanged,
    ConnectionChanged,
    ThisDeviceChanged,
}

impl BroadcastKind {
    /// Every kind the session listens to
    pub const ALL: [BroadcastKind; 4] = [
        BroadcastKind::StateChanged,
        BroadcastKind::PeersChanged,
        BroadcastKind::ConnectionChanged,
        BroadcastKind::ThisDeviceChanged,
    ];
}

impl std::fmt::Display for BroadcastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BroadcastKind::StateChanged => write!(f, "state changed"),
            BroadcastKind::PeersChanged => write!(f, "peers changed"),
            BroadcastKind::ConnectionChanged => write!(f, "connection changed"),
            BroadcastKind::ThisDeviceChanged => write!(f, "this device changed"),
        }
    }
}

/// A broadcast from the platform P2P service
///
/// Payloads are optional: the platform may omit them, in which case the
/// event is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum P2pBroadcast {
    /// The P2P radio was switched on or off
    StateChanged { state: Option<P2pState> },
    /// The set of visible peers changed
    PeersChanged { devices: Option<Vec<P2pDevice>> },
    /// A connection or group changed
    ConnectionChanged { group: Option<P2pGroup> },
    /// Details of this device changed
    ThisDeviceChanged { device: Option<P2pDevice> },
}

impl P2pBroadcast {
    pub fn kind(&self) -> BroadcastKind {
        match self {
            P2pBroadcast::StateChanged { .. } => BroadcastKind::StateChanged,
            P2pBroadcast::PeersChanged { .. } => BroadcastKind::PeersChanged,
            P2pBroadcast::ConnectionChanged { .. } => BroadcastKind::ConnectionChanged,
            P2pBroadcast::ThisDeviceChanged { .. } => BroadcastKind::ThisDeviceChanged,
        }
    }

    /// Peers-changed broadcast carrying `devices`
    pub fn peers(devices: Vec<P2pDevice>) -> Self {
        P2pBroadcast::PeersChanged {
            devices: Some(devices),
        }
    }

    /// Connection-changed broadcast carrying `group`
    pub fn group(group: P2pGroup) -> Self {
        P2pBroadcast::ConnectionChanged { group: Some(group) }
    }

    /// State-changed broadcast for the given radio state
    pub fn state(enabled: bool) -> Self {
        let state = if enabled {
            P2pState::Enabled
        } else {
            P2pState::Disabled
        };
        P2pBroadcast::StateChanged { state: Some(state) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(P2pBroadcast::peers(vec![]).kind(), BroadcastKind::PeersChanged);
        assert_eq!(
            P2pBroadcast::group(P2pGroup::default()).kind(),
            BroadcastKind::ConnectionChanged
        );
        assert_eq!(P2pBroadcast::state(true).kind(), BroadcastKind::StateChanged);
        assert_eq!(
            P2pBroadcast::ThisDeviceChanged { device: None }.kind(),
            BroadcastKind::ThisDeviceChanged
        );
    }

    #[test]
    fn test_all_kinds_distinct() {
        let kinds: std::collections::HashSet<_> = BroadcastKind::ALL.iter().collect();
        assert_eq!(kinds.len(), 4);
    }
}
