//! Listeners printing session callbacks to the terminal

use std::sync::{Arc, Mutex};

use wifid_lite::{
    CreateGroupListener, LoggingPeerConnectionListener, P2pGroup, P2pInfo, P2pStatus, Peer,
    PeerConnectionListener, PeerListAcquisitionListener,
};

/// Prints peer lists and remembers the latest one
#[derive(Debug)]
pub struct PeerPrinter {
    label: &'static str,
    latest: Arc<Mutex<Vec<Peer>>>,
}

impl PeerPrinter {
    pub fn new(label: &'static str, latest: Arc<Mutex<Vec<Peer>>>) -> Self {
        Self { label, latest }
    }
}

impl PeerListAcquisitionListener for PeerPrinter {
    fn on_peer_list_acquisition_success(&self, peers: &[Peer]) {
        println!("← [{}] {} peer(s)", self.label, peers.len());
        for peer in peers {
            println!("    {}", peer);
        }
        *self.latest.lock().unwrap_or_else(|p| p.into_inner()) = peers.to_vec();
    }
}

#[derive(Debug, Default)]
pub struct GroupPrinter;

impl CreateGroupListener for GroupPrinter {
    fn on_create_group_success(&self, group: &P2pGroup) {
        println!(
            "← Group formed: {} on {} (passphrase: {})",
            group.network_name.as_deref().unwrap_or("null"),
            group.interface.as_deref().unwrap_or("null"),
            group.passphrase.as_deref().unwrap_or("none"),
        );
        if let Some(owner) = &group.owner {
            println!(
                "    owner: {} ({})",
                owner.name.as_deref().unwrap_or("null"),
                owner.address.as_deref().unwrap_or("null")
            );
        }
        println!("    clients: {}", group.clients.len());
    }

    fn on_create_group_failure(&self, status: P2pStatus) {
        println!("← Group creation failed: {}", status);
    }
}

/// Prints connection outcomes and logs them through the library listener
#[derive(Debug, Default)]
pub struct ConnectionPrinter {
    log: LoggingPeerConnectionListener,
}

impl PeerConnectionListener for ConnectionPrinter {
    fn on_peer_connection_success(&self, peer: &Peer, info: &P2pInfo) {
        println!("← Invitation sent to {} ({})", peer, info);
        self.log.on_peer_connection_success(peer, info);
    }

    fn on_peer_connection_failure(&self, status: P2pStatus) {
        println!("← Connection failed: {}", status);
        self.log.on_peer_connection_failure(status);
    }
}
