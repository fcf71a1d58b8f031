//! Listener registry with identity-set semantics

use std::sync::Arc;

use crate::listener::{CreateGroupListener, PeerListAcquisitionListener};
use crate::peer::Peer;
use crate::types::{AcquisitionFrequency, P2pGroup};

/// Insertion-ordered set of listeners keyed by `Arc` identity
pub struct ListenerSet<L: ?Sized> {
    members: Vec<Arc<L>>,
}

impl<L: ?Sized> Default for ListenerSet<L> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<L: ?Sized> std::fmt::Debug for ListenerSet<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.members.len())
            .finish()
    }
}

impl<L: ?Sized> ListenerSet<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `listener` unless already present. Returns whether it was added
    pub fn insert(&mut self, listener: Arc<L>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.members.push(listener);
        true
    }

    /// Remove `listener` if present. Returns whether it was removed
    pub fn remove(&mut self, listener: &Arc<L>) -> bool {
        let before = self.members.len();
        self.members.retain(|member| !same_listener(member, listener));
        self.members.len() != before
    }

    pub fn contains(&self, listener: &Arc<L>) -> bool {
        self.members.iter().any(|member| same_listener(member, listener))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<L>> {
        self.members.iter()
    }

    /// Remove and return all members
    pub fn take(&mut self) -> Vec<Arc<L>> {
        std::mem::take(&mut self.members)
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

// Compare data addresses only; vtable pointers of the same object may differ
// across codegen units.
fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Subscriber sets of a session
///
/// Holds one-time and ongoing peer-list listeners plus one-time group
/// listeners. Not synchronized: the session dispatcher is its only owner.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    one_time_peer_listeners: ListenerSet<dyn PeerListAcquisitionListener>,
    ongoing_peer_listeners: ListenerSet<dyn PeerListAcquisitionListener>,
    create_group_listeners: ListenerSet<dyn CreateGroupListener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer-list listener in the set selected by `frequency`
    pub fn add_peer_list_listener(
        &mut self,
        listener: Arc<dyn PeerListAcquisitionListener>,
        frequency: AcquisitionFrequency,
    ) -> bool {
        match frequency {
            AcquisitionFrequency::OneTime => self.one_time_peer_listeners.insert(listener),
            AcquisitionFrequency::Ongoing => self.ongoing_peer_listeners.insert(listener),
        }
    }

    /// Remove a peer-list listener from both sets
    pub fn remove_peer_list_listener(
        &mut self,
        listener: &Arc<dyn PeerListAcquisitionListener>,
    ) -> bool {
        let ongoing = self.ongoing_peer_listeners.remove(listener);
        let one_time = self.one_time_peer_listeners.remove(listener);
        ongoing || one_time
    }

    pub fn add_create_group_listener(&mut self, listener: Arc<dyn CreateGroupListener>) -> bool {
        self.create_group_listeners.insert(listener)
    }

    pub fn remove_create_group_listener(
        &mut self,
        listener: &Arc<dyn CreateGroupListener>,
    ) -> bool {
        self.create_group_listeners.remove(listener)
    }

    /// Deliver `peers` to every peer-list listener
    ///
    /// One-time listeners are invoked once each and then dropped; ongoing
    /// listeners stay registered. Returns the number of callbacks made.
    pub fn deliver_peers(&mut self, peers: &[Peer]) -> usize {
        let one_time = self.one_time_peer_listeners.take();
        for listener in &one_time {
            listener.on_peer_list_acquisition_success(peers);
        }
        for listener in self.ongoing_peer_listeners.iter() {
            listener.on_peer_list_acquisition_success(peers);
        }
        one_time.len() + self.ongoing_peer_listeners.len()
    }

    /// Deliver a formed group to every group listener, then drop them all
    pub fn deliver_group(&mut self, group: &P2pGroup) -> usize {
        let listeners = self.create_group_listeners.take();
        for listener in &listeners {
            listener.on_create_group_success(group);
        }
        listeners.len()
    }

    pub fn peer_listener_count(&self, frequency: AcquisitionFrequency) -> usize {
        match frequency {
            AcquisitionFrequency::OneTime => self.one_time_peer_listeners.len(),
            AcquisitionFrequency::Ongoing => self.ongoing_peer_listeners.len(),
        }
    }

    pub fn create_group_listener_count(&self) -> usize {
        self.create_group_listeners.len()
    }

    pub fn clear(&mut self) {
        self.one_time_peer_listeners.clear();
        self.ongoing_peer_listeners.clear();
        self.create_group_listeners.clear();
    }
}
