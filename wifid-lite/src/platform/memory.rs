//! In-process platform with scripted outcomes
//!
//! Records every call it receives and lets the caller decide which actions
//! fail and which broadcasts get emitted. Used by the test-suite and the demo.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use super::{ActionResult, WifiP2pPlatform};
use crate::broadcast::{BroadcastKind, P2pBroadcast};
use crate::types::{P2pConfig, P2pDevice, P2pGroup, P2pInfo, P2pStatus};

/// A call received by [`InMemoryPlatform`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    RegisterReceiver,
    UnregisterReceiver,
    DiscoverPeers,
    RemoveGroup,
    CreateGroup,
    RequestConnectionInfo,
    Connect { device_address: String },
    OpenWifiSettings,
}

/// Platform actions whose outcome can be scripted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformAction {
    DiscoverPeers,
    RemoveGroup,
    CreateGroup,
    Connect,
    OpenWifiSettings,
}

struct RegisteredReceiver {
    kinds: Vec<BroadcastKind>,
    sender: flume::Sender<P2pBroadcast>,
}

impl RegisteredReceiver {
    fn deliver(&self, broadcast: P2pBroadcast) -> bool {
        self.kinds.contains(&broadcast.kind()) && self.sender.send(broadcast).is_ok()
    }
}

#[derive(Default)]
struct PlatformState {
    receiver: Option<RegisteredReceiver>,
    calls: Vec<PlatformCall>,
    failures: HashMap<PlatformAction, P2pStatus>,
    delays: HashMap<PlatformAction, Duration>,
    nearby_devices: Vec<P2pDevice>,
    auto_broadcast: bool,
    group: Option<P2pGroup>,
    connection_info: P2pInfo,
}

impl PlatformState {
    fn record(&mut self, call: PlatformCall, action: PlatformAction) -> ActionResult {
        self.calls.push(call);
        match self.failures.get(&action) {
            Some(status) => Err(*status),
            None => Ok(()),
        }
    }

    /// Future resolving to `result`, after the scripted delay of `action` if any
    fn respond(
        &self,
        action: PlatformAction,
        result: ActionResult,
    ) -> BoxFuture<'static, ActionResult> {
        match self.delays.get(&action).copied() {
            Some(delay) => async move {
                tokio::time::sleep(delay).await;
                result
            }
            .boxed(),
            None => futures::future::ready(result).boxed(),
        }
    }

    fn emit(&self, broadcast: P2pBroadcast) -> bool {
        match &self.receiver {
            Some(receiver) => receiver.deliver(broadcast),
            None => false,
        }
    }
}

/// Scripted [`WifiP2pPlatform`] living entirely in memory
///
/// With auto-broadcast enabled, a successful discovery emits a peers-changed
/// broadcast listing the nearby devices, and a successful group creation
/// emits a connection-changed broadcast carrying the configured group.
#[derive(Default)]
pub struct InMemoryPlatform {
    state: Mutex<PlatformState>,
}

impl std::fmt::Debug for InMemoryPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("InMemoryPlatform")
            .field("calls", &state.calls.len())
            .field("nearby_devices", &state.nearby_devices.len())
            .field("auto_broadcast", &state.auto_broadcast)
            .finish()
    }
}

impl InMemoryPlatform {
    /// Create a platform where every action succeeds and nothing is emitted
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the devices reported after a discovery round
    pub fn with_nearby_devices(self, devices: Vec<P2pDevice>) -> Self {
        self.set_nearby_devices(devices);
        self
    }

    /// Emit broadcasts in reaction to successful actions
    pub fn with_auto_broadcast(self, enabled: bool) -> Self {
        self.lock().auto_broadcast = enabled;
        self
    }

    /// Set the group announced after a successful group creation
    pub fn with_group(self, group: P2pGroup) -> Self {
        self.lock().group = Some(group);
        self
    }

    /// Set the connection info returned to peers before connecting
    pub fn with_connection_info(self, info: P2pInfo) -> Self {
        self.lock().connection_info = info;
        self
    }

    pub fn set_nearby_devices(&self, devices: Vec<P2pDevice>) {
        self.lock().nearby_devices = devices;
    }

    /// Make every subsequent `action` fail with `status`
    pub fn fail(&self, action: PlatformAction, status: P2pStatus) {
        self.lock().failures.insert(action, status);
    }

    /// Make `action` succeed again
    pub fn succeed(&self, action: PlatformAction) {
        self.lock().failures.remove(&action);
    }

    /// Hold back the answer to every subsequent `action` by `delay`
    ///
    /// The call is still recorded, and auto-broadcasts still fire, at call time.
    pub fn delay(&self, action: PlatformAction, delay: Duration) {
        self.lock().delays.insert(action, delay);
    }

    /// Push a broadcast to the registered receiver
    ///
    /// Returns false when no receiver is registered for that kind.
    pub fn emit(&self, broadcast: P2pBroadcast) -> bool {
        self.lock().emit(broadcast)
    }

    pub fn has_receiver(&self) -> bool {
        self.lock().receiver.is_some()
    }

    /// Snapshot of all calls received so far, oldest first
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.lock().calls.clone()
    }

    /// Number of times `call` was received
    pub fn count(&self, call: &PlatformCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    fn lock(&self) -> MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WifiP2pPlatform for InMemoryPlatform {
    fn register_receiver(&self, kinds: &[BroadcastKind], sender: flume::Sender<P2pBroadcast>) {
        let mut state = self.lock();
        state.calls.push(PlatformCall::RegisterReceiver);
        state.receiver = Some(RegisteredReceiver {
            kinds: kinds.to_vec(),
            sender,
        });
    }

    fn unregister_receiver(&self) -> bool {
        let mut state = self.lock();
        state.calls.push(PlatformCall::UnregisterReceiver);
        state.receiver.take().is_some()
    }

    fn discover_peers(&self) -> BoxFuture<'_, ActionResult> {
        let mut state = self.lock();
        let result = state.record(PlatformCall::DiscoverPeers, PlatformAction::DiscoverPeers);
        if result.is_ok() && state.auto_broadcast {
            let devices = state.nearby_devices.clone();
            state.emit(P2pBroadcast::peers(devices));
        }
        state.respond(PlatformAction::DiscoverPeers, result)
    }

    fn remove_group(&self) -> BoxFuture<'_, ActionResult> {
        let mut state = self.lock();
        let result = state.record(PlatformCall::RemoveGroup, PlatformAction::RemoveGroup);
        state.respond(PlatformAction::RemoveGroup, result)
    }

    fn create_group(&self) -> BoxFuture<'_, ActionResult> {
        let mut state = self.lock();
        let result = state.record(PlatformCall::CreateGroup, PlatformAction::CreateGroup);
        if result.is_ok() && state.auto_broadcast {
            let group = state
                .group
                .clone()
                .unwrap_or_else(|| P2pGroup::new("DIRECT-wifid", "p2p-wlan0-0"));
            state.emit(P2pBroadcast::group(group));
        }
        state.respond(PlatformAction::CreateGroup, result)
    }

    fn request_connection_info(&self) -> BoxFuture<'_, P2pInfo> {
        let mut state = self.lock();
        state.calls.push(PlatformCall::RequestConnectionInfo);
        futures::future::ready(state.connection_info.clone()).boxed()
    }

    fn connect(&self, config: P2pConfig) -> BoxFuture<'_, ActionResult> {
        let mut state = self.lock();
        let result = state.record(
            PlatformCall::Connect {
                device_address: config.device_address,
            },
            PlatformAction::Connect,
        );
        state.respond(PlatformAction::Connect, result)
    }

    fn open_wifi_settings(&self) -> ActionResult {
        self.lock()
            .record(PlatformCall::OpenWifiSettings, PlatformAction::OpenWifiSettings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let platform = InMemoryPlatform::new();
        platform.remove_group().await.unwrap();
        platform.create_group().await.unwrap();
        platform.connect(P2pConfig::new("aa:bb")).await.unwrap();

        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::RemoveGroup,
                PlatformCall::CreateGroup,
                PlatformCall::Connect {
                    device_address: "aa:bb".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let platform = InMemoryPlatform::new();
        platform.fail(PlatformAction::CreateGroup, P2pStatus::Busy);
        assert_eq!(platform.create_group().await, Err(P2pStatus::Busy));

        platform.succeed(PlatformAction::CreateGroup);
        assert_eq!(platform.create_group().await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_delay() {
        let platform = InMemoryPlatform::new();
        platform.delay(PlatformAction::CreateGroup, Duration::from_secs(2));
        platform.fail(PlatformAction::CreateGroup, P2pStatus::Busy);

        let started = tokio::time::Instant::now();
        let pending = platform.create_group();
        assert_eq!(platform.count(&PlatformCall::CreateGroup), 1);
        assert_eq!(pending.await, Err(P2pStatus::Busy));
        assert!(started.elapsed() >= Duration::from_secs(2));

        // Other actions are not held back
        let started = tokio::time::Instant::now();
        platform.remove_group().await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_emit_respects_filter() {
        let platform = InMemoryPlatform::new();
        assert!(!platform.emit(P2pBroadcast::state(true)));

        let (tx, rx) = flume::unbounded();
        platform.register_receiver(&[BroadcastKind::PeersChanged], tx);

        assert!(!platform.emit(P2pBroadcast::state(true)));
        assert!(platform.emit(P2pBroadcast::peers(vec![])));
        assert_eq!(rx.try_recv().unwrap(), P2pBroadcast::peers(vec![]));

        assert!(platform.unregister_receiver());
        assert!(!platform.unregister_receiver());
        assert!(!platform.emit(P2pBroadcast::peers(vec![])));
    }

    #[tokio::test]
    async fn test_auto_broadcast_after_discovery() {
        let devices = vec![P2pDevice::new("Theron", "02:00:00:00:00:01")];
        let platform = InMemoryPlatform::new()
            .with_nearby_devices(devices.clone())
            .with_auto_broadcast(true);

        let (tx, rx) = flume::unbounded();
        platform.register_receiver(&BroadcastKind::ALL, tx);
        platform.discover_peers().await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), P2pBroadcast::peers(devices));
    }
}
