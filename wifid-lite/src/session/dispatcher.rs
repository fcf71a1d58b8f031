/// Session dispatcher: the single owner of all session state
use std::sync::Arc;

use super::SessionCommand;
use crate::broadcast::{BroadcastKind, P2pBroadcast};
use crate::config::SessionConfig;
use crate::error::{Result, WifiDError};
use crate::heartbeat::Heartbeat;
use crate::listener::{CreateGroupListener, PeerListAcquisitionListener};
use crate::peer::Peer;
use crate::platform::{log_action_result, P2pChannel, WifiP2pPlatform};
use crate::registry::ListenerRegistry;
use crate::types::{AcquisitionFrequency, P2pState, P2pStatus};

/// Results of platform requests running outside the dispatcher
enum Completion {
    CreateGroupFailed {
        generation: u64,
        listener: Arc<dyn CreateGroupListener>,
        status: P2pStatus,
    },
}

pub(crate) struct SessionDispatcher {
    platform: Arc<dyn WifiP2pPlatform>,

    /// Commands from session handles
    command_rx: flume::Receiver<SessionCommand>,

    /// Completions reported by spawned platform requests
    completion_tx: flume::Sender<Completion>,
    completion_rx: flume::Receiver<Completion>,

    /// Present while initialized
    config: Option<SessionConfig>,
    channel: Option<P2pChannel>,
    broadcast_rx: Option<flume::Receiver<P2pBroadcast>>,

    /// Bumped on every initialize; completions from older generations are stale
    generation: u64,

    enabled: bool,
    heartbeat: Heartbeat,
    registry: ListenerRegistry,
}

impl SessionDispatcher {
    pub(crate) fn new(
        platform: Arc<dyn WifiP2pPlatform>,
        command_rx: flume::Receiver<SessionCommand>,
    ) -> Self {
        let (completion_tx, completion_rx) = flume::unbounded();
        Self {
            platform,
            command_rx,
            completion_tx,
            completion_rx,
            config: None,
            channel: None,
            broadcast_rx: None,
            generation: 0,
            enabled: false,
            heartbeat: Heartbeat::new(),
            registry: ListenerRegistry::new(),
        }
    }

    /// Process commands, broadcasts and completions until closed
    pub(crate) async fn run(mut self) {
        loop {
            let keep_running = tokio::select! {
                command = self.command_rx.recv_async() => match command {
                    Ok(command) => self.handle_command(command),
                    Err(_) => {
                        tracing::debug!("All WifiDLite handles dropped");
                        self.dispose();
                        false
                    }
                },
                broadcast = next_broadcast(self.broadcast_rx.as_ref()) => {
                    match broadcast {
                        Some(broadcast) => self.handle_broadcast(broadcast),
                        None => {
                            tracing::warn!("Platform closed the broadcast channel");
                            self.broadcast_rx = None;
                        }
                    }
                    true
                }
                Ok(completion) = self.completion_rx.recv_async() => {
                    self.handle_completion(completion);
                    true
                }
            };
            if !keep_running {
                break;
            }
        }
        tracing::debug!("WifiDLite session closed");
    }

    /// Returns false once the dispatcher should stop
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Initialize { config, reply } => {
                let _ = reply.send(self.initialize(config));
            }
            SessionCommand::Dispose { reply } => {
                self.dispose();
                let _ = reply.send(Ok(()));
            }
            SessionCommand::AcquirePeerList {
                listener,
                frequency,
                reply,
            } => {
                let _ = reply.send(self.acquire_peer_list(listener, frequency));
            }
            SessionCommand::UnsubscribeFromPeerList { listener, reply } => {
                let _ = reply.send(self.unsubscribe_from_peer_list(&listener));
            }
            SessionCommand::CreateGroup { listener, reply } => {
                let _ = reply.send(self.create_group(listener));
            }
            SessionCommand::UnsubscribeFromCreateGroup { listener, reply } => {
                let _ = reply.send(self.unsubscribe_from_create_group(&listener));
            }
            SessionCommand::IsEnabled { reply } => {
                let _ = reply.send(self.channel().map(|_| self.enabled));
            }
            SessionCommand::OpenWifiSettings { reply } => {
                let _ = reply.send(self.open_wifi_settings());
            }
            SessionCommand::Close { reply } => {
                self.dispose();
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn initialize(&mut self, config: SessionConfig) -> Result<()> {
        if let Some(current) = &self.config {
            tracing::warn!(
                "Reinitializing the WifiDLite session is not allowed. It is already initialized \
                 with {:?} and cannot be reinitialized without disposing of it first. \
                 Ignoring configuration: {:?}",
                current,
                config
            );
            return Ok(());
        }
        config.validate()?;

        let channel = P2pChannel::open(self.platform.clone());
        let (broadcast_tx, broadcast_rx) = flume::unbounded();
        self.platform
            .register_receiver(&BroadcastKind::ALL, broadcast_tx);
        self.heartbeat
            .start(channel.clone(), config.heartbeat_delay());

        tracing::info!(
            "WifiDLite initialized with heartbeat delay {}s",
            config.heartbeat_delay_secs
        );
        self.generation += 1;
        self.broadcast_rx = Some(broadcast_rx);
        self.channel = Some(channel);
        self.config = Some(config);
        Ok(())
    }

    fn dispose(&mut self) {
        tracing::debug!("WifiDLite session being disposed");
        self.heartbeat.stop();
        if self.broadcast_rx.take().is_some() && !self.platform.unregister_receiver() {
            tracing::debug!("Broadcast receiver was already unregistered");
        }
        self.channel = None;
        self.config = None;
    }

    /// Channel of the initialized session
    fn channel(&self) -> Result<P2pChannel> {
        match (&self.config, &self.channel) {
            (Some(_), Some(channel)) => Ok(channel.clone()),
            _ => Err(WifiDError::NotInitialized),
        }
    }

    fn acquire_peer_list(
        &mut self,
        listener: Arc<dyn PeerListAcquisitionListener>,
        frequency: AcquisitionFrequency,
    ) -> Result<()> {
        let channel = self.channel()?;
        if !self.registry.add_peer_list_listener(listener, frequency) {
            tracing::debug!("Peer list listener already registered ({:?})", frequency);
        }
        tokio::spawn(async move {
            let result = channel.discover_peers().await;
            log_action_result("discoverPeers call", &result);
        });
        Ok(())
    }

    fn unsubscribe_from_peer_list(
        &mut self,
        listener: &Arc<dyn PeerListAcquisitionListener>,
    ) -> Result<()> {
        self.channel()?;
        if !self.registry.remove_peer_list_listener(listener) {
            tracing::debug!("Peer list listener was not registered");
        }
        Ok(())
    }

    fn create_group(&mut self, listener: Arc<dyn CreateGroupListener>) -> Result<()> {
        let channel = self.channel()?;
        if !self.registry.add_create_group_listener(listener.clone()) {
            tracing::debug!("Create group listener already registered");
        }

        let completion_tx = self.completion_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            // Removal fails whenever there is no group yet; create regardless
            match channel.remove_group().await {
                Ok(()) => tracing::debug!("removeGroup succeeded. about to call createGroup"),
                Err(status) => tracing::debug!(
                    "removeGroup failed. WifiP2pManager status: {}. about to call createGroup",
                    status
                ),
            }
            match channel.create_group().await {
                Ok(()) => tracing::debug!("createGroup succeeded"),
                Err(status) => {
                    tracing::warn!("createGroup failed. WifiP2pManager status: {}", status);
                    let _ = completion_tx.send(Completion::CreateGroupFailed {
                        generation,
                        listener,
                        status,
                    });
                }
            }
        });
        Ok(())
    }

    fn unsubscribe_from_create_group(
        &mut self,
        listener: &Arc<dyn CreateGroupListener>,
    ) -> Result<()> {
        self.channel()?;
        if !self.registry.remove_create_group_listener(listener) {
            tracing::debug!("Create group listener was not registered");
        }
        Ok(())
    }

    fn open_wifi_settings(&self) -> Result<()> {
        self.channel()?;
        self.platform
            .open_wifi_settings()
            .map_err(WifiDError::Platform)
    }

    fn handle_broadcast(&mut self, broadcast: P2pBroadcast) {
        tracing::debug!("WiFi Direct broadcast received: {}", broadcast.kind());
        match broadcast {
            P2pBroadcast::StateChanged { state } => {
                self.enabled = state == Some(P2pState::Enabled);
                if self.enabled {
                    tracing::debug!("WiFi P2P is enabled");
                } else {
                    tracing::debug!("WiFi P2P is NOT enabled");
                }
            }
            P2pBroadcast::PeersChanged { devices } => {
                let (Some(devices), Some(channel)) = (devices, &self.channel) else {
                    tracing::debug!("Peers changed without a device list, ignoring");
                    return;
                };
                let peers: Vec<Peer> = devices
                    .into_iter()
                    .map(|device| Peer::new(device, channel.clone()))
                    .collect();
                let delivered = self.registry.deliver_peers(&peers);
                tracing::debug!("Delivered {} peer(s) to {} listener(s)", peers.len(), delivered);
            }
            P2pBroadcast::ConnectionChanged { group } => match group {
                Some(group) if group.is_formed() => {
                    let delivered = self.registry.deliver_group(&group);
                    tracing::debug!("Group {:?} delivered to {} listener(s)", group.network_name, delivered);
                }
                _ => tracing::debug!("Connection changed without a formed group, ignoring"),
            },
            P2pBroadcast::ThisDeviceChanged { device } => {
                tracing::debug!("This P2P device changed: {:?}", device);
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::CreateGroupFailed {
                generation,
                listener,
                status,
            } => {
                if self.config.is_none() || generation != self.generation {
                    tracing::debug!("Dropping createGroup failure from a disposed session");
                    return;
                }
                listener.on_create_group_failure(status);
            }
        }
    }
}

async fn next_broadcast(rx: Option<&flume::Receiver<P2pBroadcast>>) -> Option<P2pBroadcast> {
    match rx {
        Some(rx) => rx.recv_async().await.ok(),
        None => std::future::pending().await,
    }
}
