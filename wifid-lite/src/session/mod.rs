//! Session facade

mod builder;
mod dispatcher;

use std::sync::Arc;

use tokio::sync::oneshot;

pub use builder::SessionBuilder;

use crate::config::SessionConfig;
use crate::error::{Result, WifiDError};
use crate::listener::{CreateGroupListener, PeerListAcquisitionListener};
use crate::platform::WifiP2pPlatform;
use crate::types::AcquisitionFrequency;
use dispatcher::SessionDispatcher;

type Reply<T> = oneshot::Sender<Result<T>>;

/// Commands marshalled onto the session dispatcher
pub(crate) enum SessionCommand {
    Initialize {
        config: SessionConfig,
        reply: Reply<()>,
    },
    Dispose {
        reply: Reply<()>,
    },
    AcquirePeerList {
        listener: Arc<dyn PeerListAcquisitionListener>,
        frequency: AcquisitionFrequency,
        reply: Reply<()>,
    },
    UnsubscribeFromPeerList {
        listener: Arc<dyn PeerListAcquisitionListener>,
        reply: Reply<()>,
    },
    CreateGroup {
        listener: Arc<dyn CreateGroupListener>,
        reply: Reply<()>,
    },
    UnsubscribeFromCreateGroup {
        listener: Arc<dyn CreateGroupListener>,
        reply: Reply<()>,
    },
    IsEnabled {
        reply: Reply<bool>,
    },
    OpenWifiSettings {
        reply: Reply<()>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a WiFi Direct session
///
/// All session state lives in a dispatcher task spawned by
/// [`open`](WifiDLite::open); every method marshals a command onto it and
/// waits for the answer, so handles may be cloned and used from any task.
/// Listener callbacks run on the dispatcher task and must not block. A
/// callback that panics stops the dispatcher: the panic is logged and every
/// handle fails with [`WifiDError::SessionClosed`] from then on.
///
/// The session starts uninitialized. Every operation except
/// [`initialize`](WifiDLite::initialize), [`dispose`](WifiDLite::dispose) and
/// [`close`](WifiDLite::close) fails with [`WifiDError::NotInitialized`] until
/// `initialize` succeeds.
#[derive(Clone)]
pub struct WifiDLite {
    command_tx: flume::Sender<SessionCommand>,
}

impl std::fmt::Debug for WifiDLite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiDLite")
            .field("closed", &self.command_tx.is_disconnected())
            .finish()
    }
}

impl WifiDLite {
    /// Open an uninitialized session on `platform`
    ///
    /// Spawns the dispatcher, so it must be called within a tokio runtime.
    /// The dispatcher stops on [`close`](WifiDLite::close) or when the last
    /// handle is dropped.
    pub fn open(platform: Arc<dyn WifiP2pPlatform>) -> Self {
        let (command_tx, command_rx) = flume::unbounded();
        let dispatcher = tokio::spawn(SessionDispatcher::new(platform, command_rx).run());
        tokio::spawn(async move {
            if let Err(e) = dispatcher.await {
                if e.is_panic() {
                    tracing::error!("WifiDLite dispatcher panicked, session closed: {}", e);
                }
            }
        });
        tracing::debug!("WifiDLite session opened");
        Self { command_tx }
    }

    /// Builder that opens and initializes a session in one step
    pub fn builder(platform: Arc<dyn WifiP2pPlatform>) -> SessionBuilder {
        SessionBuilder::new(platform)
    }

    /// Set up the session with `config`
    ///
    /// Opens the P2P channel, registers for platform broadcasts and starts
    /// the heartbeat. Calling it again without an intervening
    /// [`dispose`](WifiDLite::dispose) logs a warning, ignores the new
    /// configuration and returns `Ok`.
    pub async fn initialize(&self, config: SessionConfig) -> Result<()> {
        self.request(|reply| SessionCommand::Initialize { config, reply })
            .await
    }

    /// Stop the heartbeat, unregister from broadcasts and forget the
    /// configuration
    ///
    /// Safe to call repeatedly. Registered listeners are kept and resume
    /// receiving after the next `initialize`.
    pub async fn dispose(&self) -> Result<()> {
        self.request(|reply| SessionCommand::Dispose { reply }).await
    }

    /// Deliver the peer list once, on the next peers-changed broadcast
    ///
    /// Also triggers a discovery round. Registering the same listener again
    /// before delivery has no effect.
    pub async fn acquire_current_peer_list(
        &self,
        listener: Arc<dyn PeerListAcquisitionListener>,
    ) -> Result<()> {
        self.acquire_peer_list(listener, AcquisitionFrequency::OneTime)
            .await
    }

    /// Deliver the peer list on every peers-changed broadcast until
    /// unsubscribed
    pub async fn subscribe_to_updates_of_peer_list(
        &self,
        listener: Arc<dyn PeerListAcquisitionListener>,
    ) -> Result<()> {
        self.acquire_peer_list(listener, AcquisitionFrequency::Ongoing)
            .await
    }

    /// Register `listener` in the set selected by `frequency`
    pub async fn acquire_peer_list(
        &self,
        listener: Arc<dyn PeerListAcquisitionListener>,
        frequency: AcquisitionFrequency,
    ) -> Result<()> {
        self.request(|reply| SessionCommand::AcquirePeerList {
            listener,
            frequency,
            reply,
        })
        .await
    }

    /// Stop delivering peer lists to `listener`, ongoing or one-time
    pub async fn unsubscribe_from_updates_of_peer_list(
        &self,
        listener: Arc<dyn PeerListAcquisitionListener>,
    ) -> Result<()> {
        self.request(|reply| SessionCommand::UnsubscribeFromPeerList { listener, reply })
            .await
    }

    /// Create a group with this device as owner
    ///
    /// Any existing group is removed first; a failed removal does not stop
    /// the creation. A refused creation is reported through
    /// [`CreateGroupListener::on_create_group_failure`]; success arrives with
    /// the connection-changed broadcast carrying the formed group.
    pub async fn create_group(&self, listener: Arc<dyn CreateGroupListener>) -> Result<()> {
        self.request(|reply| SessionCommand::CreateGroup { listener, reply })
            .await
    }

    /// Stop notifying `listener` about group creation
    pub async fn unsubscribe_from_create_group(
        &self,
        listener: Arc<dyn CreateGroupListener>,
    ) -> Result<()> {
        self.request(|reply| SessionCommand::UnsubscribeFromCreateGroup { listener, reply })
            .await
    }

    /// Whether the platform last reported the P2P radio as enabled
    pub async fn is_enabled(&self) -> Result<bool> {
        self.request(|reply| SessionCommand::IsEnabled { reply })
            .await
    }

    /// Ask the platform to show the system WiFi settings
    pub async fn open_wifi_settings(&self) -> Result<()> {
        self.request(|reply| SessionCommand::OpenWifiSettings { reply })
            .await
    }

    /// Dispose the session and stop its dispatcher
    ///
    /// Every handle fails with [`WifiDError::SessionClosed`] afterwards.
    pub async fn close(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send_async(SessionCommand::Close { reply })
            .await
            .map_err(|_| WifiDError::SessionClosed)?;
        response.await.map_err(|_| WifiDError::SessionClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> SessionCommand) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send_async(command(reply))
            .await
            .map_err(|_| WifiDError::SessionClosed)?;
        response.await.map_err(|_| WifiDError::SessionClosed)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::InMemoryPlatform;
    use crate::peer::Peer;

    fn noop_listener() -> Arc<dyn PeerListAcquisitionListener> {
        Arc::new(|_: &[Peer]| {})
    }

    #[tokio::test]
    async fn test_operations_before_initialize_fail() {
        let session = WifiDLite::open(Arc::new(InMemoryPlatform::new()));

        assert!(matches!(
            session.acquire_current_peer_list(noop_listener()).await,
            Err(WifiDError::NotInitialized)
        ));
        assert!(matches!(
            session.subscribe_to_updates_of_peer_list(noop_listener()).await,
            Err(WifiDError::NotInitialized)
        ));
        assert!(matches!(
            session.is_enabled().await,
            Err(WifiDError::NotInitialized)
        ));
        assert!(matches!(
            session.open_wifi_settings().await,
            Err(WifiDError::NotInitialized)
        ));

        // dispose is always allowed
        assert!(session.dispose().await.is_ok());
    }

    #[tokio::test]
    async fn test_operations_after_dispose_fail() {
        let session = WifiDLite::open(Arc::new(InMemoryPlatform::new()));
        session.initialize(SessionConfig::default()).await.unwrap();
        session.dispose().await.unwrap();

        assert!(matches!(
            session.acquire_current_peer_list(noop_listener()).await,
            Err(WifiDError::NotInitialized)
        ));
    }

    #[tokio::test]
    async fn test_close_stops_every_handle() {
        let session = WifiDLite::open(Arc::new(InMemoryPlatform::new()));
        let other = session.clone();

        session.close().await.unwrap();
        assert!(matches!(
            other.initialize(SessionConfig::default()).await,
            Err(WifiDError::SessionClosed)
        ));
        assert!(matches!(other.close().await, Err(WifiDError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_invalid_config_leaves_session_uninitialized() {
        let session = WifiDLite::open(Arc::new(InMemoryPlatform::new()));
        let config = SessionConfig::new().with_heartbeat_delay_secs(0);

        assert!(matches!(
            session.initialize(config).await,
            Err(WifiDError::InvalidConfig(_))
        ));
        assert!(matches!(
            session.is_enabled().await,
            Err(WifiDError::NotInitialized)
        ));
    }
}
