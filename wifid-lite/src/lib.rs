//! # wifid-lite
//!
//! A lightweight session layer over a platform WiFi Direct (P2P) service.
//!
//! ## Overview
//!
//! The `wifid-lite` library forwards requests to a platform-provided P2P
//! service and turns its asynchronous broadcasts into simple listener
//! registrations. A single dispatcher task owns all session state; handles to
//! the session can be cloned and used from any task or thread.
//!
//! ## Key Features
//!
//! - One-time and ongoing peer-list listeners with idempotent registration
//! - Background heartbeat that keeps peer discovery running
//! - Group creation with automatic removal of a stale group first
//! - Peer handles that can request a connection to the remote device
//! - Platform abstraction via trait, with an in-memory platform for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wifid_lite::{InMemoryPlatform, Peer, PeerListAcquisitionListener, WifiDLite};
//!
//! struct PrintPeers;
//!
//! impl PeerListAcquisitionListener for PrintPeers {
//!     fn on_peer_list_acquisition_success(&self, peers: &[Peer]) {
//!         for peer in peers {
//!             println!("{}", peer);
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let platform = Arc::new(InMemoryPlatform::new());
//!     let session = WifiDLite::builder(platform)
//!         .heartbeat_delay_secs(5)
//!         .await?;
//!
//!     session.acquire_current_peer_list(Arc::new(PrintPeers)).await?;
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod broadcast;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod listener;
pub mod peer;
pub mod platform;
pub mod registry;
pub mod session;
pub mod types;

// Re-exports for convenience
pub use broadcast::{BroadcastKind, P2pBroadcast};
pub use config::SessionConfig;
pub use error::{Result, WifiDError};
pub use listener::{
    CreateGroupListener, LoggingPeerConnectionListener, PeerConnectionListener,
    PeerListAcquisitionListener,
};
pub use peer::Peer;
pub use platform::memory::{InMemoryPlatform, PlatformAction, PlatformCall};
pub use platform::{ActionResult, P2pChannel, WifiP2pPlatform};
pub use registry::ListenerRegistry;
pub use session::{SessionBuilder, WifiDLite};
pub use types::{
    AcquisitionFrequency, DeviceStatus, P2pConfig, P2pDevice, P2pGroup, P2pInfo, P2pState,
    P2pStatus,
};
