mod listeners;
mod name_generator;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use console::{Key, Term};
use listeners::{ConnectionPrinter, GroupPrinter, PeerPrinter};
use wifid_lite::{
    CreateGroupListener, InMemoryPlatform, P2pBroadcast, P2pDevice, P2pGroup, P2pInfo, Peer,
    PeerListAcquisitionListener, SessionConfig, WifiDLite,
};

/// wifid_demo - WiFi Direct session demo on a simulated radio
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of simulated nearby devices
    #[arg(short, long, default_value_t = 3)]
    devices: usize,

    /// Heartbeat delay in seconds, overrides the config file
    #[arg(long)]
    heartbeat_secs: Option<u64>,

    /// Path to a JSON session config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
enum DemoCommand {
    Acquire,
    Subscribe,
    Unsubscribe,
    CreateGroup,
    ConnectFirst,
    QueryEnabled,
    OpenSettings,
    ToggleRadio,
    Quit,
}

impl DemoCommand {
    fn from_key(key: Key) -> Option<Self> {
        let Key::Char(c) = key else {
            return None;
        };
        match c.to_ascii_lowercase() {
            'a' => Some(Self::Acquire),
            's' => Some(Self::Subscribe),
            'u' => Some(Self::Unsubscribe),
            'g' => Some(Self::CreateGroup),
            'c' => Some(Self::ConnectFirst),
            'e' => Some(Self::QueryEnabled),
            'w' => Some(Self::OpenSettings),
            't' => Some(Self::ToggleRadio),
            'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 1)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(secs) = args.heartbeat_secs {
        config = config.with_heartbeat_delay_secs(secs);
    }
    tracing::debug!("Session config: {:?}", config);

    let devices: Vec<P2pDevice> = name_generator::generate_device_names(args.devices)
        .into_iter()
        .map(|name| P2pDevice::new(name, name_generator::generate_device_address()))
        .collect();
    let platform = Arc::new(
        InMemoryPlatform::new()
            .with_nearby_devices(devices)
            .with_auto_broadcast(true)
            .with_group(
                P2pGroup::new("DIRECT-wd-demo", "p2p-wlan0-0")
                    .with_passphrase("wifidlite")
                    .with_owner(P2pDevice::new(
                        "wifid_demo",
                        name_generator::generate_device_address(),
                    )),
            )
            .with_connection_info(P2pInfo {
                group_formed: true,
                is_group_owner: true,
                group_owner_address: Some([192, 168, 49, 1].into()),
            }),
    );

    let session = WifiDLite::builder(platform.clone())
        .config(config.clone())
        .await
        .context("Failed to initialize session")?;
    platform.emit(P2pBroadcast::state(true));

    println!("=== wifid_demo - WiFi Direct session demo ===");
    println!("Simulated devices: {}", args.devices);
    println!("Heartbeat: {}s", config.heartbeat_delay_secs);
    println!("Commands:");
    println!("  a - Acquire current peer list once");
    println!("  s - Subscribe to peer list updates");
    println!("  u - Unsubscribe from peer list updates");
    println!("  g - Create group");
    println!("  c - Connect to first known peer");
    println!("  e - Query whether P2P is enabled");
    println!("  w - Open WiFi settings");
    println!("  t - Toggle simulated radio state");
    println!("  q - Quit");
    println!();

    let (command_tx, command_rx) = flume::unbounded();
    let keyboard_task = tokio::task::spawn_blocking(move || {
        let input_term = Term::stdout();
        while let Ok(key) = input_term.read_key() {
            let Some(command) = DemoCommand::from_key(key) else {
                continue;
            };
            if command_tx.send(command).is_err() {
                break;
            }
            if matches!(command, DemoCommand::Quit) {
                break;
            }
        }
    });

    let latest_peers = Arc::new(Mutex::new(Vec::<Peer>::new()));
    let one_time: Arc<dyn PeerListAcquisitionListener> =
        Arc::new(PeerPrinter::new("once", latest_peers.clone()));
    let ongoing: Arc<dyn PeerListAcquisitionListener> =
        Arc::new(PeerPrinter::new("update", latest_peers.clone()));
    let group_listener: Arc<dyn CreateGroupListener> = Arc::new(GroupPrinter);

    while let Ok(command) = command_rx.recv_async().await {
        match command {
            DemoCommand::Acquire => {
                println!("→ Acquiring current peer list...");
                session.acquire_current_peer_list(one_time.clone()).await?;
            }
            DemoCommand::Subscribe => {
                println!("→ Subscribing to peer list updates...");
                session
                    .subscribe_to_updates_of_peer_list(ongoing.clone())
                    .await?;
            }
            DemoCommand::Unsubscribe => {
                println!("→ Unsubscribing from peer list updates");
                session
                    .unsubscribe_from_updates_of_peer_list(ongoing.clone())
                    .await?;
            }
            DemoCommand::CreateGroup => {
                println!("→ Creating group...");
                session.create_group(group_listener.clone()).await?;
            }
            DemoCommand::ConnectFirst => {
                let first = latest_peers
                    .lock()
                    .unwrap_or_else(|p| p.into_inner())
                    .first()
                    .cloned();
                match first {
                    Some(peer) => {
                        println!("→ Connecting to {}...", peer);
                        peer.connect(&ConnectionPrinter::default()).await;
                    }
                    None => println!("→ No peers known yet, acquire the peer list first"),
                }
            }
            DemoCommand::QueryEnabled => {
                println!("← P2P enabled: {}", session.is_enabled().await?);
            }
            DemoCommand::OpenSettings => match session.open_wifi_settings().await {
                Ok(()) => println!("← WiFi settings opened"),
                Err(e) => println!("← Could not open WiFi settings: {}", e),
            },
            DemoCommand::ToggleRadio => {
                let enabled = !session.is_enabled().await?;
                println!("→ Radio {}", if enabled { "on" } else { "off" });
                platform.emit(P2pBroadcast::state(enabled));
            }
            DemoCommand::Quit => {
                println!("→ Quit requested");
                break;
            }
        }
    }

    keyboard_task.abort();
    let _ = keyboard_task.await;

    session.close().await?;
    println!("Goodbye!");
    Ok(())
}
