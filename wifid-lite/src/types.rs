/// Core value types exchanged with the platform P2P service
use std::net::IpAddr;

/// Selects which peer-list listener set a registration belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquisitionFrequency {
    /// Removed automatically after the first delivery
    OneTime,
    /// Kept until explicitly unsubscribed
    Ongoing,
}

/// Failure reason reported by a platform P2P action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum P2pStatus {
    /// Internal platform error
    Error,
    /// P2P is not supported on this device
    P2pUnsupported,
    /// The framework is busy and cannot service the request
    Busy,
    /// Service discovery was requested without any service requests added
    NoServiceRequests,
    /// Code not known to this library
    Unknown(i32),
}

impl P2pStatus {
    /// Translate a raw platform reason code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => P2pStatus::Error,
            1 => P2pStatus::P2pUnsupported,
            2 => P2pStatus::Busy,
            3 => P2pStatus::NoServiceRequests,
            other => P2pStatus::Unknown(other),
        }
    }

    /// Raw platform reason code
    pub fn code(&self) -> i32 {
        match self {
            P2pStatus::Error => 0,
            P2pStatus::P2pUnsupported => 1,
            P2pStatus::Busy => 2,
            P2pStatus::NoServiceRequests => 3,
            P2pStatus::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for P2pStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            P2pStatus::Error => write!(f, "Error"),
            P2pStatus::P2pUnsupported => write!(f, "P2p Unsupported"),
            P2pStatus::Busy => write!(f, "Busy"),
            P2pStatus::NoServiceRequests => write!(f, "No service requests have been added"),
            P2pStatus::Unknown(_) => write!(f, "Unknown"),
        }
    }
}

/// Radio state carried by a state-changed broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum P2pState {
    Disabled,
    Enabled,
}

/// Connection status of a remote device as seen by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceStatus {
    Connected,
    Invited,
    Failed,
    Available,
    Unavailable,
    #[default]
    Unknown,
}

impl DeviceStatus {
    /// Translate a raw platform device status code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => DeviceStatus::Connected,
            1 => DeviceStatus::Invited,
            2 => DeviceStatus::Failed,
            3 => DeviceStatus::Available,
            4 => DeviceStatus::Unavailable,
            _ => DeviceStatus::Unknown,
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DeviceStatus::Connected => "Connected",
            DeviceStatus::Invited => "Invited",
            DeviceStatus::Failed => "Failed",
            DeviceStatus::Available => "Available",
            DeviceStatus::Unavailable => "Unavailable",
            DeviceStatus::Unknown => "Unknown",
        };
        write!(f, "{}", text)
    }
}

/// A device reported by the platform
///
/// Name and address are optional because the platform does not guarantee
/// them; consumers must cope with either being absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct P2pDevice {
    /// Human-readable device name
    pub name: Option<String>,
    /// Hardware address used as connection target
    pub address: Option<String>,
    /// Current status
    pub status: DeviceStatus,
}

impl P2pDevice {
    /// Create an available device with both name and address set
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            address: Some(address.into()),
            status: DeviceStatus::Available,
        }
    }

    /// Set the device status
    pub fn with_status(mut self, status: DeviceStatus) -> Self {
        self.status = status;
        self
    }
}

/// A P2P group reported by a connection-changed broadcast
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct P2pGroup {
    /// Network name (SSID) of the group
    pub network_name: Option<String>,
    /// Network interface the group runs on
    pub interface: Option<String>,
    /// Passphrase clients use to join
    pub passphrase: Option<String>,
    /// Group owner
    pub owner: Option<P2pDevice>,
    /// Devices joined as clients
    pub clients: Vec<P2pDevice>,
}

impl P2pGroup {
    /// Create a group with network name and interface set
    pub fn new(network_name: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            network_name: Some(network_name.into()),
            interface: Some(interface.into()),
            ..Self::default()
        }
    }

    /// Set the passphrase
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Set the group owner
    pub fn with_owner(mut self, owner: P2pDevice) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Whether the group carries a non-empty network name and interface
    ///
    /// Connection-changed broadcasts also fire for plain peer connections;
    /// only formed groups count as a group-creation result.
    pub fn is_formed(&self) -> bool {
        non_empty(self.network_name.as_deref()).is_some()
            && non_empty(self.interface.as_deref()).is_some()
    }
}

/// Connection info of the local device
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct P2pInfo {
    /// Whether a group has been formed
    pub group_formed: bool,
    /// Whether this device owns the group
    pub is_group_owner: bool,
    /// Address of the group owner, if known
    pub group_owner_address: Option<IpAddr>,
}

impl std::fmt::Display for P2pInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "groupFormed: {} isGroupOwner: {} groupOwnerAddress: ",
            self.group_formed, self.is_group_owner
        )?;
        match &self.group_owner_address {
            Some(addr) => write!(f, "{}", addr),
            None => write!(f, "null"),
        }
    }
}

/// Parameters of a connect request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct P2pConfig {
    /// Address of the device to connect to
    pub device_address: String,
}

impl P2pConfig {
    pub fn new(device_address: impl Into<String>) -> Self {
        Self {
            device_address: device_address.into(),
        }
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(P2pStatus::from_code(0), P2pStatus::Error);
        assert_eq!(P2pStatus::from_code(2), P2pStatus::Busy);
        assert_eq!(P2pStatus::from_code(42), P2pStatus::Unknown(42));
        assert_eq!(P2pStatus::Unknown(42).code(), 42);
        assert_eq!(P2pStatus::NoServiceRequests.code(), 3);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", P2pStatus::P2pUnsupported), "P2p Unsupported");
        assert_eq!(format!("{}", P2pStatus::Unknown(9)), "Unknown");
    }

    #[test]
    fn test_device_status() {
        assert_eq!(DeviceStatus::from_code(3), DeviceStatus::Available);
        assert_eq!(DeviceStatus::from_code(-1), DeviceStatus::Unknown);
        assert_eq!(format!("{}", DeviceStatus::Invited), "Invited");
    }

    #[test]
    fn test_group_formed() {
        assert!(P2pGroup::new("DIRECT-xy", "p2p-wlan0-0").is_formed());

        let no_interface = P2pGroup {
            network_name: Some("DIRECT-xy".to_string()),
            ..P2pGroup::default()
        };
        assert!(!no_interface.is_formed());

        let empty_name = P2pGroup::new("", "p2p-wlan0-0");
        assert!(!empty_name.is_formed());
    }

    #[test]
    fn test_group_membership() {
        let owner = P2pDevice::new("Isolde", "02:00:00:00:00:01");
        let group = P2pGroup {
            clients: vec![P2pDevice::new("Rowan", "02:00:00:00:00:02")],
            ..P2pGroup::new("DIRECT-xy", "p2p-wlan0-0")
                .with_passphrase("secret12")
                .with_owner(owner.clone())
        };

        assert!(group.is_formed());
        assert_eq!(group.owner, Some(owner));
        assert_eq!(group.clients[0].name.as_deref(), Some("Rowan"));
        assert_eq!(group.passphrase.as_deref(), Some("secret12"));
    }

    #[test]
    fn test_info_display() {
        let info = P2pInfo {
            group_formed: true,
            is_group_owner: false,
            group_owner_address: Some("192.168.49.1".parse().unwrap()),
        };
        assert_eq!(
            format!("{}", info),
            "groupFormed: true isGroupOwner: false groupOwnerAddress: 192.168.49.1"
        );
        assert!(format!("{}", P2pInfo::default()).ends_with("null"));
    }
}
