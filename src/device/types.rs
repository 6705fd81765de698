use std::fmt;
use uuid::Uuid;

use crate::error::RadioError;

/// Power state of the host bluetooth radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Unknown,
    Resetting,
    Unsupported,
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

impl fmt::Display for AdapterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self {
            AdapterState::Unknown => "Unknown",
            AdapterState::Resetting => "Resetting",
            AdapterState::Unsupported => "Unsupported",
            AdapterState::Unauthorized => "Unauthorized",
            AdapterState::PoweredOff => "PoweredOff",
            AdapterState::PoweredOn => "PoweredOn",
        };

        write!(f, "{}", result)
    }
}

/// A single advertisement sighting, as reported by the radio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub id: String,
    pub name: Option<String>,
    pub local_name: Option<String>,
    pub rssi: Option<i16>,
}

impl DiscoveredDevice {
    /// The advertised name, falling back to the local name, trimmed. Empty if neither is known.
    pub fn advertised_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.local_name.as_deref())
            .unwrap_or("")
            .trim()
    }
}

pub type ScanEvent = Result<DiscoveredDevice, RadioError>;

/// Services to restrict discovery to. `None` scans for every peripheral.
pub type ServiceFilter = Option<Vec<Uuid>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOptions {
    pub allow_duplicates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectOptions {
    pub auto_connect: bool,
}

/// Runtime permissions that a platform may require before bluetooth can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    BluetoothScan,
    BluetoothConnect,
    FineLocation,
}
