use std::io;
use thiserror::Error;
use msgbox::IconType;
use std::fmt::Display;
use std::str::Utf8Error;

use crate::device::types::AdapterState;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine path to config file")]
    NoConfigPath,

    #[error("Failed to acquire file lock on config file: {source}")]
    CanNotLock { source: io::Error },

    #[error("Failed to encode/decode config as utf-8: {source}")]
    Utf8Error { #[from] source: Utf8Error },

    #[error("Failed to read/write config file: {source}")]
    IOError { #[from] source: io::Error },

    #[error("Failed to parse/build config file: {source}")]
    JsonError { #[from] source: serde_json::Error },
}

impl ConfigError {
    pub fn is_file_not_found_error(&self) -> bool {
        match self {
            ConfigError::IOError { source } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppRunError {
    #[error("Failed to start application (iced): {source}")]
    Iced { #[from] source: iced::Error },

    #[error("Failed to start application (config): {source}")]
    ConfigError { #[from] source: ConfigError },
}

/// Errors reported by a radio collaborator.
#[derive(Error, Debug, Clone)]
pub enum RadioError {
    #[error("Error communicating with the bluetooth stack (btleplug): {0}")]
    Btle(String),

    #[error("Not allowed to access bluetooth")]
    PermissionDenied,

    #[error("No bluetooth adapter available")]
    NoAdapter,

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("{0}")]
    Other(String),
}

// btleplug::Error is not Clone, but scan events are fanned out over channels
impl From<btleplug::Error> for RadioError {
    fn from(source: btleplug::Error) -> Self {
        match source {
            btleplug::Error::PermissionDenied => RadioError::PermissionDenied,
            btleplug::Error::DeviceNotFound => RadioError::UnknownDevice(String::from("not found")),
            other => RadioError::Btle(other.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ControllerError {
    #[error("Bluetooth is not powered on (state: {0:?})")]
    AdapterNotReady(Option<AdapterState>),

    #[error("Bluetooth permissions not granted")]
    PermissionDenied,

    #[error("Scanning failed: {source}")]
    ScanFailure { source: RadioError },

    #[error("Connecting to {id} failed: {source}")]
    ConnectFailure { id: String, source: RadioError },

    #[error("Disconnecting from {id} failed: {source}")]
    DisconnectFailure { id: String, source: RadioError },

    #[error("Another connection attempt or connection is active")]
    Busy,
}

pub fn error_msgbox<T: Display>(message: &'static str, error: &T) {
    let message = format!("{}: {}", message, error);
    eprintln!("{}", &message);
    if let Err(err) = msgbox::create(concat!("Nimble Scanner ", env!("CARGO_PKG_VERSION")), &message, IconType::Error) {
        eprintln!("Failed to create msgbox: {:?}", err);
    }
}
