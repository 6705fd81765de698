use std::sync::Arc;
use futures::StreamExt;
use futures::future::pending;
use log::{debug, info, warn};

use crate::device::constants::UNNAMED;
use crate::device::permissions::PermissionCheck;
use crate::device::radio::{DeviceHandle, Radio, Subscription};
use crate::device::types::{AdapterState, ConnectOptions, Permission, ScanEvent, ScanOptions};
use crate::error::{ControllerError, RadioError};
use crate::scanner::session::{ScannedDevice, SessionSnapshot, SessionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerSettings {
    pub name_filter: String,
    pub allow_duplicates: bool,
    pub auto_connect: bool,
    pub required_permissions: Vec<Permission>,
}

/// A connection request that has been accepted by the controller but not yet performed.
///
/// `run` does not borrow the controller, so the caller can keep handling other events while
/// the radio connects. The outcome must be handed back through `ScanController::finish_connect`.
pub struct ConnectAttempt<R: Radio> {
    radio: Arc<R>,
    id: String,
    options: ConnectOptions,
}

#[derive(Debug, Clone)]
pub struct ConnectOutcome {
    pub id: String,
    /// The connected device's id and display name.
    pub result: Result<(String, String), RadioError>,
}

async fn connect_and_discover<R: Radio>(radio: &R, id: &str, options: ConnectOptions) -> Result<(String, String), RadioError> {
    let device = radio.connect(id, options).await?;
    device.discover_all().await?;
    Ok((device.id().to_string(), device.display_name()))
}

impl<R: Radio> ConnectAttempt<R> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn run(self) -> ConnectOutcome {
        let result = connect_and_discover(self.radio.as_ref(), &self.id, self.options).await;
        ConnectOutcome { id: self.id, result }
    }
}

/// Owns the scan/connect session against one radio.
pub struct ScanController<R: Radio, P: PermissionCheck> {
    radio: Arc<R>,
    permissions: Arc<P>,
    settings: ScannerSettings,
    name_filter: String,
    adapter_state: Option<AdapterState>,
    session: SessionState,
    scan: Option<Subscription<ScanEvent>>,
}

impl<R: Radio, P: PermissionCheck> ScanController<R, P> {
    pub fn new(radio: Arc<R>, permissions: Arc<P>, settings: ScannerSettings) -> Self {
        let name_filter = settings.name_filter.to_lowercase();

        ScanController {
            radio,
            permissions,
            settings,
            name_filter,
            adapter_state: None,
            session: SessionState::default(),
            scan: None,
        }
    }

    pub fn radio(&self) -> &Arc<R> {
        &self.radio
    }

    pub fn settings(&self) -> &ScannerSettings {
        &self.settings
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn adapter_state(&self) -> Option<AdapterState> {
        self.adapter_state
    }

    pub fn set_adapter_state(&mut self, state: AdapterState) {
        if self.adapter_state != Some(state) {
            info!("Bluetooth adapter state: {}", state);
        }
        self.adapter_state = Some(state);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.adapter_state, &self.session)
    }

    pub async fn toggle_scan(&mut self) -> Result<(), ControllerError> {
        if self.session.is_scanning {
            self.stop_scan().await;
            return Ok(());
        }

        if self.session.is_busy() {
            warn!("Not scanning while a device is connecting or connected");
            return Err(ControllerError::Busy);
        }

        let required = &self.settings.required_permissions;
        if !required.is_empty() && !self.permissions.request(required).await {
            warn!("Bluetooth permissions not granted");
            return Err(ControllerError::PermissionDenied);
        }

        if self.adapter_state != Some(AdapterState::PoweredOn) {
            warn!("Bluetooth not powered on: {:?}", self.adapter_state);
            return Err(ControllerError::AdapterNotReady(self.adapter_state));
        }

        self.start_scan().await
    }

    async fn start_scan(&mut self) -> Result<(), ControllerError> {
        self.session.devices.clear();

        let options = ScanOptions { allow_duplicates: self.settings.allow_duplicates };
        match self.radio.start_scan(None, options).await {
            Ok(subscription) => {
                info!("Scanning for devices named like \"{}\"", self.name_filter);
                self.scan = Some(subscription);
                self.session.is_scanning = true;
                Ok(())
            },
            Err(RadioError::PermissionDenied) => {
                warn!("Bluetooth permissions not granted");
                Err(ControllerError::PermissionDenied)
            },
            Err(source) => {
                warn!("Scanning failed {:?}", source);
                Err(ControllerError::ScanFailure { source })
            },
        }
    }

    /// No-op when not scanning.
    pub async fn stop_scan(&mut self) {
        if let Some(mut scan) = self.scan.take() {
            scan.cancel();
        }

        if !self.session.is_scanning {
            return;
        }
        self.session.is_scanning = false;

        if let Err(err) = self.radio.stop_scan().await {
            warn!("Failed to stop scanning: {}", err);
        }
        info!("Scanning stopped");
    }

    /// Waits for the next discovery event. Never resolves while no scan is active.
    pub async fn next_scan_event(&mut self) -> ScanEvent {
        match self.scan.as_mut() {
            None => pending().await,
            Some(scan) => match scan.next().await {
                Some(event) => event,
                None => Err(RadioError::Other(String::from("Scan event stream ended"))),
            },
        }
    }

    pub async fn handle_scan_event(&mut self, event: ScanEvent) -> Result<(), ControllerError> {
        if !self.session.is_scanning {
            debug!("Ignoring scan event received while not scanning");
            return Ok(());
        }

        let device = match event {
            Ok(device) => device,
            Err(source) => {
                warn!("Scan error: {}", source);
                self.stop_scan().await;
                return Err(ControllerError::ScanFailure { source });
            },
        };

        let name = device.advertised_name();
        if !name.to_lowercase().contains(&self.name_filter) {
            return Ok(());
        }

        let name = match name.is_empty() {
            true => UNNAMED.to_string(),
            false => name.to_string(),
        };

        debug!("Discovered {} ({}) rssi {:?}", name, device.id, device.rssi);
        self.session.devices.upsert(ScannedDevice {
            id: device.id,
            name,
            rssi: device.rssi,
        });
        Ok(())
    }

    /// Stops any scan and marks `id` as connecting. Rejected while another attempt is in
    /// flight or a device is connected.
    pub async fn begin_connect(&mut self, id: &str) -> Result<ConnectAttempt<R>, ControllerError> {
        if self.session.is_busy() {
            warn!("Not connecting to {}: another connection attempt or connection is active", id);
            return Err(ControllerError::Busy);
        }

        self.stop_scan().await;
        self.session.connecting_id = Some(id.to_string());

        Ok(ConnectAttempt {
            radio: self.radio.clone(),
            id: id.to_string(),
            options: ConnectOptions { auto_connect: self.settings.auto_connect },
        })
    }

    /// Settles a connection attempt. `connecting_id` is cleared whatever the outcome.
    pub fn finish_connect(&mut self, outcome: ConnectOutcome) -> Result<(), ControllerError> {
        self.session.connecting_id = None;

        match outcome.result {
            Ok((id, name)) => {
                info!("Connected to {} ({})", name, id);
                self.session.connected_id = Some(id);
                self.session.connected_name = Some(name);
                Ok(())
            },
            Err(source) => {
                warn!("Connect error: {}", source);
                self.session.connected_id = None;
                self.session.connected_name = None;
                Err(ControllerError::ConnectFailure { id: outcome.id, source })
            },
        }
    }

    pub async fn connect_to_scanned_device(&mut self, id: &str) -> Result<(), ControllerError> {
        let attempt = self.begin_connect(id).await?;
        let outcome = attempt.run().await;
        self.finish_connect(outcome)
    }

    /// No-op when nothing is connected. The connection is considered gone once requested,
    /// even if the radio reports an error.
    pub async fn disconnect(&mut self) -> Result<(), ControllerError> {
        let id = match self.session.connected_id.clone() {
            None => return Ok(()),
            Some(id) => id,
        };

        let result = self.radio.cancel_connection(&id).await;
        self.session.connected_id = None;
        self.session.connected_name = None;

        match result {
            Ok(_) => {
                info!("Disconnected from {}", id);
                Ok(())
            },
            Err(source) => {
                warn!("Disconnect error: {}", source);
                Err(ControllerError::DisconnectFailure { id, source })
            },
        }
    }

    /// Stops the scan and drops any open connection before handing the radio back.
    pub async fn release(mut self) {
        self.stop_scan().await;
        if let Err(err) = self.disconnect().await {
            warn!("Failed to disconnect while releasing: {}", err);
        }
        self.radio.release().await;
    }
}
