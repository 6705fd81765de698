//! In-memory radio and permission doubles driven by the tests.

use std::sync::Mutex;
use async_trait::async_trait;
use futures::channel::mpsc::Sender;
use futures::channel::oneshot;

use crate::device::constants::EVENT_BUFFER;
use crate::device::permissions::PermissionCheck;
use crate::device::radio::{DeviceHandle, Radio, Subscription};
use crate::device::types::{AdapterState, ConnectOptions, DiscoveredDevice, Permission, ScanEvent, ScanOptions, ServiceFilter};
use crate::error::RadioError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ObserveAdapterState(bool),
    StartScan(ServiceFilter, ScanOptions),
    StopScan,
    Connect(String, ConnectOptions),
    CancelConnection(String),
    Release,
}

#[derive(Default)]
struct Inner {
    adapter_state: Option<AdapterState>,
    state_senders: Vec<Sender<AdapterState>>,
    scan_sender: Option<Sender<ScanEvent>>,
    start_scan_error: Option<RadioError>,
    connect_error: Option<RadioError>,
    discover_error: Option<RadioError>,
    cancel_error: Option<RadioError>,
    connected_name: Option<String>,
    connect_gate: Option<oneshot::Receiver<()>>,
    calls: Vec<Call>,
}

pub struct ScriptedRadio {
    inner: Mutex<Inner>,
}

impl ScriptedRadio {
    pub fn new(adapter_state: Option<AdapterState>) -> Self {
        ScriptedRadio {
            inner: Mutex::new(Inner { adapter_state, ..Inner::default() }),
        }
    }

    pub fn powered_on() -> Self {
        ScriptedRadio::new(Some(AdapterState::PoweredOn))
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        f(&mut self.inner.lock().expect("Failed to lock scripted radio"))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|inner| inner.calls.clone())
    }

    pub fn fail_start_scan(&self, error: RadioError) {
        self.with(|inner| inner.start_scan_error = Some(error));
    }

    pub fn fail_connect(&self, error: RadioError) {
        self.with(|inner| inner.connect_error = Some(error));
    }

    pub fn fail_discover(&self, error: RadioError) {
        self.with(|inner| inner.discover_error = Some(error));
    }

    pub fn fail_cancel(&self, error: RadioError) {
        self.with(|inner| inner.cancel_error = Some(error));
    }

    pub fn set_connected_name(&self, name: &str) {
        self.with(|inner| inner.connected_name = Some(name.to_string()));
    }

    /// Makes the next `connect` wait until the returned sender fires (or is dropped).
    pub fn hold_connect(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.with(|inner| inner.connect_gate = Some(receiver));
        sender
    }

    pub fn push_scan_event(&self, event: ScanEvent) {
        self.with(|inner| {
            let sender = inner.scan_sender.as_mut().expect("No scan in progress");
            sender.try_send(event).expect("Failed to push scan event");
        });
    }

    /// Closes the scan stream as if the radio stopped delivering on its own.
    pub fn end_scan_stream(&self) {
        self.with(|inner| inner.scan_sender = None);
    }

    pub fn push_device(&self, id: &str, name: &str, rssi: i16) {
        self.push_scan_event(Ok(DiscoveredDevice {
            id: id.to_string(),
            name: Some(name.to_string()),
            local_name: None,
            rssi: Some(rssi),
        }));
    }

    pub fn push_adapter_state(&self, state: AdapterState) {
        self.with(|inner| {
            inner.adapter_state = Some(state);
            inner.state_senders.retain_mut(|sender| sender.try_send(state).is_ok());
        });
    }
}

pub struct ScriptedDevice {
    id: String,
    name: Option<String>,
    discover_error: Option<RadioError>,
}

#[async_trait]
impl DeviceHandle for ScriptedDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn local_name(&self) -> Option<&str> {
        None
    }

    async fn discover_all(&self) -> Result<(), RadioError> {
        match &self.discover_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Radio for ScriptedRadio {
    type Device = ScriptedDevice;

    async fn observe_adapter_state(&self, emit_current: bool) -> Result<Subscription<AdapterState>, RadioError> {
        let (mut sender, _cancel, subscription) = Subscription::channel(EVENT_BUFFER);
        self.with(|inner| {
            inner.calls.push(Call::ObserveAdapterState(emit_current));
            if let (true, Some(state)) = (emit_current, inner.adapter_state) {
                let _ = sender.try_send(state);
            }
            inner.state_senders.push(sender);
        });
        Ok(subscription)
    }

    async fn start_scan(&self, filter: ServiceFilter, options: ScanOptions) -> Result<Subscription<ScanEvent>, RadioError> {
        self.with(|inner| {
            inner.calls.push(Call::StartScan(filter, options));
            if let Some(error) = inner.start_scan_error.take() {
                return Err(error);
            }
            let (sender, _cancel, subscription) = Subscription::channel(EVENT_BUFFER);
            inner.scan_sender = Some(sender);
            Ok(subscription)
        })
    }

    async fn stop_scan(&self) -> Result<(), RadioError> {
        self.with(|inner| {
            inner.calls.push(Call::StopScan);
            inner.scan_sender = None;
        });
        Ok(())
    }

    async fn connect(&self, id: &str, options: ConnectOptions) -> Result<ScriptedDevice, RadioError> {
        let gate = self.with(|inner| {
            inner.calls.push(Call::Connect(id.to_string(), options));
            inner.connect_gate.take()
        });

        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.with(|inner| {
            if let Some(error) = inner.connect_error.clone() {
                return Err(error);
            }
            Ok(ScriptedDevice {
                id: id.to_string(),
                name: inner.connected_name.clone(),
                discover_error: inner.discover_error.clone(),
            })
        })
    }

    async fn cancel_connection(&self, id: &str) -> Result<(), RadioError> {
        self.with(|inner| {
            inner.calls.push(Call::CancelConnection(id.to_string()));
            match inner.cancel_error.clone() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }

    async fn release(&self) {
        self.with(|inner| {
            inner.calls.push(Call::Release);
            inner.scan_sender = None;
            inner.state_senders.clear();
        });
    }
}

pub struct FixedPermissions {
    granted: bool,
    requested: Mutex<Vec<Vec<Permission>>>,
}

impl FixedPermissions {
    pub fn new(granted: bool) -> Self {
        FixedPermissions { granted, requested: Mutex::new(vec![]) }
    }

    pub fn requested(&self) -> Vec<Vec<Permission>> {
        self.requested.lock().expect("Failed to lock requested permissions").clone()
    }
}

#[async_trait]
impl PermissionCheck for FixedPermissions {
    async fn request(&self, permissions: &[Permission]) -> bool {
        self.requested.lock()
            .expect("Failed to lock requested permissions")
            .push(permissions.to_vec());
        self.granted
    }
}
