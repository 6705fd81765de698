use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use btleplug::api::{Central, CentralEvent, CentralState, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::{SinkExt, StreamExt};
use futures::channel::mpsc::Sender;
use log::{debug, info, warn};
use tokio::spawn;
use tokio_util::sync::CancellationToken;

use crate::device::constants::EVENT_BUFFER;
use crate::device::radio::{DeviceHandle, Radio, Subscription};
use crate::device::types::{AdapterState, ConnectOptions, DiscoveredDevice, ScanEvent, ScanOptions, ServiceFilter};
use crate::error::RadioError;

type PeripheralMap = Arc<Mutex<HashMap<String, Peripheral>>>;

fn adapter_state_from(state: CentralState) -> AdapterState {
    match state {
        CentralState::PoweredOn => AdapterState::PoweredOn,
        CentralState::PoweredOff => AdapterState::PoweredOff,
        CentralState::Unknown => AdapterState::Unknown,
    }
}

/// Peripherals reported during a single scan. btleplug only sends `DeviceDiscovered` the first
/// time a peripheral enters the adapter, later sightings arrive as `DeviceUpdated`.
struct Sightings<K> {
    allow_duplicates: bool,
    reported: HashSet<K>,
}

impl<K: Hash + Eq> Sightings<K> {
    fn new(allow_duplicates: bool) -> Self {
        Sightings { allow_duplicates, reported: HashSet::new() }
    }

    fn wants(&self, id: &K) -> bool {
        self.allow_duplicates || !self.reported.contains(id)
    }

    fn mark_reported(&mut self, id: K) {
        self.reported.insert(id);
    }
}

async fn describe_peripheral(adapter: &Adapter, id: &PeripheralId, peripherals: &PeripheralMap) -> Option<DiscoveredDevice> {
    let peripheral = match adapter.peripheral(id).await {
        Ok(v) => v,
        Err(err) => {
            warn!("Failed to look up discovered peripheral {}: {}", id, err);
            return None;
        },
    };

    let properties = match peripheral.properties().await {
        Err(err) => {
            warn!("Could not query peripheral for properties: {:?}", err);
            return None;
        },
        Ok(None) => {
            debug!("Peripheral {} has no properties", id);
            return None;
        },
        Ok(Some(properties)) => properties,
    };

    let id = id.to_string();
    peripherals.lock()
        .expect("Failed to lock peripheral map")
        .insert(id.clone(), peripheral);

    Some(DiscoveredDevice {
        id,
        // btleplug merges the advertised and the local name
        name: properties.local_name,
        local_name: None,
        rssi: properties.rssi,
    })
}

/// A peripheral connected through btleplug.
pub struct BtleDevice {
    id: String,
    name: Option<String>,
    peripheral: Peripheral,
}

#[async_trait]
impl DeviceHandle for BtleDevice {
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
        info!("Connected; Discovering services...");
        self.peripheral.discover_services().await?;

        for service in self.peripheral.services() {
            debug!("Service {:?} with {} characteristics", service.uuid, service.characteristics.len());
        }
        Ok(())
    }
}

/// The host bluetooth stack, using the first adapter that btleplug reports.
pub struct BtleRadio {
    // the manager owns the platform session and must outlive the adapter
    _manager: Manager,
    adapter: Adapter,
    peripherals: PeripheralMap,
    scan_cancel: Mutex<Option<CancellationToken>>,
    release_cancel: CancellationToken,
}

impl BtleRadio {
    pub async fn new() -> Result<Self, RadioError> {
        let manager = Manager::new().await?;
        let adapter = manager.adapters().await?
            .into_iter()
            .next()
            .ok_or(RadioError::NoAdapter)?;

        info!("Using adapter {}", adapter.adapter_info().await.unwrap_or("UNKNOWN".to_string()));

        Ok(BtleRadio {
            _manager: manager,
            adapter,
            peripherals: Arc::new(Mutex::new(HashMap::new())),
            scan_cancel: Mutex::new(None),
            release_cancel: CancellationToken::new(),
        })
    }

    async fn find_peripheral(&self, id: &str) -> Result<Peripheral, RadioError> {
        let known = self.peripherals.lock()
            .expect("Failed to lock peripheral map")
            .get(id)
            .cloned();

        if let Some(peripheral) = known {
            return Ok(peripheral);
        }

        // not seen during this session's scans, ask the adapter
        for peripheral in self.adapter.peripherals().await? {
            if peripheral.id().to_string() == id {
                return Ok(peripheral);
            }
        }

        Err(RadioError::UnknownDevice(id.to_string()))
    }
}

async fn forward<T>(sender: &mut Sender<T>, item: T) -> bool {
    sender.send(item).await.is_ok()
}

#[async_trait]
impl Radio for BtleRadio {
    type Device = BtleDevice;

    async fn observe_adapter_state(&self, emit_current: bool) -> Result<Subscription<AdapterState>, RadioError> {
        let (mut sender, cancel, subscription) = Subscription::channel(EVENT_BUFFER);
        let release = self.release_cancel.clone();
        let mut events = self.adapter.events().await?;

        let current = match emit_current {
            true => Some(adapter_state_from(self.adapter.adapter_state().await?)),
            false => None,
        };

        spawn(async move {
            if let Some(state) = current {
                if !forward(&mut sender, state).await {
                    return;
                }
            }

            'mainloop: loop {
                tokio::select! {
                    _ = cancel.cancelled() => break 'mainloop,
                    _ = release.cancelled() => break 'mainloop,
                    event = events.next() => match event {
                        Some(CentralEvent::StateUpdate(state)) => {
                            if !forward(&mut sender, adapter_state_from(state)).await {
                                break 'mainloop;
                            }
                        },
                        Some(_) => {},
                        None => break 'mainloop,
                    },
                }
            }
            debug!("Adapter state subscription stopped");
        });

        Ok(subscription)
    }

    async fn start_scan(&self, filter: ServiceFilter, options: ScanOptions) -> Result<Subscription<ScanEvent>, RadioError> {
        let (mut sender, cancel, subscription) = Subscription::channel(EVENT_BUFFER);
        let release = self.release_cancel.clone();
        let adapter = self.adapter.clone();
        let peripherals = self.peripherals.clone();
        let mut events = self.adapter.events().await?;

        let filter = ScanFilter {
            services: filter.unwrap_or_default(),
        };

        info!("Scanning using adapter {}...", adapter.adapter_info().await.unwrap_or("UNKNOWN".to_string()));
        adapter.start_scan(filter).await?;

        if let Some(previous) = self.scan_cancel.lock()
            .expect("Failed to lock scan token")
            .replace(cancel.clone())
        {
            previous.cancel();
        }

        spawn(async move {
            let mut sightings = Sightings::new(options.allow_duplicates);

            'mainloop: loop {
                tokio::select! {
                    _ = cancel.cancelled() => break 'mainloop,
                    _ = release.cancelled() => break 'mainloop,
                    event = events.next() => {
                        let id = match event {
                            Some(CentralEvent::DeviceDiscovered(id)) | Some(CentralEvent::DeviceUpdated(id)) => id,
                            Some(_) => continue 'mainloop,
                            None => {
                                let error = RadioError::Other(String::from("Adapter event stream ended"));
                                forward(&mut sender, Err(error)).await;
                                break 'mainloop;
                            },
                        };

                        if !sightings.wants(&id) {
                            continue 'mainloop;
                        }

                        if let Some(device) = describe_peripheral(&adapter, &id, &peripherals).await {
                            sightings.mark_reported(id);
                            if !forward(&mut sender, Ok(device)).await {
                                break 'mainloop;
                            }
                        }
                    },
                }
            }
            debug!("Scan event forwarding stopped");
        });

        Ok(subscription)
    }

    async fn stop_scan(&self) -> Result<(), RadioError> {
        if let Some(cancel) = self.scan_cancel.lock().expect("Failed to lock scan token").take() {
            cancel.cancel();
        }
        self.adapter.stop_scan().await?;
        Ok(())
    }

    async fn connect(&self, id: &str, options: ConnectOptions) -> Result<BtleDevice, RadioError> {
        if options.auto_connect {
            // btleplug has no background connection mode
            debug!("auto_connect is not supported by btleplug, connecting directly");
        }

        let peripheral = self.find_peripheral(id).await?;
        let name = match peripheral.properties().await {
            Ok(Some(properties)) => properties.local_name,
            Ok(None) => None,
            Err(err) => {
                warn!("Could not query peripheral for properties: {:?}", err);
                None
            },
        };

        info!("Connecting to peripheral {}...", id);
        peripheral.connect().await?;

        Ok(BtleDevice { id: id.to_string(), name, peripheral })
    }

    async fn cancel_connection(&self, id: &str) -> Result<(), RadioError> {
        let peripheral = self.find_peripheral(id).await?;
        info!("Disconnecting from peripheral {}", id);
        peripheral.disconnect().await?;
        Ok(())
    }

    async fn release(&self) {
        if let Err(err) = self.stop_scan().await {
            warn!("Failed to stop scanning while releasing the radio: {}", err);
        }
        self.release_cancel.cancel();
        self.peripherals.lock().expect("Failed to lock peripheral map").clear();
        info!("Radio released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_peripheral_is_reported_once_per_scan() {
        let mut sightings = Sightings::new(false);
        assert!(sightings.wants(&"A"));

        sightings.mark_reported("A");

        assert!(!sightings.wants(&"A"));
        assert!(sightings.wants(&"B"));
    }

    #[test]
    fn a_new_scan_reports_known_peripherals_again() {
        let mut first_scan = Sightings::new(false);
        first_scan.mark_reported("A");

        let second_scan = Sightings::new(false);

        assert!(!first_scan.wants(&"A"));
        assert!(second_scan.wants(&"A"));
    }

    #[test]
    fn duplicates_are_reported_when_allowed() {
        let mut sightings = Sightings::new(true);
        sightings.mark_reported("A");

        assert!(sightings.wants(&"A"));
    }
}
