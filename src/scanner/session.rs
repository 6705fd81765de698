use indexmap::IndexMap;

use crate::device::types::AdapterState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDevice {
    pub id: String,
    pub name: String,
    pub rssi: Option<i16>,
}

/// Devices seen during the current scan, keyed by id.
///
/// New ids go to the front; a repeated id is updated where it already is.
#[derive(Debug, Clone, Default)]
pub struct DeviceList {
    devices: IndexMap<String, ScannedDevice>,
}

impl DeviceList {
    pub fn upsert(&mut self, device: ScannedDevice) {
        match self.devices.get_mut(&device.id) {
            Some(existing) => *existing = device,
            None => {
                self.devices.shift_insert(0, device.id.clone(), device);
            },
        }
    }

    pub fn clear(&mut self) {
        self.devices.clear();
    }

    pub fn get(&self, id: &str) -> Option<&ScannedDevice> {
        self.devices.get(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScannedDevice> {
        self.devices.values()
    }

    pub fn to_vec(&self) -> Vec<ScannedDevice> {
        self.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    Connecting(String),
    Connected(String, String),
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub is_scanning: bool,
    pub devices: DeviceList,
    pub connecting_id: Option<String>,
    pub connected_id: Option<String>,
    pub connected_name: Option<String>,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        if let Some(id) = &self.connecting_id {
            return Phase::Connecting(id.clone());
        }
        if let Some(id) = &self.connected_id {
            let name = self.connected_name.clone().unwrap_or_default();
            return Phase::Connected(id.clone(), name);
        }
        if self.is_scanning {
            return Phase::Scanning;
        }
        Phase::Idle
    }

    /// A connect attempt is in flight or a device is connected.
    pub fn is_busy(&self) -> bool {
        self.connecting_id.is_some() || self.connected_id.is_some()
    }
}

pub fn status_text(adapter_state: Option<AdapterState>) -> String {
    match adapter_state {
        None => String::from("Checking Bluetooth state..."),
        Some(AdapterState::PoweredOn) => String::from("Bluetooth: ON"),
        Some(state) => format!("Bluetooth: {}", state),
    }
}

/// Everything the GUI renders, detached from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status_text: String,
    pub is_scanning: bool,
    pub devices: Vec<ScannedDevice>,
    pub connecting_id: Option<String>,
    pub connected_id: Option<String>,
    pub connected_name: Option<String>,
}

impl SessionSnapshot {
    pub fn new(adapter_state: Option<AdapterState>, session: &SessionState) -> Self {
        SessionSnapshot {
            status_text: status_text(adapter_state),
            is_scanning: session.is_scanning,
            devices: session.devices.to_vec(),
            connecting_id: session.connecting_id.clone(),
            connected_id: session.connected_id.clone(),
            connected_name: session.connected_name.clone(),
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        SessionSnapshot::new(None, &SessionState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, name: &str, rssi: i16) -> ScannedDevice {
        ScannedDevice { id: id.to_string(), name: name.to_string(), rssi: Some(rssi) }
    }

    fn ids(list: &DeviceList) -> Vec<&str> {
        list.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn new_ids_are_prepended() {
        let mut list = DeviceList::default();
        list.upsert(device("A", "NimbleA", -40));
        list.upsert(device("B", "NimbleB", -50));
        list.upsert(device("C", "NimbleC", -60));

        assert_eq!(ids(&list), vec!["C", "B", "A"]);
    }

    #[test]
    fn repeated_ids_are_updated_in_place() {
        let mut list = DeviceList::default();
        list.upsert(device("A", "NimbleA", -40));
        list.upsert(device("B", "NimbleB", -50));
        list.upsert(device("A", "NimbleA2", -30));

        assert_eq!(ids(&list), vec!["B", "A"]);
        assert_eq!(list.get("A"), Some(&device("A", "NimbleA2", -30)));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn status_text_follows_adapter_state() {
        assert_eq!(status_text(None), "Checking Bluetooth state...");
        assert_eq!(status_text(Some(AdapterState::PoweredOn)), "Bluetooth: ON");
        assert_eq!(status_text(Some(AdapterState::PoweredOff)), "Bluetooth: PoweredOff");
        assert_eq!(status_text(Some(AdapterState::Unknown)), "Bluetooth: Unknown");
    }

    #[test]
    fn phase_prefers_connecting_over_scanning() {
        let mut session = SessionState::default();
        assert_eq!(session.phase(), Phase::Idle);

        session.is_scanning = true;
        assert_eq!(session.phase(), Phase::Scanning);

        session.is_scanning = false;
        session.connecting_id = Some("A".to_string());
        assert_eq!(session.phase(), Phase::Connecting("A".to_string()));
        assert!(session.is_busy());

        session.connecting_id = None;
        session.connected_id = Some("A".to_string());
        session.connected_name = Some("NimbleWatch".to_string());
        assert_eq!(session.phase(), Phase::Connected("A".to_string(), "NimbleWatch".to_string()));
    }
}
