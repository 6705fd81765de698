use async_trait::async_trait;
use log::debug;

use crate::device::constants::BLUETOOTH_PERMISSIONS_API_LEVEL;
use crate::device::types::Permission;

/// Asks the platform for runtime permissions.
#[async_trait]
pub trait PermissionCheck: Send + Sync + 'static {
    /// Returns true only if every permission in `permissions` has been granted.
    async fn request(&self, permissions: &[Permission]) -> bool;
}

/// Permissions to request before scanning. `api_level` is the Android API level of the host;
/// `None` for platforms without runtime bluetooth permissions.
pub fn required_permissions(api_level: Option<u32>) -> Vec<Permission> {
    match api_level {
        None => vec![],
        Some(level) if level >= BLUETOOTH_PERMISSIONS_API_LEVEL => {
            vec![Permission::BluetoothScan, Permission::BluetoothConnect]
        },
        Some(_) => vec![Permission::FineLocation],
    }
}

/// Desktop platforms have no runtime permission prompt; the OS refuses the scan instead, which
/// the radio reports as `RadioError::PermissionDenied`.
#[derive(Debug, Default, Clone)]
pub struct DesktopPermissions;

#[async_trait]
impl PermissionCheck for DesktopPermissions {
    async fn request(&self, permissions: &[Permission]) -> bool {
        debug!("Implicitly granting permissions {:?}", permissions);
        true
    }
}
