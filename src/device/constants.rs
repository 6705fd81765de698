/**
 * Substring (case-insensitive) that an advertised name must contain to be listed.
 */
pub const DEFAULT_NAME_FILTER: &str = "nimble";

/**
 * Name displayed for peripherals that do not advertise one.
 */
pub const UNNAMED: &str = "Unnamed";

/**
 * Capacity of the channels that carry scan events and adapter state changes.
 */
pub const EVENT_BUFFER: usize = 64;

/**
 * Capacity of the channel that carries commands from the GUI to the scan controller.
 */
pub const COMMAND_BUFFER: usize = 8;

/**
 * Android API level from which BLUETOOTH_SCAN / BLUETOOTH_CONNECT replace the location permission.
 */
pub const BLUETOOTH_PERMISSIONS_API_LEVEL: u32 = 31;
