pub mod btle;
pub mod constants;
pub mod permissions;
pub mod radio;
pub mod types;
