pub mod controller;
pub mod session;
pub mod subscription;
pub mod task;
pub mod types;
