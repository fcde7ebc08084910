//! VM provisioning services.

pub mod handle;
pub mod manager;

pub use handle::Vm;
pub use manager::VmManager;
