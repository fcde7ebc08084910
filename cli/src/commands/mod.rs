//! Command implementations

pub mod config;
pub mod create_vm;
pub mod current;
pub mod forget;
pub mod version;
