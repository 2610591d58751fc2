//! LinkVault, a deeplink collection core: bookmark importers, tagging and
//! LAN transfer between devices.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
