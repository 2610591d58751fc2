// LinkVault services
// Services sit above the managers: validation, import pipeline, transfer, settings.

pub mod deeplink;
pub mod import_service;
pub mod import_writer;
pub mod importers;
pub mod link_info;
pub mod settings_engine;
pub mod timestamps;
pub mod transfer;
