// Shared type definitions for the link store, importers and transfer protocol.

pub mod deeplink;
pub mod errors;
pub mod import;
pub mod profile;
pub mod settings;
pub mod tag;
pub mod transfer;
