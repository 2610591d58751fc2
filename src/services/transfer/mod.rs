//! LAN transfer: embedded servers, QR handshake and merge-import.

pub mod address;
pub mod client;
pub mod envelope;
pub mod handlers;
pub mod qr;
pub mod server;

pub use address::{AddressResolver, AddressStrategy};
pub use client::TransferClient;
pub use envelope::{build_envelope, merge_envelope};
pub use server::LocalServer;
