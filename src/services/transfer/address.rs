//! LAN address discovery for the advertised server URL.
//!
//! Strategies run in order and the first one yielding an IPv4 address wins.

use std::net::{IpAddr, Ipv4Addr};

use crate::types::errors::TransferError;
use crate::types::settings::ServerSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStrategy {
    /// `server.advertised_address` from settings, taken as-is.
    ConfiguredAddress,
    /// First IPv4 on an interface whose name starts with a WiFi-like prefix.
    PreferredInterface,
    /// First non-loopback IPv4 on any interface.
    FirstNonLoopback,
}

impl AddressStrategy {
    pub const DEFAULT_ORDER: [AddressStrategy; 3] = [
        AddressStrategy::ConfiguredAddress,
        AddressStrategy::PreferredInterface,
        AddressStrategy::FirstNonLoopback,
    ];
}

#[derive(Debug, Clone)]
pub struct AddressResolver {
    advertised: Option<String>,
    preferred_prefixes: Vec<String>,
    strategies: Vec<AddressStrategy>,
}

fn usable_v4(ip: &IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(*v4),
        _ => None,
    }
}

impl AddressResolver {
    pub fn new(advertised: Option<String>, preferred_prefixes: Vec<String>) -> Self {
        Self {
            advertised,
            preferred_prefixes,
            strategies: AddressStrategy::DEFAULT_ORDER.to_vec(),
        }
    }

    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self::new(
            settings.advertised_address.clone(),
            settings.preferred_interfaces.clone(),
        )
    }

    pub fn with_strategies(mut self, strategies: Vec<AddressStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Resolves against the host's live interface list.
    pub fn resolve(&self) -> Result<Ipv4Addr, TransferError> {
        let interfaces = match local_ip_address::list_afinet_netifas() {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "interface enumeration failed");
                Vec::new()
            }
        };
        self.resolve_from(&interfaces)
    }

    /// Resolves against a snapshot of `(interface name, address)` pairs.
    pub fn resolve_from(&self, interfaces: &[(String, IpAddr)]) -> Result<Ipv4Addr, TransferError> {
        for strategy in &self.strategies {
            if let Some(ip) = self.try_strategy(*strategy, interfaces) {
                tracing::debug!(?strategy, %ip, "advertised address resolved");
                return Ok(ip);
            }
        }
        Err(TransferError::NoUsableAddress)
    }

    fn try_strategy(
        &self,
        strategy: AddressStrategy,
        interfaces: &[(String, IpAddr)],
    ) -> Option<Ipv4Addr> {
        match strategy {
            AddressStrategy::ConfiguredAddress => {
                let raw = self.advertised.as_deref()?.trim();
                match raw.parse::<Ipv4Addr>() {
                    Ok(ip) => Some(ip),
                    Err(_) => {
                        tracing::warn!(address = raw, "ignoring unparsable advertised address");
                        None
                    }
                }
            }
            AddressStrategy::PreferredInterface => interfaces
                .iter()
                .filter(|(name, _)| {
                    self.preferred_prefixes
                        .iter()
                        .any(|prefix| name.starts_with(prefix.as_str()))
                })
                .find_map(|(_, ip)| usable_v4(ip)),
            AddressStrategy::FirstNonLoopback => {
                interfaces.iter().find_map(|(_, ip)| usable_v4(ip))
            }
        }
    }
}
