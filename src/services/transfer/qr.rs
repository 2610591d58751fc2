//! QR payload encoding for the transfer handshake.

use std::net::{IpAddr, SocketAddr};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use qrcode::render::{svg, unicode};
use qrcode::QrCode;

use crate::types::errors::TransferError;
use crate::types::transfer::QrTransferInfo;

/// Path served by both embedded servers for a full export.
pub const EXPORT_PATH: &str = "/api/export";

impl QrTransferInfo {
    pub fn new(ip: impl Into<String>, port: u16, app_version: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port,
            app_version: app_version.into(),
        }
    }

    /// Compact JSON form, the exact text stored in the QR code.
    pub fn to_json(&self) -> Result<String, TransferError> {
        serde_json::to_string(self).map_err(|e| TransferError::InvalidPayload(e.to_string()))
    }

    /// Decodes a scanned payload. The address must be a literal IP and the port non-zero.
    pub fn from_json(raw: &str) -> Result<Self, TransferError> {
        let info: QrTransferInfo = serde_json::from_str(raw.trim())
            .map_err(|e| TransferError::InvalidPayload(e.to_string()))?;

        if info.ip.parse::<IpAddr>().is_err() {
            return Err(TransferError::InvalidPayload(format!(
                "not an IP address: {}",
                info.ip
            )));
        }
        if info.port == 0 {
            return Err(TransferError::InvalidPayload("port must be non-zero".into()));
        }
        Ok(info)
    }

    /// `http://{ip}:{port}/api/export`; IPv6 hosts are bracketed.
    pub fn export_url(&self) -> String {
        match self.ip.parse::<IpAddr>() {
            Ok(ip) => format!("http://{}{}", SocketAddr::new(ip, self.port), EXPORT_PATH),
            Err(_) => format!("http://{}:{}{}", self.ip, self.port, EXPORT_PATH),
        }
    }

    fn qr_code(&self) -> Result<QrCode, TransferError> {
        let json = self.to_json()?;
        QrCode::new(json.as_bytes()).map_err(|e| TransferError::QrEncode(e.to_string()))
    }

    pub fn render_svg(&self) -> Result<String, TransferError> {
        let code = self.qr_code()?;
        Ok(code
            .render::<svg::Color>()
            .min_dimensions(240, 240)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build())
    }

    /// The SVG rendering as a `data:` URI, ready for an `<img src>`.
    pub fn to_data_uri(&self) -> Result<String, TransferError> {
        let svg = self.render_svg()?;
        Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg)))
    }

    /// Half-block rendering for terminals with dark backgrounds.
    pub fn render_terminal(&self) -> Result<String, TransferError> {
        let code = self.qr_code()?;
        Ok(code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build())
    }
}
