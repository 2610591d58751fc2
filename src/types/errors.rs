use thiserror::Error;

// === LinkError ===

/// Errors related to stored deeplink operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Link with the given ID was not found.
    #[error("Link not found: {0}")]
    NotFound(i64),
    /// The link already exists in the target profile.
    #[error("Duplicate link: {0}")]
    Duplicate(String),
    /// The link failed deeplink syntax validation.
    #[error("Invalid deeplink: {0}")]
    Invalid(String),
    /// Database operation failed.
    #[error("Link database error: {0}")]
    DatabaseError(String),
}

// === TagError ===

/// Errors related to tag operations.
#[derive(Debug, Error)]
pub enum TagError {
    /// Tag names must contain at least one non-whitespace character.
    #[error("Tag name is empty")]
    EmptyName,
    /// Database operation failed.
    #[error("Tag database error: {0}")]
    DatabaseError(String),
}

// === ProfileError ===

/// Errors related to profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Profile with the given ID was not found.
    #[error("Profile not found: {0}")]
    NotFound(i64),
    /// A profile with this name already exists.
    #[error("Profile already exists: {0}")]
    AlreadyExists(String),
    /// Database operation failed.
    #[error("Profile database error: {0}")]
    DatabaseError(String),
}

// === ImportError ===

/// Fatal import failures. Per-record problems are never errors; they are
/// counted as skipped in the `ImportResult`.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The source could not be opened or read.
    #[error("Cannot read import source: {0}")]
    SourceUnreadable(String),
    /// The source was read but its overall structure is not the expected format.
    #[error("Malformed import file: {0}")]
    MalformedStructure(String),
    /// The store could not be reached to start the import.
    #[error("Import storage error: {0}")]
    Storage(String),
}

// === TransferError ===

/// Errors raised by the LAN transfer servers and client.
#[derive(Debug, Error)]
pub enum TransferError {
    /// None of the address discovery strategies produced a LAN IPv4 address.
    #[error("No usable LAN address found")]
    NoUsableAddress,
    /// The listener could not be bound.
    #[error("Failed to bind server: {0}")]
    Bind(String),
    /// Connection, timeout or body read failure while talking to a peer.
    #[error("Network error: {0}")]
    Network(String),
    /// The peer answered with a non-success status.
    #[error("Peer responded with HTTP {0}")]
    HttpStatus(u16),
    /// A QR payload or transfer envelope could not be decoded.
    #[error("Invalid transfer payload: {0}")]
    InvalidPayload(String),
    /// Reading or writing the local store failed.
    #[error("Transfer storage error: {0}")]
    Storage(String),
    /// The connection descriptor could not be rendered as a QR code.
    #[error("QR encoding failed: {0}")]
    QrEncode(String),
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

impl From<LinkError> for ImportError {
    fn from(err: LinkError) -> Self {
        ImportError::Storage(err.to_string())
    }
}

impl From<LinkError> for TransferError {
    fn from(err: LinkError) -> Self {
        TransferError::Storage(err.to_string())
    }
}

impl From<TagError> for TransferError {
    fn from(err: TagError) -> Self {
        TransferError::Storage(err.to_string())
    }
}
