//! Error types for mirror-core

use crate::address::{Address, MirrorId};

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
///
/// Every registry, directory, and sync failure maps to exactly one
/// [`ErrorKind`]. The remaining variants belong to the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Mutation or sync read attempted before the mirror was configured
    #[error("Mirror is not configured")]
    NotConfigured,

    /// `configure` called on a mirror that is already configured
    #[error("Mirror is already configured")]
    AlreadyConfigured,

    /// Address is malformed, zero, the sentinel, or the mirror's own id
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    /// Address is already an owner of the mirror
    #[error("Address {address} is already an owner")]
    DuplicateOwner { address: Address },

    /// Address is not an owner of the mirror
    #[error("Address {address} is not an owner")]
    UnknownOwner { address: Address },

    /// Supplied predecessor does not link to the target owner
    #[error("{prev} is not the predecessor of {target}")]
    InvalidPredecessor { prev: Address, target: Address },

    /// Threshold outside `1..=owners`
    #[error("Threshold {threshold} is out of range for {owners} owner(s)")]
    InvalidThreshold { threshold: usize, owners: usize },

    /// Mirror requires full sync before mutations and is only partially synced
    #[error("Mirror must be fully synced first ({synced} owner(s) synced)")]
    SyncRequired { synced: usize },

    /// Numeric limit outside its permitted range
    #[error("Limit {value} is out of range 1..={max}")]
    LimitOutOfRange { value: usize, max: usize },

    /// Caller is not allowed to perform the operation
    #[error("Caller {caller} is not authorized")]
    Unauthorized { caller: Address },

    /// Principal already has a mirror
    #[error("Principal {principal} already has mirror {mirror}")]
    DirectoryConflict { principal: Address, mirror: MirrorId },

    /// No mirror is stored under the given key
    #[error("Mirror not found: {key}")]
    MirrorNotFound { key: String },

    /// Persisted state failed structural validation
    #[error("State is corrupt: {message}")]
    StateCorrupt { message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

/// Classification of an [`Error`], one per failure mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotConfigured,
    AlreadyConfigured,
    InvalidAddress,
    DuplicateOwner,
    UnknownOwner,
    InvalidPredecessor,
    InvalidThreshold,
    SyncRequired,
    LimitOutOfRange,
    Unauthorized,
    DirectoryConflict,
    MirrorNotFound,
    Storage,
}

impl Error {
    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::AlreadyConfigured => ErrorKind::AlreadyConfigured,
            Self::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            Self::DuplicateOwner { .. } => ErrorKind::DuplicateOwner,
            Self::UnknownOwner { .. } => ErrorKind::UnknownOwner,
            Self::InvalidPredecessor { .. } => ErrorKind::InvalidPredecessor,
            Self::InvalidThreshold { .. } => ErrorKind::InvalidThreshold,
            Self::SyncRequired { .. } => ErrorKind::SyncRequired,
            Self::LimitOutOfRange { .. } => ErrorKind::LimitOutOfRange,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::DirectoryConflict { .. } => ErrorKind::DirectoryConflict,
            Self::MirrorNotFound { .. } => ErrorKind::MirrorNotFound,
            Self::StateCorrupt { .. }
            | Self::Io(_)
            | Self::TomlDe(_)
            | Self::TomlSer(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn invalid_address(address: impl ToString) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
        }
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        Self::StateCorrupt {
            message: message.into(),
        }
    }
}
