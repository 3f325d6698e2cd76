//! Error types for the coinbot ledger, coordinator and services
//!
//! Every failure that can cross a module boundary is expressed here, with
//! enough context to log it and to decide whether the user should see it.

use std::fmt;

use crate::ledger::UserId;

/// Root error type for all coinbot operations
#[derive(Debug)]
pub enum CoinbotError {
    /// Configuration related errors
    Configuration(ConfigurationError),

    /// Persistence failures (the durable write or read did not complete)
    Storage(StorageError),

    /// Business-rule rejections from the ledger
    Ledger(LedgerError),

    /// Game lookup failures
    Game(crate::games::GameError),

    /// Privileged operation attempted by a non-admin
    Access(AccessError),
}

/// Configuration and validation errors
#[derive(Debug)]
pub enum ConfigurationError {
    ValidationFailed(String),
    MissingRequired(String),
    InvalidValue { field: String, value: String, reason: String },
    LoadFailed(String),
}

/// Storage system errors
#[derive(Debug)]
pub enum StorageError {
    DatabaseOpenFailed(String),
    ReadFailed(String),
    WriteFailed(String),
    CorruptedData(String),
    LockPoisoned,
}

/// Ledger rule violations
#[derive(Debug, PartialEq, Eq)]
pub enum LedgerError {
    InsufficientBalance { user_id: UserId, balance: i64, delta: i64 },
    PromoNotFound(String),
    InvalidPromo { code: String, reason: String },
    UnknownUser(UserId),
}

/// Privileged operation errors
#[derive(Debug, PartialEq, Eq)]
pub enum AccessError {
    NotAdmin(UserId),
}

impl CoinbotError {
    /// Whether the failure is an expected outcome the user should be told about,
    /// as opposed to an internal fault.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            CoinbotError::Ledger(LedgerError::InsufficientBalance { .. })
                | CoinbotError::Ledger(LedgerError::PromoNotFound(_))
                | CoinbotError::Access(_)
        )
    }

    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, CoinbotError::Ledger(LedgerError::InsufficientBalance { .. }))
    }

    pub fn is_promo_not_found(&self) -> bool {
        matches!(self, CoinbotError::Ledger(LedgerError::PromoNotFound(_)))
    }
}

// Display implementations
impl fmt::Display for CoinbotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinbotError::Configuration(e) => write!(f, "Configuration error: {}", e),
            CoinbotError::Storage(e) => write!(f, "Storage error: {}", e),
            CoinbotError::Ledger(e) => write!(f, "Ledger error: {}", e),
            CoinbotError::Game(e) => write!(f, "Game error: {}", e),
            CoinbotError::Access(e) => write!(f, "Access error: {}", e),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::ValidationFailed(msg) => write!(f, "Validation failed: {}", msg),
            ConfigurationError::MissingRequired(field) => write!(f, "Missing required field: {}", field),
            ConfigurationError::InvalidValue { field, value, reason } => {
                write!(f, "Invalid value for {}: '{}' ({})", field, value, reason)
            }
            ConfigurationError::LoadFailed(msg) => write!(f, "Failed to load configuration: {}", msg),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseOpenFailed(msg) => write!(f, "Database open failed: {}", msg),
            StorageError::ReadFailed(msg) => write!(f, "Read failed: {}", msg),
            StorageError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
            StorageError::CorruptedData(msg) => write!(f, "Corrupted data: {}", msg),
            StorageError::LockPoisoned => write!(f, "Ledger write lock poisoned"),
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InsufficientBalance { user_id, balance, delta } => write!(
                f,
                "Insufficient balance for user {}: balance {}, requested change {}",
                user_id, balance, delta
            ),
            LedgerError::PromoNotFound(code) => write!(f, "Promo code not found: {}", code),
            LedgerError::InvalidPromo { code, reason } => {
                write!(f, "Invalid promo code '{}': {}", code, reason)
            }
            LedgerError::UnknownUser(user_id) => write!(f, "Unknown user: {}", user_id),
        }
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::NotAdmin(user_id) => write!(f, "User {} is not the administrator", user_id),
        }
    }
}

impl std::error::Error for CoinbotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoinbotError::Configuration(e) => Some(e),
            CoinbotError::Storage(e) => Some(e),
            CoinbotError::Ledger(e) => Some(e),
            CoinbotError::Game(e) => Some(e),
            CoinbotError::Access(e) => Some(e),
        }
    }
}

impl std::error::Error for ConfigurationError {}
impl std::error::Error for StorageError {}
impl std::error::Error for LedgerError {}
impl std::error::Error for AccessError {}

impl From<ConfigurationError> for CoinbotError {
    fn from(e: ConfigurationError) -> Self {
        CoinbotError::Configuration(e)
    }
}

impl From<StorageError> for CoinbotError {
    fn from(e: StorageError) -> Self {
        CoinbotError::Storage(e)
    }
}

impl From<LedgerError> for CoinbotError {
    fn from(e: LedgerError) -> Self {
        CoinbotError::Ledger(e)
    }
}

impl From<crate::games::GameError> for CoinbotError {
    fn from(e: crate::games::GameError) -> Self {
        CoinbotError::Game(e)
    }
}

impl From<AccessError> for CoinbotError {
    fn from(e: AccessError) -> Self {
        CoinbotError::Access(e)
    }
}

// External error conversions
impl From<rocksdb::Error> for CoinbotError {
    fn from(e: rocksdb::Error) -> Self {
        CoinbotError::Storage(StorageError::WriteFailed(e.to_string()))
    }
}

impl From<std::io::Error> for CoinbotError {
    fn from(e: std::io::Error) -> Self {
        CoinbotError::Storage(StorageError::ReadFailed(e.to_string()))
    }
}

impl From<serde_json::Error> for CoinbotError {
    fn from(e: serde_json::Error) -> Self {
        CoinbotError::Storage(StorageError::CorruptedData(e.to_string()))
    }
}

impl From<toml::de::Error> for CoinbotError {
    fn from(e: toml::de::Error) -> Self {
        CoinbotError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

// Convenience type alias for Results
pub type CoinbotResult<T> = Result<T, CoinbotError>;
