//! Error types for boardbot.

/// Top-level error type for the router.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Board error: {0}")]
    Board(#[from] BoardError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors. All are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the task-board client.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("No card matching {query:?} in any searched list")]
    CardNotFound { query: String },

    #[error("Board API returned {status} for {operation}")]
    RemoteStatus { operation: String, status: u16 },

    #[error("Board request failed for {operation}: {reason}")]
    RemoteFailure { operation: String, reason: String },
}

/// Processed-event store errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to record processed event {event_id}: {source}")]
    Write {
        event_id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the messaging platform client.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to post message to {channel}: {reason}")]
    SendFailed { channel: String, reason: String },
}

/// Result type alias for the router.
pub type Result<T> = std::result::Result<T, Error>;
