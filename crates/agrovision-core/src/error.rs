//! Error types for the AgroVision application.

use serde::Serialize;
use thiserror::Error;

/// Why the camera (or an uploaded file) could not provide an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaAccessReason {
    /// The user or the platform refused camera access.
    PermissionDenied,
    /// No usable camera, or the device is held by another application.
    Unavailable,
    /// The selected file is not an image.
    UnsupportedFile,
}

/// A shared error type for the entire AgroVision application.
///
/// Variants mirror the failure classes a front end has to tell apart:
/// media access and inference failures are shown to the user with a retry
/// affordance, storage read problems are absorbed by the history store.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum AgroError {
    /// Camera unavailable, permission denied or unusable upload.
    #[error("Media access error ({reason:?}): {message}")]
    MediaAccess {
        reason: MediaAccessReason,
        message: String,
    },

    /// The diagnosis call failed or returned unusable data.
    #[error("Inference error: {message}")]
    Inference {
        status_code: Option<u16>,
        message: String,
    },

    /// Persisted history is missing or unreadable.
    #[error("Storage read error: {0}")]
    StorageRead(String),

    /// Persisting history failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A record with the same id is already stored.
    #[error("Duplicate record id: {id}")]
    DuplicateId { id: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// An operation was invoked in a state that does not allow it.
    #[error("Invalid state: cannot {action} while {state}")]
    InvalidState { state: String, action: String },

    /// The operation was abandoned by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgroError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a MediaAccess error
    pub fn media_access(reason: MediaAccessReason, message: impl Into<String>) -> Self {
        Self::MediaAccess {
            reason,
            message: message.into(),
        }
    }

    /// Creates an Inference error without an HTTP status
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            status_code: None,
            message: message.into(),
        }
    }

    /// Creates an Inference error for a non-success HTTP response
    pub fn inference_http(status_code: u16, message: impl Into<String>) -> Self {
        Self::Inference {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Creates a StorageRead error
    pub fn storage_read(message: impl Into<String>) -> Self {
        Self::StorageRead(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidState error
    pub fn invalid_state(state: impl Into<String>, action: impl Into<String>) -> Self {
        Self::InvalidState {
            state: state.into(),
            action: action.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_media_access(&self) -> bool {
        matches!(self, Self::MediaAccess { .. })
    }

    pub fn is_inference(&self) -> bool {
        matches!(self, Self::Inference { .. })
    }

    pub fn is_storage_read(&self) -> bool {
        matches!(self, Self::StorageRead(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the user can recover by retrying or picking another image.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MediaAccess { .. } | Self::Inference { .. } | Self::Cancelled
        )
    }

    /// Text shown to the user in place of the camera/analysis view.
    pub fn user_message(&self) -> String {
        match self {
            Self::MediaAccess {
                reason: MediaAccessReason::PermissionDenied,
                ..
            } => "Camera access was denied. Please check your settings and grant permission."
                .to_string(),
            Self::MediaAccess {
                reason: MediaAccessReason::Unavailable,
                ..
            } => "Unable to access camera. Your device may not support this feature or it's being used by another app."
                .to_string(),
            Self::MediaAccess {
                reason: MediaAccessReason::UnsupportedFile,
                ..
            } => "The selected file is not an image. Please choose a photo of your plant."
                .to_string(),
            Self::Inference { .. } => {
                "AI analysis failed. Please ensure the plant is well-lit and clearly visible."
                    .to_string()
            }
            Self::Cancelled => "Scan cancelled.".to_string(),
            other => format!("Something went wrong: {other}"),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AgroError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AgroError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AgroError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AgroError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AgroError>`.
pub type Result<T> = std::result::Result<T, AgroError>;
