//! Error types for the OMCI responder.

use crate::message::{OmciMsgType, OnuKey};

/// Result alias used by every handler and store operation.
pub type OmciResult<T> = Result<T, OmciError>;

/// OMCI responder error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OmciError {
    /// The command referenced an ONU that has no state.
    #[error("ONU {0} - not found in state store")]
    OnuNotFound(OnuKey),

    /// A MIB upload next command asked for an entry past the catalogue.
    #[error("ONU {key} - invalid MIB upload request {command}: uploads {uploads}, extras {extras}")]
    UploadIndexOutOfRange {
        key: OnuKey,
        command: u16,
        uploads: u16,
        extras: u16,
    },

    /// Message content is shorter than the handler needs to decode.
    #[error("Malformed content: need {needed} bytes, got {actual}")]
    MalformedContent { needed: usize, actual: usize },

    /// The GEM port id was read before a GEM port was created.
    #[error("ONU {0} - not DONE (GEM port id is not set)")]
    NotReady(OnuKey),

    /// The message type byte is not a known OMCI message type.
    #[error("Unknown OMCI message type: {0:#04x}")]
    UnknownMessageType(u8),

    /// The message type is known but no handler is registered for it.
    #[error("No handler registered for {0}")]
    UnsupportedMessageType(OmciMsgType),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OmciError {
    /// Whether the caller can keep the session going after this error.
    ///
    /// Overflowing upload requests are expected during normal operation and
    /// only tracked through the overflow counter.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OmciError::UploadIndexOutOfRange { .. }
                | OmciError::MalformedContent { .. }
                | OmciError::NotReady(_)
        )
    }
}
