//! Message dispatch.
//!
//! The handler table is built once on first use and never changes. An
//! [`OmciResponder`] pairs it with the ONU state store and configuration.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::OmciConfig;
use crate::error::{OmciError, OmciResult};
use crate::frame::OmciFrame;
use crate::handlers::{self, OmciMsgHandler};
use crate::message::{OmciClass, OmciMsgType, OnuKey};
use crate::sequencer::UploadSequencer;
use crate::state::OnuStateStore;

static HANDLERS: Lazy<HashMap<OmciMsgType, OmciMsgHandler>> = Lazy::new(|| {
    let entries: [(OmciMsgType, OmciMsgHandler); 11] = [
        (OmciMsgType::MibReset, handlers::mib_reset),
        (OmciMsgType::MibUpload, handlers::mib_upload),
        (OmciMsgType::MibUploadNext, handlers::mib_upload_next),
        (OmciMsgType::Set, handlers::set),
        (OmciMsgType::Create, handlers::create),
        (OmciMsgType::Get, handlers::get),
        (OmciMsgType::GetAllAlarms, handlers::get_all_alarms),
        (OmciMsgType::GetAllAlarmsNext, handlers::get_all_alarms_next),
        (OmciMsgType::SynchronizeTime, handlers::sync_time),
        (OmciMsgType::Delete, handlers::delete),
        (OmciMsgType::Reboot, handlers::reboot),
    ];
    HashMap::from(entries)
});

/// Handler registered for `msg_type`, if any.
pub fn handler_for(msg_type: OmciMsgType) -> Option<OmciMsgHandler> {
    HANDLERS.get(&msg_type).copied()
}

/// Message types with a registered handler.
pub fn registered_types() -> Vec<OmciMsgType> {
    let mut types: Vec<OmciMsgType> = HANDLERS.keys().copied().collect();
    types.sort_by_key(|t| t.code());
    types
}

/// Answers OMCI requests on behalf of every emulated ONU.
///
/// Cheap to share: wrap it in an `Arc` and call [`dispatch`](Self::dispatch)
/// from as many tasks or threads as there are ONU sessions.
#[derive(Debug)]
pub struct OmciResponder {
    store: Arc<OnuStateStore>,
    config: OmciConfig,
    sequencer: UploadSequencer,
}

impl OmciResponder {
    /// Create a responder with an empty state store.
    pub fn new(config: OmciConfig) -> OmciResult<Self> {
        Self::with_store(Arc::new(OnuStateStore::new()), config)
    }

    /// Create a responder over an existing state store.
    pub fn with_store(store: Arc<OnuStateStore>, config: OmciConfig) -> OmciResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            sequencer: UploadSequencer::default(),
        })
    }

    pub fn store(&self) -> &Arc<OnuStateStore> {
        &self.store
    }

    pub fn config(&self) -> &OmciConfig {
        &self.config
    }

    pub fn sequencer(&self) -> UploadSequencer {
        self.sequencer
    }

    /// Register an ONU so that stateful requests can find it.
    pub fn activate_onu(&self, key: OnuKey) {
        self.store.get_or_create(key);
    }

    /// Route a request to the handler registered for `msg_type`.
    pub fn dispatch(
        &self,
        msg_type: OmciMsgType,
        class: OmciClass,
        content: &[u8],
        key: OnuKey,
    ) -> OmciResult<OmciFrame> {
        let handler =
            handler_for(msg_type).ok_or(OmciError::UnsupportedMessageType(msg_type))?;
        handler(self, class, content, key)
    }

    /// Like [`dispatch`](Self::dispatch), starting from the raw message type byte.
    pub fn dispatch_raw(
        &self,
        msg_type: u8,
        class: u16,
        content: &[u8],
        key: OnuKey,
    ) -> OmciResult<OmciFrame> {
        let msg_type = OmciMsgType::try_from(msg_type)?;
        self.dispatch(msg_type, OmciClass(class), content, key)
    }
}

impl Default for OmciResponder {
    fn default() -> Self {
        Self {
            store: Arc::new(OnuStateStore::new()),
            config: OmciConfig::default(),
            sequencer: UploadSequencer::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_types() {
        assert_eq!(
            registered_types(),
            vec![
                OmciMsgType::Create,
                OmciMsgType::Delete,
                OmciMsgType::Set,
                OmciMsgType::Get,
                OmciMsgType::GetAllAlarms,
                OmciMsgType::GetAllAlarmsNext,
                OmciMsgType::MibUpload,
                OmciMsgType::MibUploadNext,
                OmciMsgType::MibReset,
                OmciMsgType::SynchronizeTime,
                OmciMsgType::Reboot,
            ]
        );
    }

    #[test]
    fn test_unregistered_type() {
        let responder = OmciResponder::default();
        let result = responder.dispatch(
            OmciMsgType::Test,
            OmciClass::ONU_DATA,
            &[],
            OnuKey::new(0, 0),
        );
        assert_eq!(
            result.unwrap_err(),
            OmciError::UnsupportedMessageType(OmciMsgType::Test)
        );
    }

    #[test]
    fn test_dispatch_raw_unknown_code() {
        let responder = OmciResponder::default();
        let result = responder.dispatch_raw(0x03, 0, &[], OnuKey::new(0, 0));
        assert_eq!(result.unwrap_err(), OmciError::UnknownMessageType(0x03));
    }

    #[test]
    fn test_strict_config_rejected() {
        let config = OmciConfig {
            mib_upload_steps: Some(10),
            strict_catalogue: true,
            ..Default::default()
        };
        assert!(OmciResponder::new(config).is_err());
    }
}
