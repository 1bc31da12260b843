//! OMCI responder core for emulated ONUs.
//!
//! Produces the management-side answers an ONU gives its OLT over OMCI and
//! keeps just enough per-ONU state for multi-step exchanges to stay consistent.
//!
//! ## Architecture
//!
//! - **OnuStateStore**: per-ONU counters and lifecycle, one lock per ONU
//! - **catalogue**: ordered managed-entity inventory reported by MIB upload
//! - **UploadSequencer**: resolves MIB upload next command numbers against the
//!   catalogue and stamps per-ONU instance numbers into the response
//! - **handlers**: one function per OMCI message type
//! - **OmciResponder**: fixed dispatch table from message type to handler
//!
//! Frame transport and the ONU lifecycle outside OMCI belong to the caller.
//!
//! ```rust
//! use onusim_omci::{OmciClass, OmciMsgType, OmciResponder, OnuKey};
//!
//! let responder = OmciResponder::default();
//! let onu = OnuKey::new(0, 1);
//! responder.activate_onu(onu);
//!
//! let frame = responder
//!     .dispatch(OmciMsgType::MibUploadNext, OmciClass::ONU_DATA, &[0x00, 0x09], onu)
//!     .unwrap();
//! assert_eq!(frame.class_id(), OmciClass::PPTP_ETHERNET_UNI);
//! assert_eq!(frame.instance_id(), 0x0101);
//! ```

pub mod catalogue;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod handlers;
pub mod message;
pub mod sequencer;
pub mod state;

pub use catalogue::{catalogue, Counter, EntityDescriptor, InstanceRule, StampTarget};
pub use config::{OmciConfig, ResetPolicy};
pub use dispatch::{handler_for, registered_types, OmciResponder};
pub use error::{OmciError, OmciResult};
pub use frame::{EntityRecord, FrameHeader, OmciFrame, FRAME_LEN};
pub use handlers::OmciMsgHandler;
pub use message::{OmciClass, OmciMsgType, OnuKey};
pub use sequencer::UploadSequencer;
pub use state::{InstanceCounters, OnuLifecycle, OnuOmciState, OnuStateStore, SharedOnuState};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
