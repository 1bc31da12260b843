//! OMCI message vocabulary: ONU identity, message types and managed-entity classes.

use serde::{Deserialize, Serialize};

use crate::error::OmciError;

/// Identity of one emulated ONU: PON interface index plus ONU index on that interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OnuKey {
    pub intf_id: u32,
    pub onu_id: u32,
}

impl OnuKey {
    pub fn new(intf_id: u32, onu_id: u32) -> Self {
        Self { intf_id, onu_id }
    }
}

impl std::fmt::Display for OnuKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{intfid:{}, onuid:{}}}", self.intf_id, self.onu_id)
    }
}

/// OMCI message types (ITU-T G.988, table 11.2.2-1).
///
/// Only a subset has a registered handler; the remaining variants are
/// recognised so that the dispatcher can report them precisely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OmciMsgType {
    Create,
    Delete,
    Set,
    Get,
    GetAllAlarms,
    GetAllAlarmsNext,
    MibUpload,
    MibUploadNext,
    MibReset,
    Alarm,
    AttributeValueChange,
    Test,
    SynchronizeTime,
    Reboot,
    GetNext,
}

impl OmciMsgType {
    /// Wire value of the message type field (action bits only).
    pub fn code(self) -> u8 {
        match self {
            Self::Create => 4,
            Self::Delete => 6,
            Self::Set => 8,
            Self::Get => 9,
            Self::GetAllAlarms => 11,
            Self::GetAllAlarmsNext => 12,
            Self::MibUpload => 13,
            Self::MibUploadNext => 14,
            Self::MibReset => 15,
            Self::Alarm => 16,
            Self::AttributeValueChange => 17,
            Self::Test => 18,
            Self::SynchronizeTime => 24,
            Self::Reboot => 25,
            Self::GetNext => 26,
        }
    }
}

impl TryFrom<u8> for OmciMsgType {
    type Error = OmciError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        // The upper bits carry DB/AR/AK flags.
        match value & 0x1f {
            4 => Ok(Self::Create),
            6 => Ok(Self::Delete),
            8 => Ok(Self::Set),
            9 => Ok(Self::Get),
            11 => Ok(Self::GetAllAlarms),
            12 => Ok(Self::GetAllAlarmsNext),
            13 => Ok(Self::MibUpload),
            14 => Ok(Self::MibUploadNext),
            15 => Ok(Self::MibReset),
            16 => Ok(Self::Alarm),
            17 => Ok(Self::AttributeValueChange),
            18 => Ok(Self::Test),
            24 => Ok(Self::SynchronizeTime),
            25 => Ok(Self::Reboot),
            26 => Ok(Self::GetNext),
            _ => Err(OmciError::UnknownMessageType(value)),
        }
    }
}

impl std::fmt::Display for OmciMsgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Set => "Set",
            Self::Get => "Get",
            Self::GetAllAlarms => "GetAllAlarms",
            Self::GetAllAlarmsNext => "GetAllAlarmsNext",
            Self::MibUpload => "MibUpload",
            Self::MibUploadNext => "MibUploadNext",
            Self::MibReset => "MibReset",
            Self::Alarm => "Alarm",
            Self::AttributeValueChange => "AttributeValueChange",
            Self::Test => "Test",
            Self::SynchronizeTime => "SynchronizeTime",
            Self::Reboot => "Reboot",
            Self::GetNext => "GetNext",
        };
        write!(f, "{}", name)
    }
}

/// Managed-entity class identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OmciClass(pub u16);

impl OmciClass {
    pub const ONU_DATA: Self = Self(2);
    pub const CIRCUIT_PACK: Self = Self(6);
    pub const PPTP_ETHERNET_UNI: Self = Self(11);
    pub const ONU2_G: Self = Self(257);
    pub const TCONT: Self = Self(262);
    pub const ANI_G: Self = Self(263);
    pub const UNI_G: Self = Self(264);
    pub const GEM_PORT_NETWORK_CTP: Self = Self(268);
    pub const PRIORITY_QUEUE: Self = Self(277);
    pub const TRAFFIC_SCHEDULER: Self = Self(278);

    pub fn id(self) -> u16 {
        self.0
    }
}

impl From<u16> for OmciClass {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for OmciClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
