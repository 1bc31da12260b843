//! One handler per supported OMCI message type.
//!
//! Most handlers only acknowledge. MIB reset and create touch the ONU's
//! state, MIB upload next delegates to the [`UploadSequencer`](crate::UploadSequencer).

use crate::dispatch::OmciResponder;
use crate::error::{OmciError, OmciResult};
use crate::frame::{EntityRecord, FrameHeader, OmciFrame};
use crate::message::{OmciClass, OnuKey};

/// Handler signature shared by every registered message type.
pub type OmciMsgHandler =
    fn(&OmciResponder, OmciClass, &[u8], OnuKey) -> OmciResult<OmciFrame>;

/// Decode the leading big-endian u16 of the message content.
fn leading_u16(content: &[u8]) -> OmciResult<u16> {
    match content {
        [hi, lo, ..] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(OmciError::MalformedContent {
            needed: 2,
            actual: content.len(),
        }),
    }
}

pub fn mib_reset(
    responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    tracing::debug!(onu = %key, "Omci MibReset");
    responder
        .store()
        .reset(&key, responder.config().reset_policy);
    Ok(OmciFrame::ack(FrameHeader::ACK))
}

pub fn mib_upload(
    responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    let steps = responder.config().upload_steps();
    tracing::debug!(onu = %key, steps, "Omci MibUpload");
    Ok(OmciFrame::upload_count(FrameHeader::ACK, steps))
}

pub fn mib_upload_next(
    responder: &OmciResponder,
    _class: OmciClass,
    content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    let command = leading_u16(content)?;
    tracing::debug!(onu = %key, command, "Omci MibUploadNext");
    let sequencer = responder.sequencer();
    responder
        .store()
        .with_state(&key, |state| sequencer.next(&key, state, command))?
}

pub fn create(
    responder: &OmciResponder,
    class: OmciClass,
    content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    if class == OmciClass::GEM_PORT_NETWORK_CTP {
        let gem_port_id = leading_u16(content)?;
        responder.store().with_state(&key, |state| {
            state.assign_gem_port(gem_port_id);
        })?;
        tracing::info!(onu = %key, gem_port_id, "GEM port assigned");
    }
    tracing::debug!(onu = %key, %class, "Omci Create");
    Ok(OmciFrame::ack(FrameHeader::CREATE_ACK))
}

pub fn set(
    _responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    tracing::debug!(onu = %key, "Omci Set");
    Ok(OmciFrame::ack(FrameHeader::SET_ACK))
}

pub fn get(
    _responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    tracing::debug!(onu = %key, "Omci Get");
    let record = EntityRecord::new(OmciClass(0x0020), 0xc000);
    Ok(OmciFrame::entity(FrameHeader::GET_ACK, &record))
}

pub fn get_all_alarms(
    _responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    tracing::debug!(onu = %key, "Omci GetAllAlarms");
    let record = EntityRecord::new(OmciClass(0x0003), 0x0000);
    Ok(OmciFrame::entity(FrameHeader::ACK, &record))
}

pub fn get_all_alarms_next(
    _responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    tracing::debug!(onu = %key, "Omci GetAllAlarmsNext");
    let record = EntityRecord::new(OmciClass::PPTP_ETHERNET_UNI, 0x0102).with_mask(0x8000);
    Ok(OmciFrame::entity(FrameHeader::ACK, &record))
}

pub fn sync_time(
    _responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    tracing::debug!(onu = %key, "Omci SynchronizeTime");
    Ok(OmciFrame::ack(FrameHeader::SET_ACK))
}

pub fn delete(
    _responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    tracing::debug!(onu = %key, "Omci Delete");
    let record = EntityRecord::new(OmciClass::PPTP_ETHERNET_UNI, 0x0000).with_mask(0x8000);
    Ok(OmciFrame::entity(FrameHeader::BLANK, &record))
}

pub fn reboot(
    _responder: &OmciResponder,
    _class: OmciClass,
    _content: &[u8],
    key: OnuKey,
) -> OmciResult<OmciFrame> {
    tracing::debug!(onu = %key, "Omci Reboot");
    Ok(OmciFrame::ack(FrameHeader::BLANK))
}
