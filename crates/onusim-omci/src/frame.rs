//! Fixed-width OMCI response frames.
//!
//! Every response is a 48 byte buffer:
//!
//! | Bytes  | Field                                         |
//! |--------|-----------------------------------------------|
//! | 0..4   | preamble (zero except for a few upload entries) |
//! | 4..8   | response marker (byte 5 is the response type)  |
//! | 8..10  | managed-entity class                          |
//! | 10..12 | managed-entity instance                       |
//! | 12..14 | attribute mask                                |
//! | 14..48 | attribute values, zero padded                 |
//!
//! Handlers build an [`EntityRecord`] and let [`OmciFrame`] lay it out, so no
//! byte offsets leak into handler or sequencer code.

use serde::{Deserialize, Serialize};

use crate::message::OmciClass;

/// Total length of every response frame.
pub const FRAME_LEN: usize = 48;

const HEADER_LEN: usize = 8;
const CLASS_OFFSET: usize = HEADER_LEN;
const INSTANCE_OFFSET: usize = CLASS_OFFSET + 2;
const MASK_OFFSET: usize = INSTANCE_OFFSET + 2;
const VALUES_OFFSET: usize = MASK_OFFSET + 2;

/// Room left for attribute values after the entity header.
pub const MAX_VALUES_LEN: usize = FRAME_LEN - VALUES_OFFSET;

/// Leading eight bytes of a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    pub preamble: [u8; 4],
    pub marker: [u8; 4],
}

impl FrameHeader {
    /// Plain acknowledgement used by MIB reset, MIB upload and alarm queries.
    pub const ACK: Self = Self::new([0x00, 0x02, 0x00, 0x00]);
    /// Set and synchronize-time acknowledgement.
    pub const SET_ACK: Self = Self::new([0x01, 0x00, 0x00, 0x00]);
    /// Create acknowledgement.
    pub const CREATE_ACK: Self = Self::new([0x01, 0x10, 0x00, 0x01]);
    /// Get acknowledgement.
    pub const GET_ACK: Self = Self::new([0x00, 0x2d, 0x02, 0x01]);
    /// All-zero header used by delete and reboot.
    pub const BLANK: Self = Self::new([0x00; 4]);

    pub const fn new(marker: [u8; 4]) -> Self {
        Self {
            preamble: [0x00; 4],
            marker,
        }
    }

    pub const fn with_preamble(mut self, preamble: [u8; 4]) -> Self {
        self.preamble = preamble;
        self
    }
}

/// Structured managed-entity body of a response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub class: OmciClass,
    pub instance: u16,
    pub mask: u16,
    values: [u8; MAX_VALUES_LEN],
}

impl EntityRecord {
    pub fn new(class: OmciClass, instance: u16) -> Self {
        Self {
            class,
            instance,
            mask: 0,
            values: [0x00; MAX_VALUES_LEN],
        }
    }

    pub fn with_mask(mut self, mask: u16) -> Self {
        self.mask = mask;
        self
    }

    /// Copy attribute values in; anything past [`MAX_VALUES_LEN`] is dropped.
    pub fn with_values(mut self, values: &[u8]) -> Self {
        debug_assert!(values.len() <= MAX_VALUES_LEN);
        let len = values.len().min(MAX_VALUES_LEN);
        self.values[..len].copy_from_slice(&values[..len]);
        self
    }

    /// Replace the low byte of the instance id, keeping the numbering-space byte.
    pub fn set_instance_low(&mut self, value: u8) {
        self.instance = (self.instance & 0xff00) | u16::from(value);
    }

    /// Overwrite one attribute value byte. Out of range offsets are ignored.
    pub fn set_value(&mut self, offset: usize, value: u8) {
        if let Some(slot) = self.values.get_mut(offset) {
            *slot = value;
        }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }
}

/// A serialized 48 byte response frame.
#[derive(Clone, PartialEq, Eq)]
pub struct OmciFrame([u8; FRAME_LEN]);

impl OmciFrame {
    /// Frame carrying only a header.
    pub fn ack(header: FrameHeader) -> Self {
        let mut bytes = [0x00; FRAME_LEN];
        bytes[..4].copy_from_slice(&header.preamble);
        bytes[4..HEADER_LEN].copy_from_slice(&header.marker);
        Self(bytes)
    }

    /// Frame carrying a managed-entity record.
    pub fn entity(header: FrameHeader, record: &EntityRecord) -> Self {
        let mut frame = Self::ack(header);
        let bytes = &mut frame.0;
        bytes[CLASS_OFFSET..INSTANCE_OFFSET].copy_from_slice(&record.class.id().to_be_bytes());
        bytes[INSTANCE_OFFSET..MASK_OFFSET].copy_from_slice(&record.instance.to_be_bytes());
        bytes[MASK_OFFSET..VALUES_OFFSET].copy_from_slice(&record.mask.to_be_bytes());
        bytes[VALUES_OFFSET..].copy_from_slice(&record.values);
        frame
    }

    /// MIB upload acknowledgement announcing the number of upload-next steps.
    pub fn upload_count(header: FrameHeader, count: u16) -> Self {
        let mut frame = Self::ack(header);
        frame.0[CLASS_OFFSET..INSTANCE_OFFSET].copy_from_slice(&count.to_be_bytes());
        frame
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn header(&self) -> FrameHeader {
        let mut preamble = [0x00; 4];
        let mut marker = [0x00; 4];
        preamble.copy_from_slice(&self.0[..4]);
        marker.copy_from_slice(&self.0[4..HEADER_LEN]);
        FrameHeader { preamble, marker }
    }

    pub fn class_id(&self) -> OmciClass {
        OmciClass(self.read_u16(CLASS_OFFSET))
    }

    pub fn instance_id(&self) -> u16 {
        self.read_u16(INSTANCE_OFFSET)
    }

    pub fn mask(&self) -> u16 {
        self.read_u16(MASK_OFFSET)
    }

    /// Count announced by a MIB upload acknowledgement.
    pub fn announced_uploads(&self) -> u16 {
        self.read_u16(CLASS_OFFSET)
    }

    /// Attribute value bytes following the mask.
    pub fn values(&self) -> &[u8] {
        &self.0[VALUES_OFFSET..]
    }

    fn read_u16(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.0[offset], self.0[offset + 1]])
    }
}

impl AsRef<[u8]> for OmciFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<OmciFrame> for Vec<u8> {
    fn from(frame: OmciFrame) -> Self {
        frame.into_vec()
    }
}

impl std::fmt::Debug for OmciFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmciFrame")
            .field("class", &self.class_id())
            .field("instance", &format_args!("{:#06x}", self.instance_id()))
            .field("mask", &format_args!("{:#06x}", self.mask()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_frame_layout() {
        let frame = OmciFrame::ack(FrameHeader::CREATE_ACK);
        assert_eq!(frame.as_bytes().len(), FRAME_LEN);
        assert_eq!(&frame.as_bytes()[..8], &[0, 0, 0, 0, 0x01, 0x10, 0x00, 0x01]);
        assert!(frame.as_bytes()[8..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_entity_frame_layout() {
        let mut record = EntityRecord::new(OmciClass::TCONT, 0x8000)
            .with_mask(0xe000)
            .with_values(&[0xff, 0xff, 0x01, 0x01]);
        record.set_instance_low(3);

        let header = FrameHeader::ACK.with_preamble([0x00, 0x42, 0x2e, 0x0a]);
        let frame = OmciFrame::entity(header, &record);
        let bytes = frame.as_bytes();

        assert_eq!(&bytes[..4], &[0x00, 0x42, 0x2e, 0x0a]);
        assert_eq!(bytes[5], 0x02);
        assert_eq!(&bytes[8..18], &[0x01, 0x06, 0x80, 0x03, 0xe0, 0x00, 0xff, 0xff, 0x01, 0x01]);
        assert!(bytes[18..].iter().all(|b| *b == 0));
        assert_eq!(frame.class_id(), OmciClass::TCONT);
        assert_eq!(frame.instance_id(), 0x8003);
        assert_eq!(frame.header(), header);
    }

    #[test]
    fn test_set_value_out_of_range_is_ignored() {
        let mut record = EntityRecord::new(OmciClass::ANI_G, 0x8001);
        record.set_value(MAX_VALUES_LEN, 0xaa);
        assert!(record.values().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_upload_count_frame() {
        let frame = OmciFrame::upload_count(FrameHeader::ACK, 67);
        assert_eq!(frame.as_bytes()[8], 0);
        assert_eq!(frame.as_bytes()[9], 67);
        assert_eq!(frame.announced_uploads(), 67);
    }
}
