//! The managed-entity inventory an emulated ONU reports during MIB upload.
//!
//! The catalogue is an ordered table: the MIB upload next command number is
//! the index into it. Each entry carries the entity template and the rule
//! deciding how per-ONU counters are stamped into it.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::frame::{EntityRecord, FrameHeader};
use crate::message::OmciClass;
use crate::state::InstanceCounters;

/// Per-ONU counter a catalogue entry can draw instance numbers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Pptp,
    Tcont,
    UniG,
    PriorityQueue,
}

impl Counter {
    pub fn get(self, counters: &InstanceCounters) -> u8 {
        match self {
            Counter::Pptp => counters.pptp,
            Counter::Tcont => counters.tcont,
            Counter::UniG => counters.uni_g,
            Counter::PriorityQueue => counters.priority_queue,
        }
    }

    pub fn get_mut(self, counters: &mut InstanceCounters) -> &mut u8 {
        match self {
            Counter::Pptp => &mut counters.pptp,
            Counter::Tcont => &mut counters.tcont,
            Counter::UniG => &mut counters.uni_g,
            Counter::PriorityQueue => &mut counters.priority_queue,
        }
    }
}

/// Where a stamped counter value lands in the entity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StampTarget {
    /// Low byte of the instance id
    Instance,
    /// Attribute value byte at the given offset
    Value(usize),
}

/// How a catalogue entry obtains its instance numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum InstanceRule {
    /// Template is sent unchanged.
    Static,
    /// Counter value goes into the instance id. With `pre_increment` the
    /// counter is advanced first, otherwise it is left untouched.
    Stamped { counter: Counter, pre_increment: bool },
    /// Counter value is stamped at `target`, then the counter advances.
    PostIncrement { counter: Counter, target: StampTarget },
    /// Instance id from `counter`, and `reference` stamped into the related
    /// port attributes at `offsets`. With `step_back` the reference counter is
    /// decremented before it is read and stays decremented.
    SharedReference {
        counter: Counter,
        reference: Counter,
        offsets: &'static [usize],
        step_back: bool,
    },
}

/// One entry of the MIB upload catalogue.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntityDescriptor {
    pub name: &'static str,
    #[serde(skip)]
    pub preamble: [u8; 4],
    pub class: OmciClass,
    pub instance: u16,
    pub mask: u16,
    #[serde(skip)]
    pub values: &'static [u8],
    pub rule: InstanceRule,
}

impl EntityDescriptor {
    const fn fixed(name: &'static str, class: OmciClass, instance: u16, mask: u16) -> Self {
        Self {
            name,
            preamble: [0x00; 4],
            class,
            instance,
            mask,
            values: &[],
            rule: InstanceRule::Static,
        }
    }

    const fn values(mut self, values: &'static [u8]) -> Self {
        self.values = values;
        self
    }

    const fn preamble(mut self, preamble: [u8; 4]) -> Self {
        self.preamble = preamble;
        self
    }

    const fn rule(mut self, rule: InstanceRule) -> Self {
        self.rule = rule;
        self
    }

    /// Response header for this entry.
    pub fn header(&self) -> FrameHeader {
        FrameHeader::ACK.with_preamble(self.preamble)
    }

    /// Unstamped entity record built from the template.
    pub fn record(&self) -> EntityRecord {
        EntityRecord::new(self.class, self.instance)
            .with_mask(self.mask)
            .with_values(self.values)
    }
}

pub const PPTP_COUNT: usize = 4;
pub const TCONT_COUNT: usize = 8;
pub const UNI_G_COUNT: usize = 4;
pub const PRIORITY_QUEUE_GROUPS: usize = 8;
pub const TRAFFIC_SCHEDULER_COUNT: usize = 8;

const VENDOR_ID: [u8; 4] = *b"ISKT";
const SPACES: [u8; 20] = [0x20; 20];

const ONU_DATA: EntityDescriptor =
    EntityDescriptor::fixed("ONU data", OmciClass::ONU_DATA, 0x0000, 0x8000);

const CIRCUIT_PACK_VALUES_ETH: [u8; 24] = circuit_pack_type(0x2f, 0x04);
const CIRCUIT_PACK_VALUES_GPON: [u8; 24] = circuit_pack_type(0xee, 0x01);
const CIRCUIT_PACK_VERSION_ETH: [u8; 23] = circuit_pack_version([0x00, 0x00, 0x08]);
const CIRCUIT_PACK_VERSION_GPON: [u8; 24] = circuit_pack_version_ext([0x00, 0x08, 0x40, 0x10]);

// Type, number of ports, serial number (vendor id + 4 bytes) and the trailing
// operational attributes of the circuit pack.
const fn circuit_pack_type(pack_type: u8, ports: u8) -> [u8; 24] {
    let mut values = [0x00; 24];
    values[0] = pack_type;
    values[1] = ports;
    let mut i = 0;
    while i < VENDOR_ID.len() {
        values[2 + i] = VENDOR_ID[i];
        i += 1;
    }
    values[6] = 0x71;
    values[7] = 0xe8;
    values[9] = 0x80;
    values[23] = 0x0c;
    values
}

const fn circuit_pack_version(tail: [u8; 3]) -> [u8; 23] {
    let mut values = [0x00; 23];
    let mut i = 0;
    while i < SPACES.len() {
        values[i] = SPACES[i];
        i += 1;
    }
    values[20] = tail[0];
    values[21] = tail[1];
    values[22] = tail[2];
    values
}

const fn circuit_pack_version_ext(tail: [u8; 4]) -> [u8; 24] {
    let mut values = [0x00; 24];
    let mut i = 0;
    while i < SPACES.len() {
        values[i] = SPACES[i];
        i += 1;
    }
    values[20] = tail[0];
    values[21] = tail[1];
    values[22] = tail[2];
    values[23] = tail[3];
    values
}

const CIRCUIT_PACKS: [EntityDescriptor; 8] = [
    EntityDescriptor::fixed("circuit pack (ethernet) type", OmciClass::CIRCUIT_PACK, 0x0101, 0xf000)
        .values(&CIRCUIT_PACK_VALUES_ETH),
    EntityDescriptor::fixed("circuit pack (ethernet) vendor", OmciClass::CIRCUIT_PACK, 0x0101, 0x0f00)
        .values(b"BRCM"),
    EntityDescriptor::fixed("circuit pack (ethernet) version", OmciClass::CIRCUIT_PACK, 0x0101, 0x00f8)
        .values(&CIRCUIT_PACK_VERSION_ETH),
    EntityDescriptor::fixed("circuit pack (ethernet) power", OmciClass::CIRCUIT_PACK, 0x0101, 0x0004),
    EntityDescriptor::fixed("circuit pack (gpon) type", OmciClass::CIRCUIT_PACK, 0x0180, 0xf000)
        .values(&CIRCUIT_PACK_VALUES_GPON),
    EntityDescriptor::fixed("circuit pack (gpon) vendor", OmciClass::CIRCUIT_PACK, 0x0180, 0x0f00)
        .values(b"BRCM"),
    EntityDescriptor::fixed("circuit pack (gpon) version", OmciClass::CIRCUIT_PACK, 0x0180, 0x00f8)
        .values(&CIRCUIT_PACK_VERSION_GPON),
    EntityDescriptor::fixed("circuit pack (gpon) power", OmciClass::CIRCUIT_PACK, 0x0180, 0x0004),
];

const PPTP: EntityDescriptor =
    EntityDescriptor::fixed("PPTP ethernet UNI", OmciClass::PPTP_ETHERNET_UNI, 0x0101, 0xfffe)
        .values(&[
            0x00, 0x2f, 0x00, 0x00, 0x00, 0x00, 0x03, 0x05, 0xee, 0x00, 0x00, 0x00, 0x02,
        ])
        .rule(InstanceRule::PostIncrement {
            counter: Counter::Pptp,
            target: StampTarget::Instance,
        });

const TCONT: EntityDescriptor = EntityDescriptor::fixed("T-CONT", OmciClass::TCONT, 0x8000, 0xe000)
    .values(&[0xff, 0xff, 0x01, 0x01])
    .rule(InstanceRule::PostIncrement {
        counter: Counter::Tcont,
        target: StampTarget::Instance,
    });

const ANI_G: EntityDescriptor = EntityDescriptor::fixed("ANI-G", OmciClass::ANI_G, 0x8001, 0xffff)
    .values(&[
        0x01, 0x00, 0x08, 0x00, 0x30, 0x00, 0x00, 0x05, 0x09, 0x00, 0x00, 0xe0, 0x54, 0xff,
        0xff, 0x00, 0x00, 0x0c, 0x63, 0x81, 0x81,
    ]);

const UNI_G: EntityDescriptor = EntityDescriptor::fixed("UNI-G", OmciClass::UNI_G, 0x0101, 0xf800)
    .rule(InstanceRule::PostIncrement {
        counter: Counter::UniG,
        target: StampTarget::Instance,
    });

// Related port attribute: two bytes each of T-CONT pointer and priority.
const QUEUE_RELATED_PORT: [usize; 2] = [10, 14];

const QUEUE_MASK_VALUES: [u8; 11] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x09,
];

const PRIORITY_QUEUES: [EntityDescriptor; 4] = [
    EntityDescriptor::fixed(
        "priority queue downstream mask",
        OmciClass::PRIORITY_QUEUE,
        0x0000,
        0x000f,
    )
    .preamble([0x00, 0x42, 0x2e, 0x0a])
    .values(&QUEUE_MASK_VALUES)
    .rule(InstanceRule::Stamped {
        counter: Counter::PriorityQueue,
        pre_increment: true,
    }),
    EntityDescriptor::fixed(
        "priority queue downstream attributes",
        OmciClass::PRIORITY_QUEUE,
        0x0000,
        0xfff0,
    )
    .preamble([0x00, 0x43, 0x2e, 0x0a])
    .values(&[
        0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x20, 0x00, 0x00, 0x01,
        0x20, 0x01, 0x00, 0x01,
    ])
    .rule(InstanceRule::SharedReference {
        counter: Counter::PriorityQueue,
        reference: Counter::Tcont,
        offsets: &QUEUE_RELATED_PORT,
        step_back: true,
    }),
    EntityDescriptor::fixed(
        "priority queue upstream mask",
        OmciClass::PRIORITY_QUEUE,
        0x8000,
        0x000f,
    )
    .preamble([0x00, 0x42, 0x2e, 0x0a])
    .values(&QUEUE_MASK_VALUES)
    .rule(InstanceRule::Stamped {
        counter: Counter::PriorityQueue,
        pre_increment: false,
    }),
    EntityDescriptor::fixed(
        "priority queue upstream attributes",
        OmciClass::PRIORITY_QUEUE,
        0x8000,
        0xfff0,
    )
    .preamble([0x00, 0x43, 0x2e, 0x0a])
    .values(&[
        0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x20, 0x00, 0x00, 0x80,
        0x20, 0x01, 0x00, 0x01,
    ])
    .rule(InstanceRule::SharedReference {
        counter: Counter::PriorityQueue,
        reference: Counter::Tcont,
        offsets: &QUEUE_RELATED_PORT,
        step_back: false,
    }),
];

const TRAFFIC_SCHEDULER: EntityDescriptor = EntityDescriptor::fixed(
    "traffic scheduler",
    OmciClass::TRAFFIC_SCHEDULER,
    0x8000,
    0xf000,
)
.preamble([0x02, 0xa4, 0x2e, 0x0a])
.values(&[0x80, 0x00, 0x00, 0x00, 0x02])
.rule(InstanceRule::PostIncrement {
    counter: Counter::Tcont,
    target: StampTarget::Value(1),
});

const ONU2_G: EntityDescriptor = EntityDescriptor::fixed("ONU2-G", OmciClass::ONU2_G, 0x0000, 0x07fc)
    .preamble([0x00, 0x16, 0x2e, 0x0a])
    .values(&[
        0x00, 0x40, 0x08, 0x01, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x7f, 0x00, 0x00,
        0x3f, 0x00, 0x01,
    ]);

static CATALOGUE: Lazy<Vec<EntityDescriptor>> = Lazy::new(build);

fn build() -> Vec<EntityDescriptor> {
    let mut entries = vec![ONU_DATA];
    entries.extend_from_slice(&CIRCUIT_PACKS);
    entries.extend(std::iter::repeat(PPTP).take(PPTP_COUNT));
    entries.extend(std::iter::repeat(TCONT).take(TCONT_COUNT));
    entries.push(ANI_G);
    entries.extend(std::iter::repeat(UNI_G).take(UNI_G_COUNT));
    for _ in 0..PRIORITY_QUEUE_GROUPS {
        entries.extend_from_slice(&PRIORITY_QUEUES);
    }
    entries.extend(std::iter::repeat(TRAFFIC_SCHEDULER).take(TRAFFIC_SCHEDULER_COUNT));
    entries.push(ONU2_G);
    entries
}

/// The full MIB upload catalogue, in upload order.
pub fn catalogue() -> &'static [EntityDescriptor] {
    &CATALOGUE
}
