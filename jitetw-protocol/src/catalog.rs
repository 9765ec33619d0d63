use crate::template::{FieldSpec, METHOD_LOAD_UNLOAD, SOURCE_LOAD_UNLOAD};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Provider GUID, laid out like the OS `GUID` structure
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, KnownLayout, Immutable,
)]
pub struct ProviderId {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl ProviderId {
    /// Build a provider id from its 128-bit big-endian value, e.g.
    /// `0x57277741_3638_4A4B_BDBA_0AC6E45DA56C`
    pub const fn from_u128(value: u128) -> Self {
        Self {
            data1: (value >> 96) as u32,
            data2: ((value >> 80) & 0xffff) as u16,
            data3: ((value >> 64) & 0xffff) as u16,
            data4: (value as u64).to_be_bytes(),
        }
    }

    pub const fn to_u128(&self) -> u128 {
        ((self.data1 as u128) << 96)
            | ((self.data2 as u128) << 80)
            | ((self.data3 as u128) << 64)
            | u64::from_be_bytes(self.data4) as u128
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

/// JScript9 runtime provider, as declared by the
/// Microsoft-Scripting-Chakra-Instrumentation manifest.
/// Profilers key their JS symbol resolution on this exact value.
pub const JSCRIPT_PROVIDER_ID: ProviderId =
    ProviderId::from_u128(0x57277741_3638_4A4B_BDBA_0AC6E45DA56C);

/// Event descriptor, byte-compatible with the OS `EVENT_DESCRIPTOR`
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, KnownLayout, Immutable,
)]
pub struct EventDescriptor {
    pub id: u16,
    pub version: u8,
    pub channel: u8,
    pub level: u8,
    pub opcode: u8,
    pub task: u16,
    pub keyword: u64,
}

pub mod consts {
    pub const LEVEL_INFO: u8 = 4;

    pub const METHOD_LOAD_ID: u16 = 9;
    pub const METHOD_UNLOAD_ID: u16 = 10;
    pub const SOURCE_LOAD_ID: u16 = 41;
    pub const SOURCE_UNLOAD_ID: u16 = 42;

    pub const METHOD_LOAD_OPCODE: u8 = 10;
    pub const METHOD_UNLOAD_OPCODE: u8 = 11;
    pub const SOURCE_LOAD_OPCODE: u8 = 12;
    pub const SOURCE_UNLOAD_OPCODE: u8 = 13;

    pub const METHOD_RUNTIME_TASK: u16 = 1;
    pub const SCRIPT_CONTEXT_RUNTIME_TASK: u16 = 2;

    pub const JSCRIPT_RUNTIME_KEYWORD: u64 = 1;
}

const fn descriptor(id: u16, opcode: u8, task: u16) -> EventDescriptor {
    EventDescriptor {
        id,
        version: 0,
        channel: 0,
        level: consts::LEVEL_INFO,
        opcode,
        task,
        keyword: consts::JSCRIPT_RUNTIME_KEYWORD,
    }
}

pub const METHOD_LOAD: EventDescriptor = descriptor(
    consts::METHOD_LOAD_ID,
    consts::METHOD_LOAD_OPCODE,
    consts::METHOD_RUNTIME_TASK,
);
pub const METHOD_UNLOAD: EventDescriptor = descriptor(
    consts::METHOD_UNLOAD_ID,
    consts::METHOD_UNLOAD_OPCODE,
    consts::METHOD_RUNTIME_TASK,
);
pub const SOURCE_LOAD: EventDescriptor = descriptor(
    consts::SOURCE_LOAD_ID,
    consts::SOURCE_LOAD_OPCODE,
    consts::SCRIPT_CONTEXT_RUNTIME_TASK,
);
pub const SOURCE_UNLOAD: EventDescriptor = descriptor(
    consts::SOURCE_UNLOAD_ID,
    consts::SOURCE_UNLOAD_OPCODE,
    consts::SCRIPT_CONTEXT_RUNTIME_TASK,
);

/// The fixed set of events this provider can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MethodLoad,
    MethodUnload,
    SourceLoad,
    SourceUnload,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::MethodLoad,
        EventKind::MethodUnload,
        EventKind::SourceLoad,
        EventKind::SourceUnload,
    ];

    pub const fn descriptor(self) -> &'static EventDescriptor {
        match self {
            EventKind::MethodLoad => &METHOD_LOAD,
            EventKind::MethodUnload => &METHOD_UNLOAD,
            EventKind::SourceLoad => &SOURCE_LOAD,
            EventKind::SourceUnload => &SOURCE_UNLOAD,
        }
    }

    /// Field template shared by the load/unload pair
    pub const fn template(self) -> &'static [FieldSpec] {
        match self {
            EventKind::MethodLoad | EventKind::MethodUnload => METHOD_LOAD_UNLOAD,
            EventKind::SourceLoad | EventKind::SourceUnload => SOURCE_LOAD_UNLOAD,
        }
    }

    pub fn from_event_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.descriptor().id == id)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::MethodLoad => write!(f, "MethodLoad"),
            EventKind::MethodUnload => write!(f, "MethodUnload"),
            EventKind::SourceLoad => write!(f, "SourceLoad"),
            EventKind::SourceUnload => write!(f, "SourceUnload"),
        }
    }
}
