//! Positional event records.
//!
//! A record is written as an ordered list of [`EventField`]s, each pointing at
//! the bytes of one template field. Consumers parse by position, so `fields()`
//! and `from_fields()` must agree with [`crate::template`] exactly.

use crate::error::{ProtocolError, Result};
use crate::template::InType;
use crate::wide::WideString;
use crate::EventKind;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// One field of an event record: a borrowed `{pointer, size}` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventField<'a> {
    bytes: &'a [u8],
}

impl<'a> EventField<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Field referencing the in-memory bytes of a scalar
    pub fn of<T: IntoBytes + Immutable + ?Sized>(value: &'a T) -> Self {
        Self {
            bytes: value.as_bytes(),
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for EventField<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

/// Check field count and fixed widths against the template of `kind`
pub fn validate_fields<B: AsRef<[u8]>>(kind: EventKind, fields: &[B]) -> Result<()> {
    let template = kind.template();
    if fields.len() != template.len() {
        return Err(ProtocolError::FieldCount {
            kind,
            expected: template.len(),
            actual: fields.len(),
        });
    }

    for (spec, field) in template.iter().zip(fields) {
        let actual = field.as_ref().len();
        match spec.in_type.fixed_size() {
            Some(expected) if expected != actual => {
                return Err(ProtocolError::FieldSize {
                    kind,
                    name: spec.name,
                    expected,
                    actual,
                });
            }
            Some(_) => {}
            None => {
                debug_assert_eq!(spec.in_type, InType::UnicodeString);
                if WideString::from_wire(field.as_ref()).is_none() {
                    return Err(ProtocolError::Unterminated {
                        kind,
                        name: spec.name,
                    });
                }
            }
        }
    }
    Ok(())
}

fn read<T: FromBytes>(bytes: &[u8]) -> T {
    // Widths were checked by validate_fields
    T::read_from_bytes(bytes).unwrap_or_else(|_| T::new_zeroed())
}

fn read_text<B: AsRef<[u8]>>(field: &B) -> WideString {
    WideString::from_wire(field.as_ref()).unwrap_or_else(|| WideString::from_text(""))
}

/// `MethodLoadUnload` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRecord {
    pub script_context_id: usize,
    pub start_address: usize,
    pub size: u64,
    pub method_id: u32,
    pub method_flags: u16,
    pub address_range_id: u16,
    pub source_id: u64,
    pub line: u32,
    pub column: u32,
    pub name: WideString,
}

impl MethodRecord {
    pub const FIELD_COUNT: usize = 10;

    pub fn fields(&self) -> [EventField<'_>; Self::FIELD_COUNT] {
        [
            EventField::of(&self.script_context_id),
            EventField::of(&self.start_address),
            EventField::of(&self.size),
            EventField::of(&self.method_id),
            EventField::of(&self.method_flags),
            EventField::of(&self.address_range_id),
            EventField::of(&self.source_id),
            EventField::of(&self.line),
            EventField::of(&self.column),
            EventField::new(self.name.as_bytes()),
        ]
    }

    pub fn from_fields<B: AsRef<[u8]>>(fields: &[B]) -> Result<Self> {
        validate_fields(EventKind::MethodLoad, fields)?;
        Ok(Self {
            script_context_id: read(fields[0].as_ref()),
            start_address: read(fields[1].as_ref()),
            size: read(fields[2].as_ref()),
            method_id: read(fields[3].as_ref()),
            method_flags: read(fields[4].as_ref()),
            address_range_id: read(fields[5].as_ref()),
            source_id: read(fields[6].as_ref()),
            line: read(fields[7].as_ref()),
            column: read(fields[8].as_ref()),
            name: read_text(&fields[9]),
        })
    }
}

/// `SourceLoadUnload` record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub source_id: u64,
    pub script_context_id: usize,
    pub source_flags: u32,
    pub url: WideString,
}

impl SourceRecord {
    pub const FIELD_COUNT: usize = 4;

    pub fn fields(&self) -> [EventField<'_>; Self::FIELD_COUNT] {
        [
            EventField::of(&self.source_id),
            EventField::of(&self.script_context_id),
            EventField::of(&self.source_flags),
            EventField::new(self.url.as_bytes()),
        ]
    }

    pub fn from_fields<B: AsRef<[u8]>>(fields: &[B]) -> Result<Self> {
        validate_fields(EventKind::SourceLoad, fields)?;
        Ok(Self {
            source_id: read(fields[0].as_ref()),
            script_context_id: read(fields[1].as_ref()),
            source_flags: read(fields[2].as_ref()),
            url: read_text(&fields[3]),
        })
    }
}
