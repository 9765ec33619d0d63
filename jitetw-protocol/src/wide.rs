//! UTF-8 to null-terminated UTF-16 transcoding for `UnicodeString` fields.

use zerocopy::IntoBytes;

/// Method name buffer capacity in UTF-16 code units, terminator included
pub const NAME_BUFFER_UNITS: usize = 512;
/// Longest method name written before truncation
pub const MAX_NAME_UNITS: usize = NAME_BUFFER_UNITS - 1;
/// Written in place of a missing method name
pub const UNKNOWN_NAME: &str = "[unknown]";

/// Null-terminated UTF-16 text ready to be referenced by an event field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideString {
    // Always ends with a single 0 unit
    units: Vec<u16>,
    truncated: bool,
}

impl WideString {
    /// Encode `text` in full
    pub fn from_text(text: &str) -> Self {
        let mut units: Vec<u16> = text.encode_utf16().collect();
        units.push(0);
        Self {
            units,
            truncated: false,
        }
    }

    /// Encode UTF-8 `bytes`, keeping at most `max_units` code units.
    ///
    /// Invalid sequences become U+FFFD. The cut never splits a surrogate
    /// pair, so a truncated result may hold one unit less than `max_units`.
    pub fn from_utf8_bounded(bytes: &[u8], max_units: usize) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let mut units = Vec::with_capacity(text.len().min(max_units) + 1);
        let mut truncated = false;
        let mut pair = [0u16; 2];

        for c in text.chars() {
            let encoded = c.encode_utf16(&mut pair);
            if units.len() + encoded.len() > max_units {
                truncated = true;
                break;
            }
            units.extend_from_slice(encoded);
        }
        units.push(0);

        Self { units, truncated }
    }

    /// Method name policy: bounded to [`MAX_NAME_UNITS`], placeholder when
    /// the engine passed no name
    pub fn method_name(name: Option<&[u8]>) -> Self {
        match name {
            Some(bytes) if !bytes.is_empty() => Self::from_utf8_bounded(bytes, MAX_NAME_UNITS),
            _ => Self::from_text(UNKNOWN_NAME),
        }
    }

    /// Parse a `UnicodeString` field payload (terminator required)
    pub fn from_wire(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 2 || bytes.len() % 2 != 0 {
            return None;
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
            .collect();
        if units.last() != Some(&0) {
            return None;
        }
        Some(Self {
            units,
            truncated: false,
        })
    }

    /// Code units without the terminator
    pub fn units(&self) -> &[u16] {
        &self.units[..self.units.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.units.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Wire bytes, terminator included
    pub fn as_bytes(&self) -> &[u8] {
        self.units.as_slice().as_bytes()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.units())
    }
}

impl std::fmt::Display for WideString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
