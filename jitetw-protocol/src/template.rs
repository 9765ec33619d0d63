//! Field templates from the Chakra instrumentation manifest.
//!
//! Consumers decode records positionally, so the order and in-types here are
//! part of the wire contract.

/// Manifest in-type of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InType {
    Pointer,
    UInt16,
    UInt32,
    UInt64,
    /// Null-terminated UTF-16
    UnicodeString,
}

impl InType {
    /// Byte width of fixed-size in-types; `None` for strings
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            InType::Pointer => Some(std::mem::size_of::<usize>()),
            InType::UInt16 => Some(2),
            InType::UInt32 => Some(4),
            InType::UInt64 => Some(8),
            InType::UnicodeString => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub in_type: InType,
}

const fn field(name: &'static str, in_type: InType) -> FieldSpec {
    FieldSpec { name, in_type }
}

/// `MethodLoadUnload` template
pub const METHOD_LOAD_UNLOAD: &[FieldSpec] = &[
    field("ScriptContextID", InType::Pointer),
    field("MethodStartAddress", InType::Pointer),
    field("MethodSize", InType::UInt64),
    field("MethodID", InType::UInt32),
    field("MethodFlags", InType::UInt16),
    field("MethodAddressRangeID", InType::UInt16),
    field("SourceID", InType::UInt64),
    field("Line", InType::UInt32),
    field("Column", InType::UInt32),
    field("MethodName", InType::UnicodeString),
];

/// `SourceLoadUnload` template
pub const SOURCE_LOAD_UNLOAD: &[FieldSpec] = &[
    field("SourceID", InType::UInt64),
    field("ScriptContextID", InType::Pointer),
    field("SourceFlags", InType::UInt32),
    field("Url", InType::UnicodeString),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_shapes() {
        assert_eq!(METHOD_LOAD_UNLOAD.len(), 10);
        assert_eq!(SOURCE_LOAD_UNLOAD.len(), 4);
        assert_eq!(METHOD_LOAD_UNLOAD[9].in_type, InType::UnicodeString);
        assert_eq!(SOURCE_LOAD_UNLOAD[3].in_type, InType::UnicodeString);
    }

    #[test]
    fn test_fixed_sizes() {
        let sizes: Vec<_> = METHOD_LOAD_UNLOAD
            .iter()
            .map(|f| f.in_type.fixed_size())
            .collect();
        let ptr = Some(std::mem::size_of::<usize>());
        assert_eq!(
            sizes,
            vec![
                ptr,
                ptr,
                Some(8),
                Some(4),
                Some(2),
                Some(2),
                Some(8),
                Some(4),
                Some(4),
                None
            ]
        );
    }
}
