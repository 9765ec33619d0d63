//! Code lifecycle notifications as delivered by the host script engine.

/// What happened to a piece of generated code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeEventKind {
    CodeAdded,
    CodeMoved,
    CodeRemoved,
    CodeStartLinePosInfoRecording,
    CodeAddLinePosInfo,
    CodeEndLinePosInfoRecording,
}

/// Kind of code the notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeCategory {
    JitCode,
    ByteCode,
    WasmCode,
}

/// One engine notification. Borrowed for the duration of the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEvent<'a> {
    pub kind: CodeEventKind,
    pub category: CodeCategory,
    /// Execution context (isolate) the code belongs to
    pub context: usize,
    /// Id of the owning script, when the engine has one
    pub script_id: Option<i64>,
    pub code_start: usize,
    pub code_len: usize,
    /// Method name bytes, UTF-8 expected
    pub name: Option<&'a [u8]>,
}

impl<'a> CodeEvent<'a> {
    /// JIT code creation event
    pub fn code_added(context: usize, code_start: usize, code_len: usize, name: &'a str) -> Self {
        Self {
            kind: CodeEventKind::CodeAdded,
            category: CodeCategory::JitCode,
            context,
            script_id: None,
            code_start,
            code_len,
            name: Some(name.as_bytes()),
        }
    }

    pub fn with_kind(mut self, kind: CodeEventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_category(mut self, category: CodeCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_script_id(mut self, script_id: i64) -> Self {
        self.script_id = Some(script_id);
        self
    }

    pub fn with_name(mut self, name: Option<&'a [u8]>) -> Self {
        self.name = name;
        self
    }

    /// Borrow an engine-owned `(pointer, length)` name.
    ///
    /// A null pointer yields `None`.
    ///
    /// # Safety
    /// A non-null `ptr` must be valid for reads of `len` bytes for `'a`.
    pub unsafe fn name_from_raw(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { std::slice::from_raw_parts(ptr, len) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let event = CodeEvent::code_added(0x10, 0x20, 30, "run")
            .with_script_id(5)
            .with_kind(CodeEventKind::CodeMoved);
        assert_eq!(event.kind, CodeEventKind::CodeMoved);
        assert_eq!(event.category, CodeCategory::JitCode);
        assert_eq!(event.script_id, Some(5));
        assert_eq!(event.name, Some(&b"run"[..]));
    }

    #[test]
    fn test_name_from_raw() {
        let bytes = b"method";
        let name = unsafe { CodeEvent::name_from_raw(bytes.as_ptr(), 3) };
        assert_eq!(name, Some(&b"met"[..]));
        assert_eq!(unsafe { CodeEvent::name_from_raw(std::ptr::null(), 12) }, None);
    }
}
