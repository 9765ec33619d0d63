//! Event Tracing for Windows backend.
//!
//! The conversions into the OS structures build on every host; only
//! [`EtwSink`] itself, which calls into advapi32, is Windows-only.
#![cfg_attr(not(windows), allow(dead_code))]

use crate::sink::RegHandle;
use jitetw_protocol::{EventDescriptor, EventField, ProviderId};
use windows_sys::core::GUID;
use windows_sys::Win32::System::Diagnostics::Etw::{
    EVENT_DATA_DESCRIPTOR, EVENT_DATA_DESCRIPTOR_0, EVENT_DESCRIPTOR, REGHANDLE,
};

#[cfg(windows)]
pub use self::platform::EtwSink;

/// Upper bound on fields per record (the method template has 10)
const MAX_EVENT_FIELDS: usize = 16;

const EMPTY_DATA: EVENT_DATA_DESCRIPTOR = EVENT_DATA_DESCRIPTOR {
    Ptr: 0,
    Size: 0,
    Anonymous: EVENT_DATA_DESCRIPTOR_0 { Reserved: 0 },
};

fn to_guid(id: &ProviderId) -> GUID {
    GUID {
        data1: id.data1,
        data2: id.data2,
        data3: id.data3,
        data4: id.data4,
    }
}

fn to_os_descriptor(descriptor: &EventDescriptor) -> EVENT_DESCRIPTOR {
    EVENT_DESCRIPTOR {
        Id: descriptor.id,
        Version: descriptor.version,
        Channel: descriptor.channel,
        Level: descriptor.level,
        Opcode: descriptor.opcode,
        Task: descriptor.task,
        Keyword: descriptor.keyword,
    }
}

/// `EventRegister` hands out a `u64`; the other calls take it back signed
fn to_os_handle(handle: RegHandle) -> REGHANDLE {
    handle.raw() as REGHANDLE
}

/// Data descriptors pointing at `fields`, or `None` past [`MAX_EVENT_FIELDS`].
/// The descriptors borrow the field bytes; use them before `fields` goes away.
fn to_data_descriptors(
    fields: &[EventField<'_>],
) -> Option<[EVENT_DATA_DESCRIPTOR; MAX_EVENT_FIELDS]> {
    if fields.len() > MAX_EVENT_FIELDS {
        return None;
    }
    let mut data = [EMPTY_DATA; MAX_EVENT_FIELDS];
    for (slot, field) in data.iter_mut().zip(fields) {
        slot.Ptr = field.as_ptr() as u64;
        slot.Size = field.len() as u32;
    }
    Some(data)
}

#[cfg(windows)]
mod platform {
    use super::{to_data_descriptors, to_guid, to_os_descriptor, to_os_handle};
    use crate::sink::{RegHandle, TraceSink};
    use crate::{ProviderError, Result};
    use jitetw_protocol::{EventDescriptor, EventField, ProviderId};
    use std::ffi::CString;
    use std::ptr;
    use windows_sys::Win32::Foundation::{ERROR_INVALID_PARAMETER, ERROR_SUCCESS};
    use windows_sys::Win32::System::Diagnostics::Debug::OutputDebugStringA;
    use windows_sys::Win32::System::Diagnostics::Etw::{
        EventEnabled, EventRegister, EventUnregister, EventWrite,
    };

    #[derive(Debug, Default)]
    pub struct EtwSink;

    impl EtwSink {
        pub fn new() -> Self {
            Self
        }
    }

    impl TraceSink for EtwSink {
        fn name(&self) -> &'static str {
            "etw"
        }

        fn register(&self, provider: &ProviderId) -> Result<RegHandle> {
            let guid = to_guid(provider);
            let mut handle = 0u64;
            let status = unsafe { EventRegister(&guid, None, ptr::null(), &mut handle) };
            if status != ERROR_SUCCESS {
                return Err(ProviderError::Registration { status });
            }
            Ok(RegHandle::new(handle))
        }

        fn unregister(&self, handle: RegHandle) -> Result<()> {
            let status = unsafe { EventUnregister(to_os_handle(handle)) };
            if status != ERROR_SUCCESS {
                return Err(ProviderError::Unregistration { status });
            }
            Ok(())
        }

        fn is_enabled(&self, handle: RegHandle, descriptor: &EventDescriptor) -> bool {
            let descriptor = to_os_descriptor(descriptor);
            unsafe { EventEnabled(to_os_handle(handle), &descriptor) != 0 }
        }

        fn write(
            &self,
            handle: RegHandle,
            descriptor: &EventDescriptor,
            fields: &[EventField<'_>],
        ) -> Result<()> {
            let Some(data) = to_data_descriptors(fields) else {
                return Err(ProviderError::Write {
                    event_id: descriptor.id,
                    status: ERROR_INVALID_PARAMETER,
                });
            };

            let os_descriptor = to_os_descriptor(descriptor);
            // Field bytes are borrowed for the duration of the call only
            let status = unsafe {
                EventWrite(
                    to_os_handle(handle),
                    &os_descriptor,
                    fields.len() as u32,
                    data.as_ptr(),
                )
            };
            if status != ERROR_SUCCESS {
                return Err(ProviderError::Write {
                    event_id: descriptor.id,
                    status,
                });
            }
            Ok(())
        }

        fn debug_message(&self, message: &str) {
            if let Ok(text) = CString::new(format!("{message}\n")) {
                unsafe { OutputDebugStringA(text.as_ptr() as *const u8) };
            }
        }
    }
}
