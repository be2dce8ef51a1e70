//! Owned handles to system objects

use crate::{sys, RawHandle, HANDLE_INVALID};

/// Types backed by a single system handle
pub trait AsRawHandle {
    /// The raw value, `HANDLE_INVALID` when absent
    fn raw_handle(&self) -> RawHandle;

    /// Whether a handle is present
    fn is_valid(&self) -> bool {
        self.raw_handle() != HANDLE_INVALID
    }
}

/// An owned handle, closed when dropped
///
/// Moving a handle into a message transfers it: the message (and later the
/// reading endpoint) owns it from then on.
#[derive(Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Handle(RawHandle);

impl Handle {
    /// The absent handle
    pub const fn invalid() -> Self {
        Handle(HANDLE_INVALID)
    }

    /// Adopt a raw value
    ///
    /// # Safety
    /// `raw` must be open in the registry and owned by no other `Handle`.
    pub(crate) unsafe fn from_raw(raw: RawHandle) -> Self {
        Handle(raw)
    }

    /// Give up ownership without closing
    pub(crate) fn into_raw(self) -> RawHandle {
        let raw = self.0;
        std::mem::forget(self);
        raw
    }

    /// Move the handle out, leaving an invalid one behind
    pub fn take(&mut self) -> Handle {
        std::mem::replace(self, Handle::invalid())
    }
}

impl AsRawHandle for Handle {
    fn raw_handle(&self) -> RawHandle {
        self.0
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.is_valid() {
            sys::handle_close(self.0);
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::invalid()
    }
}
