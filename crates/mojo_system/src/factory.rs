//! Handle-pipe factory

use crate::{MessagePipeHandle, sys};

/// Entry point to the system layer
///
/// The bindings encoder holds a `Core` when it may need to create message
/// pipes, which is the case whenever a live interface implementation is
/// serialized.
pub trait Core: Send + Sync {
    /// Create a new message pipe, returning both endpoints
    fn create_message_pipe(&self) -> crate::Result<(MessagePipeHandle, MessagePipeHandle)>;
}

/// In-process implementation of [`Core`]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalCore;

impl LocalCore {
    /// Create a new in-process core
    pub fn new() -> Self {
        LocalCore
    }
}

impl Core for LocalCore {
    fn create_message_pipe(&self) -> crate::Result<(MessagePipeHandle, MessagePipeHandle)> {
        let (h0, h1) = sys::message_pipe_create()?;
        Ok((h0.into(), h1.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AsRawHandle;

    #[test]
    fn test_pipes_are_distinct() {
        let core = LocalCore::new();
        let (a, b) = core.create_message_pipe().unwrap();
        let (c, d) = core.create_message_pipe().unwrap();
        assert!(a.is_valid() && b.is_valid());
        let raws = [a.raw_handle(), b.raw_handle(), c.raw_handle(), d.raw_handle()];
        for (i, x) in raws.iter().enumerate() {
            for y in &raws[i + 1..] {
                assert_ne!(x, y);
            }
        }
    }
}
