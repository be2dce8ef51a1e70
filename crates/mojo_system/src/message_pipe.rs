//! Mojo message pipes

use crate::{sys, AsRawHandle, Handle, HandleSignals, RawHandle, Status};

/// A message pipe endpoint
///
/// Message pipes are bidirectional, message-oriented IPC primitives. Each
/// message carries bytes plus a list of handles whose ownership moves to
/// the reader.
#[derive(Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct MessagePipeHandle(Handle);

/// A message taken off a pipe
pub type ReadMessage = (Vec<u8>, Vec<Handle>);

impl MessagePipeHandle {
    /// Write a message to the pipe
    ///
    /// Ownership of `handles` moves into the message. If the write fails the
    /// handles are closed.
    pub fn write(&self, bytes: &[u8], handles: Vec<Handle>) -> crate::Result<()> {
        if !self.is_valid() {
            return Err(Status::INVALID_ARGUMENT);
        }
        sys::message_pipe_write(self.0.raw_handle(), bytes, handles)
    }

    /// Read the next message from the pipe
    pub fn read(&self) -> crate::Result<ReadMessage> {
        if !self.is_valid() {
            return Err(Status::INVALID_ARGUMENT);
        }
        sys::message_pipe_read(self.0.raw_handle())
    }

    /// Read a message, returning Ok(None) if the pipe is empty
    pub fn read_opt(&self) -> crate::Result<Option<ReadMessage>> {
        match self.read() {
            Ok(message) => Ok(Some(message)),
            Err(Status::SHOULD_WAIT) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Current readiness of this endpoint
    pub fn query_signals(&self) -> crate::Result<HandleSignals> {
        if !self.is_valid() {
            return Err(Status::INVALID_ARGUMENT);
        }
        sys::query_signals(self.0.raw_handle())
    }

    /// Check if the peer endpoint has been closed
    pub fn is_peer_closed(&self) -> bool {
        self.query_signals()
            .map(|signals| signals.contains(HandleSignals::PEER_CLOSED))
            .unwrap_or(true)
    }

    /// Replace this endpoint with an invalid one, returning the old value
    pub fn take(&mut self) -> MessagePipeHandle {
        MessagePipeHandle(self.0.take())
    }
}

impl AsRawHandle for MessagePipeHandle {
    fn raw_handle(&self) -> RawHandle {
        self.0.raw_handle()
    }
}

impl From<Handle> for MessagePipeHandle {
    fn from(handle: Handle) -> Self {
        MessagePipeHandle(handle)
    }
}

impl From<MessagePipeHandle> for Handle {
    fn from(pipe: MessagePipeHandle) -> Self {
        pipe.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe() -> (MessagePipeHandle, MessagePipeHandle) {
        let (h0, h1) = sys::message_pipe_create().unwrap();
        (h0.into(), h1.into())
    }

    #[test]
    fn test_write_then_read() {
        let (a, b) = pipe();
        a.write(b"hello", Vec::new()).unwrap();
        assert!(b.query_signals().unwrap().contains(HandleSignals::READABLE));

        let (bytes, handles) = b.read().unwrap();
        assert_eq!(bytes, b"hello");
        assert!(handles.is_empty());
        assert_eq!(b.read_opt().unwrap(), None);
    }

    #[test]
    fn test_handles_move_with_message() {
        let (a, b) = pipe();
        let (c, d) = pipe();
        let raw = c.raw_handle();

        a.write(&[1, 2, 3], vec![c.into()]).unwrap();
        let (_, handles) = b.read().unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].raw_handle(), raw);

        // The transferred endpoint still talks to its peer.
        let c: MessagePipeHandle = handles.into_iter().next().unwrap().into();
        c.write(b"x", Vec::new()).unwrap();
        assert_eq!(d.read().unwrap().0, b"x");
    }

    #[test]
    fn test_cannot_send_own_handle() {
        let (mut a, _b) = pipe();
        let own = a.take();
        let result = own.write(&[], vec![unsafe { Handle::from_raw(own.raw_handle()) }]);
        assert_eq!(result, Err(Status::INVALID_ARGUMENT));
        // The failed write closed the raw handle; forget the wrapper so it is not closed twice.
        std::mem::forget(own);
    }

    #[test]
    fn test_peer_closed() {
        let (a, b) = pipe();
        drop(b);
        assert!(a.is_peer_closed());
        assert_eq!(a.write(b"x", Vec::new()), Err(Status::FAILED_PRECONDITION));
        assert_eq!(a.read().unwrap_err(), Status::FAILED_PRECONDITION);
    }

    #[test]
    fn test_closing_reader_releases_queued_handles() {
        let (a, b) = pipe();
        let (c, d) = pipe();
        a.write(&[], vec![c.into()]).unwrap();
        drop(b);
        assert!(d.is_peer_closed());
    }

    #[test]
    fn test_invalid_endpoint() {
        let pipe = MessagePipeHandle::default();
        assert_eq!(pipe.write(&[], Vec::new()), Err(Status::INVALID_ARGUMENT));
        assert_eq!(pipe.read().unwrap_err(), Status::INVALID_ARGUMENT);
    }
}
