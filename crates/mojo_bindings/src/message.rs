//! Encoded messages

use crate::{MessageHeader, Result};
use mojo_system::{Handle, MessagePipeHandle};

/// Bytes and handles produced by one encoding pass
#[derive(Debug)]
pub struct Message {
    data: Vec<u8>,
    handles: Vec<Handle>,
}

impl Message {
    pub(crate) fn new(data: Vec<u8>, handles: Vec<Handle>) -> Self {
        Self { data, handles }
    }

    /// Encoded bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Handles, in the order their indices were written
    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    /// Split into bytes and handles
    pub fn into_parts(self) -> (Vec<u8>, Vec<Handle>) {
        (self.data, self.handles)
    }

    /// Send the message over `pipe`, moving its handles to the peer
    pub fn write_to(self, pipe: &MessagePipeHandle) -> Result<()> {
        pipe.write(&self.data, self.handles)?;
        Ok(())
    }
}

/// A message that starts with a [`MessageHeader`]
#[derive(Debug)]
pub struct ServiceMessage {
    message: Message,
    header: MessageHeader,
}

impl ServiceMessage {
    pub(crate) fn new(message: Message, header: MessageHeader) -> Self {
        Self { message, header }
    }

    /// The header this message was encoded with
    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// The whole message, header included
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Bytes following the header
    pub fn payload(&self) -> &[u8] {
        &self.message.data()[self.header.size()..]
    }

    /// Drop the header view
    pub fn into_message(self) -> Message {
        self.message
    }
}
