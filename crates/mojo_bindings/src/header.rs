//! Data headers and the Mojo message header

use crate::Encoder;
use bitflags::bitflags;

/// The 8-byte prefix of every struct, array, union and map data section
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DataHeader {
    /// Total byte length of the section, header included (not rounded)
    pub size: u32,
    /// Element count for arrays, version for structs
    pub elements_or_version: u32,
}

impl DataHeader {
    /// Header size in bytes
    pub const HEADER_SIZE: usize = 8;

    /// Offset of the size field
    pub const SIZE_OFFSET: usize = 0;

    /// Offset of the elements-or-version field
    pub const ELEMENTS_OR_VERSION_OFFSET: usize = 4;

    /// Create a new header
    pub const fn new(size: u32, elements_or_version: u32) -> Self {
        Self { size, elements_or_version }
    }
}

/// Method ordinal (identifies which method is being called)
pub type Ordinal = u32;

/// Request ID (pairs a response with its request)
pub type RequestId = u64;

bitflags! {
    /// Flags in the message header
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MessageFlags: u32 {
        /// No flags set
        const NONE = 0;
        /// The sender waits for a response carrying the same request id
        const EXPECTS_RESPONSE = 1 << 0;
        /// This message answers a request
        const IS_RESPONSE = 1 << 1;
        /// The sender blocks until the response arrives
        const IS_SYNC = 1 << 2;
    }
}

/// Mojo message header
///
/// Encoded as a struct-shaped section at the start of a message:
///
/// ```text
/// ┌────────────┬────────────┬──────────────┬─────────┬──────────┬──────────┬───────────────┐
/// │ size(4)    │ version(4) │ interface(4) │ type(4) │ flags(4) │ pad(4)   │ request_id(8) │
/// └────────────┴────────────┴──────────────┴─────────┴──────────┴──────────┴───────────────┘
/// ```
///
/// The request id is only present (version 1, 32 bytes) when the message
/// expects or is a response; otherwise the header is version 0, 24 bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// Target interface id (0 for the primary interface of a pipe)
    pub interface_id: u32,
    /// Method ordinal
    pub ordinal: Ordinal,
    /// Message flags
    pub flags: MessageFlags,
    /// Request id, meaningful only when [`MessageHeader::has_request_id`]
    pub request_id: RequestId,
}

impl MessageHeader {
    /// Size of a header without request id
    pub const SIMPLE_MESSAGE_SIZE: usize = 24;

    /// Size of a header with request id
    pub const MESSAGE_WITH_REQUEST_ID_SIZE: usize = 32;

    const SIMPLE_MESSAGE_VERSION: u32 = 0;
    const MESSAGE_WITH_REQUEST_ID_VERSION: u32 = 1;

    const INTERFACE_ID_OFFSET: usize = 8;
    const TYPE_OFFSET: usize = 12;
    const FLAGS_OFFSET: usize = 16;
    const REQUEST_ID_OFFSET: usize = 24;

    /// Create a header for a one-way message
    pub fn new(ordinal: Ordinal) -> Self {
        Self {
            interface_id: 0,
            ordinal,
            flags: MessageFlags::NONE,
            request_id: 0,
        }
    }

    /// Create a header carrying a request id
    pub fn with_request_id(ordinal: Ordinal, flags: MessageFlags, request_id: RequestId) -> Self {
        Self {
            interface_id: 0,
            ordinal,
            flags,
            request_id,
        }
    }

    /// Set the target interface id
    pub fn with_interface_id(mut self, interface_id: u32) -> Self {
        self.interface_id = interface_id;
        self
    }

    /// Whether the encoded header carries a request id
    pub fn has_request_id(&self) -> bool {
        self.flags
            .intersects(MessageFlags::EXPECTS_RESPONSE | MessageFlags::IS_RESPONSE)
    }

    /// Check a flag
    pub fn has_flag(&self, flag: MessageFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Encoded size in bytes
    pub fn size(&self) -> usize {
        if self.has_request_id() {
            Self::MESSAGE_WITH_REQUEST_ID_SIZE
        } else {
            Self::SIMPLE_MESSAGE_SIZE
        }
    }

    fn data_header(&self) -> DataHeader {
        if self.has_request_id() {
            DataHeader::new(
                Self::MESSAGE_WITH_REQUEST_ID_SIZE as u32,
                Self::MESSAGE_WITH_REQUEST_ID_VERSION,
            )
        } else {
            DataHeader::new(Self::SIMPLE_MESSAGE_SIZE as u32, Self::SIMPLE_MESSAGE_VERSION)
        }
    }

    /// Encode the header at the encoder's base offset, claiming its bytes
    pub fn encode(&self, encoder: &mut Encoder<'_>) {
        encoder.encode_data_header(self.data_header());
        encoder.encode_u32(self.interface_id, Self::INTERFACE_ID_OFFSET);
        encoder.encode_u32(self.ordinal, Self::TYPE_OFFSET);
        encoder.encode_u32(self.flags.bits(), Self::FLAGS_OFFSET);
        if self.has_request_id() {
            encoder.encode_u64(self.request_id, Self::REQUEST_ID_OFFSET);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::read_u32;
    use crate::EncoderState;

    fn encode(header: MessageHeader) -> Vec<u8> {
        let mut state = EncoderState::new(None, 0);
        header.encode(&mut state.encoder());
        state.into_message().unwrap().into_parts().0
    }

    #[test]
    fn test_simple_header_layout() {
        let bytes = encode(MessageHeader::new(0x1234).with_interface_id(7));
        assert_eq!(bytes.len(), MessageHeader::SIMPLE_MESSAGE_SIZE);
        assert_eq!(read_u32(&bytes, 0), 24);
        assert_eq!(read_u32(&bytes, 4), 0);
        assert_eq!(read_u32(&bytes, 8), 7);
        assert_eq!(read_u32(&bytes, 12), 0x1234);
        assert_eq!(read_u32(&bytes, 16), 0);
    }

    #[test]
    fn test_request_header_layout() {
        let header = MessageHeader::with_request_id(
            3,
            MessageFlags::EXPECTS_RESPONSE | MessageFlags::IS_SYNC,
            0x0102_0304_0506_0708,
        );
        assert!(header.has_request_id());
        assert!(header.has_flag(MessageFlags::IS_SYNC));

        let bytes = encode(header);
        assert_eq!(bytes.len(), MessageHeader::MESSAGE_WITH_REQUEST_ID_SIZE);
        assert_eq!(read_u32(&bytes, 0), 32);
        assert_eq!(read_u32(&bytes, 4), 1);
        assert_eq!(read_u32(&bytes, 16), 0b101);
        assert_eq!(&bytes[24..32], &0x0102_0304_0506_0708u64.to_le_bytes());
    }

    #[test]
    fn test_sync_alone_has_no_request_id() {
        let header = MessageHeader::with_request_id(1, MessageFlags::IS_SYNC, 9);
        assert!(!header.has_request_id());
        assert_eq!(header.size(), MessageHeader::SIMPLE_MESSAGE_SIZE);
    }
}
