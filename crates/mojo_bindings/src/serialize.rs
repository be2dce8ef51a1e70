//! Traits implemented by generated struct and union bindings

use crate::{Encoder, EncoderConfig, EncoderState, Message, MessageHeader, Result, ServiceMessage};
use mojo_system::Core;
use std::sync::Arc;

/// A Mojo struct
///
/// Implementations claim their own data section with
/// [`Encoder::encoder_at_data_offset`] and encode fields in declaration
/// order. Handles and interfaces are moved out of `self` while encoding.
pub trait Struct {
    /// Size of this struct's data section (header included), used as the
    /// initial buffer size when serializing
    fn encoded_base_size(&self) -> usize;

    /// Encode into a new section claimed from `encoder`
    fn encode(&mut self, encoder: &mut Encoder<'_>) -> Result<()>;

    /// Encode as the root of a new message
    fn serialize(&mut self, core: Option<Arc<dyn Core>>) -> Result<Message> {
        let config = EncoderConfig::standard().with_initial_buffer_size(self.encoded_base_size());
        self.serialize_with_config(core, config)
    }

    /// Encode as the root of a new message with an explicit configuration
    fn serialize_with_config(
        &mut self,
        core: Option<Arc<dyn Core>>,
        config: EncoderConfig,
    ) -> Result<Message> {
        let mut state = EncoderState::with_config(core, config);
        self.encode(&mut state.encoder())?;
        state.into_message()
    }

    /// Encode as the payload of a message that starts with `header`
    fn serialize_with_header(
        &mut self,
        core: Option<Arc<dyn Core>>,
        header: MessageHeader,
    ) -> Result<ServiceMessage> {
        let mut state = EncoderState::new(core, header.size() + self.encoded_base_size());
        {
            let mut encoder = state.encoder();
            header.encode(&mut encoder);
            self.encode(&mut encoder)?;
        }
        Ok(ServiceMessage::new(state.into_message()?, header))
    }
}

/// A Mojo union, always 16 bytes inline: header (size, tag) then an 8-byte
/// payload slot
pub trait Union {
    /// Encode at `offset` of `encoder`
    ///
    /// Implementations write the header with
    /// [`Encoder::encode_union_header`] and the active field at `offset + 8`.
    /// A union-typed field goes through [`Encoder::encode_union_as_pointer`].
    fn encode(&mut self, encoder: &mut Encoder<'_>, offset: usize) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::{DataHeader, EncodeError, MessageFlags};
    use mojo_system::{AsRawHandle, LocalCore, MessagePipeHandle};

    fn record() -> (Record, MessagePipeHandle) {
        let (pipe, peer) = LocalCore::new().create_message_pipe().unwrap();
        let record = Record {
            flag: true,
            other: false,
            count: 42,
            name: "mojo".to_string(),
            origin: Some(Point { x: 3, y: 4 }),
            data: vec![1, 2, 3],
            shape: Some(Shape::Label("x".to_string())),
            pipe,
        };
        (record, peer)
    }

    #[test]
    fn test_point_serializes_to_its_base_size() {
        let message = Point { x: 1, y: -1 }.serialize(None).unwrap();
        assert_eq!(message.data().len(), Point::ENCODED_SIZE);
        assert_eq!(Point::read(message.data(), 0), Point { x: 1, y: -1 });
        assert!(message.handles().is_empty());
    }

    #[test]
    fn test_record_layout() {
        let (mut record, _peer) = record();
        let raw = record.pipe.raw_handle();
        let message = record.serialize(None).unwrap();
        let bytes = message.data();

        assert_eq!(read_header(bytes, 0), DataHeader::new(64, 0));
        assert_eq!(read_u8(bytes, 8), 0b01);
        assert_eq!(read_i32(bytes, 12), 42);
        assert_eq!(read_string(bytes, 16).as_deref(), Some("mojo"));

        let origin = follow_pointer(bytes, 24).unwrap();
        assert_eq!(origin, 80);
        assert_eq!(Point::read(bytes, origin), Point { x: 3, y: 4 });

        let data = follow_pointer(bytes, 32).unwrap();
        assert_eq!(read_header(bytes, data), DataHeader::new(11, 3));
        assert_eq!(&bytes[data + 8..data + 11], &[1, 2, 3]);

        assert_eq!(read_u32(bytes, 40), 16);
        assert_eq!(read_u32(bytes, 44), Shape::TAG_LABEL);
        assert_eq!(read_string(bytes, 48).as_deref(), Some("x"));

        assert_eq!(read_i32(bytes, 56), 0);
        assert_eq!(message.handles()[0].raw_handle(), raw);
        assert!(!record.pipe.is_valid());
        assert_eq!(bytes.len(), 128);
    }

    #[test]
    fn test_record_optional_fields() {
        let mut record = Record {
            shape: Some(Shape::Radius(2)),
            ..Record::default()
        };
        let message = record.serialize(None).unwrap();
        let bytes = message.data();

        assert_eq!(read_u8(bytes, 8), 0);
        assert_eq!(follow_pointer(bytes, 24), None);
        assert_eq!(read_string(bytes, 16).as_deref(), Some(""));
        assert_eq!(read_i32(bytes, 56), -1);
        assert!(message.handles().is_empty());
    }

    #[test]
    fn test_missing_union_fails() {
        let mut record = Record::default();
        assert_eq!(record.serialize(None).unwrap_err(), EncodeError::NullUnion);
    }

    #[test]
    fn test_serialize_with_header() {
        let header = MessageHeader::with_request_id(9, MessageFlags::EXPECTS_RESPONSE, 77);
        let service = Point { x: 5, y: 6 }.serialize_with_header(None, header).unwrap();

        assert_eq!(service.header(), &header);
        assert_eq!(service.message().data().len(), 32 + Point::ENCODED_SIZE);
        assert_eq!(read_u32(service.message().data(), 12), 9);
        assert_eq!(read_u64(service.message().data(), 24), 77);

        let payload = service.payload();
        assert_eq!(read_header(payload, 0), DataHeader::new(16, 0));
        assert_eq!(Point::read(payload, 0), Point { x: 5, y: 6 });
    }

    #[test]
    fn test_serialize_with_config() {
        let config = EncoderConfig::standard().with_max_message_size(64);
        let (mut record, _peer) = record();
        assert_eq!(
            record.serialize_with_config(None, config).unwrap_err(),
            EncodeError::MessageTooLarge { size: 128, max: 64 }
        );
    }

    #[test]
    fn test_message_write_to_pipe() {
        let (sender, receiver) = LocalCore::new().create_message_pipe().unwrap();
        let (mut record, _peer) = record();
        let message = record.serialize(None).unwrap();
        let expected = message.data().to_vec();

        message.write_to(&sender).unwrap();
        let (bytes, handles) = receiver.read().unwrap();
        assert_eq!(bytes, expected);
        assert_eq!(handles.len(), 1);
    }
}
