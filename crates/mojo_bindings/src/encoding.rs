//! Mojo message encoder
//!
//! One [`EncoderState`] owns the growable buffer and the handle table for a
//! message. [`Encoder`] values are cursors into that state: each holds a base
//! offset and a mutable borrow of the state. Nested structs, arrays, maps and
//! union pointers get their own `Encoder` whose base is the start of the
//! region they just claimed.
//!
//! # Layout rules
//!
//! - Claims are rounded up to 8 bytes and always start at the current end of
//!   claimed data, so the layout is fixed by the order of encode calls.
//! - Pointers are 8-byte relative displacements from the pointer field to the
//!   pointed-to section; 0 means null.
//! - Handles are 4-byte indices into the message's handle list; -1 means no
//!   handle.

use crate::{
    helper::{
        self, ArrayNullability, ENCODED_INVALID_HANDLE_VALUE, MAP_STRUCT_HEADER, POINTER_SIZE,
        SERIALIZED_HANDLE_SIZE, SERIALIZED_INTERFACE_SIZE, UNION_SIZE,
    },
    AssociatedInterfaceNotSupported, AssociatedInterfaceRequestNotSupported, DataHeader,
    EncodeError, EncoderConfig, Interface, InterfaceManager, InterfaceRequest, Message, Result,
    Struct, Union,
};
use mojo_system::{AsRawHandle, Core, Handle};
use std::fmt;
use std::sync::Arc;

/// Fixed-width scalar that can be laid out in an array
pub trait ArrayElement: Copy + Default {
    /// Encoded width in bytes
    const SIZE: usize;

    /// Write the little-endian encoding into `out` (exactly `SIZE` bytes)
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_array_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ArrayElement for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn write_le(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_array_element!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Buffer and handle table shared by every [`Encoder`] of one message
pub struct EncoderState {
    /// Handle-pipe factory, needed only for live interface implementations
    core: Option<Arc<dyn Core>>,
    /// Backing storage; its length is the current capacity
    buffer: Vec<u8>,
    /// Handles in encoding order
    handles: Vec<Handle>,
    /// End of all claimed data
    data_end: usize,
    config: EncoderConfig,
}

impl EncoderState {
    /// Create a state with the standard configuration
    ///
    /// `size_hint` is the initial capacity; 0 selects the default of 1KB.
    pub fn new(core: Option<Arc<dyn Core>>, size_hint: usize) -> Self {
        Self::with_config(core, EncoderConfig::standard().with_initial_buffer_size(size_hint))
    }

    /// Create a state from an explicit configuration
    pub fn with_config(core: Option<Arc<dyn Core>>, config: EncoderConfig) -> Self {
        Self {
            core,
            buffer: vec![0; config.effective_buffer_size()],
            handles: Vec::new(),
            data_end: 0,
            config,
        }
    }

    /// An encoder positioned at the current end of claimed data
    pub fn encoder(&mut self) -> Encoder<'_> {
        let base_offset = self.data_end;
        Encoder {
            state: self,
            base_offset,
        }
    }

    /// End of all claimed data
    pub fn data_end(&self) -> usize {
        self.data_end
    }

    /// Current buffer capacity
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of handles collected so far
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    /// Configuration this state was built with
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Finish encoding: keep `[0, data_end)` and the collected handles
    pub fn into_message(self) -> Result<Message> {
        let Self {
            mut buffer,
            handles,
            data_end,
            config,
            ..
        } = self;

        if let Some(max) = config.max_message_size {
            if data_end > max {
                return Err(EncodeError::MessageTooLarge { size: data_end, max });
            }
        }

        buffer.truncate(data_end);
        Ok(Message::new(buffer, handles))
    }

    /// Advance the end of claimed data by an already aligned `size`
    fn claim_memory(&mut self, size: usize) {
        debug_assert_eq!(size % helper::ALIGNMENT, 0);
        self.data_end += size;
        self.grow_if_needed();
    }

    fn grow_if_needed(&mut self) {
        let capacity = self.buffer.len();
        if capacity >= self.data_end {
            return;
        }

        let mut target = capacity * 2;
        while target < self.data_end {
            target *= 2;
        }
        tracing::trace!(
            "growing encoder buffer from {} to {} bytes (data_end = {})",
            capacity,
            target,
            self.data_end
        );
        // Existing bytes keep their offsets; the new tail is zeroed.
        self.buffer.resize(target, 0);
    }
}

impl fmt::Debug for EncoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderState")
            .field("has_core", &self.core.is_some())
            .field("capacity", &self.buffer.len())
            .field("data_end", &self.data_end)
            .field("handles", &self.handles.len())
            .field("config", &self.config)
            .finish()
    }
}

/// A cursor into an [`EncoderState`] at a fixed base offset
///
/// All `offset` arguments are relative to the base offset.
pub struct Encoder<'a> {
    state: &'a mut EncoderState,
    base_offset: usize,
}

impl<'a> Encoder<'a> {
    /// Absolute position of this encoder's section
    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    /// Handle-pipe factory of the underlying state
    pub fn core(&self) -> Option<&Arc<dyn Core>> {
        self.state.core.as_ref()
    }

    fn slot(&mut self, offset: usize, len: usize) -> &mut [u8] {
        let start = self.base_offset + offset;
        &mut self.state.buffer[start..start + len]
    }

    fn put<T: ArrayElement>(&mut self, value: T, offset: usize) {
        value.write_le(self.slot(offset, T::SIZE));
    }

    /// Claim `align(header.size)` bytes and write the header at this
    /// encoder's base
    pub fn encode_data_header(&mut self, header: DataHeader) {
        self.state.claim_memory(helper::align(header.size as usize));
        self.encode_u32(header.size, DataHeader::SIZE_OFFSET);
        self.encode_u32(header.elements_or_version, DataHeader::ELEMENTS_OR_VERSION_OFFSET);
    }

    /// Claim a new section at the end of claimed data and return an encoder
    /// for it, with `header` already written
    pub fn encoder_at_data_offset(&mut self, header: DataHeader) -> Encoder<'_> {
        let mut encoder = Encoder {
            base_offset: self.state.data_end,
            state: &mut *self.state,
        };
        encoder.encode_data_header(header);
        encoder
    }

    /// Write a pointer from `offset` to the next unclaimed byte
    pub fn encode_pointer_to_next_unclaimed_data(&mut self, offset: usize) {
        let field = (self.base_offset + offset) as i64;
        let target = self.state.data_end as i64;
        self.encode_i64(target - field, offset);
    }

    // Scalars

    /// Set bit `bit` of the byte at `offset` when `value` is true
    ///
    /// Never clears a bit; claimed memory starts zeroed.
    pub fn encode_bool(&mut self, value: bool, offset: usize, bit: u8) {
        debug_assert!(bit < 8);
        if value {
            self.slot(offset, 1)[0] |= 1 << bit;
        }
    }

    /// Write an i8
    pub fn encode_i8(&mut self, value: i8, offset: usize) {
        self.put(value, offset);
    }

    /// Write a u8
    pub fn encode_u8(&mut self, value: u8, offset: usize) {
        self.put(value, offset);
    }

    /// Write an i16
    pub fn encode_i16(&mut self, value: i16, offset: usize) {
        self.put(value, offset);
    }

    /// Write a u16
    pub fn encode_u16(&mut self, value: u16, offset: usize) {
        self.put(value, offset);
    }

    /// Write an i32
    pub fn encode_i32(&mut self, value: i32, offset: usize) {
        self.put(value, offset);
    }

    /// Write a u32
    pub fn encode_u32(&mut self, value: u32, offset: usize) {
        self.put(value, offset);
    }

    /// Write an i64
    pub fn encode_i64(&mut self, value: i64, offset: usize) {
        self.put(value, offset);
    }

    /// Write a u64
    pub fn encode_u64(&mut self, value: u64, offset: usize) {
        self.put(value, offset);
    }

    /// Write an f32
    pub fn encode_f32(&mut self, value: f32, offset: usize) {
        self.put(value, offset);
    }

    /// Write an f64
    pub fn encode_f64(&mut self, value: f64, offset: usize) {
        self.put(value, offset);
    }

    // Pointers

    /// Encode a struct through a pointer at `offset`
    pub fn encode_struct<S: Struct + ?Sized>(
        &mut self,
        value: Option<&mut S>,
        offset: usize,
        nullable: bool,
    ) -> Result<()> {
        match value {
            None => self.encode_null_pointer(offset, nullable),
            Some(value) => {
                self.encode_pointer_to_next_unclaimed_data(offset);
                value.encode(self)
            }
        }
    }

    /// Encode a union inline (16 bytes) at `offset`
    pub fn encode_union<U: Union + ?Sized>(
        &mut self,
        value: Option<&mut U>,
        offset: usize,
        nullable: bool,
    ) -> Result<()> {
        match value {
            None if !nullable => Err(EncodeError::NullUnion),
            None => {
                self.encode_u64(0, offset);
                self.encode_u64(0, offset + DataHeader::HEADER_SIZE);
                Ok(())
            }
            Some(value) => value.encode(self, offset),
        }
    }

    /// Encode a union out of line, through a pointer at `offset`
    ///
    /// Used for unions nested inside unions.
    pub fn encode_union_as_pointer<U: Union + ?Sized>(
        &mut self,
        value: Option<&mut U>,
        offset: usize,
        nullable: bool,
    ) -> Result<()> {
        match value {
            None => self.encode_null_pointer(offset, nullable),
            Some(value) => {
                let mut encoder = self.encoder_for_union_pointer(offset);
                value.encode(&mut encoder, 0)
            }
        }
    }

    /// Write the header of an inline union: its size and active tag
    pub fn encode_union_header(&mut self, tag: u32, offset: usize) {
        self.encode_u32(UNION_SIZE as u32, offset);
        self.encode_u32(tag, offset + DataHeader::ELEMENTS_OR_VERSION_OFFSET);
    }

    /// Encode a string as a UTF-8 byte array
    pub fn encode_string(&mut self, value: Option<&str>, offset: usize, nullable: bool) -> Result<()> {
        match value {
            None => self.encode_null_pointer(offset, nullable),
            Some(value) => {
                let nullability = if nullable {
                    ArrayNullability::ARRAY_NULLABLE
                } else {
                    ArrayNullability::NOTHING_NULLABLE
                };
                self.encode_array(Some(value.as_bytes()), offset, nullability, None)
            }
        }
    }

    // Arrays

    /// Encode an array of fixed-width scalars
    pub fn encode_array<T: ArrayElement>(
        &mut self,
        value: Option<&[T]>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };
        check_fixed_length(expected_length, values.len())?;

        let mut encoder =
            self.encoder_for_array_by_total_size(values.len() * T::SIZE, values.len(), offset)?;
        encoder.append(DataHeader::HEADER_SIZE, values);
        Ok(())
    }

    /// Encode a boolean array, packed 8 per byte, LSB first
    pub fn encode_bool_array(
        &mut self,
        value: Option<&[bool]>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };
        check_fixed_length(expected_length, values.len())?;

        let packed = pack_bits(values.iter().copied(), values.len());
        let mut encoder =
            self.encoder_for_array_by_total_size(packed.len(), values.len(), offset)?;
        encoder.append(DataHeader::HEADER_SIZE, &packed);
        Ok(())
    }

    /// Encode an array of optional scalars
    ///
    /// With `ELEMENT_NULLABLE` the layout is `[header][has-value bitfield,
    /// padded to element alignment][values, zero where absent]`. Without it
    /// every element must be present and the array is encoded like
    /// [`Encoder::encode_array`], with no bitfield.
    pub fn encode_nullable_array<T: ArrayElement>(
        &mut self,
        value: Option<&[Option<T>]>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };
        check_fixed_length(expected_length, values.len())?;
        check_element_nullability(nullability, values)?;

        let length = values.len();
        let payload: Vec<T> = values.iter().map(|&v| v.unwrap_or_default()).collect();
        if !nullability.is_element_nullable() {
            let mut encoder =
                self.encoder_for_array_by_total_size(length * T::SIZE, length, offset)?;
            encoder.append(DataHeader::HEADER_SIZE, &payload);
            return Ok(());
        }

        let bitfield_size = helper::has_value_bitfield_size(length, T::SIZE);
        let has_value = pack_bits(values.iter().map(Option::is_some), length);
        let mut encoder = self.encoder_for_array_by_total_size(
            bitfield_size + length * T::SIZE,
            length,
            offset,
        )?;
        encoder.append(DataHeader::HEADER_SIZE, &has_value);
        encoder.append(DataHeader::HEADER_SIZE + bitfield_size, &payload);
        Ok(())
    }

    /// Encode an array of optional booleans
    ///
    /// With `ELEMENT_NULLABLE` a has-value bitfield with 1-byte alignment
    /// precedes the packed values; without it the array is encoded like
    /// [`Encoder::encode_bool_array`].
    pub fn encode_nullable_bool_array(
        &mut self,
        value: Option<&[Option<bool>]>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };
        check_fixed_length(expected_length, values.len())?;
        check_element_nullability(nullability, values)?;

        let length = values.len();
        let packed = pack_bits(values.iter().map(|&v| v.unwrap_or(false)), length);
        if !nullability.is_element_nullable() {
            let mut encoder = self.encoder_for_array_by_total_size(packed.len(), length, offset)?;
            encoder.append(DataHeader::HEADER_SIZE, &packed);
            return Ok(());
        }

        let has_value = pack_bits(values.iter().map(Option::is_some), length);
        let mut encoder = self.encoder_for_array_by_total_size(
            has_value.len() + packed.len(),
            length,
            offset,
        )?;
        encoder.append(DataHeader::HEADER_SIZE, &has_value);
        encoder.append(DataHeader::HEADER_SIZE + has_value.len(), &packed);
        Ok(())
    }

    /// Encode an array of strings (an array of pointers)
    pub fn encode_string_array<S: AsRef<str>>(
        &mut self,
        value: Option<&[Option<S>]>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };

        let element_nullable = nullability.is_element_nullable();
        let mut encoder =
            self.encoder_for_array(POINTER_SIZE, values.len(), offset, expected_length)?;
        for (i, element) in values.iter().enumerate() {
            encoder.encode_string(
                element.as_ref().map(|s| s.as_ref()),
                DataHeader::HEADER_SIZE + POINTER_SIZE * i,
                element_nullable,
            )?;
        }
        Ok(())
    }

    /// Encode an array of structs (an array of pointers)
    pub fn encode_struct_array<S: Struct>(
        &mut self,
        value: Option<&mut [Option<S>]>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };

        let element_nullable = nullability.is_element_nullable();
        let mut encoder =
            self.encoder_for_array(POINTER_SIZE, values.len(), offset, expected_length)?;
        for (i, element) in values.iter_mut().enumerate() {
            encoder.encode_struct(
                element.as_mut(),
                DataHeader::HEADER_SIZE + POINTER_SIZE * i,
                element_nullable,
            )?;
        }
        Ok(())
    }

    /// Encode an array of inline unions, 16 bytes per element
    pub fn encode_union_array<U: Union>(
        &mut self,
        value: Option<&mut [Option<U>]>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };

        let element_nullable = nullability.is_element_nullable();
        let mut encoder =
            self.encoder_for_array(UNION_SIZE, values.len(), offset, expected_length)?;
        for (i, element) in values.iter_mut().enumerate() {
            encoder.encode_union(
                element.as_mut(),
                DataHeader::HEADER_SIZE + UNION_SIZE * i,
                element_nullable,
            )?;
        }
        Ok(())
    }

    // Handles and interfaces

    /// Move a handle into the message and write its index
    ///
    /// An invalid handle writes -1 and is only allowed when `nullable`.
    pub fn encode_handle(&mut self, handle: impl Into<Handle>, offset: usize, nullable: bool) -> Result<()> {
        let handle = handle.into();
        if !handle.is_valid() {
            return self.encode_invalid_handle(offset, nullable);
        }
        let index = self.state.handles.len();
        self.encode_i32(index as i32, offset);
        self.state.handles.push(handle);
        Ok(())
    }

    /// Encode an array of handles
    pub fn encode_handle_array<H: Into<Handle>>(
        &mut self,
        value: Option<Vec<H>>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };

        let element_nullable = nullability.is_element_nullable();
        let mut encoder =
            self.encoder_for_array(SERIALIZED_HANDLE_SIZE, values.len(), offset, expected_length)?;
        for (i, handle) in values.into_iter().enumerate() {
            encoder.encode_handle(
                handle,
                DataHeader::HEADER_SIZE + SERIALIZED_HANDLE_SIZE * i,
                element_nullable,
            )?;
        }
        Ok(())
    }

    /// Encode an interface: a handle slot followed by a 4-byte version
    ///
    /// - A proxy hands over its bound pipe and version; no pipe is created.
    /// - A local implementation is bound through `manager` to one end of a
    ///   new pipe, and the other end is encoded. This requires a `Core`.
    ///   The binding is not undone if a later field fails to encode.
    /// - `None` encodes an invalid handle and version 0.
    pub fn encode_interface<I: Interface + ?Sized>(
        &mut self,
        value: Option<Box<I>>,
        offset: usize,
        nullable: bool,
        manager: &dyn InterfaceManager<I>,
    ) -> Result<()> {
        let version_offset = offset + SERIALIZED_HANDLE_SIZE;
        let Some(mut implementation) = value else {
            self.encode_invalid_handle(offset, nullable)?;
            self.encode_u32(0, version_offset);
            return Ok(());
        };

        if let Some(handler) = implementation.proxy_handler() {
            let version = handler.version();
            let handle = handler.pass_handle();
            tracing::debug!("passing bound {} proxy handle (version {})", manager.name(), version);
            self.encode_handle(handle, offset, nullable)?;
            self.encode_u32(version, version_offset);
            return Ok(());
        }

        let Some(core) = self.state.core.as_ref() else {
            return Err(EncodeError::MissingCore);
        };
        let (local, remote) = core.create_message_pipe()?;
        tracing::debug!(
            "binding {} implementation (version {}) to a new message pipe",
            manager.name(),
            manager.version()
        );
        manager.bind(implementation, local);
        self.encode_handle(remote, offset, nullable)?;
        self.encode_u32(manager.version(), version_offset);
        Ok(())
    }

    /// Encode an array of interfaces, 8 bytes per element
    pub fn encode_interface_array<I: Interface + ?Sized>(
        &mut self,
        value: Option<Vec<Option<Box<I>>>>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
        manager: &dyn InterfaceManager<I>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };

        let element_nullable = nullability.is_element_nullable();
        let mut encoder = self.encoder_for_array(
            SERIALIZED_INTERFACE_SIZE,
            values.len(),
            offset,
            expected_length,
        )?;
        for (i, element) in values.into_iter().enumerate() {
            encoder.encode_interface(
                element,
                DataHeader::HEADER_SIZE + SERIALIZED_INTERFACE_SIZE * i,
                element_nullable,
                manager,
            )?;
        }
        Ok(())
    }

    /// Encode an interface request as its pipe handle
    pub fn encode_interface_request<I: ?Sized>(
        &mut self,
        value: Option<InterfaceRequest<I>>,
        offset: usize,
        nullable: bool,
    ) -> Result<()> {
        match value {
            None => self.encode_invalid_handle(offset, nullable),
            Some(request) => self.encode_handle(request.pass_handle(), offset, nullable),
        }
    }

    /// Encode an array of interface requests, 4 bytes per element
    pub fn encode_interface_request_array<I: ?Sized>(
        &mut self,
        value: Option<Vec<Option<InterfaceRequest<I>>>>,
        offset: usize,
        nullability: ArrayNullability,
        expected_length: Option<usize>,
    ) -> Result<()> {
        let Some(values) = value else {
            return self.encode_null_pointer(offset, nullability.is_array_nullable());
        };

        let element_nullable = nullability.is_element_nullable();
        let mut encoder =
            self.encoder_for_array(SERIALIZED_HANDLE_SIZE, values.len(), offset, expected_length)?;
        for (i, element) in values.into_iter().enumerate() {
            encoder.encode_interface_request(
                element,
                DataHeader::HEADER_SIZE + SERIALIZED_HANDLE_SIZE * i,
                element_nullable,
            )?;
        }
        Ok(())
    }

    /// Associated interfaces are not supported: nothing is written
    ///
    /// Fails with [`EncodeError::AssociatedInterface`] when the encoder is
    /// configured with `strict_associated_interfaces`.
    pub fn encode_associated_interface(
        &mut self,
        _value: Option<&AssociatedInterfaceNotSupported>,
        offset: usize,
        _nullable: bool,
    ) -> Result<()> {
        self.skip_associated("associated interface", offset)
    }

    /// Associated interface requests are not supported: nothing is written
    ///
    /// Fails with [`EncodeError::AssociatedInterface`] when the encoder is
    /// configured with `strict_associated_interfaces`.
    pub fn encode_associated_interface_request(
        &mut self,
        _value: Option<&AssociatedInterfaceRequestNotSupported>,
        offset: usize,
        _nullable: bool,
    ) -> Result<()> {
        self.skip_associated("associated interface request", offset)
    }

    // TODO: encode associated endpoints once the v2 message header and its
    // interface id table are supported.
    fn skip_associated(&mut self, kind: &str, offset: usize) -> Result<()> {
        if self.state.config.strict_associated_interfaces {
            return Err(EncodeError::AssociatedInterface);
        }
        tracing::warn!(
            "{} at offset {} is not supported and was not encoded",
            kind,
            self.base_offset + offset
        );
        Ok(())
    }

    // Sub-encoders

    /// Write a pointer at `offset` and claim an array section of
    /// `length * element_size` bytes plus header
    pub fn encoder_for_array(
        &mut self,
        element_size: usize,
        length: usize,
        offset: usize,
        expected_length: Option<usize>,
    ) -> Result<Encoder<'_>> {
        check_fixed_length(expected_length, length)?;
        let byte_size = length.checked_mul(element_size).ok_or(EncodeError::MessageTooLarge {
            size: usize::MAX,
            max: u32::MAX as usize,
        })?;
        self.encoder_for_array_by_total_size(byte_size, length, offset)
    }

    /// Write a pointer at `offset` and claim a map section
    ///
    /// The returned encoder expects the key array pointer at
    /// [`helper::MAP_KEYS_OFFSET`] and the value array pointer at
    /// [`helper::MAP_VALUES_OFFSET`].
    pub fn encoder_for_map(&mut self, offset: usize) -> Encoder<'_> {
        self.encode_pointer_to_next_unclaimed_data(offset);
        self.encoder_at_data_offset(MAP_STRUCT_HEADER)
    }

    /// Write a pointer at `offset` and claim 16 bytes for a union
    ///
    /// The union writes its own header at offset 0 of the returned encoder.
    pub fn encoder_for_union_pointer(&mut self, offset: usize) -> Encoder<'_> {
        self.encode_pointer_to_next_unclaimed_data(offset);
        let base_offset = self.state.data_end;
        self.state.claim_memory(UNION_SIZE);
        Encoder {
            state: &mut *self.state,
            base_offset,
        }
    }

    fn encoder_for_array_by_total_size(
        &mut self,
        byte_size: usize,
        length: usize,
        offset: usize,
    ) -> Result<Encoder<'_>> {
        let header = array_header(byte_size, length)?;
        self.encode_pointer_to_next_unclaimed_data(offset);
        Ok(self.encoder_at_data_offset(header))
    }

    fn append<T: ArrayElement>(&mut self, offset: usize, values: &[T]) {
        let region = self.slot(offset, values.len() * T::SIZE);
        for (chunk, value) in region.chunks_exact_mut(T::SIZE).zip(values) {
            value.write_le(chunk);
        }
    }

    fn encode_null_pointer(&mut self, offset: usize, nullable: bool) -> Result<()> {
        if !nullable {
            return Err(EncodeError::NullPointer);
        }
        self.encode_u64(0, offset);
        Ok(())
    }

    fn encode_invalid_handle(&mut self, offset: usize, nullable: bool) -> Result<()> {
        if !nullable {
            return Err(EncodeError::InvalidHandle);
        }
        self.encode_i32(ENCODED_INVALID_HANDLE_VALUE, offset);
        Ok(())
    }
}

impl fmt::Debug for Encoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoder")
            .field("base_offset", &self.base_offset)
            .field("data_end", &self.state.data_end)
            .finish()
    }
}

fn check_fixed_length(expected: Option<usize>, actual: usize) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => {
            Err(EncodeError::FixedArrayLength { expected, actual })
        }
        _ => Ok(()),
    }
}

/// Header of an array section; both header fields are 32-bit
fn array_header(byte_size: usize, length: usize) -> Result<DataHeader> {
    let max = u32::MAX as usize;
    let size = byte_size.saturating_add(DataHeader::HEADER_SIZE);
    match (u32::try_from(size), u32::try_from(length)) {
        (Ok(size), Ok(length)) => Ok(DataHeader::new(size, length)),
        _ => Err(EncodeError::MessageTooLarge { size, max }),
    }
}

fn check_element_nullability<T>(nullability: ArrayNullability, values: &[Option<T>]) -> Result<()> {
    if !nullability.is_element_nullable() && values.iter().any(Option::is_none) {
        return Err(EncodeError::NullPointer);
    }
    Ok(())
}

/// Pack booleans 8 per byte, bit `i % 8` of byte `i / 8`
fn pack_bits(bits: impl Iterator<Item = bool>, length: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; (length + 7) / 8];
    for (i, bit) in bits.enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (i % 8);
        }
    }
    bytes
}
