//! Mojo Bindings - Wire Format Encoding
//!
//! This crate implements the encoder half of the Mojo binary wire format used
//! for messages sent over message pipes.
//!
//! # Wire Format
//!
//! Mojo uses a binary wire format with:
//! - Little-endian byte order
//! - 8-byte alignment for every struct, array, union and map section
//! - Relative 8-byte pointers between sections (0 = null)
//! - Handles passed out-of-band, referenced by index (-1 = absent)
//!
//! # Message Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              Message Header (24 or 32 bytes)              │
//! │  ┌──────┬─────────┬──────────┬──────┬───────┬─────────┐  │
//! │  │size  │ version │ interface│ type │ flags │ req id  │  │
//! │  └──────┴─────────┴──────────┴──────┴───────┴─────────┘  │
//! ├──────────────────────────────────────────────────────────┤
//! │                    Payload struct                         │
//! │  [DataHeader][fields...] then out-of-line sections,       │
//! │  each 8-byte aligned, in encoding order                   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mojo_bindings::{DataHeader, Encoder, Result, Struct};
//!
//! struct Point { x: i32, y: i32 }
//!
//! impl Struct for Point {
//!     fn encoded_base_size(&self) -> usize { 16 }
//!
//!     fn encode(&mut self, encoder: &mut Encoder<'_>) -> Result<()> {
//!         let mut encoder0 = encoder.encoder_at_data_offset(DataHeader::new(16, 0));
//!         encoder0.encode_i32(self.x, 8);
//!         encoder0.encode_i32(self.y, 12);
//!         Ok(())
//!     }
//! }
//!
//! let message = Point { x: 1, y: 2 }.serialize(None)?;
//! ```

mod config;
mod encoding;
mod error;
mod header;
mod interface;
mod message;
mod serialize;

pub mod helper;

#[cfg(test)]
mod testing;

pub use config::{EncoderConfig, INITIAL_BUFFER_SIZE};
pub use encoding::{ArrayElement, Encoder, EncoderState};
pub use error::{EncodeError, Result};
pub use header::{DataHeader, MessageFlags, MessageHeader, Ordinal, RequestId};
pub use helper::ArrayNullability;
pub use interface::{
    AssociatedInterfaceNotSupported, AssociatedInterfaceRequestNotSupported, Interface,
    InterfaceManager, InterfaceRequest, ProxyHandler,
};
pub use message::{Message, ServiceMessage};
pub use serialize::{Struct, Union};

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        ArrayNullability, DataHeader, EncodeError, Encoder, EncoderConfig, EncoderState,
        Interface, InterfaceManager, InterfaceRequest, Message, MessageFlags, MessageHeader,
        Result, ServiceMessage, Struct, Union,
    };
}
