//! Mojo System - Handles and Message Pipes
//!
//! This crate provides the system layer that the Mojo bindings encoder
//! depends on: owned handles, message pipe endpoints, handle signals and
//! the [`Core`] handle-pipe factory.
//!
//! ## Backends
//!
//! - [`LocalCore`]: an in-process message pipe implementation. Handles are
//!   entries in a process-wide registry; writing to one endpoint queues the
//!   message on its peer.
//!
//! ## Core Types
//!
//! - [`Handle`] - Generic owned handle, closed on drop
//! - [`MessagePipeHandle`] - One endpoint of a bidirectional message pipe
//! - [`HandleSignals`] - Readiness state of a handle
//! - [`Status`] - Mojo result codes
//!
//! ## Example
//!
//! ```ignore
//! use mojo_system::{Core, LocalCore};
//!
//! let core = LocalCore::new();
//! let (client, server) = core.create_message_pipe()?;
//! client.write(b"hello", Vec::new())?;
//! let (bytes, handles) = server.read()?;
//! ```

mod status;
mod handle;
mod message_pipe;
mod signals;
mod factory;
mod sys;

pub use status::Status;
pub use handle::{AsRawHandle, Handle};
pub use message_pipe::{MessagePipeHandle, ReadMessage};
pub use signals::HandleSignals;
pub use factory::{Core, LocalCore};

/// Raw handle type (u32)
pub type RawHandle = u32;

/// Invalid handle constant
pub const HANDLE_INVALID: RawHandle = 0;

/// Result type for system operations
pub type Result<T> = std::result::Result<T, Status>;

/// Prelude for common imports
pub mod prelude {
    pub use super::{
        AsRawHandle, Core, Handle, HandleSignals, LocalCore, MessagePipeHandle, Result,
        Status,
    };
}
