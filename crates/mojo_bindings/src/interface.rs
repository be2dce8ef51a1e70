//! Interface endpoints as seen by the encoder

use mojo_system::{AsRawHandle, MessagePipeHandle};
use std::fmt;
use std::marker::PhantomData;

/// A Mojo interface value: either a proxy to a remote implementation or a
/// local implementation
pub trait Interface: Send {
    /// Proxies return the handler owning their bound pipe
    ///
    /// Local implementations keep the default.
    fn proxy_handler(&mut self) -> Option<&mut ProxyHandler> {
        None
    }
}

/// Client-side state of a bound proxy
#[derive(Debug, Default)]
pub struct ProxyHandler {
    handle: MessagePipeHandle,
    version: u32,
}

impl ProxyHandler {
    /// Create a handler for a proxy bound to `handle`
    pub fn new(handle: MessagePipeHandle, version: u32) -> Self {
        Self { handle, version }
    }

    /// Take the bound pipe, leaving the proxy unbound
    pub fn pass_handle(&mut self) -> MessagePipeHandle {
        self.handle.take()
    }

    /// Interface version the remote end is known to support
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether the proxy still owns its pipe
    pub fn is_bound(&self) -> bool {
        self.handle.is_valid()
    }
}

/// Binds local implementations of interface `I` to message pipes
pub trait InterfaceManager<I: Interface + ?Sized> {
    /// Fully qualified interface name
    fn name(&self) -> &'static str;

    /// Version of the interface this side implements
    fn version(&self) -> u32;

    /// Serve `implementation` on `handle`
    ///
    /// Takes effect immediately and is not undone if the message that
    /// triggered it fails to encode.
    fn bind(&self, implementation: Box<I>, handle: MessagePipeHandle);
}

/// The receiving end of an interface that has not been bound yet
pub struct InterfaceRequest<I: ?Sized> {
    handle: MessagePipeHandle,
    _marker: PhantomData<fn() -> Box<I>>,
}

impl<I: ?Sized> InterfaceRequest<I> {
    /// Wrap a pipe endpoint
    pub fn new(handle: MessagePipeHandle) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }

    /// Give up the request, returning its pipe
    pub fn pass_handle(self) -> MessagePipeHandle {
        self.handle
    }

    /// Whether the request holds a pipe
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }
}

impl<I: ?Sized> fmt::Debug for InterfaceRequest<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceRequest")
            .field("handle", &self.handle)
            .finish()
    }
}

/// Placeholder for an associated interface field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssociatedInterfaceNotSupported;

/// Placeholder for an associated interface request field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssociatedInterfaceRequestNotSupported;
