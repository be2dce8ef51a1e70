//! Handle signals

use bitflags::bitflags;

bitflags! {
    /// Readiness state of a handle
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HandleSignals: u32 {
        const NONE = 0;
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        const PEER_CLOSED = 1 << 2;
    }
}
