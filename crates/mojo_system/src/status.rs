//! Mojo result codes (MojoResult)

use std::fmt;

/// Mojo result code
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Status(i32);

impl Status {
    /// Create a status from a raw value
    pub const fn from_raw(raw: i32) -> Self {
        Status(raw)
    }

    /// Get the raw status value
    pub const fn into_raw(self) -> i32 {
        self.0
    }
}

// Result code constants
impl Status {
    pub const OK: Status = Status(0);
    pub const CANCELLED: Status = Status(1);
    pub const UNKNOWN: Status = Status(2);
    pub const INVALID_ARGUMENT: Status = Status(3);
    pub const DEADLINE_EXCEEDED: Status = Status(4);
    pub const NOT_FOUND: Status = Status(5);
    pub const ALREADY_EXISTS: Status = Status(6);
    pub const PERMISSION_DENIED: Status = Status(7);
    pub const RESOURCE_EXHAUSTED: Status = Status(8);
    pub const FAILED_PRECONDITION: Status = Status(9);
    pub const ABORTED: Status = Status(10);
    pub const OUT_OF_RANGE: Status = Status(11);
    pub const UNIMPLEMENTED: Status = Status(12);
    pub const INTERNAL: Status = Status(13);
    pub const UNAVAILABLE: Status = Status(14);
    pub const DATA_LOSS: Status = Status(15);
    pub const BUSY: Status = Status(16);
    pub const SHOULD_WAIT: Status = Status(17);
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Status::OK => write!(f, "OK"),
            Status::CANCELLED => write!(f, "CANCELLED"),
            Status::UNKNOWN => write!(f, "UNKNOWN"),
            Status::INVALID_ARGUMENT => write!(f, "INVALID_ARGUMENT"),
            Status::DEADLINE_EXCEEDED => write!(f, "DEADLINE_EXCEEDED"),
            Status::NOT_FOUND => write!(f, "NOT_FOUND"),
            Status::ALREADY_EXISTS => write!(f, "ALREADY_EXISTS"),
            Status::PERMISSION_DENIED => write!(f, "PERMISSION_DENIED"),
            Status::RESOURCE_EXHAUSTED => write!(f, "RESOURCE_EXHAUSTED"),
            Status::FAILED_PRECONDITION => write!(f, "FAILED_PRECONDITION"),
            Status::ABORTED => write!(f, "ABORTED"),
            Status::OUT_OF_RANGE => write!(f, "OUT_OF_RANGE"),
            Status::UNIMPLEMENTED => write!(f, "UNIMPLEMENTED"),
            Status::INTERNAL => write!(f, "INTERNAL"),
            Status::UNAVAILABLE => write!(f, "UNAVAILABLE"),
            Status::DATA_LOSS => write!(f, "DATA_LOSS"),
            Status::BUSY => write!(f, "BUSY"),
            Status::SHOULD_WAIT => write!(f, "SHOULD_WAIT"),
            other => write!(f, "Status({})", other.0),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for Status {}

impl From<Status> for i32 {
    fn from(status: Status) -> i32 {
        status.0
    }
}

impl From<i32> for Status {
    fn from(raw: i32) -> Status {
        Status(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_conversion() {
        assert_eq!(Status::from_raw(17), Status::SHOULD_WAIT);
        assert_eq!(Status::INVALID_ARGUMENT.into_raw(), 3);
        assert_eq!(Status::from(9), Status::FAILED_PRECONDITION);
        assert_eq!(i32::from(Status::BUSY), 16);
    }

    #[test]
    fn test_debug_names() {
        assert_eq!(format!("{:?}", Status::FAILED_PRECONDITION), "FAILED_PRECONDITION");
        assert_eq!(format!("{}", Status::from_raw(99)), "Status(99)");
    }
}
