//! Wire format constants and helpers shared by generated bindings

use crate::DataHeader;
use bitflags::bitflags;

/// Alignment, in bytes, of every claimed region
pub const ALIGNMENT: usize = 8;

/// Size of an encoded pointer
pub const POINTER_SIZE: usize = 8;

/// Size of an encoded handle
pub const SERIALIZED_HANDLE_SIZE: usize = 4;

/// Size of an encoded interface (handle + version)
pub const SERIALIZED_INTERFACE_SIZE: usize = 8;

/// Size of an inline union (header + 8-byte payload)
pub const UNION_SIZE: usize = 16;

/// Value written in a handle slot when no handle is present
pub const ENCODED_INVALID_HANDLE_VALUE: i32 = -1;

/// Header of the struct that wraps a map's key and value arrays
pub const MAP_STRUCT_HEADER: DataHeader = DataHeader::new(24, 0);

/// Offset of the key array pointer inside a map struct
pub const MAP_KEYS_OFFSET: usize = 8;

/// Offset of the value array pointer inside a map struct
pub const MAP_VALUES_OFFSET: usize = 16;

bitflags! {
    /// Nullability of an array field and of its elements
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ArrayNullability: u8 {
        /// Neither the array nor its elements may be null
        const NOTHING_NULLABLE = 0;
        /// The array pointer itself may be null
        const ARRAY_NULLABLE = 1 << 0;
        /// Individual elements may be null
        const ELEMENT_NULLABLE = 1 << 1;
    }
}

impl ArrayNullability {
    /// Whether the array pointer may be null
    pub fn is_array_nullable(self) -> bool {
        self.contains(ArrayNullability::ARRAY_NULLABLE)
    }

    /// Whether array elements may be null
    pub fn is_element_nullable(self) -> bool {
        self.contains(ArrayNullability::ELEMENT_NULLABLE)
    }
}

/// Round `size` up to the next multiple of [`ALIGNMENT`]
pub const fn align(size: usize) -> usize {
    (size + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

/// Bytes needed for a has-value bitfield over `length` elements, padded to
/// the natural alignment of an element of `element_size` bytes.
pub const fn has_value_bitfield_size(length: usize, element_size: usize) -> usize {
    let element_bits = element_size * 8;
    (length + element_bits - 1) / element_bits * element_size
}
