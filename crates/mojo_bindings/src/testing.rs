//! Test helpers: little-endian readers over encoded buffers and a few
//! hand-written bindings shaped like generated code.

use crate::{DataHeader, Encoder, Result, Struct, Union};

pub fn read_u8(bytes: &[u8], at: usize) -> u8 {
    bytes[at]
}

pub fn read_i16(bytes: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([bytes[at], bytes[at + 1]])
}

pub fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

pub fn read_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

pub fn read_i64(bytes: &[u8], at: usize) -> i64 {
    i64::from_le_bytes(bytes[at..at + 8].try_into().unwrap())
}

pub fn read_u64(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap())
}

pub fn read_f32(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

pub fn read_f64(bytes: &[u8], at: usize) -> f64 {
    f64::from_le_bytes(bytes[at..at + 8].try_into().unwrap())
}

pub fn read_header(bytes: &[u8], at: usize) -> DataHeader {
    DataHeader::new(read_u32(bytes, at), read_u32(bytes, at + 4))
}

/// Absolute target of the pointer stored at `at`, or None for null
pub fn follow_pointer(bytes: &[u8], at: usize) -> Option<usize> {
    match read_i64(bytes, at) {
        0 => None,
        relative => Some((at as i64 + relative) as usize),
    }
}

/// Decode the string whose pointer is stored at `at`
pub fn read_string(bytes: &[u8], at: usize) -> Option<String> {
    let start = follow_pointer(bytes, at)?;
    let header = read_header(bytes, start);
    let body = &bytes[start + 8..start + 8 + header.elements_or_version as usize];
    Some(String::from_utf8(body.to_vec()).unwrap())
}

/// `struct Point { int32 x; int32 y; };`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ENCODED_SIZE: usize = 16;

    pub fn read(bytes: &[u8], at: usize) -> Point {
        Point {
            x: read_i32(bytes, at + 8),
            y: read_i32(bytes, at + 12),
        }
    }
}

impl Struct for Point {
    fn encoded_base_size(&self) -> usize {
        Self::ENCODED_SIZE
    }

    fn encode(&mut self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut encoder0 =
            encoder.encoder_at_data_offset(DataHeader::new(Self::ENCODED_SIZE as u32, 0));
        encoder0.encode_i32(self.x, 8);
        encoder0.encode_i32(self.y, 12);
        Ok(())
    }
}

/// `union Shape { Point point; int64 radius; string label; Shape nested; };`
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Point(Point),
    Radius(i64),
    Label(String),
    Nested(Box<Shape>),
}

impl Shape {
    pub const TAG_POINT: u32 = 0;
    pub const TAG_RADIUS: u32 = 1;
    pub const TAG_LABEL: u32 = 2;
    pub const TAG_NESTED: u32 = 3;
}

impl Union for Shape {
    fn encode(&mut self, encoder: &mut Encoder<'_>, offset: usize) -> Result<()> {
        match self {
            Shape::Point(point) => {
                encoder.encode_union_header(Self::TAG_POINT, offset);
                encoder.encode_struct(Some(point), offset + 8, false)
            }
            Shape::Radius(radius) => {
                encoder.encode_union_header(Self::TAG_RADIUS, offset);
                encoder.encode_i64(*radius, offset + 8);
                Ok(())
            }
            Shape::Label(label) => {
                encoder.encode_union_header(Self::TAG_LABEL, offset);
                encoder.encode_string(Some(label.as_str()), offset + 8, false)
            }
            Shape::Nested(inner) => {
                encoder.encode_union_header(Self::TAG_NESTED, offset);
                encoder.encode_union_as_pointer(Some(&mut **inner), offset + 8, false)
            }
        }
    }
}

/// ```text
/// struct Record {
///   bool flag;              // 8, bit 0
///   bool other;             // 8, bit 1
///   int32 count;            // 12
///   string name;            // 16
///   Point? origin;          // 24
///   array<uint8> data;      // 32
///   Shape shape;            // 40..56
///   handle<message_pipe>? pipe; // 56
/// };
/// ```
#[derive(Debug, Default)]
pub struct Record {
    pub flag: bool,
    pub other: bool,
    pub count: i32,
    pub name: String,
    pub origin: Option<Point>,
    pub data: Vec<u8>,
    pub shape: Option<Shape>,
    pub pipe: mojo_system::MessagePipeHandle,
}

impl Record {
    pub const ENCODED_SIZE: usize = 64;
}

impl Struct for Record {
    fn encoded_base_size(&self) -> usize {
        Self::ENCODED_SIZE
    }

    fn encode(&mut self, encoder: &mut Encoder<'_>) -> Result<()> {
        let mut encoder0 =
            encoder.encoder_at_data_offset(DataHeader::new(Self::ENCODED_SIZE as u32, 0));
        encoder0.encode_bool(self.flag, 8, 0);
        encoder0.encode_bool(self.other, 8, 1);
        encoder0.encode_i32(self.count, 12);
        encoder0.encode_string(Some(self.name.as_str()), 16, false)?;
        encoder0.encode_struct(self.origin.as_mut(), 24, true)?;
        encoder0.encode_array(
            Some(self.data.as_slice()),
            32,
            crate::ArrayNullability::NOTHING_NULLABLE,
            None,
        )?;
        encoder0.encode_union(self.shape.as_mut(), 40, false)?;
        encoder0.encode_handle(self.pipe.take(), 56, true)?;
        Ok(())
    }
}
