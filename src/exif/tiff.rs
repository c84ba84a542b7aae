//! Minimal TIFF/EXIF directory reader.
//!
//! TIFF structure (all multi-byte values in the header's byte order):
//!
//! ```text
//! Header:  "II" | "MM"  (little / big endian)
//!          u16 42       (magic)
//!          u32          (offset of IFD0)
//! IFD:     u16          (entry count)
//!          12 bytes × count:
//!            u16 tag, u16 type, u32 count, u32 value-or-offset
//!          u32          (next IFD, unused here)
//! ```
//!
//! Values of 4 bytes or less sit inline in the value-or-offset field; larger
//! values live at that offset, counted from the start of the header. Every
//! read is bounds-checked and fails with
//! [`ExtractError::MalformedExifDirectory`] instead of panicking.
//!
//! The entry table itself must be intact. Out-of-line values are resolved
//! per entry, so a broken value only fails the caller that asks for it.

use super::ExtractError;

/// IFD0 tag holding the offset of the GPS IFD.
pub const GPS_IFD_POINTER: u16 = 0x8825;

const ENTRY_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// EXIF field types. `count` in an entry is the number of values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Ascii,
    Short,
    Long,
    Rational,
    SByte,
    Undefined,
    SShort,
    SLong,
    SRational,
    Float,
    Double,
    Ifd,
    Unknown(u16),
}

impl FieldType {
    fn from_code(code: u16) -> Self {
        match code {
            1 => FieldType::Byte,
            2 => FieldType::Ascii,
            3 => FieldType::Short,
            4 => FieldType::Long,
            5 => FieldType::Rational,
            6 => FieldType::SByte,
            7 => FieldType::Undefined,
            8 => FieldType::SShort,
            9 => FieldType::SLong,
            10 => FieldType::SRational,
            11 => FieldType::Float,
            12 => FieldType::Double,
            13 => FieldType::Ifd,
            other => FieldType::Unknown(other),
        }
    }

    /// Size of one value in bytes; `None` when the type is not known.
    fn size(self) -> Option<usize> {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => Some(1),
            FieldType::Short | FieldType::SShort => Some(2),
            FieldType::Long | FieldType::SLong | FieldType::Float | FieldType::Ifd => Some(4),
            FieldType::Rational | FieldType::SRational | FieldType::Double => Some(8),
            FieldType::Unknown(_) => None,
        }
    }
}

/// An exact fraction as stored by RATIONAL / SRATIONAL fields.
///
/// Both signed and unsigned variants widen losslessly into `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Floating-point value, or `None` for a zero denominator.
    pub fn to_f64(self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }
}

/// Decoded value of a directory entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bytes(Vec<u8>),
    Ascii(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<Rational>),
    /// Types this reader does not interpret (signed integers, floats, unknown codes).
    Other(FieldType),
}

/// One 12-byte IFD entry. `raw` holds the value bytes, or the reason they
/// could not be located.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub tag: u16,
    pub field_type: FieldType,
    raw: Result<&'a [u8], ExtractError>,
    order: ByteOrder,
}

impl Entry<'_> {
    /// Decode the value; fails when its bytes lie outside the block.
    pub fn value(&self) -> Result<Value, ExtractError> {
        let order = self.order;
        let raw = self.raw.clone()?;
        Ok(match self.field_type {
            FieldType::Byte | FieldType::Undefined => Value::Bytes(raw.to_vec()),
            FieldType::Ascii => Value::Ascii(raw.to_vec()),
            FieldType::Short => Value::Short(
                raw
                    .chunks_exact(2)
                    .map(|c| order.u16([c[0], c[1]]))
                    .collect(),
            ),
            FieldType::Long | FieldType::Ifd => Value::Long(
                raw
                    .chunks_exact(4)
                    .map(|c| order.u32([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            FieldType::Rational => Value::Rational(
                raw
                    .chunks_exact(8)
                    .map(|c| {
                        Rational::new(
                            order.u32([c[0], c[1], c[2], c[3]]) as i64,
                            order.u32([c[4], c[5], c[6], c[7]]) as i64,
                        )
                    })
                    .collect(),
            ),
            FieldType::SRational => Value::Rational(
                raw
                    .chunks_exact(8)
                    .map(|c| {
                        Rational::new(
                            order.u32([c[0], c[1], c[2], c[3]]) as i32 as i64,
                            order.u32([c[4], c[5], c[6], c[7]]) as i32 as i64,
                        )
                    })
                    .collect(),
            ),
            other => Value::Other(other),
        })
    }
}

impl ByteOrder {
    fn u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    fn u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        }
    }
}

fn malformed(reason: impl Into<String>) -> ExtractError {
    ExtractError::MalformedExifDirectory(reason.into())
}

/// Reader over a TIFF-structured EXIF block.
#[derive(Debug, Clone, Copy)]
pub struct TiffReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
    ifd0_offset: usize,
}

impl<'a> TiffReader<'a> {
    /// Validate the TIFF header.
    pub fn new(data: &'a [u8]) -> Result<Self, ExtractError> {
        if data.len() < 8 {
            return Err(malformed("TIFF header truncated"));
        }
        let order = match &data[0..2] {
            b"II" => ByteOrder::Little,
            b"MM" => ByteOrder::Big,
            _ => return Err(malformed("unknown byte order mark")),
        };
        if order.u16([data[2], data[3]]) != 42 {
            return Err(malformed("bad TIFF magic"));
        }
        let ifd0_offset = order.u32([data[4], data[5], data[6], data[7]]) as usize;

        Ok(Self {
            data,
            order,
            ifd0_offset,
        })
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    pub fn ifd0_offset(&self) -> usize {
        self.ifd0_offset
    }

    fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], ExtractError> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| malformed(format!("{len} bytes at offset {offset} out of bounds")))
    }

    fn read_u16(&self, offset: usize) -> Result<u16, ExtractError> {
        let b = self.bytes(offset, 2)?;
        Ok(self.order.u16([b[0], b[1]]))
    }

    fn read_u32(&self, offset: usize) -> Result<u32, ExtractError> {
        let b = self.bytes(offset, 4)?;
        Ok(self.order.u32([b[0], b[1], b[2], b[3]]))
    }

    /// Read every entry of the IFD at `offset`.
    ///
    /// A truncated entry table is an error. A value that points outside the
    /// block is not; it surfaces from [`Entry::value`].
    pub fn read_ifd(&self, offset: usize) -> Result<Vec<Entry<'a>>, ExtractError> {
        let entry_count = self.read_u16(offset)? as usize;
        let entries_start = offset + 2;
        // Make sure the whole table is present before walking it
        self.bytes(entries_start, entry_count * ENTRY_SIZE)?;

        let mut entries = Vec::with_capacity(entry_count);
        for i in 0..entry_count {
            let entry_offset = entries_start + i * ENTRY_SIZE;
            let tag = self.read_u16(entry_offset)?;
            let field_type = FieldType::from_code(self.read_u16(entry_offset + 2)?);
            let count = self.read_u32(entry_offset + 4)?;

            entries.push(Entry {
                tag,
                field_type,
                raw: self.value_bytes(entry_offset, tag, field_type, count),
                order: self.order,
            });
        }

        Ok(entries)
    }

    fn value_bytes(
        &self,
        entry_offset: usize,
        tag: u16,
        field_type: FieldType,
        count: u32,
    ) -> Result<&'a [u8], ExtractError> {
        let Some(size) = field_type.size() else {
            return Ok(&[]);
        };
        let byte_len = (count as usize)
            .checked_mul(size)
            .ok_or_else(|| malformed(format!("tag {tag:#06x} count overflows")))?;
        if byte_len <= 4 {
            self.bytes(entry_offset + 8, byte_len)
        } else {
            let value_offset = self.read_u32(entry_offset + 8)? as usize;
            self.bytes(value_offset, byte_len)
        }
    }

    /// Offset of the GPS IFD, taken from the pointer tag in IFD0.
    pub fn gps_ifd_offset(&self) -> Result<usize, ExtractError> {
        let ifd0 = self.read_ifd(self.ifd0_offset)?;
        let pointer = ifd0
            .iter()
            .find(|e| e.tag == GPS_IFD_POINTER)
            .ok_or(ExtractError::NoGpsGroup)?;

        match pointer.value()? {
            Value::Long(offsets) if offsets.len() == 1 => Ok(offsets[0] as usize),
            _ => Err(malformed("GPS IFD pointer is not a single offset")),
        }
    }
}
