//! Shared test utilities: synthetic EXIF blocks and image containers.
//!
//! Builds just enough structure for the locator and decoder to walk. Pixel
//! data and checksums are placeholders; nothing here produces a decodable
//! image.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let exif = gps_exif(ByteOrder::Big, 'N', [40, 26, 0], 'W', [74, 0, 0]);
//! let jpeg = jpeg_with_exif(&exif);
//!
//! let custom = TiffBuilder::new(ByteOrder::Little)
//!     .gps(vec![TagSpec::ascii(1, "N")])
//!     .build();
//! ```

pub use crate::exif::tiff::ByteOrder;
use crate::exif::locator::EXIF_HEADER;
use crate::exif::tiff::GPS_IFD_POINTER;

const TIFF_HEADER_LEN: usize = 8;

fn put_u16(out: &mut Vec<u8>, order: ByteOrder, v: u16) {
    match order {
        ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
        ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
    }
}

fn put_u32(out: &mut Vec<u8>, order: ByteOrder, v: u32) {
    match order {
        ByteOrder::Little => out.extend_from_slice(&v.to_le_bytes()),
        ByteOrder::Big => out.extend_from_slice(&v.to_be_bytes()),
    }
}

// =========================================================================
// TIFF / EXIF blocks
// =========================================================================

#[derive(Debug, Clone)]
enum Payload {
    Ascii(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
    SRational(Vec<(i32, i32)>),
    /// Written verbatim: type code, count and the 4-byte value field.
    Raw {
        type_code: u16,
        count: u32,
        field: Vec<u8>,
    },
}

/// One IFD entry to be written by [`TiffBuilder`].
#[derive(Debug, Clone)]
pub struct TagSpec {
    pub tag: u16,
    payload: Payload,
}

impl TagSpec {
    /// ASCII value; the NUL terminator is appended.
    pub fn ascii(tag: u16, text: &str) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        Self {
            tag,
            payload: Payload::Ascii(bytes),
        }
    }

    pub fn short(tag: u16, value: u16) -> Self {
        Self {
            tag,
            payload: Payload::Short(vec![value]),
        }
    }

    pub fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            payload: Payload::Long(vec![value]),
        }
    }

    pub fn rationals(tag: u16, values: &[(u32, u32)]) -> Self {
        Self {
            tag,
            payload: Payload::Rational(values.to_vec()),
        }
    }

    pub fn srationals(tag: u16, values: &[(i32, i32)]) -> Self {
        Self {
            tag,
            payload: Payload::SRational(values.to_vec()),
        }
    }

    /// Entry with arbitrary type/count and a literal 4-byte value field.
    pub fn raw(tag: u16, type_code: u16, count: u32, field: Vec<u8>) -> Self {
        assert_eq!(field.len(), 4, "value field is 4 bytes");
        Self {
            tag,
            payload: Payload::Raw {
                type_code,
                count,
                field,
            },
        }
    }

    /// (type code, count, value bytes, bytes are the literal value field)
    fn encode(&self, order: ByteOrder) -> (u16, u32, Vec<u8>, bool) {
        let mut bytes = Vec::new();
        match &self.payload {
            Payload::Ascii(b) => (2, b.len() as u32, b.clone(), false),
            Payload::Short(v) => {
                v.iter().for_each(|x| put_u16(&mut bytes, order, *x));
                (3, v.len() as u32, bytes, false)
            }
            Payload::Long(v) => {
                v.iter().for_each(|x| put_u32(&mut bytes, order, *x));
                (4, v.len() as u32, bytes, false)
            }
            Payload::Rational(v) => {
                for (n, d) in v {
                    put_u32(&mut bytes, order, *n);
                    put_u32(&mut bytes, order, *d);
                }
                (5, v.len() as u32, bytes, false)
            }
            Payload::SRational(v) => {
                for (n, d) in v {
                    put_u32(&mut bytes, order, *n as u32);
                    put_u32(&mut bytes, order, *d as u32);
                }
                (10, v.len() as u32, bytes, false)
            }
            Payload::Raw {
                type_code,
                count,
                field,
            } => (*type_code, *count, field.clone(), true),
        }
    }
}

/// Serialize one IFD starting at absolute offset `start`, followed by its
/// out-of-line value data.
fn encode_ifd(order: ByteOrder, tags: &[TagSpec], start: usize) -> Vec<u8> {
    let data_start = start + 2 + tags.len() * 12 + 4;
    let mut table = Vec::new();
    let mut data = Vec::new();

    put_u16(&mut table, order, tags.len() as u16);
    for entry in tags {
        let (type_code, count, bytes, literal) = entry.encode(order);
        put_u16(&mut table, order, entry.tag);
        put_u16(&mut table, order, type_code);
        put_u32(&mut table, order, count);
        if literal || bytes.len() <= 4 {
            let mut field = bytes;
            field.resize(4, 0);
            table.extend_from_slice(&field);
        } else {
            put_u32(&mut table, order, (data_start + data.len()) as u32);
            data.extend_from_slice(&bytes);
            if data.len() % 2 == 1 {
                data.push(0);
            }
        }
    }
    // Next IFD: none
    put_u32(&mut table, order, 0);

    table.extend_from_slice(&data);
    table
}

/// Builds a TIFF-structured EXIF block with IFD0 and an optional GPS IFD.
pub struct TiffBuilder {
    order: ByteOrder,
    ifd0: Vec<TagSpec>,
    gps: Option<Vec<TagSpec>>,
}

impl TiffBuilder {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            order,
            ifd0: Vec::new(),
            gps: None,
        }
    }

    pub fn ifd0(mut self, tags: Vec<TagSpec>) -> Self {
        self.ifd0 = tags;
        self
    }

    /// Add a GPS IFD; IFD0 gets the pointer tag automatically.
    pub fn gps(mut self, tags: Vec<TagSpec>) -> Self {
        self.gps = Some(tags);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let order = self.order;
        let mut out = Vec::new();
        match order {
            ByteOrder::Little => out.extend_from_slice(b"II"),
            ByteOrder::Big => out.extend_from_slice(b"MM"),
        }
        put_u16(&mut out, order, 42);
        put_u32(&mut out, order, TIFF_HEADER_LEN as u32);

        let mut ifd0 = self.ifd0;
        match self.gps {
            Some(gps) => {
                // The pointer is inline, so its value does not change the IFD0 size
                ifd0.push(TagSpec::long(GPS_IFD_POINTER, 0));
                let gps_offset = TIFF_HEADER_LEN + encode_ifd(order, &ifd0, TIFF_HEADER_LEN).len();
                if let Some(pointer) = ifd0.last_mut() {
                    *pointer = TagSpec::long(GPS_IFD_POINTER, gps_offset as u32);
                }
                out.extend(encode_ifd(order, &ifd0, TIFF_HEADER_LEN));
                out.extend(encode_ifd(order, &gps, gps_offset));
            }
            None => out.extend(encode_ifd(order, &ifd0, TIFF_HEADER_LEN)),
        }
        out
    }
}

/// The four required GPS tags with whole-number DMS values.
pub fn full_gps_tags(lat_ref: char, lat: [u32; 3], lon_ref: char, lon: [u32; 3]) -> Vec<TagSpec> {
    let dms = |v: [u32; 3]| v.map(|x| (x, 1));
    vec![
        TagSpec::ascii(1, &lat_ref.to_string()),
        TagSpec::rationals(2, &dms(lat)),
        TagSpec::ascii(3, &lon_ref.to_string()),
        TagSpec::rationals(4, &dms(lon)),
    ]
}

/// A complete EXIF block carrying the four required GPS tags.
pub fn gps_exif(
    order: ByteOrder,
    lat_ref: char,
    lat: [u32; 3],
    lon_ref: char,
    lon: [u32; 3],
) -> Vec<u8> {
    TiffBuilder::new(order)
        .ifd0(vec![TagSpec::ascii(0x010F, "TestCam")])
        .gps(full_gps_tags(lat_ref, lat, lon_ref, lon))
        .build()
}

// =========================================================================
// Containers
// =========================================================================

pub fn push_jpeg_segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
}

fn jpeg_with_segments(app1: Option<&[u8]>) -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8];
    push_jpeg_segment(&mut jpeg, 0xE0, b"JFIF\0\x01\x01\x00\x00\x01\x00\x01\x00\x00");
    if let Some(exif) = app1 {
        let mut payload = EXIF_HEADER.to_vec();
        payload.extend_from_slice(exif);
        push_jpeg_segment(&mut jpeg, 0xE1, &payload);
    }
    push_jpeg_segment(&mut jpeg, 0xDB, &[0u8; 65]);
    push_jpeg_segment(&mut jpeg, 0xDA, &[1, 1, 0, 0, 63, 0]);
    jpeg.extend_from_slice(&[0x12, 0x34, 0x56, 0xFF, 0x00, 0x78]);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// JPEG with JFIF, APP1 (EXIF), DQT and a token scan.
pub fn jpeg_with_exif(exif: &[u8]) -> Vec<u8> {
    jpeg_with_segments(Some(exif))
}

pub fn jpeg_without_exif() -> Vec<u8> {
    jpeg_with_segments(None)
}

fn push_png_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    // CRC is not checked by the locator
    out.extend_from_slice(&[0, 0, 0, 0]);
}

pub fn png_with_exif(exif: Option<&[u8]>) -> Vec<u8> {
    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    push_png_chunk(&mut png, b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0]);
    if let Some(exif) = exif {
        push_png_chunk(&mut png, b"eXIf", exif);
    }
    push_png_chunk(&mut png, b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]);
    push_png_chunk(&mut png, b"IEND", &[]);
    png
}

fn push_riff_chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
}

pub fn webp_with_exif(exif: Option<&[u8]>) -> Vec<u8> {
    let mut body = b"WEBP".to_vec();
    push_riff_chunk(&mut body, b"VP8X", &[0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    push_riff_chunk(&mut body, b"VP8 ", &[0x10, 0x02, 0x00]);
    if let Some(exif) = exif {
        push_riff_chunk(&mut body, b"EXIF", exif);
    }

    let mut webp = b"RIFF".to_vec();
    webp.extend_from_slice(&(body.len() as u32).to_le_bytes());
    webp.extend(body);
    webp
}
