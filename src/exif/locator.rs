//! Find the raw EXIF block inside an image container.
//!
//! The container is identified by its magic bytes, then scanned for the
//! segment that carries EXIF:
//!
//! - JPEG: APP1 marker (0xFF 0xE1) whose payload starts with `Exif\0\0`
//! - PNG: `eXIf` chunk
//! - WebP: RIFF `EXIF` chunk
//! - TIFF: the file itself is the EXIF block
//!
//! The returned slice borrows from the input and starts at the TIFF header.

use image::ImageFormat;

use super::ExtractError;

/// Header that precedes the TIFF structure in JPEG APP1 (and some WebP) payloads.
pub const EXIF_HEADER: &[u8] = b"Exif\0\0";

const PNG_SIGNATURE_LEN: usize = 8;

/// Locate the EXIF block in an image buffer.
///
/// Returns [`ExtractError::ContainerUnreadable`] for unknown formats and
/// structurally broken containers, [`ExtractError::NoExifSegment`] when the
/// container is fine but carries no (non-empty) EXIF segment.
pub fn locate(image: &[u8]) -> Result<&[u8], ExtractError> {
    let format = image::guess_format(image)
        .map_err(|e| ExtractError::ContainerUnreadable(e.to_string()))?;

    let block = match format {
        ImageFormat::Jpeg => find_jpeg_app1_exif(image)?,
        ImageFormat::Png => find_png_exif_chunk(image)?,
        ImageFormat::WebP => find_webp_exif_chunk(image)?,
        ImageFormat::Tiff => image,
        other => {
            return Err(ExtractError::ContainerUnreadable(format!(
                "unsupported container {other:?}"
            )));
        }
    };

    if block.is_empty() {
        return Err(ExtractError::NoExifSegment);
    }
    Ok(block)
}

/// Drop a leading `Exif\0\0` header if present.
pub fn strip_exif_header(block: &[u8]) -> &[u8] {
    block.strip_prefix(EXIF_HEADER).unwrap_or(block)
}

fn unreadable(reason: &str) -> ExtractError {
    ExtractError::ContainerUnreadable(reason.to_string())
}

// ---------------------------------------------------------------------------
// JPEG: walk the marker segments up to start-of-scan
// ---------------------------------------------------------------------------

fn find_jpeg_app1_exif(data: &[u8]) -> Result<&[u8], ExtractError> {
    // Skip SOI (0xFF 0xD8)
    let mut pos = 2;

    loop {
        if pos + 1 >= data.len() {
            return Err(unreadable("JPEG ends before start of scan"));
        }
        if data[pos] != 0xFF {
            return Err(unreadable("JPEG marker expected"));
        }
        // Fill bytes: any number of 0xFF may precede the marker code
        if data[pos + 1] == 0xFF {
            pos += 1;
            continue;
        }

        let marker = data[pos + 1];
        // SOS means entropy-coded image data follows; metadata comes before it
        if marker == 0xDA || marker == 0xD9 {
            return Err(ExtractError::NoExifSegment);
        }
        // Markers without a length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        if pos + 4 > data.len() {
            return Err(unreadable("JPEG segment header truncated"));
        }
        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return Err(unreadable("JPEG segment length too small"));
        }
        let seg_end = pos + 2 + seg_len;
        if seg_end > data.len() {
            return Err(unreadable("JPEG segment runs past end of file"));
        }

        let payload = &data[pos + 4..seg_end];
        if marker == 0xE1 && payload.starts_with(EXIF_HEADER) {
            return Ok(&payload[EXIF_HEADER.len()..]);
        }

        pos = seg_end;
    }
}

// ---------------------------------------------------------------------------
// PNG: length-prefixed chunks, big-endian
// ---------------------------------------------------------------------------

fn find_png_exif_chunk(data: &[u8]) -> Result<&[u8], ExtractError> {
    let mut pos = PNG_SIGNATURE_LEN;

    while pos < data.len() {
        if pos + 8 > data.len() {
            return Err(unreadable("PNG chunk header truncated"));
        }
        let length =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let kind = &data[pos + 4..pos + 8];
        let data_start = pos + 8;
        let data_end = data_start
            .checked_add(length)
            .filter(|&end| end + 4 <= data.len())
            .ok_or_else(|| unreadable("PNG chunk runs past end of file"))?;

        match kind {
            b"eXIf" => return Ok(strip_exif_header(&data[data_start..data_end])),
            b"IEND" => return Err(ExtractError::NoExifSegment),
            _ => {}
        }

        // Skip data + CRC
        pos = data_end + 4;
    }

    Err(unreadable("PNG has no IEND chunk"))
}

// ---------------------------------------------------------------------------
// WebP: RIFF container, little-endian chunk sizes padded to even
// ---------------------------------------------------------------------------

fn find_webp_exif_chunk(data: &[u8]) -> Result<&[u8], ExtractError> {
    // "RIFF" + size + "WEBP"
    let mut pos = 12;

    while pos < data.len() {
        if pos + 8 > data.len() {
            return Err(unreadable("WebP chunk header truncated"));
        }
        let fourcc = &data[pos..pos + 4];
        let size = u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
            as usize;
        let data_start = pos + 8;
        let data_end = data_start
            .checked_add(size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| unreadable("WebP chunk runs past end of file"))?;

        if fourcc == b"EXIF" {
            return Ok(strip_exif_header(&data[data_start..data_end]));
        }

        pos = data_end + (size % 2);
    }

    Err(ExtractError::NoExifSegment)
}
