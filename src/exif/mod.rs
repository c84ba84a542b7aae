//! EXIF GPS extraction: pure Rust, no I/O, no logging.
//!
//! | Stage | Input | Output |
//! |---|---|---|
//! | **Locate** | raw image bytes | EXIF block (TIFF bytes) |
//! | **Read directory** | EXIF block | GPS IFD entries |
//! | **Decode** | GPS entries | signed decimal degrees |
//!
//! The module is split into:
//! - **Locator**: container sniffing and segment scanning (JPEG, PNG, WebP, TIFF)
//! - **TIFF**: byte-order aware IFD reader with bounds-checked value access
//! - **GPS**: typed tag group, rational conversion, hemisphere sign
//!
//! Every failure is an [`ExtractError`]. Callers that only care whether a
//! coordinate exists collapse the result with `.ok()`; the kind is there for
//! logging and must not be shown to end users.

pub mod gps;
pub mod locator;
pub mod tiff;

use thiserror::Error;

pub use gps::{GeoCoordinate, ReferencePolicy, decode};
pub use locator::locate;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("image container is not readable: {0}")]
    ContainerUnreadable(String),
    #[error("no EXIF segment in image")]
    NoExifSegment,
    #[error("malformed EXIF directory: {0}")]
    MalformedExifDirectory(String),
    #[error("no GPS data in EXIF")]
    NoGpsGroup,
    #[error("incomplete GPS data: {0}")]
    IncompleteGpsTags(String),
    #[error("zero denominator in {0}")]
    InvalidRational(&'static str),
}

impl ExtractError {
    /// True for kinds that indicate damaged input rather than an image that
    /// simply carries no location.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            ExtractError::ContainerUnreadable(_)
                | ExtractError::MalformedExifDirectory(_)
                | ExtractError::InvalidRational(_)
        )
    }
}

/// Locate the EXIF block in `image` and decode its GPS coordinates.
pub fn extract_coordinates(
    image: &[u8],
    policy: ReferencePolicy,
) -> Result<GeoCoordinate, ExtractError> {
    let block = locate(image)?;
    decode(block, policy)
}
