//! Boundary between the pure extraction core and its callers.
//!
//! The core reports *why* no coordinate was found; callers only get
//! `Some`/`None`. The reason is logged here and nowhere else, so the HTTP and
//! CLI front ends report failures identically.

use tracing::{debug, error, warn};

use crate::exif::{self, ExtractError, GeoCoordinate, ReferencePolicy};

/// Extract GPS coordinates from raw image bytes, logging the failure kind.
pub fn locate_gps(image: &[u8], policy: ReferencePolicy) -> Option<GeoCoordinate> {
    match exif::extract_coordinates(image, policy) {
        Ok(coord) => {
            debug!(
                latitude = coord.latitude,
                longitude = coord.longitude,
                "GPS coordinates extracted"
            );
            Some(coord)
        }
        Err(e) => {
            log_failure(&e, image.len());
            None
        }
    }
}

fn log_failure(e: &ExtractError, size: usize) {
    if e.is_corrupt() {
        error!(bytes = size, "EXIF extraction failed: {e}");
    } else {
        warn!(bytes = size, "{e}");
    }
}
