//! # gps-extract
//!
//! A small HTTP service that reads the GPS position embedded in an image's
//! EXIF metadata and returns it as signed decimal degrees.
//!
//! # Architecture
//!
//! ```text
//! image bytes ──▶ locate ──▶ EXIF block ──▶ decode ──▶ GeoCoordinate
//!                 (container)               (TIFF IFD + GPS tags)
//! ```
//!
//! The extraction core ([`exif`]) is a pure function of the input bytes: no
//! I/O, no logging, no shared state. Each failure is a typed
//! [`exif::ExtractError`]; the [`service`] boundary logs the kind and hands
//! callers a plain `Option`. Concurrent requests never contend on anything.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`exif`] | Container scanning, TIFF directory reader, GPS decoding |
//! | [`service`] | Collapses core errors to `Option`, logs the failure kind |
//! | [`http`] | axum router: liveness probe and `POST /extract` |
//! | [`config`] | `config.toml` loading, merging onto stock defaults, validation |
//!
//! # Design Decisions
//!
//! ## Hand-written EXIF reader
//!
//! Only four GPS tags are needed. Walking the JPEG markers and two IFDs by
//! hand keeps every bounds check explicit and lets each failure map to a
//! precise error kind, which a general EXIF library would fold together.
//!
//! ## Uniform rejection
//!
//! Clients see one message for every "no coordinates" outcome. Whether the
//! upload lacked EXIF, had a corrupt directory, or carried a zero
//! denominator is only visible in the server log.
//!
//! ## Strict hemisphere references
//!
//! By default `GPSLatitudeRef` must be `N`/`S` and `GPSLongitudeRef` `E`/`W`.
//! `gps.reference_policy = "lenient"` accepts any non-empty reference and
//! only negates on an exact `S`/`W`.

pub mod config;
pub mod exif;
pub mod http;
pub mod service;

#[cfg(test)]
pub(crate) mod test_helpers;
