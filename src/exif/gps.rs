//! GPS IFD decoding and coordinate conversion.
//!
//! Only four GPS tags matter here:
//!
//! | Tag | Name | Expected shape |
//! |---|---|---|
//! | 1 | GPSLatitudeRef | ASCII, one character (`N`/`S`) |
//! | 2 | GPSLatitude | 3 rationals: degrees, minutes, seconds |
//! | 3 | GPSLongitudeRef | ASCII, one character (`E`/`W`) |
//! | 4 | GPSLongitude | 3 rationals: degrees, minutes, seconds |
//!
//! All four must be present and well-formed, otherwise there is no
//! coordinate. Results are not clamped to [-90, 90] / [-180, 180].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ExtractError;
use super::locator::strip_exif_header;
use super::tiff::{Entry, TiffReader, Value};

pub use super::tiff::Rational;

pub const GPS_LATITUDE_REF: u16 = 1;
pub const GPS_LATITUDE: u16 = 2;
pub const GPS_LONGITUDE_REF: u16 = 3;
pub const GPS_LONGITUDE: u16 = 4;

/// Signed decimal degrees. South and West are negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// How hemisphere reference tags are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferencePolicy {
    /// Only the exact bytes `N`/`S` and `E`/`W` are accepted.
    #[default]
    Strict,
    /// Any non-empty reference is accepted; only exactly `S` / `W` negates.
    Lenient,
}

/// A GPS tag value, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum GpsValue {
    /// ASCII value that is exactly one character (trailing NULs removed).
    Reference(u8),
    /// Any other ASCII value, possibly empty.
    Text(Vec<u8>),
    /// Exactly three RATIONAL or SRATIONAL values.
    RationalTriplet([Rational; 3]),
    Other,
}

impl From<Value> for GpsValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Ascii(mut bytes) => {
                while bytes.last() == Some(&0) {
                    bytes.pop();
                }
                match bytes.as_slice() {
                    [c] => GpsValue::Reference(*c),
                    _ => GpsValue::Text(bytes),
                }
            }
            Value::Rational(r) => match <[Rational; 3]>::try_from(r) {
                Ok(triplet) => GpsValue::RationalTriplet(triplet),
                Err(_) => GpsValue::Other,
            },
            _ => GpsValue::Other,
        }
    }
}

const REQUIRED_TAGS: [u16; 4] = [GPS_LATITUDE_REF, GPS_LATITUDE, GPS_LONGITUDE_REF, GPS_LONGITUDE];

/// The location tags of a GPS IFD, keyed by tag number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsTagGroup {
    tags: BTreeMap<u16, GpsValue>,
}

impl GpsTagGroup {
    /// Resolve the four location tags. Values of other GPS tags are never
    /// read, so damage there does not matter.
    pub fn from_entries(entries: &[Entry<'_>]) -> Result<Self, ExtractError> {
        let tags: BTreeMap<u16, GpsValue> = entries
            .iter()
            .filter(|e| REQUIRED_TAGS.contains(&e.tag))
            .map(|e| Ok((e.tag, GpsValue::from(e.value()?))))
            .collect::<Result<_, ExtractError>>()?;
        Ok(Self { tags })
    }

    pub fn get(&self, tag: u16) -> Option<&GpsValue> {
        self.tags.get(&tag)
    }

    pub fn insert(&mut self, tag: u16, value: GpsValue) {
        self.tags.insert(tag, value);
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Parse the EXIF block and return its GPS tag group.
///
/// Accepts the block with or without the `Exif\0\0` header. A GPS IFD with
/// no entries at all is [`ExtractError::NoGpsGroup`]; one holding only other
/// GPS tags yields an empty group.
pub fn read_gps_group(block: &[u8]) -> Result<GpsTagGroup, ExtractError> {
    let reader = TiffReader::new(strip_exif_header(block))?;
    let offset = reader.gps_ifd_offset()?;
    let entries = reader.read_ifd(offset)?;

    if entries.is_empty() {
        return Err(ExtractError::NoGpsGroup);
    }
    GpsTagGroup::from_entries(&entries)
}

/// Decode an EXIF block into signed decimal degrees.
pub fn decode(block: &[u8], policy: ReferencePolicy) -> Result<GeoCoordinate, ExtractError> {
    let group = read_gps_group(block)?;
    coordinate_from_group(&group, policy)
}

/// Convert an already parsed GPS group.
///
/// Shapes of all four tags are checked before any arithmetic, so a missing
/// tag wins over a zero denominator elsewhere.
pub fn coordinate_from_group(
    group: &GpsTagGroup,
    policy: ReferencePolicy,
) -> Result<GeoCoordinate, ExtractError> {
    let lat_sign = hemisphere_sign(
        group.get(GPS_LATITUDE_REF),
        (b'N', b'S'),
        "latitude reference",
        policy,
    )?;
    let lat = triplet(group.get(GPS_LATITUDE), "latitude")?;
    let lon_sign = hemisphere_sign(
        group.get(GPS_LONGITUDE_REF),
        (b'E', b'W'),
        "longitude reference",
        policy,
    )?;
    let lon = triplet(group.get(GPS_LONGITUDE), "longitude")?;

    Ok(GeoCoordinate {
        latitude: lat_sign * to_degrees(lat, "latitude")?,
        longitude: lon_sign * to_degrees(lon, "longitude")?,
    })
}

/// `degrees + minutes / 60 + seconds / 3600`
pub fn to_degrees(dms: &[Rational; 3], name: &'static str) -> Result<f64, ExtractError> {
    let [d, m, s] = dms;
    let part = |r: &Rational| r.to_f64().ok_or(ExtractError::InvalidRational(name));
    Ok(part(d)? + part(m)? / 60.0 + part(s)? / 3600.0)
}

fn triplet<'a>(
    value: Option<&'a GpsValue>,
    name: &str,
) -> Result<&'a [Rational; 3], ExtractError> {
    match value {
        Some(GpsValue::RationalTriplet(t)) => Ok(t),
        Some(_) => Err(ExtractError::IncompleteGpsTags(format!(
            "{name} is not three rationals"
        ))),
        None => Err(ExtractError::IncompleteGpsTags(format!("missing {name}"))),
    }
}

fn hemisphere_sign(
    value: Option<&GpsValue>,
    (positive, negative): (u8, u8),
    name: &str,
    policy: ReferencePolicy,
) -> Result<f64, ExtractError> {
    let unrecognized =
        || ExtractError::IncompleteGpsTags(format!("unrecognized {name}"));

    match (value, policy) {
        (None, _) => Err(ExtractError::IncompleteGpsTags(format!("missing {name}"))),
        (Some(GpsValue::Reference(c)), _) if *c == negative => Ok(-1.0),
        (Some(GpsValue::Reference(c)), ReferencePolicy::Strict) if *c == positive => Ok(1.0),
        (Some(GpsValue::Reference(_)), ReferencePolicy::Lenient) => Ok(1.0),
        (Some(GpsValue::Text(t)), ReferencePolicy::Lenient) if !t.is_empty() => Ok(1.0),
        _ => Err(unrecognized()),
    }
}
