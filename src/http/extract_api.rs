use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use serde::Serialize;
use tracing::{debug, info};

use super::AppState;
use super::error::{HttpError, HttpResult};
use crate::exif::GeoCoordinate;
use crate::service::locate_gps;

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// Body of every `/extract` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExtractResponse {
    pub fn found(coord: GeoCoordinate) -> Self {
        Self {
            success: true,
            latitude: Some(coord.latitude),
            longitude: Some(coord.longitude),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            latitude: None,
            longitude: None,
            message: Some(message.into()),
        }
    }
}

pub(super) async fn extract(
    State(state): State<AppState>,
    payload: Result<Multipart, MultipartRejection>,
) -> HttpResult<Json<ExtractResponse>> {
    let mut payload = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            debug!("Not a multipart upload: {rejection}");
            return Err(HttpError::NoImage);
        }
    };

    let image = read_image_field(&mut payload)
        .await?
        .ok_or(HttpError::NoImage)?;

    info!("Extracting GPS from {} byte upload", image.len());

    match locate_gps(&image, state.reference_policy) {
        Some(coord) => Ok(Json(ExtractResponse::found(coord))),
        None => Err(HttpError::NoCoordinates),
    }
}

/// Returns the contents of the first file field named [`IMAGE_FIELD`].
///
/// Parts without a filename are plain form values, not uploads.
async fn read_image_field(payload: &mut Multipart) -> HttpResult<Option<Bytes>> {
    while let Some(field) = payload.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) && field.file_name().is_some() {
            return Ok(Some(field.bytes().await?));
        }
    }
    Ok(None)
}
