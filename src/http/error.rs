use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

use super::extract_api::ExtractResponse;

/// Rejections of `/extract`. Messages are shown to clients verbatim.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("No image file uploaded.")]
    NoImage,
    #[error("Missing or invalid GPS metadata. Image will not be saved.")]
    NoCoordinates,
    #[error("Invalid multipart upload: {}", .0.body_text())]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match &self {
            HttpError::NoImage | HttpError::NoCoordinates => StatusCode::BAD_REQUEST,
            HttpError::Multipart(e) => {
                warn!("Error: {self}");
                e.status()
            }
        };

        (status, Json(ExtractResponse::failure(self.to_string()))).into_response()
    }
}

pub type HttpResult<T = Response> = Result<T, HttpError>;
