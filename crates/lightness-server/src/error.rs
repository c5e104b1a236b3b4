use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lightness_core::error::LightnessError;

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<LightnessError>() {
            Some(e) => match e {
                LightnessError::NotFound(_) => StatusCode::NOT_FOUND,
                LightnessError::InvalidInput(_)
                | LightnessError::InvalidPersona(_)
                | LightnessError::InvalidEmotion(_)
                | LightnessError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
                LightnessError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                LightnessError::Db(_)
                | LightnessError::Io(_)
                | LightnessError::Yaml(_)
                | LightnessError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {:#}", self.0);
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
