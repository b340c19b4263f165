use crate::config::ConfigError;
use crate::forms::FormFillError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Form(FormFillError),
    TemplateMismatch { form_id: String, missing: usize },
    Worker(tokio::task::JoinError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Form(FormFillError::TemplateNotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Form(FormFillError::InvalidPayload(_)) => StatusCode::BAD_REQUEST,
            AppError::Form(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::TemplateMismatch { .. }
            | AppError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Form(err) => err.kind(),
            AppError::Config(_) => "configuration_error",
            AppError::Telemetry(_) => "telemetry_error",
            AppError::Io(_) => "io_error",
            AppError::TemplateMismatch { .. } => "template_mismatch",
            AppError::Worker(_) => "worker_error",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Form(err) => write!(f, "{}", err),
            AppError::TemplateMismatch { form_id, missing } => write!(
                f,
                "template for form '{}' lacks {} mapped field(s)",
                form_id, missing
            ),
            AppError::Worker(err) => write!(f, "fill task failed: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Form(err) => Some(err),
            AppError::TemplateMismatch { .. } => None,
            AppError::Worker(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string(), "kind": self.kind() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<FormFillError> for AppError {
    fn from(value: FormFillError) -> Self {
        Self::Form(value)
    }
}
