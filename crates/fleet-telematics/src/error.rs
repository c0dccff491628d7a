use crate::chat::ChatStoreError;
use crate::config::ConfigError;
use crate::fleet::export::ExportError;
use crate::fleet::rules::RuleError;
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
    Server(axum::Error),
    Chat(ChatStoreError),
    Export(ExportError),
    Rule(RuleError),
    NotFound(String),
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Chat(err) => write!(f, "chat error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Rule(err) => write!(f, "rule error: {}", err),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::BadRequest(reason) => write!(f, "bad request: {}", reason),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Chat(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Rule(err) => Some(err),
            AppError::NotFound(_) | AppError::BadRequest(_) => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_)
            | AppError::Chat(ChatStoreError::UnknownConversation(_))
            | AppError::Rule(RuleError::UnknownRule(_)) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::Chat(ChatStoreError::EmptyMessage)
            | AppError::Rule(RuleError::InvalidThreshold(_)) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Chat(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
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

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ChatStoreError> for AppError {
    fn from(value: ChatStoreError) -> Self {
        Self::Chat(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<RuleError> for AppError {
    fn from(value: RuleError) -> Self {
        Self::Rule(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::from(ChatStoreError::UnknownConversation(7)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ChatStoreError::EmptyMessage).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("vehicle XYZ-999".to_string()).to_string(),
            "vehicle XYZ-999 not found"
        );
    }

    #[test]
    fn storage_failures_are_server_errors() {
        let err = AppError::from(ChatStoreError::Unavailable("disk full".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "chat error: chat store unavailable: disk full");
    }
}
