use crate::analytics::dataset::DatasetError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::tooling::lookup::LookupError;
use crate::tooling::notebook::NotebookError;
use crate::tooling::reference::ReferenceError;
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
    Dataset(DatasetError),
    Reference(ReferenceError),
    Notebook(NotebookError),
    Lookup(LookupError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Reference(err) => write!(f, "reference mapping error: {}", err),
            AppError::Notebook(err) => write!(f, "notebook error: {}", err),
            AppError::Lookup(err) => write!(f, "lookup error: {}", err),
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
            AppError::Dataset(err) => Some(err),
            AppError::Reference(err) => Some(err),
            AppError::Notebook(err) => Some(err),
            AppError::Lookup(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Dataset(_) | AppError::Reference(_) | AppError::Notebook(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Lookup(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

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

impl From<DatasetError> for AppError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<ReferenceError> for AppError {
    fn from(value: ReferenceError) -> Self {
        Self::Reference(value)
    }
}

impl From<NotebookError> for AppError {
    fn from(value: NotebookError) -> Self {
        Self::Notebook(value)
    }
}

impl From<LookupError> for AppError {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_errors_map_to_bad_request() {
        let error = AppError::from(DatasetError::UnknownColumn("race".to_string()));
        assert_eq!(error.to_string(), "dataset error: unknown column 'race'");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn config_errors_map_to_server_error() {
        let response = AppError::from(ConfigError::InvalidPort).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
