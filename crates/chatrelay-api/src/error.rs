//! API error types and the JSON error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatrelay_core::CoreError;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request fields.
    #[error("{message}")]
    InvalidRequest {
        message: String,
        param: Option<String>,
    },

    #[error("invalid api key")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// A failure inside the prompt pipeline or the server itself.
    ///
    /// `expose` controls whether the detail reaches the client.
    #[error("{detail}")]
    Server { detail: String, expose: bool },
}

/// `{ "error": { message, type, param, code } }`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub param: Option<String>,
    pub code: Option<String>,
}

impl ApiError {
    pub fn invalid(message: impl Into<String>, param: Option<&str>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            param: param.map(str::to_string),
        }
    }

    /// Wrap a pipeline failure, keeping its detail only in development mode.
    pub fn from_core(error: &CoreError, dev_mode: bool) -> Self {
        Self::Server {
            detail: error.to_string(),
            expose: dev_mode,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Server { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request_error",
            Self::Unauthorized => "authentication_error",
            Self::NotFound(_) => "not_found_error",
            Self::Server { .. } => "server_error",
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let (message, param, code) = match self {
            Self::InvalidRequest { message, param } => (message.clone(), param.clone(), None),
            Self::Unauthorized => (self.to_string(), None, Some("invalid_api_key".to_string())),
            Self::NotFound(message) => (message.clone(), None, None),
            Self::Server { detail, expose } => {
                let message = if *expose {
                    detail.clone()
                } else {
                    INTERNAL_MESSAGE.to_string()
                };
                (message, None, None)
            }
        };
        ErrorEnvelope {
            error: ErrorBody {
                message,
                error_type: self.error_type(),
                param,
                code,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.envelope())).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::NotFound(e.to_string())
    }
}
