// src/errors.rs

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use reqwest::StatusCode as BackendStatus;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::draft::ProductField;
use crate::response::{ToastKind, insert_toast};

pub const GENERIC_BACKEND_MESSAGE: &str = "Serwer produktów nie odpowiedział poprawnie, spróbuj ponownie";

/// Błędy edytora produktu. Żaden z nich nie jest krytyczny: po każdym szkic wraca
/// do stanu, w którym można go dalej poprawiać.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("Nieprawidłowy adres obrazka (wymagany https://): {0}")]
    InvalidImageUrl(String),

    #[error("Pole '{field}' musi być nieujemną liczbą, otrzymano '{value}'")]
    InvalidNumber { field: ProductField, value: String },

    #[error("Brak obrazka o indeksie {index} (lista ma {len} pozycji)")]
    ImageIndexOutOfRange { index: usize, len: usize },

    #[error("Tryb edycji wymaga wskazania edytowanego produktu")]
    MissingEditTarget,

    #[error("{0}")]
    Remote(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorErrorKind {
    Validation,
    Precondition,
    Remote,
}

impl EditorError {
    pub fn kind(&self) -> EditorErrorKind {
        match self {
            EditorError::InvalidImageUrl(_)
            | EditorError::InvalidNumber { .. }
            | EditorError::ImageIndexOutOfRange { .. } => EditorErrorKind::Validation,
            EditorError::MissingEditTarget => EditorErrorKind::Precondition,
            EditorError::Remote(_) => EditorErrorKind::Remote,
        }
    }
}

/// Błędy klienta backendu produktów.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Błąd sieci podczas komunikacji z backendem: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend odrzucił żądanie (status {status}): {message}")]
    Rejected {
        status: BackendStatus,
        message: String,
    },

    #[error("Nie można przetworzyć odpowiedzi backendu: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Nieprawidłowy adres endpointu: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Komunikat, który można pokazać administratorowi.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            _ => GENERIC_BACKEND_MESSAGE.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ApiError::Rejected { status, .. }
                if *status == BackendStatus::UNAUTHORIZED || *status == BackendStatus::FORBIDDEN
        )
    }
}

impl From<ApiError> for EditorError {
    fn from(err: ApiError) -> Self {
        EditorError::Remote(err.user_message())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Brak wymaganej zmiennej środowiskowej {0}")]
    Missing(&'static str),

    #[error("Nieprawidłowa wartość zmiennej {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Błędy walidacji")]
    ValidationError(#[from] ValidationErrors),

    #[error("Brak aktywnej sesji administratora")]
    Unauthorized,

    #[error("Nie znaleziono zasobu: {0}")]
    NotFound(String),

    #[error("Niepoprawne żądanie: {0}")]
    BadRequest(String),
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let msg = error.message.as_ref().map_or_else(
                || format!("Pole '{}' jest nieprawidłowe", field),
                |m| format!("Pole '{}': {}", field, m),
            );
            messages.push(msg);
        }
    }
    messages.join("; ")
}

fn unauthorized_response() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("HX-Redirect", HeaderValue::from_static("/"));
    (
        StatusCode::UNAUTHORIZED,
        headers,
        Json(json!({ "error": "Sesja wygasła, zaloguj się ponownie" })),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Editor(err) => {
                let status = match err.kind() {
                    EditorErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                    EditorErrorKind::Precondition => StatusCode::CONFLICT,
                    EditorErrorKind::Remote => StatusCode::BAD_GATEWAY,
                };
                (status, err.to_string())
            }
            AppError::Api(err) => {
                if err.is_unauthorized() {
                    tracing::warn!("Backend odrzucił token sesji: {}", err);
                    return unauthorized_response();
                }
                tracing::error!("Błąd backendu produktów: {:?}", err);
                (StatusCode::BAD_GATEWAY, err.user_message())
            }
            AppError::ValidationError(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, validation_message(&errors))
            }
            AppError::Unauthorized => return unauthorized_response(),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        // Odpowiedzi htmx nie podmieniają treści, tylko pokazują komunikat
        let mut headers = HeaderMap::new();
        headers.insert("HX-Reswap", HeaderValue::from_static("none"));
        let kind = if status.is_server_error() {
            ToastKind::Error
        } else {
            ToastKind::Warning
        };
        insert_toast(&mut headers, &error_message, kind);

        (status, headers, Json(json!({ "error": error_message }))).into_response()
    }
}
