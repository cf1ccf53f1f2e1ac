// src/middleware.rs

use std::sync::Arc;

use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{
    errors::AppError,
    session::{AdminSession, SESSION_COOKIE},
    state::AppState,
};

/// Wyciąga identyfikator sesji z ciasteczka i odszukuje aktywną sesję.
pub async fn resolve_session(parts: &mut Parts, state: &AppState) -> Option<Arc<AdminSession>> {
    // CookieJar nigdy nie odrzuca żądania
    let jar = parts.extract::<CookieJar>().await.ok()?;
    let raw_id = jar.get(SESSION_COOKIE)?.value().to_owned();

    let session_id = match Uuid::parse_str(&raw_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Nieprawidłowy identyfikator sesji w ciasteczku: {}", e);
            return None;
        }
    };

    state.sessions.get(&session_id).await
}

/// Sesja wymagana przez handler. Brak sesji kończy żądanie odpowiedzią 401.
pub struct CurrentSession(pub Arc<AdminSession>);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state).await {
            Some(session) => Ok(CurrentSession(session)),
            None => {
                tracing::warn!("Żądanie {} bez aktywnej sesji", parts.uri.path());
                Err(AppError::Unauthorized)
            }
        }
    }
}
