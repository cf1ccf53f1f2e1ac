// src/extractor.rs

use std::convert::Infallible;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::middleware::resolve_session;
use crate::session::AdminSession;
use crate::state::AppState;

/// Zawiera `Some(sesja)`, jeśli ciasteczko wskazuje aktywną sesję, lub `None` w każdym innym przypadku.
pub struct OptionalSession(pub Option<Arc<AdminSession>>);

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(resolve_session(parts, state).await))
    }
}
