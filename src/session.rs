// src/session.rs

use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

use crate::backend::{BackendClient, SessionApi};
use crate::editor::{EditorEvent, ProductEditor};
use crate::models::{Pagination, ProductRecord};

pub const SESSION_COOKIE: &str = "admin_session";
const MAX_SESSIONS: u64 = 1_000;

/// Edytor sesji razem z odbiornikiem jego zdarzeń.
#[derive(Debug)]
pub struct EditorSlot {
    pub editor: ProductEditor,
    events: UnboundedReceiver<EditorEvent>,
}

impl EditorSlot {
    pub fn new() -> Self {
        let (editor, events) = ProductEditor::new();
        Self { editor, events }
    }

    /// Zbiera zdarzenia wyemitowane od ostatniego odczytu.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for EditorSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Ostatnio wyświetlona strona listy; z niej edytor bierze rekord do edycji.
#[derive(Debug, Default, Clone)]
pub struct Listing {
    pub products: Vec<Arc<ProductRecord>>,
    pub pagination: Pagination,
}

impl Listing {
    pub fn find(&self, id: &str) -> Option<Arc<ProductRecord>> {
        self.products.iter().find(|p| p.id == id).cloned()
    }
}

#[derive(Debug)]
pub struct AdminSession {
    pub id: Uuid,
    pub uid: String,
    token: String,
    expires_at: DateTime<Utc>,
    editor: Mutex<EditorSlot>,
    listing: RwLock<Listing>,
}

impl AdminSession {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn api(&self, backend: &BackendClient) -> SessionApi {
        SessionApi::new(backend.clone(), self.token.clone())
    }

    pub async fn editor(&self) -> MutexGuard<'_, EditorSlot> {
        self.editor.lock().await
    }

    pub async fn listing(&self) -> Listing {
        self.listing.read().await.clone()
    }

    pub async fn remember_listing(&self, products: Vec<ProductRecord>, pagination: Pagination) {
        let mut listing = self.listing.write().await;
        listing.products = products.into_iter().map(Arc::new).collect();
        listing.pagination = pagination;
    }
}

/// Sesje administratorów trzymane w pamięci, wygasają po okresie bezczynności.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<Uuid, Arc<AdminSession>>,
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_idle(idle)
                .build(),
        }
    }

    pub async fn create(
        &self,
        token: String,
        uid: String,
        expires_at: DateTime<Utc>,
    ) -> Arc<AdminSession> {
        let session = Arc::new(AdminSession {
            id: Uuid::new_v4(),
            uid,
            token,
            expires_at,
            editor: Mutex::new(EditorSlot::new()),
            listing: RwLock::new(Listing::default()),
        });
        self.cache.insert(session.id, Arc::clone(&session)).await;
        tracing::info!(
            "Utworzono sesję {} (ważna do {})",
            session.id,
            session.expires_at
        );
        session
    }

    /// Zwraca aktywną sesję; sesje z wygasłym tokenem są od razu usuwane.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<AdminSession>> {
        let session = self.cache.get(id).await?;
        if session.is_expired(Utc::now()) {
            tracing::info!("Token sesji {} wygasł, usuwam sesję", id);
            self.cache.invalidate(id).await;
            return None;
        }
        Some(session)
    }

    pub async fn remove(&self, id: &Uuid) {
        self.cache.invalidate(id).await;
    }
}

pub fn session_cookie(id: Uuid, max_age: time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Ciasteczko, które nadpisze sesyjne i natychmiast wygaśnie.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    session_cookie(Uuid::nil(), time::Duration::ZERO, secure)
}

/// Czas życia ciasteczka liczony do wygaśnięcia tokenu backendu.
pub fn cookie_max_age(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> time::Duration {
    let seconds = (expires_at - now).num_seconds().max(0);
    time::Duration::seconds(seconds)
}
