// src/main.rs

use axum::{
    Router,
    routing::{get, post},
};
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Deklaracje modułów
mod auth_models;
mod backend;
mod draft;
mod editor;
mod errors;
mod extractor;
mod filters;
mod handlers;
mod htmx_handlers;
mod images;
mod middleware;
mod models;
mod pagination;
mod response;
mod session;
mod state;
mod validators;

use crate::handlers::*;
use crate::state::{AppConfig, AppState};

pub fn app_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/session/check", post(session_check_handler))
        .route("/products", get(list_products_handler))
        .route("/products/{id}/delete", post(delete_product_handler))
        .route("/editor/new", get(editor_new_handler))
        .route("/editor/edit/{id}", get(editor_edit_handler))
        .route("/editor/field", post(editor_field_handler))
        .route("/editor/enabled", post(editor_enabled_handler))
        .route("/editor/images/input", post(editor_image_input_handler))
        .route("/editor/images", post(editor_add_image_handler))
        .route(
            "/editor/images/{index}/delete",
            post(editor_remove_image_handler),
        )
        .route("/editor/submit", post(editor_submit_handler))
        .route("/editor/close", post(editor_close_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Inicjalizacja systemu logowania (tracing)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_admin=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Inicjalizacja panelu produktów...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Nieprawidłowa konfiguracja: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Backend produktów: {} (ścieżka API: {})",
        config.backend.api_base,
        config.backend.api_path
    );

    let addr = config.bind_addr;
    let app = app_router(AppState::new(config));

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Nie można powiązać adresu {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Serwer nasłuchuje na {}", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!("Błąd serwera: {}", e);
    }
}
