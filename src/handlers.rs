// src/handlers.rs

use std::str::FromStr;

use axum::{
    Form,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::auth_models::LoginPayload;
use crate::draft::ProductField;
use crate::editor::{EditorEvent, EditorMode};
use crate::errors::{ApiError, AppError};
use crate::extractor::OptionalSession;
use crate::filters::ListingParams;
use crate::htmx_handlers::{
    render_image_panel_maud, render_login_form_maud, render_product_modal_maud,
    render_product_table_maud, render_products_page_maud,
};
use crate::images::AppendOutcome;
use crate::middleware::CurrentSession;
use crate::response::{ToastKind, build_response, insert_toast, insert_trigger};
use crate::session::{AdminSession, Listing, cookie_max_age, removal_cookie, session_cookie};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FieldForm {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct EnabledForm {
    // Niezaznaczony checkbox nie jest wysyłany wcale
    #[serde(default)]
    pub is_enabled: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageUrlForm {
    #[serde(default)]
    pub image_url: Option<String>,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

/// Pobiera stronę listy z backendu i zapamiętuje ją w sesji.
async fn load_listing(
    state: &AppState,
    session: &AdminSession,
    params: &ListingParams,
) -> Result<Listing, ApiError> {
    let page = state
        .backend
        .list_products(session.token(), params.page(), params.category())
        .await?;
    session
        .remember_listing(page.products, page.pagination)
        .await;
    Ok(session.listing().await)
}

pub async fn index_handler(
    headers: HeaderMap,
    State(state): State<AppState>,
    jar: CookieJar,
    OptionalSession(session): OptionalSession,
) -> Result<Response, AppError> {
    let Some(session) = session else {
        return Ok(build_response(&headers, render_login_form_maud()));
    };

    let params = ListingParams::default();
    match load_listing(&state, &session, &params).await {
        Ok(listing) => Ok(build_response(
            &headers,
            render_products_page_maud(&listing.products, &listing.pagination, &params),
        )),
        Err(e) if e.is_unauthorized() => {
            tracing::warn!("Token sesji {} nie jest już akceptowany", session.id);
            state.sessions.remove(&session.id).await;
            let jar = jar.add(removal_cookie(state.config.cookie_secure));
            Ok((jar, build_response(&headers, render_login_form_maud())).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        tracing::warn!("Błąd walidacji danych logowania: {:?}", validation_errors);
        return Err(AppError::ValidationError(validation_errors));
    }

    let signed_in = match state.backend.sign_in(&payload).await {
        Ok(response) => response,
        Err(e @ ApiError::Rejected { .. }) => {
            tracing::warn!("Nieudana próba logowania dla {}: {}", payload.username, e);
            return Err(AppError::BadRequest(e.user_message()));
        }
        Err(e) => return Err(e.into()),
    };

    let now = Utc::now();
    let expires_at = DateTime::from_timestamp_millis(signed_in.expired)
        .filter(|at| *at > now)
        .unwrap_or_else(|| {
            tracing::warn!(
                "Backend zwrócił niepoprawny czas wygaśnięcia tokenu: {}",
                signed_in.expired
            );
            now + TimeDelta::from_std(state.config.session_idle).unwrap_or(TimeDelta::hours(8))
        });

    let session = state
        .sessions
        .create(signed_in.token, signed_in.uid, expires_at)
        .await;
    let cookie = session_cookie(
        session.id,
        cookie_max_age(expires_at, now),
        state.config.cookie_secure,
    );

    tracing::info!(
        "Zalogowano administratora {} (uid {})",
        payload.username,
        session.uid
    );

    let mut headers = HeaderMap::new();
    headers.insert("HX-Refresh", HeaderValue::from_static("true"));
    insert_toast(&mut headers, &signed_in.message, ToastKind::Success);

    Ok((jar.add(cookie), headers, StatusCode::OK))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    OptionalSession(session): OptionalSession,
) -> impl IntoResponse {
    if let Some(session) = session {
        state.sessions.remove(&session.id).await;
        tracing::info!("Wylogowano sesję {}", session.id);
    }

    let mut headers = HeaderMap::new();
    headers.insert("HX-Redirect", HeaderValue::from_static("/"));
    (jar.add(removal_cookie(state.config.cookie_secure)), headers)
}

pub async fn session_check_handler(
    headers: HeaderMap,
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    if state.backend.check_session(session.token()).await? {
        let mut response_headers = HeaderMap::new();
        response_headers.insert("HX-Reswap", HeaderValue::from_static("none"));
        let message = format!(
            "Sesja jest aktywna do {}",
            session.expires_at().format("%Y-%m-%d %H:%M")
        );
        insert_toast(&mut response_headers, &message, ToastKind::Success);
        return Ok((response_headers, StatusCode::OK).into_response());
    }

    tracing::info!("Backend uznał token sesji {} za nieważny", session.id);
    state.sessions.remove(&session.id).await;
    let jar = jar.add(removal_cookie(state.config.cookie_secure));
    Ok((jar, build_response(&headers, render_login_form_maud())).into_response())
}

pub async fn list_products_handler(
    headers: HeaderMap,
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(params): Query<ListingParams>,
) -> Result<Response, AppError> {
    tracing::info!(
        "Lista produktów: strona {}, kategoria {:?}",
        params.page(),
        params.category()
    );
    let listing = load_listing(&state, &session, &params).await?;

    let response = if is_htmx(&headers) {
        render_product_table_maud(&listing.products, &listing.pagination, &params).into_response()
    } else {
        build_response(
            &headers,
            render_products_page_maud(&listing.products, &listing.pagination, &params),
        )
    };
    Ok(response)
}

pub async fn delete_product_handler(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Path(product_id): Path<String>,
    Query(params): Query<ListingParams>,
) -> Result<Response, AppError> {
    let message = state
        .backend
        .delete_product(session.token(), &product_id)
        .await?;
    let listing = load_listing(&state, &session, &params).await?;

    let mut headers = HeaderMap::new();
    insert_toast(&mut headers, &message, ToastKind::Success);
    Ok((
        headers,
        render_product_table_maud(&listing.products, &listing.pagination, &params),
    )
        .into_response())
}

pub async fn editor_new_handler(
    headers: HeaderMap,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    let mut slot = session.editor().await;
    slot.editor.open(EditorMode::Create, None)?;
    Ok(build_response(&headers, render_product_modal_maud(&slot.editor)))
}

pub async fn editor_edit_handler(
    headers: HeaderMap,
    CurrentSession(session): CurrentSession,
    Path(product_id): Path<String>,
) -> Result<Response, AppError> {
    let record = session.listing().await.find(&product_id).ok_or_else(|| {
        tracing::warn!("Produkt {} nie występuje na wyświetlanej liście", product_id);
        AppError::NotFound(format!("Nie znaleziono produktu {}", product_id))
    })?;

    let mut slot = session.editor().await;
    slot.editor.open(EditorMode::Edit, Some(record))?;
    Ok(build_response(&headers, render_product_modal_maud(&slot.editor)))
}

pub async fn editor_field_handler(
    CurrentSession(session): CurrentSession,
    Form(form): Form<FieldForm>,
) -> Result<StatusCode, AppError> {
    let field = ProductField::from_str(&form.field)
        .map_err(|_| AppError::BadRequest(format!("Nieznane pole '{}'", form.field)))?;

    session.editor().await.editor.set_field(field, &form.value)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn editor_enabled_handler(
    CurrentSession(session): CurrentSession,
    Form(form): Form<EnabledForm>,
) -> StatusCode {
    session
        .editor()
        .await
        .editor
        .set_enabled(form.is_enabled.is_some());
    StatusCode::NO_CONTENT
}

pub async fn editor_image_input_handler(
    CurrentSession(session): CurrentSession,
    Form(form): Form<ImageUrlForm>,
) -> StatusCode {
    session
        .editor()
        .await
        .editor
        .set_image_url_input(form.image_url.unwrap_or_default());
    StatusCode::NO_CONTENT
}

pub async fn editor_add_image_handler(
    CurrentSession(session): CurrentSession,
    Form(form): Form<ImageUrlForm>,
) -> Result<Response, AppError> {
    let mut slot = session.editor().await;
    if let Some(url) = form.image_url {
        slot.editor.set_image_url_input(url);
    }

    let outcome = slot.editor.add_image()?;
    let mut headers = HeaderMap::new();
    if outcome == AppendOutcome::Appended {
        insert_toast(&mut headers, "Dodano obrazek", ToastKind::Success);
    }
    Ok((headers, render_image_panel_maud(&slot.editor)).into_response())
}

pub async fn editor_remove_image_handler(
    CurrentSession(session): CurrentSession,
    Path(index): Path<usize>,
) -> Result<Response, AppError> {
    let mut slot = session.editor().await;
    let removed = slot.editor.remove_image(index)?;
    tracing::debug!("Usunięto obrazek {} z pozycji {}", removed, index);
    Ok(render_image_panel_maud(&slot.editor).into_response())
}

pub async fn editor_submit_handler(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Response, AppError> {
    // Blokada edytora nie jest trzymana w trakcie zapytania do backendu
    let request = session.editor().await.editor.begin_submit()?;
    tracing::info!(
        "Zapis produktu '{}' w trybie {}",
        request.payload().title,
        request.mode()
    );
    let receipt = request.send(&session.api(&state.backend)).await?;

    let mut slot = session.editor().await;
    let message = receipt.message().to_string();
    slot.editor.finish_submit(receipt);

    let mut headers = HeaderMap::new();
    for event in slot.drain_events() {
        match event {
            EditorEvent::Close => insert_trigger(&mut headers, "closeModal", json!({})),
            EditorEvent::Refresh => insert_trigger(&mut headers, "productsChanged", json!({})),
        }
    }
    insert_toast(&mut headers, &message, ToastKind::Success);

    Ok((StatusCode::OK, headers).into_response())
}

pub async fn editor_close_handler(CurrentSession(session): CurrentSession) -> Html<&'static str> {
    session.editor().await.editor.close();
    Html("")
}
