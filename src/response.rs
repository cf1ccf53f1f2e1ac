// src/response.rs

use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use maud::Markup;
use serde_json::{Value, json};

use crate::htmx_handlers::render_page_shell_maud;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

impl ToastKind {
    fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        }
    }
}

/// Nagłówki HTTP przenoszą tylko ASCII, więc znaki spoza ASCII zamieniamy na sekwencje `\uXXXX`.
/// `JSON.parse` po stronie przeglądarki odtworzy oryginalny tekst.
fn ascii_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

/// Scala zdarzenie z już istniejącym nagłówkiem `HX-Trigger` (jeśli jest).
pub fn insert_trigger(headers: &mut HeaderMap, event: &str, detail: Value) {
    let mut payload = headers
        .get("HX-Trigger")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| serde_json::from_str::<Value>(s).ok())
        .filter(Value::is_object)
        .unwrap_or_else(|| json!({}));

    if let Some(map) = payload.as_object_mut() {
        map.insert(event.to_string(), detail);
    }

    match HeaderValue::from_str(&ascii_json(&payload)) {
        Ok(value) => {
            headers.insert("HX-Trigger", value);
        }
        Err(e) => tracing::error!("Nie można zbudować nagłówka HX-Trigger: {}", e),
    }
}

pub fn insert_toast(headers: &mut HeaderMap, message: &str, kind: ToastKind) {
    insert_trigger(
        headers,
        "showMessage",
        json!({ "message": message, "type": kind.as_str() }),
    );
}

/// Dla żądań htmx zwraca sam fragment, dla pełnego odświeżenia strony (F5) całą stronę.
pub fn build_response(headers: &HeaderMap, page_content: Markup) -> Response {
    if headers.contains_key("HX-Request") {
        page_content.into_response()
    } else {
        Html(render_page_shell_maud(page_content).into_string()).into_response()
    }
}
