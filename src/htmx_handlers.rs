// src/htmx_handlers.rs

use std::sync::Arc;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde_json::json;
use strum::IntoEnumIterator;

use crate::draft::ProductField;
use crate::editor::{EditorMode, ProductEditor};
use crate::filters::ListingParams;
use crate::models::{Pagination, ProductRecord};
use crate::pagination::{PageSlot, page_slots};

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

// Komunikaty (showMessage) i zamykanie okna edytora (closeModal) obsługujemy na stronie
const SHELL_SCRIPT: &str = r#"
document.body.addEventListener('showMessage', function (evt) {
  var box = document.getElementById('toast');
  box.textContent = evt.detail.message;
  box.dataset.type = evt.detail.type;
  box.hidden = false;
  setTimeout(function () { box.hidden = true; }, 4000);
});
document.body.addEventListener('closeModal', function () {
  document.getElementById('editor-modal').innerHTML = '';
});
"#;

fn format_price_maud(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{:.0}", price)
    } else {
        format!("{:.2}", price)
    }
}

fn field_label(field: ProductField) -> &'static str {
    match field {
        ProductField::Title => "Tytuł",
        ProductField::Category => "Kategoria",
        ProductField::Unit => "Jednostka",
        ProductField::OriginPrice => "Cena pierwotna",
        ProductField::Price => "Cena sprzedaży",
        ProductField::Description => "Opis produktu",
        ProductField::Content => "Treść opisu",
    }
}

/// Szkielet pełnej strony; fragmenty htmx trafiają do `#content`.
pub fn render_page_shell_maud(content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pl" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Panel produktów" }
                script src=(HTMX_SRC) {}
            }
            body {
                header .admin-header {
                    h1 { "Panel produktów" }
                    button type="button"
                        "hx-post"="/session/check"
                        "hx-target"="#content"
                        "hx-swap"="innerHTML" {
                        "Sprawdź stan logowania"
                    }
                }
                main #content { (content) }
                div #editor-modal {}
                div #toast role="status" hidden {}
                script { (PreEscaped(SHELL_SCRIPT)) }
            }
        }
    }
}

pub fn render_login_form_maud() -> Markup {
    html! {
        div .login {
            h2 { "Zaloguj się" }
            form #login-form "hx-post"="/login" "hx-swap"="none" {
                div {
                    label for="username" { "Adres email" }
                    input #username type="email" name="username" placeholder="name@example.com" required autofocus;
                }
                div {
                    label for="password" { "Hasło" }
                    input #password type="password" name="password" required;
                }
                button type="submit" { "Zaloguj" }
            }
        }
    }
}

fn page_url(page: u32, params: &ListingParams) -> String {
    format!("/products?page={}{}", page, params.filter_query_string())
}

fn render_pagination_maud(pagination: &Pagination, params: &ListingParams) -> Markup {
    html! {
        nav #pagination-controls aria-label="Paginacja" {
            @if pagination.has_pre {
                button type="button"
                    "hx-get"=(page_url(pagination.current_page.saturating_sub(1).max(1), params))
                    "hx-target"="#products-table" "hx-swap"="outerHTML" {
                    "Poprzednia"
                }
            } @else {
                span .disabled { "Poprzednia" }
            }
            @for slot in page_slots(pagination) {
                @match slot {
                    PageSlot::Page { number, current: true } => {
                        span .current aria-current="page" { (number) }
                    }
                    PageSlot::Page { number, current: false } => {
                        button type="button"
                            "hx-get"=(page_url(number, params))
                            "hx-target"="#products-table" "hx-swap"="outerHTML" {
                            (number)
                        }
                    }
                    PageSlot::Gap => {
                        span .gap { "..." }
                    }
                }
            }
            @if pagination.has_next {
                button type="button"
                    "hx-get"=(page_url(pagination.current_page + 1, params))
                    "hx-target"="#products-table" "hx-swap"="outerHTML" {
                    "Następna"
                }
            } @else {
                span .disabled { "Następna" }
            }
        }
    }
}

/// Tabela produktów; odświeża się sama po zdarzeniu `productsChanged`.
pub fn render_product_table_maud(
    products: &[Arc<ProductRecord>],
    pagination: &Pagination,
    params: &ListingParams,
) -> Markup {
    let current_page = pagination.current_page.max(1);
    let current_url = page_url(current_page, params);
    html! {
        div #products-table
            "hx-get"=(current_url)
            "hx-trigger"="productsChanged from:body"
            "hx-swap"="outerHTML" {
            table {
                thead {
                    tr {
                        th { "Nazwa produktu" }
                        th { "Kategoria" }
                        th { "Cena pierwotna" }
                        th { "Cena sprzedaży" }
                        th { "Aktywny" }
                        th { "Akcje" }
                    }
                }
                tbody {
                    @if products.is_empty() {
                        tr { td colspan="6" { "Brak produktów" } }
                    } @else {
                        @for product in products {
                            tr {
                                td { (product.title) }
                                td { (product.category) }
                                td { (format_price_maud(product.origin_price)) }
                                td { (format_price_maud(product.price)) }
                                @if product.is_enabled {
                                    td { "Aktywny" }
                                } @else {
                                    td .text-danger { "Nieaktywny" }
                                }
                                td {
                                    button type="button"
                                        "hx-get"=(format!("/editor/edit/{}", urlencoding::encode(&product.id)))
                                        "hx-target"="#editor-modal" "hx-swap"="innerHTML" {
                                        "Edytuj"
                                    }
                                    button type="button" .danger
                                        "hx-post"=(format!("/products/{}/delete?page={}{}", urlencoding::encode(&product.id), current_page, params.filter_query_string()))
                                        "hx-confirm"=(format!("Czy na pewno usunąć produkt \"{}\"?", product.title))
                                        "hx-target"="#products-table" "hx-swap"="outerHTML" {
                                        "Usuń"
                                    }
                                }
                            }
                        }
                    }
                }
            }
            @if pagination.total_pages > 1 {
                (render_pagination_maud(pagination, params))
            }
        }
    }
}

pub fn render_products_page_maud(
    products: &[Arc<ProductRecord>],
    pagination: &Pagination,
    params: &ListingParams,
) -> Markup {
    html! {
        section .products {
            div .toolbar {
                h2 { "Lista produktów" }
                button type="button"
                    "hx-get"="/editor/new" "hx-target"="#editor-modal" "hx-swap"="innerHTML" {
                    "Dodaj produkt"
                }
                button type="button" "hx-post"="/logout" "hx-swap"="none" { "Wyloguj" }
            }
            (render_product_table_maud(products, pagination, params))
        }
    }
}

/// Panel obrazków: bufor adresu, przycisk dodawania i lista z przyciskami usuwania.
pub fn render_image_panel_maud(editor: &ProductEditor) -> Markup {
    let draft = editor.draft();
    html! {
        div #image-panel {
            label for="image-url-input" { "Adres obrazka" }
            input #image-url-input type="text" name="image_url"
                placeholder="https://..."
                value=(editor.image_url_input())
                "hx-post"="/editor/images/input"
                "hx-trigger"="change"
                "hx-swap"="none";
            button type="button"
                "hx-post"="/editor/images"
                "hx-include"="#image-url-input"
                "hx-target"="#image-panel"
                "hx-swap"="outerHTML" {
                "Dodaj obrazek"
            }
            @if draft.images().is_empty() {
                p .muted { "Brak obrazków" }
            } @else {
                p .primary-image { "Obrazek główny: " (draft.image_url()) }
                p .muted { "Liczba obrazków: " (draft.images().len()) }
            }
            @for (index, url) in draft.images().iter().enumerate() {
                div .image-item {
                    img src=(url) alt="";
                    button type="button" .danger
                        "hx-post"=(format!("/editor/images/{}/delete", index))
                        "hx-target"="#image-panel"
                        "hx-swap"="outerHTML" {
                        "Usuń obrazek"
                    }
                }
            }
        }
    }
}

fn render_field_input_maud(editor: &ProductEditor, field: ProductField) -> Markup {
    let id = field.as_ref();
    let value = editor.draft().field_value(field);
    let vals = json!({ "field": id }).to_string();
    html! {
        div .field {
            label for=(id) { (field_label(field)) }
            @if matches!(field, ProductField::Description | ProductField::Content) {
                textarea id=(id) name="value"
                    "hx-post"="/editor/field" "hx-vals"=(vals)
                    "hx-trigger"="change" "hx-swap"="none" {
                    (value)
                }
            } @else if field.is_numeric() {
                input id=(id) type="number" min="0" step="any" name="value" value=(value)
                    "hx-post"="/editor/field" "hx-vals"=(vals)
                    "hx-trigger"="change" "hx-swap"="none";
            } @else {
                input id=(id) type="text" name="value" value=(value)
                    "hx-post"="/editor/field" "hx-vals"=(vals)
                    "hx-trigger"="change" "hx-swap"="none";
            }
        }
    }
}

pub fn render_product_modal_maud(editor: &ProductEditor) -> Markup {
    let heading = match editor.mode() {
        EditorMode::Create => "Nowy produkt",
        EditorMode::Edit => "Edycja produktu",
    };
    html! {
        div #product-modal .modal role="dialog" aria-labelledby="product-modal-label" {
            div .modal-header {
                h5 #product-modal-label {
                    span { (heading) }
                    @if let Some(target) = editor.target() {
                        " " (target.id)
                    }
                }
                button type="button" aria-label="Zamknij"
                    "hx-post"="/editor/close" "hx-target"="#editor-modal" "hx-swap"="innerHTML" {
                    "×"
                }
            }
            div .modal-body {
                div .images-column {
                    (render_image_panel_maud(editor))
                }
                div .fields-column {
                    @for field in ProductField::iter() {
                        (render_field_input_maud(editor, field))
                    }
                    div .field {
                        input #is_enabled type="checkbox" name="is_enabled" value="1"
                            checked[editor.draft().is_enabled]
                            "hx-post"="/editor/enabled"
                            "hx-trigger"="change"
                            "hx-swap"="none";
                        label for="is_enabled" { "Produkt aktywny" }
                    }
                }
            }
            div .modal-footer {
                button type="button"
                    "hx-post"="/editor/close" "hx-target"="#editor-modal" "hx-swap"="innerHTML" {
                    "Anuluj"
                }
                button type="button" .primary
                    "hx-post"="/editor/submit"
                    "hx-swap"="none"
                    "hx-disabled-elt"="this" {
                    "Zatwierdź"
                }
            }
        }
    }
}
