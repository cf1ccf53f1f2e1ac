// src/filters.rs
use serde::Deserialize;

const FIRST_PAGE: u32 = 1;

/// Parametry listy produktów panelu: numer strony i opcjonalna kategoria.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ListingParams {
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p >= FIRST_PAGE).unwrap_or(FIRST_PAGE)
    }

    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Query string do linków paginacji (bez numeru strony), zaczyna się od `&` albo jest pusty.
    pub fn filter_query_string(&self) -> String {
        match self.category() {
            Some(category) => format!("&category={}", urlencoding::encode(category)),
            None => String::new(),
        }
    }
}
