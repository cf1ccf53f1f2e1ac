// src/draft.rs
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::EditorError;
use crate::images::{AppendOutcome, ImageList};
use crate::models::{ProductPayload, ProductRecord};

/// Pola szkicu edytowalne z formularza. Obrazki i flaga aktywności mają osobne operacje.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ProductField {
    Title,
    Category,
    Unit,
    OriginPrice,
    Price,
    Description,
    Content,
}

impl ProductField {
    pub fn is_numeric(self) -> bool {
        matches!(self, ProductField::OriginPrice | ProductField::Price)
    }
}

/// Zamienia tekst z pola liczbowego na nieujemną, skończoną liczbę.
/// Pusty tekst oznacza 0 (tak jak pusty `<input type="number">`).
fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    // -0 zapisujemy jako 0
    Some(if value == 0.0 { 0.0 } else { value })
}

/// Szkic produktu, nad którym pracuje edytor. To odłączona kopia: zmiany nie dotykają
/// rekordu źródłowego, dopóki backend nie przyjmie zapisu.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub category: String,
    pub unit: String,
    pub origin_price: f64,
    pub price: f64,
    pub description: String,
    pub content: String,
    pub is_enabled: bool,
    images: ImageList,
    // Przeliczany z listy tylko wtedy, gdy zmienia się jej długość
    image_url: String,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self::blank()
    }
}

impl ProductDraft {
    /// Pusty szablon używany w trybie tworzenia.
    pub fn blank() -> Self {
        Self {
            title: String::new(),
            category: String::new(),
            unit: String::new(),
            origin_price: 0.0,
            price: 0.0,
            description: String::new(),
            content: String::new(),
            is_enabled: true,
            images: ImageList::default(),
            image_url: String::new(),
        }
    }

    /// Kopiuje wszystkie edytowalne pola z istniejącego rekordu.
    pub fn from_record(record: &ProductRecord) -> Self {
        Self {
            title: record.title.clone(),
            category: record.category.clone(),
            unit: record.unit.clone(),
            origin_price: record.origin_price,
            price: record.price,
            description: record.description.clone(),
            content: record.content.clone(),
            is_enabled: record.is_enabled,
            images: ImageList::new(record.images_url.clone().unwrap_or_default()),
            image_url: record.image_url.clone(),
        }
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn images(&self) -> &ImageList {
        &self.images
    }

    /// Dodaje adres z bufora; po udanym dodaniu obrazek główny to pierwsza pozycja listy.
    pub fn add_image(&mut self, pending: &mut String) -> Result<AppendOutcome, EditorError> {
        let outcome = self.images.append(pending)?;
        if outcome == AppendOutcome::Appended {
            self.sync_primary();
        }
        Ok(outcome)
    }

    pub fn remove_image(&mut self, index: usize) -> Result<String, EditorError> {
        let removed = self.images.remove(index)?;
        self.sync_primary();
        Ok(removed)
    }

    fn sync_primary(&mut self) {
        self.images.primary().clone_into(&mut self.image_url);
    }

    /// Zmienia tylko wskazane pole. Dla cen niepoprawny tekst jest odrzucany,
    /// a pole zachowuje poprzednią wartość liczbową.
    pub fn set_field(&mut self, field: ProductField, raw: &str) -> Result<(), EditorError> {
        let text_slot = match field {
            ProductField::Title => &mut self.title,
            ProductField::Category => &mut self.category,
            ProductField::Unit => &mut self.unit,
            ProductField::Description => &mut self.description,
            ProductField::Content => &mut self.content,
            ProductField::OriginPrice | ProductField::Price => {
                let value = parse_price(raw).ok_or_else(|| EditorError::InvalidNumber {
                    field,
                    value: raw.to_string(),
                })?;
                if field == ProductField::OriginPrice {
                    self.origin_price = value;
                } else {
                    self.price = value;
                }
                return Ok(());
            }
        };

        raw.clone_into(text_slot);
        Ok(())
    }

    /// Tekstowa wartość pola, do wypełnienia formularza.
    pub fn field_value(&self, field: ProductField) -> String {
        match field {
            ProductField::Title => self.title.clone(),
            ProductField::Category => self.category.clone(),
            ProductField::Unit => self.unit.clone(),
            ProductField::OriginPrice => self.origin_price.to_string(),
            ProductField::Price => self.price.to_string(),
            ProductField::Description => self.description.clone(),
            ProductField::Content => self.content.clone(),
        }
    }

    /// Ładunek dla backendu.
    pub fn to_payload(&self) -> ProductPayload {
        ProductPayload {
            title: self.title.clone(),
            category: self.category.clone(),
            origin_price: self.origin_price,
            price: self.price,
            unit: self.unit.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            is_enabled: self.is_enabled,
            image_url: self.image_url().to_string(),
            images_url: self.images.as_slice().to_vec(),
        }
    }
}
