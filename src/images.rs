// src/images.rs

use crate::errors::EditorError;
use crate::validators::is_valid_image_url;

/// Wynik próby dodania adresu z bufora.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Bufor był pusty, nic nie zrobiono.
    Skipped,
    Appended,
}

/// Uporządkowana lista adresów obrazków produktu (kolejność dodawania, duplikaty dozwolone).
/// `primary()` to pierwsza pozycja albo pusty tekst.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageList {
    urls: Vec<String>,
}

impl ImageList {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }

    /// Dodaje zawartość bufora na koniec listy.
    ///
    /// Pusty bufor to brak akcji. Niepoprawny adres zwraca błąd walidacji i nie rusza
    /// ani listy, ani bufora. Poprawny adres trafia na koniec listy, a bufor jest czyszczony.
    pub fn append(&mut self, pending: &mut String) -> Result<AppendOutcome, EditorError> {
        if pending.is_empty() {
            return Ok(AppendOutcome::Skipped);
        }
        if !is_valid_image_url(pending) {
            tracing::warn!("Odrzucono adres obrazka spoza https: '{}'", pending);
            return Err(EditorError::InvalidImageUrl(pending.clone()));
        }

        self.urls.push(std::mem::take(pending));
        Ok(AppendOutcome::Appended)
    }

    /// Usuwa dokładnie jeden element. Indeks spoza zakresu (nieaktualny widok
    /// w przeglądarce) zwraca `ImageIndexOutOfRange`.
    pub fn remove(&mut self, index: usize) -> Result<String, EditorError> {
        if index >= self.urls.len() {
            return Err(EditorError::ImageIndexOutOfRange {
                index,
                len: self.urls.len(),
            });
        }
        Ok(self.urls.remove(index))
    }

    pub fn primary(&self) -> &str {
        self.urls.first().map_or("", String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.urls.iter()
    }
}
