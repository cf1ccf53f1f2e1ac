// src/models.rs
use serde::{Deserialize, Serialize};

/// Flaga `is_enabled` trzymana w pamięci jako `bool`, a na drucie jako liczba 1/0.
/// Przy odczycie akceptujemy też wartości logiczne, bo backend bywa niekonsekwentny.
pub mod enabled_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Int(i64),
        Bool(bool),
    }

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<RawFlag>::deserialize(deserializer)? {
            Some(RawFlag::Int(value)) => value != 0,
            Some(RawFlag::Bool(value)) => value,
            None => false,
        })
    }
}

/// `null` z backendu traktujemy tak samo jak brak pola.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Produkt w postaci zwracanej przez backend (lista produktów panelu).
/// Poza `id` każde pole może być puste, żeby jeden niepełny produkt nie psuł całej listy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub id: String,
    #[serde(default)]
    pub num: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub origin_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, with = "enabled_flag")]
    pub is_enabled: bool,
    #[serde(rename = "imageUrl", default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(rename = "imagesUrl", default)]
    pub images_url: Option<Vec<String>>,
}

/// Ładunek wysyłany przy tworzeniu i edycji produktu.
/// Nazwy i typy pól muszą dokładnie odpowiadać schematowi backendu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductPayload {
    pub title: String,
    pub category: String,
    pub origin_price: f64,
    pub price: f64,
    pub unit: String,
    pub description: String,
    pub content: String,
    #[serde(with = "enabled_flag")]
    pub is_enabled: bool,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "imagesUrl")]
    pub images_url: Vec<String>,
}

/// Backend oczekuje produktu opakowanego w `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<'a, T> {
    pub data: &'a T,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub total_pages: u32,
    pub current_page: u32,
    pub has_pre: bool,
    pub has_next: bool,
    #[serde(default)]
    pub category: String,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total_pages: 1,
            current_page: 1,
            has_pre: false,
            has_next: false,
            category: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductsPage {
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}
