// src/validators.rs

const HTTPS_SCHEME: &str = "https://";

/// Sprawdza, czy adres obrazka zaczyna się od `https://` (bez względu na wielkość liter).
/// Walidacja jest czysto składniowa, nie wykonujemy żadnych zapytań sieciowych.
pub fn is_valid_image_url(candidate: &str) -> bool {
    candidate
        .get(..HTTPS_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(HTTPS_SCHEME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_in_any_case() {
        assert!(is_valid_image_url("https://x.com/a.png"));
        assert!(is_valid_image_url("HTTPS://X.COM/A.PNG"));
        assert!(is_valid_image_url("HtTpS://cdn.example.org/img?id=1"));
    }

    #[test]
    fn rejects_other_schemes_and_relative_paths() {
        assert!(!is_valid_image_url("ftp://x.com/a.png"));
        assert!(!is_valid_image_url("http://x.com/a.png"));
        assert!(!is_valid_image_url("/images/a.png"));
        assert!(!is_valid_image_url("x.com/a.png"));
        assert!(!is_valid_image_url(" https://x.com/a.png"));
        assert!(!is_valid_image_url("https:/x.com"));
        assert!(!is_valid_image_url(""));
    }

    #[test]
    fn does_not_panic_on_multibyte_prefix() {
        assert!(!is_valid_image_url("żółw://a"));
        assert!(!is_valid_image_url("ht"));
    }
}
