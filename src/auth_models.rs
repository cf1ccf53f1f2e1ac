// src/auth_models.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "Niepoprawny format adresu email"))]
    pub username: String,

    #[validate(length(min = 1, message = "Hasło jest wymagane"))]
    pub password: String,
}

/// Odpowiedź backendu na logowanie. `expired` to znacznik czasu w milisekundach.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub uid: String,
    pub token: String,
    pub expired: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionCheckResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_payload_requires_email_and_password() {
        let ok = LoginPayload {
            username: "admin@example.com".into(),
            password: "sekret".into(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginPayload {
            username: "admin".into(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("password"));
    }
}
