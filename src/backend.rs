// src/backend.rs

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth_models::{LoginPayload, SessionCheckResponse, SignInResponse};
use crate::editor::ProductApi;
use crate::errors::ApiError;
use crate::models::{DataEnvelope, MessageResponse, ProductPayload, ProductsPage};
use crate::state::BackendConfig;

/// Wyciąga komunikat z odpowiedzi backendu. Pole `message` bywa tekstem albo listą tekstów.
fn extract_message(body: &Value) -> String {
    match body.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    }
}

/// Klient HTTP backendu produktów. Klonowanie jest tanie (współdzielona pula połączeń).
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: Client,
    api_base: Url,
    api_path: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            http: Client::new(),
            api_base: config.api_base.clone(),
            api_path: config.api_path.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        // `Url::join` z ukośnikiem na początku zgubiłby ścieżkę bazową (np. `/v2`)
        let base = self.api_base.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))?)
    }

    fn product_endpoint(&self, suffix: &str) -> Result<Url, ApiError> {
        self.endpoint(&format!(
            "api/{}/admin/{}",
            urlencoding::encode(&self.api_path),
            suffix
        ))
    }

    fn authorized(builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header(reqwest::header::AUTHORIZATION, token)
    }

    /// Czyta ciało odpowiedzi i sprawdza zarówno status HTTP, jak i pole `success`.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(e) if status.is_success() => return Err(ApiError::Decode(e)),
                Err(_) => Value::Null,
            }
        };

        let rejected = body.get("success").and_then(Value::as_bool) == Some(false);
        if !status.is_success() || rejected {
            let message = extract_message(&body);
            tracing::warn!(
                "Backend odrzucił żądanie: status={}, komunikat='{}'",
                status,
                message
            );
            return Err(ApiError::Rejected { status, message });
        }

        Ok(serde_json::from_value(body)?)
    }

    pub async fn sign_in(&self, payload: &LoginPayload) -> Result<SignInResponse, ApiError> {
        let url = self.endpoint("admin/signin")?;
        tracing::debug!("Logowanie administratora {} przez {}", payload.username, url);
        let response = self.http.post(url).json(payload).send().await?;
        Self::decode(response).await
    }

    pub async fn check_session(&self, token: &str) -> Result<bool, ApiError> {
        let url = self.endpoint("api/user/check")?;
        let response = Self::authorized(self.http.post(url), token).send().await?;
        match Self::decode::<SessionCheckResponse>(response).await {
            Ok(check) => Ok(check.success),
            // Wygasły lub nieznany token backend zgłasza jako odrzucenie
            Err(ApiError::Rejected { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn list_products(
        &self,
        token: &str,
        page: u32,
        category: Option<&str>,
    ) -> Result<ProductsPage, ApiError> {
        let url = self.product_endpoint("products")?;
        let mut query = vec![("page", page.to_string())];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        let response = Self::authorized(self.http.get(url), token)
            .query(&query)
            .send()
            .await?;
        let page: ProductsPage = Self::decode(response).await?;
        tracing::debug!(
            "Pobrano {} produktów (strona {}/{})",
            page.products.len(),
            page.pagination.current_page,
            page.pagination.total_pages
        );
        Ok(page)
    }

    pub async fn create_product(
        &self,
        token: &str,
        payload: &ProductPayload,
    ) -> Result<String, ApiError> {
        let url = self.product_endpoint("product")?;
        let response = Self::authorized(self.http.post(url), token)
            .json(&DataEnvelope { data: payload })
            .send()
            .await?;
        let reply: MessageResponse = Self::decode(response).await?;
        tracing::info!("Utworzono produkt '{}': {}", payload.title, reply.message);
        Ok(reply.message)
    }

    pub async fn edit_product(
        &self,
        token: &str,
        id: &str,
        payload: &ProductPayload,
    ) -> Result<String, ApiError> {
        let url = self.product_endpoint(&format!("product/{}", urlencoding::encode(id)))?;
        let response = Self::authorized(self.http.put(url), token)
            .json(&DataEnvelope { data: payload })
            .send()
            .await?;
        let reply: MessageResponse = Self::decode(response).await?;
        tracing::info!("Zaktualizowano produkt o ID: {}", id);
        Ok(reply.message)
    }

    pub async fn delete_product(&self, token: &str, id: &str) -> Result<String, ApiError> {
        let url = self.product_endpoint(&format!("product/{}", urlencoding::encode(id)))?;
        let response = Self::authorized(self.http.delete(url), token)
            .send()
            .await?;
        let reply: MessageResponse = Self::decode(response).await?;
        tracing::info!("Usunięto produkt o ID: {}", id);
        Ok(reply.message)
    }
}

/// Klient związany z tokenem konkretnej sesji; tego używa edytor.
#[derive(Clone, Debug)]
pub struct SessionApi {
    client: BackendClient,
    token: String,
}

impl SessionApi {
    pub fn new(client: BackendClient, token: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
        }
    }
}

#[async_trait]
impl ProductApi for SessionApi {
    async fn create_product(&self, payload: &ProductPayload) -> Result<String, ApiError> {
        self.client.create_product(&self.token, payload).await
    }

    async fn edit_product(&self, id: &str, payload: &ProductPayload) -> Result<String, ApiError> {
        self.client.edit_product(&self.token, id, payload).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::draft::ProductDraft;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn client_for(server: &MockServer) -> BackendClient {
        BackendClient::new(&BackendConfig {
            api_base: Url::parse(&format!("{}/v2", server.uri())).unwrap(),
            api_path: "shop".to_string(),
        })
    }

    fn sample_payload() -> ProductPayload {
        let mut draft = ProductDraft::blank();
        draft.title = "Lampa".into();
        draft.price = 250.0;
        draft.to_payload()
    }

    #[test]
    fn message_can_be_text_or_list() {
        assert_eq!(extract_message(&json!({"message": "brak"})), "brak");
        assert_eq!(
            extract_message(&json!({"message": ["a", "b"]})),
            "a, b"
        );
        assert_eq!(extract_message(&json!({})), "");
    }

    #[tokio::test]
    async fn create_sends_token_and_data_envelope() {
        let server = MockServer::start().await;
        let payload = sample_payload();
        Mock::given(method("POST"))
            .and(path("/v2/api/shop/admin/product"))
            .and(header("Authorization", "tok-123"))
            .and(body_json(json!({ "data": serde_json::to_value(&payload).unwrap() })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "message": "已建立產品"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let message = client_for(&server)
            .create_product("tok-123", &payload)
            .await
            .unwrap();

        assert_eq!(message, "已建立產品");
    }

    #[tokio::test]
    async fn edit_puts_to_product_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v2/api/shop/admin/product/-Nabc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "message": "已更新產品"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = SessionApi::new(client_for(&server), "tok");
        let message = api.edit_product("-Nabc", &sample_payload()).await.unwrap();

        assert_eq!(message, "已更新產品");
    }

    #[tokio::test]
    async fn rejection_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/api/shop/admin/product"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"success": false, "message": ["標題為必填"]})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_product("tok", &sample_payload())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Rejected { status, .. } if status.as_u16() == 400));
        assert_eq!(err.user_message(), "標題為必填");
    }

    #[tokio::test]
    async fn success_false_with_ok_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v2/api/shop/admin/product/x"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "message": "找不到產品"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete_product("tok", "x")
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "找不到產品");
    }

    #[tokio::test]
    async fn list_passes_page_and_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/api/shop/admin/products"))
            .and(query_param("page", "2"))
            .and(query_param("category", "AGD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "products": [{
                    "id": "p1", "title": "Czajnik", "category": "AGD",
                    "origin_price": 200, "price": 150, "unit": "szt",
                    "description": "", "content": "", "is_enabled": 1,
                    "imageUrl": "https://a", "imagesUrl": ["https://a"], "num": 1
                }],
                "pagination": {
                    "total_pages": 3, "current_page": 2,
                    "has_pre": true, "has_next": true, "category": "AGD"
                },
                "messages": []
            })))
            .mount(&server)
            .await;

        let page = client_for(&server)
            .list_products("tok", 2, Some("AGD"))
            .await
            .unwrap();

        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].title, "Czajnik");
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[tokio::test]
    async fn sign_in_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/admin/signin"))
            .and(body_json(json!({"username": "a@b.pl", "password": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true, "message": "登入成功", "uid": "u1",
                "token": "tok-xyz", "expired": 1_900_000_000_000_i64
            })))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .sign_in(&LoginPayload {
                username: "a@b.pl".into(),
                password: "x".into(),
            })
            .await
            .unwrap();

        assert_eq!(response.token, "tok-xyz");
        assert_eq!(response.uid, "u1");
    }

    #[tokio::test]
    async fn expired_session_check_reports_false() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/api/user/check"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"success": false, "message": "驗證錯誤"})),
            )
            .mount(&server)
            .await;

        let valid = client_for(&server).check_session("old").await.unwrap();

        assert!(!valid);
    }
}
