// Shared REST client for the versioned backend API
use crate::domain::errors::{DashboardError, DashboardResult};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Supplies the bearer token of the active session, if any.
pub trait SessionProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticSession(pub Option<String>);

impl SessionProvider for StaticSession {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        version: &str,
        timeout: Duration,
        session: Arc<dyn SessionProvider>,
    ) -> DashboardResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            version.trim_matches('/')
        );
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(path))
            .header("Accept", "application/json");
        match self.session.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> DashboardResult<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.or(b.message))
            .unwrap_or(body);
        tracing::debug!("Backend request failed with status {}: {}", status, message);
        Err(DashboardError::classify(Some(status.as_u16()), &message))
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> DashboardResult<T> {
        let response = self.execute(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> DashboardResult<T> {
        self.json(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> DashboardResult<T> {
        self.json(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> DashboardResult<T> {
        self.json(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> DashboardResult<()> {
        self.execute(self.request(Method::DELETE, path).query(query)).await?;
        Ok(())
    }
}

/// Percent-encode one path segment.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::test_server;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn client(base: &str, token: Option<&str>) -> ApiClient {
        ApiClient::new(
            base,
            "v1",
            Duration::from_secs(5),
            Arc::new(StaticSession(token.map(str::to_string))),
        )
        .unwrap()
    }

    async fn echo_auth(headers: HeaderMap) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Json(json!({ "authorization": auth }))
    }

    #[test]
    fn test_url_joins_base_and_version() {
        let api = client("http://localhost:3001/api/", None);
        assert_eq!(api.url("/dashboard/presets"), "http://localhost:3001/api/v1/dashboard/presets");
        assert_eq!(segment("a b/c"), "a%20b%2Fc");
    }

    #[tokio::test]
    async fn test_bearer_header_follows_session() {
        let router = Router::new().route("/v1/whoami", get(echo_auth));
        let base = test_server::spawn(router).await;

        let with: Value = client(&base, Some("abc")).get("/whoami", &[]).await.unwrap();
        assert_eq!(with["authorization"], "Bearer abc");

        let without: Value = client(&base, None).get("/whoami", &[]).await.unwrap();
        assert_eq!(without["authorization"], Value::Null);
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let router = Router::new()
            .route(
                "/v1/expired",
                get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "error": "jwt expired" }))) }),
            )
            .route("/v1/broken", get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }));
        let base = test_server::spawn(router).await;
        let api = client(&base, None);

        let expired = api.get::<Value>("/expired", &[]).await.unwrap_err();
        assert_eq!(expired, DashboardError::Auth("jwt expired".to_string()));

        let broken = api.get::<Value>("/broken", &[]).await.unwrap_err();
        assert!(matches!(broken, DashboardError::Server { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let api = client("http://127.0.0.1:1", None);
        let err = api.get::<Value>("/anything", &[]).await.unwrap_err();
        assert!(matches!(err, DashboardError::Network(_)));
    }
}
