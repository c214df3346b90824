//! Shared HTTP transport for all backend calls.
//!
//! Wraps a single `reqwest::Client` with the backend base URL and a bearer
//! credential slot. Every request the console issues goes through here, so
//! installing or clearing a token is immediately visible to all callers.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::errors::{ServiceError, ServiceResult};

pub struct HttpClient {
    base_url: String,
    inner: reqwest::Client,
    bearer: RwLock<Option<String>>,
}

impl HttpClient {
    /// Creates a transport rooted at `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ServiceResult<Self> {
        let inner = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(HttpClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            inner,
            bearer: RwLock::new(None),
        })
    }

    /// Installs or clears the bearer credential used on subsequent requests.
    ///
    /// Passing `None` removes a previously installed token, so a logged-out
    /// transport never leaks the old credential on later calls.
    pub async fn set_bearer(&self, token: Option<String>) {
        let mut bearer = self.bearer.write().await;
        match &token {
            Some(_) => tracing::debug!("bearer credential installed"),
            None => tracing::debug!("bearer credential cleared"),
        }
        *bearer = token;
    }

    /// Returns a copy of the currently installed bearer token, if any.
    pub async fn bearer(&self) -> Option<String> {
        self.bearer.read().await.clone()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ServiceResult<T> {
        let builder = self.inner.get(self.url(path)).query(query);
        self.execute(builder, path).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<T> {
        let builder = self.inner.post(self.url(path)).json(body);
        self.execute(builder, path).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<T> {
        let builder = self.inner.put(self.url(path)).json(body);
        self.execute(builder, path).await
    }

    /// Issues a PATCH with no body. The backend toggle endpoint wants exactly
    /// that shape.
    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let builder = self.inner.patch(self.url(path));
        self.execute(builder, path).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let builder = self.inner.delete(self.url(path));
        self.execute(builder, path).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        path: &str,
    ) -> ServiceResult<T> {
        let (builder, had_bearer) = self.authorize(builder).await;
        let response = builder.send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, had_bearer, path).await);
        }

        match response.json::<T>().await {
            Ok(body) => Ok(body),
            Err(e) if e.is_decode() => Err(ServiceError::unexpected_response(format!(
                "could not decode body from {}: {}",
                path, e
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn authorize(&self, builder: RequestBuilder) -> (RequestBuilder, bool) {
        let bearer = self.bearer.read().await;
        match bearer.as_deref() {
            Some(token) => (builder.bearer_auth(token), true),
            None => (builder, false),
        }
    }
}

/// Maps a non-success response to the error taxonomy.
///
/// A 401 on a request that carried a token means the stored credential has
/// gone stale; a 401 without one is a plain bad-credentials failure.
async fn error_from_response(response: Response, had_bearer: bool, path: &str) -> ServiceError {
    let status = response.status();
    let body = response.text().await.ok();
    let message = body
        .as_deref()
        .and_then(extract_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    match status {
        StatusCode::UNAUTHORIZED if had_bearer => ServiceError::SessionExpired,
        StatusCode::UNAUTHORIZED => ServiceError::authentication(message),
        StatusCode::FORBIDDEN => ServiceError::permission_denied(message),
        StatusCode::NOT_FOUND => ServiceError::not_found("resource", path),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::validation(message)
        }
        _ => ServiceError::unexpected_response(format!("{} on {}: {}", status, path, message)),
    }
}

/// Pulls the human-readable `message` field out of an error body. The backend
/// sends either a single string or an array of validation messages.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("message")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(parts) => {
            let joined = parts
                .iter()
                .filter_map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if joined.is_empty() { None } else { Some(joined) }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_string() {
        let body = r#"{"message": "Invalid credentials", "statusCode": 401}"#;
        assert_eq!(
            extract_message(body),
            Some("Invalid credentials".to_string())
        );
    }

    #[test]
    fn test_extract_message_array() {
        let body = r#"{"message": ["email must be an email", "password too short"]}"#;
        assert_eq!(
            extract_message(body),
            Some("email must be an email, password too short".to_string())
        );
    }

    #[test]
    fn test_extract_message_absent() {
        assert_eq!(extract_message(r#"{"error": "nope"}"#), None);
        assert_eq!(extract_message("not json"), None);
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_is_normalized() {
        let client = HttpClient::new("http://localhost:4005/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/user"), "http://localhost:4005/user");

        let client = HttpClient::new("http://localhost:4005", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/user"), "http://localhost:4005/user");
    }

    #[tokio::test]
    async fn test_set_bearer_none_clears_token() {
        let client = HttpClient::new("http://localhost:4005", Duration::from_secs(5)).unwrap();

        client.set_bearer(Some("abc".to_string())).await;
        assert_eq!(client.bearer().await.as_deref(), Some("abc"));

        client.set_bearer(None).await;
        assert_eq!(client.bearer().await, None);
    }
}
