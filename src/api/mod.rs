//! HTTP client for the ticketing backend.
//!
//! All endpoints go through a single retry-aware call path: bounded
//! attempts, per-attempt wall-clock timeout, exponential backoff between
//! attempts, and no retry on timeouts or 401/403. Malformed JSON bodies
//! degrade to a generic HTTP-status error instead of failing the parse.

pub mod envelope;
pub mod error;

pub use error::ApiError;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::domain::settings::SettingRow;
use crate::domain::{
    Attachment, Category, Comment, NewRepairRequest, RepairRequest, Settings,
    UpdateRepairRequest, User,
};
use envelope::{Envelope, LoginEnvelope};

/// A repair request together with its comment thread, as returned by
/// `GET /repair-requests/:id`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: RepairRequest,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Bearer-token client over the backend's REST surface.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    retry_attempts: u32,
    timeout: Duration,
    log_requests: bool,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
            retry_attempts: config.retry_attempts.max(1),
            timeout: Duration::from_secs(config.timeout_secs),
            log_requests: config.log_requests,
        }
    }

    /// Attach the bearer token used for every subsequent call.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // Core call path
    // -------------------------------------------------------------------------

    /// One attempt: send, bound by the per-attempt timeout, parse the body.
    ///
    /// A body that is not JSON becomes a synthetic failure envelope carrying
    /// the HTTP status, matching how the backend's own error pages are
    /// tolerated.
    async fn attempt<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.http.request(method, &url).timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(err)
            }
        })?;

        let status = response.status();
        let data: serde_json::Value = match response.json().await {
            Ok(data) => data,
            Err(err) if err.is_timeout() => return Err(ApiError::Timeout),
            Err(_) => serde_json::json!({
                "success": false,
                "message": format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unknown error")
                ),
            }),
        };

        if !status.is_success() {
            let message = data
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("unknown error")
                    )
                });
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        Ok(data)
    }

    /// Retry loop around [`attempt`](Self::attempt).
    async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<serde_json::Value, ApiError> {
        if self.log_requests {
            debug!(%method, endpoint, "api call");
        }

        let mut last_err = ApiError::Backend("no attempts were made".to_string());
        for attempt in 1..=self.retry_attempts {
            match self.attempt(method.clone(), endpoint, body).await {
                Ok(data) => {
                    if self.log_requests {
                        debug!(endpoint, attempt, "api call succeeded");
                    }
                    return Ok(data);
                }
                Err(err) => {
                    if !err.is_retryable() {
                        return Err(err);
                    }
                    warn!(
                        endpoint,
                        attempt,
                        attempts = self.retry_attempts,
                        error = %err,
                        "api call failed"
                    );
                    last_err = err;
                    if attempt < self.retry_attempts {
                        tokio::time::sleep(error::backoff_delay(attempt)).await;
                    }
                }
            }
        }
        Err(last_err)
    }

    async fn get_data<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let value = self.call::<()>(Method::GET, endpoint, None).await?;
        decode::<Envelope<T>>(value)?.into_data()
    }

    async fn send_ack<B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let value = self.call(method, endpoint, Some(body)).await?;
        decode::<Envelope<serde_json::Value>>(value)?.into_ack()
    }

    async fn delete_ack(&self, endpoint: &str) -> Result<(), ApiError> {
        let value = self.call::<()>(Method::DELETE, endpoint, None).await?;
        decode::<Envelope<serde_json::Value>>(value)?.into_ack()
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    /// `POST /auth/login`. Returns the bearer token and the user; the caller
    /// owns persisting the token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User), ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let value = self.call(Method::POST, "/auth/login", Some(&body)).await?;
        decode::<LoginEnvelope>(value)?.into_session()
    }

    /// `GET /auth/me`. The backend returns the user object at the top level
    /// here, not wrapped in the usual envelope.
    pub async fn me(&self) -> Result<User, ApiError> {
        let value = self.call::<()>(Method::GET, "/auth/me", None).await?;
        if value.get("data").is_some() {
            return decode::<Envelope<User>>(value)?.into_data();
        }
        decode::<User>(value)
    }

    // -------------------------------------------------------------------------
    // Repair requests
    // -------------------------------------------------------------------------

    pub async fn list_requests(&self) -> Result<Vec<RepairRequest>, ApiError> {
        self.get_data("/repair-requests").await
    }

    pub async fn get_request(&self, id: i64) -> Result<RequestDetail, ApiError> {
        self.get_data(&format!("/repair-requests/{}", id)).await
    }

    pub async fn create_request(&self, request: &NewRepairRequest) -> Result<(), ApiError> {
        self.send_ack(Method::POST, "/repair-requests", request).await
    }

    pub async fn update_request(
        &self,
        id: i64,
        update: &UpdateRepairRequest,
    ) -> Result<(), ApiError> {
        self.send_ack(Method::PUT, &format!("/repair-requests/{}", id), update)
            .await
    }

    pub async fn delete_request(&self, id: i64) -> Result<(), ApiError> {
        self.delete_ack(&format!("/repair-requests/{}", id)).await
    }

    pub async fn add_comment(&self, request_id: i64, comment: &str) -> Result<(), ApiError> {
        let body = crate::domain::comment::NewComment {
            comment: comment.to_string(),
        };
        self.send_ack(
            Method::POST,
            &format!("/repair-requests/{}/comments", request_id),
            &body,
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_data("/categories").await
    }

    pub async fn create_category(
        &self,
        payload: &crate::domain::category::CategoryPayload,
    ) -> Result<(), ApiError> {
        self.send_ack(Method::POST, "/categories", payload).await
    }

    pub async fn update_category(
        &self,
        id: i64,
        payload: &crate::domain::category::CategoryPayload,
    ) -> Result<(), ApiError> {
        self.send_ack(Method::PUT, &format!("/categories/{}", id), payload)
            .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ApiError> {
        self.delete_ack(&format!("/categories/{}", id)).await
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_data("/users").await
    }

    pub async fn create_user(&self, user: &crate::domain::user::NewUser) -> Result<(), ApiError> {
        self.send_ack(Method::POST, "/users", user).await
    }

    pub async fn update_user(
        &self,
        id: i64,
        update: &crate::domain::user::UpdateUser,
    ) -> Result<(), ApiError> {
        self.send_ack(Method::PUT, &format!("/users/{}", id), update)
            .await
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    pub async fn get_settings(&self) -> Result<Settings, ApiError> {
        let rows: Vec<SettingRow> = self.get_data("/settings").await?;
        Ok(Settings::from_rows(rows))
    }

    pub async fn update_settings(&self, settings: &Settings) -> Result<(), ApiError> {
        self.send_ack(Method::PUT, "/settings", settings).await
    }

    // -------------------------------------------------------------------------
    // Attachments
    // -------------------------------------------------------------------------

    pub async fn list_attachments(&self, request_id: i64) -> Result<Vec<Attachment>, ApiError> {
        self.get_data(&format!("/attachments/{}", request_id)).await
    }

    /// Multipart upload: `file` part plus a `repair_request_id` field.
    ///
    /// Uploads run at double the standard timeout and are never retried;
    /// re-sending a large file on a flaky link only makes things worse.
    pub async fn upload_attachment(
        &self,
        request_id: i64,
        path: &Path,
    ) -> Result<(), ApiError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ApiError::Backend(format!("could not read {}: {}", path.display(), err))
        })?;

        if self.log_requests {
            debug!(file = %file_name, size = bytes.len(), request_id, "uploading attachment");
        }

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            )
            .text("repair_request_id", request_id.to_string());

        let url = format!("{}/attachments", self.base_url);
        let mut request = self
            .http
            .post(&url)
            .timeout(self.timeout * 2)
            .multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(err)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(
                status.as_u16(),
                format!("upload failed: HTTP {}", status.as_u16()),
            ));
        }
        let value: serde_json::Value = response.json().await.map_err(|_| ApiError::MissingData)?;
        decode::<Envelope<serde_json::Value>>(value)?.into_ack()
    }

    pub async fn delete_attachment(&self, id: i64) -> Result<(), ApiError> {
        self.delete_ack(&format!("/attachments/{}", id)).await
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    /// `GET /health`, a bare liveness probe with no envelope and no retry.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).timeout(self.timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                warn!(error = %err, "health check failed");
                false
            }
        }
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|err| ApiError::Backend(format!("unexpected response shape: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, RequestStatus};

    #[test]
    fn test_request_detail_flattens_comments() {
        let json = serde_json::json!({
            "id": 5,
            "ticket_number": "REQ-0005",
            "title": "Leaky tap",
            "description": "Pantry sink",
            "category_id": 1,
            "category_name": "Plumbing",
            "priority": "normal",
            "status": "in_progress",
            "location": "Floor 2 pantry",
            "contact_phone": null,
            "requester_id": 9,
            "requester_name": "Nok",
            "assigned_to": 7,
            "technician_name": "Chai",
            "estimated_cost": 300.0,
            "actual_cost": null,
            "created_at": "2025-05-20T10:00:00Z",
            "comments": [
                { "id": 1, "repair_request_id": 5, "user_name": "Chai",
                  "comment": "Parts ordered", "created_at": "2025-05-21T08:00:00Z" }
            ]
        });
        let detail: RequestDetail = serde_json::from_value(json).unwrap();
        assert_eq!(detail.request.status, RequestStatus::InProgress);
        assert_eq!(detail.request.priority, Priority::Normal);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].comment, "Parts ordered");
    }

    #[test]
    fn test_request_detail_tolerates_missing_comments() {
        let json = serde_json::json!({
            "id": 5, "ticket_number": "REQ-0005", "title": "t", "description": "",
            "category_id": null, "category_name": null, "priority": "high",
            "status": "pending", "location": "", "contact_phone": null,
            "requester_id": 1, "requester_name": null, "assigned_to": null,
            "technician_name": null, "estimated_cost": null, "actual_cost": null,
            "created_at": ""
        });
        let detail: RequestDetail = serde_json::from_value(json).unwrap();
        assert!(detail.comments.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ApiConfig {
            base_url: "http://localhost:3001/api/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config);
        assert_eq!(client.base_url(), "http://localhost:3001/api");
    }

    // -------------------------------------------------------------------------
    // Retry loop, against a counting loopback stub
    // -------------------------------------------------------------------------

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Minimal HTTP server answering every request with `status_line` and a
    /// JSON failure body, counting how many requests it served.
    async fn spawn_stub(status_line: &'static str, message: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let body = format!(r#"{{"success":false,"message":"{}"}}"#, message);
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        (format!("http://{}", addr), hits)
    }

    #[tokio::test]
    async fn test_server_error_uses_all_attempts_then_raises() {
        let (base_url, hits) = spawn_stub("500 Internal Server Error", "boom").await;
        let client = ApiClient::new(&ApiConfig {
            base_url,
            retry_attempts: 3,
            timeout_secs: 5,
            ..Default::default()
        });

        let err = client.list_requests().await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
        assert_eq!(err.to_string(), "boom");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_auth_failure_raises_on_first_attempt() {
        let (base_url, hits) = spawn_stub("401 Unauthorized", "token expired").await;
        let client = ApiClient::new(&ApiConfig {
            base_url,
            retry_attempts: 3,
            timeout_secs: 5,
            ..Default::default()
        });

        let err = client.list_requests().await.unwrap_err();
        assert!(err.is_auth());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
