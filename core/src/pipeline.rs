//! Request/response pipeline for the CRM API.
//!
//! # Design
//! Each call goes `Building → Dispatched → Succeeded | Failed`. Building
//! (`build_*`) and classification (`parse_*`) are synchronous and free of
//! I/O; the only suspension point is `Transport::send`. The token is read
//! once while building, and no lock is held across the await.
//!
//! A 401 resets the session (token, current user) and sends the UI to the
//! login view before the `Authentication` error is returned. Uploads and
//! downloads skip that reset and report every non-2xx status as `Http`.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::download::DownloadSink;
use crate::error::ApiError;
use crate::http::{
    ContentKind, FileHandle, FormPayload, HttpMethod, HttpRequest, HttpResponse, RequestBody,
    APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE,
};
use crate::request::{Body, Query, RequestDescriptor};
use crate::session::{NavigationSignal, SessionState, TokenStore};
use crate::store::KeyValueStore;
use crate::transport::Transport;
use crate::types::Payload;

pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";
/// Form field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// A classified response, before it is turned into a value or an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub status_text: String,
    pub content_kind: ContentKind,
    pub payload: Payload,
}

impl ResponseEnvelope {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Server-supplied `error` field, else `HTTP {status}: {statusText}`.
    pub fn failure_message(&self) -> String {
        match self.payload.error_message() {
            Some(message) => message.to_string(),
            None => format!("HTTP {}: {}", self.status, self.status_text),
        }
    }

    /// Success payload, or `Http` for any non-2xx status.
    pub fn into_result(self) -> Result<Payload, ApiError> {
        if self.is_ok() {
            return Ok(self.payload);
        }
        Err(ApiError::Http {
            status: self.status,
            message: self.failure_message(),
        })
    }
}

/// Parse the body according to its declared content type.
///
/// A body declared as JSON that does not parse is a `Transport` error.
pub fn classify(response: HttpResponse) -> Result<ResponseEnvelope, ApiError> {
    let content_kind = response.content_kind();
    let payload = match content_kind {
        ContentKind::Json => Payload::Json(
            serde_json::from_slice(&response.body)
                .map_err(|e| ApiError::Transport(format!("invalid JSON body: {e}")))?,
        ),
        ContentKind::Text | ContentKind::Binary => {
            Payload::Text(String::from_utf8_lossy(&response.body).into_owned())
        }
    };
    Ok(ResponseEnvelope {
        status: response.status,
        status_text: response.status_text,
        content_kind,
        payload,
    })
}

/// Body of a download, or `HTTP {status}: {statusText}` without looking at
/// the payload.
pub fn parse_download(response: HttpResponse) -> Result<Vec<u8>, ApiError> {
    if response.is_ok() {
        return Ok(response.body);
    }
    Err(ApiError::Http {
        status: response.status,
        message: format!("HTTP {}: {}", response.status, response.status_text),
    })
}

/// Builds, dispatches and classifies every CRM API call.
pub struct RequestPipeline {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    session: SessionState,
    navigation: Arc<dyn NavigationSignal>,
}

impl RequestPipeline {
    /// Loads the persisted token and current user from `store`.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KeyValueStore>,
        navigation: Arc<dyn NavigationSignal>,
    ) -> Self {
        let tokens = TokenStore::load(store.clone(), &config.token_key);
        let session = SessionState::load(store, &config.user_key);
        Self {
            config,
            transport,
            tokens,
            session,
            navigation,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.get()
    }

    pub fn set_token(&self, token: Option<&str>) -> Result<(), ApiError> {
        self.tokens.set(token)
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    pub fn url(&self, endpoint: &str, query: &Query) -> String {
        let encoded = query.encode();
        if encoded.is_empty() {
            format!("{}{endpoint}", self.config.api_root())
        } else {
            format!("{}{endpoint}?{encoded}", self.config.api_root())
        }
    }

    pub fn build_request(&self, descriptor: RequestDescriptor) -> Result<HttpRequest, ApiError> {
        let token = self.tokens.get();
        let (mut headers, body) = match descriptor.body {
            None => (json_headers(token.as_deref()), None),
            Some(Body::Json(value)) => {
                let text = serde_json::to_string(&value)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?;
                (json_headers(token.as_deref()), Some(RequestBody::Json(text)))
            }
            Some(Body::Form(form)) => (auth_headers(token.as_deref()), Some(RequestBody::Form(form))),
        };

        for (name, value) in descriptor.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        Ok(HttpRequest {
            method: descriptor.method,
            url: self.url(&descriptor.endpoint, &descriptor.query),
            headers,
            body,
        })
    }

    /// Multipart POST with the file under `file` followed by `fields`.
    pub fn build_upload(
        &self,
        endpoint: &str,
        file: FileHandle,
        fields: &[(String, String)],
    ) -> Result<HttpRequest, ApiError> {
        let form = fields
            .iter()
            .fold(FormPayload::new().file(UPLOAD_FIELD, file), |form, (name, value)| {
                form.text(name.as_str(), value.as_str())
            });
        self.build_request(RequestDescriptor::new(HttpMethod::Post, endpoint).body(Body::Form(form)))
    }

    /// GET carrying only the auth header.
    pub fn build_download(&self, endpoint: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(endpoint, &Query::new()),
            headers: auth_headers(self.tokens.get().as_deref()),
            body: None,
        }
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Classify `response`; on 401 reset the session before failing.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Payload, ApiError> {
        let envelope = classify(response)?;
        if envelope.status == 401 {
            self.reset_session();
            let message = envelope
                .payload
                .error_message()
                .unwrap_or(AUTH_FAILED_MESSAGE)
                .to_string();
            return Err(ApiError::Authentication { message });
        }
        envelope.into_result()
    }

    /// Clear token and current user; switch to the login view unless the
    /// UI is already there. Safe to call repeatedly.
    fn reset_session(&self) {
        warn!("request rejected as unauthorized, clearing session");
        if let Err(e) = self.tokens.set(None) {
            warn!(error = %e, "could not clear stored token");
        }
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "could not clear current user");
        }
        let route = self.navigation.current_route();
        if !route.contains(&self.config.login_route) {
            self.navigation.show_login();
        }
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Payload, ApiError> {
        let method = descriptor.method;
        let endpoint = descriptor.endpoint.clone();
        let result = self.dispatch(descriptor).await;
        if let Err(e) = &result {
            error!(%method, endpoint = %endpoint, error = %e, "API request failed");
        }
        result
    }

    async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<Payload, ApiError> {
        let request = self.build_request(descriptor)?;
        debug!(method = %request.method, url = %request.url, "dispatching request");
        let response = self.transport.send(request).await?;
        self.parse_response(response)
    }

    pub async fn get(&self, endpoint: &str, query: Query) -> Result<Payload, ApiError> {
        self.request(RequestDescriptor::new(HttpMethod::Get, endpoint).query(query))
            .await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, data: &T) -> Result<Payload, ApiError> {
        self.send_json(HttpMethod::Post, endpoint, data).await
    }

    /// POST with an empty JSON object.
    pub async fn post_empty(&self, endpoint: &str) -> Result<Payload, ApiError> {
        self.send_json(HttpMethod::Post, endpoint, &json!({})).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, endpoint: &str, data: &T) -> Result<Payload, ApiError> {
        self.send_json(HttpMethod::Put, endpoint, data).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, endpoint: &str, data: &T) -> Result<Payload, ApiError> {
        self.send_json(HttpMethod::Patch, endpoint, data).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Payload, ApiError> {
        self.request(RequestDescriptor::new(HttpMethod::Delete, endpoint))
            .await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: &T,
    ) -> Result<Payload, ApiError> {
        let body = Body::json(data)?;
        self.request(RequestDescriptor::new(method, endpoint).body(body))
            .await
    }

    /// Send `file` plus `fields` as one multipart form.
    pub async fn upload(
        &self,
        endpoint: &str,
        file: FileHandle,
        fields: &[(String, String)],
    ) -> Result<Payload, ApiError> {
        let request = self.build_upload(endpoint, file, fields)?;
        debug!(url = %request.url, "uploading file");
        let result = match self.transport.send(request).await {
            Ok(response) => classify(response).and_then(ResponseEnvelope::into_result),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            error!(endpoint, error = %e, "upload failed");
        }
        result
    }

    /// Fetch `endpoint` as bytes and hand them to `sink` as `filename`.
    pub async fn download(
        &self,
        endpoint: &str,
        filename: &str,
        sink: &dyn DownloadSink,
    ) -> Result<(), ApiError> {
        let request = self.build_download(endpoint);
        debug!(url = %request.url, filename, "downloading file");
        let result = match self.transport.send(request).await {
            Ok(response) => parse_download(response).and_then(|bytes| sink.save(filename, &bytes)),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            error!(endpoint, error = %e, "download failed");
        }
        result
    }
}

fn auth_headers(token: Option<&str>) -> Vec<(String, String)> {
    token
        .map(|t| (AUTHORIZATION.to_string(), format!("Bearer {t}")))
        .into_iter()
        .collect()
}

fn json_headers(token: Option<&str>) -> Vec<(String, String)> {
    let mut headers = vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())];
    headers.extend(auth_headers(token));
    headers
}
