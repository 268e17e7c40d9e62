//! The network boundary.
//!
//! `RequestPipeline` never performs I/O itself: it hands a fully built
//! `HttpRequest` to a `Transport` and gets an `HttpResponse` back. Non-2xx
//! statuses are data, not errors; only failures below HTTP are `Err`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::error::ApiError;
use crate::http::{FormPart, FormPayload, HttpMethod, HttpRequest, HttpResponse, RequestBody};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.client.request(to_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            None => builder,
            Some(RequestBody::Json(text)) => builder.body(text),
            Some(RequestBody::Form(form)) => builder.multipart(to_multipart(form)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

fn to_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn to_multipart(form: FormPayload) -> Result<Form, ApiError> {
    let mut multipart = Form::new();
    for part in form.into_parts() {
        multipart = match part {
            FormPart::Text { name, value } => multipart.text(name, value),
            FormPart::File { name, file } => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime_type)
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                multipart.part(name, part)
            }
        };
    }
    Ok(multipart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FileHandle;

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(to_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(to_method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(to_method(HttpMethod::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn invalid_mime_type_is_a_transport_error() {
        let form = FormPayload::new().file("file", FileHandle::new("a.bin", "not a mime", vec![1]));
        assert!(matches!(to_multipart(form), Err(ApiError::Transport(_))));
    }
}
