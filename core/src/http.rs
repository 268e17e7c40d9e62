//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `RequestPipeline` builds
//! `HttpRequest` values and parses `HttpResponse` values; a `Transport`
//! implementation moves them over the network. Bodies are either JSON text
//! or a multipart form that the transport encodes itself, so the multipart
//! boundary header never has to be known here.

use std::fmt;

pub const CONTENT_TYPE: &str = "content-type";
pub const AUTHORIZATION: &str = "authorization";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileHandle {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// One named part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: FileHandle },
}

impl FormPart {
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// A multipart body. Parts keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    parts: Vec<FormPart>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FileHandle) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file,
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    /// First text value stored under `name`.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// First file stored under `name`.
    pub fn file_value(&self, name: &str) -> Option<&FileHandle> {
        self.parts.iter().find_map(|part| match part {
            FormPart::File { name: n, file } if n == name => Some(file),
            _ => None,
        })
    }
}

/// Serialized request body as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON text; sent with `content-type: application/json`.
    Json(String),
    /// Multipart form; the transport supplies its own boundary header.
    Form(FormPayload),
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including the encoded query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_kind(&self) -> ContentKind {
        ContentKind::from_content_type(self.header(CONTENT_TYPE))
    }
}

/// Classification of a response body, driven by its declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Text,
    Binary,
}

impl ContentKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(value) = content_type else {
            return ContentKind::Text;
        };
        let value = value.to_ascii_lowercase();
        if value.contains(APPLICATION_JSON) {
            ContentKind::Json
        } else if value.trim_start().starts_with("text/") {
            ContentKind::Text
        } else {
            ContentKind::Binary
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_kind_follows_content_type() {
        assert_eq!(
            ContentKind::from_content_type(Some("application/json; charset=utf-8")),
            ContentKind::Json
        );
        assert_eq!(ContentKind::from_content_type(Some("Application/JSON")), ContentKind::Json);
        assert_eq!(ContentKind::from_content_type(Some("text/html")), ContentKind::Text);
        assert_eq!(ContentKind::from_content_type(None), ContentKind::Text);
        assert_eq!(ContentKind::from_content_type(Some("application/pdf")), ContentKind::Binary);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: Vec::new(),
        };
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn ok_range_is_2xx() {
        let mut response = HttpResponse {
            status: 199,
            status_text: String::new(),
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(!response.is_ok());
        response.status = 200;
        assert!(response.is_ok());
        response.status = 299;
        assert!(response.is_ok());
        response.status = 300;
        assert!(!response.is_ok());
    }

    #[test]
    fn form_payload_keeps_order_and_lookups() {
        let form = FormPayload::new()
            .file("file", FileHandle::new("a.txt", "text/plain", b"hi".to_vec()))
            .text("category", "invoice");
        let names: Vec<&str> = form.parts().iter().map(FormPart::name).collect();
        assert_eq!(names, vec!["file", "category"]);
        assert_eq!(form.text_value("category"), Some("invoice"));
        assert_eq!(form.file_value("file").unwrap().bytes, b"hi");
        assert!(form.text_value("file").is_none());
    }
}
