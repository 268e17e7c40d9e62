//! Logical request descriptors, before headers and serialization.
//!
//! A `RequestDescriptor` names what the caller wants (method, endpoint,
//! query, body, extra headers). `RequestPipeline::build_request` turns it
//! into a concrete `HttpRequest`.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{FormPayload, HttpMethod};

/// A scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl QueryValue {
    /// Encoded form, or `None` when the value is dropped from the query.
    fn render(&self) -> Option<String> {
        match self {
            QueryValue::Null => None,
            QueryValue::Text(s) if s.is_empty() => None,
            QueryValue::Text(s) => Some(s.clone()),
            QueryValue::Int(n) => Some(n.to_string()),
            QueryValue::Float(f) => Some(f.to_string()),
            QueryValue::Bool(b) => Some(b.to_string()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::Text(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::Text(s)
    }
}

impl From<i64> for QueryValue {
    fn from(n: i64) -> Self {
        QueryValue::Int(n)
    }
}

impl From<i32> for QueryValue {
    fn from(n: i32) -> Self {
        QueryValue::Int(n.into())
    }
}

impl From<u32> for QueryValue {
    fn from(n: u32) -> Self {
        QueryValue::Int(n.into())
    }
}

impl From<f64> for QueryValue {
    fn from(f: f64) -> Self {
        QueryValue::Float(f)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Bool(b)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(QueryValue::Null, Into::into)
    }
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.params.push((key.into(), value.into()));
    }

    /// `application/x-www-form-urlencoded` string, skipping null and empty
    /// values. Empty when nothing survives.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            if let Some(rendered) = value.render() {
                serializer.append_pair(key, &rendered);
            }
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Body supplied by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Structured value, serialized to JSON text at build time.
    Json(Value),
    /// Pre-built multipart form, passed through untouched.
    Form(FormPayload),
}

impl Body {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// What a caller asks the pipeline to send.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub endpoint: String,
    pub query: Query,
    pub body: Option<Body>,
    pub headers: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Query::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_drops_null_and_empty() {
        let query = Query::new()
            .with("status", "active")
            .with("search", "")
            .with("client", None::<i64>)
            .with("page", 2);
        assert_eq!(query.encode(), "status=active&page=2");
    }

    #[test]
    fn encode_escapes_like_url_search_params() {
        let query = Query::new().with("q", "brick & mortar");
        assert_eq!(query.encode(), "q=brick+%26+mortar");
    }

    #[test]
    fn encode_empty_when_everything_dropped() {
        let query = Query::new().with("a", "").with("b", QueryValue::Null);
        assert_eq!(query.encode(), "");
    }

    #[test]
    fn encode_keeps_false_and_zero() {
        let query = Query::new().with("archived", false).with("offset", 0);
        assert_eq!(query.encode(), "archived=false&offset=0");
    }

    #[test]
    fn query_from_iterator() {
        let query: Query = [("type", "revenue"), ("period", "month")].into_iter().collect();
        assert_eq!(query.encode(), "type=revenue&period=month");
    }

    #[test]
    fn json_body_from_serializable() {
        #[derive(Serialize)]
        struct Reason<'a> {
            reason: &'a str,
        }
        let body = Body::json(&Reason { reason: "late" }).unwrap();
        assert_eq!(body, Body::Json(serde_json::json!({ "reason": "late" })));
    }
}
