//! Domain DTOs for the CRM API.
//!
//! # Design
//! Only the shapes the client itself inspects are typed (login and the
//! current user, upload receipts). Resource payloads stay as
//! `serde_json::Value` since the wrappers pass them through untouched.
//! Field names are camelCase on the wire.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// A successful response body: parsed JSON or opaque text.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            Payload::Json(_) => None,
        }
    }

    /// The server-supplied `error` message, if the payload carries one.
    pub fn error_message(&self) -> Option<&str> {
        self.as_json()?.get("error")?.as_str()
    }

    /// Decode the payload into `T`. Text payloads decode as a JSON string.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let value = match self {
            Payload::Json(v) => v,
            Payload::Text(s) => Value::String(s),
        };
        serde_json::from_value(value).map_err(|e| ApiError::Transport(e.to_string()))
    }
}

/// The logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Request payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response of `POST /auth/login`. `token` is absent when the server
/// accepted the call but issued no session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Response of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub document_id: Option<i64>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}
