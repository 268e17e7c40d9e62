//! Client core for the construction CRM REST API.
//!
//! # Overview
//! `RequestPipeline` builds `HttpRequest` values, hands them to an injected
//! `Transport`, and classifies the `HttpResponse` it gets back. Building and
//! classification are plain functions over plain data; the transport is the
//! only I/O and the only await point.
//!
//! # Design
//! - Headers are derived from the token at call time: JSON content type
//!   plus `Authorization: Bearer <token>` when a token is set.
//! - Structured bodies are serialized to JSON; multipart forms pass through
//!   and drop the JSON content type.
//! - A 401 clears the token and the current user and asks the
//!   `NavigationSignal` for the login view before failing with
//!   `ApiError::Authentication`.
//! - Resource wrappers (`api`) are fixed path templates over the pipeline.

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod notify;
pub mod pipeline;
pub mod request;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use api::Crud;
pub use config::ClientConfig;
pub use download::{DirectorySink, DownloadSink};
pub use error::ApiError;
pub use http::{ContentKind, FileHandle, FormPart, FormPayload, HttpMethod, HttpRequest, HttpResponse, RequestBody};
pub use notify::{handle_api_error, NotificationLevel, NotificationLog, NotificationSink};
pub use pipeline::{classify, parse_download, RequestPipeline, ResponseEnvelope};
pub use request::{Body, Query, QueryValue, RequestDescriptor};
pub use session::{NavigationSignal, RouteState, SessionState, TokenStore};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use transport::{ReqwestTransport, Transport};
pub use types::{LoginRequest, LoginResponse, Payload, UploadReceipt, User};
