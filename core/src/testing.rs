//! Fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::pipeline::RequestPipeline;
use crate::session::NavigationSignal;
use crate::store::{KeyValueStore, MemoryStore};
use crate::transport::Transport;

pub const BASE_URL: &str = "http://localhost:3000/api";

/// Replays queued responses and records every request it was given.
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn respond(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn fail(&self, err: ApiError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.sent.lock().unwrap().last().cloned().expect("no request sent")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.sent.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json_response(200, "{}")))
    }
}

/// Store whose writes always fail; reads find nothing.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, ApiError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), ApiError> {
        Err(ApiError::Storage("disk full".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Navigation fake that counts redirects to the login view.
pub struct FakeNavigation {
    route: Mutex<String>,
    redirects: AtomicUsize,
}

impl FakeNavigation {
    pub fn at(route: &str) -> Self {
        Self {
            route: Mutex::new(route.to_string()),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl NavigationSignal for FakeNavigation {
    fn current_route(&self) -> String {
        self.route.lock().unwrap().clone()
    }

    fn show_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.route.lock().unwrap() = "/login".to_string();
    }
}

pub struct Harness {
    pub pipeline: RequestPipeline,
    pub transport: Arc<RecordingTransport>,
    pub navigation: Arc<FakeNavigation>,
    pub store: Arc<MemoryStore>,
}

pub fn harness() -> Harness {
    harness_at("/dashboard")
}

pub fn harness_at(route: &str) -> Harness {
    let transport = Arc::new(RecordingTransport::default());
    let navigation = Arc::new(FakeNavigation::at(route));
    let store = Arc::new(MemoryStore::new());
    let pipeline = RequestPipeline::new(
        ClientConfig::new(BASE_URL),
        transport.clone(),
        store.clone() as Arc<dyn KeyValueStore>,
        navigation.clone(),
    );
    Harness {
        pipeline,
        transport,
        navigation,
        store,
    }
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: reason(status).to_string(),
        headers: vec![("content-type".to_string(), "application/json; charset=utf-8".to_string())],
        body: body.as_bytes().to_vec(),
    }
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: reason(status).to_string(),
        headers: vec![("content-type".to_string(), "text/plain".to_string())],
        body: body.as_bytes().to_vec(),
    }
}

pub fn binary_response(status: u16, body: &[u8]) -> HttpResponse {
    HttpResponse {
        status,
        status_text: reason(status).to_string(),
        headers: vec![("content-type".to_string(), "application/pdf".to_string())],
        body: body.to_vec(),
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
