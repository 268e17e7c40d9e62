use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, Client};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(String::new()).unwrap()
}

async fn login(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"username":"admin","password":"secret"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    body["token"].as_str().unwrap().to_string()
}

// --- auth ---

#[tokio::test]
async fn login_returns_token_and_user() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"username":"admin","password":"secret"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["firstName"], "Ivan");
}

#[tokio::test]
async fn login_wrong_password_returns_401_with_error() {
    let app = app();
    let resp = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            r#"{"username":"admin","password":"nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "Invalid password");
}

#[tokio::test]
async fn login_missing_fields_returns_400() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/api/auth/login", None, r#"{"username":"admin"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_route_without_token_returns_401() {
    let app = app();
    let resp = app.oneshot(get_request("/api/users/profile", None)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "Access token missing");
}

#[tokio::test]
async fn unknown_token_returns_401() {
    let app = app();
    let resp = app
        .oneshot(get_request("/api/users/profile", Some("forged")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_token() {
    let app = app();
    let token = login(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/logout", Some(&token), "{}"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_request("/api/users/profile", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- clients ---

#[tokio::test]
async fn client_crud() {
    let app = app();
    let token = login(&app).await;

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/api/clients", Some(&token), r#"{"name":"Stroy LLC"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Client = body_json(resp).await;
    assert_eq!(created.status, "active");

    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/clients/{}", created.id),
            Some(&token),
            r#"{"status":"vip"}"#,
        ))
        .await
        .unwrap();
    let updated: Client = body_json(resp).await;
    assert_eq!(updated.name, "Stroy LLC");
    assert_eq!(updated.status, "vip");

    let resp = app
        .clone()
        .oneshot(get_request("/api/clients?search=Stroy", Some(&token)))
        .await
        .unwrap();
    let listed: Vec<Client> = body_json(resp).await;
    assert_eq!(listed, vec![updated]);

    let resp = app
        .clone()
        .oneshot(json_request("DELETE", &format!("/api/clients/{}", created.id), Some(&token), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(get_request(&format!("/api/clients/{}", created.id), Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "Client not found");
}

#[tokio::test]
async fn create_client_without_name_returns_400() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .oneshot(json_request("POST", "/api/clients", Some(&token), r#"{"phone":"+7"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- documents ---

#[tokio::test]
async fn upload_then_download() {
    let app = app();
    let token = login(&app).await;

    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"plan.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         floor plan\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"category\"\r\n\r\n\
         invoice\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(body)
        .unwrap();

    let resp = app.clone().oneshot(request).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: Value = body_json(resp).await;
    assert_eq!(receipt["originalName"], "plan.txt");
    assert_eq!(receipt["fields"]["category"], "invoice");
    let id = receipt["documentId"].as_i64().unwrap();

    let resp = app
        .oneshot(get_request(&format!("/api/documents/{id}/download"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "text/plain");
    assert_eq!(body_bytes(resp).await, "floor plan");
}

#[tokio::test]
async fn download_unknown_document_returns_404() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .oneshot(get_request("/api/documents/99/download", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- misc ---

#[tokio::test]
async fn dashboard_stats_echoes_period() {
    let app = app();
    let token = login(&app).await;
    let resp = app
        .oneshot(get_request("/api/dashboard/stats?period=year", Some(&token)))
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["period"], "year");
    assert_eq!(body["clients"], 0);
}

#[tokio::test]
async fn health_is_plain_text() {
    let app = app();
    let resp = app.oneshot(get_request("/api/health", None)).await.unwrap();
    assert!(resp.headers()[http::header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body_bytes(resp).await, "ok");
}

#[tokio::test]
async fn broken_declares_json_but_is_not() {
    let app = app();
    let resp = app.oneshot(get_request("/api/broken", None)).await.unwrap();
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
    let bytes = body_bytes(resp).await;
    assert!(serde_json::from_slice::<Value>(&bytes).is_err());
}
