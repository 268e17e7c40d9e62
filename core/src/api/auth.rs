//! Login, logout and the current user's profile.

use serde::Serialize;
use tracing::{error, info};

use super::resource;
use crate::error::ApiError;
use crate::request::Query;
use crate::types::{LoginRequest, LoginResponse, Payload};

resource!(
    /// The only wrapper with side effects on the session.
    AuthApi
);

impl AuthApi<'_> {
    /// On success the token and the user are stored before returning.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.pipeline.post("/auth/login", &request).await?.into_typed()?;

        if let Some(token) = response.token.as_deref().filter(|t| !t.is_empty()) {
            self.pipeline.set_token(Some(token))?;
            if let Some(user) = &response.user {
                self.pipeline.session().set_user(user.clone())?;
            }
            info!(username, "logged in");
        }
        Ok(response)
    }

    /// Tell the server, then forget the session whatever it answered.
    pub async fn logout(&self) {
        if let Err(e) = self.pipeline.post_empty("/auth/logout").await {
            error!(error = %e, "logout request failed");
        }
        if let Err(e) = self.pipeline.set_token(None) {
            error!(error = %e, "could not clear stored token");
        }
        if let Err(e) = self.pipeline.session().clear() {
            error!(error = %e, "could not clear current user");
        }
    }

    pub async fn register<T: Serialize + ?Sized>(&self, data: &T) -> Result<Payload, ApiError> {
        self.pipeline.post("/auth/register", data).await
    }

    pub async fn profile(&self) -> Result<Payload, ApiError> {
        self.pipeline.get("/users/profile", Query::new()).await
    }

    pub async fn update_profile<T: Serialize + ?Sized>(&self, data: &T) -> Result<Payload, ApiError> {
        self.pipeline.put("/users/profile", data).await
    }
}
