//! Session state shared by every request: the bearer token, the current
//! user and the navigation signal used on 401.

use std::sync::{Arc, Mutex, RwLock};

use tracing::warn;

use crate::error::ApiError;
use crate::store::KeyValueStore;
use crate::types::User;

/// The bearer token, cached in memory and persisted under a fixed key.
///
/// Reads hit only the cache, so header construction never touches the
/// backing store. Writes update the cache and the store under one lock.
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    cached: RwLock<Option<String>>,
}

impl TokenStore {
    /// Load the persisted token, if any. An unreadable value is dropped.
    pub fn load(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let cached = match store.get(key) {
            Ok(Some(raw)) => decode_string(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "could not read stored token");
                None
            }
        };
        Self {
            store,
            key: key.to_string(),
            cached: RwLock::new(cached),
        }
    }

    pub fn get(&self) -> Option<String> {
        match self.cached.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace or clear the token. An empty token clears it, and clearing
    /// an absent token is a no-op.
    ///
    /// A new token is cached only after the store accepted it. Clearing
    /// always drops the cached token, even if the store removal fails.
    pub fn set(&self, token: Option<&str>) -> Result<(), ApiError> {
        let token = token.filter(|t| !t.is_empty());
        let mut guard = match self.cached.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match token {
            Some(t) => {
                self.store.set(&self.key, &encode_string(t))?;
                *guard = Some(t.to_string());
                Ok(())
            }
            None => {
                *guard = None;
                self.store.remove(&self.key)
            }
        }
    }
}

/// Holds the current user. Initialized from the store, cleared on logout
/// and on any 401.
pub struct SessionState {
    store: Arc<dyn KeyValueStore>,
    key: String,
    user: RwLock<Option<User>>,
}

impl SessionState {
    pub fn load(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let user = match store.get(key) {
            Ok(Some(raw)) => serde_json::from_str(&raw)
                .map_err(|e| warn!(key, error = %e, "discarding unreadable stored user"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "could not read stored user");
                None
            }
        };
        Self {
            store,
            key: key.to_string(),
            user: RwLock::new(user),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        match self.user.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_user(&self, user: User) -> Result<(), ApiError> {
        let raw = serde_json::to_string(&user).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut guard = match self.user.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.store.set(&self.key, &raw)?;
        *guard = Some(user);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        let mut guard = match self.user.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
        self.store.remove(&self.key)
    }
}

/// The UI's view of where the user is.
pub trait NavigationSignal: Send + Sync {
    fn current_route(&self) -> String;
    fn show_login(&self);
}

/// In-memory route holder for headless hosts.
#[derive(Debug)]
pub struct RouteState {
    route: Mutex<String>,
    login_route: String,
}

impl RouteState {
    pub fn new(initial: &str, login_route: &str) -> Self {
        Self {
            route: Mutex::new(initial.to_string()),
            login_route: login_route.to_string(),
        }
    }

    pub fn navigate(&self, route: &str) {
        if let Ok(mut guard) = self.route.lock() {
            *guard = route.to_string();
        }
    }
}

impl NavigationSignal for RouteState {
    fn current_route(&self) -> String {
        self.route.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn show_login(&self) {
        self.navigate(&self.login_route);
    }
}

fn encode_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Stored values are JSON strings; accept bare strings written by hand.
fn decode_string(raw: &str) -> Option<String> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::String(s)) => Some(s).filter(|s| !s.is_empty()),
        Ok(serde_json::Value::Null) => None,
        _ if raw.is_empty() => None,
        _ => Some(raw.to_string()),
    }
}
