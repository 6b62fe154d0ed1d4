//! Delegated-credential store and single-use authentication handles.
//!
//! The credential store answers the authentication gate's precondition
//! question; the handle issuer mints unguessable single-use tokens that an
//! external OAuth callback consumes exactly once, granting the credential
//! on success.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

use rand::Rng;
use serde::{Deserialize, Serialize};

use attache_core::Timestamp;

// =============================================================================
// Services
// =============================================================================

/// External services a user can delegate access to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Gmail,
    Calendar,
    Notion,
    Linear,
}

impl Service {
    /// Map a free-text service request to a known service.
    ///
    /// Mirrors the loose matching users actually type: "email", "google"
    /// and "gmail" all mean mail access.
    pub fn from_request(s: &str) -> Option<Service> {
        let s = s.to_lowercase();
        if s.contains("gmail") || s.contains("email") || s.contains("google") {
            Some(Service::Gmail)
        } else if s.contains("calendar") {
            Some(Service::Calendar)
        } else if s.contains("notion") {
            Some(Service::Notion)
        } else if s.contains("linear") {
            Some(Service::Linear)
        } else {
            None
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Gmail => write!(f, "gmail"),
            Service::Calendar => write!(f, "calendar"),
            Service::Notion => write!(f, "notion"),
            Service::Linear => write!(f, "linear"),
        }
    }
}

impl std::str::FromStr for Service {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gmail" => Ok(Service::Gmail),
            "calendar" => Ok(Service::Calendar),
            "notion" => Ok(Service::Notion),
            "linear" => Ok(Service::Linear),
            _ => Err(format!("Unknown service: {}", s)),
        }
    }
}

// =============================================================================
// Credential store
// =============================================================================

/// Store of delegated credentials, consulted by the authentication gate.
pub trait CredentialStore: Send + Sync {
    /// Does this user hold a valid credential for the service?
    fn has_credential(&self, user_id: &str, service: Service) -> bool;

    /// Record a granted credential (called by the handle issuer on consume).
    fn grant(&self, user_id: &str, service: Service);

    /// Remove a credential.
    fn revoke(&self, user_id: &str, service: Service);
}

/// In-memory credential store.
pub struct InMemoryCredentialStore {
    granted: Mutex<HashSet<(String, Service)>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            granted: Mutex::new(HashSet::new()),
        }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn has_credential(&self, user_id: &str, service: Service) -> bool {
        self.granted
            .lock()
            .map(|g| g.contains(&(user_id.to_string(), service)))
            .unwrap_or(false)
    }

    fn grant(&self, user_id: &str, service: Service) {
        if let Ok(mut g) = self.granted.lock() {
            g.insert((user_id.to_string(), service));
        }
    }

    fn revoke(&self, user_id: &str, service: Service) {
        if let Ok(mut g) = self.granted.lock() {
            g.remove(&(user_id.to_string(), service));
        }
    }
}

// =============================================================================
// Authentication handles
// =============================================================================

/// Generate a random 32-character hex token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

/// A single-use opaque token binding a pending credential grant to a user
/// and service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthHandle {
    pub token: String,
    pub user_id: String,
    pub service: Service,
    pub issued_at: Timestamp,
}

/// Issues and consumes single-use authentication handles.
///
/// `consume` succeeds at most once per token; on success the bound
/// credential is granted in the credential store.
pub struct AuthHandleIssuer {
    credentials: std::sync::Arc<dyn CredentialStore>,
    outstanding: Mutex<HashMap<String, AuthHandle>>,
}

impl AuthHandleIssuer {
    pub fn new(credentials: std::sync::Arc<dyn CredentialStore>) -> Self {
        Self {
            credentials,
            outstanding: Mutex::new(HashMap::new()),
        }
    }

    /// Mint a new handle for the user/service pair.
    pub fn issue(&self, user_id: &str, service: Service) -> AuthHandle {
        let handle = AuthHandle {
            token: generate_token(),
            user_id: user_id.to_string(),
            service,
            issued_at: Timestamp::now(),
        };
        if let Ok(mut outstanding) = self.outstanding.lock() {
            outstanding.insert(handle.token.clone(), handle.clone());
        }
        tracing::debug!(user_id, service = %service, "Authentication handle issued");
        handle
    }

    /// Consume a handle by token. Returns the bound handle on first use and
    /// `None` on an unknown or already-consumed token.
    pub fn consume(&self, token: &str) -> Option<AuthHandle> {
        let handle = self.outstanding.lock().ok()?.remove(token)?;
        self.credentials.grant(&handle.user_id, handle.service);
        tracing::info!(user_id = %handle.user_id, service = %handle.service, "Credential granted");
        Some(handle)
    }
}
