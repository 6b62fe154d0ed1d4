//! Authentication gate.
//!
//! A precondition check consulted by handlers before any backend call that
//! needs delegated credentials. On a missing credential the handler
//! short-circuits into an authentication task result carrying a single-use
//! handle; the gate itself never mints or validates tokens beyond asking
//! the issuer for one.

use std::sync::Arc;

use attache_backends::{AuthHandleIssuer, CredentialStore, Service};

use crate::types::HandlerOutcome;

/// Gate deciding whether a handler may touch a credentialed backend.
pub struct AuthGate {
    credentials: Arc<dyn CredentialStore>,
    issuer: Arc<AuthHandleIssuer>,
    auth_base_url: String,
}

impl AuthGate {
    pub fn new(credentials: Arc<dyn CredentialStore>, issuer: Arc<AuthHandleIssuer>) -> Self {
        Self {
            credentials,
            issuer,
            auth_base_url: "https://attache.local/auth".to_string(),
        }
    }

    /// Override the base URL embedded in authentication instructions.
    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    /// Does the user hold a valid credential for the service?
    pub fn has_credential(&self, user_id: &str, service: Service) -> bool {
        self.credentials.has_credential(user_id, service)
    }

    /// Precondition check: `Ok(())` when the credential exists, otherwise the
    /// authentication outcome the handler must return instead of calling the
    /// backend.
    pub fn check(&self, user_id: &str, service: Service) -> Result<(), HandlerOutcome> {
        if self.has_credential(user_id, service) {
            Ok(())
        } else {
            tracing::debug!(user_id, service = %service, "Credential missing, short-circuiting");
            Err(self.challenge(user_id, service))
        }
    }

    /// Build an authentication challenge for the user/service pair.
    pub fn challenge(&self, user_id: &str, service: Service) -> HandlerOutcome {
        let handle = self.issuer.issue(user_id, service);
        let auth_url = format!(
            "{}?token={}&user_id={}&service={}",
            self.auth_base_url, handle.token, user_id, service
        );
        HandlerOutcome::AuthenticationRequired {
            service,
            auth_handle: handle.token,
            instructions: format!(
                "To access your {}, please open this authentication link: {}",
                service, auth_url
            ),
        }
    }
}
