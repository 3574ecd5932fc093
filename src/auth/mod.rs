//! Administrator authentication: a shared PIN exchanged for a trust token.

mod throttle;
mod trust;

pub use throttle::{LoginThrottle, UNKNOWN_CLIENT};
pub use trust::{SessionTrustStore, TrustStore, TrustToken, DEFAULT_SESSION_TTL};

use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::roster::RosterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinCheck {
    Authenticated,
    Rejected,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Invalid PIN")]
    InvalidPin,

    #[error("Too many login attempts. Try again in a minute.")]
    Throttled,
}

/// Gatekeeper for every administrator operation
pub struct AdminGuard {
    pin: String,
    trust: Arc<dyn TrustStore>,
    throttle: Option<LoginThrottle>,
}

impl AdminGuard {
    pub fn new(pin: impl Into<String>, trust: Arc<dyn TrustStore>) -> Self {
        Self {
            pin: pin.into(),
            trust,
            throttle: None,
        }
    }

    pub fn with_throttle(mut self, throttle: Option<LoginThrottle>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Compare the trimmed candidate against the configured PIN. An empty
    /// PIN on either side never authenticates.
    pub fn check_pin(&self, candidate: &str) -> PinCheck {
        let candidate = candidate.trim();
        if !candidate.is_empty() && !self.pin.trim().is_empty() && candidate == self.pin {
            PinCheck::Authenticated
        } else {
            PinCheck::Rejected
        }
    }

    /// Throttle per client, check the PIN and issue a token on success.
    /// Callers with no known address share the [`UNKNOWN_CLIENT`] budget.
    pub async fn login(&self, client: Option<IpAddr>, candidate: &str) -> Result<TrustToken, LoginError> {
        if let Some(throttle) = &self.throttle {
            let client = client.unwrap_or(UNKNOWN_CLIENT);
            if !throttle.try_acquire(client) {
                warn!(%client, "Admin login throttled");
                return Err(LoginError::Throttled);
            }
        }

        match self.check_pin(candidate) {
            PinCheck::Authenticated => {
                info!("Admin login succeeded");
                Ok(self.issue_trust().await)
            }
            PinCheck::Rejected => {
                warn!("Admin login rejected");
                Err(LoginError::InvalidPin)
            }
        }
    }

    pub async fn issue_trust(&self) -> TrustToken {
        self.trust.issue().await
    }

    pub async fn is_trusted(&self, token: Option<&str>) -> bool {
        self.trust.is_trusted(token).await
    }

    pub async fn revoke_trust(&self, token: Option<&str>) {
        self.trust.revoke(token).await
    }

    pub async fn require_trust(&self, token: Option<&str>) -> Result<(), RosterError> {
        if self.is_trusted(token).await {
            Ok(())
        } else {
            Err(RosterError::Unauthorized)
        }
    }
}
