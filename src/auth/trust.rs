use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Lifetime of a session when none is configured
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Opaque credential proving the holder passed the PIN check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustToken(String);

impl TrustToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Issues and verifies trust tokens.
///
/// The HTTP layer decides how a token travels (cookie today); implementations
/// only decide which tokens are live.
#[async_trait]
pub trait TrustStore: Send + Sync {
    async fn issue(&self) -> TrustToken;

    async fn is_trusted(&self, token: Option<&str>) -> bool;

    async fn revoke(&self, token: Option<&str>);
}

/// In-memory session tokens, each a random UUID v4 that expires `ttl` after
/// it was issued. Expired entries are swept whenever a new one is issued.
#[derive(Debug)]
pub struct SessionTrustStore {
    live: RwLock<HashMap<String, Instant>>,
    ttl: Duration,
}

impl Default for SessionTrustStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionTrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            live: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub async fn live_sessions(&self) -> usize {
        self.live.read().await.len()
    }
}

#[async_trait]
impl TrustStore for SessionTrustStore {
    async fn issue(&self) -> TrustToken {
        let token = Uuid::new_v4().to_string();
        let mut live = self.live.write().await;
        live.retain(|_, issued| issued.elapsed() < self.ttl);
        live.insert(token.clone(), Instant::now());
        TrustToken(token)
    }

    async fn is_trusted(&self, token: Option<&str>) -> bool {
        match token {
            Some(t) if !t.is_empty() => self
                .live
                .read()
                .await
                .get(t)
                .is_some_and(|issued| issued.elapsed() < self.ttl),
            _ => false,
        }
    }

    async fn revoke(&self, token: Option<&str>) {
        if let Some(t) = token {
            self.live.write().await.remove(t);
        }
    }
}
