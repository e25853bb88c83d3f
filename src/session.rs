//! Remote session lifecycle management.
//!
//! The connector process holds at most one live remote session at a time,
//! fingerprinted by its connection parameters. A request with a different
//! fingerprint, or against a session the provider reports as no longer
//! connected, tears the old session down (best-effort) and opens a new one.
//! Check-and-open is a critical section: the whole transition runs under one
//! mutex so overlapping calls cannot open two sessions or close a session
//! mid-use.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ExchangeConfig;
use crate::error::ConnectorResult;

/// Canonical digest of the identity-affecting connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionFingerprint(String);

impl ConnectionFingerprint {
    /// Compute the fingerprint of a configuration.
    #[must_use]
    pub fn of(config: &ExchangeConfig) -> Self {
        let digest = Sha256::digest(config.fingerprint_material().as_bytes());
        Self(hex::encode(digest))
    }

    /// Hex digest, safe for logging.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Digest prefix is enough to correlate log lines.
        write!(f, "{}", &self.0[..12.min(self.0.len())])
    }
}

/// Opaque handle to an open remote session, issued by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(String);

impl SessionHandle {
    /// Wrap a provider-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The provider-issued identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Observed state of the held session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opened,
    Broken,
    Closed,
}

/// The single process-wide remote session.
#[derive(Debug, Clone)]
pub struct RemoteSession {
    pub fingerprint: ConnectionFingerprint,
    pub handle: SessionHandle,
    pub state: SessionState,
}

/// External remote-session provider. Owns the wire protocol and the
/// authentication mechanics; the connector only drives open/close/liveness.
#[async_trait]
pub trait RemoteSessionProvider: Send + Sync {
    /// Open a session using the configured authentication variant.
    async fn open(&self, config: &ExchangeConfig) -> ConnectorResult<SessionHandle>;

    /// Close a session. Errors are reported but callers may ignore them.
    async fn close(&self, handle: &SessionHandle) -> ConnectorResult<()>;

    /// Whether the session behind `handle` is still usable.
    async fn is_connected(&self, handle: &SessionHandle) -> bool;
}

// Shared providers delegate, so callers can hand the same instance to the
// manager and keep a handle for themselves.
#[async_trait]
impl<T: RemoteSessionProvider + ?Sized> RemoteSessionProvider for Arc<T> {
    async fn open(&self, config: &ExchangeConfig) -> ConnectorResult<SessionHandle> {
        self.as_ref().open(config).await
    }

    async fn close(&self, handle: &SessionHandle) -> ConnectorResult<()> {
        self.as_ref().close(handle).await
    }

    async fn is_connected(&self, handle: &SessionHandle) -> bool {
        self.as_ref().is_connected(handle).await
    }
}

/// Owns the at-most-one live session and its open/reuse/invalidate logic.
pub struct SessionManager<P> {
    provider: P,
    current: Mutex<Option<RemoteSession>>,
}

impl<P: RemoteSessionProvider> SessionManager<P> {
    /// Create a manager with no open session.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            current: Mutex::new(None),
        }
    }

    /// Return a handle for `config`, reusing the held session when its
    /// fingerprint matches and the provider still reports it connected.
    ///
    /// Open failures surface as connection errors; there is no internal
    /// retry.
    pub async fn ensure_session(&self, config: &ExchangeConfig) -> ConnectorResult<SessionHandle> {
        let fingerprint = ConnectionFingerprint::of(config);
        let mut current = self.current.lock().await;

        if let Some(session) = current.take() {
            let stale = session.fingerprint != fingerprint
                || session.state != SessionState::Opened
                || !self.provider.is_connected(&session.handle).await;
            if stale {
                debug!(fingerprint = %fingerprint, "held session is stale, closing");
                if let Err(err) = self.provider.close(&session.handle).await {
                    warn!(error = %err, "ignoring close failure for stale session");
                }
            } else {
                *current = Some(session);
            }
        }

        if let Some(session) = current.as_ref() {
            debug!(fingerprint = %fingerprint, "reusing remote session");
            return Ok(session.handle.clone());
        }

        let handle = self.provider.open(config).await?;
        info!(
            fingerprint = %fingerprint,
            auth = config.auth.as_str(),
            "opened remote session"
        );
        *current = Some(RemoteSession {
            fingerprint,
            handle: handle.clone(),
            state: SessionState::Opened,
        });
        Ok(handle)
    }

    /// Close and drop the held session, if any. Close errors are ignored.
    pub async fn close_session(&self) {
        let mut current = self.current.lock().await;
        if let Some(session) = current.take() {
            if let Err(err) = self.provider.close(&session.handle).await {
                warn!(error = %err, "ignoring close failure on unload");
            } else {
                info!("closed remote session");
            }
        }
    }

    /// Whether a session is currently held.
    pub async fn has_session(&self) -> bool {
        self.current.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMethod;
    use crate::error::ConnectorError;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn config(uri: &str) -> ExchangeConfig {
        ExchangeConfig {
            auth: AuthMethod::Credentials {
                connection_uri: uri.to_string(),
                username: "svc-idm".to_string(),
                password: SecretString::new("pw".to_string()),
            },
            page_size: 1000,
            recipient_scope: None,
        }
    }

    #[derive(Default)]
    struct SpyProvider {
        opens: AtomicUsize,
        closes: AtomicUsize,
        fail_open: AtomicBool,
        connected: AtomicBool,
    }

    impl SpyProvider {
        fn new() -> Arc<Self> {
            let spy = Arc::new(Self::default());
            spy.connected.store(true, Ordering::SeqCst);
            spy
        }
    }

    #[async_trait]
    impl RemoteSessionProvider for SpyProvider {
        async fn open(&self, _config: &ExchangeConfig) -> ConnectorResult<SessionHandle> {
            if self.fail_open.load(Ordering::SeqCst) {
                return Err(ConnectorError::connection("endpoint unreachable"));
            }
            let n = self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(SessionHandle::new(format!("session-{n}")))
        }

        async fn close(&self, _handle: &SessionHandle) -> ConnectorResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn is_connected(&self, _handle: &SessionHandle) -> bool {
            self.connected.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_same_fingerprint_reuses_session() {
        let spy = SpyProvider::new();
        let manager = SessionManager::new(spy.clone());

        let first = manager.ensure_session(&config("https://a.test")).await.unwrap();
        let second = manager.ensure_session(&config("https://a.test")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(spy.opens.load(Ordering::SeqCst), 1);
        assert_eq!(spy.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fingerprint_change_reopens() {
        let spy = SpyProvider::new();
        let manager = SessionManager::new(spy.clone());

        let first = manager.ensure_session(&config("https://a.test")).await.unwrap();
        let second = manager.ensure_session(&config("https://b.test")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(spy.opens.load(Ordering::SeqCst), 2);
        assert_eq!(spy.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disconnected_session_reopens() {
        let spy = SpyProvider::new();
        let manager = SessionManager::new(spy.clone());

        manager.ensure_session(&config("https://a.test")).await.unwrap();
        spy.connected.store(false, Ordering::SeqCst);
        manager.ensure_session(&config("https://a.test")).await.unwrap();

        assert_eq!(spy.opens.load(Ordering::SeqCst), 2);
        assert_eq!(spy.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_open_failure_propagates_and_holds_nothing() {
        let spy = SpyProvider::new();
        spy.fail_open.store(true, Ordering::SeqCst);
        let manager = SessionManager::new(spy.clone());

        let err = manager.ensure_session(&config("https://a.test")).await.unwrap_err();
        assert_eq!(err.error_code(), "CONNECTION_ERROR");
        assert!(!manager.has_session().await);

        // Next call retries the open (caller-driven, not internal).
        spy.fail_open.store(false, Ordering::SeqCst);
        assert!(manager.ensure_session(&config("https://a.test")).await.is_ok());
    }

    #[tokio::test]
    async fn test_close_session_is_idempotent() {
        let spy = SpyProvider::new();
        let manager = SessionManager::new(spy.clone());

        manager.ensure_session(&config("https://a.test")).await.unwrap();
        manager.close_session().await;
        manager.close_session().await;

        assert_eq!(spy.closes.load(Ordering::SeqCst), 1);
        assert!(!manager.has_session().await);
    }

    #[test]
    fn test_fingerprint_is_canonical() {
        let a = ConnectionFingerprint::of(&config("https://a.test"));
        let b = ConnectionFingerprint::of(&config("https://a.test"));
        let c = ConnectionFingerprint::of(&config("https://c.test"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }
}
