// Per-network user tokens
//
// The controller authenticates every request with a user token scoped to
// one network. Where tokens come from (env, keyring, config file) is the
// caller's business; this module only defines the lookup seam and a
// TTL-bounded cache in front of it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tracing::debug;

use crate::cache::TtlCache;
use crate::error::Error;

/// Resolves the user token for a network.
pub trait TokenSource: Send + Sync {
    fn fetch_token(&self, network_id: &str) -> Result<SecretString, Error>;
}

/// Fixed in-memory token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    tokens: HashMap<String, SecretString>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, network_id: impl Into<String>, token: impl Into<String>) -> Self {
        self.tokens
            .insert(network_id.into(), SecretString::from(token.into()));
        self
    }
}

impl TokenSource for StaticTokens {
    fn fetch_token(&self, network_id: &str) -> Result<SecretString, Error> {
        self.tokens
            .get(network_id)
            .cloned()
            .ok_or_else(|| Error::MissingToken {
                network_id: network_id.into(),
            })
    }
}

/// Token lookup with a TTL cache in front of the source.
///
/// Cheap to clone; clones share the same cache.
#[derive(Clone)]
pub struct TokenCache {
    source: Arc<dyn TokenSource>,
    cache: Arc<TtlCache<String, SecretString>>,
}

impl TokenCache {
    pub fn new(source: Arc<dyn TokenSource>, ttl: Duration) -> Self {
        Self::with_cache(source, Arc::new(TtlCache::new(ttl)))
    }

    /// Build around an existing cache handle.
    pub fn with_cache(
        source: Arc<dyn TokenSource>,
        cache: Arc<TtlCache<String, SecretString>>,
    ) -> Self {
        Self { source, cache }
    }

    /// Return the cached token or resolve and cache a new one.
    pub fn token(&self, network_id: &str) -> Result<SecretString, Error> {
        if let Some(token) = self.cache.get(network_id) {
            return Ok(token);
        }
        debug!(network_id, "resolving network token");
        let token = self.source.fetch_token(network_id)?;
        self.cache.insert(network_id.to_owned(), token.clone());
        Ok(token)
    }

    /// Forget a token the controller rejected.
    pub fn invalidate(&self, network_id: &str) {
        self.cache.invalidate(network_id);
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("cached", &self.cache.len())
            .field("ttl", &self.cache.ttl())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use secrecy::ExposeSecret;

    use super::*;

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl TokenSource for CountingSource {
        fn fetch_token(&self, network_id: &str) -> Result<SecretString, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SecretString::from(format!("token-{network_id}")))
        }
    }

    #[test]
    fn static_tokens_resolve_known_networks() {
        let tokens = StaticTokens::new().with("123", "abc");
        assert_eq!(tokens.fetch_token("123").unwrap().expose_secret(), "abc");
        assert!(matches!(
            tokens.fetch_token("999"),
            Err(Error::MissingToken { .. })
        ));
    }

    #[test]
    fn cache_hits_skip_the_source() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cache = TokenCache::new(source.clone(), Duration::from_secs(60));

        assert_eq!(cache.token("1").unwrap().expose_secret(), "token-1");
        assert_eq!(cache.token("1").unwrap().expose_secret(), "token-1");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        cache.invalidate("1");
        cache.token("1").unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
