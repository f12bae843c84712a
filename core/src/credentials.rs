//! Credential hint storage and multi-source token lookup.
//!
//! The dashboard persists small credential hints (the access token and a
//! couple of legacy/handoff keys) in a key/value store. Lookup is modeled as
//! an ordered list of named [`TokenSource`] strategies; the resolver returns
//! the first non-empty match, and each strategy is independently testable.

use std::sync::Arc;

/// Storage keys for persisted credential hints.
pub mod keys {
    /// Primary access token persisted after login and renewal.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Token key written by earlier releases, still honored on read.
    pub const LEGACY_TOKEN: &str = "auth_token";

    /// Hint written by the single-sign-on handoff page.
    pub const SSO_TOKEN: &str = "sso_token";
}

/// Key/value storage for credential hints.
///
/// This is the browser-storage analogue: small string values, synchronous
/// access, cleared wholesale on sign-out. Implementations must be cheap to
/// call; the resolver reads them on every outbound request.
pub trait CredentialStore: Send + Sync {
    /// Read a stored hint.
    fn get(&self, key: &str) -> Option<String>;

    /// Persist a hint, overwriting any previous value.
    fn set(&self, key: &str, value: &str);

    /// Remove one hint.
    fn remove(&self, key: &str);

    /// Remove every stored hint.
    fn clear(&self);
}

/// A named strategy for extracting a bearer token from hint storage.
pub trait TokenSource: Send + Sync {
    /// Name used in logs when this source wins.
    fn name(&self) -> &str;

    /// Extract a token, returning `None` when absent or empty.
    fn extract(&self, store: &dyn CredentialStore) -> Option<String>;
}

/// [`TokenSource`] reading a single storage key.
#[derive(Debug, Clone)]
pub struct StoredKey {
    name: &'static str,
    key: &'static str,
}

impl StoredKey {
    /// Create a source reading `key`, identified as `name` in logs.
    #[must_use]
    pub const fn new(name: &'static str, key: &'static str) -> Self {
        Self { name, key }
    }
}

impl TokenSource for StoredKey {
    fn name(&self) -> &str {
        self.name
    }

    fn extract(&self, store: &dyn CredentialStore) -> Option<String> {
        store.get(self.key).filter(|value| !value.is_empty())
    }
}

/// Ordered token lookup over named sources.
///
/// `resolve` tries each source in declared order and returns the first
/// non-empty match.
pub struct TokenResolver {
    store: Arc<dyn CredentialStore>,
    sources: Vec<Box<dyn TokenSource>>,
}

impl TokenResolver {
    /// Create a resolver over an explicit source list.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, sources: Vec<Box<dyn TokenSource>>) -> Self {
        Self { store, sources }
    }

    /// The standard lookup order: access token, then the legacy key, then
    /// the single-sign-on handoff hint.
    #[must_use]
    pub fn standard(store: Arc<dyn CredentialStore>) -> Self {
        Self::new(
            store,
            vec![
                Box::new(StoredKey::new("access-token", keys::ACCESS_TOKEN)),
                Box::new(StoredKey::new("legacy-token", keys::LEGACY_TOKEN)),
                Box::new(StoredKey::new("sso-handoff", keys::SSO_TOKEN)),
            ],
        )
    }

    /// Resolve the current bearer token, if any source has one.
    #[must_use]
    pub fn resolve(&self) -> Option<String> {
        for source in &self.sources {
            if let Some(token) = source.extract(self.store.as_ref()) {
                tracing::trace!(source = source.name(), "resolved bearer token");
                return Some(token);
            }
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        map: Mutex<HashMap<String, String>>,
    }

    impl CredentialStore for MapStore {
        fn get(&self, key: &str) -> Option<String> {
            self.map.lock().ok()?.get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            if let Ok(mut map) = self.map.lock() {
                map.insert(key.to_string(), value.to_string());
            }
        }

        fn remove(&self, key: &str) {
            if let Ok(mut map) = self.map.lock() {
                map.remove(key);
            }
        }

        fn clear(&self) {
            if let Ok(mut map) = self.map.lock() {
                map.clear();
            }
        }
    }

    #[test]
    fn test_stored_key_ignores_empty_values() {
        let store = MapStore::default();
        store.set(keys::ACCESS_TOKEN, "");

        let source = StoredKey::new("access-token", keys::ACCESS_TOKEN);
        assert_eq!(source.extract(&store), None);

        store.set(keys::ACCESS_TOKEN, "tok-1");
        assert_eq!(source.extract(&store), Some("tok-1".to_string()));
    }

    #[test]
    fn test_resolver_returns_first_non_empty_match() {
        let store = Arc::new(MapStore::default());
        store.set(keys::LEGACY_TOKEN, "legacy");
        store.set(keys::SSO_TOKEN, "sso");

        let resolver = TokenResolver::standard(Arc::clone(&store) as Arc<dyn CredentialStore>);
        assert_eq!(resolver.resolve(), Some("legacy".to_string()));

        store.set(keys::ACCESS_TOKEN, "fresh");
        assert_eq!(resolver.resolve(), Some("fresh".to_string()));
    }

    #[test]
    fn test_resolver_with_nothing_stored() {
        let store = Arc::new(MapStore::default());
        let resolver = TokenResolver::standard(store);
        assert_eq!(resolver.resolve(), None);
    }
}
