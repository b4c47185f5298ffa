//! Tenant-scoped counter store keys.
//!
//! The key insight is that `TenantScopedKey`'s private constructor makes a
//! key without a tenant UNCONSTRUCTIBLE. Rate-limit counters and search cache
//! entries can only be addressed through a tenant.

use std::fmt;
use warden_core::TenantId;

/// Separator between key segments.
const SEPARATOR: char = ':';

/// What a key is used for. Each namespace has a distinct prefix, so a rate
/// limit counter can never collide with a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyNamespace {
    /// Fixed-window request counter, one per tenant.
    RateLimit,
    /// Cached search result, one per (tenant, raw query text).
    Search,
}

impl KeyNamespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            KeyNamespace::RateLimit => "ratelimit",
            KeyNamespace::Search => "search",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ratelimit" => Some(KeyNamespace::RateLimit),
            "search" => Some(KeyNamespace::Search),
            _ => None,
        }
    }
}

/// A counter store key that is scoped to a specific tenant.
///
/// # Encoding
///
/// ```text
/// ratelimit:<tenant byte length>:<tenant>
/// search:<tenant byte length>:<tenant>:<raw query>
/// ```
///
/// The tenant is length-prefixed because both tenant ids and query text may
/// contain the separator. Without the prefix, tenant `a:b` searching `c`
/// and tenant `a` searching `b:c` would share `search:a:b:c`.
///
/// Query text is not normalized: `"Alpha"` and `"alpha "` are separate keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantScopedKey {
    /// Private inner data - cannot be constructed externally
    inner: TenantKeyInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TenantKeyInner {
    namespace: KeyNamespace,
    tenant_id: TenantId,
    query: Option<String>,
}

impl TenantScopedKey {
    /// Key of the fixed-window request counter for `tenant`.
    pub fn rate_limit(tenant: &TenantId) -> Self {
        Self {
            inner: TenantKeyInner {
                namespace: KeyNamespace::RateLimit,
                tenant_id: tenant.clone(),
                query: None,
            },
        }
    }

    /// Key of the cached result set for `query` issued by `tenant`.
    pub fn search(tenant: &TenantId, query: &str) -> Self {
        Self {
            inner: TenantKeyInner {
                namespace: KeyNamespace::Search,
                tenant_id: tenant.clone(),
                query: Some(query.to_string()),
            },
        }
    }

    pub fn namespace(&self) -> KeyNamespace {
        self.inner.namespace
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.inner.tenant_id
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.query.as_deref()
    }

    /// Encode to the string stored in the counter store.
    pub fn encode(&self) -> String {
        let mut key = Self::tenant_prefix(self.inner.namespace, &self.inner.tenant_id);
        if let Some(query) = &self.inner.query {
            key.push(SEPARATOR);
            key.push_str(query);
        }
        key
    }

    /// Decode a key produced by [`TenantScopedKey::encode`].
    ///
    /// Returns `None` for unknown namespaces, a bad length prefix, an empty
    /// tenant, or a query segment on the wrong namespace.
    pub fn decode(encoded: &str) -> Option<Self> {
        let (prefix, rest) = encoded.split_once(SEPARATOR)?;
        let namespace = KeyNamespace::from_prefix(prefix)?;

        let (len, rest) = rest.split_once(SEPARATOR)?;
        let len: usize = len.parse().ok()?;
        let tenant = rest.get(..len)?;
        let remainder = rest.get(len..)?;
        let tenant_id = TenantId::parse(tenant).ok()?;

        let query = match (namespace, remainder) {
            (KeyNamespace::RateLimit, "") => None,
            (KeyNamespace::Search, remainder) => {
                Some(remainder.strip_prefix(SEPARATOR)?.to_string())
            }
            (KeyNamespace::RateLimit, _) => return None,
        };

        Some(Self {
            inner: TenantKeyInner {
                namespace,
                tenant_id,
                query,
            },
        })
    }

    /// Prefix shared by every key of `namespace` that belongs to `tenant`.
    pub fn tenant_prefix(namespace: KeyNamespace, tenant: &TenantId) -> String {
        let tenant = tenant.as_str();
        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            namespace.prefix(),
            tenant.len(),
            tenant
        )
    }
}

impl fmt::Display for TenantScopedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use warden_test_utils::{arb_query, arb_tenant_id};

    fn tenant(raw: &str) -> TenantId {
        TenantId::parse(raw).unwrap()
    }

    #[test]
    fn test_encoding_format() {
        assert_eq!(TenantScopedKey::rate_limit(&tenant("acme")).encode(), "ratelimit:4:acme");
        assert_eq!(
            TenantScopedKey::search(&tenant("acme"), "Alpha").encode(),
            "search:4:acme:Alpha"
        );
    }

    #[test]
    fn test_separator_in_tenant_does_not_collide() {
        let a = TenantScopedKey::search(&tenant("a:b"), "c");
        let b = TenantScopedKey::search(&tenant("a"), "b:c");
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let t = tenant("acme");
        let limit = TenantScopedKey::rate_limit(&t).encode();
        let search = TenantScopedKey::search(&t, "").encode();
        assert_ne!(limit, search);
        assert!(search.starts_with("search:"));
    }

    #[test]
    fn test_query_is_not_normalized() {
        let t = tenant("acme");
        assert_ne!(
            TenantScopedKey::search(&t, "Alpha").encode(),
            TenantScopedKey::search(&t, "alpha ").encode()
        );
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(TenantScopedKey::decode("ratelimit").is_none());
        assert!(TenantScopedKey::decode("unknown:4:acme").is_none());
        assert!(TenantScopedKey::decode("ratelimit:9:acme").is_none());
        assert!(TenantScopedKey::decode("ratelimit:0:").is_none());
        assert!(TenantScopedKey::decode("ratelimit:4:acme:extra").is_none());
        assert!(TenantScopedKey::decode("search:4:acme").is_none());
    }

    #[test]
    fn test_decode_recovers_tenant_with_separators() {
        let key = TenantScopedKey::search(&tenant("a:b"), "x:y");
        let decoded = TenantScopedKey::decode(&key.encode()).unwrap();
        assert_eq!(decoded.tenant_id().as_str(), "a:b");
        assert_eq!(decoded.query(), Some("x:y"));
        assert_eq!(decoded.namespace(), KeyNamespace::Search);
    }

    proptest! {
        #[test]
        fn prop_distinct_pairs_encode_distinctly(
            t1 in arb_tenant_id(),
            q1 in arb_query(),
            t2 in arb_tenant_id(),
            q2 in arb_query(),
        ) {
            prop_assume!((&t1, &q1) != (&t2, &q2));
            let a = TenantScopedKey::search(&t1, &q1).encode();
            let b = TenantScopedKey::search(&t2, &q2).encode();
            prop_assert_ne!(a, b);
        }

        #[test]
        fn prop_search_keys_carry_their_tenant_prefix(t in arb_tenant_id(), q in arb_query()) {
            let key = TenantScopedKey::search(&t, &q);
            let prefix = TenantScopedKey::tenant_prefix(KeyNamespace::Search, &t);
            prop_assert!(key.encode().starts_with(&prefix));
            prop_assert_eq!(TenantScopedKey::decode(&key.encode()), Some(key));
        }
    }
}
