//! Warden Test Utilities
//!
//! Shared test infrastructure for the Warden workspace:
//! - Proptest generators for tenants, document payloads, and query text
//! - Fixtures for common scenarios

// Re-export core types for convenience
pub use warden_core::{Document, DocumentId, NewDocument, TenantId, Timestamp};

pub use fixtures::*;
pub use generators::*;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Warden domain types.

    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    // === Identity Generators ===

    /// Generate a tenant id. Some contain the key separator `:`.
    pub fn arb_tenant_id() -> impl Strategy<Value = TenantId> {
        "[a-z][a-z0-9:-]{0,15}"
            .prop_map(|raw| TenantId::parse(raw).expect("pattern is never empty"))
    }

    /// Generate two different tenant ids.
    pub fn arb_tenant_pair() -> impl Strategy<Value = (TenantId, TenantId)> {
        (arb_tenant_id(), arb_tenant_id()).prop_filter("tenants must differ", |(a, b)| a != b)
    }

    /// Generate a document id in the server's hyphenated UUID format.
    pub fn arb_document_id() -> impl Strategy<Value = DocumentId> {
        any::<u128>().prop_map(|bits| DocumentId::from(uuid::Uuid::from_u128(bits).to_string()))
    }

    /// Generate a UTC timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64).prop_map(|secs| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .expect("range is within chrono bounds")
        })
    }

    // === Payload Generators ===

    /// Generate a document title of one to four words.
    pub fn arb_title() -> impl Strategy<Value = String> {
        prop::collection::vec("[A-Za-z]{1,10}", 1..=4).prop_map(|words| words.join(" "))
    }

    /// Generate document body text.
    pub fn arb_content() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z]{1,12}", 1..=20).prop_map(|words| words.join(" "))
    }

    /// Generate a valid create payload.
    pub fn arb_new_document() -> impl Strategy<Value = NewDocument> {
        (arb_title(), arb_content()).prop_map(|(title, content)| NewDocument { title, content })
    }

    /// Generate a stored document owned by `tenant`.
    pub fn arb_document(tenant: TenantId) -> impl Strategy<Value = Document> {
        (arb_document_id(), arb_new_document(), arb_timestamp()).prop_map(
            move |(id, new, created_at)| Document {
                id,
                tenant_id: tenant.clone(),
                title: new.title,
                content: new.content,
                created_at,
            },
        )
    }

    /// Generate non-empty raw search text. May contain spaces and `:`.
    pub fn arb_query() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9: ]{0,23}"
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built values for common testing scenarios.

    use super::*;

    /// The tenant most tests act as.
    pub fn acme() -> TenantId {
        TenantId::parse("acme").expect("fixture tenant is non-empty")
    }

    /// A second tenant that must never see `acme`'s data.
    pub fn other_tenant() -> TenantId {
        TenantId::parse("globex").expect("fixture tenant is non-empty")
    }

    /// The `Alpha` document used by the end-to-end scenarios.
    pub fn sample_new_document() -> NewDocument {
        NewDocument {
            title: "Alpha".to_string(),
            content: "first doc".to_string(),
        }
    }
}
