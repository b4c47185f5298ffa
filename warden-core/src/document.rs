//! The document model.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identity::{DocumentId, TenantId, Timestamp};

/// A stored document, tagged with the tenant that created it.
///
/// Documents are immutable once created; the only mutation is deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub id: DocumentId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub tenant_id: TenantId,
    pub title: String,
    pub content: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl Document {
    /// Stamp a validated payload with a fresh id, the owning tenant, and the
    /// current time.
    pub fn create(tenant_id: TenantId, new: NewDocument) -> Self {
        Self {
            id: DocumentId::generate(),
            tenant_id,
            title: new.title,
            content: new.content,
            created_at: Utc::now(),
        }
    }

    /// Whether this document belongs to `tenant`.
    pub fn is_owned_by(&self, tenant: &TenantId) -> bool {
        &self.tenant_id == tenant
    }
}

/// Client-supplied payload for creating a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
}

impl NewDocument {
    /// Build a payload from optional fields, requiring both to be non-empty.
    pub fn from_parts(
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Self, ValidationError> {
        let new = Self {
            title: title.unwrap_or_default(),
            content: content.unwrap_or_default(),
        };
        new.validate()?;
        Ok(new)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "title".to_string(),
            });
        }
        if self.content.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "content".to_string(),
            });
        }
        Ok(())
    }
}
