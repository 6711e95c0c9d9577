//! # Store Abstractions
//!
//! The persistence seams of fitbell. The dashboard and the widget host only
//! talk to these traits; [`MemoryStore`] and [`crate::Database`] implement
//! all of them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Merchant side                         Shopper side                     │
//! │                                                                         │
//! │  Dashboard ──► MerchantDirectory       WidgetHost ──► PublicConfigResolver
//! │            ──► ConfigStore                        ──► EventSink         │
//! │            ──► EventSink (analytics)                                    │
//! │                    │                                   │                │
//! │                    ▼                                   ▼                │
//! │        ┌───────────────────────┐          ┌───────────────────────┐     │
//! │        │ MemoryStore (RwLock)  │    or    │ Database (SQLite)     │     │
//! │        └───────────────────────┘          └───────────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Authorization
//! Every mutation takes the caller's [`MerchantSession`]. A write is only
//! accepted when the session is bound to the merchant that owns the record;
//! anything else is `DbError::NotAuthenticated`.

mod memory;
mod sqlite;


pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use fitbell_core::widget::WidgetEvent;
use fitbell_core::{
    BusinessConfig, Merchant, MerchantSession, NewSizeEntry, RecordedRequest, SizeCategory,
    SizeChart, SizeEntry,
};

// =============================================================================
// Traits
// =============================================================================

/// Merchant accounts and slug routing.
#[async_trait]
pub trait MerchantDirectory: Send + Sync {
    /// Stores a new account. Fails with `UniqueViolation` on a taken email.
    async fn create_merchant(&self, merchant: &Merchant) -> DbResult<()>;

    async fn find_merchant_by_email(&self, email: &str) -> DbResult<Option<Merchant>>;

    /// Points `slug` at `merchant_id`. Last write wins.
    async fn bind_slug(&self, slug: &str, merchant_id: &str) -> DbResult<()>;

    /// Removes an account with its config, size chart, request log and
    /// slug routes. Returns whether the account existed.
    async fn delete_merchant(&self, merchant_id: &str) -> DbResult<bool>;
}

/// Per-merchant configuration and size chart.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Replaces the stored configuration of `merchant_id`.
    ///
    /// ## Errors
    /// * `NotAuthenticated` - `session` is not bound to `merchant_id`
    /// * `Validation` - blank colors or duplicate option ids
    async fn save(
        &self,
        session: &MerchantSession,
        merchant_id: &str,
        config: &BusinessConfig,
    ) -> DbResult<()>;

    /// Last saved configuration, or [`BusinessConfig::default`] if none.
    async fn load(&self, merchant_id: &str) -> DbResult<BusinessConfig>;

    /// The merchant's chart, empty if nothing was ever added.
    async fn load_size_chart(&self, merchant_id: &str) -> DbResult<SizeChart>;

    /// Validates `entry`, gives it a fresh id and appends it to `category`.
    async fn add_size_entry(
        &self,
        session: &MerchantSession,
        merchant_id: &str,
        category: SizeCategory,
        entry: NewSizeEntry,
    ) -> DbResult<SizeEntry>;

    /// Removes an entry by id. Absent ids are a no-op.
    async fn remove_size_entry(
        &self,
        session: &MerchantSession,
        merchant_id: &str,
        category: SizeCategory,
        id: &str,
    ) -> DbResult<()>;
}

/// Read-only slug lookup for the public widget.
#[async_trait]
pub trait PublicConfigResolver: Send + Sync {
    /// Never fails: unknown slugs and storage errors resolve to the default
    /// configuration with [`Resolution::Fallback`].
    async fn resolve_by_slug(&self, slug: &str) -> ResolvedConfig;
}

/// Destination for requests emitted by the widget.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn record(&self, merchant_id: &str, event: &WidgetEvent) -> DbResult<RecordedRequest>;

    /// Recorded requests for `merchant_id`, oldest first.
    async fn recorded_requests(&self, merchant_id: &str) -> DbResult<Vec<RecordedRequest>>;
}

// =============================================================================
// Slug Resolution
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// The slug is bound to a merchant; `config` is theirs.
    Published,
    /// The slug did not resolve; `config` is the default.
    Fallback,
}

/// What the public widget gets for a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub slug: String,
    /// Owner of the slug. `None` on fallback, in which case emitted
    /// requests have nobody to be recorded against.
    pub merchant_id: Option<String>,
    pub config: BusinessConfig,
    pub resolution: Resolution,
}

impl ResolvedConfig {
    pub fn published(slug: &str, merchant_id: impl Into<String>, config: BusinessConfig) -> Self {
        ResolvedConfig {
            slug: slug.to_string(),
            merchant_id: Some(merchant_id.into()),
            config,
            resolution: Resolution::Published,
        }
    }

    /// Default styling and options for a slug that did not resolve.
    pub fn fallback(slug: &str) -> Self {
        warn!(slug = %slug, "Slug not resolved, serving default configuration");
        ResolvedConfig {
            slug: slug.to_string(),
            merchant_id: None,
            config: BusinessConfig::default(),
            resolution: Resolution::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.resolution == Resolution::Fallback
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Checks that `session` may write records owned by `merchant_id`.
pub(crate) fn require_owner<'a>(
    session: &'a MerchantSession,
    merchant_id: &str,
) -> DbResult<&'a Merchant> {
    let merchant = session.require_merchant()?;
    if merchant.uid != merchant_id {
        warn!(
            session_uid = %merchant.uid,
            merchant_id = %merchant_id,
            "Write rejected: session does not own this merchant"
        );
        return Err(DbError::NotAuthenticated);
    }
    Ok(merchant)
}

/// Checks `entry` against `category` and attaches an id unused in `chart`.
pub(crate) fn prepare_size_entry(
    chart: &SizeChart,
    category: SizeCategory,
    entry: NewSizeEntry,
) -> DbResult<SizeEntry> {
    entry.expect_category(category)?;
    entry.validate()?;
    let id = chart.generate_id(category);
    Ok(entry.with_id(id))
}

pub(crate) fn new_request(merchant_id: &str, event: &WidgetEvent) -> RecordedRequest {
    RecordedRequest {
        id: Uuid::new_v4().to_string(),
        merchant_id: merchant_id.to_string(),
        event: event.clone(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitbell_core::ValidationError;

    fn merchant(uid: &str) -> Merchant {
        Merchant {
            uid: uid.to_string(),
            email: format!("{uid}@store.test"),
            business_name: "Store".to_string(),
            business_slug: "store".to_string(),
        }
    }

    #[test]
    fn test_require_owner() {
        let session = MerchantSession::authenticated(merchant("m1"));

        assert!(require_owner(&session, "m1").is_ok());
        assert!(matches!(
            require_owner(&session, "m2"),
            Err(DbError::NotAuthenticated)
        ));
        assert!(matches!(
            require_owner(&MerchantSession::anonymous(), "m1"),
            Err(DbError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_prepare_size_entry_checks_category() {
        let entry = NewSizeEntry::Tops {
            size: "M".to_string(),
            chest: "38".to_string(),
            waist: String::new(),
        };

        let err = prepare_size_entry(&SizeChart::default(), SizeCategory::Bottoms, entry.clone())
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::CategoryMismatch { .. })
        ));

        let stored = prepare_size_entry(&SizeChart::default(), SizeCategory::Tops, entry).unwrap();
        assert_eq!(stored.category(), SizeCategory::Tops);
        assert!(!stored.id().is_empty());
    }

    #[test]
    fn test_fallback_is_default() {
        let resolved = ResolvedConfig::fallback("does-not-exist");

        assert!(resolved.is_fallback());
        assert_eq!(resolved.merchant_id, None);
        assert_eq!(resolved.config, BusinessConfig::default());
    }
}
