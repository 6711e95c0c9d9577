//! # Merchant Dashboard
//!
//! Merchant-side operations bundled with the caller's session.
//!
//! ## Editing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  dashboard.editor()  ──► ConfigEditor { committed, draft }             │
//! │                              │                                          │
//! │                              │ set_button_color / toggle_option ...     │
//! │                              │ (PreviewSession renders the draft)       │
//! │                              ▼                                          │
//! │  dashboard.commit(&mut editor)                                         │
//! │       │  prepare_commit()   validate the draft                         │
//! │       │  store.save(...)    total overwrite                            │
//! │       │  mark_committed()   draft becomes the new baseline             │
//! │       ▼                                                                 │
//! │  PublicConfigResolver sees the new config on its next read             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::store::{ConfigStore, EventSink, MerchantDirectory};
use fitbell_core::analytics::{self, AnalyticsData};
use fitbell_core::merchant::slugify;
use fitbell_core::validation::validate_onboarding;
use fitbell_core::{
    BusinessConfig, ConfigEditor, ConfigPatch, CoreError, Merchant, MerchantSession,
    NewSizeEntry, SizeCategory, SizeChart, SizeEntry,
};

/// A merchant's view of the stores.
///
/// Starts anonymous; `register_merchant` or `sign_in` binds the session.
/// Every mutation is checked against that session by the store.
pub struct Dashboard<S: ?Sized> {
    store: Arc<S>,
    session: MerchantSession,
}

impl<S> Dashboard<S>
where
    S: MerchantDirectory + ConfigStore + EventSink + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Dashboard {
            store,
            session: MerchantSession::anonymous(),
        }
    }

    pub fn with_session(store: Arc<S>, session: MerchantSession) -> Self {
        Dashboard { store, session }
    }

    pub fn session(&self) -> &MerchantSession {
        &self.session
    }

    /// The signed-in merchant, or `NotAuthenticated`.
    pub fn merchant(&self) -> DbResult<&Merchant> {
        Ok(self.session.require_merchant()?)
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Creates an account, saves the default configuration and binds the
    /// business slug. The dashboard is signed in as the new merchant
    /// afterwards.
    ///
    /// ## Errors
    /// * `Validation` - blank email or name, or a name with no slug
    /// * `UniqueViolation` - email already registered
    ///
    /// When a step after account creation fails, the account is deleted
    /// again so the same email can retry.
    pub async fn register_merchant(
        &mut self,
        email: &str,
        business_name: &str,
    ) -> DbResult<Merchant> {
        validate_onboarding(email, business_name)?;

        let merchant = Merchant {
            uid: Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            business_name: business_name.trim().to_string(),
            business_slug: slugify(business_name),
        };

        self.store.create_merchant(&merchant).await?;

        let session = MerchantSession::authenticated(merchant.clone());
        if let Err(err) = self.publish_defaults(&session, &merchant).await {
            warn!(uid = %merchant.uid, error = %err, "Registration incomplete, rolling back");
            if let Err(cleanup) = self.store.delete_merchant(&merchant.uid).await {
                warn!(uid = %merchant.uid, error = %cleanup, "Rollback failed");
            }
            return Err(err);
        }
        self.session = session;

        info!(
            uid = %merchant.uid,
            slug = %merchant.business_slug,
            "Merchant registered"
        );
        Ok(merchant)
    }

    /// Default config plus slug route for a freshly created account.
    async fn publish_defaults(&self, session: &MerchantSession, merchant: &Merchant) -> DbResult<()> {
        self.store
            .save(session, &merchant.uid, &BusinessConfig::default())
            .await?;
        self.store
            .bind_slug(&merchant.business_slug, &merchant.uid)
            .await
    }

    /// Binds the session to the merchant registered under `email`.
    pub async fn sign_in(&mut self, email: &str) -> DbResult<&Merchant> {
        let merchant = self
            .store
            .find_merchant_by_email(email)
            .await?
            .ok_or_else(|| DbError::not_found("Merchant", email.trim()))?;

        debug!(uid = %merchant.uid, "Merchant signed in");
        self.session = MerchantSession::authenticated(merchant);
        self.merchant()
    }

    pub fn sign_out(&mut self) {
        self.session.sign_out();
    }

    /// Shareable link to the public widget.
    pub fn widget_url(&self, base_url: &str) -> DbResult<String> {
        Ok(self.merchant()?.widget_url(base_url))
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub async fn load_config(&self) -> DbResult<BusinessConfig> {
        let uid = &self.merchant()?.uid;
        self.store.load(uid).await
    }

    /// An editor whose draft starts from the committed configuration.
    pub async fn editor(&self) -> DbResult<ConfigEditor> {
        Ok(ConfigEditor::new(self.load_config().await?))
    }

    /// Persists the whole draft and makes it the editor's new baseline.
    ///
    /// On failure the editor is left untouched so the merchant can retry.
    pub async fn commit(&self, editor: &mut ConfigEditor) -> DbResult<BusinessConfig> {
        let uid = &self.merchant()?.uid;
        let draft = editor.prepare_commit()?;

        self.store.save(&self.session, uid, &draft).await?;
        editor.mark_committed(draft.clone());

        debug!(uid = %uid, "Draft committed");
        Ok(draft)
    }

    /// Flips one help option and saves the result.
    ///
    /// ## Errors
    /// * `NotFound` - no option with `option_id`; nothing is written
    pub async fn toggle_option(&self, option_id: &str) -> DbResult<BusinessConfig> {
        let mut editor = self.editor().await?;
        if !editor.toggle_option(option_id) {
            return Err(CoreError::OptionNotFound(option_id.to_string()).into());
        }
        self.commit(&mut editor).await
    }

    /// Merges `patch` over the stored configuration and saves the result.
    pub async fn update_config(&self, patch: &ConfigPatch) -> DbResult<BusinessConfig> {
        let uid = &self.merchant()?.uid;
        let current = self.store.load(uid).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let merged = patch.apply(&current);
        self.store.save(&self.session, uid, &merged).await?;
        Ok(merged)
    }

    // =========================================================================
    // Size Chart
    // =========================================================================

    pub async fn size_chart(&self) -> DbResult<SizeChart> {
        let uid = &self.merchant()?.uid;
        self.store.load_size_chart(uid).await
    }

    pub async fn add_size_entry(
        &self,
        category: SizeCategory,
        entry: NewSizeEntry,
    ) -> DbResult<SizeEntry> {
        let uid = &self.merchant()?.uid;
        self.store
            .add_size_entry(&self.session, uid, category, entry)
            .await
    }

    pub async fn remove_size_entry(&self, category: SizeCategory, id: &str) -> DbResult<()> {
        let uid = &self.merchant()?.uid;
        self.store
            .remove_size_entry(&self.session, uid, category, id)
            .await
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    pub async fn analytics(&self) -> DbResult<AnalyticsData> {
        let uid = &self.merchant()?.uid;
        let requests = self.store.recorded_requests(uid).await?;
        Ok(analytics::summarize(requests.iter().map(|r| &r.event)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, PublicConfigResolver};
    use crate::Database;
    use async_trait::async_trait;
    use fitbell_core::widget::WidgetEvent;
    use fitbell_core::{RecordedRequest, ValidationError};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn memory() -> Dashboard<MemoryStore> {
        Dashboard::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_register_saves_default_and_binds_slug() {
        let store = Arc::new(MemoryStore::new());
        let mut dashboard = Dashboard::new(store.clone());

        let merchant = dashboard
            .register_merchant("owner@store.test", "My Awesome Store")
            .await
            .unwrap();

        assert_eq!(merchant.business_slug, "my-awesome-store");
        assert!(dashboard.session().is_authenticated());
        assert_eq!(dashboard.load_config().await.unwrap(), BusinessConfig::default());

        let resolved = store.resolve_by_slug("my-awesome-store").await;
        assert_eq!(resolved.merchant_id.as_deref(), Some(merchant.uid.as_str()));
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields() {
        let mut dashboard = memory();

        let err = dashboard.register_merchant("", "Shop").await.unwrap_err();

        assert!(matches!(err, DbError::Validation(ValidationError::Required { .. })));
        assert!(!dashboard.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email() {
        let mut dashboard = memory();

        let err = dashboard.sign_in("ghost@store.test").await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_anonymous_dashboard_cannot_edit() {
        let dashboard = memory();

        assert!(matches!(
            dashboard.editor().await,
            Err(DbError::NotAuthenticated)
        ));
        assert!(matches!(
            dashboard.update_config(&ConfigPatch::default()).await,
            Err(DbError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_commit_persists_draft() {
        let mut dashboard = memory();
        dashboard
            .register_merchant("owner@store.test", "Shop")
            .await
            .unwrap();

        let mut editor = dashboard.editor().await.unwrap();
        editor.set_button_color("#16a34a");
        editor.toggle_option("3");
        assert!(editor.is_dirty());

        let saved = dashboard.commit(&mut editor).await.unwrap();

        assert!(!editor.is_dirty());
        assert_eq!(dashboard.load_config().await.unwrap(), saved);
        assert!(!saved.option("3").unwrap().enabled);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_draft() {
        let mut dashboard = memory();
        dashboard
            .register_merchant("owner@store.test", "Shop")
            .await
            .unwrap();

        let mut editor = dashboard.editor().await.unwrap();
        editor.set_panel_color("");

        assert!(dashboard.commit(&mut editor).await.is_err());
        assert!(editor.is_dirty());
        assert_eq!(dashboard.load_config().await.unwrap(), BusinessConfig::default());
    }

    #[tokio::test]
    async fn test_update_config_merges_top_level_fields() {
        let mut dashboard = memory();
        dashboard
            .register_merchant("owner@store.test", "Shop")
            .await
            .unwrap();

        let patch = ConfigPatch {
            panel_color: Some("#fef3c7".to_string()),
            ..ConfigPatch::default()
        };
        let merged = dashboard.update_config(&patch).await.unwrap();

        assert_eq!(merged.panel_color, "#fef3c7");
        assert_eq!(merged.button_color, BusinessConfig::default().button_color);
        assert_eq!(dashboard.load_config().await.unwrap(), merged);
    }

    #[tokio::test]
    async fn test_size_chart_and_analytics_on_sqlite() {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let mut dashboard = Dashboard::new(db.clone());
        let merchant = dashboard
            .register_merchant("owner@store.test", "Shop")
            .await
            .unwrap();

        let entry = dashboard
            .add_size_entry(
                SizeCategory::Bottoms,
                NewSizeEntry::Bottoms {
                    size: "32".to_string(),
                    waist: "32".to_string(),
                    inseam: "30".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(dashboard.size_chart().await.unwrap().bottoms.len(), 1);
        dashboard
            .remove_size_entry(SizeCategory::Bottoms, entry.id())
            .await
            .unwrap();
        assert!(dashboard.size_chart().await.unwrap().is_empty());

        let event = WidgetEvent::SizeExchangeRequested {
            option_id: "2".to_string(),
            current_size: "M".to_string(),
            needed_size: "L".to_string(),
        };
        db.record(&merchant.uid, &event).await.unwrap();

        let data = dashboard.analytics().await.unwrap();
        assert_eq!(data.size_changes[0].name, "M -> L");
        assert_eq!(data.most_searched_sizes[0].name, "L");
    }

    #[tokio::test]
    async fn test_widget_url_uses_slug() {
        let mut dashboard = memory();
        dashboard
            .register_merchant("owner@store.test", "My Awesome Store")
            .await
            .unwrap();

        assert_eq!(
            dashboard.widget_url("https://fitbell.app/").unwrap(),
            "https://fitbell.app/#/help-button/my-awesome-store"
        );
    }

    #[tokio::test]
    async fn test_toggle_option_saves_or_reports_unknown_id() {
        let mut dashboard = memory();
        dashboard
            .register_merchant("owner@store.test", "Shop")
            .await
            .unwrap();

        let saved = dashboard.toggle_option("2").await.unwrap();
        assert!(!saved.option("2").unwrap().enabled);
        assert_eq!(dashboard.load_config().await.unwrap(), saved);

        let err = dashboard.toggle_option("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref id, .. } if id == "missing"));
        assert_eq!(dashboard.load_config().await.unwrap(), saved);
    }

    /// Memory store whose slug routing fails until `slugs_up` is set.
    struct FlakySlugs {
        inner: MemoryStore,
        slugs_up: AtomicBool,
    }

    #[async_trait]
    impl MerchantDirectory for FlakySlugs {
        async fn create_merchant(&self, merchant: &Merchant) -> DbResult<()> {
            self.inner.create_merchant(merchant).await
        }

        async fn find_merchant_by_email(&self, email: &str) -> DbResult<Option<Merchant>> {
            self.inner.find_merchant_by_email(email).await
        }

        async fn bind_slug(&self, slug: &str, merchant_id: &str) -> DbResult<()> {
            if !self.slugs_up.load(Ordering::SeqCst) {
                return Err(DbError::ConnectionFailed("slug routes offline".to_string()));
            }
            self.inner.bind_slug(slug, merchant_id).await
        }

        async fn delete_merchant(&self, merchant_id: &str) -> DbResult<bool> {
            self.inner.delete_merchant(merchant_id).await
        }
    }

    #[async_trait]
    impl ConfigStore for FlakySlugs {
        async fn save(
            &self,
            session: &MerchantSession,
            merchant_id: &str,
            config: &BusinessConfig,
        ) -> DbResult<()> {
            self.inner.save(session, merchant_id, config).await
        }

        async fn load(&self, merchant_id: &str) -> DbResult<BusinessConfig> {
            self.inner.load(merchant_id).await
        }

        async fn load_size_chart(&self, merchant_id: &str) -> DbResult<SizeChart> {
            self.inner.load_size_chart(merchant_id).await
        }

        async fn add_size_entry(
            &self,
            session: &MerchantSession,
            merchant_id: &str,
            category: SizeCategory,
            entry: NewSizeEntry,
        ) -> DbResult<SizeEntry> {
            self.inner
                .add_size_entry(session, merchant_id, category, entry)
                .await
        }

        async fn remove_size_entry(
            &self,
            session: &MerchantSession,
            merchant_id: &str,
            category: SizeCategory,
            id: &str,
        ) -> DbResult<()> {
            self.inner
                .remove_size_entry(session, merchant_id, category, id)
                .await
        }
    }

    #[async_trait]
    impl EventSink for FlakySlugs {
        async fn record(&self, merchant_id: &str, event: &WidgetEvent) -> DbResult<RecordedRequest> {
            self.inner.record(merchant_id, event).await
        }

        async fn recorded_requests(&self, merchant_id: &str) -> DbResult<Vec<RecordedRequest>> {
            self.inner.recorded_requests(merchant_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_registration_rolls_back() {
        let store = Arc::new(FlakySlugs {
            inner: MemoryStore::new(),
            slugs_up: AtomicBool::new(false),
        });
        let mut dashboard = Dashboard::new(store.clone());

        let err = dashboard
            .register_merchant("owner@store.test", "Shop")
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert!(!dashboard.session().is_authenticated());
        assert!(store
            .find_merchant_by_email("owner@store.test")
            .await
            .unwrap()
            .is_none());

        store.slugs_up.store(true, Ordering::SeqCst);
        let merchant = dashboard
            .register_merchant("owner@store.test", "Shop")
            .await
            .unwrap();

        let resolved = store.inner.resolve_by_slug("shop").await;
        assert_eq!(resolved.merchant_id.as_deref(), Some(merchant.uid.as_str()));
    }
}
