//! SQLite implementation of the store traits on [`Database`].

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{
    new_request, prepare_size_entry, require_owner, ConfigStore, EventSink, MerchantDirectory,
    PublicConfigResolver, ResolvedConfig,
};
use crate::error::DbResult;
use crate::pool::Database;
use fitbell_core::widget::WidgetEvent;
use fitbell_core::{
    BusinessConfig, Merchant, MerchantSession, NewSizeEntry, RecordedRequest, SizeCategory,
    SizeChart, SizeEntry,
};

#[async_trait]
impl MerchantDirectory for Database {
    async fn create_merchant(&self, merchant: &Merchant) -> DbResult<()> {
        self.merchants().insert(merchant).await
    }

    async fn find_merchant_by_email(&self, email: &str) -> DbResult<Option<Merchant>> {
        self.merchants().find_by_email(email).await
    }

    async fn bind_slug(&self, slug: &str, merchant_id: &str) -> DbResult<()> {
        self.merchants().bind_slug(slug, merchant_id).await
    }

    async fn delete_merchant(&self, merchant_id: &str) -> DbResult<bool> {
        self.merchants().delete(merchant_id).await
    }
}

#[async_trait]
impl ConfigStore for Database {
    async fn save(
        &self,
        session: &MerchantSession,
        merchant_id: &str,
        config: &BusinessConfig,
    ) -> DbResult<()> {
        require_owner(session, merchant_id)?;
        config.validate()?;

        self.configs().upsert(merchant_id, config).await?;
        info!(merchant_id = %merchant_id, "Business config saved");
        Ok(())
    }

    async fn load(&self, merchant_id: &str) -> DbResult<BusinessConfig> {
        let config = self.configs().get(merchant_id).await?;
        if config.is_none() {
            debug!(merchant_id = %merchant_id, "No stored config, using default");
        }
        Ok(config.unwrap_or_default())
    }

    async fn load_size_chart(&self, merchant_id: &str) -> DbResult<SizeChart> {
        self.sizes().chart(merchant_id).await
    }

    async fn add_size_entry(
        &self,
        session: &MerchantSession,
        merchant_id: &str,
        category: SizeCategory,
        entry: NewSizeEntry,
    ) -> DbResult<SizeEntry> {
        require_owner(session, merchant_id)?;

        let sizes = self.sizes();
        let chart = sizes.chart(merchant_id).await?;
        let stored = prepare_size_entry(&chart, category, entry)?;
        sizes.insert(merchant_id, &stored).await?;
        Ok(stored)
    }

    async fn remove_size_entry(
        &self,
        session: &MerchantSession,
        merchant_id: &str,
        category: SizeCategory,
        id: &str,
    ) -> DbResult<()> {
        require_owner(session, merchant_id)?;

        let removed = self.sizes().delete(merchant_id, category, id).await?;
        if !removed {
            debug!(merchant_id = %merchant_id, %category, id = %id, "No size entry to remove");
        }
        Ok(())
    }
}

#[async_trait]
impl PublicConfigResolver for Database {
    async fn resolve_by_slug(&self, slug: &str) -> ResolvedConfig {
        let merchant_id = match self.merchants().merchant_for_slug(slug).await {
            Ok(Some(id)) => id,
            Ok(None) => return ResolvedConfig::fallback(slug),
            Err(e) => {
                warn!(slug = %slug, error = %e, "Slug lookup failed");
                return ResolvedConfig::fallback(slug);
            }
        };

        match self.load(&merchant_id).await {
            Ok(config) => ResolvedConfig::published(slug, merchant_id, config),
            Err(e) => {
                warn!(slug = %slug, merchant_id = %merchant_id, error = %e, "Config load failed");
                ResolvedConfig::fallback(slug)
            }
        }
    }
}

#[async_trait]
impl EventSink for Database {
    async fn record(&self, merchant_id: &str, event: &WidgetEvent) -> DbResult<RecordedRequest> {
        let request = new_request(merchant_id, event);
        self.requests().insert(&request).await?;
        Ok(request)
    }

    async fn recorded_requests(&self, merchant_id: &str) -> DbResult<Vec<RecordedRequest>> {
        self.requests().list_for_merchant(merchant_id).await
    }
}
