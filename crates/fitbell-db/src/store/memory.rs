//! In-memory implementation of the store traits.
//!
//! Everything lives in `HashMap`s behind `RwLock`s and is lost on drop.
//! Used by tests and by the kiosk when no database path is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{
    new_request, prepare_size_entry, require_owner, ConfigStore, EventSink, MerchantDirectory,
    PublicConfigResolver, ResolvedConfig,
};
use crate::error::{DbError, DbResult};
use fitbell_core::widget::WidgetEvent;
use fitbell_core::{
    BusinessConfig, Merchant, MerchantSession, NewSizeEntry, RecordedRequest, SizeCategory,
    SizeChart, SizeEntry,
};

/// In-memory store.
pub struct MemoryStore {
    /// Keyed by merchant uid.
    merchants: RwLock<HashMap<String, Merchant>>,
    /// Slug to merchant uid.
    slugs: RwLock<HashMap<String, String>>,
    configs: RwLock<HashMap<String, BusinessConfig>>,
    charts: RwLock<HashMap<String, SizeChart>>,
    requests: RwLock<Vec<RecordedRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            merchants: RwLock::new(HashMap::new()),
            slugs: RwLock::new(HashMap::new()),
            configs: RwLock::new(HashMap::new()),
            charts: RwLock::new(HashMap::new()),
            requests: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MerchantDirectory for MemoryStore {
    async fn create_merchant(&self, merchant: &Merchant) -> DbResult<()> {
        let mut merchants = self.merchants.write().await;
        if merchants
            .values()
            .any(|m| m.email.eq_ignore_ascii_case(&merchant.email))
        {
            return Err(DbError::duplicate("email", &merchant.email));
        }
        merchants.insert(merchant.uid.clone(), merchant.clone());
        Ok(())
    }

    async fn find_merchant_by_email(&self, email: &str) -> DbResult<Option<Merchant>> {
        let merchants = self.merchants.read().await;
        Ok(merchants
            .values()
            .find(|m| m.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn bind_slug(&self, slug: &str, merchant_id: &str) -> DbResult<()> {
        let mut slugs = self.slugs.write().await;
        if let Some(previous) = slugs.insert(slug.to_string(), merchant_id.to_string()) {
            if previous != merchant_id {
                warn!(
                    slug = %slug,
                    previous = %previous,
                    merchant_id = %merchant_id,
                    "Slug rebound to a different merchant"
                );
            }
        }
        debug!(slug = %slug, merchant_id = %merchant_id, "Slug bound");
        Ok(())
    }

    async fn delete_merchant(&self, merchant_id: &str) -> DbResult<bool> {
        let existed = self.merchants.write().await.remove(merchant_id).is_some();
        self.slugs.write().await.retain(|_, owner| *owner != merchant_id);
        self.configs.write().await.remove(merchant_id);
        self.charts.write().await.remove(merchant_id);
        self.requests
            .write()
            .await
            .retain(|request| request.merchant_id != merchant_id);

        debug!(merchant_id = %merchant_id, existed, "Merchant deleted");
        Ok(existed)
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn save(
        &self,
        session: &MerchantSession,
        merchant_id: &str,
        config: &BusinessConfig,
    ) -> DbResult<()> {
        require_owner(session, merchant_id)?;
        config.validate()?;

        let mut configs = self.configs.write().await;
        configs.insert(merchant_id.to_string(), config.clone());
        Ok(())
    }

    async fn load(&self, merchant_id: &str) -> DbResult<BusinessConfig> {
        let configs = self.configs.read().await;
        Ok(configs.get(merchant_id).cloned().unwrap_or_default())
    }

    async fn load_size_chart(&self, merchant_id: &str) -> DbResult<SizeChart> {
        let charts = self.charts.read().await;
        Ok(charts.get(merchant_id).cloned().unwrap_or_default())
    }

    async fn add_size_entry(
        &self,
        session: &MerchantSession,
        merchant_id: &str,
        category: SizeCategory,
        entry: NewSizeEntry,
    ) -> DbResult<SizeEntry> {
        require_owner(session, merchant_id)?;

        let mut charts = self.charts.write().await;
        let chart = charts.entry(merchant_id.to_string()).or_default();
        let stored = prepare_size_entry(chart, category, entry)?;
        chart.push(stored.clone());
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

        let mut charts = self.charts.write().await;
        if let Some(chart) = charts.get_mut(merchant_id) {
            chart.remove(category, id);
        }
        Ok(())
    }
}

#[async_trait]
impl PublicConfigResolver for MemoryStore {
    async fn resolve_by_slug(&self, slug: &str) -> ResolvedConfig {
        let merchant_id = self.slugs.read().await.get(slug).cloned();
        let Some(merchant_id) = merchant_id else {
            return ResolvedConfig::fallback(slug);
        };

        let config = self
            .configs
            .read()
            .await
            .get(&merchant_id)
            .cloned()
            .unwrap_or_default();
        ResolvedConfig::published(slug, merchant_id, config)
    }
}

#[async_trait]
impl EventSink for MemoryStore {
    async fn record(&self, merchant_id: &str, event: &WidgetEvent) -> DbResult<RecordedRequest> {
        let request = new_request(merchant_id, event);
        self.requests.write().await.push(request.clone());
        Ok(request)
    }

    async fn recorded_requests(&self, merchant_id: &str) -> DbResult<Vec<RecordedRequest>> {
        let requests = self.requests.read().await;
        Ok(requests
            .iter()
            .filter(|r| r.merchant_id == merchant_id)
            .cloned()
            .collect())
    }
}
