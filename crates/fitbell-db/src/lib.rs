//! # fitbell-db: Stores and Services for fitbell
//!
//! Persistence behind the help-button widget, plus the two services that sit
//! on top of it: the merchant [`Dashboard`] and the shopper-facing
//! [`WidgetHost`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        fitbell Data Flow                                │
//! │                                                                         │
//! │  fitbell-kiosk (CLI)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   fitbell-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────────┐   ┌──────────────┐   ┌────────────────────┐  │   │
//! │  │   │  Dashboard  │   │  WidgetHost  │   │  store traits      │  │   │
//! │  │   │  (merchant) │   │  (shopper)   │──►│  ConfigStore       │  │   │
//! │  │   │             │──────────────────►│  PublicConfigResolver│  │   │
//! │  │   └─────────────┘   └──────────────┘   │  EventSink ...     │  │   │
//! │  │                                        └─────────┬──────────┘  │   │
//! │  │                         ┌────────────────────────┴──────┐      │   │
//! │  │                         ▼                               ▼      │   │
//! │  │                   MemoryStore                 Database (pool)  │   │
//! │  │                   RwLock<HashMap>             repositories     │   │
//! │  │                                               migrations       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (fitbell.db)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Store traits and the in-memory backend
//! - [`pool`] - Connection pool creation and configuration
//! - [`repository`] - SQL per table
//! - [`migrations`] - Embedded database migrations
//! - [`dashboard`] - Merchant-side service
//! - [`host`] - Public widget host
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fitbell_db::{Dashboard, Database, DbConfig, WidgetHost};
//!
//! let db = Arc::new(Database::new(DbConfig::new("fitbell.db")).await?);
//!
//! let mut dashboard = Dashboard::new(db.clone());
//! dashboard.register_merchant("owner@store.test", "My Awesome Store").await?;
//!
//! let host = WidgetHost::open(db, "my-awesome-store", Default::default()).await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod dashboard;
pub mod error;
pub mod host;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use dashboard::Dashboard;
pub use error::{DbError, DbResult};
pub use host::WidgetHost;
pub use pool::{Database, DbConfig};
pub use store::{
    ConfigStore, EventSink, MemoryStore, MerchantDirectory, PublicConfigResolver, ResolvedConfig,
    Resolution,
};

pub use repository::config::ConfigRepository;
pub use repository::merchant::MerchantRepository;
pub use repository::request::RequestRepository;
pub use repository::size::SizeRepository;
