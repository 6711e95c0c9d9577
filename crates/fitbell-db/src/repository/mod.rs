//! # Repository Module
//!
//! SQL for each table, one repository per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layer                                     │
//! │                                                                         │
//! │  Store traits (store::ConfigStore, store::PublicConfigResolver, ...)   │
//! │       │                                                                 │
//! │       │  db.configs().upsert(uid, &config)                             │
//! │       ▼                                                                 │
//! │  ┌──────────────────┐ ┌────────────────┐ ┌──────────────┐ ┌──────────┐ │
//! │  │MerchantRepository│ │ConfigRepository│ │SizeRepository│ │RequestRep│ │
//! │  │ merchants        │ │business_configs│ │ size_entries │ │widget_req│ │
//! │  │ slug_routes      │ │                │ │              │ │          │ │
//! │  └──────────────────┘ └────────────────┘ └──────────────┘ └──────────┘ │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories never check who is asking. Authorization happens one     │
//! │  layer up, in the store implementations.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod merchant;
pub mod request;
pub mod size;
