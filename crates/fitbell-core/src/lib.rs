//! # fitbell-core: Pure Logic for the Fitting-Room Help Button
//!
//! This crate holds everything about the help button that can be decided
//! without I/O: the configuration model, the shopper-facing state machine,
//! the merchant's draft editor and the rendered view.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        fitbell Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────┐   ┌─────────────────────────────────┐ │
//! │  │   Merchant dashboard        │   │   Public widget (by slug)       │ │
//! │  │   edit colors / options     │   │   shopper presses buttons       │ │
//! │  └──────────────┬──────────────┘   └────────────────┬────────────────┘ │
//! │                 │                                   │                  │
//! │  ┌──────────────▼───────────────────────────────────▼────────────────┐ │
//! │  │               ★ fitbell-core (THIS CRATE) ★                        │ │
//! │  │                                                                    │ │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────────┐  │ │
//! │  │   │  types   │  │  editor  │  │ preview  │  │ widget::machine  │  │ │
//! │  │   │  config  │  │  draft   │  │ view tree│  │ MAIN→FORM→SUCCESS│  │ │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────────┘  │ │
//! │  │                                                                    │ │
//! │  │   NO I/O • NO DATABASE • NO TIMERS • TIME IS AN ARGUMENT           │ │
//! │  └────────────────────────────────────────────────────────────────────┘ │
//! │                                 │                                       │
//! │  ┌──────────────────────────────▼─────────────────────────────────────┐ │
//! │  │            fitbell-db (stores, dashboard, widget host)             │ │
//! │  └────────────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - `BusinessConfig`, `HelpOption`, `HelpOptionType`
//! - [`widget`] - Widget session and its transition table
//! - [`editor`] - Draft editing and partial patches
//! - [`preview`] - View tree shared by live widget and preview
//! - [`size_chart`] - Append-only size tables
//! - [`merchant`] - Merchant identity and explicit session context
//! - [`analytics`] - Request log aggregation
//! - [`validation`] - Presence checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use fitbell_core::widget::{WidgetAction, WidgetMachine, WidgetSession, WidgetSettings, WidgetStep};
//! use fitbell_core::BusinessConfig;
//!
//! let config = BusinessConfig::default();
//! let machine = WidgetMachine::new(&config, WidgetSettings::default());
//! let mut session = WidgetSession::new();
//!
//! // Option "1" is the call-staff button in the default configuration.
//! let event = machine.apply(&mut session, WidgetAction::select("1"), Utc::now()).unwrap();
//!
//! assert_eq!(session.step(), WidgetStep::Success);
//! assert!(event.is_some());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod editor;
pub mod error;
pub mod merchant;
pub mod preview;
pub mod size_chart;
pub mod types;
pub mod validation;
pub mod widget;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::{AnalyticsData, ChartPoint, RecordedRequest};
pub use editor::{ConfigEditor, ConfigPatch};
pub use error::{CoreError, CoreResult, ValidationError, WidgetError};
pub use merchant::{Merchant, MerchantSession};
pub use size_chart::{NewSizeEntry, SizeCategory, SizeChart, SizeEntry};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default button color (blue).
pub const DEFAULT_BUTTON_COLOR: &str = "#3b82f6";

/// Default panel background (white).
pub const DEFAULT_PANEL_COLOR: &str = "#ffffff";

/// How long the success screen stays up before the widget resets.
pub const DEFAULT_SUCCESS_DISPLAY_MS: u64 = 4000;

/// Longest accepted success-screen duration (one hour).
pub const MAX_SUCCESS_DISPLAY_MS: u64 = 60 * 60 * 1000;
