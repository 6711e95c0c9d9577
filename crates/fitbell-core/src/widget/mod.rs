//! # Widget
//!
//! The shopper-facing help-button flow.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │                    select CALL (event)                                 │
//! │          ┌─────────────────────────────────────────┐                   │
//! │          │                                         ▼                   │
//! │      ┌───┴──┐  select SIZE_EXCHANGE  ┌──────────────────┐  submit  ┌─────────┐
//! │      │ MAIN │───────────────────────►│SIZE_EXCHANGE_FORM│─────────►│ SUCCESS │
//! │      │      │◄───────── back ────────┤                  │  (event) │         │
//! │      │      │                        └──────────────────┘          │         │
//! │      │      │  select PRODUCT_EXCH.  ┌──────────────────┐  submit  │         │
//! │      │      │───────────────────────►│PRODUCT_EXCH._FORM│─────────►│         │
//! │      │      │◄───────── back ────────┤                  │  (event) │         │
//! │      └───▲──┘                        └──────────────────┘          └────┬────┘
//! │          │                timeout elapsed or close                      │
//! │          └──────────────────────────────────────────────────────────────┘
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine is pure: `(config, session, action, now) -> (session, event)`.
//! Emitting the event and sleeping until the success deadline are the host's
//! job.

pub mod machine;

pub use machine::{Transition, WidgetMachine};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::{DEFAULT_SUCCESS_DISPLAY_MS, MAX_SUCCESS_DISPLAY_MS};

// =============================================================================
// Step
// =============================================================================

/// Which panel the widget currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WidgetStep {
    #[default]
    Main,
    SizeExchangeForm,
    ProductExchangeForm,
    Success,
}

impl WidgetStep {
    /// The form shown at this step, if any.
    pub fn form(&self) -> Option<FormKind> {
        match self {
            WidgetStep::SizeExchangeForm => Some(FormKind::SizeExchange),
            WidgetStep::ProductExchangeForm => Some(FormKind::ProductExchange),
            WidgetStep::Main | WidgetStep::Success => None,
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// The two request forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormKind {
    SizeExchange,
    ProductExchange,
}

impl FormKind {
    pub fn step(&self) -> WidgetStep {
        match self {
            FormKind::SizeExchange => WidgetStep::SizeExchangeForm,
            FormKind::ProductExchange => WidgetStep::ProductExchangeForm,
        }
    }

    /// Every input the form shows, in display order.
    pub fn fields(&self) -> &'static [FormField] {
        match self {
            FormKind::SizeExchange => &[FormField::CurrentSize, FormField::NeededSize],
            FormKind::ProductExchange => &[FormField::CurrentProduct, FormField::NeededProduct],
        }
    }

    /// Inputs that must be non-blank before submit.
    pub fn required_fields(&self) -> &'static [FormField] {
        match self {
            FormKind::SizeExchange => &[FormField::CurrentSize, FormField::NeededSize],
            FormKind::ProductExchange => &[FormField::NeededProduct],
        }
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.fields().contains(&field)
    }
}

/// Named form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    CurrentSize,
    NeededSize,
    CurrentProduct,
    NeededProduct,
}

impl FormField {
    pub fn name(&self) -> &'static str {
        match self {
            FormField::CurrentSize => "currentSize",
            FormField::NeededSize => "neededSize",
            FormField::CurrentProduct => "currentProduct",
            FormField::NeededProduct => "neededProduct",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::CurrentSize => "Size you have",
            FormField::NeededSize => "New size",
            FormField::CurrentProduct => "Product you have",
            FormField::NeededProduct => "Which product do you want to try?",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FormField::CurrentSize => "e.g. M or 42",
            FormField::NeededSize => "e.g. L or 43",
            FormField::CurrentProduct => "e.g. Blue shirt",
            FormField::NeededProduct => "e.g. White linen shirt",
        }
    }
}

impl std::str::FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "currentSize" | "current_size" => Ok(FormField::CurrentSize),
            "neededSize" | "needed_size" => Ok(FormField::NeededSize),
            "currentProduct" | "current_product" => Ok(FormField::CurrentProduct),
            "neededProduct" | "needed_product" => Ok(FormField::NeededProduct),
            other => Err(format!("unknown form field: {other}")),
        }
    }
}

// =============================================================================
// Actions & Events
// =============================================================================

/// Everything a shopper (or the clock) can do to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WidgetAction {
    /// Press an option button on the main menu.
    Select { option_id: String },
    /// Type into a form field.
    Input { field: FormField, value: String },
    /// Leave a form without submitting.
    Back,
    /// Submit the current form.
    Submit,
    /// Dismiss the widget from any step.
    Close,
    /// Clock tick; dismisses the success screen once its time is up.
    Tick,
}

impl WidgetAction {
    pub fn select(option_id: impl Into<String>) -> Self {
        WidgetAction::Select {
            option_id: option_id.into(),
        }
    }

    pub fn input(field: FormField, value: impl Into<String>) -> Self {
        WidgetAction::Input {
            field,
            value: value.into(),
        }
    }

    /// Short name used in error messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            WidgetAction::Select { .. } => "select",
            WidgetAction::Input { .. } => "input",
            WidgetAction::Back => "back",
            WidgetAction::Submit => "submit",
            WidgetAction::Close => "close",
            WidgetAction::Tick => "tick",
        }
    }
}

/// Requests emitted when the widget reaches SUCCESS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WidgetEvent {
    /// Staff asked to come to the fitting room.
    AssistanceRequested { option_id: String, label: String },
    SizeExchangeRequested {
        option_id: String,
        current_size: String,
        needed_size: String,
    },
    ProductExchangeRequested {
        option_id: String,
        current_product: String,
        needed_product: String,
    },
}

impl WidgetEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            WidgetEvent::AssistanceRequested { .. } => "assistance_requested",
            WidgetEvent::SizeExchangeRequested { .. } => "size_exchange_requested",
            WidgetEvent::ProductExchangeRequested { .. } => "product_exchange_requested",
        }
    }

    pub fn option_id(&self) -> &str {
        match self {
            WidgetEvent::AssistanceRequested { option_id, .. }
            | WidgetEvent::SizeExchangeRequested { option_id, .. }
            | WidgetEvent::ProductExchangeRequested { option_id, .. } => option_id,
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Tunables for the widget flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    /// How long the success screen stays up before returning to MAIN.
    pub success_display_ms: u64,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        WidgetSettings {
            success_display_ms: DEFAULT_SUCCESS_DISPLAY_MS,
        }
    }
}

impl WidgetSettings {
    /// Success-screen duration, capped at [`MAX_SUCCESS_DISPLAY_MS`].
    pub fn success_display(&self) -> Duration {
        let ms = i64::try_from(self.success_display_ms.min(MAX_SUCCESS_DISPLAY_MS))
            .unwrap_or(i64::MAX);
        Duration::try_milliseconds(ms).unwrap_or(Duration::MAX)
    }

    /// Rejects a zero duration or one above [`MAX_SUCCESS_DISPLAY_MS`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.success_display_ms == 0 || self.success_display_ms > MAX_SUCCESS_DISPLAY_MS {
            return Err(ValidationError::OutOfRange {
                field: "successDisplayMs".to_string(),
                min: 1,
                max: MAX_SUCCESS_DISPLAY_MS,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Session
// =============================================================================

/// One shopper's interaction, from widget open to close.
///
/// Never persisted. Exactly one step is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetSession {
    step: WidgetStep,
    form_fields: BTreeMap<FormField, String>,
    /// Option that opened the current form or success screen.
    active_option: Option<String>,
    /// When the success screen auto-dismisses.
    success_until: Option<DateTime<Utc>>,
}

impl WidgetSession {
    /// A fresh session at MAIN.
    pub fn new() -> Self {
        WidgetSession::default()
    }

    pub fn step(&self) -> WidgetStep {
        self.step
    }

    /// Value typed into `field`, empty when untouched.
    pub fn field(&self, field: FormField) -> &str {
        self.form_fields.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn form_fields(&self) -> &BTreeMap<FormField, String> {
        &self.form_fields
    }

    pub fn active_option(&self) -> Option<&str> {
        self.active_option.as_deref()
    }

    pub fn success_until(&self) -> Option<DateTime<Utc>> {
        self.success_until
    }

    /// Time left on the success screen, `None` outside SUCCESS.
    pub fn success_remaining(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        self.success_until
            .map(|until| (until - now).to_std().unwrap_or(std::time::Duration::ZERO))
    }
}
