//! # Domain Types
//!
//! Configuration types shared by the dashboard, the stores and the widget.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                │
//! │  │   BusinessConfig    │ 1    n │     HelpOption      │                │
//! │  │  ─────────────────  │◄──────►│  ─────────────────  │                │
//! │  │  button_color       │        │  id (unique)        │                │
//! │  │  panel_color        │        │  kind ─────────────►│ HelpOptionType │
//! │  │  help_options (ord) │        │  label              │  Call          │
//! │  └─────────────────────┘        │  enabled            │  SizeExchange  │
//! │                                 └─────────────────────┘  ProductExch.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Replacement Semantics
//! A `BusinessConfig` is never edited cell by cell in storage. The editor
//! works on a draft copy and the store overwrites the whole value.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::{DEFAULT_BUTTON_COLOR, DEFAULT_PANEL_COLOR};

// =============================================================================
// Help Option Type
// =============================================================================

/// Which interaction flow an option opens.
///
/// Adding a variant forces every `match` in the widget transition table to
/// handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HelpOptionType {
    /// Ask staff to come to the fitting room.
    Call,
    /// Ask for the same garment in another size.
    SizeExchange,
    /// Ask for a different product.
    ProductExchange,
}

impl HelpOptionType {
    /// All option types in their default display order.
    pub const ALL: [HelpOptionType; 3] = [
        HelpOptionType::Call,
        HelpOptionType::SizeExchange,
        HelpOptionType::ProductExchange,
    ];

    /// Wire name, as stored in configuration blobs.
    pub fn as_str(&self) -> &'static str {
        match self {
            HelpOptionType::Call => "CALL",
            HelpOptionType::SizeExchange => "SIZE_EXCHANGE",
            HelpOptionType::ProductExchange => "PRODUCT_EXCHANGE",
        }
    }
}

impl std::fmt::Display for HelpOptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Help Option
// =============================================================================

/// One button on the widget's main menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HelpOption {
    /// Identity within the owning configuration.
    pub id: String,

    /// Flow opened by this option.
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub kind: HelpOptionType,

    /// Text shown on the button.
    pub label: String,

    /// Disabled options are hidden from shoppers.
    pub enabled: bool,
}

impl HelpOption {
    /// Creates an enabled option.
    pub fn new(id: impl Into<String>, kind: HelpOptionType, label: impl Into<String>) -> Self {
        HelpOption {
            id: id.into(),
            kind,
            label: label.into(),
            enabled: true,
        }
    }

    /// Builder-style toggle, handy for fixtures.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

// =============================================================================
// Business Config
// =============================================================================

/// A merchant's widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BusinessConfig {
    /// Color of primary buttons (any CSS color string).
    pub button_color: String,

    /// Background of the widget panel.
    pub panel_color: String,

    /// Options in display order.
    pub help_options: Vec<HelpOption>,
}

impl Default for BusinessConfig {
    /// The documented default: blue buttons, white panel, every option type
    /// present and enabled.
    fn default() -> Self {
        BusinessConfig {
            button_color: DEFAULT_BUTTON_COLOR.to_string(),
            panel_color: DEFAULT_PANEL_COLOR.to_string(),
            help_options: vec![
                HelpOption::new("1", HelpOptionType::Call, "Call for assistance"),
                HelpOption::new("2", HelpOptionType::SizeExchange, "Size exchange"),
                HelpOption::new("3", HelpOptionType::ProductExchange, "Product exchange"),
            ],
        }
    }
}

impl BusinessConfig {
    /// Looks up an option by id.
    pub fn option(&self, id: &str) -> Option<&HelpOption> {
        self.help_options.iter().find(|o| o.id == id)
    }

    /// Mutable lookup by id.
    pub fn option_mut(&mut self, id: &str) -> Option<&mut HelpOption> {
        self.help_options.iter_mut().find(|o| o.id == id)
    }

    /// Options a shopper may select, in display order.
    pub fn enabled_options(&self) -> impl Iterator<Item = &HelpOption> {
        self.help_options.iter().filter(|o| o.enabled)
    }

    /// Checks the structural invariants: ids present and unique, colors set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.button_color.trim().is_empty() {
            return Err(ValidationError::required("buttonColor"));
        }
        if self.panel_color.trim().is_empty() {
            return Err(ValidationError::required("panelColor"));
        }

        let mut seen = HashSet::new();
        for option in &self.help_options {
            if option.id.trim().is_empty() {
                return Err(ValidationError::required("helpOptions.id"));
            }
            if !seen.insert(option.id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "helpOptions.id".to_string(),
                    value: option.id.clone(),
                });
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_every_option_enabled() {
        let config = BusinessConfig::default();

        assert_eq!(config.button_color, "#3b82f6");
        assert_eq!(config.panel_color, "#ffffff");

        let kinds: Vec<_> = config.help_options.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, HelpOptionType::ALL.to_vec());
        assert!(config.help_options.iter().all(|o| o.enabled));
    }

    #[test]
    fn test_json_shape_matches_dashboard_payload() {
        let json = r##"{
            "buttonColor": "#3b82f6",
            "panelColor": "#ffffff",
            "helpOptions": [
                {"id": "1", "type": "CALL", "label": "Call", "enabled": true},
                {"id": "2", "type": "SIZE_EXCHANGE", "label": "Size", "enabled": false}
            ]
        }"##;

        let config: BusinessConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.help_options[1].kind, HelpOptionType::SizeExchange);
        assert!(!config.help_options[1].enabled);

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["helpOptions"][0]["type"], "CALL");
    }

    #[test]
    fn test_enabled_options_preserve_order() {
        let mut config = BusinessConfig::default();
        config.option_mut("2").unwrap().enabled = false;

        let ids: Vec<_> = config.enabled_options().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut config = BusinessConfig::default();
        config.help_options[2].id = "1".to_string();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::Duplicate { .. })
        ));
    }
}
