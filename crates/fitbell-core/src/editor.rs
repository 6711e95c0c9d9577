//! # Config Editor
//!
//! Draft state for the merchant dashboard.
//!
//! ## Draft Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  committed config ──clone──► draft                                      │
//! │                               │                                         │
//! │          set_button_color / set_panel_color / toggle_option            │
//! │                               │                                         │
//! │                               ▼                                         │
//! │                  preview renders the draft (no store access)            │
//! │                               │                                         │
//! │              prepare_commit() ──► store.save(full draft)                │
//! │                               │                                         │
//! │              mark_committed() ──► draft becomes the new baseline        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{BusinessConfig, HelpOption};

// =============================================================================
// Config Patch
// =============================================================================

/// Top-level fields to replace in a configuration. `None` keeps the current
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_options: Option<Vec<HelpOption>>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.button_color.is_none() && self.panel_color.is_none() && self.help_options.is_none()
    }

    /// Returns `base` with the patched fields replaced.
    pub fn apply(&self, base: &BusinessConfig) -> BusinessConfig {
        BusinessConfig {
            button_color: self
                .button_color
                .clone()
                .unwrap_or_else(|| base.button_color.clone()),
            panel_color: self
                .panel_color
                .clone()
                .unwrap_or_else(|| base.panel_color.clone()),
            help_options: self
                .help_options
                .clone()
                .unwrap_or_else(|| base.help_options.clone()),
        }
    }
}

// =============================================================================
// Config Editor
// =============================================================================

/// Holds the committed configuration and a mutable draft of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEditor {
    committed: BusinessConfig,
    draft: BusinessConfig,
}

impl ConfigEditor {
    /// Starts editing from the committed configuration.
    pub fn new(committed: BusinessConfig) -> Self {
        ConfigEditor {
            draft: committed.clone(),
            committed,
        }
    }

    pub fn draft(&self) -> &BusinessConfig {
        &self.draft
    }

    pub fn committed(&self) -> &BusinessConfig {
        &self.committed
    }

    pub fn set_button_color(&mut self, color: impl Into<String>) {
        self.draft.button_color = color.into();
    }

    pub fn set_panel_color(&mut self, color: impl Into<String>) {
        self.draft.panel_color = color.into();
    }

    /// Flips `enabled` on the option with `id`.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown.
    pub fn toggle_option(&mut self, id: &str) -> bool {
        match self.draft.option_mut(id) {
            Some(option) => {
                option.enabled = !option.enabled;
                true
            }
            None => false,
        }
    }

    /// Whether the draft differs from the committed configuration.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.committed
    }

    /// Top-level fields that differ from the committed copy.
    pub fn changes(&self) -> ConfigPatch {
        let changed = |a: &String, b: &String| (a != b).then(|| a.clone());
        ConfigPatch {
            button_color: changed(&self.draft.button_color, &self.committed.button_color),
            panel_color: changed(&self.draft.panel_color, &self.committed.panel_color),
            help_options: (self.draft.help_options != self.committed.help_options)
                .then(|| self.draft.help_options.clone()),
        }
    }

    /// The full draft, validated, ready to be written by a store.
    pub fn prepare_commit(&self) -> Result<BusinessConfig, ValidationError> {
        self.draft.validate()?;
        Ok(self.draft.clone())
    }

    /// Records that `saved` is now the committed configuration.
    pub fn mark_committed(&mut self, saved: BusinessConfig) {
        self.draft = saved.clone();
        self.committed = saved;
    }

    /// Throws away unsaved edits.
    pub fn discard(&mut self) {
        self.draft = self.committed.clone();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
