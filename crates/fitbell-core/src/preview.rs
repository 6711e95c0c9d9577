//! # Widget Rendering
//!
//! Turns `(config, session)` into a view tree the frontend can draw.
//!
//! The same [`render`] function backs the public widget and the dashboard
//! preview, and [`PreviewSession`] drives the preview through the same
//! [`WidgetMachine`] as the live widget. Previews never touch a store and
//! drop the events they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::WidgetError;
use crate::types::{BusinessConfig, HelpOptionType};
use crate::widget::{
    FormField, FormKind, WidgetAction, WidgetMachine, WidgetSession, WidgetSettings, WidgetStep,
};

pub const MENU_TITLE: &str = "Fitting Room Assistant";
pub const SUCCESS_TITLE: &str = "On the way!";
pub const SUCCESS_MESSAGE: &str = "A store associate will come to your fitting room in a moment.";

// =============================================================================
// View Tree
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WidgetView {
    pub panel_color: String,
    pub button_color: String,
    pub step: WidgetStep,
    pub content: ViewContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewContent {
    Menu {
        title: String,
        options: Vec<OptionButton>,
    },
    Form {
        kind: FormKind,
        title: String,
        fields: Vec<FieldView>,
        #[serde(rename = "submitLabel")]
        submit_label: String,
    },
    Success {
        title: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OptionButton {
    pub option_id: String,
    pub kind: HelpOptionType,
    pub label: String,
    /// Call-staff is drawn as the large primary button.
    pub primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub field: FormField,
    pub label: String,
    pub placeholder: String,
    pub value: String,
    pub required: bool,
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders `session` with the colors and options of `config`.
pub fn render(config: &BusinessConfig, session: &WidgetSession) -> WidgetView {
    let content = match session.step() {
        WidgetStep::Main => ViewContent::Menu {
            title: MENU_TITLE.to_string(),
            options: config
                .enabled_options()
                .map(|o| OptionButton {
                    option_id: o.id.clone(),
                    kind: o.kind,
                    label: o.label.clone(),
                    primary: o.kind == HelpOptionType::Call,
                })
                .collect(),
        },
        WidgetStep::SizeExchangeForm => render_form(FormKind::SizeExchange, session),
        WidgetStep::ProductExchangeForm => render_form(FormKind::ProductExchange, session),
        WidgetStep::Success => ViewContent::Success {
            title: SUCCESS_TITLE.to_string(),
            message: SUCCESS_MESSAGE.to_string(),
        },
    };

    WidgetView {
        panel_color: config.panel_color.clone(),
        button_color: config.button_color.clone(),
        step: session.step(),
        content,
    }
}

fn render_form(kind: FormKind, session: &WidgetSession) -> ViewContent {
    let (title, submit_label) = match kind {
        FormKind::SizeExchange => ("Size Exchange", "Request New Size"),
        FormKind::ProductExchange => ("Product Exchange", "Request Product"),
    };

    ViewContent::Form {
        kind,
        title: title.to_string(),
        fields: kind
            .fields()
            .iter()
            .map(|field| FieldView {
                field: *field,
                label: field.label().to_string(),
                placeholder: field.placeholder().to_string(),
                value: session.field(*field).to_string(),
                required: kind.required_fields().contains(field),
            })
            .collect(),
        submit_label: submit_label.to_string(),
    }
}

// =============================================================================
// Preview Session
// =============================================================================

/// A widget session run against an unsaved draft.
#[derive(Debug, Clone, Default)]
pub struct PreviewSession {
    session: WidgetSession,
    settings: WidgetSettings,
}

impl PreviewSession {
    pub fn new(settings: WidgetSettings) -> Self {
        PreviewSession {
            session: WidgetSession::new(),
            settings,
        }
    }

    pub fn session(&self) -> &WidgetSession {
        &self.session
    }

    /// Applies `action` against `draft`. Any emitted request is discarded.
    pub fn dispatch(
        &mut self,
        draft: &BusinessConfig,
        action: WidgetAction,
        now: DateTime<Utc>,
    ) -> Result<WidgetStep, WidgetError> {
        WidgetMachine::new(draft, self.settings).apply(&mut self.session, action, now)?;
        Ok(self.session.step())
    }

    /// Renders the current step with `draft`'s styling.
    pub fn view(&self, draft: &BusinessConfig) -> WidgetView {
        render(draft, &self.session)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ConfigEditor;

    #[test]
    fn test_menu_lists_enabled_options_with_call_primary() {
        let mut config = BusinessConfig::default();
        config.option_mut("3").unwrap().enabled = false;

        let view = render(&config, &WidgetSession::new());

        let ViewContent::Menu { options, .. } = view.content else {
            panic!("expected menu");
        };
        assert_eq!(options.len(), 2);
        assert!(options[0].primary);
        assert!(!options[1].primary);
    }

    #[test]
    fn test_preview_tracks_unsaved_draft_colors() {
        let mut editor = ConfigEditor::new(BusinessConfig::default());
        let preview = PreviewSession::default();

        editor.set_panel_color("#0f172a");
        let view = preview.view(editor.draft());

        assert_eq!(view.panel_color, "#0f172a");
        assert_eq!(editor.committed().panel_color, "#ffffff");
    }

    #[test]
    fn test_preview_uses_live_transition_table() {
        let mut editor = ConfigEditor::new(BusinessConfig::default());
        editor.toggle_option("2");
        let mut preview = PreviewSession::default();
        let now = Utc::now();

        assert!(matches!(
            preview.dispatch(editor.draft(), WidgetAction::select("2"), now),
            Err(WidgetError::OptionUnavailable { .. })
        ));
        assert_eq!(
            preview.dispatch(editor.draft(), WidgetAction::select("3"), now),
            Ok(WidgetStep::ProductExchangeForm)
        );

        let view = preview.view(editor.draft());
        let ViewContent::Form { fields, .. } = view.content else {
            panic!("expected form");
        };
        let required: Vec<_> = fields.iter().filter(|f| f.required).map(|f| f.field).collect();
        assert_eq!(required, vec![FormField::NeededProduct]);
    }

    #[test]
    fn test_success_view() {
        let config = BusinessConfig::default();
        let mut preview = PreviewSession::default();
        preview
            .dispatch(&config, WidgetAction::select("1"), Utc::now())
            .unwrap();

        let view = preview.view(&config);
        assert_eq!(view.step, WidgetStep::Success);
        assert!(matches!(view.content, ViewContent::Success { .. }));
    }
}
