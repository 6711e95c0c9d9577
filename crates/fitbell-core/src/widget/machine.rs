//! Pure transition function for the widget flow.
//!
//! The public widget and the dashboard preview both drive sessions through
//! [`WidgetMachine`], so there is exactly one transition table.

use chrono::{DateTime, Utc};

use super::{FormKind, WidgetAction, WidgetEvent, WidgetSession, WidgetSettings, WidgetStep};
use crate::error::WidgetError;
use crate::validation::validate_all_present;
use crate::types::{BusinessConfig, HelpOption, HelpOptionType};

/// Result of an accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The session after the action.
    pub session: WidgetSession,
    /// Request to emit, if the action reached SUCCESS.
    pub event: Option<WidgetEvent>,
}

impl Transition {
    fn quiet(session: WidgetSession) -> Self {
        Transition {
            session,
            event: None,
        }
    }
}

/// The widget state machine bound to one configuration.
#[derive(Debug, Clone, Copy)]
pub struct WidgetMachine<'a> {
    config: &'a BusinessConfig,
    settings: WidgetSettings,
}

impl<'a> WidgetMachine<'a> {
    pub fn new(config: &'a BusinessConfig, settings: WidgetSettings) -> Self {
        WidgetMachine { config, settings }
    }

    pub fn config(&self) -> &'a BusinessConfig {
        self.config
    }

    pub fn settings(&self) -> WidgetSettings {
        self.settings
    }

    /// Options the shopper can press right now.
    ///
    /// Only enabled options, and only at MAIN.
    pub fn selectable_options(&self, session: &WidgetSession) -> Vec<&'a HelpOption> {
        match session.step {
            WidgetStep::Main => self.config.enabled_options().collect(),
            _ => Vec::new(),
        }
    }

    /// Computes the next session for `action`.
    ///
    /// A rejected action returns `Err` and the caller keeps its current
    /// session untouched; no event is produced in that case.
    pub fn transition(
        &self,
        session: &WidgetSession,
        action: WidgetAction,
        now: DateTime<Utc>,
    ) -> Result<Transition, WidgetError> {
        match (session.step, action) {
            (_, WidgetAction::Close) => Ok(Transition::quiet(WidgetSession::new())),

            (WidgetStep::Success, WidgetAction::Tick) => {
                let expired = session.success_until.map_or(true, |until| now >= until);
                if expired {
                    Ok(Transition::quiet(WidgetSession::new()))
                } else {
                    Ok(Transition::quiet(session.clone()))
                }
            }
            (_, WidgetAction::Tick) => Ok(Transition::quiet(session.clone())),

            (WidgetStep::Main, WidgetAction::Select { option_id }) => self.select(&option_id, now),

            (step, WidgetAction::Input { field, value }) => match step.form() {
                Some(form) if form.contains(field) => {
                    let mut next = session.clone();
                    next.form_fields.insert(field, value);
                    Ok(Transition::quiet(next))
                }
                Some(_) => Err(WidgetError::FieldNotInForm {
                    field: field.name().to_string(),
                }),
                None => Err(invalid(step, "input")),
            },

            (WidgetStep::SizeExchangeForm | WidgetStep::ProductExchangeForm, WidgetAction::Back) => {
                Ok(Transition::quiet(WidgetSession::new()))
            }

            (step, WidgetAction::Submit) => match step.form() {
                Some(form) => self.submit(session, form, now),
                None => Err(invalid(step, "submit")),
            },

            (step, action) => Err(invalid(step, action.name())),
        }
    }

    /// Applies `action` in place and returns the emitted event.
    ///
    /// On error `session` is left as it was.
    pub fn apply(
        &self,
        session: &mut WidgetSession,
        action: WidgetAction,
        now: DateTime<Utc>,
    ) -> Result<Option<WidgetEvent>, WidgetError> {
        let Transition {
            session: next,
            event,
        } = self.transition(session, action, now)?;
        *session = next;
        Ok(event)
    }

    fn select(&self, option_id: &str, now: DateTime<Utc>) -> Result<Transition, WidgetError> {
        let option = self
            .config
            .option(option_id)
            .filter(|o| o.enabled)
            .ok_or_else(|| WidgetError::OptionUnavailable {
                option_id: option_id.to_string(),
            })?;

        let form = match option.kind {
            HelpOptionType::Call => {
                let event = WidgetEvent::AssistanceRequested {
                    option_id: option.id.clone(),
                    label: option.label.clone(),
                };
                let session = self.success(WidgetSession::new(), &option.id, now);
                return Ok(Transition {
                    session,
                    event: Some(event),
                });
            }
            HelpOptionType::SizeExchange => FormKind::SizeExchange,
            HelpOptionType::ProductExchange => FormKind::ProductExchange,
        };

        Ok(Transition::quiet(WidgetSession {
            step: form.step(),
            active_option: Some(option.id.clone()),
            ..WidgetSession::new()
        }))
    }

    fn submit(
        &self,
        session: &WidgetSession,
        form: FormKind,
        now: DateTime<Utc>,
    ) -> Result<Transition, WidgetError> {
        validate_all_present(
            form.required_fields()
                .iter()
                .map(|field| (field.name(), session.field(*field))),
        )?;

        let option_id = session.active_option.clone().unwrap_or_default();
        let value = |field| session.field(field).trim().to_string();

        use super::FormField::*;
        let event = match form {
            FormKind::SizeExchange => WidgetEvent::SizeExchangeRequested {
                option_id: option_id.clone(),
                current_size: value(CurrentSize),
                needed_size: value(NeededSize),
            },
            FormKind::ProductExchange => WidgetEvent::ProductExchangeRequested {
                option_id: option_id.clone(),
                current_product: value(CurrentProduct),
                needed_product: value(NeededProduct),
            },
        };

        Ok(Transition {
            session: self.success(session.clone(), &option_id, now),
            event: Some(event),
        })
    }

    fn success(&self, mut session: WidgetSession, option_id: &str, now: DateTime<Utc>) -> WidgetSession {
        session.step = WidgetStep::Success;
        session.active_option = Some(option_id.to_string());
        let until = now
            .checked_add_signed(self.settings.success_display())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        session.success_until = Some(until);
        session
    }
}

fn invalid(step: WidgetStep, action: &str) -> WidgetError {
    WidgetError::InvalidAction {
        step,
        action: action.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HelpOption;
    use crate::widget::FormField;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn scenario_config() -> BusinessConfig {
        BusinessConfig {
            button_color: "#3b82f6".to_string(),
            panel_color: "#ffffff".to_string(),
            help_options: vec![
                HelpOption::new("1", HelpOptionType::Call, "Call"),
                HelpOption::new("2", HelpOptionType::SizeExchange, "Size").enabled(false),
            ],
        }
    }

    fn machine(config: &BusinessConfig) -> WidgetMachine<'_> {
        WidgetMachine::new(config, WidgetSettings::default())
    }

    #[test]
    fn test_scenario_single_enabled_call_option() {
        let config = scenario_config();
        let machine = machine(&config);
        let mut session = WidgetSession::new();

        let options = machine.selectable_options(&session);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].kind, HelpOptionType::Call);

        let event = machine
            .apply(&mut session, WidgetAction::select("1"), t0())
            .unwrap();

        assert_eq!(session.step(), WidgetStep::Success);
        assert!(matches!(
            event,
            Some(WidgetEvent::AssistanceRequested { ref option_id, .. }) if option_id == "1"
        ));
    }

    #[test]
    fn test_disabled_or_absent_option_is_not_selectable() {
        let config = scenario_config();
        let machine = machine(&config);
        let session = WidgetSession::new();

        for id in ["2", "99"] {
            let err = machine
                .transition(&session, WidgetAction::select(id), t0())
                .unwrap_err();
            assert!(matches!(err, WidgetError::OptionUnavailable { .. }));
        }
    }

    #[test]
    fn test_selectable_options_only_at_main() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();
        assert_eq!(machine.selectable_options(&session).len(), 3);

        machine
            .apply(&mut session, WidgetAction::select("2"), t0())
            .unwrap();
        assert!(machine.selectable_options(&session).is_empty());
    }

    #[test]
    fn test_size_exchange_flow() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();

        assert_eq!(
            machine.apply(&mut session, WidgetAction::select("2"), t0()),
            Ok(None)
        );
        assert_eq!(session.step(), WidgetStep::SizeExchangeForm);

        machine
            .apply(&mut session, WidgetAction::input(FormField::CurrentSize, "M"), t0())
            .unwrap();
        machine
            .apply(&mut session, WidgetAction::input(FormField::NeededSize, " L "), t0())
            .unwrap();

        let event = machine.apply(&mut session, WidgetAction::Submit, t0()).unwrap();
        assert_eq!(
            event,
            Some(WidgetEvent::SizeExchangeRequested {
                option_id: "2".to_string(),
                current_size: "M".to_string(),
                needed_size: "L".to_string(),
            })
        );
        assert_eq!(session.step(), WidgetStep::Success);
    }

    #[test]
    fn test_submit_with_empty_required_field_is_rejected_in_place() {
        let config = BusinessConfig::default();
        let machine = machine(&config);

        for (option, filled) in [
            ("2", Some(FormField::CurrentSize)),
            ("2", None),
            ("3", Some(FormField::CurrentProduct)),
        ] {
            let mut session = WidgetSession::new();
            machine
                .apply(&mut session, WidgetAction::select(option), t0())
                .unwrap();
            if let Some(field) = filled {
                machine
                    .apply(&mut session, WidgetAction::input(field, "x"), t0())
                    .unwrap();
            }
            let before = session.clone();

            let result = machine.apply(&mut session, WidgetAction::Submit, t0());

            assert!(matches!(result, Err(WidgetError::ValidationFailed(_))));
            assert_eq!(session, before);
        }
    }

    #[test]
    fn test_blank_submit_reports_first_missing_field() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();
        machine
            .apply(&mut session, WidgetAction::select("2"), t0())
            .unwrap();
        machine
            .apply(&mut session, WidgetAction::input(FormField::CurrentSize, "   "), t0())
            .unwrap();

        let err = machine
            .apply(&mut session, WidgetAction::Submit, t0())
            .unwrap_err();

        assert_eq!(
            err,
            WidgetError::ValidationFailed(crate::ValidationError::required(
                FormField::CurrentSize.name()
            ))
        );
    }

    #[test]
    fn test_product_exchange_requires_only_needed_product() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();

        machine
            .apply(&mut session, WidgetAction::select("3"), t0())
            .unwrap();
        machine
            .apply(
                &mut session,
                WidgetAction::input(FormField::NeededProduct, "White linen shirt"),
                t0(),
            )
            .unwrap();

        let event = machine.apply(&mut session, WidgetAction::Submit, t0()).unwrap();
        assert!(matches!(
            event,
            Some(WidgetEvent::ProductExchangeRequested { ref current_product, .. }) if current_product.is_empty()
        ));
    }

    #[test]
    fn test_back_discards_form_fields() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();

        machine
            .apply(&mut session, WidgetAction::select("2"), t0())
            .unwrap();
        machine
            .apply(&mut session, WidgetAction::input(FormField::CurrentSize, "S"), t0())
            .unwrap();
        machine.apply(&mut session, WidgetAction::Back, t0()).unwrap();

        assert_eq!(session, WidgetSession::new());
    }

    #[test]
    fn test_input_outside_current_form_is_rejected() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();

        assert!(matches!(
            machine.apply(&mut session, WidgetAction::input(FormField::NeededSize, "L"), t0()),
            Err(WidgetError::InvalidAction { .. })
        ));

        machine
            .apply(&mut session, WidgetAction::select("3"), t0())
            .unwrap();
        assert!(matches!(
            machine.apply(&mut session, WidgetAction::input(FormField::NeededSize, "L"), t0()),
            Err(WidgetError::FieldNotInForm { .. })
        ));
    }

    #[test]
    fn test_success_auto_dismisses_after_display_duration() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();

        machine
            .apply(&mut session, WidgetAction::select("2"), t0())
            .unwrap();
        for (field, value) in [(FormField::CurrentSize, "M"), (FormField::NeededSize, "L")] {
            machine
                .apply(&mut session, WidgetAction::input(field, value), t0())
                .unwrap();
        }
        machine.apply(&mut session, WidgetAction::Submit, t0()).unwrap();
        assert_eq!(
            session.success_remaining(t0()),
            Some(std::time::Duration::from_millis(4000))
        );

        machine
            .apply(&mut session, WidgetAction::Tick, t0() + Duration::milliseconds(3999))
            .unwrap();
        assert_eq!(session.step(), WidgetStep::Success);

        machine
            .apply(&mut session, WidgetAction::Tick, t0() + Duration::milliseconds(4000))
            .unwrap();
        assert_eq!(session.step(), WidgetStep::Main);
        assert!(session.form_fields().is_empty());
    }

    #[test]
    fn test_oversized_display_is_capped() {
        let config = BusinessConfig::default();
        let cap = std::time::Duration::from_millis(crate::MAX_SUCCESS_DISPLAY_MS);

        for success_display_ms in [i64::MAX as u64, u64::MAX] {
            let settings = WidgetSettings { success_display_ms };
            let machine = WidgetMachine::new(&config, settings);
            let mut session = WidgetSession::new();

            machine
                .apply(&mut session, WidgetAction::select("1"), t0())
                .unwrap();
            assert_eq!(session.success_remaining(t0()), Some(cap));

            machine.apply(&mut session, WidgetAction::Tick, t0()).unwrap();
            assert_eq!(session.step(), WidgetStep::Success);
            assert!(settings.validate().is_err());
        }
    }

    #[test]
    fn test_deadline_saturates_at_latest_time() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();
        let late = DateTime::<Utc>::MAX_UTC - Duration::seconds(1);

        machine
            .apply(&mut session, WidgetAction::select("1"), late)
            .unwrap();

        assert_eq!(session.success_until(), Some(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_settings_range() {
        let at_cap = WidgetSettings {
            success_display_ms: crate::MAX_SUCCESS_DISPLAY_MS,
        };
        let zero = WidgetSettings {
            success_display_ms: 0,
        };

        assert!(WidgetSettings::default().validate().is_ok());
        assert!(at_cap.validate().is_ok());
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_close_resets_from_any_step() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();

        machine
            .apply(&mut session, WidgetAction::select("3"), t0())
            .unwrap();
        machine.apply(&mut session, WidgetAction::Close, t0()).unwrap();
        assert_eq!(session, WidgetSession::new());

        machine
            .apply(&mut session, WidgetAction::select("1"), t0())
            .unwrap();
        machine.apply(&mut session, WidgetAction::Close, t0()).unwrap();
        assert_eq!(session.step(), WidgetStep::Main);
    }

    #[test]
    fn test_actions_without_transition_are_rejected() {
        let config = BusinessConfig::default();
        let machine = machine(&config);
        let mut session = WidgetSession::new();

        assert!(machine.apply(&mut session, WidgetAction::Back, t0()).is_err());
        assert!(machine.apply(&mut session, WidgetAction::Submit, t0()).is_err());

        machine
            .apply(&mut session, WidgetAction::select("1"), t0())
            .unwrap();
        assert!(machine
            .apply(&mut session, WidgetAction::select("1"), t0())
            .is_err());
        assert_eq!(session.step(), WidgetStep::Success);
    }
}
