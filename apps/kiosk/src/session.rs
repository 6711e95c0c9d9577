//! Interactive widget session on a terminal.
//!
//! The same loop drives the public widget ([`WidgetHost`]) and the
//! dashboard preview ([`PreviewDriver`]); only where the view and the
//! transitions come from differs.
//!
//! ```text
//!   MAIN      "2"            press the second button
//!   FORM      neededSize=L   fill a field
//!             submit | back
//!   SUCCESS   (waits for input or the auto-dismiss timer)
//!   any       close | quit | help
//! ```

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use fitbell_core::preview::{PreviewSession, ViewContent, WidgetView};
use fitbell_core::widget::{FormField, WidgetAction, WidgetSettings, WidgetStep};
use fitbell_core::{BusinessConfig, WidgetError};
use fitbell_db::{EventSink, PublicConfigResolver, WidgetHost};

// =============================================================================
// Drivers
// =============================================================================

/// Something that owns a widget session and can render it.
pub trait SessionDriver {
    fn dispatch(&mut self, action: WidgetAction, now: DateTime<Utc>) -> Result<WidgetStep, WidgetError>;

    fn view(&self) -> WidgetView;

    /// Time until the success screen dismisses itself.
    fn success_remaining(&self, now: DateTime<Utc>) -> Option<Duration>;
}

impl<S> SessionDriver for WidgetHost<S>
where
    S: PublicConfigResolver + EventSink + ?Sized + 'static,
{
    fn dispatch(&mut self, action: WidgetAction, now: DateTime<Utc>) -> Result<WidgetStep, WidgetError> {
        WidgetHost::dispatch(self, action, now)
    }

    fn view(&self) -> WidgetView {
        WidgetHost::view(self)
    }

    fn success_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.session().success_remaining(now)
    }
}

/// Runs a draft through the preview session. Nothing is stored.
pub struct PreviewDriver {
    draft: BusinessConfig,
    preview: PreviewSession,
}

impl PreviewDriver {
    pub fn new(draft: BusinessConfig, settings: WidgetSettings) -> Self {
        PreviewDriver {
            draft,
            preview: PreviewSession::new(settings),
        }
    }
}

impl SessionDriver for PreviewDriver {
    fn dispatch(&mut self, action: WidgetAction, now: DateTime<Utc>) -> Result<WidgetStep, WidgetError> {
        self.preview.dispatch(&self.draft, action, now)
    }

    fn view(&self) -> WidgetView {
        self.preview.view(&self.draft)
    }

    fn success_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.preview.session().success_remaining(now)
    }
}

// =============================================================================
// Input
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Action(WidgetAction),
    Help,
    Quit,
    Empty,
}

/// Interprets one line typed while `view` is on screen.
pub fn parse_input(line: &str, view: &WidgetView) -> Result<Input, String> {
    let line = line.trim();

    match line {
        "" => return Ok(Input::Empty),
        "quit" | "exit" | "q" => return Ok(Input::Quit),
        "help" | "?" => return Ok(Input::Help),
        "close" | "x" => return Ok(Input::Action(WidgetAction::Close)),
        "back" | "b" => return Ok(Input::Action(WidgetAction::Back)),
        "submit" | "s" => return Ok(Input::Action(WidgetAction::Submit)),
        _ => {}
    }

    if let Some((field, value)) = line.split_once('=') {
        let field: FormField = field
            .trim()
            .parse()
            .map_err(|_| format!("unknown field '{}'", field.trim()))?;
        return Ok(Input::Action(WidgetAction::input(field, value.trim())));
    }

    if let ViewContent::Menu { options, .. } = &view.content {
        let index: usize = line
            .parse()
            .map_err(|_| format!("type a number between 1 and {}", options.len()))?;
        return match index.checked_sub(1).and_then(|i| options.get(i)) {
            Some(option) => Ok(Input::Action(WidgetAction::select(&option.option_id))),
            None => Err(format!("no option {index}")),
        };
    }

    Err(format!("unrecognized input '{line}', type 'help'"))
}

// =============================================================================
// Rendering
// =============================================================================

pub fn render_text(view: &WidgetView) -> String {
    let mut out = format!(
        "┌─ panel {} · button {} ─────────────\n",
        view.panel_color, view.button_color
    );

    match &view.content {
        ViewContent::Menu { title, options } => {
            out.push_str(&format!("│ {title}\n"));
            if options.is_empty() {
                out.push_str("│   (no help options available)\n");
            }
            for (i, option) in options.iter().enumerate() {
                let marker = if option.primary { "●" } else { "○" };
                out.push_str(&format!("│   {}. {} {}\n", i + 1, marker, option.label));
            }
        }
        ViewContent::Form {
            title,
            fields,
            submit_label,
            ..
        } => {
            out.push_str(&format!("│ {title}\n"));
            for field in fields {
                let required = if field.required { "*" } else { " " };
                let value = if field.value.is_empty() {
                    format!("<{}>", field.placeholder)
                } else {
                    field.value.clone()
                };
                out.push_str(&format!(
                    "│   {}{} ({}): {}\n",
                    field.label,
                    required,
                    field.field.name(),
                    value
                ));
            }
            out.push_str(&format!("│   [submit: {submit_label}]  [back]\n"));
        }
        ViewContent::Success { title, message } => {
            out.push_str(&format!("│ ✓ {title}\n│   {message}\n"));
        }
    }

    out.push_str("└────────────────────────────────────────");
    out
}

const HELP: &str = "\
  <n>              press option n on the menu
  <field>=<value>  fill a form field, e.g. neededSize=L
  submit | back    submit or leave the current form
  close            dismiss the widget
  quit             leave the kiosk";

// =============================================================================
// Loop
// =============================================================================

/// Reads commands from stdin until `quit` or end of input.
///
/// While the success screen is up, input is raced against its timer and
/// a tick is applied when the timer wins.
pub async fn run<D: SessionDriver>(driver: &mut D) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", render_text(&driver.view()));

    loop {
        let line = match driver.success_remaining(Utc::now()) {
            Some(remaining) => match tokio::time::timeout(remaining, lines.next_line()).await {
                Ok(line) => line?,
                Err(_) => {
                    debug!("Success screen timed out");
                    driver.dispatch(WidgetAction::Tick, Utc::now())?;
                    println!("{}", render_text(&driver.view()));
                    continue;
                }
            },
            None => lines.next_line().await?,
        };

        let Some(line) = line else {
            break;
        };

        let input = match parse_input(&line, &driver.view()) {
            Ok(input) => input,
            Err(message) => {
                println!("  ! {message}");
                continue;
            }
        };

        match input {
            Input::Quit => break,
            Input::Empty => continue,
            Input::Help => println!("{HELP}"),
            Input::Action(action) => {
                // Late input on an expired success screen lands on MAIN first.
                driver.dispatch(WidgetAction::Tick, Utc::now())?;
                match driver.dispatch(action, Utc::now()) {
                    Ok(_) => println!("{}", render_text(&driver.view())),
                    Err(e) => println!("  ! {e}"),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitbell_core::preview;
    use fitbell_core::widget::WidgetSession;

    fn menu() -> WidgetView {
        preview::render(&BusinessConfig::default(), &WidgetSession::new())
    }

    #[test]
    fn test_menu_numbers_select_in_display_order() {
        let mut config = BusinessConfig::default();
        config.option_mut("1").unwrap().enabled = false;
        let view = preview::render(&config, &WidgetSession::new());

        assert_eq!(
            parse_input("1", &view),
            Ok(Input::Action(WidgetAction::select("2")))
        );
        assert!(parse_input("3", &view).is_err());
    }

    #[test]
    fn test_field_assignment() {
        assert_eq!(
            parse_input("neededSize = XL", &menu()),
            Ok(Input::Action(WidgetAction::input(FormField::NeededSize, "XL")))
        );
        assert!(parse_input("shoeColor=red", &menu()).is_err());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_input(" quit ", &menu()), Ok(Input::Quit));
        assert_eq!(parse_input("", &menu()), Ok(Input::Empty));
        assert_eq!(
            parse_input("submit", &menu()),
            Ok(Input::Action(WidgetAction::Submit))
        );
    }

    #[test]
    fn test_preview_driver_never_leaves_draft() {
        let mut draft = BusinessConfig::default();
        draft.panel_color = "#111827".to_string();
        let mut driver = PreviewDriver::new(draft, WidgetSettings::default());

        driver.dispatch(WidgetAction::select("1"), Utc::now()).unwrap();

        let view = driver.view();
        assert_eq!(view.step, WidgetStep::Success);
        assert_eq!(view.panel_color, "#111827");
        assert!(render_text(&view).contains("✓"));
    }
}
