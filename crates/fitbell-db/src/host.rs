//! # Public Widget Host
//!
//! Runs one shopper session against the configuration published under a
//! slug.
//!
//! ```text
//! open(store, slug) ──► resolve_by_slug ──► ResolvedConfig (or fallback)
//!                                               │
//!   dispatch(action, now) ──► WidgetMachine ────┤
//!                                 │             │
//!                                 │ event?      ▼
//!                                 └──► tokio::spawn(store.record(..))
//!                                      failure = warn!, never an error
//!
//!   tick(now)   success screen expires ──► MAIN
//!   close()     any step ──► MAIN
//! ```
//!
//! The host never waits on the event sink. A shopper who closes the widget
//! while a request is still being written sees MAIN immediately.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::store::{EventSink, PublicConfigResolver, ResolvedConfig};
use fitbell_core::preview::{self, WidgetView};
use fitbell_core::widget::{
    WidgetAction, WidgetEvent, WidgetMachine, WidgetSession, WidgetSettings, WidgetStep,
};
use fitbell_core::{BusinessConfig, HelpOption, WidgetError};

pub struct WidgetHost<S: ?Sized> {
    store: Arc<S>,
    resolved: ResolvedConfig,
    settings: WidgetSettings,
    session: WidgetSession,
    /// Sink writes still in flight.
    pending: Vec<JoinHandle<()>>,
}

impl<S> WidgetHost<S>
where
    S: PublicConfigResolver + EventSink + ?Sized + 'static,
{
    /// Resolves `slug` and starts a fresh session at MAIN.
    pub async fn open(store: Arc<S>, slug: &str, settings: WidgetSettings) -> Self {
        let resolved = store.resolve_by_slug(slug).await;
        debug!(slug = %slug, resolution = ?resolved.resolution, "Widget opened");

        WidgetHost {
            store,
            resolved,
            settings,
            session: WidgetSession::new(),
            pending: Vec::new(),
        }
    }

    pub fn resolved(&self) -> &ResolvedConfig {
        &self.resolved
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.resolved.config
    }

    pub fn session(&self) -> &WidgetSession {
        &self.session
    }

    pub fn step(&self) -> WidgetStep {
        self.session.step()
    }

    pub fn settings(&self) -> WidgetSettings {
        self.settings
    }

    pub fn view(&self) -> WidgetView {
        preview::render(&self.resolved.config, &self.session)
    }

    /// Buttons shown right now; empty outside MAIN.
    pub fn selectable_options(&self) -> Vec<&HelpOption> {
        self.machine().selectable_options(&self.session)
    }

    /// Applies a shopper action.
    ///
    /// A rejected action leaves the session where it was. An accepted one
    /// that emits a request hands it to the sink in the background.
    pub fn dispatch(
        &mut self,
        action: WidgetAction,
        now: DateTime<Utc>,
    ) -> Result<WidgetStep, WidgetError> {
        let from = self.session.step();
        let action_name = action.name();

        let machine = WidgetMachine::new(&self.resolved.config, self.settings);
        let event = match machine.apply(&mut self.session, action, now) {
            Ok(event) => event,
            Err(e) => {
                debug!(step = ?from, action = action_name, error = %e, "Action rejected");
                return Err(e);
            }
        };

        debug!(from = ?from, to = ?self.session.step(), action = action_name, "Widget transition");

        if let Some(event) = event {
            self.emit(event);
        }
        Ok(self.session.step())
    }

    /// Returns to MAIN once the success screen has been up long enough.
    pub fn tick(&mut self, now: DateTime<Utc>) -> WidgetStep {
        // Tick is accepted at every step.
        let _ = self.dispatch(WidgetAction::Tick, now);
        self.session.step()
    }

    /// Dismisses the widget from any step.
    pub fn close(&mut self) {
        self.session = WidgetSession::new();
    }

    /// Waits for background sink writes. Used on shutdown and in tests.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Request recording task failed");
            }
        }
    }

    fn machine(&self) -> WidgetMachine<'_> {
        WidgetMachine::new(&self.resolved.config, self.settings)
    }

    fn emit(&mut self, event: WidgetEvent) {
        self.pending.retain(|handle| !handle.is_finished());

        let Some(merchant_id) = self.resolved.merchant_id.clone() else {
            debug!(
                slug = %self.resolved.slug,
                kind = event.kind(),
                "No merchant behind this slug, request not recorded"
            );
            return;
        };

        let store = Arc::clone(&self.store);
        self.pending.push(tokio::spawn(async move {
            if let Err(e) = store.record(&merchant_id, &event).await {
                warn!(
                    merchant_id = %merchant_id,
                    kind = event.kind(),
                    error = %e,
                    "Failed to record widget request"
                );
            }
        }));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
