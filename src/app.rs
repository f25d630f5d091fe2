//! Application context shared by every command.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use weektable_core::config::TimetableConfig;
use weektable_core::remote::HttpBackend;
use weektable_core::session::{ChallengeOutcome, CredentialStore};
use weektable_core::{
    EventStore, GateDecision, PendingIntent, SessionGate, TimeBase, WeekAgenda, WeekNavigator,
};

use crate::{commands, pin};

pub struct App {
    pub config: TimetableConfig,
    pub time_base: TimeBase,
    pub gate: SessionGate,
    pub store: EventStore<HttpBackend>,
    pub navigator: WeekNavigator,
}

impl App {
    /// Load config, connect to the service and fetch the first snapshot.
    pub async fn start() -> Result<Self> {
        let config = TimetableConfig::load().context("Failed to load config")?;
        let time_base = config.time_base()?;
        let backend = config.backend()?;

        let credentials = CredentialStore::open_default()?;
        let gate = SessionGate::start(&backend, Some(credentials))
            .await
            .with_context(|| {
                format!("Could not reach the timetable service at {}", config.server_url)
            })?;

        let mut store = EventStore::new(backend);
        store.list().await.context("Failed to load events")?;

        let navigator = WeekNavigator::new(&time_base, Utc::now());

        Ok(App {
            config,
            time_base,
            gate,
            store,
            navigator,
        })
    }

    pub fn now(&self) -> DateTime<Tz> {
        self.time_base.now()
    }

    pub fn agenda(&self) -> WeekAgenda {
        self.store
            .project(&self.navigator, &self.time_base, Utc::now())
    }

    /// Run `intent` now, or once a PIN challenge has let it through.
    /// Backing out of the challenge drops the intent.
    pub async fn perform(&mut self, intent: PendingIntent) -> Result<()> {
        let intent = match self.gate.request_mutating_action(intent) {
            GateDecision::Proceed(intent) => intent,
            GateDecision::Challenged(_) => {
                match pin::run_challenge(&mut self.gate, self.store.service()).await? {
                    Some(ChallengeOutcome::Completed {
                        resume: Some(intent),
                        ..
                    }) => intent,
                    _ => return Ok(()),
                }
            }
        };

        self.dispatch(intent).await
    }

    async fn dispatch(&mut self, intent: PendingIntent) -> Result<()> {
        tracing::debug!(?intent, "dispatching");
        match intent {
            PendingIntent::AddEvent => commands::add::perform(self).await,
            PendingIntent::EditEvent(id) => commands::edit::perform(self, id).await,
            PendingIntent::DeleteEvent(id) => commands::delete::perform(self, id).await,
            PendingIntent::OpenSettings => commands::settings::perform(self).await,
        }
    }
}
