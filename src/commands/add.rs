use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use weektable_core::{EventDraft, PendingIntent};

use crate::app::App;
use crate::form;

pub async fn run(app: &mut App) -> Result<()> {
    app.perform(PendingIntent::AddEvent).await
}

/// Collect a new event and save it. New events default to today's weekday.
pub async fn perform(app: &mut App) -> Result<()> {
    let today = app.time_base.weekday_index(Utc::now());
    let draft = form::prompt(EventDraft::for_day(today))?;

    let event = app.store.create(&mut app.gate, draft).await?;

    println!();
    println!("{}", format!("  Created: {}", event).green());
    Ok(())
}
