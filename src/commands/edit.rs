use anyhow::Result;
use owo_colors::OwoColorize;
use weektable_core::{EventDraft, EventId, EventPatch, PendingIntent};

use crate::app::App;
use crate::form;

pub async fn run(app: &mut App, id: EventId) -> Result<()> {
    require_event(app, id)?;
    app.perform(PendingIntent::EditEvent(id)).await
}

pub async fn perform(app: &mut App, id: EventId) -> Result<()> {
    let current = require_event(app, id)?;
    let draft = form::prompt(EventDraft::from_event(current))?;

    let event = app
        .store
        .update(&mut app.gate, id, EventPatch::from(draft))
        .await?;

    println!();
    println!("{}", format!("  Updated: {}", event).green());
    Ok(())
}

pub fn require_event(app: &App, id: EventId) -> Result<&weektable_core::Event> {
    app.store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Event #{} not found", id))
}
