use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use weektable_core::{EventId, PendingIntent};

use crate::app::App;
use crate::commands::edit::require_event;

pub async fn run(app: &mut App, id: EventId) -> Result<()> {
    require_event(app, id)?;
    app.perform(PendingIntent::DeleteEvent(id)).await
}

pub async fn perform(app: &mut App, id: EventId) -> Result<()> {
    let title = require_event(app, id)?.title.clone();

    let confirmed = Confirm::new()
        .with_prompt(format!("Delete \"{}\"?", title))
        .default(false)
        .interact()?;
    if !confirmed {
        return Ok(());
    }

    app.store.delete(&mut app.gate, id).await?;
    println!("{}", format!("  Deleted: {}", title).red());
    Ok(())
}
