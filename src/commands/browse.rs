use anyhow::Result;
use dialoguer::Select;
use owo_colors::OwoColorize;
use weektable_core::{EventId, PendingIntent};

use crate::app::App;
use crate::commands;
use crate::render::{Render, render_now};

const MENU: [&str; 9] = [
    "Previous week",
    "Next week",
    "This week",
    "Add event",
    "Edit event",
    "Delete event",
    "Settings",
    "Lock",
    "Quit",
];

/// Interactive week browser. Failed actions are reported and the loop
/// carries on from the state before the attempt.
pub async fn run(app: &mut App) -> Result<()> {
    loop {
        println!();
        println!("{}", app.agenda().render());
        println!();
        println!("{}", render_now(&app.now()));

        let choice = Select::new()
            .with_prompt("What next?")
            .items(&MENU)
            .default(1)
            .interact()?;

        let result = match choice {
            0 => {
                app.navigator.previous();
                Ok(())
            }
            1 => {
                app.navigator.next();
                Ok(())
            }
            2 => {
                app.navigator.today(&app.time_base, chrono::Utc::now());
                Ok(())
            }
            3 => app.perform(PendingIntent::AddEvent).await,
            4 => match pick_event(app, "Edit which event?")? {
                Some(id) => app.perform(PendingIntent::EditEvent(id)).await,
                None => Ok(()),
            },
            5 => match pick_event(app, "Delete which event?")? {
                Some(id) => app.perform(PendingIntent::DeleteEvent(id)).await,
                None => Ok(()),
            },
            6 => app.perform(PendingIntent::OpenSettings).await,
            7 => commands::lock::run(app),
            _ => return Ok(()),
        };

        if let Err(e) = result {
            eprintln!("{}", e.to_string().red());
        }
    }
}

/// Choose an event from the full list; `None` when there are none or the
/// user picks "Cancel".
fn pick_event(app: &App, prompt: &str) -> Result<Option<EventId>> {
    let events = app.store.events();
    if events.is_empty() {
        println!("{}", "No events yet".dimmed());
        return Ok(None);
    }

    let mut items: Vec<String> = events
        .iter()
        .map(|e| format!("{}  {} {}", e, e.start_time.to_12h(), e.days))
        .collect();
    items.push("Cancel".to_string());

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    Ok(events.get(selection).map(|e| e.id))
}
