use anyhow::Result;
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;
use weektable_core::PendingIntent;
use weektable_core::settings::SettingsPatch;

use crate::app::App;
use crate::commands;
use crate::render::Render;

pub async fn run(app: &mut App) -> Result<()> {
    app.perform(PendingIntent::OpenSettings).await
}

/// Settings screen. Reached only through the session gate.
pub async fn perform(app: &mut App) -> Result<()> {
    loop {
        let settings = app.store.settings().await?.clone();
        println!();
        println!("{}", settings.render());

        let toggle = if settings.notifications_enabled {
            "Turn notifications off"
        } else {
            "Turn notifications on"
        };
        let items = ["Rename timetable", toggle, "Change PIN", "Lock", "Back"];
        let choice = Select::new()
            .with_prompt("  Settings")
            .items(&items)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let title: String = Input::new()
                    .with_prompt("  Title")
                    .with_initial_text(settings.title)
                    .interact_text()?;
                let patch = SettingsPatch {
                    title: Some(title.trim().to_string()),
                    ..SettingsPatch::default()
                };
                app.store.update_settings(&mut app.gate, patch).await?;
                println!("{}", "  Saved".green());
            }
            1 => {
                let patch = SettingsPatch {
                    notifications_enabled: Some(!settings.notifications_enabled),
                    ..SettingsPatch::default()
                };
                app.store.update_settings(&mut app.gate, patch).await?;
            }
            2 => commands::pin::change(app).await?,
            3 => return commands::lock::run(app),
            _ => return Ok(()),
        }
    }
}
