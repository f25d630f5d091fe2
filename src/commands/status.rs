use anyhow::Result;
use owo_colors::OwoColorize;
use weektable_core::SessionState;

use crate::app::App;
use crate::render::Render;

pub async fn run(app: &mut App) -> Result<()> {
    let settings = app.store.settings().await?.clone();

    println!("{}", settings.render());
    println!("   Server: {}", app.config.server_url);
    println!("   Events: {}", app.store.events().len());

    let pin = if app.gate.pin_configured() {
        "set".green().to_string()
    } else {
        "not set".yellow().to_string()
    };
    println!("   PIN: {}", pin);

    let session = match app.gate.state() {
        SessionState::Unlocked => "unlocked".green().to_string(),
        SessionState::Locked | SessionState::Challenging(_) => "locked".dimmed().to_string(),
    };
    println!("   Session: {}", session);

    if let Some(expires_at) = app.gate.credential().and_then(|c| c.expires_at()) {
        let local = app.time_base.localize(expires_at);
        println!("   Expires: {}", local.format("%-I:%M %p %Z"));
    }

    Ok(())
}
