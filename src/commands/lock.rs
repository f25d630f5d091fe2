use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;

pub fn run(app: &mut App) -> Result<()> {
    app.gate.lock()?;
    println!("{}", "🔒 Locked. Editing will ask for your PIN.".dimmed());
    Ok(())
}
