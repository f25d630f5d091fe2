use anyhow::Result;
use owo_colors::OwoColorize;
use weektable_core::TimetableError;
use weektable_core::session::ChallengeOutcome;

use crate::app::App;
use crate::pin::run_challenge;

/// Change the PIN. Only an unlocked session may do this.
pub async fn change(app: &mut App) -> Result<()> {
    match app.gate.request_pin_change() {
        Ok(()) => {}
        Err(TimetableError::Locked) => anyhow::bail!(
            "Session is locked.\n\n\
            Unlock by editing the timetable first, e.g.:\n  \
            weektable settings"
        ),
        Err(e) => return Err(e.into()),
    }

    if let Some(ChallengeOutcome::Completed { .. }) =
        run_challenge(&mut app.gate, app.store.service()).await?
    {
        println!("{}", "  PIN changed".green());
    }
    Ok(())
}
