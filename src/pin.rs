//! Terminal driver for PIN challenges.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use weektable_core::TimetableError;
use weektable_core::remote::AuthService;
use weektable_core::session::{ChallengeOutcome, SessionGate};

/// Prompt until the open challenge completes or the user backs out with an
/// empty entry. Returns `None` when dismissed.
pub async fn run_challenge<A>(gate: &mut SessionGate, auth: &A) -> Result<Option<ChallengeOutcome>>
where
    A: AuthService + ?Sized,
{
    loop {
        let Some(challenge) = gate.challenge() else {
            return Ok(None);
        };

        println!();
        println!("{}", challenge.title().bold());
        println!("{}", challenge.description().dimmed());
        if let Some(error) = challenge.error() {
            println!("{}", error.red());
        }

        let mode = challenge.mode();
        let fields = challenge.fields();
        let mut dismissed = false;
        for field in fields {
            let entry = prompt_pin(field.label(mode))?;
            if entry.is_empty() {
                dismissed = true;
                break;
            }
            if let Some(challenge) = gate.challenge_mut() {
                challenge.enter(*field, &entry);
            }
        }

        if dismissed {
            match gate.dismiss() {
                Ok(()) => {
                    println!("{}", "Cancelled".dimmed());
                    return Ok(None);
                }
                Err(TimetableError::ChallengeRequired) => {
                    println!("{}", "A PIN is required before the timetable can be edited.".yellow());
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        match gate.submit(auth).await? {
            ChallengeOutcome::Advanced | ChallengeOutcome::Rejected(_) => continue,
            outcome @ ChallengeOutcome::Completed { .. } => return Ok(Some(outcome)),
        }
    }
}

fn prompt_pin(label: &str) -> Result<String> {
    let prompt = format!("  {label} (enter to cancel): ");
    rpassword::prompt_password(&prompt).context("Failed to read PIN")
}
