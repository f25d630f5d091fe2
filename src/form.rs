//! Interactive event form.

use anyhow::Result;
use dialoguer::{Input, MultiSelect, Select};
use owo_colors::OwoColorize;
use weektable_core::{DayIndex, DaySet, EventColor, EventDraft, EventIcon, TimeOfDay};

/// Prompt for every field, prefilled from `draft`, until the result passes
/// validation.
pub fn prompt(mut draft: EventDraft) -> Result<EventDraft> {
    loop {
        let filled = fill(draft)?;
        match filled.clone().validated() {
            Ok(valid) => return Ok(valid),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
                draft = filled;
            }
        }
    }
}

fn fill(draft: EventDraft) -> Result<EventDraft> {
    // --- Title ---
    let title: String = Input::new()
        .with_prompt("  Title")
        .with_initial_text(draft.title)
        .allow_empty(true)
        .interact_text()?;

    // --- Times ---
    let start_time = prompt_time("  Start (HH:MM)", Some(&draft.start_time))?
        .unwrap_or(draft.start_time);
    let end_time = prompt_time("  End (HH:MM, skip)", draft.end_time.as_ref())?;

    // --- Days ---
    let days = prompt_days(draft.days)?;

    // --- Color & icon ---
    let current_color = EventColor::from_tag(&draft.color);
    let color_items: Vec<&str> = EventColor::ALL.iter().map(|c| c.label()).collect();
    let color = Select::new()
        .with_prompt("  Color")
        .items(&color_items)
        .default(
            EventColor::ALL
                .iter()
                .position(|c| *c == current_color)
                .unwrap_or(0),
        )
        .interact()?;

    let icon = Select::new()
        .with_prompt("  Icon")
        .items(&EventIcon::ALL)
        .default(EventIcon::from_tag(&draft.icon).index())
        .interact()?;

    // --- Description ---
    let description: String = Input::new()
        .with_prompt("  Description (skip)")
        .with_initial_text(draft.description.unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    Ok(EventDraft {
        title,
        description: Some(description).filter(|d| !d.trim().is_empty()),
        start_time,
        end_time,
        days,
        color: EventColor::ALL[color].hex().to_string(),
        icon: EventIcon::ALL[icon].to_string(),
    })
}

/// Prompt for an `HH:MM` time with retry on parse errors. An empty entry
/// yields `None`.
fn prompt_time(prompt: &str, current: Option<&TimeOfDay>) -> Result<Option<TimeOfDay>> {
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .with_initial_text(current.map(|t| t.to_string()).unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;
        if input.trim().is_empty() {
            return Ok(None);
        }
        match TimeOfDay::parse(&input) {
            Ok(time) => return Ok(Some(time)),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

fn prompt_days(current: DaySet) -> Result<DaySet> {
    let names: Vec<&str> = DayIndex::ALL.iter().map(|d| d.name()).collect();
    let defaults: Vec<bool> = DayIndex::ALL.iter().map(|d| current.contains(*d)).collect();

    loop {
        let selections = MultiSelect::new()
            .with_prompt("  Days (space to toggle, enter to confirm)")
            .items(&names)
            .defaults(&defaults)
            .interact()?;

        let days: DaySet = selections.into_iter().map(|i| DayIndex::ALL[i]).collect();
        if !days.is_empty() {
            return Ok(days);
        }
        eprintln!("  {}", "Please select at least one day".red());
    }
}
