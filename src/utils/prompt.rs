use std::fmt;

use anyhow::{Context, Result};
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;

/// Ask until `parse` accepts the answer, printing each rejection.
pub fn prompt_with_retry<T, E, F>(prompt: &str, initial: Option<String>, parse: F) -> Result<T>
where
    E: fmt::Display,
    F: Fn(&str) -> Result<T, E>,
{
    loop {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(initial) = &initial {
            input = input.with_initial_text(initial.clone());
        }
        let answer = input.interact_text()?;

        match parse(answer.trim()) {
            Ok(value) => return Ok(value),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}

/// Required free text, pre-filled with `current` when editing.
pub fn prompt_text(prompt: &str, current: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(prompt);
    if let Some(current) = current {
        input = input.with_initial_text(current);
    }
    Ok(input.interact_text()?.trim().to_string())
}

/// Free text where an empty answer means "none".
pub fn prompt_optional(prompt: &str, current: Option<&str>) -> Result<Option<String>> {
    let answer: String = Input::new()
        .with_prompt(format!("{prompt} (skip)"))
        .with_initial_text(current.unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

pub fn select<T>(prompt: &str, options: &[T], current: T) -> Result<T>
where
    T: Copy + PartialEq + fmt::Display,
{
    let labels: Vec<String> = options.iter().map(ToString::to_string).collect();
    let default = options.iter().position(|o| *o == current).unwrap_or(0);

    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(options[index])
}

/// Prompt the user for password input (hidden).
pub fn prompt_password(label: &str) -> Result<String> {
    let prompt = format!("{}: ", label);
    rpassword::prompt_password(&prompt).context("Failed to read password")
}
