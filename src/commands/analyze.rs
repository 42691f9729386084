use std::io::Read;
use std::path::Path;

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use famcal_client::{AnalysisResult, ApiClient, ApiError, MAX_IMAGE_BYTES, image_mime_type};
use famcal_core::EventDraft;
use owo_colors::OwoColorize;

use crate::commands::{Context, pluralize, print_validation_errors, submit};
use crate::render::Render;
use crate::utils::tui;

pub async fn email(ctx: &Context, path: &str, child: Option<i64>, save: bool) -> Result<()> {
    let content = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read email from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
    };

    let client = ctx.client()?;
    let result = submit(tui::with_spinner("Reading email", client.analyze_email(&content, child)).await)?;
    review(&client, result, child, save).await
}

pub async fn photo(ctx: &Context, path: &str, child: Option<i64>, save: bool) -> Result<()> {
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    // Fail before reading a large file we would refuse anyway
    if image_mime_type(&file_name).is_none() {
        anyhow::bail!("{} is not a JPEG, PNG, WebP or HEIC image", file_name);
    }
    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to read {}", path))?
        .len();
    if size > MAX_IMAGE_BYTES as u64 {
        anyhow::bail!("{} is larger than 10 MB", file_name);
    }

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;

    let client = ctx.client()?;
    let result = submit(tui::with_spinner("Reading photo", client.analyze_image(&file_name, bytes, child)).await)?;
    review(&client, result, child, save).await
}

/// Proposed events, ready to save: type colors filled in and the chosen
/// child attached where the analyzer left it open.
fn prepare(result: AnalysisResult, child: Option<i64>) -> Vec<EventDraft> {
    result
        .events
        .into_iter()
        .map(|draft| {
            let mut draft = draft.with_default_color();
            if draft.child_id.is_none() {
                draft.child_id = child;
            }
            draft
        })
        .collect()
}

/// Show the proposals and, with `--save`, create them after confirmation.
async fn review(client: &ApiClient, result: AnalysisResult, child: Option<i64>, save: bool) -> Result<()> {
    if let Some(summary) = &result.summary {
        println!("{}", summary.dimmed());
    }

    let drafts = prepare(result, child);
    if drafts.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    println!("Found {}:", pluralize(drafts.len(), "event"));
    for (i, draft) in drafts.iter().enumerate() {
        println!("  {}. {}", i + 1, draft.render());
    }

    if !save {
        println!();
        println!("{}", "Run again with --save to add them to the calendar".dimmed());
        return Ok(());
    }

    println!();
    let confirmed = Confirm::new()
        .with_prompt(format!("Add {} to the calendar?", pluralize(drafts.len(), "event")))
        .default(true)
        .interact()?;
    if !confirmed {
        return Ok(());
    }

    let mut created = 0;
    for draft in &drafts {
        match tui::with_spinner(&format!("Saving {}", draft.title), client.create_event(draft)).await {
            Ok(_) => created += 1,
            Err(ApiError::Validation(errors)) => {
                eprintln!("  Skipped \"{}\":", draft.title.red());
                print_validation_errors(&errors);
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", format!("  Added {}", pluralize(created, "event")).green());
    Ok(())
}
