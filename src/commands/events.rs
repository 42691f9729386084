use anyhow::{Context as _, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::Args;
use dialoguer::{Confirm, Select};
use famcal_client::{ApiClient, ChildFilter, EventRange};
use famcal_core::date::parse_day;
use famcal_core::{EventDraft, EventTime, EventType, Priority};
use owo_colors::OwoColorize;

use crate::commands::{Context, submit};
use crate::render::{Render, day_label};
use crate::utils::prompt::{prompt_optional, prompt_text, prompt_with_retry, select};
use crate::utils::tui;

/// Event fields; on `add`, a missing title or start switches to prompts.
#[derive(Args, Debug, Default)]
pub struct EventArgs {
    #[arg(short, long)]
    pub title: Option<String>,

    /// Start: YYYY-MM-DD for an all-day event, YYYY-MM-DDTHH:MM (UTC) for a timed one
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date/time
    #[arg(short, long, conflicts_with = "duration")]
    pub end: Option<String>,

    /// Duration (e.g., "30m", "1h", "2h30m")
    #[arg(short, long, conflicts_with = "end")]
    pub duration: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// school, sports, medical, birthday, appointment, activity, playdate, holiday, reminder, other
    #[arg(long = "type")]
    pub kind: Option<EventType>,

    /// low, medium, high or urgent
    #[arg(short, long)]
    pub priority: Option<Priority>,

    /// Hex color (#RRGGBB); defaults to the type's color
    #[arg(long)]
    pub color: Option<String>,

    /// Child id, or 0 for a family-wide event
    #[arg(short, long)]
    pub child: Option<i64>,

    /// Remind this long before (e.g. "30m", "1day"), or "off"
    #[arg(short, long)]
    pub remind: Option<String>,
}

impl EventArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.duration.is_none()
            && self.description.is_none()
            && self.kind.is_none()
            && self.priority.is_none()
            && self.color.is_none()
            && self.child.is_none()
            && self.remind.is_none()
    }

    /// Overwrite the draft's fields with the ones given on the command line.
    fn apply(self, draft: &mut EventDraft) -> Result<()> {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(start) = self.start {
            set_start(draft, EventTime::parse(&start)?);
        }
        if let Some(end) = self.end {
            draft.end_date = Some(EventTime::parse(&end)?);
        }
        if let Some(duration) = self.duration {
            draft.end_date = Some(apply_duration(&draft.start_date, &duration)?);
        }
        if let Some(description) = self.description {
            draft.description = (!description.trim().is_empty()).then_some(description);
        }
        if let Some(kind) = self.kind {
            set_kind(draft, kind);
        }
        if let Some(priority) = self.priority {
            draft.priority = priority;
        }
        if let Some(color) = self.color {
            draft.color = color;
        }
        if let Some(child) = self.child {
            draft.child_id = (child > 0).then_some(child);
        }
        if let Some(remind) = self.remind {
            set_reminder(draft, parse_reminder(&remind)?);
        }
        Ok(())
    }
}

fn set_start(draft: &mut EventDraft, start: EventTime) {
    draft.start_date = start;
    draft.is_all_day = matches!(start, EventTime::Date(_));
}

/// Change the type, following along with its color unless one was picked.
fn set_kind(draft: &mut EventDraft, kind: EventType) {
    if draft.color.is_empty() || draft.color.eq_ignore_ascii_case(draft.kind.default_color()) {
        draft.color = kind.default_color().to_string();
    }
    draft.kind = kind;
}

fn set_reminder(draft: &mut EventDraft, minutes: Option<u32>) {
    draft.has_reminder = minutes.is_some();
    draft.reminder_minutes = minutes;
}

/// Minutes before the event, or `None` for "off".
fn parse_reminder(input: &str) -> Result<Option<u32>> {
    let input = input.trim();
    if matches!(input.to_ascii_lowercase().as_str(), "off" | "none" | "no" | "") {
        return Ok(None);
    }

    let duration = humantime::parse_duration(input)
        .with_context(|| format!("Could not parse reminder: \"{}\"", input))?;
    let minutes = u32::try_from(duration.as_secs() / 60).context("Reminder too far ahead")?;
    Ok(Some(minutes))
}

/// End time `duration` after `start`. All-day events move by whole days.
fn apply_duration(start: &EventTime, input: &str) -> Result<EventTime> {
    let std_dur = humantime::parse_duration(input)
        .with_context(|| format!("Could not parse duration: \"{}\"", input))?;
    let dur = Duration::from_std(std_dur).context("Duration too large")?;

    let end = match start {
        EventTime::DateTime(dt) => dt.checked_add_signed(dur).map(EventTime::DateTime),
        EventTime::Date(d) => d
            .checked_add_signed(Duration::days(dur.num_days().max(1)))
            .map(EventTime::Date),
    };
    end.context("Duration too large")
}

pub async fn list(ctx: &Context, from: Option<&str>, to: Option<&str>, child: ChildFilter) -> Result<()> {
    let range = match (from, to) {
        (Some(from), Some(to)) => Some(EventRange {
            start: parse_day(from)?,
            end: parse_day(to)?,
        }),
        _ => None,
    };

    let client = ctx.client()?;
    let mut events = tui::with_spinner("Loading events", client.list_events(range, child)).await?;
    events.sort_by_key(|e| e.start_date.to_utc());

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let today = Utc::now().date_naive();
    let mut current_date: Option<NaiveDate> = None;

    for event in &events {
        let date = event.start_day();
        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", day_label(date, today).bold());
            current_date = Some(date);
        }

        println!("  {} {}", event.render(), format!("#{}", event.id).dimmed());
    }

    Ok(())
}

pub async fn add(ctx: &Context, args: EventArgs) -> Result<()> {
    let client = ctx.client()?;
    let interactive = args.title.is_none() || args.start.is_none();

    let mut draft = if interactive {
        prompt_new(&client, &args).await?
    } else {
        // Placeholder start; `apply` sets the real one
        EventDraft::new(String::new(), EventTime::Date(Utc::now().date_naive()))
    };
    args.apply(&mut draft)?;

    if !draft.is_all_day && draft.end_date.is_none() {
        draft.end_date = Some(apply_duration(&draft.start_date, "1h")?);
    }

    let event = submit(tui::with_spinner("Saving", client.create_event(&draft)).await)?;

    if interactive {
        println!();
    }
    println!("{}", format!("  Created: {} (#{})", event.title, event.id).green());
    Ok(())
}

pub async fn edit(ctx: &Context, id: i64, args: EventArgs) -> Result<()> {
    let client = ctx.client()?;
    let event = tui::with_spinner("Loading event", client.get_event(id)).await?;

    let mut draft = event.to_draft();
    if args.is_empty() {
        prompt_edit(&mut draft)?;
    } else {
        args.apply(&mut draft)?;
    }

    if draft == event.to_draft() {
        println!("{}", "Nothing changed".dimmed());
        return Ok(());
    }

    let updated = submit(tui::with_spinner("Saving", client.update_event(id, &draft)).await)?;
    println!("{}", format!("  Updated: {}", updated.title).green());
    Ok(())
}

pub async fn delete(ctx: &Context, id: i64, force: bool) -> Result<()> {
    let client = ctx.client()?;
    let event = tui::with_spinner("Loading event", client.get_event(id)).await?;

    if !force {
        println!("  {}", event.render());
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", event.title))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    tui::with_spinner("Deleting", client.delete_event(id)).await?;
    println!("Deleted {}", event.title);
    Ok(())
}

/// Walk through a new event, skipping fields given as flags.
async fn prompt_new(client: &ApiClient, args: &EventArgs) -> Result<EventDraft> {
    let title = match &args.title {
        Some(t) => t.clone(),
        None => prompt_text("  Title", None)?,
    };

    let start = match &args.start {
        Some(s) => EventTime::parse(s)?,
        None => prompt_with_retry("  When? (YYYY-MM-DD or YYYY-MM-DDTHH:MM)", None, EventTime::parse)?,
    };

    let mut draft = EventDraft::new(title, start);

    if args.end.is_none() && args.duration.is_none() {
        let hint = if draft.is_all_day { "1 day" } else { "1h" };
        draft.end_date = prompt_with_retry(&format!("  How long? ({hint})"), None, |input| {
            if input.is_empty() {
                return Ok(None);
            }
            apply_duration(&start, input).map(Some)
        })?;
    }

    if args.kind.is_none() {
        let kind = select("  Type", &EventType::ALL, EventType::default())?;
        set_kind(&mut draft, kind);
    }

    if args.priority.is_none() {
        draft.priority = select("  Priority", &Priority::ALL, Priority::default())?;
    }

    if args.child.is_none() {
        draft.child_id = choose_child(client).await?;
    }

    if args.remind.is_none() {
        let minutes = prompt_with_retry("  Reminder? e.g. 30m (skip)", None, parse_reminder)?;
        set_reminder(&mut draft, minutes);
    }

    if args.description.is_none() {
        draft.description = prompt_optional("  Notes", None)?;
    }

    Ok(draft)
}

/// Pre-filled prompts for the fields people usually change.
fn prompt_edit(draft: &mut EventDraft) -> Result<()> {
    draft.title = prompt_text("  Title", Some(draft.title.as_str()))?;

    let start = prompt_with_retry("  Start", Some(draft.start_date.to_string()), EventTime::parse)?;
    set_start(draft, start);

    let current_end = draft.end_date.map(|e| e.to_string());
    draft.end_date = prompt_with_retry("  End (skip)", current_end, |input| {
        if input.is_empty() {
            return Ok(None);
        }
        EventTime::parse(input).map(Some)
    })?;

    let kind = select("  Type", &EventType::ALL, draft.kind)?;
    set_kind(draft, kind);
    draft.priority = select("  Priority", &Priority::ALL, draft.priority)?;

    draft.description = prompt_optional("  Notes", draft.description.as_deref())?;
    Ok(())
}

async fn choose_child(client: &ApiClient) -> Result<Option<i64>> {
    let children = tui::with_spinner("Loading children", client.list_children()).await?;
    if children.is_empty() {
        return Ok(None);
    }

    let mut labels = vec!["Whole family".to_string()];
    labels.extend(children.iter().map(|c| c.name.clone()));

    let selection = Select::new()
        .with_prompt("  For")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(selection.checked_sub(1).map(|i| children[i].id))
}
