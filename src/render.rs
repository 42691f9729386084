//! Terminal rendering for famcal types.
//!
//! Extension traits and helpers that turn core types into colored lines
//! with owo_colors. Times are shown in UTC, the frame every date is
//! bucketed in.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use famcal_client::MonthlyCalendar;
use famcal_core::grid::{CalendarCell, layout_overlaps};
use famcal_core::{Child, Event, EventDraft, EventTime, Priority};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Child {
    fn render(&self) -> String {
        let mut details = vec![self.grade_level.label().to_string()];
        if !self.school_name.is_empty() {
            details.push(self.school_name.clone());
        }
        if let Some(age) = self.age_on(Utc::now().date_naive()) {
            details.push(format!("age {age}"));
        }

        format!(
            "{} {}  {}",
            format!("#{}", self.id).dimmed(),
            self.name.bold(),
            details.join(" · ").dimmed()
        )
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!(
            "{:>11}  {} {}",
            time_label(self),
            paint(&self.title, &self.color, self.priority),
            format!("[{}]", self.kind).dimmed()
        );

        let names: Vec<&str> = self.children.iter().map(|c| c.name.as_str()).collect();
        if !names.is_empty() {
            line.push_str(&format!(" {}", names.join(", ").cyan()));
        }
        if self.priority == Priority::Urgent {
            line.push_str(&format!(" {}", "urgent".red()));
        }
        if let Some(reminder) = reminder_label(self.has_reminder, self.reminder_minutes) {
            line.push_str(&format!(" {}", reminder.dimmed()));
        }

        line
    }
}

impl Render for EventDraft {
    fn render(&self) -> String {
        let when = match self.start_date {
            EventTime::DateTime(dt) => dt.format("%a %b %-d %H:%M").to_string(),
            EventTime::Date(d) => format!("{} all-day", d.format("%a %b %-d")),
        };

        let mut line = format!(
            "{}  {} {}",
            when,
            paint(&self.title, &self.color, self.priority),
            format!("[{}]", self.kind).dimmed()
        );
        if let Some(description) = &self.description {
            line.push_str(&format!("\n      {}", description.dimmed()));
        }
        line
    }
}

/// "all-day" or "10:00-11:30".
pub fn time_label(event: &Event) -> String {
    if !event.is_timed() {
        return "all-day".to_string();
    }

    let (start, end) = event.time_span();
    format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
}

/// e.g. "reminder 1h 30m before"; `None` when no reminder is set.
pub fn reminder_label(has_reminder: bool, minutes: Option<u32>) -> Option<String> {
    if !has_reminder {
        return None;
    }
    let minutes = minutes?;
    let duration = Duration::from_secs(u64::from(minutes) * 60);
    Some(format!("reminder {} before", humantime::format_duration(duration)))
}

/// Day heading: "Today", "Tomorrow" or "Wed Mar 5".
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// `#RRGGBB` as an RGB triple.
fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Text in the event's color, bold from high priority up.
fn paint(text: &str, color: &str, priority: Priority) -> String {
    let colored = match hex_rgb(color) {
        Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
        None => text.to_string(),
    };

    if priority >= Priority::High {
        colored.bold().to_string()
    } else {
        colored
    }
}

/// Shorten to `width` characters, marking the cut with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Pad (or cut) to exactly `width` columns.
fn fit(text: &str, width: usize) -> String {
    format!("{:<width$}", truncate(text, width), width = width)
}

/// Events shown in a month cell and how many are folded into "+N more".
fn split_overflow<'a>(events: &[&'a Event], max: usize) -> (Vec<&'a Event>, usize) {
    let shown: Vec<&Event> = events.iter().take(max).copied().collect();
    let hidden = events.len() - shown.len();
    (shown, hidden)
}

const CELL_WIDTH: usize = 14;
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Sunday-first month grid, one block per week.
pub fn render_month(
    reference: NaiveDate,
    cells: &[CalendarCell],
    calendar: &MonthlyCalendar,
    max_per_cell: usize,
    today: NaiveDate,
) -> String {
    let mut lines = vec![reference.format("%B %Y").to_string().bold().to_string()];
    let header: String = WEEKDAYS.iter().map(|d| fit(d, CELL_WIDTH)).collect();
    lines.push(header.dimmed().to_string());

    for week in cells.chunks(7) {
        let numbers: String = week
            .iter()
            .map(|cell| {
                let text = fit(&cell.date.format("%-d").to_string(), CELL_WIDTH);
                if cell.date == today {
                    text.reversed().to_string()
                } else if !cell.is_current_month {
                    text.dimmed().to_string()
                } else {
                    text
                }
            })
            .collect();
        lines.push(numbers);

        let columns: Vec<Vec<String>> = week
            .iter()
            .map(|cell| cell_lines(&calendar.events_on(cell.date), max_per_cell))
            .collect();
        let height = columns.iter().map(Vec::len).max().unwrap_or(0);

        for row in 0..height {
            let line: String = columns
                .iter()
                .map(|column| column.get(row).cloned().unwrap_or_else(|| " ".repeat(CELL_WIDTH)))
                .collect();
            lines.push(line);
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// The lines of one month cell, each exactly `CELL_WIDTH` visible columns.
fn cell_lines(events: &[&Event], max: usize) -> Vec<String> {
    let (shown, hidden) = split_overflow(events, max);

    let mut lines: Vec<String> = shown
        .iter()
        .map(|e| paint(&fit(&e.title, CELL_WIDTH - 1), &e.color, e.priority) + " ")
        .collect();
    if hidden > 0 {
        lines.push(fit(&format!("+{hidden} more"), CELL_WIDTH).dimmed().to_string());
    }
    lines
}

/// Per-day agenda for week and day views. Overlapping timed events are
/// indented by their column and tagged with it.
pub fn render_days(cells: &[CalendarCell], calendar: &MonthlyCalendar, today: NaiveDate) -> String {
    let mut lines = Vec::new();

    for cell in cells {
        let mut heading = cell.date.format("%a %b %-d").to_string();
        if cell.date == today {
            heading.push_str(" (today)");
        }
        lines.push(heading.bold().to_string());

        let events = calendar.events_on(cell.date);
        if events.is_empty() {
            lines.push(format!("  {}", "No events".dimmed()));
            lines.push(String::new());
            continue;
        }

        let (timed, all_day): (Vec<&Event>, Vec<&Event>) = events.into_iter().partition(|e| e.is_timed());
        for event in &all_day {
            lines.push(format!("  {}", event.render()));
        }

        for placement in layout_overlaps(&timed) {
            let Some(event) = timed.iter().find(|e| e.id == placement.event_id) else {
                continue;
            };
            let indent = "  ".repeat(placement.column);
            let mut line = format!("  {}{}", indent, event.render());
            if placement.columns > 1 {
                let lane = format!("[{}/{}]", placement.column + 1, placement.columns);
                line.push_str(&format!(" {}", lane.dimmed()));
            }
            lines.push(line);
        }
        lines.push(String::new());
    }

    lines.push("Times are UTC".dimmed().to_string());
    lines.join("\n")
}
