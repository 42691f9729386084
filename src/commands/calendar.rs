use anyhow::{Context as _, Result};
use chrono::{NaiveDate, Utc};
use famcal_client::ChildFilter;
use famcal_core::CoreResult;
use famcal_core::date::parse_day;
use famcal_core::grid::{Direction, ViewMode, compute_grid_cells, navigate, week_start};
use owo_colors::OwoColorize;

use crate::commands::{Context, pluralize};
use crate::render::{render_days, render_month};
use crate::utils::tui;

pub async fn run(
    ctx: &Context,
    view: ViewMode,
    date: Option<&str>,
    child: ChildFilter,
    shift: i32,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let start = match date {
        Some(d) => parse_day(d)?,
        None => today,
    };
    let reference = shifted(start, view, shift)?;

    let client = ctx.client()?;
    let calendar = tui::with_spinner("Loading calendar", client.calendar_view(reference, view, child))
        .await
        .with_context(|| format!("Failed to load the {view} of {reference}"))?;

    let cells = compute_grid_cells(reference, view);
    tracing::debug!(
        %reference,
        cells = cells.len(),
        events = calendar.events.len(),
        days = calendar.events_by_date.len(),
        "rendering calendar"
    );

    let body = match view {
        ViewMode::Month => render_month(reference, &cells, &calendar, ctx.config.max_events_per_cell, today),
        ViewMode::Week => {
            let heading = format!("Week of {}", week_start(reference).format("%b %-d, %Y"));
            format!("{}\n\n{}", heading.bold(), render_days(&cells, &calendar, today))
        }
        ViewMode::Day => render_days(&cells, &calendar, today),
    };
    println!("{body}");

    let total = cells.iter().map(|c| calendar.events_on(c.date).len()).sum::<usize>();
    let scope = match child {
        ChildFilter::All => "everyone".to_string(),
        ChildFilter::Mine => "your own events".to_string(),
        ChildFilter::Child(id) => format!("child #{id}"),
    };
    println!("{}", format!("{} for {}", pluralize(total, "event"), scope).dimmed());

    Ok(())
}

/// `start` moved `shift` view units; negative goes back.
fn shifted(start: NaiveDate, view: ViewMode, shift: i32) -> CoreResult<NaiveDate> {
    let direction = if shift < 0 { Direction::Previous } else { Direction::Next };
    (0..shift.unsigned_abs()).try_fold(start, |date, _| navigate(date, view, direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn zero_shift_keeps_the_date() {
        assert_eq!(shifted(day(2025, 3, 5), ViewMode::Month, 0).unwrap(), day(2025, 3, 5));
    }

    #[test]
    fn shifts_by_view_unit() {
        assert_eq!(shifted(day(2025, 3, 5), ViewMode::Week, 2).unwrap(), day(2025, 3, 19));
        assert_eq!(shifted(day(2025, 3, 5), ViewMode::Day, -5).unwrap(), day(2025, 2, 28));
        assert_eq!(shifted(day(2025, 1, 31), ViewMode::Month, 1).unwrap(), day(2025, 2, 28));
        assert_eq!(shifted(day(2025, 1, 15), ViewMode::Month, -1).unwrap(), day(2024, 12, 15));
    }

    #[test]
    fn shifting_past_the_calendar_range_fails() {
        assert!(shifted(NaiveDate::MAX, ViewMode::Day, 1).is_err());
    }
}
