//! Calendar grid engine.
//!
//! Turns a reference date and a view mode into the cells to draw, and
//! answers "which events belong on this cell". All arithmetic is done on
//! naive calendar dates in the UTC frame.

mod index;
mod layout;

pub use index::{EventsByDate, events_for_date};
pub use layout::{Placement, layout_overlaps};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
    Day,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Month => "month",
            ViewMode::Week => "week",
            ViewMode::Day => "day",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(ViewMode::Month),
            "week" => Ok(ViewMode::Week),
            "day" => Ok(ViewMode::Day),
            _ => Err(CoreError::UnknownVariant {
                kind: "view",
                value: s.to_string(),
                expected: "month, week, day".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// One cell of the rendered grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub is_current_month: bool,
}

/// Cells for the view containing `reference`.
///
/// - Month: leading days of the previous month back to Sunday, then every
///   day of the month. The tail is not padded, so the grid height varies.
/// - Week: the seven days starting on the Sunday on or before `reference`.
/// - Day: `reference` alone.
pub fn compute_grid_cells(reference: NaiveDate, mode: ViewMode) -> Vec<CalendarCell> {
    let cells = match mode {
        ViewMode::Month => month_cells(reference),
        ViewMode::Week => week_cells(reference),
        ViewMode::Day => vec![CalendarCell {
            date: reference,
            is_current_month: true,
        }],
    };

    tracing::debug!(%reference, %mode, cells = cells.len(), "computed grid");
    cells
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day0 never reaches past the first of the month
    date - Days::new(u64::from(date.day0()))
}

fn month_cells(reference: NaiveDate) -> Vec<CalendarCell> {
    let first = first_of_month(reference);
    let lead = u64::from(first.weekday().num_days_from_sunday());

    let leading = (1..=lead).rev().filter_map(|n| first.checked_sub_days(Days::new(n)));
    let month_days = first
        .iter_days()
        .take_while(|d| d.month() == first.month());

    leading
        .map(|date| CalendarCell {
            date,
            is_current_month: false,
        })
        .chain(month_days.map(|date| CalendarCell {
            date,
            is_current_month: true,
        }))
        .collect()
}

fn week_cells(reference: NaiveDate) -> Vec<CalendarCell> {
    let sunday = week_start(reference);

    sunday
        .iter_days()
        .take(7)
        .map(|date| CalendarCell {
            date,
            is_current_month: date.month() == reference.month() && date.year() == reference.year(),
        })
        .collect()
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Move `reference` one view unit forwards or backwards.
///
/// Month moves keep the day of month, clamped to the target month's length.
pub fn navigate(reference: NaiveDate, mode: ViewMode, direction: Direction) -> CoreResult<NaiveDate> {
    let moved = match (mode, direction) {
        (ViewMode::Month, Direction::Next) => reference.checked_add_months(Months::new(1)),
        (ViewMode::Month, Direction::Previous) => reference.checked_sub_months(Months::new(1)),
        (ViewMode::Week, Direction::Next) => reference.checked_add_days(Days::new(7)),
        (ViewMode::Week, Direction::Previous) => reference.checked_sub_days(Days::new(7)),
        (ViewMode::Day, Direction::Next) => reference.checked_add_days(Days::new(1)),
        (ViewMode::Day, Direction::Previous) => reference.checked_sub_days(Days::new(1)),
    };

    moved.ok_or(CoreError::DateOutOfRange(reference))
}

/// `(year, month)` pairs whose monthly data a view needs, oldest first.
///
/// A month grid shows trailing days of the previous month and a week can
/// straddle two months, so this can return more than one entry.
pub fn fetch_months(reference: NaiveDate, mode: ViewMode) -> Vec<(i32, u32)> {
    let mut months: Vec<(i32, u32)> = Vec::new();

    for cell in compute_grid_cells(reference, mode) {
        let key = (cell.date.year(), cell.date.month());
        if months.last() != Some(&key) {
            months.push(key);
        }
    }

    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_grid_backfills_to_sunday() {
        // 2025-03-01 is a Saturday
        let cells = compute_grid_cells(date(2025, 3, 1), ViewMode::Month);

        let first = cells.first().unwrap();
        assert_eq!(first.date, date(2025, 2, 23));
        assert!(!first.is_current_month);

        let last = cells.last().unwrap();
        assert_eq!(last.date, date(2025, 3, 31));
        assert!(last.is_current_month);

        assert_eq!(cells.len(), 6 + 31);
    }

    #[test]
    fn month_grid_properties_hold_across_years() {
        let mut reference = date(2023, 1, 17);
        for _ in 0..36 {
            let cells = compute_grid_cells(reference, ViewMode::Month);

            assert_eq!(cells[0].date.weekday(), Weekday::Sun);
            for pair in cells.windows(2) {
                assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
            }

            let current: Vec<_> = cells.iter().filter(|c| c.is_current_month).collect();
            assert_eq!(current[0].date.day(), 1);
            assert!(current.iter().all(|c| c.date.month() == reference.month()));
            assert_eq!(
                current.len() as u32,
                current.last().unwrap().date.day(),
                "every day of the month exactly once"
            );
            assert!(cells
                .iter()
                .filter(|c| !c.is_current_month)
                .all(|c| c.date < current[0].date));

            reference = navigate(reference, ViewMode::Month, Direction::Next).unwrap();
        }
    }

    #[test]
    fn month_starting_on_sunday_has_no_padding() {
        // 2025-06-01 is a Sunday
        let cells = compute_grid_cells(date(2025, 6, 18), ViewMode::Month);
        assert_eq!(cells[0].date, date(2025, 6, 1));
        assert!(cells.iter().all(|c| c.is_current_month));
        assert_eq!(cells.len(), 30);
    }

    #[test]
    fn leap_february() {
        let cells = compute_grid_cells(date(2024, 2, 10), ViewMode::Month);
        assert_eq!(cells.last().unwrap().date, date(2024, 2, 29));
    }

    #[test]
    fn week_grid_is_seven_days_from_sunday() {
        for day in 1..=31 {
            let reference = date(2025, 3, day);
            let cells = compute_grid_cells(reference, ViewMode::Week);

            assert_eq!(cells.len(), 7);
            assert_eq!(cells[0].date.weekday(), Weekday::Sun);
            assert!(cells[0].date <= reference);
            assert!(cells.iter().any(|c| c.date == reference));
        }
    }

    #[test]
    fn week_straddling_months_marks_other_month() {
        let cells = compute_grid_cells(date(2025, 3, 1), ViewMode::Week);
        assert_eq!(cells[0].date, date(2025, 2, 23));
        assert!(!cells[0].is_current_month);
        assert!(cells[6].is_current_month);
    }

    #[test]
    fn day_grid_is_single_cell() {
        let cells = compute_grid_cells(date(2025, 3, 5), ViewMode::Day);
        assert_eq!(
            cells,
            vec![CalendarCell {
                date: date(2025, 3, 5),
                is_current_month: true
            }]
        );
    }

    #[test]
    fn navigate_steps_by_view_unit() {
        let d = date(2025, 3, 15);
        assert_eq!(navigate(d, ViewMode::Month, Direction::Next).unwrap(), date(2025, 4, 15));
        assert_eq!(navigate(d, ViewMode::Week, Direction::Previous).unwrap(), date(2025, 3, 8));
        assert_eq!(navigate(d, ViewMode::Day, Direction::Next).unwrap(), date(2025, 3, 16));
        assert_eq!(
            navigate(date(2025, 1, 15), ViewMode::Month, Direction::Previous).unwrap(),
            date(2024, 12, 15)
        );
    }

    #[test]
    fn navigate_is_its_own_inverse() {
        let modes = [ViewMode::Month, ViewMode::Week, ViewMode::Day];
        let mut d = date(2023, 12, 1);
        while d < date(2025, 3, 1) {
            for mode in modes {
                let there = navigate(d, mode, Direction::Next).unwrap();
                let back = navigate(there, mode, Direction::Previous).unwrap();
                if mode == ViewMode::Month && d.day() > 28 {
                    // month-length clamping may shorten the day
                    assert!(back.day() <= d.day());
                    assert_eq!(back.month(), d.month());
                } else {
                    assert_eq!(back, d, "{mode} from {d}");
                }
            }
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn navigate_clamps_month_end() {
        let there = navigate(date(2025, 1, 31), ViewMode::Month, Direction::Next).unwrap();
        assert_eq!(there, date(2025, 2, 28));
        let leap = navigate(date(2024, 1, 31), ViewMode::Month, Direction::Next).unwrap();
        assert_eq!(leap, date(2024, 2, 29));
    }

    #[test]
    fn navigate_past_range_is_an_error() {
        assert!(matches!(
            navigate(NaiveDate::MAX, ViewMode::Day, Direction::Next),
            Err(CoreError::DateOutOfRange(_))
        ));
    }

    #[test]
    fn fetch_months_covers_padding() {
        assert_eq!(fetch_months(date(2025, 3, 1), ViewMode::Month), vec![(2025, 2), (2025, 3)]);
        assert_eq!(fetch_months(date(2025, 6, 1), ViewMode::Month), vec![(2025, 6)]);
        assert_eq!(fetch_months(date(2025, 1, 1), ViewMode::Week), vec![(2024, 12), (2025, 1)]);
        assert_eq!(fetch_months(date(2025, 1, 1), ViewMode::Day), vec![(2025, 1)]);
    }

    #[test]
    fn parses_view_names() {
        assert_eq!("Week".parse::<ViewMode>().unwrap(), ViewMode::Week);
        assert!("year".parse::<ViewMode>().is_err());
    }
}
