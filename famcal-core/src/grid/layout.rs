//! Side-by-side placement of overlapping timed events within one day.

use chrono::{DateTime, Utc};

use crate::event::Event;

/// Where an event sits in its day column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub event_id: i64,
    /// Zero-based column inside the overlap cluster
    pub column: usize,
    /// Number of columns the cluster needs
    pub columns: usize,
}

/// Assign columns to the timed events of a day.
///
/// Events are taken in start order; each goes into the first column whose
/// last event has ended, or opens a new one. A cluster closes when an
/// event starts after every event in it has ended. All-day events are
/// skipped. Placements come back in start order.
pub fn layout_overlaps(events: &[&Event]) -> Vec<Placement> {
    let mut timed: Vec<(DateTime<Utc>, DateTime<Utc>, i64)> = events
        .iter()
        .filter(|e| e.is_timed())
        .map(|e| {
            let (start, end) = e.time_span();
            (start, end, e.id)
        })
        .collect();
    timed.sort();

    let mut placements = Vec::with_capacity(timed.len());
    let mut cluster_start = 0;
    let mut column_ends: Vec<DateTime<Utc>> = Vec::new();
    let mut cluster_end: Option<DateTime<Utc>> = None;

    for (start, end, event_id) in timed {
        if cluster_end.is_some_and(|ce| start >= ce) {
            close_cluster(&mut placements[cluster_start..], column_ends.len());
            cluster_start = placements.len();
            column_ends.clear();
        }

        let column = match column_ends.iter().position(|&col_end| col_end <= start) {
            Some(free) => {
                column_ends[free] = end;
                free
            }
            None => {
                column_ends.push(end);
                column_ends.len() - 1
            }
        };

        cluster_end = Some(cluster_end.map_or(end, |ce| ce.max(end)));
        placements.push(Placement {
            event_id,
            column,
            columns: 0,
        });
    }

    close_cluster(&mut placements[cluster_start..], column_ends.len());
    placements
}

fn close_cluster(cluster: &mut [Placement], columns: usize) {
    for p in cluster {
        p.columns = columns;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, EventType, Priority};

    fn timed(id: i64, start: &str, end: &str) -> Event {
        Event {
            id,
            title: format!("event {id}"),
            description: None,
            start_date: EventTime::parse(start).unwrap(),
            end_date: Some(EventTime::parse(end).unwrap()),
            is_all_day: false,
            kind: EventType::Activity,
            priority: Priority::Low,
            color: String::new(),
            child_id: None,
            children: vec![],
            has_reminder: false,
            reminder_minutes: None,
        }
    }

    #[test]
    fn non_overlapping_events_get_full_width() {
        let a = timed(1, "2025-03-05T09:00:00Z", "2025-03-05T10:00:00Z");
        let b = timed(2, "2025-03-05T10:00:00Z", "2025-03-05T11:00:00Z");

        let placements = layout_overlaps(&[&a, &b]);
        assert!(placements.iter().all(|p| p.column == 0 && p.columns == 1));
    }

    #[test]
    fn overlapping_events_share_a_cluster() {
        let a = timed(1, "2025-03-05T09:00:00Z", "2025-03-05T11:00:00Z");
        let b = timed(2, "2025-03-05T09:30:00Z", "2025-03-05T10:00:00Z");
        // reuses b's column once b has ended
        let c = timed(3, "2025-03-05T10:00:00Z", "2025-03-05T10:30:00Z");
        // after the cluster ends
        let d = timed(4, "2025-03-05T12:00:00Z", "2025-03-05T13:00:00Z");

        let placements = layout_overlaps(&[&d, &c, &b, &a]);

        assert_eq!(
            placements,
            vec![
                Placement { event_id: 1, column: 0, columns: 2 },
                Placement { event_id: 2, column: 1, columns: 2 },
                Placement { event_id: 3, column: 1, columns: 2 },
                Placement { event_id: 4, column: 0, columns: 1 },
            ]
        );
    }

    #[test]
    fn all_day_events_are_skipped() {
        let mut all_day = timed(1, "2025-03-05T00:00:00Z", "2025-03-06T00:00:00Z");
        all_day.is_all_day = true;
        let a = timed(2, "2025-03-05T09:00:00Z", "2025-03-05T10:00:00Z");

        let placements = layout_overlaps(&[&all_day, &a]);
        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].event_id, 2);
    }
}
