//! Task metric aggregation.
//!
//! Pure summaries over an immutable task snapshot: per-status counts for
//! the kanban column headers and schedule-health indicators for the gantt
//! and dashboard views.

use chrono::NaiveDate;
use shared::{parse_iso_date, ScheduleHealth, StatusCounts, Task, TaskMetrics, TaskStatus, UpcomingDelivery};

/// Maximum upcoming deliveries surfaced on the dashboard.
const UPCOMING_LIMIT: usize = 10;

/// Count tasks per status. Every status is present in the result even when
/// its count is zero, so consumers render one card per column.
pub fn aggregate(tasks: &[Task]) -> TaskMetrics {
    let mut by_status = StatusCounts::default();
    for task in tasks {
        by_status.increment(task.status);
    }
    TaskMetrics {
        total: tasks.len(),
        completed: by_status.get(TaskStatus::Done),
        by_status,
    }
}

/// Schedule indicators relative to `today`.
///
/// A task is overdue when it is pending and its end date has passed. Tasks
/// whose end date does not parse are excluded from the overdue/upcoming
/// buckets rather than failing; this runs on every render.
pub fn schedule_health(tasks: &[Task], today: NaiveDate) -> ScheduleHealth {
    let pending: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.status != TaskStatus::Done)
        .collect();

    let overdue = pending
        .iter()
        .filter(|task| parse_iso_date(&task.end_date).map_or(false, |end| end < today))
        .count();

    let mut upcoming: Vec<(&&Task, NaiveDate)> = pending
        .iter()
        .filter_map(|task| {
            parse_iso_date(&task.end_date)
                .filter(|end| *end >= today)
                .map(|end| (task, end))
        })
        .collect();
    upcoming.sort_by_key(|(_, end)| *end);
    let upcoming = upcoming
        .into_iter()
        .take(UPCOMING_LIMIT)
        .map(|(task, _)| UpcomingDelivery {
            task_id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            end_date: task.end_date.clone(),
        })
        .collect();

    let average_progress = if tasks.is_empty() {
        0.0
    } else {
        let sum: u32 = tasks.iter().map(|task| u32::from(task.progress)).sum();
        let mean = f64::from(sum) / tasks.len() as f64;
        (mean * 10.0).round() / 10.0
    };

    ScheduleHealth {
        pending: pending.len(),
        overdue,
        upcoming,
        average_progress,
    }
}
