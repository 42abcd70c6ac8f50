//! Calendar event projection.
//!
//! Maps tasks and projects onto the event descriptors the calendar widget
//! consumes. The widget treats `end` as an exclusive boundary, so task
//! events get a +1 day adjustment here at the boundary; stored dates are
//! never touched.

use chrono::Duration;
use shared::{parse_iso_date, CalendarEvent, EventTone, Project, Task, TaskStatus};

use super::dashboard::ActiveProjectFilter;

/// Tone of a task event, keyed on workflow status.
pub fn status_tone(status: TaskStatus) -> EventTone {
    match status {
        TaskStatus::Done => EventTone::Success,
        TaskStatus::Doing => EventTone::Info,
        TaskStatus::Blocked => EventTone::Warning,
        TaskStatus::Todo => EventTone::Neutral,
    }
}

/// Project tasks onto calendar events.
///
/// Tasks without a parseable start date are skipped; an unparseable end
/// date falls back to the start (a one-day event).
pub fn project_task_events(tasks: &[Task]) -> Vec<CalendarEvent> {
    tasks
        .iter()
        .filter_map(|task| {
            let start = parse_iso_date(&task.start_date)?;
            let end = parse_iso_date(&task.end_date).unwrap_or(start);
            let end_exclusive = end + Duration::days(1);
            Some(CalendarEvent {
                id: task.id.clone(),
                title: task.title.clone(),
                start: start.format("%Y-%m-%d").to_string(),
                end: end_exclusive.format("%Y-%m-%d").to_string(),
                tone: status_tone(task.status),
            })
        })
        .collect()
}

/// One all-day event per active project with a parseable start date, for
/// the portfolio calendar. The end falls back to the start when the
/// project has no end date or it does not parse.
pub fn project_schedule_events(
    projects: &[Project],
    filter: &ActiveProjectFilter,
) -> Vec<CalendarEvent> {
    projects
        .iter()
        .filter(|project| filter.is_active(project))
        .filter_map(|project| {
            let start = parse_iso_date(project.start_date.as_deref()?)?;
            let end = project
                .end_date
                .as_deref()
                .and_then(parse_iso_date)
                .unwrap_or(start);
            Some(CalendarEvent {
                id: project.id.clone(),
                title: project.name.clone(),
                start: start.format("%Y-%m-%d").to_string(),
                end: end.format("%Y-%m-%d").to_string(),
                tone: EventTone::Info,
            })
        })
        .collect()
}
