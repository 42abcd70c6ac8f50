//! Gantt timeline layout engine.
//!
//! Produces the shared day grid and per-task bar coordinates for the
//! project timeline. Every row is laid out against the same `minDate`, so
//! bars align under the correct day columns no matter how many tasks or
//! how wide the range.

use chrono::{Duration, NaiveDate};
use shared::{parse_iso_date, GanttLayout, GanttRow, Task};

/// Compute the day grid and bar placement for a task set.
///
/// Tasks are sorted by start date; ties keep their input order. A task
/// whose start date does not parse is excluded from the grid bounds and
/// from the rows; an unparseable end date falls back to the start date
/// (a one-day bar). An empty input yields an empty layout and the caller
/// renders a placeholder.
pub fn layout(tasks: &[Task]) -> GanttLayout {
    let mut dated: Vec<(Task, NaiveDate, NaiveDate)> = tasks
        .iter()
        .filter_map(|task| {
            let start = parse_iso_date(&task.start_date)?;
            let end = parse_iso_date(&task.end_date).unwrap_or(start);
            Some((task.clone(), start, end))
        })
        .collect();

    if dated.is_empty() {
        return GanttLayout::default();
    }

    dated.sort_by_key(|(_, start, _)| *start);

    let min_date = dated.iter().map(|(_, start, _)| *start).min().unwrap();
    let max_date = dated.iter().map(|(_, _, end)| *end).max().unwrap();
    let total_days = ((max_date - min_date).num_days() + 1).max(1);

    let days = (0..total_days)
        .map(|offset| min_date + Duration::days(offset))
        .collect();

    let rows = dated
        .into_iter()
        .map(|(task, start, end)| {
            let offset = (start - min_date).num_days().max(0) as usize;
            let duration = ((end - start).num_days() + 1).max(1) as usize;
            GanttRow {
                task,
                offset,
                duration,
            }
        })
        .collect();

    GanttLayout { days, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TaskStatus;

    fn task(id: &str, start: &str, end: &str) -> Task {
        Task {
            id: id.to_string(),
            project_id: "p1".to_string(),
            title: format!("Tarea {id}"),
            start_date: start.to_string(),
            end_date: end.to_string(),
            status: TaskStatus::Todo,
            progress: 0,
            assignee: None,
            notes: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn date(value: &str) -> NaiveDate {
        parse_iso_date(value).unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_layout() {
        let grid = layout(&[]);
        assert!(grid.is_empty());
        assert_eq!(grid.total_days(), 0);
    }

    #[test]
    fn test_three_day_task_spans_three_columns() {
        let grid = layout(&[task("t1", "2025-03-01", "2025-03-03")]);
        assert_eq!(grid.total_days(), 3);
        assert_eq!(grid.rows[0].offset, 0);
        assert_eq!(grid.rows[0].duration, 3);
    }

    #[test]
    fn test_single_day_task_never_zero_width() {
        let grid = layout(&[task("t1", "2025-03-01", "2025-03-01")]);
        assert_eq!(grid.total_days(), 1);
        assert_eq!(grid.rows[0].duration, 1);
    }

    #[test]
    fn test_rows_share_one_coordinate_system() {
        let grid = layout(&[
            task("late", "2025-03-10", "2025-03-12"),
            task("early", "2025-03-01", "2025-03-05"),
        ]);
        // 2025-03-01 .. 2025-03-12 inclusive.
        assert_eq!(grid.total_days(), 12);
        assert_eq!(grid.days[0], date("2025-03-01"));
        assert_eq!(grid.days[11], date("2025-03-12"));

        // Sorted by start date.
        assert_eq!(grid.rows[0].task.id, "early");
        assert_eq!(grid.rows[0].offset, 0);
        assert_eq!(grid.rows[0].duration, 5);
        assert_eq!(grid.rows[1].task.id, "late");
        assert_eq!(grid.rows[1].offset, 9);
        assert_eq!(grid.rows[1].duration, 3);
    }

    #[test]
    fn test_duration_unaffected_by_other_tasks() {
        let alone = layout(&[task("t1", "2025-03-05", "2025-03-07")]);
        let crowded = layout(&[
            task("t1", "2025-03-05", "2025-03-07"),
            task("t2", "2025-01-01", "2025-06-30"),
        ]);
        let find = |grid: &GanttLayout| {
            grid.rows
                .iter()
                .find(|row| row.task.id == "t1")
                .map(|row| row.duration)
                .unwrap()
        };
        assert_eq!(find(&alone), 3);
        assert_eq!(find(&crowded), 3);
    }

    #[test]
    fn test_identical_starts_keep_input_order() {
        let grid = layout(&[
            task("primera", "2025-03-01", "2025-03-02"),
            task("segunda", "2025-03-01", "2025-03-04"),
            task("tercera", "2025-03-01", "2025-03-01"),
        ]);
        let order: Vec<&str> = grid.rows.iter().map(|row| row.task.id.as_str()).collect();
        assert_eq!(order, ["primera", "segunda", "tercera"]);
    }

    #[test]
    fn test_total_days_matches_inclusive_span() {
        let grid = layout(&[
            task("t1", "2025-03-01", "2025-03-02"),
            task("t2", "2025-03-04", "2025-03-09"),
        ]);
        let span = (*grid.days.last().unwrap() - grid.days[0]).num_days() + 1;
        assert_eq!(grid.total_days() as i64, span);
        assert!(grid.total_days() >= 1);
    }

    #[test]
    fn test_unparseable_start_excluded_from_bounds_and_rows() {
        let grid = layout(&[
            task("ok", "2025-03-01", "2025-03-02"),
            task("broken", "proximamente", "2025-05-01"),
        ]);
        assert_eq!(grid.rows.len(), 1);
        assert_eq!(grid.total_days(), 2);
    }

    #[test]
    fn test_unparseable_end_falls_back_to_start() {
        let grid = layout(&[task("t1", "2025-03-01", "")]);
        assert_eq!(grid.rows[0].duration, 1);
        assert_eq!(grid.total_days(), 1);
    }

    #[test]
    fn test_inverted_range_floors_duration_at_one() {
        // The data layer does not enforce end >= start; the grid still has
        // to produce a drawable bar.
        let grid = layout(&[task("t1", "2025-03-10", "2025-03-01")]);
        assert_eq!(grid.rows[0].duration, 1);
        assert_eq!(grid.total_days(), 1);
    }
}
