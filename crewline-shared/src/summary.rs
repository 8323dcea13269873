/// Task aggregation
///
/// Splits a task list into completed and incomplete partitions and computes
/// the completion rate. Used for both the per-user view (tasks assigned to a
/// user) and the per-team view (a team's whole task list); the caller decides
/// the scope, this module only aggregates.
///
/// The rate is recomputed from the task set on every call; it is never stored
/// or cached, so it cannot drift from the underlying data.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::task::Task;

/// A task list split by completion, with the overall completion rate
#[derive(Debug, Clone, Serialize)]
pub struct TaskBreakdown {
    /// Completed tasks, most recently due first (undated last)
    pub completed: Vec<Task>,

    /// Incomplete tasks, soonest due first (undated last)
    pub incomplete: Vec<Task>,

    /// completed / total as a percentage, rounded to 2 decimal places;
    /// 0 when there are no tasks
    pub completion_rate: f64,
}

/// Computes the completion rate as a percentage rounded to 2 decimal places
///
/// Returns 0 when there are no tasks at all.
pub fn completion_rate(completed: usize, incomplete: usize) -> f64 {
    let total = completed + incomplete;
    if total == 0 {
        return 0.0;
    }

    let rate = completed as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// Partitions tasks by completion and computes the rate
///
/// Deterministic for a given task set: ties on due date keep the input order
/// (stable sort).
pub fn breakdown(tasks: Vec<Task>) -> TaskBreakdown {
    let (mut completed, mut incomplete): (Vec<Task>, Vec<Task>) =
        tasks.into_iter().partition(|t| t.completed);

    completed.sort_by(|a, b| cmp_due_date_desc(&a.due_date, &b.due_date));
    incomplete.sort_by(|a, b| cmp_due_date_asc(&a.due_date, &b.due_date));

    let rate = completion_rate(completed.len(), incomplete.len());

    TaskBreakdown {
        completed,
        incomplete,
        completion_rate: rate,
    }
}

/// Ascending by due date, tasks without a due date last
fn cmp_due_date_asc(a: &Option<NaiveDate>, b: &Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending by due date, tasks without a due date still last
fn cmp_due_date_desc(a: &Option<NaiveDate>, b: &Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn task(completed: bool, due_date: Option<NaiveDate>) -> Task {
        Task {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            title: "t".to_string(),
            description: None,
            completed,
            due_date,
            assigned_to: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_completion_rate_zero_tasks() {
        assert_eq!(completion_rate(0, 0), 0.0);
    }

    #[test]
    fn test_completion_rate_three_of_four() {
        assert_eq!(completion_rate(3, 1), 75.0);
    }

    #[test]
    fn test_completion_rate_rounds_to_two_decimals() {
        // 1/3 = 33.333... -> 33.33
        assert_eq!(completion_rate(1, 2), 33.33);
        // 2/3 = 66.666... -> 66.67
        assert_eq!(completion_rate(2, 1), 66.67);
    }

    #[test]
    fn test_completion_rate_all_completed() {
        assert_eq!(completion_rate(5, 0), 100.0);
    }

    #[test]
    fn test_breakdown_partitions() {
        let tasks = vec![
            task(true, None),
            task(false, None),
            task(true, Some(date(2025, 7, 1))),
            task(false, Some(date(2025, 7, 2))),
        ];

        let summary = breakdown(tasks);

        assert_eq!(summary.completed.len(), 2);
        assert_eq!(summary.incomplete.len(), 2);
        assert_eq!(summary.completion_rate, 50.0);
    }

    #[test]
    fn test_breakdown_incomplete_sorted_ascending_nulls_last() {
        let tasks = vec![
            task(false, None),
            task(false, Some(date(2025, 8, 20))),
            task(false, Some(date(2025, 8, 5))),
        ];

        let summary = breakdown(tasks);
        let dates: Vec<Option<NaiveDate>> =
            summary.incomplete.iter().map(|t| t.due_date).collect();

        assert_eq!(
            dates,
            vec![Some(date(2025, 8, 5)), Some(date(2025, 8, 20)), None]
        );
    }

    #[test]
    fn test_breakdown_completed_sorted_descending_nulls_last() {
        let tasks = vec![
            task(true, Some(date(2025, 8, 5))),
            task(true, None),
            task(true, Some(date(2025, 8, 20))),
        ];

        let summary = breakdown(tasks);
        let dates: Vec<Option<NaiveDate>> = summary.completed.iter().map(|t| t.due_date).collect();

        assert_eq!(
            dates,
            vec![Some(date(2025, 8, 20)), Some(date(2025, 8, 5)), None]
        );
    }

    #[test]
    fn test_breakdown_empty() {
        let summary = breakdown(vec![]);
        assert!(summary.completed.is_empty());
        assert!(summary.incomplete.is_empty());
        assert_eq!(summary.completion_rate, 0.0);
    }

    #[test]
    fn test_breakdown_deterministic() {
        let tasks: Vec<Task> = (0u32..10)
            .map(|i| task(i % 2 == 0, Some(date(2025, 8, (i % 5) + 1))))
            .collect();

        let a = breakdown(tasks.clone());
        let b = breakdown(tasks);

        assert_eq!(a.completion_rate, b.completion_rate);
        let ids_a: Vec<Uuid> = a.completed.iter().map(|t| t.id).collect();
        let ids_b: Vec<Uuid> = b.completed.iter().map(|t| t.id).collect();
        assert_eq!(ids_a, ids_b);
    }
}
