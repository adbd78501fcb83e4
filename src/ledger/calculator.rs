//! Streak and point derivations over the completion history.
//!
//! All functions take the habit's completions sorted chronologically
//! (`completed_at`, ties by `created_at`), which is how the ledger returns
//! them.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::domain::{day_key, days_between};
use crate::store::Completion;

/// Safety bound for the backward streak walk.
const MAX_STREAK_LOOKBACK_DAYS: usize = 1000;

/// Aggregates derived from a full ledger scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateTotals {
    pub current_streak: i32,
    pub max_streak: i32,
    pub total_points: i32,
}

fn completions_on_day(completions: &[Completion], day: NaiveDate) -> usize {
    completions
        .iter()
        .filter(|c| day_key(c.completed_at) == day)
        .count()
}

pub(crate) fn day_has_plaster(completions: &[Completion], day: NaiveDate) -> bool {
    completions
        .iter()
        .any(|c| c.is_missed_completion && day_key(c.completed_at) == day)
}

/// Whether a day counts toward streak continuity. A day qualifies once it
/// holds at least `goal_count` records; a plastered day qualifies
/// regardless of the goal count (that is what the plaster buys).
pub(crate) fn day_qualifies(completions: &[Completion], day: NaiveDate, goal_count: i32) -> bool {
    let goal = goal_count.max(1) as usize;
    completions_on_day(completions, day) >= goal || day_has_plaster(completions, day)
}

/// Walk backward from `as_of_day` through consecutive qualifying days and
/// return the earliest day of the unbroken run. `as_of_day` itself is the
/// prospective head of the run (the caller evaluates this while the day's
/// goal is being met), so the walk starts at the day before it. If the
/// lookback bound exhausts recorded history, the first completion's day is
/// returned.
pub fn find_streak_start(
    completions: &[Completion],
    as_of_day: NaiveDate,
    goal_count: i32,
) -> NaiveDate {
    let mut start = as_of_day;

    for _ in 0..MAX_STREAK_LOOKBACK_DAYS {
        let prev = start - Duration::days(1);
        if !day_qualifies(completions, prev, goal_count) {
            return start;
        }
        start = prev;
    }

    completions
        .first()
        .map(|c| day_key(c.completed_at))
        .unwrap_or(start)
}

/// The most recent plaster record on or after `since_day`, if any.
pub fn find_last_plaster_since(
    completions: &[Completion],
    since_day: NaiveDate,
) -> Option<&Completion> {
    completions
        .iter()
        .rev()
        .find(|c| c.is_missed_completion && day_key(c.completed_at) >= since_day)
}

/// Point value of the completion that meets the day's goal.
///
/// Longer unbroken goal-meeting runs earn proportionally more, but the
/// reward clock restarts at the most recent plaster: the streak survives a
/// plaster, the point value does not.
pub fn points_for_goal_meeting_completion(
    completions: &[Completion],
    at: DateTime<Utc>,
    goal_count: i32,
) -> i32 {
    let day = day_key(at);
    let start = find_streak_start(completions, day, goal_count);

    let value = match find_last_plaster_since(completions, start) {
        Some(plaster) => days_between(day, day_key(plaster.completed_at)),
        // Inclusive day count of the run: day 2 of a streak is worth 2.
        None => days_between(day, start) + 1,
    };

    value.max(1) as i32
}

/// Re-derive all aggregates from scratch by scanning the full history in
/// chronological order. A day gap of exactly 1 extends the streak, a gap
/// of 0 (another record on the same day) leaves it unchanged, anything
/// else resets it to 1. `max_streak` never decreases below its previous
/// persisted value.
pub fn recompute_aggregates(completions: &[Completion], previous_max_streak: i32) -> AggregateTotals {
    let Some(first) = completions.first() else {
        return AggregateTotals {
            current_streak: 0,
            max_streak: previous_max_streak,
            total_points: 0,
        };
    };

    let mut current_streak = 1;
    let mut max_streak = previous_max_streak.max(1);
    let mut total_points = first.points;
    let mut prev_day = day_key(first.completed_at);

    for completion in &completions[1..] {
        let day = day_key(completion.completed_at);
        match days_between(day, prev_day) {
            0 => {}
            1 => current_streak += 1,
            _ => current_streak = 1,
        }
        max_streak = max_streak.max(current_streak);
        total_points += completion.points;
        prev_day = day;
    }

    AggregateTotals {
        current_streak,
        max_streak,
        total_points,
    }
}

/// Forward-looking preview of what the next completion would be worth:
/// 0 once today's goal is already met, otherwise the goal-meeting value
/// evaluated as of now. Not a committed value.
pub fn next_completion_points(
    completions: &[Completion],
    goal_count: i32,
    completions_today: i32,
    now: DateTime<Utc>,
) -> i32 {
    if completions_today >= goal_count.max(1) {
        return 0;
    }
    points_for_goal_meeting_completion(completions, now, goal_count)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_empty_history_recomputes_to_zero() {
        let totals = recompute_aggregates(&[], 5);
        assert_eq!(
            totals,
            AggregateTotals {
                current_streak: 0,
                max_streak: 5,
                total_points: 0
            }
        );
    }

    #[test]
    fn test_recompute_consecutive_days() {
        let history = vec![
            completion_on(day((2024, 1, 1)), 1),
            completion_on(day((2024, 1, 2)), 2),
            completion_on(day((2024, 1, 3)), 3),
        ];

        let totals = recompute_aggregates(&history, 0);
        assert_eq!(totals.current_streak, 3);
        assert_eq!(totals.max_streak, 3);
        assert_eq!(totals.total_points, 6);
    }

    #[test]
    fn test_recompute_resets_on_gap() {
        let history = vec![
            completion_on(day((2024, 1, 1)), 1),
            completion_on(day((2024, 1, 2)), 2),
            // day 3 skipped
            completion_on(day((2024, 1, 4)), 1),
        ];

        let totals = recompute_aggregates(&history, 0);
        assert_eq!(totals.current_streak, 1);
        assert_eq!(totals.max_streak, 2);
        assert_eq!(totals.total_points, 4);
    }

    #[test]
    fn test_recompute_same_day_records_keep_streak() {
        let history = vec![
            completion_on(day((2024, 1, 1)), 0),
            completion_on(day((2024, 1, 2)), 0),
            completion_on(day((2024, 1, 2)), 2),
            completion_on(day((2024, 1, 3)), 0),
        ];

        let totals = recompute_aggregates(&history, 0);
        assert_eq!(totals.current_streak, 3);
        assert_eq!(totals.total_points, 2);
    }

    #[test]
    fn test_recompute_max_streak_is_monotonic() {
        let history = vec![completion_on(day((2024, 1, 1)), 1)];

        let totals = recompute_aggregates(&history, 9);
        assert_eq!(totals.current_streak, 1);
        assert_eq!(totals.max_streak, 9);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let history = vec![
            completion_on(day((2024, 1, 1)), 1),
            plaster_on(day((2024, 1, 2))),
            completion_on(day((2024, 1, 3)), 1),
        ];

        let first = recompute_aggregates(&history, 2);
        let second = recompute_aggregates(&history, first.max_streak);
        assert_eq!(first, second);
    }

    #[test]
    fn test_streak_start_with_no_history() {
        let today = day((2024, 3, 10));
        assert_eq!(find_streak_start(&[], today, 1), today);
    }

    #[test]
    fn test_streak_start_walks_back_through_qualifying_days() {
        let history = vec![
            completion_on(day((2024, 3, 7)), 1),
            completion_on(day((2024, 3, 8)), 1),
            completion_on(day((2024, 3, 9)), 1),
        ];

        assert_eq!(
            find_streak_start(&history, day((2024, 3, 10)), 1),
            day((2024, 3, 7))
        );
    }

    #[test]
    fn test_streak_start_stops_at_gap() {
        let history = vec![
            completion_on(day((2024, 3, 5)), 1),
            // March 6 missing
            completion_on(day((2024, 3, 7)), 1),
        ];

        assert_eq!(
            find_streak_start(&history, day((2024, 3, 8)), 1),
            day((2024, 3, 7))
        );
    }

    #[test]
    fn test_streak_start_respects_goal_count() {
        // With a goal of 2 per day, a single-completion day breaks the run.
        let history = vec![
            completion_on(day((2024, 3, 8)), 0),
            completion_on(day((2024, 3, 8)), 1),
            completion_on(day((2024, 3, 9)), 0),
        ];

        assert_eq!(
            find_streak_start(&history, day((2024, 3, 10)), 2),
            day((2024, 3, 10))
        );
        assert_eq!(
            find_streak_start(&history, day((2024, 3, 9)), 2),
            day((2024, 3, 8))
        );
    }

    #[test]
    fn test_plastered_day_qualifies_regardless_of_goal() {
        let history = vec![
            completion_on(day((2024, 3, 8)), 0),
            completion_on(day((2024, 3, 8)), 1),
            plaster_on(day((2024, 3, 9))),
        ];

        assert_eq!(
            find_streak_start(&history, day((2024, 3, 10)), 2),
            day((2024, 3, 8))
        );
    }

    #[test]
    fn test_find_last_plaster_since() {
        let history = vec![
            plaster_on(day((2024, 3, 1))),
            completion_on(day((2024, 3, 2)), 1),
            plaster_on(day((2024, 3, 4))),
            completion_on(day((2024, 3, 5)), 1),
        ];

        let found = find_last_plaster_since(&history, day((2024, 3, 1))).unwrap();
        assert_eq!(day_key(found.completed_at), day((2024, 3, 4)));

        assert!(find_last_plaster_since(&history, day((2024, 3, 5))).is_none());
    }

    #[test]
    fn test_first_completion_of_fresh_habit_is_worth_one() {
        let at = at_noon(day((2024, 1, 1)));
        assert_eq!(points_for_goal_meeting_completion(&[], at, 1), 1);
    }

    #[test]
    fn test_points_grow_with_the_unbroken_run() {
        let mut history = vec![completion_on(day((2024, 1, 1)), 1)];
        assert_eq!(
            points_for_goal_meeting_completion(&history, at_noon(day((2024, 1, 2))), 1),
            2
        );

        history.push(completion_on(day((2024, 1, 2)), 2));
        assert_eq!(
            points_for_goal_meeting_completion(&history, at_noon(day((2024, 1, 3))), 1),
            3
        );
    }

    #[test]
    fn test_points_reset_after_a_break() {
        let history = vec![
            completion_on(day((2024, 1, 1)), 1),
            completion_on(day((2024, 1, 2)), 2),
            // day 3 skipped
        ];

        assert_eq!(
            points_for_goal_meeting_completion(&history, at_noon(day((2024, 1, 4))), 1),
            1
        );
    }

    #[test]
    fn test_plaster_resets_the_reward_clock_but_not_the_run() {
        // 5-day run patched by a plaster on day 4: the day after the
        // plaster earns 1, two days after earns 2.
        let history = vec![
            completion_on(day((2024, 1, 1)), 1),
            completion_on(day((2024, 1, 2)), 2),
            completion_on(day((2024, 1, 3)), 3),
            plaster_on(day((2024, 1, 4))),
        ];

        assert_eq!(
            points_for_goal_meeting_completion(&history, at_noon(day((2024, 1, 5))), 1),
            1
        );

        let mut extended = history.clone();
        extended.push(completion_on(day((2024, 1, 5)), 1));
        assert_eq!(
            points_for_goal_meeting_completion(&extended, at_noon(day((2024, 1, 6))), 1),
            2
        );
    }

    #[test]
    fn test_plaster_before_streak_start_is_ignored() {
        let history = vec![
            plaster_on(day((2024, 1, 1))),
            // day 2 skipped, run broken
            completion_on(day((2024, 1, 3)), 1),
        ];

        // The plaster predates the current run, so the run value applies.
        assert_eq!(
            points_for_goal_meeting_completion(&history, at_noon(day((2024, 1, 4))), 1),
            2
        );
    }

    #[test]
    fn test_next_completion_points_zero_once_goal_met() {
        let history = vec![
            completion_on(day((2024, 1, 1)), 0),
            completion_on(day((2024, 1, 1)), 1),
        ];
        let now = at_noon(day((2024, 1, 1)));

        assert_eq!(next_completion_points(&history, 2, 2, now), 0);
        assert_eq!(next_completion_points(&history, 3, 2, now), 1);
    }

    #[test]
    fn test_next_completion_points_previews_streak_value() {
        let history = vec![
            completion_on(day((2024, 1, 1)), 1),
            completion_on(day((2024, 1, 2)), 2),
        ];
        let now = at_noon(day((2024, 1, 3)));

        assert_eq!(next_completion_points(&history, 1, 0, now), 3);
    }
}
