//! Weekly streak calculation.
//!
//! A week counts as active when it holds at least one completed workout.
//! Weeks are calendar weeks in UTC starting on a configurable weekday.

use crate::Workout;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};

/// First day of the week containing `date`
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() as i64
        - first_day.num_days_from_monday() as i64)
        % 7;
    date - Duration::days(offset)
}

/// Number of calendar-week boundaries between `earlier` and `later`
pub fn weeks_between(later: NaiveDate, earlier: NaiveDate, first_day: Weekday) -> i64 {
    (week_start(later, first_day) - week_start(earlier, first_day)).num_days() / 7
}

/// Consecutive active weeks counted back from the most recent active week
///
/// Returns 0 when the latest activity lies more than one week before the
/// week containing `now`.
pub fn weekly_streak(dates: &[DateTime<Utc>], now: DateTime<Utc>, first_day: Weekday) -> u32 {
    let mut weeks: Vec<NaiveDate> = dates
        .iter()
        .map(|d| week_start(d.date_naive(), first_day))
        .collect();
    weeks.sort_unstable_by(|a, b| b.cmp(a));
    weeks.dedup();

    let Some(&latest) = weeks.first() else {
        return 0;
    };

    if weeks_between(now.date_naive(), latest, first_day) > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut current = latest;
    for &week in &weeks[1..] {
        if weeks_between(current, week, first_day) != 1 {
            break;
        }
        streak += 1;
        current = week;
    }

    streak
}

/// Streak over the completed workouts in `history`
pub fn workout_streak(history: &[Workout], now: DateTime<Utc>, first_day: Weekday) -> u32 {
    let dates: Vec<_> = history
        .iter()
        .filter(|w| w.is_finished())
        .map(|w| w.date)
        .collect();
    weekly_streak(&dates, now, first_day)
}

/// Completed workouts inside the week containing `now`
pub fn workouts_this_week(history: &[Workout], now: DateTime<Utc>, first_day: Weekday) -> usize {
    let this_week = week_start(now.date_naive(), first_day);
    history
        .iter()
        .filter(|w| w.is_finished() && week_start(w.date.date_naive(), first_day) == this_week)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_week_start_monday_and_sunday() {
        let wed = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(
            week_start(wed, Weekday::Mon),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
        assert_eq!(
            week_start(wed, Weekday::Sun),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
        );
    }

    #[test]
    fn test_consecutive_mondays() {
        let dates = [at(2024, 1, 1), at(2024, 1, 8)];
        assert_eq!(weekly_streak(&dates, at(2024, 1, 9), Weekday::Mon), 2);
    }

    #[test]
    fn test_stale_streak_is_broken() {
        let dates = [at(2024, 1, 1)];
        assert_eq!(weekly_streak(&dates, at(2024, 1, 20), Weekday::Mon), 0);
    }

    #[test]
    fn test_last_week_still_counts() {
        let dates = [at(2024, 1, 3)];
        assert_eq!(weekly_streak(&dates, at(2024, 1, 14), Weekday::Mon), 1);
    }

    #[test]
    fn test_same_week_counts_once_and_gap_stops() {
        let dates = [
            at(2024, 1, 22),
            at(2024, 1, 24),
            at(2024, 1, 16),
            // gap: week of Jan 8 has nothing
            at(2024, 1, 2),
        ];
        assert_eq!(weekly_streak(&dates, at(2024, 1, 25), Weekday::Mon), 2);
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(weekly_streak(&[], at(2024, 1, 1), Weekday::Mon), 0);
    }

    #[test]
    fn test_week_start_changes_grouping() {
        // Sunday 7th and Monday 8th share a week only when weeks start on Sunday
        let dates = [at(2024, 1, 7), at(2024, 1, 8)];
        assert_eq!(weekly_streak(&dates, at(2024, 1, 9), Weekday::Mon), 2);
        assert_eq!(weekly_streak(&dates, at(2024, 1, 9), Weekday::Sun), 1);
    }
}
