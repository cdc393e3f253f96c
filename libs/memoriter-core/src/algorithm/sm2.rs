//! SM-2 spaced repetition algorithm.
//!
//! Classic SuperMemo 2 over a 0-5 quality grade: the interval progresses
//! 1 day, 6 days, then multiplies by the ease factor; a failed recall
//! resets the repetition count. The ease factor moves on every review,
//! pass or fail, and never drops below the minimum.

use super::Quality;
use crate::types::ReviewState;
use chrono::{Duration, NaiveDate};

/// SM-2 scheduler with configurable ease bounds.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
}

pub const INITIAL_EASE: f64 = 2.5;
pub const MINIMUM_EASE: f64 = 1.3;

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: INITIAL_EASE,
            minimum_ease: MINIMUM_EASE,
        }
    }
}

impl Sm2 {
    /// State for a line that has never been reviewed: due immediately.
    pub fn initial_state(&self, today: NaiveDate) -> ReviewState {
        ReviewState {
            interval: 0,
            repetitions: 0,
            ease_factor: self.initial_ease,
            due_date: today,
        }
    }

    /// Compute the next scheduling state after a review.
    ///
    /// Pure: depends only on its inputs, so it is safe to call for batch
    /// grading of many lines with one shared quality.
    pub fn schedule(&self, state: &ReviewState, quality: Quality, today: NaiveDate) -> ReviewState {
        let (interval, repetitions) = if quality.is_pass() {
            let interval = match state.repetitions {
                0 => 1,
                1 => 6,
                _ => (state.interval as f64 * state.ease_factor).round() as u32,
            };
            (interval, state.repetitions + 1)
        } else {
            (1, 0)
        };

        let miss = f64::from(Quality::MAX - quality.value());
        let ease = state.ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
        let ease_factor = round3(ease.max(self.minimum_ease));

        ReviewState {
            interval,
            repetitions,
            ease_factor,
            due_date: today + Duration::days(i64::from(interval)),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn quality(value: u8) -> Quality {
        Quality::from_value(value).unwrap()
    }

    fn state(interval: u32, repetitions: u32, ease_factor: f64) -> ReviewState {
        ReviewState {
            interval,
            repetitions,
            ease_factor,
            due_date: today(),
        }
    }

    #[test]
    fn first_pass_schedules_one_day() {
        let next = Sm2::default().schedule(&state(0, 0, 2.5), quality(5), today());
        assert_eq!(next.interval, 1);
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.due_date, today() + Duration::days(1));
    }

    #[test]
    fn second_pass_schedules_six_days() {
        let next = Sm2::default().schedule(&state(1, 1, 2.5), quality(5), today());
        assert_eq!(next.interval, 6);
        assert_eq!(next.repetitions, 2);
    }

    #[test]
    fn later_passes_scale_by_ease() {
        let next = Sm2::default().schedule(&state(6, 2, 2.5), quality(5), today());
        assert_eq!(next.interval, 15);
        assert_eq!(next.repetitions, 3);
    }

    #[test]
    fn fail_resets_repetitions_and_interval() {
        let next = Sm2::default().schedule(&state(30, 5, 2.0), quality(0), today());
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.interval, 1);
        assert_eq!(next.due_date, today() + Duration::days(1));
    }

    #[test]
    fn ease_moves_on_pass_and_fail() {
        // Perfect recall raises the ease, a barely-passing grade lowers it.
        let next = Sm2::default().schedule(&state(0, 0, 2.5), quality(5), today());
        assert_eq!(next.ease_factor, 2.6);
        let next = Sm2::default().schedule(&state(0, 0, 2.5), quality(3), today());
        assert_eq!(next.ease_factor, 2.36);
        // A fail still adjusts the ease.
        let next = Sm2::default().schedule(&state(30, 5, 2.0), quality(0), today());
        assert_eq!(next.ease_factor, 1.3);
    }

    #[test]
    fn ease_never_drops_below_minimum() {
        let sm2 = Sm2::default();
        for value in 0..=Quality::MAX {
            let next = sm2.schedule(&state(10, 4, sm2.minimum_ease), quality(value), today());
            assert!(next.ease_factor >= sm2.minimum_ease);
        }
    }

    #[test]
    fn ease_is_rounded_to_three_decimals() {
        let next = Sm2::default().schedule(&state(1, 1, 2.123), quality(4), today());
        // Quality 4 leaves the ease unchanged apart from rounding.
        assert_eq!(next.ease_factor, 2.123);
    }

    #[test]
    fn initial_state_is_due_today() {
        let state = Sm2::default().initial_state(today());
        assert_eq!(state.interval, 0);
        assert_eq!(state.repetitions, 0);
        assert_eq!(state.ease_factor, INITIAL_EASE);
        assert_eq!(state.due_date, today());
    }
}
