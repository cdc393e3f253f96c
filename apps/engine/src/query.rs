//! Cross-text queries: due lines, aggregate statistics, and the streak.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use memoriter_core::types::{Line, MasteryLevel};

use crate::error::Result;
use crate::repository::Repository;

/// A due line annotated with its parent text.
#[derive(Debug, Clone, Serialize)]
pub struct DueLine {
    pub text_id: i64,
    pub text_title: String,
    #[serde(flatten)]
    pub line: Line,
}

/// Result of the due-line query.
#[derive(Debug, Clone, Serialize)]
pub struct DueLines {
    pub count: usize,
    pub lines: Vec<DueLine>,
}

/// Per-text entry in the mastery breakdown. Texts with no lines are
/// excluded.
#[derive(Debug, Clone, Serialize)]
pub struct TextMastery {
    pub text_id: i64,
    pub title: String,
    pub line_count: usize,
    pub mastery_percent: u32,
}

/// Aggregate practice statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub text_count: usize,
    pub line_count: usize,
    pub new_lines: usize,
    pub learning_lines: usize,
    pub mastered_lines: usize,
    pub texts: Vec<TextMastery>,
    pub streak_days: u32,
}

impl Repository {
    /// Every line whose review date has arrived or passed, across all
    /// texts.
    pub async fn due_lines(&self, today: NaiveDate) -> Result<DueLines> {
        let mut lines = Vec::new();
        for text in self.all_texts().await? {
            for line in &text.lines {
                if line.is_due(today) {
                    lines.push(DueLine {
                        text_id: text.id,
                        text_title: text.title.clone(),
                        line: line.clone(),
                    });
                }
            }
        }
        Ok(DueLines {
            count: lines.len(),
            lines,
        })
    }

    /// Single pass over all texts and sessions producing the aggregate
    /// statistics.
    pub async fn stats(&self, today: NaiveDate) -> Result<Stats> {
        let texts = self.all_texts().await?;

        let mut line_count = 0;
        let mut new_lines = 0;
        let mut learning_lines = 0;
        let mut mastered_lines = 0;
        let mut breakdown = Vec::new();

        for text in &texts {
            line_count += text.lines.len();
            for line in &text.lines {
                match line.mastery_level {
                    MasteryLevel::New => new_lines += 1,
                    MasteryLevel::Learning => learning_lines += 1,
                    MasteryLevel::Mastered => mastered_lines += 1,
                }
            }
            if !text.lines.is_empty() {
                breakdown.push(TextMastery {
                    text_id: text.id,
                    title: text.title.clone(),
                    line_count: text.lines.len(),
                    mastery_percent: text.mastery_percent(),
                });
            }
        }

        let streak_days = streak(&self.session_dates().await?, today);

        Ok(Stats {
            text_count: texts.len(),
            line_count,
            new_lines,
            learning_lines,
            mastered_lines,
            texts: breakdown,
            streak_days,
        })
    }
}

/// Consecutive practice days ending today or yesterday.
///
/// Zero unless the most recent session is today or yesterday; otherwise
/// one for that session plus the run of gap-free preceding days. Any gap
/// terminates the run.
pub fn streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut dates = dates.to_vec();
    dates.sort_unstable();
    dates.dedup();
    dates.reverse();

    let Some(&latest) = dates.first() else {
        return 0;
    };
    if latest != today && latest != today - Duration::days(1) {
        return 0;
    }

    let mut run = 1;
    for pair in dates.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
        } else {
            break;
        }
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() + Duration::days(offset)
    }

    #[test]
    fn unbroken_run_through_today() {
        assert_eq!(streak(&[day(0), day(-1), day(-2)], day(0)), 3);
    }

    #[test]
    fn run_may_end_yesterday() {
        assert_eq!(streak(&[day(-1), day(-2)], day(0)), 2);
    }

    #[test]
    fn stale_sessions_score_zero() {
        assert_eq!(streak(&[day(-2), day(-3)], day(0)), 0);
    }

    #[test]
    fn gap_terminates_the_run() {
        assert_eq!(streak(&[day(0), day(-2)], day(0)), 1);
        assert_eq!(streak(&[day(0), day(-1), day(-3), day(-4)], day(0)), 2);
    }

    #[test]
    fn no_sessions_scores_zero() {
        assert_eq!(streak(&[], day(0)), 0);
    }

    #[test]
    fn order_and_duplicates_do_not_matter() {
        assert_eq!(streak(&[day(-2), day(0), day(-1), day(0)], day(0)), 3);
    }
}
