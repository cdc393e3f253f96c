//! Core types for the practice store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category a memorized text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Prayer,
    Scripture,
    Poem,
    Quote,
    Song,
    Speech,
    Vocabulary,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

/// Derived mastery classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    New,
    Learning,
    Mastered,
}

impl MasteryLevel {
    /// Classify a line from its scheduling state.
    ///
    /// This is the only place the mastery thresholds live; every code path
    /// that writes scheduling fields recomputes through here.
    pub fn classify(repetitions: u32, interval: u32) -> Self {
        if repetitions >= 3 && interval >= 21 {
            Self::Mastered
        } else if repetitions >= 1 {
            Self::Learning
        } else {
            Self::New
        }
    }
}

impl Default for MasteryLevel {
    fn default() -> Self {
        Self::New
    }
}

/// Scheduling state of one line, as consumed and produced by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub interval: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
    pub due_date: NaiveDate,
}

/// Caller-supplied line content, before an id and scheduling state exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLine {
    pub text: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub translation: String,
}

/// One memorizable unit of text with its own review schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: String,
    pub text: String,
    pub translation: String,
    pub pronunciation: String,
    pub interval: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
    /// Absent means never scheduled, which counts as due.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub mastery_level: MasteryLevel,
}

impl Line {
    /// Build a line from raw content and an initial scheduling state.
    pub fn from_raw(id: String, raw: RawLine, state: ReviewState) -> Self {
        Self {
            id,
            text: raw.text,
            translation: raw.translation,
            pronunciation: raw.pronunciation,
            interval: state.interval,
            repetitions: state.repetitions,
            ease_factor: state.ease_factor,
            due_date: Some(state.due_date),
            mastery_level: MasteryLevel::classify(state.repetitions, state.interval),
        }
    }

    /// Whether this line's review date has arrived or passed.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.due_date.map_or(true, |due| due <= today)
    }
}

/// An ordered collection of lines with shared metadata.
///
/// Line order is semantically meaningful: it defines each line's position
/// and therefore its id. Lines are never reordered or removed individually
/// after creation; only whole-text deletion is supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub date_added: NaiveDate,
    pub lines: Vec<Line>,
}

impl Text {
    pub fn mastered_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.mastery_level == MasteryLevel::Mastered)
            .count()
    }

    /// Share of mastered lines, rounded to a whole percent. Zero for an
    /// empty text.
    pub fn mastery_percent(&self) -> u32 {
        if self.lines.is_empty() {
            0
        } else {
            let ratio = self.mastered_lines() as f64 / self.lines.len() as f64;
            (ratio * 100.0).round() as u32
        }
    }
}

/// A text annotated with its line count and mastery percentage.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedText {
    #[serde(flatten)]
    pub text: Text,
    pub line_count: usize,
    pub mastery_percent: u32,
}

impl AnnotatedText {
    pub fn new(text: Text) -> Self {
        let line_count = text.lines.len();
        let mastery_percent = text.mastery_percent();
        Self {
            text,
            line_count,
            mastery_percent,
        }
    }
}

/// Marker that the user practiced on a given calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_thresholds() {
        assert_eq!(MasteryLevel::classify(3, 21), MasteryLevel::Mastered);
        assert_eq!(MasteryLevel::classify(3, 20), MasteryLevel::Learning);
        assert_eq!(MasteryLevel::classify(2, 30), MasteryLevel::Learning);
        assert_eq!(MasteryLevel::classify(1, 0), MasteryLevel::Learning);
        assert_eq!(MasteryLevel::classify(0, 0), MasteryLevel::New);
    }

    fn line(mastery_level: MasteryLevel) -> Line {
        Line {
            id: "1_0".to_string(),
            text: String::new(),
            translation: String::new(),
            pronunciation: String::new(),
            interval: 0,
            repetitions: 0,
            ease_factor: 2.5,
            due_date: None,
            mastery_level,
        }
    }

    fn text(lines: Vec<Line>) -> Text {
        Text {
            id: 1,
            title: "t".to_string(),
            category: Category::Other,
            date_added: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            lines,
        }
    }

    #[test]
    fn mastery_percent_rounds() {
        let t = text(vec![
            line(MasteryLevel::Mastered),
            line(MasteryLevel::New),
            line(MasteryLevel::New),
        ]);
        assert_eq!(t.mastery_percent(), 33);

        let t = text(vec![
            line(MasteryLevel::Mastered),
            line(MasteryLevel::Mastered),
            line(MasteryLevel::New),
        ]);
        assert_eq!(t.mastery_percent(), 67);
    }

    #[test]
    fn mastery_percent_empty_text_is_zero() {
        assert_eq!(text(Vec::new()).mastery_percent(), 0);
    }

    #[test]
    fn missing_due_date_counts_as_due() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut l = line(MasteryLevel::New);
        assert!(l.is_due(today));

        l.due_date = Some(today);
        assert!(l.is_due(today));
        l.due_date = Some(today.succ_opt().unwrap());
        assert!(!l.is_due(today));
    }
}
