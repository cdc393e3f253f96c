//! Repository mapping domain entities onto the durable store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use memoriter_core::algorithm::sm2::MINIMUM_EASE;
use memoriter_core::types::{AnnotatedText, Category, Line, MasteryLevel, RawLine, Session, Text};
use memoriter_core::{line_key, parse_line_key, Sm2};

use crate::error::{EngineError, Result};
use crate::store::{from_doc, to_doc, DurableStore, StoreKey, Table};

/// Partial update for a text's metadata. The id and line sequence are
/// never overwritten through this.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
}

/// Partial update for one line. The id is never overwritten and the
/// mastery level is recomputed, not accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinePatch {
    pub text: Option<String>,
    pub translation: Option<String>,
    pub pronunciation: Option<String>,
    pub interval: Option<u32>,
    pub repetitions: Option<u32>,
    pub ease_factor: Option<f64>,
    pub due_date: Option<NaiveDate>,
}

/// Persistent store of texts, their lines, and practice sessions.
///
/// # Concurrency
///
/// `update_line` reads the whole parent text, patches one line, and writes
/// the whole text back. To keep a concurrent batch of per-line updates
/// from losing writes, every mutation of a text runs under a per-text-id
/// mutex: updates racing on the *same* text serialize, updates on
/// different texts proceed independently.
pub struct Repository {
    store: Arc<dyn DurableStore>,
    text_locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl Repository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            store,
            text_locks: Mutex::new(HashMap::new()),
        }
    }

    /// All texts, annotated with line count and mastery percentage.
    pub async fn list_texts(&self) -> Result<Vec<AnnotatedText>> {
        Ok(self
            .all_texts()
            .await?
            .into_iter()
            .map(AnnotatedText::new)
            .collect())
    }

    /// One annotated text by id.
    pub async fn get_text(&self, id: i64) -> Result<AnnotatedText> {
        self.load_text(id).await.map(AnnotatedText::new)
    }

    /// Create a text together with all its lines.
    ///
    /// Two-phase insert: a line id embeds its parent's id and the store is
    /// the only source of fresh ids, so a placeholder with an empty line
    /// sequence is inserted first to obtain the id, then the complete
    /// record replaces it.
    pub async fn create_text(
        &self,
        title: &str,
        category: Category,
        raw_lines: Vec<RawLine>,
        today: NaiveDate,
    ) -> Result<AnnotatedText> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::InvalidArgument(
                "title must not be empty".to_string(),
            ));
        }

        let id = self.reserve_text_id(title, category, today).await?;
        let text = self
            .finalize_text(id, title, category, raw_lines, today)
            .await?;
        debug!(text_id = id, lines = text.lines.len(), "created text");
        Ok(AnnotatedText::new(text))
    }

    /// Merge metadata fields over an existing text.
    pub async fn update_text(&self, id: i64, patch: TextPatch) -> Result<AnnotatedText> {
        let _guard = self.lock_text(id).await;
        let mut text = self.load_text(id).await?;
        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(EngineError::InvalidArgument(
                    "title must not be empty".to_string(),
                ));
            }
            text.title = title;
        }
        if let Some(category) = patch.category {
            text.category = category;
        }
        self.save_text(&text).await?;
        Ok(AnnotatedText::new(text))
    }

    /// Patch one line, recomputing its mastery level, and write the whole
    /// parent text back.
    pub async fn update_line(&self, line_id: &str, patch: LinePatch) -> Result<Line> {
        let (text_id, index) =
            parse_line_key(line_id).map_err(|e| EngineError::InvalidArgument(e.to_string()))?;

        let _guard = self.lock_text(text_id).await;
        let mut text = self.load_text(text_id).await?;
        let line = text
            .lines
            .get_mut(index)
            .ok_or_else(|| EngineError::NotFound(format!("line {line_id}")))?;
        apply_line_patch(line, patch);
        let updated = line.clone();
        self.save_text(&text).await?;
        debug!(line_id, "updated line");
        Ok(updated)
    }

    /// Remove a text and all its embedded lines. Deleting an absent id is
    /// not an error.
    pub async fn delete_text(&self, id: i64) -> Result<()> {
        let _guard = self.lock_text(id).await;
        self.store.delete(Table::Texts, &StoreKey::Id(id)).await?;
        debug!(text_id = id, "deleted text");
        Ok(())
    }

    /// Record that the user practiced on `date`. Idempotent per date.
    pub async fn record_practice(&self, date: NaiveDate) -> Result<()> {
        let session = Session { date };
        self.store
            .upsert(
                Table::Sessions,
                &StoreKey::Date(date.to_string()),
                &to_doc(&session)?,
            )
            .await?;
        debug!(%date, "recorded practice session");
        Ok(())
    }

    /// All recorded practice dates.
    pub async fn session_dates(&self) -> Result<Vec<NaiveDate>> {
        let docs = self.store.get_all(Table::Sessions).await?;
        let mut dates = Vec::with_capacity(docs.len());
        for doc in docs {
            let session: Session = from_doc(doc)?;
            dates.push(session.date);
        }
        Ok(dates)
    }

    pub(crate) async fn all_texts(&self) -> Result<Vec<Text>> {
        let docs = self.store.get_all(Table::Texts).await?;
        let mut texts = Vec::with_capacity(docs.len());
        for doc in docs {
            texts.push(from_doc(doc)?);
        }
        Ok(texts)
    }

    async fn load_text(&self, id: i64) -> Result<Text> {
        let doc = self
            .store
            .get_one(Table::Texts, &StoreKey::Id(id))
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("text {id}")))?;
        Ok(from_doc(doc)?)
    }

    async fn save_text(&self, text: &Text) -> Result<()> {
        self.store
            .upsert(Table::Texts, &StoreKey::Id(text.id), &to_doc(text)?)
            .await?;
        Ok(())
    }

    async fn reserve_text_id(
        &self,
        title: &str,
        category: Category,
        today: NaiveDate,
    ) -> Result<i64> {
        let placeholder = Text {
            id: 0,
            title: title.to_string(),
            category,
            date_added: today,
            lines: Vec::new(),
        };
        let id = self
            .store
            .insert(Table::Texts, &to_doc(&placeholder)?)
            .await?;
        Ok(id)
    }

    async fn finalize_text(
        &self,
        id: i64,
        title: &str,
        category: Category,
        raw_lines: Vec<RawLine>,
        today: NaiveDate,
    ) -> Result<Text> {
        let scheduler = Sm2::default();
        let lines = raw_lines
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                Line::from_raw(line_key(id, index), raw, scheduler.initial_state(today))
            })
            .collect();
        let text = Text {
            id,
            title: title.to_string(),
            category,
            date_added: today,
            lines,
        };
        self.save_text(&text).await?;
        Ok(text)
    }

    async fn lock_text(&self, id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.text_locks.lock().expect("text lock registry");
            Arc::clone(
                locks
                    .entry(id)
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}

fn apply_line_patch(line: &mut Line, patch: LinePatch) {
    if let Some(text) = patch.text {
        line.text = text;
    }
    if let Some(translation) = patch.translation {
        line.translation = translation;
    }
    if let Some(pronunciation) = patch.pronunciation {
        line.pronunciation = pronunciation;
    }
    if let Some(interval) = patch.interval {
        line.interval = interval;
    }
    if let Some(repetitions) = patch.repetitions {
        line.repetitions = repetitions;
    }
    if let Some(ease_factor) = patch.ease_factor {
        line.ease_factor = ease_factor.max(MINIMUM_EASE);
    }
    if let Some(due_date) = patch.due_date {
        line.due_date = Some(due_date);
    }
    line.mastery_level = MasteryLevel::classify(line.repetitions, line.interval);
}
