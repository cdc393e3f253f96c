//! Dispatch surface consumed by the presentation layer.
//!
//! Every view-layer call funnels through [`Facade::dispatch`]: a verb, an
//! action name (optionally carrying `?key=value` query parameters), and a
//! JSON payload. The presentation layer never touches the repository or
//! store directly.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use memoriter_core::types::{Category, RawLine};

use crate::error::{EngineError, Result};
use crate::repository::{LinePatch, Repository, TextPatch};
use crate::store::to_doc;

/// Request verb, mirroring the four mutation classes of the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Deserialize)]
struct AddTextRequest {
    title: String,
    category: Category,
    #[serde(default)]
    lines: Vec<RawLine>,
}

#[derive(Debug, Deserialize)]
struct UpdateTextRequest {
    id: i64,
    #[serde(flatten)]
    patch: TextPatch,
}

#[derive(Debug, Deserialize)]
struct UpdateLineRequest {
    id: String,
    #[serde(flatten)]
    patch: LinePatch,
}

#[derive(Debug, Deserialize)]
struct DeleteTextRequest {
    id: i64,
}

/// Single entry point for the presentation layer.
pub struct Facade {
    repository: Arc<Repository>,
}

impl Facade {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// Route one request to the matching store operation.
    ///
    /// Unknown action names and verb/action mismatches fail with
    /// [`EngineError::UnknownAction`].
    pub async fn dispatch(&self, verb: Verb, action: &str, payload: Value) -> Result<Value> {
        debug!(?verb, action, "dispatch");
        let (name, query) = split_action(action);
        let today = today();

        match (verb, name) {
            (Verb::Get, "getTexts") => to_json(self.repository.list_texts().await?),
            (Verb::Get, "getText") => {
                let id = id_param(query)?;
                to_json(self.repository.get_text(id).await?)
            }
            (Verb::Get, "getDueLines") => to_json(self.repository.due_lines(today).await?),
            (Verb::Get, "getStats") => to_json(self.repository.stats(today).await?),
            (Verb::Post, "addText") => {
                let request: AddTextRequest = parse_payload(payload)?;
                let text = self
                    .repository
                    .create_text(&request.title, request.category, request.lines, today)
                    .await?;
                to_json(text)
            }
            (Verb::Post, "updateText") => {
                let request: UpdateTextRequest = parse_payload(payload)?;
                let text = self
                    .repository
                    .update_text(request.id, request.patch)
                    .await?;
                to_json(text)
            }
            (Verb::Post, "recordPractice") => {
                self.repository.record_practice(today).await?;
                Ok(json!({ "ok": true }))
            }
            (Verb::Put, "updateLine") => {
                let request: UpdateLineRequest = parse_payload(payload)?;
                let line = self
                    .repository
                    .update_line(&request.id, request.patch)
                    .await?;
                Ok(json!({ "ok": true, "line": to_doc(&line)? }))
            }
            (Verb::Delete, "deleteText") => {
                let request: DeleteTextRequest = parse_payload(payload)?;
                self.repository.delete_text(request.id).await?;
                Ok(json!({ "ok": true }))
            }
            _ => Err(EngineError::UnknownAction(action.to_string())),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn split_action(action: &str) -> (&str, Option<&str>) {
    match action.split_once('?') {
        Some((name, query)) => (name, Some(query)),
        None => (action, None),
    }
}

fn query_param<'a>(query: Option<&'a str>, key: &str) -> Option<&'a str> {
    query?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then_some(v)
    })
}

fn id_param(query: Option<&str>) -> Result<i64> {
    query_param(query, "id")
        .ok_or_else(|| EngineError::InvalidArgument("missing id parameter".to_string()))?
        .parse()
        .map_err(|_| EngineError::InvalidArgument("text id must be an integer".to_string()))
}

fn parse_payload<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| EngineError::InvalidArgument(e.to_string()))
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    Ok(to_doc(&value)?)
}
