//! Case search box: the recent-searches panel, the local list filter and the
//! remote `/Search` lookup.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::capabilities::{
    checked_value, into_reply, ApiRequest, Capabilities, HttpReply, HttpResult, KvKey, KvResult,
};
use crate::error::AppError;
use crate::event::Event;
use crate::filter::{filter_cases, CaseItem, CaseList, FilterOutcome};
use crate::history::SearchHistory;
use crate::model::Model;

/// Element id of the search input; clicks on it keep the panel open.
pub const SEARCH_INPUT_ID: &str = "caseSearchInput";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub input: String,
    pub history: SearchHistory,
    pub panel_visible: bool,
    /// `None` on pages without a case list.
    pub case_list: Option<CaseList>,
    pub remote_in_flight: bool,
    /// False until the stored history has been read back.
    pub history_loaded: bool,
    /// Queries submitted before the stored history arrived, oldest first.
    pub pending_records: Vec<String>,
}

impl SearchState {
    /// The panel follows the history: shown when there is something to show.
    pub fn refresh_panel(&mut self) {
        self.panel_visible = !self.history.is_empty();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchEvent {
    InputChanged(String),
    InputFocused,
    Submitted,
    HistoryEntrySelected { query: String },
    DocumentClicked { target_id: Option<String> },
    CaseListLoaded { items: Vec<CaseItem> },
    RemoteSearchRequested,

    #[serde(skip)]
    HistoryLoaded(KvResult),
    #[serde(skip)]
    HistoryPersisted(KvResult),
    #[serde(skip)]
    RemoteResults(Box<HttpResult>),
}

impl SearchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InputChanged(_) => "search_input_changed",
            Self::InputFocused => "search_input_focused",
            Self::Submitted => "search_submitted",
            Self::HistoryEntrySelected { .. } => "history_entry_selected",
            Self::DocumentClicked { .. } => "document_clicked",
            Self::CaseListLoaded { .. } => "case_list_loaded",
            Self::RemoteSearchRequested => "remote_search_requested",
            Self::HistoryLoaded(_) => "history_loaded",
            Self::HistoryPersisted(_) => "history_persisted",
            Self::RemoteResults(_) => "remote_results",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RemoteSearchResponse {
    #[serde(default)]
    cases: Vec<RemoteCase>,
}

#[derive(Debug, Deserialize)]
struct RemoteCase {
    id: serde_json::Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl From<RemoteCase> for CaseItem {
    fn from(case: RemoteCase) -> Self {
        let id = match case.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let text = [case.title, case.description, case.status]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        CaseItem::new(id, text)
    }
}

/// Asks the shell for the stored history. Until it arrives, submitted
/// queries are held back from storage so the stored list is not overwritten.
pub fn load_history(model: &mut Model, caps: &Capabilities) {
    match KvKey::new(model.config.history_key.clone()) {
        Ok(key) => {
            model.search.history_loaded = false;
            caps.key_value.get(key.to_string(), |result| {
                Event::Search(SearchEvent::HistoryLoaded(result))
            });
        }
        Err(e) => {
            error!(error = %e, "cannot load search history");
            model.search.history_loaded = true;
        }
    }
}

fn persist_history(model: &Model, caps: &Capabilities) {
    let write = KvKey::new(model.config.history_key.clone())
        .map_err(AppError::from)
        .and_then(|key| {
            let bytes = model.search.history.to_stored()?;
            Ok((key, checked_value(bytes)?))
        });

    match write {
        Ok((key, bytes)) => caps.key_value.set(key.to_string(), bytes, |result| {
            Event::Search(SearchEvent::HistoryPersisted(result))
        }),
        Err(e) => warn!(error = %e, "search history not persisted"),
    }
}

fn run_filter(search: &mut SearchState, query: &str) {
    match filter_cases(search.case_list.as_mut(), query) {
        FilterOutcome::Matched(count) => debug!(query, count, "case list filtered"),
        FilterOutcome::NoMatches => debug!(query, "no cases matched"),
        FilterOutcome::Skipped => {}
    }
}

pub fn update(event: SearchEvent, model: &mut Model, caps: &Capabilities) {
    match event {
        SearchEvent::InputChanged(value) => {
            model.search.input = value;
            caps.render.render();
        }

        SearchEvent::InputFocused => {
            model.search.refresh_panel();
            caps.render.render();
        }

        SearchEvent::Submitted => {
            let raw = model.search.input.clone();
            run_filter(&mut model.search, &raw);

            let query = raw.trim();
            if query.is_empty() {
                debug!("blank search query not recorded");
            } else {
                model.search.history.record(query);
                if model.search.history_loaded {
                    persist_history(model, caps);
                } else {
                    debug!(query, "history not loaded yet, write deferred");
                    model.search.pending_records.push(query.to_string());
                }
            }

            model.search.refresh_panel();
            caps.render.render();
        }

        SearchEvent::HistoryEntrySelected { query } => {
            run_filter(&mut model.search, &query);
            model.search.input = query;
            caps.render.render();
        }

        SearchEvent::DocumentClicked { target_id } => {
            if target_id.as_deref() != Some(SEARCH_INPUT_ID) && model.search.panel_visible {
                model.search.panel_visible = false;
                caps.render.render();
            }
        }

        SearchEvent::CaseListLoaded { items } => {
            debug!(count = items.len(), "case list registered");
            model.search.case_list = Some(CaseList::new(items));
            caps.render.render();
        }

        SearchEvent::RemoteSearchRequested => {
            let query = model.search.input.trim().to_string();
            if query.is_empty() {
                debug!("blank remote search skipped");
                return;
            }
            if model.search.remote_in_flight {
                debug!("remote search already in flight");
                return;
            }

            let url = format!(
                "{}?{}",
                model.config.endpoint(&model.config.search_path),
                url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("q", &query)
                    .finish()
            );
            match ApiRequest::get(url) {
                Ok(request) => {
                    model.search.remote_in_flight = true;
                    request.send(&caps.http, |result| {
                        Event::Search(SearchEvent::RemoteResults(Box::new(result)))
                    });
                }
                Err(e) => error!(error = %e, "cannot build search request"),
            }
        }

        SearchEvent::HistoryLoaded(result) => {
            let limit = model.config.history_limit;
            let mut history = match result {
                Ok(raw) => SearchHistory::from_stored(raw.as_deref(), limit),
                Err(e) => {
                    warn!(error = %AppError::from(e), "search history unavailable");
                    SearchHistory::new(limit)
                }
            };

            let pending = std::mem::take(&mut model.search.pending_records);
            for query in &pending {
                history.record(query);
            }
            model.search.history = history;
            model.search.history_loaded = true;
            info!(
                entries = model.search.history.len(),
                merged = pending.len(),
                "search history loaded"
            );

            if !pending.is_empty() {
                persist_history(model, caps);
            }
            model.search.refresh_panel();
            caps.render.render();
        }

        SearchEvent::HistoryPersisted(result) => {
            if let Err(e) = result {
                warn!(error = %AppError::from(e), "search history not persisted");
            }
        }

        SearchEvent::RemoteResults(result) => {
            model.search.remote_in_flight = false;
            let items = into_reply(*result)
                .map_err(AppError::from)
                .and_then(|reply| remote_items(&reply));

            match items {
                Ok(items) => {
                    info!(count = items.len(), "remote search results");
                    model
                        .search
                        .case_list
                        .get_or_insert_with(CaseList::default)
                        .replace_items(items);
                    caps.render.render();
                }
                Err(e) => error!(error = %e, "remote search failed"),
            }
        }
    }
}

/// A `404` answer with a `message` body means no hits.
fn remote_items(response: &HttpReply) -> Result<Vec<CaseItem>, AppError> {
    if response.status() == 404 {
        if let Ok(body) = response.json::<serde_json::Value>() {
            if body.get("message").is_some() {
                return Ok(Vec::new());
            }
        }
    }
    if !response.is_success() {
        return Err(AppError::from_http_status(response.status(), response.body()));
    }
    let parsed: RemoteSearchResponse = response.json()?;
    Ok(parsed.cases.into_iter().map(CaseItem::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_items_parse_cases() {
        let body = br#"{"cases": [{"id": 7, "title": "Fraud", "description": "Bank", "status": "Open"}]}"#;
        let items = remote_items(&HttpReply::new(200, body.to_vec())).unwrap();
        assert_eq!(items, vec![CaseItem::new("7", "Fraud | Bank | Open")]);
    }

    #[test]
    fn test_remote_items_not_found_is_empty() {
        let body = br#"{"message": "No cases found"}"#;
        let items = remote_items(&HttpReply::new(404, body.to_vec())).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_remote_items_bad_request_is_error() {
        let body = br#"{"error": "Empty search query"}"#;
        let err = remote_items(&HttpReply::new(400, body.to_vec())).unwrap_err();
        assert_eq!(err.message, "Empty search query");
    }

    #[test]
    fn test_panel_follows_history() {
        let mut state = SearchState::default();
        state.refresh_panel();
        assert!(!state.panel_visible);
        state.history.record("fraud");
        state.refresh_panel();
        assert!(state.panel_visible);
    }
}
