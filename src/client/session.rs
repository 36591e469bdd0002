//! Client session state.
//!
//! One owned [`SessionState`] holds everything the client shows. The
//! dispatcher and orchestrator are the only code that mutates it, and each
//! mutation happens in a single synchronous step between awaits.

use super::audio::AudioController;
use crate::error::Result;
use crate::models::{ListItem, NewsItem, VideoItem};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Screen currently presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Searching,
    ResultsShown,
    Resummarizing,
    FinalShown,
}

/// Which result list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    News,
    Videos,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListKind::News => write!(f, "news"),
            ListKind::Videos => write!(f, "video"),
        }
    }
}

/// A rendered item and its selection flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub item: T,
    pub selected: bool,
}

/// Rendered items in display order, addressed by their stable key.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectableList<T> {
    entries: Vec<Entry<T>>,
}

impl<T: ListItem> SelectableList<T> {
    /// Build a list with every item unselected. Later duplicates of a key
    /// are dropped so each key maps to exactly one entry.
    pub fn new(items: Vec<T>) -> Self {
        let mut seen = HashSet::new();
        let entries = items
            .into_iter()
            .filter(|item| seen.insert(item.key().to_string()))
            .map(|item| Entry {
                item,
                selected: false,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set the selection flag of the item with `key`. Returns false when no
    /// such item is rendered.
    pub fn set_selected(&mut self, key: &str, selected: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.item.key() == key) {
            Some(entry) => {
                entry.selected = selected;
                true
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, selected: bool) {
        for entry in &mut self.entries {
            entry.selected = selected;
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter(|e| e.selected).map(|e| &e.item)
    }
}

/// What a result panel currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    /// Nothing searched yet.
    Blank,
    Loading,
    Items(SelectableList<T>),
    /// The search resolved without usable items.
    NoResults,
    /// The fetch failed; the message is shown inline.
    Failed(String),
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Panel::Blank
    }
}

impl<T: ListItem + DeserializeOwned> Panel<T> {
    /// Render a fetch result. Payloads of the wrong shape become
    /// [`Panel::NoResults`] instead of an error.
    pub fn from_fetch(result: Result<Value>) -> Self {
        match result {
            Ok(Value::Array(values)) => {
                let items: Vec<T> = values
                    .into_iter()
                    .filter_map(|v| match serde_json::from_value(v) {
                        Ok(item) => Some(item),
                        Err(e) => {
                            warn!("Skipping malformed result item: {}", e);
                            None
                        }
                    })
                    .collect();
                if items.is_empty() {
                    Panel::NoResults
                } else {
                    Panel::Items(SelectableList::new(items))
                }
            }
            Ok(other) => {
                warn!("Expected a result list, got {}", json_kind(&other));
                Panel::NoResults
            }
            Err(e) => Panel::Failed(e.to_string()),
        }
    }
}

impl<T: ListItem> Panel<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading)
    }

    pub fn items(&self) -> Option<&SelectableList<T>> {
        match self {
            Panel::Items(list) => Some(list),
            _ => None,
        }
    }

    fn items_mut(&mut self) -> Option<&mut SelectableList<T>> {
        match self {
            Panel::Items(list) => Some(list),
            _ => None,
        }
    }

    /// Copy of this panel with every selection cleared.
    fn cleared(&self) -> Self {
        let mut copy = self.clone();
        if let Some(list) = copy.items_mut() {
            list.set_all(false);
        }
        copy
    }

    fn selected_originals(&self) -> impl Iterator<Item = &str> {
        self.items()
            .into_iter()
            .flat_map(|list| list.selected())
            .map(|item| item.original_text())
    }
}

/// Kind of failure shown in the final-summary area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request failed or its answer could not be read.
    Transport,
    /// A readable answer that reported failure.
    Application,
}

/// Content of the final-summary area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FinalView {
    #[default]
    Hidden,
    Pending,
    Summary(String),
    Failed { kind: FailureKind, message: String },
}

/// Everything the client currently shows.
#[derive(Debug)]
pub struct SessionState {
    pub news: Panel<NewsItem>,
    pub videos: Panel<VideoItem>,
    pub cached_news: Option<Panel<NewsItem>>,
    pub cached_videos: Option<Panel<VideoItem>>,
    pub screen: UiState,
    pub final_view: FinalView,
    pub audio: AudioController,
    /// Text in the search box.
    pub search_input: String,
    /// Validation message awaiting acknowledgement.
    pub prompt: Option<String>,
    /// Whether the re-summarize trigger accepts input.
    pub trigger_enabled: bool,
    generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            news: Panel::Blank,
            videos: Panel::Blank,
            cached_news: None,
            cached_videos: None,
            screen: UiState::Idle,
            final_view: FinalView::Hidden,
            audio: AudioController::default(),
            search_input: String::new(),
            prompt: None,
            trigger_enabled: true,
            generation: 0,
        }
    }

    /// Generation of the most recently issued search.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Clear everything shown and return to [`UiState::Idle`].
    ///
    /// The generation counter survives so responses to earlier searches
    /// stay recognisable as stale.
    pub fn reset(&mut self) {
        self.audio.stop();
        *self = Self {
            generation: self.generation,
            ..Self::new()
        };
    }

    /// Clear the previous search and mark both panels loading.
    pub(crate) fn start_search(&mut self, keyword: &str) -> u64 {
        self.reset();
        self.generation += 1;
        self.search_input = keyword.to_string();
        self.news = Panel::Loading;
        self.videos = Panel::Loading;
        self.screen = UiState::Searching;
        self.generation
    }

    /// Apply a news fetch if it belongs to the current search.
    pub fn apply_news(&mut self, generation: u64, result: Result<Value>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.news = Panel::from_fetch(result);
        self.mark_results_shown();
        true
    }

    /// Apply a video fetch if it belongs to the current search.
    pub fn apply_videos(&mut self, generation: u64, result: Result<Value>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.videos = Panel::from_fetch(result);
        self.mark_results_shown();
        true
    }

    fn mark_results_shown(&mut self) {
        if self.screen == UiState::Searching {
            self.screen = UiState::ResultsShown;
        }
    }

    pub fn set_selected(&mut self, list: ListKind, key: &str, selected: bool) -> bool {
        match list {
            ListKind::News => self
                .news
                .items_mut()
                .is_some_and(|l| l.set_selected(key, selected)),
            ListKind::Videos => self
                .videos
                .items_mut()
                .is_some_and(|l| l.set_selected(key, selected)),
        }
    }

    pub fn set_all(&mut self, list: ListKind, selected: bool) {
        match list {
            ListKind::News => {
                if let Some(l) = self.news.items_mut() {
                    l.set_all(selected);
                }
            }
            ListKind::Videos => {
                if let Some(l) = self.videos.items_mut() {
                    l.set_all(selected);
                }
            }
        }
    }

    /// Original texts of selected items, news before videos, each in
    /// display order, with blank texts dropped.
    pub fn selected_originals(&self) -> Vec<String> {
        self.news
            .selected_originals()
            .chain(self.videos.selected_originals())
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Remember the rendered lists before leaving the results screen.
    /// Whether lists captured by a re-summarize are held for restoring.
    pub fn has_snapshot(&self) -> bool {
        self.cached_news.is_some() || self.cached_videos.is_some()
    }

    pub(crate) fn snapshot(&mut self) {
        self.cached_news = Some(self.news.clone());
        self.cached_videos = Some(self.videos.clone());
    }

    /// Put the snapshot back with all selections cleared.
    pub(crate) fn restore_snapshot(&mut self) {
        self.news = self
            .cached_news
            .as_ref()
            .map(Panel::cleared)
            .unwrap_or_default();
        self.videos = self
            .cached_videos
            .as_ref()
            .map(Panel::cleared)
            .unwrap_or_default();
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
