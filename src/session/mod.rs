//! The interactive search session.
//!
//! [`SearchSession`] is a synchronous state machine: the host feeds it [`Event`]s and
//! carries out the [`Command`]s it returns (arm a timer, fetch a shard, show or hide
//! results). [`SessionDriver`] does that on a tokio task.
//!
//! ```text
//! Idle -> Debouncing -> Loading(shard) -> Rendering -> Filtered
//! ```
//!
//! A keystroke while debouncing re-arms the timer. A keystroke while loading or
//! rendering never cancels the fetch; it queues one more cycle that runs with the
//! latest value once the current render is acknowledged.

mod driver;

pub use driver::{SessionDriver, SessionOutput};

use crate::config::Config;
use crate::search::{LoadedShard, QueryResult, SearchCategory, SearchIndex, ShardRef, locate};
use crate::settings::Settings;
use ahash::AHashMap;
use std::sync::Arc;
use std::time::Duration;

/// Settings key holding the label of the selected category.
pub const SEARCH_GROUP_KEY: &str = "search_grp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Waiting for typing to pause.
    Debouncing,
    /// Waiting for this shard before the cycle can render.
    Loading(ShardRef),
    /// A render was emitted and not yet acknowledged.
    Rendering,
    /// Results for the last searched value are on screen.
    Filtered,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// The search field now holds this text.
    Input(String),
    DebounceElapsed,
    ShardLoaded { shard: ShardRef, result: LoadedShard },
    /// The host finished showing the last render.
    Rendered,
    SelectCategory(usize),
    Focus(bool),
    Escape,
    Close,
}

#[derive(Debug, Clone)]
pub enum Command {
    /// Start the debounce timer, replacing any running one.
    ArmDebounce(Duration),
    FetchShard(ShardRef),
    /// Show these results; acknowledge with [`Event::Rendered`].
    Render(Box<QueryResult>),
    HideResults,
}

/// One search panel bound to one documentation index.
#[derive(Debug)]
pub struct SearchSession {
    index: Arc<SearchIndex>,
    settings: Settings,
    debounce: Duration,
    state: SessionState,
    category: usize,
    /// Current field text.
    value: String,
    /// Term of the cycle being loaded or shown.
    term: String,
    /// Space-stripped text of the last cycle; typing that yields the same text is ignored.
    last_searched: String,
    active: bool,
    results_visible: bool,
    /// A cycle is owed once the current load or render finishes.
    queued: bool,
    /// Shards seen by this session, first result kept.
    shards: AHashMap<ShardRef, LoadedShard>,
    last_result: Option<QueryResult>,
}

impl SearchSession {
    /// Start a session, restoring the selected category from settings.
    pub fn init(index: Arc<SearchIndex>, settings: Settings, config: &Config) -> Self {
        let saved = settings.read_setting(SEARCH_GROUP_KEY, "");
        let category = match index.category_by_label(&saved) {
            Some(found) => found.index,
            None => {
                if !saved.is_empty() {
                    tracing::debug!("Saved search category '{}' no longer exists", saved);
                }
                0
            }
        };
        tracing::debug!("Search session starts in category {}", category);

        Self {
            index,
            settings,
            debounce: config.debounce(),
            state: SessionState::Idle,
            category,
            value: String::new(),
            term: String::new(),
            last_searched: String::new(),
            active: false,
            results_visible: false,
            queued: false,
            shards: AHashMap::new(),
            last_result: None,
        }
    }

    /// Drop cached shards and return to `Idle`. The settings survive.
    pub fn dispose(&mut self) {
        tracing::debug!("Disposing search session ({} cached shards)", self.shards.len());
        self.shards.clear();
        self.last_result = None;
        self.queued = false;
        self.reset();
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn results_visible(&self) -> bool {
        self.results_visible
    }

    pub fn selected_category(&self) -> &SearchCategory {
        self.index
            .category(self.category)
            .unwrap_or_else(|| self.index.default_category())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The most recent render.
    pub fn last_result(&self) -> Option<&QueryResult> {
        self.last_result.as_ref()
    }

    pub fn is_cached(&self, shard: &ShardRef) -> bool {
        self.shards.contains_key(shard)
    }

    /// First visible row at or after `from` in the last render.
    pub fn next_visible(&self, from: usize) -> Option<usize> {
        self.last_result.as_ref()?.outcome.next_visible(from)
    }

    /// Last visible row at or before `from` in the last render.
    pub fn prev_visible(&self, from: usize) -> Option<usize> {
        self.last_result.as_ref()?.outcome.prev_visible(from)
    }

    /// Apply one event and return what the host must do.
    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Input(value) => self.on_input(value),
            Event::DebounceElapsed => {
                if self.state == SessionState::Debouncing {
                    self.cycle()
                } else {
                    Vec::new()
                }
            }
            Event::ShardLoaded { shard, result } => self.on_shard_loaded(shard, result),
            Event::Rendered => self.on_rendered(),
            Event::SelectCategory(index) => self.on_select_category(index),
            Event::Focus(active) => {
                self.activate(active);
                Vec::new()
            }
            Event::Escape | Event::Close => {
                self.results_visible = false;
                self.activate(false);
                vec![Command::HideResults]
            }
        }
    }

    fn on_input(&mut self, value: String) -> Vec<Command> {
        let stripped = strip_spaces(&value);
        self.value = value;

        if stripped == self.last_searched {
            // Back to what is already shown: drop the pending timer.
            if self.state == SessionState::Debouncing {
                self.state = self.settled_state();
            }
            return Vec::new();
        }

        if stripped.is_empty() {
            self.last_searched.clear();
            self.results_visible = false;
            self.queued = false;
            self.state = SessionState::Idle;
            return vec![Command::HideResults];
        }

        match self.state {
            SessionState::Loading(_) | SessionState::Rendering => {
                self.queued = true;
                Vec::new()
            }
            _ => {
                self.state = SessionState::Debouncing;
                vec![Command::ArmDebounce(self.debounce)]
            }
        }
    }

    fn on_shard_loaded(&mut self, shard: ShardRef, result: LoadedShard) -> Vec<Command> {
        if let Err(e) = &result {
            tracing::debug!("Shard {} unavailable: {}", shard, e);
        }
        self.shards.entry(shard.clone()).or_insert(result);

        if self.state != SessionState::Loading(shard.clone()) {
            tracing::debug!("Ignoring stale load of shard {}", shard);
            return Vec::new();
        }
        self.render(Some(shard))
    }

    fn on_rendered(&mut self) -> Vec<Command> {
        if self.state != SessionState::Rendering {
            return Vec::new();
        }
        self.state = SessionState::Filtered;
        if !std::mem::take(&mut self.queued) {
            return Vec::new();
        }
        if strip_spaces(&self.value) == self.last_searched {
            return Vec::new();
        }
        self.cycle()
    }

    fn on_select_category(&mut self, index: usize) -> Vec<Command> {
        let last = self.index.categories().len().saturating_sub(1);
        self.category = index.min(last);

        let label = self.selected_category().label.clone();
        if let Err(e) = self.settings.write_setting(SEARCH_GROUP_KEY, &label, 0) {
            tracing::warn!("Failed to save search category: {:#}", e);
        }

        if strip_spaces(&self.value).is_empty() || !self.active {
            return Vec::new();
        }
        match self.state {
            SessionState::Loading(_) | SessionState::Rendering => {
                self.queued = true;
                Vec::new()
            }
            _ => self.cycle(),
        }
    }

    /// Locate, then render from cache or ask for the shard.
    fn cycle(&mut self) -> Vec<Command> {
        self.term = self.value.trim_start_matches(' ').to_string();
        self.last_searched = strip_spaces(&self.value);

        let Some(shard) = locate(&self.term, self.selected_category()) else {
            return self.render(None);
        };
        if self.shards.contains_key(&shard) {
            return self.render(Some(shard));
        }

        tracing::debug!("Fetching shard {} for '{}'", shard, self.term);
        self.state = SessionState::Loading(shard.clone());
        vec![Command::FetchShard(shard)]
    }

    fn render(&mut self, shard: Option<ShardRef>) -> Vec<Command> {
        let term = &self.term;
        let category = self.selected_category();
        let result = match shard {
            Some(shard) => {
                let loaded = self.shards.get(&shard);
                QueryResult::from_loaded(term, category, loaded.map(|loaded| (shard, loaded)))
            }
            None => QueryResult::from_loaded(term, category, None),
        };
        tracing::debug!(
            "Rendering {} matches for '{}' in '{}'",
            result.outcome.match_count,
            result.term,
            result.category
        );

        self.last_result = Some(result.clone());
        self.results_visible = true;
        self.active = true;
        self.state = SessionState::Rendering;
        vec![Command::Render(Box::new(result))]
    }

    /// Deactivating while results are shown keeps the panel open.
    fn activate(&mut self, active: bool) {
        if active || self.results_visible {
            self.active = true;
        } else {
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.active = false;
        self.results_visible = false;
        self.value.clear();
        self.last_searched.clear();
        self.queued = false;
        self.state = SessionState::Idle;
    }

    fn settled_state(&self) -> SessionState {
        if self.results_visible {
            SessionState::Filtered
        } else {
            SessionState::Idle
        }
    }
}

fn strip_spaces(value: &str) -> String {
    value.chars().filter(|&c| c != ' ').collect()
}
