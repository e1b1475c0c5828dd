use crate::cache::{CacheState, Lookup, ResultCache};
use crate::controller::QueryController;
use crate::persist::{Bootstrap, SavePayload};
use crate::{merge_with, Config, DragEvent, MergedEntry, Pointer, PointerStore, Post, PostId, StoreError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// The two remote reads a session depends on.
#[derive(Clone)]
pub struct Lookups {
    pub defaults: Arc<dyn Lookup>,
    pub search: Arc<dyn Lookup>,
}

/// What the editor sees for the current title.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum View {
    /// No title yet, nothing to preview.
    Empty,
    Loading,
    Failed { message: String },
    Ready { entries: Vec<MergedEntry> },
}

/// What the "add to results" panel shows for the current search text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CandidateView {
    Idle,
    Loading,
    Failed { message: String },
    NoResults,
    Results { posts: Vec<Post> },
}

/// One editing session over a single ordering.
///
/// All mutations are synchronous; only the caches fetch in the background.
pub struct Session {
    config: Config,
    store: PointerStore,
    posts: HashMap<PostId, Post>,
    controller: QueryController,
}

impl Session {
    /// Must be called inside a Tokio runtime: a non-empty title starts its lookup.
    pub fn new(bootstrap: Bootstrap, lookups: Lookups, config: Config) -> Self {
        let defaults = Arc::new(ResultCache::new("defaults", lookups.defaults));
        let search = Arc::new(ResultCache::new("search", lookups.search));
        let Bootstrap { pointers, posts, title } = bootstrap;
        tracing::info!(pointers = pointers.len(), posts = posts.len(), title = %title, "session started");
        Self {
            config,
            store: PointerStore::new(pointers),
            posts,
            controller: QueryController::new(title, defaults, search, config.debounce),
        }
    }

    pub fn title(&self) -> &str { self.controller.title() }
    pub fn search_text(&self) -> &str { self.controller.search_text() }
    pub fn pointers(&self) -> &[Pointer] { self.store.as_slice() }

    /// Title edits keep the pointers; the next merge uses whatever is cached for the new title.
    pub fn set_title(&mut self, title: impl Into<String>) { self.controller.set_title(title) }

    pub fn set_search_text(&mut self, text: impl Into<String>) { self.controller.set_search_text(text) }

    pub fn view(&self) -> View {
        if crate::controller::is_blank(self.title()) {
            return View::Empty;
        }
        match self.controller.default_state() {
            CacheState::Ready(defaults) => View::Ready { entries: self.merge(&defaults) },
            CacheState::Failed(message) => View::Failed { message },
            CacheState::Absent | CacheState::Pending => View::Loading,
        }
    }

    /// The displayed sequence, if default results for the title are in.
    pub fn merged(&self) -> Option<Vec<MergedEntry>> {
        match self.view() {
            View::Ready { entries } => Some(entries),
            _ => None,
        }
    }

    pub fn candidates(&self) -> CandidateView {
        if crate::controller::is_blank(self.search_text()) {
            return CandidateView::Idle;
        }
        match self.controller.search_state() {
            CacheState::Ready(found) => {
                let pinned = self.store.ids();
                let posts: Vec<Post> = found.iter().filter(|p| !pinned.contains(&p.id)).cloned().collect();
                if posts.is_empty() {
                    CandidateView::NoResults
                } else {
                    CandidateView::Results { posts }
                }
            }
            CacheState::Failed(message) => CandidateView::Failed { message },
            CacheState::Absent | CacheState::Pending => CandidateView::Loading,
        }
    }

    /// Pin `post` at the end of the current view. A post that is already
    /// pinned is rejected before anything is touched.
    pub fn add(&mut self, post: Post) -> Result<Pointer, StoreError> {
        if self.store.contains(post.id) {
            tracing::debug!(id = post.id, "ignoring add of pinned post");
            return Err(StoreError::AlreadyPinned(post.id));
        }
        let id = post.id;
        self.posts.entry(id).or_insert(post);

        let defaults = self.controller.default_state();
        let len = self.merge(defaults.posts().unwrap_or(&[])).len();
        self.store.add(id, len)
    }

    pub fn remove(&mut self, id: PostId) -> Option<Pointer> { self.store.remove_id(id) }

    /// Apply a completed drag. Ignored when nothing is displayed or the event is invalid.
    pub fn apply_drag(&mut self, event: &DragEvent) -> bool {
        match self.merged() {
            Some(merged) => self.store.apply_reorder(&merged, event),
            None => false,
        }
    }

    pub fn retry_defaults(&self) -> CacheState {
        if crate::controller::is_blank(self.title()) {
            return CacheState::Absent;
        }
        self.controller.defaults().retry(self.title())
    }

    pub fn retry_search(&self) -> CacheState {
        if crate::controller::is_blank(self.search_text()) {
            return CacheState::Absent;
        }
        self.controller.search().retry(self.search_text())
    }

    /// Cut the debounce short for the title and return its slot to wait on.
    pub fn flush_title(&mut self) -> Option<watch::Receiver<CacheState>> { self.controller.flush_title() }

    pub fn flush_search(&mut self) -> Option<watch::Receiver<CacheState>> { self.controller.flush_search() }

    pub fn save_payload(&self) -> SavePayload { SavePayload::from(self.store.as_slice()) }

    fn merge(&self, defaults: &[Post]) -> Vec<MergedEntry> {
        merge_with(self.config.pointer_order, defaults, self.store.as_slice(), &self.posts)
    }
}
