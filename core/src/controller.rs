use crate::cache::CacheState;
use crate::debounce::Debouncer;
use crate::ResultCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Owns the two query strings of a session and drives their caches.
///
/// The title feeds the default-results preview, the search text feeds the
/// candidate panel. Text updates are immediate; lookups are debounced.
pub struct QueryController {
    title: String,
    search_text: String,
    title_debounce: Debouncer,
    search_debounce: Debouncer,
    defaults: Arc<ResultCache>,
    search: Arc<ResultCache>,
}

impl QueryController {
    /// A non-empty starting title is looked up right away, without the quiet period.
    pub fn new(title: String, defaults: Arc<ResultCache>, search: Arc<ResultCache>, debounce: Duration) -> Self {
        if !is_blank(&title) {
            defaults.request(&title);
        }
        Self {
            title,
            search_text: String::new(),
            title_debounce: Debouncer::new(debounce),
            search_debounce: Debouncer::new(debounce),
            defaults,
            search,
        }
    }

    pub fn title(&self) -> &str { &self.title }
    pub fn search_text(&self) -> &str { &self.search_text }
    pub fn defaults(&self) -> &ResultCache { &self.defaults }
    pub fn search(&self) -> &ResultCache { &self.search }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        arm(&mut self.title_debounce, &self.defaults, &self.title);
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        arm(&mut self.search_debounce, &self.search, &self.search_text);
    }

    /// Default results for the current title, `Absent` while the title is blank.
    pub fn default_state(&self) -> CacheState {
        if is_blank(&self.title) {
            return CacheState::Absent;
        }
        self.defaults.state(&self.title)
    }

    pub fn search_state(&self) -> CacheState {
        if is_blank(&self.search_text) {
            return CacheState::Absent;
        }
        self.search.state(&self.search_text)
    }

    /// Skip the quiet period for the current title and return its slot.
    pub fn flush_title(&mut self) -> Option<watch::Receiver<CacheState>> {
        self.title_debounce.cancel();
        (!is_blank(&self.title)).then(|| self.defaults.subscribe(&self.title))
    }

    pub fn flush_search(&mut self) -> Option<watch::Receiver<CacheState>> {
        self.search_debounce.cancel();
        (!is_blank(&self.search_text)).then(|| self.search.subscribe(&self.search_text))
    }
}

pub(crate) fn is_blank(text: &str) -> bool { text.trim().is_empty() }

fn arm(debouncer: &mut Debouncer, cache: &Arc<ResultCache>, text: &str) {
    if is_blank(text) {
        debouncer.cancel();
        return;
    }
    let cache = cache.clone();
    let key = text.to_string();
    debouncer.schedule(move || {
        tracing::debug!(key = %key, "debounce elapsed");
        cache.request(&key);
    });
}
