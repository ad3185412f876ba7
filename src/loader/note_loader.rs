use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use log::{debug, error, info, warn};
use tokio::time::{sleep, timeout, Instant};

use crate::config::LoaderConfig;
use crate::content::Note;
use crate::events::{EventBus, ViewerEvent};
use crate::loader::fetcher::ContentFetcher;
use crate::utils::error::ViewerError;

/// Markup obtained for a note
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedNote {
    pub note: Note,
    pub content: String,
    pub from_cache: bool,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    content: String,
    stored_at: Instant,
}

/// Loads note markup with caching, per-attempt timeouts and retries
pub struct NoteLoader<F> {
    fetcher: F,
    config: LoaderConfig,
    bus: EventBus,
    cache: RefCell<HashMap<String, CacheEntry>>,
    loading: RefCell<HashSet<String>>,
    errors: RefCell<HashMap<String, ViewerError>>,
    current: RefCell<Option<Note>>,
}

impl<F: ContentFetcher> NoteLoader<F> {
    pub fn new(fetcher: F, config: LoaderConfig, bus: EventBus) -> Self {
        Self {
            fetcher,
            config,
            bus,
            cache: RefCell::new(HashMap::new()),
            loading: RefCell::new(HashSet::new()),
            errors: RefCell::new(HashMap::new()),
            current: RefCell::new(None),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Load the markup for `note`.
    ///
    /// Publishes `NoteLoaded` on success and `NoteLoadError` once every
    /// attempt has failed.
    pub async fn load(&self, note: &Note) -> Result<LoadedNote, ViewerError> {
        self.loading.borrow_mut().insert(note.id.clone());
        let result = self.load_content(note).await;
        self.loading.borrow_mut().remove(&note.id);

        match result {
            Ok(loaded) => {
                self.errors.borrow_mut().remove(&note.id);
                *self.current.borrow_mut() = Some(note.clone());
                info!("Note loaded successfully: {}", note.title);
                self.bus.publish(ViewerEvent::NoteLoaded {
                    note: note.clone(),
                    from_cache: loaded.from_cache,
                });
                Ok(loaded)
            }
            Err(e) => {
                error!("Failed to load note {}: {}", note.title, e);
                self.errors.borrow_mut().insert(note.id.clone(), e.clone());
                self.bus.publish(ViewerEvent::NoteLoadError {
                    note: note.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Drop any cached copy and error for `note`, then load it again
    pub async fn retry(&self, note: &Note) -> Result<LoadedNote, ViewerError> {
        self.errors.borrow_mut().remove(&note.id);
        self.clear_cache(Some(&note.id));
        self.load(note).await
    }

    async fn load_content(&self, note: &Note) -> Result<LoadedNote, ViewerError> {
        if let Some(content) = self.cached(&note.id) {
            debug!("Loading note from cache: {}", note.title);
            return Ok(LoadedNote {
                note: note.clone(),
                content,
                from_cache: true,
            });
        }

        let content = match note.source_url() {
            Some(url) => self.fetch_with_retry(url).await?,
            None => note
                .inline_markup()
                .map(str::to_string)
                .ok_or_else(|| ViewerError::Fetch("Note content URL not specified".to_string()))?,
        };

        if self.config.enable_cache {
            self.cache.borrow_mut().insert(
                note.id.clone(),
                CacheEntry {
                    content: content.clone(),
                    stored_at: Instant::now(),
                },
            );
        }

        Ok(LoadedNote {
            note: note.clone(),
            content,
            from_cache: false,
        })
    }

    fn cached(&self, note_id: &str) -> Option<String> {
        if !self.config.enable_cache {
            return None;
        }
        let cache = self.cache.borrow();
        let entry = cache.get(note_id)?;
        if entry.stored_at.elapsed() < self.config.cache_timeout() {
            Some(entry.content.clone())
        } else {
            debug!("Cache entry for {} expired", note_id);
            None
        }
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String, ViewerError> {
        let attempts = self.config.retry_attempts.max(1);
        let limit = self.config.load_timeout();
        let mut last_error = None;

        for attempt in 1..=attempts {
            debug!("Fetching note content (attempt {}): {}", attempt, url);

            let result = match timeout(limit, self.fetcher.fetch(url)).await {
                Ok(result) => result,
                Err(_) => Err(ViewerError::Timeout(limit)),
            };
            let result = result.and_then(|content| {
                if content.trim().is_empty() {
                    Err(ViewerError::EmptyContent(url.to_string()))
                } else {
                    Ok(content)
                }
            });

            match result {
                Ok(content) => return Ok(content),
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt, e);
                    last_error = Some(e);
                    if attempt < attempts {
                        sleep(self.config.retry_delay() * attempt).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ViewerError::Fetch(format!("No attempt made for {}", url))))
    }

    /// Forget one cached note, or all of them
    pub fn clear_cache(&self, note_id: Option<&str>) {
        match note_id {
            Some(id) => {
                self.cache.borrow_mut().remove(id);
            }
            None => self.cache.borrow_mut().clear(),
        }
    }

    pub fn is_cached(&self, note_id: &str) -> bool {
        self.cached(note_id).is_some()
    }

    pub fn is_loading(&self, note_id: &str) -> bool {
        self.loading.borrow().contains(note_id)
    }

    /// Error from the last failed load of `note_id`
    pub fn error(&self, note_id: &str) -> Option<ViewerError> {
        self.errors.borrow().get(note_id).cloned()
    }

    pub fn current_note(&self) -> Option<Note> {
        self.current.borrow().clone()
    }
}
