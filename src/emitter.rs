// Show emitters.
// Lazily fetch and cache the list of shows for a featured grouping or a location.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::artsy::{ArtsyClient, Location, Show, ShowKind};
use crate::error::{EmergenceError, Result};

/// Image version used when nothing more specific is asked for.
pub const DEFAULT_IMAGE_VERSION: &str = "large";

/// What an emitter fetches.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowScope {
    Featured { title: String },
    Location { location: Location, kind: ShowKind },
}

impl ShowScope {
    pub fn title(&self) -> &str {
        match self {
            ShowScope::Featured { title } => title,
            ShowScope::Location { location, .. } => &location.name,
        }
    }
}

/// Anything that can produce the shows for a scope.
#[async_trait]
pub trait ShowSource: Send + Sync {
    async fn fetch_shows(&self, scope: &ShowScope) -> Result<Vec<Show>>;
}

#[async_trait]
impl ShowSource for ArtsyClient {
    async fn fetch_shows(&self, scope: &ShowScope) -> Result<Vec<Show>> {
        match scope {
            ShowScope::Featured { .. } => self.get_featured_shows().await,
            ShowScope::Location { location, kind } => self.get_shows_near(location, *kind).await,
        }
    }
}

/// Broad class of a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Unauthenticated,
    Network,
    Decode,
    Other,
}

/// Last fetch failure, kept on the emitter for its caller to inspect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl From<&EmergenceError> for FetchError {
    fn from(err: &EmergenceError) -> Self {
        let kind = match err {
            EmergenceError::Unauthenticated(_) | EmergenceError::MissingCredentials => {
                FetchErrorKind::Unauthenticated
            }
            EmergenceError::Api(_) | EmergenceError::NotFound(_) | EmergenceError::Status { .. } => {
                FetchErrorKind::Network
            }
            EmergenceError::Decode(_) | EmergenceError::Json(_) => FetchErrorKind::Decode,
            _ => FetchErrorKind::Other,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Fetch status of an emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(FetchError),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadingState::Loaded)
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            LoadingState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Position of a show within a grid section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

#[derive(Debug, Default)]
struct EmitterState {
    status: LoadingState,
    /// Last successfully fetched list; failures never replace it.
    shows: Arc<Vec<Show>>,
}

struct EmitterInner {
    scope: ShowScope,
    source: Arc<dyn ShowSource>,
    state: watch::Sender<EmitterState>,
}

impl EmitterInner {
    async fn run_fetch(&self) {
        let title = self.scope.title();
        match self.source.fetch_shows(&self.scope).await {
            Ok(shows) => {
                info!(emitter = %title, count = shows.len(), "shows loaded");
                self.state.send_modify(|state| {
                    state.shows = Arc::new(shows);
                    state.status = LoadingState::Loaded;
                });
            }
            Err(err) => {
                warn!(emitter = %title, error = %err, "failed to load shows");
                let failure = FetchError::from(&err);
                self.state.send_modify(|state| state.status = LoadingState::Failed(failure));
            }
        }
    }

    fn fetch_aborted(&self, err: &JoinError) {
        warn!(emitter = %self.scope.title(), error = %err, "show fetch task died");
        let failure = FetchError {
            kind: FetchErrorKind::Other,
            message: format!("fetch task failed: {}", err),
        };
        self.state.send_modify(|state| state.status = LoadingState::Failed(failure));
    }
}

/// Cached, lazily populated list of shows for one scope.
///
/// Cloning shares the same cache.
#[derive(Clone)]
pub struct ShowEmitter {
    inner: Arc<EmitterInner>,
}

impl std::fmt::Debug for ShowEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShowEmitter")
            .field("scope", &self.inner.scope)
            .field("status", &self.status())
            .field("shows", &self.len())
            .finish()
    }
}

impl ShowEmitter {
    pub fn new(scope: ShowScope, source: Arc<dyn ShowSource>) -> Self {
        let (state, _) = watch::channel(EmitterState::default());
        Self {
            inner: Arc::new(EmitterInner {
                scope,
                source,
                state,
            }),
        }
    }

    /// Featured shows, optionally seeded with shows already at hand.
    pub fn featured(
        title: impl Into<String>,
        initial_shows: Vec<Show>,
        source: Arc<dyn ShowSource>,
    ) -> Self {
        let emitter = Self::new(
            ShowScope::Featured {
                title: title.into(),
            },
            source,
        );
        if !initial_shows.is_empty() {
            emitter.inner.state.send_modify(|state| {
                state.shows = Arc::new(initial_shows);
                state.status = LoadingState::Loaded;
            });
        }
        emitter
    }

    /// Shows near a location.
    pub fn location_based(location: Location, kind: ShowKind, source: Arc<dyn ShowSource>) -> Self {
        Self::new(ShowScope::Location { location, kind }, source)
    }

    pub fn scope(&self) -> &ShowScope {
        &self.inner.scope
    }

    pub fn title(&self) -> &str {
        self.inner.scope.title()
    }

    pub fn location(&self) -> Option<&Location> {
        match &self.inner.scope {
            ShowScope::Location { location, .. } => Some(location),
            ShowScope::Featured { .. } => None,
        }
    }

    /// Start fetching unless a fetch is in flight or shows are already loaded.
    ///
    /// Returns whether a fetch was started. Must be called within a tokio runtime.
    pub fn get_shows(&self) -> bool {
        let started = self.inner.state.send_if_modified(|state| match state.status {
            LoadingState::Idle | LoadingState::Failed(_) => {
                state.status = LoadingState::Loading;
                true
            }
            LoadingState::Loading | LoadingState::Loaded => false,
        });

        if started {
            self.spawn_fetch();
        } else {
            debug!(emitter = %self.title(), "fetch skipped, already loading or loaded");
        }
        started
    }

    /// Fetch again even if loaded. A fetch already in flight is not duplicated.
    pub fn refresh(&self) -> bool {
        let started = self.inner.state.send_if_modified(|state| {
            if state.status.is_loading() {
                false
            } else {
                state.status = LoadingState::Loading;
                true
            }
        });

        if started {
            self.spawn_fetch();
        }
        started
    }

    fn spawn_fetch(&self) {
        debug!(emitter = %self.title(), "fetching shows");
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let fetch = tokio::spawn({
                let inner = inner.clone();
                async move { inner.run_fetch().await }
            });
            // A panicked or cancelled fetch still settles the emitter
            if let Err(err) = fetch.await {
                inner.fetch_aborted(&err);
            }
        });
    }

    /// Wait until no fetch is in flight and return the resulting status.
    pub async fn settled(&self) -> LoadingState {
        let mut rx = self.inner.state.subscribe();
        match rx.wait_for(|state| !state.status.is_loading()).await {
            Ok(state) => state.status.clone(),
            Err(_) => self.status(),
        }
    }

    /// Fetch if needed and wait for the outcome, returning the number of cached shows.
    pub async fn load(&self) -> std::result::Result<usize, FetchError> {
        self.get_shows();
        match self.settled().await {
            LoadingState::Failed(err) => Err(err),
            _ => Ok(self.len()),
        }
    }

    pub fn status(&self) -> LoadingState {
        self.inner.state.borrow().status.clone()
    }

    /// The error from the most recent fetch, if it failed.
    pub fn last_error(&self) -> Option<FetchError> {
        self.inner.state.borrow().status.error().cloned()
    }

    /// Snapshot of the cached shows.
    pub fn shows(&self) -> Arc<Vec<Show>> {
        self.inner.state.borrow().shows.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn show_at_index(&self, index: usize) -> Result<Show> {
        let state = self.inner.state.borrow();
        state
            .shows
            .get(index)
            .cloned()
            .ok_or(EmergenceError::IndexOutOfRange {
                index,
                len: state.shows.len(),
            })
    }

    /// Look up a show by grid position; the section is the emitter's row and is ignored.
    pub fn show_at_index_path(&self, index_path: IndexPath) -> Result<Show> {
        self.show_at_index(index_path.item)
    }

    /// Cover image URLs of the cached shows, in order, for prefetching.
    pub fn image_urls_for_shows(&self, version: &str) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .shows
            .iter()
            .filter_map(|show| show.image_url_for(version))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) fn show(id: &str, image: Option<&str>) -> Show {
        Show {
            id: id.to_string(),
            name: format!("Show {}", id),
            partner: None,
            status: Some("running".to_string()),
            start_at: None,
            end_at: None,
            image_url: image.map(|i| i.to_string()),
            image_versions: vec![],
            images: vec![],
        }
    }

    /// Source that replays queued responses and counts calls.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<Show>>>>,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedSource {
        pub(crate) fn new(responses: Vec<Result<Vec<Show>>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ShowSource for ScriptedSource {
        async fn fetch_shows(&self, _scope: &ShowScope) -> Result<Vec<Show>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn nyc() -> Location {
        Location::new("new-york", "New York", 40.7128, -74.006)
    }

    #[tokio::test]
    async fn test_get_shows_twice_fetches_once() {
        let source = ScriptedSource::new(vec![Ok(vec![show("a", None), show("b", None)])]);
        let emitter = ShowEmitter::location_based(nyc(), ShowKind::Closing, source.clone());

        assert!(emitter.get_shows());
        assert!(!emitter.get_shows());
        assert!(emitter.status().is_loading());

        assert_eq!(emitter.settled().await, LoadingState::Loaded);
        assert_eq!(source.calls(), 1);
        assert_eq!(emitter.len(), 2);

        // Loaded data is not fetched again
        assert!(!emitter.get_shows());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_cached_shows() {
        let source = ScriptedSource::new(vec![
            Ok(vec![show("a", None), show("b", None)]),
            Err(EmergenceError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "upstream".to_string(),
            }),
        ]);
        let emitter = ShowEmitter::location_based(nyc(), ShowKind::Closing, source.clone());
        assert_eq!(emitter.load().await, Ok(2));
        let before = emitter.shows();

        assert!(emitter.refresh());
        let status = emitter.settled().await;

        let err = status.error().unwrap();
        assert_eq!(err.kind, FetchErrorKind::Network);
        assert_eq!(*emitter.shows(), *before);
        assert_eq!(emitter.last_error().unwrap().kind, FetchErrorKind::Network);
    }

    #[tokio::test]
    async fn test_failure_from_empty_then_retry() {
        let source = ScriptedSource::new(vec![
            Err(EmergenceError::Unauthenticated("no token".to_string())),
            Ok(vec![show("a", None)]),
        ]);
        let emitter = ShowEmitter::location_based(nyc(), ShowKind::Upcoming, source.clone());

        let err = emitter.load().await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Unauthenticated);
        assert!(emitter.is_empty());

        // A failed emitter may be asked again
        assert_eq!(emitter.load().await, Ok(1));
        assert_eq!(source.calls(), 2);
        assert!(emitter.last_error().is_none());
    }

    /// Source whose first fetch panics.
    #[derive(Default)]
    struct PanicOnceSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ShowSource for PanicOnceSource {
        async fn fetch_shows(&self, _scope: &ShowScope) -> Result<Vec<Show>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("source blew up");
            }
            Ok(vec![show("a", None)])
        }
    }

    #[tokio::test]
    async fn test_panicking_fetch_fails_and_allows_retry() {
        let source = Arc::new(PanicOnceSource::default());
        let emitter = ShowEmitter::location_based(nyc(), ShowKind::Closing, source.clone());

        let err = emitter.load().await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Other);
        assert!(!emitter.status().is_loading());

        assert_eq!(emitter.load().await, Ok(1));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_while_loading_is_ignored() {
        let source = ScriptedSource::new(vec![Ok(vec![show("a", None)])]);
        let emitter = ShowEmitter::location_based(nyc(), ShowKind::Past, source.clone());

        assert!(emitter.get_shows());
        assert!(!emitter.refresh());
        emitter.settled().await;
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_show_at_index() {
        let source = ScriptedSource::new(vec![Ok(vec![show("a", None), show("b", None)])]);
        let emitter = ShowEmitter::location_based(nyc(), ShowKind::Closing, source);
        emitter.load().await.unwrap();

        assert_eq!(emitter.show_at_index(1).unwrap().id, "b");
        assert_eq!(emitter.show_at_index_path(IndexPath::new(3, 0)).unwrap().id, "a");

        match emitter.show_at_index(2) {
            Err(EmergenceError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 2);
                assert_eq!(len, 2);
            }
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_show_at_index_before_loading() {
        let emitter = ShowEmitter::location_based(nyc(), ShowKind::Closing, ScriptedSource::new(vec![]));
        assert!(matches!(
            emitter.show_at_index(0),
            Err(EmergenceError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_image_urls_skip_shows_without_images() {
        let emitter = ShowEmitter::featured(
            "Featured Shows",
            vec![
                show("a", Some("https://img.example/a/:version.jpg")),
                show("b", None),
                show("c", Some("https://img.example/c/:version.jpg")),
            ],
            ScriptedSource::new(vec![]),
        );

        assert_eq!(
            emitter.image_urls_for_shows("large"),
            vec![
                "https://img.example/a/large.jpg".to_string(),
                "https://img.example/c/large.jpg".to_string()
            ]
        );
    }

    #[test]
    fn test_seeded_featured_emitter_does_not_fetch() {
        let source = ScriptedSource::new(vec![]);
        let emitter = ShowEmitter::featured("Featured Shows", vec![show("a", None)], source.clone());

        assert!(emitter.status().is_loaded());
        assert!(!emitter.get_shows());
        assert_eq!(source.calls(), 0);
        assert_eq!(emitter.title(), "Featured Shows");
        assert!(emitter.location().is_none());
    }

    #[test]
    fn test_fetch_error_classification() {
        let decode = FetchError::from(&EmergenceError::Decode("bad".to_string()));
        assert_eq!(decode.kind, FetchErrorKind::Decode);

        let missing = FetchError::from(&EmergenceError::NotFound("/api/v1/shows".to_string()));
        assert_eq!(missing.kind, FetchErrorKind::Network);

        let other = FetchError::from(&EmergenceError::Other("boom".to_string()));
        assert_eq!(other.kind, FetchErrorKind::Other);
        assert_eq!(other.to_string(), "boom");
    }
}
