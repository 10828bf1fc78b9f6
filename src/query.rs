//! Async query abstraction for data fetching with a shared, keyed cache.
//!
//! Inspired by TanStack Query / SWR, `Query<T>` encapsulates async data
//! fetching, loading states, and error handling. Queries obtained from a
//! `QueryClient` under the same key share one cache entry, so any number of
//! views can mount the same query without issuing duplicate requests.
//!
//! # Example
//!
//! ```ignore
//! let service = items_service.clone();
//! let mut query = queries.query("/items", move || {
//!     let service = service.clone();
//!     async move { service.list().await.map_err(|e| e.to_string()) }
//! });
//!
//! // Start fetching unless another handle already did
//! query.mount();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match query.state() {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Success(data) => render_data(data),
//!     QueryState::Error(e) => render_error(e),
//!     QueryState::Idle => {}
//! }
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// State shared by every handle on the same query
struct Entry<T> {
  state: QueryState<T>,
  fetched_at: Option<Instant>,
  /// Bumped when a fetch starts; results from older generations are dropped
  generation: u64,
  /// Bumped on every observable change
  version: u64,
  /// A background revalidation is in flight
  validating: bool,
}

impl<T> Entry<T> {
  fn new() -> Self {
    Self {
      state: QueryState::Idle,
      fetched_at: None,
      generation: 0,
      version: 0,
      validating: false,
    }
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Async query for data fetching with state management.
///
/// Query<T> encapsulates:
/// - The fetching logic (via a closure)
/// - Loading/success/error states, shared between clones
/// - A local snapshot of the state, refreshed by `poll()`
/// - Stale time tracking and optional background revalidation
#[derive(Clone)]
pub struct Query<T> {
  entry: Arc<Mutex<Entry<T>>>,
  fetcher: FetcherFn<T>,
  state: QueryState<T>,
  fetched_at: Option<Instant>,
  validating: bool,
  seen_version: u64,
  stale_time: Duration,
  refresh_interval: Option<Duration>,
}

impl<T: Clone + Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure that returns a future. It will be called
  /// each time a fetch is started.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      entry: Arc::new(Mutex::new(Entry::new())),
      fetcher: Arc::new(move || fetcher().boxed()),
      state: QueryState::Idle,
      fetched_at: None,
      validating: false,
      seen_version: 0,
      stale_time: Duration::from_secs(60), // Default 1 minute
      refresh_interval: None,
    }
  }

  /// Set the stale time for this query.
  ///
  /// After this duration, the data is considered stale and `is_stale()` returns true.
  #[cfg(test)]
  pub fn with_stale_time(mut self, duration: Duration) -> Self {
    self.stale_time = duration;
    self
  }

  /// Revalidate in the background whenever successful data is older than `interval`
  pub fn with_refresh_interval(mut self, interval: Option<Duration>) -> Self {
    self.refresh_interval = interval;
    self
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Get the data if the query succeeded.
  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Check if the query is currently loading.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Check if the query succeeded.
  pub fn is_success(&self) -> bool {
    self.state.is_success()
  }

  /// Check if the query failed.
  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  /// Get the error message if the query failed.
  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Whether a background revalidation is running
  pub fn is_validating(&self) -> bool {
    self.validating
  }

  /// Check if the data is stale (older than stale_time).
  pub fn is_stale(&self) -> bool {
    match &self.state {
      QueryState::Success(_) => self
        .fetched_at
        .map(|t| t.elapsed() > self.stale_time)
        .unwrap_or(true),
      _ => false,
    }
  }

  /// Fetch on first use.
  ///
  /// Starts a fetch only if no handle on this entry has started one yet, so
  /// mounting the same query from several views yields a single request.
  /// Mounting onto a failed entry retries it; mounting onto stale data shows
  /// it and revalidates in the background.
  pub fn mount(&mut self) {
    let needs_fetch = matches!(
      lock(&self.entry).state,
      QueryState::Idle | QueryState::Error(_)
    );
    if needs_fetch {
      self.start_fetch(FetchMode::Reset);
      return;
    }
    self.sync();
    if self.is_stale() {
      self.revalidate();
    }
  }

  /// Start fetching data if not already loading.
  ///
  /// This is a no-op if the query is already loading.
  pub fn fetch(&mut self) {
    let loading = lock(&self.entry).state.is_loading();
    if loading {
      self.sync();
      return;
    }
    self.start_fetch(FetchMode::Reset);
  }

  /// Force a refetch, even if already loading or data exists.
  ///
  /// Any fetch still in flight is superseded and its result discarded.
  pub fn refetch(&mut self) {
    self.start_fetch(FetchMode::Reset);
  }

  /// Re-issue the fetch while keeping the current data visible.
  ///
  /// No-op while another fetch for this entry is in flight.
  pub fn revalidate(&mut self) {
    let busy = {
      let entry = lock(&self.entry);
      entry.state.is_loading() || entry.validating
    };
    if busy {
      self.sync();
      return;
    }
    self.start_fetch(FetchMode::Background);
  }

  /// Pick up changes made by in-flight fetches or other handles.
  ///
  /// Returns `true` if the state changed since the last poll.
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    if self.due_for_revalidation() {
      self.revalidate();
    }
    self.sync()
  }

  fn due_for_revalidation(&self) -> bool {
    match (self.refresh_interval, &self.state, self.fetched_at) {
      (Some(interval), QueryState::Success(_), Some(at)) => !self.validating && at.elapsed() >= interval,
      _ => false,
    }
  }

  /// Copy the shared state into the local snapshot if it moved on
  fn sync(&mut self) -> bool {
    let entry = lock(&self.entry);
    if entry.version == self.seen_version {
      return false;
    }
    self.state = entry.state.clone();
    self.fetched_at = entry.fetched_at;
    self.validating = entry.validating;
    self.seen_version = entry.version;
    true
  }

  fn start_fetch(&mut self, mode: FetchMode) {
    let generation = {
      let mut entry = lock(&self.entry);
      entry.generation += 1;
      match mode {
        FetchMode::Reset => {
          entry.state = QueryState::Loading;
          entry.validating = false;
        }
        FetchMode::Background => entry.validating = true,
      }
      entry.version += 1;
      entry.generation
    };

    let future = (self.fetcher)();
    let entry = Arc::clone(&self.entry);
    tokio::spawn(async move {
      let result = AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .unwrap_or_else(|_| Err("Query task panicked".to_string()));
      settle(&entry, generation, result);
    });

    self.sync();
  }
}

#[derive(Debug, Clone, Copy)]
enum FetchMode {
  /// Drop current data and go back to `Loading`
  Reset,
  /// Keep current data until the new result lands
  Background,
}

fn settle<T>(entry: &Mutex<Entry<T>>, generation: u64, result: Result<T, String>) {
  let mut entry = lock(entry);
  if entry.generation != generation {
    tracing::debug!(generation, "Discarding superseded query result");
    return;
  }
  match result {
    Ok(data) => {
      entry.state = QueryState::Success(data);
      entry.fetched_at = Some(Instant::now());
    }
    Err(error) => {
      tracing::warn!(%error, "Query failed");
      entry.state = QueryState::Error(error);
    }
  }
  entry.validating = false;
  entry.version += 1;
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("fetched_at", &self.fetched_at)
      .field("stale_time", &self.stale_time)
      .finish_non_exhaustive()
  }
}

/// Keyed cache of queries.
///
/// Handing out the same key twice returns handles onto one shared entry.
#[derive(Clone, Default)]
pub struct QueryClient {
  queries: Arc<Mutex<HashMap<String, Box<dyn Any + Send>>>>,
  refresh_interval: Option<Duration>,
}

impl QueryClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Background revalidation interval applied to queries created by this client
  pub fn with_refresh_interval(mut self, interval: Option<Duration>) -> Self {
    self.refresh_interval = interval;
    self
  }

  /// Get a handle on the query cached under `key`, creating it with `fetcher`
  /// if this is the first request for that key.
  ///
  /// The fetcher of an existing entry wins; later fetchers are ignored.
  pub fn query<T, F, Fut>(&self, key: impl Into<String>, fetcher: F) -> Query<T>
  where
    T: Clone + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    let key = key.into();
    let mut queries = lock(&self.queries);

    if let Some(existing) = queries
      .get(&key)
      .and_then(|q| q.downcast_ref::<Query<T>>())
    {
      return existing.clone();
    }

    tracing::debug!(%key, "Creating query cache entry");
    let query = Query::new(fetcher).with_refresh_interval(self.refresh_interval);
    queries.insert(key, Box::new(query.clone()));
    query
  }

  /// Drop the entry cached under `key`.
  ///
  /// Entries otherwise live as long as the client. Handles already given out
  /// keep working; the next `query` for the key starts from scratch.
  pub fn remove(&self, key: &str) {
    if lock(&self.queries).remove(key).is_some() {
      tracing::debug!(%key, "Evicted query cache entry");
    }
  }

  #[cfg(test)]
  pub fn contains_key(&self, key: &str) -> bool {
    lock(&self.queries).contains_key(key)
  }
}

impl std::fmt::Debug for QueryClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let keys: Vec<String> = lock(&self.queries).keys().cloned().collect();
    f.debug_struct("QueryClient")
      .field("keys", &keys)
      .field("refresh_interval", &self.refresh_interval)
      .finish()
  }
}
