//! The shared item-list query every view reads from.

use crate::api::{Item, ItemListResponse, ItemsService};
use crate::query::{Query, QueryClient};

/// Cache key of the item list; every consumer shares this one entry
pub const ITEMS_KEY: &str = "/items";

/// Read side of the item list as the list view sees it
pub trait ItemsSource {
  /// Loaded items, empty until the first fetch succeeds
  fn items(&self) -> &[Item];

  /// Server-reported total, zero until loaded
  fn total(&self) -> u64;

  fn is_loading(&self) -> bool;

  fn is_error(&self) -> bool;

  /// Failure message of the last fetch, if it failed
  fn error(&self) -> Option<&str> {
    None
  }

  /// A background refresh is running while the old items stay visible
  fn is_validating(&self) -> bool {
    false
  }

  /// Re-issue the fetch
  fn refresh(&mut self);

  /// Pick up finished fetches; returns `true` when something changed
  fn poll(&mut self) -> bool {
    false
  }
}

/// Handle on the cached `GET /items` query
#[derive(Clone)]
pub struct ItemsQuery {
  query: Query<ItemListResponse>,
}

/// Mount the item list query, fetching it unless another view already did
pub fn use_items(queries: &QueryClient, service: &ItemsService) -> ItemsQuery {
  let service = service.clone();
  let mut query = queries.query(ITEMS_KEY, move || {
    let service = service.clone();
    async move { service.list().await.map_err(|e| e.to_string()) }
  });
  query.mount();
  ItemsQuery { query }
}

impl ItemsSource for ItemsQuery {
  fn items(&self) -> &[Item] {
    self
      .query
      .data()
      .map(|resp| resp.items.as_slice())
      .unwrap_or(&[])
  }

  fn total(&self) -> u64 {
    self.query.data().map(|resp| resp.total).unwrap_or(0)
  }

  fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  fn is_error(&self) -> bool {
    self.query.is_error()
  }

  fn error(&self) -> Option<&str> {
    self.query.error()
  }

  fn is_validating(&self) -> bool {
    self.query.is_validating()
  }

  fn refresh(&mut self) {
    tracing::info!("Refreshing item list");
    self.query.refetch();
  }

  fn poll(&mut self) -> bool {
    self.query.poll()
  }
}
