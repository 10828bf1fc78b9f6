//! HTTP access to the items API: a generic JSON client and the typed items service.

pub mod client;
pub mod items;
#[cfg(test)]
pub mod test_server;
pub mod types;

pub use client::ApiClient;
pub use items::ItemsService;
pub use types::{CreateItemRequest, Item, ItemListResponse};
