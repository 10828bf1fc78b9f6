use super::client::{ApiClient, RequestConfig};
use super::types::{CreateItemRequest, Item, ItemListResponse};
use color_eyre::Result;

/// Typed operations over the items endpoints
#[derive(Debug, Clone)]
pub struct ItemsService {
  client: ApiClient,
}

impl ItemsService {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }

  pub fn base_url(&self) -> &str {
    self.client.base_url()
  }

  /// Fetch every item along with the server-reported total
  pub async fn list(&self) -> Result<ItemListResponse> {
    self.client.request("/items", RequestConfig::default()).await
  }

  /// Fetch a single item; fails if the server does not know the id
  pub async fn get_by_id(&self, id: &str) -> Result<Item> {
    self
      .client
      .request(&format!("/items/{}", id), RequestConfig::default())
      .await
  }

  /// Submit a new item and return the created representation
  pub async fn create(&self, request: &CreateItemRequest) -> Result<Item> {
    let body = serde_json::to_value(request)?;
    let item: Item = self.client.request("/items", RequestConfig::post(body)).await?;
    tracing::info!(id = %item.id, name = %item.name, "Created item");
    Ok(item)
  }
}
