//! In-process items API used by tests.

use super::types::{CreateItemRequest, Item, ItemListResponse};
use axum::{
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  routing::get,
  Json, Router,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub type Db = Arc<RwLock<Vec<Item>>>;

pub struct TestServer {
  pub base_url: String,
  pub db: Db,
}

impl TestServer {
  /// Insert an item directly, bypassing the HTTP surface
  pub async fn seed(&self, name: &str, description: Option<&str>) -> Item {
    insert(&self.db, name.to_string(), description.map(String::from)).await
  }
}

/// Start the server on a random local port
pub async fn spawn() -> TestServer {
  let db: Db = Arc::default();
  let app = Router::new()
    .route("/items", get(list_items).post(create_item))
    .route("/items/{id}", get(get_item))
    .route("/echo", get(echo_headers))
    .route("/fail", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
    .with_state(db.clone());

  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await });

  TestServer {
    base_url: format!("http://{addr}"),
    db,
  }
}

async fn insert(db: &Db, name: String, description: Option<String>) -> Item {
  let mut items = db.write().await;
  let now = chrono::Utc::now().to_rfc3339();
  let item = Item {
    id: (items.len() + 1).to_string(),
    name,
    description,
    created_at: now.clone(),
    updated_at: now,
  };
  items.push(item.clone());
  item
}

async fn list_items(State(db): State<Db>) -> Json<ItemListResponse> {
  let items = db.read().await.clone();
  let total = items.len() as u64;
  Json(ItemListResponse { items, total })
}

async fn get_item(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Item>, StatusCode> {
  let items = db.read().await;
  items
    .iter()
    .find(|item| item.id == id)
    .cloned()
    .map(Json)
    .ok_or(StatusCode::NOT_FOUND)
}

async fn create_item(
  State(db): State<Db>,
  Json(input): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>), StatusCode> {
  if input.name.trim().is_empty() {
    return Err(StatusCode::UNPROCESSABLE_ENTITY);
  }
  let item = insert(&db, input.name, input.description).await;
  Ok((StatusCode::CREATED, Json(item)))
}

async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
  Json(
    headers
      .iter()
      .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
      .collect(),
  )
}
