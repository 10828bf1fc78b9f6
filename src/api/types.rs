//! Serde types matching the items API.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single item as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(alias = "created_at")]
  pub created_at: String,
  #[serde(alias = "updated_at")]
  pub updated_at: String,
}

impl Item {
  /// Creation date formatted as a local calendar date.
  ///
  /// Offset-aware timestamps are converted to local time; naive ones are taken
  /// as-is. Anything unparseable is returned unchanged.
  pub fn created_date(&self) -> String {
    format_date(&self.created_at)
  }
}

/// Response of `GET /items`.
///
/// `total` is reported by the server and is not reconciled with `items.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemListResponse {
  #[serde(default)]
  pub items: Vec<Item>,
  #[serde(default)]
  pub total: u64,
}

/// Payload of `POST /items`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItemRequest {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// Format an ISO-8601 timestamp as `YYYY-MM-DD`
pub fn format_date(timestamp: &str) -> String {
  if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
    return dt.with_timezone(&Local).format("%Y-%m-%d").to_string();
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
    return naive.format("%Y-%m-%d").to_string();
  }
  timestamp.to_string()
}
