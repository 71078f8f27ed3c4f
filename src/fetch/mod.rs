//! Generic list/detail fetcher with filter, ordering, and paging parameters.

use std::collections::BTreeMap;

use bon::Builder;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::{GatewayError, Result};
use crate::gateway::{Gateway, PendingRequest};

/// Sort direction for `orderBy`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query parameters understood by the backend's list endpoints.
///
/// # Example
/// ```
/// use authgate::fetch::{FetchQuery, SortOrder};
/// use serde_json::json;
///
/// let query = FetchQuery::builder()
///     .filter(("status".to_string(), json!("open")))
///     .order_by(("createdAt".to_string(), SortOrder::Desc))
///     .limit(20)
///     .build();
/// let params = query.to_params();
/// assert_eq!(params[0], ("filter".to_string(), r#"["status","open"]"#.to_string()));
/// ```
#[derive(Debug, Clone, Default, Builder)]
pub struct FetchQuery {
    pub filter: Option<(String, Value)>,
    pub order_by: Option<(String, SortOrder)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    #[builder(default)]
    pub additional: BTreeMap<String, Value>,
}

impl FetchQuery {
    /// Flatten into query pairs.
    ///
    /// `filter` and `orderBy` are JSON tuples. Zero `limit`/`offset` are
    /// omitted. Additional params come last and replace earlier keys; `null`
    /// values are dropped and arrays become repeated `key[]` pairs.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some((name, value)) = &self.filter {
            let filter = Value::from(vec![Value::from(name.as_str()), value.clone()]);
            params.push(("filter".to_string(), filter.to_string()));
        }
        if let Some((field, order)) = &self.order_by {
            params.push((
                "orderBy".to_string(),
                Value::from(vec![field.to_string(), order.to_string()]).to_string(),
            ));
        }
        if let Some(limit) = self.limit.filter(|n| *n != 0) {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset.filter(|n| *n != 0) {
            params.push(("offset".to_string(), offset.to_string()));
        }
        for (key, value) in &self.additional {
            let array_key = format!("{key}[]");
            params.retain(|(k, _)| k != key && *k != array_key);
            match value {
                Value::Null => {}
                Value::Array(items) => params.extend(
                    items
                        .iter()
                        .filter(|item| !item.is_null())
                        .map(|item| (array_key.clone(), scalar_text(item))),
                ),
                other => params.push((key.clone(), scalar_text(other))),
            }
        }
        params
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Gateway {
    /// GET `path` with `query` and decode a `200` body.
    ///
    /// Any other accepted status fails with [`GatewayError::Fetch`].
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, query: &FetchQuery) -> Result<T> {
        let request = PendingRequest::get(path).with_query(query.to_params());
        let response = self.send(request).await?;
        if response.status != StatusCode::OK {
            return Err(GatewayError::Fetch {
                status: response.status.as_u16(),
                status_text: response.status_text().to_string(),
                body: response.json_value(),
            });
        }
        response.json()
    }
}
