//! CLI handler for authenticated GET requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::session::open_store;
use super::GetArgs;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::fetch::{FetchQuery, SortOrder};
use crate::gateway::Gateway;

/// Handle `authgate get <path>`.
pub async fn handle_get(profile: &str, args: GetArgs) -> crate::error::Result<()> {
    let query = build_query(&args).map_err(GatewayError::InvalidRequest)?;
    let store = Arc::new(open_store(profile)?);
    let config = GatewayConfig::from_env();
    let gateway = Gateway::for_target(&config, &args.target, store)?;

    let body: Value = gateway.fetch(&args.path, &query).await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Translate CLI flags into a [`FetchQuery`].
pub fn build_query(args: &GetArgs) -> Result<FetchQuery, String> {
    let filter = args
        .filter
        .as_deref()
        .map(|raw| {
            let (name, value) = split_pair(raw, '=')?;
            Ok::<_, String>((name, parse_value(&value)))
        })
        .transpose()?;

    let order_by = args
        .order_by
        .as_deref()
        .map(|raw| {
            let (field, order) = split_pair(raw, ':')?;
            let order = order
                .parse::<SortOrder>()
                .map_err(|_| format!("invalid sort order '{order}' (expected asc or desc)"))?;
            Ok::<_, String>((field, order))
        })
        .transpose()?;

    let mut additional = BTreeMap::new();
    for raw in &args.params {
        let (key, value) = split_pair(raw, '=')?;
        additional.insert(key, parse_value(&value));
    }

    Ok(FetchQuery {
        filter,
        order_by,
        limit: args.limit,
        offset: args.offset,
        additional,
    })
}

fn split_pair(raw: &str, separator: char) -> Result<(String, String), String> {
    match raw.split_once(separator) {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key{separator}value, got '{raw}'")),
    }
}

/// JSON when it parses, plain text otherwise.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
