//! JSON command bridge.
//!
//! Every command is prefixed with `sp_`, takes the shared
//! `SharePointServiceState`, and answers with the envelope serialised as a
//! JSON string.

use serde_json::Value;
use sorng_sharepoint::operations::OPERATIONS;
use sorng_sharepoint::{OperationArgs, ResponseEnvelope, SearchOptions, SearchTarget, SharePointServiceState};

/// Route one named call. Search operations take `SearchOptions` JSON,
/// `list_all:<operation>` pages through a collection, everything else takes
/// `OperationArgs` JSON. An empty argument string means defaults.
pub async fn sp_invoke(state: &SharePointServiceState, operation: &str, args_json: &str) -> String {
  let args_json = if args_json.trim().is_empty() { "{}" } else { args_json };

  let envelope = if let Some(target) = search_target(operation) {
    match serde_json::from_str::<SearchOptions>(args_json) {
      Ok(options) => state.search_and_aggregate(target, &options).await,
      Err(e) => invalid_args(operation, e),
    }
  } else if let Some(inner) = operation.strip_prefix("list_all:") {
    match parse_paged_args(args_json) {
      Ok((args, max_pages)) => state.list_all(inner, &args, max_pages).await,
      Err(e) => invalid_args(operation, e),
    }
  } else {
    match serde_json::from_str::<OperationArgs>(args_json) {
      Ok(args) => state.execute(operation, &args).await,
      Err(e) => invalid_args(operation, e),
    }
  };

  envelope.to_json_string()
}

/// Names of every callable operation, table rows and searches alike.
pub fn sp_list_operations() -> String {
  let rows: Vec<Value> = OPERATIONS
    .iter()
    .map(|op| serde_json::to_value(op).unwrap_or(Value::Null))
    .collect();
  let searches = ["search_sites", "search_pages", "search_files", "search_lists"];
  ResponseEnvelope::ok_with_message(
    serde_json::json!({ "operations": rows, "searches": searches }),
    format!("{} operations", rows.len() + searches.len()),
  )
  .to_json_string()
}

fn search_target(operation: &str) -> Option<SearchTarget> {
  match operation {
    "search_sites" => Some(SearchTarget::Sites),
    "search_pages" => Some(SearchTarget::Pages),
    "search_files" => Some(SearchTarget::Files),
    "search_lists" => Some(SearchTarget::Lists),
    _ => None,
  }
}

/// `OperationArgs` plus an optional `max_pages` member (default 0, no limit).
fn parse_paged_args(args_json: &str) -> serde_json::Result<(OperationArgs, usize)> {
  let raw: Value = serde_json::from_str(args_json)?;
  let max_pages = raw
    .get("max_pages")
    .and_then(Value::as_u64)
    .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX));
  let args = serde_json::from_value(raw)?;
  Ok((args, max_pages))
}

fn invalid_args(operation: &str, err: serde_json::Error) -> ResponseEnvelope {
  log::warn!("{}: rejected arguments: {}", operation, err);
  ResponseEnvelope::fail(format!("Invalid arguments for {}: {}", operation, err))
}
