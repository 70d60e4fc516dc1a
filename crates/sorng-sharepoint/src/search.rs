//! Site / page / file / list search via the Graph `/search/query` API.
//!
//! One request per call, scoped to a single entity type. The nested
//! response (`value[] → hitsContainers[] → hits[] → resource`) is flattened
//! and de-duplicated by web URL; the first occurrence of a URL wins.

use crate::api_client::GraphApiClient;
use crate::envelope::check_payload;
use crate::error::SharePointResult;
use crate::record::record_from_resource;
use crate::types::{SearchAggregate, SearchOptions, SearchRecord, SearchTarget};
use log::debug;
use serde_json::{json, Value};
use std::collections::HashSet;

const SEARCH_PATH: &str = "search/query";

/// Search operations.
pub struct SharePointSearch<'a> {
    client: &'a GraphApiClient,
    default_page_size: u32,
}

impl<'a> SharePointSearch<'a> {
    pub fn new(client: &'a GraphApiClient, default_page_size: u32) -> Self {
        Self {
            client,
            default_page_size,
        }
    }

    /// Run one search and aggregate the hits.
    pub async fn search(
        &self,
        target: SearchTarget,
        options: &SearchOptions,
    ) -> SharePointResult<SearchAggregate> {
        let body = build_request(target, options, self.default_page_size);
        debug!(
            "Search {} query={:?} size={} from={}",
            target.entity_type(),
            body["requests"][0]["query"]["queryString"],
            body["requests"][0]["size"],
            options.offset
        );
        let resp = check_payload(self.client.post(SEARCH_PATH, &body).await?)?;
        let aggregate = aggregate_hits(&resp);
        debug!(
            "Search {} returned {} unique items",
            target.entity_type(),
            aggregate.count
        );
        Ok(aggregate)
    }
}

/// Effective page size: requested (or default), clamped to `1..=max`.
pub fn clamp_page_size(target: SearchTarget, top: Option<u32>, default_page_size: u32) -> u32 {
    top.unwrap_or(default_page_size)
        .clamp(1, target.max_page_size())
}

/// Blank queries fall back to the target's catch-all KQL.
pub fn effective_query(target: SearchTarget, query: Option<&str>) -> String {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => target.default_query().to_string(),
    }
}

/// Build the `/search/query` request body.
pub fn build_request(target: SearchTarget, options: &SearchOptions, default_page_size: u32) -> Value {
    let mut request = json!({
        "entityTypes": [target.entity_type()],
        "query": { "queryString": effective_query(target, options.query.as_deref()) },
        "from": options.offset,
        "size": clamp_page_size(target, options.top, default_page_size),
    });
    if let Some(ref sort) = options.sort {
        if !sort.field.trim().is_empty() {
            request["sortProperties"] = json!([{
                "name": sort.field.trim(),
                "isDescending": sort.descending,
            }]);
        }
    }
    json!({ "requests": [request] })
}

/// Walk every container of every response and keep the first record per URL.
/// Missing or malformed levels are treated as empty.
pub fn aggregate_hits(resp: &Value) -> SearchAggregate {
    let mut seen: HashSet<String> = HashSet::new();
    let mut items: Vec<SearchRecord> = Vec::new();
    let mut more_results_available = false;

    let containers = as_slice(resp.get("value"))
        .iter()
        .flat_map(|r| as_slice(r.get("hitsContainers")));

    for container in containers {
        if container
            .get("moreResultsAvailable")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            more_results_available = true;
        }
        for hit in as_slice(container.get("hits")) {
            let Some(record) = hit.get("resource").and_then(record_from_resource) else {
                continue;
            };
            if seen.insert(record.web_url.clone()) {
                items.push(record);
            }
        }
    }

    SearchAggregate {
        count: items.len(),
        items,
        more_results_available,
    }
}

fn as_slice(v: Option<&Value>) -> &[Value] {
    v.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
