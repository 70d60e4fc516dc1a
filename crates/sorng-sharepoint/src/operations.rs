//! Table-driven Graph operations.
//!
//! Every passthrough call is one row of [`OPERATIONS`]: a verb, a path
//! template with `{placeholders}`, and whether it takes a body and OData
//! options. [`execute`] is the single executor behind all of them.

use crate::api_client::GraphApiClient;
use crate::envelope::check_payload;
use crate::error::{SharePointError, SharePointErrorCode, SharePointResult};
use crate::odata::{CONSISTENCY_LEVEL_EVENTUAL, CONSISTENCY_LEVEL_HEADER};
use crate::types::OperationArgs;
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};

/// Path-segment encoding. Commas and colons stay literal: composite site
/// ids (`host,siteGuid,webGuid`) and `root:/path:` addressing rely on them.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl HttpVerb {
    pub fn method(&self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Patch => Method::PATCH,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

/// One Graph endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Operation {
    pub name: &'static str,
    pub verb: HttpVerb,
    pub path: &'static str,
    /// Requires a JSON body.
    pub body: bool,
    /// Accepts OData query options.
    pub odata: bool,
}

const fn op(name: &'static str, verb: HttpVerb, path: &'static str, body: bool, odata: bool) -> Operation {
    Operation { name, verb, path, body, odata }
}

use HttpVerb::{Delete, Get, Patch, Post, Put};

/// Every supported passthrough operation.
pub const OPERATIONS: &[Operation] = &[
    // ── Sites ──
    op("get_root_site", Get, "sites/root", false, true),
    op("get_site", Get, "sites/{site_id}", false, true),
    op("get_site_by_path", Get, "sites/{hostname}:/{server_relative_path}", false, true),
    op("list_sites", Get, "sites", false, true),
    op("list_subsites", Get, "sites/{site_id}/sites", false, true),
    op("list_followed_sites", Get, "me/followedSites", false, true),
    op("get_site_analytics", Get, "sites/{site_id}/analytics", false, true),
    // ── Lists ──
    op("list_lists", Get, "sites/{site_id}/lists", false, true),
    op("get_list", Get, "sites/{site_id}/lists/{list_id}", false, true),
    op("create_list", Post, "sites/{site_id}/lists", true, false),
    op("update_list", Patch, "sites/{site_id}/lists/{list_id}", true, false),
    op("delete_list", Delete, "sites/{site_id}/lists/{list_id}", false, false),
    // ── List items ──
    op("list_items", Get, "sites/{site_id}/lists/{list_id}/items", false, true),
    op("get_item", Get, "sites/{site_id}/lists/{list_id}/items/{item_id}", false, true),
    op("create_item", Post, "sites/{site_id}/lists/{list_id}/items", true, false),
    op("update_item_fields", Patch, "sites/{site_id}/lists/{list_id}/items/{item_id}/fields", true, false),
    op("delete_item", Delete, "sites/{site_id}/lists/{list_id}/items/{item_id}", false, false),
    op("list_item_versions", Get, "sites/{site_id}/lists/{list_id}/items/{item_id}/versions", false, true),
    // ── Columns ──
    op("list_site_columns", Get, "sites/{site_id}/columns", false, true),
    op("list_list_columns", Get, "sites/{site_id}/lists/{list_id}/columns", false, true),
    op("create_list_column", Post, "sites/{site_id}/lists/{list_id}/columns", true, false),
    op("delete_list_column", Delete, "sites/{site_id}/lists/{list_id}/columns/{column_id}", false, false),
    // ── Content types ──
    op("list_content_types", Get, "sites/{site_id}/contentTypes", false, true),
    op("get_content_type", Get, "sites/{site_id}/contentTypes/{content_type_id}", false, true),
    op("list_list_content_types", Get, "sites/{site_id}/lists/{list_id}/contentTypes", false, true),
    // ── Drives ──
    op("list_site_drives", Get, "sites/{site_id}/drives", false, true),
    op("get_site_drive", Get, "sites/{site_id}/drive", false, true),
    op("list_drive_root_children", Get, "drives/{drive_id}/root/children", false, true),
    op("list_drive_children", Get, "drives/{drive_id}/items/{item_id}/children", false, true),
    op("get_drive_item", Get, "drives/{drive_id}/items/{item_id}", false, true),
    op("get_drive_item_by_path", Get, "drives/{drive_id}/root:/{item_path}", false, true),
    op("update_drive_item", Patch, "drives/{drive_id}/items/{item_id}", true, false),
    op("delete_drive_item", Delete, "drives/{drive_id}/items/{item_id}", false, false),
    op("create_drive_folder", Post, "drives/{drive_id}/items/{item_id}/children", true, false),
    op("search_drive", Get, "drives/{drive_id}/root/search(q='{query}')", false, true),
    // ── Pages ──
    op("list_pages", Get, "sites/{site_id}/pages", false, true),
    op("get_page", Get, "sites/{site_id}/pages/{page_id}/microsoft.graph.sitePage", false, true),
    op("create_page", Post, "sites/{site_id}/pages", true, false),
    op("publish_page", Post, "sites/{site_id}/pages/{page_id}/microsoft.graph.sitePage/publish", false, false),
    op("delete_page", Delete, "sites/{site_id}/pages/{page_id}", false, false),
    // ── Permissions ──
    op("list_site_permissions", Get, "sites/{site_id}/permissions", false, true),
    op("get_site_permission", Get, "sites/{site_id}/permissions/{permission_id}", false, true),
    op("create_site_permission", Post, "sites/{site_id}/permissions", true, false),
    op("update_site_permission", Patch, "sites/{site_id}/permissions/{permission_id}", true, false),
    op("delete_site_permission", Delete, "sites/{site_id}/permissions/{permission_id}", false, false),
    op("list_drive_item_permissions", Get, "drives/{drive_id}/items/{item_id}/permissions", false, true),
    // ── Term store ──
    op("list_term_groups", Get, "sites/{site_id}/termStore/groups", false, true),
    op("list_term_sets", Get, "sites/{site_id}/termStore/groups/{group_id}/sets", false, true),
    // ── Misc ──
    op("replace_drive_item_content", Put, "drives/{drive_id}/items/{item_id}/content", true, false),
    op("search_query", Post, "search/query", true, false),
];

/// Look up an operation by name.
pub fn find(name: &str) -> Option<&'static Operation> {
    OPERATIONS.iter().find(|o| o.name == name)
}

impl Operation {
    /// Placeholder names in template order.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        let mut rest = self.path;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else { break };
            out.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }
        out
    }

    /// Fill the template, percent-encoding every value.
    pub fn render_path(&self, args: &OperationArgs) -> SharePointResult<String> {
        let mut path = self.path.to_string();
        for name in self.placeholders() {
            let value = args
                .path
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SharePointError::missing_parameter(name))?;
            let encoded = if name.ends_with("_path") {
                // Nested paths keep their separators.
                value
                    .trim_matches('/')
                    .split('/')
                    .map(|seg| utf8_percent_encode(seg, SEGMENT).to_string())
                    .collect::<Vec<_>>()
                    .join("/")
            } else if name == "query" {
                // OData string literal: single quotes are doubled.
                utf8_percent_encode(&value.replace('\'', "''"), SEGMENT).to_string()
            } else {
                utf8_percent_encode(value, SEGMENT).to_string()
            };
            path = path.replace(&format!("{{{}}}", name), &encoded);
        }
        Ok(path)
    }
}

/// Run one operation. Returns the raw Graph payload; body-less successes
/// (`204`) become `{}` so they are distinguishable from a missing payload.
pub async fn execute(
    client: &GraphApiClient,
    operation: &Operation,
    args: &OperationArgs,
) -> SharePointResult<Value> {
    let path = operation.render_path(args)?;

    let body = if operation.body {
        Some(args.body.as_ref().ok_or_else(|| SharePointError::missing_parameter("body"))?)
    } else {
        None
    };

    let (query, headers) = if operation.odata {
        (args.query.to_pairs(), consistency_headers(args))
    } else {
        (Vec::new(), &[][..])
    };

    debug!("execute {} -> {:?} {}", operation.name, operation.verb, path);
    let raw = client
        .send(operation.verb.method(), &path, &query, body, headers)
        .await?;

    if raw.is_null() && matches!(operation.verb, HttpVerb::Delete | HttpVerb::Post) {
        return Ok(json!({}));
    }
    Ok(raw)
}

/// Follow `@odata.nextLink` across pages of a collection operation and
/// concatenate the `value` arrays. `max_pages == 0` means no limit.
///
/// Every page is held to the same failure rules as a single call; the
/// first failing page fails the whole listing.
pub async fn list_all(
    client: &GraphApiClient,
    operation: &Operation,
    args: &OperationArgs,
    max_pages: usize,
) -> SharePointResult<Value> {
    if operation.verb != HttpVerb::Get {
        return Err(not_a_collection(operation));
    }
    let headers = if operation.odata {
        consistency_headers(args)
    } else {
        &[][..]
    };

    let mut items: Vec<Value> = Vec::new();
    let mut page = check_payload(execute(client, operation, args).await?)?;
    let mut pages = 1usize;

    loop {
        match page.get_mut("value").and_then(Value::as_array_mut) {
            Some(arr) => items.append(arr),
            None => return Err(not_a_collection(operation)),
        }
        let next = page
            .get("@odata.nextLink")
            .and_then(Value::as_str)
            .map(String::from);
        match next {
            Some(link) if max_pages == 0 || pages < max_pages => {
                debug!("{}: following nextLink (page {})", operation.name, pages + 1);
                let raw = client.send(Method::GET, &link, &[], None, headers).await?;
                page = check_payload(raw)?;
                pages += 1;
            }
            _ => break,
        }
    }

    let count = items.len();
    Ok(json!({ "value": items, "count": count }))
}

/// `ConsistencyLevel: eventual` whenever `$search` is in play.
fn consistency_headers(args: &OperationArgs) -> &'static [(&'static str, &'static str)] {
    if args.query.needs_eventual_consistency() {
        &[(CONSISTENCY_LEVEL_HEADER, CONSISTENCY_LEVEL_EVENTUAL)]
    } else {
        &[]
    }
}

fn not_a_collection(operation: &Operation) -> SharePointError {
    SharePointError::new(
        SharePointErrorCode::InvalidRequest,
        format!("{} does not return a collection", operation.name),
    )
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
