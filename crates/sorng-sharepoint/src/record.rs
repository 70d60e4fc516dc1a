//! Best-effort flattening of a search hit `resource` into a [`SearchRecord`].
//!
//! Graph resources are not uniformly shaped: fields may appear in camelCase
//! or snake_case, and some only surface inside an `additionalData` bag. Each
//! field is looked up through [`LOOKUP_CHAIN`]; the first non-null value wins.

use crate::types::SearchRecord;
use serde_json::Value;

/// Extensions stripped from the last URL segment when deriving a title.
const PAGE_EXTENSIONS: &[&str] = &[".aspx", ".html", ".htm"];

/// Bags that may hold fields the typed surface did not model.
const ADDITIONAL_DATA_KEYS: &[&str] = &["additionalData", "additional_data"];

type Accessor = for<'a> fn(&'a Value, &[&str]) -> Option<&'a Value>;

/// Lookup order: exact key, alternate casing, then the additional-data bag.
const LOOKUP_CHAIN: &[Accessor] = &[direct, alternate_casing, additional_data];

/// Resolve a dotted field path (canonical camelCase segments).
pub fn lookup<'a>(resource: &'a Value, path: &[&str]) -> Option<&'a Value> {
    LOOKUP_CHAIN
        .iter()
        .find_map(|accessor| accessor(resource, path).filter(|v| !v.is_null()))
}

/// Like [`lookup`], rendered as text. Numbers are stringified because
/// Graph is inconsistent about numeric ids such as `listItemId`.
pub fn lookup_str(resource: &Value, path: &[&str]) -> Option<String> {
    match lookup(resource, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn direct<'a>(resource: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(resource, |node, segment| node.as_object()?.get(*segment))
}

fn alternate_casing<'a>(resource: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(resource, |node, segment| {
        let obj = node.as_object()?;
        let snake = camel_to_snake(segment);
        obj.get(&snake)
            .or_else(|| obj.get(&snake_to_camel(segment)))
    })
}

fn additional_data<'a>(resource: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let obj = resource.as_object()?;
    ADDITIONAL_DATA_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|bag| {
            direct(bag, path)
                .filter(|v| !v.is_null())
                .or_else(|| alternate_casing(bag, path).filter(|v| !v.is_null()))
        })
}

/// `parentReference` → `parent_reference`.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `parent_reference` → `parentReference`.
pub fn snake_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Turn a file name into a human title: strip a known page extension and
/// replace `-` / `_` with spaces. `"KT-Session.aspx"` → `"KT Session"`.
pub fn title_from_file_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let stem = PAGE_EXTENSIONS
        .iter()
        .find(|ext| lower.ends_with(*ext))
        .map(|ext| &name[..name.len() - ext.len()])
        .unwrap_or(name);
    stem.replace(['-', '_'], " ")
}

/// Title from the trailing path segment of a URL; query and fragment are
/// ignored.
pub fn title_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    title_from_file_name(segment)
}

/// Flatten one hit resource. `None` when it carries no URL, since the URL
/// is the de-duplication key.
pub fn record_from_resource(resource: &Value) -> Option<SearchRecord> {
    let web_url = lookup_str(resource, &["webUrl"]).filter(|u| !u.is_empty())?;

    Some(SearchRecord {
        id: lookup_str(resource, &["id"]),
        name: lookup_str(resource, &["name"])
            .or_else(|| lookup_str(resource, &["displayName"])),
        title: title_from_url(&web_url),
        description: lookup_str(resource, &["description"]),
        site_id: lookup_str(resource, &["parentReference", "siteId"])
            .or_else(|| lookup_str(resource, &["sharepointIds", "siteId"])),
        list_item_id: lookup_str(resource, &["sharepointIds", "listItemId"]),
        created_date_time: lookup_str(resource, &["createdDateTime"]),
        last_modified_date_time: lookup_str(resource, &["lastModifiedDateTime"]),
        web_url,
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
