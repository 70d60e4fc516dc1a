//! Shared types for the SharePoint / Microsoft Graph integration.
//!
//! Covers connection configuration, search targets and their paging limits,
//! the flattened search record, and the argument bundle accepted by the
//! table-driven operation executor.

use crate::odata::ODataQuery;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════

/// Default Graph endpoint.
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Configuration for a SharePoint / Graph API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SharePointConfig {
    /// Graph API base URL.  Default: `https://graph.microsoft.com/v1.0`.
    pub graph_base_url: String,
    /// Timeout in seconds for HTTP calls.  Default: none (client default).
    pub timeout_sec: Option<u64>,
    /// Search page size used when the caller passes no `top`.  Default: 25.
    pub default_page_size: u32,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for SharePointConfig {
    fn default() -> Self {
        Self {
            graph_base_url: GRAPH_BASE_URL.into(),
            timeout_sec: None,
            default_page_size: 25,
            user_agent: concat!("sorng-sharepoint/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl SharePointConfig {
    /// Defaults overlaid with `SHAREPOINT_GRAPH_BASE_URL`,
    /// `SHAREPOINT_TIMEOUT_SEC` and `SHAREPOINT_PAGE_SIZE`. Unparseable
    /// numbers are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("SHAREPOINT_GRAPH_BASE_URL") {
            if !url.trim().is_empty() {
                config.graph_base_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        if let Some(secs) = std::env::var("SHAREPOINT_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.timeout_sec = Some(secs);
        }
        if let Some(size) = std::env::var("SHAREPOINT_PAGE_SIZE")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            config.default_page_size = size;
        }
        config
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Search
// ═══════════════════════════════════════════════════════════════════════

/// What a search request is scoped to. Each target maps to exactly one
/// Graph `entityTypes` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTarget {
    Sites,
    Pages,
    Files,
    Lists,
}

impl SearchTarget {
    /// Graph `entityTypes` value.
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Sites => "site",
            Self::Pages => "listItem",
            Self::Files => "driveItem",
            Self::Lists => "list",
        }
    }

    /// Largest `size` the search endpoint accepts for this entity type.
    pub fn max_page_size(&self) -> u32 {
        match self {
            Self::Pages => 50,
            Self::Sites | Self::Files | Self::Lists => 500,
        }
    }

    /// KQL used when the caller's query is blank.
    pub fn default_query(&self) -> &'static str {
        match self {
            Self::Pages => "contentclass:STS_ListItem_WebPageLibrary",
            Self::Sites | Self::Files | Self::Lists => "*",
        }
    }

    /// Plural noun used in envelope messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Sites => "sites",
            Self::Pages => "pages",
            Self::Files => "files",
            Self::Lists => "lists",
        }
    }
}

/// Single-field sort for a search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Caller-facing search options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Free text or KQL. Blank means the target's catch-all query.
    pub query: Option<String>,
    /// Requested page size; clamped to the target's maximum.
    pub top: Option<u32>,
    /// Zero-based offset into the result set.
    pub offset: u32,
    pub sort: Option<SortSpec>,
}

/// Flat record extracted from one search hit resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Human title derived from the last URL segment.
    pub title: String,
    pub web_url: String,
    pub description: Option<String>,
    pub site_id: Option<String>,
    pub list_item_id: Option<String>,
    pub created_date_time: Option<String>,
    pub last_modified_date_time: Option<String>,
}

/// De-duplicated result of one search call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchAggregate {
    pub items: Vec<SearchRecord>,
    pub count: usize,
    pub more_results_available: bool,
}

// ═══════════════════════════════════════════════════════════════════════
//  Operation executor
// ═══════════════════════════════════════════════════════════════════════

/// Arguments for one table-driven Graph operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationArgs {
    /// Values for `{placeholder}` segments of the path template.
    pub path: HashMap<String, String>,
    /// OData query options; ignored by operations that take none.
    pub query: ODataQuery,
    /// JSON request body for POST / PATCH / PUT operations.
    pub body: Option<serde_json::Value>,
}

impl OperationArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set one path parameter.
    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path.insert(name.to_string(), value.into());
        self
    }

    /// Builder: replace the OData query options.
    pub fn with_query(mut self, query: ODataQuery) -> Self {
        self.query = query;
        self
    }

    /// Builder: set the JSON body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
