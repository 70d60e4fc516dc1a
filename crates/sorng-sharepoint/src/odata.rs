//! OData system query options (`$select`, `$expand`, `$filter`, `$orderby`,
//! `$search`, `$top`, `$skip`, `$count`) as accepted by Graph.

use serde::{Deserialize, Serialize};

/// Header Graph requires for advanced queries such as `$search`.
pub const CONSISTENCY_LEVEL_HEADER: &str = "ConsistencyLevel";
pub const CONSISTENCY_LEVEL_EVENTUAL: &str = "eventual";

/// Query options for a single Graph request. Empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ODataQuery {
    pub select: Vec<String>,
    pub expand: Vec<String>,
    pub filter: Option<String>,
    pub orderby: Vec<String>,
    pub search: Option<String>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
    pub count: bool,
}

impl ODataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn expand<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand = relations.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.filter = Some(expr.into());
        self
    }

    pub fn orderby<I, S>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.orderby = clauses.into_iter().map(Into::into).collect();
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn top(mut self, n: u32) -> Self {
        self.top = Some(n);
        self
    }

    pub fn skip(mut self, n: u32) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn count(mut self, on: bool) -> Self {
        self.count = on;
        self
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `$search` needs `ConsistencyLevel: eventual` on directory objects.
    pub fn needs_eventual_consistency(&self) -> bool {
        self.search_term().is_some()
    }

    /// Render as `(name, value)` pairs for `RequestBuilder::query`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.select.is_empty() {
            pairs.push(("$select".to_string(), self.select.join(",")));
        }
        if !self.expand.is_empty() {
            pairs.push(("$expand".to_string(), self.expand.join(",")));
        }
        if let Some(ref f) = self.filter {
            if !f.trim().is_empty() {
                pairs.push(("$filter".to_string(), f.clone()));
            }
        }
        if !self.orderby.is_empty() {
            pairs.push(("$orderby".to_string(), self.orderby.join(",")));
        }
        if let Some(term) = self.search_term() {
            pairs.push(("$search".to_string(), quote_search_term(term)));
        }
        if let Some(top) = self.top {
            pairs.push(("$top".to_string(), top.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("$skip".to_string(), skip.to_string()));
        }
        if self.count {
            pairs.push(("$count".to_string(), "true".to_string()));
        }
        pairs
    }
}

/// Graph expects `$search="term"`; already-quoted terms pass through.
fn quote_search_term(term: &str) -> String {
    if term.len() >= 2 && term.starts_with('"') && term.ends_with('"') {
        term.to_string()
    } else {
        format!("\"{}\"", term)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
