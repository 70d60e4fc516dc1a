//! High-level SharePoint service – the single facade consumed by the
//! application layer.
//!
//! Holds one pre-authenticated [`GraphApiClient`] and exposes every
//! operation as an `async fn(&self)` returning a [`ResponseEnvelope`].
//! Nothing here fails to the caller; errors are folded into the envelope.

use crate::api_client::GraphApiClient;
use crate::envelope::ResponseEnvelope;
use crate::error::{SharePointError, SharePointResult};
use crate::odata::ODataQuery;
use crate::operations::{self, Operation};
use crate::search::SharePointSearch;
use crate::types::*;
use log::{info, warn};
use std::sync::Arc;

/// Shared handle; every method takes `&self`, so no lock is needed.
pub type SharePointServiceState = Arc<SharePointService>;

/// Top-level service for one SharePoint tenant connection.
pub struct SharePointService {
    client: GraphApiClient,
    config: SharePointConfig,
}

impl SharePointService {
    /// Build a service around an already-acquired access token.
    pub fn new(config: SharePointConfig, access_token: &str) -> SharePointResult<Self> {
        let client = GraphApiClient::new(&config, access_token)?;
        info!("SharePoint service ready ({})", config.graph_base_url);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SharePointConfig {
        &self.config
    }

    /// Get a `SharePointSearch` helper.
    pub fn search(&self) -> SharePointSearch<'_> {
        SharePointSearch::new(&self.client, self.config.default_page_size)
    }

    // ─── Search aggregation ──────────────────────────────────────────

    /// Search and de-duplicate; always returns an envelope.
    pub async fn search_and_aggregate(
        &self,
        target: SearchTarget,
        options: &SearchOptions,
    ) -> ResponseEnvelope {
        match self.search().search(target, options).await {
            Ok(aggregate) => {
                let message = format!("Found {} {}", aggregate.count, target.noun());
                match serde_json::to_value(&aggregate) {
                    Ok(data) => ResponseEnvelope::ok_with_message(data, message),
                    Err(e) => ResponseEnvelope::from(SharePointError::from(e)),
                }
            }
            Err(e) => {
                warn!("Search {} failed: {}", target.entity_type(), e);
                ResponseEnvelope::from(e)
            }
        }
    }

    pub async fn search_sites(&self, options: &SearchOptions) -> ResponseEnvelope {
        self.search_and_aggregate(SearchTarget::Sites, options).await
    }

    pub async fn search_pages(&self, options: &SearchOptions) -> ResponseEnvelope {
        self.search_and_aggregate(SearchTarget::Pages, options).await
    }

    pub async fn search_files(&self, options: &SearchOptions) -> ResponseEnvelope {
        self.search_and_aggregate(SearchTarget::Files, options).await
    }

    pub async fn search_lists(&self, options: &SearchOptions) -> ResponseEnvelope {
        self.search_and_aggregate(SearchTarget::Lists, options).await
    }

    // ─── Table-driven passthrough ────────────────────────────────────

    /// Run a named operation from the operation table.
    pub async fn execute(&self, operation: &str, args: &OperationArgs) -> ResponseEnvelope {
        let result = match Self::resolve(operation) {
            Ok(op) => operations::execute(&self.client, op, args).await,
            Err(e) => Err(e),
        };
        self.finish(operation, result)
    }

    /// Run a collection operation across every `@odata.nextLink` page
    /// (`max_pages == 0` for no limit).
    pub async fn list_all(
        &self,
        operation: &str,
        args: &OperationArgs,
        max_pages: usize,
    ) -> ResponseEnvelope {
        let result = match Self::resolve(operation) {
            Ok(op) => operations::list_all(&self.client, op, args, max_pages).await,
            Err(e) => Err(e),
        };
        self.finish(operation, result)
    }

    // ─── Typed conveniences ──────────────────────────────────────────

    pub async fn get_site(&self, site_id: &str, query: ODataQuery) -> ResponseEnvelope {
        let args = OperationArgs::new().param("site_id", site_id).with_query(query);
        self.execute("get_site", &args).await
    }

    pub async fn list_lists(&self, site_id: &str, query: ODataQuery) -> ResponseEnvelope {
        let args = OperationArgs::new().param("site_id", site_id).with_query(query);
        self.execute("list_lists", &args).await
    }

    pub async fn list_items(
        &self,
        site_id: &str,
        list_id: &str,
        query: ODataQuery,
    ) -> ResponseEnvelope {
        let args = OperationArgs::new()
            .param("site_id", site_id)
            .param("list_id", list_id)
            .with_query(query);
        self.execute("list_items", &args).await
    }

    pub async fn list_pages(&self, site_id: &str, query: ODataQuery) -> ResponseEnvelope {
        let args = OperationArgs::new().param("site_id", site_id).with_query(query);
        self.execute("list_pages", &args).await
    }

    // ─── Internal ────────────────────────────────────────────────────

    fn resolve(name: &str) -> SharePointResult<&'static Operation> {
        operations::find(name).ok_or_else(|| SharePointError::unknown_operation(name))
    }

    fn finish(&self, operation: &str, result: SharePointResult<serde_json::Value>) -> ResponseEnvelope {
        let envelope = ResponseEnvelope::from(result);
        if let Some(ref err) = envelope.error {
            warn!("{} failed: {}", operation, err);
        }
        envelope
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
