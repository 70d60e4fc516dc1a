//! # sorng-sharepoint — Microsoft SharePoint Integration
//!
//! SharePoint client for SortOfRemote NG, built against the
//! **Microsoft Graph API v1.0**.
//!
//! ## Capabilities
//!
//! - **Search** – site, page, file and list search through `/search/query`,
//!   flattened into records and de-duplicated by URL.
//! - **Operations** – a table of Graph endpoints (sites, lists, items,
//!   columns, content types, drives, pages, permissions, term store) run by
//!   one executor with OData query options.
//! - **Pagination** – `@odata.nextLink` following for collections.
//! - **Envelope** – every public call returns
//!   `{success, data, error, message}`; nothing fails to the caller.
//!
//! Authentication is out of scope: the service takes an access token that
//! the caller already acquired.

pub mod types;
pub mod error;
pub mod odata;
pub mod envelope;
pub mod record;
pub mod api_client;
pub mod operations;
pub mod search;
pub mod service;

// Re-exports
pub use envelope::{normalize_response, ResponseEnvelope, EMPTY_RESPONSE_ERROR};
pub use error::{SharePointError, SharePointErrorCode, SharePointResult};
pub use odata::ODataQuery;
pub use record::{title_from_file_name, title_from_url};
pub use service::{SharePointService, SharePointServiceState};
pub use types::*;
