//! OData API interaction module
//!
//! This module provides the resource client used to list, read, create,
//! update and delete items of a backend resource collection.
//!
//! # Module Structure
//!
//! - [`client`] - Generic resource client (`{base}/{resource}` and `{base}/{resource}(id)`)
//! - [`http`] - HTTP transport with default headers and error handling
//! - [`query`] - OData query descriptor (`$filter`, `$select`, ...)
//! - [`resource`] - Resource item trait, dynamic records and list pages
//! - [`error`] - Error type shared by all operations
//!
//! # Example
//!
//! ```ignore
//! use odata_admin::{ClientConfig, ODataQuery, Record, ResourceClient};
//!
//! async fn example() -> Result<(), odata_admin::ApiError> {
//!     let config = ClientConfig::new("http://localhost:2000/odata")?;
//!     let products: ResourceClient<Record> = ResourceClient::new(config, "Products")?;
//!     let page = products.list(&ODataQuery::new().top(10).count(true)).await?;
//!     println!("{} of {:?}", page.items.len(), page.count);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod query;
pub mod resource;

pub use client::ResourceClient;
pub use error::{format_api_error, ApiError, GENERIC_SERVER_ERROR};
pub use http::{ODataHttp, RawResponse};
pub use query::ODataQuery;
pub use resource::{modified_date, Key, ListPage, Record, Resource, DEFAULT_KEY_NAME};
