//! OData resource client and navigation guard
//!
//! Two independent building blocks for administrative front-ends:
//!
//! - [`api`] - a generic CRUD client speaking OData query conventions
//! - [`guard`] - a navigation guard that asks a view for permission to leave
//!
//! [`config`] holds the immutable client configuration and the persisted
//! settings used by the `odata-admin` binary.

pub mod api;
pub mod config;
pub mod guard;

pub use api::{ApiError, ListPage, ODataQuery, RawResponse, Record, Resource, ResourceClient};
pub use config::ClientConfig;
pub use guard::{CanComponentDeactivate, CanDeactivateGuard, Deactivation, GuardDecision, NavigationGuard};
