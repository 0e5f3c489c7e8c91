//! Resource Client
//!
//! Generic CRUD client for one OData resource collection, addressed as
//! `{base}/{resource}` and `{base}/{resource}({id})`.

use super::error::ApiError;
use super::http::{ODataHttp, RawResponse};
use super::query::ODataQuery;
use super::resource::{Key, ListPage, ODataList, Record, Resource};
use crate::config::ClientConfig;
use std::fmt;
use std::marker::PhantomData;

/// Client for one resource collection
pub struct ResourceClient<T = Record> {
    http: ODataHttp,
    resource_name: String,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            resource_name: self.resource_name.clone(),
            _item: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ResourceClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("base_path", &self.http.config().base_path())
            .field("resource_name", &self.resource_name)
            .finish()
    }
}

impl<T: Resource> ResourceClient<T> {
    /// Create a client with its own HTTP transport
    pub fn new(config: ClientConfig, resource_name: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self::with_http(ODataHttp::new(config)?, resource_name))
    }

    /// Create a client sharing an existing transport
    pub fn with_http(http: ODataHttp, resource_name: impl Into<String>) -> Self {
        Self {
            http,
            resource_name: resource_name.into(),
            _item: PhantomData,
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn key_name(&self) -> &'static str {
        T::KEY_NAME
    }

    /// `{base}/{resource}`
    pub fn collection_url(&self) -> String {
        self.http.url(&self.resource_name)
    }

    /// `{base}/{resource}({id})`
    pub fn entity_url(&self, id: Key) -> String {
        format!("{}({})", self.collection_url(), id)
    }

    /// List the collection
    ///
    /// Items come back in server order with `ModifiedDate` decoded.
    pub async fn list(&self, query: &ODataQuery) -> Result<ListPage<T>, ApiError> {
        let response = self.http.get(&self.collection_url(), &query.to_params()).await?;
        let list: ODataList<T> = response.json()?;

        tracing::debug!(
            "Listed {} {} (count: {:?})",
            list.value.len(),
            self.resource_name,
            list.count
        );

        Ok(list.into())
    }

    /// Fetch one item
    pub async fn get_by_id(&self, id: Key, select: Option<&str>) -> Result<RawResponse, ApiError> {
        let id = self.require_id(id, "get_by_id")?;
        let query = ODataQuery::select_only(select);
        self.http.get(&self.entity_url(id), &query.to_params()).await
    }

    /// Create an item
    pub async fn create(&self, item: &T) -> Result<RawResponse, ApiError> {
        self.http.post(&self.collection_url(), item).await
    }

    /// Patch an existing item
    pub async fn update(&self, id: Key, item: &T) -> Result<RawResponse, ApiError> {
        let id = self.require_id(id, "update")?;
        self.http.patch(&self.entity_url(id), item).await
    }

    /// Delete an item, optionally guarded by an `If-Match` precondition
    pub async fn delete(&self, id: Key, if_match: Option<&str>) -> Result<RawResponse, ApiError> {
        let id = self.require_id(id, "delete")?;
        self.http.delete(&self.entity_url(id), if_match).await
    }

    /// Update the item when its key is set, create it otherwise
    ///
    /// A key that is set but is not an integer is rejected; it never falls
    /// through to `create`.
    pub async fn save(&self, item: &T, is_edited: bool) -> Result<RawResponse, ApiError> {
        if !item.has_key() {
            tracing::debug!("Saving new {} item (edited: {})", self.resource_name, is_edited);
            return self.create(item).await;
        }

        let id = item.key().ok_or_else(|| ApiError::unusable(T::KEY_NAME, "save"))?;
        tracing::debug!("Saving {}({}) as update (edited: {})", self.resource_name, id, is_edited);
        self.update(id, item).await
    }

    /// Placeholder key for items not yet persisted
    pub fn new_id(&self) -> Key {
        0
    }

    fn require_id(&self, id: Key, operation: &'static str) -> Result<Key, ApiError> {
        if id == 0 {
            return Err(ApiError::missing(T::KEY_NAME, operation));
        }
        Ok(id)
    }
}
