//! Catalog service: create, browse, search, update, delete.
//!
//! Field validation lives in the `sweet` module constructors; this service
//! owns orchestration against the catalog store and timestamp stamping.

use std::sync::Arc;

use mockable::Clock;
use pagination::{PageEnvelope, PageRequest};
use thiserror::Error;

use super::ports::{SweetPersistenceError, SweetRepository};
use super::sweet::{Sweet, SweetDraft, SweetFilter, SweetId, SweetUpdate};

/// Typed failures of the catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No sweet with the given id exists.
    #[error("Sweet not found")]
    NotFound,
    /// The catalog store failed.
    #[error(transparent)]
    Storage(#[from] SweetPersistenceError),
}

/// CRUD service over the catalog store.
#[derive(Clone)]
pub struct CatalogService {
    sweets: Arc<dyn SweetRepository>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    /// Create a service over the given store.
    pub fn new(sweets: Arc<dyn SweetRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { sweets, clock }
    }

    /// Persist a new sweet from a validated draft.
    pub async fn create(&self, draft: SweetDraft) -> Result<Sweet, CatalogError> {
        let sweet = Sweet::create(draft, self.clock.utc());
        self.sweets.insert(&sweet).await?;
        Ok(sweet)
    }

    /// One page of sweets, newest first.
    pub async fn list(&self, request: PageRequest) -> Result<PageEnvelope<Sweet>, CatalogError> {
        let (items, total) = self.sweets.page(request).await?;
        Ok(PageEnvelope::assemble(items, total, request))
    }

    /// All sweets matching the filter, newest first.
    pub async fn search(&self, filter: &SweetFilter) -> Result<Vec<Sweet>, CatalogError> {
        Ok(self.sweets.search(filter).await?)
    }

    /// Apply a partial update and stamp `updated_at`.
    pub async fn update(
        &self,
        id: &SweetId,
        update: &SweetUpdate,
    ) -> Result<Sweet, CatalogError> {
        self.sweets
            .update(id, update, self.clock.utc())
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Remove a sweet from the catalog.
    pub async fn delete(&self, id: &SweetId) -> Result<(), CatalogError> {
        if self.sweets.delete(id).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound)
        }
    }
}
