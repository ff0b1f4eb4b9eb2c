//! Record service: composes normalization, SQL construction, enrichment
//! and storage for each person operation

use std::sync::Arc;

use enrich_common::db::Person;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, Span};

use crate::enrichment::Enrichment;
use crate::error::{ServiceError, ServiceResult};
use crate::person::{NewPerson, PersonPatch};
use crate::query::{build_select, normalize, ListRequest, QueryParams};
use crate::store::PersonStore;

/// Person operations exposed over HTTP
///
/// Holds no per-request state; one instance is shared by all handlers.
pub struct PersonService {
    store: Arc<dyn PersonStore>,
    enricher: Arc<dyn Enrichment>,
    span: Span,
}

impl PersonService {
    /// Operations are traced as children of `span`
    pub fn new(store: Arc<dyn PersonStore>, enricher: Arc<dyn Enrichment>, span: Span) -> Self {
        Self {
            store,
            enricher,
            span,
        }
    }

    /// List people matching the query parameters
    ///
    /// An empty mapping lists every row without a predicate.
    #[instrument(parent = &self.span, skip_all)]
    pub async fn list(&self, params: &QueryParams) -> ServiceResult<Vec<Person>> {
        match normalize(params)? {
            ListRequest::Unfiltered => {
                debug!("Unfiltered listing");
                Ok(self.store.list_all().await?)
            }
            ListRequest::Filtered {
                filters,
                pagination,
            } => {
                let query = build_select(&filters, pagination);
                Ok(self.store.list(&query).await?)
            }
        }
    }

    #[instrument(parent = &self.span, skip(self))]
    pub async fn get(&self, id: i64) -> ServiceResult<Person> {
        self.store.get(id).await.map_err(|e| store_error(id, e))
    }

    /// Validate, enrich and insert a person; returns the new id
    ///
    /// A non-empty name replaces any supplied age, gender and nationality
    /// with the enrichment result.
    #[instrument(parent = &self.span, skip_all)]
    pub async fn create(&self, payload: &Map<String, Value>) -> ServiceResult<i64> {
        let patch = PersonPatch::from_json(payload)?;
        let mut person = NewPerson::from_patch(patch)?;

        if !person.name.is_empty() {
            let attributes = self.enricher.enrich(&person.name).await;
            person.apply(attributes);
        }

        let id = self.store.create(&person).await?;
        info!(id, "Created person");
        Ok(id)
    }

    /// Apply a partial update; `id` in the payload is ignored
    #[instrument(parent = &self.span, skip(self, payload))]
    pub async fn update(&self, id: i64, mut payload: Map<String, Value>) -> ServiceResult<()> {
        payload.remove("id");

        let patch = PersonPatch::from_json(&payload)?;
        if patch.is_empty() {
            return Err(ServiceError::EmptyUpdate);
        }

        self.store
            .update(id, &patch)
            .await
            .map_err(|e| store_error(id, e))?;
        info!("Updated person");
        Ok(())
    }

    #[instrument(parent = &self.span, skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.store.delete(id).await.map_err(|e| store_error(id, e))?;
        info!("Deleted person");
        Ok(())
    }
}

fn store_error(id: i64, err: enrich_common::Error) -> ServiceError {
    match err {
        enrich_common::Error::NotFound(_) => ServiceError::NotFound(id),
        other => ServiceError::Store(other),
    }
}
