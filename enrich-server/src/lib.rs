//! enrich-server library
//!
//! Person records enriched with age, gender and nationality inferred from
//! external name lookup providers, served over a REST interface with
//! filterable, paginated listing.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod person;
pub mod query;
pub mod service;
pub mod store;

pub use error::{ServiceError, ServiceResult};
pub use service::PersonService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PersonService>,
}

impl AppState {
    pub fn new(service: PersonService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/people", get(api::list_people).post(api::create_person))
        .route(
            "/people/:id",
            get(api::get_person)
                .put(api::update_person)
                .delete(api::delete_person),
        )
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
