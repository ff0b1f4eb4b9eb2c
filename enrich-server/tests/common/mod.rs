//! Shared helpers for enrich-server integration tests
//!
//! Provider lookups are served by a local axum server on an ephemeral
//! port; every hit is recorded so tests can assert what was (or was not)
//! requested.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{Path, Query, RawQuery, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use enrich_common::db::init_memory_database;
use enrich_server::enrichment::{HttpEnricher, ProviderEndpoints};
use enrich_server::query::fold_case;
use enrich_server::store::SqlitePersonStore;
use enrich_server::{build_router, AppState, PersonService};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt;
use tracing::Span;

/// Endpoint that refuses connections
pub const UNREACHABLE: &str = "http://127.0.0.1:1/";

/// Canned answer for one provider
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(StatusCode),
    Raw(&'static str),
}

/// One recorded provider request
#[derive(Debug, Clone)]
pub struct Hit {
    pub provider: String,
    pub raw_query: String,
    pub name: Option<String>,
}

#[derive(Clone)]
struct MockState {
    replies: Arc<HashMap<String, Reply>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

/// Running mock of the age, gender and nationality providers
pub struct MockProviders {
    base: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl MockProviders {
    /// Start a mock answering `/<provider>` with the given replies
    ///
    /// Providers without a reply answer 404.
    pub async fn start(replies: Vec<(&str, Reply)>) -> Self {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            replies: Arc::new(
                replies
                    .into_iter()
                    .map(|(provider, reply)| (provider.to_string(), reply))
                    .collect(),
            ),
            hits: hits.clone(),
        };

        let app = Router::new()
            .route("/:provider", get(provider_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock provider");
        let addr = listener.local_addr().expect("Mock provider has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock provider failed");
        });

        Self {
            base: format!("http://{}", addr),
            hits,
        }
    }

    /// Mock with well-formed answers for all three providers
    pub async fn healthy(age: i64, gender: &str, country: &str) -> Self {
        Self::start(vec![
            ("age", Reply::Json(json!({"count": 10, "name": "x", "age": age}))),
            (
                "gender",
                Reply::Json(json!({"count": 10, "name": "x", "gender": gender, "probability": 0.98})),
            ),
            (
                "nationality",
                Reply::Json(json!({
                    "count": 10,
                    "name": "x",
                    "country": [
                        {"country_id": country, "probability": 0.6},
                        {"country_id": "ZZ", "probability": 0.1}
                    ]
                })),
            ),
        ])
        .await
    }

    pub fn url(&self, provider: &str) -> String {
        format!("{}/{}", self.base, provider)
    }

    pub fn endpoints(&self) -> ProviderEndpoints {
        ProviderEndpoints {
            age_url: self.url("age"),
            gender_url: self.url("gender"),
            nationality_url: self.url("nationality"),
        }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }
}

async fn provider_handler(
    State(state): State<MockState>,
    Path(provider): Path<String>,
    RawQuery(raw_query): RawQuery,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.hits.lock().unwrap().push(Hit {
        provider: provider.clone(),
        raw_query: raw_query.unwrap_or_default(),
        name: query.get("name").cloned(),
    });

    match state.replies.get(&provider) {
        Some(Reply::Json(body)) => Json(body.clone()).into_response(),
        Some(Reply::Status(status)) => (*status, "provider error").into_response(),
        Some(Reply::Raw(text)) => (StatusCode::OK, *text).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Router over an in-memory database, enriching from `endpoints`
pub async fn test_app(endpoints: ProviderEndpoints) -> (Router, SqlitePool) {
    let pool = init_memory_database()
        .await
        .expect("Failed to create in-memory database");
    let store = SqlitePersonStore::new(pool.clone());
    let enricher = HttpEnricher::new(endpoints, Span::none()).expect("Failed to build client");
    let service = PersonService::new(Arc::new(store), Arc::new(enricher), Span::none());

    (build_router(AppState::new(service)), pool)
}

/// Insert a row directly, bypassing enrichment
pub async fn seed(pool: &SqlitePool, name: &str, surname: &str, age: i64, gender: &str, nationality: &str) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO people (
            name, surname, age, gender, nationality,
            name_folded, surname_folded, gender_folded, nationality_folded
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(name)
    .bind(surname)
    .bind(age)
    .bind(gender)
    .bind(nationality)
    .bind(fold_case(name))
    .bind(fold_case(surname))
    .bind(fold_case(gender))
    .bind(fold_case(nationality))
    .execute(pool)
    .await
    .expect("Failed to seed person")
    .last_insert_rowid()
}

/// Send a request and return status plus parsed JSON body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response is not JSON")
    };

    (status, body)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
