//! Enrichment against mock providers: partial failure, malformed answers
//! and request encoding

mod common;

use axum::http::StatusCode;
use common::{get_request, json_request, send, test_app, MockProviders, Reply, UNREACHABLE};
use enrich_server::enrichment::{Attributes, Enrichment, HttpEnricher, ProviderEndpoints};
use serde_json::json;
use tracing::Span;

#[tokio::test]
async fn test_all_providers_answer() {
    let providers = MockProviders::healthy(35, "female", "UA").await;
    let enricher = HttpEnricher::new(providers.endpoints(), Span::none()).unwrap();

    let attributes = enricher.enrich("Olena").await;

    assert_eq!(
        attributes,
        Attributes {
            age: 35,
            gender: "female".to_string(),
            nationality: "UA".to_string(),
        }
    );

    let mut hit_providers: Vec<String> = providers.hits().into_iter().map(|h| h.provider).collect();
    hit_providers.sort();
    assert_eq!(hit_providers, vec!["age", "gender", "nationality"]);
}

#[tokio::test]
async fn test_unreachable_gender_provider_keeps_other_attributes() {
    let providers = MockProviders::healthy(35, "female", "UA").await;
    let endpoints = ProviderEndpoints {
        gender_url: UNREACHABLE.to_string(),
        ..providers.endpoints()
    };
    let enricher = HttpEnricher::new(endpoints, Span::none()).unwrap();

    let attributes = enricher.enrich("Olena").await;

    assert_eq!(attributes.age, 35);
    assert_eq!(attributes.gender, "");
    assert_eq!(attributes.nationality, "UA");
}

#[tokio::test]
async fn test_every_provider_down_yields_zero_values() {
    let endpoints = ProviderEndpoints {
        age_url: UNREACHABLE.to_string(),
        gender_url: UNREACHABLE.to_string(),
        nationality_url: UNREACHABLE.to_string(),
    };
    let enricher = HttpEnricher::new(endpoints, Span::none()).unwrap();

    assert_eq!(enricher.enrich("Olena").await, Attributes::default());
}

#[tokio::test]
async fn test_malformed_and_error_responses_are_no_data() {
    let providers = MockProviders::start(vec![
        ("age", Reply::Raw("{\"age\": ")),
        ("gender", Reply::Status(StatusCode::TOO_MANY_REQUESTS)),
        ("nationality", Reply::Json(json!({"count": 0, "name": "Xq", "country": []}))),
    ])
    .await;
    let enricher = HttpEnricher::new(providers.endpoints(), Span::none()).unwrap();

    assert_eq!(enricher.enrich("Xq").await, Attributes::default());
    assert_eq!(providers.hits().len(), 3);
}

#[tokio::test]
async fn test_null_values_are_no_data() {
    let providers = MockProviders::start(vec![
        ("age", Reply::Json(json!({"count": 0, "name": "Zzz", "age": null}))),
        ("gender", Reply::Json(json!({"count": 0, "name": "Zzz", "gender": null}))),
        ("nationality", Reply::Json(json!({"country": [{"country_id": "PL", "probability": 0.2}]}))),
    ])
    .await;
    let enricher = HttpEnricher::new(providers.endpoints(), Span::none()).unwrap();

    let attributes = enricher.enrich("Zzz").await;
    assert_eq!(attributes.age, 0);
    assert_eq!(attributes.gender, "");
    assert_eq!(attributes.nationality, "PL");
}

#[tokio::test]
async fn test_name_is_sent_url_encoded() {
    let providers = MockProviders::healthy(20, "male", "ES").await;
    let enricher = HttpEnricher::new(providers.endpoints(), Span::none()).unwrap();

    enricher.enrich("José María&x=1").await;

    let hits = providers.hits();
    assert_eq!(hits.len(), 3);
    for hit in hits {
        assert_eq!(hit.name.as_deref(), Some("José María&x=1"));
        assert!(!hit.raw_query.contains(' '), "raw query: {}", hit.raw_query);
        assert!(!hit.raw_query.contains("&x=1"), "raw query: {}", hit.raw_query);
    }
}

#[tokio::test]
async fn test_create_succeeds_when_provider_is_down() {
    let providers = MockProviders::healthy(61, "male", "KZ").await;
    let endpoints = ProviderEndpoints {
        gender_url: UNREACHABLE.to_string(),
        ..providers.endpoints()
    };
    let (app, _) = test_app(endpoints).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/people", r#"{"name": "Nurlan", "surname": "Abenov"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, person) = send(&app, get_request(&format!("/people/{}", body["id"]))).await;
    assert_eq!(person["age"], 61);
    assert_eq!(person["nationality"], "KZ");
    assert!(person.get("gender").is_none());
}

#[tokio::test]
async fn test_create_overwrites_supplied_attributes() {
    let providers = MockProviders::healthy(61, "male", "KZ").await;
    let (app, _) = test_app(providers.endpoints()).await;

    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/people",
            r#"{"name": "Nurlan", "surname": "Abenov", "age": 20, "gender": "female", "nationality": "FR"}"#,
        ),
    )
    .await;

    let (_, person) = send(&app, get_request(&format!("/people/{}", body["id"]))).await;
    assert_eq!(person["age"], 61);
    assert_eq!(person["gender"], "male");
    assert_eq!(person["nationality"], "KZ");
}

#[tokio::test]
async fn test_create_with_empty_name_skips_providers() {
    let providers = MockProviders::healthy(61, "male", "KZ").await;
    let (app, _) = test_app(providers.endpoints()).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/people", r#"{"name": "", "surname": "Abenov", "age": 20}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(providers.hits().is_empty());

    let (_, person) = send(&app, get_request(&format!("/people/{}", body["id"]))).await;
    assert_eq!(person["age"], 20);
}
