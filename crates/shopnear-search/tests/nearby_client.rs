//! Integration tests for `NearbyClient` and the coordinator using wiremock HTTP mocks.

use std::sync::Arc;

use shopnear_core::{Position, ProximityQuery, Radius, ResultKind};
use shopnear_search::{
    CoordinatorError, NearbyClient, ProximityQueryCoordinator, QueryStatus, SearchError,
    SearchOutcome,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> NearbyClient {
    NearbyClient::new(base_url, 30, "shopnear-test").expect("client construction should not fail")
}

fn mumbai() -> Position {
    Position::new(19.0760, 72.8777).unwrap()
}

fn query(kind: ResultKind, radius_m: f64) -> ProximityQuery {
    ProximityQuery {
        position: mumbai(),
        radius: Radius::from_meters(radius_m).unwrap(),
        kind,
    }
}

#[tokio::test]
async fn fetch_nearby_sends_position_and_radius_in_meters() {
    let server = MockServer::start().await;

    let body = serde_json::json!([
        {
            "id": 1,
            "name": "Bandra Bakes",
            "position": {"latitude": 19.0596, "longitude": 72.8295},
            "distanceMeters": 2300.0,
            "address": {"area": "Bandra", "city": "Mumbai", "pincode": "400050"}
        },
        {
            "id": 2,
            "name": "Mystery Mart",
            "position": null
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/api/shops/nearby"))
        .and(query_param("latitude", "19.076"))
        .and(query_param("longitude", "72.8777"))
        .and(query_param("radius", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/api", server.uri()));
    let results = client
        .fetch_nearby(&query(ResultKind::Shops, 5000.0))
        .await
        .expect("should parse nearby shops");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "Bandra Bakes");
    assert_eq!(results[0].distance_label(), "2.3 km");
    assert_eq!(results[0].address_label(), "Bandra, Mumbai, 400050");
    assert!(results[0].position.is_some());

    assert_eq!(results[1].name, "Mystery Mart");
    assert!(results[1].position.is_none());
    assert_eq!(results[1].distance_label(), "Unknown distance");
}

#[tokio::test]
async fn fetch_nearby_products_uses_products_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/nearby"))
        .and(query_param("radius", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"product_id": 77, "product_name": "Mango Pickle", "distance_meters": 640}
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let results = client
        .fetch_nearby(&query(ResultKind::Products, 1000.0))
        .await
        .expect("should parse nearby products");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "77");
    assert_eq!(results[0].distance_label(), "640 m");
}

#[tokio::test]
async fn server_error_maps_to_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shops/nearby"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "boom"})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_nearby(&query(ResultKind::Shops, 5000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::UnexpectedStatus { status: 500, .. }));
}

#[tokio::test]
async fn non_array_body_is_unexpected_shape() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shops/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"shops": []})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_nearby(&query(ResultKind::Shops, 5000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::UnexpectedShape { .. }));
}

#[tokio::test]
async fn invalid_json_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shops/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_nearby(&query(ResultKind::Shops, 5000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Deserialize { .. }));
}

#[tokio::test]
async fn coordinator_keeps_last_good_results_when_backend_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/shops/nearby"))
        .and(query_param("radius", "10000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "name": "Still Here", "latitude": 19.07, "longitude": 72.87}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shops/nearby"))
        .and(query_param("radius", "20000"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let coordinator = Arc::new(ProximityQueryCoordinator::new(test_client(&server.uri())));

    let first = coordinator
        .search(mumbai(), Radius::from_km(10.0).unwrap(), ResultKind::Shops)
        .await
        .expect("first query should succeed");
    assert!(matches!(first, SearchOutcome::Applied(ref r) if r.len() == 1));

    let err = coordinator
        .search(mumbai(), Radius::from_km(20.0).unwrap(), ResultKind::Shops)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::FetchFailed {
            source: SearchError::UnexpectedStatus { status: 503, .. },
            ..
        }
    ));

    let snapshot = coordinator.snapshot(ResultKind::Shops);
    assert_eq!(snapshot.status, QueryStatus::Failed);
    assert_eq!(snapshot.results.len(), 1);
    assert_eq!(snapshot.results[0].name, "Still Here");
    assert!(snapshot.error.is_some());
}
