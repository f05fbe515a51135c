//! Health checks and request id handling.

use axum::http::{Method, StatusCode};
use tower::ServiceExt;

use songpin_api::middleware::REQUEST_ID_HEADER;
use songpin_integration_tests::{get, request, test_app};

#[tokio::test]
async fn test_liveness_and_readiness() {
    let app = test_app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = get(&app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let mut req = request(Method::GET, "/health", None);
    req.headers_mut()
        .insert(REQUEST_ID_HEADER, "edge-1234".parse().unwrap());

    let response = test_app().oneshot(req).await.unwrap();
    assert_eq!(
        response.headers().get(REQUEST_ID_HEADER).unwrap(),
        "edge-1234"
    );
}

#[tokio::test]
async fn test_request_id_generated() {
    let response = test_app()
        .oneshot(request(Method::GET, "/api/users", None))
        .await
        .unwrap();

    let id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = get(&test_app(), "/api/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
