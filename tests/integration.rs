use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use courier_dispatch::api::rest::router;
use courier_dispatch::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> axum::Router {
    router(Arc::new(AppState::new()))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn courier(id: i64, courier_type: &str, regions: Value, hours: Value) -> Value {
    json!({
        "courier_id": id,
        "courier_type": courier_type,
        "regions": regions,
        "working_hours": hours
    })
}

fn order(id: i64, weight: f64, region: i64, hours: Value) -> Value {
    json!({
        "order_id": id,
        "weight": weight,
        "region": region,
        "delivery_hours": hours
    })
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["couriers"], 0);
    assert_eq!(body["orders"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("orders_assigned_total"));
}

#[tokio::test]
async fn create_couriers_returns_ids() {
    let app = setup();
    let batch: Vec<Value> = (0..10)
        .map(|i| courier(i, "bike", json!([1, 2]), json!(["09:00-18:00"])))
        .collect();

    let (status, body) = send(&app, json_request("POST", "/couriers", json!({ "data": batch }))).await;

    assert_eq!(status, StatusCode::CREATED);
    let expected: Vec<Value> = (0..10).map(|i| json!({ "id": i })).collect();
    assert_eq!(body, json!({ "couriers": expected }));
}

#[tokio::test]
async fn invalid_courier_type_rejects_batch_and_reports_only_it() {
    let app = setup();
    let mut batch: Vec<Value> = (0..10)
        .map(|i| courier(i, "car", json!([1]), json!(["09:00-18:00"])))
        .collect();
    batch[0] = courier(0, "type", json!([1]), json!(["09:00-18:00"]));

    let (status, body) = send(&app, json_request("POST", "/couriers", json!({ "data": batch }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "validation_error": { "couriers": [{ "id": 0 }] } }));

    let (status, _) = send(&app, get_request("/couriers/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn courier_with_missing_fields_is_rejected() {
    let app = setup();
    let (status, body) = send(
        &app,
        json_request("POST", "/couriers", json!({ "data": [{ "courier_id": 0 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "validation_error": { "couriers": [{ "id": 0 }] } }));
}

#[tokio::test]
async fn duplicate_courier_ids_are_reported() {
    let app = setup();
    let first = json!({ "data": [courier(1, "foot", json!([1]), json!(["09:00-18:00"]))] });
    let (status, _) = send(&app, json_request("POST", "/couriers", first.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, json_request("POST", "/couriers", first)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "validation_error": { "couriers": [{ "id": 1 }] } }));
}

#[tokio::test]
async fn order_weight_out_of_range_is_rejected() {
    let app = setup();
    let batch: Vec<Value> = (0..10)
        .map(|i| order(i, 0.001 + i as f64 * 6.0, 1, json!(["10:00-12:00"])))
        .collect();

    let (status, body) = send(&app, json_request("POST", "/orders", json!({ "data": batch }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "validation_error": { "orders": [{ "id": 0 }, { "id": 9 }] } })
    );
}

#[tokio::test]
async fn missing_data_key_is_a_validation_error() {
    let app = setup();
    let (status, body) = send(&app, json_request("POST", "/orders", json!({ "items": [] }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_error"]["reason"].is_string());
}

#[tokio::test]
async fn patch_with_unknown_field_is_rejected() {
    let app = setup();
    let batch = json!({ "data": [courier(0, "foot", json!([1]), json!(["09:00-18:00"]))] });
    send(&app, json_request("POST", "/couriers", batch)).await;

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/couriers/0",
            json!({ "courier_type": "car", "some_other_type": "changed" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_error"]["reason"].is_string());

    let (status, body) = send(
        &app,
        json_request("PATCH", "/couriers/0", json!({ "courier_type": "car" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courier_type"], "car");
    assert_eq!(body["regions"], json!([1]));
}

#[tokio::test]
async fn patch_unknown_courier_returns_404() {
    let app = setup();
    let (status, _) = send(
        &app,
        json_request("PATCH", "/couriers/42", json!({ "regions": [1] })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assign_for_unknown_courier_is_rejected() {
    let app = setup();
    let (status, _) = send(
        &app,
        json_request("POST", "/orders/assign", json!({ "courier_id": 7 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_delivery_flow() {
    let app = setup();

    let couriers = json!({ "data": [
        courier(1, "foot", json!([1, 12, 22]), json!(["11:35-14:05", "09:00-11:00"])),
        courier(2, "car", json!([1]), json!(["09:00-18:00"])),
    ] });
    let (status, _) = send(&app, json_request("POST", "/couriers", couriers)).await;
    assert_eq!(status, StatusCode::CREATED);

    let orders = json!({ "data": [
        order(1, 0.23, 12, json!(["09:00-18:00"])),
        order(2, 15.0, 1, json!(["09:00-18:00"])),
        order(3, 0.01, 22, json!(["09:00-12:00", "16:00-21:30"])),
        order(4, 9.99, 1, json!(["14:05-16:00"])),
    ] });
    let (status, body) = send(&app, json_request("POST", "/orders", orders)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["orders"].as_array().unwrap().len(), 4);

    let (status, body) = send(
        &app,
        json_request("POST", "/orders/assign", json!({ "courier_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"], json!([{ "id": 1 }, { "id": 3 }]));
    let assign_time = body["assign_time"].as_str().unwrap().to_string();

    let (_, body) = send(&app, get_request("/orders/1")).await;
    assert_eq!(body["assignment"]["courier_id"], 1);
    assert_eq!(body["assignment"]["pay_coefficient"], 2);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/orders/complete",
            json!({ "courier_id": 2, "order_id": 1, "complete_time": assign_time }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_error"]["reason"].is_string());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/orders/complete",
            json!({ "courier_id": 1, "order_id": 1, "complete_time": "not a time" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_error"]["reason"]
        .as_str()
        .unwrap()
        .contains("malformed timestamp"));

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/orders/complete",
            json!({ "courier_id": 1, "order_id": 1, "complete_time": assign_time }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "order_id": 1 }));

    let (status, body) = send(&app, get_request("/couriers/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["earnings"], 1000);
    assert_eq!(body["rating"], 5.0);
    assert_eq!(body["working_hours"], json!(["11:35-14:05", "09:00-11:00"]));

    let (status, body) = send(&app, get_request("/couriers/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["earnings"], 0);
    assert!(body.get("rating").is_none());
}

#[tokio::test]
async fn region_update_releases_orders_back_to_pool() {
    let app = setup();

    let couriers = json!({ "data": [
        courier(1, "car", json!([1, 2]), json!(["09:00-18:00"])),
        courier(2, "car", json!([2]), json!(["09:00-18:00"])),
    ] });
    send(&app, json_request("POST", "/couriers", couriers)).await;
    let orders = json!({ "data": [
        order(1, 20.0, 1, json!(["10:00-12:00"])),
        order(2, 20.0, 2, json!(["10:00-12:00"])),
    ] });
    send(&app, json_request("POST", "/orders", orders)).await;

    let (_, body) = send(
        &app,
        json_request("POST", "/orders/assign", json!({ "courier_id": 1 })),
    )
    .await;
    assert_eq!(body["orders"], json!([{ "id": 1 }, { "id": 2 }]));

    let (status, _) = send(
        &app,
        json_request("PATCH", "/couriers/1", json!({ "regions": [1] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get_request("/orders/2")).await;
    assert!(body["assignment"].is_null());

    let (_, body) = send(
        &app,
        json_request("POST", "/orders/assign", json!({ "courier_id": 2 })),
    )
    .await;
    assert_eq!(body["orders"], json!([{ "id": 2 }]));
    assert!(body["assign_time"].is_string());
}

#[tokio::test]
async fn assign_with_no_matches_omits_time() {
    let app = setup();
    let couriers = json!({ "data": [courier(1, "foot", json!([1]), json!(["09:00-10:00"]))] });
    send(&app, json_request("POST", "/couriers", couriers)).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/orders/assign", json!({ "courier_id": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "orders": [] }));
}

#[tokio::test]
async fn get_nonexistent_order_returns_404() {
    let app = setup();
    let (status, body) = send(&app, get_request("/orders/404")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn non_integer_path_id_is_a_validation_error() {
    let app = setup();

    for request in [
        get_request("/couriers/abc"),
        get_request("/orders/1.5"),
        json_request("PATCH", "/couriers/abc", json!({ "regions": [1] })),
    ] {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["validation_error"]["reason"].is_string());
    }
}

#[tokio::test]
async fn reads_wait_for_in_flight_writes() {
    let state = Arc::new(AppState::new());
    let app = router(state.clone());
    let couriers = json!({ "data": [courier(1, "car", json!([1]), json!(["09:00-18:00"]))] });
    send(&app, json_request("POST", "/couriers", couriers)).await;

    let guard = state.write_lock.lock().await;
    let pending = tokio::spawn({
        let app = app.clone();
        async move { send(&app, get_request("/couriers/1")).await }
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    assert!(!pending.is_finished());

    drop(guard);
    let (status, body) = pending.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courier_id"], 1);
}
