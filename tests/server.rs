use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use timetable_solver::server::router;

async fn post(body: Value) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/timetable/solve")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn one_class(required: u32, unavailable: Value) -> Value {
    json!({
        "numberOfDays": 1,
        "hoursPerDay": 2,
        "numberOfClasses": 1,
        "professors": [
            { "requiredHours": [required], "dailyCaps": [2], "unavailable": unavailable }
        ]
    })
}

#[tokio::test]
async fn solve_returns_report() {
    let (status, body) = post(json!({ "input": one_class(2, json!([])) })).await;
    assert_eq!(status, StatusCode::OK);

    let report: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["status"], "OPTIMAL");
    assert_eq!(report["assignedHours"], 2);
    assert_eq!(report["classes"][0]["cells"], json!([[0, 0]]));
    assert_eq!(report["professors"][0]["cells"][0][0], json!({ "state": "teaching", "class": 0 }));
}

#[tokio::test]
async fn configuration_error_is_bad_request() {
    let (status, body) = post(json!({ "input": one_class(1, json!([{ "day": 4, "hour": 0 }])) })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8(body).unwrap().contains("out of range"));
}

#[tokio::test]
async fn infeasible_is_unprocessable() {
    let request = json!({
        "input": one_class(2, json!([{ "day": 0, "hour": 1 }])),
        "config": { "coverageMode": "strict" }
    });
    let (status, _) = post(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn oversized_grid_is_bad_request() {
    let request = json!({
        "input": {
            "numberOfDays": 100000,
            "hoursPerDay": 100000,
            "numberOfClasses": 1,
            "professors": [{ "requiredHours": [1], "dailyCaps": [1] }]
        }
    });
    let (status, body) = post(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8(body).unwrap().contains("decision variables"));
}
