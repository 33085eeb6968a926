//! Client integration tests against a local mock backend

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use autotoll_api::TollApi;
use autotoll_types::{Error, VehicleType};
use warp::http::StatusCode;
use warp::Filter;

type Hits = Arc<Mutex<Vec<String>>>;

/// Spin up a mock backend on an ephemeral port and return its base URL
async fn start_mock(hits: Hits) -> String {
    let record = move |label: String| {
        let hits = hits.clone();
        move || {
            hits.lock().unwrap().push(label.clone());
        }
    };

    let summary_hit = record("summary".to_string());
    let summary = warp::path!("api" / "summary").and(warp::get()).map(move || {
        summary_hit();
        warp::reply::json(&serde_json::json!({
            "total_vehicles": 12,
            "total_revenue": 96.5,
            "avg_confidence": 0.81,
            "pending_review": 3
        }))
    });

    let history = warp::path!("api" / "history").and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!([
            {"id": 1, "vehicle_type": "Car", "license_plate": "AB123",
             "confidence": "0.95", "toll_amount": 5.0, "status": "verified",
             "timestamp": "2025-06-01T00:00:00", "image_path": "/uploads/1.jpg"},
            {"id": 2, "confidence": 0.4, "status": "pending"}
        ]))
    });

    let confirm_hit = record("confirm".to_string());
    let confirm = warp::path!("api" / "detections" / i64)
        .and(warp::put())
        .map(move |id: i64| {
            confirm_hit();
            assert_eq!(id, 42);
            warp::reply::json(&serde_json::json!({"status": "updated"}))
        });

    let delete_hit = record("delete".to_string());
    let delete = warp::path!("api" / "detections" / i64)
        .and(warp::delete())
        .map(move |id: i64| {
            delete_hit();
            assert_eq!(id, 7);
            warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT)
        });

    let rejected = warp::path!("api" / "vehicle" / "status" / String)
        .and(warp::get())
        .map(|_plate: String| {
            warp::reply::with_status(
                warp::reply::json(&serde_json::json!({"detail": "plate not registered"})),
                StatusCode::NOT_FOUND,
            )
        });

    let broken = warp::path!("api" / "analytics").and(warp::get()).map(|| {
        warp::reply::with_status(warp::reply::html("gateway timeout"), StatusCode::BAD_GATEWAY)
    });

    let routes = summary
        .or(history)
        .or(confirm)
        .or(delete)
        .or(rejected)
        .or(broken);

    let (addr, server): (SocketAddr, _) =
        warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    format!("http://{addr}")
}

#[tokio::test]
async fn summary_round_trip() {
    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let api = TollApi::new(start_mock(hits.clone()).await);

    let summary = api.summary().await.unwrap();
    assert_eq!(summary.total_vehicles, 12);
    assert_eq!(summary.pending_review, 3);
    assert_eq!(hits.lock().unwrap().as_slice(), ["summary"]);
}

#[tokio::test]
async fn history_tolerates_string_confidence_and_gaps() {
    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let api = TollApi::new(start_mock(hits).await);

    let rows = api.history().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].confidence, 0.95);
    assert_eq!(rows[0].license_plate.as_deref(), Some("AB123"));
    assert_eq!(rows[1].confidence, 0.4);
    assert!(rows[1].license_plate.is_none());
}

#[tokio::test]
async fn confirm_targets_the_right_detection() {
    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let api = TollApi::new(start_mock(hits.clone()).await);

    api.confirm_detection(42, VehicleType::Truck, 12.5).await.unwrap();
    assert_eq!(hits.lock().unwrap().as_slice(), ["confirm"]);
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let api = TollApi::new(start_mock(hits.clone()).await);

    api.delete_detection(7).await.unwrap();
    assert_eq!(hits.lock().unwrap().as_slice(), ["delete"]);
}

#[tokio::test]
async fn backend_detail_surfaces_as_rejection() {
    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let api = TollApi::new(start_mock(hits).await);

    match api.vehicle_status("zz99").await {
        Err(Error::Rejected(detail)) => assert_eq!(detail, "plate not registered"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_maps_to_http_status() {
    let hits: Hits = Arc::new(Mutex::new(Vec::new()));
    let api = TollApi::new(start_mock(hits).await);

    match api.analytics().await {
        Err(Error::Http { status }) => assert_eq!(status, 502),
        other => panic!("expected http error, got {other:?}"),
    }
}
