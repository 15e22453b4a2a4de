mod common;

use axum::http::StatusCode;
use common::{dec, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn customer_crud_round_trip() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/customers",
            json!({
                "name": "Dana Whitfield",
                "email": "dana@example.com",
                "city": "Denver",
                "state": "CO"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "active");
    let id = id_of(&body);

    let (status, body) = app
        .put(
            &format!("/api/v1/customers/{id}"),
            json!({ "phone": "303-555-0100" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], "303-555-0100");
    assert_eq!(body["data"]["name"], "Dana Whitfield");

    let (status, body) = app.get("/api/v1/customers?search=whit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["id"], id.as_str());

    let (status, _) = app.delete(&format!("/api/v1/customers/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/v1/customers/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn customer_validation_rejects_bad_email() {
    let app = TestApp::new().await;
    let (status, _) = app
        .post(
            "/api/v1/customers",
            json!({ "name": "Lee", "email": "not-an-email" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for blank in ["", "   "] {
        let (status, _) = app.post("/api/v1/customers", json!({ "name": blank })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{blank:?}");
    }
}

#[tokio::test]
async fn list_is_paginated() {
    let app = TestApp::new().await;
    for n in 0..5 {
        app.create_customer(&format!("Customer {n}")).await;
    }

    let (status, body) = app.get("/api/v1/customers?page=2&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let page = &body["data"];
    assert_eq!(page["total"], 5);
    assert_eq!(page["page"], 2);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["total_pages"], 3);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(2));

    let (status, body) = app.get("/api/v1/customers?page=18446744073709551615").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("page"));
    let (status, _) = app.get("/api/v1/jobs?page=1000000").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn job_requires_existing_customer() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/v1/jobs",
            json!({
                "customer_id": uuid::Uuid::new_v4(),
                "title": "Hail damage repair"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn job_lifecycle_follows_status_machine() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Morgan Reyes").await;
    let job = app.create_job(&customer, "Full tear-off", "18500").await;

    let (_, body) = app.get(&format!("/api/v1/jobs/{job}")).await;
    assert_eq!(body["data"]["status"], "pending");
    assert!(body["data"]["job_number"]
        .as_str()
        .unwrap()
        .starts_with("JOB-"));
    assert_eq!(dec(&body["data"]["estimated_revenue"]), dec!(18500));

    // pending -> completed skips steps
    let (status, _) = app
        .put(
            &format!("/api/v1/jobs/{job}/status"),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for next in ["scheduled", "in_progress", "completed"] {
        let (status, body) = app
            .put(
                &format!("/api/v1/jobs/{job}/status"),
                json!({ "status": next }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{next}: {body}");
        assert_eq!(body["data"]["status"], next);
    }

    let (_, body) = app.get(&format!("/api/v1/jobs/{job}")).await;
    assert!(body["data"]["completed_at"].is_string());

    let (status, _) = app.delete(&format!("/api/v1/jobs/{job}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Sam Ortiz").await;
    let job = app.create_job(&customer, "Gutter replacement", "2400").await;

    let (status, _) = app
        .put(
            &format!("/api/v1/jobs/{job}/status"),
            json!({ "status": "done" }),
        )
        .await;
    assert!(status.is_client_error());

    let (status, _) = app.get("/api/v1/jobs?status=done").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customer_jobs_and_delete_guard() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Priya Nair").await;
    let other = app.create_customer("Chris Park").await;
    app.create_job(&customer, "Skylight flashing", "900").await;
    app.create_job(&customer, "Ridge vent", "650").await;
    app.create_job(&other, "Chimney cap", "300").await;

    let (status, body) = app
        .get(&format!("/api/v1/customers/{customer}/jobs"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);

    let (status, body) = app.get(&format!("/api/v1/jobs?customer_id={other}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, _) = app.delete(&format!("/api/v1/customers/{customer}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
