mod common;

use axum::http::StatusCode;
use common::{dec, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

async fn create_item(app: &TestApp, sku: &str, on_hand: &str, reorder: &str) -> String {
    let (status, body) = app
        .post(
            "/api/v1/inventory",
            json!({
                "sku": sku,
                "name": format!("Item {sku}"),
                "unit": "bundle",
                "quantity_on_hand": on_hand,
                "reorder_point": reorder,
                "unit_cost": "32.50"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
}

#[tokio::test]
async fn stock_adjustments_never_go_negative() {
    let app = TestApp::new().await;
    let item = create_item(&app, "SHG-ARCH-CHAR", "12", "20").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/inventory/{item}/adjust"),
            json!({ "delta": "-5", "reason": "job JOB-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(dec(&body["data"]["quantity_on_hand"]), dec!(7));

    let (status, _) = app
        .post(
            &format!("/api/v1/inventory/{item}/adjust"),
            json!({ "delta": "-8" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            &format!("/api/v1/inventory/{item}/adjust"),
            json!({ "delta": "0" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_sku_conflicts() {
    let app = TestApp::new().await;
    create_item(&app, "NAIL-COIL-125", "40", "10").await;
    let (status, _) = app
        .post(
            "/api/v1/inventory",
            json!({ "sku": "NAIL-COIL-125", "name": "Coil nails" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn low_stock_lists_items_at_or_below_reorder_point() {
    let app = TestApp::new().await;
    let low = create_item(&app, "UNDERLAY-SYN", "2", "5").await;
    let edge = create_item(&app, "DRIP-EDGE-WHT", "5", "5").await;
    create_item(&app, "RIDGE-CAP", "50", "5").await;

    let (status, body) = app.get("/api/v1/inventory/low-stock").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .expect("item list")
        .iter()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert_eq!(ids, vec![low.as_str(), edge.as_str()]);
}

#[tokio::test]
async fn receiving_a_purchase_order_restocks_linked_items() {
    let app = TestApp::new().await;
    let vendor = app.create_vendor("Front Range Roofing Supply").await;
    let item = create_item(&app, "SHG-3TAB-BLK", "3", "10").await;

    let (status, body) = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "vendor_id": vendor,
                "line_items": [
                    {
                        "inventory_item_id": item,
                        "description": "3-tab shingles",
                        "quantity": "30",
                        "unit_cost": "31.00"
                    },
                    {
                        "description": "Delivery",
                        "quantity": "1",
                        "unit_cost": "75"
                    }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let po = id_of(&body);
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(dec(&body["data"]["total_amount"]), dec!(1005));

    // Draft orders cannot be received
    let (status, _) = app
        .post_empty(&format!("/api/v1/purchase-orders/{po}/receive"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post_empty(&format!("/api/v1/purchase-orders/{po}/submit"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["submitted_at"].is_string());

    let (status, _) = app
        .put(
            &format!("/api/v1/purchase-orders/{po}"),
            json!({ "notes": "rush" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post_empty(&format!("/api/v1/purchase-orders/{po}/receive"))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "received");

    let (_, body) = app.get(&format!("/api/v1/inventory/{item}")).await;
    assert_eq!(dec(&body["data"]["quantity_on_hand"]), dec!(33));

    let (status, _) = app
        .post_empty(&format!("/api/v1/purchase-orders/{po}/cancel"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .get(&format!("/api/v1/purchase-orders?vendor_id={vendor}&status=received"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn purchase_order_requires_known_vendor() {
    let app = TestApp::new().await;
    let (status, _) = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "vendor_id": uuid::Uuid::new_v4(),
                "line_items": [{ "description": "Flashing", "quantity": "1", "unit_cost": "10" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vendor_with_orders_cannot_be_deleted() {
    let app = TestApp::new().await;
    let vendor = app.create_vendor("Peak Metals").await;
    let (status, _) = app
        .post(
            "/api/v1/purchase-orders",
            json!({
                "vendor_id": vendor,
                "line_items": [{ "description": "Standing seam panels", "quantity": "12", "unit_cost": "88" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.delete(&format!("/api/v1/vendors/{vendor}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let unused = app.create_vendor("Unused Supply Co").await;
    let (status, _) = app.delete(&format!("/api/v1/vendors/{unused}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn blank_sku_and_name_are_rejected() {
    let app = TestApp::new().await;
    for (sku, name) in [(" ", "Starter strip"), ("STR-01", "   ")] {
        let (status, _) = app
            .post("/api/v1/inventory", json!({ "sku": sku, "name": name }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{sku:?} {name:?}");
    }

    let item = create_item(&app, "STR-01", "5", "1").await;
    let (status, _) = app
        .put(&format!("/api/v1/inventory/{item}"), json!({ "sku": "\t" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inventory_vendor_must_belong_to_tenant() {
    let app = TestApp::new().await;
    let vendor = app.create_vendor("Summit Roofing Supply").await;

    let (status, _) = app
        .request_as(
            uuid::Uuid::new_v4(),
            axum::http::Method::POST,
            "/api/v1/inventory",
            Some(json!({ "sku": "VENT-R", "name": "Ridge vent", "vendor_id": vendor })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/v1/inventory",
            json!({ "sku": "VENT-R", "name": "Ridge vent", "vendor_id": vendor }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let item = id_of(&body);

    let (status, _) = app
        .put(
            &format!("/api/v1/inventory/{item}"),
            json!({ "vendor_id": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn concurrent_adjustments_are_not_lost() {
    let app = TestApp::new().await;
    let item = create_item(&app, "NAIL-COIL", "10", "2").await;
    let uri = format!("/api/v1/inventory/{item}/adjust");

    let ((a, _), (b, _), (c, _)) = tokio::join!(
        app.post(&uri, json!({ "delta": "5" })),
        app.post(&uri, json!({ "delta": "-4" })),
        app.post(&uri, json!({ "delta": "7" })),
    );
    assert_eq!([a, b, c], [StatusCode::OK; 3]);

    let (_, body) = app.get(&format!("/api/v1/inventory/{item}")).await;
    assert_eq!(dec(&body["data"]["quantity_on_hand"]), dec!(18));
}
