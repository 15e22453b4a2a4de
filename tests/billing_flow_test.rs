mod common;

use axum::http::StatusCode;
use common::{dec, id_of, line, TestApp};
use rstest::rstest;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn estimate_to_paid_invoice() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Jordan Ellis").await;
    let job = app.create_job(&customer, "Architectural shingle re-roof", "3800").await;

    let (status, body) = app
        .post(
            "/api/v1/estimates",
            json!({
                "customer_id": customer,
                "job_id": job,
                "line_items": [
                    line("Architectural shingles, per square", "10", "300.00"),
                    line("Tear-off and disposal", "1", "500"),
                ],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let estimate = id_of(&body);
    let data = &body["data"];
    assert_eq!(data["status"], "draft");
    assert_eq!(dec(&data["subtotal"]), dec!(3500));
    assert_eq!(dec(&data["tax_rate"]), dec!(0.0825));
    assert_eq!(dec(&data["tax_amount"]), dec!(288.75));
    assert_eq!(dec(&data["total"]), dec!(3788.75));

    // Accepting straight from draft is not allowed
    let (status, _) = app
        .post_empty(&format!("/api/v1/estimates/{estimate}/accept"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    for action in ["send", "accept"] {
        let (status, body) = app
            .post_empty(&format!("/api/v1/estimates/{estimate}/{action}"))
            .await;
        assert_eq!(status, StatusCode::OK, "{action}: {body}");
    }

    let (status, body) = app
        .post_empty(&format!("/api/v1/estimates/{estimate}/convert"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let invoice = id_of(&body);
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["data"]["estimate_id"], estimate.as_str());
    assert_eq!(dec(&body["data"]["total"]), dec!(3788.75));

    let (status, _) = app
        .post_empty(&format!("/api/v1/estimates/{estimate}/convert"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Payments need a sent invoice
    let (status, _) = app
        .post(
            &format!("/api/v1/invoices/{invoice}/payments"),
            json!({ "amount": "100" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post_empty(&format!("/api/v1/invoices/{invoice}/send"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "sent");

    let (status, body) = app
        .post(
            &format!("/api/v1/invoices/{invoice}/payments"),
            json!({ "amount": "1000", "method": "check", "reference": "1042" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "partially_paid");
    assert_eq!(dec(&body["data"]["amount_paid"]), dec!(1000));

    let (status, _) = app
        .post(
            &format!("/api/v1/invoices/{invoice}/payments"),
            json!({ "amount": "5000" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            &format!("/api/v1/invoices/{invoice}/payments"),
            json!({ "amount": "2788.75", "method": "ach" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "paid");
    assert!(body["data"]["paid_at"].is_string());

    let (status, body) = app
        .get(&format!("/api/v1/invoices/{invoice}/payments"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let payments = body["data"].as_array().expect("payment list");
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0]["method"], "check");

    let (status, _) = app
        .post_empty(&format!("/api/v1/invoices/{invoice}/void"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn only_draft_invoices_can_be_edited() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Avery Stone").await;

    let (status, body) = app
        .post(
            "/api/v1/invoices",
            json!({
                "customer_id": customer,
                "tax_rate": "0",
                "line_items": [line("Storm inspection", "1", "150")],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let invoice = id_of(&body);
    assert!(body["data"]["invoice_number"]
        .as_str()
        .unwrap()
        .starts_with("INV-"));

    let (status, body) = app
        .put(
            &format!("/api/v1/invoices/{invoice}"),
            json!({ "line_items": [line("Storm inspection", "2", "150")] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&body["data"]["total"]), dec!(300));

    app.post_empty(&format!("/api/v1/invoices/{invoice}/send"))
        .await;

    let (status, _) = app
        .put(
            &format!("/api/v1/invoices/{invoice}"),
            json!({ "notes": "too late" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete(&format!("/api/v1/invoices/{invoice}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .post_empty(&format!("/api/v1/invoices/{invoice}/void"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "void");
}

#[rstest]
#[case::no_lines(json!([]))]
#[case::zero_quantity(json!([line("Drip edge", "0", "12")]))]
#[case::negative_price(json!([line("Drip edge", "1", "-12")]))]
#[case::blank_description(json!([line("  ", "1", "12")]))]
#[case::amount_overflow(json!([line("Drip edge", "79228162514264337593543950335", "2")]))]
#[tokio::test]
async fn invalid_line_items_are_rejected(#[case] line_items: serde_json::Value) {
    let app = TestApp::new().await;
    let customer = app.create_customer("Riley Quinn").await;

    let (status, _) = app
        .post(
            "/api/v1/estimates",
            json!({ "customer_id": customer, "line_items": line_items }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejected_estimate_cannot_be_converted() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Casey Brooks").await;
    let (_, body) = app
        .post(
            "/api/v1/estimates",
            json!({
                "customer_id": customer,
                "line_items": [line("Ice and water shield", "4", "95")],
            }),
        )
        .await;
    let estimate = id_of(&body);

    app.post_empty(&format!("/api/v1/estimates/{estimate}/send"))
        .await;
    let (status, body) = app
        .post_empty(&format!("/api/v1/estimates/{estimate}/reject"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");

    let (status, _) = app
        .post_empty(&format!("/api/v1/estimates/{estimate}/convert"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .post_empty(&format!("/api/v1/estimates/{estimate}/expire"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn concurrent_payments_never_exceed_total() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Morgan Ellis").await;
    let (status, body) = app
        .post(
            "/api/v1/invoices",
            json!({
                "customer_id": customer,
                "tax_rate": "0",
                "line_items": [line("Chimney flashing", "1", "100")],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let invoice = id_of(&body);
    app.post_empty(&format!("/api/v1/invoices/{invoice}/send"))
        .await;

    let uri = format!("/api/v1/invoices/{invoice}/payments");
    let ((first, _), (second, _)) = tokio::join!(
        app.post(&uri, json!({ "amount": "100" })),
        app.post(&uri, json!({ "amount": "100" })),
    );
    let mut statuses = [first, second];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let (_, body) = app.get(&uri).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    let (_, body) = app.get(&format!("/api/v1/invoices/{invoice}")).await;
    assert_eq!(dec(&body["data"]["amount_paid"]), dec!(100));
    assert_eq!(body["data"]["status"], "paid");
}

#[tokio::test]
async fn job_references_must_match_tenant_and_customer() {
    let app = TestApp::new().await;
    let customer = app.create_customer("Jordan Reyes").await;
    let neighbour = app.create_customer("Sam Ortiz").await;
    let job = app.create_job(&customer, "Hail damage repair", "9000").await;
    let other_job = app.create_job(&neighbour, "Gutter swap", "1200").await;

    // Another tenant cannot point at this tenant's job
    let outsider = uuid::Uuid::new_v4();
    let (status, body) = app
        .request_as(
            outsider,
            axum::http::Method::POST,
            "/api/v1/customers",
            Some(json!({ "name": "Outsider" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let outsider_customer = id_of(&body);
    for uri in ["/api/v1/invoices", "/api/v1/estimates"] {
        let (status, _) = app
            .request_as(
                outsider,
                axum::http::Method::POST,
                uri,
                Some(json!({
                    "customer_id": outsider_customer,
                    "job_id": job,
                    "line_items": [line("Inspection", "1", "150")],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }

    // A job for a different customer is rejected on create and update
    let (status, _) = app
        .post(
            "/api/v1/invoices",
            json!({
                "customer_id": customer,
                "job_id": other_job,
                "line_items": [line("Inspection", "1", "150")],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/v1/estimates",
            json!({
                "customer_id": customer,
                "job_id": job,
                "line_items": [line("Inspection", "1", "150")],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let estimate = id_of(&body);
    let (status, _) = app
        .put(
            &format!("/api/v1/estimates/{estimate}"),
            json!({ "job_id": other_job }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
