//! Inventory and cash register flows over HTTP.

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use std::sync::Arc;

use comercio::core::auth::NoAuthProvider;
use comercio::server::{AppState, build_router};

const TENANT: &str = "x-tenant-subdomain";
const DEMO: (&str, &str) = (TENANT, "demo");

fn server() -> TestServer {
    let state = AppState::new(Arc::new(NoAuthProvider), None);
    TestServer::new(build_router(state))
}

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .unwrap()
}

async fn create_product(server: &TestServer, code: &str, min_stock: i64) -> String {
    let response = server
        .post("/api/v1/products")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({
            "code": code,
            "name": format!("Producto {code}"),
            "cost": "10.00",
            "price": "15.00",
            "min_stock": min_stock
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

async fn create_supplier(server: &TestServer, name: &str) -> String {
    let response = server
        .post("/api/v1/suppliers")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Products & categories
// =============================================================================

#[tokio::test]
async fn duplicate_product_code_conflicts() {
    let server = server();
    create_product(&server, "SKU-1", 0).await;

    let dup = server
        .post("/api/v1/products")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({
            "code": "SKU-1",
            "name": "Otro",
            "cost": "1.00",
            "price": "2.00"
        }))
        .await;
    dup.assert_status(StatusCode::CONFLICT);
    assert_eq!(dup.json::<Value>()["error"]["code"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let server = server();
    let category = server
        .post("/api/v1/categories")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({ "name": "Herramientas" }))
        .await;
    category.assert_status(StatusCode::CREATED);
    let category_id = category.json::<Value>()["id"].as_str().unwrap().to_string();

    let product = server
        .post("/api/v1/products")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({
            "code": "HER-1",
            "name": "Martillo",
            "cost": "5.00",
            "price": "9.00",
            "category_id": category_id
        }))
        .await;
    product.assert_status(StatusCode::CREATED);

    let blocked = server
        .delete(&format!("/api/v1/categories/{category_id}"))
        .add_header(DEMO.0, DEMO.1)
        .await;
    blocked.assert_status(StatusCode::CONFLICT);
    assert_eq!(blocked.json::<Value>()["error"]["code"], "DELETE_BLOCKED");
}

// =============================================================================
// Purchases & stock
// =============================================================================

#[tokio::test]
async fn receiving_a_purchase_posts_stock() {
    let server = server();
    let supplier_id = create_supplier(&server, "Importadora Sur").await;
    let product_id = create_product(&server, "SKU-10", 2).await;

    let purchase = server
        .post("/api/v1/purchases")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({
            "supplier_id": supplier_id,
            "items": [
                { "product_id": product_id, "quantity": 12, "unit_cost": "8.50" }
            ]
        }))
        .await;
    purchase.assert_status(StatusCode::CREATED);
    let body = purchase.json::<Value>();
    assert_eq!(body["code"], "COMP-000001");
    assert_eq!(decimal(&body["total"]), dec!(102.00));
    let purchase_id = body["id"].as_str().unwrap().to_string();

    let received = server
        .post(&format!("/api/v1/purchases/{purchase_id}/receive"))
        .add_header(DEMO.0, DEMO.1)
        .await;
    received.assert_status_ok();
    assert_eq!(received.json::<Value>()["received"], true);

    // stock is on hand now
    let stock = server
        .get("/api/v1/inventory/stock")
        .add_header(DEMO.0, DEMO.1)
        .await;
    let rows = stock.json::<Value>();
    let row = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["code"] == "SKU-10")
        .unwrap();
    assert_eq!(row["quantity"], 12);
    assert_eq!(row["below_minimum"], false);

    // receiving twice is invalid
    let again = server
        .post(&format!("/api/v1/purchases/{purchase_id}/receive"))
        .add_header(DEMO.0, DEMO.1)
        .await;
    again.assert_status(StatusCode::CONFLICT);

    // the movement history recorded the stock-in
    let movements = server
        .get("/api/v1/inventory/movements")
        .add_header(DEMO.0, DEMO.1)
        .await;
    let data = movements.json::<Value>();
    assert_eq!(data["data"][0]["movement_type"], "IN");
    assert_eq!(data["data"][0]["quantity"], 12);
}

#[tokio::test]
async fn adjustments_move_stock_and_trigger_alerts() {
    let server = server();
    let product_id = create_product(&server, "SKU-20", 5).await;

    let up = server
        .post("/api/v1/inventory/adjustments")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({
            "product_id": product_id,
            "quantity": 3,
            "reason": "conteo inicial"
        }))
        .await;
    up.assert_status(StatusCode::CREATED);

    // 3 on hand with a minimum of 5: alert
    let alerts = server
        .get("/api/v1/inventory/alerts")
        .add_header(DEMO.0, DEMO.1)
        .await;
    let rows = alerts.json::<Value>();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["quantity"], 3);

    // cannot adjust below zero
    let down = server
        .post("/api/v1/inventory/adjustments")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({ "product_id": product_id, "quantity": -10 }))
        .await;
    down.assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// Cash register
// =============================================================================

#[tokio::test]
async fn cash_register_lifecycle() {
    let server = server();

    // nothing open yet
    let none = server
        .get("/api/v1/cash/current")
        .add_header(DEMO.0, DEMO.1)
        .await;
    none.assert_status_ok();
    assert!(none.json::<Value>().is_null());

    let opened = server
        .post("/api/v1/cash/open")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({ "opening_amount": "500.00" }))
        .await;
    opened.assert_status(StatusCode::CREATED);

    // a second open is rejected while one is active
    let double = server
        .post("/api/v1/cash/open")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({ "opening_amount": "0.00" }))
        .await;
    double.assert_status(StatusCode::CONFLICT);

    server
        .post("/api/v1/cash/movements")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({
            "movement_type": "INCOME",
            "concept": "venta mostrador",
            "amount": "120.00"
        }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post("/api/v1/cash/movements")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({
            "movement_type": "EXPENSE",
            "concept": "mensajería",
            "amount": "20.00"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let summary = server
        .get("/api/v1/cash/summary")
        .add_header(DEMO.0, DEMO.1)
        .await;
    summary.assert_status_ok();
    let body = summary.json::<Value>();
    assert_eq!(decimal(&body["income"]), dec!(120.00));
    assert_eq!(decimal(&body["expense"]), dec!(20.00));
    assert_eq!(decimal(&body["expected_amount"]), dec!(600.00));

    // close with a one-peso shortfall
    let closed = server
        .post("/api/v1/cash/close")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({ "closing_amount": "599.00" }))
        .await;
    closed.assert_status_ok();
    let register = closed.json::<Value>();
    assert_eq!(register["status"], "CLOSED");
    assert_eq!(decimal(&register["difference"]), dec!(-1.00));

    let after = server
        .get("/api/v1/cash/current")
        .add_header(DEMO.0, DEMO.1)
        .await;
    assert!(after.json::<Value>().is_null());
}

#[tokio::test]
async fn manual_payment_movements_are_rejected() {
    let server = server();
    server
        .post("/api/v1/cash/open")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({ "opening_amount": "0.00" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/v1/cash/movements")
        .add_header(DEMO.0, DEMO.1)
        .json(&json!({
            "movement_type": "PAYMENT",
            "concept": "no permitido",
            "amount": "10.00"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
