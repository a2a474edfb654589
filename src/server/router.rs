//! Router assembly
//!
//! All resource routes mount under `/api/v1`; health checks stay at the
//! root so load balancers skip tenant resolution.

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{
    cash, clients, inventory, invoices, purchases, receivables, supplier_invoices,
    supplier_payments, suppliers,
};
use crate::server::state::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Clients
        .route("/clients", get(clients::list_clients).post(clients::create_client))
        .route(
            "/clients/{id}",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        // Receivable invoices
        .route(
            "/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route("/invoices/{id}", get(invoices::get_invoice))
        .route("/invoices/{id}/cancel", post(invoices::cancel_invoice))
        // Receivables
        .route("/receivables/status/{client_id}", get(receivables::account_status))
        .route("/receivables/overdue", get(receivables::overdue_invoices))
        .route(
            "/receivables/payments",
            get(receivables::payment_history).post(receivables::create_payment),
        )
        .route("/receivables/summary", get(receivables::summary))
        // Suppliers; payments and stats are static paths under the same
        // prefix as the `{id}` routes
        .route(
            "/suppliers/payments",
            get(supplier_payments::list_supplier_payments)
                .post(supplier_payments::create_supplier_payment),
        )
        .route(
            "/suppliers/payments/{id}",
            get(supplier_payments::get_supplier_payment)
                .delete(supplier_payments::reverse_supplier_payment),
        )
        .route("/suppliers/stats", get(suppliers::payables_stats))
        .route(
            "/suppliers",
            get(suppliers::list_suppliers).post(suppliers::create_supplier),
        )
        .route(
            "/suppliers/{id}",
            get(suppliers::get_supplier)
                .put(suppliers::update_supplier)
                .delete(suppliers::delete_supplier),
        )
        .route("/suppliers/{id}/status", get(suppliers::supplier_status))
        // Supplier invoices
        .route(
            "/supplier-invoices",
            get(supplier_invoices::list_supplier_invoices)
                .post(supplier_invoices::create_supplier_invoice),
        )
        .route(
            "/supplier-invoices/stats",
            get(supplier_invoices::supplier_invoice_stats),
        )
        .route(
            "/supplier-invoices/{id}",
            get(supplier_invoices::get_supplier_invoice)
                .put(supplier_invoices::update_supplier_invoice),
        )
        // Purchases
        .route(
            "/purchases",
            get(purchases::list_purchases).post(purchases::create_purchase),
        )
        .route("/purchases/{id}", get(purchases::get_purchase))
        .route("/purchases/{id}/receive", post(purchases::receive_purchase))
        // Inventory
        .route(
            "/products",
            get(inventory::list_products).post(inventory::create_product),
        )
        .route(
            "/products/{id}",
            get(inventory::get_product)
                .put(inventory::update_product)
                .delete(inventory::delete_product),
        )
        .route(
            "/categories",
            get(inventory::list_categories).post(inventory::create_category),
        )
        .route(
            "/categories/{id}",
            put(inventory::update_category).delete(inventory::delete_category),
        )
        .route("/inventory/stock", get(inventory::stock_view))
        .route("/inventory/alerts", get(inventory::low_stock_alerts))
        .route("/inventory/adjustments", post(inventory::adjust_stock))
        .route("/inventory/movements", get(inventory::list_movements))
        // Cash
        .route("/cash/open", post(cash::open_register))
        .route("/cash/close", post(cash::close_register))
        .route("/cash/current", get(cash::current_register))
        .route(
            "/cash/movements",
            get(cash::list_movements).post(cash::create_movement),
        )
        .route("/cash/summary", get(cash::daily_summary));

    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "comercio"
    }))
}
