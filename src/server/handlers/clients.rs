//! Client CRUD
//!
//! - GET /api/v1/clients - List clients (search, active filter)
//! - POST /api/v1/clients - Create a client
//! - GET /api/v1/clients/{id} - Get a client with its receivable rollup
//! - PUT /api/v1/clients/{id} - Update a client
//! - DELETE /api/v1/clients/{id} - Soft-delete (blocked while money is owed)

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::entity::Record;
use crate::core::error::{AppError, AppResult, EntityError};
use crate::core::money::to_cents;
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::Client;
use crate::server::extract::{CurrentUser, Tenant};
use crate::server::handlers::parse_id;

#[derive(Debug, Deserialize)]
pub struct ClientFilter {
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub identification: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub credit_days: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub identification: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub credit_days: Option<i32>,
    pub active: Option<bool>,
}

/// Client row with its outstanding receivable balance.
#[derive(Debug, Serialize)]
pub struct ClientWithBalance {
    #[serde(flatten)]
    pub client: Client,
    pub outstanding_balance: Decimal,
    pub open_invoices: usize,
}

pub async fn list_clients(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<ClientFilter>,
) -> AppResult<Json<Paginated<ClientWithBalance>>> {
    let page_result = store.read(|ledger| {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<ClientWithBalance> = ledger
            .clients
            .iter()
            .filter(|c| filter.active.is_none_or(|a| c.active == a))
            .filter(|c| {
                search.as_deref().is_none_or(|needle| {
                    c.name.to_lowercase().contains(needle)
                        || c.identification
                            .as_deref()
                            .is_some_and(|i| i.to_lowercase().contains(needle))
                })
            })
            .map(|c| {
                let open: Vec<_> = ledger
                    .invoices
                    .iter()
                    .filter(|inv| inv.client_id == c.id && inv.is_payable())
                    .collect();
                ClientWithBalance {
                    client: c.clone(),
                    outstanding_balance: open.iter().map(|inv| inv.balance).sum(),
                    open_invoices: open.len(),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.client.name.cmp(&b.client.name));
        Paginated::slice(rows, page)
    })?;
    Ok(Json(page_result))
}

pub async fn create_client(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Json(body): Json<CreateClientRequest>,
) -> AppResult<(StatusCode, Json<Client>)> {
    body.validate()?;

    let client = store.transaction(|ledger| {
        if let Some(identification) = &body.identification
            && ledger
                .clients
                .find(|c| c.identification.as_deref() == Some(identification))
                .is_some()
        {
            return Err(EntityError::Duplicate {
                entity_type: "client",
                field: "identification",
                value: identification.clone(),
            }
            .into());
        }

        let mut client = Client::new(body.name.clone());
        client.identification = body.identification.clone();
        client.email = body.email.clone();
        client.phone = body.phone.clone();
        client.address = body.address.clone();
        if let Some(limit) = body.credit_limit {
            client.credit_limit = to_cents(limit);
        }
        if let Some(days) = body.credit_days {
            client.credit_days = days;
        }
        Ok(ledger.clients.insert(client))
    })?;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ClientWithBalance>> {
    let id = parse_id(&id)?;
    let row = store.read(|ledger| {
        let client = ledger.clients.require(&id)?;
        let open: Vec<_> = ledger
            .invoices
            .iter()
            .filter(|inv| inv.client_id == id && inv.is_payable())
            .collect();
        Ok::<_, AppError>(ClientWithBalance {
            client: client.clone(),
            outstanding_balance: open.iter().map(|inv| inv.balance).sum(),
            open_invoices: open.len(),
        })
    })??;
    Ok(Json(row))
}

pub async fn update_client(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateClientRequest>,
) -> AppResult<Json<Client>> {
    let id = parse_id(&id)?;
    body.validate()?;

    let client = store.transaction(|ledger| {
        let client = ledger.clients.require_mut(&id)?;
        if let Some(name) = &body.name {
            client.name = name.clone();
        }
        if let Some(identification) = &body.identification {
            client.identification = Some(identification.clone());
        }
        if let Some(email) = &body.email {
            client.email = Some(email.clone());
        }
        if let Some(phone) = &body.phone {
            client.phone = Some(phone.clone());
        }
        if let Some(address) = &body.address {
            client.address = Some(address.clone());
        }
        if let Some(limit) = body.credit_limit {
            client.credit_limit = to_cents(limit);
        }
        if let Some(days) = body.credit_days {
            client.credit_days = days;
        }
        if let Some(active) = body.active {
            client.active = active;
        }
        client.touch();
        Ok(client.clone())
    })?;

    Ok(Json(client))
}

pub async fn delete_client(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    store.transaction(|ledger| {
        let owed = ledger
            .invoices
            .iter()
            .any(|inv| inv.client_id == id && inv.is_payable());
        if owed {
            return Err(EntityError::DeleteBlocked {
                entity_type: "client",
                id,
                reason: "client has outstanding invoices".to_string(),
            }
            .into());
        }
        let client = ledger.clients.require_mut(&id)?;
        client.deleted_at = Some(chrono::Utc::now());
        client.touch();
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}
