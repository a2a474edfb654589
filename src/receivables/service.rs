//! Receivables service: account status, overdue reporting, payment
//! application and the global summary
//!
//! All monetary writes go through [`TenantStore::transaction`] so a
//! payment either lands on every selected invoice or on none.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::core::error::{AppResult, EntityError, PaymentError};
use crate::core::money::to_cents;
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::{
    CashMovement, CashMovementType, Client, Invoice, InvoiceStatus, Payment, PaymentMethod,
    PaymentTerms,
};
use crate::receivables::aging::AgeBucket;
use crate::receivables::allocation::{Distribution, allocate};
use crate::storage::TenantStore;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceShareRequest {
    pub invoice_id: Uuid,
    pub amount: Decimal,
}

/// Body of `POST /receivables/payments`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub client_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub observations: Option<String>,
    /// Restrict proportional distribution to these invoices
    #[serde(default)]
    pub invoice_ids: Option<Vec<Uuid>>,
    /// Manual per-invoice distribution; overrides `invoice_ids`
    #[serde(default)]
    pub invoice_payments: Option<Vec<InvoiceShareRequest>>,
}

#[derive(Debug, Serialize)]
pub struct PaymentShareReceipt {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub payment_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PaymentReceipt {
    pub payments: Vec<PaymentShareReceipt>,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ClientHeader {
    pub id: Uuid,
    pub name: String,
    pub identification: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub credit_limit: Decimal,
    pub credit_days: i32,
}

impl From<&Client> for ClientHeader {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id,
            name: client.name.clone(),
            identification: client.identification.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            credit_limit: client.credit_limit,
            credit_days: client.credit_days,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentBrief {
    pub id: Uuid,
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    pub id: Uuid,
    pub number: String,
    pub ncf: Option<String>,
    pub issue_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub total: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
    pub days_overdue: i64,
    pub status: InvoiceStatus,
    pub payments: Vec<PaymentBrief>,
}

#[derive(Debug, Serialize)]
pub struct ClientAccountSummary {
    pub total_receivable: Decimal,
    pub total_overdue: Decimal,
    pub total_invoices: usize,
    pub pending_invoices: usize,
    pub average_days_overdue: i64,
}

/// Response of `GET /receivables/status/{client_id}`.
#[derive(Debug, Serialize)]
pub struct AccountStatus {
    pub client: ClientHeader,
    pub summary: ClientAccountSummary,
    pub invoices: Vec<InvoiceDetail>,
}

#[derive(Debug, Serialize)]
pub struct ClientBrief {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OverdueInvoice {
    pub id: Uuid,
    pub number: String,
    pub ncf: Option<String>,
    pub total: Decimal,
    pub balance: Decimal,
    pub issue_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub days_overdue: i64,
}

#[derive(Debug, Serialize)]
pub struct OverdueEntry {
    pub id: Uuid,
    pub client: ClientBrief,
    pub invoice: OverdueInvoice,
}

/// Filters of `GET /receivables/overdue`.
#[derive(Debug, Default, Clone)]
pub struct OverdueFilter {
    pub bucket: Option<AgeBucket>,
    pub client_id: Option<Uuid>,
    /// Case-insensitive match on invoice number, NCF or client name
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentRow {
    pub id: Uuid,
    pub client: ClientBrief,
    pub invoice: Option<InvoiceRef>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub observations: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceRef {
    pub id: Uuid,
    pub number: String,
    pub ncf: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct PaymentFilter {
    pub client_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TopDebtor {
    pub client_id: Uuid,
    pub client_name: String,
    pub client_identification: Option<String>,
    pub total_balance: Decimal,
    pub overdue_balance: Decimal,
    pub invoice_count: usize,
}

/// Response of `GET /receivables/summary`.
#[derive(Debug, Serialize)]
pub struct ReceivablesSummary {
    pub total_receivable: Decimal,
    pub total_overdue: Decimal,
    pub delinquent_clients: usize,
    pub total_clients_with_receivables: usize,
    pub by_age: BTreeMap<&'static str, Decimal>,
    pub overdue_count: usize,
    pub total_invoices: usize,
    pub top_debtors: Vec<TopDebtor>,
}

// =============================================================================
// Service
// =============================================================================

pub struct ReceivablesService {
    store: TenantStore,
}

impl ReceivablesService {
    pub fn new(store: TenantStore) -> Self {
        Self { store }
    }

    /// Account status for one client: invoice detail plus rollup.
    pub fn account_status(&self, client_id: Uuid, now: DateTime<Utc>) -> AppResult<AccountStatus> {
        self.store.read(|ledger| {
            let client = ledger.clients.require(&client_id)?;

            let mut invoices: Vec<&Invoice> = ledger
                .invoices
                .iter()
                .filter(|inv| {
                    inv.client_id == client_id
                        && !matches!(inv.status, InvoiceStatus::Draft | InvoiceStatus::Cancelled)
                })
                .collect();
            invoices.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));

            let details: Vec<InvoiceDetail> = invoices
                .iter()
                .map(|inv| {
                    let mut payments: Vec<PaymentBrief> = ledger
                        .payments
                        .iter()
                        .filter(|p| p.invoice_id == inv.id)
                        .map(|p| PaymentBrief {
                            id: p.id,
                            amount: p.amount,
                            payment_date: p.payment_date,
                            method: p.method,
                        })
                        .collect();
                    payments.sort_by(|a, b| a.payment_date.cmp(&b.payment_date));

                    InvoiceDetail {
                        id: inv.id,
                        number: inv.number.clone(),
                        ncf: inv.ncf.clone(),
                        issue_date: inv.issue_date,
                        due_date: inv.due_date,
                        total: inv.total,
                        paid: inv.paid_amount(),
                        balance: inv.balance,
                        days_overdue: inv.days_overdue(now),
                        status: inv.effective_status(now),
                        payments,
                    }
                })
                .collect();

            let pending: Vec<&InvoiceDetail> = details
                .iter()
                .filter(|d| d.balance > Decimal::ZERO)
                .collect();
            let total_receivable = pending.iter().map(|d| d.balance).sum();
            let total_overdue = pending
                .iter()
                .filter(|d| d.days_overdue > 0)
                .map(|d| d.balance)
                .sum();
            let average_days_overdue = if pending.is_empty() {
                0
            } else {
                pending.iter().map(|d| d.days_overdue).sum::<i64>() / pending.len() as i64
            };

            Ok(AccountStatus {
                client: ClientHeader::from(client),
                summary: ClientAccountSummary {
                    total_receivable,
                    total_overdue,
                    total_invoices: details.len(),
                    pending_invoices: pending.len(),
                    average_days_overdue,
                },
                invoices: details,
            })
        })?
    }

    /// Paginated overdue invoices, oldest due date first.
    pub fn overdue(
        &self,
        filter: &OverdueFilter,
        page: PageQuery,
        now: DateTime<Utc>,
    ) -> AppResult<Paginated<OverdueEntry>> {
        self.store.read(|ledger| {
            let search = filter.search.as_deref().map(str::to_lowercase);

            let mut entries: Vec<OverdueEntry> = ledger
                .invoices
                .iter()
                .filter(|inv| inv.is_payable() && inv.is_overdue(now))
                .filter(|inv| match filter.bucket {
                    Some(bucket) => {
                        AgeBucket::for_days_overdue(inv.days_overdue(now)) == Some(bucket)
                    }
                    None => true,
                })
                .filter(|inv| {
                    filter
                        .client_id
                        .is_none_or(|client_id| inv.client_id == client_id)
                })
                .filter_map(|inv| {
                    let client = ledger.clients.get(&inv.client_id)?;
                    if let Some(needle) = &search {
                        let hit = inv.number.to_lowercase().contains(needle)
                            || inv
                                .ncf
                                .as_deref()
                                .is_some_and(|n| n.to_lowercase().contains(needle))
                            || client.name.to_lowercase().contains(needle);
                        if !hit {
                            return None;
                        }
                    }
                    Some(OverdueEntry {
                        id: inv.id,
                        client: ClientBrief {
                            id: client.id,
                            name: client.name.clone(),
                            phone: client.phone.clone(),
                            email: client.email.clone(),
                        },
                        invoice: OverdueInvoice {
                            id: inv.id,
                            number: inv.number.clone(),
                            ncf: inv.ncf.clone(),
                            total: inv.total,
                            balance: inv.balance,
                            issue_date: inv.issue_date,
                            due_date: inv.due_date,
                            days_overdue: inv.days_overdue(now),
                        },
                    })
                })
                .collect();

            entries.sort_by(|a, b| a.invoice.due_date.cmp(&b.invoice.due_date));
            Paginated::slice(entries, page)
        })
    }

    /// Apply a payment across the client's invoices and commit atomically.
    ///
    /// Distribution mode is derived from the request: explicit
    /// `invoice_payments` means manual; otherwise proportional over the
    /// selected (or all outstanding) invoices.
    pub fn create_payment(
        &self,
        request: &PaymentRequest,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<PaymentReceipt> {
        let amount = to_cents(request.amount);
        let payment_date = request.payment_date.unwrap_or(now);

        self.store.transaction(|ledger| {
            ledger.clients.require(&request.client_id)?;

            // Collect the candidate invoices, oldest due date first.
            let mut invoices: Vec<Invoice> = if let Some(entries) = &request.invoice_payments {
                let ids: Vec<Uuid> = entries.iter().map(|e| e.invoice_id).collect();
                selected_invoices(ledger, request.client_id, &ids)?
            } else if let Some(ids) = &request.invoice_ids {
                selected_invoices(ledger, request.client_id, ids)?
            } else {
                ledger
                    .invoices
                    .filter(|inv| inv.client_id == request.client_id && inv.is_payable())
            };
            invoices.sort_by(due_date_order);

            let distribution = match &request.invoice_payments {
                Some(entries) => Distribution::Manual(
                    entries
                        .iter()
                        .map(|e| (e.invoice_id, to_cents(e.amount)))
                        .collect(),
                ),
                None => Distribution::Proportional,
            };

            let shares = allocate(amount, &invoices, &distribution)?;

            // Cash payments need an open register before anything commits.
            let open_register = match request.method {
                PaymentMethod::Cash => Some(
                    ledger
                        .open_cash_register()
                        .ok_or(PaymentError::NoCashRegisterOpen)?,
                ),
                _ => None,
            };

            let mut receipts = Vec::with_capacity(shares.len());
            for share in &shares {
                let invoice = ledger.invoices.require_mut(&share.invoice_id)?;
                invoice.apply_payment(share.amount, now);

                let payment = ledger.payments.insert(Payment::new(
                    request.client_id,
                    share.invoice_id,
                    share.amount,
                    request.method,
                    request.reference.clone(),
                    payment_date,
                    request.observations.clone(),
                    user_id,
                ));
                receipts.push(PaymentShareReceipt {
                    id: payment.id,
                    invoice_id: payment.invoice_id,
                    amount: payment.amount,
                    method: payment.method,
                    payment_date: payment.payment_date,
                });
            }

            // One aggregate drawer movement for the whole payment.
            if let Some(register) = open_register {
                let mut movement = CashMovement::new(
                    register.id,
                    CashMovementType::Payment,
                    format!(
                        "Receivable payment ({} invoice{})",
                        receipts.len(),
                        if receipts.len() == 1 { "" } else { "s" }
                    ),
                    amount,
                    user_id,
                );
                movement.payment_id = receipts.first().map(|r| r.id);
                ledger.cash_movements.insert(movement);
            }

            tracing::info!(
                client_id = %request.client_id,
                amount = %amount,
                shares = receipts.len(),
                "receivable payment applied"
            );

            Ok(PaymentReceipt {
                payments: receipts,
                total_amount: amount,
            })
        })
    }

    /// Paginated payment history, newest first.
    pub fn payments(
        &self,
        filter: &PaymentFilter,
        page: PageQuery,
    ) -> AppResult<Paginated<PaymentRow>> {
        self.store.read(|ledger| {
            let mut rows: Vec<PaymentRow> = ledger
                .payments
                .iter()
                .filter(|p| filter.client_id.is_none_or(|id| p.client_id == id))
                .filter(|p| filter.invoice_id.is_none_or(|id| p.invoice_id == id))
                .filter(|p| filter.start_date.is_none_or(|d| p.payment_date >= d))
                .filter(|p| filter.end_date.is_none_or(|d| p.payment_date <= d))
                .filter_map(|p| {
                    let client = ledger.clients.get(&p.client_id)?;
                    let invoice = ledger.invoices.get(&p.invoice_id).map(|inv| InvoiceRef {
                        id: inv.id,
                        number: inv.number.clone(),
                        ncf: inv.ncf.clone(),
                    });
                    Some(PaymentRow {
                        id: p.id,
                        client: ClientBrief {
                            id: client.id,
                            name: client.name.clone(),
                            phone: client.phone.clone(),
                            email: client.email.clone(),
                        },
                        invoice,
                        amount: p.amount,
                        method: p.method,
                        reference: p.reference.clone(),
                        payment_date: p.payment_date,
                        observations: p.observations.clone(),
                        created_at: p.created_at,
                    })
                })
                .collect();

            rows.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
            Paginated::slice(rows, page)
        })
    }

    /// Tenant-wide receivables summary over open credit invoices.
    pub fn summary(&self, now: DateTime<Utc>) -> AppResult<ReceivablesSummary> {
        self.store.read(|ledger| {
            let open: Vec<&Invoice> = ledger
                .invoices
                .iter()
                .filter(|inv| {
                    inv.is_payable() && inv.payment_terms == PaymentTerms::Credit
                })
                .collect();

            let total_receivable: Decimal = open.iter().map(|inv| inv.balance).sum();

            let overdue: Vec<&&Invoice> =
                open.iter().filter(|inv| inv.is_overdue(now)).collect();
            let total_overdue: Decimal = overdue.iter().map(|inv| inv.balance).sum();

            let mut by_age: BTreeMap<&'static str, Decimal> = AgeBucket::ALL
                .iter()
                .map(|bucket| (bucket.label(), Decimal::ZERO))
                .collect();
            for inv in &overdue {
                if let Some(bucket) = AgeBucket::for_days_overdue(inv.days_overdue(now)) {
                    *by_age.entry(bucket.label()).or_default() += inv.balance;
                }
            }

            let delinquent: HashSet<Uuid> = overdue.iter().map(|inv| inv.client_id).collect();
            let with_receivables: HashSet<Uuid> = open.iter().map(|inv| inv.client_id).collect();

            // Per-client rollup for the top-debtors board.
            struct Rollup {
                total: Decimal,
                overdue: Decimal,
                count: usize,
            }
            let mut per_client: HashMap<Uuid, Rollup> = HashMap::new();
            for inv in &open {
                let entry = per_client.entry(inv.client_id).or_insert(Rollup {
                    total: Decimal::ZERO,
                    overdue: Decimal::ZERO,
                    count: 0,
                });
                entry.total += inv.balance;
                entry.count += 1;
                if inv.is_overdue(now) {
                    entry.overdue += inv.balance;
                }
            }

            let mut top_debtors: Vec<TopDebtor> = per_client
                .into_iter()
                .map(|(client_id, rollup)| {
                    let client = ledger.clients.get(&client_id);
                    TopDebtor {
                        client_id,
                        client_name: client
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| "(deleted client)".to_string()),
                        client_identification: client.and_then(|c| c.identification.clone()),
                        total_balance: rollup.total,
                        overdue_balance: rollup.overdue,
                        invoice_count: rollup.count,
                    }
                })
                .collect();
            top_debtors.sort_by(|a, b| b.total_balance.cmp(&a.total_balance));
            top_debtors.truncate(10);

            ReceivablesSummary {
                total_receivable,
                total_overdue,
                delinquent_clients: delinquent.len(),
                total_clients_with_receivables: with_receivables.len(),
                by_age,
                overdue_count: overdue.len(),
                total_invoices: open.len(),
                top_debtors,
            }
        })
    }
}

/// Load the selected invoices, verifying every id exists, belongs to the
/// client, appears only once and can still take payments.
fn selected_invoices(
    ledger: &crate::storage::Ledger,
    client_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Invoice>, crate::core::error::AppError> {
    let mut invoices = Vec::with_capacity(ids.len());
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        // A repeated id would count the same balance twice as weight.
        if !seen.insert(*id) {
            return Err(PaymentError::InvalidInvoices.into());
        }
        let invoice = ledger
            .invoices
            .get(id)
            .ok_or_else(|| EntityError::not_found("invoice", *id))?;
        if invoice.client_id != client_id || !invoice.is_payable() {
            return Err(PaymentError::InvalidInvoices.into());
        }
        invoices.push(invoice.clone());
    }
    Ok(invoices)
}

/// Oldest due date first; undated invoices sort last.
fn due_date_order(a: &Invoice, b: &Invoice) -> std::cmp::Ordering {
    match (a.due_date, b.due_date) {
        (Some(a_due), Some(b_due)) => a_due.cmp(&b_due),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.issue_date.cmp(&b.issue_date),
    }
}
