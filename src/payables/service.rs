//! Payables service: supplier payments allocated across payable invoices
//! and purchases, with reversal and aging reports.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::core::entity::Record;
use crate::core::error::{AppResult, PaymentError};
use crate::core::money::{distribute_proportional, to_cents};
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::{
    AllocationTarget, CashMovement, CashMovementType, PaymentAllocation, PaymentMethod, Supplier,
    SupplierPayment,
};
use crate::receivables::aging::AgeBucket;
use crate::storage::{Ledger, TenantStore};

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AllocationRequest {
    #[serde(flatten)]
    pub target: AllocationTarget,
    pub amount: Decimal,
}

/// Body of `POST /payables/payments`.
#[derive(Debug, Clone, Deserialize)]
pub struct SupplierPaymentRequest {
    pub supplier_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Explicit allocation; when omitted the payment spreads
    /// proportionally over the supplier's open invoices.
    #[serde(default)]
    pub allocations: Option<Vec<AllocationRequest>>,
}

#[derive(Debug, Serialize)]
pub struct SupplierBrief {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

impl From<&Supplier> for SupplierBrief {
    fn from(supplier: &Supplier) -> Self {
        Self {
            id: supplier.id,
            code: supplier.code.clone(),
            name: supplier.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AllocationDetail {
    #[serde(flatten)]
    pub target: AllocationTarget,
    /// Document number of the invoice or purchase code
    pub document: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SupplierPaymentView {
    pub id: Uuid,
    pub code: String,
    pub supplier: SupplierBrief,
    pub payment_date: DateTime<Utc>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub allocations: Vec<AllocationDetail>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone)]
pub struct SupplierPaymentFilter {
    pub supplier_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PayableDocument {
    pub id: Uuid,
    #[serde(flatten)]
    pub target: AllocationTarget,
    pub document: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub total: Decimal,
    pub balance: Decimal,
    pub days_overdue: i64,
}

/// Response of `GET /payables/status/{supplier_id}`.
#[derive(Debug, Serialize)]
pub struct SupplierStatus {
    pub supplier: SupplierBrief,
    pub total_payable: Decimal,
    pub total_overdue: Decimal,
    pub documents: Vec<PayableDocument>,
}

/// Response of `GET /payables/summary`.
#[derive(Debug, Serialize)]
pub struct PayablesSummary {
    pub total_payable: Decimal,
    pub total_overdue: Decimal,
    pub by_age: BTreeMap<&'static str, Decimal>,
    pub open_invoices: usize,
    pub overdue_invoices: usize,
    pub unpaid_purchases: usize,
    pub suppliers_with_payables: usize,
    /// Month-to-date payment outflow
    pub paid_this_month: Decimal,
    pub payments_this_month: usize,
}

// =============================================================================
// Service
// =============================================================================

pub struct PayablesService {
    store: TenantStore,
}

impl PayablesService {
    pub fn new(store: TenantStore) -> Self {
        Self { store }
    }

    /// Register a supplier payment and apply its allocations atomically.
    pub fn create_payment(
        &self,
        request: &SupplierPaymentRequest,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<SupplierPaymentView> {
        let amount = to_cents(request.amount);
        if amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount.into());
        }
        let payment_date = request.payment_date.unwrap_or(now);

        self.store.transaction(|ledger| {
            ledger.suppliers.require(&request.supplier_id)?;

            let allocations = match &request.allocations {
                Some(entries) => manual_allocations(ledger, request, amount, entries)?,
                None => proportional_allocations(ledger, request.supplier_id, amount)?,
            };

            // Paying cash out of the drawer needs an open register.
            let open_register = match request.method {
                PaymentMethod::Cash => Some(
                    ledger
                        .open_cash_register()
                        .ok_or(PaymentError::NoCashRegisterOpen)?,
                ),
                _ => None,
            };

            for alloc in &allocations {
                match alloc.target {
                    AllocationTarget::Invoice(id) => {
                        let invoice = ledger.supplier_invoices.require_mut(&id)?;
                        invoice.apply_payment(alloc.amount, now);
                    }
                    AllocationTarget::Purchase(id) => {
                        let purchase = ledger.purchases.require_mut(&id)?;
                        purchase.apply_payment(alloc.amount);
                    }
                }
            }

            let code = SupplierPayment::code_for(next_code_sequence(ledger));
            let payment = ledger.supplier_payments.insert(SupplierPayment {
                id: Uuid::new_v4(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
                code,
                supplier_id: request.supplier_id,
                payment_date,
                amount,
                method: request.method,
                reference: request.reference.clone(),
                notes: request.notes.clone(),
                user_id,
                allocations,
            });

            if let Some(register) = open_register {
                let mut movement = CashMovement::new(
                    register.id,
                    CashMovementType::Expense,
                    format!("Supplier payment {}", payment.code),
                    amount,
                    user_id,
                );
                movement.payment_id = Some(payment.id);
                ledger.cash_movements.insert(movement);
            }

            tracing::info!(
                supplier_id = %request.supplier_id,
                code = %payment.code,
                amount = %amount,
                "supplier payment applied"
            );

            view(ledger, &payment)
        })
    }

    /// Undo a payment: walk back every allocation and soft-delete the row.
    pub fn reverse_payment(&self, payment_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        self.store.transaction(|ledger| {
            let payment = ledger.supplier_payments.require(&payment_id)?.clone();

            for alloc in &payment.allocations {
                match alloc.target {
                    AllocationTarget::Invoice(id) => {
                        let invoice = ledger.supplier_invoices.require_mut(&id)?;
                        invoice.revert_payment(alloc.amount, now);
                    }
                    AllocationTarget::Purchase(id) => {
                        let purchase = ledger.purchases.require_mut(&id)?;
                        purchase.revert_payment(alloc.amount);
                    }
                }
            }

            let row = ledger.supplier_payments.require_mut(&payment_id)?;
            row.deleted_at = Some(now);
            row.touch();

            tracing::info!(code = %payment.code, "supplier payment reversed");
            Ok(())
        })
    }

    pub fn payment(&self, payment_id: Uuid) -> AppResult<SupplierPaymentView> {
        self.store.read(|ledger| {
            let payment = ledger.supplier_payments.require(&payment_id)?;
            view(ledger, payment)
        })?
    }

    /// Paginated payment history, newest first.
    pub fn payments(
        &self,
        filter: &SupplierPaymentFilter,
        page: PageQuery,
    ) -> AppResult<Paginated<SupplierPaymentView>> {
        self.store.read(|ledger| {
            let mut rows: Vec<SupplierPaymentView> = ledger
                .supplier_payments
                .iter()
                .filter(|p| filter.supplier_id.is_none_or(|id| p.supplier_id == id))
                .filter(|p| filter.start_date.is_none_or(|d| p.payment_date >= d))
                .filter(|p| filter.end_date.is_none_or(|d| p.payment_date <= d))
                .filter_map(|p| view(ledger, p).ok())
                .collect();

            rows.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
            Paginated::slice(rows, page)
        })
    }

    /// Outstanding documents for one supplier, oldest due date first.
    pub fn supplier_status(
        &self,
        supplier_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<SupplierStatus> {
        self.store.read(|ledger| {
            let supplier = ledger.suppliers.require(&supplier_id)?;

            let mut documents: Vec<PayableDocument> = ledger
                .supplier_invoices
                .iter()
                .filter(|inv| inv.supplier_id == supplier_id && inv.is_payable())
                .map(|inv| PayableDocument {
                    id: inv.id,
                    target: AllocationTarget::Invoice(inv.id),
                    document: inv.number.clone(),
                    issue_date: inv.issue_date,
                    due_date: Some(inv.due_date),
                    total: inv.total,
                    balance: inv.balance,
                    days_overdue: inv.days_overdue(now),
                })
                .collect();
            documents.extend(
                ledger
                    .purchases
                    .iter()
                    .filter(|p| p.supplier_id == supplier_id && p.balance > Decimal::ZERO)
                    .map(|p| PayableDocument {
                        id: p.id,
                        target: AllocationTarget::Purchase(p.id),
                        document: p.code.clone(),
                        issue_date: p.created_at,
                        due_date: None,
                        total: p.total,
                        balance: p.balance,
                        days_overdue: 0,
                    }),
            );
            documents.sort_by(|a, b| match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.issue_date.cmp(&b.issue_date),
            });

            let total_payable = documents.iter().map(|d| d.balance).sum();
            let total_overdue = documents
                .iter()
                .filter(|d| d.days_overdue > 0)
                .map(|d| d.balance)
                .sum();

            Ok(SupplierStatus {
                supplier: SupplierBrief::from(supplier),
                total_payable,
                total_overdue,
                documents,
            })
        })?
    }

    /// Tenant-wide payables rollup.
    pub fn summary(&self, now: DateTime<Utc>) -> AppResult<PayablesSummary> {
        self.store.read(|ledger| {
            let open: Vec<_> = ledger
                .supplier_invoices
                .iter()
                .filter(|inv| inv.is_payable())
                .collect();
            let unpaid_purchases: Vec<_> = ledger
                .purchases
                .iter()
                .filter(|p| p.balance > Decimal::ZERO)
                .collect();

            let total_payable: Decimal = open.iter().map(|inv| inv.balance).sum::<Decimal>()
                + unpaid_purchases.iter().map(|p| p.balance).sum::<Decimal>();

            let overdue: Vec<_> = open.iter().filter(|inv| inv.is_overdue(now)).collect();
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

            let suppliers: HashSet<Uuid> = open
                .iter()
                .map(|inv| inv.supplier_id)
                .chain(unpaid_purchases.iter().map(|p| p.supplier_id))
                .collect();

            let month_payments: Vec<_> = ledger
                .supplier_payments
                .iter()
                .filter(|p| {
                    p.payment_date.year() == now.year() && p.payment_date.month() == now.month()
                })
                .collect();
            let paid_this_month = month_payments.iter().map(|p| p.amount).sum();
            let payments_this_month = month_payments.len();

            PayablesSummary {
                total_payable,
                total_overdue,
                by_age,
                open_invoices: open.len(),
                overdue_invoices: overdue.len(),
                unpaid_purchases: unpaid_purchases.len(),
                suppliers_with_payables: suppliers.len(),
                paid_this_month,
                payments_this_month,
            }
        })
    }
}

// =============================================================================
// Allocation helpers
// =============================================================================

/// Validate an explicit allocation list: every target must belong to the
/// supplier, still carry a balance, appear only once, and the amounts
/// must sum to the payment exactly without over-paying any single
/// document.
fn manual_allocations(
    ledger: &Ledger,
    request: &SupplierPaymentRequest,
    amount: Decimal,
    entries: &[AllocationRequest],
) -> AppResult<Vec<PaymentAllocation>> {
    if entries.is_empty() {
        return Err(PaymentError::InvalidInvoices.into());
    }

    let mut allocations = Vec::with_capacity(entries.len());
    let mut allocated = Decimal::ZERO;
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        let share = to_cents(entry.amount);
        if share <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount.into());
        }
        // Repeated targets would each clear the per-document balance
        // check while jointly exceeding it.
        if !seen.insert(entry.target) {
            return Err(PaymentError::InvalidInvoices.into());
        }

        let (document, balance) = match entry.target {
            AllocationTarget::Invoice(id) => {
                let invoice = ledger
                    .supplier_invoices
                    .get(&id)
                    .filter(|inv| inv.supplier_id == request.supplier_id && inv.is_payable())
                    .ok_or(PaymentError::InvalidInvoices)?;
                (invoice.number.clone(), invoice.balance)
            }
            AllocationTarget::Purchase(id) => {
                let purchase = ledger
                    .purchases
                    .get(&id)
                    .filter(|p| p.supplier_id == request.supplier_id && p.balance > Decimal::ZERO)
                    .ok_or(PaymentError::InvalidInvoices)?;
                (purchase.code.clone(), purchase.balance)
            }
        };
        if share > balance {
            return Err(PaymentError::AllocationExceedsBalance {
                invoice_number: document,
                allocated: share,
                balance,
            }
            .into());
        }

        allocated += share;
        allocations.push(PaymentAllocation {
            target: entry.target,
            amount: share,
        });
    }

    if allocated != amount {
        return Err(PaymentError::AmountMismatch {
            expected: amount,
            allocated,
        }
        .into());
    }
    Ok(allocations)
}

/// Spread the payment over the supplier's open invoices proportionally to
/// their balances, oldest due date first.
fn proportional_allocations(
    ledger: &Ledger,
    supplier_id: Uuid,
    amount: Decimal,
) -> AppResult<Vec<PaymentAllocation>> {
    let mut invoices = ledger
        .supplier_invoices
        .filter(|inv| inv.supplier_id == supplier_id && inv.is_payable());
    if invoices.is_empty() {
        return Err(PaymentError::NothingOutstanding.into());
    }
    invoices.sort_by(|a, b| a.due_date.cmp(&b.due_date));

    let total: Decimal = invoices.iter().map(|inv| inv.balance).sum();
    if amount > total {
        return Err(PaymentError::AmountExceedsTotal.into());
    }

    let balances: Vec<Decimal> = invoices.iter().map(|inv| inv.balance).collect();
    let shares = distribute_proportional(amount, &balances);

    Ok(invoices
        .iter()
        .zip(shares)
        .filter(|(_, share)| *share > Decimal::ZERO)
        .map(|(inv, share)| PaymentAllocation {
            target: AllocationTarget::Invoice(inv.id),
            amount: share,
        })
        .collect())
}

/// Next FPAG sequence: one past the highest code seen, deleted rows
/// included so codes are never reused.
fn next_code_sequence(ledger: &Ledger) -> u32 {
    ledger
        .supplier_payments
        .iter_all()
        .map(|p| SupplierPayment::code_sequence(&p.code))
        .max()
        .unwrap_or(0)
        + 1
}

fn view(ledger: &Ledger, payment: &SupplierPayment) -> AppResult<SupplierPaymentView> {
    let supplier = ledger.suppliers.require(&payment.supplier_id)?;
    let allocations = payment
        .allocations
        .iter()
        .map(|alloc| {
            let document = match alloc.target {
                AllocationTarget::Invoice(id) => ledger
                    .supplier_invoices
                    .get(&id)
                    .map(|inv| inv.number.clone()),
                AllocationTarget::Purchase(id) => {
                    ledger.purchases.get(&id).map(|p| p.code.clone())
                }
            }
            .unwrap_or_else(|| "(missing)".to_string());
            AllocationDetail {
                target: alloc.target,
                document,
                amount: alloc.amount,
            }
        })
        .collect();

    Ok(SupplierPaymentView {
        id: payment.id,
        code: payment.code.clone(),
        supplier: SupplierBrief::from(supplier),
        payment_date: payment.payment_date,
        amount: payment.amount,
        method: payment.method,
        reference: payment.reference.clone(),
        notes: payment.notes.clone(),
        allocations,
        created_at: payment.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use crate::domain::SupplierInvoice;

    fn seeded_store() -> (TenantStore, Uuid, Uuid, Uuid) {
        let store = TenantStore::default();
        let supplier_id = Uuid::new_v4();
        let now = Utc::now();
        let (inv_a, inv_b) = store
            .transaction(|ledger| {
                let mut supplier = Supplier::new("PROV-001".to_string(), "Acme SRL".to_string());
                supplier.id = supplier_id;
                ledger.suppliers.insert(supplier);
                let a = ledger.supplier_invoices.insert(SupplierInvoice::new(
                    "A-1".to_string(),
                    supplier_id,
                    dec!(300.00),
                    now - Duration::days(10),
                    now + Duration::days(20),
                ));
                let b = ledger.supplier_invoices.insert(SupplierInvoice::new(
                    "A-2".to_string(),
                    supplier_id,
                    dec!(100.00),
                    now - Duration::days(5),
                    now + Duration::days(25),
                ));
                Ok((a.id, b.id))
            })
            .unwrap();
        (store, supplier_id, inv_a, inv_b)
    }

    fn request(supplier_id: Uuid, amount: Decimal) -> SupplierPaymentRequest {
        SupplierPaymentRequest {
            supplier_id,
            amount,
            method: PaymentMethod::Transfer,
            reference: None,
            payment_date: None,
            notes: None,
            allocations: None,
        }
    }

    #[test]
    fn proportional_payment_splits_by_balance() {
        let (store, supplier_id, inv_a, inv_b) = seeded_store();
        let service = PayablesService::new(store.clone());

        let receipt = service
            .create_payment(&request(supplier_id, dec!(200.00)), Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(receipt.code, "FPAG-000001");
        assert_eq!(receipt.allocations.len(), 2);

        store
            .read(|ledger| {
                assert_eq!(
                    ledger.supplier_invoices.get(&inv_a).unwrap().balance,
                    dec!(150.00)
                );
                assert_eq!(
                    ledger.supplier_invoices.get(&inv_b).unwrap().balance,
                    dec!(50.00)
                );
            })
            .unwrap();
    }

    #[test]
    fn manual_allocation_must_sum_to_amount() {
        let (store, supplier_id, inv_a, _) = seeded_store();
        let service = PayablesService::new(store);

        let mut req = request(supplier_id, dec!(100.00));
        req.allocations = Some(vec![AllocationRequest {
            target: AllocationTarget::Invoice(inv_a),
            amount: dec!(60.00),
        }]);

        let err = service
            .create_payment(&req, Uuid::new_v4(), Utc::now())
            .unwrap_err();
        assert_eq!(err.error_code(), "AMOUNT_MISMATCH");
    }

    #[test]
    fn duplicate_allocation_targets_are_rejected() {
        // Two entries against the same invoice each fit its balance
        // alone; accepting both would retire less debt than collected.
        let (store, supplier_id, inv_a, _) = seeded_store();
        let service = PayablesService::new(store.clone());

        let mut req = request(supplier_id, dec!(400.00));
        req.allocations = Some(vec![
            AllocationRequest {
                target: AllocationTarget::Invoice(inv_a),
                amount: dec!(200.00),
            },
            AllocationRequest {
                target: AllocationTarget::Invoice(inv_a),
                amount: dec!(200.00),
            },
        ]);

        let err = service
            .create_payment(&req, Uuid::new_v4(), Utc::now())
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INVOICES");

        store
            .read(|ledger| {
                assert_eq!(
                    ledger.supplier_invoices.get(&inv_a).unwrap().balance,
                    dec!(300.00)
                );
                assert!(ledger.supplier_payments.is_empty());
            })
            .unwrap();
    }

    #[test]
    fn reversal_restores_balances_and_hides_payment() {
        let (store, supplier_id, inv_a, _) = seeded_store();
        let service = PayablesService::new(store.clone());

        let receipt = service
            .create_payment(&request(supplier_id, dec!(400.00)), Uuid::new_v4(), Utc::now())
            .unwrap();
        service.reverse_payment(receipt.id, Utc::now()).unwrap();

        store
            .read(|ledger| {
                assert_eq!(
                    ledger.supplier_invoices.get(&inv_a).unwrap().balance,
                    dec!(300.00)
                );
                assert!(ledger.supplier_payments.get(&receipt.id).is_none());
            })
            .unwrap();

        // the FPAG sequence keeps counting past reversed payments
        let next = service
            .create_payment(&request(supplier_id, dec!(100.00)), Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(next.code, "FPAG-000002");
    }

    #[test]
    fn sequence_codes_increment() {
        let (store, supplier_id, _, _) = seeded_store();
        let service = PayablesService::new(store);

        let first = service
            .create_payment(&request(supplier_id, dec!(50.00)), Uuid::new_v4(), Utc::now())
            .unwrap();
        let second = service
            .create_payment(&request(supplier_id, dec!(50.00)), Uuid::new_v4(), Utc::now())
            .unwrap();
        assert_eq!(first.code, "FPAG-000001");
        assert_eq!(second.code, "FPAG-000002");
    }
}
