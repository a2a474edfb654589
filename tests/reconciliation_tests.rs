//! Receivables reconciliation: allocation modes, atomicity and reporting.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use comercio::core::pagination::PageQuery;
use comercio::domain::{Client, Invoice, PaymentMethod, PaymentTerms};
use comercio::prelude::*;
use comercio::receivables::aging::AgeBucket;
use comercio::receivables::service::{
    InvoiceShareRequest, OverdueFilter, PaymentFilter, PaymentRequest, ReceivablesService,
};

// =============================================================================
// Fixtures
// =============================================================================

struct Fixture {
    store: TenantStore,
    service: ReceivablesService,
    client_id: Uuid,
}

impl Fixture {
    /// One client with credit invoices due in the given number of days
    /// (negative means already overdue) carrying the given totals.
    fn new(invoices: &[(Decimal, i64)]) -> (Self, Vec<Uuid>) {
        let store = TenantStore::new();
        let client = Client::new("Comercial Duarte".to_string());
        let client_id = client.id;
        let now = Utc::now();

        let ids = store
            .transaction(|ledger| {
                ledger.clients.insert(client.clone());
                let mut ids = Vec::new();
                for (idx, (total, due_in)) in invoices.iter().enumerate() {
                    let invoice = Invoice::issue(
                        format!("F-{:06}", idx + 1),
                        client_id,
                        *total,
                        PaymentTerms::Credit,
                        now - Duration::days(30),
                        Some(now + Duration::days(*due_in)),
                    );
                    ids.push(ledger.invoices.insert(invoice).id);
                }
                Ok(ids)
            })
            .unwrap();

        let service = ReceivablesService::new(store.clone());
        (
            Self {
                store,
                service,
                client_id,
            },
            ids,
        )
    }

    fn balance_of(&self, invoice_id: Uuid) -> Decimal {
        self.store
            .read(|ledger| ledger.invoices.get(&invoice_id).unwrap().balance)
            .unwrap()
    }

    fn total_outstanding(&self) -> Decimal {
        self.store
            .read(|ledger| ledger.invoices.iter().map(|inv| inv.balance).sum())
            .unwrap()
    }

    fn proportional(&self, amount: Decimal) -> PaymentRequest {
        PaymentRequest {
            client_id: self.client_id,
            amount,
            method: PaymentMethod::Transfer,
            reference: None,
            payment_date: None,
            observations: None,
            invoice_ids: None,
            invoice_payments: None,
        }
    }
}

// =============================================================================
// Proportional distribution
// =============================================================================

#[test]
fn proportional_payment_splits_by_balance() {
    let (fx, ids) = Fixture::new(&[(dec!(300.00), 30), (dec!(100.00), 40)]);

    let receipt = fx
        .service
        .create_payment(&fx.proportional(dec!(200.00)), Uuid::new_v4(), Utc::now())
        .unwrap();

    assert_eq!(receipt.total_amount, dec!(200.00));
    assert_eq!(receipt.payments.len(), 2);
    assert_eq!(fx.balance_of(ids[0]), dec!(150.00));
    assert_eq!(fx.balance_of(ids[1]), dec!(50.00));
}

#[test]
fn paying_the_full_outstanding_settles_every_invoice() {
    let (fx, ids) = Fixture::new(&[(dec!(123.45), 10), (dec!(67.89), 20), (dec!(8.66), 30)]);

    fx.service
        .create_payment(&fx.proportional(dec!(200.00)), Uuid::new_v4(), Utc::now())
        .unwrap();

    for id in ids {
        assert_eq!(fx.balance_of(id), Decimal::ZERO);
    }
    fx.store
        .read(|ledger| {
            assert!(
                ledger
                    .invoices
                    .iter()
                    .all(|inv| inv.status == InvoiceStatus::Paid)
            );
        })
        .unwrap();
}

#[test]
fn remainder_cents_go_to_the_oldest_invoice() {
    // Three equal balances cannot split 100.00 evenly; the leftover cent
    // lands on the invoice with the earliest due date.
    let (fx, ids) = Fixture::new(&[(dec!(100.00), 5), (dec!(100.00), 15), (dec!(100.00), 25)]);

    fx.service
        .create_payment(&fx.proportional(dec!(100.00)), Uuid::new_v4(), Utc::now())
        .unwrap();

    assert_eq!(fx.balance_of(ids[0]), dec!(100.00) - dec!(33.34));
    assert_eq!(fx.balance_of(ids[1]), dec!(100.00) - dec!(33.33));
    assert_eq!(fx.balance_of(ids[2]), dec!(100.00) - dec!(33.33));
}

#[test]
fn payment_conserves_total_balance() {
    let (fx, _) = Fixture::new(&[(dec!(77.31), 10), (dec!(210.99), 20), (dec!(5.03), 30)]);
    let before = fx.total_outstanding();

    fx.service
        .create_payment(&fx.proportional(dec!(150.07)), Uuid::new_v4(), Utc::now())
        .unwrap();

    assert_eq!(fx.total_outstanding(), before - dec!(150.07));

    // created payment rows sum to the payment amount
    let paid: Decimal = fx
        .store
        .read(|ledger| ledger.payments.iter().map(|p| p.amount).sum())
        .unwrap();
    assert_eq!(paid, dec!(150.07));
}

#[test]
fn overpayment_is_rejected() {
    let (fx, _) = Fixture::new(&[(dec!(100.00), 10)]);
    let err = fx
        .service
        .create_payment(&fx.proportional(dec!(100.01)), Uuid::new_v4(), Utc::now())
        .unwrap_err();
    assert_eq!(err.error_code(), "AMOUNT_EXCEEDS_BALANCE");
}

#[test]
fn payment_without_open_invoices_is_rejected() {
    let (fx, _) = Fixture::new(&[]);
    let err = fx
        .service
        .create_payment(&fx.proportional(dec!(10.00)), Uuid::new_v4(), Utc::now())
        .unwrap_err();
    assert_eq!(err.error_code(), "NOTHING_OUTSTANDING");
}

#[test]
fn repeated_invoice_id_in_selection_is_rejected() {
    // A repeated id would double the invoice's weight and cap, letting
    // the payment collect more than the debt it retires.
    let (fx, ids) = Fixture::new(&[(dec!(100.00), 10)]);

    let mut request = fx.proportional(dec!(200.00));
    request.invoice_ids = Some(vec![ids[0], ids[0]]);
    let err = fx
        .service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap_err();

    assert_eq!(err.error_code(), "INVALID_INVOICES");
    assert_eq!(fx.balance_of(ids[0]), dec!(100.00));
    let payment_count = fx.store.read(|ledger| ledger.payments.len()).unwrap();
    assert_eq!(payment_count, 0);
}

#[test]
fn restricting_to_selected_invoices_skips_the_rest() {
    let (fx, ids) = Fixture::new(&[(dec!(100.00), 10), (dec!(100.00), 20), (dec!(100.00), 30)]);

    let mut request = fx.proportional(dec!(100.00));
    request.invoice_ids = Some(vec![ids[0], ids[2]]);
    fx.service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap();

    assert_eq!(fx.balance_of(ids[0]), dec!(50.00));
    assert_eq!(fx.balance_of(ids[1]), dec!(100.00));
    assert_eq!(fx.balance_of(ids[2]), dec!(50.00));
}

// =============================================================================
// Manual distribution
// =============================================================================

#[test]
fn manual_allocation_applies_exact_amounts() {
    let (fx, ids) = Fixture::new(&[(dec!(300.00), 10), (dec!(100.00), 20)]);

    let mut request = fx.proportional(dec!(120.00));
    request.invoice_payments = Some(vec![
        InvoiceShareRequest {
            invoice_id: ids[0],
            amount: dec!(90.00),
        },
        InvoiceShareRequest {
            invoice_id: ids[1],
            amount: dec!(30.00),
        },
    ]);
    fx.service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap();

    assert_eq!(fx.balance_of(ids[0]), dec!(210.00));
    assert_eq!(fx.balance_of(ids[1]), dec!(70.00));
}

#[test]
fn manual_sum_mismatch_rolls_back_everything() {
    let (fx, ids) = Fixture::new(&[(dec!(300.00), 10), (dec!(100.00), 20)]);

    let mut request = fx.proportional(dec!(120.00));
    request.invoice_payments = Some(vec![InvoiceShareRequest {
        invoice_id: ids[0],
        amount: dec!(90.00),
    }]);
    let err = fx
        .service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap_err();

    assert_eq!(err.error_code(), "AMOUNT_MISMATCH");
    // nothing was applied
    assert_eq!(fx.balance_of(ids[0]), dec!(300.00));
    let payment_count = fx.store.read(|ledger| ledger.payments.len()).unwrap();
    assert_eq!(payment_count, 0);
}

#[test]
fn duplicate_manual_entries_for_one_invoice_are_rejected() {
    // Each entry fits the balance by itself; together they exceed it.
    let (fx, ids) = Fixture::new(&[(dec!(100.00), 10)]);

    let mut request = fx.proportional(dec!(120.00));
    request.invoice_payments = Some(vec![
        InvoiceShareRequest {
            invoice_id: ids[0],
            amount: dec!(60.00),
        },
        InvoiceShareRequest {
            invoice_id: ids[0],
            amount: dec!(60.00),
        },
    ]);
    let err = fx
        .service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap_err();

    assert_eq!(err.error_code(), "INVALID_INVOICES");
    assert_eq!(fx.balance_of(ids[0]), dec!(100.00));
    let payment_count = fx.store.read(|ledger| ledger.payments.len()).unwrap();
    assert_eq!(payment_count, 0);
}

#[test]
fn manual_share_cannot_exceed_invoice_balance() {
    let (fx, ids) = Fixture::new(&[(dec!(50.00), 10)]);

    let mut request = fx.proportional(dec!(60.00));
    request.invoice_payments = Some(vec![InvoiceShareRequest {
        invoice_id: ids[0],
        amount: dec!(60.00),
    }]);
    let err = fx
        .service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap_err();
    assert_eq!(err.error_code(), "AMOUNT_EXCEEDS_BALANCE");
}

#[test]
fn foreign_invoice_in_manual_allocation_is_rejected() {
    let (fx, _) = Fixture::new(&[(dec!(50.00), 10)]);

    let mut request = fx.proportional(dec!(10.00));
    request.invoice_payments = Some(vec![InvoiceShareRequest {
        invoice_id: Uuid::new_v4(),
        amount: dec!(10.00),
    }]);
    let err = fx
        .service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

// =============================================================================
// Cash register rule
// =============================================================================

#[test]
fn cash_payment_requires_an_open_register() {
    let (fx, _) = Fixture::new(&[(dec!(100.00), 10)]);

    let mut request = fx.proportional(dec!(50.00));
    request.method = PaymentMethod::Cash;
    let err = fx
        .service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap_err();
    assert_eq!(err.error_code(), "CASH_REGISTER_CLOSED");
}

#[test]
fn cash_payment_writes_one_aggregate_drawer_movement() {
    let (fx, _) = Fixture::new(&[(dec!(100.00), 10), (dec!(100.00), 20)]);
    fx.store
        .transaction(|ledger| {
            ledger
                .cash_registers
                .insert(CashRegister::open(Uuid::new_v4(), dec!(500.00)));
            Ok(())
        })
        .unwrap();

    let mut request = fx.proportional(dec!(80.00));
    request.method = PaymentMethod::Cash;
    fx.service
        .create_payment(&request, Uuid::new_v4(), Utc::now())
        .unwrap();

    fx.store
        .read(|ledger| {
            let movements: Vec<_> = ledger.cash_movements.iter().collect();
            assert_eq!(movements.len(), 1);
            assert_eq!(movements[0].amount, dec!(80.00));
            assert!(movements[0].payment_id.is_some());
        })
        .unwrap();
}

// =============================================================================
// Reporting
// =============================================================================

#[test]
fn account_status_rolls_up_the_client() {
    let (fx, _) = Fixture::new(&[(dec!(200.00), -10), (dec!(100.00), 30)]);

    fx.service
        .create_payment(&fx.proportional(dec!(100.00)), Uuid::new_v4(), Utc::now())
        .unwrap();

    let status = fx
        .service
        .account_status(fx.client_id, Utc::now())
        .unwrap();
    assert_eq!(status.summary.total_invoices, 2);
    assert_eq!(status.summary.pending_invoices, 2);
    assert_eq!(status.summary.total_receivable, dec!(200.00));
    // only the past-due invoice counts as overdue
    assert_eq!(status.summary.total_overdue, dec!(133.33));
}

#[test]
fn summary_buckets_overdue_balances_by_age() {
    let (fx, _) = Fixture::new(&[
        (dec!(10.00), -5),
        (dec!(20.00), -45),
        (dec!(30.00), -95),
        (dec!(40.00), 30),
    ]);

    let summary = fx.service.summary(Utc::now()).unwrap();
    assert_eq!(summary.total_receivable, dec!(100.00));
    assert_eq!(summary.total_overdue, dec!(60.00));
    assert_eq!(summary.by_age[AgeBucket::UpTo30.label()], dec!(10.00));
    assert_eq!(summary.by_age[AgeBucket::UpTo60.label()], dec!(20.00));
    assert_eq!(summary.by_age[AgeBucket::Over90.label()], dec!(30.00));
    assert_eq!(summary.by_age[AgeBucket::UpTo90.label()], Decimal::ZERO);
    assert_eq!(summary.overdue_count, 3);
    assert_eq!(summary.delinquent_clients, 1);
    assert_eq!(summary.top_debtors.len(), 1);
    assert_eq!(summary.top_debtors[0].total_balance, dec!(100.00));
    assert_eq!(summary.top_debtors[0].overdue_balance, dec!(60.00));
}

#[test]
fn overdue_listing_filters_by_bucket() {
    let (fx, _) = Fixture::new(&[(dec!(10.00), -5), (dec!(20.00), -45), (dec!(30.00), 10)]);

    let filter = OverdueFilter {
        bucket: Some(AgeBucket::UpTo60),
        client_id: None,
        search: None,
    };
    let page = fx
        .service
        .overdue(&filter, PageQuery::default(), Utc::now())
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].invoice.balance, dec!(20.00));
}

#[test]
fn payment_history_filters_by_client() {
    let (fx, _) = Fixture::new(&[(dec!(100.00), 10)]);
    fx.service
        .create_payment(&fx.proportional(dec!(40.00)), Uuid::new_v4(), Utc::now())
        .unwrap();

    let mine = fx
        .service
        .payments(
            &PaymentFilter {
                client_id: Some(fx.client_id),
                ..Default::default()
            },
            PageQuery::default(),
        )
        .unwrap();
    assert_eq!(mine.data.len(), 1);
    assert_eq!(mine.data[0].amount, dec!(40.00));

    let theirs = fx
        .service
        .payments(
            &PaymentFilter {
                client_id: Some(Uuid::new_v4()),
                ..Default::default()
            },
            PageQuery::default(),
        )
        .unwrap();
    assert!(theirs.data.is_empty());
}
