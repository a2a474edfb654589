//! Payment allocation across outstanding invoices
//!
//! The pure half of the reconciliation engine: given a payment amount and
//! the set of invoices it applies to, produce one cent-exact share per
//! invoice or reject the request. No storage access happens here; the
//! service layer feeds it invoices and commits the result.
//!
//! Two distribution modes exist:
//! - **Manual**: the caller names the amount applied to each invoice; the
//!   shares must sum to the payment amount and fit each balance.
//! - **Proportional**: the amount is split across the invoices in
//!   proportion to their outstanding balances (leftover cents to the
//!   oldest due dates).

use std::collections::HashSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::error::PaymentError;
use crate::core::money::distribute_proportional;
use crate::domain::Invoice;

/// How a payment is spread over invoices.
#[derive(Debug, Clone)]
pub enum Distribution {
    /// Caller-specified per-invoice amounts
    Manual(Vec<(Uuid, Decimal)>),
    /// Proportional to outstanding balances
    Proportional,
}

/// The allocated share of one invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub invoice_id: Uuid,
    pub amount: Decimal,
}

/// Allocate `amount` across `invoices` according to `distribution`.
///
/// `invoices` must already be filtered to the paying client's payable
/// invoices, ordered by due date ascending (oldest first, undated last).
/// Shares of zero are dropped from the result.
pub fn allocate(
    amount: Decimal,
    invoices: &[Invoice],
    distribution: &Distribution,
) -> Result<Vec<Share>, PaymentError> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount);
    }
    if invoices.is_empty() {
        return Err(PaymentError::NothingOutstanding);
    }

    match distribution {
        Distribution::Manual(entries) => allocate_manual(amount, invoices, entries),
        Distribution::Proportional => allocate_proportional(amount, invoices),
    }
}

fn allocate_manual(
    amount: Decimal,
    invoices: &[Invoice],
    entries: &[(Uuid, Decimal)],
) -> Result<Vec<Share>, PaymentError> {
    let mut shares = Vec::with_capacity(entries.len());
    let mut allocated = Decimal::ZERO;
    let mut seen = HashSet::with_capacity(entries.len());

    for (invoice_id, entry_amount) in entries {
        if *entry_amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount);
        }
        // Two entries for one invoice would each pass the balance check
        // on its own while together exceeding it.
        if !seen.insert(*invoice_id) {
            return Err(PaymentError::InvalidInvoices);
        }
        let invoice = invoices
            .iter()
            .find(|inv| inv.id == *invoice_id)
            .ok_or(PaymentError::InvalidInvoices)?;
        if *entry_amount > invoice.balance {
            return Err(PaymentError::AllocationExceedsBalance {
                invoice_number: invoice.number.clone(),
                allocated: *entry_amount,
                balance: invoice.balance,
            });
        }
        allocated += *entry_amount;
        shares.push(Share {
            invoice_id: *invoice_id,
            amount: *entry_amount,
        });
    }

    if allocated != amount {
        return Err(PaymentError::AmountMismatch {
            expected: amount,
            allocated,
        });
    }

    Ok(shares)
}

fn allocate_proportional(
    amount: Decimal,
    invoices: &[Invoice],
) -> Result<Vec<Share>, PaymentError> {
    let balances: Vec<Decimal> = invoices.iter().map(|inv| inv.balance).collect();
    let total: Decimal = balances.iter().copied().sum();
    if amount > total {
        return Err(PaymentError::AmountExceedsTotal);
    }

    let shares = distribute_proportional(amount, &balances);
    Ok(invoices
        .iter()
        .zip(shares)
        .filter(|(_, share)| *share > Decimal::ZERO)
        .map(|(invoice, share)| Share {
            invoice_id: invoice.id,
            amount: share,
        })
        .collect())
}
