//! Money arithmetic helpers for the reconciliation engine
//!
//! All monetary values are `rust_decimal::Decimal` quantized to cents.
//! The distribution helper here is the arithmetic core of proportional
//! payment allocation: it splits an amount across weighted buckets so the
//! shares are cent-exact and sum to the amount.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Round a decimal to cents (two fractional digits, bankers' rounding off).
pub fn to_cents(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Number of whole cents in a cent-quantized amount.
fn cents(value: Decimal) -> i64 {
    (value * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .unwrap_or(0)
}

/// Split `amount` across `weights` proportionally, in whole cents.
///
/// Each share is floored to cents; the leftover cents are handed out one by
/// one in order of largest fractional remainder, earlier indexes winning
/// ties. Callers pass weights sorted by due date so remainder cents land on
/// the oldest invoices first.
///
/// Guarantees, for `amount <= sum(weights)` with cent-quantized weights:
/// - the returned shares sum exactly to `amount`;
/// - no share exceeds its weight;
/// - if `amount == sum(weights)` every share equals its weight.
pub fn distribute_proportional(amount: Decimal, weights: &[Decimal]) -> Vec<Decimal> {
    let total: Decimal = weights.iter().copied().sum();
    if weights.is_empty() || total <= Decimal::ZERO {
        return vec![Decimal::ZERO; weights.len()];
    }
    if amount == total {
        return weights.to_vec();
    }

    let amount_cents = cents(amount);
    let mut share_cents: Vec<i64> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(usize, Decimal)> = Vec::with_capacity(weights.len());

    for (idx, weight) in weights.iter().enumerate() {
        let exact = amount * weight / total;
        let exact_cents = exact * Decimal::ONE_HUNDRED;
        let floor = exact_cents.floor();
        share_cents.push(floor.to_i64().unwrap_or(0));
        remainders.push((idx, exact_cents - floor));
    }

    let mut leftover = amount_cents - share_cents.iter().sum::<i64>();

    // Largest fractional remainder first; stable order keeps earlier
    // (older due date) indexes ahead on ties.
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for (idx, _) in remainders {
        if leftover <= 0 {
            break;
        }
        share_cents[idx] += 1;
        leftover -= 1;
    }

    share_cents
        .into_iter()
        .map(|c| Decimal::new(c, 2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(to_cents(Decimal::new(123456, 4)), dec(1235));
    }

    #[test]
    fn shares_sum_to_amount() {
        let weights = [dec(10000), dec(5000), dec(2500)];
        let shares = distribute_proportional(dec(10000), &weights);
        let sum: Decimal = shares.iter().copied().sum();
        assert_eq!(sum, dec(10000));
    }

    #[test]
    fn full_amount_settles_every_weight_exactly() {
        let weights = [dec(3333), dec(3333), dec(3334)];
        let shares = distribute_proportional(dec(10000), &weights);
        assert_eq!(shares, weights.to_vec());
    }

    #[test]
    fn no_share_exceeds_its_weight() {
        let weights = [dec(101), dec(9899)];
        let shares = distribute_proportional(dec(9999), &weights);
        for (share, weight) in shares.iter().zip(weights.iter()) {
            assert!(share <= weight, "{share} > {weight}");
        }
        let sum: Decimal = shares.iter().copied().sum();
        assert_eq!(sum, dec(9999));
    }

    #[test]
    fn leftover_cents_go_to_largest_remainders() {
        // 1.00 across three equal weights: 0.34 / 0.33 / 0.33
        let weights = [dec(100), dec(100), dec(100)];
        let shares = distribute_proportional(dec(100), &weights);
        assert_eq!(shares, vec![dec(34), dec(33), dec(33)]);
    }

    #[test]
    fn proportionality_is_respected() {
        // 50.00 against balances of 100.00 and 50.00 -> 33.33 / 16.67
        let weights = [dec(10000), dec(5000)];
        let shares = distribute_proportional(dec(5000), &weights);
        assert_eq!(shares, vec![dec(3333), dec(1667)]);
    }

    #[test]
    fn zero_weights_produce_zero_shares() {
        let shares = distribute_proportional(dec(100), &[Decimal::ZERO, Decimal::ZERO]);
        assert_eq!(shares, vec![Decimal::ZERO, Decimal::ZERO]);
        assert!(distribute_proportional(dec(100), &[]).is_empty());
    }
}
