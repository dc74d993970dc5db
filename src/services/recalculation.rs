//! Tenant ledger balance recalculation.
//!
//! Treats the ordered entries as the source of truth and rebuilds the
//! materialized running balance deterministically: same entries always
//! produce same balances, so the job is safe to re-run.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::{BalanceUpdate, LedgerEntry};
use crate::error::AppError;
use crate::repository::LedgerStore;

/// Counters for one recalculation run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RecalculationOutcome {
    pub tenants_processed: u32,
    pub entries_scanned: u32,
    pub entries_changed: u32,
    pub errors: u32,
}

/// Recompute running balances over entries already ordered by
/// `(transaction_date, seq)` ascending.
///
/// Pure fold: `running += debit - credit` per entry, starting from zero.
/// An entry with both sides non-zero follows the same formula; rejecting it
/// is a validation concern outside this layer.
pub fn recompute(entries: &[LedgerEntry]) -> Vec<BalanceUpdate> {
    let mut running = Decimal::ZERO;
    entries
        .iter()
        .map(|entry| {
            running += entry.debit_amount - entry.credit_amount;
            BalanceUpdate {
                entry_id: entry.id,
                balance: running,
            }
        })
        .collect()
}

/// Recalculate balances for one tenant or all tenants.
///
/// Each tenant's write is one atomic transaction; a failure rolls that
/// tenant back, is counted, and the loop moves on. Dry-run computes and
/// reports what would change without persisting anything.
pub async fn run_recalculation<S: LedgerStore>(
    store: &S,
    tenant_id: Option<i64>,
    dry_run: bool,
) -> Result<RecalculationOutcome, AppError> {
    let tenant_ids = match tenant_id {
        Some(id) => vec![id],
        // Failing to enumerate tenants means the command cannot run at all.
        None => store.tenant_ids().await?,
    };

    if dry_run {
        info!("dry run: no balances will be persisted");
    }

    let mut outcome = RecalculationOutcome::default();

    for tenant_id in tenant_ids {
        let entries = match store.entries_for_tenant(tenant_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(tenant_id, error = %e, "failed to fetch ledger entries");
                outcome.errors += 1;
                continue;
            }
        };

        outcome.tenants_processed += 1;

        if entries.is_empty() {
            debug!(tenant_id, "no ledger entries, skipping");
            continue;
        }

        let updates = recompute(&entries);
        let mut changed = 0u32;
        for (update, entry) in updates.iter().zip(entries.iter()) {
            if update.balance != entry.balance {
                changed += 1;
                debug!(
                    tenant_id,
                    entry_id = entry.id,
                    old = %entry.balance,
                    new = %update.balance,
                    "balance drift"
                );
            }
        }

        outcome.entries_scanned += entries.len() as u32;

        if changed == 0 {
            continue;
        }

        if dry_run {
            outcome.entries_changed += changed;
            continue;
        }

        match store.persist_balances(tenant_id, &updates).await {
            Ok(()) => outcome.entries_changed += changed,
            Err(e) => {
                warn!(tenant_id, error = %e, "failed to persist recomputed balances");
                outcome.errors += 1;
            }
        }
    }

    info!(
        tenants = outcome.tenants_processed,
        scanned = outcome.entries_scanned,
        changed = outcome.entries_changed,
        errors = outcome.errors,
        "balance recalculation completed"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn entry(
        id: i64,
        seq: i64,
        date: (i32, u32, u32),
        debit: Decimal,
        credit: Decimal,
        balance: Decimal,
    ) -> LedgerEntry {
        LedgerEntry {
            id,
            tenant_id: 1,
            seq,
            transaction_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: String::new(),
            reference_no: None,
            payment_type: "rent".to_string(),
            debit_amount: debit,
            credit_amount: credit,
            balance,
            remarks: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn running_sum_over_debits_and_credits() {
        let entries = vec![
            entry(1, 1, (2024, 1, 1), dec!(500), dec!(0), dec!(0)),
            entry(2, 2, (2024, 1, 15), dec!(0), dec!(500), dec!(0)),
            entry(3, 3, (2024, 2, 1), dec!(750), dec!(0), dec!(0)),
        ];
        let updates = recompute(&entries);
        let balances: Vec<Decimal> = updates.iter().map(|u| u.balance).collect();
        assert_eq!(balances, vec![dec!(500), dec!(0), dec!(750)]);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut entries = vec![
            entry(1, 1, (2024, 3, 1), dec!(900), dec!(0), dec!(0)),
            entry(2, 2, (2024, 3, 10), dec!(0), dec!(400), dec!(0)),
        ];
        let first = recompute(&entries);
        for (e, u) in entries.iter_mut().zip(first.iter()) {
            e.balance = u.balance;
        }
        let second = recompute(&entries);
        assert_eq!(first, second);
    }

    #[test]
    fn entry_with_both_sides_follows_the_formula() {
        let entries = vec![entry(1, 1, (2024, 1, 1), dec!(300), dec!(100), dec!(0))];
        let updates = recompute(&entries);
        assert_eq!(updates[0].balance, dec!(200));
    }

    #[test]
    fn empty_ledger_yields_no_updates() {
        assert!(recompute(&[]).is_empty());
    }
}
