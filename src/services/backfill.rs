//! Backfill importers: synthesize ledger entries from historical rent
//! invoices, maintenance costs and payment records that predate ledger
//! tracking.
//!
//! Every importer walks its source records in chronological order, skips
//! records whose tenant cannot be resolved, and guards on `reference_no`
//! so re-running a backfill never duplicates entries. One record's failure
//! is logged and counted; the batch continues.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::domain::{
    invoice_payment_reference, maintenance_reference, payment_reference, LedgerDraft,
};
use crate::error::AppError;
use crate::repository::{LedgerStore, SourceStore};

pub const PAYMENT_TYPE_RENT: &str = "rent";
pub const PAYMENT_TYPE_RENT_PAYMENT: &str = "rent_payment";
pub const PAYMENT_TYPE_MAINTENANCE: &str = "maintenance";
pub const PAYMENT_TYPE_PAYMENT: &str = "payment";

/// Counters for one backfill run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BackfillOutcome {
    pub processed: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Import historical rent invoices.
///
/// Each invoice becomes a debit at its invoice date, referenced by the
/// invoice number. A paid invoice with a known paid date additionally gets
/// a credit at the paid date; the pair inserts atomically.
pub async fn backfill_rent_invoices<S>(store: &S, dry_run: bool) -> Result<BackfillOutcome, AppError>
where
    S: LedgerStore + SourceStore,
{
    let invoices = store.rent_invoices().await?;
    info!(count = invoices.len(), dry_run, "backfilling rent invoices");

    let mut outcome = BackfillOutcome::default();

    for invoice in &invoices {
        let Some(tenant_id) = invoice.tenant_id else {
            warn!(invoice = %invoice.invoice_number, "no tenant resolvable, skipping");
            outcome.skipped += 1;
            continue;
        };

        match store.reference_exists(tenant_id, &invoice.invoice_number).await {
            Ok(true) => {
                outcome.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(invoice = %invoice.invoice_number, error = %e, "duplicate check failed");
                outcome.errors += 1;
                continue;
            }
        }

        let result = async {
            let previous = store
                .latest_balance_before(tenant_id, invoice.invoice_date)
                .await?
                .unwrap_or(Decimal::ZERO);
            let post_debit = previous + invoice.total_amount;

            if dry_run {
                return Ok::<_, AppError>(());
            }

            let debit = LedgerDraft {
                tenant_id,
                transaction_date: invoice.invoice_date,
                description: format!("Rent Invoice {}", invoice.invoice_number),
                reference_no: Some(invoice.invoice_number.clone()),
                payment_type: PAYMENT_TYPE_RENT.to_string(),
                debit_amount: invoice.total_amount,
                credit_amount: Decimal::ZERO,
                balance: post_debit,
                remarks: invoice.notes.clone(),
            };

            match invoice.paid_date.filter(|_| invoice.is_paid()) {
                Some(paid_date) => {
                    let credit = LedgerDraft {
                        tenant_id,
                        transaction_date: paid_date,
                        description: format!(
                            "Payment for Rent Invoice {}",
                            invoice.invoice_number
                        ),
                        reference_no: Some(invoice_payment_reference(&invoice.invoice_number)),
                        payment_type: PAYMENT_TYPE_RENT_PAYMENT.to_string(),
                        debit_amount: Decimal::ZERO,
                        credit_amount: invoice.total_amount,
                        balance: post_debit - invoice.total_amount,
                        remarks: Some(format!(
                            "Payment received for invoice {}",
                            invoice.invoice_number
                        )),
                    };
                    store.append_pair(&debit, &credit).await?;
                }
                None => {
                    store.append(&debit).await?;
                }
            }
            Ok(())
        }
        .await;

        match result {
            Ok(()) => outcome.processed += 1,
            Err(e) => {
                warn!(invoice = %invoice.invoice_number, error = %e, "backfill failed");
                outcome.errors += 1;
            }
        }
    }

    log_outcome("rent invoice backfill", &outcome, dry_run);
    Ok(outcome)
}

/// Import historical maintenance costs as debits at their repair date,
/// referenced `MAINT-{id}`.
pub async fn backfill_maintenance_costs<S>(
    store: &S,
    dry_run: bool,
) -> Result<BackfillOutcome, AppError>
where
    S: LedgerStore + SourceStore,
{
    let costs = store.maintenance_costs().await?;
    info!(count = costs.len(), dry_run, "backfilling maintenance costs");

    let mut outcome = BackfillOutcome::default();

    for cost in &costs {
        let Some(tenant_id) = cost.tenant_id else {
            warn!(cost_id = cost.id, "no tenant resolvable, skipping");
            outcome.skipped += 1;
            continue;
        };

        let reference = maintenance_reference(cost.id);
        let unit = cost.unit_number.as_deref().unwrap_or("Unit");

        let result = stage_single(
            store,
            tenant_id,
            &reference,
            cost.repair_date,
            cost.repair_cost,
            Side::Debit,
            format!("Maintenance Cost - {unit}: {}", cost.description),
            PAYMENT_TYPE_MAINTENANCE,
            cost.notes.clone(),
            dry_run,
        )
        .await;

        match result {
            Ok(Staged::Inserted) => outcome.processed += 1,
            Ok(Staged::Duplicate) => outcome.skipped += 1,
            Err(e) => {
                warn!(cost_id = cost.id, error = %e, "backfill failed");
                outcome.errors += 1;
            }
        }
    }

    log_outcome("maintenance cost backfill", &outcome, dry_run);
    Ok(outcome)
}

/// Import historical payment records as credits at their payment date,
/// referenced `PAY-{id}`.
pub async fn backfill_payment_records<S>(
    store: &S,
    dry_run: bool,
) -> Result<BackfillOutcome, AppError>
where
    S: LedgerStore + SourceStore,
{
    let payments = store.payment_records().await?;
    info!(count = payments.len(), dry_run, "backfilling payment records");

    let mut outcome = BackfillOutcome::default();

    for payment in &payments {
        let Some(tenant_id) = payment.tenant_id else {
            warn!(payment_id = payment.id, "no tenant resolvable, skipping");
            outcome.skipped += 1;
            continue;
        };

        let reference = payment_reference(payment.id);
        let description = match payment.rent_invoice_id {
            Some(invoice_id) => format!("Payment received (invoice #{invoice_id})"),
            None => "Payment received".to_string(),
        };

        let result = stage_single(
            store,
            tenant_id,
            &reference,
            payment.payment_date,
            payment.amount,
            Side::Credit,
            description,
            PAYMENT_TYPE_PAYMENT,
            payment.reference.clone(),
            dry_run,
        )
        .await;

        match result {
            Ok(Staged::Inserted) => outcome.processed += 1,
            Ok(Staged::Duplicate) => outcome.skipped += 1,
            Err(e) => {
                warn!(payment_id = payment.id, error = %e, "backfill failed");
                outcome.errors += 1;
            }
        }
    }

    log_outcome("payment record backfill", &outcome, dry_run);
    Ok(outcome)
}

enum Side {
    Debit,
    Credit,
}

enum Staged {
    Inserted,
    Duplicate,
}

/// Duplicate-guarded insert of one entry whose balance chains off the
/// tenant's latest entry strictly before `date`.
#[allow(clippy::too_many_arguments)]
async fn stage_single<S>(
    store: &S,
    tenant_id: i64,
    reference: &str,
    date: chrono::NaiveDate,
    amount: Decimal,
    side: Side,
    description: String,
    payment_type: &str,
    remarks: Option<String>,
    dry_run: bool,
) -> Result<Staged, AppError>
where
    S: LedgerStore,
{
    if store.reference_exists(tenant_id, reference).await? {
        return Ok(Staged::Duplicate);
    }

    let previous = store
        .latest_balance_before(tenant_id, date)
        .await?
        .unwrap_or(Decimal::ZERO);

    let (debit, credit, balance) = match side {
        Side::Debit => (amount, Decimal::ZERO, previous + amount),
        Side::Credit => (Decimal::ZERO, amount, previous - amount),
    };

    if !dry_run {
        store
            .append(&LedgerDraft {
                tenant_id,
                transaction_date: date,
                description,
                reference_no: Some(reference.to_string()),
                payment_type: payment_type.to_string(),
                debit_amount: debit,
                credit_amount: credit,
                balance,
                remarks,
            })
            .await?;
    }

    Ok(Staged::Inserted)
}

fn log_outcome(job: &str, outcome: &BackfillOutcome, dry_run: bool) {
    info!(
        processed = outcome.processed,
        skipped = outcome.skipped,
        errors = outcome.errors,
        dry_run,
        "{job} completed"
    );
}
