//! Monthly rent invoice generation.
//!
//! At most one invoice per unit per month: the generator scans occupied
//! units, checks the lease window against the target month, and skips any
//! unit that already has an invoice dated in that month. Ledger entries are
//! not touched here; they are created when invoicing integrates with the
//! backfill path or when payments land.

use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{NewRentInvoice, RentalUnit, Tenant};
use crate::error::AppError;
use crate::repository::InvoiceStore;

/// Generation settings, lifted from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub enabled: bool,
    pub generation_day: u32,
    pub due_date_offset_days: i64,
    pub default_currency: String,
}

impl GenerationSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            enabled: config.invoice_generation_enabled,
            generation_day: config.invoice_generation_day,
            due_date_offset_days: config.invoice_due_date_offset_days,
            default_currency: config.default_currency.clone(),
        }
    }
}

/// Counters for one generation run.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct GenerationOutcome {
    pub units_checked: u32,
    pub generated: u32,
    pub skipped: u32,
    pub duplicates: u32,
    pub errors: u32,
}

/// Generate the target month's rent invoices for all occupied units.
///
/// A disabled setting or a non-generation day is a quiet no-op unless
/// `force` is set. Per-unit failures are counted and the scan continues.
pub async fn generate_monthly_invoices<S: InvoiceStore>(
    store: &S,
    today: NaiveDate,
    settings: &GenerationSettings,
    force: bool,
) -> Result<GenerationOutcome, AppError> {
    if !settings.enabled && !force {
        warn!("automatic invoice generation is disabled; use --force to generate anyway");
        return Ok(GenerationOutcome::default());
    }

    if today.day() != settings.generation_day && !force {
        info!(
            today = %today,
            generation_day = settings.generation_day,
            "not the invoice generation day, skipping"
        );
        return Ok(GenerationOutcome::default());
    }

    let month_start = today.with_day(1).expect("day 1 exists in every month");
    let month_end = month_start + Months::new(1) - Days::new(1);

    let units = store.occupied_units().await?;
    info!(
        month = %month_start.format("%Y-%m"),
        units = units.len(),
        "generating rent invoices"
    );

    let mut outcome = GenerationOutcome::default();

    for unit in &units {
        outcome.units_checked += 1;

        let Some(tenant_id) = unit.tenant_id else {
            outcome.skipped += 1;
            continue;
        };

        let tenant = match store.tenant(tenant_id).await {
            Ok(Some(tenant)) => tenant,
            Ok(None) => {
                warn!(unit = %unit.unit_number, tenant_id, "tenant not found, skipping");
                outcome.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(unit = %unit.unit_number, error = %e, "tenant lookup failed");
                outcome.errors += 1;
                continue;
            }
        };

        if !lease_covers_month(&tenant, month_start, month_end) {
            info!(
                unit = %unit.unit_number,
                tenant = %tenant.full_name,
                "lease does not cover target month, skipping"
            );
            outcome.skipped += 1;
            continue;
        }

        match store
            .invoice_exists_for_unit_month(unit.id, month_start.year(), month_start.month())
            .await
        {
            Ok(true) => {
                outcome.duplicates += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                warn!(unit = %unit.unit_number, error = %e, "duplicate check failed");
                outcome.errors += 1;
                continue;
            }
        }

        let invoice = build_invoice(unit, tenant_id, month_start, settings);
        match store.create_invoice(&invoice).await {
            Ok(()) => {
                info!(
                    invoice = %invoice.invoice_number,
                    unit = %unit.unit_number,
                    "generated invoice"
                );
                outcome.generated += 1;
            }
            Err(e) => {
                warn!(unit = %unit.unit_number, error = %e, "failed to create invoice");
                outcome.errors += 1;
            }
        }
    }

    info!(
        checked = outcome.units_checked,
        generated = outcome.generated,
        skipped = outcome.skipped,
        duplicates = outcome.duplicates,
        errors = outcome.errors,
        "invoice generation completed"
    );

    Ok(outcome)
}

/// The lease must overlap the target month: it may not start after the
/// month ends nor end before the month starts. Missing lease dates mean
/// the tenant is not invoiceable.
fn lease_covers_month(tenant: &Tenant, month_start: NaiveDate, month_end: NaiveDate) -> bool {
    match (tenant.lease_start_date, tenant.lease_end_date) {
        (Some(start), Some(end)) => start <= month_end && end >= month_start,
        _ => false,
    }
}

fn build_invoice(
    unit: &RentalUnit,
    tenant_id: i64,
    month_start: NaiveDate,
    settings: &GenerationSettings,
) -> NewRentInvoice {
    let currency = if unit.currency.is_empty() {
        settings.default_currency.clone()
    } else {
        unit.currency.clone()
    };

    NewRentInvoice {
        invoice_number: format!("INV-{}-{}", month_start.format("%y%m%d"), unit.id),
        tenant_id,
        rental_unit_id: unit.id,
        invoice_date: month_start,
        due_date: month_start + Days::new(settings.due_date_offset_days.max(0) as u64),
        total_amount: unit.rent_amount,
        currency,
        status: "pending".to_string(),
        notes: Some(format!(
            "Rent invoice for {} - Unit {}",
            month_start.format("%B %Y"),
            unit.unit_number
        )),
    }
}
