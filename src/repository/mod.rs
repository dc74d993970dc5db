//! Storage seams for the ledger jobs.
//!
//! Domain logic never touches SQL directly; it goes through these traits so
//! the batch services can be exercised against the in-memory store and the
//! production binary against Postgres.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{
    BalanceUpdate, LedgerDraft, LedgerEntry, MaintenanceCost, NewRentInvoice, PaymentRecord,
    RentInvoice, RentalUnit, Tenant,
};
use crate::error::AppError;

/// Access to the tenant ledger table.
#[async_trait]
pub trait LedgerStore {
    /// Ids of all tenants, for "all tenants" recalculation runs.
    async fn tenant_ids(&self) -> Result<Vec<i64>, AppError>;

    /// All entries for one tenant, ordered by `(transaction_date, seq)`
    /// ascending.
    async fn entries_for_tenant(&self, tenant_id: i64) -> Result<Vec<LedgerEntry>, AppError>;

    /// Balance of the tenant's latest entry with `transaction_date` strictly
    /// earlier than `date`, or `None` if no such entry exists.
    async fn latest_balance_before(
        &self,
        tenant_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, AppError>;

    /// Whether a ledger entry with this reference number already exists for
    /// the tenant (the backfill idempotency guard).
    async fn reference_exists(&self, tenant_id: i64, reference_no: &str)
        -> Result<bool, AppError>;

    /// Insert one entry. Atomic per record.
    async fn append(&self, draft: &LedgerDraft) -> Result<LedgerEntry, AppError>;

    /// Insert two entries in one transaction (an invoice debit and its
    /// paired payment credit). Either both land or neither does.
    async fn append_pair(&self, first: &LedgerDraft, second: &LedgerDraft)
        -> Result<(), AppError>;

    /// Persist recomputed balances for one tenant in a single transaction.
    /// Only the `balance` column changes; entry identity, ordering and
    /// timestamps are untouched.
    async fn persist_balances(
        &self,
        tenant_id: i64,
        updates: &[BalanceUpdate],
    ) -> Result<(), AppError>;
}

/// Read-only access to the historical records the backfills import from.
#[async_trait]
pub trait SourceStore {
    /// All rent invoices, ordered by invoice date ascending so the balance
    /// chain is built chronologically.
    async fn rent_invoices(&self) -> Result<Vec<RentInvoice>, AppError>;

    /// All maintenance costs with their resolved tenant, ordered by repair
    /// date ascending.
    async fn maintenance_costs(&self) -> Result<Vec<MaintenanceCost>, AppError>;

    /// All payment records, ordered by payment date ascending.
    async fn payment_records(&self) -> Result<Vec<PaymentRecord>, AppError>;
}

/// Access needed by the monthly rent invoice generator.
#[async_trait]
pub trait InvoiceStore {
    /// Occupied rental units that have a tenant assigned.
    async fn occupied_units(&self) -> Result<Vec<RentalUnit>, AppError>;

    async fn tenant(&self, tenant_id: i64) -> Result<Option<Tenant>, AppError>;

    /// Whether an invoice already exists for this unit in the given month.
    async fn invoice_exists_for_unit_month(
        &self,
        unit_id: i64,
        year: i32,
        month: u32,
    ) -> Result<bool, AppError>;

    async fn create_invoice(&self, invoice: &NewRentInvoice) -> Result<(), AppError>;
}
