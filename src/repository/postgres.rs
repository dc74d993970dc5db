//! sqlx-backed store. All SQL for the ledger jobs lives here.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{
    BalanceUpdate, LedgerDraft, LedgerEntry, MaintenanceCost, NewRentInvoice, PaymentRecord,
    RentInvoice, RentalUnit, Tenant,
};
use crate::error::AppError;
use crate::repository::{InvoiceStore, LedgerStore, SourceStore};

const LEDGER_COLUMNS: &str = "id, tenant_id, seq, transaction_date, description, reference_no, \
                              payment_type, debit_amount, credit_amount, balance, remarks, \
                              created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_entry(
        tx: &mut Transaction<'_, Postgres>,
        draft: &LedgerDraft,
    ) -> Result<LedgerEntry, AppError> {
        let entry = sqlx::query_as::<_, LedgerEntry>(&format!(
            "INSERT INTO tenant_ledgers \
               (tenant_id, seq, transaction_date, description, reference_no, payment_type, \
                debit_amount, credit_amount, balance, remarks) \
             VALUES ($1, nextval('tenant_ledger_entry_seq'), $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {LEDGER_COLUMNS}"
        ))
        .bind(draft.tenant_id)
        .bind(draft.transaction_date)
        .bind(&draft.description)
        .bind(&draft.reference_no)
        .bind(&draft.payment_type)
        .bind(draft.debit_amount)
        .bind(draft.credit_amount)
        .bind(draft.balance)
        .bind(&draft.remarks)
        .fetch_one(&mut **tx)
        .await?;
        Ok(entry)
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn tenant_ids(&self) -> Result<Vec<i64>, AppError> {
        let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM tenants ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn entries_for_tenant(&self, tenant_id: i64) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(&format!(
            "SELECT {LEDGER_COLUMNS} FROM tenant_ledgers \
             WHERE tenant_id = $1 \
             ORDER BY transaction_date ASC, seq ASC"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn latest_balance_before(
        &self,
        tenant_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, AppError> {
        let row: Option<(Decimal,)> = sqlx::query_as(
            "SELECT balance FROM tenant_ledgers \
             WHERE tenant_id = $1 AND transaction_date < $2 \
             ORDER BY transaction_date DESC, seq DESC \
             LIMIT 1",
        )
        .bind(tenant_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(balance,)| balance))
    }

    async fn reference_exists(
        &self,
        tenant_id: i64,
        reference_no: &str,
    ) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
               SELECT 1 FROM tenant_ledgers \
               WHERE tenant_id = $1 AND reference_no = $2)",
        )
        .bind(tenant_id)
        .bind(reference_no)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn append(&self, draft: &LedgerDraft) -> Result<LedgerEntry, AppError> {
        let mut tx = self.pool.begin().await?;
        let entry = Self::insert_entry(&mut tx, draft).await?;
        tx.commit().await?;
        Ok(entry)
    }

    async fn append_pair(
        &self,
        first: &LedgerDraft,
        second: &LedgerDraft,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        Self::insert_entry(&mut tx, first).await?;
        Self::insert_entry(&mut tx, second).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn persist_balances(
        &self,
        _tenant_id: i64,
        updates: &[BalanceUpdate],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for update in updates {
            // Balance only; created_at and ordering columns stay as-is.
            sqlx::query("UPDATE tenant_ledgers SET balance = $1 WHERE id = $2")
                .bind(update.balance)
                .bind(update.entry_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl SourceStore for PgStore {
    async fn rent_invoices(&self) -> Result<Vec<RentInvoice>, AppError> {
        let invoices = sqlx::query_as::<_, RentInvoice>(
            "SELECT id, invoice_number, tenant_id, rental_unit_id, invoice_date, due_date, \
                    total_amount, status, paid_date, payment_method, payment_reference, notes \
             FROM rent_invoices \
             ORDER BY invoice_date ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }

    async fn maintenance_costs(&self) -> Result<Vec<MaintenanceCost>, AppError> {
        // Tenant resolution follows the unit chain; a cost on a vacant unit
        // resolves to NULL and is counted as skipped by the importer.
        let costs = sqlx::query_as::<_, MaintenanceCost>(
            "SELECT mc.id, ru.tenant_id, ru.unit_number, mc.description, mc.repair_cost, \
                    mc.repair_date, mc.notes \
             FROM maintenance_costs mc \
             LEFT JOIN rental_units ru ON ru.id = mc.rental_unit_id \
             ORDER BY mc.repair_date ASC, mc.id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(costs)
    }

    async fn payment_records(&self) -> Result<Vec<PaymentRecord>, AppError> {
        let payments = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, tenant_id, rent_invoice_id, amount, payment_date, payment_method, \
                    reference \
             FROM payment_records \
             ORDER BY payment_date ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }
}

#[async_trait]
impl InvoiceStore for PgStore {
    async fn occupied_units(&self) -> Result<Vec<RentalUnit>, AppError> {
        let units = sqlx::query_as::<_, RentalUnit>(
            "SELECT id, unit_number, tenant_id, rent_amount, currency, status \
             FROM rental_units \
             WHERE status = 'occupied' AND tenant_id IS NOT NULL \
             ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(units)
    }

    async fn tenant(&self, tenant_id: i64) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT id, full_name, lease_start_date, lease_end_date \
             FROM tenants WHERE id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn invoice_exists_for_unit_month(
        &self,
        unit_id: i64,
        year: i32,
        month: u32,
    ) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
               SELECT 1 FROM rent_invoices \
               WHERE rental_unit_id = $1 \
                 AND date_part('year', invoice_date) = $2 \
                 AND date_part('month', invoice_date) = $3)",
        )
        .bind(unit_id)
        .bind(year as f64)
        .bind(month as f64)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_invoice(&self, invoice: &NewRentInvoice) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO rent_invoices \
               (invoice_number, tenant_id, rental_unit_id, invoice_date, due_date, \
                total_amount, status, notes, currency) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&invoice.invoice_number)
        .bind(invoice.tenant_id)
        .bind(invoice.rental_unit_id)
        .bind(invoice.invoice_date)
        .bind(invoice.due_date)
        .bind(invoice.total_amount)
        .bind(&invoice.status)
        .bind(&invoice.notes)
        .bind(&invoice.currency)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
