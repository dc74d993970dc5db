//! In-memory store used by the test suites.
//!
//! Implements the same trait contracts as [`PgStore`](super::postgres::PgStore),
//! including the per-unit atomicity rules: `append_pair` inserts both rows or
//! neither, and `persist_balances` applies a tenant's updates all at once.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    BalanceUpdate, LedgerDraft, LedgerEntry, MaintenanceCost, NewRentInvoice, PaymentRecord,
    RentInvoice, RentalUnit, Tenant,
};
use crate::error::AppError;
use crate::repository::{InvoiceStore, LedgerStore, SourceStore};

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<LedgerEntry>,
    tenants: Vec<Tenant>,
    units: Vec<RentalUnit>,
    invoices: Vec<RentInvoice>,
    maintenance_costs: Vec<MaintenanceCost>,
    payments: Vec<PaymentRecord>,
    next_entry_id: i64,
    next_seq: i64,
    next_invoice_id: i64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tenant(&self, tenant: Tenant) {
        self.inner.lock().unwrap().tenants.push(tenant);
    }

    pub fn add_unit(&self, unit: RentalUnit) {
        self.inner.lock().unwrap().units.push(unit);
    }

    pub fn add_invoice(&self, invoice: RentInvoice) {
        self.inner.lock().unwrap().invoices.push(invoice);
    }

    pub fn add_maintenance_cost(&self, cost: MaintenanceCost) {
        self.inner.lock().unwrap().maintenance_costs.push(cost);
    }

    pub fn add_payment_record(&self, payment: PaymentRecord) {
        self.inner.lock().unwrap().payments.push(payment);
    }

    /// Snapshot of every ledger entry, across tenants, in insertion order.
    pub fn all_entries(&self) -> Vec<LedgerEntry> {
        self.inner.lock().unwrap().entries.clone()
    }

    /// Snapshot of every invoice in insertion order.
    pub fn all_invoices(&self) -> Vec<RentInvoice> {
        self.inner.lock().unwrap().invoices.clone()
    }

    fn insert_entry(inner: &mut Inner, draft: &LedgerDraft) -> LedgerEntry {
        inner.next_entry_id += 1;
        inner.next_seq += 1;
        let entry = LedgerEntry {
            id: inner.next_entry_id,
            tenant_id: draft.tenant_id,
            seq: inner.next_seq,
            transaction_date: draft.transaction_date,
            description: draft.description.clone(),
            reference_no: draft.reference_no.clone(),
            payment_type: draft.payment_type.clone(),
            debit_amount: draft.debit_amount,
            credit_amount: draft.credit_amount,
            balance: draft.balance,
            remarks: draft.remarks.clone(),
            created_at: Utc::now(),
        };
        inner.entries.push(entry.clone());
        entry
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn tenant_ids(&self) -> Result<Vec<i64>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut ids: Vec<i64> = inner.tenants.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn entries_for_tenant(&self, tenant_id: i64) -> Result<Vec<LedgerEntry>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<LedgerEntry> = inner
            .entries
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.transaction_date, e.seq));
        Ok(entries)
    }

    async fn latest_balance_before(
        &self,
        tenant_id: i64,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .entries
            .iter()
            .filter(|e| e.tenant_id == tenant_id && e.transaction_date < date)
            .max_by_key(|e| (e.transaction_date, e.seq))
            .map(|e| e.balance))
    }

    async fn reference_exists(
        &self,
        tenant_id: i64,
        reference_no: &str,
    ) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .entries
            .iter()
            .any(|e| e.tenant_id == tenant_id && e.reference_no.as_deref() == Some(reference_no)))
    }

    async fn append(&self, draft: &LedgerDraft) -> Result<LedgerEntry, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(Self::insert_entry(&mut inner, draft))
    }

    async fn append_pair(
        &self,
        first: &LedgerDraft,
        second: &LedgerDraft,
    ) -> Result<(), AppError> {
        // Single lock scope: both rows land together, as in the SQL
        // transaction.
        let mut inner = self.inner.lock().unwrap();
        Self::insert_entry(&mut inner, first);
        Self::insert_entry(&mut inner, second);
        Ok(())
    }

    async fn persist_balances(
        &self,
        tenant_id: i64,
        updates: &[BalanceUpdate],
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        for update in updates {
            let entry = inner
                .entries
                .iter_mut()
                .find(|e| e.id == update.entry_id && e.tenant_id == tenant_id)
                .ok_or_else(|| AppError::NotFound(format!("ledger entry {}", update.entry_id)))?;
            entry.balance = update.balance;
        }
        Ok(())
    }
}

#[async_trait]
impl SourceStore for MemoryStore {
    async fn rent_invoices(&self) -> Result<Vec<RentInvoice>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut invoices = inner.invoices.clone();
        invoices.sort_by_key(|i| (i.invoice_date, i.id));
        Ok(invoices)
    }

    async fn maintenance_costs(&self) -> Result<Vec<MaintenanceCost>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut costs = inner.maintenance_costs.clone();
        costs.sort_by_key(|c| (c.repair_date, c.id));
        Ok(costs)
    }

    async fn payment_records(&self) -> Result<Vec<PaymentRecord>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut payments = inner.payments.clone();
        payments.sort_by_key(|p| (p.payment_date, p.id));
        Ok(payments)
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn occupied_units(&self) -> Result<Vec<RentalUnit>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .units
            .iter()
            .filter(|u| u.status == "occupied" && u.tenant_id.is_some())
            .cloned()
            .collect())
    }

    async fn tenant(&self, tenant_id: i64) -> Result<Option<Tenant>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tenants.iter().find(|t| t.id == tenant_id).cloned())
    }

    async fn invoice_exists_for_unit_month(
        &self,
        unit_id: i64,
        year: i32,
        month: u32,
    ) -> Result<bool, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.invoices.iter().any(|i| {
            i.rental_unit_id == unit_id
                && i.invoice_date.year() == year
                && i.invoice_date.month() == month
        }))
    }

    async fn create_invoice(&self, invoice: &NewRentInvoice) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_invoice_id += 1;
        let id = inner.next_invoice_id;
        inner.invoices.push(RentInvoice {
            id,
            invoice_number: invoice.invoice_number.clone(),
            tenant_id: Some(invoice.tenant_id),
            rental_unit_id: invoice.rental_unit_id,
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            total_amount: invoice.total_amount,
            status: invoice.status.clone(),
            paid_date: None,
            payment_method: None,
            payment_reference: None,
            notes: invoice.notes.clone(),
        });
        Ok(())
    }
}
