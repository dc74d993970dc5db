use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One debit-or-credit transaction against a tenant's running balance.
///
/// Entries are ordered by `(transaction_date, seq)` ascending. `seq` is an
/// explicit insertion sequence assigned by the store; same-day ties are
/// broken by it, never by primary-key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub tenant_id: i64,
    pub seq: i64,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub reference_no: Option<String>,
    pub payment_type: String,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    /// Running balance after this entry is applied, in chronological order.
    pub balance: Decimal,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Net effect of this entry on the running balance.
    pub fn signed_amount(&self) -> Decimal {
        self.debit_amount - self.credit_amount
    }
}

/// A ledger entry staged for insertion. The store assigns `id`, `seq` and
/// `created_at` on append.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDraft {
    pub tenant_id: i64,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub reference_no: Option<String>,
    pub payment_type: String,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub balance: Decimal,
    pub remarks: Option<String>,
}

/// A recomputed balance for an existing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceUpdate {
    pub entry_id: i64,
    pub balance: Decimal,
}

/// Rent invoice source record. `tenant_id` is nullable because historical
/// invoices may point at deleted tenants; backfill skips those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RentInvoice {
    pub id: i64,
    pub invoice_number: String,
    pub tenant_id: Option<i64>,
    pub rental_unit_id: i64,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: Decimal,
    pub status: String,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
}

impl RentInvoice {
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }
}

/// Maintenance cost source record. The owning tenant is resolved by the
/// store (unit-asset → unit → tenant in the relational schema); `None`
/// means no tenant is resolvable and the record is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceCost {
    pub id: i64,
    pub tenant_id: Option<i64>,
    pub unit_number: Option<String>,
    pub description: String,
    pub repair_cost: Decimal,
    pub repair_date: NaiveDate,
    pub notes: Option<String>,
}

/// Payment received from a tenant, possibly linked to a rent invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentRecord {
    pub id: i64,
    pub tenant_id: Option<i64>,
    pub rent_invoice_id: Option<i64>,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: Option<String>,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RentalUnit {
    pub id: i64,
    pub unit_number: String,
    pub tenant_id: Option<i64>,
    pub rent_amount: Decimal,
    pub currency: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: i64,
    pub full_name: String,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
}

/// An invoice staged for insertion by the monthly generator.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRentInvoice {
    pub invoice_number: String,
    pub tenant_id: i64,
    pub rental_unit_id: i64,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub notes: Option<String>,
}

/// Reference number for a ledger entry synthesized from a maintenance cost.
pub fn maintenance_reference(cost_id: i64) -> String {
    format!("MAINT-{cost_id}")
}

/// Reference number for a ledger entry synthesized from a payment record.
pub fn payment_reference(payment_id: i64) -> String {
    format!("PAY-{payment_id}")
}

/// Reference number for the credit entry paired with a paid invoice's debit.
pub fn invoice_payment_reference(invoice_number: &str) -> String {
    format!("{invoice_number}-PAY")
}
