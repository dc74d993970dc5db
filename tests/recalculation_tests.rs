use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use rentledger::domain::{LedgerDraft, Tenant};
use rentledger::repository::memory::MemoryStore;
use rentledger::repository::LedgerStore;
use rentledger::services::recalculation::run_recalculation;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tenant(id: i64, name: &str) -> Tenant {
    Tenant {
        id,
        full_name: name.to_string(),
        lease_start_date: None,
        lease_end_date: None,
    }
}

fn draft(tenant_id: i64, d: NaiveDate, debit: Decimal, credit: Decimal) -> LedgerDraft {
    LedgerDraft {
        tenant_id,
        transaction_date: d,
        description: "seed".to_string(),
        reference_no: None,
        payment_type: "rent".to_string(),
        debit_amount: debit,
        credit_amount: credit,
        // Deliberately wrong; recalculation must fix it.
        balance: Decimal::ZERO,
        remarks: None,
    }
}

async fn balances(store: &MemoryStore, tenant_id: i64) -> Vec<Decimal> {
    store
        .entries_for_tenant(tenant_id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.balance)
        .collect()
}

#[tokio::test]
async fn recomputes_running_balances_in_date_order() {
    let store = MemoryStore::new();
    store.add_tenant(tenant(1, "Hassan Rasheed"));
    store.append(&draft(1, date(2024, 1, 1), dec!(500), dec!(0))).await.unwrap();
    store.append(&draft(1, date(2024, 1, 15), dec!(0), dec!(500))).await.unwrap();
    store.append(&draft(1, date(2024, 2, 1), dec!(750), dec!(0))).await.unwrap();

    let outcome = run_recalculation(&store, None, false).await.unwrap();

    assert_eq!(outcome.tenants_processed, 1);
    assert_eq!(outcome.entries_scanned, 3);
    assert_eq!(outcome.entries_changed, 3);
    assert_eq!(outcome.errors, 0);
    assert_eq!(balances(&store, 1).await, vec![dec!(500), dec!(0), dec!(750)]);
}

#[tokio::test]
async fn recalculation_is_idempotent() {
    let store = MemoryStore::new();
    store.add_tenant(tenant(1, "Hassan Rasheed"));
    store.append(&draft(1, date(2024, 3, 5), dec!(900), dec!(0))).await.unwrap();
    store.append(&draft(1, date(2024, 3, 20), dec!(0), dec!(400))).await.unwrap();

    run_recalculation(&store, None, false).await.unwrap();
    let first = balances(&store, 1).await;

    let second_run = run_recalculation(&store, None, false).await.unwrap();
    let second = balances(&store, 1).await;

    assert_eq!(first, second);
    assert_eq!(second_run.entries_changed, 0);
}

#[tokio::test]
async fn same_day_entries_order_by_insertion_sequence() {
    let store = MemoryStore::new();
    store.add_tenant(tenant(1, "Hassan Rasheed"));
    let d = date(2024, 5, 1);
    store.append(&draft(1, d, dec!(100), dec!(0))).await.unwrap();
    store.append(&draft(1, d, dec!(0), dec!(30))).await.unwrap();
    store.append(&draft(1, d, dec!(0), dec!(70))).await.unwrap();

    run_recalculation(&store, None, false).await.unwrap();

    assert_eq!(balances(&store, 1).await, vec![dec!(100), dec!(70), dec!(0)]);
}

#[tokio::test]
async fn dry_run_reports_drift_without_persisting() {
    let store = MemoryStore::new();
    store.add_tenant(tenant(1, "Hassan Rasheed"));
    store.append(&draft(1, date(2024, 1, 1), dec!(250), dec!(0))).await.unwrap();

    let before = store.all_entries();
    let outcome = run_recalculation(&store, None, true).await.unwrap();
    let after = store.all_entries();

    assert_eq!(outcome.entries_changed, 1);
    assert_eq!(before, after);
}

#[tokio::test]
async fn tenant_with_no_entries_is_a_noop() {
    let store = MemoryStore::new();
    store.add_tenant(tenant(1, "Hassan Rasheed"));
    store.add_tenant(tenant(2, "Mariyam Waheeda"));
    store.append(&draft(2, date(2024, 1, 1), dec!(100), dec!(0))).await.unwrap();

    let outcome = run_recalculation(&store, None, false).await.unwrap();

    assert_eq!(outcome.tenants_processed, 2);
    assert_eq!(outcome.entries_scanned, 1);
    assert_eq!(outcome.errors, 0);
}

#[tokio::test]
async fn single_tenant_run_leaves_other_tenants_untouched() {
    let store = MemoryStore::new();
    store.add_tenant(tenant(1, "Hassan Rasheed"));
    store.add_tenant(tenant(2, "Mariyam Waheeda"));
    store.append(&draft(1, date(2024, 1, 1), dec!(100), dec!(0))).await.unwrap();
    store.append(&draft(2, date(2024, 1, 1), dec!(200), dec!(0))).await.unwrap();

    let outcome = run_recalculation(&store, Some(1), false).await.unwrap();

    assert_eq!(outcome.tenants_processed, 1);
    assert_eq!(balances(&store, 1).await, vec![dec!(100)]);
    // Tenant 2 still carries its seeded (wrong) balance.
    assert_eq!(balances(&store, 2).await, vec![dec!(0)]);
}
