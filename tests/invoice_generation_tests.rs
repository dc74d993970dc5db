use chrono::NaiveDate;
use rust_decimal_macros::dec;

use rentledger::domain::{RentalUnit, Tenant};
use rentledger::repository::memory::MemoryStore;
use rentledger::services::invoice_generation::{generate_monthly_invoices, GenerationSettings};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn settings() -> GenerationSettings {
    GenerationSettings {
        enabled: true,
        generation_day: 1,
        due_date_offset_days: 7,
        default_currency: "MVR".to_string(),
    }
}

fn leased_tenant(id: i64) -> Tenant {
    Tenant {
        id,
        full_name: format!("Tenant {id}"),
        lease_start_date: Some(date(2024, 1, 1)),
        lease_end_date: Some(date(2024, 12, 31)),
    }
}

fn occupied_unit(id: i64, tenant_id: i64) -> RentalUnit {
    RentalUnit {
        id,
        unit_number: format!("A-{id}"),
        tenant_id: Some(tenant_id),
        rent_amount: dec!(1200),
        currency: "MVR".to_string(),
        status: "occupied".to_string(),
    }
}

#[tokio::test]
async fn generates_one_invoice_per_occupied_unit() {
    let store = MemoryStore::new();
    store.add_tenant(leased_tenant(1));
    store.add_unit(occupied_unit(1, 1));

    let outcome = generate_monthly_invoices(&store, date(2024, 6, 1), &settings(), false)
        .await
        .unwrap();

    assert_eq!(outcome.generated, 1);
    assert_eq!(outcome.errors, 0);

    let invoices = store.all_invoices();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].invoice_number, "INV-240601-1");
    assert_eq!(invoices[0].invoice_date, date(2024, 6, 1));
    assert_eq!(invoices[0].due_date, date(2024, 6, 8));
    assert_eq!(invoices[0].total_amount, dec!(1200));
    assert_eq!(invoices[0].status, "pending");
}

#[tokio::test]
async fn second_run_in_same_month_generates_nothing() {
    let store = MemoryStore::new();
    store.add_tenant(leased_tenant(1));
    store.add_unit(occupied_unit(1, 1));

    generate_monthly_invoices(&store, date(2024, 6, 1), &settings(), false)
        .await
        .unwrap();
    let second = generate_monthly_invoices(&store, date(2024, 6, 1), &settings(), false)
        .await
        .unwrap();

    assert_eq!(second.generated, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(store.all_invoices().len(), 1);
}

#[tokio::test]
async fn off_schedule_day_is_a_noop_unless_forced() {
    let store = MemoryStore::new();
    store.add_tenant(leased_tenant(1));
    store.add_unit(occupied_unit(1, 1));

    let quiet = generate_monthly_invoices(&store, date(2024, 6, 15), &settings(), false)
        .await
        .unwrap();
    assert_eq!(quiet.units_checked, 0);
    assert!(store.all_invoices().is_empty());

    let forced = generate_monthly_invoices(&store, date(2024, 6, 15), &settings(), true)
        .await
        .unwrap();
    assert_eq!(forced.generated, 1);
    // Forced mid-month generation still dates the invoice at month start.
    assert_eq!(store.all_invoices()[0].invoice_date, date(2024, 6, 1));
}

#[tokio::test]
async fn disabled_generation_requires_force() {
    let store = MemoryStore::new();
    store.add_tenant(leased_tenant(1));
    store.add_unit(occupied_unit(1, 1));

    let mut disabled = settings();
    disabled.enabled = false;

    let quiet = generate_monthly_invoices(&store, date(2024, 6, 1), &disabled, false)
        .await
        .unwrap();
    assert_eq!(quiet.generated, 0);

    let forced = generate_monthly_invoices(&store, date(2024, 6, 1), &disabled, true)
        .await
        .unwrap();
    assert_eq!(forced.generated, 1);
}

#[tokio::test]
async fn lease_window_outside_target_month_is_skipped() {
    let store = MemoryStore::new();
    store.add_tenant(Tenant {
        id: 1,
        full_name: "Expired Lease".to_string(),
        lease_start_date: Some(date(2023, 1, 1)),
        lease_end_date: Some(date(2024, 5, 31)),
    });
    store.add_unit(occupied_unit(1, 1));

    let outcome = generate_monthly_invoices(&store, date(2024, 6, 1), &settings(), false)
        .await
        .unwrap();

    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.generated, 0);
    assert!(store.all_invoices().is_empty());
}

#[tokio::test]
async fn tenant_without_lease_dates_is_skipped() {
    let store = MemoryStore::new();
    store.add_tenant(Tenant {
        id: 1,
        full_name: "No Lease".to_string(),
        lease_start_date: None,
        lease_end_date: None,
    });
    store.add_unit(occupied_unit(1, 1));

    let outcome = generate_monthly_invoices(&store, date(2024, 6, 1), &settings(), false)
        .await
        .unwrap();

    assert_eq!(outcome.skipped, 1);
    assert!(store.all_invoices().is_empty());
}

#[tokio::test]
async fn vacant_units_are_not_considered() {
    let store = MemoryStore::new();
    store.add_tenant(leased_tenant(1));
    store.add_unit(RentalUnit {
        id: 1,
        unit_number: "A-1".to_string(),
        tenant_id: None,
        rent_amount: dec!(1200),
        currency: "MVR".to_string(),
        status: "vacant".to_string(),
    });

    let outcome = generate_monthly_invoices(&store, date(2024, 6, 1), &settings(), false)
        .await
        .unwrap();

    assert_eq!(outcome.units_checked, 0);
    assert!(store.all_invoices().is_empty());
}
