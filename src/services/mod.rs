pub mod backfill;
pub mod invoice_generation;
pub mod recalculation;
