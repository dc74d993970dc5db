use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rentledger::config::AppConfig;
use rentledger::db;
use rentledger::repository::postgres::PgStore;
use rentledger::services::backfill;
use rentledger::services::invoice_generation::{self, GenerationSettings};
use rentledger::services::recalculation;

/// Batch jobs for the tenant ledger: balance recalculation, historical
/// backfills, and monthly rent invoice generation. Invoked from cron or by
/// an operator; per-record errors are reported in the summary, and the
/// process exits non-zero only when a command cannot run at all.
#[derive(Parser)]
#[command(name = "rentledger", version, about)]
struct Cli {
    /// Print the run summary as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recalculate running balances for one tenant or all tenants.
    RecalculateBalances {
        /// Recalculate for this tenant only.
        #[arg(long)]
        tenant_id: Option<i64>,
        /// Compute and report drift without persisting.
        #[arg(long)]
        dry_run: bool,
    },
    /// Backfill historical rent invoices into the ledger.
    BackfillRentInvoices {
        #[arg(long)]
        dry_run: bool,
    },
    /// Backfill historical maintenance costs into the ledger.
    BackfillMaintenanceCosts {
        #[arg(long)]
        dry_run: bool,
    },
    /// Backfill historical payment records into the ledger.
    BackfillPayments {
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate the current month's rent invoices for occupied units.
    GenerateRentInvoices {
        /// Generate even when disabled or off-schedule.
        #[arg(long)]
        force: bool,
    },
    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match run(cli.command, &config, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Command,
    config: &AppConfig,
    json: bool,
) -> Result<(), rentledger::error::AppError> {
    let pool = db::connect(config).await?;

    if let Command::Migrate = command {
        sqlx::migrate!("./migrations").run(&pool).await?;
        println!("migrations applied");
        return Ok(());
    }

    let store = PgStore::new(pool);

    match command {
        Command::RecalculateBalances { tenant_id, dry_run } => {
            let outcome = recalculation::run_recalculation(&store, tenant_id, dry_run).await?;
            let verb = if dry_run { "would change" } else { "updated" };
            emit(
                &outcome,
                json,
                format!(
                    "recalculation: {} tenants, {} entries scanned, {} balances {verb}, {} errors",
                    outcome.tenants_processed,
                    outcome.entries_scanned,
                    outcome.entries_changed,
                    outcome.errors
                ),
            );
        }
        Command::BackfillRentInvoices { dry_run } => {
            let outcome = backfill::backfill_rent_invoices(&store, dry_run).await?;
            emit(&outcome, json, backfill_summary("rent invoices", &outcome, dry_run));
        }
        Command::BackfillMaintenanceCosts { dry_run } => {
            let outcome = backfill::backfill_maintenance_costs(&store, dry_run).await?;
            emit(&outcome, json, backfill_summary("maintenance costs", &outcome, dry_run));
        }
        Command::BackfillPayments { dry_run } => {
            let outcome = backfill::backfill_payment_records(&store, dry_run).await?;
            emit(&outcome, json, backfill_summary("payment records", &outcome, dry_run));
        }
        Command::GenerateRentInvoices { force } => {
            let settings = GenerationSettings::from_config(config);
            let today = Utc::now().date_naive();
            let outcome =
                invoice_generation::generate_monthly_invoices(&store, today, &settings, force)
                    .await?;
            emit(
                &outcome,
                json,
                format!(
                    "invoice generation: {} units checked, {} generated, {} skipped, {} duplicates, {} errors",
                    outcome.units_checked,
                    outcome.generated,
                    outcome.skipped,
                    outcome.duplicates,
                    outcome.errors
                ),
            );
        }
        Command::Migrate => unreachable!("handled above"),
    }

    Ok(())
}

fn emit<T: serde::Serialize>(outcome: &T, json: bool, text: String) {
    if json {
        // Plain counter structs; serialization cannot fail.
        println!(
            "{}",
            serde_json::to_string_pretty(outcome).expect("outcome serializes")
        );
    } else {
        println!("{text}");
    }
}

fn backfill_summary(kind: &str, outcome: &backfill::BackfillOutcome, dry_run: bool) -> String {
    if dry_run {
        format!(
            "dry run: would process {} {kind}, skip {}, {} errors",
            outcome.processed, outcome.skipped, outcome.errors
        )
    } else {
        format!(
            "backfill complete: {} {kind} processed, {} skipped, {} errors",
            outcome.processed, outcome.skipped, outcome.errors
        )
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
