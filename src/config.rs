use std::env;

/// Environment-driven configuration for the ledger jobs.
///
/// The invoice-generation settings lived in a `system_settings` table in the
/// original deployment; here they are plain environment configuration read
/// once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub environment: String,
    pub database_url: Option<String>,
    pub db_pool_max_connections: u32,
    pub db_pool_min_connections: u32,
    pub db_pool_acquire_timeout_seconds: u64,
    pub invoice_generation_enabled: bool,
    pub invoice_generation_day: u32,
    pub invoice_due_date_offset_days: i64,
    pub default_currency: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            app_name: env_or("APP_NAME", "rentledger"),
            environment: env_or("ENVIRONMENT", "development"),
            database_url: env_opt("DATABASE_URL"),
            db_pool_max_connections: env_parse_or("DB_POOL_MAX_CONNECTIONS", 5),
            db_pool_min_connections: env_parse_or("DB_POOL_MIN_CONNECTIONS", 1),
            db_pool_acquire_timeout_seconds: env_parse_or("DB_POOL_ACQUIRE_TIMEOUT_SECONDS", 5),
            invoice_generation_enabled: env_parse_bool_or("INVOICE_GENERATION_ENABLED", false),
            invoice_generation_day: normalize_generation_day(env_parse_or(
                "INVOICE_GENERATION_DAY",
                1,
            )),
            invoice_due_date_offset_days: env_parse_or("INVOICE_DUE_DATE_OFFSET_DAYS", 7),
            default_currency: env_or("DEFAULT_CURRENCY", "MVR"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case("production")
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_opt(key)
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_parse_bool_or(key: &str, default: bool) -> bool {
    match env_opt(key).as_deref().map(str::to_ascii_lowercase) {
        Some(value) if value == "1" || value == "true" || value == "yes" || value == "on" => true,
        Some(value) if value == "0" || value == "false" || value == "no" || value == "off" => false,
        Some(_) => default,
        None => default,
    }
}

/// Clamp the configured day-of-month to 1..=28 so the generation day exists
/// in every month.
fn normalize_generation_day(day: u32) -> u32 {
    day.clamp(1, 28)
}

#[cfg(test)]
mod tests {
    use super::normalize_generation_day;

    #[test]
    fn clamps_generation_day() {
        assert_eq!(normalize_generation_day(0), 1);
        assert_eq!(normalize_generation_day(15), 15);
        assert_eq!(normalize_generation_day(31), 28);
    }
}
