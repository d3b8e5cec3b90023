//! Configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::schema::RuntimeConfig;

/// A fiscal year before public-sector digital payroll records exist is
/// almost certainly a typo'd environment variable, not a real audit target.
const MIN_FISCAL_YEAR: i32 = 2000;

/// Validate a runtime configuration.
pub fn validate(config: &RuntimeConfig) -> ConfigResult<()> {
    validate_port(config)?;
    validate_fiscal_year(config)?;
    validate_db_path(config)?;
    Ok(())
}

fn validate_port(config: &RuntimeConfig) -> ConfigResult<()> {
    if config.port == 0 {
        return Err(ConfigError::validation("port must be nonzero"));
    }
    Ok(())
}

fn validate_fiscal_year(config: &RuntimeConfig) -> ConfigResult<()> {
    if config.fiscal_year < MIN_FISCAL_YEAR {
        return Err(ConfigError::validation(format!(
            "fiscal_year must be at least {MIN_FISCAL_YEAR}, got {}",
            config.fiscal_year
        )));
    }
    Ok(())
}

fn validate_db_path(config: &RuntimeConfig) -> ConfigResult<()> {
    if config.db_path.as_os_str().is_empty() {
        return Err(ConfigError::validation("db_path must not be empty"));
    }
    Ok(())
}
