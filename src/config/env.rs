//! Environment overrides applied on top of file config.

use crate::error::ConfigError;

use super::Config;

/// Overrides the catalog location.
pub const CATALOG_URL_ENV: &str = "THEMESYNC_CATALOG_URL";
/// Overrides the audit threshold.
pub const AUDIT_THRESHOLD_ENV: &str = "THEMESYNC_AUDIT_THRESHOLD";

pub(super) fn apply_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(location) = non_empty(env_lookup(CATALOG_URL_ENV)) {
        config.catalog.location = location;
    }
    if let Some(threshold) = non_empty(env_lookup(AUDIT_THRESHOLD_ENV)) {
        config.audit.threshold = threshold.parse::<usize>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {AUDIT_THRESHOLD_ENV} value `{threshold}`: expected a non-negative integer"
            ))
        })?;
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
