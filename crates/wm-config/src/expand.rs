//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use std::env;

use crate::ConfigError;

/// Expand `${VAR}` references in `value`, naming `field` in errors.
///
/// Values without a `${` pass through unchanged, so URLs containing a bare
/// `$` are safe. An unset variable without a `:-default` is an error.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, lookup)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Expand an optional value in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_env(raw, field)?);
    }
    Ok(())
}

fn lookup(var: &str) -> Result<Option<String>, UnsetVar> {
    env::var(var).map(Some).map_err(|_| UnsetVar)
}

/// Marker for a variable that is not set.
#[derive(Debug)]
struct UnsetVar;
