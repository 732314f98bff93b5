//! Environment variable expansion for configuration strings.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Strings without `${` are returned as-is, so a bare `$` (as in a
/// directory named `$site`) is never treated as a reference. `field` names
/// the configuration key and is only used for error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    // The lookup error carries the variable name; `:-default` still applies.
    shellexpand::env_with_context(value, |var| {
        std::env::var(var).map(Some).map_err(|_| var.to_owned())
    })
    .map(Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}} not set", e.cause),
    })
}
