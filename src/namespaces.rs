//! Namespaces partition the store; container ids are unique per namespace.

use crate::env;
use crate::errdefs::Error;
use crate::validation;

/// Namespace used when the caller does not pick one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Default namespace, honouring `CTRMETA_NAMESPACE` when it holds a valid
/// identifier.
pub fn default_namespace() -> String {
    match std::env::var(env::NAMESPACE_ENV_VAR) {
        Ok(namespace) if validate(&namespace).is_ok() => namespace,
        _ => DEFAULT_NAMESPACE.to_string(),
    }
}

/// Namespaces follow the identifier rules.
pub fn validate(namespace: &str) -> Result<(), Error> {
    validation::validate_identifier(namespace)
        .map_err(|err| Error::wrap(err.kind(), format!("namespace {namespace:?}"), err))
}
