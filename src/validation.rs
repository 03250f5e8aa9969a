//! Identifier, label and container record validation.
//!
//! Every failure here is an [`ErrorKind::InvalidArgument`].

use std::sync::LazyLock;

use regex::Regex;

use crate::containers::Container;
use crate::errdefs::{Error, ErrorKind};

/// Longest accepted identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 76;

/// Longest accepted label key or value, in bytes.
pub const MAX_LABEL_SIZE: usize = 4096;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]+(?:[._-][A-Za-z0-9]+)*$").expect("identifier pattern is valid")
});

/// Identifiers are alphanumeric runs joined by single `.`, `_` or `-`.
pub fn validate_identifier(s: &str) -> Result<(), Error> {
    if s.is_empty() {
        return Err(Error::invalid_argument("identifier must not be empty"));
    }
    if s.len() > MAX_IDENTIFIER_LENGTH {
        return Err(Error::invalid_argument(format!(
            "identifier {s:?} greater than maximum length ({MAX_IDENTIFIER_LENGTH} characters)"
        )));
    }
    if !IDENTIFIER.is_match(s) {
        return Err(Error::invalid_argument(format!(
            "identifier {s:?} must match {}",
            IDENTIFIER.as_str()
        )));
    }
    Ok(())
}

pub fn validate_label(key: &str, value: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::invalid_argument("label key must not be empty"));
    }
    if key.len() > MAX_LABEL_SIZE {
        return Err(Error::invalid_argument(format!(
            "label key {:?}... exceeds maximum size ({MAX_LABEL_SIZE} bytes)",
            truncate(key)
        )));
    }
    if value.len() > MAX_LABEL_SIZE {
        return Err(Error::invalid_argument(format!(
            "label {key:?} value exceeds maximum size ({MAX_LABEL_SIZE} bytes)"
        )));
    }
    Ok(())
}

/// Checks the fields a stored record must always carry.
pub fn validate_container(container: &Container) -> Result<(), Error> {
    validate_identifier(&container.id).map_err(|err| {
        Error::wrap(ErrorKind::InvalidArgument, "container.id", err)
    })?;

    for (key, value) in &container.labels {
        validate_label(key, value).map_err(|err| {
            Error::wrap(
                ErrorKind::InvalidArgument,
                format!("container {:?} labels", container.id),
                err,
            )
        })?;
    }

    for (key, any) in &container.extensions {
        if key.is_empty() {
            return Err(Error::invalid_argument(
                "container.extensions keys must not be empty",
            ));
        }
        if any.type_url.is_empty() {
            return Err(Error::invalid_argument(format!(
                "container.extensions[{key:?}] must have a type url"
            )));
        }
    }

    if container.runtime.name.is_empty() {
        return Err(Error::invalid_argument("container.runtime.name must be set"));
    }

    match &container.spec {
        None => return Err(Error::invalid_argument("container.spec must be set")),
        Some(spec) if spec.type_url.is_empty() => {
            return Err(Error::invalid_argument("container.spec must have a type url"));
        }
        Some(_) => {}
    }

    if !container.snapshot_key.is_empty() && container.snapshotter.is_empty() {
        return Err(Error::invalid_argument(
            "container.snapshotter must be set if container.snapshot_key is set",
        ));
    }

    Ok(())
}

fn truncate(s: &str) -> &str {
    let mut end = s.len().min(10);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
