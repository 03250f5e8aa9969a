//! Field-path scoped container updates.

use chrono::{DateTime, Duration, Utc};

use crate::containers::Container;
use crate::errdefs::Error;

/// A mutable container field named by an update field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    Labels,
    Label(String),
    Image,
    Spec,
    SnapshotKey,
    Extensions,
    Extension(String),
}

impl FieldPath {
    /// Parse a field path such as `labels`, `labels.env` or `SnapshotKey`.
    ///
    /// The field name is case-insensitive and ignores underscores; a map key
    /// after the first dot is taken verbatim (surrounding quotes removed).
    pub fn parse(path: &str) -> Result<Self, Error> {
        let (name, key) = match path.split_once('.') {
            Some((name, key)) => (name, Some(unquote(key))),
            None => (path, None),
        };
        let normalized = name.replace('_', "").to_ascii_lowercase();

        match (normalized.as_str(), key) {
            ("labels", None) => Ok(FieldPath::Labels),
            ("labels", Some(key)) if !key.is_empty() => Ok(FieldPath::Label(key.to_string())),
            ("extensions", None) => Ok(FieldPath::Extensions),
            ("extensions", Some(key)) if !key.is_empty() => {
                Ok(FieldPath::Extension(key.to_string()))
            }
            ("image", None) => Ok(FieldPath::Image),
            ("spec", None) => Ok(FieldPath::Spec),
            ("snapshotkey", None) => Ok(FieldPath::SnapshotKey),
            ("id" | "runtime" | "snapshotter" | "sandboxid", _) => Err(Error::invalid_argument(
                format!("container.{normalized} field is immutable"),
            )),
            _ => Err(Error::invalid_argument(format!(
                "cannot update {path:?} field on container"
            ))),
        }
    }
}

fn unquote(key: &str) -> &str {
    key.strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .unwrap_or(key)
}

/// Merge `incoming` into a copy of `existing`.
///
/// With no field paths every mutable field is replaced and the immutable
/// fields of `incoming` must equal the stored ones. Timestamps are left to
/// the caller.
pub fn apply(
    existing: &Container,
    incoming: Container,
    fieldpaths: &[String],
) -> Result<Container, Error> {
    let mut updated = existing.clone();

    if fieldpaths.is_empty() {
        if incoming.runtime != existing.runtime {
            return Err(Error::invalid_argument("container.runtime field is immutable"));
        }
        if incoming.snapshotter != existing.snapshotter {
            return Err(Error::invalid_argument(
                "container.snapshotter field is immutable",
            ));
        }
        if incoming.sandbox_id != existing.sandbox_id {
            return Err(Error::invalid_argument(
                "container.sandbox_id field is immutable",
            ));
        }

        updated.labels = incoming.labels;
        updated.image = incoming.image;
        updated.spec = incoming.spec;
        updated.snapshot_key = incoming.snapshot_key;
        updated.extensions = incoming.extensions;
        return Ok(updated);
    }

    let paths = fieldpaths
        .iter()
        .map(|path| FieldPath::parse(path))
        .collect::<Result<Vec<_>, _>>()?;

    for path in paths {
        match path {
            FieldPath::Labels => updated.labels = incoming.labels.clone(),
            FieldPath::Label(key) => match incoming.labels.get(&key) {
                Some(value) if !value.is_empty() => {
                    updated.labels.insert(key, value.clone());
                }
                _ => {
                    updated.labels.remove(&key);
                }
            },
            FieldPath::Image => updated.image = incoming.image.clone(),
            FieldPath::Spec => updated.spec = incoming.spec.clone(),
            FieldPath::SnapshotKey => updated.snapshot_key = incoming.snapshot_key.clone(),
            FieldPath::Extensions => updated.extensions = incoming.extensions.clone(),
            FieldPath::Extension(key) => match incoming.extensions.get(&key) {
                Some(any) => {
                    updated.extensions.insert(key, any.clone());
                }
                None => {
                    updated.extensions.remove(&key);
                }
            },
        }
    }

    Ok(updated)
}

/// A modification time strictly after `previous`, even if the clock has not
/// advanced.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}
