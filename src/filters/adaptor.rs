use std::collections::HashMap;

use crate::containers::Container;

/// Exposes record fields to filter selectors by field path.
pub trait Adaptor {
    /// Value at `fieldpath`, or `None` when the field is absent or empty.
    fn field(&self, fieldpath: &[String]) -> Option<String>;
}

impl Adaptor for Container {
    fn field(&self, fieldpath: &[String]) -> Option<String> {
        let (first, rest) = fieldpath.split_first()?;

        let value = match (first.as_str(), rest) {
            ("id", []) => self.id.clone(),
            ("image", []) => self.image.clone(),
            ("runtime", [name]) if name == "name" => self.runtime.name.clone(),
            ("snapshotter", []) => self.snapshotter.clone(),
            ("snapshotkey", []) => self.snapshot_key.clone(),
            ("sandboxid", []) => self.sandbox_id.clone(),
            ("labels", key) => return lookup(&self.labels, key).cloned(),
            ("extensions", key) => {
                return lookup(&self.extensions, key).map(|any| any.type_url.clone());
            }
            _ => return None,
        };

        if value.is_empty() { None } else { Some(value) }
    }
}

// A map key may itself contain dots, so the remaining segments are joined.
fn lookup<'a, V>(map: &'a HashMap<String, V>, key: &[String]) -> Option<&'a V> {
    if key.is_empty() {
        return None;
    }
    map.get(&key.join("."))
}
