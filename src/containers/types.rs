use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Self-describing opaque payload: a type URL plus the encoded bytes.
///
/// The store keeps these byte-for-byte and never looks inside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Any {
    pub type_url: String,
    #[serde(with = "hex::serde")]
    pub value: Vec<u8>,
}

impl Any {
    pub fn new(type_url: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            type_url: type_url.into(),
            value: value.into(),
        }
    }
}

/// Runtime that launches tasks for a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Any>,
}

impl RuntimeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
        }
    }
}

/// The set of resources pinned by a container. Unless otherwise noted, the
/// resources here are considered in use by the container and are used to
/// create tasks from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Uniquely identifies the container in a namespace.
    ///
    /// Required and cannot be changed after creation.
    pub id: String,

    /// Optional and fully mutable.
    #[serde(default)]
    pub labels: HashMap<String, String>,

    /// Image reference. Optional and mutable.
    #[serde(default)]
    pub image: String,

    /// Which runtime launches container tasks. Required and immutable.
    pub runtime: RuntimeInfo,

    /// Runtime specification implementing the container. Required but mutable.
    pub spec: Option<Any>,

    /// Snapshot key of the root filesystem. A caller starting a task looks
    /// up the mounts for this key from the snapshot service.
    ///
    /// Optional and mutable.
    #[serde(default)]
    pub snapshot_key: String,

    /// Snapshotter used for the rootfs. Optional but immutable.
    #[serde(default)]
    pub snapshotter: String,

    /// Set by the store on create.
    pub created_at: DateTime<Utc>,

    /// Refreshed by the store on every update.
    pub updated_at: DateTime<Utc>,

    /// Client-specified metadata.
    #[serde(default)]
    pub extensions: HashMap<String, Any>,

    /// Sandbox this container belongs to. Optional, but can't be changed
    /// after creation.
    #[serde(default)]
    pub sandbox_id: String,
}

impl Container {
    pub fn new(id: impl Into<String>, runtime: impl Into<String>, spec: Any) -> Self {
        Self {
            id: id.into(),
            runtime: RuntimeInfo::new(runtime),
            spec: Some(spec),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_snapshot(
        mut self,
        snapshotter: impl Into<String>,
        snapshot_key: impl Into<String>,
    ) -> Self {
        self.snapshotter = snapshotter.into();
        self.snapshot_key = snapshot_key.into();
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: Any) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    pub fn with_sandbox(mut self, sandbox_id: impl Into<String>) -> Self {
        self.sandbox_id = sandbox_id.into();
        self
    }

    pub fn with_runtime_options(mut self, options: Any) -> Self {
        self.runtime.options = Some(options);
        self
    }
}
