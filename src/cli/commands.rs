//! Subcommand execution against a [`MetadataStore`].

use super::args::Commands;
use crate::containers::{Any, Container, Store};
use crate::context::Context;
use crate::metadata::MetadataStore;
use anyhow::{Context as _, Result, bail};
use serde_json::{Value, json};
use std::fs;
use tracing::debug;

/// Run a store subcommand and return its JSON output.
pub async fn execute(store: &MetadataStore, ctx: &Context, command: Commands) -> Result<Value> {
    debug!("Executing {:?} in namespace {}", command, ctx.namespace());

    match command {
        Commands::List { filters } => {
            let containers = store.list(ctx, &filters).await?;
            Ok(serde_json::to_value(containers)?)
        }
        Commands::Get { id } => Ok(serde_json::to_value(store.get(ctx, &id).await?)?),
        Commands::Create {
            id,
            runtime,
            spec_type,
            spec_file,
            image,
            labels,
            snapshotter,
            snapshot_key,
            sandbox,
        } => {
            let spec = fs::read(&spec_file)
                .with_context(|| format!("failed to read spec file {}", spec_file.display()))?;

            let mut container = Container::new(id, runtime, Any::new(spec_type, spec));
            container.labels.extend(labels);
            container.image = image.unwrap_or_default();
            container.snapshotter = snapshotter.unwrap_or_default();
            container.snapshot_key = snapshot_key.unwrap_or_default();
            container.sandbox_id = sandbox.unwrap_or_default();

            Ok(serde_json::to_value(store.create(ctx, container).await?)?)
        }
        Commands::Update {
            id,
            image,
            labels,
            snapshot_key,
            fields,
        } => {
            let (container, fieldpaths) =
                update_request(id, image, labels, snapshot_key, fields)?;
            Ok(serde_json::to_value(
                store.update(ctx, container, &fieldpaths).await?,
            )?)
        }
        Commands::Delete { id } => {
            store.delete(ctx, &id).await?;
            Ok(json!({ "deleted": id }))
        }
        Commands::Namespaces => Ok(serde_json::to_value(store.namespaces(ctx).await?)?),
        Commands::ShowConfig => bail!("show-config does not operate on the store"),
    }
}

/// Build the partial record and field paths for an `update` invocation.
///
/// Explicit field paths are used as given; otherwise each option supplied
/// names its own field.
fn update_request(
    id: String,
    image: Option<String>,
    labels: Vec<(String, String)>,
    snapshot_key: Option<String>,
    fields: Vec<String>,
) -> Result<(Container, Vec<String>)> {
    let mut fieldpaths = fields;
    if fieldpaths.is_empty() {
        if image.is_some() {
            fieldpaths.push("image".to_string());
        }
        fieldpaths.extend(labels.iter().map(|(key, _)| format!("labels.{key}")));
        if snapshot_key.is_some() {
            fieldpaths.push("snapshotkey".to_string());
        }
    }
    if fieldpaths.is_empty() {
        bail!("nothing to update for container {id:?}");
    }

    let container = Container {
        id,
        labels: labels.into_iter().collect(),
        image: image.unwrap_or_default(),
        snapshot_key: snapshot_key.unwrap_or_default(),
        ..Default::default()
    };
    Ok((container, fieldpaths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errdefs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_command(dir: &TempDir, id: &str) -> Commands {
        let spec_file = dir.path().join("spec.json");
        fs::write(&spec_file, br#"{"ociVersion":"1.1.0"}"#).unwrap();

        Commands::Create {
            id: id.to_string(),
            runtime: "io.containerd.runc.v2".to_string(),
            spec_type: "types.test/Spec".to_string(),
            spec_file,
            image: Some("redis:7".to_string()),
            labels: vec![("env".to_string(), "prod".to_string())],
            snapshotter: None,
            snapshot_key: None,
            sandbox: None,
        }
    }

    #[tokio::test]
    async fn test_create_list_update_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = MetadataStore::in_memory();
        let ctx = Context::new("default");

        let created = execute(&store, &ctx, create_command(&temp_dir, "c1"))
            .await
            .unwrap();
        assert_eq!(created["id"], "c1");
        assert_eq!(created["labels"]["env"], "prod");

        let listed = execute(
            &store,
            &ctx,
            Commands::List {
                filters: vec!["labels.env==prod".to_string()],
            },
        )
        .await
        .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let updated = execute(
            &store,
            &ctx,
            Commands::Update {
                id: "c1".to_string(),
                image: None,
                labels: vec![
                    ("env".to_string(), String::new()),
                    ("tier".to_string(), "db".to_string()),
                ],
                snapshot_key: None,
                fields: vec![],
            },
        )
        .await
        .unwrap();
        assert_eq!(updated["image"], "redis:7");
        assert_eq!(updated["labels"], json!({ "tier": "db" }));

        let namespaces = execute(&store, &ctx, Commands::Namespaces).await.unwrap();
        assert_eq!(namespaces, json!(["default"]));

        execute(&store, &ctx, Commands::Delete { id: "c1".to_string() })
            .await
            .unwrap();
        let err = execute(&store, &ctx, Commands::Get { id: "c1".to_string() })
            .await
            .unwrap_err();
        assert!(errdefs::is_not_found(&*err));
    }

    #[tokio::test]
    async fn test_missing_spec_file() {
        let store = MetadataStore::in_memory();
        let ctx = Context::new("default");

        let command = Commands::Create {
            id: "c1".to_string(),
            runtime: "io.containerd.runc.v2".to_string(),
            spec_type: "types.test/Spec".to_string(),
            spec_file: PathBuf::from("/nonexistent/spec.json"),
            image: None,
            labels: vec![],
            snapshotter: None,
            snapshot_key: None,
            sandbox: None,
        };
        assert!(execute(&store, &ctx, command).await.is_err());
        assert!(store.list(&ctx, &[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_update_request_fieldpaths() {
        let (container, fieldpaths) = update_request(
            "c1".to_string(),
            Some("nginx".to_string()),
            vec![("env".to_string(), "dev".to_string())],
            None,
            vec![],
        )
        .unwrap();
        assert_eq!(fieldpaths, vec!["image", "labels.env"]);
        assert_eq!(container.image, "nginx");

        let (_, fieldpaths) = update_request(
            "c1".to_string(),
            None,
            vec![],
            None,
            vec!["labels".to_string()],
        )
        .unwrap();
        assert_eq!(fieldpaths, vec!["labels"]);

        assert!(update_request("c1".to_string(), None, vec![], None, vec![]).is_err());
    }
}
