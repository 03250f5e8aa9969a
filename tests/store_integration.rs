//! Integration tests for the container store
//!
//! These exercise [`MetadataStore`] only through the public [`Store`] trait,
//! the way an embedding application would. Unit tests for individual
//! components live next to the modules they cover.

use ctrmeta::{Any, Container, Context, MetadataStore, Store, StoreConfig, errdefs};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn spec() -> Any {
    Any::new(
        "types.containerd.io/opencontainers/runtime-spec/1/Spec",
        br#"{"ociVersion":"1.1.0"}"#.to_vec(),
    )
}

async fn seed(store: &dyn Store, ctx: &Context) {
    let containers = [
        Container::new("redis", "io.containerd.runc.v2", spec())
            .with_label("env", "prod")
            .with_image("docker.io/library/redis:7"),
        Container::new("nginx", "io.containerd.runc.v2", spec())
            .with_label("env", "dev")
            .with_image("docker.io/library/nginx:1.27"),
        Container::new("pause", "io.containerd.kata.v2", spec()).with_sandbox("sb-1"),
    ];
    for container in containers {
        store.create(ctx, container).await.unwrap();
    }
}

#[tokio::test]
async fn test_lifecycle_through_trait_object() {
    let store: Arc<dyn Store> = Arc::new(MetadataStore::in_memory());
    let ctx = Context::new("default");
    seed(store.as_ref(), &ctx).await;

    let ids = |containers: Vec<Container>| -> Vec<String> {
        containers.into_iter().map(|c| c.id).collect()
    };

    assert_eq!(
        ids(store.list(&ctx, &[]).await.unwrap()),
        vec!["nginx", "pause", "redis"]
    );
    assert_eq!(
        ids(store
            .list(&ctx, &["labels.env==prod".to_string(), "sandboxid==sb-1".to_string()])
            .await
            .unwrap()),
        vec!["pause", "redis"]
    );
    assert_eq!(
        ids(store
            .list(&ctx, &[r#"runtime.name~="runc",image~=nginx"#.to_string()])
            .await
            .unwrap()),
        vec!["nginx"]
    );

    let mut redis = store.get(&ctx, "redis").await.unwrap();
    redis.image = "docker.io/library/redis:8".to_string();
    let updated = store
        .update(&ctx, redis, &["image".to_string()])
        .await
        .unwrap();
    assert_eq!(updated.image, "docker.io/library/redis:8");
    assert!(updated.updated_at > updated.created_at);

    store.delete(&ctx, "redis").await.unwrap();
    let err = store.get(&ctx, "redis").await.unwrap_err();
    assert!(errdefs::is_not_found(&err));
}

#[tokio::test]
async fn test_committed_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::with_root(temp_dir.path());

    {
        let store = MetadataStore::open(&config).await.unwrap();
        seed(&store, &Context::new("default")).await;
        store
            .create(
                &Context::new("team-b"),
                Container::new("redis", "io.containerd.runc.v2", spec()),
            )
            .await
            .unwrap();
        store
            .delete(&Context::new("default"), "nginx")
            .await
            .unwrap();
    }

    let store = MetadataStore::open(&config).await.unwrap();
    let ctx = Context::new("default");
    assert_eq!(store.list(&ctx, &[]).await.unwrap().len(), 2);
    assert_eq!(
        store.namespaces(&ctx).await.unwrap(),
        vec!["default", "team-b"]
    );

    let redis = store.get(&ctx, "redis").await.unwrap();
    assert_eq!(redis.labels["env"], "prod");
    assert_eq!(redis.spec, Some(spec()));
    assert!(errdefs::is_not_found(
        &store.get(&ctx, "nginx").await.unwrap_err()
    ));
}

#[tokio::test]
async fn test_timed_out_context_leaves_store_untouched() {
    let store = MetadataStore::in_memory();
    let ctx = Context::new("default");
    seed(&store, &ctx).await;

    let expired = ctx.child().with_timeout(Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(5)).await;

    let err = store
        .create(
            &expired,
            Container::new("late", "io.containerd.runc.v2", spec()),
        )
        .await
        .unwrap_err();
    assert!(errdefs::is_deadline_exceeded(&err));
    assert!(!errdefs::is_not_found(&err));

    let err = store.delete(&expired, "redis").await.unwrap_err();
    assert!(err.is_deadline_exceeded());
    assert!(store.get(&ctx, "redis").await.is_ok());
    assert!(errdefs::is_not_found(
        &store.get(&ctx, "late").await.unwrap_err()
    ));
}
