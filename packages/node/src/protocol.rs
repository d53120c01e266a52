//! The four protocol operations, independent of HTTP.
//!
//! Each operation goes to storage afresh; nothing is cached between calls.
//! Reads project the stored document onto the caller's [`RequestContext`];
//! writes persist first and only then return what they wrote.
//!
//! # Races
//!
//! `create_container` checks for an existing document and then writes, and
//! `append_annotation` loads, appends and saves. Neither pair is atomic: two
//! concurrent creates of the same slug can both succeed (last write wins),
//! and two concurrent appends to one container can lose one annotation.

use elucidate::{
    generate_local_id, validate_local_id, Annotation, AnnotationBody, Container, ContainerOptions,
    RequestContext,
};

use crate::{error::AppError, storage::Storage};

/// `GetContainer`: load and rehydrate.
pub async fn get_container(
    storage: &dyn Storage,
    ctx: &RequestContext,
    container: &str,
) -> Result<Container, AppError> {
    let stored = load(storage, container).await?;
    stored.rehydrated(ctx, container).map_err(|e| {
        tracing::warn!("container {container} is corrupt: {e}");
        not_found_container(container)
    })
}

/// `GetAnnotation`: rehydrate the parent container and return the first
/// item whose local id matches.
pub async fn get_annotation(
    storage: &dyn Storage,
    ctx: &RequestContext,
    container: &str,
    annotation: &str,
) -> Result<Annotation, AppError> {
    let rehydrated = get_container(storage, ctx, container).await?;
    rehydrated
        .find_annotation(annotation)
        .cloned()
        .ok_or_else(|| {
            AppError::NotFound(format!("annotation {annotation} not found in {container}"))
        })
}

/// `CreateContainer`: build a skeleton under `slug` (or a generated id) and
/// persist it unless the id is taken.
///
/// A blank slug counts as absent. A slug that cannot be a local id is a 400.
pub async fn create_container(
    storage: &dyn Storage,
    ctx: &RequestContext,
    slug: Option<&str>,
    options: &ContainerOptions,
) -> Result<Container, AppError> {
    let local_id = match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => {
            validate_local_id(slug)
                .map_err(|e| AppError::BadRequest(format!("invalid Slug: {e}")))?;
            slug.to_string()
        }
        None => generate_local_id(),
    };

    if storage.exists(&local_id).await? {
        tracing::warn!("container already exists: {local_id}");
        return Err(AppError::Conflict(format!(
            "container {local_id} already exists"
        )));
    }

    let container = Container::skeleton(ctx, Some(&local_id), options);
    tracing::info!("creating container {}", container.id);
    Ok(storage.save(&local_id, container).await?)
}

/// `AppendAnnotation`: mint a new annotation, append it to the container,
/// and persist the whole document. Returns the annotation, not the container.
pub async fn append_annotation(
    storage: &dyn Storage,
    ctx: &RequestContext,
    container: &str,
    body: AnnotationBody,
) -> Result<Annotation, AppError> {
    let mut stored = load(storage, container).await?;

    let annotation = Annotation::skeleton(ctx, container, body);
    stored.push(annotation.clone());

    tracing::info!(
        "saving annotation {} into container {container} (total {})",
        annotation.id,
        stored.total
    );
    storage.save(container, stored).await?;
    Ok(annotation)
}

/// Load a container, mapping absent, corrupt and malformed ids to 404.
async fn load(storage: &dyn Storage, container: &str) -> Result<Container, AppError> {
    if validate_local_id(container).is_err() {
        return Err(not_found_container(container));
    }
    storage.load(container).await?.ok_or_else(|| {
        tracing::debug!("container {container} does not exist");
        not_found_container(container)
    })
}

fn not_found_container(container: &str) -> AppError {
    AppError::NotFound(format!("container {container} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{fs::FsStorage, memory::MemoryStorage};
    use elucidate::{extract_local_id, ANNO_CONTEXT};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn ctx() -> RequestContext {
        RequestContext::new("http", "localhost:4242")
    }

    fn body(value: Value) -> AnnotationBody {
        serde_json::from_value(value).unwrap()
    }

    fn labelled(label: &str) -> ContainerOptions {
        ContainerOptions {
            kind: None,
            label: Some(label.into()),
        }
    }

    #[tokio::test]
    async fn create_with_slug() {
        let s = MemoryStorage::new();
        let c = create_container(&s, &ctx(), Some("canvas1"), &labelled("My Page"))
            .await
            .unwrap();
        assert!(c.id.ends_with("/canvas1/"));
        assert_eq!(c.total, 0);
        assert!(c.items().is_empty());
        assert_eq!(c.label, "My Page");
        assert!(s.exists("canvas1").await.unwrap());
    }

    #[tokio::test]
    async fn create_without_slug_generates_id() {
        let s = MemoryStorage::new();
        let a = create_container(&s, &ctx(), None, &ContainerOptions::default())
            .await
            .unwrap();
        let b = create_container(&s, &ctx(), Some("   "), &ContainerOptions::default())
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(s.len().unwrap(), 2);
        assert!(s.exists(a.local_id().unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn create_rejects_unsafe_slug() {
        let s = MemoryStorage::new();
        for slug in ["../etc", "a/b", ".."] {
            let err = create_container(&s, &ctx(), Some(slug), &ContainerOptions::default())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "{slug}");
        }
        assert!(s.is_empty().unwrap());
    }

    #[tokio::test]
    async fn duplicate_create_conflicts_and_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let s = FsStorage::new(dir.path());
        create_container(&s, &ctx(), Some("c1"), &labelled("original"))
            .await
            .unwrap();
        append_annotation(&s, &ctx(), "c1", body(json!({"body": "x"})))
            .await
            .unwrap();
        let before = std::fs::read(s.document_path("c1")).unwrap();

        let other = RequestContext::new("https", "elsewhere.example");
        let err = create_container(&s, &other, Some("c1"), &labelled("replacement"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let after = std::fs::read(s.document_path("c1")).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn append_to_missing_container_is_not_found_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let s = FsStorage::new(dir.path());
        let err = append_annotation(&s, &ctx(), "ghost", body(json!({"body": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!s.document_path("ghost").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn append_keeps_total_equal_to_item_count() {
        let dir = TempDir::new().unwrap();
        let s = FsStorage::new(dir.path());
        create_container(&s, &ctx(), Some("c1"), &ContainerOptions::default())
            .await
            .unwrap();
        for n in 0..3 {
            append_annotation(&s, &ctx(), "c1", body(json!({"body": n})))
                .await
                .unwrap();
            let reloaded = s.load("c1").await.unwrap().unwrap();
            assert_eq!(reloaded.total, reloaded.items().len());
            assert_eq!(reloaded.total, n + 1);
        }
    }

    #[tokio::test]
    async fn annotation_round_trip() {
        let s = MemoryStorage::new();
        create_container(&s, &ctx(), Some("c1"), &ContainerOptions::default())
            .await
            .unwrap();
        let posted = json!({"motivation": "commenting", "body": "hello"});
        let created = append_annotation(&s, &ctx(), "c1", body(posted.clone()))
            .await
            .unwrap();
        assert!(created.id.starts_with("http://localhost:4242/w3c/annotation/c1/"));

        let local = extract_local_id(&created.id).unwrap();
        let fetched = get_annotation(&s, &ctx(), "c1", local).await.unwrap();
        let v = serde_json::to_value(&fetched).unwrap();
        assert_eq!(v["motivation"], "commenting");
        assert_eq!(v["body"], "hello");
        assert_eq!(v["type"], "Annotation");
        assert_eq!(v["@context"], ANNO_CONTEXT);
        assert_eq!(v["id"], Value::String(created.id.clone()));
        assert_eq!(v.as_object().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn get_annotation_uses_current_host() {
        let s = MemoryStorage::new();
        create_container(&s, &ctx(), Some("c1"), &ContainerOptions::default())
            .await
            .unwrap();
        let created = append_annotation(&s, &ctx(), "c1", AnnotationBody::default())
            .await
            .unwrap();
        let local = created.local_id().unwrap();

        let other = RequestContext::new("https", "mirror.example");
        let fetched = get_annotation(&s, &other, "c1", local).await.unwrap();
        assert_eq!(
            fetched.id,
            format!("https://mirror.example/w3c/annotation/c1/{local}")
        );
    }

    #[tokio::test]
    async fn get_missing_things_is_not_found() {
        let s = MemoryStorage::new();
        assert!(matches!(
            get_container(&s, &ctx(), "nope").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            get_container(&s, &ctx(), "..").await,
            Err(AppError::NotFound(_))
        ));
        create_container(&s, &ctx(), Some("c1"), &ContainerOptions::default())
            .await
            .unwrap();
        assert!(matches!(
            get_annotation(&s, &ctx(), "c1", "missing").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            get_annotation(&s, &ctx(), "nope", "missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn append_keeps_unknown_fields_of_seeded_document() {
        let dir = TempDir::new().unwrap();
        let s = FsStorage::new(dir.path());
        s.ensure_ready().await.unwrap();
        let seeded = json!({
            "id": "http://old.example/w3c/annotation/x/",
            "type": "AnnotationCollection",
            "label": "seeded",
            "seeAlso": "http://example.org/manifest.json",
            "first": {
                "type": "AnnotationPage",
                "items": [],
                "partOf": "http://old.example/w3c/annotation/x/",
                "next": "http://old.example/w3c/annotation/x/?page=1"
            },
            "total": 0
        });
        std::fs::write(s.document_path("x"), seeded.to_string()).unwrap();

        append_annotation(&s, &ctx(), "x", body(json!({"body": "kept"})))
            .await
            .unwrap();

        let on_disk: Value =
            serde_json::from_slice(&std::fs::read(s.document_path("x")).unwrap()).unwrap();
        assert_eq!(on_disk["seeAlso"], "http://example.org/manifest.json");
        assert_eq!(on_disk["first"]["next"], "http://old.example/w3c/annotation/x/?page=1");
        assert_eq!(on_disk["total"], 1);
        assert!(on_disk.get("last").is_none());
    }

    #[tokio::test]
    async fn minimal_seeded_document_is_served() {
        let dir = TempDir::new().unwrap();
        let s = FsStorage::new(dir.path());
        s.ensure_ready().await.unwrap();
        std::fs::write(
            s.document_path("y"),
            br#"{"id": "http://old.example/w3c/annotation/y/", "first": {"items": []}}"#,
        )
        .unwrap();

        let c = get_container(&s, &ctx(), "y").await.unwrap();
        assert_eq!(c.id, "http://localhost:4242/w3c/annotation/y/");
        assert_eq!(c.total, 0);
    }

    #[tokio::test]
    async fn corrupt_container_is_not_found() {
        let dir = TempDir::new().unwrap();
        let s = FsStorage::new(dir.path());
        s.ensure_ready().await.unwrap();
        std::fs::write(s.document_path("broken"), b"{]").unwrap();
        assert!(matches!(
            get_container(&s, &ctx(), "broken").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            append_annotation(&s, &ctx(), "broken", AnnotationBody::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn get_container_rewrites_stored_hosts() {
        let s = MemoryStorage::new();
        let old = RequestContext::new("http", "old.example");
        create_container(&s, &old, Some("c1"), &ContainerOptions::default())
            .await
            .unwrap();
        let a = append_annotation(&s, &old, "c1", AnnotationBody::default())
            .await
            .unwrap();

        let c = get_container(&s, &ctx(), "c1").await.unwrap();
        assert_eq!(c.id, "http://localhost:4242/w3c/annotation/c1/");
        assert_eq!(
            c.items()[0].id,
            format!("http://localhost:4242/w3c/annotation/c1/{}", a.local_id().unwrap())
        );
        // The stored copy is not touched by reads.
        let stored = s.load("c1").await.unwrap().unwrap();
        assert_eq!(stored.id, "http://old.example/w3c/annotation/c1/");
    }
}
