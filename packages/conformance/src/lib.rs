//! Shared helpers for the annotation server conformance suite.
//!
//! Provides [`spawn_node`] — a function that binds a `TcpListener` on an
//! ephemeral port, wires up an in-process server backed by [`FsStorage`] in a
//! fresh temporary directory, and returns a [`TestNode`] so tests can inspect
//! or seed the documents on disk without going through the HTTP layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use elucidate_node::{build_router, config::NodeConfig, FsStorage, Storage};
use tempfile::TempDir;

/// A running in-process server and the directory it stores containers in.
///
/// The directory is removed when the value is dropped.
pub struct TestNode {
    /// Base URL, e.g. `http://127.0.0.1:51234`.
    pub url: String,
    pub storage: Arc<FsStorage>,
    dir: TempDir,
}

impl TestNode {
    /// Root of the container directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// On-disk path of the document for container `id`.
    pub fn document_path(&self, id: &str) -> PathBuf {
        self.storage.document_path(id)
    }

    /// Read the raw stored JSON of container `id`, or `None` if absent or unparsable.
    pub fn read_container(&self, id: &str) -> Option<serde_json::Value> {
        let bytes = std::fs::read(self.document_path(id)).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Overwrite container `id` with an empty collection, as written by an
    /// older deployment reachable at `server`.
    pub fn clear_container(&self, server: &str, id: &str) -> std::io::Result<()> {
        let iri = format!("{server}/w3c/annotation/{id}/");
        let doc = serde_json::json!({
            "@context": [elucidate::ANNO_CONTEXT, elucidate::LDP_CONTEXT],
            "id": iri,
            "type": "AnnotationCollection",
            "label": "Seeded container",
            "first": {
                "type": "AnnotationPage",
                "items": [],
                "partOf": iri,
                "startIndex": 0
            },
            "last": format!("{iri}?page0&desc=1"),
            "total": 0
        });
        std::fs::create_dir_all(self.path())?;
        std::fs::write(self.document_path(id), doc.to_string())
    }
}

/// Start an ephemeral in-process server.
///
/// The server runs in a background `tokio` task bound to an OS-assigned port
/// on `127.0.0.1`.
///
/// # Panics
///
/// Panics if the temporary directory or the TCP listener cannot be created.
pub async fn spawn_node() -> TestNode {
    let dir = TempDir::new().expect("create temp dir");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let url = format!("http://{addr}");

    let fs_storage = Arc::new(FsStorage::new(dir.path()));
    let storage: Arc<dyn Storage> = Arc::clone(&fs_storage) as Arc<dyn Storage>;

    let mut config = NodeConfig::with_data_dir(dir.path());
    config.bind_addr = addr;
    let router = build_router(storage, config);

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance node error");
    });

    TestNode {
        url,
        storage: fs_storage,
        dir,
    }
}
