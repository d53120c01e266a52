//! `elucidate-node` — minimal W3C Web Annotation Protocol server.
//!
//! # Quick start
//!
//! ```sh
//! # Containers under ./.elucidate, listening on port 4242:
//! elucidate-node
//!
//! # Custom directory and bind address:
//! elucidate-node --data-dir /var/lib/annotations --bind 127.0.0.1:8080
//!
//! # Behind a TLS-terminating proxy:
//! ELUCIDATE_TRUST_PROXY=true elucidate-node
//! ```
//!
//! See [`NodeConfig`] for every flag and environment variable.

use std::sync::Arc;

use clap::Parser;
use elucidate_node::{build_router, FsStorage, MemoryStorage, NodeConfig, Storage};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "elucidate_node=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = NodeConfig::parse();

    let storage: Arc<dyn Storage> = if config.memory {
        tracing::info!("storage: in-memory (data will not survive restart)");
        Arc::new(MemoryStorage::new())
    } else {
        let root = config
            .resolved_data_dir()
            .unwrap_or_else(|e| panic!("failed to resolve data directory: {e}"));
        tracing::info!("storage: JSON documents under {}", root.display());
        Arc::new(FsStorage::new(root))
    };
    storage
        .ensure_ready()
        .await
        .unwrap_or_else(|e| panic!("failed to prepare storage: {e}"));

    let app = build_router(storage, config.clone());

    tracing::info!(
        "starting annotation server at http://{}/w3c/annotation",
        config.bind_addr
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    axum::serve(listener, app)
        .await
        .expect("server error");
}
