//! HTTP request handlers for the annotation endpoints.
//!
//! Handlers are thin: they pull the request context, path and body out of
//! the request, call into [`crate::protocol`], and choose the status code.
//! They return `Result<impl IntoResponse, AppError>`.

pub mod annotations;

use std::sync::Arc;

use crate::{config::NodeConfig, storage::Storage};

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: NodeConfig,
}
