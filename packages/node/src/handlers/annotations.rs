//! Container and annotation handlers under `/w3c/annotation`.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use elucidate::{Annotation, AnnotationBody, Container, ContainerOptions};

use crate::{
    error::AppError,
    extract::{JsonBody, RequestHost},
    protocol,
};

use super::AppState;

/// Header carrying the client's suggested container id.
const SLUG: &str = "slug";

/// `GET /w3c/annotation/{container}`
///
/// Returns the container with every IRI minted against this request's host.
pub async fn get_container(
    State(state): State<AppState>,
    RequestHost(ctx): RequestHost,
    Path(container): Path<String>,
) -> Result<Json<Container>, AppError> {
    let container = protocol::get_container(state.storage.as_ref(), &ctx, &container).await?;
    Ok(Json(container))
}

/// `GET /w3c/annotation/{container}/{annotation}`
pub async fn get_annotation(
    State(state): State<AppState>,
    RequestHost(ctx): RequestHost,
    Path((container, annotation)): Path<(String, String)>,
) -> Result<Json<Annotation>, AppError> {
    let annotation =
        protocol::get_annotation(state.storage.as_ref(), &ctx, &container, &annotation).await?;
    Ok(Json(annotation))
}

/// `POST /w3c/annotation`
///
/// Creates a container named by the optional `Slug` header. The body may
/// set `label` and `type`. Responds 201 with the stored container, or 409
/// if the id is taken.
pub async fn create_container(
    State(state): State<AppState>,
    RequestHost(ctx): RequestHost,
    headers: HeaderMap,
    JsonBody(options): JsonBody<ContainerOptions>,
) -> Result<impl IntoResponse, AppError> {
    let slug = match headers.get(SLUG) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::BadRequest("Slug header is not valid text".into()))?,
        ),
        None => None,
    };

    let container =
        protocol::create_container(state.storage.as_ref(), &ctx, slug, &options).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, container.id.clone())],
        Json(container),
    ))
}

/// `POST /w3c/annotation/{container}`
///
/// Appends the body as a new annotation. Responds 201 with the annotation
/// once the container has been written, or 404 if the container is missing.
pub async fn append_annotation(
    State(state): State<AppState>,
    RequestHost(ctx): RequestHost,
    Path(container): Path<String>,
    JsonBody(body): JsonBody<AnnotationBody>,
) -> Result<impl IntoResponse, AppError> {
    let annotation =
        protocol::append_annotation(state.storage.as_ref(), &ctx, &container, body).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, annotation.id.clone())],
        Json(annotation),
    ))
}

/// `PUT /w3c/annotation/{container}/{annotation}`
///
/// Updating annotations is not supported; the route only echoes its path.
pub async fn update_annotation(Path((container, annotation)): Path<(String, String)>) -> String {
    format!("Container: {container} Annotation: {annotation}")
}
