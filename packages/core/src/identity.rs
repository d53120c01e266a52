//! Identifier minting for containers and annotations.
//!
//! Stored documents never carry a trustworthy host: the host a container was
//! written under may differ from the one it is read through. Every absolute
//! IRI handed to a client is therefore minted from the current
//! [`RequestContext`] plus a *local identifier*, and every stored IRI is
//! reduced back to its local identifier with [`extract_local_id`] before it
//! is re-minted.
//!
//! | Resource | IRI |
//! |----------|-----|
//! | Container | `{scheme}://{host}/w3c/annotation/{container}/` |
//! | Annotation | `{scheme}://{host}/w3c/annotation/{container}/{annotation}` |

use crate::error::IdError;

/// Path prefix shared by every container and annotation IRI.
pub const ANNOTATION_ROOT: &str = "/w3c/annotation";

/// The request-dependent half of an IRI: scheme and authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    scheme: String,
    host: String,
}

impl RequestContext {
    /// Build a context from a scheme (e.g. `"https"`) and a host, which may
    /// include a port (e.g. `"localhost:4242"`).
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// IRI of a container. Always ends with `/`.
    pub fn container_iri(&self, container: &str) -> String {
        format!(
            "{}://{}{ANNOTATION_ROOT}/{container}/",
            self.scheme, self.host
        )
    }

    /// IRI of an annotation inside `container`. Never ends with `/`.
    pub fn annotation_iri(&self, container: &str, annotation: &str) -> String {
        format!(
            "{}://{}{ANNOTATION_ROOT}/{container}/{annotation}",
            self.scheme, self.host
        )
    }
}

/// Mint an absolute IRI for a container, or for an annotation when
/// `annotation` is given.
///
/// Pure: identical inputs always produce identical output.
pub fn mint(ctx: &RequestContext, container: &str, annotation: Option<&str>) -> String {
    match annotation {
        Some(annotation) => ctx.annotation_iri(container, annotation),
        None => ctx.container_iri(container),
    }
}

/// Recover the local identifier from a (possibly foreign-host) IRI.
///
/// Splits on `/`, drops empty segments, and returns the last one, so both
/// `.../c1/` and `.../c1` yield `"c1"`. Returns `None` when the IRI has no
/// non-empty segment at all.
pub fn extract_local_id(iri: &str) -> Option<&str> {
    iri.split('/').filter(|s| !s.is_empty()).last()
}

/// Generate a fresh collision-resistant local identifier (UUID v4).
pub fn generate_local_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Check that `id` can serve as a local identifier.
///
/// Local identifiers double as file name stems and as single path segments,
/// so separators, control characters and the dot segments are rejected.
/// `?`, `#`, `%` and whitespace are rejected too: minted IRIs embed the id
/// unescaped, and those characters would end the path or change its meaning.
pub fn validate_local_id(id: &str) -> Result<(), IdError> {
    if id.is_empty() {
        return Err(IdError::Empty);
    }
    if id == "." || id == ".." {
        return Err(IdError::DotSegment(id.to_string()));
    }
    if let Some(c) = id
        .chars()
        .find(|c| {
            matches!(*c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control()
        })
    {
        return Err(IdError::InvalidChar {
            id: id.to_string(),
            found: c,
        });
    }
    Ok(())
}
