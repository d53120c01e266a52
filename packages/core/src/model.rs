//! JSON-LD document model: containers (`AnnotationCollection`) and the
//! annotations they hold.
//!
//! A container is persisted as a single document wrapping exactly one
//! `AnnotationPage`. The shape produced by [`Container::skeleton`] is the
//! canonical one; later operations only append to `first.items` and keep
//! `total` in step with it.
//!
//! Absolute IRIs inside a stored document are whatever was minted when it was
//! last written. They are never served as-is: every read path goes through
//! [`Container::rehydrated`], which re-mints them against the current request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::identity::{extract_local_id, generate_local_id, mint, RequestContext};

/// The Web Annotation vocabulary.
pub const ANNO_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";
/// The Linked Data Platform vocabulary.
pub const LDP_CONTEXT: &str = "http://www.w3.org/ns/ldp.jsonld";

pub const COLLECTION_TYPE: &str = "AnnotationCollection";
pub const PAGE_TYPE: &str = "AnnotationPage";
pub const ANNOTATION_TYPE: &str = "Annotation";
pub const DEFAULT_LABEL: &str = "Unnamed container";

/// Keys owned by the server. Client values for these are discarded.
pub const RESERVED_KEYS: [&str; 3] = ["@context", "id", "type"];

// ---------------------------------------------------------------------------
// JsonLdContext
// ---------------------------------------------------------------------------

/// A JSON-LD `@context`: one vocabulary IRI or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JsonLdContext {
    Single(String),
    Multiple(Vec<String>),
}

impl JsonLdContext {
    /// `@context` of a single annotation.
    pub fn annotation() -> Self {
        JsonLdContext::Single(ANNO_CONTEXT.to_string())
    }

    /// `@context` of a container: annotation and LDP vocabularies.
    pub fn container() -> Self {
        JsonLdContext::Multiple(vec![ANNO_CONTEXT.to_string(), LDP_CONTEXT.to_string()])
    }
}

// ---------------------------------------------------------------------------
// Client input
// ---------------------------------------------------------------------------

/// Fields a client may set when creating a container.
///
/// Anything else in the request body is ignored. Empty strings count as
/// absent and fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ContainerOptions {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
}

/// Client-supplied annotation content.
///
/// Opaque to the server: stored and returned verbatim, except that the
/// [`RESERVED_KEYS`] are stripped on construction so they can never shadow
/// the system fields of an [`Annotation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AnnotationBody {
    fields: Map<String, Value>,
}

impl AnnotationBody {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for AnnotationBody {
    fn from(mut fields: Map<String, Value>) -> Self {
        for key in RESERVED_KEYS {
            fields.remove(key);
        }
        Self { fields }
    }
}

impl From<AnnotationBody> for Map<String, Value> {
    fn from(body: AnnotationBody) -> Self {
        body.fields
    }
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// A single annotation as stored inside a container and served to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Annotation {
    #[serde(rename = "@context", default = "JsonLdContext::annotation")]
    pub context: JsonLdContext,

    pub id: String,

    #[serde(rename = "type", default = "annotation_type")]
    pub kind: String,

    /// Everything the client sent, minus the reserved keys.
    #[serde(flatten)]
    pub body: AnnotationBody,
}

fn annotation_type() -> String {
    ANNOTATION_TYPE.to_string()
}

impl Annotation {
    /// Build a new annotation for `container` with a fresh local id.
    ///
    /// The system fields are set after the client body has been taken in, so
    /// a client can never choose its own `id`, `type` or `@context`.
    pub fn skeleton(ctx: &RequestContext, container: &str, body: AnnotationBody) -> Self {
        let local_id = generate_local_id();
        Self {
            context: JsonLdContext::annotation(),
            id: mint(ctx, container, Some(&local_id)),
            kind: annotation_type(),
            body,
        }
    }

    /// Local identifier recovered from the stored `id`.
    pub fn local_id(&self) -> Option<&str> {
        extract_local_id(&self.id)
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// The single page every container carries as `first`.
///
/// Only `items` is needed on load; fields this server does not know are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotationPage {
    #[serde(rename = "type", default = "page_type")]
    pub kind: String,

    #[serde(default)]
    pub items: Vec<Annotation>,

    #[serde(rename = "partOf", default, skip_serializing_if = "String::is_empty")]
    pub part_of: String,

    #[serde(rename = "startIndex", default)]
    pub start_index: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn page_type() -> String {
    PAGE_TYPE.to_string()
}

/// An `AnnotationCollection` document.
///
/// Only `first` is required on load. Absent `label` and `last` stay
/// absent when the document is written back, and unknown top-level fields
/// round-trip through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Container {
    #[serde(rename = "@context", default = "JsonLdContext::container")]
    pub context: JsonLdContext,

    #[serde(default)]
    pub id: String,

    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,

    pub first: AnnotationPage,

    /// Page reference string. Static: only one page ever exists.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last: String,

    /// Always equal to `first.items.len()` when persisted.
    #[serde(default)]
    pub total: usize,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn collection_type() -> String {
    COLLECTION_TYPE.to_string()
}

impl Container {
    /// Build the canonical empty container.
    ///
    /// Uses `local_id` when supplied, otherwise a freshly generated token.
    pub fn skeleton(
        ctx: &RequestContext,
        local_id: Option<&str>,
        options: &ContainerOptions,
    ) -> Self {
        let local_id = match local_id {
            Some(id) => id.to_string(),
            None => generate_local_id(),
        };
        let id = mint(ctx, &local_id, None);
        let kind = non_empty(options.kind.as_deref()).unwrap_or(COLLECTION_TYPE);
        let label = non_empty(options.label.as_deref()).unwrap_or(DEFAULT_LABEL);

        Self {
            context: JsonLdContext::container(),
            last: format!("{id}?page0&desc=1"),
            first: AnnotationPage {
                kind: PAGE_TYPE.to_string(),
                items: Vec::new(),
                part_of: id.clone(),
                start_index: 0,
                extra: Map::new(),
            },
            id,
            kind: kind.to_string(),
            label: label.to_string(),
            total: 0,
            extra: Map::new(),
        }
    }

    /// Local identifier recovered from the container `id`.
    pub fn local_id(&self) -> Option<&str> {
        extract_local_id(&self.id)
    }

    pub fn items(&self) -> &[Annotation] {
        &self.first.items
    }

    /// Set `total` from the item count, whatever the stored value said.
    pub fn recount(&mut self) {
        self.total = self.first.items.len();
    }

    /// Append an annotation and re-establish `total`.
    pub fn push(&mut self, annotation: Annotation) {
        self.first.items.push(annotation);
        self.recount();
    }

    /// First annotation whose stored id reduces to `local_id`.
    pub fn find_annotation(&self, local_id: &str) -> Option<&Annotation> {
        self.first
            .items
            .iter()
            .find(|a| a.local_id() == Some(local_id))
    }

    /// Project a stored container onto the current request.
    ///
    /// Replaces the container `id` and every item `id` with IRIs minted from
    /// `ctx`. `partOf` and `last` are left as stored. Applying this twice
    /// with the same context gives the same document.
    pub fn rehydrated(mut self, ctx: &RequestContext, local_id: &str) -> Result<Self, ModelError> {
        self.id = mint(ctx, local_id, None);
        for (index, item) in self.first.items.iter_mut().enumerate() {
            let annotation_id = extract_local_id(&item.id)
                .ok_or_else(|| ModelError::MissingLocalId {
                    index,
                    id: item.id.clone(),
                })?
                .to_string();
            item.id = mint(ctx, local_id, Some(&annotation_id));
        }
        Ok(self)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
