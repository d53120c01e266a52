//! Document model for a minimal W3C Web Annotation Protocol server.
//!
//! Clients create *containers* (`AnnotationCollection` documents) and append
//! *annotations* (arbitrary JSON-LD) to them. This crate holds the part of
//! that system with real invariants: how identifiers are minted, how stored
//! documents are re-projected onto the host a request arrived at, and how a
//! container's single page stays consistent as it grows. It performs no I/O;
//! persistence and HTTP live in `elucidate-node`.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`identity`] | IRI minting and local-id extraction: [`RequestContext`], [`mint`], [`extract_local_id`] |
//! | [`model`] | JSON-LD shapes: [`Container`], [`Annotation`], [`AnnotationBody`] |
//! | [`error`] | [`IdError`], [`ModelError`] |
//!
//! # Quick start
//!
//! ```rust
//! use elucidate::{Annotation, AnnotationBody, Container, ContainerOptions, RequestContext};
//!
//! let ctx = RequestContext::new("http", "localhost:4242");
//! let mut container = Container::skeleton(&ctx, Some("canvas1"), &ContainerOptions::default());
//! container.push(Annotation::skeleton(&ctx, "canvas1", AnnotationBody::default()));
//! assert_eq!(container.total, 1);
//!
//! // Served through a different host, the same document gets new IRIs.
//! let other = RequestContext::new("https", "annotations.example");
//! let served = container.rehydrated(&other, "canvas1").unwrap();
//! assert_eq!(served.id, "https://annotations.example/w3c/annotation/canvas1/");
//! ```

pub mod error;
pub mod identity;
pub mod model;

pub use error::{IdError, ModelError};
pub use identity::{
    extract_local_id, generate_local_id, mint, validate_local_id, RequestContext, ANNOTATION_ROOT,
};
pub use model::{
    Annotation, AnnotationBody, AnnotationPage, Container, ContainerOptions, JsonLdContext,
    ANNO_CONTEXT, LDP_CONTEXT,
};
