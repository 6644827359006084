//! Core library for RSS3 v0.4 documents.
//!
//! This crate parses, validates and canonicalizes RSS3 documents, verifies
//! their instance and agent signatures, and walks the graph of lists and
//! links that ties them together. It performs no network I/O of its own:
//! the resolver is driven through a caller-supplied [`Fetch`].
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`uri`] | The `rss3://` grammar: [`Uri`], [`Instance`], [`ItemUri`], [`ListUri`] |
//! | [`types`] | Wire-format records and the [`Document`] enum |
//! | [`canonical`] | Canonical JSON and the signing messages built on it |
//! | [`validation`] | Structural and cross-field checking via [`validate`] |
//! | [`signing`] | Signature verification via [`verify`] and the [`Ed25519Signer`] producer |
//! | [`resolve`] | Async pagination and graph traversal via [`Resolver`] |
//! | [`config`] | [`ResolverConfig`] limits |
//! | [`render`] | Human-readable text rendering of documents and graphs |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use rss3::{validate, verify};
//!
//! let doc = validate(&bytes)?;
//! let verified = verify(&doc, &instance_public_key, chrono::Utc::now())?;
//! println!("{} signed by {:?}", doc.identifier(), verified.signer);
//! ```

pub mod canonical;
pub mod config;
pub mod render;
pub mod resolve;
pub mod signing;
pub mod types;
pub mod uri;
pub mod validation;

pub use canonical::{canonicalize, signing_message, CanonicalError};
pub use config::ResolverConfig;
pub use resolve::{
    cancellation, CancelHandle, CancelToken, DocumentGraph, Fetch, FetchError, ListView,
    MemoryFetch, Relation, ResolveError, Resolver,
};
pub use signing::{verify, Ed25519Signer, SignedBy, Verified, Verifier, VerifyError};
pub use types::{Authenticity, Document, DocumentKind, Index, Item, ItemList, LinkList};
pub use uri::{Instance, ItemUri, ListUri, Uri, UriError};
pub use validation::{validate, ValidationError};
