//! Shared helpers for the RSS3 conformance test suite.
//!
//! - [`spawn_host`] serves a [`MemoryFetch`] over loopback HTTP, mapping
//!   `GET /<path>` to the document at `rss3://<path>`.
//! - [`HttpFetch`] is a [`Fetch`] that reads documents back from such a
//!   host with `reqwest`, so the resolver is exercised over real TCP.
//! - [`Publisher`] builds and signs documents for one instance.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rss3::types::{
    Extensions, IndexItems, ItemListRef, LinkListRef, LinksSet, Signed, PROTOCOL_VERSION,
};
use rss3::uri::{parse_instance, ItemKind, LinkType, Subject, SCHEME};
use rss3::{Authenticity, Document, Ed25519Signer, Fetch, FetchError, Index, Item, ItemList, LinkList, MemoryFetch};

pub const DATE: &str = "2024-01-01T00:00:00Z";

/// Install a test-friendly `tracing` subscriber. Honours `RUST_LOG`;
/// defaults to `rss3=debug`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rss3=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// A running loopback host.
pub struct Host {
    /// e.g. `http://127.0.0.1:51234`
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl Host {
    /// Requests served so far, including 404s.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// An [`HttpFetch`] pointed at this host.
    pub fn fetcher(&self) -> HttpFetch {
        HttpFetch::new(&self.base_url)
    }
}

#[derive(Clone)]
struct HostState {
    store: Arc<MemoryFetch>,
    hits: Arc<AtomicUsize>,
}

/// Serve `store` on an ephemeral port of `127.0.0.1`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_host(store: Arc<MemoryFetch>) -> Host {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let hits = Arc::new(AtomicUsize::new(0));

    let router = Router::new().fallback(serve).with_state(HostState {
        store,
        hits: Arc::clone(&hits),
    });
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance host error");
    });

    Host {
        base_url: format!("http://{addr}"),
        hits,
    }
}

async fn serve(State(state): State<HostState>, uri: Uri) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let target = format!("{SCHEME}{}", uri.path().trim_start_matches('/'));
    match state.store.fetch(&target).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(FetchError::NotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => (StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
    }
}

// ---------------------------------------------------------------------------
// HttpFetch
// ---------------------------------------------------------------------------

/// Fetches `rss3://<path>` as `GET <base_url>/<path>`.
#[derive(Clone)]
pub struct HttpFetch {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetch {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |reason: String| FetchError::Transport {
            uri: uri.to_string(),
            reason,
        };
        let path = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| transport("not an rss3:// URI".into()))?;

        let resp = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(FetchError::NotFound(uri.to_string())),
            status if !status.is_success() => Err(transport(format!("HTTP {status}"))),
            _ => resp
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| transport(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// An instance with its own key, producing signed documents.
pub struct Publisher {
    pub instance: String,
    signer: Ed25519Signer,
}

impl Publisher {
    /// # Panics
    ///
    /// Panics if `instance` is not an instance URI.
    pub fn generate(instance: &str) -> Self {
        parse_instance(instance).expect("publisher needs an instance URI");
        Self {
            instance: instance.to_string(),
            signer: Ed25519Signer::new(SigningKey::generate(&mut OsRng)),
        }
    }

    pub fn public_key(&self) -> String {
        self.signer.public_key()
    }

    pub fn signer(&self) -> &Ed25519Signer {
        &self.signer
    }

    fn subject(&self) -> Subject {
        Subject::Instance(parse_instance(&self.instance).expect("checked in generate"))
    }

    /// A signed Index with a following edge (custom and aggregated),
    /// backlinks, notes (custom page 0 and aggregated) and assets.
    pub fn index(&self, name: &str) -> Document {
        let subject = self.subject();
        let instance = subject.instance().clone();
        let links = LinksSet {
            identifiers: Some(vec![LinkListRef {
                link_type: LinkType::Following,
                identifier_custom: subject.link_list(LinkType::Following, Some(0)).to_string(),
                identifier: subject.link_list(LinkType::Following, None).to_string(),
                extensions: Extensions::new(),
            }]),
            ..LinksSet::new(subject.backlinks().to_string())
        };
        let mut notes = ItemListRef::new(instance.item_list(ItemKind::Note, None).to_string());
        notes.identifier_custom = Some(instance.item_list(ItemKind::Note, Some(0)).to_string());

        let mut doc = Document::Index(Index {
            version: PROTOCOL_VERSION.into(),
            identifier: self.instance.clone(),
            date_created: DATE.into(),
            date_updated: DATE.into(),
            authenticity: Authenticity::Signed(Signed::pending()),
            profile: Some(rss3::types::Profile {
                name: Some(name.into()),
                ..Default::default()
            }),
            links,
            items: IndexItems {
                notes,
                assets: ItemListRef::new(instance.item_list(ItemKind::Asset, None).to_string()),
                extensions: Extensions::new(),
            },
            extensions: Extensions::new(),
        });
        self.sign(&mut doc);
        doc
    }

    pub fn note(&self, id: &str, summary: &str) -> Item {
        let identifier = format!("{}/note/{id}", self.instance);
        Item {
            version: None,
            identifier: identifier.clone(),
            date_created: DATE.into(),
            date_updated: DATE.into(),
            auto: None,
            identifier_instance: None,
            links: LinksSet::new(format!("{identifier}/list/backlinks")),
            tags: None,
            authors: vec![self.instance.clone()],
            title: None,
            summary: Some(summary.into()),
            attachments: None,
            metadata: None,
            extensions: Extensions::new(),
        }
    }

    /// A signed custom notes page.
    pub fn notes_page(&self, page: u64, next: Option<u64>, notes: Vec<Item>) -> Document {
        let instance = self.subject().instance().clone();
        let mut doc = Document::CustomItemList(ItemList {
            version: PROTOCOL_VERSION.into(),
            identifier: instance.item_list(ItemKind::Note, Some(page)).to_string(),
            date_created: DATE.into(),
            date_updated: DATE.into(),
            authenticity: Authenticity::Signed(Signed::pending()),
            identifier_next: next.map(|n| instance.item_list(ItemKind::Note, Some(n)).to_string()),
            list: Some(notes),
            extensions: Extensions::new(),
        });
        self.sign(&mut doc);
        doc
    }

    /// A link list page of this instance. Custom pages are signed;
    /// aggregated ones are `auto`.
    pub fn link_page(&self, link_type: LinkType, page: Option<u64>, targets: &[&str]) -> Document {
        let list = LinkList {
            version: PROTOCOL_VERSION.into(),
            identifier: self.subject().link_list(link_type, page).to_string(),
            date_created: DATE.into(),
            date_updated: DATE.into(),
            authenticity: match page {
                Some(_) => Authenticity::Signed(Signed::pending()),
                None => Authenticity::Auto,
            },
            identifier_next: None,
            list: Some(targets.iter().map(|t| t.to_string()).collect()),
            extensions: Extensions::new(),
        };
        let mut doc = match page {
            Some(_) => Document::CustomLinkList(list),
            None => Document::AggregatedLinkList(list),
        };
        if page.is_some() {
            self.sign(&mut doc);
        }
        doc
    }

    /// Sign `doc` as an agent of this instance for `app`.
    pub fn sign_with_agent(
        &self,
        doc: &mut Document,
        agent: &Ed25519Signer,
        app: &str,
        expires: DateTime<Utc>,
    ) {
        let authorization = self
            .signer
            .authorize_agent(app, &self.instance, &agent.public_key());
        agent
            .sign_as_agent(doc, app, authorization, expires)
            .expect("agent signing");
    }

    fn sign(&self, doc: &mut Document) {
        self.signer.sign_document(doc).expect("instance signing");
    }
}

/// Publish `doc` at its identifier.
///
/// # Panics
///
/// Panics if the document cannot be serialised.
pub fn publish(store: &MemoryFetch, doc: &Document) {
    store.insert_document(doc).expect("serialise document");
}
