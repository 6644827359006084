//! Wire-format document types for RSS3 v0.4.
//!
//! Field names and optionality follow the v0.4.0 schema exactly. Every
//! record keeps fields it does not recognise in an `extensions` map so that
//! re-serialising a document (for example to re-verify its signature)
//! reproduces what the producer signed.
//!
//! Identifiers are kept as plain strings on the wire types; their grammar is
//! checked by [`validate`](crate::validate) and they can be parsed on demand
//! with [`Uri::parse`](crate::uri::Uri::parse).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::uri::{ItemPlatform, LinkType, ListKind, Uri};

/// The proposal version this implementation produces.
pub const PROTOCOL_VERSION: &str = "v0.4.0";

/// Unknown fields, captured via `#[serde(flatten)]`.
pub type Extensions = BTreeMap<String, Value>;

// --- authenticity ------------------------------------------------------------

/// How a document asserts its integrity. A document is exactly one of the
/// two, never both and never neither.
///
/// On the wire this is the presence of either `signature` (with optional
/// `agents` and `controller`) or the literal `auto: true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AuthenticityFields", into = "AuthenticityFields")]
pub enum Authenticity {
    Signed(Signed),
    Auto,
}

impl Authenticity {
    pub fn is_auto(&self) -> bool {
        matches!(self, Authenticity::Auto)
    }

    pub fn signed(&self) -> Option<&Signed> {
        match self {
            Authenticity::Signed(s) => Some(s),
            Authenticity::Auto => None,
        }
    }
}

/// Signature fields of a signed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signed {
    /// Signature over the document's signing message (see
    /// [`canonical::signing_message`](crate::canonical::signing_message)).
    pub signature: String,
    /// Delegated signing keys authorised by the instance.
    pub agents: Option<Vec<Agent>>,
    /// Contract address indicating on-chain ownership of the file.
    pub controller: Option<String>,
}

impl Signed {
    /// Signature fields with an empty signature, ready for a signer to fill.
    pub fn pending() -> Self {
        Self::default()
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct AuthenticityFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agents: Option<Vec<Agent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    controller: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auto: Option<bool>,
}

impl TryFrom<AuthenticityFields> for Authenticity {
    type Error = String;

    fn try_from(f: AuthenticityFields) -> Result<Self, Self::Error> {
        match (f.signature, f.auto) {
            (_, Some(false)) => Err("auto must be the literal true when present".into()),
            (Some(_), Some(true)) => {
                Err("a document cannot be both auto-generated and signed".into())
            }
            (None, Some(true)) if f.agents.is_some() || f.controller.is_some() => {
                Err("auto-generated documents cannot carry agents or a controller".into())
            }
            (None, Some(true)) => Ok(Authenticity::Auto),
            (Some(signature), None) => Ok(Authenticity::Signed(Signed {
                signature,
                agents: f.agents,
                controller: f.controller,
            })),
            (None, None) => Err("a document must be either signed or auto-generated".into()),
        }
    }
}

impl From<Authenticity> for AuthenticityFields {
    fn from(a: Authenticity) -> Self {
        match a {
            Authenticity::Signed(s) => AuthenticityFields {
                signature: Some(s.signature),
                agents: s.agents,
                controller: s.controller,
                auto: None,
            },
            Authenticity::Auto => AuthenticityFields {
                signature: None,
                agents: None,
                controller: None,
                auto: Some(true),
            },
        }
    }
}

/// A delegated signing key. Delegation is one hop: agent → instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent public key generated by the client.
    pub pubkey: String,
    /// Signature by the agent key over the document's signing message.
    pub signature: String,
    /// Signature by the instance key over the authorization message.
    pub authorization: String,
    /// Name of the app using this agent, e.g. `Revery`.
    pub app: String,
    /// RFC 3339 expiry.
    pub date_expired: String,
    #[serde(flatten)]
    pub extensions: Extensions,
}

// --- shared records ----------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub attachment_type: Option<String>,
    /// Inline content. Mutually exclusive with `address`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// URI of third-party content. Mutually exclusive with `content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_in_bytes: Option<u64>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Transaction hash, URL, or other proof of origin.
    pub proof: String,
    pub platform: ItemPlatform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Unique id on the source platform, e.g. `<token_address>-<token_id>`.
    pub id: String,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocklist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlist: Option<Vec<String>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// One typed edge set in a [`LinksSet`]: the aggregated list is
/// authoritative, the custom list is the curator's alternate view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkListRef {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub identifier_custom: String,
    pub identifier: String,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Denormalised summary of an Index's or Item's link lists. Treated as a
/// cache: its targets may be stale or missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinksSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Vec<LinkListRef>>,
    pub identifier_back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl LinksSet {
    /// A links set with only the backlink list.
    pub fn new(identifier_back: impl Into<String>) -> Self {
        Self {
            identifiers: None,
            identifier_back: identifier_back.into(),
            filters: None,
            extensions: Extensions::new(),
        }
    }

    pub fn link_lists(&self) -> &[LinkListRef] {
        self.identifiers.as_deref().unwrap_or_default()
    }
}

// --- auto tags ---------------------------------------------------------------

/// Tags attached by automated mirroring pipelines. Any other tag is free
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoTag {
    GitcoinDonation,
    XdaiPoap,
    BscNft,
    EthereumNft,
    PolygonNft,
    MirrorEntry,
    TwitterTweet,
    MisskeyNote,
    JikeNode,
}

impl AutoTag {
    const ALL: [AutoTag; 9] = [
        AutoTag::GitcoinDonation,
        AutoTag::XdaiPoap,
        AutoTag::BscNft,
        AutoTag::EthereumNft,
        AutoTag::PolygonNft,
        AutoTag::MirrorEntry,
        AutoTag::TwitterTweet,
        AutoTag::MisskeyNote,
        AutoTag::JikeNode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AutoTag::GitcoinDonation => "gitcoin_donation",
            AutoTag::XdaiPoap => "xdai_poap",
            AutoTag::BscNft => "bsc_nft",
            AutoTag::EthereumNft => "ethereum_nft",
            AutoTag::PolygonNft => "polygon_nft",
            AutoTag::MirrorEntry => "mirror_entry",
            AutoTag::TwitterTweet => "twitter_tweet",
            AutoTag::MisskeyNote => "misskey_note",
            AutoTag::JikeNode => "jike_node",
        }
    }

    /// Asset tags are valid on both notes and assets; the remaining tags
    /// only on notes.
    pub fn is_asset_type(&self) -> bool {
        matches!(
            self,
            AutoTag::GitcoinDonation
                | AutoTag::XdaiPoap
                | AutoTag::BscNft
                | AutoTag::EthereumNft
                | AutoTag::PolygonNft
        )
    }

    /// Classify a free-form tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        AutoTag::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for AutoTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- index -------------------------------------------------------------------

/// A secondary account bound to the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub identifier: String,
    /// Signature by the account over the account binding message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatars: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<Account>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Pointer from an Index into one of its item lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemListRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_custom: Option<String>,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl ItemListRef {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier_custom: None,
            identifier: identifier.into(),
            filters: None,
            extensions: Extensions::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexItems {
    pub notes: ItemListRef,
    pub assets: ItemListRef,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Root document of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub version: String,
    pub identifier: String,
    pub date_created: String,
    pub date_updated: String,
    #[serde(flatten)]
    pub authenticity: Authenticity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    pub links: LinksSet,
    pub items: IndexItems,
    #[serde(flatten)]
    pub extensions: Extensions,
}

// --- items -------------------------------------------------------------------

/// A note or asset. Items inside a custom list are covered by the list's
/// signature; mirrored items carry `auto: true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub identifier: String,
    pub date_created: String,
    pub date_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_instance: Option<String>,
    pub links: LinksSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Item {
    pub fn is_auto(&self) -> bool {
        self.auto == Some(true)
    }

    /// The tags that name automated item kinds.
    pub fn auto_tags(&self) -> Vec<AutoTag> {
        self.tags
            .iter()
            .flatten()
            .filter_map(|t| AutoTag::from_tag(t))
            .collect()
    }
}

// --- lists -------------------------------------------------------------------

/// A page of items: custom (signed) or aggregated (auto).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemList {
    pub version: String,
    pub identifier: String,
    pub date_created: String,
    pub date_updated: String,
    #[serde(flatten)]
    pub authenticity: Authenticity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Item>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A page of instance or item URIs: custom links (signed), aggregated links
/// or backlinks (auto).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkList {
    pub version: String,
    pub identifier: String,
    pub date_created: String,
    pub date_updated: String,
    #[serde(flatten)]
    pub authenticity: Authenticity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<String>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

// --- document ----------------------------------------------------------------

/// Which document variant an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Index,
    Item,
    CustomItemList,
    AggregatedItemList,
    CustomLinkList,
    AggregatedLinkList,
    Backlinks,
}

/// Which authenticity modes a document kind admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticityRule {
    /// Must be signed.
    Signed,
    /// Must carry `auto: true`.
    Auto,
    /// Exactly one of the two.
    Either,
    /// Optional `auto: true`; otherwise covered by the enclosing list.
    Embedded,
}

impl DocumentKind {
    /// Discriminate by URI family.
    pub fn of(uri: &Uri) -> Self {
        match uri {
            Uri::Instance(_) => DocumentKind::Index,
            Uri::Item(_) => DocumentKind::Item,
            Uri::List(list) => match list.list_kind() {
                ListKind::CustomItems => DocumentKind::CustomItemList,
                ListKind::AggregatedItems => DocumentKind::AggregatedItemList,
                ListKind::CustomLinks => DocumentKind::CustomLinkList,
                ListKind::AggregatedLinks => DocumentKind::AggregatedLinkList,
                ListKind::Backlinks => DocumentKind::Backlinks,
            },
        }
    }

    pub fn authenticity_rule(&self) -> AuthenticityRule {
        match self {
            DocumentKind::Index => AuthenticityRule::Either,
            DocumentKind::Item => AuthenticityRule::Embedded,
            DocumentKind::CustomItemList | DocumentKind::CustomLinkList => AuthenticityRule::Signed,
            DocumentKind::AggregatedItemList
            | DocumentKind::AggregatedLinkList
            | DocumentKind::Backlinks => AuthenticityRule::Auto,
        }
    }

    pub fn is_list(&self) -> bool {
        !matches!(self, DocumentKind::Index | DocumentKind::Item)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::Index => "index",
            DocumentKind::Item => "item",
            DocumentKind::CustomItemList => "custom item list",
            DocumentKind::AggregatedItemList => "aggregated item list",
            DocumentKind::CustomLinkList => "custom link list",
            DocumentKind::AggregatedLinkList => "aggregated link list",
            DocumentKind::Backlinks => "backlink list",
        })
    }
}

/// Any RSS3 document, tagged by the URI family of its identifier.
///
/// Produced by [`validate`](crate::validate); serialises back to the wire
/// shape of the inner record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Index(Index),
    Item(Item),
    CustomItemList(ItemList),
    AggregatedItemList(ItemList),
    CustomLinkList(LinkList),
    AggregatedLinkList(LinkList),
    Backlinks(LinkList),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Index(_) => DocumentKind::Index,
            Document::Item(_) => DocumentKind::Item,
            Document::CustomItemList(_) => DocumentKind::CustomItemList,
            Document::AggregatedItemList(_) => DocumentKind::AggregatedItemList,
            Document::CustomLinkList(_) => DocumentKind::CustomLinkList,
            Document::AggregatedLinkList(_) => DocumentKind::AggregatedLinkList,
            Document::Backlinks(_) => DocumentKind::Backlinks,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Document::Index(d) => &d.identifier,
            Document::Item(d) => &d.identifier,
            Document::CustomItemList(d) | Document::AggregatedItemList(d) => &d.identifier,
            Document::CustomLinkList(d)
            | Document::AggregatedLinkList(d)
            | Document::Backlinks(d) => &d.identifier,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            Document::Index(d) => Some(&d.version),
            Document::Item(d) => d.version.as_deref(),
            Document::CustomItemList(d) | Document::AggregatedItemList(d) => Some(&d.version),
            Document::CustomLinkList(d)
            | Document::AggregatedLinkList(d)
            | Document::Backlinks(d) => Some(&d.version),
        }
    }

    pub fn date_created(&self) -> &str {
        match self {
            Document::Index(d) => &d.date_created,
            Document::Item(d) => &d.date_created,
            Document::CustomItemList(d) | Document::AggregatedItemList(d) => &d.date_created,
            Document::CustomLinkList(d)
            | Document::AggregatedLinkList(d)
            | Document::Backlinks(d) => &d.date_created,
        }
    }

    pub fn date_updated(&self) -> &str {
        match self {
            Document::Index(d) => &d.date_updated,
            Document::Item(d) => &d.date_updated,
            Document::CustomItemList(d) | Document::AggregatedItemList(d) => &d.date_updated,
            Document::CustomLinkList(d)
            | Document::AggregatedLinkList(d)
            | Document::Backlinks(d) => &d.date_updated,
        }
    }

    /// `None` for items, which have no authenticity of their own.
    pub fn authenticity(&self) -> Option<&Authenticity> {
        match self {
            Document::Index(d) => Some(&d.authenticity),
            Document::Item(_) => None,
            Document::CustomItemList(d) | Document::AggregatedItemList(d) => Some(&d.authenticity),
            Document::CustomLinkList(d)
            | Document::AggregatedLinkList(d)
            | Document::Backlinks(d) => Some(&d.authenticity),
        }
    }

    pub fn authenticity_mut(&mut self) -> Option<&mut Authenticity> {
        match self {
            Document::Index(d) => Some(&mut d.authenticity),
            Document::Item(_) => None,
            Document::CustomItemList(d) | Document::AggregatedItemList(d) => {
                Some(&mut d.authenticity)
            }
            Document::CustomLinkList(d)
            | Document::AggregatedLinkList(d)
            | Document::Backlinks(d) => Some(&mut d.authenticity),
        }
    }

    /// Whether the document is auto-generated (unsigned).
    pub fn is_auto(&self) -> bool {
        match self {
            Document::Item(item) => item.is_auto(),
            other => other.authenticity().is_some_and(Authenticity::is_auto),
        }
    }

    /// The links set of an Index or Item.
    pub fn links(&self) -> Option<&LinksSet> {
        match self {
            Document::Index(d) => Some(&d.links),
            Document::Item(d) => Some(&d.links),
            _ => None,
        }
    }

    /// The next page of a list document.
    pub fn identifier_next(&self) -> Option<&str> {
        match self {
            Document::CustomItemList(d) | Document::AggregatedItemList(d) => {
                d.identifier_next.as_deref()
            }
            Document::CustomLinkList(d)
            | Document::AggregatedLinkList(d)
            | Document::Backlinks(d) => d.identifier_next.as_deref(),
            Document::Index(_) | Document::Item(_) => None,
        }
    }

    /// Serialise to a JSON value in wire shape.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

// --- tests -------------------------------------------------------------------
