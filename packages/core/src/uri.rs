//! RSS3 URI grammar: instances, items and lists.
//!
//! Every document in the protocol is addressed by an `rss3://` URI, and the
//! shape of that URI decides what kind of document it names. This module
//! parses and builds those URIs. It is pure string algebra: no I/O, no
//! normalisation. Building is the exact inverse of parsing, so
//! `Uri::parse(s)?.to_string() == s` for every well-formed input.
//!
//! # Grammar
//!
//! ```text
//! InstanceURI           = "rss3://" Instance
//! Instance              = "account:" identity "@" AccountPlatform
//!                       | ("asset" | "note") ":" uniqueID "@" ItemPlatform
//!                       | "external:" authority "@" scheme
//! ItemURI               = InstanceURI "/" ("note" | "asset") "/" id
//! CustomItemListURI     = InstanceURI "/list/" ("notes" | "assets") "/" index
//! AggregatedItemListURI = InstanceURI "/list/" ("notes" | "assets")
//! CustomLinkListURI     = (InstanceURI | ItemURI) "/list/links/" LinkType "/" index
//! AggregatedLinkListURI = (InstanceURI | ItemURI) "/list/links/" LinkType
//! BacklinkListURI       = (InstanceURI | ItemURI) "/list/backlinks"
//! ```
//!
//! The platform is separated from the identity by the **last** `@`, so
//! identities that themselves contain `@` (federated handles) parse safely.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The URI scheme shared by every RSS3 identifier.
pub const SCHEME: &str = "rss3://";

/// Errors returned when a string does not match the RSS3 URI grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("missing \"rss3://\" scheme in {0:?}")]
    MissingScheme(String),

    #[error("malformed instance {instance:?}: {reason}")]
    MalformedInstance { instance: String, reason: String },

    #[error("unknown platform {platform:?} for {prefix} instance")]
    UnknownPlatform {
        prefix: &'static str,
        platform: String,
    },

    #[error("malformed path {path:?} in {uri:?}")]
    MalformedPath { uri: String, path: String },

    #[error("invalid list index {0:?}; expected a non-negative integer without leading zeros")]
    InvalidIndex(String),

    #[error("unknown link type {0:?}; expected one of: following, comment, like, collection, forward")]
    UnknownLinkType(String),

    #[error("expected {expected}, got {uri:?}")]
    WrongKind { expected: &'static str, uri: String },
}

// --- word lists --------------------------------------------------------------

/// Platforms an account instance can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountPlatform {
    Evm,
    Solana,
    Flow,
    Twitter,
    Misskey,
    Jike,
    Playstation,
    Github,
}

impl AccountPlatform {
    pub const ALL: [AccountPlatform; 8] = [
        AccountPlatform::Evm,
        AccountPlatform::Solana,
        AccountPlatform::Flow,
        AccountPlatform::Twitter,
        AccountPlatform::Misskey,
        AccountPlatform::Jike,
        AccountPlatform::Playstation,
        AccountPlatform::Github,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountPlatform::Evm => "evm",
            AccountPlatform::Solana => "solana",
            AccountPlatform::Flow => "flow",
            AccountPlatform::Twitter => "twitter",
            AccountPlatform::Misskey => "misskey",
            AccountPlatform::Jike => "jike",
            AccountPlatform::Playstation => "playstation",
            AccountPlatform::Github => "github",
        }
    }
}

impl fmt::Display for AccountPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountPlatform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountPlatform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown account platform {:?}; expected one of: \
                     evm, solana, flow, twitter, misskey, jike, playstation, github",
                    s
                )
            })
    }
}

/// Platforms an item can originate from: every account platform plus the
/// `rss3` aggregator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemPlatform {
    Evm,
    Solana,
    Flow,
    Twitter,
    Misskey,
    Jike,
    Playstation,
    Github,
    Rss3,
}

impl ItemPlatform {
    /// The account platform this item platform corresponds to, if any.
    pub fn as_account(&self) -> Option<AccountPlatform> {
        match self {
            ItemPlatform::Evm => Some(AccountPlatform::Evm),
            ItemPlatform::Solana => Some(AccountPlatform::Solana),
            ItemPlatform::Flow => Some(AccountPlatform::Flow),
            ItemPlatform::Twitter => Some(AccountPlatform::Twitter),
            ItemPlatform::Misskey => Some(AccountPlatform::Misskey),
            ItemPlatform::Jike => Some(AccountPlatform::Jike),
            ItemPlatform::Playstation => Some(AccountPlatform::Playstation),
            ItemPlatform::Github => Some(AccountPlatform::Github),
            ItemPlatform::Rss3 => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self.as_account() {
            Some(p) => p.as_str(),
            None => "rss3",
        }
    }
}

impl From<AccountPlatform> for ItemPlatform {
    fn from(p: AccountPlatform) -> Self {
        match p {
            AccountPlatform::Evm => ItemPlatform::Evm,
            AccountPlatform::Solana => ItemPlatform::Solana,
            AccountPlatform::Flow => ItemPlatform::Flow,
            AccountPlatform::Twitter => ItemPlatform::Twitter,
            AccountPlatform::Misskey => ItemPlatform::Misskey,
            AccountPlatform::Jike => ItemPlatform::Jike,
            AccountPlatform::Playstation => ItemPlatform::Playstation,
            AccountPlatform::Github => ItemPlatform::Github,
        }
    }
}

impl fmt::Display for ItemPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemPlatform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "rss3" {
            return Ok(ItemPlatform::Rss3);
        }
        s.parse::<AccountPlatform>()
            .map(ItemPlatform::from)
            .map_err(|_| {
                format!(
                    "unknown item platform {:?}; expected one of: evm, solana, flow, \
                     twitter, misskey, jike, playstation, github, rss3",
                    s
                )
            })
    }
}

/// The typed edge a link list represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Following,
    Comment,
    Like,
    Collection,
    Forward,
}

impl LinkType {
    pub const ALL: [LinkType; 5] = [
        LinkType::Following,
        LinkType::Comment,
        LinkType::Like,
        LinkType::Collection,
        LinkType::Forward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Following => "following",
            LinkType::Comment => "comment",
            LinkType::Like => "like",
            LinkType::Collection => "collection",
            LinkType::Forward => "forward",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LinkType {
    type Err = UriError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UriError::UnknownLinkType(s.to_string()))
    }
}

/// Whether an item is a note (content) or an asset (owned object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Note,
    Asset,
}

impl ItemKind {
    /// Singular segment used in item URIs and item instances: `note`, `asset`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Note => "note",
            ItemKind::Asset => "asset",
        }
    }

    /// Plural segment used in item list URIs: `notes`, `assets`.
    pub fn list_segment(&self) -> &'static str {
        match self {
            ItemKind::Note => "notes",
            ItemKind::Asset => "assets",
        }
    }

    fn from_segment(s: &str) -> Option<Self> {
        match s {
            "note" => Some(ItemKind::Note),
            "asset" => Some(ItemKind::Asset),
            _ => None,
        }
    }

    fn from_list_segment(s: &str) -> Option<Self> {
        match s {
            "notes" => Some(ItemKind::Note),
            "assets" => Some(ItemKind::Asset),
            _ => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- instances ---------------------------------------------------------------

/// Which of the three instance families an [`Instance`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Account,
    Item,
    External,
}

/// An identity scoped to a platform. The owner of an Index document.
///
/// `External` keeps its authority exactly as written (percent-encoded) so
/// that parsing and building round-trip byte for byte. Use
/// [`Instance::decoded_authority`] to read it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instance {
    /// `account:<identity>@<platform>`
    Account {
        identity: String,
        platform: AccountPlatform,
    },
    /// `note:<id>@<platform>` or `asset:<id>@<platform>`
    Item {
        kind: ItemKind,
        unique_id: String,
        platform: ItemPlatform,
    },
    /// `external:<authority>@<scheme>`, e.g. `external:diygod.me%2Fatom.xml@https`
    External { authority: String, scheme: String },
}

impl Instance {
    pub fn account(identity: impl Into<String>, platform: AccountPlatform) -> Self {
        Instance::Account {
            identity: identity.into(),
            platform,
        }
    }

    pub fn item(kind: ItemKind, unique_id: impl Into<String>, platform: ItemPlatform) -> Self {
        Instance::Item {
            kind,
            unique_id: unique_id.into(),
            platform,
        }
    }

    /// Build an external instance from an *unencoded* authority such as
    /// `diygod.me/atom.xml`. The authority is percent-encoded.
    pub fn external(authority: &str, scheme: impl Into<String>) -> Self {
        Instance::External {
            authority: urlencoding::encode(authority).into_owned(),
            scheme: scheme.into(),
        }
    }

    pub fn kind(&self) -> InstanceKind {
        match self {
            Instance::Account { .. } => InstanceKind::Account,
            Instance::Item { .. } => InstanceKind::Item,
            Instance::External { .. } => InstanceKind::External,
        }
    }

    /// The platform, for account and item instances. External instances
    /// carry a URL scheme instead.
    pub fn platform(&self) -> Option<ItemPlatform> {
        match self {
            Instance::Account { platform, .. } => Some((*platform).into()),
            Instance::Item { platform, .. } => Some(*platform),
            Instance::External { .. } => None,
        }
    }

    /// The identity part: account identity, item unique ID, or the encoded
    /// external authority.
    pub fn id(&self) -> &str {
        match self {
            Instance::Account { identity, .. } => identity,
            Instance::Item { unique_id, .. } => unique_id,
            Instance::External { authority, .. } => authority,
        }
    }

    /// The percent-decoded authority of an external instance.
    pub fn decoded_authority(&self) -> Option<Cow<'_, str>> {
        match self {
            Instance::External { authority, .. } => urlencoding::decode(authority).ok(),
            _ => None,
        }
    }

    /// The full `rss3://` URI of this instance.
    pub fn to_uri(&self) -> String {
        format!("{SCHEME}{self}")
    }

    /// The item list of this instance: aggregated when `index` is `None`,
    /// otherwise the custom page at `index`.
    pub fn item_list(&self, kind: ItemKind, index: Option<u64>) -> ListUri {
        ListUri::Items {
            instance: self.clone(),
            kind,
            index,
        }
    }

    /// Parse a bare instance (no `rss3://` prefix).
    pub fn parse(s: &str) -> Result<Self, UriError> {
        let malformed = |reason: &str| UriError::MalformedInstance {
            instance: s.to_string(),
            reason: reason.to_string(),
        };

        let (prefix, rest) = s
            .split_once(':')
            .ok_or_else(|| malformed("missing ':' after the instance prefix"))?;
        let at = rest
            .rfind('@')
            .ok_or_else(|| malformed("missing '@' before the platform"))?;
        let (id, platform) = (&rest[..at], &rest[at + 1..]);

        if id.is_empty() {
            return Err(malformed("empty identity"));
        }
        if platform.is_empty() {
            return Err(malformed("empty platform"));
        }
        if id.contains('/') || id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(malformed("identity contains '/', whitespace, or control characters"));
        }

        match prefix {
            "account" => {
                let platform = platform.parse::<AccountPlatform>().map_err(|_| {
                    UriError::UnknownPlatform {
                        prefix: "account",
                        platform: platform.to_string(),
                    }
                })?;
                Ok(Instance::account(id, platform))
            }
            "note" | "asset" => {
                let kind = ItemKind::from_segment(prefix).ok_or_else(|| malformed("bad prefix"))?;
                let platform =
                    platform
                        .parse::<ItemPlatform>()
                        .map_err(|_| UriError::UnknownPlatform {
                            prefix: kind.as_str(),
                            platform: platform.to_string(),
                        })?;
                Ok(Instance::item(kind, id, platform))
            }
            "external" => {
                if id.contains('@') {
                    return Err(malformed("external authority must percent-encode '@'"));
                }
                if !is_percent_encoded(id) || urlencoding::decode(id).is_err() {
                    return Err(malformed("external authority is not valid percent-encoded UTF-8"));
                }
                if !is_url_scheme(platform) {
                    return Err(malformed("external scheme is not a valid URL scheme"));
                }
                Ok(Instance::External {
                    authority: id.to_string(),
                    scheme: platform.to_string(),
                })
            }
            _ => Err(malformed(
                "prefix must be one of: account, note, asset, external",
            )),
        }
    }
}

/// Formats the bare instance, without the `rss3://` scheme.
impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instance::Account { identity, platform } => write!(f, "account:{identity}@{platform}"),
            Instance::Item {
                kind,
                unique_id,
                platform,
            } => write!(f, "{kind}:{unique_id}@{platform}"),
            Instance::External { authority, scheme } => write!(f, "external:{authority}@{scheme}"),
        }
    }
}

// --- items and subjects ------------------------------------------------------

/// `InstanceURI "/" ("note" | "asset") "/" id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemUri {
    pub instance: Instance,
    pub kind: ItemKind,
    pub id: String,
}

impl ItemUri {
    pub fn new(instance: Instance, kind: ItemKind, id: impl Into<String>) -> Self {
        Self {
            instance,
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ItemUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}/{}", self.instance, self.kind, self.id)
    }
}

/// The owner of a link list or backlink list: an instance or an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Instance(Instance),
    Item(ItemUri),
}

impl Subject {
    pub fn instance(&self) -> &Instance {
        match self {
            Subject::Instance(i) => i,
            Subject::Item(item) => &item.instance,
        }
    }

    /// The link list of this subject: aggregated when `index` is `None`,
    /// otherwise the custom page at `index`.
    pub fn link_list(&self, link_type: LinkType, index: Option<u64>) -> ListUri {
        ListUri::Links {
            subject: self.clone(),
            link_type,
            index,
        }
    }

    pub fn backlinks(&self) -> ListUri {
        ListUri::Backlinks {
            subject: self.clone(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Instance(i) => write!(f, "{SCHEME}{i}"),
            Subject::Item(item) => item.fmt(f),
        }
    }
}

// --- lists -------------------------------------------------------------------

/// The five list URI shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    CustomItems,
    AggregatedItems,
    CustomLinks,
    AggregatedLinks,
    Backlinks,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ListKind::CustomItems => "custom item list",
            ListKind::AggregatedItems => "aggregated item list",
            ListKind::CustomLinks => "custom link list",
            ListKind::AggregatedLinks => "aggregated link list",
            ListKind::Backlinks => "backlink list",
        })
    }
}

/// A list URI. `index` distinguishes custom pages (`Some`) from the
/// aggregated view (`None`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListUri {
    Items {
        instance: Instance,
        kind: ItemKind,
        index: Option<u64>,
    },
    Links {
        subject: Subject,
        link_type: LinkType,
        index: Option<u64>,
    },
    Backlinks {
        subject: Subject,
    },
}

impl ListUri {
    pub fn list_kind(&self) -> ListKind {
        match self {
            ListUri::Items { index: Some(_), .. } => ListKind::CustomItems,
            ListUri::Items { index: None, .. } => ListKind::AggregatedItems,
            ListUri::Links { index: Some(_), .. } => ListKind::CustomLinks,
            ListUri::Links { index: None, .. } => ListKind::AggregatedLinks,
            ListUri::Backlinks { .. } => ListKind::Backlinks,
        }
    }

    pub fn index(&self) -> Option<u64> {
        match self {
            ListUri::Items { index, .. } | ListUri::Links { index, .. } => *index,
            ListUri::Backlinks { .. } => None,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.index().is_some()
    }

    /// The same list without its page index.
    pub fn base(&self) -> ListUri {
        self.page(None)
    }

    /// The same list at another page index. Backlink lists have no pages.
    pub fn page(&self, index: Option<u64>) -> ListUri {
        match self {
            ListUri::Items { instance, kind, .. } => ListUri::Items {
                instance: instance.clone(),
                kind: *kind,
                index,
            },
            ListUri::Links {
                subject, link_type, ..
            } => ListUri::Links {
                subject: subject.clone(),
                link_type: *link_type,
                index,
            },
            ListUri::Backlinks { subject } => ListUri::Backlinks {
                subject: subject.clone(),
            },
        }
    }

    /// The instance or item URI the list hangs off.
    pub fn owner_uri(&self) -> String {
        match self {
            ListUri::Items { instance, .. } => instance.to_uri(),
            ListUri::Links { subject, .. } | ListUri::Backlinks { subject } => subject.to_string(),
        }
    }

    pub fn instance(&self) -> &Instance {
        match self {
            ListUri::Items { instance, .. } => instance,
            ListUri::Links { subject, .. } | ListUri::Backlinks { subject } => subject.instance(),
        }
    }
}

impl fmt::Display for ListUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListUri::Items {
                instance,
                kind,
                index,
            } => {
                write!(f, "{SCHEME}{instance}/list/{}", kind.list_segment())?;
                if let Some(i) = index {
                    write!(f, "/{i}")?;
                }
                Ok(())
            }
            ListUri::Links {
                subject,
                link_type,
                index,
            } => {
                write!(f, "{subject}/list/links/{link_type}")?;
                if let Some(i) = index {
                    write!(f, "/{i}")?;
                }
                Ok(())
            }
            ListUri::Backlinks { subject } => write!(f, "{subject}/list/backlinks"),
        }
    }
}

// --- any URI -----------------------------------------------------------------

/// Any well-formed RSS3 URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Uri {
    Instance(Instance),
    Item(ItemUri),
    List(ListUri),
}

impl Uri {
    /// Parse any RSS3 URI and classify it.
    pub fn parse(s: &str) -> Result<Self, UriError> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| UriError::MissingScheme(s.to_string()))?;

        let (instance_part, path) = match rest.split_once('/') {
            Some((i, p)) => (i, Some(p)),
            None => (rest, None),
        };
        let instance = Instance::parse(instance_part)?;

        let Some(path) = path else {
            return Ok(Uri::Instance(instance));
        };

        let bad_path = || UriError::MalformedPath {
            uri: s.to_string(),
            path: path.to_string(),
        };

        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(bad_path());
        }

        match segments.as_slice() {
            ["list", list @ ..] => {
                parse_list(Subject::Instance(instance), list, true, &bad_path).map(Uri::List)
            }
            [kind, id] => {
                let kind = ItemKind::from_segment(kind).ok_or_else(bad_path)?;
                Ok(Uri::Item(ItemUri::new(instance, kind, *id)))
            }
            [kind, id, "list", list @ ..] => {
                let kind = ItemKind::from_segment(kind).ok_or_else(bad_path)?;
                let subject = Subject::Item(ItemUri::new(instance, kind, *id));
                parse_list(subject, list, false, &bad_path).map(Uri::List)
            }
            _ => Err(bad_path()),
        }
    }

    /// The instance every URI is ultimately rooted at.
    pub fn instance(&self) -> &Instance {
        match self {
            Uri::Instance(i) => i,
            Uri::Item(item) => &item.instance,
            Uri::List(list) => list.instance(),
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uri::Instance(i) => write!(f, "{SCHEME}{i}"),
            Uri::Item(item) => item.fmt(f),
            Uri::List(list) => list.fmt(f),
        }
    }
}

impl std::str::FromStr for Uri {
    type Err = UriError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

/// Parse an `InstanceURI` (`rss3://<instance>` with no path).
pub fn parse_instance(s: &str) -> Result<Instance, UriError> {
    match Uri::parse(s)? {
        Uri::Instance(i) => Ok(i),
        _ => Err(UriError::WrongKind {
            expected: "an instance URI",
            uri: s.to_string(),
        }),
    }
}

/// Parse an `ItemURI`.
pub fn parse_item_uri(s: &str) -> Result<ItemUri, UriError> {
    match Uri::parse(s)? {
        Uri::Item(item) => Ok(item),
        _ => Err(UriError::WrongKind {
            expected: "an item URI",
            uri: s.to_string(),
        }),
    }
}

/// Parse any of the five list URI shapes.
pub fn parse_list_uri(s: &str) -> Result<ListUri, UriError> {
    match Uri::parse(s)? {
        Uri::List(list) => Ok(list),
        _ => Err(UriError::WrongKind {
            expected: "a list URI",
            uri: s.to_string(),
        }),
    }
}

// --- helpers -----------------------------------------------------------------

fn parse_list(
    subject: Subject,
    segments: &[&str],
    allow_items: bool,
    bad_path: &dyn Fn() -> UriError,
) -> Result<ListUri, UriError> {
    match segments {
        ["backlinks"] => Ok(ListUri::Backlinks { subject }),
        ["links", link_type] => Ok(ListUri::Links {
            subject,
            link_type: link_type.parse()?,
            index: None,
        }),
        ["links", link_type, index] => Ok(ListUri::Links {
            subject,
            link_type: link_type.parse()?,
            index: Some(parse_index(index)?),
        }),
        [kind, rest @ ..] if allow_items && rest.len() <= 1 => {
            let kind = ItemKind::from_list_segment(kind).ok_or_else(bad_path)?;
            let index = rest.first().map(|i| parse_index(i)).transpose()?;
            let Subject::Instance(instance) = subject else {
                return Err(bad_path());
            };
            Ok(ListUri::Items {
                instance,
                kind,
                index,
            })
        }
        _ => Err(bad_path()),
    }
}

fn parse_index(s: &str) -> Result<u64, UriError> {
    let canonical = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'));
    if !canonical {
        return Err(UriError::InvalidIndex(s.to_string()));
    }
    s.parse::<u64>()
        .map_err(|_| UriError::InvalidIndex(s.to_string()))
}

/// Every `%` must introduce two hex digits.
fn is_percent_encoded(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

/// RFC 3986: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_url_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
