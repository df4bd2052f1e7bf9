//! Node-type identity ([`Tag`]) and explicit child identity ([`Key`]).

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The type identity of a structured virtual node.
///
/// Textual tags name host element types and compare case-insensitively.
/// Component tags are opaque markers issued by an authoring layer and only
/// ever compare by exact value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    /// A host element name such as `div` or `li`.
    Name(String),
    /// An opaque component-type marker.
    Component(u64),
}

impl Tag {
    /// Whether two tags denote the same node type.
    ///
    /// `Name` tags match ignoring ASCII case; everything else must be equal.
    pub fn matches(&self, other: &Tag) -> bool {
        match (self, other) {
            (Tag::Name(a), Tag::Name(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        }
    }

    /// The element name, if this is a textual tag.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Tag::Name(name) => Some(name),
            Tag::Component(_) => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Name(name) => f.write_str(name),
            Tag::Component(id) => write!(f, "component:{id}"),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::Name(name.to_owned())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Tag::Name(name)
    }
}

/// Caller-supplied stable identity for a child across reconciliations.
///
/// Matching goes through [`Key::identity`], so `Key::Int(1)` and
/// `Key::Str("1")` name the same child. The enum itself still compares by
/// variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// The string form children are matched on.
    pub fn identity(&self) -> Cow<'_, str> {
        match self {
            Key::Int(n) => Cow::Owned(n.to_string()),
            Key::Str(s) => Cow::Borrowed(s),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Key::Int(n.into())
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}
