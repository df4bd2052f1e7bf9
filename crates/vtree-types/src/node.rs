//! Virtual-tree values.
//!
//! A [`VNode`] is either a primitive (text, number, boolean, or the absent
//! marker) or a structured [`VElement`]. Virtual trees are immutable value
//! objects built fresh for every render; the reconciler only reads them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::tag::{Key, Tag};

/// Property map of a structured node. Keys are unique; order is irrelevant.
///
/// A property whose value is `null` is treated as absent.
pub type Props = BTreeMap<String, Value>;

/// A virtual-tree value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VNode {
    /// The absent marker. Never rendered as content.
    Null,
    /// Booleans are never rendered as content either.
    Bool(bool),
    Number(f64),
    Text(String),
    Element(VElement),
}

impl VNode {
    /// Shorthand for a text node.
    pub fn text(s: impl Into<String>) -> Self {
        VNode::Text(s.into())
    }

    /// The element payload, if this is a structured node.
    pub fn as_element(&self) -> Option<&VElement> {
        match self {
            VNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The explicit key of a structured node.
    pub fn key(&self) -> Option<&Key> {
        self.as_element().and_then(|el| el.key.as_ref())
    }

    /// Textual form of a primitive, as written into a host text node.
    ///
    /// Numbers use the shortest round-trip digits, in positional notation
    /// for decimal exponents from -7 to 20 and scientific notation
    /// (`1e+21`, `1e-7`) outside it. Negative zero is written `0`. Returns
    /// `None` for structured nodes.
    pub fn text_form(&self) -> Option<String> {
        match self {
            VNode::Null => Some(String::new()),
            VNode::Bool(b) => Some(b.to_string()),
            VNode::Number(n) => Some(number_text(*n)),
            VNode::Text(s) => Some(s.clone()),
            VNode::Element(_) => None,
        }
    }

    /// Parse a virtual tree from its JSON form.
    pub fn from_json_str(s: &str) -> Result<Self, TypeError> {
        serde_json::from_str(s).map_err(|e| TypeError::Parse(e.to_string()))
    }

    /// Serialize to the JSON form accepted by [`VNode::from_json_str`].
    pub fn to_json_string(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

impl From<&str> for VNode {
    fn from(s: &str) -> Self {
        VNode::Text(s.to_owned())
    }
}

impl From<String> for VNode {
    fn from(s: String) -> Self {
        VNode::Text(s)
    }
}

impl From<bool> for VNode {
    fn from(b: bool) -> Self {
        VNode::Bool(b)
    }
}

impl From<f64> for VNode {
    fn from(n: f64) -> Self {
        VNode::Number(n)
    }
}

impl From<i64> for VNode {
    fn from(n: i64) -> Self {
        VNode::Number(n as f64)
    }
}

impl From<i32> for VNode {
    fn from(n: i32) -> Self {
        VNode::Number(n.into())
    }
}

impl From<VElement> for VNode {
    fn from(el: VElement) -> Self {
        VNode::Element(el)
    }
}

impl<T: Into<VNode>> From<Option<T>> for VNode {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(VNode::Null, Into::into)
    }
}

/// A structured virtual node: tag, optional key, properties, and children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VElement {
    pub tag: Tag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<VNode>,
}

impl VElement {
    /// Create an element with no key, properties, or children.
    pub fn new(tag: impl Into<Tag>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    /// Set the explicit key.
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set one property.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Append one child.
    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children.
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<VNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Property value, treating `null` as absent.
    pub fn get_prop(&self, name: &str) -> Option<&Value> {
        self.props.get(name).filter(|v| !v.is_null())
    }
}

fn number_text(n: f64) -> String {
    if n == 0.0 {
        return "0".into();
    }
    if !n.is_finite() {
        return match n {
            n if n.is_nan() => "NaN".into(),
            n if n > 0.0 => "Infinity".into(),
            _ => "-Infinity".into(),
        };
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e2`.
    let sci = format!("{:e}", n.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return n.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return n.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let len = digits.len() as i32;
    // Position of the decimal point relative to the first digit.
    let point = exp + 1;

    let body = if len <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - len) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(-point as usize))
    } else {
        let (first, rest) = digits.split_at(1);
        let sign = if exp < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{first}e{sign}{}", exp.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", exp.abs())
        }
    };
    if n < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}
