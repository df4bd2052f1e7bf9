//! Patch intents and the patch applier.
//!
//! The applier is the only part of the engine that mutates the host tree.
//! Every mutation the differ decides on is expressed as one of the three
//! [`Patch`] variants.

use std::borrow::Cow;

use tracing::trace;
use vtree_host::HostTree;
use vtree_types::{VElement, VNode, Value};

use crate::classify::should_render;
use crate::differ::Reconciler;
use crate::error::DiffResult;
use crate::remove::remove_subtree;

/// A single mutation intent, built and consumed within one diff call.
#[derive(Debug)]
pub enum Patch<'a, N> {
    /// Build `node` from scratch under `parent`, tearing down `existing`
    /// first if given.
    Replace {
        node: &'a VNode,
        parent: &'a N,
        existing: Option<&'a N>,
    },
    /// Rewrite the content of the text node `target`.
    Text {
        node: &'a VNode,
        old: &'a VNode,
        target: &'a N,
    },
    /// Change one property of `target`. `new == None` removes it.
    Property {
        target: &'a N,
        name: &'a str,
        old: Option<&'a Value>,
        new: Option<&'a Value>,
    },
}

/// Values that never render are written as empty text.
fn normalize(node: &VNode) -> Cow<'_, VNode> {
    if should_render(node) {
        Cow::Borrowed(node)
    } else {
        Cow::Owned(VNode::Text(String::new()))
    }
}

impl Reconciler {
    /// Apply one patch and return the host node that now represents it.
    pub fn apply_patch<H: HostTree>(
        &self,
        host: &mut H,
        patch: Patch<'_, H::Node>,
    ) -> DiffResult<H::Node> {
        match patch {
            Patch::Replace {
                node,
                parent,
                existing,
            } => {
                if let Some(existing) = existing {
                    trace!(node = ?existing, "tearing down replaced subtree");
                    remove_subtree(host, existing)?;
                }
                self.create(host, &normalize(node), parent)
            }
            Patch::Text { node, old, target } => {
                let text = normalize(node).text_form().unwrap_or_default();
                trace!(node = ?target, ?old, new = %text, "text update");
                host.set_text(target, &text)?;
                Ok(target.clone())
            }
            Patch::Property {
                target,
                name,
                old,
                new,
            } => {
                trace!(node = ?target, name, ?old, ?new, "property update");
                host.reflect_property(target, name, old, new)?;
                Ok(target.clone())
            }
        }
    }

    /// Build a fresh host subtree for `node` and append it to `parent`.
    ///
    /// Each structured node is filled with its children before it is
    /// attached. Open nodes are kept on an explicit stack.
    fn create<H: HostTree>(
        &self,
        host: &mut H,
        node: &VNode,
        parent: &H::Node,
    ) -> DiffResult<H::Node> {
        let VNode::Element(el) = node else {
            let created = host.create_text(&node.text_form().unwrap_or_default())?;
            host.append_child(parent, &created)?;
            return Ok(created);
        };

        let top = self.create_element(host, el)?;
        let mut open = vec![(top.clone(), el.children.iter())];
        while let Some((current, mut children)) = open.pop() {
            match children.find(|c| should_render(c)) {
                Some(VNode::Element(child)) => {
                    let created = self.create_element(host, child)?;
                    open.push((current, children));
                    open.push((created, child.children.iter()));
                }
                Some(value) => {
                    let created = host.create_text(&value.text_form().unwrap_or_default())?;
                    host.append_child(&current, &created)?;
                    open.push((current, children));
                }
                None => {
                    let target = open.last().map_or(parent, |(up, _)| up);
                    host.append_child(target, &current)?;
                }
            }
        }
        Ok(top)
    }

    /// A detached structured node with its non-null properties set.
    fn create_element<H: HostTree>(&self, host: &mut H, el: &VElement) -> DiffResult<H::Node> {
        trace!(tag = %el.tag, "creating host node");
        let created = host.create_node(&el.tag)?;
        for (name, value) in el.props.iter().filter(|(_, v)| !v.is_null()) {
            self.apply_patch(
                host,
                Patch::Property {
                    target: &created,
                    name,
                    old: None,
                    new: Some(value),
                },
            )?;
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vtree_host::{HostError, MemoryHost, Mutation};
    use vtree_types::Tag;

    use crate::error::DiffError;

    fn setup() -> (Reconciler, MemoryHost, vtree_host::NodeId) {
        let mut host = MemoryHost::new();
        let root = host.create_root();
        (Reconciler::default(), host, root)
    }

    #[test]
    fn replace_builds_full_subtree() {
        let (r, mut host, root) = setup();
        let tree: VNode = VElement::new("ul")
            .prop("id", "list")
            .child(VElement::new("li").child("one"))
            .child(VElement::new("li").child(2))
            .into();

        let node = r
            .apply_patch(
                &mut host,
                Patch::Replace {
                    node: &tree,
                    parent: &root,
                    existing: None,
                },
            )
            .unwrap();

        assert_eq!(host.parent(&node), Some(root));
        assert_eq!(
            host.to_markup(root),
            r#"<ul id="list"><li>one</li><li>2</li></ul>"#
        );
    }

    #[test]
    fn replace_skips_unrenderable_children_and_null_props() {
        let (r, mut host, root) = setup();
        let tree: VNode = VElement::new("p")
            .prop("hidden", Value::Null)
            .children([VNode::Null, VNode::from(false), VNode::from("x"), VNode::from(true)])
            .into();

        let node = r
            .apply_patch(
                &mut host,
                Patch::Replace {
                    node: &tree,
                    parent: &root,
                    existing: None,
                },
            )
            .unwrap();

        assert_eq!(host.child_count(&node), 1);
        assert_eq!(host.stats().properties_set, 0);
        assert_eq!(host.to_markup(root), "<p>x</p>");
    }

    #[test]
    fn replace_of_unrenderable_value_creates_empty_text() {
        let (r, mut host, root) = setup();
        let node = r
            .apply_patch(
                &mut host,
                Patch::Replace {
                    node: &VNode::Null,
                    parent: &root,
                    existing: None,
                },
            )
            .unwrap();
        assert_eq!(host.text_content(&node).as_deref(), Some(""));
    }

    #[test]
    fn replace_tears_down_existing_first() {
        let (r, mut host, root) = setup();
        let old: VNode = VElement::new("span").child("old").into();
        let old_node = r
            .apply_patch(
                &mut host,
                Patch::Replace {
                    node: &old,
                    parent: &root,
                    existing: None,
                },
            )
            .unwrap();
        host.clear_journal();

        let new = VNode::from("fresh");
        let node = r
            .apply_patch(
                &mut host,
                Patch::Replace {
                    node: &new,
                    parent: &root,
                    existing: Some(&old_node),
                },
            )
            .unwrap();

        assert_ne!(node, old_node);
        assert_eq!(host.parent(&old_node), None);
        assert_eq!(host.child_nodes(&root), vec![node]);
        assert!(matches!(host.journal()[0], Mutation::Remove { .. }));
    }

    #[test]
    fn text_patch_keeps_identity() {
        let (r, mut host, root) = setup();
        let text = host.create_text("foo").unwrap();
        host.append_child(&root, &text).unwrap();

        let (old, new) = (VNode::from("foo"), VNode::from(7));
        let node = r
            .apply_patch(
                &mut host,
                Patch::Text {
                    node: &new,
                    old: &old,
                    target: &text,
                },
            )
            .unwrap();

        assert_eq!(node, text);
        assert_eq!(host.text_content(&text).as_deref(), Some("7"));
    }

    #[test]
    fn text_patch_normalizes_skipped_values() {
        let (r, mut host, _root) = setup();
        let text = host.create_text("was here").unwrap();
        let old = VNode::from("was here");
        r.apply_patch(
            &mut host,
            Patch::Text {
                node: &VNode::from(false),
                old: &old,
                target: &text,
            },
        )
        .unwrap();
        assert_eq!(host.text_content(&text).as_deref(), Some(""));
    }

    #[test]
    fn property_patch_sets_and_removes() {
        let (r, mut host, _root) = setup();
        let div = host.create_node(&Tag::from("div")).unwrap();
        let value = json!("big");

        r.apply_patch(
            &mut host,
            Patch::Property {
                target: &div,
                name: "class",
                old: None,
                new: Some(&value),
            },
        )
        .unwrap();
        assert_eq!(host.live_property(&div, "class"), Some(json!("big")));

        r.apply_patch(
            &mut host,
            Patch::Property {
                target: &div,
                name: "class",
                old: Some(&value),
                new: None,
            },
        )
        .unwrap();
        assert_eq!(host.live_property(&div, "class"), None);
    }

    #[test]
    fn host_failure_propagates_unchanged() {
        let (r, mut host, root) = setup();
        host.reject_property("onclick");
        let tree: VNode = VElement::new("button").prop("onclick", "go").into();

        let err = r
            .apply_patch(
                &mut host,
                Patch::Replace {
                    node: &tree,
                    parent: &root,
                    existing: None,
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            DiffError::Host(HostError::PropertyRejected { ref name, .. }) if name == "onclick"
        ));
        assert_eq!(host.child_count(&root), 0);
    }
}
