//! Tree differ: compares one old/new virtual-node pair and dispatches the
//! patches that bring the host node in line.
//!
//! A pass never recurses. Comparing a node whose identity is kept only
//! settles its properties; its children are queued as a `ChildPass` and
//! reconciled from an explicit worklist, so nesting depth is bounded by
//! memory rather than by the call stack.

use tracing::trace;
use vtree_host::HostTree;
use vtree_types::{VElement, VNode};

use crate::classify::{is_primitive, is_same_node_type, renderable};
use crate::config::ReconcileConfig;
use crate::error::DiffResult;
use crate::patch::Patch;

/// Stands in for a missing previous value.
static ABSENT: VNode = VNode::Null;

/// Children of a reused structured node, waiting to be reconciled.
pub(crate) struct ChildPass<'v, N> {
    new: &'v VElement,
    old: &'v VElement,
    node: N,
}

/// The reconciliation engine.
///
/// Holds only configuration; all state of a pass lives in the pass itself.
/// A single `Reconciler` can serve any number of hosts, but concurrent
/// passes over the same host subtree must be serialized by the caller.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a reconciler with the given configuration.
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Reconcile `new` against `old` and return the host node that now
    /// represents `new`.
    ///
    /// - `existing`: the host node previously produced for `old`, or `None`
    ///   to build from scratch.
    ///
    /// On return the node is a child of `parent`; it is appended if it was
    /// not already there.
    pub fn diff<H: HostTree>(
        &self,
        host: &mut H,
        new: &VNode,
        parent: &H::Node,
        old: Option<&VNode>,
        existing: Option<&H::Node>,
    ) -> DiffResult<H::Node> {
        let mut pending = Vec::new();
        let node = self.idiff(host, new, parent, old, existing, &mut pending)?;
        self.drain(host, pending)?;
        if host.parent(&node).as_ref() != Some(parent) {
            host.append_child(parent, &node)?;
        }
        Ok(node)
    }

    /// Compare one pair and return the host node for `new`. Children of a
    /// reused structured node are pushed onto `pending` instead of being
    /// reconciled here.
    pub(crate) fn idiff<'v, H: HostTree>(
        &self,
        host: &mut H,
        new: &'v VNode,
        parent: &H::Node,
        old: Option<&'v VNode>,
        existing: Option<&H::Node>,
        pending: &mut Vec<ChildPass<'v, H::Node>>,
    ) -> DiffResult<H::Node> {
        let Some(existing) = existing else {
            let patch = Patch::Replace {
                node: new,
                parent,
                existing: None,
            };
            return self.apply_patch(host, patch);
        };
        let old = old.unwrap_or(&ABSENT);

        if is_primitive(new) && is_primitive(old) {
            // Compared against the previous value, not against itself: a
            // self-comparison would never see a change.
            if new != old {
                let patch = Patch::Text {
                    node: new,
                    old,
                    target: existing,
                };
                return self.apply_patch(host, patch);
            }
            return Ok(existing.clone());
        }

        let (VNode::Element(new_el), VNode::Element(old_el)) = (new, old) else {
            return self.replace(host, new, parent, existing);
        };
        if !is_same_node_type(new, old) {
            return self.replace(host, new, parent, existing);
        }

        self.diff_props(host, new_el, old_el, existing)?;
        pending.push(ChildPass {
            new: new_el,
            old: old_el,
            node: existing.clone(),
        });
        Ok(existing.clone())
    }

    /// Reconcile queued child lists until none are left. Passes queued by
    /// a list are handled before the rest of the queue, first child first.
    pub(crate) fn drain<'v, H: HostTree>(
        &self,
        host: &mut H,
        mut pending: Vec<ChildPass<'v, H::Node>>,
    ) -> DiffResult<()> {
        while let Some(pass) = pending.pop() {
            let (new, old): (&'v VElement, &'v VElement) = (pass.new, pass.old);
            let host_children = host.child_nodes(&pass.node);
            let mut queued = Vec::new();
            self.reconcile_at(
                host,
                &renderable(&new.children),
                &renderable(&old.children),
                &host_children,
                &pass.node,
                &mut queued,
            )?;
            trace!(
                node = ?pass.node,
                queued = queued.len(),
                remaining = pending.len(),
                "child pass done"
            );
            pending.extend(queued.into_iter().rev());
        }
        Ok(())
    }

    fn replace<H: HostTree>(
        &self,
        host: &mut H,
        new: &VNode,
        parent: &H::Node,
        existing: &H::Node,
    ) -> DiffResult<H::Node> {
        let patch = Patch::Replace {
            node: new,
            parent,
            existing: Some(existing),
        };
        self.apply_patch(host, patch)
    }

    /// Remove properties the new node dropped, then set the ones that
    /// changed.
    fn diff_props<H: HostTree>(
        &self,
        host: &mut H,
        new: &VElement,
        old: &VElement,
        node: &H::Node,
    ) -> DiffResult<()> {
        for (name, old_value) in &old.props {
            if old_value.is_null() || new.get_prop(name).is_some() {
                continue;
            }
            let patch = Patch::Property {
                target: node,
                name,
                old: Some(old_value),
                new: None,
            };
            self.apply_patch(host, patch)?;
        }

        for (name, value) in &new.props {
            if value.is_null() {
                continue;
            }
            let old_value = old.get_prop(name);
            // Live properties are checked against the host, since user input
            // may have moved them away from the last rendered value.
            let changed = match old_value {
                None => true,
                Some(_) if self.config.is_live(name) => {
                    host.live_property(node, name).as_ref() != Some(value)
                }
                Some(previous) => previous != value,
            };
            if changed {
                let patch = Patch::Property {
                    target: node,
                    name,
                    old: old_value,
                    new: Some(value),
                };
                self.apply_patch(host, patch)?;
            }
        }
        Ok(())
    }
}

/// Reconcile with the default configuration. See [`Reconciler::diff`].
pub fn diff<H: HostTree>(
    host: &mut H,
    new: &VNode,
    parent: &H::Node,
    old: Option<&VNode>,
    existing: Option<&H::Node>,
) -> DiffResult<H::Node> {
    Reconciler::default().diff(host, new, parent, old, existing)
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vtree_host::{MemoryHost, Mutation, NodeId};
    use vtree_types::{Tag, Value};

    fn render(host: &mut MemoryHost, tree: &VNode) -> (NodeId, NodeId) {
        let root = host.create_root();
        let node = diff(host, tree, &root, None, None).unwrap();
        host.clear_journal();
        (root, node)
    }

    fn li(text: &str) -> VElement {
        VElement::new("li").child(text)
    }

    // -----------------------------------------------------------------------
    // Entry point
    // -----------------------------------------------------------------------

    #[test]
    fn fresh_render_attaches_under_parent() {
        let mut host = MemoryHost::new();
        let root = host.create_root();
        let tree: VNode = VElement::new("div").prop("id", "app").child("hi").into();

        let node = diff(&mut host, &tree, &root, None, None).unwrap();

        assert_eq!(host.parent(&node), Some(root));
        assert_eq!(host.to_markup(root), r#"<div id="app">hi</div>"#);
    }

    #[test]
    fn missing_existing_node_ignores_old_tree() {
        let mut host = MemoryHost::new();
        let root = host.create_root();
        let old: VNode = VElement::new("p").child("old").into();
        let new: VNode = VElement::new("p").child("new").into();

        diff(&mut host, &new, &root, Some(&old), None).unwrap();

        assert_eq!(host.stats().created, 2);
        assert_eq!(host.to_markup(root), "<p>new</p>");
    }

    #[test]
    fn reused_node_is_reattached_to_parent() {
        let mut host = MemoryHost::new();
        let tree: VNode = VElement::new("p").into();
        let (_, node) = render(&mut host, &tree);
        let other = host.create_root();

        let result = diff(&mut host, &tree, &other, Some(&tree), Some(&node)).unwrap();

        assert_eq!(result, node);
        assert_eq!(host.parent(&node), Some(other));
    }

    // -----------------------------------------------------------------------
    // Testable properties
    // -----------------------------------------------------------------------

    #[test]
    fn second_identical_diff_is_silent() {
        let mut host = MemoryHost::new();
        let tree: VNode = VElement::new("form")
            .prop("class", "f")
            .child(VElement::new("input").prop("value", "v").prop("checked", true))
            .child(VElement::new("ul").children([li("a"), li("b").key(2)]))
            .children([VNode::from("tail"), VNode::Null, VNode::from(3)])
            .into();
        let (root, node) = render(&mut host, &tree);

        let again = diff(&mut host, &tree, &root, Some(&tree), Some(&node)).unwrap();

        assert_eq!(again, node);
        assert!(host.journal().is_empty(), "unexpected {:?}", host.journal());
    }

    #[test]
    fn primitive_text_update_in_place() {
        let mut host = MemoryHost::new();
        let (root, text) = render(&mut host, &VNode::from("foo"));

        let node = diff(
            &mut host,
            &VNode::from("bar"),
            &root,
            Some(&VNode::from("foo")),
            Some(&text),
        )
        .unwrap();

        assert_eq!(node, text);
        assert_eq!(host.text_content(&text).as_deref(), Some("bar"));
        assert_eq!(
            host.journal(),
            &[Mutation::SetText {
                node: text,
                text: "bar".into()
            }]
        );
    }

    #[test]
    fn unchanged_text_is_not_touched() {
        let mut host = MemoryHost::new();
        let (root, text) = render(&mut host, &VNode::from(5));

        diff(&mut host, &VNode::from(5), &root, Some(&VNode::from(5)), Some(&text)).unwrap();

        assert!(host.journal().is_empty());
    }

    #[test]
    fn tag_change_replaces_whole_subtree() {
        let mut host = MemoryHost::new();
        let old: VNode = VElement::new("span").child(VElement::new("b").child("x")).into();
        let (root, span) = render(&mut host, &old);
        let b = host.child_at(&span, 0).unwrap();
        let x = host.child_at(&b, 0).unwrap();

        let new: VNode = VElement::new("div").child("y").into();
        let div = diff(&mut host, &new, &root, Some(&old), Some(&span)).unwrap();

        assert_ne!(div, span);
        assert_eq!(host.tag(div), Some(&Tag::from("div")));
        assert_eq!(host.child_nodes(&root), vec![div]);
        for gone in [span, b, x] {
            assert_eq!(host.parent(&gone), None, "{gone} still attached");
        }
        assert_eq!(host.to_markup(root), "<div>y</div>");
    }

    #[test]
    fn tag_case_difference_keeps_node() {
        let mut host = MemoryHost::new();
        let old: VNode = VElement::new("DIV").child("a").into();
        let (root, node) = render(&mut host, &old);

        let new: VNode = VElement::new("div").child("a").into();
        let result = diff(&mut host, &new, &root, Some(&old), Some(&node)).unwrap();

        assert_eq!(result, node);
        assert!(host.journal().is_empty());
    }

    #[test]
    fn element_to_text_and_back() {
        let mut host = MemoryHost::new();
        let old: VNode = VElement::new("em").child("x").into();
        let (root, em) = render(&mut host, &old);

        let text = diff(&mut host, &VNode::from("plain"), &root, Some(&old), Some(&em)).unwrap();
        assert_eq!(host.text_content(&text).as_deref(), Some("plain"));
        assert_eq!(host.parent(&em), None);

        let back: VNode = VElement::new("em").into();
        let em2 = diff(&mut host, &back, &root, Some(&VNode::from("plain")), Some(&text)).unwrap();
        assert_eq!(host.parent(&text), None);
        assert_eq!(host.to_markup(root), "<em></em>");
        assert_ne!(em2, em);
    }

    #[test]
    fn property_set_and_remove() {
        let mut host = MemoryHost::new();
        let old: VNode = VElement::new("div").prop("a", 1).prop("b", 2).into();
        let (root, node) = render(&mut host, &old);

        let new: VNode = VElement::new("div").prop("a", 1).prop("c", 3).into();
        diff(&mut host, &new, &root, Some(&old), Some(&node)).unwrap();

        assert_eq!(
            host.journal(),
            &[
                Mutation::RemoveProperty {
                    node,
                    name: "b".into()
                },
                Mutation::SetProperty {
                    node,
                    name: "c".into(),
                    value: json!(3)
                },
            ]
        );
    }

    #[test]
    fn null_property_counts_as_removed() {
        let mut host = MemoryHost::new();
        let old: VNode = VElement::new("div").prop("title", "t").into();
        let (root, node) = render(&mut host, &old);

        let new: VNode = VElement::new("div").prop("title", Value::Null).into();
        diff(&mut host, &new, &root, Some(&old), Some(&node)).unwrap();

        assert_eq!(host.stats().properties_removed, 1);
        assert_eq!(host.stats().properties_set, 0);
    }

    #[test]
    fn live_value_is_compared_against_host() {
        let mut host = MemoryHost::new();
        let tree: VNode = VElement::new("input").prop("value", "a").into();
        let (root, input) = render(&mut host, &tree);

        // The user typed into the field.
        host.set_live_property(input, "value", json!("typed")).unwrap();

        diff(&mut host, &tree, &root, Some(&tree), Some(&input)).unwrap();

        assert_eq!(host.live_property(&input, "value"), Some(json!("a")));
        assert_eq!(host.stats().properties_set, 1);
    }

    #[test]
    fn live_check_can_be_configured_away() {
        let mut host = MemoryHost::new();
        let tree: VNode = VElement::new("input").prop("value", "a").into();
        let (root, input) = render(&mut host, &tree);
        host.set_live_property(input, "value", json!("typed")).unwrap();

        let reconciler = Reconciler::new(ReconcileConfig {
            live_properties: Vec::new(),
        });
        reconciler
            .diff(&mut host, &tree, &root, Some(&tree), Some(&input))
            .unwrap();

        assert!(host.journal().is_empty());
        assert_eq!(host.live_property(&input, "value"), Some(json!("typed")));
    }

    // -----------------------------------------------------------------------
    // Nesting depth
    // -----------------------------------------------------------------------

    fn nested(depth: usize, leaf: &str) -> VNode {
        let mut node = VNode::from(leaf);
        for _ in 0..depth {
            node = VElement::new("div").child(node).into();
        }
        node
    }

    /// Follow first children down from `node`; returns the steps taken and
    /// the node reached.
    fn descend(host: &MemoryHost, mut node: NodeId) -> (usize, NodeId) {
        let mut steps = 0;
        while let Some(child) = host.child_at(&node, 0) {
            node = child;
            steps += 1;
        }
        (steps, node)
    }

    const DEEP: usize = 2000;

    #[test]
    fn deep_tree_renders_and_updates() {
        let mut host = MemoryHost::new();
        let old = nested(DEEP, "a");
        let (root, top) = render(&mut host, &old);
        let (steps, leaf) = descend(&host, top);
        assert_eq!(steps, DEEP);
        assert_eq!(host.text_content(&leaf).as_deref(), Some("a"));

        let new = nested(DEEP, "b");
        let result = diff(&mut host, &new, &root, Some(&old), Some(&top)).unwrap();

        assert_eq!(result, top);
        assert_eq!(
            host.journal(),
            &[Mutation::SetText {
                node: leaf,
                text: "b".into()
            }]
        );
    }

    #[test]
    fn deep_subtree_is_torn_down() {
        let mut host = MemoryHost::new();
        let old = nested(DEEP, "a");
        let (root, top) = render(&mut host, &old);

        let text = diff(&mut host, &VNode::from("x"), &root, Some(&old), Some(&top)).unwrap();

        assert_eq!(host.stats().removals, DEEP + 1);
        assert_eq!(host.child_nodes(&root), vec![text]);
        assert_eq!(host.parent(&top), None);
    }

    #[test]
    fn deepening_update_settles_props_and_children() {
        let mut host = MemoryHost::new();
        let old: VNode = VElement::new("ul").prop("a", 1).child(li("x")).into();
        let (root, ul) = render(&mut host, &old);

        let new: VNode = VElement::new("ul")
            .prop("a", 2)
            .child(VElement::new("li").child(VElement::new("b").child(VElement::new("i").child("x"))))
            .into();
        diff(&mut host, &new, &root, Some(&old), Some(&ul)).unwrap();

        assert_eq!(host.to_markup(root), r#"<ul a="2"><li><b><i>x</i></b></li></ul>"#);
    }
}
