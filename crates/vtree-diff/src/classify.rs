//! Node classification predicates.

use vtree_types::VNode;

/// True for every value that is not a structured node.
pub fn is_primitive(node: &VNode) -> bool {
    !matches!(node, VNode::Element(_))
}

/// Absent markers and booleans never produce host content.
pub fn should_render(node: &VNode) -> bool {
    !matches!(node, VNode::Null | VNode::Bool(_))
}

/// Whether two values are candidates for an in-place update.
///
/// Any two primitives are the same type (their values are compared
/// separately). Two structured nodes are the same type when their tags
/// match; textual tags ignore case. A primitive never matches a structured
/// node.
pub fn is_same_node_type(a: &VNode, b: &VNode) -> bool {
    match (a, b) {
        (VNode::Element(a), VNode::Element(b)) => a.tag.matches(&b.tag),
        (VNode::Element(_), _) | (_, VNode::Element(_)) => false,
        _ => true,
    }
}

/// The children that take part in reconciliation.
pub(crate) fn renderable(children: &[VNode]) -> Vec<&VNode> {
    children.iter().filter(|c| should_render(c)).collect()
}
