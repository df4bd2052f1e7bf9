//! Subtree teardown.

use vtree_host::{HostResult, HostTree};

/// Tear down a host subtree: children first, last to first, then the node
/// itself. Safe on a detached node.
pub fn remove_subtree<H: HostTree>(host: &mut H, node: &H::Node) -> HostResult<()> {
    // Each entry holds a node and how many of its children are still
    // attached below the ones already visited.
    let mut stack = vec![(node.clone(), host.child_count(node))];
    while let Some((current, remaining)) = stack.pop() {
        if remaining == 0 {
            host.remove_node(&current)?;
            continue;
        }
        let child = host.child_at(&current, remaining - 1);
        stack.push((current, remaining - 1));
        if let Some(child) = child {
            let count = host.child_count(&child);
            stack.push((child, count));
        }
    }
    Ok(())
}
