use drip_core::types::{Chain, Edge, Node};

/// Target node ids of `node_id`'s outgoing edges, in edge order.
///
/// With a `branch`, only edges whose resolved path label equals it are kept;
/// unlabelled edges never satisfy a branch request.
pub fn targets<'a>(node_id: &str, edges: &'a [Edge], branch: Option<&str>) -> Vec<&'a str> {
    edges
        .iter()
        .filter(|e| e.source == node_id)
        .filter(|e| match branch {
            None => true,
            Some(wanted) => e.path_label().as_deref() == Some(wanted),
        })
        .map(|e| e.target.as_str())
        .collect()
}

/// First unconditional target of `node_id`.
pub fn first_target<'a>(node_id: &str, edges: &'a [Edge]) -> Option<&'a str> {
    edges
        .iter()
        .find(|e| e.source == node_id)
        .map(|e| e.target.as_str())
}

/// Next target after a condition: the `branch` edge if one exists, else any
/// outgoing edge.
pub fn branch_target<'a>(node_id: &str, edges: &'a [Edge], branch: &str) -> Option<&'a str> {
    targets(node_id, edges, Some(branch))
        .first()
        .copied()
        .or_else(|| first_target(node_id, edges))
}

pub fn resolve_node<'a>(chain: &'a Chain, id: &str) -> Option<&'a Node> {
    chain.node(id)
}
