use drip_core::node::NodeKind;
use drip_core::time::parse_instant;
use drip_core::types::{Chain, Node, Trigger};

/// Event nodes that `trigger` starts, in node order.
///
/// `now` is the simulated clock, used by `date` events that only fire once
/// their date has been reached.
pub fn matching_starts<'a>(chain: &'a Chain, trigger: &Trigger, now: &str) -> Vec<&'a Node> {
    chain
        .event_nodes()
        .filter(|node| matches_trigger(node, trigger, now))
        .collect()
}

fn matches_trigger(node: &Node, trigger: &Trigger, now: &str) -> bool {
    let NodeKind::Event(spec) = node.kind() else {
        return false;
    };
    if spec.event_type != trigger.trigger_type {
        return false;
    }
    match spec.event_type.as_str() {
        "contact_added" => match (&spec.list_name, &trigger.payload.list_name) {
            (Some(wanted), Some(given)) if !given.is_empty() => wanted == given,
            _ => true,
        },
        "date" => match (spec.date.as_deref().and_then(parse_instant), parse_instant(now)) {
            (Some(occurs), Some(now)) => now >= occurs,
            _ => false,
        },
        _ => true,
    }
}
