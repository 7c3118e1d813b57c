use std::collections::HashMap;

use tracing::{debug, trace};

use crate::geometry::{euclidean_distance, handle_positions};
use crate::types::*;

/// Pick the handle pair with the shortest straight connector between two nodes.
///
/// All 16 combinations are measured. Ties go to the first minimum in
/// [`HandleId::ALL`] order, source-major.
pub fn closest_handles<S, T>(source: &S, target: &T) -> HandlePair
where
    S: LayoutNode + ?Sized,
    T: LayoutNode + ?Sized,
{
    let source_handles = handle_positions(source);
    let target_handles = handle_positions(target);

    let mut min_distance = f64::INFINITY;
    let mut best = HandlePair::default();

    for (source_handle, source_pos) in source_handles.iter() {
        for (target_handle, target_pos) in target_handles.iter() {
            let distance = euclidean_distance(source_pos, target_pos);
            if distance < min_distance {
                min_distance = distance;
                best = HandlePair::new(source_handle, target_handle);
            }
        }
    }

    best
}

/// Id lookup over a node snapshot.
pub struct NodeIndex<'a, N> {
    by_id: HashMap<&'a str, &'a N>,
}

impl<'a, N: LayoutNode> NodeIndex<'a, N> {
    pub fn new(nodes: &'a [N]) -> Self {
        Self {
            by_id: nodes.iter().map(|n| (n.id(), n)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a N> {
        self.by_id.get(id).copied()
    }

    /// Optimal handles for the edge `source -> target`, or `None` when either
    /// node is missing from the snapshot.
    pub fn route(&self, source: &str, target: &str) -> Option<HandlePair> {
        let source_node = self.get(source)?;
        let target_node = self.get(target)?;
        Some(closest_handles(source_node, target_node))
    }
}

/// Resolve both ends by id and route between them.
///
/// Returns `None` if either node no longer exists, e.g. it was deleted while
/// a drag was in flight.
pub fn compute_closest_handles<N: LayoutNode>(
    nodes: &[N],
    source: &str,
    target: &str,
) -> Option<HandlePair> {
    let source_node = nodes.iter().find(|n| n.id() == source);
    let target_node = nodes.iter().find(|n| n.id() == target);
    match (source_node, target_node) {
        (Some(s), Some(t)) => Some(closest_handles(s, t)),
        _ => {
            debug!(source, target, "connector not computable, node missing");
            None
        }
    }
}

/// Whether any resolvable edge carries a handle pair other than its optimum.
pub fn needs_reoptimization<N: LayoutNode, E: LayoutEdge>(nodes: &[N], edges: &[E]) -> bool {
    let index = NodeIndex::new(nodes);
    edges.iter().any(|edge| {
        index
            .route(edge.source(), edge.target())
            .is_some_and(|best| best != edge.handles())
    })
}

/// Re-route every edge against the current node geometry.
///
/// Edges whose endpoints cannot be resolved are left untouched. Returns the
/// number of edges whose handles changed.
pub fn reoptimize_in_place<N: LayoutNode, E: LayoutEdge>(nodes: &[N], edges: &mut [E]) -> usize {
    let index = NodeIndex::new(nodes);
    let mut changed = 0;

    for edge in edges.iter_mut() {
        let Some(best) = index.route(edge.source(), edge.target()) else {
            debug!(
                source = edge.source(),
                target = edge.target(),
                "skipping edge with unresolved endpoint"
            );
            continue;
        };
        if best != edge.handles() {
            trace!(
                source = edge.source(),
                target = edge.target(),
                from = ?edge.handles(),
                to = ?best,
                "rerouting edge"
            );
            edge.set_handles(best);
            changed += 1;
        }
    }

    changed
}
