use std::collections::{BTreeSet, HashMap};

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use super::{EdgeKind, EdgeKinds, Graph, Node, NodeId, NodeKind};

// =============================================================================
// SELECTORS
// =============================================================================

/// Node selector accepting the given kinds.
pub fn nodes_of_kind(kinds: &[NodeKind]) -> impl Fn(&Node) -> bool + '_ {
    move |node| kinds.contains(&node.kind())
}

/// Edge selector accepting edges that carry any of the given kinds.
pub fn edges_of_kind(kinds: &[EdgeKind]) -> impl Fn(NodeId, NodeId, &EdgeKinds) -> bool + '_ {
    move |_, _, edge| kinds.iter().any(|k| edge.contains(k))
}

/// Edge selector accepting every edge.
pub fn any_edge(_: NodeId, _: NodeId, _: &EdgeKinds) -> bool {
    true
}

/// A projection of a [`Graph`] onto a subset of its nodes.
///
/// Only edges with both endpoints inside the subset and accepted by the edge
/// selector are kept, with their full kind set.
#[derive(Debug, Clone)]
pub struct Subgraph {
    inner: DiGraph<NodeId, EdgeKinds>,
    index: HashMap<NodeId, NodeIndex>,
}

impl Subgraph {
    /// Node ids in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.inner.node_weights().copied().collect();
        ids.sort();
        ids
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Edges as `(from, to)` pairs ordered ascending.
    pub fn edge_pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs: Vec<(NodeId, NodeId)> = self
            .inner
            .edge_references()
            .map(|e| (self.inner[e.source()], self.inner[e.target()]))
            .collect();
        pairs.sort();
        pairs
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Nodes ordered so every edge points forward.
    ///
    /// Returns the id of a node on a cycle when the subgraph is not acyclic.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, NodeId> {
        toposort(&self.inner, None)
            .map(|order| order.into_iter().map(|idx| self.inner[idx]).collect())
            .map_err(|cycle| self.inner[cycle.node_id()])
    }

    /// Every strongly connected component with more than one node, each
    /// sorted ascending, ordered by their smallest member.
    pub fn cycles(&self) -> Vec<Vec<NodeId>> {
        let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(&self.inner)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut ids: Vec<NodeId> = scc.into_iter().map(|idx| self.inner[idx]).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }
}

impl Graph {
    /// Projects the graph onto the nodes accepted by `node_fn`.
    pub fn subgraph<N, E>(&self, node_fn: N, edge_fn: E) -> Subgraph
    where
        N: Fn(&Node) -> bool,
        E: Fn(NodeId, NodeId, &EdgeKinds) -> bool,
    {
        let ids: BTreeSet<NodeId> = self.nodes().filter(|n| node_fn(n)).map(|n| n.id).collect();
        self.subgraph_with_nodes(&ids, edge_fn)
    }

    /// Projects the graph onto an explicit node set. Unknown ids are dropped.
    pub fn subgraph_with_nodes<E>(&self, ids: &BTreeSet<NodeId>, edge_fn: E) -> Subgraph
    where
        E: Fn(NodeId, NodeId, &EdgeKinds) -> bool,
    {
        let mut inner = DiGraph::new();
        let mut index = HashMap::new();
        for &id in ids.iter().filter(|&&id| self.contains(id)) {
            index.insert(id, inner.add_node(id));
        }
        for edge in self.inner.edge_references() {
            let from = self.inner[edge.source()].id;
            let to = self.inner[edge.target()].id;
            let (Some(&a), Some(&b)) = (index.get(&from), index.get(&to)) else {
                continue;
            };
            if edge_fn(from, to, edge.weight()) {
                inner.add_edge(a, b, edge.weight().clone());
            }
        }
        Subgraph { inner, index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeObject, UniqueName};
    use crate::objects::{BuildConfig, ObjectMeta};

    fn build_config(graph: &mut Graph, name: &str) -> NodeId {
        graph.ensure_unique(UniqueName::of(NodeKind::BuildConfig, "ns", name), || {
            NodeObject::BuildConfig(BuildConfig {
                metadata: ObjectMeta::named("ns", name),
                ..BuildConfig::default()
            })
        })
    }

    #[test]
    fn test_subgraph_keeps_selected_edges() {
        let mut graph = Graph::new();
        let a = build_config(&mut graph, "a");
        let b = build_config(&mut graph, "b");
        let c = build_config(&mut graph, "c");
        graph.add_edge(a, b, EdgeKind::BuildInputImage);
        graph.add_edge(b, c, EdgeKind::Contains);

        let sub = graph.subgraph(
            nodes_of_kind(&[NodeKind::BuildConfig]),
            edges_of_kind(&[EdgeKind::BuildInputImage]),
        );
        assert_eq!(sub.node_ids(), vec![a, b, c]);
        assert_eq!(sub.edge_pairs(), vec![(a, b)]);

        let only_two = graph.subgraph_with_nodes(&BTreeSet::from([b, c, NodeId(99)]), any_edge);
        assert_eq!(only_two.node_ids(), vec![b, c]);
        assert_eq!(only_two.edge_pairs(), vec![(b, c)]);
    }

    #[test]
    fn test_topological_order_and_cycles() {
        let mut graph = Graph::new();
        let a = build_config(&mut graph, "a");
        let b = build_config(&mut graph, "b");
        let c = build_config(&mut graph, "c");
        graph.add_edge(a, b, EdgeKind::BuildOutput);
        graph.add_edge(b, c, EdgeKind::BuildOutput);

        let sub = graph.subgraph(|_| true, any_edge);
        assert_eq!(sub.topological_order(), Ok(vec![a, b, c]));
        assert!(sub.cycles().is_empty());

        graph.add_edge(c, a, EdgeKind::BuildOutput);
        let sub = graph.subgraph(|_| true, any_edge);
        assert!(sub.topological_order().is_err());
        assert_eq!(sub.cycles(), vec![vec![a, b, c]]);
    }
}
