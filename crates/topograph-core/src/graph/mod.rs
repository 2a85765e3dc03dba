//! Resource topology graph.
//!
//! An append-only arena of typed nodes connected by directed edges. Every
//! node is identified by a [`UniqueName`] derived from what it represents, so
//! inserting the same object twice yields the same node. Each ordered pair of
//! nodes carries at most one edge holding a set of [`EdgeKind`]s.
//!
//! ## Modules
//!
//! - `kinds` - node and edge kind tags
//! - `node` - nodes, unique names and the wrapped objects
//! - `subgraph` - projections, topological order and cycle detection
//! - `markers` - diagnostic markers produced by the analysis rules
//! - `namer` - resource naming for marker messages

mod kinds;
mod markers;
mod namer;
mod node;
mod subgraph;

pub use kinds::*;
pub use markers::*;
pub use namer::*;
pub use node::*;
pub use subgraph::*;

use std::collections::{BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Set of kinds carried by one edge.
pub type EdgeKinds = BTreeSet<EdgeKind>;

/// A directed edge with every kind recorded between its endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub kinds: EdgeKinds,
}

/// The topology graph.
///
/// Nodes are never removed, so a [`NodeId`] stays valid and dense for the
/// lifetime of the graph.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    inner: DiGraph<Node, EdgeKinds>,
    by_name: HashMap<UniqueName, NodeIndex>,
    by_kind: HashMap<NodeKind, Vec<NodeIndex>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // NODE INSERTION
    // =========================================================================

    /// Returns the node registered under `name`, creating it from `factory`
    /// when absent. Nodes created here are marked as found.
    pub fn ensure_unique<F>(&mut self, name: UniqueName, factory: F) -> NodeId
    where
        F: FnOnce() -> NodeObject,
    {
        self.ensure_with(name, true, factory)
    }

    /// Like [`Graph::ensure_unique`], but a newly created node is a synthetic
    /// placeholder for an object that was referenced and never seen.
    pub fn ensure_synthetic<F>(&mut self, name: UniqueName, factory: F) -> NodeId
    where
        F: FnOnce() -> NodeObject,
    {
        self.ensure_with(name, false, factory)
    }

    /// Inserts a real object. A synthetic node already registered under
    /// `name` is upgraded in place and keeps its id and edges.
    pub fn ensure_found<F>(&mut self, name: UniqueName, factory: F) -> NodeId
    where
        F: FnOnce() -> NodeObject,
    {
        match self.by_name.get(&name) {
            Some(&idx) => {
                let node = &mut self.inner[idx];
                if !node.found {
                    node.object = factory();
                    node.found = true;
                }
                node.id
            }
            None => self.insert(name, true, factory()),
        }
    }

    fn ensure_with<F>(&mut self, name: UniqueName, found: bool, factory: F) -> NodeId
    where
        F: FnOnce() -> NodeObject,
    {
        match self.by_name.get(&name) {
            Some(&idx) => self.inner[idx].id,
            None => self.insert(name, found, factory()),
        }
    }

    fn insert(&mut self, name: UniqueName, found: bool, object: NodeObject) -> NodeId {
        let id = NodeId(self.inner.node_count());
        let kind = object.kind();
        let idx = self.inner.add_node(Node {
            id,
            unique_name: name.clone(),
            found,
            object,
        });
        debug_assert_eq!(idx.index(), id.0);
        self.by_name.insert(name, idx);
        self.by_kind.entry(kind).or_default().push(idx);
        id
    }

    // =========================================================================
    // EDGES
    // =========================================================================

    /// Records `kind` on the edge `from -> to`, creating the edge if needed.
    ///
    /// Self edges and unknown ids are ignored.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) {
        if from == to || !self.contains(from) || !self.contains(to) {
            return;
        }
        let (a, b) = (from.index(), to.index());
        match self.inner.find_edge(a, b) {
            Some(e) => {
                self.inner[e].insert(kind);
            }
            None => {
                self.inner.add_edge(a, b, EdgeKinds::from([kind]));
            }
        }
    }

    /// Kinds recorded on `from -> to`. Empty when there is no such edge.
    pub fn edge_kinds(&self, from: NodeId, to: NodeId) -> EdgeKinds {
        if !self.contains(from) || !self.contains(to) {
            return EdgeKinds::new();
        }
        self.inner
            .find_edge(from.index(), to.index())
            .map(|e| self.inner[e].clone())
            .unwrap_or_default()
    }

    pub fn has_edge_kind(&self, from: NodeId, to: NodeId, kind: EdgeKind) -> bool {
        self.contains(from)
            && self.contains(to)
            && self
                .inner
                .find_edge(from.index(), to.index())
                .is_some_and(|e| self.inner[e].contains(&kind))
    }

    /// Every edge, ordered by `(from, to)`.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .inner
            .edge_references()
            .map(|e| Edge {
                from: self.inner[e.source()].id,
                to: self.inner[e.target()].id,
                kinds: e.weight().clone(),
            })
            .collect();
        edges.sort_by_key(|e| (e.from, e.to));
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.inner.node_weight(id.index())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.inner.node_count()
    }

    pub fn find(&self, name: &UniqueName) -> Option<NodeId> {
        self.by_name.get(name).map(|&idx| self.inner[idx].id)
    }

    pub fn find_node(&self, name: &UniqueName) -> Option<&Node> {
        self.by_name.get(name).map(|&idx| &self.inner[idx])
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.node_weights()
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Nodes of one kind in id order.
    pub fn nodes_by_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.by_kind
            .get(&kind)
            .map(|ids| ids.iter().map(|&idx| &self.inner[idx]).collect())
            .unwrap_or_default()
    }

    /// Ids of the nodes of one kind in id order.
    pub fn node_ids_by_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.by_kind
            .get(&kind)
            .map(|ids| ids.iter().map(|&idx| self.inner[idx].id).collect())
            .unwrap_or_default()
    }

    /// Targets of outgoing edges carrying `kind`, ascending by id.
    pub fn successor_nodes_by_edge_kind(&self, id: NodeId, kind: EdgeKind) -> Vec<NodeId> {
        self.neighbors_by_edge_kind(id, kind, Direction::Outgoing)
    }

    /// Sources of incoming edges carrying `kind`, ascending by id.
    pub fn predecessor_nodes_by_edge_kind(&self, id: NodeId, kind: EdgeKind) -> Vec<NodeId> {
        self.neighbors_by_edge_kind(id, kind, Direction::Incoming)
    }

    fn neighbors_by_edge_kind(&self, id: NodeId, kind: EdgeKind, dir: Direction) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut out: Vec<NodeId> = self
            .inner
            .edges_directed(id.index(), dir)
            .filter(|e| e.weight().contains(&kind))
            .map(|e| match dir {
                Direction::Outgoing => self.inner[e.target()].id,
                Direction::Incoming => self.inner[e.source()].id,
            })
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Successors over `kind` that are of `node_kind`.
    pub fn successors_of_kind(&self, id: NodeId, edge: EdgeKind, node_kind: NodeKind) -> Vec<NodeId> {
        self.successor_nodes_by_edge_kind(id, edge)
            .into_iter()
            .filter(|&n| self.kind_of(n) == Some(node_kind))
            .collect()
    }

    /// Predecessors over `kind` that are of `node_kind`.
    pub fn predecessors_of_kind(&self, id: NodeId, edge: EdgeKind, node_kind: NodeKind) -> Vec<NodeId> {
        self.predecessor_nodes_by_edge_kind(id, edge)
            .into_iter()
            .filter(|&n| self.kind_of(n) == Some(node_kind))
            .collect()
    }

    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    /// Walks `Contains` edges upward and returns the outermost container.
    ///
    /// A node with no container is its own top-level container.
    pub fn top_level_container(&self, id: NodeId) -> NodeId {
        let mut current = id;
        let mut seen = BTreeSet::from([current]);
        while let Some(&parent) = self
            .predecessor_nodes_by_edge_kind(current, EdgeKind::Contains)
            .first()
        {
            if !seen.insert(parent) {
                break;
            }
            current = parent;
        }
        current
    }

    /// `id` plus everything reachable from it over `Contains` edges.
    pub fn containment_closure(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut out = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) || !out.insert(next) {
                continue;
            }
            stack.extend(self.successor_nodes_by_edge_kind(next, EdgeKind::Contains));
        }
        out
    }

    /// The first `Contains` descendant of `id` with the given kind.
    pub fn contained_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.containment_closure(id)
            .into_iter()
            .find(|&n| n != id && self.kind_of(n) == Some(kind))
    }
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nodes: Vec<&Node> = self.nodes().collect();
        let mut s = serializer.serialize_struct("Graph", 2)?;
        s.serialize_field("nodes", &nodes)?;
        s.serialize_field("edges", &self.edges())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{ObjectMeta, Secret, ServiceAccount};

    fn secret(graph: &mut Graph, name: &str) -> NodeId {
        let unique = UniqueName::of(NodeKind::Secret, "ns", name);
        graph.ensure_unique(unique, || {
            NodeObject::Secret(Secret {
                metadata: ObjectMeta::named("ns", name),
                ..Secret::default()
            })
        })
    }

    fn account(graph: &mut Graph, name: &str) -> NodeId {
        let unique = UniqueName::of(NodeKind::ServiceAccount, "ns", name);
        graph.ensure_unique(unique, || {
            NodeObject::ServiceAccount(ServiceAccount {
                metadata: ObjectMeta::named("ns", name),
                ..ServiceAccount::default()
            })
        })
    }

    #[test]
    fn test_ensure_unique_is_idempotent() {
        let mut graph = Graph::new();
        let a = secret(&mut graph, "token");
        let b = secret(&mut graph, "token");
        assert_eq!(a, b);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes_by_kind(NodeKind::Secret).len(), 1);
    }

    #[test]
    fn test_ids_are_dense() {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = ["a", "b", "c"].iter().map(|n| secret(&mut graph, n)).collect();
        assert_eq!(ids, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_edge_kinds_accumulate() {
        let mut graph = Graph::new();
        let sa = account(&mut graph, "builder");
        let s = secret(&mut graph, "token");

        graph.add_edge(sa, s, EdgeKind::MountableSecret);
        graph.add_edge(sa, s, EdgeKind::MountableSecret);
        graph.add_edge(sa, s, EdgeKind::Contains);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.edge_kinds(sa, s),
            EdgeKinds::from([EdgeKind::Contains, EdgeKind::MountableSecret])
        );
        assert!(graph.edge_kinds(s, sa).is_empty());
    }

    #[test]
    fn test_self_edges_ignored() {
        let mut graph = Graph::new();
        let s = secret(&mut graph, "token");
        graph.add_edge(s, s, EdgeKind::Contains);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_queries_on_unknown_nodes_are_empty() {
        let graph = Graph::new();
        assert!(graph.nodes_by_kind(NodeKind::Pod).is_empty());
        assert!(graph
            .successor_nodes_by_edge_kind(NodeId(7), EdgeKind::Contains)
            .is_empty());
        assert!(graph.edge_kinds(NodeId(1), NodeId(2)).is_empty());
    }

    #[test]
    fn test_synthetic_node_upgrade() {
        let mut graph = Graph::new();
        let unique = UniqueName::of(NodeKind::Secret, "ns", "token");
        let placeholder = graph.ensure_synthetic(unique.clone(), || {
            NodeObject::Secret(Secret {
                metadata: ObjectMeta::named("ns", "token"),
                ..Secret::default()
            })
        });
        assert!(!graph.node(placeholder).unwrap().found);

        let real = graph.ensure_found(unique, || {
            NodeObject::Secret(Secret {
                metadata: ObjectMeta::named("ns", "token"),
                secret_type: Some("Opaque".into()),
            })
        });
        assert_eq!(placeholder, real);
        let node = graph.node(real).unwrap();
        assert!(node.found);
        match &node.object {
            NodeObject::Secret(s) => assert_eq!(s.secret_type.as_deref(), Some("Opaque")),
            other => panic!("unexpected object {other:?}"),
        }
    }

    #[test]
    fn test_top_level_container() {
        let mut graph = Graph::new();
        let outer = account(&mut graph, "outer");
        let middle = secret(&mut graph, "middle");
        let inner = secret(&mut graph, "inner");
        graph.add_edge(outer, middle, EdgeKind::Contains);
        graph.add_edge(middle, inner, EdgeKind::Contains);

        assert_eq!(graph.top_level_container(inner), outer);
        assert_eq!(graph.top_level_container(outer), outer);
        assert_eq!(
            graph.containment_closure(outer),
            BTreeSet::from([outer, middle, inner])
        );
    }
}
