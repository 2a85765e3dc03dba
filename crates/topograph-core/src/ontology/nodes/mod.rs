//! Typed node constructors.
//!
//! Every constructor is idempotent: the node's unique name is derived from
//! the object, so ensuring the same object again returns the same node.
//!
//! - **Workloads**: pods and pod-template controllers, with their contained
//!   specs, templates and pod specs
//! - **Services**: services, routes, autoscalers, service accounts, secrets,
//!   volume claims
//! - **Images**: builds, build configs, image streams, tags and plain image
//!   repositories
//!
//! `find_or_create_synthetic_*` constructors stand in for referenced objects
//! that may not exist. Their nodes are created with `found = false` and are
//! upgraded when the real object is ensured later.

mod images;
mod services;
mod workloads;

pub use images::*;
pub use services::*;
pub use workloads::*;

use crate::graph::{EdgeKind, Graph, NodeId, NodeObject, UniqueName};

/// Ensures a part contained by `owner` and links it with `Contains`.
pub(crate) fn ensure_part(graph: &mut Graph, owner: NodeId, object: NodeObject) -> NodeId {
    let owner_name = match graph.node(owner) {
        Some(node) => node.unique_name.clone(),
        None => return owner,
    };
    let name = UniqueName::part_of(object.kind(), &owner_name);
    let id = graph.ensure_unique(name, || object);
    graph.add_edge(owner, id, EdgeKind::Contains);
    id
}
