//! Topology ontology: typed node constructors and the edge passes that
//! connect them.
//!
//! ## Modules
//!
//! - `nodes/` - `ensure_*_node` and `find_or_create_synthetic_*_node`
//!   constructors per object kind
//! - `edges/` - passes deriving relationships: exposure, ownership,
//!   deployments, triggers, scaling, secrets, volumes, routes, images, builds
//!
//! Node constructors are used while objects are loaded. Edge passes run once
//! all objects are present and may add synthetic nodes for references that
//! point at nothing.

pub mod edges;
pub mod nodes;

pub use edges::*;
pub use nodes::*;
