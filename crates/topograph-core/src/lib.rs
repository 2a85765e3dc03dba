//! Resource topology graph and diagnostic analysis for cluster workloads.
//!
//! Objects decoded from a cluster snapshot are loaded into a [`Graph`] with
//! [`TopologyBuilder`]; views fold the graph into pipelines and the analysis
//! rules report [`Markers`] about it.

pub mod analysis;
pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod objects;
pub mod ontology;
pub mod snapshot;
pub mod views;

pub use analysis::{analyze, AnalysisContext};
pub use builder::{build_graph, TopologyBuilder};
pub use config::Config;
pub use error::{Result, TopologyError};
pub use graph::{Graph, Marker, Markers, NamespacedNamer, Namer, Severity};
pub use snapshot::Snapshot;
pub use views::ProjectViews;
