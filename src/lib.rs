//! Spatial graphs: multigraphs whose nodes carry 2-D positions and whose
//! edges carry explicit polyline paths.
//!
//! 1. [Data model](#data-model)
//! 1. [Planarization](#planarization)
//! 1. [Generators and I/O](#generators-and-io)
//!
//! # Data model
//!
//! A [`SpatialGraph`] is built from lists of [`SpatialNode`]s and
//! [`SpatialEdge`]s. Node names are unique; several parallel edges may
//! connect the same pair of names, told apart by an index. An edge without
//! an explicit path gets the straight segment between its endpoints when
//! it is added, and its length is derived from the path and cached.
//!
//! # Planarization
//!
//! [`make_planar`] removes every edge-edge crossing from a graph by
//! inserting a node at each crossing point and splitting the crossing
//! edges there:
//!
//! ```rust
//! use geo::Point;
//! use spatial_graph::{make_planar, SpatialEdge, SpatialGraph, SpatialNode};
//!
//! let nodes = vec![
//!     SpatialNode::new("a", Point::new(0., 0.)),
//!     SpatialNode::new("b", Point::new(2., 2.)),
//!     SpatialNode::new("c", Point::new(0., 2.)),
//!     SpatialNode::new("d", Point::new(2., 0.)),
//! ];
//! let edges = vec![SpatialEdge::new("a", "b"), SpatialEdge::new("c", "d")];
//! let graph = SpatialGraph::new(nodes, edges)?;
//!
//! let planar = make_planar(&graph, true, "intersection")?;
//! assert_eq!(planar.node_count(), 5);
//! assert_eq!(planar.edge_count(), 4);
//! assert!(planar.node("intersection_0").is_some());
//! # Ok::<(), spatial_graph::Error>(())
//! ```
//!
//! The crossing detection itself lives in [`intersect`], built on
//! [`line_intersection`] over segment pairs.
//!
//! # Generators and I/O
//!
//! [`generators`] builds node/edge lists for standard topologies
//! (lattices, stars, trees, random geometric graphs); [`io`] converts
//! graphs to and from GeoJSON feature collections.
//!
//! [`line_intersection`]: geo::algorithm::line_intersection::line_intersection
mod error;
pub use error::{Error, Result};

mod node;
pub use node::{Attributes, SpatialNode};

mod edge;
pub use edge::SpatialEdge;

mod graph;
pub use graph::SpatialGraph;

pub mod intersect;
pub use intersect::{consistent_intersection, curve_intersection, split_at_crossings};

mod planar;
pub use planar::make_planar;

mod transform;
pub use transform::{flatten_graph, merge_graphs, rotate_graph};

pub mod generators;
pub mod geometry;
pub mod io;
