use geo::rotate::RotatePoint;
use geo::Point;
use log::trace;

use crate::{Error, Result, SpatialEdge, SpatialGraph, SpatialNode};

/// Disjoint union of two graphs under distinct name prefixes.
///
/// Every node of `left` is renamed `{left_prefix}_{name}` and every node of
/// `right` `{right_prefix}_{name}`; edges follow their endpoints. `links`
/// are extra edges connecting the two namespaces, referencing the
/// *prefixed* names. No crossing detection happens here; planarize the
/// result if needed.
///
/// Prefixes must differ; collisions that slip through distinct prefixes
/// (the caller's responsibility) surface as [`Error::DuplicateNode`].
pub fn merge_graphs(
    left: &SpatialGraph,
    right: &SpatialGraph,
    left_prefix: &str,
    right_prefix: &str,
    links: Vec<SpatialEdge>,
) -> Result<SpatialGraph> {
    if left_prefix == right_prefix {
        return Err(Error::PrefixClash(left_prefix.into()));
    }

    let mut nodes = Vec::with_capacity(left.node_count() + right.node_count());
    let mut edges = Vec::with_capacity(left.edge_count() + right.edge_count() + links.len());

    for &(prefix, graph) in &[(left_prefix, left), (right_prefix, right)] {
        for node in graph.nodes() {
            nodes.push(SpatialNode::with_attrs(
                format!("{}_{}", prefix, node.name()),
                node.geometry(),
                node.attributes().clone(),
            )?);
        }
        for (_, edge) in graph.edges() {
            let mut renamed = SpatialEdge::with_attrs(
                format!("{}_{}", prefix, edge.start()),
                format!("{}_{}", prefix, edge.stop()),
                edge.geometry().cloned(),
                edge.attributes().clone(),
            )?;
            if let Some(length) = edge.length() {
                renamed = renamed.with_length(length);
            }
            edges.push(renamed);
        }
    }
    trace!(
        "merging {}+{} nodes with {} link(s)",
        left.node_count(),
        right.node_count(),
        links.len()
    );
    edges.extend(links);

    SpatialGraph::new(nodes, edges)
}

/// Replace every edge path by the straight segment between its endpoints.
///
/// Connectivity and attributes are preserved; curvature is erased and each
/// length is recomputed from the straight path.
pub fn flatten_graph(graph: &SpatialGraph) -> Result<SpatialGraph> {
    let nodes = graph.nodes().cloned().collect();
    let mut edges = Vec::with_capacity(graph.edge_count());
    for (_, edge) in graph.edges() {
        // geometry and length are left empty so insertion re-derives both
        edges.push(SpatialEdge::with_attrs(
            edge.start(),
            edge.stop(),
            None,
            edge.attributes().clone(),
        )?);
    }
    SpatialGraph::new(nodes, edges)
}

/// Rotate a whole graph around a point, by an angle in degrees.
pub fn rotate_graph(graph: &SpatialGraph, degrees: f64, center: Point<f64>) -> Result<SpatialGraph> {
    let mut nodes = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        nodes.push(SpatialNode::with_attrs(
            node.name(),
            node.geometry().rotate_around_point(degrees, center),
            node.attributes().clone(),
        )?);
    }
    let mut edges = Vec::with_capacity(graph.edge_count());
    for (_, edge) in graph.edges() {
        let mut rotated = SpatialEdge::with_attrs(
            edge.start(),
            edge.stop(),
            edge.geometry()
                .map(|g| g.rotate_around_point(degrees, center)),
            edge.attributes().clone(),
        )?;
        if let Some(length) = edge.length() {
            // lengths are invariant under rotation
            rotated = rotated.with_length(length);
        }
        edges.push(rotated);
    }
    SpatialGraph::new(nodes, edges)
}
