use std::collections::BTreeMap;
use std::ops::Bound;

use geo::euclidean_distance::EuclideanDistance;
use geo::MultiLineString;
use log::trace;
use petgraph::algo::dijkstra;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use serde_json::Value;

use crate::{Error, Result, SpatialEdge, SpatialNode};

/// Key of an edge in the multigraph: the unordered endpoint pair plus the
/// parallel-edge index. The pair is stored sorted so that `(u, v)` and
/// `(v, u)` address the same edges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct EdgeKey {
    a: String,
    b: String,
    index: usize,
}

impl EdgeKey {
    fn new(u: &str, v: &str, index: usize) -> Self {
        if u <= v {
            EdgeKey {
                a: u.into(),
                b: v.into(),
                index,
            }
        } else {
            EdgeKey {
                a: v.into(),
                b: u.into(),
                index,
            }
        }
    }
}

/// An undirected multigraph over [`SpatialNode`]s and [`SpatialEdge`]s.
///
/// The graph owns a generic multigraph internally and exposes only
/// validated operations; the raw store is never reachable. Node names are
/// unique; edges are keyed by `(start, stop, index)` so parallel edges can
/// coexist. Every edge's endpoints must already be in the graph when the
/// edge is added, and edges stored in a graph always carry a geometry and a
/// length (derived at insertion when missing).
///
/// Removing a node does *not* cascade: while incident edges remain, removal
/// is refused with [`Error::NodeInUse`]; remove the edges first.
#[derive(Debug, Clone, Default)]
pub struct SpatialGraph {
    graph: StableUnGraph<SpatialNode, SpatialEdge>,
    nodes: BTreeMap<String, NodeIndex>,
    edges: BTreeMap<EdgeKey, EdgeIndex>,
}

impl SpatialGraph {
    /// Build a graph from node and edge lists.
    ///
    /// All nodes are added strictly before the edges, so the edge list may
    /// reference any node of the same call.
    pub fn new(nodes: Vec<SpatialNode>, edges: Vec<SpatialEdge>) -> Result<Self> {
        let mut graph = SpatialGraph::default();
        for node in nodes {
            graph.add_node(node)?;
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    /// Add a node. Fails if the name is empty or already present.
    pub fn add_node(&mut self, node: SpatialNode) -> Result<()> {
        if node.name().is_empty() {
            return Err(Error::InvalidNode(
                "nodes require a non-empty 'name'".into(),
            ));
        }
        if self.nodes.contains_key(node.name()) {
            return Err(Error::DuplicateNode(node.name().into()));
        }
        let name = node.name().to_owned();
        let idx = self.graph.add_node(node);
        self.nodes.insert(name, idx);
        Ok(())
    }

    /// Add an edge and return its parallel index among the edges sharing
    /// the same endpoint pair.
    ///
    /// Both endpoints must already be in the graph; a missing geometry is
    /// replaced by the straight segment between the endpoint positions and
    /// a missing length by the geometry's euclidean length.
    pub fn add_edge(&mut self, mut edge: SpatialEdge) -> Result<usize> {
        let si = *self
            .nodes
            .get(edge.start())
            .ok_or_else(|| Error::MissingNode(edge.start().into()))?;
        let ti = *self
            .nodes
            .get(edge.stop())
            .ok_or_else(|| Error::MissingNode(edge.stop().into()))?;

        let (sp, tp) = (self.graph[si].geometry().0, self.graph[ti].geometry().0);
        edge.fill_derived(sp, tp);

        let index = self.next_parallel_index(edge.start(), edge.stop());
        let key = EdgeKey::new(edge.start(), edge.stop(), index);
        trace!(
            "add edge ('{}', '{}', {}), length {:?}",
            edge.start(),
            edge.stop(),
            index,
            edge.length()
        );
        let eidx = self.graph.add_edge(si, ti, edge);
        self.edges.insert(key, eidx);
        Ok(index)
    }

    fn next_parallel_index(&self, u: &str, v: &str) -> usize {
        self.pair_range(u, v)
            .next_back()
            .map_or(0, |(key, _)| key.index + 1)
    }

    fn pair_range(
        &self,
        u: &str,
        v: &str,
    ) -> impl DoubleEndedIterator<Item = (&EdgeKey, &EdgeIndex)> {
        let lo = EdgeKey::new(u, v, 0);
        let hi = EdgeKey::new(u, v, usize::MAX);
        self.edges
            .range((Bound::Included(lo), Bound::Included(hi)))
    }

    /// Remove a node and return it.
    ///
    /// Fails with [`Error::NodeInUse`] while incident edges remain.
    pub fn remove_node(&mut self, name: &str) -> Result<SpatialNode> {
        let idx = *self
            .nodes
            .get(name)
            .ok_or_else(|| Error::MissingNode(name.into()))?;
        if self.graph.edges(idx).next().is_some() {
            return Err(Error::NodeInUse(name.into()));
        }
        self.nodes.remove(name);
        self.graph
            .remove_node(idx)
            .ok_or_else(|| Error::MissingNode(name.into()))
    }

    /// Remove the edge stored under `(u, v, index)` and return it.
    pub fn remove_edge(&mut self, u: &str, v: &str, index: usize) -> Result<SpatialEdge> {
        let missing = || Error::MissingEdge {
            start: u.into(),
            stop: v.into(),
            index,
        };
        let eidx = self
            .edges
            .remove(&EdgeKey::new(u, v, index))
            .ok_or_else(missing)?;
        self.graph.remove_edge(eidx).ok_or_else(missing)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, name: &str) -> Option<&SpatialNode> {
        self.nodes.get(name).map(move |&i| &self.graph[i])
    }

    /// All nodes, in name order.
    pub fn nodes(&self) -> impl Iterator<Item = &SpatialNode> {
        self.nodes.values().map(move |&i| &self.graph[i])
    }

    /// All edges with their parallel index, ordered by endpoint pair.
    pub fn edges(&self) -> impl Iterator<Item = (usize, &SpatialEdge)> {
        self.edges
            .iter()
            .map(move |(key, &e)| (key.index, &self.graph[e]))
    }

    /// Whether at least one edge connects the two names.
    pub fn has_edge(&self, u: &str, v: &str) -> bool {
        match (self.nodes.get(u), self.nodes.get(v)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// The edge stored under `(u, v, index)`, if any.
    pub fn edge(&self, u: &str, v: &str, index: usize) -> Option<&SpatialEdge> {
        self.edges
            .get(&EdgeKey::new(u, v, index))
            .map(move |&e| &self.graph[e])
    }

    /// All parallel edges between a pair, with their indices.
    pub fn edges_between(&self, u: &str, v: &str) -> Vec<(usize, &SpatialEdge)> {
        self.pair_range(u, v)
            .map(move |(key, &e)| (key.index, &self.graph[e]))
            .collect()
    }

    /// Names of the neighbors of a node; empty if the node is unknown.
    pub fn neighbors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.nodes
            .get(name)
            .into_iter()
            .flat_map(move |&i| self.graph.neighbors(i).map(move |j| self.graph[j].name()))
    }

    /// Union of all edge paths, optionally excluding specific edges by
    /// their `(start, stop, index)` key.
    pub fn segments(&self, exclude: &[(&str, &str, usize)]) -> MultiLineString<f64> {
        let mut lines = Vec::with_capacity(self.edges.len());
        for (key, &eidx) in &self.edges {
            if exclude
                .iter()
                .any(|&(u, v, i)| EdgeKey::new(u, v, i) == *key)
            {
                continue;
            }
            if let Some(geometry) = self.graph[eidx].geometry() {
                lines.push(geometry.clone());
            }
        }
        MultiLineString(lines)
    }

    /// Straight-line ("as the crow flies") distance between two nodes.
    pub fn metric_distance(&self, u: &str, v: &str) -> Result<f64> {
        let a = self.node(u).ok_or_else(|| Error::MissingNode(u.into()))?;
        let b = self.node(v).ok_or_else(|| Error::MissingNode(v.into()))?;
        Ok(a.geometry().euclidean_distance(&b.geometry()))
    }

    /// Length-weighted shortest path distance; NaN when no path exists.
    pub fn route_distance(&self, u: &str, v: &str) -> Result<f64> {
        self.shortest_path_length(u, v, "length")
    }

    /// Shortest path distance under a chosen attribute as edge weight.
    ///
    /// An edge missing the attribute (or carrying a non-numeric value)
    /// counts as weight 1. Disconnected nodes yield NaN, not an error.
    pub fn shortest_path_length(&self, u: &str, v: &str, weight: &str) -> Result<f64> {
        let a = *self
            .nodes
            .get(u)
            .ok_or_else(|| Error::MissingNode(u.into()))?;
        let b = *self
            .nodes
            .get(v)
            .ok_or_else(|| Error::MissingNode(v.into()))?;
        let costs = dijkstra(&self.graph, a, Some(b), |e| edge_weight(e.weight(), weight));
        Ok(costs.get(&b).copied().unwrap_or(f64::NAN))
    }

    /// Detour index: route distance over metric distance. NaN when the
    /// nodes are disconnected (the NaN propagates arithmetically).
    pub fn route_factor(&self, u: &str, v: &str) -> Result<f64> {
        Ok(self.route_distance(u, v)? / self.metric_distance(u, v)?)
    }

    /// Mean detour index from one node to every other node, ignoring
    /// unreachable pairs. NaN when nothing is reachable.
    pub fn node_accessibility(&self, name: &str) -> Result<f64> {
        if !self.nodes.contains_key(name) {
            return Err(Error::MissingNode(name.into()));
        }
        let mut sum = 0.;
        let mut count = 0usize;
        for other in self.nodes.keys() {
            if other == name {
                continue;
            }
            let factor = self.route_factor(name, other)?;
            if !factor.is_nan() {
                sum += factor;
                count += 1;
            }
        }
        if count == 0 {
            Ok(f64::NAN)
        } else {
            Ok(sum / count as f64)
        }
    }

    /// Mean node accessibility over the whole graph, ignoring isolated
    /// nodes. NaN for a graph with no reachable pair at all.
    pub fn graph_accessibility(&self) -> f64 {
        let names: Vec<&String> = self.nodes.keys().collect();
        let mut sum = 0.;
        let mut count = 0usize;
        for name in names {
            if let Ok(accessibility) = self.node_accessibility(name) {
                if !accessibility.is_nan() {
                    sum += accessibility;
                    count += 1;
                }
            }
        }
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }
}

fn edge_weight(edge: &SpatialEdge, attr: &str) -> f64 {
    if attr == "length" {
        // always filled at insertion
        edge.length().unwrap_or(1.)
    } else {
        edge.attr(attr).and_then(Value::as_f64).unwrap_or(1.)
    }
}
