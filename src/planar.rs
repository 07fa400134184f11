use std::collections::BTreeMap;

use geo::Point;
use log::debug;

use crate::intersect::{consistent_intersection, curve_intersection, split_at_crossings, PointKey};
use crate::{Attributes, Error, Result, SpatialEdge, SpatialGraph, SpatialNode};

/// Node-to-be at one coordinate of the planarized graph.
#[derive(Debug)]
struct PendingNode {
    name: String,
    attributes: Attributes,
}

/// Back-reference from a fragment to the edge it was split from, so that
/// attribute reattachment can find the source even when several fragments
/// map back to the same edge. Carried alongside the fragment, never inside
/// its attribute map.
#[derive(Debug)]
struct Origin {
    start: String,
    stop: String,
    index: usize,
}

/// Return a new graph with every edge-edge crossing replaced by a node.
///
/// Each edge is intersected against the union of every other edge; a node
/// is synthesized at each crossing point not already occupied by a node
/// (named `{prefix}_{counter}`, with one counter for the whole run), and
/// the edge is split there into fragments. Coordinates are the identity
/// key: an intersection point and an existing node at the same exact
/// floating-point coordinate are the same node.
///
/// With `keep_data`, nodes keep their attributes and an edge that came
/// through *unsplit* is restored verbatim from the source graph. Fragments
/// of an actually-split edge only carry their derived geometry and length:
/// a fragment is no longer the whole edge, so the original attribute set is
/// forfeited. Without `keep_data`, surviving nodes are renamed `node_{i}`
/// and all attributes are dropped.
///
/// Collinear overlaps between edges never produce split points; only
/// transversal crossings do. An intersection result the kernel contract
/// does not cover aborts the whole run with
/// [`Error::UnsupportedIntersection`].
///
/// The source graph is left untouched; the result is a fresh graph.
pub fn make_planar(graph: &SpatialGraph, keep_data: bool, prefix: &str) -> Result<SpatialGraph> {
    // seed the coordinate map from the existing nodes
    let mut points: BTreeMap<PointKey, PendingNode> = BTreeMap::new();
    for (i, node) in graph.nodes().enumerate() {
        let pending = if keep_data {
            PendingNode {
                name: node.name().to_owned(),
                attributes: node.attributes().clone(),
            }
        } else {
            PendingNode {
                name: format!("node_{}", i),
                attributes: Attributes::new(),
            }
        };
        points.insert(node.geometry().0.into(), pending);
    }

    let mut counter = 0usize;
    let mut fragments: Vec<(SpatialEdge, Origin)> = Vec::new();

    for (index, edge) in graph.edges() {
        let geometry = match edge.geometry() {
            Some(geometry) => geometry,
            // stored edges always carry a geometry
            None => continue,
        };
        let others = graph.segments(&[(edge.start(), edge.stop(), index)]);
        let crossings = consistent_intersection(curve_intersection(geometry, &others))?;
        debug!(
            "edge ('{}', '{}', {}): {} intersection point(s)",
            edge.start(),
            edge.stop(),
            index,
            crossings.0.len()
        );

        for point in &crossings.0 {
            let key = PointKey::from(point.0);
            if !points.contains_key(&key) {
                points.insert(
                    key,
                    PendingNode {
                        name: format!("{}_{}", prefix, counter),
                        attributes: Attributes::new(),
                    },
                );
                counter += 1;
            }
        }

        let pieces = if others.0.is_empty() {
            // nothing to compare against: the edge is a single fragment
            vec![geometry.clone()]
        } else {
            split_at_crossings(geometry, &others)
        };
        for piece in pieces {
            let start = resolve(&points, piece.0.first())?;
            let stop = resolve(&points, piece.0.last())?;
            fragments.push((
                SpatialEdge::new(start, stop).with_geometry(piece),
                Origin {
                    start: edge.start().to_owned(),
                    stop: edge.stop().to_owned(),
                    index,
                },
            ));
        }
    }

    let nodes = points
        .iter()
        .map(|(key, pending)| {
            SpatialNode::with_attrs(pending.name.clone(), Point(key.0), pending.attributes.clone())
        })
        .collect::<Result<Vec<_>>>()?;

    let mut edges = Vec::with_capacity(fragments.len());
    for (fragment, origin) in fragments {
        // a fragment still spanning its origin's endpoints came through
        // unsplit: restore the original edge wholesale
        let unsplit = (fragment.start() == origin.start && fragment.stop() == origin.stop)
            || (fragment.start() == origin.stop && fragment.stop() == origin.start);
        if keep_data && unsplit {
            if let Some(original) = graph.edge(&origin.start, &origin.stop, origin.index) {
                edges.push(original.clone());
                continue;
            }
        }
        edges.push(fragment);
    }

    SpatialGraph::new(nodes, edges)
}

fn resolve<'a>(
    points: &'a BTreeMap<PointKey, PendingNode>,
    coord: Option<&geo::Coordinate<f64>>,
) -> Result<&'a str> {
    let coord = coord.ok_or_else(|| Error::InvalidEdge("empty fragment geometry".into()))?;
    points
        .get(&PointKey::from(*coord))
        .map(|pending| pending.name.as_str())
        .ok_or_else(|| {
            Error::InvalidEdge(format!(
                "fragment endpoint ({}, {}) does not coincide with any node",
                coord.x, coord.y
            ))
        })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{Coordinate, LineString, Point};
    use serde_json::json;

    use super::*;
    use crate::generators::square_lattice_data;

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Two straight edges crossing at (1, 1).
    fn crossing_graph() -> SpatialGraph {
        let nodes = vec![
            SpatialNode::new("a", Point::new(0., 0.)),
            SpatialNode::new("b", Point::new(2., 2.)),
            SpatialNode::new("c", Point::new(0., 2.)),
            SpatialNode::new("d", Point::new(2., 0.)),
        ];
        let edges = vec![SpatialEdge::new("a", "b"), SpatialEdge::new("c", "d")];
        SpatialGraph::new(nodes, edges).unwrap()
    }

    #[test]
    fn one_transversal_crossing_becomes_one_node_and_four_fragments() {
        init_log();
        let planar = make_planar(&crossing_graph(), true, "intersection").unwrap();

        assert_eq!(planar.node_count(), 5);
        assert_eq!(planar.edge_count(), 4);

        let crossing = planar.node("intersection_0").expect("synthesized node");
        assert_eq!(crossing.geometry(), Point::new(1., 1.));

        for (_, edge) in planar.edges() {
            assert_relative_eq!(edge.length().unwrap(), 2f64.sqrt());
        }
        for name in &["a", "b", "c", "d"] {
            assert!(planar.has_edge(name, "intersection_0"));
        }
    }

    #[test]
    fn planar_input_passes_through_with_attributes() {
        init_log();
        let mut nodes = vec![
            SpatialNode::new("a", Point::new(0., 0.)),
            SpatialNode::new("b", Point::new(1., 0.)),
            SpatialNode::new("c", Point::new(1., 1.)),
        ];
        nodes[0].set_attr("hub", json!(true)).unwrap();
        let mut edge = SpatialEdge::new("a", "b");
        edge.set_attr("road", json!("main street")).unwrap();
        let graph =
            SpatialGraph::new(nodes, vec![edge, SpatialEdge::new("b", "c")]).unwrap();

        let planar = make_planar(&graph, true, "intersection").unwrap();
        assert_eq!(planar.node_count(), 3);
        assert_eq!(planar.edge_count(), 2);
        assert_eq!(planar.node("a").unwrap().attr("hub"), Some(&json!(true)));
        assert_eq!(
            planar.edge("a", "b", 0).unwrap().attr("road"),
            Some(&json!("main street"))
        );
    }

    #[test]
    fn split_fragments_forfeit_the_original_attributes() {
        let mut graph = crossing_graph();
        let mut edge = graph.remove_edge("a", "b", 0).unwrap();
        edge.set_attr("road", json!("diagonal")).unwrap();
        graph.add_edge(edge).unwrap();

        let planar = make_planar(&graph, true, "intersection").unwrap();
        let fragment = planar.edge("a", "intersection_0", 0).unwrap();
        assert!(fragment.attr("road").is_none());
    }

    #[test]
    fn keep_data_false_renames_nodes() {
        let planar = make_planar(&crossing_graph(), false, "intersection").unwrap();
        assert_eq!(planar.node_count(), 5);
        assert!(planar.node("a").is_none());
        assert!(planar.node("node_0").is_some());
        assert!(planar.node("intersection_0").is_some());
    }

    #[test]
    fn planarization_is_idempotent() {
        let planar = make_planar(&crossing_graph(), true, "intersection").unwrap();
        let again = make_planar(&planar, true, "intersection").unwrap();
        assert_eq!(again.node_count(), planar.node_count());
        assert_eq!(again.edge_count(), planar.edge_count());
    }

    #[test]
    fn collinear_overlap_synthesizes_no_nodes() {
        let nodes = vec![
            SpatialNode::new("a", Point::new(0., 0.)),
            SpatialNode::new("b", Point::new(2., 0.)),
            SpatialNode::new("c", Point::new(1., 0.)),
            SpatialNode::new("d", Point::new(3., 0.)),
        ];
        let edges = vec![SpatialEdge::new("a", "b"), SpatialEdge::new("c", "d")];
        let graph = SpatialGraph::new(nodes, edges).unwrap();

        let planar = make_planar(&graph, true, "intersection").unwrap();
        assert_eq!(planar.node_count(), 4);
        assert_eq!(planar.edge_count(), 2);
    }

    #[test]
    fn a_lattice_is_already_planar() {
        init_log();
        let (nodes, edges) = square_lattice_data(1., 1., 2, 2, "square");
        let graph = SpatialGraph::new(nodes, edges).unwrap();
        let planar = make_planar(&graph, true, "intersection").unwrap();
        assert_eq!(planar.node_count(), graph.node_count());
        assert_eq!(planar.edge_count(), graph.edge_count());
    }

    #[test]
    fn crossing_at_an_existing_node_coordinate_reuses_it() {
        // "x" sits exactly where the two edges cross; no node is synthesized
        let nodes = vec![
            SpatialNode::new("a", Point::new(0., 0.)),
            SpatialNode::new("b", Point::new(2., 2.)),
            SpatialNode::new("c", Point::new(0., 2.)),
            SpatialNode::new("d", Point::new(2., 0.)),
            SpatialNode::new("x", Point::new(1., 1.)),
        ];
        let edges = vec![SpatialEdge::new("a", "b"), SpatialEdge::new("c", "d")];
        let graph = SpatialGraph::new(nodes, edges).unwrap();

        let planar = make_planar(&graph, true, "intersection").unwrap();
        assert_eq!(planar.node_count(), 5);
        assert_eq!(planar.edge_count(), 4);
        assert!(planar.node("intersection_0").is_none());
        assert!(planar.has_edge("a", "x"));
    }

    #[test]
    fn mixed_overlap_and_crossing_is_fatal() {
        let nodes = vec![
            SpatialNode::new("a", Point::new(0., 0.)),
            SpatialNode::new("b", Point::new(2., 0.)),
            SpatialNode::new("c", Point::new(1., 0.)),
            SpatialNode::new("d", Point::new(3., 0.)),
            SpatialNode::new("e", Point::new(0.5, -1.)),
            SpatialNode::new("f", Point::new(0.5, 1.)),
        ];
        let edges = vec![
            SpatialEdge::new("a", "b"),
            SpatialEdge::new("c", "d"),
            SpatialEdge::new("e", "f"),
        ];
        let graph = SpatialGraph::new(nodes, edges).unwrap();
        assert!(matches!(
            make_planar(&graph, true, "intersection"),
            Err(Error::UnsupportedIntersection(_))
        ));
    }

    #[test]
    fn curved_parallel_edges_split_each_other() {
        let nodes = vec![
            SpatialNode::new("a", Point::new(0., 0.)),
            SpatialNode::new("b", Point::new(2., 0.)),
        ];
        let over = LineString(vec![
            Coordinate { x: 0., y: 0. },
            Coordinate { x: 0.5, y: 1. },
            Coordinate { x: 1.5, y: -1. },
            Coordinate { x: 2., y: 0. },
        ]);
        let edges = vec![
            SpatialEdge::new("a", "b"),
            SpatialEdge::new("a", "b").with_geometry(over),
        ];
        let graph = SpatialGraph::new(nodes, edges).unwrap();

        let planar = make_planar(&graph, true, "x").unwrap();
        // the zig-zag crosses the straight edge once between its endpoints
        assert_eq!(planar.node_count(), 3);
        assert_eq!(planar.edge_count(), 4);
        assert!(planar.node("x_0").is_some());
    }
}
