//! GeoJSON conversion and file round-tripping.
//!
//! A graph serializes to a `FeatureCollection`: each node becomes a Point
//! feature and each edge a LineString feature, telling each other apart by
//! an `object_type` property (`"SpatialNode"` / `"SpatialEdge"`). Extra
//! attributes flatten into the feature properties. An edge that has not
//! been given a path yet serializes as an empty LineString and comes back
//! as a derive-at-insertion edge.

use std::fs;
use std::path::Path;

use geo::{Coordinate, LineString, Point};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value as GeomValue};
use log::debug;
use serde_json::Value;

use crate::node::Attributes;
use crate::{Error, Result, SpatialEdge, SpatialGraph, SpatialNode};

pub fn node_to_feature(node: &SpatialNode) -> Feature {
    let mut properties = node.attributes().clone();
    properties.insert("name".into(), Value::String(node.name().into()));
    properties.insert("object_type".into(), Value::String("SpatialNode".into()));

    let point = node.geometry();
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeomValue::Point(vec![point.x(), point.y()]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn edge_to_feature(edge: &SpatialEdge) -> Feature {
    let mut properties = edge.attributes().clone();
    properties.insert("start".into(), Value::String(edge.start().into()));
    properties.insert("stop".into(), Value::String(edge.stop().into()));
    if let Some(length) = edge.length() {
        properties.insert("length".into(), Value::from(length));
    }
    properties.insert("object_type".into(), Value::String("SpatialEdge".into()));

    let coordinates = edge
        .geometry()
        .map(|path| path.0.iter().map(|c| vec![c.x, c.y]).collect())
        .unwrap_or_default();
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeomValue::LineString(coordinates))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Serialize a graph, nodes first. Edge-only output (`include_nodes =
/// false`) cannot be read back into a graph on its own.
pub fn graph_to_geojson(
    graph: &SpatialGraph,
    include_nodes: bool,
    include_edges: bool,
) -> FeatureCollection {
    let mut features = Vec::new();
    if include_nodes {
        features.extend(graph.nodes().map(node_to_feature));
    }
    if include_edges {
        features.extend(graph.edges().map(|(_, edge)| edge_to_feature(edge)));
    }
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Rebuild a graph from a feature collection written by
/// [`graph_to_geojson`].
///
/// Features with an unrecognized `object_type` are skipped; a feature
/// without one is an error.
pub fn graph_from_geojson(collection: &FeatureCollection) -> Result<SpatialGraph> {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for feature in &collection.features {
        let mut properties = feature.properties.clone().unwrap_or_default();
        let object_type = properties.remove("object_type").ok_or_else(|| {
            Error::InvalidGeoJson("feature has no 'object_type' property".into())
        })?;
        match object_type.as_str() {
            Some("SpatialNode") => {
                let name = take_identifier(&mut properties, "name")?;
                nodes.push(SpatialNode::with_attrs(name, point_of(feature)?, properties)?);
            }
            Some("SpatialEdge") => {
                let start = take_identifier(&mut properties, "start")?;
                let stop = take_identifier(&mut properties, "stop")?;
                edges.push(SpatialEdge::with_attrs(
                    start,
                    stop,
                    linestring_of(feature)?,
                    properties,
                )?);
            }
            _ => debug!("skipping feature with object_type {}", object_type),
        }
    }
    SpatialGraph::new(nodes, edges)
}

pub fn read_geojson_file<P: AsRef<Path>>(path: P) -> Result<SpatialGraph> {
    let raw = fs::read_to_string(path)?;
    match raw.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => graph_from_geojson(&collection),
        _ => Err(Error::InvalidGeoJson("expected a FeatureCollection".into())),
    }
}

pub fn write_geojson_file<P: AsRef<Path>>(graph: &SpatialGraph, path: P) -> Result<()> {
    let collection = graph_to_geojson(graph, true, true);
    fs::write(path, serde_json::to_string(&collection)?)?;
    Ok(())
}

// identifiers written by other tools are sometimes bare numbers
fn take_identifier(properties: &mut Attributes, key: &str) -> Result<String> {
    let value = properties
        .remove(key)
        .ok_or_else(|| Error::InvalidGeoJson(format!("feature is missing '{}'", key)))?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(Error::InvalidGeoJson(format!(
            "'{}' must be a string or a number",
            key
        ))),
    }
}

fn point_of(feature: &Feature) -> Result<Point<f64>> {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(GeomValue::Point(position)) => {
            if position.len() != 2 {
                return Err(Error::InvalidGeoJson(
                    "node positions must be two dimensional [x, y] pairs".into(),
                ));
            }
            Ok(Point::new(position[0], position[1]))
        }
        _ => Err(Error::InvalidGeoJson("nodes require a Point geometry".into())),
    }
}

fn linestring_of(feature: &Feature) -> Result<Option<LineString<f64>>> {
    let coordinates = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(GeomValue::LineString(coordinates)) => coordinates,
        _ => {
            return Err(Error::InvalidGeoJson(
                "edges require a LineString geometry".into(),
            ))
        }
    };
    if coordinates.is_empty() {
        return Ok(None);
    }
    let mut coords = Vec::with_capacity(coordinates.len());
    for position in coordinates {
        if position.len() != 2 {
            return Err(Error::InvalidGeoJson(
                "edge positions must be two dimensional [x, y] pairs".into(),
            ));
        }
        coords.push(Coordinate {
            x: position[0],
            y: position[1],
        });
    }
    Ok(Some(LineString(coords)))
}
