use geo::{Coordinate, LineString};
use serde_json::Value;

use crate::node::{position, Attributes};
use crate::{Error, Result};

/// A connection between two named nodes with an explicit geometric path.
///
/// `geometry` is optional on a standalone edge: `None` means "derive the
/// straight segment between `start` and `stop` when the edge is added to a
/// graph". `length` is derived from the geometry at insertion time and
/// cached; a caller may also supply it up front through the attribute map.
///
/// A graph may hold several parallel edges between the same pair of node
/// names; each gets a distinct index when added. The literal attribute name
/// `key` is therefore reserved (it is the underlying multi-edge index) and
/// rejected at construction, before any insertion is attempted.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialEdge {
    start: String,
    stop: String,
    geometry: Option<LineString<f64>>,
    length: Option<f64>,
    attributes: Attributes,
}

impl SpatialEdge {
    /// Create a bare edge; geometry and length are derived at insertion.
    pub fn new(start: impl Into<String>, stop: impl Into<String>) -> Self {
        SpatialEdge {
            start: start.into(),
            stop: stop.into(),
            geometry: None,
            length: None,
            attributes: Attributes::new(),
        }
    }

    /// Attach an explicit path.
    pub fn with_geometry(mut self, geometry: LineString<f64>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Attach a precomputed length, bypassing derivation at insertion.
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    /// Create an edge carrying extra attributes.
    ///
    /// A `length` entry is hoisted into the typed field; `key` and the
    /// mandatory field names are rejected.
    pub fn with_attrs(
        start: impl Into<String>,
        stop: impl Into<String>,
        geometry: Option<LineString<f64>>,
        mut attributes: Attributes,
    ) -> Result<Self> {
        let start = start.into();
        let stop = stop.into();
        if start.is_empty() || stop.is_empty() {
            return Err(Error::InvalidEdge(
                "edges require non-empty 'start' and 'stop' names".into(),
            ));
        }
        for reserved in &["key", "start", "stop", "geometry"] {
            if attributes.contains_key(*reserved) {
                return Err(Error::ReservedAttribute((*reserved).into()));
            }
        }
        let length = match attributes.remove("length") {
            Some(v) => Some(v.as_f64().ok_or_else(|| {
                Error::InvalidEdge("'length' must be a number".into())
            })?),
            None => None,
        };
        Ok(SpatialEdge {
            start,
            stop,
            geometry,
            length,
            attributes,
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn stop(&self) -> &str {
        &self.stop
    }

    pub fn geometry(&self) -> Option<&LineString<f64>> {
        self.geometry.as_ref()
    }

    pub fn length(&self) -> Option<f64> {
        self.length
    }

    /// The extra (non-mandatory) attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set an attribute by name, re-validating mandatory fields.
    ///
    /// `"start"`/`"stop"` expect non-empty strings, `"geometry"` an array
    /// of `[x, y]` positions, `"length"` a number. `"key"` is reserved.
    pub fn set_attr(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "key" => Err(Error::ReservedAttribute("key".into())),
            "start" | "stop" => {
                let s = value.as_str().filter(|s| !s.is_empty()).ok_or_else(|| {
                    Error::InvalidEdge(format!("'{}' must be a non-empty string", name))
                })?;
                if name == "start" {
                    self.start = s.to_owned();
                } else {
                    self.stop = s.to_owned();
                }
                Ok(())
            }
            "geometry" => {
                self.geometry = Some(linestring_from_value(&value)?);
                Ok(())
            }
            "length" => {
                self.length = Some(value.as_f64().ok_or_else(|| {
                    Error::InvalidEdge("'length' must be a number".into())
                })?);
                Ok(())
            }
            _ => {
                self.attributes.insert(name.to_owned(), value);
                Ok(())
            }
        }
    }

    /// Fill in missing geometry/length from the endpoint positions.
    /// Called when the edge is added to a graph.
    pub(crate) fn fill_derived(&mut self, start: Coordinate<f64>, stop: Coordinate<f64>) {
        use geo::euclidean_length::EuclideanLength;

        let geometry = self
            .geometry
            .get_or_insert_with(|| LineString(vec![start, stop]));
        if self.length.is_none() {
            self.length = Some(geometry.euclidean_length());
        }
    }
}

fn linestring_from_value(value: &Value) -> Result<LineString<f64>> {
    let arr = value.as_array().ok_or_else(|| {
        Error::InvalidEdge("'geometry' must be an array of [x, y] positions".into())
    })?;
    let mut coords = Vec::with_capacity(arr.len());
    for pos in arr {
        let (x, y) = position(pos).ok_or_else(|| {
            Error::InvalidEdge(
                "'geometry' positions must be two dimensional [x, y] pairs".into(),
            )
        })?;
        coords.push(Coordinate { x, y });
    }
    Ok(LineString(coords))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn key_attribute_is_reserved() {
        let mut attrs = Attributes::new();
        attrs.insert("key".into(), json!("x"));
        let err = SpatialEdge::with_attrs("a", "b", None, attrs).unwrap_err();
        assert!(matches!(err, Error::ReservedAttribute(k) if k == "key"));

        let mut edge = SpatialEdge::new("a", "b");
        assert!(edge.set_attr("key", json!(0)).is_err());
    }

    #[test]
    fn length_attribute_is_hoisted() {
        let mut attrs = Attributes::new();
        attrs.insert("length".into(), json!(4.5));
        attrs.insert("road".into(), json!(true));
        let edge = SpatialEdge::with_attrs("a", "b", None, attrs).unwrap();
        assert_eq!(edge.length(), Some(4.5));
        assert_eq!(edge.attr("road"), Some(&json!(true)));
        assert!(edge.attr("length").is_none());
    }

    #[test]
    fn derived_geometry_is_the_straight_segment() {
        let mut edge = SpatialEdge::new("a", "b");
        edge.fill_derived(Coordinate { x: 0., y: 0. }, Coordinate { x: 3., y: 4. });
        assert_eq!(edge.length(), Some(5.));
        let geom = edge.geometry().unwrap();
        assert_eq!(geom.0.len(), 2);
        assert_eq!(geom.0[1], Coordinate { x: 3., y: 4. });
    }

    #[test]
    fn explicit_geometry_survives_derivation() {
        let path = LineString(vec![
            Coordinate { x: 0., y: 0. },
            Coordinate { x: 0., y: 1. },
            Coordinate { x: 1., y: 1. },
        ]);
        let mut edge = SpatialEdge::new("a", "b").with_geometry(path.clone());
        edge.fill_derived(Coordinate { x: 0., y: 0. }, Coordinate { x: 1., y: 1. });
        assert_eq!(edge.geometry(), Some(&path));
        assert_eq!(edge.length(), Some(2.));
    }

    #[test]
    fn set_attr_parses_geometry() {
        let mut edge = SpatialEdge::new("a", "b");
        edge.set_attr("geometry", json!([[0., 0.], [1., 0.]])).unwrap();
        assert_eq!(edge.geometry().map(|g| g.0.len()), Some(2));
        assert!(edge.set_attr("geometry", json!([[0., 0., 0.]])).is_err());
    }
}
