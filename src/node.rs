use geo::Point;
use serde_json::Value;

use crate::{Error, Result};

/// Open-ended attribute map attached to nodes and edges.
///
/// Keys are strings, values are JSON values so that attributes survive a
/// round-trip through GeoJSON properties unchanged. The mandatory fields
/// (`name`/`geometry` on nodes, `start`/`stop`/`geometry` on edges) are
/// typed struct fields and never stored here.
pub type Attributes = serde_json::Map<String, Value>;

/// A labeled point in the plane.
///
/// Nodes are constructed standalone (by a generator, or by hand) and then
/// added to one or more [`SpatialGraph`]s; insertion copies the node into
/// the graph's own storage. Positions are strictly two dimensional, which
/// the [`Point`] type enforces by construction; the "no z-coordinate" rule
/// is re-checked wherever positions enter from untyped data (see
/// [`crate::io`]).
///
/// [`SpatialGraph`]: crate::SpatialGraph
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialNode {
    name: String,
    geometry: Point<f64>,
    attributes: Attributes,
}

impl SpatialNode {
    /// Create a node with no extra attributes.
    pub fn new(name: impl Into<String>, geometry: Point<f64>) -> Self {
        SpatialNode {
            name: name.into(),
            geometry,
            attributes: Attributes::new(),
        }
    }

    /// Create a node carrying extra attributes.
    ///
    /// The mandatory `name` and `geometry` fields are typed arguments and
    /// may not be shadowed by entries in `attributes`.
    pub fn with_attrs(
        name: impl Into<String>,
        geometry: Point<f64>,
        attributes: Attributes,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidNode(
                "nodes require a non-empty 'name'".into(),
            ));
        }
        for key in attributes.keys() {
            if key == "name" || key == "geometry" {
                return Err(Error::ReservedAttribute(key.clone()));
            }
        }
        Ok(SpatialNode {
            name,
            geometry,
            attributes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> Point<f64> {
        self.geometry
    }

    /// The extra (non-mandatory) attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidNode(
                "nodes require a non-empty 'name'".into(),
            ));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_geometry(&mut self, geometry: Point<f64>) {
        self.geometry = geometry;
    }

    /// Set an attribute by name.
    ///
    /// The mandatory fields stay reachable through this path: `"name"`
    /// expects a non-empty string and `"geometry"` an `[x, y]` position,
    /// both re-validated before the field is updated. Any other name lands
    /// in the open-ended attribute map.
    pub fn set_attr(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "name" => match value.as_str() {
                Some(s) => self.set_name(s),
                None => Err(Error::InvalidNode(
                    "'name' must be a non-empty string".into(),
                )),
            },
            "geometry" => {
                let (x, y) = position(&value).ok_or_else(|| {
                    Error::InvalidNode(
                        "'geometry' must be a two dimensional [x, y] position".into(),
                    )
                })?;
                self.geometry = Point::new(x, y);
                Ok(())
            }
            _ => {
                self.attributes.insert(name.to_owned(), value);
                Ok(())
            }
        }
    }
}

/// Parse a strictly two dimensional `[x, y]` position. A third ordinate is
/// rejected, not truncated.
pub(crate) fn position(value: &Value) -> Option<(f64, f64)> {
    let arr = value.as_array()?;
    if arr.len() != 2 {
        return None;
    }
    Some((arr[0].as_f64()?, arr[1].as_f64()?))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn with_attrs_rejects_mandatory_names() {
        let mut attrs = Attributes::new();
        attrs.insert("geometry".into(), json!([0., 0.]));
        let err = SpatialNode::with_attrs("a", Point::new(0., 0.), attrs).unwrap_err();
        assert!(matches!(err, Error::ReservedAttribute(k) if k == "geometry"));
    }

    #[test]
    fn set_attr_revalidates_name() {
        let mut node = SpatialNode::new("a", Point::new(0., 0.));
        assert!(node.set_attr("name", json!("b")).is_ok());
        assert_eq!(node.name(), "b");
        assert!(node.set_attr("name", json!("")).is_err());
        assert!(node.set_attr("name", json!(17)).is_err());
        assert_eq!(node.name(), "b");
    }

    #[test]
    fn set_attr_revalidates_geometry() {
        let mut node = SpatialNode::new("a", Point::new(0., 0.));
        assert!(node.set_attr("geometry", json!([1., 2.])).is_ok());
        assert_eq!(node.geometry(), Point::new(1., 2.));
        // three ordinates means a z-coordinate: invalid
        assert!(node.set_attr("geometry", json!([1., 2., 3.])).is_err());
        assert!(node.set_attr("geometry", json!("north")).is_err());
    }

    #[test]
    fn plain_attributes_pass_through() {
        let mut node = SpatialNode::new("a", Point::new(0., 0.));
        node.set_attr("station", json!("Chatelet")).unwrap();
        assert_eq!(node.attr("station"), Some(&json!("Chatelet")));
        assert!(node.attr("line").is_none());
    }
}
