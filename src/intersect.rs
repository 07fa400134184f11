//! Curve intersection support for the planarizer.
//!
//! The geometry kernel only knows how to intersect two line *segments*
//! ([`line_intersection`]); everything here lifts that primitive to whole
//! polylines: [`curve_intersection`] intersects one path against a union of
//! paths and reports the result as a single [`Geometry`] whose variant
//! depends on the geometric configuration,
//! [`consistent_intersection`] normalizes that shape to a plain point set,
//! and [`split_at_crossings`] cuts a path into ordered fragments at the
//! transversal crossing points.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Coordinate, Geometry, GeometryCollection, Line, LineString, MultiLineString, MultiPoint,
    Point,
};

use crate::{Error, Result};

/// Wraps a [`Coordinate`] to support exact lexicographic ordering.
///
/// The ordering is by `x` and then by `y`, with no tolerance: two
/// geometrically coincident but numerically distinct points are different
/// keys. This is the deduplication key the planarizer uses to decide
/// whether an intersection point is an existing node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointKey(pub Coordinate<f64>);

/// Create from `Coordinate` while checking the components are finite.
impl From<Coordinate<f64>> for PointKey {
    fn from(pt: Coordinate<f64>) -> Self {
        assert!(pt.x.is_finite(), "point key requires a finite x-coordinate");
        assert!(pt.y.is_finite(), "point key requires a finite y-coordinate");
        PointKey(pt)
    }
}

impl PartialOrd for PointKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
    }
}

/// Derive `Ord` from `PartialOrd` and expect to not fail: the constructor
/// only admits finite coordinates.
impl Ord for PointKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl Eq for PointKey {}

/// Intersect a path with a union of other paths.
///
/// The result mirrors the shapes a general-purpose kernel produces:
///
/// - no intersection at all: an empty [`GeometryCollection`],
/// - isolated crossing points: a [`Point`] or [`MultiPoint`],
/// - collinear overlap along a sub-path: a [`LineString`] or
///   [`MultiLineString`],
/// - both at once: a non-empty [`GeometryCollection`] (which
///   [`consistent_intersection`] refuses).
///
/// A collinear result degenerated to a single coordinate is an endpoint
/// touch and is reported as a point.
pub fn curve_intersection(
    line: &LineString<f64>,
    others: &MultiLineString<f64>,
) -> Geometry<f64> {
    let mut seen: BTreeSet<PointKey> = BTreeSet::new();
    let mut points: Vec<Coordinate<f64>> = Vec::new();
    let mut overlaps: Vec<Line<f64>> = Vec::new();

    for segment in line.lines() {
        for other in &others.0 {
            for other_segment in other.lines() {
                match line_intersection(segment, other_segment) {
                    Some(LineIntersection::SinglePoint { intersection, .. }) => {
                        if seen.insert(intersection.into()) {
                            points.push(intersection);
                        }
                    }
                    Some(LineIntersection::Collinear { intersection }) => {
                        if intersection.start == intersection.end {
                            // zero-length overlap: a touch, not a sub-path
                            if seen.insert(intersection.start.into()) {
                                points.push(intersection.start);
                            }
                        } else {
                            overlaps.push(intersection);
                        }
                    }
                    None => {}
                }
            }
        }
    }

    match (points.is_empty(), overlaps.is_empty()) {
        (true, true) => Geometry::GeometryCollection(GeometryCollection(vec![])),
        (false, true) => {
            if points.len() == 1 {
                Geometry::Point(Point(points[0]))
            } else {
                Geometry::MultiPoint(MultiPoint(points.into_iter().map(Point).collect()))
            }
        }
        (true, false) => {
            if overlaps.len() == 1 {
                Geometry::LineString(line_to_linestring(overlaps[0]))
            } else {
                Geometry::MultiLineString(MultiLineString(
                    overlaps.into_iter().map(line_to_linestring).collect(),
                ))
            }
        }
        (false, false) => {
            let mut parts: Vec<Geometry<f64>> =
                points.into_iter().map(|c| Geometry::Point(Point(c))).collect();
            parts.extend(
                overlaps
                    .into_iter()
                    .map(|l| Geometry::LineString(line_to_linestring(l))),
            );
            Geometry::GeometryCollection(GeometryCollection(parts))
        }
    }
}

fn line_to_linestring(line: Line<f64>) -> LineString<f64> {
    LineString(vec![line.start, line.end])
}

/// Normalize an intersection result to a uniform point set.
///
/// - a single point becomes a one-element point set,
/// - a point set is returned as-is,
/// - a linear object (the inputs overlap along a sub-path instead of
///   crossing at isolated points) becomes an *empty* point set: overlapping
///   segments yield no actionable crossing point,
/// - an empty collection becomes an empty point set,
/// - anything else is a contract violation of the kernel and fails loudly
///   with [`Error::UnsupportedIntersection`].
pub fn consistent_intersection(intersection: Geometry<f64>) -> Result<MultiPoint<f64>> {
    match intersection {
        Geometry::Point(p) => Ok(MultiPoint(vec![p])),
        Geometry::MultiPoint(points) => Ok(points),
        Geometry::LineString(_) | Geometry::MultiLineString(_) => Ok(MultiPoint(vec![])),
        Geometry::GeometryCollection(ref collection) if collection.0.is_empty() => {
            Ok(MultiPoint(vec![]))
        }
        other => Err(Error::UnsupportedIntersection(geometry_name(&other).into())),
    }
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Split a path at every transversal crossing with the given union,
/// returning the ordered sub-paths.
///
/// Crossings at the path's own endpoints never split; collinear overlaps
/// never split. The cut coordinates are the exact kernel outputs, so they
/// compare equal (as [`PointKey`]s) to the points reported by
/// [`curve_intersection`] for the same inputs.
pub fn split_at_crossings(
    line: &LineString<f64>,
    others: &MultiLineString<f64>,
) -> Vec<LineString<f64>> {
    let coords = &line.0;
    if coords.len() < 2 {
        return vec![line.clone()];
    }

    // cut points, tagged with the segment they fall on and their position
    // along it so they can be ordered along the path
    let mut cuts: Vec<(usize, f64, Coordinate<f64>)> = Vec::new();
    for (i, segment) in line.lines().enumerate() {
        for other in &others.0 {
            for other_segment in other.lines() {
                match line_intersection(segment, other_segment) {
                    Some(LineIntersection::SinglePoint { intersection, .. }) => {
                        cuts.push((i, position_along(&segment, intersection), intersection));
                    }
                    Some(LineIntersection::Collinear { intersection })
                        if intersection.start == intersection.end =>
                    {
                        let at = intersection.start;
                        cuts.push((i, position_along(&segment, at), at));
                    }
                    _ => {}
                }
            }
        }
    }
    cuts.sort_unstable_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
    });

    // interleave vertices and cuts along the path, merging coincident
    // entries (a cut on a vertex appears on both adjacent segments)
    let mut path: Vec<(Coordinate<f64>, bool)> = Vec::with_capacity(coords.len() + cuts.len());
    path.push((coords[0], false));
    let mut pending = cuts.into_iter().peekable();
    for i in 0..coords.len() - 1 {
        while let Some(&(ci, _, at)) = pending.peek() {
            if ci != i {
                break;
            }
            pending.next();
            push_merged(&mut path, at, true);
        }
        push_merged(&mut path, coords[i + 1], false);
    }
    // the path's own endpoints never open a fragment
    if let Some(first) = path.first_mut() {
        first.1 = false;
    }
    if let Some(last) = path.last_mut() {
        last.1 = false;
    }

    let mut fragments = Vec::new();
    let mut current = vec![path[0].0];
    for &(coord, is_cut) in &path[1..] {
        current.push(coord);
        if is_cut {
            fragments.push(LineString(std::mem::replace(&mut current, vec![coord])));
        }
    }
    if current.len() > 1 {
        fragments.push(LineString(current));
    }
    if fragments.is_empty() {
        vec![line.clone()]
    } else {
        fragments
    }
}

fn push_merged(path: &mut Vec<(Coordinate<f64>, bool)>, at: Coordinate<f64>, cut: bool) {
    if let Some(last) = path.last_mut() {
        if PointKey::from(last.0) == PointKey::from(at) {
            last.1 |= cut;
            return;
        }
    }
    path.push((at, cut));
}

/// Position of a point along a segment, as a fraction of its extent. Only
/// used to order cuts that share a segment.
fn position_along(segment: &Line<f64>, at: Coordinate<f64>) -> f64 {
    let d = segment.end - segment.start;
    let v = at - segment.start;
    let len2 = d.x * d.x + d.y * d.y;
    if len2 == 0. {
        0.
    } else {
        (v.x * d.x + v.y * d.y) / len2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(coords: &[(f64, f64)]) -> LineString<f64> {
        coords.iter().map(|&(x, y)| Coordinate { x, y }).collect()
    }

    #[test]
    fn point_key_orders_lexicographically() {
        let p1 = PointKey::from(Coordinate { x: 0., y: 0. });
        let p2 = PointKey::from(Coordinate { x: 0., y: 1. });
        let p3 = PointKey::from(Coordinate { x: 1., y: 0. });
        assert!(p1 < p2);
        assert!(p2 < p3);
        assert_eq!(p1, PointKey::from(Coordinate { x: 0., y: 0. }));
    }

    #[test]
    fn crossing_paths_intersect_in_a_point() {
        let diagonal = path(&[(0., 0.), (2., 2.)]);
        let others = MultiLineString(vec![path(&[(0., 2.), (2., 0.)])]);
        match curve_intersection(&diagonal, &others) {
            Geometry::Point(p) => assert_eq!(p.0, Coordinate { x: 1., y: 1. }),
            other => panic!("expected a point, got {:?}", other),
        }
    }

    #[test]
    fn disjoint_paths_intersect_in_nothing() {
        let a = path(&[(0., 0.), (1., 0.)]);
        let others = MultiLineString(vec![path(&[(0., 1.), (1., 1.)])]);
        let result = curve_intersection(&a, &others);
        assert!(matches!(
            &result,
            Geometry::GeometryCollection(c) if c.0.is_empty()
        ));
        assert_eq!(consistent_intersection(result).unwrap().0.len(), 0);
    }

    #[test]
    fn collinear_overlap_is_linear() {
        let a = path(&[(0., 0.), (2., 0.)]);
        let others = MultiLineString(vec![path(&[(1., 0.), (3., 0.)])]);
        let result = curve_intersection(&a, &others);
        assert!(matches!(result, Geometry::LineString(_)));
        // and normalizes to no actionable crossing point
        assert_eq!(consistent_intersection(result).unwrap().0.len(), 0);
    }

    #[test]
    fn normalizer_wraps_a_single_point() {
        let result = Geometry::Point(Point::new(1., 1.));
        let points = consistent_intersection(result).unwrap();
        assert_eq!(points.0, vec![Point::new(1., 1.)]);
    }

    #[test]
    fn normalizer_rejects_unsupported_shapes() {
        let mixed = Geometry::GeometryCollection(GeometryCollection(vec![Geometry::Point(
            Point::new(0., 0.),
        )]));
        assert!(matches!(
            consistent_intersection(mixed),
            Err(Error::UnsupportedIntersection(_))
        ));

        let rect = Geometry::Rect(geo::Rect::new(
            Coordinate { x: 0., y: 0. },
            Coordinate { x: 1., y: 1. },
        ));
        assert!(consistent_intersection(rect).is_err());
    }

    #[test]
    fn mixed_crossing_and_overlap_is_a_collection() {
        let a = path(&[(0., 0.), (2., 0.)]);
        let others = MultiLineString(vec![
            path(&[(1., 0.), (3., 0.)]),
            path(&[(0.5, -1.), (0.5, 1.)]),
        ]);
        let result = curve_intersection(&a, &others);
        assert!(matches!(
            &result,
            Geometry::GeometryCollection(c) if !c.0.is_empty()
        ));
        assert!(consistent_intersection(result).is_err());
    }

    #[test]
    fn split_cuts_at_a_transversal_crossing() {
        let diagonal = path(&[(0., 0.), (2., 2.)]);
        let others = MultiLineString(vec![path(&[(0., 2.), (2., 0.)])]);
        let pieces = split_at_crossings(&diagonal, &others);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].0, vec![
            Coordinate { x: 0., y: 0. },
            Coordinate { x: 1., y: 1. },
        ]);
        assert_eq!(pieces[1].0, vec![
            Coordinate { x: 1., y: 1. },
            Coordinate { x: 2., y: 2. },
        ]);
    }

    #[test]
    fn split_without_crossings_returns_the_whole_path() {
        let a = path(&[(0., 0.), (1., 0.), (2., 0.)]);
        let pieces = split_at_crossings(&a, &MultiLineString(vec![]));
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0], a);
    }

    #[test]
    fn split_at_an_interior_vertex_keeps_one_cut() {
        let bent = path(&[(0., 0.), (1., 0.), (2., 0.)]);
        let others = MultiLineString(vec![path(&[(1., -1.), (1., 1.)])]);
        let pieces = split_at_crossings(&bent, &others);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].0.last(), Some(&Coordinate { x: 1., y: 0. }));
        assert_eq!(pieces[1].0.first(), Some(&Coordinate { x: 1., y: 0. }));
    }

    #[test]
    fn endpoint_touches_do_not_split() {
        let a = path(&[(0., 0.), (1., 0.)]);
        // two paths touching the endpoints of `a`
        let others = MultiLineString(vec![
            path(&[(0., 0.), (0., 1.)]),
            path(&[(1., 0.), (1., 1.)]),
        ]);
        let pieces = split_at_crossings(&a, &others);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0], a);
    }

    #[test]
    fn collinear_overlap_does_not_split() {
        let a = path(&[(0., 0.), (2., 0.)]);
        let others = MultiLineString(vec![path(&[(0.5, 0.), (1.5, 0.)])]);
        let pieces = split_at_crossings(&a, &others);
        assert_eq!(pieces.len(), 1);
    }
}
