//! Circle and arc construction helpers used by the generators.

use std::f64::consts::PI;

use geo::euclidean_distance::EuclideanDistance;
use geo::{Coordinate, LineString, Point};

/// A closed ring of `nb_points` segments approximating a circle.
pub fn circle(center: Point<f64>, radius: f64, nb_points: usize) -> LineString<f64> {
    let mut coords = Vec::with_capacity(nb_points + 1);
    for k in 0..nb_points {
        let theta = 2. * PI * (k as f64) / (nb_points as f64);
        coords.push(point_at(center, radius, theta));
    }
    coords.push(coords[0]);
    LineString(coords)
}

/// A counter-clockwise arc from `start` to `stop` around `center`, with
/// `nb_points` interpolated positions between the endpoints.
///
/// The first and last coordinates are `start` and `stop` themselves, bitwise,
/// so an arc used as an edge path still matches its endpoint nodes exactly.
/// The radius is taken as the mean of the two endpoint distances, so slightly
/// off-circle endpoints still yield a reasonable arc.
pub fn circle_arc(
    start: Point<f64>,
    stop: Point<f64>,
    center: Point<f64>,
    nb_points: usize,
) -> LineString<f64> {
    let radius = (start.euclidean_distance(&center) + stop.euclidean_distance(&center)) / 2.;
    let start_angle = (start.y() - center.y()).atan2(start.x() - center.x());
    let stop_angle = (stop.y() - center.y()).atan2(stop.x() - center.x());
    let mut arc = stop_angle - start_angle;
    if arc < 0. {
        arc += 2. * PI;
    }

    let mut coords = Vec::with_capacity(nb_points + 2);
    coords.push(start.0);
    for i in 1..=nb_points {
        let theta = start_angle + arc * (i as f64) / ((nb_points + 1) as f64);
        coords.push(point_at(center, radius, theta));
    }
    coords.push(stop.0);
    LineString(coords)
}

fn point_at(center: Point<f64>, radius: f64, theta: f64) -> Coordinate<f64> {
    Coordinate {
        x: center.x() + radius * theta.cos(),
        y: center.y() + radius * theta.sin(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::euclidean_length::EuclideanLength;

    use super::*;

    #[test]
    fn circle_is_closed() {
        let ring = circle(Point::new(1., 2.), 3., 16);
        assert_eq!(ring.0.len(), 17);
        assert_eq!(ring.0[0], ring.0[16]);
        for coord in &ring.0 {
            let d = Point(*coord).euclidean_distance(&Point::new(1., 2.));
            assert_relative_eq!(d, 3., epsilon = 1e-9);
        }
    }

    #[test]
    fn arc_keeps_its_exact_endpoints() {
        let start = Point::new(2., 0.);
        let stop = Point::new(0., 2.);
        let arc = circle_arc(start, stop, Point::new(0., 0.), 3);
        assert_eq!(arc.0.len(), 5);
        assert_eq!(arc.0[0], start.0);
        assert_eq!(arc.0[4], stop.0);
        // a quarter circle of radius 2, approximated by 4 chords
        let quarter = PI;
        assert!(arc.euclidean_length() < quarter);
        assert!(arc.euclidean_length() > 0.98 * quarter);
    }

    #[test]
    fn arc_goes_the_long_way_when_angles_wrap() {
        let arc = circle_arc(Point::new(0., 1.), Point::new(1., 0.), Point::new(0., 0.), 30);
        // from pi/2 counter-clockwise down to 2*pi spans three quadrants
        let expected = 3. * PI / 2.;
        assert_relative_eq!(arc.euclidean_length(), expected, epsilon = 0.02);
    }
}
