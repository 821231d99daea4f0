use std::cmp::Ordering;

use crate::{HasPosition, LineSideInfo, Point2, VoronoiNum};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The error type used for invalid site positions.
///
/// Sites can be checked for validity by using [crate::validate_site].
#[derive(Error, Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Debug, Hash)]
pub enum InsertionError {
    /// A coordinate value was too small.
    ///
    /// The absolute value of any site coordinate must either be zero or greater
    /// than or equal to [crate::MIN_ALLOWED_VALUE].
    #[error("coordinate value too small")]
    TooSmall,

    /// A coordinate value was too large.
    ///
    /// The absolute value of any site coordinate must be less than or equal to
    /// [crate::MAX_ALLOWED_VALUE].
    #[error("coordinate value too large")]
    TooLarge,

    /// A coordinate value was NaN.
    #[error("coordinate value is NaN")]
    NAN,
}

/// The smallest allowed coordinate value greater than zero.
///
/// This value is equal to 2<sup>-142</sup>.
///
/// *See also [validate_coordinate], [validate_site], [MAX_ALLOWED_VALUE]*
pub const MIN_ALLOWED_VALUE: f64 = 1.793662034335766e-43; // 1.0 * 2^-142

/// The largest allowed coordinate value. This value is equal to 2<sup>201</sup>.
///
/// The orientation predicate is evaluated with `robust::orient2d` which does not overflow
/// for exponents in this range.
///
/// *See also [validate_coordinate], [validate_site], [MIN_ALLOWED_VALUE]*
pub const MAX_ALLOWED_VALUE: f64 = 3.2138760885179806e60; // 1.0 * 2^201

/// Checks if a coordinate value is suitable as a site coordinate.
///
/// Will return an error if and only if
///  - The absolute value of the coordinate is too small (See [MIN_ALLOWED_VALUE])
///  - The absolute value of the coordinate is too large (See [MAX_ALLOWED_VALUE])
///  - The coordinate is NaN (not a number)
///
/// Passing in any non-finite floating point number (e.g. `f32::NEG_INFINITY`) will
/// result in `Err(InsertionError::TooLarge)`.
pub fn validate_coordinate<S: VoronoiNum>(value: S) -> Result<(), InsertionError> {
    let as_f64: f64 = value.into();
    if as_f64.is_nan() {
        Err(InsertionError::NAN)
    } else if as_f64.abs() < MIN_ALLOWED_VALUE && as_f64 != 0.0 {
        Err(InsertionError::TooSmall)
    } else if as_f64.abs() > MAX_ALLOWED_VALUE {
        Err(InsertionError::TooLarge)
    } else {
        Ok(())
    }
}

/// Checks if a site is suitable as input of a Voronoi diagram.
///
/// A site is considered suitable if all of its coordinates are valid. See [validate_coordinate]
/// for more information.
pub fn validate_site<V: HasPosition>(site: &V) -> Result<(), InsertionError> {
    let position = site.position();
    validate_coordinate(position.x)?;
    validate_coordinate(position.y)?;
    Ok(())
}

/// A circle, given by its center and radius.
///
/// Every Voronoi vertex created by the sweep remembers the circle through the sites that
/// caused it. The circle contains no site in its interior.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct Circle {
    /// The circle's center.
    pub center: Point2<f64>,
    /// The circle's radius.
    pub radius: f64,
}

impl Circle {
    /// Returns the y coordinate of the circle's lowest point.
    pub fn bottom(&self) -> f64 {
        self.center.y - self.radius
    }

    pub(crate) fn approx_eq(&self, other: &Circle, tolerance: f64) -> bool {
        self.center.approx_eq(other.center, tolerance)
            && (self.radius - other.radius).abs() <= tolerance
    }
}

fn to_robust_coord<S: VoronoiNum>(point: Point2<S>) -> robust::Coord<S> {
    robust::Coord {
        x: point.x,
        y: point.y,
    }
}

pub fn side_query<S>(p1: Point2<S>, p2: Point2<S>, query_point: Point2<S>) -> LineSideInfo
where
    S: VoronoiNum,
{
    let p1 = to_robust_coord(p1);
    let p2 = to_robust_coord(p2);
    let query_point = to_robust_coord(query_point);

    let result = robust::orient2d(p1, p2, query_point);
    LineSideInfo::from_determinant(result)
}

/// Returns the circle through three points or `None` if the points are collinear.
pub fn circumcircle(positions: [Point2<f64>; 3]) -> Option<Circle> {
    let [v0, v1, v2] = positions;
    let b = v1.sub(v0);
    let c = v2.sub(v0);

    let d = 2.0 * (b.x * c.y - c.x * b.y);
    if d == 0.0 || !d.is_finite() {
        return None;
    }
    let len_b = b.dot(b);
    let len_c = c.dot(c);
    let d_inv = 1.0 / d;

    let x = (len_b * c.y - len_c * b.y) * d_inv;
    let y = (-len_b * c.x + len_c * b.x) * d_inv;
    let center = Point2::new(x, y).add(v0);
    if !center.x.is_finite() || !center.y.is_finite() {
        return None;
    }
    Some(Circle {
        center,
        radius: (x * x + y * y).sqrt(),
    })
}

/// Direction of the half edge separating `face_site` from `twin_site`.
///
/// The returned vector has `face_site` on its left side.
pub fn bisector_direction(face_site: Point2<f64>, twin_site: Point2<f64>) -> Point2<f64> {
    face_site.sub(twin_site).rotate_cw()
}

/// Calculates the x coordinate of the breakpoint between the parabolic arcs of
/// `left` and `right` for a sweep line at height `sweep_y`.
///
/// The arc of `left` must lie directly left of the arc of `right`. Sites lying on the sweep
/// line degenerate into vertical rays, a breakpoint next to them is located at their x coordinate.
pub fn breakpoint_x(left: Point2<f64>, right: Point2<f64>, sweep_y: f64, tolerance: f64) -> f64 {
    if (left.y - right.y).abs() <= tolerance {
        return (left.x + right.x) * 0.5;
    }
    let left_on_sweep = (left.y - sweep_y).abs() <= tolerance;
    let right_on_sweep = (right.y - sweep_y).abs() <= tolerance;
    match (left_on_sweep, right_on_sweep) {
        (true, true) => return (left.x + right.x) * 0.5,
        (true, false) => return left.x,
        (false, true) => return right.x,
        (false, false) => {}
    }

    let dl = 2.0 * (left.y - sweep_y);
    let dr = 2.0 * (right.y - sweep_y);
    let sweep_2 = sweep_y * sweep_y;

    let a = 1.0 / dl - 1.0 / dr;
    let b = -2.0 * (left.x / dl - right.x / dr);
    let c = (left.x * left.x + left.y * left.y - sweep_2) / dl
        - (right.x * right.x + right.y * right.y - sweep_2) / dr;

    let discriminant = (b * b - 4.0 * a * c).max(0.0);
    let root = discriminant.sqrt();
    if b > 0.0 {
        // Same root as below, avoids cancellation for nearly equal site heights
        2.0 * c / (-b - root)
    } else if a != 0.0 {
        (-b + root) / (2.0 * a)
    } else {
        (left.x + right.x) * 0.5
    }
}

/// Intersects the line `origin + t * direction` with an axis aligned box.
///
/// Returns the parameter range `(t_enter, t_exit)` of the line segment lying inside the box.
pub fn clip_line(
    origin: Point2<f64>,
    direction: Point2<f64>,
    min: Point2<f64>,
    max: Point2<f64>,
) -> Option<(f64, f64)> {
    let mut t_enter = f64::NEG_INFINITY;
    let mut t_exit = f64::INFINITY;

    for (o, d, lo, hi) in [
        (origin.x, direction.x, min.x, max.x),
        (origin.y, direction.y, min.y, max.y),
    ] {
        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let t0 = (lo - o) / d;
        let t1 = (hi - o) / d;
        let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        t_enter = t_enter.max(near);
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || !t_enter.is_finite() || !t_exit.is_finite() {
        None
    } else {
        Some((t_enter, t_exit))
    }
}

/// Compares two values, treating values closer than `tolerance` as equal.
#[inline]
pub fn compare_with_tolerance(a: f64, b: f64, tolerance: f64) -> Ordering {
    if (a - b).abs() <= tolerance {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

#[cfg(test)]
mod test {
    use super::{
        bisector_direction, breakpoint_x, circumcircle, clip_line, side_query,
        validate_coordinate, InsertionError,
    };
    use crate::Point2;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn parabola(site: Point2<f64>, sweep_y: f64, x: f64) -> f64 {
        ((x - site.x).powi(2) + site.y * site.y - sweep_y * sweep_y) / (2.0 * (site.y - sweep_y))
    }

    #[test]
    fn test_validate_coordinate() {
        use super::InsertionError::*;
        assert_eq!(validate_coordinate(f64::NAN), Err(NAN));
        let max_value = super::MAX_ALLOWED_VALUE;

        assert_eq!(validate_coordinate(f64::INFINITY), Err(TooLarge));
        assert_eq!(validate_coordinate(f64::NEG_INFINITY), Err(TooLarge));
        assert_eq!(validate_coordinate(max_value * 2.0), Err(TooLarge));

        let min_value = super::MIN_ALLOWED_VALUE;
        assert_eq!(validate_coordinate(min_value / 2.0), Err(TooSmall));

        assert_eq!(validate_coordinate(f32::MIN_POSITIVE), Ok(()));
        assert_eq!(validate_coordinate(f32::MAX), Ok(()));
        assert_eq!(validate_coordinate(min_value), Ok(()));
        assert_eq!(validate_coordinate(0.0), Ok(()));
    }

    #[test]
    fn check_min_and_max_value() {
        let mut expected = 1.0f64;
        for _ in 0..142 {
            expected *= 0.5;
        }
        assert_eq!(super::MIN_ALLOWED_VALUE, expected);

        let mut expected = 1.0f64;
        for _ in 0..201 {
            expected *= 2.0;
        }
        assert_eq!(super::MAX_ALLOWED_VALUE, expected);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(InsertionError::NAN.to_string(), "coordinate value is NaN");
    }

    #[test]
    fn test_edge_side() {
        let p1 = Point2::new(0.0, 0.0);
        let p2 = Point2::new(1.0, 1.0);

        assert!(side_query(p1, p2, Point2::new(1.0, 0.0)).is_on_right_side());
        assert!(side_query(p1, p2, Point2::new(0.0, 1.0)).is_on_left_side());
        assert!(side_query(p1, p2, Point2::new(0.5, 0.5)).is_on_line());
    }

    #[test]
    fn test_circumcircle() {
        let circle = circumcircle([
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        ])
        .unwrap();
        assert_relative_eq!(circle.center.x, 2.0);
        assert_relative_eq!(circle.center.y, 2.0);
        assert_relative_eq!(circle.radius, 8.0f64.sqrt());
        assert_relative_eq!(circle.bottom(), 2.0 - 8.0f64.sqrt());
    }

    #[test]
    fn test_collinear_circumcircle() {
        assert!(circumcircle([
            Point2::new(-3.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
        ])
        .is_none());
        assert!(circumcircle([
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 2.0),
        ])
        .is_none());
    }

    #[test]
    fn test_breakpoint_x() {
        let left = Point2::new(0.0, 1.0);
        let right = Point2::new(2.0, 0.0);
        let sweep_y = -1.0;

        let x0 = breakpoint_x(left, right, sweep_y, 1e-12);
        let x1 = breakpoint_x(right, left, sweep_y, 1e-12);
        assert!(x0 < x1);
        assert_relative_eq!(x0, 0.8377223398316207, epsilon = 1e-12);
        assert_relative_eq!(x1, 7.16227766016838, epsilon = 1e-12);
        for x in [x0, x1] {
            assert_relative_eq!(
                parabola(left, sweep_y, x),
                parabola(right, sweep_y, x),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_breakpoint_x_degenerate() {
        let a = Point2::new(0.0, 2.0);
        let b = Point2::new(2.0, 2.0);
        let p = Point2::new(5.0, 0.0);
        assert_eq!(breakpoint_x(a, b, 0.0, 1e-12), 1.0);
        assert_eq!(breakpoint_x(a, p, 0.0, 1e-12), 5.0);
        assert_eq!(breakpoint_x(p, a, 0.0, 1e-12), 5.0);
    }

    #[test]
    fn test_breakpoint_x_nearly_equal_heights() {
        let left = Point2::new(-1.0, 1.0 + 1e-9);
        let right = Point2::new(1.0, 1.0);
        let x = breakpoint_x(left, right, -3.0, 1e-12);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bisector_direction() {
        let face = Point2::new(0.0, 0.0);
        let twin = Point2::new(2.0, 0.0);
        let dir = bisector_direction(face, twin);
        assert_eq!(dir, Point2::new(0.0, 2.0));
        // The face site lies to the left of the direction
        assert!(side_query(Point2::new(1.0, 0.0), Point2::new(1.0, 0.0).add(dir), face)
            .is_on_left_side());
    }

    #[test]
    fn test_clip_line() {
        let min = Point2::new(-1.0, -1.0);
        let max = Point2::new(1.0, 1.0);
        let (t0, t1) = clip_line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), min, max).unwrap();
        assert_eq!((t0, t1), (-1.0, 1.0));

        let (t0, t1) = clip_line(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), min, max).unwrap();
        assert_eq!((t0, t1), (-1.0, 1.0));

        assert!(clip_line(Point2::new(0.0, 5.0), Point2::new(1.0, 0.0), min, max).is_none());
        assert!(clip_line(Point2::new(3.0, 3.0), Point2::new(1.0, -1.0), min, max).is_none());
    }
}
