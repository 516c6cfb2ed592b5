use std::cmp::Ordering;

use geo::{Coordinate, Line};

/// Tolerance applied by every geometric comparison in this crate.
pub const EPSILON: f64 = 1e-9;

/// Wraps a [`Coordinate`] to support lexicographic ordering.
///
/// The ordering is by `x` and then by `y`. Implements `PartialOrd`,
/// `Ord` and `Eq` even though `Coordinate` doesn't implement these.
/// This is necessary to support insertion to ordered collections,
/// especially `BinaryHeap` as required by sweep algorithms.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SweepPoint(Coordinate<f64>);

impl SweepPoint {
    /// The wrapped coordinate.
    #[inline]
    pub fn coord(&self) -> Coordinate<f64> {
        self.0
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.0.y
    }
}

/// Implement lexicographic ordering by `x` and then by `y`
/// coordinate.
impl PartialOrd for SweepPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.0.x.partial_cmp(&other.0.x) {
            Some(Ordering::Equal) => self.0.y.partial_cmp(&other.0.y),
            o => o,
        }
    }
}

/// Derive `Ord` from `PartialOrd` and expect to not fail.
impl Ord for SweepPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl Eq for SweepPoint {}

/// Create from `Coordinate` while checking the components are finite.
impl From<Coordinate<f64>> for SweepPoint {
    fn from(pt: Coordinate<f64>) -> Self {
        assert!(
            pt.x.is_finite(),
            "sweep point requires a finite x-coordinate"
        );
        assert!(
            pt.y.is_finite(),
            "sweep point requires a finite y-coordinate"
        );
        SweepPoint(pt)
    }
}

/// A line segment with its end points ordered lexicographically, plus a
/// stable index assigned at construction.
///
/// Segments are immutable once built; the index identifies a segment
/// for the lifetime of one sweep and breaks comparison ties
/// deterministically.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    start: SweepPoint,
    end: SweepPoint,
    index: usize,
}

impl Segment {
    /// Canonicalize `line` left-to-right, swapping end points if
    /// necessary, and tag it with `index`.
    pub(crate) fn new(index: usize, line: Line<f64>) -> Self {
        let start: SweepPoint = line.start.into();
        let end: SweepPoint = line.end.into();
        if end < start {
            Segment {
                start: end,
                end: start,
                index,
            }
        } else {
            Segment { start, end, index }
        }
    }

    /// The left (lexicographically smaller) end point.
    #[inline]
    pub fn start(&self) -> SweepPoint {
        self.start
    }

    /// The right (lexicographically larger) end point.
    #[inline]
    pub fn end(&self) -> SweepPoint {
        self.end
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The segment as a [`Line`], for rendering or interop.
    pub fn line(&self) -> Line<f64> {
        Line::new(self.start.coord(), self.end.coord())
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        (self.end.x() - self.start.x()).abs() < EPSILON
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        (self.end.y() - self.start.y()).abs() < EPSILON
    }

    /// Slope of the segment; vertical segments degrade to
    /// `f64::INFINITY`.
    pub fn slope(&self) -> f64 {
        let (p, q) = (self.start.coord(), self.end.coord());
        if (q.x - p.x).abs() < EPSILON {
            f64::INFINITY
        } else {
            (q.y - p.y) / (q.x - p.x)
        }
    }

    /// The y-coordinate where the segment crosses the vertical line at
    /// `x`.
    ///
    /// Vertical segments degrade to the lower end point's y as a
    /// sentinel; callers that need exact membership must special-case
    /// them.
    pub fn y_at(&self, x: f64) -> f64 {
        let (p, q) = (self.start.coord(), self.end.coord());
        if (q.x - p.x).abs() < EPSILON {
            p.y.min(q.y)
        } else {
            (q.y - p.y) / (q.x - p.x) * (x - p.x) + p.y
        }
    }

    /// Compute the point where two bounded segments intersect, if any.
    ///
    /// Solves the two-parameter line equations with the standard 2x2
    /// determinant method. Parallel and collinear pairs (determinant
    /// below tolerance) yield `None`; overlaps are not reported. The
    /// parameters must both lie in `[0, 1]` within tolerance, and the
    /// resulting point must fall inside both segments' bounding boxes,
    /// which filters the noise of near-parallel pairs.
    pub fn intersection(&self, other: &Segment) -> Option<Coordinate<f64>> {
        let (p1, p2) = (self.start.coord(), self.end.coord());
        let (p3, p4) = (other.start.coord(), other.end.coord());

        let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
        if denom.abs() < EPSILON {
            return None;
        }

        let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
        let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;
        if ua < -EPSILON || ua > 1. + EPSILON || ub < -EPSILON || ub > 1. + EPSILON {
            return None;
        }

        let x = p1.x + ua * (p2.x - p1.x);
        let y = p1.y + ua * (p2.y - p1.y);
        if in_bounds(x, y, p1, p2) && in_bounds(x, y, p3, p4) {
            Some(Coordinate { x, y })
        } else {
            None
        }
    }
}

/// Equality based on the index.
impl PartialEq for Segment {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Segment {}

fn in_bounds(x: f64, y: f64, p: Coordinate<f64>, q: Coordinate<f64>) -> bool {
    p.x.min(q.x) - EPSILON <= x
        && x <= p.x.max(q.x) + EPSILON
        && p.y.min(q.y) - EPSILON <= y
        && y <= p.y.max(q.y) + EPSILON
}

/// Hash key for reported points: both coordinates rounded to nine
/// decimal places, so that near-identical intersections coalesce into
/// one.
pub(crate) fn point_key(c: Coordinate<f64>) -> (i64, i64) {
    ((c.x * 1e9).round() as i64, (c.y * 1e9).round() as i64)
}
