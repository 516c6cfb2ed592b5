use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use geo::{Coordinate, Line};
use log::debug;

use crate::active::ActiveSegments;
use crate::segment::{point_key, Segment};

/// Report all crossings between horizontal and vertical segments.
///
/// A reduced sweep for axis-parallel input: horizontal segments enter
/// the status structure keyed by their constant y-coordinate, and each
/// vertical segment reports every active horizontal within its span
/// through a single range query. Runs in O((n + k) log n); the output
/// is deduplicated like [`crate::Sweep`]'s.
///
/// Input segments must be axis-parallel (checked in debug builds).
/// Crossings between two collinear segments are not reported.
/// Zero-length segments behave as points: they report the horizontals
/// passing through their location.
pub fn axis_aligned_intersections<I>(lines: I) -> Vec<Coordinate<f64>>
where
    I: IntoIterator<Item = Line<f64>>,
{
    let mut events = BinaryHeap::new();
    let mut seq = 0u64;
    for (index, line) in lines.into_iter().enumerate() {
        let segment = Segment::new(index, line);
        if segment.is_vertical() {
            events.push(AxisEvent {
                x: segment.start().x(),
                kind: AxisEventKind::Vertical,
                segment,
                seq,
            });
            seq += 1;
        } else {
            debug_assert!(
                segment.is_horizontal(),
                "expected an axis-parallel segment: {:?}",
                segment
            );
            events.push(AxisEvent {
                x: segment.start().x(),
                kind: AxisEventKind::Insert,
                segment,
                seq,
            });
            events.push(AxisEvent {
                x: segment.end().x(),
                kind: AxisEventKind::Remove,
                segment,
                seq: seq + 1,
            });
            seq += 2;
        }
    }

    let mut active = ActiveSegments::new();
    let mut seen = HashSet::new();
    let mut intersections = Vec::new();

    while let Some(event) = events.pop() {
        active.set_current_x(event.x);
        match event.kind {
            AxisEventKind::Insert => active.insert(event.segment),
            AxisEventKind::Remove => active.remove(&event.segment),
            AxisEventKind::Vertical => {
                // End points are canonicalized, so start carries the
                // lower y.
                let low = event.segment.start().y();
                let high = event.segment.end().y();
                for horizontal in active.range(low, high) {
                    let point = Coordinate {
                        x: event.x,
                        y: horizontal.y_at(event.x),
                    };
                    if seen.insert(point_key(point)) {
                        debug!("axis-aligned crossing at {:?}", point);
                        intersections.push(point);
                    }
                }
            }
        }
    }
    intersections
}

/// Kinds of axis-aligned sweep events; the declaration order is the
/// processing precedence at equal x. A vertical segment is handled
/// after the horizontals starting at its x and before those ending
/// there, so end point touches are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum AxisEventKind {
    Insert,
    Vertical,
    Remove,
}

#[derive(Debug, Clone, Copy)]
struct AxisEvent {
    x: f64,
    kind: AxisEventKind,
    segment: Segment,
    seq: u64,
}

impl PartialEq for AxisEvent {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl Eq for AxisEvent {}

/// Min-heap ordering: x, then kind, then insertion order, reversed.
impl PartialOrd for AxisEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let by_x = self.x.partial_cmp(&other.x)?;
        Some(
            by_x.then_with(|| self.kind.cmp(&other.kind))
                .then_with(|| self.seq.cmp(&other.seq))
                .reverse(),
        )
    }
}

/// Derive `Ord` from `PartialOrd` and expect to not fail.
impl Ord for AxisEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}
