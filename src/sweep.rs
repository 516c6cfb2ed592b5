use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use geo::{Coordinate, Line};
use log::{debug, trace};

use crate::active::ActiveSegments;
use crate::events::{Event, EventKind};
use crate::segment::{point_key, Segment, SweepPoint, EPSILON};

/// Bentley-Ottmann sweep over a set of line segments.
///
/// Owns the event queue, the sweep-line status structure and the
/// result set for one run, and reports each pairwise intersection
/// point exactly once. A sweep is single-use: build a fresh one per
/// input set.
///
/// The sweep can be drained with [`run`], or driven one event at a
/// time with [`next_event`] so that a caller (e.g. a visualization
/// rendering the sweep position and the active set) can observe the
/// state between steps. There is no separate cancellation primitive;
/// stopping the calls stops the sweep.
///
/// [`run`]: Sweep::run
/// [`next_event`]: Sweep::next_event
pub struct Sweep {
    segments: Vec<Segment>,
    events: BinaryHeap<Event>,
    active: ActiveSegments,
    scheduled: HashSet<(usize, usize)>,
    seen: HashSet<(i64, i64)>,
    intersections: Vec<Coordinate<f64>>,
    current_x: f64,
    next_seq: u64,
}

/// Record of one processed event, returned by [`Sweep::next_event`].
#[derive(Debug, Clone, Copy)]
pub struct SweepEvent {
    /// Where the event occurred.
    pub point: Coordinate<f64>,
    /// What happened, with the indices of the segments involved.
    pub kind: EventKind,
    /// The intersection point this event reported, if it was a
    /// crossing not seen before.
    pub intersection: Option<Coordinate<f64>>,
}

impl Sweep {
    /// Build a sweep over `lines`.
    ///
    /// End points are canonicalized left-to-right, each segment gets
    /// its position in the input as a stable index, and the queue is
    /// seeded with one start and one end event per segment.
    pub fn new<I: IntoIterator<Item = Line<f64>>>(lines: I) -> Self {
        let lines = lines.into_iter();
        let size = {
            let (min_size, max_size) = lines.size_hint();
            max_size.unwrap_or(min_size)
        };

        let mut sweep = Sweep {
            segments: Vec::with_capacity(size),
            events: BinaryHeap::with_capacity(2 * size),
            active: ActiveSegments::new(),
            scheduled: HashSet::new(),
            seen: HashSet::new(),
            intersections: Vec::new(),
            current_x: 0.,
            next_seq: 0,
        };
        for line in lines {
            let segment = Segment::new(sweep.segments.len(), line);
            sweep.segments.push(segment);
            sweep.push_event(
                segment.start(),
                EventKind::Start {
                    segment: segment.index(),
                },
            );
            sweep.push_event(
                segment.end(),
                EventKind::End {
                    segment: segment.index(),
                },
            );
        }
        sweep
    }

    /// The input segments, canonicalized and indexed.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The intersection points reported so far, in discovery order.
    pub fn intersections(&self) -> &[Coordinate<f64>] {
        &self.intersections
    }

    /// The x-coordinate of the last processed event.
    pub fn sweep_x(&self) -> f64 {
        self.current_x
    }

    /// Ordered snapshot of the segments currently crossing the sweep
    /// line, from bottom to top.
    pub fn active_segments(&self) -> Vec<Segment> {
        self.active.in_order()
    }

    /// Whether the event queue has been drained.
    pub fn is_done(&self) -> bool {
        self.events.is_empty()
    }

    /// Process the next event.
    ///
    /// Returns a record of the processed event for step-by-step
    /// consumers, or `None` once the queue is empty. Calling this
    /// repeatedly yields the full event sequence in processing order.
    pub fn next_event(&mut self) -> Option<SweepEvent> {
        let event = self.events.pop()?;
        trace!("handling event: {:?}", event);
        self.current_x = event.point.x();

        let intersection = match event.kind {
            EventKind::Start { segment } => {
                self.handle_start(segment);
                None
            }
            EventKind::End { segment } => {
                self.handle_end(segment);
                None
            }
            EventKind::Intersection { upper, lower } => {
                self.handle_intersection(upper, lower, event.point)
            }
        };

        Some(SweepEvent {
            point: event.point.coord(),
            kind: event.kind,
            intersection,
        })
    }

    /// Drain the event queue and return all intersection points found.
    pub fn run(&mut self) -> &[Coordinate<f64>] {
        while self.next_event().is_some() {}
        &self.intersections
    }

    fn handle_start(&mut self, index: usize) {
        let segment = self.segments[index];
        self.active.set_current_x(self.current_x);
        self.active.insert(segment);

        let prev = self.active.predecessor(&segment);
        let next = self.active.successor(&segment);
        for neighbor in prev.into_iter().chain(next.into_iter()) {
            self.check_and_schedule(segment, neighbor);
        }
    }

    fn handle_end(&mut self, index: usize) {
        let segment = self.segments[index];
        self.active.set_current_x(self.current_x);

        // Neighbors must be looked up before the segment disappears.
        let prev = self.active.predecessor(&segment);
        let next = self.active.successor(&segment);
        self.active.remove(&segment);

        if let (Some(prev), Some(next)) = (prev, next) {
            // Closing the gap may create a new adjacency.
            self.check_and_schedule(prev, next);
        }
    }

    fn handle_intersection(
        &mut self,
        upper: usize,
        lower: usize,
        point: SweepPoint,
    ) -> Option<Coordinate<f64>> {
        let reported = self.report(point.coord());

        let upper = self.segments[upper];
        let lower = self.segments[lower];

        // Two-phase swap: take both segments out while the status
        // still compares at the pre-crossing position, then advance
        // the sweep and re-insert. Past the crossing their comparison
        // is reversed, which realizes the swap.
        self.active.remove(&upper);
        self.active.remove(&lower);
        self.active.set_current_x(self.current_x);
        self.active.insert(upper);
        self.active.insert(lower);

        // The former lower segment is now on top.
        let (above, below) = (lower, upper);
        if let Some(prev) = self.active.predecessor(&below) {
            self.check_and_schedule(below, prev);
        }
        if let Some(next) = self.active.successor(&above) {
            self.check_and_schedule(above, next);
        }

        reported
    }

    fn report(&mut self, point: Coordinate<f64>) -> Option<Coordinate<f64>> {
        if self.seen.insert(point_key(point)) {
            debug!("intersection at {:?}", point);
            self.intersections.push(point);
            Some(point)
        } else {
            None
        }
    }

    /// Check a pair of segments and schedule a crossing event if they
    /// intersect ahead of the sweep and the pair has not been
    /// scheduled before.
    fn check_and_schedule(&mut self, s1: Segment, s2: Segment) {
        let point = match s1.intersection(&s2) {
            Some(point) => point,
            None => return,
        };
        // A crossing strictly behind the sweep is a numerical
        // artifact; the pair set below is what prevents re-processing
        // loops.
        if point.x < self.current_x - EPSILON {
            return;
        }

        let pair = (
            s1.index().min(s2.index()),
            s1.index().max(s2.index()),
        );
        if !self.scheduled.insert(pair) {
            return;
        }

        // Tag the pair with its order just before the crossing.
        let (upper, lower) = match self.active.compare(&s1, &s2) {
            Ordering::Greater => (s1, s2),
            _ => (s2, s1),
        };
        debug!(
            "scheduling crossing of #{} over #{} at {:?}",
            upper.index(),
            lower.index(),
            point
        );
        self.push_event(
            point.into(),
            EventKind::Intersection {
                upper: upper.index(),
                lower: lower.index(),
            },
        );
    }

    fn push_event(&mut self, point: SweepPoint, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event { point, kind, seq });
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::{Coordinate, Line, Rect};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::naive::naive_intersections;
    use crate::random::{uniform_line, uniform_line_with_length};

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn line(start: (f64, f64), end: (f64, f64)) -> Line<f64> {
        Line::new(Coordinate::from(start), Coordinate::from(end))
    }

    fn sorted_keys(points: &[Coordinate<f64>]) -> Vec<(i64, i64)> {
        let mut keys: Vec<_> = points.iter().map(|p| point_key(*p)).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_empty_input() {
        let mut sweep = Sweep::new(vec![]);
        assert!(sweep.run().is_empty());
        assert!(sweep.is_done());
    }

    #[test]
    fn test_single_segment() {
        let mut sweep = Sweep::new(vec![line((0., 0.), (1., 1.))]);
        assert!(sweep.run().is_empty());
    }

    #[test]
    fn test_crossing_pair() {
        init_log();
        let mut sweep = Sweep::new(vec![
            line((0., 0.), (10., 10.)),
            line((0., 10.), (10., 0.)),
        ]);
        let found = sweep.run();
        assert_eq!(found.len(), 1);
        assert_relative_eq!(found[0].x, 5.);
        assert_relative_eq!(found[0].y, 5.);
    }

    #[test]
    fn test_star_of_three() {
        init_log();
        // Three segments crossing pairwise near a common region; all
        // three crossings are distinct.
        let input = vec![
            line((0., 0.), (10., 10.)),
            line((0., 10.), (10., 0.)),
            line((0., 6.), (10., 3.)),
        ];
        let mut sweep = Sweep::new(input.clone());
        let found = sweep.run().to_vec();
        assert_eq!(found.len(), 3);
        assert_eq!(sorted_keys(&found), sorted_keys(&naive_intersections(input)));
    }

    #[test]
    fn test_shared_endpoint() {
        let mut sweep = Sweep::new(vec![
            line((0., 0.), (5., 5.)),
            line((0., 0.), (5., -5.)),
        ]);
        let found = sweep.run();
        assert_eq!(found.len(), 1);
        assert_relative_eq!(found[0].x, 0.);
        assert_relative_eq!(found[0].y, 0.);
    }

    #[test]
    fn test_parallel_disjoint() {
        let mut sweep = Sweep::new(vec![line((0., 0.), (5., 0.)), line((0., 1.), (5., 1.))]);
        assert!(sweep.run().is_empty());
    }

    #[test]
    fn test_vertical_crosses_horizontal() {
        let mut sweep = Sweep::new(vec![line((3., -5.), (3., 5.)), line((0., 0.), (6., 0.))]);
        let found = sweep.run();
        assert_eq!(found.len(), 1);
        assert_relative_eq!(found[0].x, 3.);
        assert_relative_eq!(found[0].y, 0.);
    }

    #[test]
    fn test_zero_length_segment_is_inert() {
        let mut sweep = Sweep::new(vec![line((2., 2.), (2., 2.)), line((0., 0.), (4., 4.))]);
        assert!(sweep.run().is_empty());
    }

    #[test]
    fn test_matches_naive_on_random_input() {
        init_log();
        let mut rng = StdRng::seed_from_u64(42);
        let bounds: Rect<f64> = Rect::new([0., 0.], [1024., 1024.]);
        let lines: Vec<_> = (0..64).map(|_| uniform_line(&mut rng, bounds)).collect();

        let mut sweep = Sweep::new(lines.clone());
        let found = sweep.run().to_vec();
        let expected = naive_intersections(lines);
        assert_eq!(sorted_keys(&found), sorted_keys(&expected));
    }

    #[test]
    fn test_matches_naive_on_short_random_lines() {
        init_log();
        let mut rng = StdRng::seed_from_u64(1729);
        let bounds: Rect<f64> = Rect::new([0., 0.], [1024., 1024.]);
        let lines: Vec<_> = (0..128)
            .map(|_| uniform_line_with_length(&mut rng, bounds, 200.))
            .collect();

        let mut sweep = Sweep::new(lines.clone());
        let found = sweep.run().to_vec();
        let expected = naive_intersections(lines);
        assert_eq!(sorted_keys(&found), sorted_keys(&expected));
    }

    #[test]
    fn test_repeat_runs_agree() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds: Rect<f64> = Rect::new([0., 0.], [512., 512.]);
        let lines: Vec<_> = (0..32).map(|_| uniform_line(&mut rng, bounds)).collect();

        let first = Sweep::new(lines.clone()).run().to_vec();
        let second = Sweep::new(lines).run().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_events_pop_in_order() {
        let mut rng = StdRng::seed_from_u64(99);
        let bounds: Rect<f64> = Rect::new([0., 0.], [256., 256.]);
        let lines: Vec<_> = (0..24).map(|_| uniform_line(&mut rng, bounds)).collect();

        let mut sweep = Sweep::new(lines);
        let mut previous: Option<(f64, u8)> = None;
        while let Some(step) = sweep.next_event() {
            let current = (step.point.x, step.kind.rank());
            if let Some((prev_x, prev_rank)) = previous {
                assert!(
                    step.point.x >= prev_x - EPSILON,
                    "event x went backwards: {} after {}",
                    step.point.x,
                    prev_x
                );
                if (step.point.x - prev_x).abs() < EPSILON {
                    assert!(
                        current.1 >= prev_rank,
                        "kind precedence violated at x = {}",
                        prev_x
                    );
                }
            }
            previous = Some(current);
        }
        assert!(sweep.is_done());
    }

    #[test]
    fn test_step_interface_exposes_state() {
        let mut sweep = Sweep::new(vec![
            line((0., 0.), (10., 10.)),
            line((0., 10.), (10., 0.)),
        ]);

        // Two start events.
        assert!(sweep.next_event().is_some());
        assert_eq!(sweep.active_segments().len(), 1);
        assert!(sweep.next_event().is_some());
        assert_eq!(sweep.active_segments().len(), 2);

        // The crossing.
        let step = sweep.next_event().unwrap();
        assert!(matches!(step.kind, EventKind::Intersection { .. }));
        assert!(step.intersection.is_some());
        assert_relative_eq!(sweep.sweep_x(), 5.);
        // The swap put the falling segment below the rising one.
        let order: Vec<_> = sweep.active_segments().iter().map(|s| s.index()).collect();
        assert_eq!(order, vec![1, 0]);

        // Two end events drain the queue.
        assert!(sweep.next_event().is_some());
        assert!(sweep.next_event().is_some());
        assert!(sweep.next_event().is_none());
        assert!(sweep.is_done());
        assert_eq!(sweep.intersections().len(), 1);
    }
}
