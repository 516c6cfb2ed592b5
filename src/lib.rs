//! Plane-sweep detection of line-segment intersections.
//!
//! 1. [Line Crossings](#line-crossings)
//! 1. [Axis-Aligned Crossings](#axis-aligned-crossings)
//!
//! # Line Crossings
//!
//! This is an implementation of the [Bentley-Ottman] algorithm to
//! efficiently compute all pairwise intersections of a collection of
//! line segments in O((n + k) log n) time, where k is the number of
//! intersection points. The simplest usage is the [`Intersections`]
//! iterator, which yields each intersection point exactly once and is
//! essentially a drop-in replacement for checking all pairs of input
//! segments.
//!
//! For step-by-step usage, e.g. a visualization that renders the
//! sweep position, the active segments and the crossings found after
//! each event, drive a [`Sweep`] directly via [`Sweep::next_event`].
//!
//! ## Usage
//!
//! Construct an [`Intersections`] from an iterator of [`Line`]s:
//!
//! ```rust
//! use geo::Line;
//! use line_crossings::Intersections;
//! use std::iter::FromIterator;
//! let input = vec![
//!     Line::from([(1., 0.), (0., 1.)]),
//!     Line::from([(0., 0.25), (1., 0.25)]),
//!     Line::from([(0., 0.), (1., 1.)]),
//! ];
//! let iter = Intersections::from_iter(input);
//! // All pairs cross, at three distinct points.
//! assert_eq!(iter.count(), 3);
//! ```
//!
//! # Axis-Aligned Crossings
//!
//! For input known to be axis-parallel, [`axis_aligned_intersections`]
//! runs a reduced sweep that resolves each vertical segment with one
//! range query over the active horizontals.
//!
//! All coordinate comparisons are tolerant to [`EPSILON`]; reported
//! points closer than the tolerance coalesce into one. Exact or
//! rational arithmetic is out of scope.
//!
//! [Bentley-Ottman]: //en.wikipedia.org/wiki/Bentley%E2%80%93Ottmann_algorithm
//! [`Line`]: geo::Line

mod events;
pub use events::EventKind;

mod segment;
pub use segment::{Segment, SweepPoint, EPSILON};

mod active;
pub use active::ActiveSegments;

pub mod sweep;
pub use sweep::{Sweep, SweepEvent};

mod crossings;
pub use crossings::Intersections;

mod axis_aligned;
pub use axis_aligned::axis_aligned_intersections;

pub mod naive;
pub use naive::naive_intersections;

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub(crate) mod random;
