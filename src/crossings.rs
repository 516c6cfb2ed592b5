use std::iter::FromIterator;

use geo::{Coordinate, Line};

use crate::sweep::Sweep;

/// Iterator that yields all intersection points among a set of line
/// segments, each exactly once.
///
/// This is the plain interface over the Bentley-Ottmann sweep and runs
/// in O((n + k) log n) time; it is essentially a drop-in replacement
/// for intersecting all pairs of input segments, but is typically more
/// efficient when the number of crossings k is small compared to n².
/// Construct it by `collect`-ing an iterator of [`Line`]s, by value or
/// by reference.
///
/// Points are yielded lazily in sweep order (left to right). For
/// step-by-step access to the sweep state, use [`Sweep`] directly.
pub struct Intersections {
    sweep: Sweep,
}

impl FromIterator<Line<f64>> for Intersections {
    fn from_iter<T: IntoIterator<Item = Line<f64>>>(iter: T) -> Self {
        Intersections {
            sweep: Sweep::new(iter),
        }
    }
}

impl<'a> FromIterator<&'a Line<f64>> for Intersections {
    fn from_iter<T: IntoIterator<Item = &'a Line<f64>>>(iter: T) -> Self {
        iter.into_iter().copied().collect()
    }
}

impl Iterator for Intersections {
    type Item = Coordinate<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = self.sweep.next_event()?;
            if let Some(point) = step.intersection {
                return Some(point);
            }
        }
    }
}
