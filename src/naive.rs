use std::collections::HashSet;

use geo::{Coordinate, Line};
use itertools::Itertools;

use crate::segment::{point_key, Segment};

/// Brute-force all-pairs intersection check.
///
/// O(n²) over the input, using the same intersection predicate and
/// point deduplication as the sweep, so the two agree exactly. This is
/// the reference the sweep is validated against; it is also the faster
/// choice for tiny inputs.
pub fn naive_intersections<I>(lines: I) -> Vec<Coordinate<f64>>
where
    I: IntoIterator<Item = Line<f64>>,
{
    let segments: Vec<_> = lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| Segment::new(index, line))
        .collect();

    let mut seen = HashSet::new();
    let mut intersections = Vec::new();
    for (s1, s2) in segments.iter().tuple_combinations() {
        if let Some(point) = s1.intersection(s2) {
            if seen.insert(point_key(point)) {
                intersections.push(point);
            }
        }
    }
    intersections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_points_once() {
        // Three concurrent segments: one shared crossing point.
        let input = vec![
            Line::from([(0., 0.), (2., 2.)]),
            Line::from([(0., 2.), (2., 0.)]),
            Line::from([(1., 0.), (1., 2.)]),
        ];
        assert_eq!(naive_intersections(input).len(), 1);
    }

    #[test]
    fn empty_and_single() {
        assert!(naive_intersections(vec![]).is_empty());
        assert!(naive_intersections(vec![Line::from([(0., 0.), (1., 0.)])]).is_empty());
    }
}
