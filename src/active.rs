use std::cmp::Ordering;

use slab::Slab;
use smallvec::SmallVec;

use crate::segment::{Segment, EPSILON};

/// The sweep-line status structure: all segments currently crossing
/// the sweep line, ordered by their y-coordinate at the current sweep
/// position.
///
/// Implemented as an AVL tree over a [`Slab`] arena, so insert,
/// remove, predecessor and successor all run in O(log n). The
/// comparison is evaluated lazily against [`current_x`]; callers must
/// advance the position with [`set_current_x`] before mutating or
/// querying at a new event. Querying with a stale position silently
/// yields an incorrect order; this is a correctness precondition, not
/// a runtime-checked error.
///
/// [`current_x`]: ActiveSegments::current_x
/// [`set_current_x`]: ActiveSegments::set_current_x
#[derive(Debug, Default)]
pub struct ActiveSegments {
    nodes: Slab<Node>,
    root: Option<usize>,
    current_x: f64,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    segment: Segment,
    height: u32,
    left: Option<usize>,
    right: Option<usize>,
}

impl Node {
    fn new(segment: Segment) -> Self {
        Node {
            segment,
            height: 1,
            left: None,
            right: None,
        }
    }
}

impl ActiveSegments {
    pub fn new() -> Self {
        Default::default()
    }

    /// Move the sweep line to `x`. Affects every subsequent
    /// comparison.
    pub fn set_current_x(&mut self, x: f64) {
        self.current_x = x;
    }

    pub fn current_x(&self) -> f64 {
        self.current_x
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Strict total order of segments at the current sweep position:
    /// by y-coordinate, with ties broken by slope and finally by
    /// segment index.
    ///
    /// Two segments compare equal in y exactly when they meet or cross
    /// at the sweep line; the one rising faster passes above just past
    /// it, so ordering ties by slope yields the order immediately
    /// after the meeting point.
    pub(crate) fn compare(&self, a: &Segment, b: &Segment) -> Ordering {
        let ya = a.y_at(self.current_x);
        let yb = b.y_at(self.current_x);
        if (ya - yb).abs() >= EPSILON {
            return ya.partial_cmp(&yb).expect("y-at-x of a finite segment is finite");
        }
        let (ma, mb) = (a.slope(), b.slope());
        if (ma - mb).abs() >= EPSILON {
            return if ma > mb {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        a.index().cmp(&b.index())
    }

    /// Insert an active segment at its position under the current
    /// sweep order.
    pub fn insert(&mut self, segment: Segment) {
        let root = self.root;
        let new_root = self.insert_at(root, segment);
        self.root = Some(new_root);
    }

    fn insert_at(&mut self, node: Option<usize>, segment: Segment) -> usize {
        let key = match node {
            Some(key) => key,
            None => return self.nodes.insert(Node::new(segment)),
        };
        let node_segment = self.nodes[key].segment;
        if self.compare(&segment, &node_segment) == Ordering::Less {
            let left = self.insert_at(self.nodes[key].left, segment);
            self.nodes[key].left = Some(left);
        } else {
            let right = self.insert_at(self.nodes[key].right, segment);
            self.nodes[key].right = Some(right);
        }
        self.rebalance(key)
    }

    /// Remove an active segment.
    ///
    /// The node is located with the same comparison used on insertion,
    /// so the sweep position must still reflect the order the segment
    /// was stored under.
    pub fn remove(&mut self, segment: &Segment) {
        let count = self.nodes.len();
        let root = self.root;
        self.root = self.remove_at(root, segment);
        debug_assert_eq!(
            self.nodes.len() + 1,
            count,
            "active segment #{} not found for removal",
            segment.index()
        );
    }

    fn remove_at(&mut self, node: Option<usize>, segment: &Segment) -> Option<usize> {
        let key = node?;
        let node_segment = self.nodes[key].segment;
        match self.compare(segment, &node_segment) {
            Ordering::Less => {
                let left = self.remove_at(self.nodes[key].left, segment);
                self.nodes[key].left = left;
            }
            Ordering::Greater => {
                let right = self.remove_at(self.nodes[key].right, segment);
                self.nodes[key].right = right;
            }
            // The comparison is a strict total order, so equality
            // identifies the node to delete.
            Ordering::Equal => {
                let Node { left, right, .. } = self.nodes[key];
                match (left, right) {
                    (None, child) | (child, None) => {
                        self.nodes.remove(key);
                        return child;
                    }
                    (Some(_), Some(right)) => {
                        // Two children: splice the in-order successor's
                        // payload into this node and delete it from the
                        // right subtree instead.
                        let successor = self.min_segment(right);
                        self.nodes[key].segment = successor;
                        let new_right = self.remove_at(Some(right), &successor);
                        self.nodes[key].right = new_right;
                    }
                }
            }
        }
        Some(self.rebalance(key))
    }

    fn min_segment(&self, mut key: usize) -> Segment {
        while let Some(left) = self.nodes[key].left {
            key = left;
        }
        self.nodes[key].segment
    }

    /// The active segment immediately below `segment`, if any.
    pub fn predecessor(&self, segment: &Segment) -> Option<Segment> {
        let mut best = None;
        let mut node = self.root;
        while let Some(key) = node {
            let candidate = self.nodes[key].segment;
            if self.compare(segment, &candidate) == Ordering::Greater {
                best = Some(candidate);
                node = self.nodes[key].right;
            } else {
                node = self.nodes[key].left;
            }
        }
        best
    }

    /// The active segment immediately above `segment`, if any.
    pub fn successor(&self, segment: &Segment) -> Option<Segment> {
        let mut best = None;
        let mut node = self.root;
        while let Some(key) = node {
            let candidate = self.nodes[key].segment;
            if self.compare(segment, &candidate) == Ordering::Less {
                best = Some(candidate);
                node = self.nodes[key].left;
            } else {
                node = self.nodes[key].right;
            }
        }
        best
    }

    /// Snapshot of the active segments from bottom to top.
    pub fn in_order(&self) -> Vec<Segment> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: SmallVec<[usize; 16]> = SmallVec::new();
        let mut node = self.root;
        while node.is_some() || !stack.is_empty() {
            while let Some(key) = node {
                stack.push(key);
                node = self.nodes[key].left;
            }
            let key = stack.pop().expect("stack holds the subtree path");
            out.push(self.nodes[key].segment);
            node = self.nodes[key].right;
        }
        out
    }

    /// All active segments whose y-coordinate at the current sweep
    /// position lies in `[low, high]` (tolerance-expanded), from
    /// bottom to top.
    pub fn range(&self, low: f64, high: f64) -> Vec<Segment> {
        let mut out = Vec::new();
        self.collect_range(self.root, low, high, &mut out);
        out
    }

    fn collect_range(&self, node: Option<usize>, low: f64, high: f64, out: &mut Vec<Segment>) {
        let key = match node {
            Some(key) => key,
            None => return,
        };
        let segment = self.nodes[key].segment;
        let y = segment.y_at(self.current_x);
        if y > low - EPSILON {
            self.collect_range(self.nodes[key].left, low, high, out);
        }
        if y >= low - EPSILON && y <= high + EPSILON {
            out.push(segment);
        }
        if y < high + EPSILON {
            self.collect_range(self.nodes[key].right, low, high, out);
        }
    }

    fn height(&self, node: Option<usize>) -> u32 {
        node.map_or(0, |key| self.nodes[key].height)
    }

    fn balance_factor(&self, key: usize) -> i32 {
        self.height(self.nodes[key].left) as i32 - self.height(self.nodes[key].right) as i32
    }

    fn update_height(&mut self, key: usize) {
        let height = 1 + self
            .height(self.nodes[key].left)
            .max(self.height(self.nodes[key].right));
        self.nodes[key].height = height;
    }

    /// Restore the height invariant at `key` after a mutation below
    /// it, returning the key of the new subtree root.
    fn rebalance(&mut self, key: usize) -> usize {
        self.update_height(key);
        let balance = self.balance_factor(key);

        if balance > 1 {
            let left = self.nodes[key].left.expect("left-heavy node has a left child");
            if self.balance_factor(left) < 0 {
                let new_left = self.rotate_left(left);
                self.nodes[key].left = Some(new_left);
            }
            return self.rotate_right(key);
        }
        if balance < -1 {
            let right = self
                .nodes[key]
                .right
                .expect("right-heavy node has a right child");
            if self.balance_factor(right) > 0 {
                let new_right = self.rotate_right(right);
                self.nodes[key].right = Some(new_right);
            }
            return self.rotate_left(key);
        }
        key
    }

    fn rotate_right(&mut self, y: usize) -> usize {
        let x = self.nodes[y].left.expect("right rotation needs a left child");
        self.nodes[y].left = self.nodes[x].right;
        self.nodes[x].right = Some(y);
        self.update_height(y);
        self.update_height(x);
        x
    }

    fn rotate_left(&mut self, x: usize) -> usize {
        let y = self.nodes[x].right.expect("left rotation needs a right child");
        self.nodes[x].right = self.nodes[y].left;
        self.nodes[y].left = Some(x);
        self.update_height(x);
        self.update_height(y);
        y
    }
}
