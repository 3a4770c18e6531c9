//! Interval index over requested time ranges.
//!
//! A binary search tree keyed by interval start, stored as an arena of
//! nodes addressed by index. Every node tracks the largest `end` in its
//! subtree, which lets overlap queries skip whole subtrees. The tree is not
//! rebalanced; inserts come from chart interactions, not bulk loads.

use chart_core::types::Resolution;

/// A half-open time range `[start, end)`, optionally tagged with the
/// resolution it was requested at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
    pub resolution: Option<Resolution>,
}

impl Interval {
    /// Create an untagged interval.
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            start,
            end,
            resolution: None,
        }
    }

    /// Create an interval tagged with a resolution.
    pub fn tagged(start: i64, end: i64, resolution: Resolution) -> Self {
        Self {
            start,
            end,
            resolution: Some(resolution),
        }
    }

    /// Half-open overlap: touching intervals do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone)]
struct Node {
    interval: Interval,
    /// Largest `end` in this node's subtree, itself included.
    max: i64,
    left: Option<usize>,
    right: Option<usize>,
}

/// Augmented BST answering "does anything stored overlap this range".
#[derive(Debug, Clone, Default)]
pub struct IntervalTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl IntervalTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored intervals.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert an interval. Equal starts go to the right subtree.
    pub fn insert(&mut self, interval: Interval) {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            interval,
            max: interval.end,
            left: None,
            right: None,
        });

        let Some(mut current) = self.root else {
            self.root = Some(idx);
            return;
        };

        // Every node on the descent path gains the new interval in its subtree.
        loop {
            let node = &mut self.nodes[current];
            if node.max < interval.end {
                node.max = interval.end;
            }
            let child = if interval.start < node.interval.start {
                &mut node.left
            } else {
                &mut node.right
            };
            match *child {
                Some(next) => current = next,
                None => {
                    *child = Some(idx);
                    return;
                }
            }
        }
    }

    /// Find any one stored interval overlapping `query`.
    pub fn search_overlap(&self, query: &Interval) -> Option<&Interval> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if node.interval.overlaps(query) {
                return Some(&node.interval);
            }
            // If the left subtree reaches past the query start and still holds
            // no overlap, nothing to the right can overlap either.
            current = match node.left {
                Some(left) if self.nodes[left].max > query.start => Some(left),
                _ => node.right,
            };
        }
        None
    }

    /// Collect every stored interval overlapping `query`.
    pub fn overlapping(&self, query: &Interval) -> Vec<&Interval> {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self.root.into_iter().collect();

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if node.max <= query.start {
                continue;
            }
            if node.interval.overlaps(query) {
                found.push(&node.interval);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
            if node.interval.start < query.end {
                if let Some(right) = node.right {
                    stack.push(right);
                }
            }
        }

        found
    }

    /// Check whether the union of stored intervals accepted by `filter`
    /// covers all of `[start, end)`.
    pub fn covers<F>(&self, start: i64, end: i64, filter: F) -> bool
    where
        F: Fn(&Interval) -> bool,
    {
        if start >= end {
            return true;
        }

        let mut hits: Vec<&Interval> = self
            .overlapping(&Interval::new(start, end))
            .into_iter()
            .filter(|i| filter(i))
            .collect();
        hits.sort_by_key(|i| i.start);

        let mut covered_to = start;
        for interval in hits {
            if interval.start > covered_to {
                return false;
            }
            covered_to = covered_to.max(interval.end);
            if covered_to >= end {
                return true;
            }
        }
        false
    }

    /// Depth of the deepest node (0 for an empty tree).
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let node = &self.nodes[idx];
            stack.extend(node.left.map(|l| (l, depth + 1)));
            stack.extend(node.right.map(|r| (r, depth + 1)));
        }
        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(intervals: &[(i64, i64)]) -> IntervalTree {
        let mut tree = IntervalTree::new();
        for &(start, end) in intervals {
            tree.insert(Interval::new(start, end));
        }
        tree
    }

    /// Recompute every node's subtree max and compare with the stored field.
    fn check_max(tree: &IntervalTree, idx: Option<usize>) -> i64 {
        let Some(idx) = idx else {
            return i64::MIN;
        };
        let node = &tree.nodes[idx];
        let expected = node
            .interval
            .end
            .max(check_max(tree, node.left))
            .max(check_max(tree, node.right));
        assert_eq!(node.max, expected);
        expected
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let tree = build(&[(10, 20)]);

        assert_eq!(
            tree.search_overlap(&Interval::new(15, 25)),
            Some(&Interval::new(10, 20))
        );
        assert_eq!(tree.search_overlap(&Interval::new(20, 30)), None);
        assert_eq!(tree.search_overlap(&Interval::new(0, 10)), None);
    }

    #[test]
    fn test_max_maintained_on_insert() {
        let tree = build(&[(15, 20), (10, 30), (17, 19), (5, 20), (12, 15), (30, 40)]);
        check_max(&tree, tree.root);
        assert_eq!(tree.nodes[0].max, 40);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_search_overlap_descends_left_when_needed() {
        let tree = build(&[(15, 20), (10, 30), (17, 19), (5, 20), (12, 15), (30, 40)]);

        let hit = tree.search_overlap(&Interval::new(6, 7)).unwrap();
        assert_eq!(*hit, Interval::new(5, 20));

        let hit = tree.search_overlap(&Interval::new(35, 36)).unwrap();
        assert_eq!(*hit, Interval::new(30, 40));

        assert!(tree.search_overlap(&Interval::new(40, 50)).is_none());
    }

    #[test]
    fn test_equal_starts_go_right() {
        let tree = build(&[(10, 20), (10, 50)]);
        assert_eq!(tree.nodes[0].right, Some(1));
        assert_eq!(tree.nodes[0].left, None);
        assert_eq!(tree.nodes[0].max, 50);
        assert!(tree.search_overlap(&Interval::new(40, 45)).is_some());
    }

    #[test]
    fn test_overlapping_collects_all() {
        let tree = build(&[(0, 10), (5, 15), (20, 30), (25, 35), (40, 50)]);

        let mut hits: Vec<(i64, i64)> = tree
            .overlapping(&Interval::new(8, 26))
            .into_iter()
            .map(|i| (i.start, i.end))
            .collect();
        hits.sort();

        assert_eq!(hits, vec![(0, 10), (5, 15), (20, 30), (25, 35)]);
        assert!(tree.overlapping(&Interval::new(35, 40)).is_empty());
    }

    #[test]
    fn test_covers_union_with_filter() {
        let mut tree = IntervalTree::new();
        tree.insert(Interval::tagged(0, 600, Resolution::Minute1));
        tree.insert(Interval::tagged(600, 1200, Resolution::Minute1));
        tree.insert(Interval::tagged(1200, 1800, Resolution::Minute5));

        let fine = |i: &Interval| i.resolution == Some(Resolution::Minute1);
        assert!(tree.covers(0, 1200, fine));
        assert!(tree.covers(300, 900, fine));
        assert!(!tree.covers(0, 1800, fine));
        assert!(tree.covers(0, 1800, |_| true));
        assert!(!tree.covers(0, 1900, |_| true));
        assert!(tree.covers(500, 500, fine));
    }

    #[test]
    fn test_sorted_inserts_degenerate_but_stay_correct() {
        let mut tree = IntervalTree::new();
        for i in 0..200 {
            tree.insert(Interval::new(i * 60, i * 60 + 60));
        }

        assert_eq!(tree.height(), 200);
        check_max(&tree, tree.root);
        assert_eq!(
            tree.search_overlap(&Interval::new(11_950, 11_990)),
            Some(&Interval::new(11_940, 12_000))
        );
    }
}
