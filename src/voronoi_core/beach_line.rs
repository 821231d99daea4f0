//! The sweep's status structure.
//!
//! The beach line is stored as a [SweepTree] whose in-order sequence alternates between arcs
//! and breakpoints: `arc, breakpoint, arc, ..., breakpoint, arc`. Breakpoints are not keyed
//! by a stored value. Their position depends on the sweep line and is recomputed whenever
//! the tree is searched, see [Breakpoint::position_at].
use tracing::warn;

use super::event_queue::EventId;
use super::handles::FixedDirectedEdgeHandle;
use super::math::breakpoint_x;
use super::sweep_tree::{NodeId, SweepTree};
use crate::Point2;

/// A parabolic arc of the beach line belonging to a single site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arc {
    pub site: usize,
    /// The pending circle event that would remove this arc.
    pub circle_event: Option<EventId>,
}

impl Arc {
    pub fn new(site: usize) -> Self {
        Self {
            site,
            circle_event: None,
        }
    }
}

/// Marks a breakpoint that was created by a site lying exactly below an older breakpoint.
///
/// Circle events that would remove `site`'s arc at the sweep height `sweep_y` are
/// rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Protection {
    pub sweep_y: f64,
    pub site: usize,
}

/// The intersection of two neighboring arcs.
///
/// A breakpoint traces a Voronoi edge while the sweep line moves down. `edge` is the half
/// edge pointing into the breakpoint's direction of movement. Its face is the cell of the
/// right site.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breakpoint {
    pub left_site: usize,
    pub right_site: usize,
    pub edge: FixedDirectedEdgeHandle,
    pub protection: Option<Protection>,
    /// The last computed position as `(sweep_y, x)`.
    memo: Option<(f64, f64)>,
}

impl Breakpoint {
    pub fn new(left_site: usize, right_site: usize, edge: FixedDirectedEdgeHandle) -> Self {
        Self {
            left_site,
            right_site,
            edge,
            protection: None,
            memo: None,
        }
    }

    /// Returns the breakpoint's x coordinate for a sweep line at height `sweep_y`.
    ///
    /// The result is memoized per sweep height. Any other sweep height forces a
    /// recomputation.
    pub fn position_at(&mut self, sites: &[Point2<f64>], sweep_y: f64, tolerance: f64) -> f64 {
        if let Some((memo_y, x)) = self.memo {
            if memo_y == sweep_y {
                return x;
            }
        }
        let x = breakpoint_x(
            sites[self.left_site],
            sites[self.right_site],
            sweep_y,
            tolerance,
        );
        self.memo = Some((sweep_y, x));
        x
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BeachItem {
    Arc(Arc),
    Breakpoint(Breakpoint),
}

#[derive(Clone, Debug)]
pub struct BeachLine {
    tree: SweepTree<BeachItem>,
    tolerance: f64,
}

impl BeachLine {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tree: SweepTree::new(),
            tolerance,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[cfg(test)]
    pub fn tree(&self) -> &SweepTree<BeachItem> {
        &self.tree
    }

    pub fn arc(&self, id: NodeId) -> Option<&Arc> {
        match self.tree.get(id)? {
            BeachItem::Arc(arc) => Some(arc),
            BeachItem::Breakpoint(_) => None,
        }
    }

    pub fn arc_mut(&mut self, id: NodeId) -> Option<&mut Arc> {
        match self.tree.get_mut(id)? {
            BeachItem::Arc(arc) => Some(arc),
            BeachItem::Breakpoint(_) => None,
        }
    }

    pub fn breakpoint(&self, id: NodeId) -> Option<&Breakpoint> {
        match self.tree.get(id)? {
            BeachItem::Breakpoint(breakpoint) => Some(breakpoint),
            BeachItem::Arc(_) => None,
        }
    }

    pub fn breakpoint_mut(&mut self, id: NodeId) -> Option<&mut Breakpoint> {
        match self.tree.get_mut(id)? {
            BeachItem::Breakpoint(breakpoint) => Some(breakpoint),
            BeachItem::Arc(_) => None,
        }
    }

    pub fn last(&self) -> Option<NodeId> {
        self.tree.last()
    }

    /// Appends an item at the right end of the beach line.
    pub fn push_back(&mut self, item: BeachItem) -> NodeId {
        self.tree.push_back(item)
    }

    pub fn insert_after(&mut self, id: NodeId, item: BeachItem) -> NodeId {
        self.tree.insert_after(id, item)
    }

    #[cfg(test)]
    pub fn insert_before(&mut self, id: NodeId, item: BeachItem) -> NodeId {
        self.tree.insert_before(id, item)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<BeachItem> {
        self.tree.remove(id)
    }

    /// Returns the item directly left of `id`.
    #[cfg(test)]
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.tree.prev(id)
    }

    /// Returns the item directly right of `id`.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        self.tree.next(id)
    }

    /// Returns the arc left of an arc, skipping the breakpoint in between.
    pub fn prev_arc(&self, arc: NodeId) -> Option<NodeId> {
        self.tree.prev(arc).and_then(|breakpoint| self.tree.prev(breakpoint))
    }

    /// Returns the arc right of an arc, skipping the breakpoint in between.
    pub fn next_arc(&self, arc: NodeId) -> Option<NodeId> {
        self.tree.next(arc).and_then(|breakpoint| self.tree.next(breakpoint))
    }

    /// Returns all breakpoints from left to right.
    pub fn breakpoints(&self) -> impl Iterator<Item = (NodeId, &Breakpoint)> + '_ {
        self.tree.iter().filter_map(|(id, item)| match item {
            BeachItem::Breakpoint(breakpoint) => Some((id, breakpoint)),
            BeachItem::Arc(_) => None,
        })
    }

    /// Returns the breakpoint's position for the given sweep height.
    pub fn breakpoint_position(
        &mut self,
        id: NodeId,
        sites: &[Point2<f64>],
        sweep_y: f64,
    ) -> Option<f64> {
        let tolerance = self.tolerance;
        self.breakpoint_mut(id)
            .map(|breakpoint| breakpoint.position_at(sites, sweep_y, tolerance))
    }

    /// Finds the arc lying directly above `x` for a sweep line at height `sweep_y`.
    ///
    /// If `x` coincides with a breakpoint, the arc left of the breakpoint is returned.
    pub fn get_arc_above(&mut self, x: f64, sites: &[Point2<f64>], sweep_y: f64) -> Option<NodeId> {
        let tolerance = self.tolerance;
        let mut current = self.tree.root()?;
        loop {
            let is_breakpoint = matches!(self.tree.get(current)?, BeachItem::Breakpoint(_));
            let go_left = if is_breakpoint {
                let position = self.breakpoint_position(current, sites, sweep_y)?;
                x <= position + tolerance
            } else {
                let left_bound = match self.tree.prev(current) {
                    Some(breakpoint) => self.breakpoint_position(breakpoint, sites, sweep_y),
                    None => None,
                };
                let right_bound = match self.tree.next(current) {
                    Some(breakpoint) => self.breakpoint_position(breakpoint, sites, sweep_y),
                    None => None,
                };
                if left_bound.map_or(false, |bound| x <= bound + tolerance) {
                    true
                } else if right_bound.map_or(false, |bound| x > bound + tolerance) {
                    false
                } else {
                    return Some(current);
                }
            };

            let child = if go_left {
                self.tree.left(current)
            } else {
                self.tree.right(current)
            };
            match child {
                Some(child) => current = child,
                None => return self.fallback_arc(current, go_left, x, sweep_y),
            }
        }
    }

    /// Picks the closest arc when the search runs off the tree.
    ///
    /// This can only happen if rounding errors made neighboring breakpoints cross each other.
    fn fallback_arc(&self, last: NodeId, go_left: bool, x: f64, sweep_y: f64) -> Option<NodeId> {
        warn!(x, sweep_y, "arc lookup fell off the beach line, using closest arc");
        let neighbor = match (self.tree.get(last)?, go_left) {
            (BeachItem::Breakpoint(_), true) => self.tree.prev(last),
            (BeachItem::Breakpoint(_), false) => self.tree.next(last),
            (BeachItem::Arc(_), true) => self.prev_arc(last),
            (BeachItem::Arc(_), false) => self.next_arc(last),
        };
        neighbor.or(Some(last)).filter(|id| self.arc(*id).is_some())
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.tree.check_invariants();
        let items: Vec<_> = self.tree.iter().map(|(_, item)| *item).collect();
        for (index, item) in items.iter().enumerate() {
            assert_eq!(matches!(item, BeachItem::Arc(_)), index % 2 == 0);
        }
        for window in items.windows(3).step_by(2) {
            if let [
                BeachItem::Arc(left),
                BeachItem::Breakpoint(breakpoint),
                BeachItem::Arc(right),
            ] = window
            {
                assert_eq!(breakpoint.left_site, left.site);
                assert_eq!(breakpoint.right_site, right.site);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Arc, BeachItem, BeachLine, Breakpoint};
    use crate::voronoi_core::handles::FixedDirectedEdgeHandle;
    use crate::Point2;
    use approx::assert_relative_eq;

    fn edge() -> FixedDirectedEdgeHandle {
        FixedDirectedEdgeHandle::new(0)
    }

    /// Beach line of site 0 split by site 1, as after the second site event.
    fn split_beach_line(sites: &[Point2<f64>]) -> (BeachLine, Vec<super::NodeId>) {
        let mut beach_line = BeachLine::new(1e-9);
        let a = beach_line.push_back(BeachItem::Arc(Arc::new(0)));
        let bp1 = beach_line.insert_after(a, BeachItem::Breakpoint(Breakpoint::new(0, 1, edge())));
        let p = beach_line.insert_after(bp1, BeachItem::Arc(Arc::new(1)));
        let bp2 = beach_line.insert_after(p, BeachItem::Breakpoint(Breakpoint::new(1, 0, edge())));
        let a2 = beach_line.insert_after(bp2, BeachItem::Arc(Arc::new(0)));
        assert_eq!(sites.len(), 2);
        beach_line.check_invariants();
        (beach_line, vec![a, bp1, p, bp2, a2])
    }

    #[test]
    fn test_position_memo() {
        let sites = [Point2::new(0.0, 2.0), Point2::new(2.0, 2.0)];
        let mut breakpoint = Breakpoint::new(0, 1, edge());
        assert_relative_eq!(breakpoint.position_at(&sites, 0.0, 1e-9), 1.0);
        assert_eq!(breakpoint.memo, Some((0.0, 1.0)));

        let sites = [Point2::new(0.0, 2.0), Point2::new(2.0, 1.0)];
        // Same sweep height, the memo is used
        assert_relative_eq!(breakpoint.position_at(&sites, 0.0, 1e-9), 1.0);
        // A new sweep height forces recomputation
        let x = breakpoint.position_at(&sites, -1.0, 1e-9);
        assert!((x - 1.0).abs() > 1e-3);
    }

    #[test]
    fn test_get_arc_above() {
        let sites = [Point2::new(0.0, 4.0), Point2::new(0.0, 2.0)];
        let (mut beach_line, nodes) = split_beach_line(&sites);
        let sweep_y = 0.0;
        let left = beach_line
            .breakpoint_position(nodes[1], &sites, sweep_y)
            .unwrap();
        let right = beach_line
            .breakpoint_position(nodes[3], &sites, sweep_y)
            .unwrap();
        assert!(left < 0.0 && right > 0.0);
        assert_relative_eq!(left, -right);

        assert_eq!(beach_line.get_arc_above(0.0, &sites, sweep_y), Some(nodes[2]));
        assert_eq!(beach_line.get_arc_above(left - 1.0, &sites, sweep_y), Some(nodes[0]));
        assert_eq!(beach_line.get_arc_above(right + 1.0, &sites, sweep_y), Some(nodes[4]));
        // Ties go to the left arc
        assert_eq!(beach_line.get_arc_above(left, &sites, sweep_y), Some(nodes[0]));
        assert_eq!(beach_line.get_arc_above(right, &sites, sweep_y), Some(nodes[2]));
    }

    #[test]
    fn test_neighbors() {
        let sites = [Point2::new(0.0, 4.0), Point2::new(0.0, 2.0)];
        let (mut beach_line, nodes) = split_beach_line(&sites);
        assert_eq!(beach_line.next_arc(nodes[0]), Some(nodes[2]));
        assert_eq!(beach_line.prev_arc(nodes[4]), Some(nodes[2]));
        assert_eq!(beach_line.prev_arc(nodes[0]), None);
        assert_eq!(beach_line.successor(nodes[2]), Some(nodes[3]));
        assert_eq!(beach_line.predecessor(nodes[2]), Some(nodes[1]));
        assert!(beach_line.arc(nodes[1]).is_none());
        assert!(beach_line.breakpoint(nodes[1]).is_some());
        assert_eq!(beach_line.breakpoints().count(), 2);

        beach_line.remove(nodes[2]);
        beach_line.remove(nodes[3]);
        assert_eq!(beach_line.next_arc(nodes[0]), Some(nodes[4]));
        assert_eq!(beach_line.len(), 3);
    }
}
