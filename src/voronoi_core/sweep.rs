//! The run context of a single sweep.
//!
//! A [Sweep] owns the event queue, the beach line and the edge list under construction.
//! The event handlers live in the sibling modules `site_event`, `circle_event` and
//! `degenerate` and are implemented as methods of [Sweep].
use hashbrown::HashSet;
use tracing::{debug, trace};

use super::beach_line::BeachLine;
use super::dcel_builder::DcelBuilder;
use super::elements::{Cell, FaceData, SweepStatistics, VertexData};
use super::event_queue::{EventKey, EventKind, EventQueue};
use super::handles::{FixedDirectedEdgeHandle, FixedFaceHandle};
use super::sweep_tree::NodeId;
use super::VoronoiError;
use crate::Point2;

/// Everything a finished sweep hands over to the bounding box attachment.
#[derive(Debug)]
pub struct SweepResult {
    pub builder: DcelBuilder<VertexData, FaceData>,
    pub cells: Vec<Cell>,
    /// Half edges that still miss at least one end point, one per undirected edge.
    pub dangling: Vec<FixedDirectedEdgeHandle>,
    pub statistics: SweepStatistics,
}

#[derive(Debug)]
pub struct Sweep<'a> {
    pub(super) sites: &'a [Point2<f64>],
    pub(super) tolerance: f64,
    pub(super) queue: EventQueue,
    pub(super) beach_line: BeachLine,
    pub(super) builder: DcelBuilder<VertexData, FaceData>,
    pub(super) cells: Vec<Cell>,
    /// Height of the sweep line.
    pub(super) sweep_y: f64,
    /// Height of the topmost sites while no lower site has been processed.
    pub(super) start_y: Option<f64>,
    /// Edges between the topmost sites. Their upper end lies at infinity.
    pub(super) upper_rays: Vec<FixedDirectedEdgeHandle>,
    pub(super) statistics: SweepStatistics,
}

impl<'a> Sweep<'a> {
    pub fn new(sites: &'a [Point2<f64>], tolerance: f64) -> Self {
        Self {
            sites,
            tolerance,
            queue: EventQueue::new(tolerance),
            beach_line: BeachLine::new(tolerance),
            builder: DcelBuilder::new(FaceData::default()),
            cells: Vec::with_capacity(sites.len()),
            sweep_y: f64::INFINITY,
            start_y: None,
            upper_rays: Vec::new(),
            statistics: SweepStatistics::default(),
        }
    }

    pub fn run(mut self) -> Result<SweepResult, VoronoiError> {
        self.load_sites();
        debug!(
            sites = self.sites.len(),
            duplicates = self.statistics.duplicate_sites,
            "starting sweep"
        );

        while let Some((id, event)) = self.queue.delete_max() {
            match event.kind {
                EventKind::Site { site } => self.handle_site_event(site)?,
                EventKind::Circle(circle_event) => self.handle_circle_event(id, circle_event)?,
            }
        }

        let dangling = self.dangling_edges();
        debug!(
            site_events = self.statistics.site_events,
            circle_events = self.statistics.circle_events,
            false_alarms = self.statistics.false_alarms,
            vertices = self.builder.num_vertices(),
            edges = self.builder.num_undirected_edges(),
            dangling = dangling.len(),
            "sweep finished"
        );
        Ok(SweepResult {
            builder: self.builder,
            cells: self.cells,
            dangling,
            statistics: self.statistics,
        })
    }

    /// Creates a site event and a face for every site.
    ///
    /// Sites whose key is already present in the queue are marked as duplicates of the
    /// site already stored there.
    pub(super) fn load_sites(&mut self) {
        for (index, site) in self.sites.iter().enumerate() {
            let key = EventKey {
                y: site.y,
                x: site.x,
            };
            let (id, existed) = self.queue.insert(key, EventKind::Site { site: index });
            let original = if existed {
                self.queue
                    .bucket_mates(id)
                    .find_map(|event| match event.kind {
                        EventKind::Site { site } => Some(site),
                        EventKind::Circle(_) => None,
                    })
            } else {
                None
            };

            match original {
                Some(of) => {
                    self.queue.delete(id);
                    trace!(site = index, of, "duplicate site");
                    self.cells.push(Cell::Duplicate { of });
                    self.statistics.duplicate_sites += 1;
                }
                None => {
                    let face = self.builder.add_face(FaceData { site: Some(index) });
                    self.cells.push(Cell::Region(face));
                }
            }
        }
    }

    pub(super) fn site(&self, site: usize) -> Point2<f64> {
        self.sites[site]
    }

    pub(super) fn face_of(&self, site: usize) -> Result<FixedFaceHandle, VoronoiError> {
        self.cells
            .get(site)
            .and_then(Cell::face)
            .ok_or_else(|| {
                VoronoiError::invariant(
                    format!("site event {}", site),
                    "site has no face of its own",
                )
            })
    }

    pub(super) fn arc_site(&self, arc: NodeId) -> Option<usize> {
        self.beach_line.arc(arc).map(|arc| arc.site)
    }

    /// Removes the pending circle event of an arc, if there is any.
    pub(super) fn invalidate_circle_event(&mut self, arc: NodeId) {
        let pending = self
            .beach_line
            .arc_mut(arc)
            .and_then(|arc| arc.circle_event.take());
        if let Some(id) = pending {
            if let Some(event) = self.queue.delete(id) {
                self.statistics.false_alarms += 1;
                trace!(
                    event = id.index(),
                    y = event.key.y,
                    x = event.key.x,
                    "circle event invalidated"
                );
            }
        }
    }

    /// Collects all edges that are still traced by a breakpoint or lead upwards from the
    /// topmost sites.
    fn dangling_edges(&self) -> Vec<FixedDirectedEdgeHandle> {
        let mut seen = HashSet::new();
        self.beach_line
            .breakpoints()
            .map(|(_, breakpoint)| breakpoint.edge)
            .chain(self.upper_rays.iter().copied())
            .filter(|edge| seen.insert(edge.as_undirected()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::Sweep;
    use crate::voronoi_core::elements::Cell;
    use crate::{Point2, VoronoiError};

    #[test]
    fn test_single_site() -> Result<(), VoronoiError> {
        let sites = [Point2::new(1.0, 2.0)];
        let result = Sweep::new(&sites, 1e-9).run()?;
        assert_eq!(result.statistics.site_events, 1);
        assert_eq!(result.builder.num_undirected_edges(), 0);
        assert!(result.dangling.is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicates_are_detected() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(1.0, 1.0),
            Point2::new(3.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.0),
        ];
        let result = Sweep::new(&sites, 1e-9).run()?;
        assert_eq!(result.statistics.duplicate_sites, 2);
        assert_eq!(result.statistics.site_events, 2);
        assert!(matches!(result.cells[0], Cell::Region(_)));
        assert_eq!(result.cells[2], Cell::Duplicate { of: 0 });
        assert_eq!(result.cells[3], Cell::Duplicate { of: 0 });
        // Two sites are separated by a single line
        assert_eq!(result.dangling.len(), 1);
        Ok(())
    }

    #[test]
    fn test_triangle() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        ];
        let result = Sweep::new(&sites, 1e-9).run()?;
        assert_eq!(result.statistics.circle_events, 1);
        assert_eq!(result.builder.num_vertices(), 1);
        assert_eq!(result.builder.num_undirected_edges(), 3);
        assert_eq!(result.dangling.len(), 3);
        let vertex = result
            .builder
            .vertex_data_iter()
            .next()
            .map(|vertex| vertex.position);
        assert_eq!(vertex, Some(Point2::new(2.0, 2.0)));
        Ok(())
    }

    #[test]
    fn test_collinear_sites() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(0.0, -3.0),
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 3.0),
        ];
        let result = Sweep::new(&sites, 1e-9).run()?;
        assert_eq!(result.statistics.circle_events, 0);
        assert_eq!(result.builder.num_vertices(), 0);
        assert_eq!(result.dangling.len(), 2);
        Ok(())
    }
}
