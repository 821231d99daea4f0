use tracing::trace;

use super::beach_line::Breakpoint;
use super::elements::VertexData;
use super::event_queue::{CircleEvent, EventId, EventKey, EventKind};
use super::math::{circumcircle, side_query};
use super::sweep::Sweep;
use super::sweep_tree::NodeId;
use super::VoronoiError;

impl<'a> Sweep<'a> {
    /// Removes the middle arc of a converging triple and emits a Voronoi vertex.
    ///
    /// The two breakpoints enclosing the middle arc are merged into a single breakpoint
    /// which starts tracing a new edge at the vertex.
    pub(super) fn handle_circle_event(
        &mut self,
        id: EventId,
        event: CircleEvent,
    ) -> Result<(), VoronoiError> {
        let [left, middle, right] = event.arcs;
        let [left_breakpoint, right_breakpoint] = event.breakpoints;
        let (b1, b2) = self.validate_triple(id, &event)?;

        let circle = event.circle;
        self.sweep_y = self.sweep_y.min(circle.bottom());
        self.statistics.circle_events += 1;
        trace!(
            event = id.index(),
            x = circle.center.x,
            y = circle.center.y,
            radius = circle.radius,
            "circle event"
        );

        self.invalidate_circle_event(left);
        self.invalidate_circle_event(right);
        let left_site = b1.left_site;
        let right_site = b2.right_site;

        self.beach_line.remove(middle);
        self.beach_line.remove(right_breakpoint);

        let e1 = b1.edge;
        let e2 = b2.edge;
        let right_face = self.face_of(right_site)?;
        let left_face = self.face_of(left_site)?;
        let e3 = self.builder.add_edge(right_face, left_face);

        let mut merged = Breakpoint::new(left_site, right_site, e3);
        merged.protection = b1.protection.or(b2.protection);
        if let Some(breakpoint) = self.beach_line.breakpoint_mut(left_breakpoint) {
            *breakpoint = merged;
        }
        self.beach_line
            .breakpoint_position(left_breakpoint, self.sites, self.sweep_y);

        let vertex = self.builder.add_vertex(VertexData::voronoi(circle));
        self.builder.set_origin(e1.rev(), vertex);
        self.builder.set_origin(e2.rev(), vertex);
        self.builder.set_origin(e3, vertex);
        self.builder.connect(e1, e2.rev());
        self.builder.connect(e2, e3);
        self.builder.connect(e3.rev(), e1.rev());

        if let Some(outer_left) = self.beach_line.prev_arc(left) {
            self.check_circle_event(outer_left, left, right);
        }
        if let Some(outer_right) = self.beach_line.next_arc(right) {
            self.check_circle_event(left, right, outer_right);
        }
        Ok(())
    }

    /// Checks that the event's triple is still a part of the beach line.
    fn validate_triple(
        &self,
        id: EventId,
        event: &CircleEvent,
    ) -> Result<(Breakpoint, Breakpoint), VoronoiError> {
        let [left, middle, right] = event.arcs;
        let [b1, b2] = event.breakpoints;
        let fail = |detail: &str| {
            VoronoiError::invariant(
                format!(
                    "circle event {} (arcs {:?}, breakpoints {:?})",
                    id.index(),
                    event.arcs,
                    event.breakpoints
                ),
                detail,
            )
        };

        let beach_line = &self.beach_line;
        let linked = beach_line.successor(left) == Some(b1)
            && beach_line.successor(b1) == Some(middle)
            && beach_line.successor(middle) == Some(b2)
            && beach_line.successor(b2) == Some(right);
        if !linked {
            return Err(fail("triple is no longer adjacent"));
        }

        let sites = (
            beach_line.arc(left),
            beach_line.arc(middle),
            beach_line.arc(right),
        );
        let (left_arc, middle_arc, right_arc) = match sites {
            (Some(l), Some(m), Some(r)) => (l, m, r),
            _ => return Err(fail("triple contains a breakpoint")),
        };
        let breakpoints = (beach_line.breakpoint(b1), beach_line.breakpoint(b2));
        let (breakpoint1, breakpoint2) = match breakpoints {
            (Some(first), Some(second)) => (*first, *second),
            _ => return Err(fail("breakpoint handle refers to an arc")),
        };

        if breakpoint1.left_site != left_arc.site
            || breakpoint1.right_site != middle_arc.site
            || breakpoint2.left_site != middle_arc.site
            || breakpoint2.right_site != right_arc.site
        {
            return Err(fail("breakpoint sites differ from the arc sites"));
        }
        if middle_arc.circle_event != Some(id) {
            return Err(fail("middle arc does not own the event"));
        }
        Ok((breakpoint1, breakpoint2))
    }

    /// Schedules a circle event for the middle arc if the three arcs converge.
    ///
    /// Any event already owned by the middle arc is replaced.
    pub(super) fn check_circle_event(&mut self, left: NodeId, middle: NodeId, right: NodeId) {
        let (l, m, r) = match (
            self.arc_site(left),
            self.arc_site(middle),
            self.arc_site(right),
        ) {
            (Some(l), Some(m), Some(r)) => (l, m, r),
            _ => return,
        };
        if l == m || m == r || l == r {
            return;
        }

        let positions = [self.site(l), self.site(m), self.site(r)];
        if !side_query(positions[0], positions[1], positions[2]).is_on_right_side() {
            return;
        }
        let circle = match circumcircle(positions) {
            Some(circle) if circle.bottom() <= self.sweep_y + self.tolerance => circle,
            _ => return,
        };

        let (b1, b2) = match (
            self.beach_line.successor(left),
            self.beach_line.successor(middle),
        ) {
            (Some(b1), Some(b2)) => (b1, b2),
            _ => return,
        };
        if self.is_protected(b1, m, circle.bottom()) || self.is_protected(b2, m, circle.bottom()) {
            trace!(site = m, "circle event rejected by protected breakpoint");
            return;
        }

        self.invalidate_circle_event(middle);
        let key = EventKey {
            y: circle.bottom(),
            x: circle.center.x,
        };
        let event = CircleEvent {
            arcs: [left, middle, right],
            breakpoints: [b1, b2],
            circle,
        };
        let (id, _) = self.queue.insert(key, EventKind::Circle(event));
        if let Some(arc) = self.beach_line.arc_mut(middle) {
            arc.circle_event = Some(id);
        }
        trace!(
            event = id.index(),
            arcs = ?[l, m, r],
            y = key.y,
            x = key.x,
            "circle event scheduled"
        );
    }
}
