use tracing::trace;

use super::beach_line::{Arc, BeachItem, Breakpoint};
use super::event_queue::EventKind;
use super::sweep::Sweep;
use super::sweep_tree::NodeId;
use super::VoronoiError;

impl<'a> Sweep<'a> {
    /// Inserts the arc of a new site into the beach line.
    ///
    /// The arc above the site is split into two parts enclosing the new arc. Both new
    /// breakpoints trace the two halves of a single new edge.
    pub(super) fn handle_site_event(&mut self, site: usize) -> Result<(), VoronoiError> {
        let position = self.site(site);
        self.sweep_y = position.y;
        self.statistics.site_events += 1;
        trace!(site, x = position.x, y = position.y, "site event");

        if self.beach_line.is_empty() {
            self.beach_line.push_back(BeachItem::Arc(Arc::new(site)));
            self.start_y = Some(position.y);
            return Ok(());
        }

        if let Some(start_y) = self.start_y {
            if (position.y - start_y).abs() <= self.tolerance {
                return self.append_horizontal(site);
            }
            self.start_y = None;
        }

        let event_name = || format!("site event {}", site);
        let above = self
            .beach_line
            .get_arc_above(position.x, self.sites, self.sweep_y)
            .ok_or_else(|| VoronoiError::invariant(event_name(), "no arc above the site"))?;
        let above_site = self
            .arc_site(above)
            .ok_or_else(|| {
                VoronoiError::invariant(event_name(), "arc lookup returned a breakpoint")
            })?;
        self.invalidate_circle_event(above);

        let face = self.face_of(site)?;
        let above_face = self.face_of(above_site)?;
        let edge = self.builder.add_edge(face, above_face);

        let left_breakpoint = self.beach_line.insert_after(
            above,
            BeachItem::Breakpoint(Breakpoint::new(above_site, site, edge)),
        );
        let new_arc = self
            .beach_line
            .insert_after(left_breakpoint, BeachItem::Arc(Arc::new(site)));
        let right_breakpoint = self.beach_line.insert_after(
            new_arc,
            BeachItem::Breakpoint(Breakpoint::new(site, above_site, edge.rev())),
        );
        let split_arc = self
            .beach_line
            .insert_after(right_breakpoint, BeachItem::Arc(Arc::new(above_site)));

        self.retarget_circle_event(above, split_arc);
        self.protect_if_below_breakpoint(site, [left_breakpoint, right_breakpoint], split_arc);

        if let Some(left) = self.beach_line.prev_arc(above) {
            self.check_circle_event(left, above, new_arc);
        }
        if let Some(right) = self.beach_line.next_arc(split_arc) {
            self.check_circle_event(new_arc, split_arc, right);
        }
        Ok(())
    }

    /// Hands the right neighbor's circle event over to the right part of a split arc.
    ///
    /// The event still refers to the arc that was split. The split arc's right part now
    /// takes its place as the event's left arc.
    fn retarget_circle_event(&mut self, split: NodeId, right_part: NodeId) {
        let pending = self
            .beach_line
            .next_arc(right_part)
            .and_then(|neighbor| self.beach_line.arc(neighbor))
            .and_then(|neighbor| neighbor.circle_event);
        if let Some(event) = pending.and_then(|id| self.queue.get_mut(id)) {
            if let EventKind::Circle(circle_event) = &mut event.kind {
                if circle_event.arcs[0] == split {
                    circle_event.arcs[0] = right_part;
                }
            }
        }
    }
}
