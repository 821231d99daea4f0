//! Special handling for inputs that violate the general position assumption.
//!
//! Coincident sites are filtered when the event queue is loaded and collinear sites need no
//! special treatment since their triples never converge. This module covers the remaining
//! cases: several sites on the initial sweep height, sites lying exactly below a breakpoint
//! and co-circular sites that produce several vertices at the same position.
use tracing::{debug, trace};

use super::beach_line::{Arc, BeachItem, Breakpoint, Protection};
use super::dcel::Dcel;
use super::dcel_operations::{contract_edge, remove_contracted};
use super::elements::{FaceData, VertexData};
use super::handles::{FixedUndirectedEdgeHandle, FixedVertexHandle};
use super::sweep::Sweep;
use super::sweep_tree::NodeId;
use super::VoronoiError;

impl<'a> Sweep<'a> {
    /// Appends a site lying on the height of the topmost site to the right end of the
    /// beach line.
    ///
    /// Sites on the initial sweep height are processed from left to right. Their arcs are
    /// degenerate and are separated by vertical breakpoints whose edges reach up to
    /// infinity. No triple of them can converge.
    pub(super) fn append_horizontal(&mut self, site: usize) -> Result<(), VoronoiError> {
        let last = self
            .beach_line
            .last()
            .and_then(|last| self.arc_site(last))
            .ok_or_else(|| {
                VoronoiError::invariant(
                    format!("site event {}", site),
                    "beach line does not end with an arc",
                )
            })?;

        let face = self.face_of(site)?;
        let last_face = self.face_of(last)?;
        let edge = self.builder.add_edge(face, last_face);
        self.beach_line
            .push_back(BeachItem::Breakpoint(Breakpoint::new(last, site, edge)));
        self.beach_line.push_back(BeachItem::Arc(Arc::new(site)));
        self.upper_rays.push(edge);
        trace!(site, left = last, "site appended on the initial sweep height");
        Ok(())
    }

    /// Protects the breakpoints of a new arc if the site lies exactly below an older
    /// breakpoint.
    ///
    /// In that case, the split arc's right part has zero width and will disappear at the
    /// current sweep height. The new arc itself must survive.
    pub(super) fn protect_if_below_breakpoint(
        &mut self,
        site: usize,
        new_breakpoints: [NodeId; 2],
        split_arc: NodeId,
    ) {
        let x = self.site(site).x;
        let below = match self.beach_line.successor(split_arc) {
            Some(breakpoint) => self
                .beach_line
                .breakpoint_position(breakpoint, self.sites, self.sweep_y)
                .map_or(false, |position| (position - x).abs() <= self.tolerance),
            None => false,
        };
        if !below {
            return;
        }

        let protection = Protection {
            sweep_y: self.sweep_y,
            site,
        };
        for breakpoint in new_breakpoints {
            if let Some(breakpoint) = self.beach_line.breakpoint_mut(breakpoint) {
                breakpoint.protection = Some(protection);
            }
        }
        trace!(site, sweep_y = self.sweep_y, "site below breakpoint, arc protected");
    }

    /// Returns `true` if a breakpoint forbids removing `site`'s arc at the height `bottom`.
    pub(super) fn is_protected(&self, breakpoint: NodeId, site: usize, bottom: f64) -> bool {
        self.beach_line
            .breakpoint(breakpoint)
            .and_then(|breakpoint| breakpoint.protection)
            .map_or(false, |protection| {
                protection.site == site && (bottom - protection.sweep_y).abs() <= self.tolerance
            })
    }
}

/// Merges Voronoi vertices that were created several times at the same position.
///
/// Four or more co-circular sites create one circle event per triple. All of them emit a
/// vertex at the circle's center, connected by edges of zero length. These edges are
/// contracted until a single vertex remains.
///
/// Returns the number of removed edges.
pub fn merge_zero_length_edges(dcel: &mut Dcel<VertexData, FaceData>, tolerance: f64) -> usize {
    let groups = coincident_vertex_groups(dcel, tolerance);

    let mut dead_edges: Vec<FixedUndirectedEdgeHandle> = Vec::new();
    let mut dead_vertices: Vec<FixedVertexHandle> = Vec::new();
    for edge in dcel.fixed_undirected_edges() {
        let directed = edge.as_directed();
        let [from, to] = dcel.directed_edge(directed).vertices().map(|vertex| vertex.fix());
        if from == to {
            continue;
        }
        match (groups[from.index()], groups[to.index()]) {
            (Some(first), Some(second)) if first == second => {}
            _ => continue,
        }

        if let Some(removed) = contract_edge(dcel, directed) {
            trace!(
                vertex = from.index(),
                removed = removed.index(),
                "zero length edge contracted"
            );
            dead_edges.push(edge);
            dead_vertices.push(removed);
        }
    }

    let merges = dead_edges.len();
    if merges > 0 {
        remove_contracted(dcel, dead_edges, dead_vertices);
        debug!(merges, "merged coincident Voronoi vertices");
    }
    merges
}

/// Assigns a common group to all Voronoi vertices that share their position and circle.
fn coincident_vertex_groups(
    dcel: &Dcel<VertexData, FaceData>,
    tolerance: f64,
) -> Vec<Option<usize>> {
    let mut sorted: Vec<_> = dcel
        .vertices()
        .filter(|vertex| vertex.data().is_voronoi_vertex())
        .map(|vertex| (vertex.fix(), *vertex.data()))
        .collect();
    sorted.sort_by(|(_, a), (_, b)| a.position.x.total_cmp(&b.position.x));

    let mut groups = vec![None; dcel.num_vertices()];
    let mut next_group = 0;
    for (index, (vertex, data)) in sorted.iter().enumerate() {
        if groups[vertex.index()].is_some() {
            continue;
        }
        let group = Some(next_group);
        next_group += 1;
        groups[vertex.index()] = group;

        for (other, other_data) in sorted[index + 1..]
            .iter()
            .take_while(|(_, other_data)| other_data.position.x - data.position.x <= tolerance)
        {
            if groups[other.index()].is_none() && is_coincident(data, other_data, tolerance) {
                groups[other.index()] = group;
            }
        }
    }
    groups
}

fn is_coincident(first: &VertexData, second: &VertexData, tolerance: f64) -> bool {
    if !first.position.approx_eq(second.position, tolerance) {
        return false;
    }
    match (first.circle(), second.circle()) {
        (Some(a), Some(b)) => a.approx_eq(&b, tolerance),
        _ => false,
    }
}
