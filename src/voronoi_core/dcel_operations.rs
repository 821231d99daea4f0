use super::dcel::Dcel;
use super::handles::*;

use smallvec::SmallVec;

pub const OUTER_FACE_HANDLE: FixedFaceHandle = new_fixed_face_handle(0);

/// Contracts a directed edge into its origin.
///
/// All edges leaving the edge's destination are redirected to leave the edge's origin and
/// the edge itself is spliced out of both adjacent face cycles. The edge and its former
/// destination are left behind as isolated elements and need to be removed with
/// [remove_contracted] once all contractions are done.
///
/// Returns the isolated destination vertex or `None` if the edge cannot be contracted
/// without disconnecting a vertex.
pub fn contract_edge<V, F>(
    dcel: &mut Dcel<V, F>,
    e: FixedDirectedEdgeHandle,
) -> Option<FixedVertexHandle> {
    let t = e.rev();
    let e_entry = *dcel.half_edge(e);
    let t_entry = *dcel.half_edge(t);

    let v1 = e_entry.origin;
    let v2 = t_entry.origin;
    if v1 == v2 || e_entry.next == t || t_entry.next == e {
        return None;
    }

    let to_redirect: SmallVec<[_; 8]> = dcel
        .vertex(v2)
        .out_edges()
        .map(|edge| edge.fix())
        .filter(|edge| *edge != t)
        .collect();
    for edge in to_redirect {
        dcel.half_edge_mut(edge).origin = v1;
    }

    let en = e_entry.next;
    let ep = e_entry.prev;
    let tn = t_entry.next;
    let tp = t_entry.prev;

    dcel.half_edge_mut(ep).next = en;
    dcel.half_edge_mut(en).prev = ep;
    dcel.half_edge_mut(tp).next = tn;
    dcel.half_edge_mut(tn).prev = tp;

    dcel.vertices[v1.index()].out_edge = Some(tn);
    dcel.vertices[v2.index()].out_edge = None;

    let e_face = &mut dcel.faces[e_entry.face.index()];
    if e_face.adjacent_edge == Some(e) {
        e_face.adjacent_edge = Some(en);
    }
    let t_face = &mut dcel.faces[t_entry.face.index()];
    if t_face.adjacent_edge == Some(t) {
        t_face.adjacent_edge = Some(tn);
    }

    Some(v2)
}

/// Removes edges and vertices that have been isolated by [contract_edge].
pub fn remove_contracted<V, F>(
    dcel: &mut Dcel<V, F>,
    mut edges: Vec<FixedUndirectedEdgeHandle>,
    mut vertices: Vec<FixedVertexHandle>,
) {
    edges.sort_unstable();
    for edge in edges.iter().rev() {
        swap_remove_undirected_edge(dcel, *edge);
    }

    vertices.sort_unstable();
    for vertex in vertices.iter().rev() {
        swap_remove_vertex(dcel, *vertex);
    }
}

fn swap_remove_undirected_edge<V, F>(
    dcel: &mut Dcel<V, F>,
    edge_handle: FixedUndirectedEdgeHandle,
) {
    dcel.edges.swap_remove(edge_handle.index());
    if dcel.num_undirected_edges() > edge_handle.index() {
        let directed = edge_handle.as_directed();
        fix_handle_swap(dcel, directed.rev());
        fix_handle_swap(dcel, directed);
    }
}

fn fix_handle_swap<V, F>(dcel: &mut Dcel<V, F>, edge_handle: FixedDirectedEdgeHandle) {
    // An edge handle was moved to index "edge_handle".
    // Make sure to update all references to this edge
    //
    // Since this method gets only called as part of a swap_remove, the edge that got
    // swapped in always had the index dcel.num_undirected_edges .
    let old_handle = FixedUndirectedEdgeHandle::new(dcel.num_undirected_edges());
    let old_to_new = |handle: FixedDirectedEdgeHandle| {
        let undirected = handle.as_undirected();
        if undirected == old_handle {
            // handle.as_undirected is now edge_handle
            if handle.is_normalized() {
                edge_handle.as_undirected().normalized()
            } else {
                edge_handle.as_undirected().not_normalized()
            }
        } else {
            handle
        }
    };
    let edge_next = old_to_new(dcel.half_edge(edge_handle).next);
    let edge_prev = old_to_new(dcel.half_edge(edge_handle).prev);
    dcel.half_edge_mut(edge_handle).next = edge_next;
    dcel.half_edge_mut(edge_handle).prev = edge_prev;
    dcel.half_edge_mut(edge_prev).next = edge_handle;
    dcel.half_edge_mut(edge_next).prev = edge_handle;

    let edge_origin = dcel.half_edge(edge_handle).origin;
    let edge_face = dcel.half_edge(edge_handle).face;
    dcel.vertices[edge_origin.index()].out_edge = Some(edge_handle);
    dcel.faces[edge_face.index()].adjacent_edge = Some(edge_handle);
}

/// Removes an isolated vertex from the DCEL by swapping in another.
///
/// Only references to the swapped in vertex are updated.
fn swap_remove_vertex<V, F>(dcel: &mut Dcel<V, F>, vertex_handle: FixedVertexHandle) -> V {
    let data = dcel.vertices.swap_remove(vertex_handle.index()).data;
    if dcel.vertices.len() != vertex_handle.index() {
        // Update origin of all out edges of the swapped in vertex
        let to_update: SmallVec<[_; 8]> = dcel
            .vertex(vertex_handle)
            .out_edges()
            .map(|handle| handle.fix())
            .collect();
        for e in to_update {
            dcel.half_edge_mut(e).origin = vertex_handle;
        }
    };
    data
}

#[cfg(test)]
mod test {
    use super::{contract_edge, remove_contracted, OUTER_FACE_HANDLE};
    use crate::voronoi_core::dcel::Dcel;
    use crate::voronoi_core::handles::FixedUndirectedEdgeHandle;
    use crate::voronoi_core::dcel_builder::DcelBuilder;
    use crate::VoronoiError;

    /// A square split into four faces by edges meeting in two coincident center vertices.
    ///
    /// Vertices 0 to 3 are the corners (counterclockwise), 4 is the left and 5 the right
    /// center vertex. Undirected edge 6 connects the two center vertices.
    fn split_square() -> Result<Dcel<usize, ()>, VoronoiError> {
        let mut builder = DcelBuilder::new(());
        let bottom = builder.add_face(());
        let right = builder.add_face(());
        let top = builder.add_face(());
        let left = builder.add_face(());
        let c: Vec<_> = (0..4).map(|index| builder.add_vertex(index)).collect();
        let p = builder.add_vertex(4);
        let q = builder.add_vertex(5);

        let mut edge = |face, twin_face, from, to| {
            let edge = builder.add_edge(face, twin_face);
            builder.set_origin(edge, from);
            builder.set_origin(edge.rev(), to);
            edge
        };
        let s0 = edge(bottom, OUTER_FACE_HANDLE, c[0], c[1]);
        let s1 = edge(right, OUTER_FACE_HANDLE, c[1], c[2]);
        let s2 = edge(top, OUTER_FACE_HANDLE, c[2], c[3]);
        let s3 = edge(left, OUTER_FACE_HANDLE, c[3], c[0]);
        let q1 = edge(bottom, right, c[1], q);
        let q2 = edge(right, top, c[2], q);
        let pq = edge(bottom, top, q, p);
        let p0 = edge(bottom, left, p, c[0]);
        let p3 = edge(top, left, c[3], p);

        for cycle in [
            vec![s0, q1, pq, p0],
            vec![s1, q2, q1.rev()],
            vec![s2, p3, pq.rev(), q2.rev()],
            vec![s3, p0.rev(), p3.rev()],
            vec![s3.rev(), s2.rev(), s1.rev(), s0.rev()],
        ] {
            for (index, edge) in cycle.iter().enumerate() {
                builder.connect(*edge, cycle[(index + 1) % cycle.len()]);
            }
        }
        builder.finalize()
    }

    #[test]
    fn test_split_square() -> Result<(), VoronoiError> {
        let dcel = split_square()?;
        dcel.sanity_check();
        assert_eq!(dcel.num_vertices(), 6);
        assert_eq!(dcel.num_undirected_edges(), 9);
        assert_eq!(dcel.num_faces(), 5);
        Ok(())
    }

    #[test]
    fn test_contract_edge() -> Result<(), VoronoiError> {
        let mut dcel = split_square()?;
        let center_edge = FixedUndirectedEdgeHandle::new(6);
        let removed = contract_edge(&mut dcel, center_edge.as_directed());
        assert_eq!(removed.map(|vertex| vertex.index()), Some(4));

        remove_contracted(&mut dcel, vec![center_edge], vec![removed.unwrap()]);
        dcel.sanity_check();

        assert_eq!(dcel.num_vertices(), 5);
        assert_eq!(dcel.num_undirected_edges(), 8);
        let center = dcel
            .vertices()
            .find(|vertex| *vertex.data() == 5)
            .expect("Center vertex missing");
        assert_eq!(center.degree(), 4);
        assert_eq!(center.index(), 4);

        let mut cycle_lengths: Vec<_> = dcel
            .faces()
            .skip(1)
            .map(|face| face.edges().count())
            .collect();
        cycle_lengths.sort_unstable();
        assert_eq!(cycle_lengths, vec![3, 3, 3, 3]);
        assert_eq!(dcel.outer_face().edges().count(), 4);
        Ok(())
    }
}
