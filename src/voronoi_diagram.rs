use tracing::debug;

use crate::handles::{
    DirectedEdgeHandle, FaceHandle, FixedDirectedEdgeHandle, FixedFaceHandle, FixedVertexHandle,
    UndirectedEdgeHandle, VertexHandle,
};
use crate::voronoi_core::{
    attach_to_bounding_box, merge_zero_length_edges, BoundingBox, Cell, Dcel, FaceData, Sweep,
    SweepResult, SweepStatistics, VertexData, VoronoiError,
};
use crate::{validate_site, HasPosition, Point2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configures how a [VoronoiDiagram] is built.
///
/// # Example
///
/// ```
/// use fortune_voronoi::{Point2, VoronoiDiagram, VoronoiError, VoronoiOptions};
///
/// # fn main() -> Result<(), VoronoiError> {
/// let options = VoronoiOptions::default()
///     .with_box_margin(1.0)
///     .with_square_box(true);
///
/// let sites = [Point2::new(0.0, 0.0), Point2::new(2.0, 1.0)];
/// let diagram = VoronoiDiagram::with_options(&sites, options)?;
///
/// let bounding_box = diagram.bounding_box().unwrap();
/// assert_eq!(bounding_box.min(), Point2::new(-3.0, -3.0));
/// assert_eq!(bounding_box.max(), Point2::new(3.0, 3.0));
/// # Ok(()) }
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct VoronoiOptions {
    pub(crate) tolerance: f64,
    pub(crate) box_margin: f64,
    pub(crate) square_box: bool,
    pub(crate) max_box_attempts: usize,
}

impl Default for VoronoiOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            box_margin: 10.0,
            square_box: false,
            max_box_attempts: 8,
        }
    }
}

impl VoronoiOptions {
    /// Sets the relative tolerance used for comparing event heights, breakpoint positions
    /// and vertex positions.
    ///
    /// The tolerance is multiplied by the largest absolute site coordinate (or 1.0, if all
    /// sites lie within the unit square). Defaults to `1e-9`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the distance between the bounding box and the closest site or Voronoi vertex.
    ///
    /// The margin is doubled every time the unbounded edges cannot be attached to the box.
    /// A margin of zero is first enlarged to 1.0. Defaults to `10.0`.
    pub fn with_box_margin(mut self, box_margin: f64) -> Self {
        self.box_margin = box_margin;
        self
    }

    /// Uses a square bounding box centered at the origin instead of the tightest
    /// enclosing rectangle. Defaults to `false`.
    pub fn with_square_box(mut self, square_box: bool) -> Self {
        self.square_box = square_box;
        self
    }

    /// Sets how often the bounding box is enlarged before
    /// [VoronoiError::BoundingBoxAttachment] is returned. Defaults to `8`.
    pub fn with_max_box_attempts(mut self, max_box_attempts: usize) -> Self {
        self.max_box_attempts = max_box_attempts;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn box_margin(&self) -> f64 {
        self.box_margin
    }

    pub fn square_box(&self) -> bool {
        self.square_box
    }

    pub fn max_box_attempts(&self) -> usize {
        self.max_box_attempts
    }
}

/// A two dimensional Voronoi diagram.
///
/// The Voronoi diagram of a set of sites partitions the plane into cells. Every cell
/// contains the points that are closer to its site than to any other site.
///
/// The diagram is built with Fortune's sweep line algorithm in `O(n log n)` and stored as a
/// doubly connected edge list. Unbounded cells are clipped by an axis aligned
/// [BoundingBox] that surrounds all sites and Voronoi vertices.
///
/// # Basic Usage
///
/// ```
/// use fortune_voronoi::{Cell, Point2, VoronoiDiagram, VoronoiError};
///
/// # fn main() -> Result<(), VoronoiError> {
/// let sites = [
///     Point2::new(0.0, 0.0),
///     Point2::new(4.0, 0.0),
///     Point2::new(0.0, 4.0),
/// ];
///
/// let diagram = VoronoiDiagram::new(&sites)?;
///
/// assert_eq!(diagram.num_vertices(), 1);
/// let vertex = diagram.vertices().next().unwrap();
/// assert_eq!(vertex.position(), Point2::new(2.0, 2.0));
///
/// // The three cells are separated by three edges meeting at the vertex
/// assert_eq!(diagram.num_voronoi_edges(), 3);
/// assert!(matches!(diagram.cell(0), Some(Cell::Region(_))));
/// # Ok(()) }
/// ```
///
/// # Cells
///
/// Every site is associated with a [Cell]. Sites sharing their position with an earlier
/// site are reported as [Cell::Duplicate] and don't own a face:
///
/// ```
/// use fortune_voronoi::{Cell, Point2, VoronoiDiagram, VoronoiError};
///
/// # fn main() -> Result<(), VoronoiError> {
/// let sites = [
///     Point2::new(1.0, 1.0),
///     Point2::new(3.0, 2.0),
///     Point2::new(1.0, 1.0),
/// ];
/// let diagram = VoronoiDiagram::new(&sites)?;
/// assert_eq!(diagram.cell(2), Some(Cell::Duplicate { of: 0 }));
///
/// // Cell edges are returned in counterclockwise order
/// for edge in diagram.cell_edges(0) {
///     assert_eq!(edge.face().data().site(), Some(0));
/// }
/// # Ok(()) }
/// ```
#[doc(alias = "Fortune")]
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct VoronoiDiagram<V> {
    sites: Vec<V>,
    dcel: Dcel<VertexData, FaceData>,
    cells: Vec<Cell>,
    bounding_box: Option<BoundingBox>,
    statistics: SweepStatistics,
    options: VoronoiOptions,
    scale: f64,
}

impl<V> VoronoiDiagram<V>
where
    V: HasPosition + Clone,
{
    /// Builds the Voronoi diagram of a set of sites with the default [VoronoiOptions].
    ///
    /// Returns an error if any site has an invalid position, see [validate_site].
    pub fn new(sites: &[V]) -> Result<Self, VoronoiError> {
        Self::with_options(sites, VoronoiOptions::default())
    }

    /// Builds the Voronoi diagram of a set of sites.
    ///
    /// No diagram is returned if any step of the construction fails.
    pub fn with_options(sites: &[V], options: VoronoiOptions) -> Result<Self, VoronoiError> {
        let mut positions = Vec::with_capacity(sites.len());
        for site in sites {
            validate_site(site)?;
            positions.push(site.position().to_f64());
        }

        let scale = positions
            .iter()
            .fold(1.0f64, |acc, position| acc.max(position.x.abs()).max(position.y.abs()));
        let tolerance = options.tolerance * scale;

        let SweepResult {
            mut builder,
            cells,
            dangling,
            mut statistics,
        } = Sweep::new(&positions, tolerance).run()?;

        let extent = if positions.is_empty() {
            None
        } else {
            let (extent, attempts) =
                attach_to_bounding_box(&mut builder, &positions, &dangling, &options, tolerance)?;
            statistics.box_attempts = attempts;
            Some(extent)
        };

        let mut dcel = builder.finalize()?;
        statistics.zero_length_merges = merge_zero_length_edges(&mut dcel, tolerance);
        let bounding_box =
            extent.map(|extent| BoundingBox::from_dcel(&dcel, extent.min, extent.max));

        let result = Self {
            sites: sites.to_vec(),
            dcel,
            cells,
            bounding_box,
            statistics,
            options,
            scale,
        };
        debug!(
            sites = result.num_sites(),
            vertices = result.num_vertices(),
            voronoi_edges = result.num_voronoi_edges(),
            boundary_edges = result.num_boundary_edges(),
            "voronoi diagram built"
        );
        Ok(result)
    }
}

impl<V> VoronoiDiagram<V>
where
    V: HasPosition,
{
    /// Returns the input sites in their original order.
    pub fn sites(&self) -> &[V] {
        &self.sites
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Returns the options this diagram was built with.
    pub fn options(&self) -> &VoronoiOptions {
        &self.options
    }

    /// Returns the counters collected while building the diagram.
    pub fn statistics(&self) -> SweepStatistics {
        self.statistics
    }

    /// Returns the bounding box or `None` if the diagram has no sites.
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Returns the cell of the site with the given index or `None` if the index is out of
    /// bounds.
    pub fn cell(&self, site: usize) -> Option<Cell> {
        self.cells.get(site).copied()
    }

    /// Returns the cells of all sites, in input order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates over the edges of a site's cell in counterclockwise order.
    ///
    /// The iterator is empty for duplicate sites and out of bounds indices.
    pub fn cell_edges(&self, site: usize) -> impl Iterator<Item = DirectedEdgeHandle<'_>> + '_ {
        self.cells
            .get(site)
            .and_then(Cell::face)
            .map(|face| self.dcel.face(face))
            .into_iter()
            .flat_map(|face| face.edges())
    }

    /// Returns the corners of a site's cell in counterclockwise order.
    ///
    /// Cells of outer sites are clipped by the bounding box.
    pub fn cell_polygon(&self, site: usize) -> Vec<Point2<f64>> {
        self.cell_edges(site)
            .map(|edge| edge.from().position())
            .collect()
    }

    /// Iterates over all Voronoi vertices.
    ///
    /// Co-circular sites create a single vertex whose degree matches the number of
    /// sites on the circle. Vertices on the bounding box are not included.
    pub fn vertices(&self) -> impl Iterator<Item = VertexHandle<'_>> + '_ {
        self.dcel
            .vertices()
            .filter(|vertex| vertex.data().is_voronoi_vertex())
    }

    /// Iterates over all vertices created on the bounding box.
    pub fn boundary_vertices(&self) -> impl Iterator<Item = VertexHandle<'_>> + '_ {
        self.dcel
            .vertices()
            .filter(|vertex| !vertex.data().is_voronoi_vertex())
    }

    /// Returns the number of Voronoi vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices().count()
    }

    /// Iterates over the edges separating two cells.
    ///
    /// Unbounded edges are included and end at the bounding box.
    pub fn voronoi_edges(&self) -> impl Iterator<Item = UndirectedEdgeHandle<'_>> + '_ {
        self.dcel.undirected_edges().filter(|edge| {
            let [edge, rev] = edge.directed_edges();
            !edge.face().is_outer() && !rev.face().is_outer()
        })
    }

    pub fn num_voronoi_edges(&self) -> usize {
        self.voronoi_edges().count()
    }

    /// Iterates over the bounding box edges. Each edge's face is the adjacent cell.
    pub fn boundary_edges(&self) -> impl Iterator<Item = DirectedEdgeHandle<'_>> + '_ {
        self.bounding_box
            .iter()
            .flat_map(|bounding_box| bounding_box.edges())
            .map(move |edge| self.dcel.directed_edge(edge))
    }

    pub fn num_boundary_edges(&self) -> usize {
        self.bounding_box
            .as_ref()
            .map_or(0, |bounding_box| bounding_box.num_edges())
    }

    /// Converts a fixed vertex handle into a dynamic handle.
    ///
    /// Panics if the handle does not belong to this diagram.
    pub fn vertex(&self, handle: FixedVertexHandle) -> VertexHandle<'_> {
        self.dcel.vertex(handle)
    }

    /// Converts a fixed directed edge handle into a dynamic handle.
    ///
    /// Panics if the handle does not belong to this diagram.
    pub fn directed_edge(&self, handle: FixedDirectedEdgeHandle) -> DirectedEdgeHandle<'_> {
        self.dcel.directed_edge(handle)
    }

    /// Converts a fixed face handle into a dynamic handle.
    ///
    /// Panics if the handle does not belong to this diagram.
    pub fn face(&self, handle: FixedFaceHandle) -> FaceHandle<'_> {
        self.dcel.face(handle)
    }

    /// Returns the face surrounding the bounding box.
    pub fn outer_face(&self) -> FaceHandle<'_> {
        self.dcel.outer_face()
    }

    /// Iterates over all faces, starting with the outer face.
    pub fn faces(&self) -> impl Iterator<Item = FaceHandle<'_>> + '_ {
        self.dcel.faces()
    }

    /// Checks the geometric and topological properties of the diagram.
    ///
    /// This verifies that
    ///  - every face is bounded by a closed cycle of edges,
    ///  - every Voronoi vertex is equidistant to the sites of its adjacent cells and no other
    ///    site is closer,
    ///  - the midpoint of every Voronoi edge is equidistant to the sites of both adjacent
    ///    cells and no other site is closer.
    ///
    /// Distances are compared with a tolerance of `1e-6` relative to the compared distance,
    /// but never less than `1e-6` times the input's extent.
    /// The site checks compare against all sites and take quadratic time.
    pub fn validate(&self) -> Result<(), VoronoiError> {
        self.validate_face_cycles()?;

        let tolerance = 1e-6;
        let positions: Vec<_> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.face().is_some())
            .map(|(index, _)| (index, self.sites[index].position().to_f64()))
            .collect();

        for vertex in self.vertices() {
            let center = vertex.position();
            let defining: Vec<_> = vertex
                .out_edges()
                .filter_map(|edge| edge.face().data().site())
                .collect();
            if defining.len() < 3 {
                return Err(invalid(
                    format!("vertex {}", vertex.index()),
                    format!("adjacent to {} cells", defining.len()),
                ));
            }
            check_closest(&positions, center, &defining, tolerance, self.scale)
                .map_err(|detail| invalid(format!("vertex {}", vertex.index()), detail))?;
        }

        for edge in self.voronoi_edges() {
            let [from, to] = edge.positions();
            let midpoint = from.midpoint(to);
            let defining: Vec<_> = edge
                .directed_edges()
                .iter()
                .filter_map(|edge| edge.face().data().site())
                .collect();
            check_closest(&positions, midpoint, &defining, tolerance, self.scale)
                .map_err(|detail| invalid(format!("edge {}", edge.index()), detail))?;
        }
        Ok(())
    }

    fn validate_face_cycles(&self) -> Result<(), VoronoiError> {
        let limit = self.dcel.num_directed_edges();
        let mut visited = 0;
        for face in self.dcel.faces() {
            let start = match face.adjacent_edge() {
                Some(edge) => edge,
                None => continue,
            };
            let mut current = start;
            let mut steps = 0;
            loop {
                if current.face() != face {
                    return Err(invalid(
                        format!("face {}", face.index()),
                        format!("edge {} belongs to another face", current.index()),
                    ));
                }
                if current.next().from() != current.to() {
                    return Err(invalid(
                        format!("face {}", face.index()),
                        format!("edge {} is not connected to its successor", current.index()),
                    ));
                }
                steps += 1;
                current = current.next();
                if current == start {
                    break;
                }
                if steps > limit {
                    return Err(invalid(
                        format!("face {}", face.index()),
                        "edge cycle does not close",
                    ));
                }
            }
            visited += steps;
        }

        if visited != limit {
            return Err(invalid(
                "face cycles",
                format!("{} of {} edges lie on a face cycle", visited, limit),
            ));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn dcel(&self) -> &Dcel<VertexData, FaceData> {
        &self.dcel
    }
}

fn invalid(event: impl Into<String>, detail: impl Into<String>) -> VoronoiError {
    VoronoiError::invariant(event, detail)
}

/// Checks that the `defining` sites are equally close to `point` and that no site is closer.
fn check_closest(
    positions: &[(usize, Point2<f64>)],
    point: Point2<f64>,
    defining: &[usize],
    tolerance: f64,
    scale: f64,
) -> Result<(), String> {
    let distance_to = |site: usize| {
        positions
            .iter()
            .find(|(index, _)| *index == site)
            .map(|(_, position)| position.distance(point))
    };

    let mut radius = None;
    for site in defining {
        let distance = distance_to(*site).ok_or_else(|| format!("unknown site {}", site))?;
        match radius {
            None => radius = Some(distance),
            Some(radius) if (radius - distance).abs() > tolerance * radius.max(scale) => {
                return Err(format!(
                    "site {} has distance {} instead of {}",
                    site, distance, radius
                ));
            }
            Some(_) => {}
        }
    }

    let radius = radius.ok_or_else(|| String::from("no adjacent sites"))?;
    let bound = radius - tolerance * radius.max(scale);
    for (site, position) in positions {
        if position.distance(point) < bound {
            return Err(format!("site {} is closer than the adjacent sites", site));
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{check_closest, VoronoiDiagram, VoronoiOptions};
    use crate::test_utilities::{
        init_tracing, random_points_in_range, random_points_with_seed, SEED, SEED2,
    };
    use crate::{BoxSide, Cell, InsertionError, Point2, VoronoiError};
    use approx::assert_abs_diff_eq;
    use rand::distributions::{Distribution, Uniform};
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn regular_polygon(corners: usize) -> Vec<Point2<f64>> {
        (0..corners)
            .map(|index| {
                let angle = std::f64::consts::TAU * index as f64 / corners as f64;
                Point2::new(angle.cos(), angle.sin())
            })
            .collect()
    }

    fn signed_area(polygon: &[Point2<f64>]) -> f64 {
        let mut area = 0.0;
        for (index, current) in polygon.iter().enumerate() {
            let next = polygon[(index + 1) % polygon.len()];
            area += current.x * next.y - next.x * current.y;
        }
        area * 0.5
    }

    /// Returns the pairs of adjacent cells, identified by their site positions.
    fn adjacency(diagram: &VoronoiDiagram<Point2<f64>>) -> Vec<[(u64, u64); 2]> {
        let key = |site: Option<usize>| {
            site.map(|site| {
                let position = diagram.sites()[site];
                (position.x.to_bits(), position.y.to_bits())
            })
        };
        let mut result: Vec<_> = diagram
            .voronoi_edges()
            .filter_map(|edge| {
                let [edge, rev] = edge.directed_edges();
                let mut pair = [key(edge.face().data().site())?, key(rev.face().data().site())?];
                pair.sort();
                Some(pair)
            })
            .collect();
        result.sort();
        result
    }

    #[test]
    fn test_empty() -> Result<(), VoronoiError> {
        let diagram = VoronoiDiagram::<Point2<f64>>::new(&[])?;
        assert_eq!(diagram.num_sites(), 0);
        assert_eq!(diagram.num_vertices(), 0);
        assert_eq!(diagram.num_voronoi_edges(), 0);
        assert_eq!(diagram.num_boundary_edges(), 0);
        assert!(diagram.bounding_box().is_none());
        diagram.validate()
    }

    #[test]
    fn test_single_site() -> Result<(), VoronoiError> {
        let diagram = VoronoiDiagram::new(&[Point2::new(1.0, -2.0)])?;
        assert_eq!(diagram.num_vertices(), 0);
        assert_eq!(diagram.num_boundary_edges(), 4);
        let polygon = diagram.cell_polygon(0);
        assert_eq!(polygon.len(), 4);
        assert_abs_diff_eq!(signed_area(&polygon), 400.0, epsilon = 1e-9);
        diagram.validate()
    }

    #[test]
    fn test_invalid_site() {
        let sites = [Point2::new(0.0, 0.0), Point2::new(f64::NAN, 1.0)];
        assert_eq!(
            VoronoiDiagram::new(&sites).err(),
            Some(VoronoiError::Insertion(InsertionError::NAN))
        );

        let sites = [Point2::new(f64::INFINITY, 0.0)];
        assert_eq!(
            VoronoiDiagram::new(&sites).err(),
            Some(VoronoiError::Insertion(InsertionError::TooLarge))
        );
    }

    #[test]
    fn test_triangle() -> Result<(), VoronoiError> {
        init_tracing();
        let sites = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        ];
        let diagram = VoronoiDiagram::new(&sites)?;
        diagram.dcel().sanity_check();

        assert_eq!(diagram.num_vertices(), 1);
        let vertex = diagram.vertices().next().unwrap();
        assert_abs_diff_eq!(vertex.position().x, 2.0);
        assert_abs_diff_eq!(vertex.position().y, 2.0);
        assert_eq!(vertex.degree(), 3);
        assert_eq!(diagram.num_voronoi_edges(), 3);

        // The edge between the two upper sites hits the upper right corner. The corner
        // is not duplicated.
        assert_eq!(diagram.num_boundary_edges(), 6);
        assert_eq!(diagram.boundary_vertices().count(), 6);

        for site in 0..3 {
            let polygon = diagram.cell_polygon(site);
            assert!(signed_area(&polygon) > 0.0);
            for edge in diagram.cell_edges(site) {
                assert_eq!(edge.face().data().site(), Some(site));
            }
        }
        diagram.validate()
    }

    #[test]
    fn test_collinear_sites() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(-3.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
        ];
        let diagram = VoronoiDiagram::new(&sites)?;
        assert_eq!(diagram.num_vertices(), 0);
        assert_eq!(diagram.num_voronoi_edges(), 2);

        let mut xs: Vec<_> = diagram
            .voronoi_edges()
            .map(|edge| {
                let [from, to] = edge.positions();
                assert_abs_diff_eq!(from.x, to.x);
                from.x
            })
            .collect();
        xs.sort_by(f64::total_cmp);
        assert_abs_diff_eq!(xs[0], -1.5);
        assert_abs_diff_eq!(xs[1], 1.5);
        diagram.validate()
    }

    #[test]
    fn test_vertical_collinear_sites() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(0.0, -3.0),
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 3.0),
        ];
        let diagram = VoronoiDiagram::new(&sites)?;
        assert_eq!(diagram.num_vertices(), 0);
        assert_eq!(diagram.num_voronoi_edges(), 2);
        for edge in diagram.voronoi_edges() {
            let [from, to] = edge.positions();
            assert_abs_diff_eq!(from.y, to.y);
            assert_abs_diff_eq!(from.y.abs(), 1.5);
        }
        diagram.validate()
    }

    fn check_nearly_collinear(factor: f64) -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(1.9999999977 * factor, 6.92e-9 * factor),
            Point2::new(4.39e-9 * factor, -3.54e-9 * factor),
            Point2::new(1.0000000047 * factor, -3.89e-9 * factor),
        ];
        let diagram = VoronoiDiagram::new(&sites)?;
        for site in 0..3 {
            assert!(matches!(diagram.cell(site), Some(Cell::Region(_))));
            assert!(signed_area(&diagram.cell_polygon(site)) > 0.0);
        }
        assert!(diagram.statistics().box_attempts >= 1);
        diagram.validate()
    }

    #[test]
    fn test_nearly_collinear_sites() -> Result<(), VoronoiError> {
        init_tracing();
        check_nearly_collinear(1.0)?;
        check_nearly_collinear(1000.0)
    }

    #[test]
    fn test_perturbed_lattice() -> Result<(), VoronoiError> {
        let mut rng = rand::rngs::StdRng::from_seed(*SEED);
        let noise = Uniform::new_inclusive(-1e-8, 1e-8);
        for _ in 0..20 {
            let sites: Vec<_> = (0..16)
                .map(|index| {
                    Point2::new(
                        (index % 4) as f64 + noise.sample(&mut rng),
                        (index / 4) as f64 + noise.sample(&mut rng),
                    )
                })
                .collect();
            VoronoiDiagram::new(&sites)?.validate()?;
        }
        Ok(())
    }

    #[test]
    fn test_check_closest_far_point() {
        let positions = [(0, Point2::new(-1.0, 0.0)), (1, Point2::new(1.0, 0.0))];
        // The distances differ by about 4e-3 due to the point's offset
        let point = Point2::new(2.0e10, 1.0e13);
        assert_eq!(check_closest(&positions, point, &[0, 1], 1e-6, 1.0), Ok(()));

        let closer = [positions[0], positions[1], (2, Point2::new(2.0e10, 0.0))];
        assert!(check_closest(&closer, point, &[0, 1], 1e-6, 1.0).is_err());
        assert!(check_closest(&positions, Point2::new(0.5, 0.0), &[0, 1], 1e-6, 1.0).is_err());
    }

    #[test]
    fn test_duplicate_site() -> Result<(), VoronoiError> {
        let sites = [Point2::new(1.0, 1.0), Point2::new(1.0, 1.0)];
        let diagram = VoronoiDiagram::new(&sites)?;
        assert!(matches!(diagram.cell(0), Some(Cell::Region(_))));
        assert_eq!(diagram.cell(1), Some(Cell::Duplicate { of: 0 }));
        assert_eq!(diagram.cell(2), None);
        // The outer face and a single cell
        assert_eq!(diagram.faces().count(), 2);
        assert_eq!(diagram.cell_edges(1).count(), 0);
        assert_eq!(diagram.statistics().duplicate_sites, 1);
        diagram.validate()
    }

    fn check_cocircular(corners: usize) -> Result<(), VoronoiError> {
        let sites = regular_polygon(corners);
        let diagram = VoronoiDiagram::new(&sites)?;
        diagram.dcel().sanity_check();

        assert_eq!(diagram.num_vertices(), 1);
        let vertex = diagram.vertices().next().unwrap();
        assert_eq!(vertex.degree(), corners);
        assert_abs_diff_eq!(vertex.position().x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(vertex.position().y, 0.0, epsilon = 1e-9);
        assert_eq!(diagram.num_voronoi_edges(), corners);
        assert!(diagram.statistics().zero_length_merges >= corners - 3);
        diagram.validate()
    }

    #[test]
    fn test_four_cocircular_sites() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
            Point2::new(0.0, -1.0),
        ];
        let diagram = VoronoiDiagram::new(&sites)?;
        assert_eq!(diagram.statistics().circle_events, 2);
        assert_eq!(diagram.statistics().zero_length_merges, 1);
        assert_eq!(diagram.num_vertices(), 1);
        let vertex = diagram.vertices().next().unwrap();
        assert_eq!(vertex.position(), Point2::new(0.0, 0.0));
        assert_eq!(vertex.degree(), 4);
        diagram.validate()
    }

    #[test]
    fn test_cocircular_polygons() -> Result<(), VoronoiError> {
        for corners in [5, 8, 12] {
            check_cocircular(corners)?;
        }
        Ok(())
    }

    #[test]
    fn test_horizontal_start() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(-2.0, 2.0),
            Point2::new(0.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 0.0),
        ];
        let diagram = VoronoiDiagram::new(&sites)?;
        let mut vertices: Vec<_> = diagram.vertices().map(|vertex| vertex.position()).collect();
        vertices.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert_eq!(vertices.len(), 2);
        assert_abs_diff_eq!(vertices[0].x, -1.0);
        assert_abs_diff_eq!(vertices[0].y, 1.0);
        assert_abs_diff_eq!(vertices[1].x, 1.0);
        assert_abs_diff_eq!(vertices[1].y, 1.0);
        assert_eq!(diagram.num_voronoi_edges(), 5);
        diagram.validate()
    }

    #[test]
    fn test_site_below_breakpoint() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(0.0, 2.0),
            Point2::new(2.0, 2.0),
            Point2::new(1.0, 0.0),
        ];
        let diagram = VoronoiDiagram::new(&sites)?;
        assert_eq!(diagram.num_vertices(), 1);
        let vertex = diagram.vertices().next().unwrap();
        assert_abs_diff_eq!(vertex.position().x, 1.0);
        assert_abs_diff_eq!(vertex.position().y, 1.25);
        assert_eq!(diagram.num_voronoi_edges(), 3);
        diagram.validate()
    }

    #[test]
    fn test_grid() -> Result<(), VoronoiError> {
        const SIZE: usize = 4;
        let mut sites = Vec::new();
        for x in 0..SIZE {
            for y in 0..SIZE {
                sites.push(Point2::new(x as f64, y as f64));
            }
        }
        let diagram = VoronoiDiagram::new(&sites)?;
        diagram.dcel().sanity_check();

        assert_eq!(diagram.num_vertices(), (SIZE - 1) * (SIZE - 1));
        for vertex in diagram.vertices() {
            assert_eq!(vertex.degree(), 4);
            let position = vertex.position();
            assert_abs_diff_eq!(position.x.fract(), 0.5, epsilon = 1e-9);
            assert_abs_diff_eq!(position.y.fract(), 0.5, epsilon = 1e-9);
        }
        assert_eq!(diagram.num_voronoi_edges(), 2 * (SIZE - 1) * SIZE);
        diagram.validate()
    }

    #[test]
    fn test_random_points() -> Result<(), VoronoiError> {
        for (size, seed) in [(10, SEED), (100, SEED2), (1000, SEED)] {
            let sites = random_points_with_seed(size, seed);
            let diagram = VoronoiDiagram::new(&sites)?;
            diagram.dcel().sanity_check();
            assert!(diagram.num_vertices() <= 2 * size - 5);
            assert!(diagram.num_voronoi_edges() <= 3 * size - 6);
            assert_eq!(diagram.statistics().site_events, size);
            diagram.validate()?;
        }
        Ok(())
    }

    #[test]
    fn test_cells_cover_bounding_box() -> anyhow::Result<()> {
        for seed in [SEED, SEED2] {
            let sites = random_points_with_seed(300, seed);
            let diagram = VoronoiDiagram::new(&sites)?;
            let bounding_box = diagram
                .bounding_box()
                .ok_or_else(|| anyhow::anyhow!("missing bounding box"))?;
            let [min, max] = [bounding_box.min(), bounding_box.max()];

            let area: f64 = (0..sites.len())
                .map(|site| signed_area(&diagram.cell_polygon(site)))
                .sum();
            assert_abs_diff_eq!(area, (max.x - min.x) * (max.y - min.y), epsilon = 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_large_coordinates() -> Result<(), VoronoiError> {
        let sites = random_points_in_range(1.0e6, 200, SEED2);
        let diagram = VoronoiDiagram::new(&sites)?;
        assert!(diagram.num_vertices() <= 2 * sites.len() - 5);
        diagram.validate()
    }

    #[test]
    fn test_permutation_gives_same_graph() -> Result<(), VoronoiError> {
        let mut sites = random_points_with_seed(200, SEED);
        let expected = VoronoiDiagram::new(&sites)?;

        let mut rng = rand::rngs::StdRng::from_seed(*SEED2);
        for _ in 0..3 {
            sites.shuffle(&mut rng);
            let diagram = VoronoiDiagram::new(&sites)?;
            assert_eq!(diagram.num_vertices(), expected.num_vertices());
            assert_eq!(diagram.num_voronoi_edges(), expected.num_voronoi_edges());
            assert_eq!(adjacency(&diagram), adjacency(&expected));
        }

        let again = VoronoiDiagram::new(expected.sites())?;
        assert_eq!(adjacency(&again), adjacency(&expected));
        Ok(())
    }

    #[test]
    fn test_bounding_box() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        ];
        let options = VoronoiOptions::default().with_box_margin(1.0);
        let diagram = VoronoiDiagram::with_options(&sites, options)?;
        let bounding_box = diagram.bounding_box().unwrap();
        assert_eq!(bounding_box.min(), Point2::new(-1.0, -1.0));
        assert_eq!(bounding_box.max(), Point2::new(5.0, 5.0));

        let per_side: usize = BoxSide::ALL
            .iter()
            .map(|side| bounding_box.side(*side).len())
            .sum();
        assert_eq!(per_side, diagram.num_boundary_edges());

        for edge in diagram.boundary_edges() {
            assert!(edge.rev().face().is_outer());
            assert!(!edge.face().is_outer());
        }
        for edge in bounding_box.side(BoxSide::Bottom) {
            let [from, to] = diagram.directed_edge(*edge).positions();
            assert_eq!(from.y, -1.0);
            assert_eq!(to.y, -1.0);
            assert!(from.x < to.x);
        }
        assert_eq!(diagram.statistics().box_attempts, 1);
        diagram.validate()
    }

    #[test]
    fn test_square_box() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        ];
        let options = VoronoiOptions::default()
            .with_box_margin(1.0)
            .with_square_box(true);
        let diagram = VoronoiDiagram::with_options(&sites, options)?;
        let bounding_box = diagram.bounding_box().unwrap();
        assert_eq!(bounding_box.min(), Point2::new(-5.0, -5.0));
        assert_eq!(bounding_box.max(), Point2::new(5.0, 5.0));
        diagram.validate()
    }

    #[test]
    fn test_zero_margin_is_enlarged() -> Result<(), VoronoiError> {
        // The Voronoi vertex (2, -1.5) lies on the unenlarged box
        let sites = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 1.0),
        ];
        let options = VoronoiOptions::default().with_box_margin(0.0);
        let diagram = VoronoiDiagram::with_options(&sites, options)?;
        assert_eq!(diagram.statistics().box_attempts, 2);
        let bounding_box = diagram.bounding_box().unwrap();
        assert_eq!(bounding_box.min(), Point2::new(-1.0, -2.5));
        diagram.validate()
    }

    #[test]
    fn test_attachment_attempts_exhausted() {
        let sites = [
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(2.0, 1.0),
        ];
        let options = VoronoiOptions::default()
            .with_box_margin(0.0)
            .with_max_box_attempts(1);
        assert_eq!(options.max_box_attempts(), 1);
        assert_eq!(
            VoronoiDiagram::with_options(&sites, options).err(),
            Some(VoronoiError::BoundingBoxAttachment { attempts: 1 })
        );
    }

    #[test]
    fn test_custom_tolerance() -> Result<(), VoronoiError> {
        // Both sites are considered duplicates with a coarse tolerance
        let sites = [Point2::new(1.0, 1.0), Point2::new(1.0 + 1e-7, 1.0)];
        let options = VoronoiOptions::default().with_tolerance(1e-6);
        let diagram = VoronoiDiagram::with_options(&sites, options)?;
        assert_eq!(diagram.cell(1), Some(Cell::Duplicate { of: 0 }));

        let diagram = VoronoiDiagram::new(&sites)?;
        assert!(matches!(diagram.cell(1), Some(Cell::Region(_))));
        diagram.validate()
    }

    #[test]
    fn test_f32_sites() -> Result<(), VoronoiError> {
        let sites = [
            Point2::new(0.0f32, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(0.0, 4.0),
        ];
        let diagram = VoronoiDiagram::new(&sites)?;
        assert_eq!(diagram.num_vertices(), 1);
        diagram.validate()
    }

    #[allow(unused)]
    #[cfg(feature = "serde")]
    fn check_serde() {
        use serde::{Deserialize, Serialize};

        fn requires_serde<'de, T: Serialize + Deserialize<'de>>() {}

        requires_serde::<VoronoiDiagram<Point2<f64>>>();
        requires_serde::<VoronoiOptions>();
    }
}
