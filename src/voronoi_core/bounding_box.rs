//! Clipping of unbounded Voronoi edges.
//!
//! After the sweep, some edges still miss one or both end points. They are cut off at an
//! axis aligned box enclosing all sites and Voronoi vertices. The box's boundary becomes a
//! ring of boundary edges that closes every outer cell and separates the diagram from the
//! outer face.
use hashbrown::HashMap;
use tracing::{debug, warn};

use super::dcel::Dcel;
use super::dcel_builder::DcelBuilder;
use super::dcel_operations::OUTER_FACE_HANDLE;
use super::elements::{FaceData, VertexData};
use super::handles::{FixedDirectedEdgeHandle, FixedFaceHandle, FixedVertexHandle};
use super::math::{bisector_direction, clip_line};
use super::VoronoiError;
use crate::{Point2, VoronoiOptions};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const ATTACH: &str = "bounding box attachment";

/// The four sides of a [BoundingBox], in counterclockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub enum BoxSide {
    Bottom = 0,
    Right = 1,
    Top = 2,
    Left = 3,
}

impl BoxSide {
    pub const ALL: [BoxSide; 4] = [BoxSide::Bottom, BoxSide::Right, BoxSide::Top, BoxSide::Left];
}

/// The box that clips the unbounded parts of a Voronoi diagram.
///
/// Every side stores the boundary half edges lying on it. These half edges belong to the
/// cells touching the box and are ordered counterclockwise. Their twins form the boundary of
/// the outer face.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct BoundingBox {
    min: Point2<f64>,
    max: Point2<f64>,
    sides: [Vec<FixedDirectedEdgeHandle>; 4],
}

impl BoundingBox {
    /// Returns the lower left corner.
    pub fn min(&self) -> Point2<f64> {
        self.min
    }

    /// Returns the upper right corner.
    pub fn max(&self) -> Point2<f64> {
        self.max
    }

    /// Returns the four corners in counterclockwise order, starting with the lower left
    /// corner.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        Extent::new(self.min, self.max).corners()
    }

    /// Returns the boundary half edges of a side, ordered counterclockwise.
    pub fn side(&self, side: BoxSide) -> &[FixedDirectedEdgeHandle] {
        &self.sides[side as usize]
    }

    /// Returns all boundary half edges, side by side.
    pub fn edges(&self) -> impl Iterator<Item = FixedDirectedEdgeHandle> + '_ {
        self.sides.iter().flatten().copied()
    }

    pub fn num_edges(&self) -> usize {
        self.sides.iter().map(Vec::len).sum()
    }

    /// Collects the boundary half edges of a finished edge list.
    pub(crate) fn from_dcel(
        dcel: &Dcel<VertexData, FaceData>,
        min: Point2<f64>,
        max: Point2<f64>,
    ) -> Self {
        let extent = Extent::new(min, max);
        let mut sides: [Vec<(f64, FixedDirectedEdgeHandle)>; 4] = Default::default();
        for edge in dcel.directed_edges() {
            if edge.face().is_outer() || !edge.rev().face().is_outer() {
                continue;
            }
            let [from, to] = edge.positions();
            let side = extent.side_of(from.midpoint(to));
            sides[side as usize].push((extent.perimeter_position(from), edge.fix()));
        }

        let sides = sides.map(|mut side| {
            side.sort_by(|(a, _), (b, _)| a.total_cmp(b));
            side.into_iter().map(|(_, edge)| edge).collect()
        });
        Self { min, max, sides }
    }
}

/// An axis aligned rectangle with its boundary parametrized counterclockwise, starting at
/// the lower left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Extent {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Extent {
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Returns the smallest extent containing all points, enlarged by `margin`.
    ///
    /// A square extent is centered at the origin.
    pub fn enclosing(
        points: impl IntoIterator<Item = Point2<f64>>,
        margin: f64,
        square: bool,
    ) -> Self {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for point in points {
            min = Point2::new(min.x.min(point.x), min.y.min(point.y));
            max = Point2::new(max.x.max(point.x), max.y.max(point.y));
        }
        if min.x > max.x {
            min = Point2::new(0.0, 0.0);
            max = min;
        }

        if square {
            let half = [min.x, min.y, max.x, max.y]
                .iter()
                .fold(0.0f64, |acc, value| acc.max(value.abs()))
                + margin;
            Self::new(Point2::new(-half, -half), Point2::new(half, half))
        } else {
            Self::new(
                Point2::new(min.x - margin, min.y - margin),
                Point2::new(max.x + margin, max.y + margin),
            )
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    pub fn contains_strictly(&self, point: Point2<f64>, tolerance: f64) -> bool {
        point.x > self.min.x + tolerance
            && point.x < self.max.x - tolerance
            && point.y > self.min.y + tolerance
            && point.y < self.max.y - tolerance
    }

    /// Returns the side closest to a point.
    pub fn side_of(&self, point: Point2<f64>) -> BoxSide {
        let distances = [
            (point.y - self.min.y).abs(),
            (point.x - self.max.x).abs(),
            (point.y - self.max.y).abs(),
            (point.x - self.min.x).abs(),
        ];
        let mut closest = 0;
        for (index, distance) in distances.iter().enumerate() {
            if *distance < distances[closest] {
                closest = index;
            }
        }
        BoxSide::ALL[closest]
    }

    /// Returns the counterclockwise distance from the lower left corner to a point on the
    /// boundary.
    pub fn perimeter_position(&self, point: Point2<f64>) -> f64 {
        let (w, h) = (self.width(), self.height());
        match self.side_of(point) {
            BoxSide::Bottom => point.x - self.min.x,
            BoxSide::Right => w + (point.y - self.min.y),
            BoxSide::Top => w + h + (self.max.x - point.x),
            BoxSide::Left => 2.0 * w + h + (self.max.y - point.y),
        }
    }

    /// Moves a point lying close to the boundary onto the boundary.
    fn snap(&self, point: Point2<f64>) -> Point2<f64> {
        let clamped = Point2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        );
        match self.side_of(clamped) {
            BoxSide::Bottom => Point2::new(clamped.x, self.min.y),
            BoxSide::Right => Point2::new(self.max.x, clamped.y),
            BoxSide::Top => Point2::new(clamped.x, self.max.y),
            BoxSide::Left => Point2::new(self.min.x, clamped.y),
        }
    }
}

/// An edge that still misses at least one end point.
#[derive(Clone, Copy, Debug)]
enum OpenEdge {
    /// Both end points are missing. `edge` runs along `direction` through `anchor`.
    Line {
        edge: FixedDirectedEdgeHandle,
        anchor: Point2<f64>,
        direction: Point2<f64>,
    },
    /// `inward` misses its origin. Its twin starts at `start` and leads along `direction`.
    Ray {
        inward: FixedDirectedEdgeHandle,
        start: Point2<f64>,
        direction: Point2<f64>,
    },
}

/// Reasons for rejecting a box. All of them can be fixed by a larger box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttachFailure {
    OriginOutside,
    MissedBox,
    CoincidentHits,
    FaceMismatch,
}

#[derive(Clone, Copy, Debug)]
enum StopKind {
    Corner,
    /// An open edge leaves the box. `arriving` ends and `leaving` starts at the stop.
    Hit {
        arriving: FixedDirectedEdgeHandle,
        leaving: FixedDirectedEdgeHandle,
    },
}

/// A vertex on the box boundary.
#[derive(Clone, Copy, Debug)]
struct Stop {
    position: Point2<f64>,
    parameter: f64,
    kind: StopKind,
}

/// The boundary ring of an accepted box. `faces[i]` is the face of the boundary edge
/// leading from `stops[i]` to the next stop.
#[derive(Debug)]
struct Plan {
    stops: Vec<Stop>,
    faces: Vec<FixedFaceHandle>,
}

/// Closes all open edges by attaching them to a bounding box.
///
/// The box is enlarged until all open edges can be attached or the configured number of
/// attempts is exhausted. Returns the used box and the number of attempts.
pub(crate) fn attach_to_bounding_box(
    builder: &mut DcelBuilder<VertexData, FaceData>,
    sites: &[Point2<f64>],
    dangling: &[FixedDirectedEdgeHandle],
    options: &VoronoiOptions,
    tolerance: f64,
) -> Result<(Extent, usize), VoronoiError> {
    if dangling.is_empty() && builder.num_faces() != 2 {
        return Err(VoronoiError::invariant(
            ATTACH,
            format!(
                "{} cells without unbounded edges between them",
                builder.num_faces() - 1
            ),
        ));
    }

    let open_edges = dangling
        .iter()
        .map(|edge| classify(builder, sites, *edge))
        .collect::<Result<Vec<_>, _>>()?;
    let points: Vec<_> = sites
        .iter()
        .copied()
        .chain(builder.vertex_data_iter().map(|vertex| vertex.position))
        .collect();

    let attempts = options.max_box_attempts.max(1);
    let mut margin = options.box_margin;
    for attempt in 1..=attempts {
        let extent = Extent::enclosing(points.iter().copied(), margin, options.square_box);
        match plan(builder, &open_edges, extent, tolerance) {
            Ok(plan) => {
                apply(builder, &plan);
                debug!(
                    attempt,
                    margin,
                    boundary_edges = plan.stops.len(),
                    "attached open edges to bounding box"
                );
                return Ok((extent, attempt));
            }
            Err(failure) => {
                warn!(attempt, margin, ?failure, "bounding box rejected, enlarging it");
                margin = if margin > 0.0 { margin * 2.0 } else { 1.0 };
            }
        }
    }
    Err(VoronoiError::BoundingBoxAttachment { attempts })
}

fn classify(
    builder: &DcelBuilder<VertexData, FaceData>,
    sites: &[Point2<f64>],
    edge: FixedDirectedEdgeHandle,
) -> Result<OpenEdge, VoronoiError> {
    let site_of = |edge: FixedDirectedEdgeHandle| {
        builder
            .face_data(builder.face(edge))
            .site
            .map(|site| sites[site])
            .ok_or_else(|| {
                VoronoiError::invariant(
                    ATTACH,
                    format!("open half edge {} lies in the outer face", edge.index()),
                )
            })
    };
    let direction_of = |edge: FixedDirectedEdgeHandle| -> Result<Point2<f64>, VoronoiError> {
        Ok(bisector_direction(site_of(edge)?, site_of(edge.rev())?))
    };

    let twin = edge.rev();
    match (builder.origin(edge), builder.origin(twin)) {
        (None, None) => Ok(OpenEdge::Line {
            edge,
            anchor: site_of(edge)?.midpoint(site_of(twin)?),
            direction: direction_of(edge)?,
        }),
        (None, Some(origin)) => Ok(OpenEdge::Ray {
            inward: edge,
            start: builder.vertex_data(origin).position,
            direction: direction_of(twin)?,
        }),
        (Some(origin), None) => Ok(OpenEdge::Ray {
            inward: twin,
            start: builder.vertex_data(origin).position,
            direction: direction_of(edge)?,
        }),
        (Some(_), Some(_)) => Err(VoronoiError::invariant(
            ATTACH,
            format!("half edge {} is open but has both end points", edge.index()),
        )),
    }
}

fn plan(
    builder: &DcelBuilder<VertexData, FaceData>,
    open_edges: &[OpenEdge],
    extent: Extent,
    tolerance: f64,
) -> Result<Plan, AttachFailure> {
    let hit = |position: Point2<f64>, arriving, leaving| {
        let position = extent.snap(position);
        Stop {
            position,
            parameter: extent.perimeter_position(position),
            kind: StopKind::Hit { arriving, leaving },
        }
    };

    let mut stops = Vec::with_capacity(open_edges.len() * 2 + 4);
    for open_edge in open_edges {
        match *open_edge {
            OpenEdge::Line {
                edge,
                anchor,
                direction,
            } => {
                let (behind, ahead) = clip_line(anchor, direction, extent.min, extent.max)
                    .ok_or(AttachFailure::MissedBox)?;
                let length = direction.length2().sqrt();
                if (ahead - behind) * length <= tolerance {
                    return Err(AttachFailure::CoincidentHits);
                }
                stops.push(hit(anchor.add(direction.mul(ahead)), edge, edge.rev()));
                stops.push(hit(anchor.add(direction.mul(behind)), edge.rev(), edge));
            }
            OpenEdge::Ray {
                inward,
                start,
                direction,
            } => {
                if !extent.contains_strictly(start, tolerance) {
                    return Err(AttachFailure::OriginOutside);
                }
                let (_, ahead) = clip_line(start, direction, extent.min, extent.max)
                    .ok_or(AttachFailure::MissedBox)?;
                if ahead <= 0.0 {
                    return Err(AttachFailure::MissedBox);
                }
                stops.push(hit(start.add(direction.mul(ahead)), inward.rev(), inward));
            }
        }
    }
    stops.sort_by(|a, b| a.parameter.total_cmp(&b.parameter));

    let perimeter = extent.perimeter();
    let circular_distance = |a: f64, b: f64| {
        let distance = (a - b).abs();
        distance.min(perimeter - distance)
    };
    if stops.len() >= 2 {
        for (index, stop) in stops.iter().enumerate() {
            let next = &stops[(index + 1) % stops.len()];
            if circular_distance(stop.parameter, next.parameter) <= tolerance {
                return Err(AttachFailure::CoincidentHits);
            }
        }
    }
    order_hits_by_faces(builder, &mut stops, perimeter)?;

    let num_hits = stops.len();
    let (w, h) = (extent.width(), extent.height());
    for (corner, parameter) in extent.corners().into_iter().zip([0.0, w, w + h, 2.0 * w + h]) {
        let covered = stops[..num_hits]
            .iter()
            .any(|stop| circular_distance(stop.parameter, parameter) <= tolerance);
        if !covered {
            stops.push(Stop {
                position: corner,
                parameter,
                kind: StopKind::Corner,
            });
        }
    }
    stops.sort_by(|a, b| a.parameter.total_cmp(&b.parameter));

    let first_hit = stops
        .iter()
        .position(|stop| matches!(stop.kind, StopKind::Hit { .. }));
    let mut faces = Vec::with_capacity(stops.len());
    match first_hit {
        Some(first_hit) => {
            stops.rotate_left(first_hit);
            let mut face = OUTER_FACE_HANDLE;
            for stop in &stops {
                if let StopKind::Hit { arriving, .. } = stop.kind {
                    face = builder.face(arriving);
                }
                faces.push(face);
            }
            for (index, stop) in stops.iter().enumerate() {
                if let StopKind::Hit { leaving, .. } = stop.kind {
                    let previous = faces[(index + stops.len() - 1) % stops.len()];
                    if previous != builder.face(leaving) {
                        return Err(AttachFailure::FaceMismatch);
                    }
                }
            }
        }
        None => faces.resize(stops.len(), FixedFaceHandle::new(1)),
    }
    Ok(Plan { stops, faces })
}

/// Makes the counterclockwise order of the sorted hits agree with the cells they separate.
///
/// The boundary edge following a hit belongs to the face of its arriving edge, so the next hit
/// must leave into that face. Nearly parallel rays starting at a far away vertex can cross
/// inside the box due to rounding, which swaps their hits. The sorted hit positions are kept
/// and the open edges are redistributed over them in face order. The rotation is chosen to
/// move the hits as little as possible.
fn order_hits_by_faces(
    builder: &DcelBuilder<VertexData, FaceData>,
    hits: &mut [Stop],
    perimeter: f64,
) -> Result<(), AttachFailure> {
    let count = hits.len();
    if count < 2 {
        return Ok(());
    }
    let faces = hits
        .iter()
        .map(|stop| match stop.kind {
            StopKind::Hit { arriving, leaving } => {
                Some((builder.face(arriving), builder.face(leaving)))
            }
            StopKind::Corner => None,
        })
        .collect::<Option<Vec<_>>>()
        .ok_or(AttachFailure::FaceMismatch)?;

    let mut by_leaving_face = HashMap::with_capacity(count);
    for (index, (_, leaving)) in faces.iter().enumerate() {
        if by_leaving_face.insert(*leaving, index).is_some() {
            return Err(AttachFailure::FaceMismatch);
        }
    }

    let mut cycle = Vec::with_capacity(count);
    let mut current = 0;
    for step in 0..count {
        if step > 0 && current == 0 {
            return Err(AttachFailure::FaceMismatch);
        }
        cycle.push(current);
        let (arriving, _) = faces[current];
        current = *by_leaving_face.get(&arriving).ok_or(AttachFailure::FaceMismatch)?;
    }
    if current != 0 {
        return Err(AttachFailure::FaceMismatch);
    }
    if cycle.iter().enumerate().all(|(step, index)| step == *index) {
        return Ok(());
    }

    // Local swaps leave most hits at their rotated slot. Ties are broken by the displacement.
    let mut votes = vec![0usize; count];
    for (step, index) in cycle.iter().enumerate() {
        votes[(index + count - step) % count] += 1;
    }
    let max_votes = votes.iter().copied().max().unwrap_or(0);
    let displacement = |rotation: usize| {
        cycle
            .iter()
            .enumerate()
            .map(|(step, index)| {
                let distance =
                    (hits[*index].parameter - hits[(step + rotation) % count].parameter).abs();
                distance.min(perimeter - distance)
            })
            .sum::<f64>()
    };
    let rotation = (0..count)
        .filter(|rotation| votes[*rotation] == max_votes)
        .map(|rotation| (rotation, displacement(rotation)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(rotation, _)| rotation);

    let kinds: Vec<_> = cycle.iter().map(|index| hits[*index].kind).collect();
    for (step, kind) in kinds.into_iter().enumerate() {
        hits[(step + rotation) % count].kind = kind;
    }
    debug!(hits = count, rotation, "reordered boundary hits to follow the cells");
    Ok(())
}

fn apply(builder: &mut DcelBuilder<VertexData, FaceData>, plan: &Plan) {
    let count = plan.stops.len();
    let vertices: Vec<FixedVertexHandle> = plan
        .stops
        .iter()
        .map(|stop| builder.add_vertex(VertexData::boundary(stop.position)))
        .collect();
    let inner: Vec<_> = plan
        .faces
        .iter()
        .map(|face| builder.add_edge(*face, OUTER_FACE_HANDLE))
        .collect();

    for (index, stop) in plan.stops.iter().enumerate() {
        let next = (index + 1) % count;
        let prev = (index + count - 1) % count;
        builder.set_origin(inner[index], vertices[index]);
        builder.set_origin(inner[index].rev(), vertices[next]);
        builder.connect(inner[index].rev(), inner[prev].rev());
        match stop.kind {
            StopKind::Corner => builder.connect(inner[prev], inner[index]),
            StopKind::Hit { arriving, leaving } => {
                builder.set_origin(leaving, vertices[index]);
                builder.connect(inner[prev], leaving);
                builder.connect(arriving, inner[index]);
            }
        }
    }
}
