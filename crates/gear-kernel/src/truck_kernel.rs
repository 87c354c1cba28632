//! TruckKernel: real geometry kernel wrapping truck's API.
//!
//! Sketch curves are kept as planar geometry until a profile consumes them.
//! Splines become chord polylines through their fit points; truck has no
//! interpolating spline builder that shares vertices with neighbouring edges.
//!
//! Revolving several overlapping profiles merges their planar regions with
//! geo before the sweep, so truck only ever sweeps one face per region.

use crate::traits::Kernel;
use crate::types::*;
use geo::{BooleanOps, LineString, MultiPolygon, Polygon};
use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use tracing::debug;

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Face, Solid, Vertex, Wire};
use truck_modeling::{InnerSpace, Point3, Rad, Vector3};

/// Boolean tolerance handed to truck-shapeops.
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Endpoints closer than this are merged into one vertex.
const JOIN_TOLERANCE: f64 = 1e-7;

/// Merged outline points closer than this to the revolve axis are put on it.
const AXIS_SNAP: f64 = 1e-6;

/// Chords per arc when an outline is flattened for region merging.
const ARC_SEGMENTS: usize = 24;

#[derive(Debug, Clone)]
enum SketchCurve {
    Polyline(Vec<Point2>),
    Arc { start: Point2, mid: Point2, end: Point2 },
    Line { start: Point2, end: Point2 },
    Circle { center: Point2, radius: f64 },
}

/// One wire piece between two vertices.
#[derive(Debug, Clone, Copy)]
enum Segment {
    Line,
    Arc(Point2),
}

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_id: u64,
    curves: HashMap<u64, (SketchCurve, bool)>,
    profiles: HashMap<u64, Face>,
    /// Flattened loops of each profile, outer first.
    outlines: HashMap<u64, Vec<Vec<Point2>>>,
    solids: HashMap<u64, Solid>,
    timeline: Vec<Vec<u64>>,
    groups: Vec<(TimelineIndex, TimelineIndex)>,
    tangencies: Vec<(CurveId, CurveId)>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            curves: HashMap::new(),
            profiles: HashMap::new(),
            outlines: HashMap::new(),
            solids: HashMap::new(),
            timeline: Vec::new(),
            groups: Vec::new(),
            tangencies: Vec::new(),
        }
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn store_curve(&mut self, curve: SketchCurve, construction: bool) -> CurveId {
        let id = self.alloc_id();
        self.curves.insert(id, (curve, construction));
        CurveId(id)
    }

    fn store_solid(&mut self, solid: Solid) -> BodyHandle {
        let handle = BodyHandle(self.alloc_id());
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn push_timeline(&mut self, bodies: Vec<u64>) -> TimelineIndex {
        self.timeline.push(bodies);
        TimelineIndex(self.timeline.len() - 1)
    }

    /// The solid behind a handle.
    pub fn solid(&self, handle: &BodyHandle) -> Option<&Solid> {
        self.solids.get(&handle.id())
    }

    pub fn groups(&self) -> &[(TimelineIndex, TimelineIndex)] {
        &self.groups
    }

    pub fn tangencies(&self) -> &[(CurveId, CurveId)] {
        &self.tangencies
    }

    fn curve(&self, curve: CurveId) -> Result<&(SketchCurve, bool), KernelError> {
        self.curves
            .get(&curve.0)
            .ok_or(KernelError::curve_not_found(curve))
    }

    fn cloned_solid(&self, handle: &BodyHandle) -> Result<Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .cloned()
            .ok_or(KernelError::body_not_found(handle))
    }

    /// Flatten a loop into junction points and the segments leaving them.
    fn loop_segments(&self, lp: &ProfileLoop) -> Result<Vec<(Point2, Segment)>, KernelError> {
        let mut pieces = Vec::new();
        for edge in &lp.edges {
            let (curve, construction) = self.curve(edge.curve)?;
            if *construction {
                return Err(KernelError::InvalidGeometry {
                    reason: format!("construction curve {} used in a profile", edge.curve.0),
                });
            }
            let mut local: Vec<(Point2, Segment)> = Vec::new();
            match curve {
                SketchCurve::Circle { center, radius } => {
                    if lp.edges.len() != 1 {
                        return Err(KernelError::OpenProfile {
                            reason: "a circle must form a loop on its own".to_string(),
                        });
                    }
                    let east = Point2::new(center.x + radius, center.y);
                    let west = Point2::new(center.x - radius, center.y);
                    local.push((east, Segment::Arc(Point2::new(center.x, center.y + radius))));
                    local.push((west, Segment::Arc(Point2::new(center.x, center.y - radius))));
                }
                SketchCurve::Line { start, end } => {
                    if edge.reversed {
                        local.push((*end, Segment::Line));
                    } else {
                        local.push((*start, Segment::Line));
                    }
                }
                SketchCurve::Arc { start, mid, end } => {
                    if edge.reversed {
                        local.push((*end, Segment::Arc(*mid)));
                    } else {
                        local.push((*start, Segment::Arc(*mid)));
                    }
                }
                SketchCurve::Polyline(points) => {
                    let mut pts = points.clone();
                    if edge.reversed {
                        pts.reverse();
                    }
                    pts.pop();
                    local.extend(pts.into_iter().map(|p| (p, Segment::Line)));
                }
            }
            pieces.extend(local);
        }
        Ok(pieces)
    }

    /// Build a closed wire, checking that consecutive edges meet. Also returns
    /// the loop flattened to a polygon, arcs sampled in chords.
    fn build_wire(&self, lp: &ProfileLoop) -> Result<(Wire, Vec<Point2>), KernelError> {
        if lp.edges.is_empty() {
            return Err(KernelError::OpenProfile {
                reason: "empty loop".to_string(),
            });
        }
        self.check_closure(lp)?;
        let pieces = self.loop_segments(lp)?;

        let vertices: Vec<Vertex> = pieces
            .iter()
            .map(|(p, _)| builder::vertex(Point3::new(p.x, p.y, 0.0)))
            .collect();
        let n = pieces.len();
        let mut edges: Vec<Edge> = Vec::with_capacity(n);
        let mut outline = Vec::with_capacity(n);
        for i in 0..n {
            let j = (i + 1) % n;
            let (start, segment) = pieces[i];
            outline.push(start);
            let edge = match segment {
                Segment::Line => builder::line(&vertices[i], &vertices[j]),
                Segment::Arc(mid) => {
                    outline.extend(arc_chords(start, mid, pieces[j].0, ARC_SEGMENTS));
                    builder::circle_arc(&vertices[i], &vertices[j], Point3::new(mid.x, mid.y, 0.0))
                }
            };
            edges.push(edge);
        }
        Ok((Wire::from_iter(edges), outline))
    }

    fn check_closure(&self, lp: &ProfileLoop) -> Result<(), KernelError> {
        let mut ends = Vec::with_capacity(lp.edges.len());
        for edge in &lp.edges {
            let (curve, _) = self.curve(edge.curve)?;
            let (start, end) = match curve {
                SketchCurve::Circle { .. } => return Ok(()),
                SketchCurve::Line { start, end } => (*start, *end),
                SketchCurve::Arc { start, end, .. } => (*start, *end),
                SketchCurve::Polyline(points) => match (points.first(), points.last()) {
                    (Some(s), Some(e)) => (*s, *e),
                    _ => {
                        return Err(KernelError::InvalidGeometry {
                            reason: "empty polyline".to_string(),
                        })
                    }
                },
            };
            ends.push(if edge.reversed { (end, start) } else { (start, end) });
        }
        for i in 0..ends.len() {
            let next = ends[(i + 1) % ends.len()].0;
            if ends[i].1.distance_to(&next) > JOIN_TOLERANCE {
                return Err(KernelError::OpenProfile {
                    reason: format!("edge {} does not meet edge {}", i, (i + 1) % ends.len()),
                });
            }
        }
        Ok(())
    }

    /// Union the planar regions of several profiles into one face per
    /// connected region. Points near the axis are snapped onto it.
    fn merged_faces(
        &self,
        profiles: &[ProfileId],
        origin: Point3,
        direction: Vector3,
    ) -> Result<Vec<Face>, KernelError> {
        let mut merged = MultiPolygon::<f64>(Vec::new());
        for profile in profiles {
            let loops = self
                .outlines
                .get(&profile.0)
                .ok_or(KernelError::profile_not_found(*profile))?;
            merged = merged.union(&MultiPolygon(vec![to_polygon(loops)]));
        }

        let axis_origin = Point2::new(origin.x, origin.y);
        let axis_dir = Point2::new(direction.x, direction.y);
        merged
            .0
            .iter()
            .map(|polygon| {
                let mut wires = Vec::with_capacity(1 + polygon.interiors().len());
                for (i, ring) in std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .enumerate()
                {
                    let points = ring_points(ring, axis_origin, axis_dir);
                    if points.len() < 3 {
                        return Err(KernelError::InvalidGeometry {
                            reason: "merged region collapsed to fewer than 3 points".to_string(),
                        });
                    }
                    let wire = polyline_wire(&points);
                    let ccw = signed_area(&points) > 0.0;
                    // Outer boundary counter-clockwise, holes clockwise.
                    wires.push(if ccw == (i == 0) { wire } else { wire.inverse() });
                }
                builder::try_attach_plane(wires.as_slice()).map_err(|e| {
                    KernelError::InvalidGeometry {
                        reason: format!("failed to create merged face: {}", e),
                    }
                })
            })
            .collect()
    }

    /// Combine a freshly built solid with the participants, or store it.
    fn apply_feature(
        &mut self,
        solid: Solid,
        operation: FeatureOperation,
        participants: &[BodyHandle],
    ) -> Result<FeatureOutput, KernelError> {
        if !operation.needs_participants() {
            let body = self.store_solid(solid);
            let timeline = self.push_timeline(vec![body.id()]);
            return Ok(FeatureOutput { body, timeline });
        }

        let first = participants
            .first()
            .ok_or_else(|| KernelError::InvalidGeometry {
                reason: format!("{:?} requires at least one participant body", operation),
            })?
            .clone();
        for participant in participants {
            let target = self.cloned_solid(participant)?;
            let result = match operation {
                FeatureOperation::Join => truck_shapeops::or(&target, &solid, BOOLEAN_TOLERANCE),
                FeatureOperation::Cut => {
                    let mut tool = solid.clone();
                    tool.not();
                    truck_shapeops::and(&target, &tool, BOOLEAN_TOLERANCE)
                }
                FeatureOperation::Intersect => {
                    truck_shapeops::and(&target, &solid, BOOLEAN_TOLERANCE)
                }
                FeatureOperation::NewBody => None,
            }
            .ok_or_else(|| KernelError::BooleanFailed {
                reason: format!("truck returned None for {:?}", operation),
            })?;
            self.solids.insert(participant.id(), result);
        }
        let timeline = self.push_timeline(participants.iter().map(|p| p.id()).collect());
        Ok(FeatureOutput {
            body: first,
            timeline,
        })
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn make_spline(&mut self, points: &[Point2]) -> Result<CurveId, KernelError> {
        if points.len() < 2 {
            return Err(KernelError::InvalidGeometry {
                reason: format!("spline needs at least 2 points, got {}", points.len()),
            });
        }
        Ok(self.store_curve(SketchCurve::Polyline(points.to_vec()), false))
    }

    fn make_arc_three_point(
        &mut self,
        start: Point2,
        mid: Point2,
        end: Point2,
    ) -> Result<CurveId, KernelError> {
        Ok(self.store_curve(SketchCurve::Arc { start, mid, end }, false))
    }

    fn make_arc_center_sweep(
        &mut self,
        center: Point2,
        start: Point2,
        sweep: f64,
    ) -> Result<CurveId, KernelError> {
        if sweep.abs() >= 2.0 * PI {
            return Err(KernelError::InvalidGeometry {
                reason: "arc sweep must be less than a full turn".to_string(),
            });
        }
        let mid = start.rotated_about(&center, 0.5 * sweep);
        let end = start.rotated_about(&center, sweep);
        Ok(self.store_curve(SketchCurve::Arc { start, mid, end }, false))
    }

    fn make_line(&mut self, start: Point2, end: Point2) -> Result<CurveId, KernelError> {
        if start.distance_to(&end) < JOIN_TOLERANCE {
            return Err(KernelError::InvalidGeometry {
                reason: "zero-length line".to_string(),
            });
        }
        Ok(self.store_curve(SketchCurve::Line { start, end }, false))
    }

    fn make_circle(
        &mut self,
        center: Point2,
        radius: f64,
        construction: bool,
    ) -> Result<CurveId, KernelError> {
        if radius <= 0.0 {
            return Err(KernelError::InvalidGeometry {
                reason: format!("circle radius must be positive, got {}", radius),
            });
        }
        Ok(self.store_curve(SketchCurve::Circle { center, radius }, construction))
    }

    fn constrain_tangent(&mut self, curve: CurveId, line: CurveId) -> Result<(), KernelError> {
        // Geometry is already placed tangent; truck has no solver to hold it.
        self.curve(curve)?;
        if !matches!(self.curve(line)?, (SketchCurve::Line { .. }, _)) {
            return Err(KernelError::InvalidGeometry {
                reason: format!("curve {} is not a line", line.0),
            });
        }
        self.tangencies.push((curve, line));
        Ok(())
    }

    fn make_profile(&mut self, loops: &[ProfileLoop]) -> Result<ProfileId, KernelError> {
        let (outer, holes) = loops.split_first().ok_or_else(|| KernelError::OpenProfile {
            reason: "profile has no loops".to_string(),
        })?;

        let (mut outer_wire, outer_outline) = self.build_wire(outer)?;
        if signed_area(&outer_outline) < 0.0 {
            outer_wire = outer_wire.inverse();
        }
        let mut wires = vec![outer_wire];
        let mut outlines = vec![outer_outline];
        for hole in holes {
            let (wire, outline) = self.build_wire(hole)?;
            wires.push(if signed_area(&outline) > 0.0 { wire.inverse() } else { wire });
            outlines.push(outline);
        }

        let face: Face = builder::try_attach_plane(wires.as_slice()).map_err(|e| {
            KernelError::InvalidGeometry {
                reason: format!("failed to create planar face: {}", e),
            }
        })?;
        let id = self.alloc_id();
        self.profiles.insert(id, face);
        self.outlines.insert(id, outlines);
        debug!(profile = id, loops = loops.len(), "truck profile built");
        Ok(ProfileId(id))
    }

    fn revolve(
        &mut self,
        profiles: &[ProfileId],
        axis: CurveId,
        angle: f64,
        operation: FeatureOperation,
        participants: &[BodyHandle],
    ) -> Result<FeatureOutput, KernelError> {
        let (origin, direction) = match self.curve(axis)? {
            (SketchCurve::Line { start, end }, _) => (
                Point3::new(start.x, start.y, 0.0),
                Vector3::new(end.x - start.x, end.y - start.y, 0.0).normalize(),
            ),
            _ => {
                return Err(KernelError::InvalidGeometry {
                    reason: format!("revolve axis {} is not a line", axis.0),
                })
            }
        };

        let faces = match profiles {
            [] => {
                return Err(KernelError::InvalidGeometry {
                    reason: "revolve without profiles".to_string(),
                })
            }
            [single] => vec![self
                .profiles
                .get(&single.0)
                .cloned()
                .ok_or(KernelError::profile_not_found(*single))?],
            _ => self.merged_faces(profiles, origin, direction)?,
        };

        let mut combined: Option<Solid> = None;
        for face in &faces {
            let solid: Solid = builder::rsweep(face, origin, direction, Rad(angle));
            combined = Some(match combined {
                None => solid,
                Some(acc) => truck_shapeops::or(&acc, &solid, BOOLEAN_TOLERANCE).ok_or_else(
                    || KernelError::BooleanFailed {
                        reason: "truck or() returned None while merging disjoint regions"
                            .to_string(),
                    },
                )?,
            });
        }
        let solid = combined.ok_or_else(|| KernelError::InvalidGeometry {
            reason: "profiles merged to an empty region".to_string(),
        })?;
        debug!(
            profiles = profiles.len(),
            regions = faces.len(),
            "truck revolve swept"
        );
        self.apply_feature(solid, operation, participants)
    }

    fn extrude(
        &mut self,
        profile: ProfileId,
        distance: f64,
        symmetric: bool,
        operation: FeatureOperation,
        participants: &[BodyHandle],
    ) -> Result<FeatureOutput, KernelError> {
        if distance <= 0.0 {
            return Err(KernelError::InvalidGeometry {
                reason: format!("extrude distance must be positive, got {}", distance),
            });
        }
        let face = self
            .profiles
            .get(&profile.0)
            .ok_or(KernelError::profile_not_found(profile))?;
        let base = if symmetric {
            builder::translated(face, Vector3::new(0.0, 0.0, -0.5 * distance))
        } else {
            face.clone()
        };
        let solid: Solid = builder::tsweep(&base, Vector3::new(0.0, 0.0, distance));
        self.apply_feature(solid, operation, participants)
    }

    fn rotate_body(
        &mut self,
        body: &BodyHandle,
        angle: f64,
        axis: [f64; 3],
        origin: [f64; 3],
    ) -> Result<TimelineIndex, KernelError> {
        let axis = Vector3::new(axis[0], axis[1], axis[2]);
        if axis.magnitude() < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "rotation axis has zero length".to_string(),
            });
        }
        let solid = self
            .solids
            .get(&body.id())
            .ok_or(KernelError::body_not_found(body))?;
        let rotated = builder::rotated(
            solid,
            Point3::new(origin[0], origin[1], origin[2]),
            axis.normalize(),
            Rad(angle),
        );
        self.solids.insert(body.id(), rotated);
        Ok(self.push_timeline(vec![body.id()]))
    }

    fn boolean_cut(
        &mut self,
        target: &BodyHandle,
        tools: &[BodyHandle],
        keep_tools: bool,
    ) -> Result<TimelineIndex, KernelError> {
        let mut result = self.cloned_solid(target)?;
        for tool in tools {
            // Subtraction = A ∩ ¬B. not() mutates in place.
            let mut negated = self.cloned_solid(tool)?;
            negated.not();
            result = truck_shapeops::and(&result, &negated, BOOLEAN_TOLERANCE).ok_or_else(|| {
                KernelError::BooleanFailed {
                    reason: "truck and() returned None for subtraction".to_string(),
                }
            })?;
        }
        self.solids.insert(target.id(), result);
        if !keep_tools {
            for tool in tools {
                self.solids.remove(&tool.id());
            }
        }
        let mut touched = vec![target.id()];
        touched.extend(tools.iter().map(|t| t.id()));
        Ok(self.push_timeline(touched))
    }

    fn group_timeline(
        &mut self,
        first: TimelineIndex,
        last: TimelineIndex,
    ) -> Result<GroupId, KernelError> {
        if first > last || last.0 >= self.timeline.len() {
            return Err(KernelError::GroupingFailed {
                reason: format!(
                    "invalid range {}..={} on a timeline of {}",
                    first.0,
                    last.0,
                    self.timeline.len()
                ),
            });
        }
        self.groups.push((first, last));
        Ok(GroupId(self.alloc_id()))
    }
}

/// Interior points of the circular arc through `start`, `mid` and `end`,
/// `segments - 1` of them, in travel order. Collinear input yields none.
fn arc_chords(start: Point2, mid: Point2, end: Point2, segments: usize) -> Vec<Point2> {
    let (ax, ay, bx, by, cx, cy) = (start.x, start.y, mid.x, mid.y, end.x, end.y);
    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-12 {
        return Vec::new();
    }
    let (a2, b2, c2) = (ax * ax + ay * ay, bx * bx + by * by, cx * cx + cy * cy);
    let center = Point2::new(
        (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d,
        (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d,
    );
    let polar = |p: Point2| (p.y - center.y).atan2(p.x - center.x);
    let a0 = polar(start);
    let mut sweep = (polar(end) - a0).rem_euclid(TAU);
    if (polar(mid) - a0).rem_euclid(TAU) > sweep {
        sweep -= TAU;
    }
    (1..segments)
        .map(|k| start.rotated_about(&center, sweep * k as f64 / segments as f64))
        .collect()
}

fn to_polygon(loops: &[Vec<Point2>]) -> Polygon<f64> {
    let ring = |pts: &Vec<Point2>| LineString::from(pts.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>());
    let (outer, holes) = match loops.split_first() {
        Some((outer, holes)) => (ring(outer), holes.iter().map(ring).collect()),
        None => (LineString::new(Vec::new()), Vec::new()),
    };
    Polygon::new(outer, holes)
}

/// Open ring of distinct points, with near-axis points projected onto the axis.
fn ring_points(ring: &LineString<f64>, axis_origin: Point2, axis_dir: Point2) -> Vec<Point2> {
    let mut points: Vec<Point2> = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        let p = Point2::new(c.x, c.y);
        let t = (p.x - axis_origin.x) * axis_dir.x + (p.y - axis_origin.y) * axis_dir.y;
        let foot = Point2::new(axis_origin.x + t * axis_dir.x, axis_origin.y + t * axis_dir.y);
        let p = if p.distance_to(&foot) < AXIS_SNAP { foot } else { p };
        if points.last().map_or(true, |last| last.distance_to(&p) > JOIN_TOLERANCE) {
            points.push(p);
        }
    }
    while points.len() > 1 && points[0].distance_to(&points[points.len() - 1]) <= JOIN_TOLERANCE {
        points.pop();
    }
    points
}

fn polyline_wire(points: &[Point2]) -> Wire {
    let vertices: Vec<Vertex> = points
        .iter()
        .map(|p| builder::vertex(Point3::new(p.x, p.y, 0.0)))
        .collect();
    (0..vertices.len())
        .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % vertices.len()]))
        .collect()
}

/// Signed area of a closed polygon; positive when counter-clockwise.
fn signed_area(pts: &[Point2]) -> f64 {
    let n = pts.len();
    (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            pts[i].x * pts[j].y - pts[j].x * pts[i].y
        })
        .sum::<f64>()
        / 2.0
}
