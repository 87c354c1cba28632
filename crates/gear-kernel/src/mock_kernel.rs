//! MockKernel: deterministic test double implementing Kernel.
//!
//! Records every call, checks that profile loops close, and tracks the planar
//! pose of each body so rotation sequences can be verified without a real
//! B-rep kernel. Used by gear-ops for unit and integration testing.

use crate::traits::Kernel;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Endpoints closer than this are considered joined.
const JOIN_TOLERANCE: f64 = 1e-7;

/// Geometry of a recorded sketch curve.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCurve {
    Spline { points: Vec<Point2> },
    Arc { start: Point2, mid: Point2, end: Point2 },
    Line { start: Point2, end: Point2 },
    Circle { center: Point2, radius: f64 },
}

impl MockCurve {
    /// Start and end point; `None` for closed curves.
    pub fn endpoints(&self) -> Option<(Point2, Point2)> {
        match self {
            MockCurve::Spline { points } => Some((*points.first()?, *points.last()?)),
            MockCurve::Arc { start, end, .. } => Some((*start, *end)),
            MockCurve::Line { start, end } => Some((*start, *end)),
            MockCurve::Circle { .. } => None,
        }
    }

    /// Points along the curve in traversal order, end point excluded.
    fn outline(&self) -> Vec<Point2> {
        match self {
            MockCurve::Spline { points } => points[..points.len() - 1].to_vec(),
            MockCurve::Arc { start, mid, .. } => vec![*start, *mid],
            MockCurve::Line { start, .. } => vec![*start],
            MockCurve::Circle { center, radius } => (0..16)
                .map(|i| {
                    let a = i as f64 * PI / 8.0;
                    Point2::new(center.x + radius * a.cos(), center.y + radius * a.sin())
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCurve {
    geometry: MockCurve,
    construction: bool,
}

/// A recorded profile with its loops and enclosed area.
#[derive(Debug, Clone)]
pub struct MockProfile {
    pub loops: Vec<ProfileLoop>,
    /// Outer area minus hole areas.
    pub area: f64,
}

/// Rigid planar transform `p -> R(angle)·p + translation`, accumulated from
/// rotations about axes parallel to z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPose {
    /// Net rotation in radians, not wrapped.
    pub angle: f64,
    pub translation: [f64; 2],
}

impl PlanarPose {
    pub fn identity() -> Self {
        Self {
            angle: 0.0,
            translation: [0.0, 0.0],
        }
    }

    /// Compose a further rotation by `angle` about `origin`.
    pub fn rotated_about(&self, angle: f64, origin: [f64; 2]) -> Self {
        let shifted = Point2::new(
            self.translation[0] - origin[0],
            self.translation[1] - origin[1],
        )
        .rotated(angle);
        Self {
            angle: self.angle + angle,
            translation: [shifted.x + origin[0], shifted.y + origin[1]],
        }
    }

    pub fn apply(&self, p: Point2) -> Point2 {
        let r = p.rotated(self.angle);
        Point2::new(r.x + self.translation[0], r.y + self.translation[1])
    }
}

/// How a mock body was first created.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyOrigin {
    Revolved { profiles: usize, angle: f64 },
    Extruded { distance: f64, symmetric: bool },
}

/// A synthetic body with its pose and boolean history.
#[derive(Debug, Clone)]
pub struct MockBody {
    pub origin: BodyOrigin,
    pub pose: PlanarPose,
    /// Number of cuts this body received as a target.
    pub cuts_received: usize,
    /// Number of cuts this body took part in as a tool.
    pub tool_uses: usize,
    /// Join/Cut/Intersect features applied to this body as a participant.
    pub feature_history: Vec<FeatureOperation>,
    /// Rotations about axes not parallel to z (not reflected in `pose`).
    pub off_axis_rotations: usize,
}

/// Kind of kernel call, used for timeline records and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Spline,
    Arc,
    Line,
    Circle,
    Tangent,
    Profile,
    Revolve,
    Extrude,
    Rotate,
    BooleanCut,
    Group,
}

/// One feature on the mock timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub index: TimelineIndex,
    pub kind: OpKind,
    /// Raw ids of the bodies the feature touched.
    pub bodies: Vec<u64>,
}

/// A recorded timeline group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineGroup {
    pub id: GroupId,
    pub first: TimelineIndex,
    pub last: TimelineIndex,
}

/// Deterministic test double for the modeling collaborator.
pub struct MockKernel {
    next_id: u64,
    curves: HashMap<u64, StoredCurve>,
    tangencies: Vec<(CurveId, CurveId)>,
    profiles: HashMap<u64, MockProfile>,
    bodies: HashMap<u64, MockBody>,
    timeline: Vec<TimelineEntry>,
    groups: Vec<TimelineGroup>,
    call_counts: HashMap<OpKind, usize>,
    /// (kind, zero-based call index) pairs that fail when reached.
    failures: Vec<(OpKind, usize)>,
    /// The host refuses groups that enclose other groups unless this is set.
    allow_nested_groups: bool,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            curves: HashMap::new(),
            tangencies: Vec::new(),
            profiles: HashMap::new(),
            bodies: HashMap::new(),
            timeline: Vec::new(),
            groups: Vec::new(),
            call_counts: HashMap::new(),
            failures: Vec::new(),
            allow_nested_groups: false,
        }
    }

    /// Accept groups that enclose existing groups.
    pub fn with_nested_groups(mut self) -> Self {
        self.allow_nested_groups = true;
        self
    }

    /// Make the `nth` (zero-based) call of `kind` fail.
    pub fn inject_failure(&mut self, kind: OpKind, nth: usize) {
        self.failures.push((kind, nth));
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Count the call and fail it if a failure was injected for it.
    fn record_call(&mut self, kind: OpKind) -> Result<(), KernelError> {
        let count = self.call_counts.entry(kind).or_insert(0);
        let nth = *count;
        *count += 1;
        if self.failures.contains(&(kind, nth)) {
            return Err(KernelError::Other {
                message: format!("injected failure on {:?} call {}", kind, nth),
            });
        }
        Ok(())
    }

    fn push_timeline(&mut self, kind: OpKind, bodies: Vec<u64>) -> TimelineIndex {
        let index = TimelineIndex(self.timeline.len());
        self.timeline.push(TimelineEntry {
            index,
            kind,
            bodies,
        });
        index
    }

    fn store_curve(&mut self, geometry: MockCurve, construction: bool) -> CurveId {
        let id = self.alloc_id();
        self.curves.insert(
            id,
            StoredCurve {
                geometry,
                construction,
            },
        );
        CurveId(id)
    }

    fn stored_curve(&self, curve: CurveId) -> Result<&StoredCurve, KernelError> {
        self.curves
            .get(&curve.0)
            .ok_or(KernelError::curve_not_found(curve))
    }

    fn new_body(&mut self, origin: BodyOrigin) -> BodyHandle {
        let handle = BodyHandle(self.alloc_id());
        self.bodies.insert(
            handle.id(),
            MockBody {
                origin,
                pose: PlanarPose::identity(),
                cuts_received: 0,
                tool_uses: 0,
                feature_history: Vec::new(),
                off_axis_rotations: 0,
            },
        );
        handle
    }

    /// Create a new body or apply the feature to the participants.
    fn finish_feature(
        &mut self,
        kind: OpKind,
        origin: BodyOrigin,
        operation: FeatureOperation,
        participants: &[BodyHandle],
    ) -> Result<FeatureOutput, KernelError> {
        if !operation.needs_participants() {
            let body = self.new_body(origin);
            let timeline = self.push_timeline(kind, vec![body.id()]);
            return Ok(FeatureOutput { body, timeline });
        }

        let first = participants.first().ok_or_else(|| KernelError::InvalidGeometry {
            reason: format!("{:?} requires at least one participant body", operation),
        })?;
        for p in participants {
            if !self.bodies.contains_key(&p.id()) {
                return Err(KernelError::body_not_found(p));
            }
        }
        for p in participants {
            if let Some(body) = self.bodies.get_mut(&p.id()) {
                body.feature_history.push(operation);
            }
        }
        let timeline = self.push_timeline(kind, participants.iter().map(|p| p.id()).collect());
        Ok(FeatureOutput {
            body: first.clone(),
            timeline,
        })
    }

    /// Check that the loop closes and return its signed area.
    fn loop_signed_area(&self, lp: &ProfileLoop) -> Result<f64, KernelError> {
        if lp.edges.is_empty() {
            return Err(KernelError::OpenProfile {
                reason: "empty loop".to_string(),
            });
        }

        let mut outline = Vec::new();
        let mut ends: Vec<(Point2, Point2)> = Vec::new();
        for edge in &lp.edges {
            let stored = self.stored_curve(edge.curve)?;
            if stored.construction {
                return Err(KernelError::InvalidGeometry {
                    reason: format!("construction curve {} used in a profile", edge.curve.0),
                });
            }
            match stored.geometry.endpoints() {
                None => {
                    if lp.edges.len() != 1 {
                        return Err(KernelError::OpenProfile {
                            reason: "a circle must form a loop on its own".to_string(),
                        });
                    }
                    outline.extend(stored.geometry.outline());
                }
                Some((start, end)) => {
                    let mut pts = stored.geometry.outline();
                    pts.push(end);
                    if edge.reversed {
                        pts.reverse();
                        ends.push((end, start));
                    } else {
                        ends.push((start, end));
                    }
                    pts.pop();
                    outline.extend(pts);
                }
            }
        }

        for i in 0..ends.len() {
            let (_, end) = ends[i];
            let (next_start, _) = ends[(i + 1) % ends.len()];
            if end.distance_to(&next_start) > JOIN_TOLERANCE {
                return Err(KernelError::OpenProfile {
                    reason: format!(
                        "edge {} ends at ({}, {}) but edge {} starts at ({}, {})",
                        i,
                        end.x,
                        end.y,
                        (i + 1) % ends.len(),
                        next_start.x,
                        next_start.y
                    ),
                });
            }
        }

        Ok(shoelace_area(&outline))
    }

    // ── Inspection ─────────────────────────────────────────────────────

    pub fn curve(&self, curve: CurveId) -> Option<&MockCurve> {
        self.curves.get(&curve.0).map(|c| &c.geometry)
    }

    pub fn is_construction(&self, curve: CurveId) -> bool {
        self.curves.get(&curve.0).is_some_and(|c| c.construction)
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Number of curves of each geometric kind: (splines, arcs, lines, circles).
    pub fn curve_census(&self) -> (usize, usize, usize, usize) {
        let mut census = (0, 0, 0, 0);
        for c in self.curves.values() {
            match c.geometry {
                MockCurve::Spline { .. } => census.0 += 1,
                MockCurve::Arc { .. } => census.1 += 1,
                MockCurve::Line { .. } => census.2 += 1,
                MockCurve::Circle { .. } => census.3 += 1,
            }
        }
        census
    }

    pub fn tangencies(&self) -> &[(CurveId, CurveId)] {
        &self.tangencies
    }

    pub fn profile(&self, profile: ProfileId) -> Option<&MockProfile> {
        self.profiles.get(&profile.0)
    }

    pub fn body(&self, body: &BodyHandle) -> Option<&MockBody> {
        self.bodies.get(&body.id())
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    pub fn groups(&self) -> &[TimelineGroup] {
        &self.groups
    }

    pub fn call_count(&self, kind: OpKind) -> usize {
        self.call_counts.get(&kind).copied().unwrap_or(0)
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
    fn make_spline(&mut self, points: &[Point2]) -> Result<CurveId, KernelError> {
        self.record_call(OpKind::Spline)?;
        if points.len() < 2 {
            return Err(KernelError::InvalidGeometry {
                reason: format!("spline needs at least 2 points, got {}", points.len()),
            });
        }
        Ok(self.store_curve(
            MockCurve::Spline {
                points: points.to_vec(),
            },
            false,
        ))
    }

    fn make_arc_three_point(
        &mut self,
        start: Point2,
        mid: Point2,
        end: Point2,
    ) -> Result<CurveId, KernelError> {
        self.record_call(OpKind::Arc)?;
        let cross = (mid.x - start.x) * (end.y - start.y) - (mid.y - start.y) * (end.x - start.x);
        if cross.abs() < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "arc points are collinear".to_string(),
            });
        }
        Ok(self.store_curve(MockCurve::Arc { start, mid, end }, false))
    }

    fn make_arc_center_sweep(
        &mut self,
        center: Point2,
        start: Point2,
        sweep: f64,
    ) -> Result<CurveId, KernelError> {
        self.record_call(OpKind::Arc)?;
        if center.distance_to(&start) < JOIN_TOLERANCE || sweep.abs() < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "degenerate center/sweep arc".to_string(),
            });
        }
        let mid = start.rotated_about(&center, 0.5 * sweep);
        let end = start.rotated_about(&center, sweep);
        Ok(self.store_curve(MockCurve::Arc { start, mid, end }, false))
    }

    fn make_line(&mut self, start: Point2, end: Point2) -> Result<CurveId, KernelError> {
        self.record_call(OpKind::Line)?;
        if start.distance_to(&end) < JOIN_TOLERANCE {
            return Err(KernelError::InvalidGeometry {
                reason: "zero-length line".to_string(),
            });
        }
        Ok(self.store_curve(MockCurve::Line { start, end }, false))
    }

    fn make_circle(
        &mut self,
        center: Point2,
        radius: f64,
        construction: bool,
    ) -> Result<CurveId, KernelError> {
        self.record_call(OpKind::Circle)?;
        if radius <= 0.0 {
            return Err(KernelError::InvalidGeometry {
                reason: format!("circle radius must be positive, got {}", radius),
            });
        }
        Ok(self.store_curve(MockCurve::Circle { center, radius }, construction))
    }

    fn constrain_tangent(&mut self, curve: CurveId, line: CurveId) -> Result<(), KernelError> {
        self.record_call(OpKind::Tangent)?;
        let (l0, l1) = match &self.stored_curve(line)?.geometry {
            MockCurve::Line { start, end } => (*start, *end),
            _ => {
                return Err(KernelError::InvalidGeometry {
                    reason: format!("curve {} is not a line", line.0),
                })
            }
        };
        let (c0, c1) = self
            .stored_curve(curve)?
            .geometry
            .endpoints()
            .ok_or_else(|| KernelError::InvalidGeometry {
                reason: "tangency against a closed curve".to_string(),
            })?;
        let touching = [c0, c1]
            .iter()
            .any(|c| c.distance_to(&l0) < JOIN_TOLERANCE || c.distance_to(&l1) < JOIN_TOLERANCE);
        if !touching {
            return Err(KernelError::InvalidGeometry {
                reason: format!("line {} does not touch curve {}", line.0, curve.0),
            });
        }
        self.tangencies.push((curve, line));
        Ok(())
    }

    fn make_profile(&mut self, loops: &[ProfileLoop]) -> Result<ProfileId, KernelError> {
        self.record_call(OpKind::Profile)?;
        let (outer, holes) = loops.split_first().ok_or_else(|| KernelError::OpenProfile {
            reason: "profile has no loops".to_string(),
        })?;
        let mut area = self.loop_signed_area(outer)?.abs();
        for hole in holes {
            area -= self.loop_signed_area(hole)?.abs();
        }
        if area <= 0.0 {
            return Err(KernelError::InvalidGeometry {
                reason: format!("profile encloses no area ({})", area),
            });
        }
        let id = self.alloc_id();
        self.profiles.insert(
            id,
            MockProfile {
                loops: loops.to_vec(),
                area,
            },
        );
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
        self.record_call(OpKind::Revolve)?;
        if profiles.is_empty() {
            return Err(KernelError::InvalidGeometry {
                reason: "revolve without profiles".to_string(),
            });
        }
        for p in profiles {
            if !self.profiles.contains_key(&p.0) {
                return Err(KernelError::profile_not_found(*p));
            }
        }
        if !matches!(self.stored_curve(axis)?.geometry, MockCurve::Line { .. }) {
            return Err(KernelError::InvalidGeometry {
                reason: format!("revolve axis {} is not a line", axis.0),
            });
        }
        if angle.abs() < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "revolve angle is zero".to_string(),
            });
        }
        self.finish_feature(
            OpKind::Revolve,
            BodyOrigin::Revolved {
                profiles: profiles.len(),
                angle,
            },
            operation,
            participants,
        )
    }

    fn extrude(
        &mut self,
        profile: ProfileId,
        distance: f64,
        symmetric: bool,
        operation: FeatureOperation,
        participants: &[BodyHandle],
    ) -> Result<FeatureOutput, KernelError> {
        self.record_call(OpKind::Extrude)?;
        if !self.profiles.contains_key(&profile.0) {
            return Err(KernelError::profile_not_found(profile));
        }
        if distance <= 0.0 {
            return Err(KernelError::InvalidGeometry {
                reason: format!("extrude distance must be positive, got {}", distance),
            });
        }
        self.finish_feature(
            OpKind::Extrude,
            BodyOrigin::Extruded {
                distance,
                symmetric,
            },
            operation,
            participants,
        )
    }

    fn rotate_body(
        &mut self,
        body: &BodyHandle,
        angle: f64,
        axis: [f64; 3],
        origin: [f64; 3],
    ) -> Result<TimelineIndex, KernelError> {
        self.record_call(OpKind::Rotate)?;
        let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if len < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "rotation axis has zero length".to_string(),
            });
        }
        let mock = self
            .bodies
            .get_mut(&body.id())
            .ok_or(KernelError::body_not_found(body))?;
        let along_z = axis[0].abs() < 1e-12 && axis[1].abs() < 1e-12;
        if along_z {
            let signed = angle * axis[2].signum();
            mock.pose = mock.pose.rotated_about(signed, [origin[0], origin[1]]);
        } else {
            mock.off_axis_rotations += 1;
        }
        Ok(self.push_timeline(OpKind::Rotate, vec![body.id()]))
    }

    fn boolean_cut(
        &mut self,
        target: &BodyHandle,
        tools: &[BodyHandle],
        keep_tools: bool,
    ) -> Result<TimelineIndex, KernelError> {
        self.record_call(OpKind::BooleanCut)?;
        if tools.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "cut without tool bodies".to_string(),
            });
        }
        if !self.bodies.contains_key(&target.id()) {
            return Err(KernelError::body_not_found(target));
        }
        for tool in tools {
            if tool == target {
                return Err(KernelError::BooleanFailed {
                    reason: "a body cannot cut itself".to_string(),
                });
            }
            if !self.bodies.contains_key(&tool.id()) {
                return Err(KernelError::body_not_found(tool));
            }
        }

        if let Some(t) = self.bodies.get_mut(&target.id()) {
            t.cuts_received += 1;
        }
        for tool in tools {
            if keep_tools {
                if let Some(t) = self.bodies.get_mut(&tool.id()) {
                    t.tool_uses += 1;
                }
            } else {
                self.bodies.remove(&tool.id());
            }
        }

        let mut touched = vec![target.id()];
        touched.extend(tools.iter().map(|t| t.id()));
        Ok(self.push_timeline(OpKind::BooleanCut, touched))
    }

    fn group_timeline(
        &mut self,
        first: TimelineIndex,
        last: TimelineIndex,
    ) -> Result<GroupId, KernelError> {
        self.record_call(OpKind::Group)?;
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
        let overlaps = self
            .groups
            .iter()
            .any(|g| g.first <= last && first <= g.last);
        if overlaps && !self.allow_nested_groups {
            return Err(KernelError::GroupingFailed {
                reason: format!("range {}..={} overlaps an existing group", first.0, last.0),
            });
        }
        let id = GroupId(self.alloc_id());
        self.groups.push(TimelineGroup { id, first, last });
        Ok(id)
    }
}

/// Signed area of a closed polygon (shoelace formula); positive when CCW.
fn shoelace_area(pts: &[Point2]) -> f64 {
    let n = pts.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += pts[i].x * pts[j].y;
        area -= pts[j].x * pts[i].y;
    }
    area / 2.0
}
