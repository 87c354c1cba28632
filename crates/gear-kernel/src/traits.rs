use crate::types::*;

/// Modeling collaborator used by the gear generator.
///
/// Every call has a visible side effect on kernel state that later calls
/// consume, so callers must issue them in order. Implemented by TruckKernel
/// (real B-rep solids) and MockKernel (deterministic recording test double).
pub trait Kernel {
    /// Fit a spline through an ordered point sequence in the sketch plane.
    fn make_spline(&mut self, points: &[Point2]) -> Result<CurveId, KernelError>;

    /// Circular arc from `start` through `mid` to `end`.
    fn make_arc_three_point(
        &mut self,
        start: Point2,
        mid: Point2,
        end: Point2,
    ) -> Result<CurveId, KernelError>;

    /// Circular arc around `center` starting at `start`, sweeping
    /// counter-clockwise by `sweep` radians.
    fn make_arc_center_sweep(
        &mut self,
        center: Point2,
        start: Point2,
        sweep: f64,
    ) -> Result<CurveId, KernelError>;

    /// Straight line segment.
    fn make_line(&mut self, start: Point2, end: Point2) -> Result<CurveId, KernelError>;

    /// Full circle. Construction circles never take part in profiles.
    fn make_circle(
        &mut self,
        center: Point2,
        radius: f64,
        construction: bool,
    ) -> Result<CurveId, KernelError>;

    /// Constrain `line` to stay tangent to `curve` at their shared endpoint.
    fn constrain_tangent(&mut self, curve: CurveId, line: CurveId) -> Result<(), KernelError>;

    /// Build a profile from closed loops. The first loop is the outer
    /// boundary, the remaining loops are holes.
    fn make_profile(&mut self, loops: &[ProfileLoop]) -> Result<ProfileId, KernelError>;

    /// Revolve profiles around a sketch line.
    fn revolve(
        &mut self,
        profiles: &[ProfileId],
        axis: CurveId,
        angle: f64,
        operation: FeatureOperation,
        participants: &[BodyHandle],
    ) -> Result<FeatureOutput, KernelError>;

    /// Extrude a profile along the sketch normal. A symmetric extrude spans
    /// `distance` in total, centered on the sketch plane.
    fn extrude(
        &mut self,
        profile: ProfileId,
        distance: f64,
        symmetric: bool,
        operation: FeatureOperation,
        participants: &[BodyHandle],
    ) -> Result<FeatureOutput, KernelError>;

    /// Rigidly rotate a body in place about an axis through `origin`.
    fn rotate_body(
        &mut self,
        body: &BodyHandle,
        angle: f64,
        axis: [f64; 3],
        origin: [f64; 3],
    ) -> Result<TimelineIndex, KernelError>;

    /// Subtract the tool bodies from the target body in place.
    fn boolean_cut(
        &mut self,
        target: &BodyHandle,
        tools: &[BodyHandle],
        keep_tools: bool,
    ) -> Result<TimelineIndex, KernelError>;

    /// Group the timeline entries `first..=last` into one history entry.
    fn group_timeline(
        &mut self,
        first: TimelineIndex,
        last: TimelineIndex,
    ) -> Result<GroupId, KernelError>;
}
