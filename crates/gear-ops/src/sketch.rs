//! Turns planar gear layouts into kernel sketch curves and profiles.

use gear_geometry::{GearProfile, RootConnection, RootShape, ToothProfile};
use gear_kernel::{CurveId, Kernel, KernelError, LoopEdge, ProfileId, ProfileLoop};
use gear_types::Point2;
use std::f64::consts::PI;
use tracing::debug;

/// Kernel entities created for one gear sketch.
#[derive(Debug, Clone)]
pub struct EmittedSketch {
    /// Root region first, then one profile per tooth.
    pub profiles: Vec<ProfileId>,
    /// Diameter line of a root fan, used as the revolve axis.
    pub axis_line: Option<CurveId>,
    /// Construction tip circle, if the layout has one.
    pub tip_guide: Option<CurveId>,
}

impl EmittedSketch {
    pub fn root_profile(&self) -> Option<ProfileId> {
        self.profiles.first().copied()
    }

    pub fn tooth_profiles(&self) -> &[ProfileId] {
        self.profiles.get(1..).unwrap_or(&[])
    }
}

/// Emit the closed outline of one tooth.
///
/// The loop runs up flank A, over the tip arc, down flank B and back to the
/// start of flank A across the root.
pub fn emit_tooth(
    kernel: &mut dyn Kernel,
    tooth: &ToothProfile,
) -> Result<ProfileLoop, KernelError> {
    let spline_a = kernel.make_spline(&tooth.flank_a)?;
    let spline_b = kernel.make_spline(&tooth.flank_b)?;
    let tip = kernel.make_arc_three_point(tooth.flank_a_end(), tooth.tip_mid, tooth.flank_b_end())?;

    let mut edges = vec![
        LoopEdge::forward(spline_a),
        LoopEdge::forward(tip),
        LoopEdge::reversed(spline_b),
    ];

    match tooth.root {
        RootConnection::Direct => {
            let line = kernel.make_line(tooth.flank_b_start(), tooth.flank_a_start())?;
            edges.push(LoopEdge::forward(line));
        }
        RootConnection::Relief { root_a, root_b } => {
            let relief_a = kernel.make_line(root_a, tooth.flank_a_start())?;
            let relief_b = kernel.make_line(root_b, tooth.flank_b_start())?;
            let base = kernel.make_line(root_a, root_b)?;
            kernel.constrain_tangent(spline_a, relief_a)?;
            kernel.constrain_tangent(spline_b, relief_b)?;
            edges.push(LoopEdge::reversed(relief_b));
            edges.push(LoopEdge::reversed(base));
            edges.push(LoopEdge::forward(relief_a));
        }
    }

    Ok(ProfileLoop::new(edges))
}

/// Emit every curve and profile of a gear layout.
pub fn emit_profile(
    kernel: &mut dyn Kernel,
    profile: &GearProfile,
) -> Result<EmittedSketch, KernelError> {
    let mut profiles = Vec::with_capacity(profile.teeth.len() + 1);

    let (root_loop, axis_line) = match profile.root {
        RootShape::Fan { radius, axis_angle } => {
            let c = profile.center;
            let on_rim = |a: f64| Point2::new(c.x + radius * a.cos(), c.y + radius * a.sin());
            let start = on_rim(axis_angle);
            let end = on_rim(axis_angle + PI);
            let arc = kernel.make_arc_center_sweep(c, start, PI)?;
            let diameter = kernel.make_line(start, end)?;
            (
                ProfileLoop::new(vec![LoopEdge::forward(arc), LoopEdge::reversed(diameter)]),
                Some(diameter),
            )
        }
        RootShape::Disc { radius } => {
            let circle = kernel.make_circle(profile.center, radius, false)?;
            (ProfileLoop::new(vec![LoopEdge::forward(circle)]), None)
        }
    };

    let mut root_loops = vec![root_loop];
    if let Some(bore_radius) = profile.bore_radius {
        let bore = kernel.make_circle(profile.center, bore_radius, false)?;
        root_loops.push(ProfileLoop::new(vec![LoopEdge::forward(bore)]));
    }
    profiles.push(kernel.make_profile(&root_loops)?);

    let tip_guide = match profile.tip_guide {
        Some(radius) => Some(kernel.make_circle(profile.center, radius, true)?),
        None => None,
    };

    for tooth in &profile.teeth {
        let outline = emit_tooth(kernel, tooth)?;
        profiles.push(kernel.make_profile(&[outline])?);
    }

    debug!(
        kind = ?profile.kind,
        profiles = profiles.len(),
        "gear sketch emitted"
    );

    Ok(EmittedSketch {
        profiles,
        axis_line,
        tip_guide,
    })
}
