//! Property-based tests for gear layout invariants using the `proptest` crate.

use proptest::prelude::*;

use gear_geometry::{
    build_tooth, GearParameters, GearProfile, LengthUnit, PressureAngle, RootConnection,
};
use gear_types::GearKind;

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Metric gear pairs that pass validation.
fn arb_params() -> impl Strategy<Value = GearParameters> {
    (
        0.5f64..5.0,
        12u32..120,
        prop_oneof![Just(1.0f64), Just(2.0), Just(3.0), Just(4.0)],
        prop_oneof![
            Just(PressureAngle::Deg14_5),
            Just(PressureAngle::Deg20),
            Just(PressureAngle::Deg25)
        ],
        0.0f64..0.05,
    )
        .prop_map(|(module, teeth_sh, gear_ratio, pressure_angle, backlash)| GearParameters {
            module,
            teeth_sh,
            gear_ratio,
            pressure_angle,
            backlash,
            thickness: 10.0,
            hole_diameter: 0.0,
            unit: LengthUnit::Millimeter,
        })
}

/// Arbitrary placement angle in radians.
fn arb_angle() -> impl Strategy<Value = f64> {
    -std::f64::consts::PI..std::f64::consts::PI
}

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// 1. Derived dimensions keep their ordering: root < pitch < tip, base ≤ pitch
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn dimensions_are_ordered(params in arb_params()) {
        prop_assume!(params.validate().is_ok());
        let d = params.sh_dimensions();
        prop_assert!(d.root_diameter < d.pitch_diameter);
        prop_assert!(d.pitch_diameter < d.tip_diameter);
        prop_assert!(d.base_diameter <= d.pitch_diameter);
        prop_assert_eq!(params.teeth_mp(), (params.teeth_sh as f64 / params.gear_ratio).floor() as u32);
    }
}

// ---------------------------------------------------------------------------
// 2. Flanks stay between the base and tip circles and mirror each other
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn flanks_are_mirror_images(params in arb_params(), angle in arb_angle()) {
        let dims = params.sh_dimensions();
        let tooth = build_tooth(&dims, angle).unwrap();
        let back = -angle;
        for (a, b) in tooth.flank_a.iter().zip(&tooth.flank_b) {
            let a0 = a.rotated(back);
            let b0 = b.rotated(back);
            prop_assert!((a0.x - b0.x).abs() < TOL);
            prop_assert!((a0.y + b0.y).abs() < TOL);
            prop_assert!(a.radius() >= dims.base_diameter / 2.0 - TOL);
            prop_assert!(a.radius() <= dims.tip_diameter / 2.0 + TOL);
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Relief lines are used exactly when the base circle clears the root
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn root_connection_matches_circles(params in arb_params()) {
        let dims = params.sh_dimensions();
        let tooth = build_tooth(&dims, 0.0).unwrap();
        let relief = matches!(tooth.root, RootConnection::Relief { .. });
        prop_assert_eq!(relief, dims.base_diameter >= dims.root_diameter);
    }
}

// ---------------------------------------------------------------------------
// 4. Ball profile: floor(N/2) teeth, each centered between axis and axis + π
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn ball_teeth_fill_half_circle(params in arb_params(), axis in arb_angle()) {
        let profile = GearProfile::build(GearKind::ShBall, &params, axis).unwrap();
        prop_assert_eq!(profile.teeth.len() as u32, params.teeth_sh / 2);
        let pitch = params.pitch_angle_sh();
        for (i, tooth) in profile.teeth.iter().enumerate() {
            let expected = pitch * i as f64 + pitch / 2.0 + axis;
            prop_assert!((tooth.angle - expected).abs() < TOL);
            prop_assert!(tooth.angle - axis < std::f64::consts::PI);
        }
    }
}
