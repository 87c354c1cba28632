//! End-to-end generator tests against the recording MockKernel.

use approx::assert_relative_eq;
use gear_geometry::{
    GearParameters, GearProfile, LengthUnit, PressureAngle, SpurGearParameters, ToothPitch,
};
use gear_kernel::mock_kernel::{BodyOrigin, OpKind};
use gear_kernel::{FeatureOperation, MockKernel};
use gear_ops::{
    emit_profile, generate_abenics, generate_spur, EngraveConfig, EngraveStage,
    GeneratorConfig, OpError,
};
use gear_types::GearKind;
use std::f64::consts::TAU;

fn metric_params() -> GearParameters {
    GearParameters {
        unit: LengthUnit::Millimeter,
        thickness: 40.0,
        hole_diameter: 4.0,
        ..GearParameters::default()
    }
}

// ── Sketch emission ─────────────────────────────────────────────────────

#[test]
fn test_ball_sketch_curves() {
    let mut kernel = MockKernel::new();
    let layout = GearProfile::build(GearKind::ShBall, &metric_params(), 0.0).unwrap();
    let sketch = emit_profile(&mut kernel, &layout).unwrap();

    // Root fan plus 20 teeth, each closed by two relief lines and a base line.
    assert_eq!(sketch.profiles.len(), 21);
    assert_eq!(kernel.curve_census(), (40, 21, 61, 1));
    assert_eq!(kernel.tangencies().len(), 40);
    assert!(kernel.is_construction(sketch.tip_guide.unwrap()));
    assert!(sketch.axis_line.is_some());
    for &tooth in sketch.tooth_profiles() {
        assert!(kernel.profile(tooth).unwrap().area > 0.0);
    }
}

#[test]
fn test_shallow_root_uses_single_line() {
    // At 25° the base circle of a 40-tooth gear falls inside the root circle.
    let params = GearParameters {
        pressure_angle: PressureAngle::Deg25,
        ..metric_params()
    };
    let dims = params.sh_dimensions();
    assert!(!dims.needs_root_relief());

    let mut kernel = MockKernel::new();
    let layout = GearProfile::build(GearKind::ShBall, &params, 0.0).unwrap();
    emit_profile(&mut kernel, &layout).unwrap();

    assert_eq!(kernel.curve_census(), (40, 21, 21, 1));
    assert!(kernel.tangencies().is_empty());
}

#[test]
fn test_mp_blank_is_bored_disc() {
    let mut kernel = MockKernel::new();
    let layout = GearProfile::build(GearKind::MpMating, &metric_params(), 0.0).unwrap();
    let sketch = emit_profile(&mut kernel, &layout).unwrap();

    assert_eq!(sketch.profiles.len(), 1);
    let blank = kernel.profile(sketch.profiles[0]).unwrap();
    assert_eq!(blank.loops.len(), 2);
    assert!(sketch.axis_line.is_none());
}

// ── ABENICS pipeline ────────────────────────────────────────────────────

#[test]
fn test_pipeline_returns_sh_to_start() {
    let mut kernel = MockKernel::new();
    let out = generate_abenics(&mut kernel, &metric_params(), &EngraveConfig::default(), true)
        .unwrap();

    let sh = kernel.body(&out.sh_body).unwrap();
    assert_relative_eq!(sh.pose.angle, 0.0, epsilon = 1e-12);
    let mp = kernel.body(&out.mp_body).unwrap();
    assert_relative_eq!(mp.pose.angle, -TAU, epsilon = 1e-12);
    assert_eq!(
        mp.origin,
        BodyOrigin::Extruded {
            distance: 40.0,
            symmetric: true
        }
    );
    assert_eq!(kernel.body_count(), 2);
}

#[test]
fn test_cross_teeth_intersect_sh_body() {
    let mut kernel = MockKernel::new();
    let out = generate_abenics(&mut kernel, &metric_params(), &EngraveConfig::default(), true)
        .unwrap();

    assert!(out.cross_teeth.is_some());
    assert_eq!(kernel.call_count(OpKind::Revolve), 2);
    let sh = kernel.body(&out.sh_body).unwrap();
    assert_eq!(sh.feature_history, vec![FeatureOperation::Intersect]);
    // The cross sketch comes after the engrave run and the SH reset.
    assert!(out.cross_teeth.unwrap() > out.sh_reset);
    assert!(out.sh_reset > out.engrave.steps[35].rotate_mp);
}

#[test]
fn test_pipeline_without_cross_teeth() {
    let mut kernel = MockKernel::new();
    let out = generate_abenics(&mut kernel, &metric_params(), &EngraveConfig::default(), false)
        .unwrap();

    assert!(out.cross_teeth.is_none());
    assert_eq!(kernel.call_count(OpKind::Revolve), 1);
    assert!(kernel.body(&out.sh_body).unwrap().feature_history.is_empty());
}

#[test]
fn test_invalid_parameters_touch_nothing() {
    let mut kernel = MockKernel::new();
    let params = GearParameters {
        teeth_sh: 3,
        ..metric_params()
    };
    let err = generate_abenics(&mut kernel, &params, &EngraveConfig::default(), true).unwrap_err();

    assert!(matches!(err, OpError::Geometry(_)));
    assert_eq!(kernel.curve_count(), 0);
    assert_eq!(kernel.body_count(), 0);
}

#[test]
fn test_pipeline_surfaces_failed_step() {
    let mut kernel = MockKernel::new();
    kernel.inject_failure(OpKind::BooleanCut, 0);
    let err = generate_abenics(&mut kernel, &metric_params(), &EngraveConfig::default(), true)
        .unwrap_err();

    assert!(matches!(
        err,
        OpError::EngraveStepFailed {
            step: 0,
            stage: EngraveStage::Cut,
            ..
        }
    ));
    // The SH gear was never reset or crossed.
    assert_eq!(kernel.call_count(OpKind::Rotate), 0);
    assert_eq!(kernel.call_count(OpKind::Revolve), 1);
}

#[test]
fn test_config_drives_generation() {
    let config = GeneratorConfig::from_json_str(
        r#"{
            "gear": { "teeth_sh": 30, "gear_ratio": 3.0, "unit": "millimeter", "hole_diameter": 2.0 },
            "engrave": { "steps": 12 },
            "cross_teeth": false
        }"#,
    )
    .unwrap();
    let mut kernel = MockKernel::new();
    let out = config.generate(&mut kernel).unwrap();

    assert_eq!(out.engrave.steps.len(), 12);
    assert_relative_eq!(out.engrave.sh_rotation, TAU / 3.0, epsilon = 1e-12);
    assert_eq!(kernel.call_count(OpKind::BooleanCut), 12);
    // 30 teeth on the SH gear put 15 on the revolved half section.
    assert_eq!(kernel.call_count(OpKind::Spline), 30);
}

// ── Spur gear ───────────────────────────────────────────────────────────

#[test]
fn test_spur_joins_every_tooth() {
    let params = SpurGearParameters {
        pitch: ToothPitch::Module(2.0),
        teeth: 12,
        thickness: 8.0,
        hole_diameter: 5.0,
        unit: LengthUnit::Millimeter,
        ..SpurGearParameters::default()
    };
    let mut kernel = MockKernel::new();
    let out = generate_spur(&mut kernel, &params).unwrap();

    assert_eq!(out.teeth_joined, 12);
    assert_eq!(kernel.body_count(), 1);
    assert_eq!(kernel.call_count(OpKind::Extrude), 13);
    let body = kernel.body(&out.body).unwrap();
    assert_eq!(body.feature_history.len(), 12);
    assert!(body
        .feature_history
        .iter()
        .all(|op| *op == FeatureOperation::Join));
}

#[test]
fn test_spur_build_is_grouped_with_pitch_circle() {
    let params = SpurGearParameters {
        pitch: ToothPitch::Module(2.0),
        teeth: 12,
        thickness: 8.0,
        hole_diameter: 5.0,
        unit: LengthUnit::Millimeter,
        ..SpurGearParameters::default()
    };
    let mut kernel = MockKernel::new();
    let out = generate_spur(&mut kernel, &params).unwrap();

    assert!(kernel.is_construction(out.pitch_circle));
    assert_eq!(kernel.groups().len(), 1);
    let group = &kernel.groups()[0];
    assert_eq!(group.id, out.group);
    assert_eq!(group.first.0, 0);
    assert_eq!(group.last.0, kernel.timeline().len() - 1);
}

#[test]
fn test_spur_rejects_oversized_fillet() {
    let params = SpurGearParameters {
        root_fillet_radius: 10.0,
        unit: LengthUnit::Millimeter,
        ..SpurGearParameters::default()
    };
    let mut kernel = MockKernel::new();
    let err = generate_spur(&mut kernel, &params).unwrap_err();
    assert!(matches!(err, OpError::Geometry(_)));
}
