//! Engrave simulator tests against the recording MockKernel.

use std::f64::consts::{PI, TAU};

use approx::assert_relative_eq;
use gear_geometry::{GearParameters, GearProfile, LengthUnit};
use gear_kernel::mock_kernel::OpKind;
use gear_kernel::{BodyHandle, FeatureOperation, KernelError, MockKernel};
use gear_ops::{
    emit_profile, execute_revolve, execute_symmetric_extrude, EngraveConfig, EngraveSimulator,
    EngraveStage, OpError,
};
use gear_types::{GearKind, Point2};

fn metric_params() -> GearParameters {
    GearParameters {
        unit: LengthUnit::Millimeter,
        thickness: 40.0,
        hole_diameter: 4.0,
        ..GearParameters::default()
    }
}

/// Build the SH ball gear and the MP blank in the mock kernel.
fn gear_pair(kernel: &mut MockKernel, params: &GearParameters) -> (BodyHandle, BodyHandle) {
    let sh_layout = GearProfile::build(GearKind::ShBall, params, 0.0).unwrap();
    let sh_sketch = emit_profile(kernel, &sh_layout).unwrap();
    let sh = execute_revolve(kernel, &sh_sketch, TAU, FeatureOperation::NewBody, &[]).unwrap();

    let mp_layout = GearProfile::build(GearKind::MpMating, params, 0.0).unwrap();
    let mp_sketch = emit_profile(kernel, &mp_layout).unwrap();
    let mp = execute_symmetric_extrude(
        kernel,
        mp_sketch.root_profile().unwrap(),
        params.thickness,
        FeatureOperation::NewBody,
        &[],
    )
    .unwrap();
    (sh.handle, mp.handle)
}

// ── Closure ─────────────────────────────────────────────────────────────

#[test]
fn test_ratio_two_closes_after_full_mp_turn() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);

    let report = EngraveSimulator::new(&params, EngraveConfig::default())
        .run(&mut kernel, &sh, &mp)
        .unwrap();

    assert_eq!(report.steps.len(), 36);
    assert_relative_eq!(report.sh_rotation, PI, epsilon = 1e-12);
    assert_relative_eq!(report.mp_rotation, -TAU, epsilon = 1e-12);

    let sh_pose = kernel.body(&sh).unwrap().pose;
    assert_relative_eq!(sh_pose.angle, PI, epsilon = 1e-12);
    assert_relative_eq!(sh_pose.translation[0], 0.0, epsilon = 1e-12);

    // A full turn about its own center brings the MP gear back to the start.
    let mp_pose = kernel.body(&mp).unwrap().pose;
    assert_relative_eq!(mp_pose.angle, -TAU, epsilon = 1e-12);
    let marker = mp_pose.apply(Point2::new(30.0, 5.0));
    assert_relative_eq!(marker.x, 30.0, epsilon = 1e-9);
    assert_relative_eq!(marker.y, 5.0, epsilon = 1e-9);
}

#[test]
fn test_step_angles_increase_by_delta() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);
    let config = EngraveConfig {
        steps: 24,
        ..EngraveConfig::default()
    };

    let report = EngraveSimulator::new(&params, config).run(&mut kernel, &sh, &mp).unwrap();

    for (i, step) in report.steps.iter().enumerate() {
        assert_eq!(step.index, i);
        assert_relative_eq!(step.angle, TAU / 24.0 * i as f64, epsilon = 1e-12);
        assert!(step.cut < step.rotate_sh && step.rotate_sh < step.rotate_mp);
    }
}

#[test]
fn test_sh_body_is_never_consumed() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);

    EngraveSimulator::new(&params, EngraveConfig::default())
        .run(&mut kernel, &sh, &mp)
        .unwrap();

    let sh_body = kernel.body(&sh).expect("SH body must survive engraving");
    assert_eq!(sh_body.tool_uses, 36);
    assert_eq!(kernel.body(&mp).unwrap().cuts_received, 36);
    assert_eq!(kernel.body_count(), 2);
}

// ── Grouping ────────────────────────────────────────────────────────────

#[test]
fn test_outer_group_failure_is_not_fatal() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);

    let report = EngraveSimulator::new(&params, EngraveConfig::default())
        .run(&mut kernel, &sh, &mp)
        .unwrap();

    // The mock refuses groups enclosing other groups.
    assert!(report.outer_group.is_none());
    assert_eq!(kernel.groups().len(), 36);
    assert!(report.steps.iter().all(|s| s.group.is_some()));
}

#[test]
fn test_outer_group_folds_when_host_allows_nesting() {
    let params = metric_params();
    let mut kernel = MockKernel::new().with_nested_groups();
    let (sh, mp) = gear_pair(&mut kernel, &params);

    let report = EngraveSimulator::new(&params, EngraveConfig::default())
        .run(&mut kernel, &sh, &mp)
        .unwrap();

    assert!(report.outer_group.is_some());
    let outer = kernel.groups().last().unwrap();
    assert_eq!(outer.first, report.steps[0].cut);
    assert_eq!(outer.last, report.steps[35].rotate_mp);
}

#[test]
fn test_ungrouped_steps_still_fold() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);
    let config = EngraveConfig {
        group_steps: false,
        ..EngraveConfig::default()
    };

    let report = EngraveSimulator::new(&params, config).run(&mut kernel, &sh, &mp).unwrap();

    assert!(report.steps.iter().all(|s| s.group.is_none()));
    assert!(report.outer_group.is_some());
    assert_eq!(kernel.groups().len(), 1);
}

// ── Failures ────────────────────────────────────────────────────────────

#[test]
fn test_failing_cut_aborts_at_that_step() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);
    kernel.inject_failure(OpKind::BooleanCut, 5);

    let err = EngraveSimulator::new(&params, EngraveConfig::default())
        .run(&mut kernel, &sh, &mp)
        .unwrap_err();

    match err {
        OpError::EngraveStepFailed { step, stage, .. } => {
            assert_eq!(step, 5);
            assert_eq!(stage, EngraveStage::Cut);
        }
        other => panic!("unexpected error: {other}"),
    }
    // No rollback: the first five steps stay applied.
    assert_eq!(kernel.body(&mp).unwrap().cuts_received, 5);
    assert_eq!(kernel.call_count(OpKind::Rotate), 10);
}

#[test]
fn test_failing_mp_rotation_reports_stage() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);
    // Rotations alternate SH, MP; call 7 is the MP rotation of step 3.
    kernel.inject_failure(OpKind::Rotate, 7);

    let err = EngraveSimulator::new(&params, EngraveConfig::default())
        .run(&mut kernel, &sh, &mp)
        .unwrap_err();

    assert!(matches!(
        err,
        OpError::EngraveStepFailed {
            step: 3,
            stage: EngraveStage::RotateMp,
            source: KernelError::Other { .. },
        }
    ));
}

#[test]
fn test_failing_step_group_aborts() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);
    kernel.inject_failure(OpKind::Group, 2);

    let err = EngraveSimulator::new(&params, EngraveConfig::default())
        .run(&mut kernel, &sh, &mp)
        .unwrap_err();

    assert!(matches!(
        err,
        OpError::EngraveStepFailed {
            step: 2,
            stage: EngraveStage::Group,
            ..
        }
    ));
}

#[test]
fn test_zero_steps_rejected() {
    let params = metric_params();
    let mut kernel = MockKernel::new();
    let (sh, mp) = gear_pair(&mut kernel, &params);
    let config = EngraveConfig {
        steps: 0,
        ..EngraveConfig::default()
    };

    let err = EngraveSimulator::new(&params, config)
        .run(&mut kernel, &sh, &mp)
        .unwrap_err();
    assert!(matches!(err, OpError::InvalidParameter { .. }));
    assert_eq!(kernel.call_count(OpKind::BooleanCut), 0);
}
