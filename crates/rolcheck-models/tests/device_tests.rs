use rolcheck_models::*;
use rolcheck_verify::*;

fn verify_config(width: i64, iterations: i64, seed: u64, error_flags: bool) -> VerifyConfig {
    VerifyConfig::new(Parameters::new(width, Some(iterations)).unwrap())
        .with_seed(seed)
        .with_error_flags(error_flags)
}

async fn run(config: VerifyConfig, faults: &[Fault]) -> (Report, Vec<String>) {
    let width = config.params.width;
    let mut adapter = behavioral_adapter(
        width,
        &SignalNames::default(),
        config.error_flags,
        1,
        faults,
    )
    .unwrap();
    let mut trace = TraceReporter::new();
    let report = Verifier::new(config).run(&mut adapter, &mut trace).await;
    (report, trace.into_lines())
}

#[tokio::test]
async fn test_behavioral_device_passes_seeded_run() {
    let (report, trace) = run(verify_config(16, 1000, 1, false), &[]).await;
    assert!(report.is_success(), "{}", summarize(&report));
    assert_eq!(trace.len(), 1000);
}

#[tokio::test]
async fn test_behavioral_device_passes_across_widths() {
    for width in [1, 2, 3, 5, 7, 8, 13, 16, 31, 32, 33, 63, 64] {
        let (report, _) = run(verify_config(width, 300, width as u64, true), &[]).await;
        assert!(report.is_success(), "width {}: {}", width, summarize(&report));
    }
}

#[tokio::test]
async fn test_behavioral_device_exhaustive() {
    let config = HarnessConfig {
        width: 6,
        mode: StimulusMode::Exhaustive,
        error_flags: true,
        ..Default::default()
    }
    .validate()
    .unwrap();

    let (report, _) = run(config, &[]).await;
    assert!(report.is_success());
    assert_eq!(report.completed, 64 * 8);
    assert!((report.coverage.percent() - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_off_by_one_borders_fault() {
    let (report, _) = run(verify_config(8, 500, 2, false), &[Fault::BordersOffByOne]).await;

    assert!(!report.failures.is_empty());
    let counts = report.count_by_tag();
    assert!(!counts.contains_key(&Mismatch::GoldenShiftMismatch));
    assert_eq!(
        counts.get(&Mismatch::GoldenBordersMismatch),
        Some(&(report.failures.len() as u64))
    );
    assert_eq!(
        counts.get(&Mismatch::CrossImplementationMismatch),
        Some(&(report.failures.len() as u64))
    );
}

#[tokio::test]
async fn test_stuck_bit_fault_only_on_affected_samples() {
    let (report, _) = run(verify_config(8, 500, 3, false), &[Fault::ShiftStuckLow(0)]).await;

    assert!(!report.failures.is_empty());
    for verdict in &report.failures {
        assert_eq!(verdict.golden & 1, 1);
        assert_eq!(verdict.observed.result_by_shift, verdict.golden & !1);
    }
}

#[tokio::test]
async fn test_error_flag_faults() {
    let (report, trace) = run(
        verify_config(8, 50, 4, true),
        &[Fault::ShiftErrorFlag, Fault::BordersErrorFlag],
    )
    .await;

    assert_eq!(report.failures.len(), 50);
    assert!(trace[0].contains(
        "shiftErrorFlag=1 bordersErrorFlag=1 verdict=FAIL[SHIFT_ERROR_FLAG_SET,BORDERS_ERROR_FLAG_SET]"
    ));
}

#[tokio::test]
async fn test_crash_aborts_run() {
    let (report, trace) = run(verify_config(8, 50, 5, false), &[Fault::CrashAt(20)]).await;

    assert!(report.is_aborted());
    assert_eq!(report.completed, 20);
    assert_eq!(trace.len(), 20);
    assert!(summarize(&report).starts_with("RUN_ABORTED: iterations=20/50 failures=0"));
}

#[tokio::test]
async fn test_alternate_port_names() {
    let signals = SignalNames {
        result_by_shift: "rol_shift_o".to_string(),
        result_by_borders: "rol_borders_o".to_string(),
        ..Default::default()
    };
    let config = verify_config(12, 200, 6, false);
    let mut adapter = behavioral_adapter(12, &signals, false, 2, &[]).unwrap();

    let report = Verifier::new(config)
        .run(&mut adapter, &mut TraceReporter::new())
        .await;

    assert!(report.is_success());
    assert_eq!(adapter.port().time_ns(), 400);
    assert_eq!(adapter.port().evaluations(), 200);
}

#[tokio::test]
async fn test_mismatched_port_names_abort() {
    let device_signals = SignalNames {
        result_by_shift: "rol_shift_o".to_string(),
        ..Default::default()
    };
    let device = RotatorDevice::new(8, device_signals);
    let mut adapter = SignalAdapter::new(device, SignalNames::default(), 8, false);

    let report = Verifier::new(verify_config(8, 10, 7, false))
        .run(&mut adapter, &mut TraceReporter::new())
        .await;

    assert_eq!(
        report.outcome,
        RunOutcome::Aborted {
            iteration: 0,
            fault: AdapterFault::UnknownSignal("result_by_shift_o".to_string())
        }
    );
}

#[test]
fn test_stuck_bit_beyond_width_rejected() {
    let err = behavioral_adapter(
        8,
        &SignalNames::default(),
        false,
        1,
        &[Fault::BordersOffByOne, Fault::ShiftStuckLow(8)],
    )
    .err()
    .unwrap();

    assert_eq!(
        err,
        FaultError::BitOutOfRange {
            fault: "shift-stuck-low:8".to_string(),
            width: 8
        }
    );
    assert!(behavioral_adapter(9, &SignalNames::default(), false, 1, &[Fault::ShiftStuckLow(8)]).is_ok());
}
