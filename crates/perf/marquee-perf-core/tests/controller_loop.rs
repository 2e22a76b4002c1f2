use serde::Deserialize;

use marquee_perf_core::{
    AnimationQuality, ExecutionMode, FrameReport, HardwareAcceleration, LoopToken, MonitorConfig,
    PerformanceController, QueuedScheduler, Visibility, VisibilityLevel,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    interval_ms: f64,
    frames: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpectedWindow {
    fps: u32,
    animation_quality: AnimationQuality,
    hardware_acceleration: HardwareAcceleration,
    changed: bool,
}

#[derive(Debug, Deserialize)]
struct Trace {
    visibility: Visibility,
    segments: Vec<Segment>,
    expected: Vec<ExpectedWindow>,
}

/// Drive the controller like a browser would: every due request fires once per frame.
fn drive(
    controller: &mut PerformanceController,
    scheduler: &mut QueuedScheduler,
    probe: &Visibility,
    segments: &[Segment],
    start_ms: f64,
) -> Vec<FrameReport> {
    let mut reports = Vec::new();
    let mut t = start_ms;
    for seg in segments {
        let seg_start = t;
        for k in 1..=seg.frames {
            t = seg_start + seg.interval_ms * k as f64;
            for (_, token) in scheduler.take_due() {
                if let Some(report) = controller.on_frame(token, t, probe, scheduler).unwrap() {
                    reports.push(report);
                }
            }
        }
    }
    reports
}

#[test]
fn traces_produce_expected_windows() {
    for name in marquee_test_fixtures::trace_names() {
        let trace: Trace = marquee_test_fixtures::trace(name).expect("trace fixture");
        let mut controller = PerformanceController::new(MonitorConfig::default()).unwrap();
        let mut scheduler = QueuedScheduler::new();
        controller.start(0.0, &mut scheduler).unwrap();

        let reports = drive(
            &mut controller,
            &mut scheduler,
            &trace.visibility,
            &trace.segments,
            0.0,
        );
        assert_eq!(reports.len(), trace.expected.len(), "trace {name}");
        for (report, exp) in reports.iter().zip(&trace.expected) {
            assert_eq!(report.sample.frames_per_second, exp.fps, "trace {name}");
            assert_eq!(report.settings.animation_quality, exp.animation_quality);
            assert_eq!(report.settings.hardware_acceleration, exp.hardware_acceleration);
            assert_eq!(report.changed, exp.changed, "trace {name} fps {}", exp.fps);
        }
        let fps: Vec<u32> = trace.expected.iter().map(|e| e.fps).collect();
        assert_eq!(controller.history().to_vec(), fps);
    }
}

#[test]
fn sample_carries_probe_visibility() {
    let mut controller = PerformanceController::new(MonitorConfig::default()).unwrap();
    let mut scheduler = QueuedScheduler::new();
    controller.start(0.0, &mut scheduler).unwrap();
    let probe = Visibility::observed(true, 0.4);
    let reports = drive(
        &mut controller,
        &mut scheduler,
        &probe,
        &[Segment {
            interval_ms: 20.0,
            frames: 50,
        }],
        0.0,
    );
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].sample.intersection_ratio, 0.4);
    assert_eq!(reports[0].settings.visibility_level, VisibilityLevel::Partial);
    assert_eq!(reports[0].sample.frame_time_ms, 20.0);
    assert_eq!(reports[0].sample.memory_used_bytes, None);
}

#[test]
fn stale_callback_after_restart_is_ignored() {
    let mut controller = PerformanceController::new(MonitorConfig::default()).unwrap();
    let mut scheduler = QueuedScheduler::new();
    let probe = Visibility::fully_visible();

    let first = controller.start(0.0, &mut scheduler).unwrap();
    controller.stop(&mut scheduler);
    let second = controller.start(10.0, &mut scheduler).unwrap();
    assert_ne!(first, second);

    // an in-flight tick of the first loop arrives after the restart
    assert_eq!(
        controller.on_frame(first, 20.0, &probe, &mut scheduler).unwrap(),
        None
    );
    assert_eq!(scheduler.pending(), 1, "stale tick must not reschedule");
    assert_eq!(scheduler.take_due()[0].1, second);
}

#[test]
fn no_callbacks_after_stop() {
    let mut controller = PerformanceController::new(MonitorConfig::default()).unwrap();
    let mut scheduler = QueuedScheduler::new();
    let probe = Visibility::fully_visible();

    let token = controller.start(0.0, &mut scheduler).unwrap();
    for (_, t) in scheduler.take_due() {
        controller.on_frame(t, 16.0, &probe, &mut scheduler).unwrap();
    }
    controller.stop(&mut scheduler);
    assert_eq!(scheduler.pending(), 0);

    // at most one stray tick may still land; it is dropped
    assert_eq!(
        controller.on_frame(token, 32.0, &probe, &mut scheduler).unwrap(),
        None
    );
    assert_eq!(scheduler.pending(), 0);
    controller.stop(&mut scheduler);
}

#[test]
fn low_fps_in_development_does_not_interrupt_loop() {
    let cfg = MonitorConfig::default().with_mode(ExecutionMode::Development);
    let mut controller = PerformanceController::new(cfg).unwrap();
    let mut scheduler = QueuedScheduler::new();
    controller.start(0.0, &mut scheduler).unwrap();
    let reports = drive(
        &mut controller,
        &mut scheduler,
        &Visibility::fully_visible(),
        &[
            Segment {
                interval_ms: 50.0,
                frames: 20,
            },
            Segment {
                interval_ms: 50.0,
                frames: 20,
            },
        ],
        0.0,
    );
    assert_eq!(reports.len(), 2);
    assert!(controller.is_running());
    assert_eq!(controller.average_fps(), 20.0);
    assert!(controller.is_stable());
}

#[test]
fn restart_continues_token_sequence() {
    let mut controller = PerformanceController::new(MonitorConfig::default()).unwrap();
    let mut scheduler = QueuedScheduler::new();
    assert_eq!(controller.start(0.0, &mut scheduler).unwrap(), LoopToken(0));
    controller.stop(&mut scheduler);
    assert_eq!(controller.start(0.0, &mut scheduler).unwrap(), LoopToken(1));
}
