//! End-to-end behavior of the gyroscope acquisition pipeline against a
//! scripted event source and a temporary sysfs control directory.

use std::fs;
use std::io;

use approx::assert_relative_eq;
use gyro_hal::control::{SYSFS_ENABLE, SYSFS_POLL_DELAY};
use gyro_hal::input::{EV_SYN, GYRO_RAD_PER_LSB};
use gyro_hal::test_util::{axis, device_time, reading_at, report, ScriptedSource};
use gyro_hal::{
    CalibrationAlgorithm, CalibrationError, ControlFiles, GyroAlgoArgs, GyroAxis, GyroConfig,
    GyroError, GyroReading, GyroSensor, InputEvent, ManualClock, MetaDataKind, Properties,
    SensorEvent, SensorStatus, SensorType, Vector3,
};
use tempfile::TempDir;

struct Bench {
    dir: TempDir,
    clock: ManualClock,
    props: Properties,
}

impl Bench {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SYSFS_ENABLE), "").unwrap();
        fs::write(dir.path().join(SYSFS_POLL_DELAY), "").unwrap();
        Self {
            dir,
            clock: ManualClock::new(0, 0),
            props: Properties::new(),
        }
    }

    /// Bench whose control directory has no attributes at all.
    fn without_control_files() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            clock: ManualClock::new(0, 0),
            props: Properties::new(),
        }
    }

    fn sensor(
        &self,
        source: ScriptedSource,
        algorithm: Option<Box<dyn CalibrationAlgorithm>>,
    ) -> GyroSensor<ScriptedSource> {
        GyroSensor::new(
            source,
            ControlFiles::new(self.dir.path()),
            &GyroConfig::default(),
            self.props.clone(),
            Box::new(self.clock.clone()),
            algorithm,
        )
    }

    fn enable_file(&self) -> String {
        fs::read_to_string(self.dir.path().join(SYSFS_ENABLE)).unwrap()
    }
}

fn slots() -> [SensorEvent; 8] {
    [SensorEvent::default(); 8]
}

fn converted(values: [i32; 3]) -> Vector3 {
    Vector3::new(
        GyroAxis::X.to_rad_per_sec(values[0]),
        GyroAxis::Y.to_rad_per_sec(values[1]),
        GyroAxis::Z.to_rad_per_sec(values[2]),
    )
}

/// Seed reading at t=1.0s followed by `values` at t=1.1s, in one fill.
fn seeded_then(values: [i32; 3]) -> ScriptedSource {
    let mut source = ScriptedSource::new();
    let mut events = reading_at([0, 0, 0], 1, 0);
    events.extend(reading_at(values, 1, 100_000));
    source.push_fill(events);
    source
}

struct Doubler;

impl CalibrationAlgorithm for Doubler {
    fn configure(&mut self, _args: &GyroAlgoArgs) -> Result<(), CalibrationError> {
        Ok(())
    }

    fn convert(&mut self, raw: &GyroReading) -> Result<GyroReading, CalibrationError> {
        let r = raw.rate;
        Ok(GyroReading {
            rate: Vector3::new(r.x * 2.0, r.y * 2.0, r.z * 2.0),
            status: SensorStatus::AccuracyMedium,
            timestamp: raw.timestamp,
        })
    }
}

struct FailingConvert;

impl CalibrationAlgorithm for FailingConvert {
    fn configure(&mut self, _args: &GyroAlgoArgs) -> Result<(), CalibrationError> {
        Ok(())
    }

    fn convert(&mut self, _raw: &GyroReading) -> Result<GyroReading, CalibrationError> {
        Err(CalibrationError::Convert("not converged".to_string()))
    }
}

/// Refuses to run without stored calibration.
struct NeedsBias;

impl CalibrationAlgorithm for NeedsBias {
    fn configure(&mut self, args: &GyroAlgoArgs) -> Result<(), CalibrationError> {
        if args.bias.offset == [0.0; 3] {
            return Err(CalibrationError::Configure("no prior calibration".to_string()));
        }
        Ok(())
    }

    fn convert(&mut self, _raw: &GyroReading) -> Result<GyroReading, CalibrationError> {
        panic!("convert must not run after a failed configure");
    }
}

#[test]
fn test_transform_output_and_raw_duplicate() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(seeded_then([100, -50, 200]), Some(Box::new(Doubler)));
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);

    let event = out[0];
    assert_eq!(event.sensor_type, SensorType::Gyroscope);
    assert_eq!(event.sensor, gyro.sensor().handle);
    assert_eq!(event.timestamp, 1_100_000_000);

    let raw = converted([100, -50, 200]);
    let sample = event.gyro_sample().unwrap();
    assert_eq!(sample.uncalibrated, raw);
    assert_eq!(sample.calibrated, Vector3::new(raw.x * 2.0, raw.y * 2.0, raw.z * 2.0));
    assert_eq!(sample.status, SensorStatus::AccuracyMedium);
}

#[test]
fn test_failed_conversion_reports_raw_values() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(seeded_then([100, -50, 200]), Some(Box::new(FailingConvert)));
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    let sample = out[0].gyro_sample().unwrap();
    assert_eq!(sample.calibrated, converted([100, -50, 200]));
    assert_eq!(sample.uncalibrated, converted([100, -50, 200]));
    assert_eq!(sample.status, SensorStatus::AccuracyHigh);
}

#[test]
fn test_no_transform_applies_unit_conversion_only() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(seeded_then([100, -50, 200]), None);
    let mut out = slots();

    assert!(!gyro.calibration_active());
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);

    let sample = out[0].gyro_sample().unwrap();
    assert_relative_eq!(sample.calibrated.x as f64, -100.0 * GYRO_RAD_PER_LSB, epsilon = 1e-6);
    assert_relative_eq!(sample.calibrated.y as f64, -50.0 * GYRO_RAD_PER_LSB, epsilon = 1e-6);
    assert_relative_eq!(sample.calibrated.z as f64, -200.0 * GYRO_RAD_PER_LSB, epsilon = 1e-6);
    assert_eq!(sample.uncalibrated, sample.calibrated);
}

#[test]
fn test_zero_calibration_data_swallows_configure_failure() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(seeded_then([100, -50, 200]), Some(Box::new(NeedsBias)));
    let mut out = slots();

    assert!(!gyro.calibration_active());
    assert!(gyro.is_enabled());
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);

    let sample = out[0].gyro_sample().unwrap();
    assert_eq!(sample.calibrated, converted([100, -50, 200]));
    assert_eq!(sample.uncalibrated, converted([100, -50, 200]));
}

#[test]
fn test_stored_bias_reaches_algorithm() {
    struct Subtract([f32; 3]);
    impl CalibrationAlgorithm for Subtract {
        fn configure(&mut self, args: &GyroAlgoArgs) -> Result<(), CalibrationError> {
            self.0 = args.bias.offset;
            Ok(())
        }
        fn convert(&mut self, raw: &GyroReading) -> Result<GyroReading, CalibrationError> {
            let r = raw.rate;
            Ok(GyroReading {
                rate: Vector3::new(r.x - self.0[0], r.y - self.0[1], r.z - self.0[2]),
                ..*raw
            })
        }
    }

    let bench = Bench::new();
    let calibration = bench.dir.path().join("calibration.json");
    fs::write(
        &calibration,
        r#"[{ "name": "gyroscope", "offset": [0.5, 0.25, -1.0] }]"#,
    )
    .unwrap();
    let config = GyroConfig {
        calibration_file: Some(calibration),
        ..GyroConfig::default()
    };

    let mut gyro = GyroSensor::new(
        seeded_then([0, 0, 0]),
        ControlFiles::new(bench.dir.path()),
        &config,
        bench.props.clone(),
        Box::new(bench.clock.clone()),
        Some(Box::new(Subtract([0.0; 3]))),
    );
    let mut out = slots();

    assert!(gyro.calibration_active());
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    let sample = out[0].gyro_sample().unwrap();
    assert_eq!(sample.calibrated, Vector3::new(-0.5, -0.25, 1.0));
    assert_eq!(sample.uncalibrated, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn test_disabled_sensor_emits_nothing() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    for i in 0..4 {
        source.push_fill(reading_at([1, 2, 3], 1, i * 100_000));
    }
    let mut gyro = bench.sensor(source, None);
    gyro.enable(false).unwrap();
    assert_eq!(bench.enable_file(), "0");
    assert_eq!(gyro.ignore_until_ns(), 0);

    let mut out = slots();
    for _ in 0..4 {
        assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    }
    // Events were still drained.
    assert_eq!(gyro.source().remaining_fills(), 0);
    assert_eq!(gyro.source().buffered(), 0);
}

#[test]
fn test_disable_mid_reading_discards_it() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    source.push_fill(vec![axis(GyroAxis::X, 5), axis(GyroAxis::Y, 6)]);
    source.push_fill(vec![]);
    source.push_fill(vec![axis(GyroAxis::Z, 7), report(2, 0)]);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    gyro.enable(false).unwrap();
    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    assert_eq!(gyro.source().buffered(), 0);
}

#[test]
fn test_drop_gate_thresholds() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    let mut events = Vec::new();
    for usec in [0, 20_000, 30_000, 31_000, 40_000] {
        events.extend(reading_at([1, 1, 1], 1, usec));
    }
    source.push_fill(events);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 2);
    assert_eq!(out[0].timestamp, 1_031_000_000);
    assert_eq!(out[1].timestamp, 1_040_000_000);
}

#[test]
fn test_delay_change_restarts_drop_gate() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    let mut events = reading_at([1, 1, 1], 1, 0);
    events.extend(reading_at([1, 1, 1], 1, 100_000));
    source.push_fill(events);
    let mut events = reading_at([2, 2, 2], 2, 0);
    events.extend(reading_at([2, 2, 2], 2, 50_000));
    source.push_fill(events);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);

    gyro.set_delay(10_500_000).unwrap();
    assert_eq!(
        fs::read_to_string(bench.dir.path().join(SYSFS_POLL_DELAY)).unwrap(),
        "10"
    );

    // 2.0s seeds a fresh marker, so only 2.05s comes out.
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].timestamp, 2_050_000_000);
}

#[test]
fn test_without_delay_change_marker_persists() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    let mut events = reading_at([1, 1, 1], 1, 0);
    events.extend(reading_at([1, 1, 1], 1, 100_000));
    source.push_fill(events);
    source.push_fill(reading_at([2, 2, 2], 2, 0));
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].timestamp, 2_000_000_000);
}

#[test]
fn test_settle_deadline_discards_early_readings() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    let mut events = reading_at([1, 1, 1], 0, 200_000);
    events.extend(reading_at([1, 1, 1], 0, 400_000));
    events.extend(reading_at([1, 1, 1], 0, 500_000));
    source.push_fill(events);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.ignore_until_ns(), 350_000_000);
    // 0.2s is before the deadline, 0.4s seeds the drop gate, 0.5s is emitted.
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].timestamp, 500_000_000);
}

#[test]
fn test_enable_is_idempotent() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(ScriptedSource::new(), None);
    assert_eq!(bench.enable_file(), "1");

    // A second write would fail now that the attribute is gone.
    fs::remove_file(bench.dir.path().join(SYSFS_ENABLE)).unwrap();
    gyro.enable(true).unwrap();
    gyro.enable(true).unwrap();
    assert!(gyro.is_enabled());
}

#[test]
fn test_enable_failure_keeps_state() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(ScriptedSource::new(), None);
    fs::remove_file(bench.dir.path().join(SYSFS_ENABLE)).unwrap();

    let err = gyro.enable(false).unwrap_err();
    assert!(matches!(err, GyroError::ControlFile { .. }));
    assert!(err.errno() < 0);
    assert!(gyro.is_enabled());
}

#[test]
fn test_delay_failure_is_reported() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(ScriptedSource::new(), None);
    fs::remove_file(bench.dir.path().join(SYSFS_POLL_DELAY)).unwrap();

    assert!(matches!(
        gyro.set_delay(20_000_000),
        Err(GyroError::ControlFile { .. })
    ));
    assert!(matches!(
        gyro.set_delay(-1),
        Err(GyroError::InvalidArgument(_))
    ));
}

#[test]
fn test_loopback_never_touches_control_files() {
    let bench = Bench::without_control_files();
    bench.props.set_loopback(true);
    let mut gyro = bench.sensor(ScriptedSource::new(), None);

    assert!(gyro.is_enabled());
    assert_eq!(gyro.ignore_until_ns(), 0);

    gyro.set_delay(5_000_000).unwrap();
    gyro.enable(false).unwrap();
    assert!(!gyro.is_enabled());
    gyro.enable(true).unwrap();
    assert!(gyro.is_enabled());

    assert_eq!(fs::read_dir(bench.dir.path()).unwrap().count(), 0);
}

#[test]
fn test_loopback_is_read_at_call_time() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(ScriptedSource::new(), None);
    assert_eq!(bench.enable_file(), "1");

    bench.props.set_loopback(true);
    gyro.enable(false).unwrap();
    assert!(!gyro.is_enabled());
    assert_eq!(bench.enable_file(), "1");

    bench.props.set_loopback(false);
    gyro.enable(true).unwrap();
    assert_eq!(bench.enable_file(), "1");
    assert_eq!(gyro.ignore_until_ns(), 350_000_000);
}

#[test]
fn test_split_reading_is_returned_in_one_call() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    source.push_fill(reading_at([0, 0, 0], 1, 0));
    source.push_fill(vec![]);
    source.push_fill(vec![
        axis(GyroAxis::X, 10),
        axis(GyroAxis::Y, 20),
        axis(GyroAxis::Z, 30),
    ]);
    source.push_fill(vec![report(1, 500_000)]);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    assert_eq!(gyro.source().fill_calls(), 2);

    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(gyro.source().fill_calls(), 4);
    assert_eq!(out[0].gyro_sample().unwrap().uncalibrated, converted([10, 20, 30]));
}

#[test]
fn test_retry_is_bounded_to_one_fill() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    source.push_fill(reading_at([0, 0, 0], 1, 0));
    source.push_fill(vec![]);
    source.push_fill(vec![axis(GyroAxis::X, 1)]);
    source.push_fill(vec![axis(GyroAxis::Y, 2)]);
    source.push_fill(vec![axis(GyroAxis::Z, 3), report(1, 500_000)]);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    assert_eq!(gyro.source().remaining_fills(), 1);
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].gyro_sample().unwrap().uncalibrated, converted([1, 2, 3]));
}

#[test]
fn test_no_retry_while_disabled() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    source.push_fill(vec![axis(GyroAxis::X, 1)]);
    source.push_fill(reading_at([1, 1, 1], 1, 0));
    let mut gyro = bench.sensor(source, None);
    gyro.enable(false).unwrap();
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    assert_eq!(gyro.source().fill_calls(), 1);
}

#[test]
fn test_fill_error_propagates() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    source.push_fill_error(io::ErrorKind::BrokenPipe);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    match gyro.read_events(&mut out) {
        Err(GyroError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("Expected Io error, got {other:?}"),
    }
}

#[test]
fn test_retry_fill_error_propagates() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    source.push_fill(vec![axis(GyroAxis::X, 1)]);
    source.push_fill_error(io::ErrorKind::UnexpectedEof);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert!(matches!(gyro.read_events(&mut out), Err(GyroError::Io(_))));
}

#[test]
fn test_quota_limits_output() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    let mut events = Vec::new();
    for i in 0..5 {
        events.extend(reading_at([i, i, i], 1, i as i64 * 100_000));
    }
    source.push_fill(events);
    let mut gyro = bench.sensor(source, None);
    let mut out = [SensorEvent::default(); 2];

    assert_eq!(gyro.read_events(&mut out).unwrap(), 2);
    assert_eq!(out[0].timestamp, 1_100_000_000);
    assert_eq!(out[1].timestamp, 1_200_000_000);

    // The rest stays buffered for the next call.
    assert_eq!(gyro.read_events(&mut out).unwrap(), 2);
    assert_eq!(out[0].timestamp, 1_300_000_000);
    assert_eq!(out[1].timestamp, 1_400_000_000);
}

#[test]
fn test_device_timestamp_and_clock_offset() {
    let bench = Bench::new();
    bench.clock.set_offset(100_000_000_000);
    let mut source = ScriptedSource::new();
    let mut events = vec![axis(GyroAxis::X, 1)];
    events.extend(device_time(101, 0));
    events.push(report(0, 0));
    events.push(axis(GyroAxis::X, 2));
    events.extend(device_time(101, 500_000_000));
    events.push(report(0, 0));
    source.push_fill(events);
    let mut gyro = bench.sensor(source, None);
    assert_eq!(gyro.clock_offset_ns(), 100_000_000_000);

    // Offset is latched at enable time only.
    bench.clock.set_offset(7);

    let mut out = slots();
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].timestamp, 1_500_000_000);
}

#[test]
fn test_latest_seconds_pair_wins() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    let mut events = reading_at([0, 0, 0], 1, 0);
    events.extend(device_time(5, 1));
    events.extend(device_time(6, 2));
    events.push(report(0, 0));
    source.push_fill(events);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].timestamp, 6_000_000_002);
}

#[test]
fn test_device_time_applies_per_reading() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    let mut events = vec![axis(GyroAxis::X, 1)];
    events.extend(device_time(1, 0));
    events.push(report(50, 0));
    events.extend(reading_at([1, 1, 1], 2, 0));
    source.push_fill(events);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    // The second reading has no device markers and falls back to its input core time.
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].timestamp, 2_000_000_000);
}

#[test]
fn test_unknown_events_are_skipped() {
    let bench = Bench::new();
    let mut source = ScriptedSource::new();
    let mut events = reading_at([0, 0, 0], 1, 0);
    events.push(axis(GyroAxis::X, 9));
    events.push(InputEvent::new(0x01, 116, 1));
    events.push(InputEvent::new(0x03, 0x00, 77));
    events.push(InputEvent::new(EV_SYN, 2, 0));
    events.push(report(1, 100_000));
    source.push_fill(events);
    let mut gyro = bench.sensor(source, None);
    let mut out = slots();

    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].gyro_sample().unwrap().uncalibrated.x, GyroAxis::X.to_rad_per_sec(9));
}

#[test]
fn test_initial_state_is_pending_before_any_event() {
    let bench = Bench::new();
    let source = ScriptedSource::new().with_abs_state([100, -50, 200]);
    let mut gyro = bench.sensor(source, None);
    assert!(gyro.has_pending_events());

    bench.clock.set_now(5_000_000_000);
    let mut out = slots();
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].timestamp, 5_000_000_000);
    assert_eq!(out[0].gyro_sample().unwrap().calibrated, converted([100, -50, 200]));
    assert_eq!(gyro.source().fill_calls(), 0);
    assert!(!gyro.has_pending_events());
}

#[test]
fn test_initial_state_is_not_seeded_when_query_fails() {
    let bench = Bench::new();
    let gyro = bench.sensor(ScriptedSource::new(), None);
    assert!(!gyro.has_pending_events());
}

#[test]
fn test_flush_record_has_priority() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(seeded_then([1, 2, 3]), None);
    gyro.flush().unwrap();
    assert!(gyro.has_pending_events());

    bench.clock.set_now(9_000);
    let mut out = slots();
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].sensor_type, SensorType::MetaData);
    assert_eq!(out[0].timestamp, 9_000);
    let meta = out[0].meta_data().unwrap();
    assert_eq!(meta.what, MetaDataKind::FlushComplete);
    assert_eq!(meta.sensor, gyro.sensor().handle);
    assert_eq!(gyro.source().fill_calls(), 0);

    assert!(!gyro.has_pending_events());
    assert_eq!(gyro.read_events(&mut out).unwrap(), 1);
    assert_eq!(out[0].sensor_type, SensorType::Gyroscope);
}

#[test]
fn test_flush_of_disabled_sensor_is_rejected() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(ScriptedSource::new(), None);
    gyro.enable(false).unwrap();
    assert!(matches!(gyro.flush(), Err(GyroError::InvalidArgument(_))));
    assert!(!gyro.has_pending_events());
}

#[test]
fn test_initial_state_of_never_enabled_sensor_counts_zero() {
    let bench = Bench::without_control_files();
    let source = ScriptedSource::new().with_abs_state([100, -50, 200]);
    let mut gyro = bench.sensor(source, None);
    assert!(!gyro.is_enabled());
    assert!(gyro.has_pending_events());

    let mut out = slots();
    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    assert!(!gyro.has_pending_events());
    assert_eq!(gyro.source().fill_calls(), 0);
}

#[test]
fn test_flush_queued_before_disable_counts_zero() {
    let bench = Bench::new();
    let mut gyro = bench.sensor(ScriptedSource::new(), None);
    gyro.flush().unwrap();
    gyro.enable(false).unwrap();
    assert!(gyro.has_pending_events());

    let mut out = slots();
    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    assert!(!gyro.has_pending_events());
    assert_eq!(gyro.source().fill_calls(), 0);

    // The metadata record was consumed; the next call reads the source.
    assert_eq!(gyro.read_events(&mut out).unwrap(), 0);
    assert_eq!(gyro.source().fill_calls(), 1);
}
