use fodtrack_rs::{
    AssociationStrategy, DensifyMode, DetectorSource, PipelineConfig, PixelBox, RawDetection,
    TrackConfig, VideoPipeline,
};

/// Detector returning a scripted set of detections per call.
struct ScriptedDetector {
    per_frame: Vec<Vec<RawDetection>>,
    calls: usize,
}

impl ScriptedDetector {
    fn new(per_frame: Vec<Vec<RawDetection>>) -> Self {
        Self {
            per_frame,
            calls: 0,
        }
    }
}

impl DetectorSource for ScriptedDetector {
    type Error = std::convert::Infallible;

    fn detect(
        &mut self,
        _input: &[u8],
        _width: u32,
        _height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error> {
        let dets = self.per_frame.get(self.calls).cloned().unwrap_or_default();
        self.calls += 1;
        Ok(dets)
    }
}

/// A tracked detection at `x_percent` of a 1000x1000 image, 5% wide.
fn moving_det(x_percent: f32, track_id: u64) -> RawDetection {
    let x1 = x_percent * 10.0;
    RawDetection {
        bbox: PixelBox::new(x1, 400.0, x1 + 50.0, 450.0),
        confidence: 0.9,
        class_id: 0,
        mask: None,
        track_id: Some(track_id),
    }
}

fn interpolated_config() -> PipelineConfig {
    PipelineConfig {
        // alpha 1.0 makes smoothed positions equal raw ones, so the
        // interpolation path can be checked against exact values
        track: TrackConfig {
            alpha: 1.0,
            max_age: 5,
        },
        association: AssociationStrategy::ExternalIds,
        densify: DensifyMode::Interpolated,
        class_names: vec!["FOD".to_owned()],
        ..PipelineConfig::default()
    }
}

#[test]
fn test_linear_motion_interpolates_and_expires() {
    // One object moving 0% -> 50% between sampled frames 0 and 5, then
    // holding at 50% through frame 10. Sampling stride 5, 30 total frames.
    let detector = ScriptedDetector::new(vec![
        vec![moving_det(0.0, 1)],
        vec![moving_det(50.0, 1)],
        vec![moving_det(50.0, 1)],
    ]);
    let mut pipeline = VideoPipeline::new(detector, interpolated_config());

    for frame in [0, 5, 10] {
        pipeline.process_sampled_frame(&[], 1000, 1000, frame).unwrap();
    }
    let report = pipeline.finish(30, 30.0);
    assert_eq!(report.frames.len(), 30);

    // Interpolated positions between the first two samples
    for frame in 1..5usize {
        let dets = &report.frames[frame].detections;
        assert_eq!(dets.len(), 1, "frame {frame}");
        let expected = frame as f32 * 10.0;
        assert!(
            (dets[0].bbox.x - expected).abs() < 1e-3,
            "frame {frame}: x = {}, expected {expected}",
            dets[0].bbox.x
        );
    }

    // Stationary between samples 5 and 10, held through 15
    for frame in 6..=15usize {
        let dets = &report.frames[frame].detections;
        assert_eq!(dets.len(), 1, "frame {frame}");
        assert!((dets[0].bbox.x - 50.0).abs() < 1e-3, "frame {frame}");
    }

    // Suppressed from 10 + max_age + 1 onward: no ghost objects
    for frame in 16..30usize {
        assert!(report.frames[frame].detections.is_empty(), "frame {frame}");
    }

    assert_eq!(report.summary.unique_tracks, 1);
    assert_eq!(report.meta.processed_frames, 3);
    assert_eq!(report.meta.total_frames, 30);
    assert!((report.meta.duration - 1.0).abs() < 1e-9);
    assert!((report.frames[15].time - 0.5).abs() < 1e-9);
}

#[test]
fn test_empty_detector_output_yields_anomaly_record() {
    let detector = ScriptedDetector::new(vec![vec![]]);
    let mut pipeline = VideoPipeline::new(detector, interpolated_config());
    pipeline.process_sampled_frame(&[], 1000, 1000, 0).unwrap();
    let report = pipeline.finish(3, 30.0);

    let dets = &report.frames[0].detections;
    assert_eq!(dets.len(), 1);
    assert_eq!(dets[0].label, "Anomalie");
    assert_eq!(dets[0].alert_level, 1);
    assert!(dets[0].is_anomaly);

    // The placeholder is untracked, so it never counts as a track
    assert_eq!(report.summary.unique_tracks, 0);
    assert_eq!(report.summary.class_counts["Anomalie"], 3);
    assert_eq!(report.summary.max_alert_level, 1);
    assert!(!report.summary.has_danger_alert);
}

#[test]
fn test_large_object_raises_danger_alert() {
    // A 300x300 px object on a 1000x1000 image estimates at the 30 cm
    // ceiling, well inside the danger band.
    let big = RawDetection {
        bbox: PixelBox::new(100.0, 100.0, 400.0, 400.0),
        confidence: 0.9,
        class_id: 0,
        mask: None,
        track_id: Some(1),
    };
    let detector = ScriptedDetector::new(vec![vec![big]]);
    let mut pipeline = VideoPipeline::new(detector, interpolated_config());
    pipeline.process_sampled_frame(&[], 1000, 1000, 0).unwrap();
    let report = pipeline.finish(1, 30.0);

    let det = &report.frames[0].detections[0];
    assert_eq!(det.alert_level, 3);
    assert_eq!(det.risk_level, "High");
    assert_eq!(det.alert_type, "DANGER");
    assert!(report.summary.has_danger_alert);
    assert_eq!(report.summary.max_alert_level, 3);
}

#[test]
fn test_low_confidence_demotes_alert() {
    let big = RawDetection {
        bbox: PixelBox::new(100.0, 100.0, 400.0, 400.0),
        confidence: 0.4,
        class_id: 0,
        mask: None,
        track_id: Some(1),
    };
    let detector = ScriptedDetector::new(vec![vec![big]]);
    let mut pipeline = VideoPipeline::new(detector, interpolated_config());
    pipeline.process_sampled_frame(&[], 1000, 1000, 0).unwrap();
    let report = pipeline.finish(1, 30.0);

    assert_eq!(report.frames[0].detections[0].alert_level, 2);
    assert!(!report.summary.has_danger_alert);
}

#[test]
fn test_rerun_on_same_stream_is_deterministic() {
    let run = || {
        let detector = ScriptedDetector::new(vec![
            vec![moving_det(0.0, 1)],
            vec![moving_det(20.0, 1), moving_det(70.0, 2)],
            vec![moving_det(40.0, 1)],
        ]);
        let mut pipeline = VideoPipeline::new(detector, interpolated_config());
        for frame in [0, 5, 10] {
            pipeline.process_sampled_frame(&[], 1000, 1000, frame).unwrap();
        }
        pipeline.finish(20, 25.0)
    };

    assert_eq!(run(), run());
}

#[test]
fn test_builtin_associator_keeps_identity_without_upstream_ids() {
    let mut first = moving_det(10.0, 1);
    first.track_id = None;
    let mut second = moving_det(11.0, 1);
    second.track_id = None;

    let detector = ScriptedDetector::new(vec![vec![first], vec![second]]);
    let config = PipelineConfig {
        association: AssociationStrategy::BuiltinIou,
        densify: DensifyMode::Interpolated,
        class_names: vec!["FOD".to_owned()],
        ..PipelineConfig::default()
    };
    let mut pipeline = VideoPipeline::new(detector, config);
    pipeline.process_sampled_frame(&[], 1000, 1000, 0).unwrap();
    pipeline.process_sampled_frame(&[], 1000, 1000, 5).unwrap();
    let report = pipeline.finish(6, 30.0);

    assert_eq!(report.summary.unique_tracks, 1);
    let id0 = report.frames[0].detections[0].track_id;
    let id5 = report.frames[5].detections[0].track_id;
    assert!(id0.is_some());
    assert_eq!(id0, id5);
}

#[test]
fn test_hold_mode_returns_only_sampled_frames() {
    let detector = ScriptedDetector::new(vec![
        vec![moving_det(0.0, 1)],
        vec![moving_det(10.0, 1)],
    ]);
    let config = PipelineConfig {
        association: AssociationStrategy::ExternalIds,
        densify: DensifyMode::Hold,
        ..PipelineConfig::default()
    };
    let mut pipeline = VideoPipeline::new(detector, config);
    pipeline.process_sampled_frame(&[], 1000, 1000, 0).unwrap();
    pipeline.process_sampled_frame(&[], 1000, 1000, 5).unwrap();
    let report = pipeline.finish(30, 30.0);

    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.frames[1].frame, 5);
    assert_eq!(report.meta.total_frames, 30);
}
