use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.last(), Some(FrameIndex(4)));
}

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
    let empty = FrameRange::from_start_len(FrameIndex(7), 0);
    assert!(empty.is_empty());
    assert_eq!(empty.last(), None);
    assert_eq!(empty.frames().count(), 0);
}

#[test]
fn fps_from_frame_time_rounds_to_whole_rate() {
    let fps = Fps::from_frame_time(0.033333).unwrap();
    assert_eq!(fps, Fps { num: 30, den: 1 });
    assert!(Fps::from_frame_time(0.0).is_err());
    assert!(Fps::from_frame_time(f64::NAN).is_err());
    assert!((fps.frames_to_secs(90) - 3.0).abs() < 1e-9);
}

#[test]
fn resolution_validation() {
    assert!(Resolution::new(0, 10).is_err());
    assert!(Resolution::new(70_000, 10).is_err());
    let r = Resolution::new(480, 270).unwrap();
    assert!(r.is_even());
    assert!(!Resolution::new(481, 270).unwrap().is_even());
    assert_eq!(r.to_string(), "480x270");
}

#[test]
fn premul_shading_keeps_alpha() {
    let c = Rgba8Premul::from_unit_rgba([1.0, 0.5, 0.0, 1.0]);
    assert_eq!(c, Rgba8Premul { r: 255, g: 128, b: 0, a: 255 });
    let s = c.shade(0.5);
    assert_eq!(s.a, 255);
    assert_eq!(s.r, 128);
}
