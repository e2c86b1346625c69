use super::*;

#[test]
fn equal_clips_use_min_of_duration_and_count() {
    assert_eq!(reconcile(120, 120, 0, 3600).length, 120);
    assert_eq!(reconcile(120, 120, 0, 50).length, 50);
    assert_eq!(reconcile(120, 120, 10, 120).length, 120);
}

#[test]
fn unequal_clips_use_first_clip_only() {
    // Shorter second clip: still the first clip's length.
    assert_eq!(reconcile(300, 100, 0, 3600).length, 300);
    // Longer second clip: its tail is cut.
    assert_eq!(reconcile(100, 300, 0, 3600).length, 100);
    assert_eq!(reconcile(100, 300, 0, 80).length, 80);
    assert_eq!(nominal_total(7, 9), 7);
}

#[test]
fn start_offsets_the_window_without_shortening_it() {
    let w = reconcile(100, 100, 40, 3600);
    assert_eq!(w.start, FrameIndex(40));
    assert_eq!(w.length, 100);
    assert_eq!(w.range(), FrameRange::from_start_len(FrameIndex(40), 100));
    assert_eq!(w.last(), Some(FrameIndex(139)));
}

#[test]
fn zero_duration_is_an_empty_window() {
    let w = reconcile(100, 100, 5, 0);
    assert!(w.is_empty());
    assert_eq!(w.last(), None);
}
