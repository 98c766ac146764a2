use super::*;

#[test]
fn clamp01_handles_out_of_range_and_nan() {
    assert_eq!(clamp01(-1.0), 0.0);
    assert_eq!(clamp01(0.25), 0.25);
    assert_eq!(clamp01(3.0), 1.0);
    assert_eq!(clamp01(f64::NAN), 0.0);
}

#[test]
fn lerp_hits_endpoints() {
    assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
    assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
    assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
}

#[test]
fn progress_clamps_and_handles_zero_duration() {
    assert_eq!(progress(0.5, 1.0, 2.0), 0.0);
    assert_eq!(progress(2.0, 1.0, 2.0), 0.5);
    assert_eq!(progress(9.0, 1.0, 2.0), 1.0);
    assert_eq!(progress(0.99, 1.0, 0.0), 0.0);
    assert_eq!(progress(1.0, 1.0, 0.0), 1.0);
}

#[test]
fn approx_eq_respects_epsilon() {
    assert!(approx_eq(1.0, 1.0 + 1e-12, 1e-9));
    assert!(!approx_eq(1.0, 1.001, 1e-9));
}
