//! Unit tests for timer.rs

use crate::timer::FrameTimer;
use std::thread;
use std::time::Duration;

#[test]
fn test_new_timer_starts_at_zero() {
    let timer = FrameTimer::new();
    assert_eq!(timer.elapsed(), 0.0);
    assert_eq!(timer.frame_time(), 0.0);
}

#[test]
fn test_frame_advances_elapsed() {
    let mut timer = FrameTimer::new();

    thread::sleep(Duration::from_millis(5));
    let dt = timer.frame();

    assert!(dt > 0.0);
    assert_eq!(timer.frame_time(), dt);
    assert!(timer.elapsed() >= dt);
}

#[test]
fn test_successive_frames_accumulate() {
    let mut timer = FrameTimer::new();

    thread::sleep(Duration::from_millis(2));
    timer.frame();
    let first_elapsed = timer.elapsed();

    thread::sleep(Duration::from_millis(2));
    timer.frame();

    assert!(timer.elapsed() > first_elapsed);
}

#[test]
fn test_reset_clears_state() {
    let mut timer = FrameTimer::new();

    thread::sleep(Duration::from_millis(2));
    timer.frame();
    assert!(timer.elapsed() > 0.0);

    timer.reset();
    assert_eq!(timer.elapsed(), 0.0);
    assert_eq!(timer.frame_time(), 0.0);
}

#[test]
fn test_frame_external_uses_supplied_time() {
    let mut timer = FrameTimer::new();

    let dt1 = timer.frame_external(0.25);
    assert_eq!(dt1, 0.25);
    assert_eq!(timer.elapsed(), 0.25);

    let dt2 = timer.frame_external(0.75);
    assert!((dt2 - 0.5).abs() < 1e-9);
    assert_eq!(timer.elapsed(), 0.75);
}

#[test]
fn test_frame_external_never_reports_negative_delta() {
    let mut timer = FrameTimer::new();

    timer.frame_external(1.0);
    // Host clock went backwards
    let dt = timer.frame_external(0.5);
    assert_eq!(dt, 0.0);
}

#[test]
fn test_default_matches_new() {
    let timer = FrameTimer::default();
    assert_eq!(timer.elapsed(), 0.0);
}
