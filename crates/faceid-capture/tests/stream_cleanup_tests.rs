//! Integration tests for page-unload stream teardown.

use faceid_capture::{CaptureController, SyntheticCamera};
use faceid_compress::JpegStillEncoder;
use futures::executor::block_on;

#[test]
fn stream_cleanup_tests_stops_every_track_exactly_once() {
    let camera = SyntheticCamera::new(32, 24).with_tracks(3);
    let mut controller = CaptureController::new(JpegStillEncoder);
    block_on(controller.acquire(&camera)).expect("camera should be granted");

    assert!(controller.dispose());
    assert!(!controller.dispose(), "second unload has nothing to release");
    drop(controller);

    assert_eq!(camera.stop_counts(), vec![vec![1, 1, 1]]);
}

#[test]
fn stream_cleanup_tests_dropping_controller_releases_stream() {
    let camera = SyntheticCamera::new(32, 24);
    {
        let mut controller = CaptureController::new(JpegStillEncoder);
        block_on(controller.acquire(&camera)).expect("camera should be granted");
        controller.capture().expect("capture should succeed");
    }

    assert_eq!(camera.stop_counts(), vec![vec![1]]);
}

#[test]
fn stream_cleanup_tests_reacquire_releases_previous_stream() {
    let camera = SyntheticCamera::new(32, 24);
    let mut controller = CaptureController::new(JpegStillEncoder);
    block_on(controller.acquire(&camera)).expect("camera should be granted");
    block_on(controller.acquire(&camera)).expect("camera should be granted");

    assert_eq!(camera.stop_counts(), vec![vec![1], vec![0]]);
    controller.dispose();
    assert_eq!(camera.stop_counts(), vec![vec![1], vec![1]]);
}
