//! Benchmark smoke test for the capture compression ladder.

use std::time::Instant;

use faceid_compress::{JpegStillEncoder, compress};
use faceid_core::{CAPTURE_TARGET_KB, DEFAULT_TARGET_KB, Frame, MAX_HEIGHT, MAX_WIDTH};

fn camera_frame(width: u32, height: u32, seed: u32) -> Frame {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let noise = (x.wrapping_mul(31) ^ y.wrapping_mul(17) ^ seed) as u8;
            rgba.extend_from_slice(&[(x % 256) as u8, (y % 256) as u8, noise, 255]);
        }
    }
    Frame::new(width, height, rgba).expect("frame should be valid")
}

#[test]
fn benchmark_compression_smoke_prints_latency() {
    let frames: Vec<Frame> = (0..4).map(|seed| camera_frame(1280, 720, seed)).collect();

    let start = Instant::now();
    let mut total_kb = 0.0;
    let mut total_attempts = 0usize;

    for frame in frames.iter().cycle().take(12) {
        let outcome =
            compress(frame, CAPTURE_TARGET_KB, &JpegStillEncoder).expect("frame should compress");
        assert!(outcome.image.width <= MAX_WIDTH && outcome.image.height <= MAX_HEIGHT);
        total_kb += outcome.estimated_kb;
        total_attempts += outcome.attempts.len();
    }

    let elapsed_ms = start.elapsed().as_millis();
    println!("benchmark_compression_elapsed_ms={elapsed_ms}");
    println!("benchmark_compression_total_kb={total_kb:.2}");
    println!("benchmark_compression_total_attempts={total_attempts}");

    // Lightweight guardrail; strict latency checks are environment-specific.
    assert!(
        elapsed_ms < 10_000,
        "compression smoke benchmark should stay bounded"
    );
}

#[test]
fn benchmark_tight_budget_walks_more_of_the_ladder() {
    let frame = camera_frame(640, 480, 7);

    let relaxed = compress(&frame, CAPTURE_TARGET_KB, &JpegStillEncoder).expect("compress");
    let tight = compress(&frame, DEFAULT_TARGET_KB / 10.0, &JpegStillEncoder).expect("compress");

    println!(
        "benchmark_ladder_attempts relaxed={} tight={}",
        relaxed.attempts.len(),
        tight.attempts.len()
    );
    assert!(tight.attempts.len() >= relaxed.attempts.len());
    assert!(tight.estimated_kb <= relaxed.estimated_kb);
}
