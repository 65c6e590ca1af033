//! Shared fixtures for capture integration tests.

use std::cell::RefCell;
use std::future::{Future, ready};
use std::time::Duration;

use faceid_capture::SettleTimer;
use faceid_compress::{CompressError, Quality, StillEncoder};
use faceid_core::{EncodedImage, Frame, JPEG_DATA_URL_PREFIX};

/// Timer that resolves immediately and records requested delays.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingTimer {
    pub delays: RefCell<Vec<Duration>>,
}

impl SettleTimer for RecordingTimer {
    fn settle(&self, delay: Duration) -> impl Future<Output = ()> {
        self.delays.borrow_mut().push(delay);
        ready(())
    }
}

/// Encoder producing a payload of fixed size regardless of quality.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeEncoder {
    pub size_kb: f64,
}

impl StillEncoder for FixedSizeEncoder {
    fn encode(&self, frame: &Frame, quality: Quality) -> Result<EncodedImage, CompressError> {
        let payload_chars = (self.size_kb * 1024.0 / 0.75).ceil() as usize;
        Ok(EncodedImage::from_data_url(
            format!("{JPEG_DATA_URL_PREFIX}{}", "A".repeat(payload_chars)),
            frame.width,
            frame.height,
            quality.as_fraction(),
        )?)
    }
}

/// Encoder that always fails.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct BrokenEncoder;

impl StillEncoder for BrokenEncoder {
    fn encode(&self, _frame: &Frame, _quality: Quality) -> Result<EncodedImage, CompressError> {
        Err(CompressError::Encode("codec unavailable".to_string()))
    }
}
