#![warn(missing_docs)]
//! # faceid-compress
//!
//! ## Purpose
//! Shrinks a captured still until its encoded form fits a size budget.
//!
//! ## Responsibilities
//! - Downscale stills so neither dimension exceeds 640x480.
//! - Walk a fixed, decreasing quality ladder until the encoded estimate fits
//!   the requested budget or the 0.1 floor is reached.
//! - Provide a JPEG encoder backed by the `image` crate.
//!
//! ## Data flow
//! [`faceid_core::Frame`] -> [`downscale`] -> [`StillEncoder::encode`] per
//! ladder step -> [`CompressionOutcome`] carrying the chosen
//! [`faceid_core::EncodedImage`].
//!
//! ## Ownership and lifetimes
//! The ladder borrows the source frame and returns an owned encoded image, so
//! the caller's previously held image is never touched on failure.
//!
//! ## Error model
//! Encoder failures abort the search with [`CompressError`]; a budget that
//! cannot be met is not an error and yields the floor candidate.

use faceid_core::{EncodedImage, Frame, MAX_HEIGHT, MAX_WIDTH};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;
use tracing::info;

/// JPEG quality expressed in tenths (`1..=10`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    /// Lowest quality the ladder will try.
    pub const FLOOR: Quality = Quality(1);
    /// Quality of the first ladder step.
    pub const START: Quality = Quality(7);

    /// Creates a quality from tenths, or `None` outside `1..=10`.
    pub fn from_tenths(tenths: u8) -> Option<Self> {
        (1..=10).contains(&tenths).then_some(Self(tenths))
    }

    /// Returns quality as the `0.0..=1.0` value browser encoders take.
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / 10.0
    }

    /// Returns quality as the `1..=100` value the `image` JPEG encoder takes.
    pub fn as_percent(self) -> u8 {
        self.0 * 10
    }
}

/// Qualities tried, in order, by [`compress`].
pub const QUALITY_LADDER: [Quality; 7] = [
    Quality(7),
    Quality(6),
    Quality(5),
    Quality(4),
    Quality(3),
    Quality(2),
    Quality(1),
];

/// Encodes one still at a given quality.
pub trait StillEncoder {
    /// Encodes `frame` as a JPEG data URL.
    ///
    /// # Errors
    /// Returns [`CompressError::Encode`] when the codec rejects the input.
    fn encode(&self, frame: &Frame, quality: Quality) -> Result<EncodedImage, CompressError>;
}

/// JPEG encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegStillEncoder;

impl StillEncoder for JpegStillEncoder {
    fn encode(&self, frame: &Frame, quality: Quality) -> Result<EncodedImage, CompressError> {
        let rgb = frame.to_rgb();
        let mut jpeg_bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg_bytes, quality.as_percent())
            .encode(&rgb, frame.width, frame.height, image::ColorType::Rgb8.into())
            .map_err(|error| CompressError::Encode(error.to_string()))?;

        Ok(EncodedImage::from_jpeg_bytes(
            &jpeg_bytes,
            frame.width,
            frame.height,
            quality.as_fraction(),
        ))
    }
}

/// Result of one ladder search.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOutcome {
    /// Chosen encoded still.
    pub image: EncodedImage,
    /// Qualities tried, in order. Never empty, never longer than the ladder.
    pub attempts: Vec<Quality>,
    /// Estimated size of the chosen still in KB.
    pub estimated_kb: f64,
}

impl CompressionOutcome {
    /// Returns the quality of the chosen still.
    pub fn final_quality(&self) -> Quality {
        self.attempts.last().copied().unwrap_or(Quality::START)
    }

    /// Returns `true` when the chosen still fits `target_kb`.
    pub fn fits(&self, target_kb: f64) -> bool {
        self.estimated_kb <= target_kb
    }
}

/// Computes dimensions that fit within `max_width` x `max_height`.
///
/// Stills already inside the bounds are returned unchanged. Larger stills are
/// scaled by `min(max_width / width, max_height / height)`; results are
/// rounded and never zero.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = (f64::from(max_width) / f64::from(width))
        .min(f64::from(max_height) / f64::from(height));
    let scaled_width = (f64::from(width) * scale).round() as u32;
    let scaled_height = (f64::from(height) * scale).round() as u32;

    (
        scaled_width.clamp(1, max_width),
        scaled_height.clamp(1, max_height),
    )
}

/// Downscales a still so it fits within [`MAX_WIDTH`] x [`MAX_HEIGHT`].
///
/// # Errors
/// Returns [`CompressError::Core`] when the resized buffer fails validation.
pub fn downscale(frame: &Frame) -> Result<Frame, CompressError> {
    let (width, height) = fit_within(frame.width, frame.height, MAX_WIDTH, MAX_HEIGHT);
    if (width, height) == (frame.width, frame.height) {
        return Ok(frame.clone());
    }

    let source = image::RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .ok_or_else(|| {
            CompressError::Encode("still buffer does not match geometry".to_string())
        })?;
    let resized = image::imageops::resize(&source, width, height, FilterType::Triangle);

    Ok(Frame::new(width, height, resized.into_raw())?)
}

/// Compresses a still until its estimate fits `target_kb`.
///
/// # Semantics
/// The still is downscaled once, then encoded at each [`QUALITY_LADDER`] step
/// in order. The first candidate with an estimate at or under `target_kb` is
/// returned; otherwise the candidate at [`Quality::FLOOR`] is returned.
///
/// # Errors
/// Propagates downscale and encoder failures.
pub fn compress<E>(
    frame: &Frame,
    target_kb: f64,
    encoder: &E,
) -> Result<CompressionOutcome, CompressError>
where
    E: StillEncoder + ?Sized,
{
    let scaled = downscale(frame)?;
    let mut attempts = Vec::with_capacity(QUALITY_LADDER.len());
    let mut chosen = None;

    for quality in QUALITY_LADDER {
        attempts.push(quality);
        let candidate = encoder.encode(&scaled, quality)?;
        let estimated_kb = candidate.estimated_kb();
        let done = estimated_kb <= target_kb || quality == Quality::FLOOR;
        chosen = Some((candidate, estimated_kb));
        if done {
            break;
        }
    }

    let (image, estimated_kb) = chosen.ok_or(CompressError::EmptyLadder)?;
    info!(
        size_kb = %format!("{estimated_kb:.2}"),
        quality = %format!("{:.1}", image.quality),
        attempts = attempts.len(),
        width = image.width,
        height = image.height,
        "image compressed"
    );

    Ok(CompressionOutcome {
        image,
        attempts,
        estimated_kb,
    })
}

/// Error type for the compression ladder.
#[derive(Debug, Error)]
pub enum CompressError {
    /// Codec rejected the still.
    #[error("image encoding failed: {0}")]
    Encode(String),
    /// Quality ladder produced no candidate.
    #[error("quality ladder is empty")]
    EmptyLadder,
    /// Core model validation failed.
    #[error(transparent)]
    Core(#[from] faceid_core::CoreError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for dimension fitting and ladder bounds.

    use std::cell::RefCell;

    use faceid_core::JPEG_DATA_URL_PREFIX;

    use super::*;

    /// Encoder whose output length is proportional to quality.
    struct LinearEncoder {
        chars_per_tenth: usize,
        seen: RefCell<Vec<Quality>>,
    }

    impl StillEncoder for LinearEncoder {
        fn encode(&self, frame: &Frame, quality: Quality) -> Result<EncodedImage, CompressError> {
            self.seen.borrow_mut().push(quality);
            let payload = "A".repeat(self.chars_per_tenth * usize::from(quality.0));
            Ok(EncodedImage::from_data_url(
                format!("{JPEG_DATA_URL_PREFIX}{payload}"),
                frame.width,
                frame.height,
                quality.as_fraction(),
            )?)
        }
    }

    fn encoder(chars_per_tenth: usize) -> LinearEncoder {
        LinearEncoder {
            chars_per_tenth,
            seen: RefCell::new(Vec::new()),
        }
    }

    fn still(width: u32, height: u32) -> Frame {
        Frame::new(width, height, vec![128; (width * height * 4) as usize])
            .expect("frame should be valid")
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        assert_eq!(fit_within(1280, 720, 640, 480), (640, 360));
        assert_eq!(fit_within(1920, 1080, 640, 480), (640, 360));
        assert_eq!(fit_within(600, 1200, 640, 480), (240, 480));
        assert_eq!(fit_within(320, 240, 640, 480), (320, 240));
    }

    #[test]
    fn fit_within_never_returns_zero() {
        assert_eq!(fit_within(10_000, 1, 640, 480), (640, 1));
    }

    #[test]
    fn ladder_stops_at_first_candidate_within_budget() {
        // 1365 chars/tenth: 0.7 => ~7 KB, 0.4 => ~4 KB.
        let encoder = encoder(1365);
        let outcome = compress(&still(4, 4), 4.0, &encoder).expect("compression should work");

        assert_eq!(
            outcome.attempts,
            vec![Quality(7), Quality(6), Quality(5), Quality(4)]
        );
        assert_eq!(outcome.final_quality(), Quality(4));
        assert!(outcome.fits(4.0));
    }

    #[test]
    fn ladder_ends_at_floor_when_budget_is_unreachable() {
        let encoder = encoder(10_000);
        let outcome = compress(&still(4, 4), 0.0, &encoder).expect("compression should work");

        assert_eq!(outcome.attempts.len(), QUALITY_LADDER.len());
        assert_eq!(outcome.final_quality(), Quality::FLOOR);
        assert!(outcome.attempts.windows(2).all(|pair| pair[0] > pair[1]));
        assert_eq!(encoder.seen.borrow().len(), 7);
    }

    #[test]
    fn first_step_is_accepted_when_already_small() {
        let encoder = encoder(1);
        let outcome = compress(&still(4, 4), 100.0, &encoder).expect("compression should work");
        assert_eq!(outcome.attempts, vec![Quality::START]);
    }

    #[test]
    fn quality_conversions_match_encoders() {
        assert_eq!(Quality::START.as_percent(), 70);
        assert!((Quality::FLOOR.as_fraction() - 0.1).abs() < f32::EPSILON);
        assert_eq!(Quality::from_tenths(0), None);
        assert_eq!(Quality::from_tenths(11), None);
    }
}
