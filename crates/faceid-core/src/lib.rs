#![warn(missing_docs)]
//! # faceid-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `faceid` workspace.
//!
//! ## Responsibilities
//! - Represent uncompressed stills pulled from a camera feed.
//! - Represent encoded JPEG stills in the data-URL form carried by hidden
//!   form fields.
//! - Estimate the transmitted size of an encoded still.
//!
//! ## Data flow
//! Camera code emits a [`Frame`] -> the compression ladder produces an
//! [`EncodedImage`] -> its data URL is written to a hidden form field and
//! submitted with the login or registration request.
//!
//! ## Ownership and lifetimes
//! Frames and encoded images own their buffers (`Vec<u8>`, `String`) so a
//! captured still can outlive the stream it was grabbed from.
//!
//! ## Error model
//! Shape mismatches and malformed data URLs return [`CoreError`] variants.
//!
//! ## Security and privacy notes
//! This crate never logs pixel bytes or encoded payloads.
//!
//! ## Example
//! ```rust
//! use faceid_core::{EncodedImage, Frame, estimate_size_kb};
//!
//! let frame = Frame::new(2, 2, vec![0; 16]).expect("valid frame");
//! assert_eq!(frame.pixel_count(), 4);
//!
//! let image = EncodedImage::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF, 0xD9], 2, 2, 0.7);
//! assert!(image.data_url().starts_with("data:image/jpeg;base64,"));
//! assert!(estimate_size_kb(image.data_url()) < 1.0);
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum width of a compressed still.
pub const MAX_WIDTH: u32 = 640;

/// Maximum height of a compressed still.
pub const MAX_HEIGHT: u32 = 480;

/// Size budget used when compressing a freshly captured still, in KB.
pub const CAPTURE_TARGET_KB: f64 = 500.0;

/// Size budget used when no explicit budget is given, in KB.
pub const DEFAULT_TARGET_KB: f64 = 100.0;

/// Largest encoded still a registration form may submit, in KB.
pub const HARD_CEILING_KB: f64 = 1000.0;

/// Characters subtracted from a data URL before estimating its payload size.
///
/// This is an approximation of the `data:` header length and is kept as a
/// fixed allowance rather than the exact prefix length.
pub const DATA_URL_HEADER_ALLOWANCE: usize = 22;

/// Prefix of every JPEG data URL produced by this workspace.
pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// One uncompressed still pulled from a live camera feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Still width in pixels.
    pub width: u32,
    /// Still height in pixels.
    pub height: u32,
    /// Raw RGBA pixel buffer (`width * height * 4` bytes).
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyFrame`] when either dimension is zero and
    /// [`CoreError::InvalidFrameShape`] when the pixel buffer length is not
    /// exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::EmptyFrame { width, height });
        }

        let expected_len = required_rgba_len(width, height)?;
        if rgba.len() != expected_len {
            return Err(CoreError::InvalidFrameShape {
                expected: expected_len,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Returns the number of pixels in the still.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the pixels as tightly packed RGB bytes, dropping alpha.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for pixel in self.rgba.chunks_exact(4) {
            rgb.extend_from_slice(&pixel[..3]);
        }
        rgb
    }
}

/// A JPEG still encoded as a base64 data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedImage {
    data_url: String,
    /// Encoded width in pixels.
    pub width: u32,
    /// Encoded height in pixels.
    pub height: u32,
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f32,
}

impl EncodedImage {
    /// Wraps raw JPEG bytes into a data URL.
    pub fn from_jpeg_bytes(jpeg: &[u8], width: u32, height: u32, quality: f32) -> Self {
        let mut data_url =
            String::with_capacity(JPEG_DATA_URL_PREFIX.len() + jpeg.len().div_ceil(3) * 4);
        data_url.push_str(JPEG_DATA_URL_PREFIX);
        STANDARD.encode_string(jpeg, &mut data_url);
        Self {
            data_url,
            width,
            height,
            quality,
        }
    }

    /// Adopts a data URL produced by another encoder (for example a browser
    /// canvas), after checking that it is a base64 JPEG data URL.
    ///
    /// # Errors
    /// Returns [`CoreError::MalformedDataUrl`] when the prefix is wrong or the
    /// payload is empty.
    pub fn from_data_url(
        data_url: impl Into<String>,
        width: u32,
        height: u32,
        quality: f32,
    ) -> Result<Self, CoreError> {
        let data_url = data_url.into();
        match data_url.strip_prefix(JPEG_DATA_URL_PREFIX) {
            Some(payload) if !payload.is_empty() => Ok(Self {
                data_url,
                width,
                height,
                quality,
            }),
            _ => Err(CoreError::MalformedDataUrl(
                "expected a non-empty base64 jpeg data url".to_string(),
            )),
        }
    }

    /// Returns the full data URL, suitable for a hidden form field or an
    /// `<img src>`.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Consumes the image and returns its data URL.
    pub fn into_data_url(self) -> String {
        self.data_url
    }

    /// Returns the estimated transmitted size in KB.
    pub fn estimated_kb(&self) -> f64 {
        estimate_size_kb(&self.data_url)
    }

    /// Decodes the base64 payload back into JPEG bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Base64`] when the payload is not valid base64.
    pub fn decode_jpeg(&self) -> Result<Vec<u8>, CoreError> {
        decode_data_url(&self.data_url)
    }
}

/// Estimates the size in KB of the payload carried by a data URL.
///
/// The estimate is `(len - 22) * 0.75 / 1024`, saturating at zero.
pub fn estimate_size_kb(data_url: &str) -> f64 {
    let payload_chars = data_url.len().saturating_sub(DATA_URL_HEADER_ALLOWANCE);
    payload_chars as f64 * 0.75 / 1024.0
}

/// Decodes the base64 payload of a JPEG data URL.
///
/// # Errors
/// Returns [`CoreError::MalformedDataUrl`] for a wrong prefix and
/// [`CoreError::Base64`] for an undecodable payload.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, CoreError> {
    let payload = data_url.strip_prefix(JPEG_DATA_URL_PREFIX).ok_or_else(|| {
        CoreError::MalformedDataUrl("missing jpeg data url prefix".to_string())
    })?;
    Ok(STANDARD.decode(payload)?)
}

/// Error type for core model validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Frame buffer shape does not match declared geometry.
    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    InvalidFrameShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Frame has a zero dimension.
    #[error("frame has no pixels: {width}x{height}")]
    EmptyFrame {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
    /// Frame dimensions overflow addressable memory.
    #[error("frame dimensions overflow")]
    DimensionOverflow,
    /// Data URL does not carry a base64 JPEG payload.
    #[error("malformed data url: {0}")]
    MalformedDataUrl(String),
    /// Base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

fn required_rgba_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(CoreError::DimensionOverflow)
}

#[cfg(test)]
mod tests {
    //! Unit tests for frame validation and size estimation.

    use super::*;

    #[test]
    fn frame_rejects_mismatched_buffer() {
        let error = Frame::new(2, 2, vec![0; 15]).expect_err("short buffer should fail");
        assert!(matches!(
            error,
            CoreError::InvalidFrameShape {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn frame_rejects_zero_dimension() {
        assert!(matches!(
            Frame::new(0, 4, Vec::new()),
            Err(CoreError::EmptyFrame { .. })
        ));
    }

    #[test]
    fn estimate_uses_fixed_header_allowance() {
        let data_url = format!("{}{}", "x".repeat(DATA_URL_HEADER_ALLOWANCE), "A".repeat(1024));
        assert!((estimate_size_kb(&data_url) - 0.75).abs() < f64::EPSILON);
        assert_eq!(estimate_size_kb("short"), 0.0);
    }

    #[test]
    fn from_data_url_rejects_other_mime_types() {
        assert!(EncodedImage::from_data_url("data:image/png;base64,AAAA", 1, 1, 0.7).is_err());
        assert!(EncodedImage::from_data_url(JPEG_DATA_URL_PREFIX, 1, 1, 0.7).is_err());
    }

    #[test]
    fn jpeg_bytes_survive_data_url_wrapping() {
        let bytes = vec![0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9];
        let image = EncodedImage::from_jpeg_bytes(&bytes, 1, 1, 0.5);
        assert_eq!(image.decode_jpeg().expect("payload should decode"), bytes);
    }
}
