//! Deterministic camera backend for tests and CI.

use std::future::{Future, ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use faceid_core::Frame;

use crate::{CameraBackend, CameraStream, CaptureError, StreamConstraints};

/// Counts the stop signals received by one synthetic track.
#[derive(Debug, Clone, Default)]
pub struct TrackProbe {
    stops: Arc<AtomicUsize>,
}

impl TrackProbe {
    /// Returns how many times the track was stopped.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Synthetic camera yielding gradient frames of a fixed geometry.
#[derive(Debug)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    tracks_per_stream: usize,
    deny: bool,
    never_ready: bool,
    issued: Mutex<Vec<Vec<TrackProbe>>>,
}

impl SyntheticCamera {
    /// Creates a camera granting single-track streams of `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tracks_per_stream: 1,
            deny: false,
            never_ready: false,
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Creates a camera that refuses every request, as after a denied
    /// permission prompt.
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::new(1, 1)
        }
    }

    /// Sets the number of tracks per granted stream.
    pub fn with_tracks(mut self, tracks: usize) -> Self {
        self.tracks_per_stream = tracks;
        self
    }

    /// Makes granted streams fail their readiness wait.
    pub fn failing_readiness(mut self) -> Self {
        self.never_ready = true;
        self
    }

    /// Returns the number of streams granted so far.
    pub fn granted(&self) -> usize {
        self.issued.lock().map(|issued| issued.len()).unwrap_or(0)
    }

    /// Returns stop counts per track, grouped per granted stream.
    pub fn stop_counts(&self) -> Vec<Vec<usize>> {
        self.issued
            .lock()
            .map(|issued| {
                issued
                    .iter()
                    .map(|tracks| tracks.iter().map(TrackProbe::stop_count).collect())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn grant(&self) -> Result<SyntheticStream, CaptureError> {
        if self.deny {
            return Err(CaptureError::CameraUnavailable(
                "permission denied".to_string(),
            ));
        }

        let tracks: Vec<TrackProbe> = (0..self.tracks_per_stream)
            .map(|_| TrackProbe::default())
            .collect();
        let mut issued = self
            .issued
            .lock()
            .map_err(|_| CaptureError::Stream("synthetic registry lock poisoned".to_string()))?;
        issued.push(tracks.clone());

        Ok(SyntheticStream {
            width: self.width,
            height: self.height,
            tracks,
            ready: !self.never_ready,
            sequence: issued.len() as u8,
        })
    }
}

impl CameraBackend for SyntheticCamera {
    type Stream = SyntheticStream;

    fn acquire(
        &self,
        constraints: StreamConstraints,
    ) -> impl Future<Output = Result<SyntheticStream, CaptureError>> {
        let result = if constraints.video {
            self.grant()
        } else {
            Err(CaptureError::CameraUnavailable(
                "no video track requested".to_string(),
            ))
        };
        ready(result)
    }
}

/// Stream granted by [`SyntheticCamera`].
#[derive(Debug)]
pub struct SyntheticStream {
    width: u32,
    height: u32,
    tracks: Vec<TrackProbe>,
    ready: bool,
    sequence: u8,
}

impl CameraStream for SyntheticStream {
    fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn stop_all_tracks(&mut self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    fn wait_ready(&mut self) -> impl Future<Output = Result<(), CaptureError>> {
        let result = if self.ready {
            Ok(())
        } else {
            Err(CaptureError::Stream("metadata never loaded".to_string()))
        };
        ready(result)
    }

    fn grab_frame(&self) -> Result<Frame, CaptureError> {
        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                rgba.extend_from_slice(&[
                    (x % 256) as u8,
                    (y % 256) as u8,
                    self.sequence.wrapping_mul(40),
                    255,
                ]);
            }
        }
        Ok(Frame::new(self.width, self.height, rgba)?)
    }
}
