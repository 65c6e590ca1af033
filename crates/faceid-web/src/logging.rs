//! `tracing` layer that forwards events to a console-like sink.

use std::fmt::Write as _;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use crate::{WebError, redact_sensitive};

/// Threshold the browser console is booted with.
pub const CONSOLE_LEVEL: Level = Level::INFO;

/// Destination of formatted log lines.
pub trait ConsoleSink: Send + Sync + 'static {
    /// Writes one line at `level`.
    fn write(&self, level: Level, line: &str);
}

/// Layer formatting events as `target: message key=value ...`.
#[derive(Debug)]
pub struct ConsoleLayer<K> {
    sink: K,
    max_level: Level,
}

impl<K: ConsoleSink> ConsoleLayer<K> {
    /// Creates a layer forwarding events at `max_level` or more severe.
    pub fn new(sink: K, max_level: Level) -> Self {
        Self { sink, max_level }
    }
}

impl<S: Subscriber, K: ConsoleSink> Layer<S> for ConsoleLayer<K> {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() > self.max_level {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let mut line = format!("{}: {}", metadata.target(), visitor.message);
        line.push_str(&visitor.fields);
        self.sink.write(*metadata.level(), &redact_sensitive(&line));
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }
}

/// Installs a global subscriber writing to `sink`.
///
/// # Errors
/// Returns [`WebError::Logging`] when a global subscriber already exists.
pub fn init_logging<K: ConsoleSink>(sink: K, max_level: Level) -> Result<(), WebError> {
    let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(sink, max_level));
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|error| WebError::Logging(error.to_string()))
}

#[cfg(test)]
mod tests {
    //! Unit tests for console line formatting.

    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct CapturingSink {
        lines: Arc<Mutex<Vec<(Level, String)>>>,
    }

    impl ConsoleSink for CapturingSink {
        fn write(&self, level: Level, line: &str) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push((level, line.to_string()));
            }
        }
    }

    fn capture<F: FnOnce()>(max_level: Level, f: F) -> Vec<(Level, String)> {
        let sink = CapturingSink::default();
        let subscriber =
            tracing_subscriber::registry().with(ConsoleLayer::new(sink.clone(), max_level));
        tracing::subscriber::with_default(subscriber, f);
        let lines = sink.lines.lock().expect("sink lock").clone();
        lines
    }

    #[test]
    fn formats_message_and_fields() {
        let lines = capture(Level::DEBUG, || {
            tracing::info!(target: "faceid", tracks = 2, "camera stream acquired");
        });
        assert_eq!(
            lines,
            vec![(Level::INFO, "faceid: camera stream acquired tracks=2".to_string())]
        );
    }

    #[test]
    fn drops_events_below_threshold() {
        let lines = capture(Level::WARN, || {
            tracing::debug!("noisy");
            tracing::error!("loud");
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::ERROR);
    }

    #[test]
    fn validation_reason_survives_redaction() {
        let lines = capture(CONSOLE_LEVEL, || {
            crate::decide_form_submit(&faceid_auth::FormFields {
                username: Some("alice".to_string()),
                password: Some("short".to_string()),
                face_upload: None,
            });
        });
        assert_eq!(
            lines,
            vec![(
                Level::INFO,
                "faceid_web::submit: form submit blocked by validation reason=WeakPassword"
                    .to_string()
            )]
        );
    }

    #[test]
    fn compression_summary_reaches_the_console() {
        let frame = faceid_core::Frame::new(64, 48, vec![90; 64 * 48 * 4]).expect("frame");
        let lines = capture(CONSOLE_LEVEL, || {
            faceid_compress::compress(&frame, 500.0, &faceid_compress::JpegStillEncoder)
                .expect("compressed");
        });
        let summary = lines
            .iter()
            .find(|(_, line)| line.starts_with("faceid_compress: image compressed size_kb="))
            .expect("summary line");
        assert_eq!(summary.0, Level::INFO);
        assert!(
            summary
                .1
                .ends_with(" quality=0.7 attempts=1 width=64 height=48"),
            "{}",
            summary.1
        );
    }

    #[test]
    fn redacts_image_payloads() {
        let lines = capture(Level::INFO, || {
            tracing::info!(target: "faceid", "submitting data:image/jpeg;base64,AAAA");
        });
        assert_eq!(lines[0].1, "faceid: submitting data:<redacted>");
    }
}
