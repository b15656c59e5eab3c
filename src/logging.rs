//! Line-oriented log output.
//!
//! Every event becomes one line: local timestamp, a one-letter severity and the
//! message, followed by any structured fields as `key=value`.
//!
//! ```text
//! 2024-05-01 12:00:00 I - Scan path: /var/log/app
//! 2024-05-01 12:00:00 E - Error removing /var/log/app/x.log: Permission denied (os error 13)
//! ```

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(LineLayer::stdout())
        .try_init()
}

pub fn severity_letter(level: &Level) -> char {
    match *level {
        Level::ERROR => 'E',
        Level::WARN => 'W',
        Level::INFO => 'I',
        Level::DEBUG => 'D',
        Level::TRACE => 'T',
    }
}

pub fn format_line(
    timestamp: &str,
    level: &Level,
    message: &str,
    fields: &[(String, String)],
) -> String {
    let mut line = format!("{timestamp} {} - {message}", severity_letter(level));
    for (key, value) in fields {
        line.push_str(&format!(" {key}={value}"));
    }
    line
}

pub struct LineLayer<W: Write + Send + 'static> {
    writer: Mutex<W>,
}

impl<W: Write + Send + 'static> LineLayer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl LineLayer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<S, W> Layer<S> for LineLayer<W>
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: Write + Send + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let line = format_line(
            &timestamp,
            event.metadata().level(),
            &visitor.message,
            &visitor.fields,
        );

        // A writer that panicked mid-line must not silence later events.
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(writer, "{line}");
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push((field.name().to_string(), format!("{value:?}")));
        }
    }
}
