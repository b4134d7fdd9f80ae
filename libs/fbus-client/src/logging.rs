//! Console logging for FBUS applications
//!
//! The client only emits `tracing` events; installing a subscriber is left to
//! the application. [`init_logging`] installs a console subscriber that
//! prefixes each line with the client module and the open span scope:
//!
//! `2025-12-02T00:50:44.809Z [INFO] client: FBUS network opened: ...`

use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::Writer,
        FmtContext, FormatEvent, FormatFields,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::error::{FbusError, Result};

fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "\x1b[35m",
        Level::DEBUG => "\x1b[34m",
        Level::INFO => "\x1b[32m",
        Level::WARN => "\x1b[33m",
        Level::ERROR => "\x1b[31m",
    }
}

/// Last path segment of an event target (`fbus_client::dispatch` -> `dispatch`)
fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

/// `timestamp [LEVEL] module: span:span: message`
#[derive(Debug, Clone, Copy, Default)]
struct ConsoleFormat {
    ansi: bool,
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;

        let level = metadata.level();
        if self.ansi {
            write!(writer, "{}{}\x1b[0m ", level_color(level), format_level(level))?;
        } else {
            write!(writer, "{} ", format_level(level))?;
        }

        write!(writer, "{}: ", short_target(metadata.target()))?;

        // Outermost span first
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}: ", span.name())?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Build the filter: `RUST_LOG` when set, otherwise `level`
fn build_filter(level: &str) -> Result<EnvFilter> {
    match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| FbusError::Config(format!("invalid RUST_LOG '{}': {}", directives, e))),
        _ => EnvFilter::try_new(level)
            .map_err(|e| FbusError::Config(format!("invalid log level '{}': {}", level, e))),
    }
}

/// Install the global console subscriber
///
/// Returns `Ok(false)` when a global subscriber is already installed.
pub fn init_logging(level: &str) -> Result<bool> {
    let filter = build_filter(level)?;

    let ansi = std::io::IsTerminal::is_terminal(&std::io::stdout());
    let console_layer = fmt::layer()
        .with_ansi(ansi)
        .event_format(ConsoleFormat { ansi })
        .with_filter(filter);

    Ok(tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(&Level::INFO), "[INFO]");
        assert_eq!(format_level(&Level::WARN), "[WARN]");
    }

    #[test]
    fn test_short_target() {
        assert_eq!(short_target("fbus_client::dispatch"), "dispatch");
        assert_eq!(short_target("fbus_client"), "fbus_client");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_line_carries_module_and_spans() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_ansi(false)
                .event_format(ConsoleFormat::default())
                .with_writer(move || sink.clone()),
        );

        tracing::subscriber::with_default(subscriber, || {
            let _session = tracing::info_span!("session").entered();
            let _rescan = tracing::info_span!("rescan").entered();
            tracing::warn!(target: "fbus_client::dispatch", "Rescan failed: {}", "Timeout");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(
            output.contains("[WARN] dispatch: session: rescan: Rescan failed: Timeout"),
            "unexpected line: {output}"
        );
        assert!(!output.contains("\x1b["));
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_build_filter() {
        if std::env::var("RUST_LOG").is_err() {
            assert!(build_filter("info,fbus_client=debug").is_ok());
            assert!(matches!(
                build_filter("info,fbus_client=loud"),
                Err(FbusError::Config(_))
            ));
        }
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init_logging("warn").unwrap();
        let second = init_logging("warn").unwrap();
        assert!(!second || !first);
    }
}
