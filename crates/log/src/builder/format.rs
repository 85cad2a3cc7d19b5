//! Format layer creation macros

use tracing::{Metadata, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;

use crate::config::{DisplayConfig, Format};
use crate::sink::RECORD_TARGET;

/// Text format layer (`pretty` or `compact`) with the common display options.
macro_rules! create_fmt_layer {
    ($format:ident, $display:expr, $writer:expr, $source:expr) => {{
        tracing_subscriber::fmt::layer()
            .$format()
            .with_writer($writer)
            .with_ansi($display.colors)
            .with_target($display.target)
            .with_file($source)
            .with_line_number($source)
            .with_thread_ids($display.thread_ids)
            .with_thread_names($display.thread_names)
            .with_timer($crate::format::make_timer($display.time))
    }};
}

/// JSON format layer (has additional options)
macro_rules! create_json_layer {
    ($display:expr, $writer:expr, $source:expr) => {{
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer($writer)
            .with_current_span(true)
            .with_span_list(true)
            .flatten_event($display.flatten)
            .with_ansi(false)
            .with_target($display.target)
            .with_file($source)
            .with_line_number($source)
            .with_thread_ids($display.thread_ids)
            .with_thread_names($display.thread_names)
            .with_timer($crate::format::make_timer($display.time))
    }};
}

/// Output layer for `format` writing to `writer`.
///
/// Records forwarded by [`TracingSink`](crate::TracingSink) carry their
/// location in `caller.*` fields; their `tracing` callsite points into this
/// crate, so it is never printed. Other events show their callsite when
/// `display.source` is on.
pub(super) fn output_layer<S, W>(
    format: Format,
    display: &DisplayConfig,
    writer: W,
) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    let application = filter_fn(|meta: &Metadata<'_>| meta.target() != RECORD_TARGET);
    let records = filter_fn(|meta: &Metadata<'_>| meta.target() == RECORD_TARGET);

    match format {
        Format::Pretty => create_fmt_layer!(pretty, display, writer.clone(), display.source)
            .with_filter(application)
            .and_then(create_fmt_layer!(pretty, display, writer, false).with_filter(records))
            .boxed(),
        Format::Compact => create_fmt_layer!(compact, display, writer.clone(), display.source)
            .with_filter(application)
            .and_then(create_fmt_layer!(compact, display, writer, false).with_filter(records))
            .boxed(),
        Format::Json => create_json_layer!(display, writer.clone(), display.source)
            .with_filter(application)
            .and_then(create_json_layer!(display, writer, false).with_filter(records))
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::Value;
    use sitelog_caller::{LogSite, StackFrame};
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::config::Level;
    use crate::record::LogRecord;
    use crate::sink::{LogSink, TracingSink};

    /// In-memory writer shared between the layer and the test.
    #[derive(Debug, Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock()).lines().map(str::to_owned).collect()
        }
    }

    fn display() -> DisplayConfig {
        DisplayConfig {
            time: false,
            source: true,
            target: true,
            thread_ids: false,
            thread_names: false,
            colors: false,
            flatten: true,
        }
    }

    /// Run `emit` under a subscriber writing `format` into a buffer.
    fn capture(format: Format, emit: impl FnOnce()) -> Vec<String> {
        let out = Captured::default();
        let writer = {
            let out = out.clone();
            move || out.clone()
        };
        let subscriber = Registry::default().with(output_layer(format, &display(), writer));
        tracing::subscriber::with_default(subscriber, emit);
        out.lines()
    }

    fn record(site: LogSite) -> LogRecord {
        LogRecord::new(Level::Warn, "orders", "slow query".to_owned(), site, Vec::new())
    }

    fn json(line: &str) -> Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn json_record_carries_the_resolved_caller() {
        let site = LogSite::Resolved(StackFrame::new("app::orders", "place", Some("orders.rs"), Some(42)));

        let lines = capture(Format::Json, || TracingSink.emit(record(site)));

        assert_eq!(lines.len(), 1);
        let event = json(&lines[0]);
        assert_eq!(event["target"], "sitelog");
        assert_eq!(event["level"], "WARN");
        assert_eq!(event["message"], "slow query");
        assert_eq!(event["logger"], "orders");
        assert_eq!(event["caller.declaring_type"], "app::orders");
        assert_eq!(event["caller.method"], "place");
        assert_eq!(event["caller.file"], "orders.rs");
        assert_eq!(event["caller.line"], 42);
        assert!(event.get("filename").is_none(), "{event}");
        assert!(event.get("line_number").is_none(), "{event}");
    }

    #[test]
    fn json_invalid_site_has_no_caller_fields() {
        let lines = capture(Format::Json, || TracingSink.emit(record(LogSite::Invalid)));

        let event = json(&lines[0]);
        assert_eq!(event["message"], "slow query");
        for field in ["caller.declaring_type", "caller.method", "caller.file", "caller.line"] {
            assert!(event.get(field).is_none(), "{field} in {event}");
        }
    }

    #[test]
    fn json_application_events_keep_their_location() {
        let lines = capture(Format::Json, || tracing::info!(target: "app", "plain event"));

        let event = json(&lines[0]);
        assert_eq!(event["target"], "app");
        assert!(event["filename"].as_str().unwrap().ends_with("format.rs"), "{event}");
        assert!(event["line_number"].as_u64().is_some());
    }

    #[rstest]
    #[case::pretty(Format::Pretty)]
    #[case::compact(Format::Compact)]
    fn text_output_shows_caller_not_sink_location(#[case] format: Format) {
        let site = LogSite::Resolved(StackFrame::new("app::orders", "place", Some("orders.rs"), Some(42)));

        let records = capture(format, || TracingSink.emit(record(site))).join("\n");
        let application = capture(format, || tracing::info!(target: "app", "plain event")).join("\n");

        assert!(records.contains("orders.rs"), "{records}");
        assert!(!records.contains("sink.rs"), "{records}");
        assert!(application.contains("format.rs"), "{application}");
    }
}
