//! Format utilities (time)

use std::fmt;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// RFC 3339 UTC timestamps, or nothing when time display is off.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timer {
    enabled: bool,
}

pub(crate) fn make_timer(enabled: bool) -> Timer {
    Timer { enabled }
}

impl FormatTime for Timer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        if !self.enabled {
            return Ok(());
        }
        let now = OffsetDateTime::now_utc().format(&Rfc3339).map_err(|_| fmt::Error)?;
        w.write_str(&now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(timer: Timer) -> String {
        let mut out = String::new();
        timer.format_time(&mut Writer::new(&mut out)).unwrap();
        out
    }

    #[test]
    fn disabled_timer_writes_nothing() {
        assert_eq!(render(make_timer(false)), "");
    }

    #[test]
    fn enabled_timer_writes_rfc3339() {
        let out = render(make_timer(true));
        assert!(out.contains('T') && out.ends_with('Z'), "{out}");
    }
}
