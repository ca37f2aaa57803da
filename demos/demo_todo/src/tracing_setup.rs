use chrono::Local;
use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Wall-clock timestamps with millisecond precision. The scripted scenario
/// plays out in tenths of a second, so whole-second stamps would make every
/// line look simultaneous.
struct ClockMillis;

impl FormatTime for ClockMillis {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%H:%M:%S%.3f"))
    }
}

pub fn tracing_init() {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_max_level(Level::DEBUG)
        .with_timer(ClockMillis)
        .init();
}
