//! Log line formatting that ties every line to the game session and event that produced it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::macros::format_description;
use time::{format_description::FormatItem, OffsetDateTime};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Events handled by the game loop so far.
static EVENT_COUNTER: AtomicU64 = AtomicU64::new(0);
/// The session timers are currently armed for. Zero before the first level starts.
static CURRENT_SESSION: AtomicU64 = AtomicU64::new(0);

/// The event column shows 16 bits of hex.
const EVENT_DISPLAY_MASK: u64 = 0xFFFF;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:5]");

/// Formats `12:00:01.00042 s3 #001A  INFO span{field}: target: message fields`.
///
/// `s3` is the game session and `#001A` the number of events handled, so that lines written while
/// handling one event can be grouped together.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc()
            .format(&TIMESTAMP_FORMAT)
            .map_err(|_| fmt::Error)?;
        let session = CURRENT_SESSION.load(Ordering::Relaxed);
        let count = event_count() & EVENT_DISPLAY_MASK;
        write_dimmed(&mut writer, format_args!("{timestamp} s{session} #{count:04X}"))?;
        writer.write_char(' ')?;
        write_level(&mut writer, meta.level())?;
        writer.write_char(' ')?;

        write_scope(ctx, &mut writer)?;
        write_dimmed(&mut writer, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Writes the enclosing spans, outermost first, each followed by its fields.
fn write_scope<S, N>(ctx: &FmtContext<'_, S, N>, writer: &mut Writer<'_>) -> fmt::Result
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let Some(scope) = ctx.event_scope() else {
        return Ok(());
    };

    let mut any = false;
    for span in scope.from_root() {
        any = true;
        write_bold(writer, span.metadata().name())?;
        let extensions = span.extensions();
        if let Some(fields) = extensions.get::<FormattedFields<N>>().filter(|fields| !fields.is_empty()) {
            write!(writer, "{{{fields}}}")?;
        }
        write_dimmed(writer, ":")?;
    }
    if any {
        writer.write_char(' ')?;
    }
    Ok(())
}

fn write_level(writer: &mut Writer<'_>, level: &Level) -> fmt::Result {
    let (color, text) = match *level {
        Level::TRACE => ("\x1b[35m", "TRACE"),
        Level::DEBUG => ("\x1b[34m", "DEBUG"),
        Level::INFO => ("\x1b[32m", " INFO"),
        Level::WARN => ("\x1b[33m", " WARN"),
        Level::ERROR => ("\x1b[31m", "ERROR"),
    };
    styled(writer, color, text)
}

fn write_dimmed(writer: &mut Writer<'_>, s: impl fmt::Display) -> fmt::Result {
    styled(writer, "\x1b[2m", s)
}

fn write_bold(writer: &mut Writer<'_>, s: impl fmt::Display) -> fmt::Result {
    styled(writer, "\x1b[1m", s)
}

/// Wraps `s` in an escape sequence when the writer supports ANSI, writes it plainly otherwise.
fn styled(writer: &mut Writer<'_>, escape: &str, s: impl fmt::Display) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{escape}{s}\x1b[0m")
    } else {
        write!(writer, "{s}")
    }
}

/// Counts one more handled game event.
pub fn increment_event_count() {
    EVENT_COUNTER.fetch_add(1, Ordering::Relaxed);
}

pub fn event_count() -> u64 {
    EVENT_COUNTER.load(Ordering::Relaxed)
}

/// Records the session that subsequent log lines belong to.
pub fn set_session(session: u64) {
    CURRENT_SESSION.store(session, Ordering::Relaxed);
}
