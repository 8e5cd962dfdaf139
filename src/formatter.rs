//! Log line format for the runner: wall-clock time, simulation tick, level, target, fields.
//!
//! ```text
//! 12:04:51.20394 0x01F4  INFO chomp::systems::state: Player caught lives=2
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Simulation ticks run by any session in this process.
static TICK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Only the low 16 bits are shown; the column stays four digits wide.
const TICK_DISPLAY_MASK: u64 = 0xFFFF;

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:5]");

/// Counts one simulation tick. Called by the game right before its schedule runs.
pub fn increment_tick() {
    TICK_COUNTER.fetch_add(1, Ordering::Relaxed);
}

pub fn get_tick_count() -> u64 {
    TICK_COUNTER.load(Ordering::Relaxed)
}

/// The tick column as printed, e.g. `0x00A3`.
pub fn format_tick(tick: u64) -> String {
    format!("0x{:04X}", tick & TICK_DISPLAY_MASK)
}

/// Fixed-width level label, colored like `tracing-subscriber`'s default output.
fn level_label(level: &Level) -> (&'static str, &'static str) {
    match *level {
        Level::TRACE => ("\x1b[35m", "TRACE"),
        Level::DEBUG => ("\x1b[34m", "DEBUG"),
        Level::INFO => ("\x1b[32m", " INFO"),
        Level::WARN => ("\x1b[33m", " WARN"),
        Level::ERROR => ("\x1b[31m", "ERROR"),
    }
}

#[derive(Clone, Copy)]
enum Style {
    Dim,
    Bold,
    Color(&'static str),
}

impl Style {
    fn write(self, writer: &mut Writer<'_>, value: impl fmt::Display) -> fmt::Result {
        if !writer.has_ansi_escapes() {
            return write!(writer, "{value}");
        }
        let code = match self {
            Style::Dim => "\x1b[2m",
            Style::Bold => "\x1b[1m",
            Style::Color(code) => code,
        };
        write!(writer, "{code}{value}\x1b[0m")
    }
}

/// Event formatter that stamps every line with the simulation tick it was logged in.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        Style::Dim.write(&mut writer, timestamp)?;
        writer.write_char(' ')?;
        Style::Dim.write(&mut writer, format_tick(get_tick_count()))?;
        writer.write_char(' ')?;

        let (color, label) = level_label(meta.level());
        Style::Color(color).write(&mut writer, label)?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                Style::Bold.write(&mut writer, span.metadata().name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>().filter(|f| !f.is_empty()) {
                    Style::Bold.write(&mut writer, "{")?;
                    write!(writer, "{fields}")?;
                    Style::Bold.write(&mut writer, "}")?;
                }
                Style::Dim.write(&mut writer, ":")?;
                writer.write_char(' ')?;
            }
        }

        Style::Dim.write(&mut writer, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
