//! Log sinks.
//!
//! Every event at `debug` and above is appended to a per-day file,
//! `on-save-<YYYY-MM-DD>.log`, one `<timestamp> | <LEVEL> | <message>` line
//! per event. The file is reopened for every event so no handle outlives a
//! write. Stderr tracing is off unless `--verbose` or `ON_SAVE_LOG` asks for
//! it, so stdout and stderr stay reserved for the response.

use chrono::{Local, NaiveDate};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding the stderr filter directives.
pub const LOG_ENV: &str = "ON_SAVE_LOG";

const APP_DIR: &str = "on-save";

/// Picks the log directory: explicit flag or env, then config, then the
/// user cache directory, then the system temp directory.
#[must_use]
pub fn log_dir(explicit: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    explicit
        .or(configured)
        .map(Path::to_path_buf)
        .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR).join("logs")))
        .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR))
}

/// Log file name for a calendar day.
#[must_use]
pub fn file_name(date: NaiveDate) -> String {
    format!("on-save-{}.log", date.format("%Y-%m-%d"))
}

/// [`MakeWriter`] that appends to today's log file.
#[derive(Debug, Clone)]
pub struct DailyFile {
    dir: PathBuf,
}

impl DailyFile {
    /// Writes into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file events go to right now.
    #[must_use]
    pub fn current_path(&self) -> PathBuf {
        self.dir.join(file_name(Local::now().date_naive()))
    }
}

impl<'a> MakeWriter<'a> for DailyFile {
    type Writer = AppendFile;

    fn make_writer(&'a self) -> Self::Writer {
        AppendFile::open(&self.current_path())
    }
}

/// One append-mode handle, dropped after the event is written.
///
/// Logging must never fail the hook, so a file that cannot be opened
/// swallows the write.
#[derive(Debug)]
pub struct AppendFile(Option<File>);

impl AppendFile {
    fn open(path: &Path) -> Self {
        Self(OpenOptions::new().create(true).append(true).open(path).ok())
    }
}

impl Write for AppendFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0 {
            Some(ref mut file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0 {
            Some(ref mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// `<YYYY-MM-DDTHH:MM:SS> | <LEVEL> | <message>` in local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(
            writer,
            "{} | {} | ",
            Local::now().format("%Y-%m-%dT%H:%M:%S"),
            event.metadata().level()
        )?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber. Call once, before any work.
pub fn init(dir: &Path, verbose: bool) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        if verbose {
            eprintln!("Cannot create log directory {}: {e}", dir.display());
        }
    }

    let file_layer = fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(DailyFile::new(dir))
        .with_filter(LevelFilter::DEBUG);

    let default_filter = if verbose { "debug" } else { "off" };
    let stderr_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(stderr_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();
}
