//! Process-wide logging policy.
//!
//! The crate emits diagnostics through the [`log`] facade. By default nothing
//! is formatted or written: no sink is set, and the [`log`] crate discards
//! records when no logger is installed.
//!
//! Applications can either install their own `log` backend (`env_logger` and
//! friends will receive this crate's messages like any other), or register a
//! [`LogSink`] here. The sink is installed as the process-global logger and
//! receives only this crate's records, together with the [`LogPriority`] and
//! the [`log::Record`] carrying source location and preformatted message.
//!
//! The priority floor is process-wide: records above the configured
//! [`LogPriority`] are dropped before they reach the sink.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicU8, Ordering},
};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Importance of a log message, mirroring the classic evdev library levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogPriority {
    /// Critical errors and reports of invalid API usage.
    Error = 10,
    /// Informational messages, including anything unexpected but recoverable.
    Info = 20,
    /// Debug chatter.
    Debug = 30,
}

impl LogPriority {
    fn from_level(level: Level) -> Self {
        match level {
            Level::Error => LogPriority::Error,
            Level::Warn | Level::Info => LogPriority::Info,
            Level::Debug | Level::Trace => LogPriority::Debug,
        }
    }

    fn level_filter(self) -> LevelFilter {
        match self {
            LogPriority::Error => LevelFilter::Error,
            LogPriority::Info => LevelFilter::Info,
            LogPriority::Debug => LevelFilter::Trace,
        }
    }
}

/// A caller-supplied log sink.
///
/// Invoked with the mapped [`LogPriority`] and the full [`log::Record`]
/// (message, module path, file, and line).
pub type LogSink = Box<dyn Fn(LogPriority, &Record<'_>) + Send + Sync>;

static PRIORITY: AtomicU8 = AtomicU8::new(LogPriority::Info as u8);
static SINK: Mutex<Option<LogSink>> = Mutex::new(None);
static INSTALLED: AtomicBool = AtomicBool::new(false);
static POLICY: PolicyLogger = PolicyLogger;

struct PolicyLogger;

impl Log for PolicyLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.target().starts_with(env!("CARGO_CRATE_NAME"))
            && LogPriority::from_level(metadata.level()) <= log_priority()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let sink = SINK.lock().unwrap();
        if let Some(sink) = &*sink {
            sink(LogPriority::from_level(record.level()), record);
        }
    }

    fn flush(&self) {}
}

/// Sets the process-wide minimum log priority.
///
/// Messages above `priority` are dropped. The default is
/// [`LogPriority::Info`].
pub fn set_log_priority(priority: LogPriority) {
    PRIORITY.store(priority as u8, Ordering::Relaxed);
    if INSTALLED.load(Ordering::Relaxed) {
        log::set_max_level(priority.level_filter());
    }
}

/// Returns the process-wide minimum log priority.
pub fn log_priority() -> LogPriority {
    match PRIORITY.load(Ordering::Relaxed) {
        x if x == LogPriority::Error as u8 => LogPriority::Error,
        x if x == LogPriority::Debug as u8 => LogPriority::Debug,
        _ => LogPriority::Info,
    }
}

/// Registers (or, with [`None`], removes) the process-wide log sink.
///
/// The first registration installs this crate's logger with the [`log`]
/// crate; that fails if the application already installed its own logger, in
/// which case the crate's messages keep flowing to the application's logger
/// and `false` is returned.
///
/// Passing [`None`] resets the policy to its initial never-logs state (the
/// logger registration itself cannot be undone, but without a sink it is
/// inert).
pub fn set_log_sink(sink: Option<LogSink>) -> bool {
    let installing = sink.is_some();
    *SINK.lock().unwrap() = sink;

    if !installing {
        return true;
    }

    if INSTALLED.load(Ordering::Relaxed) {
        log::set_max_level(log_priority().level_filter());
        return true;
    }

    match log::set_logger(&POLICY) {
        Ok(()) => {
            INSTALLED.store(true, Ordering::Relaxed);
            log::set_max_level(log_priority().level_filter());
            true
        }
        // Another logger is already installed; it will receive our records.
        Err(_) => false,
    }
}
