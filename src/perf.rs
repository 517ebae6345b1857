//! Lightweight performance instrumentation.
//!
//! Two independent switches: `--perf` prints scope timings to stderr, and
//! `--render-debug-log` appends timestamped events (layout settles, link
//! dispatches, reloads) to a file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

static TIMINGS: AtomicBool = AtomicBool::new(false);
static EVENT_LOG: Mutex<Option<EventLog>> = Mutex::new(None);

/// Timing guard; reports on drop when perf output is enabled.
#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        if is_enabled() {
            let ms = self.start.elapsed().as_secs_f64() * 1000.0;
            eprintln!("[perf] {}: {ms:.2} ms", self.name);
        }
    }
}

/// Open event log file; events are stamped relative to when it was opened.
#[derive(Debug)]
struct EventLog {
    opened: Instant,
    out: BufWriter<File>,
}

impl EventLog {
    fn create(path: &Path) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "stackview render debug log start")?;
        out.flush()?;
        Ok(Self {
            opened: Instant::now(),
            out,
        })
    }

    fn record(&mut self, name: &str, detail: &str) -> io::Result<()> {
        let ms = self.opened.elapsed().as_secs_f64() * 1000.0;
        writeln!(self.out, "[{ms:>10.3} ms] {name}: {detail}")?;
        self.out.flush()
    }
}

fn event_log() -> MutexGuard<'static, Option<EventLog>> {
    EVENT_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    TIMINGS.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    TIMINGS.load(Ordering::Relaxed)
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

/// Start (or with `None`, stop) writing the debug event log.
///
/// # Errors
/// Returns an error if the log file cannot be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> io::Result<()> {
    let log = path.map(EventLog::create).transpose()?;
    *event_log() = log;
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    event_log().is_some()
}

/// Append one event to the debug log, if one is open.
pub fn log_event(name: &str, detail: impl AsRef<str>) {
    if let Some(log) = event_log().as_mut() {
        if let Err(err) = log.record(name, detail.as_ref()) {
            tracing::debug!(error = %err, event = name, "render debug log write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_set_enabled_toggles_runtime_flag() {
        set_enabled(true);
        assert!(is_enabled());

        set_enabled(false);
        assert!(!is_enabled());
    }

    #[test]
    fn test_debug_log_path_enables_logging_and_writes() {
        let temp_file = NamedTempFile::new().unwrap();
        set_debug_log_path(Some(temp_file.path())).unwrap();
        assert!(is_debug_log_enabled());
        log_event("router.dispatch", "source=#3 reference=\"x\"");
        set_debug_log_path(None).unwrap();
        assert!(!is_debug_log_enabled());
        log_event("after.stop", "ignored");

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("stackview render debug log start"));
        assert!(content.contains("router.dispatch: source=#3"));
        assert!(!content.contains("after.stop"));
    }

    #[test]
    fn test_unwritable_debug_log_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("events.log");
        assert!(set_debug_log_path(Some(&missing)).is_err());
    }
}
