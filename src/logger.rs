//! Minimal stderr logging for test runs.

use std::io::Write;

#[cfg(test)]
use std::sync::Once;

/// Stderr logger that can keep other crates' targets one notch quieter
/// than this crate's own.
struct StderrLog {
    own: log::LevelFilter,
    deps: log::LevelFilter,
}

impl log::Log for StderrLog {
    fn enabled(&self, meta: &log::Metadata<'_>) -> bool {
        let cap = if meta.target().starts_with("sifter") {
            self.own
        } else {
            self.deps
        };
        meta.level() <= cap
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let thread = std::thread::current();
        writeln!(
            std::io::stderr(),
            "[{}] {} ({}): {}",
            record.level(),
            record.target(),
            thread.name().unwrap_or("?"),
            record.args()
        )
        .ok();
    }

    fn flush(&self) {}
}

/// Install the stderr logger once per test run, when the `TEST_LOG`
/// environment variable asks for it: unset or `0` disables, `1` enables
/// info, and each higher value raises the detail, with dependency
/// targets kept one notch quieter until `3`/`5`.
#[cfg(test)]
pub(crate) fn ensure_logger() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let level = std::env::var("TEST_LOG")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if level > 0 {
            setup_logger(level).expect("install test logger");
        }
    });
}

/// Install the stderr logger at the given verbosity.
///
/// Fails if some logger is already installed.
pub fn setup_logger(level: u32) -> Result<(), log::SetLoggerError> {
    use log::LevelFilter::{Debug, Info, Trace};

    let (own, deps) = match level {
        0 => return Ok(()),
        1 => (Info, Info),
        2 => (Debug, Info),
        3 => (Debug, Debug),
        4 => (Trace, Debug),
        _ => (Trace, Trace),
    };
    log::set_boxed_logger(Box::new(StderrLog { own, deps }))?;
    log::set_max_level(own.max(deps));
    Ok(())
}
