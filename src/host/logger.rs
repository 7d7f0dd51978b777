//=========================================================================
// Host Logger
//=========================================================================
//
// `log::Log` backend that writes to the host's log channels.
//
// Architecture:
//   trace!/info!/... → log facade → HostLogger → LoggerApi.<level>(handle, msg)
//
// Only records targeted at this crate are forwarded, so code that embeds
// the plugin (the harness, tests) can log through the same facade without
// its records looping back through the host.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_char, CString};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};

//=== Internal Dependencies ===============================================

use super::abi::{LoggerApi, PluginHandle};
use super::{context, HostError};

//=== Constants ===========================================================

/// Target prefix of records that belong to the plugin.
const PLUGIN_TARGET: &str = env!("CARGO_CRATE_NAME");

type LogChannel = extern "C" fn(PluginHandle, *const c_char);

//=== HostLogger ==========================================================

/// Forwards plugin log records to the host logger attached on load.
///
/// # Lifecycle
///
/// 1. **Install**: `HostLogger::install()` on `Main(Load)` sets the `log`
///    backend once per process; later loads only reset the max level
/// 2. **Forwarding**: records whose target starts with this crate's name go
///    to the matching host channel
/// 3. **Detached**: after `Main(Unload)` records are dropped until the next
///    load attaches a context
///
/// # Thread Safety
///
/// Stateless. Each record reads the current context under its `RwLock`.
///
/// # Error Handling
///
/// Install fails with [`HostError::LoggerInstall`] when a different backend
/// owns the `log` facade. Interior NULs in a message are blanked.
pub struct HostLogger;

static HOST_LOGGER: HostLogger = HostLogger;
static INSTALLED: AtomicBool = AtomicBool::new(false);

impl HostLogger {
    /// Installs the host logger as the process-wide `log` backend.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::LoggerInstall`] if another logger is already
    /// set. Reinstalling after an unload/load cycle succeeds.
    pub fn install() -> Result<(), HostError> {
        if !INSTALLED.load(Ordering::Acquire) {
            log::set_logger(&HOST_LOGGER)?;
            INSTALLED.store(true, Ordering::Release);
        }
        log::set_max_level(LevelFilter::Trace);
        Ok(())
    }

    fn forwards(target: &str) -> bool {
        target.starts_with(PLUGIN_TARGET)
    }
}

impl Log for HostLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        Self::forwards(metadata.target()) && context::current().is_some()
    }

    fn log(&self, record: &Record) {
        if !Self::forwards(record.target()) {
            return;
        }

        let message = to_c_message(&record.args().to_string());

        context::with_current(|ctx| {
            let Some(write) = ctx.logger().and_then(|api| channel(api, record.level())) else {
                return;
            };
            write(ctx.handle(), message.as_ptr());
        });
    }

    fn flush(&self) {}
}

//=== Helpers =============================================================

/// Picks the host channel for a log level.
fn channel(api: &LoggerApi, level: Level) -> Option<LogChannel> {
    match level {
        Level::Trace => api.trace,
        Level::Debug => api.debug,
        Level::Info => api.info,
        Level::Warn => api.warn,
        Level::Error => api.error,
    }
}

/// Converts a formatted message to a C string, blanking interior NULs.
fn to_c_message(text: &str) -> CString {
    CString::new(text.replace('\0', " ")).unwrap_or_default()
}

//=========================================================================
// Unit Tests
//=========================================================================
