//=========================================================================
// Harness SDK
//=========================================================================
//
// Host-side implementation of the interface tables a plugin receives in
// `Main(Load)`.
//
// Architecture:
//   PluginHandle ──► &PluginRecord
//                     ├─ logs       ◄── LoggerApi.{trace..error}
//                     ├─ systems    ◄── TypeRegistrarApi.register_system
//                     └─ functions  ◄── TypeRegistrarApi.register_function
//
// Callbacks here never log through the `log` facade: the plugin owns it
// while loaded, and its records are already routed into `logs`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr};
use std::sync::{Mutex, MutexGuard, PoisonError};

//=== Internal Dependencies ===============================================

use super::scheduler;
use crate::host::abi::{
    FileVersion, GlobalFunction, LoggerApi, PluginHandle, Sdk, SystemDescriptor,
    TypeRegistrarApi, UpdateRegistrarApi,
};

//=== Log Capture =========================================================

/// Host log channel a line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostLogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for HostLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// One line written by the plugin through the host logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: HostLogLevel,
    pub message: String,
}

//=== Registry Entries ====================================================

/// Copy of a [`SystemDescriptor`] with owned names.
#[derive(Debug, Clone)]
pub(crate) struct RegisteredSystem {
    pub(crate) name: String,
    pub(crate) parent: String,
    pub(crate) create: Option<extern "C" fn() -> *mut c_void>,
    pub(crate) destroy: Option<extern "C" fn(*mut c_void)>,
    pub(crate) register_updates: Option<extern "C" fn(*mut c_void, *mut c_void)>,
}

//=== PluginRecord ========================================================

/// Everything the host remembers about one loaded plugin.
///
/// Its address is the plugin handle.
#[derive(Debug, Default)]
pub(crate) struct PluginRecord {
    echo: bool,
    logs: Mutex<Vec<LogLine>>,
    systems: Mutex<Vec<RegisteredSystem>>,
    functions: Mutex<HashMap<String, GlobalFunction>>,
}

impl PluginRecord {
    pub(crate) fn new(echo: bool) -> Self {
        Self { echo, ..Self::default() }
    }

    pub(crate) fn push_log(&self, level: HostLogLevel, message: String) {
        if self.echo {
            eprintln!("[{}] {}", level, message);
        }
        lock(&self.logs).push(LogLine { level, message });
    }

    pub(crate) fn logs(&self) -> Vec<LogLine> {
        lock(&self.logs).clone()
    }

    pub(crate) fn clear_logs(&self) {
        lock(&self.logs).clear();
    }

    pub(crate) fn systems(&self) -> Vec<RegisteredSystem> {
        lock(&self.systems).clone()
    }

    pub(crate) fn function(&self, name: &str) -> Option<GlobalFunction> {
        lock(&self.functions).get(name).copied()
    }

    pub(crate) fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.functions).keys().cloned().collect();
        names.sort();
        names
    }

    /// Forgets registered types; captured logs are kept.
    pub(crate) fn reset_types(&self) {
        lock(&self.systems).clear();
        lock(&self.functions).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

//=== Interface Tables ====================================================

static LOGGER_API: LoggerApi = LoggerApi {
    trace: Some(log_trace),
    debug: Some(log_debug),
    info: Some(log_info),
    warn: Some(log_warn),
    error: Some(log_error),
};

static TYPES_API: TypeRegistrarApi = TypeRegistrarApi {
    register_system: Some(register_system),
    register_function: Some(register_function),
};

static UPDATES_API: UpdateRegistrarApi = UpdateRegistrarApi {
    register_update: Some(scheduler::register_update),
};

/// Builds the SDK table handed to `Main`.
pub(crate) fn sdk(runtime: FileVersion) -> Sdk {
    Sdk {
        runtime,
        logger: &LOGGER_API,
        updates: &UPDATES_API,
        types: &TYPES_API,
    }
}

//=== Callbacks ===========================================================

/// Resolves a plugin handle back to its record.
fn record<'a>(handle: PluginHandle) -> Option<&'a PluginRecord> {
    // SAFETY: the harness only hands out handles to boxed records that
    // outlive the plugin's loaded lifetime.
    unsafe { handle.cast::<PluginRecord>().as_ref() }
}

/// Copies a C string, or returns an empty string for null.
fn owned(text: *const c_char) -> String {
    if text.is_null() {
        return String::new();
    }
    // SAFETY: non-null strings from the plugin are NUL-terminated.
    unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
}

fn write_log(handle: PluginHandle, level: HostLogLevel, message: *const c_char) {
    if let Some(record) = record(handle) {
        record.push_log(level, owned(message));
    }
}

extern "C" fn log_trace(handle: PluginHandle, message: *const c_char) {
    write_log(handle, HostLogLevel::Trace, message);
}

extern "C" fn log_debug(handle: PluginHandle, message: *const c_char) {
    write_log(handle, HostLogLevel::Debug, message);
}

extern "C" fn log_info(handle: PluginHandle, message: *const c_char) {
    write_log(handle, HostLogLevel::Info, message);
}

extern "C" fn log_warn(handle: PluginHandle, message: *const c_char) {
    write_log(handle, HostLogLevel::Warn, message);
}

extern "C" fn log_error(handle: PluginHandle, message: *const c_char) {
    write_log(handle, HostLogLevel::Error, message);
}

extern "C" fn register_system(handle: PluginHandle, descriptor: *const SystemDescriptor) {
    let Some(record) = record(handle) else {
        return;
    };
    // SAFETY: the plugin passes a descriptor valid for the duration of the call.
    let Some(descriptor) = (unsafe { descriptor.as_ref() }) else {
        return;
    };

    lock(&record.systems).push(RegisteredSystem {
        name: owned(descriptor.name),
        parent: owned(descriptor.parent),
        create: descriptor.create,
        destroy: descriptor.destroy,
        register_updates: descriptor.register_updates,
    });
}

extern "C" fn register_function(
    handle: PluginHandle,
    name: *const c_char,
    function: Option<GlobalFunction>,
) {
    let (Some(record), Some(function)) = (record(handle), function) else {
        return;
    };
    lock(&record.functions).insert(owned(name), function);
}

//=========================================================================
// Unit Tests
//=========================================================================
