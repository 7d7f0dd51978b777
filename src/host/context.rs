//=========================================================================
// Host Context
//=========================================================================
//
// The plugin handle and SDK table handed over by `Main(Load)`.
//
// Stored once per load in a process-wide `RwLock`. Readers that call back
// into the host (the logger) hold the read lock for the whole call, and
// `Main(Unload)` takes the write lock to detach, so no host call races a
// detach.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ptr::NonNull;
use std::sync::{PoisonError, RwLock};

//=== Internal Dependencies ===============================================

use super::abi::{LoggerApi, PluginHandle, Sdk, TypeRegistrarApi, UpdateRegistrarApi};
use super::HostError;

//=== HostContext =========================================================

/// Plugin handle plus the host's interface table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HostContext {
    handle: PluginHandle,
    sdk: NonNull<Sdk>,
}

// SAFETY: the host keeps the handle and SDK table valid, and callable from
// any thread, for as long as the plugin is loaded. The context is detached
// on unload before the host may release them.
unsafe impl Send for HostContext {}
unsafe impl Sync for HostContext {}

impl HostContext {
    /// Validates the raw pointers passed to `Main`.
    pub(crate) fn new(handle: PluginHandle, sdk: *const Sdk) -> Result<Self, HostError> {
        let sdk = NonNull::new(sdk.cast_mut()).ok_or(HostError::NullSdk)?;
        if handle.is_null() {
            return Err(HostError::NullHandle);
        }
        Ok(Self { handle, sdk })
    }

    pub(crate) fn handle(&self) -> PluginHandle {
        self.handle
    }

    pub(crate) fn sdk(&self) -> &Sdk {
        // SAFETY: non-null, and kept alive by the host while attached.
        unsafe { self.sdk.as_ref() }
    }

    pub(crate) fn logger(&self) -> Option<&LoggerApi> {
        // SAFETY: table pointers are null or valid for the SDK's lifetime.
        unsafe { self.sdk().logger.as_ref() }
    }

    pub(crate) fn updates(&self) -> Option<&UpdateRegistrarApi> {
        // SAFETY: see `logger`.
        unsafe { self.sdk().updates.as_ref() }
    }

    pub(crate) fn types(&self) -> Option<&TypeRegistrarApi> {
        // SAFETY: see `logger`.
        unsafe { self.sdk().types.as_ref() }
    }
}

//=== Process-Wide Storage ================================================

static CONTEXT: RwLock<Option<HostContext>> = RwLock::new(None);

/// Stores the context for later host calls, replacing any previous one.
pub(crate) fn attach(context: HostContext) {
    *CONTEXT.write().unwrap_or_else(PoisonError::into_inner) = Some(context);
}

/// Forgets the stored context. Waits for in-flight host calls to finish.
pub(crate) fn detach() -> Option<HostContext> {
    CONTEXT.write().unwrap_or_else(PoisonError::into_inner).take()
}

/// Returns a copy of the stored context, if attached.
pub(crate) fn current() -> Option<HostContext> {
    *CONTEXT.read().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `f` against the stored context while holding the read lock.
///
/// `f` must not attach or detach.
pub(crate) fn with_current<R>(f: impl FnOnce(&HostContext) -> R) -> Option<R> {
    let guard = CONTEXT.read().unwrap_or_else(PoisonError::into_inner);
    guard.as_ref().map(f)
}

/// Serialises unit tests that attach a context.
#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::abi::RUNTIME_LATEST;
    use std::ffi::c_void;

    fn empty_sdk() -> Sdk {
        Sdk {
            runtime: RUNTIME_LATEST,
            logger: std::ptr::null(),
            updates: std::ptr::null(),
            types: std::ptr::null(),
        }
    }

    #[test]
    fn new_rejects_null_sdk() {
        let mut marker = 0u8;
        let handle = (&mut marker as *mut u8).cast::<c_void>();

        let result = HostContext::new(handle, std::ptr::null());

        assert!(matches!(result, Err(HostError::NullSdk)));
    }

    #[test]
    fn new_rejects_null_handle() {
        let sdk = empty_sdk();

        let result = HostContext::new(std::ptr::null_mut(), &sdk);

        assert!(matches!(result, Err(HostError::NullHandle)));
    }

    #[test]
    fn missing_tables_read_as_none() {
        let mut marker = 0u8;
        let handle = (&mut marker as *mut u8).cast::<c_void>();
        let sdk = empty_sdk();

        let context = HostContext::new(handle, &sdk).unwrap();

        assert!(context.logger().is_none());
        assert!(context.updates().is_none());
        assert!(context.types().is_none());
        assert_eq!(context.sdk().runtime, RUNTIME_LATEST);
    }

    #[test]
    fn attach_then_detach_round_trip() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let mut marker = 0u8;
        let handle = (&mut marker as *mut u8).cast::<c_void>();
        let sdk = empty_sdk();

        attach(HostContext::new(handle, &sdk).unwrap());
        assert_eq!(current().map(|c| c.handle()), Some(handle));
        assert_eq!(with_current(|c| c.handle()), Some(handle));

        let detached = detach();
        assert_eq!(detached.map(|c| c.handle()), Some(handle));
        assert!(current().is_none());
        assert!(with_current(|c| c.handle()).is_none());
    }
}
