//=========================================================================
// Loader Entry Points
//=========================================================================
//
// The three symbols the mod loader resolves by name.
//
// Lifecycle:
// ```text
//   Supports() ──► API version check
//   Query()    ──► metadata, runtime check
//   Main(Load) ──► attach context, install logger, register types
//      ...
//   Main(Unload) ──► detach context
// ```
//
// Returning `false` from `Main(Load)` makes the loader call
// `Main(Unload)` straight away.
//
//=========================================================================

#![allow(non_snake_case)]

//=== External Dependencies ===============================================

use log::{debug, error, trace, warn};

//=== Internal Dependencies ===============================================

use super::info::plugin_info;
use super::types::register_types;
use crate::host::abi::{MainReason, PluginHandle, PluginInfo, Sdk, API_VERSION_LATEST};
use crate::host::context::{self, HostContext};
use crate::host::registrar;
use crate::host::{HostError, HostLogger};

//=== Exports =============================================================

/// Load/unload notification from the loader.
#[no_mangle]
pub extern "C" fn Main(handle: PluginHandle, reason: u32, sdk: *const Sdk) -> bool {
    match MainReason::from_raw(reason) {
        Some(MainReason::Load) => match load(handle, sdk) {
            Ok(()) => true,
            Err(e) => {
                error!("AimSplit failed to load: {}", e);
                false
            }
        },
        Some(MainReason::Unload) => {
            unload();
            true
        }
        None => {
            warn!("{}", HostError::UnknownReason(reason));
            false
        }
    }
}

/// Fills the loader's metadata record.
#[no_mangle]
pub extern "C" fn Query(info: *mut PluginInfo) {
    // SAFETY: the loader passes a writable record or null.
    if let Some(info) = unsafe { info.as_mut() } {
        *info = plugin_info();
    }
}

/// Loader interface version this plugin speaks.
#[no_mangle]
pub extern "C" fn Supports() -> u32 {
    API_VERSION_LATEST
}

//=== Lifecycle ===========================================================

fn load(handle: PluginHandle, sdk: *const Sdk) -> Result<(), HostError> {
    let ctx = HostContext::new(handle, sdk)?;
    context::attach(ctx);

    if let Err(e) = HostLogger::install() {
        debug!("{}", e);
    }

    trace!("Loading AimSplit mod and registering updates.");
    register_types(&ctx)
}

fn unload() {
    trace!("Unloading AimSplit mod.");
    let released = registrar::release_updates();
    if released > 0 {
        trace!("Released {} update callbacks", released);
    }
    context::detach();
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::abi::{SemVer, RUNTIME_LATEST, SDK_LATEST};
    use crate::host::context::TEST_LOCK;
    use crate::plugin::info::{PLUGIN_AUTHOR, PLUGIN_NAME};
    use std::sync::PoisonError;

    #[test]
    fn supports_is_constant() {
        assert_eq!(Supports(), API_VERSION_LATEST);
        assert_eq!(Supports(), Supports());
    }

    #[test]
    fn query_fills_metadata() {
        let mut info = PluginInfo::empty();

        Query(&mut info);

        assert_eq!(info.name_lossy(), PLUGIN_NAME);
        assert_eq!(info.author_lossy(), PLUGIN_AUTHOR);
        assert_eq!(info.version, SemVer::new(1, 0, 0));
        assert_eq!(info.runtime, RUNTIME_LATEST);
        assert_eq!(info.sdk, SDK_LATEST);
    }

    #[test]
    fn query_is_repeatable() {
        let mut first = PluginInfo::empty();
        let mut second = PluginInfo::empty();

        Query(&mut first);
        Main(std::ptr::null_mut(), 7, std::ptr::null());
        Query(&mut second);

        assert_eq!(first.name_lossy(), second.name_lossy());
        assert_eq!(first.version, second.version);
        assert_eq!(first.runtime, second.runtime);
    }

    #[test]
    fn query_ignores_null() {
        Query(std::ptr::null_mut());
    }

    #[test]
    fn load_with_null_sdk_fails() {
        let mut marker = 0u8;
        let handle = (&mut marker as *mut u8).cast();

        assert!(!Main(handle, MainReason::Load.as_raw(), std::ptr::null()));
    }

    #[test]
    fn unknown_reason_fails() {
        assert!(!Main(std::ptr::null_mut(), 42, std::ptr::null()));
    }

    #[test]
    fn unload_detaches_and_succeeds() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        assert!(Main(std::ptr::null_mut(), MainReason::Unload.as_raw(), std::ptr::null()));
        assert!(context::current().is_none());
    }

    extern "C" fn accept_update(
        _registrar: *mut std::ffi::c_void,
        _group: u32,
        _name: *const std::ffi::c_char,
        _context: *mut std::ffi::c_void,
        _callback: Option<crate::host::abi::UpdateCallback>,
    ) {
    }

    #[test]
    fn unload_releases_update_callbacks() {
        use crate::host::abi::{UpdateRegistrarApi, UpdateTickGroup};
        use crate::host::{SdkRegistrar, UpdateRegistrar};

        let _guard = TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let api = UpdateRegistrarApi {
            register_update: Some(accept_update),
        };
        let mut registrar = SdkRegistrar::new(&api, std::ptr::null_mut());
        for _ in 0..2 {
            registrar.register_update(UpdateTickGroup::PlayerAimUpdate, "AimSplitTick", Box::new(|_, _| {}));
        }
        assert_eq!(registrar::owned_update_count(), 2);

        assert!(Main(std::ptr::null_mut(), MainReason::Unload.as_raw(), std::ptr::null()));

        assert_eq!(registrar::owned_update_count(), 0);
    }
}
