//=========================================================================
// Type Registration
//=========================================================================
//
// Exposes the game system type and the toggle function to the host's
// reflection system on load.
//
// Architecture:
//   register_types(ctx)
//     ├─ register_system(handle, SystemDescriptor { create, destroy, register_updates })
//     └─ register_function(handle, "AimSplit_OnAction", aim_split_on_action)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_void, CString};

use log::{trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::{
    aim_split_on_action, AimSplitSystem, GameSystem, ACTION_NAME, SYSTEM_PARENT_NAME,
    SYSTEM_TYPE_NAME,
};
use crate::host::abi::SystemDescriptor;
use crate::host::context::{self, HostContext};
use crate::host::{HostError, SdkRegistrar};

//=== Registration ========================================================

/// Registers everything the host needs to instantiate and bind the plugin.
///
/// # Errors
///
/// Fails if the SDK has no type registry, or a name is not a C string.
pub(crate) fn register_types(ctx: &HostContext) -> Result<(), HostError> {
    let api = ctx.types().ok_or(HostError::MissingInterface("type registry"))?;

    let type_name = CString::new(SYSTEM_TYPE_NAME)?;
    let parent_name = CString::new(SYSTEM_PARENT_NAME)?;
    let action_name = CString::new(ACTION_NAME)?;

    match api.register_system {
        Some(register) => {
            let descriptor = system_descriptor(&type_name, &parent_name);
            register(ctx.handle(), &descriptor);
        }
        None => warn!("Type registry cannot register systems, skipping {}", SYSTEM_TYPE_NAME),
    }

    match api.register_function {
        Some(register) => register(ctx.handle(), action_name.as_ptr(), Some(aim_split_on_action)),
        None => warn!("Type registry cannot register functions, skipping {}", ACTION_NAME),
    }

    trace!("Registered {} and {}", SYSTEM_TYPE_NAME, ACTION_NAME);
    Ok(())
}

/// Describes [`AimSplitSystem`] to the host. Names are borrowed for the call.
fn system_descriptor(name: &CString, parent: &CString) -> SystemDescriptor {
    SystemDescriptor {
        name: name.as_ptr(),
        parent: parent.as_ptr(),
        create: Some(create_system),
        destroy: Some(destroy_system),
        register_updates: Some(register_system_updates),
    }
}

//=== Host Callbacks ======================================================

extern "C" fn create_system() -> *mut c_void {
    Box::into_raw(Box::new(AimSplitSystem::new())).cast()
}

extern "C" fn destroy_system(instance: *mut c_void) {
    if instance.is_null() {
        return;
    }
    // SAFETY: `instance` came from `create_system` and the host destroys it once.
    drop(unsafe { Box::from_raw(instance.cast::<AimSplitSystem>()) });
}

extern "C" fn register_system_updates(instance: *mut c_void, registrar: *mut c_void) {
    // SAFETY: `instance` came from `create_system` and is still alive.
    let Some(system) = (unsafe { instance.cast::<AimSplitSystem>().as_ref() }) else {
        return;
    };

    let Some(ctx) = context::current() else {
        warn!("register_updates called while no host context is attached");
        return;
    };
    let Some(api) = ctx.updates() else {
        warn!("SDK table has no update registrar, {} will not tick", SYSTEM_TYPE_NAME);
        return;
    };

    system.register_updates(&mut SdkRegistrar::new(api, registrar));
}

//=========================================================================
// Unit Tests
//=========================================================================
