//=========================================================================
// Update Registrar
//=========================================================================
//
// Rust-side view of the host's per-frame update scheduler.
//
// Architecture:
//   GameSystem::register_updates(&mut dyn UpdateRegistrar)
//        │
//        ├─ SdkRegistrar  → UpdateRegistrarApi.register_update (C ABI)
//        │                    ctx = owned Box<UpdateFn>, cb = dispatch_update
//        └─ any other impl (tests, in-process hosts)
//
// Closures handed to the host stay alive until `release_updates` runs on
// `Main(Unload)`. A new system registers once per game session, so one
// closure accumulates per session while the plugin stays loaded.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_void, CString};
use std::ptr::NonNull;
use std::sync::{Mutex, PoisonError};

use log::warn;

//=== Internal Dependencies ===============================================

use super::abi::{FrameInfo, JobQueue, UpdateRegistrarApi, UpdateTickGroup};

//=== UpdateRegistrar =====================================================

/// Boxed per-frame callback.
pub type UpdateFn = Box<dyn FnMut(&FrameInfo, JobQueue) + Send + 'static>;

/// Accepts per-frame callbacks for a named slot in a tick group.
pub trait UpdateRegistrar {
    /// Registers `callback` to run once per frame in `group`.
    fn register_update(&mut self, group: UpdateTickGroup, name: &str, callback: UpdateFn);
}

//=== SdkRegistrar ========================================================

/// [`UpdateRegistrar`] backed by the host's C registrar table.
pub struct SdkRegistrar<'a> {
    api: &'a UpdateRegistrarApi,
    raw: *mut c_void,
}

impl<'a> SdkRegistrar<'a> {
    /// Wraps the registrar instance the host passed to `register_updates`.
    pub fn new(api: &'a UpdateRegistrarApi, raw: *mut c_void) -> Self {
        Self { api, raw }
    }
}

impl UpdateRegistrar for SdkRegistrar<'_> {
    fn register_update(&mut self, group: UpdateTickGroup, name: &str, callback: UpdateFn) {
        let Some(register) = self.api.register_update else {
            warn!("Host registrar has no register_update entry, dropping {}", name);
            return;
        };

        let name = match CString::new(name) {
            Ok(name) => name,
            Err(e) => {
                warn!("Update name {:?} rejected: {}", name, e);
                return;
            }
        };

        // The host never releases update slots; the box is freed on unload.
        let owned = NonNull::from(Box::leak(Box::new(callback)));
        lock_owned().push(OwnedUpdate(owned));

        register(self.raw, group.as_raw(), name.as_ptr(), owned.as_ptr().cast(), Some(dispatch_update));
    }
}

//=== Owned Update Closures ===============================================

/// A boxed closure whose pointer was handed to the host as slot context.
struct OwnedUpdate(NonNull<UpdateFn>);

// SAFETY: `UpdateFn` is `Send`, and the pointer is only dereferenced by
// the host's dispatch or by `release_updates`.
unsafe impl Send for OwnedUpdate {}

static OWNED_UPDATES: Mutex<Vec<OwnedUpdate>> = Mutex::new(Vec::new());

fn lock_owned() -> std::sync::MutexGuard<'static, Vec<OwnedUpdate>> {
    OWNED_UPDATES.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Closures currently handed out to the host.
#[cfg(test)]
pub(crate) fn owned_update_count() -> usize {
    lock_owned().len()
}

/// Frees every closure handed to the host. Returns how many were freed.
///
/// Only call once the host has stopped running update slots, i.e. on
/// `Main(Unload)`.
pub(crate) fn release_updates() -> usize {
    let owned = std::mem::take(&mut *lock_owned());
    let count = owned.len();
    for OwnedUpdate(update) in owned {
        // SAFETY: produced by `Box::leak` in `register_update`, released once.
        drop(unsafe { Box::from_raw(update.as_ptr()) });
    }
    count
}

/// Trampoline the host calls each frame with the boxed callback as context.
extern "C" fn dispatch_update(context: *mut c_void, frame: *const FrameInfo, jobs: *mut c_void) {
    // SAFETY: `context` is a `Box<UpdateFn>` held in `OWNED_UPDATES` until unload,
    // and the host runs a given slot from one thread at a time.
    let Some(callback) = (unsafe { context.cast::<UpdateFn>().as_mut() }) else {
        return;
    };
    // SAFETY: the host passes a frame record valid for the duration of the call.
    let Some(frame) = (unsafe { frame.as_ref() }) else {
        return;
    };

    callback(frame, JobQueue::from_raw(jobs));
}

//=========================================================================
// Unit Tests
//=========================================================================
