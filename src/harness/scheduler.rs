//=========================================================================
// Update Scheduler
//=========================================================================
//
// Host-side store of per-frame update slots.
//
// Slots run ordered by tick group, then by registration order within a
// group. The scheduler's address is the `registrar` pointer handed to a
// system's `register_updates`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_char, c_void, CStr};

use log::{trace, warn};

//=== Internal Dependencies ===============================================

use crate::host::abi::{FrameInfo, UpdateCallback, UpdateTickGroup};

//=== UpdateSlot ==========================================================

struct UpdateSlot {
    group: UpdateTickGroup,
    name: String,
    context: *mut c_void,
    callback: UpdateCallback,
}

/// Job queue handed to callbacks. Nothing is scheduled on it yet.
#[derive(Debug, Default)]
struct HostJobQueue;

//=== UpdateScheduler =====================================================

#[derive(Default)]
pub(crate) struct UpdateScheduler {
    slots: Vec<UpdateSlot>,
    jobs: HostJobQueue,
}

impl UpdateScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts after every slot of the same or an earlier group.
    fn insert(&mut self, slot: UpdateSlot) {
        let at = self.slots.partition_point(|s| s.group <= slot.group);
        trace!(target: "harness", "Update '{}' registered in {:?}", slot.name, slot.group);
        self.slots.insert(at, slot);
    }

    /// Invokes every slot once. Returns how many ran.
    pub(crate) fn run_frame(&mut self, frame: &FrameInfo) -> usize {
        let jobs: *mut c_void = (&mut self.jobs as *mut HostJobQueue).cast();
        for slot in &self.slots {
            (slot.callback)(slot.context, frame, jobs);
        }
        self.slots.len()
    }

    /// Slot names in execution order.
    pub(crate) fn names(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    pub(crate) fn as_registrar(&mut self) -> *mut c_void {
        (self as *mut UpdateScheduler).cast()
    }
}

//=== Registrar Callback ==================================================

/// `UpdateRegistrarApi::register_update` as seen by plugins.
pub(crate) extern "C" fn register_update(
    registrar: *mut c_void,
    group: u32,
    name: *const c_char,
    context: *mut c_void,
    callback: Option<UpdateCallback>,
) {
    // SAFETY: the harness only passes `UpdateScheduler::as_registrar` here.
    let Some(scheduler) = (unsafe { registrar.cast::<UpdateScheduler>().as_mut() }) else {
        warn!(target: "harness", "register_update called without a registrar");
        return;
    };
    let Some(group) = UpdateTickGroup::from_raw(group) else {
        warn!(target: "harness", "register_update with unknown tick group {}", group);
        return;
    };
    let Some(callback) = callback else {
        warn!(target: "harness", "register_update without a callback");
        return;
    };

    let name = if name.is_null() {
        String::new()
    } else {
        // SAFETY: non-null names are NUL-terminated for the call.
        unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned()
    };

    scheduler.insert(UpdateSlot { group, name, context, callback });
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::sync::Mutex;

    static ORDER: Mutex<Vec<usize>> = Mutex::new(Vec::new());

    extern "C" fn record_order(context: *mut c_void, frame: *const FrameInfo, jobs: *mut c_void) {
        assert!(!frame.is_null());
        assert!(!jobs.is_null());
        ORDER.lock().unwrap().push(context as usize);
    }

    fn register(scheduler: &mut UpdateScheduler, group: UpdateTickGroup, name: &str, tag: usize) {
        let name = CString::new(name).unwrap();
        register_update(
            scheduler.as_registrar(),
            group.as_raw(),
            name.as_ptr(),
            tag as *mut c_void,
            Some(record_order),
        );
    }

    #[test]
    fn runs_by_group_then_registration_order() {
        let mut scheduler = UpdateScheduler::new();
        register(&mut scheduler, UpdateTickGroup::FrameEnd, "late", 1);
        register(&mut scheduler, UpdateTickGroup::FrameBegin, "early", 2);
        register(&mut scheduler, UpdateTickGroup::FrameEnd, "later", 3);

        ORDER.lock().unwrap().clear();
        let ran = scheduler.run_frame(&FrameInfo { frame: 1, delta_seconds: 0.016 });

        assert_eq!(ran, 3);
        assert_eq!(*ORDER.lock().unwrap(), vec![2, 1, 3]);
        assert_eq!(scheduler.names(), vec!["early", "late", "later"]);
    }

    #[test]
    fn rejects_unknown_group_and_missing_callback() {
        let mut scheduler = UpdateScheduler::new();
        let name = CString::new("ignored").unwrap();

        register_update(scheduler.as_registrar(), 99, name.as_ptr(), std::ptr::null_mut(), Some(record_order));
        register_update(scheduler.as_registrar(), 0, name.as_ptr(), std::ptr::null_mut(), None);

        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn null_registrar_is_ignored() {
        register_update(std::ptr::null_mut(), 0, std::ptr::null(), std::ptr::null_mut(), Some(record_order));
    }

    #[test]
    fn clear_drops_all_slots() {
        let mut scheduler = UpdateScheduler::new();
        register(&mut scheduler, UpdateTickGroup::EntityUpdate, "tick", 7);

        scheduler.clear();

        assert_eq!(scheduler.len(), 0);
        assert_eq!(scheduler.run_frame(&FrameInfo::default()), 0);
    }
}
