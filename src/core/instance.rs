//=========================================================================
// Live Instance Slot
//=========================================================================
//
// Back-reference from the zero-argument action function to the live
// system. This is the plugin's one intentional process-wide mutable cell.
//
// The slot holds a `Weak` so it can never keep a destroyed system alive,
// and is cleared explicitly when the owning system drops.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::warn;

//=== Internal Dependencies ===============================================

use super::mode::AimMode;
use super::system::{lock_state, AimState, SharedState};

//=== InstanceSlot ========================================================

/// Holds at most one live system state.
///
/// # Lifecycle
///
/// 1. **Install**: a new system points the slot at its state, warning if
///    a live one is replaced
/// 2. **Lookup**: `get`/`mode` upgrade the weak reference
/// 3. **Clear**: the owning system empties the slot on drop; a stale
///    system never clears a newer one
///
/// # Thread Safety
///
/// Usable from any thread. The slot holds only a `Weak`, so it never keeps
/// a destroyed system alive. Poisoned locks are recovered.
pub struct InstanceSlot {
    live: Mutex<Option<Weak<Mutex<AimState>>>>,
}

/// Slot the host-facing action function reads.
pub static AIM_SPLIT: InstanceSlot = InstanceSlot::new();

impl InstanceSlot {
    pub const fn new() -> Self {
        Self { live: Mutex::new(None) }
    }

    /// Points the slot at `state`, replacing whatever it held.
    pub(crate) fn install(&self, state: &SharedState) {
        let mut live = self.lock();
        if live.as_ref().and_then(Weak::upgrade).is_some() {
            warn!("Replacing a live AimSplitSystem instance");
        }
        *live = Some(Arc::downgrade(state));
    }

    /// Empties the slot if it still points at `state`.
    ///
    /// Returns `false` when a newer instance owns the slot; it is left alone.
    pub(crate) fn clear(&self, state: &SharedState) -> bool {
        let mut live = self.lock();
        let owned = live
            .as_ref()
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Arc::as_ptr(state)));

        if owned {
            *live = None;
        }
        owned
    }

    /// Returns the live state, if any.
    pub(crate) fn get(&self) -> Option<SharedState> {
        self.lock().as_ref().and_then(Weak::upgrade)
    }

    /// Returns `true` while a system is live.
    pub fn is_live(&self) -> bool {
        self.get().is_some()
    }

    /// Mode of the live system, if any.
    pub fn mode(&self) -> Option<AimMode> {
        self.get().map(|state| lock_state(&state).mode())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Weak<Mutex<AimState>>>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InstanceSlot {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> SharedState {
        Arc::new(Mutex::new(AimState::default()))
    }

    #[test]
    fn new_slot_is_empty() {
        let slot = InstanceSlot::new();
        assert!(!slot.is_live());
        assert_eq!(slot.mode(), None);
    }

    #[test]
    fn install_makes_state_reachable() {
        let slot = InstanceSlot::new();
        let state = shared();

        slot.install(&state);

        assert!(slot.is_live());
        assert_eq!(slot.mode(), Some(AimMode::Look));
        assert!(Arc::ptr_eq(&slot.get().unwrap(), &state));
    }

    #[test]
    fn clear_empties_own_slot() {
        let slot = InstanceSlot::new();
        let state = shared();
        slot.install(&state);

        assert!(slot.clear(&state));
        assert!(!slot.is_live());
    }

    #[test]
    fn stale_clear_keeps_newer_instance() {
        let slot = InstanceSlot::new();
        let old = shared();
        let new = shared();

        slot.install(&old);
        slot.install(&new);

        assert!(!slot.clear(&old));
        assert!(Arc::ptr_eq(&slot.get().unwrap(), &new));
    }

    #[test]
    fn dropped_state_reads_as_absent() {
        let slot = InstanceSlot::new();
        let state = shared();
        slot.install(&state);

        drop(state);

        assert!(!slot.is_live());
        assert_eq!(slot.mode(), None);
    }
}
