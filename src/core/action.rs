//=========================================================================
// Toggle Action
//=========================================================================
//
// Handler behind the host's `AimSplit_OnAction` binding.
//
// The host calls a zero-argument function, so the handler reaches the
// system through the instance slot and tolerates an empty slot.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::instance::{InstanceSlot, AIM_SPLIT};
use super::mode::AimMode;
use super::system::lock_state;
use super::ACTION_NAME;

//=== ActionOutcome =======================================================

/// What a toggle request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The live system flipped to this mode.
    Toggled(AimMode),

    /// No system was live; nothing changed.
    NoInstance,
}

//=== Handlers ============================================================

/// Toggles the live system in the process-wide slot.
pub fn on_action() -> ActionOutcome {
    on_action_in(&AIM_SPLIT)
}

/// Toggles the live system in `slot`, or logs that none is live.
pub fn on_action_in(slot: &InstanceSlot) -> ActionOutcome {
    match slot.get() {
        Some(state) => ActionOutcome::Toggled(lock_state(&state).toggle()),
        None => {
            trace!("{} called but system instance is null", ACTION_NAME);
            ActionOutcome::NoInstance
        }
    }
}

/// Host-callable form of [`on_action`], registered as `AimSplit_OnAction`.
pub extern "C" fn aim_split_on_action() {
    on_action();
}

//=========================================================================
// Unit Tests
//=========================================================================
