//=========================================================================
// AimSplit Core
//=========================================================================
//
// Plugin logic that runs on host threads: the game system, its aim mode,
// the per-frame hook and the toggle action.
//
// Notes:
// Nothing in here touches the loader ABI directly. Host access goes
// through `crate::host` (logging via the `log` facade, updates via
// `UpdateRegistrar`).
//
//=========================================================================

//=== Module Declarations =================================================

mod action;
mod instance;
mod mode;
mod system;

//=== Public API ==========================================================

pub use action::{aim_split_on_action, on_action, on_action_in, ActionOutcome};
pub use instance::{InstanceSlot, AIM_SPLIT};
pub use mode::AimMode;
pub use system::{AimSplitSystem, AimState, GameSystem};

//=== Names & Limits ======================================================

/// Update slot the system claims in the player-aim group.
pub const UPDATE_NAME: &str = "AimSplitTick";

/// Ticks that emit a diagnostic before the hook goes quiet.
pub const UPDATE_LOG_LIMIT: u32 = 3;

/// Host-side name of the toggle function.
pub const ACTION_NAME: &str = "AimSplit_OnAction";

/// Host-side name of the game system type.
pub const SYSTEM_TYPE_NAME: &str = "AimSplitSystem";

/// Host type the system derives from.
pub const SYSTEM_PARENT_NAME: &str = "gameIGameSystem";
