//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aim_split::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Plugin logic
pub use crate::core::{
    on_action, on_action_in, ActionOutcome, AimMode, AimSplitSystem, GameSystem, InstanceSlot,
    AIM_SPLIT,
};

// Host interface
pub use crate::host::{FrameInfo, HostError, JobQueue, UpdateRegistrar, UpdateTickGroup};

// Harness
pub use crate::harness::{
    Harness, HarnessBuilder, HarnessError, HostEvent, KeyBindings, KeyCode, PluginExports,
    RunSummary,
};
