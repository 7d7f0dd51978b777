//=========================================================================
// AimSplit Library Root
//
// A game-runtime plugin that keeps one aim mode per game session and
// flips it when the host invokes the bound action.
//
// Layers:
// ```text
//   plugin   ── exported Main/Query/Supports, type registration
//     │
//   core     ── AimSplitSystem, AimMode, global instance slot, action
//     │
//   host     ── C ABI tables, host context, logger bridge, registrar
//
//   harness  ── in-process loader used by tests and `aimsplit-host`
// ```
//
// Built as a `cdylib` for the loader and an `rlib` so the harness and
// tests can drive the same code in-process.
//
//=========================================================================

//--- Public Modules ------------------------------------------------------

pub mod core;
pub mod harness;
pub mod host;
pub mod plugin;
pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use crate::core::{on_action, ActionOutcome, AimMode, AimSplitSystem, AIM_SPLIT};
pub use crate::harness::{Harness, HarnessBuilder, HarnessError, PluginExports};
pub use crate::host::HostError;
