//=========================================================================
// Host Bridge
//=========================================================================
//
// Everything the plugin needs to talk to the mod loader.
//
// This module defines the contract between the loader and the plugin's
// core logic, so the core never touches raw pointers directly.
//
// Components:
// - `abi`: `#[repr(C)]` types, interface tables and version constants
// - `context`: the handle and SDK table stored on load
// - `logger`: `log` backend writing to the host's log channels
// - `registrar`: per-frame update registration
// - `error`: plugin-side failures at the boundary
//
//=========================================================================

//=== Module Declarations =================================================

pub mod abi;
pub(crate) mod context;
mod error;
mod logger;
pub mod registrar;

//=== Public API ==========================================================

pub use abi::{FrameInfo, JobQueue, UpdateTickGroup};
pub use error::HostError;
pub use logger::HostLogger;
pub use registrar::{SdkRegistrar, UpdateFn, UpdateRegistrar};
