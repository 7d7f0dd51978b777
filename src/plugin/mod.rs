//=========================================================================
// Plugin Surface
//=========================================================================
//
// What the mod loader sees: the exported entry points, the metadata
// record, and the types registered on load.
//
//=========================================================================

//=== Module Declarations =================================================

mod entry;
mod info;
mod types;

//=== Public API ==========================================================

pub use entry::{Main, Query, Supports};
pub use info::{plugin_info, PLUGIN_AUTHOR, PLUGIN_NAME, PLUGIN_VERSION};
