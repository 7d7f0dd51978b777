//=========================================================================
// Plugin Metadata
//=========================================================================
//
// Fixed record reported through `Query`.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::host::abi::{wide, PluginInfo, SemVer, RUNTIME_LATEST, SDK_LATEST};

//=== Metadata ============================================================

// Deliberately the mod's own identity. The loader template's placeholder
// name and author ("RED4ext.Example.VisualStudio", "WopsS") are not reused.
pub const PLUGIN_NAME: &str = "AimSplit";
pub const PLUGIN_AUTHOR: &str = "AimSplit contributors";
pub const PLUGIN_VERSION: SemVer = SemVer::new(1, 0, 0);

static PLUGIN_NAME_W: [u16; PLUGIN_NAME.len() + 1] = wide(PLUGIN_NAME);
static PLUGIN_AUTHOR_W: [u16; PLUGIN_AUTHOR.len() + 1] = wide(PLUGIN_AUTHOR);

/// Builds the metadata record. Every call yields the same values.
pub fn plugin_info() -> PluginInfo {
    PluginInfo {
        name: PLUGIN_NAME_W.as_ptr(),
        author: PLUGIN_AUTHOR_W.as_ptr(),
        version: PLUGIN_VERSION,
        runtime: RUNTIME_LATEST,
        sdk: SDK_LATEST,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
