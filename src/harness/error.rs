//=========================================================================
// Harness Errors
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::host::abi::FileVersion;

#[cfg(feature = "window")]
use super::platform::PlatformError;

//=== HarnessError ========================================================

/// Host-side failures while loading or driving a plugin.
#[derive(Debug)]
pub enum HarnessError {
    /// `Supports()` returned an API version the harness does not speak.
    UnsupportedApi { expected: u32, found: u32 },

    /// The plugin targets a different runtime build.
    RuntimeMismatch { host: FileVersion, plugin: FileVersion },

    /// `Main(Load)` returned false.
    LoadRejected(String),

    NotLoaded,
    AlreadyLoaded,

    /// No global function with this name is registered.
    UnknownFunction(String),

    /// The window event loop failed.
    #[cfg(feature = "window")]
    Platform(PlatformError),
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedApi { expected, found } => {
                write!(f, "Plugin API version {} not supported (expected {})", found, expected)
            }
            Self::RuntimeMismatch { host, plugin } => {
                write!(f, "Plugin targets runtime {}, host is {}", plugin, host)
            }
            Self::LoadRejected(name) => write!(f, "Plugin '{}' refused to load", name),
            Self::NotLoaded => write!(f, "No plugin is loaded"),
            Self::AlreadyLoaded => write!(f, "A plugin is already loaded"),
            Self::UnknownFunction(name) => write!(f, "No global function named '{}'", name),
            #[cfg(feature = "window")]
            Self::Platform(e) => write!(f, "Platform error: {}", e),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "window")]
            Self::Platform(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "window")]
impl From<PlatformError> for HarnessError {
    fn from(e: PlatformError) -> Self {
        Self::Platform(e)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
