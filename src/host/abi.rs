//=========================================================================
// Loader ABI
//=========================================================================
//
// `#[repr(C)]` contract between the mod loader and the plugin.
//
// Layout:
//   Sdk ─┬─ LoggerApi           (host log channels)
//        ├─ UpdateRegistrarApi  (per-frame update slots)
//        └─ TypeRegistrarApi    (game system types, global functions)
//
// Function-pointer fields are `Option<extern "C" fn>` so a null entry from
// the host is a `None` instead of undefined behaviour. Enums cross the
// boundary as raw `u32` and are decoded with `from_raw`.
//
// Strings handed to the host are borrowed for the duration of the call.
// The host copies anything it keeps, descriptors included.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::{c_char, c_void};

//=== Handles & Callbacks =================================================

/// Opaque token the host uses to identify this plugin.
pub type PluginHandle = *mut c_void;

/// Per-frame update callback: `(context, frame, job_queue)`.
pub type UpdateCallback = extern "C" fn(*mut c_void, *const FrameInfo, *mut c_void);

/// Zero-argument function exposed to host-side bindings.
pub type GlobalFunction = extern "C" fn();

/// Signature of the exported `Main` entry point.
pub type MainFn = extern "C" fn(PluginHandle, u32, *const Sdk) -> bool;

/// Signature of the exported `Query` entry point.
pub type QueryFn = extern "C" fn(*mut PluginInfo);

/// Signature of the exported `Supports` entry point.
pub type SupportsFn = extern "C" fn() -> u32;

//=== Versions ============================================================

/// Loader interface version this plugin is built against.
pub const API_VERSION_LATEST: u32 = 1;

/// SDK version this plugin is built against.
pub const SDK_LATEST: SemVer = SemVer::new(0, 5, 0);

/// Game runtime version this plugin targets.
pub const RUNTIME_LATEST: FileVersion = FileVersion::new(2, 21, 0, 0);

/// Pre-release tag of a [`SemVer`]. `kind == 0` means a final release.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Prerelease {
    pub kind: u32,
    pub number: u32,
}

/// Semantic version as laid out by the loader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemVer {
    pub major: u8,
    pub minor: u16,
    pub patch: u32,
    pub prerelease: Prerelease,
}

impl SemVer {
    /// Creates a release version (no pre-release tag).
    pub const fn new(major: u8, minor: u16, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: Prerelease { kind: 0, number: 0 },
        }
    }
}

impl std::fmt::Display for SemVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Four-part executable version of the game runtime.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileVersion {
    pub major: u16,
    pub minor: u16,
    pub build: u16,
    pub revision: u16,
}

impl FileVersion {
    /// Declares that the plugin loads on any runtime.
    pub const INDEPENDENT: FileVersion = FileVersion::new(0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF);

    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self { major, minor, build, revision }
    }
}

impl std::fmt::Display for FileVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
    }
}

//=== MainReason ==========================================================

/// Why the host is calling `Main`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainReason {
    Unload = 0,
    Load = 1,
}

impl MainReason {
    /// Decodes the raw reason code. Unknown codes return `None`.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Unload),
            1 => Some(Self::Load),
            _ => None,
        }
    }

    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

//=== UpdateTickGroup =====================================================

/// Named phases of the host's frame, in execution order.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UpdateTickGroup {
    FrameBegin = 0,
    EntityUpdateEarly = 1,
    PlayerInput = 2,
    PlayerAimUpdate = 3,
    EntityUpdate = 4,
    CameraUpdate = 5,
    PostCamera = 6,
    FrameEnd = 7,
}

impl UpdateTickGroup {
    /// Every group, in the order the host runs them.
    pub const ALL: [UpdateTickGroup; 8] = [
        Self::FrameBegin,
        Self::EntityUpdateEarly,
        Self::PlayerInput,
        Self::PlayerAimUpdate,
        Self::EntityUpdate,
        Self::CameraUpdate,
        Self::PostCamera,
        Self::FrameEnd,
    ];

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::FrameBegin),
            1 => Some(Self::EntityUpdateEarly),
            2 => Some(Self::PlayerInput),
            3 => Some(Self::PlayerAimUpdate),
            4 => Some(Self::EntityUpdate),
            5 => Some(Self::CameraUpdate),
            6 => Some(Self::PostCamera),
            7 => Some(Self::FrameEnd),
            _ => None,
        }
    }

    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

//=== Frame Data ==========================================================

/// Per-frame record populated by the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    /// Monotonic frame counter, starting at 1.
    pub frame: u64,
    /// Seconds since the previous frame.
    pub delta_seconds: f32,
}

/// Host job-submission handle passed to update callbacks.
///
/// Opaque to the plugin. A detached queue wraps a null pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobQueue {
    raw: *mut c_void,
}

impl JobQueue {
    pub fn from_raw(raw: *mut c_void) -> Self {
        Self { raw }
    }

    /// A queue that is not backed by the host.
    pub fn detached() -> Self {
        Self { raw: std::ptr::null_mut() }
    }

    pub fn as_raw(&self) -> *mut c_void {
        self.raw
    }

    pub fn is_detached(&self) -> bool {
        self.raw.is_null()
    }
}

//=== Plugin Metadata =====================================================

/// Metadata record filled by `Query`.
///
/// `name` and `author` point at NUL-terminated UTF-16 strings owned by the
/// plugin for the whole process lifetime.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PluginInfo {
    pub name: *const u16,
    pub author: *const u16,
    pub version: SemVer,
    pub runtime: FileVersion,
    pub sdk: SemVer,
}

impl PluginInfo {
    /// An empty record for the host to hand to `Query`.
    pub fn empty() -> Self {
        Self {
            name: std::ptr::null(),
            author: std::ptr::null(),
            version: SemVer::new(0, 0, 0),
            runtime: FileVersion::new(0, 0, 0, 0),
            sdk: SemVer::new(0, 0, 0),
        }
    }

    /// Decodes `name`, or an empty string if unset.
    pub fn name_lossy(&self) -> String {
        // SAFETY: `Query` only stores pointers to NUL-terminated statics.
        unsafe { read_wide(self.name) }
    }

    /// Decodes `author`, or an empty string if unset.
    pub fn author_lossy(&self) -> String {
        // SAFETY: see `name_lossy`.
        unsafe { read_wide(self.author) }
    }
}

/// Reads a NUL-terminated UTF-16 string.
///
/// # Safety
///
/// `ptr` must be null or point at a readable, NUL-terminated `u16` sequence.
pub unsafe fn read_wide(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }

    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }

    String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len))
}

/// Encodes an ASCII string as a NUL-terminated UTF-16 array.
///
/// `N` must be at least `text.len() + 1`; the remainder is zero-filled.
pub const fn wide<const N: usize>(text: &str) -> [u16; N] {
    let bytes = text.as_bytes();
    assert!(bytes.len() < N, "wide string buffer too small");

    let mut out = [0u16; N];
    let mut i = 0;
    while i < bytes.len() {
        assert!(bytes[i].is_ascii(), "wide strings must be ASCII");
        out[i] = bytes[i] as u16;
        i += 1;
    }
    out
}

//=== Interface Tables ====================================================

/// Host log channels. Each takes the plugin handle and a C string.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggerApi {
    pub trace: Option<extern "C" fn(PluginHandle, *const c_char)>,
    pub debug: Option<extern "C" fn(PluginHandle, *const c_char)>,
    pub info: Option<extern "C" fn(PluginHandle, *const c_char)>,
    pub warn: Option<extern "C" fn(PluginHandle, *const c_char)>,
    pub error: Option<extern "C" fn(PluginHandle, *const c_char)>,
}

/// Host update scheduler, reached through a registrar instance pointer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateRegistrarApi {
    /// `(registrar, group, name, context, callback)`.
    pub register_update:
        Option<extern "C" fn(*mut c_void, u32, *const c_char, *mut c_void, Option<UpdateCallback>)>,
}

/// Describes a game system type to the host's reflection system.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SystemDescriptor {
    /// Type name, NUL-terminated.
    pub name: *const c_char,
    /// Parent type name, NUL-terminated.
    pub parent: *const c_char,
    /// Allocates an instance and returns it as an opaque pointer.
    pub create: Option<extern "C" fn() -> *mut c_void>,
    /// Releases an instance returned by `create`.
    pub destroy: Option<extern "C" fn(*mut c_void)>,
    /// `(instance, registrar)`: lets the instance claim update slots.
    pub register_updates: Option<extern "C" fn(*mut c_void, *mut c_void)>,
}

/// Host reflection / type registry.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeRegistrarApi {
    pub register_system: Option<extern "C" fn(PluginHandle, *const SystemDescriptor)>,
    pub register_function: Option<extern "C" fn(PluginHandle, *const c_char, Option<GlobalFunction>)>,
}

/// Interface table passed to `Main`.
///
/// The host keeps it alive for as long as the plugin stays loaded.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Sdk {
    pub runtime: FileVersion,
    pub logger: *const LoggerApi,
    pub updates: *const UpdateRegistrarApi,
    pub types: *const TypeRegistrarApi,
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_reason_decodes_known_codes() {
        assert_eq!(MainReason::from_raw(0), Some(MainReason::Unload));
        assert_eq!(MainReason::from_raw(1), Some(MainReason::Load));
        assert_eq!(MainReason::Load.as_raw(), 1);
    }

    #[test]
    fn main_reason_rejects_unknown_codes() {
        assert_eq!(MainReason::from_raw(2), None);
        assert_eq!(MainReason::from_raw(u32::MAX), None);
    }

    #[test]
    fn tick_groups_are_listed_in_execution_order() {
        let mut sorted = UpdateTickGroup::ALL;
        sorted.sort();
        assert_eq!(sorted, UpdateTickGroup::ALL);
        assert!(UpdateTickGroup::PlayerInput < UpdateTickGroup::PlayerAimUpdate);
        assert!(UpdateTickGroup::PlayerAimUpdate < UpdateTickGroup::CameraUpdate);
    }

    #[test]
    fn tick_group_raw_code_matches_position() {
        for (index, group) in UpdateTickGroup::ALL.iter().enumerate() {
            assert_eq!(group.as_raw() as usize, index);
            assert_eq!(UpdateTickGroup::from_raw(index as u32), Some(*group));
        }
        assert_eq!(UpdateTickGroup::from_raw(8), None);
    }

    #[test]
    fn wide_encodes_with_terminator() {
        const TEXT: [u16; 4] = wide("Aim");
        assert_eq!(TEXT, [b'A' as u16, b'i' as u16, b'm' as u16, 0]);
    }

    #[test]
    fn read_wide_stops_at_terminator() {
        let text: [u16; 6] = wide("Look");
        let decoded = unsafe { read_wide(text.as_ptr()) };
        assert_eq!(decoded, "Look");
    }

    #[test]
    fn read_wide_handles_null() {
        let decoded = unsafe { read_wide(std::ptr::null()) };
        assert!(decoded.is_empty());
    }

    #[test]
    fn empty_plugin_info_decodes_to_empty_strings() {
        let info = PluginInfo::empty();
        assert!(info.name_lossy().is_empty());
        assert!(info.author_lossy().is_empty());
    }

    #[test]
    fn versions_display_dotted() {
        assert_eq!(SemVer::new(1, 0, 0).to_string(), "1.0.0");
        assert_eq!(FileVersion::new(2, 21, 0, 0).to_string(), "2.21.0.0");
    }

    #[test]
    fn detached_job_queue_is_null() {
        let queue = JobQueue::detached();
        assert!(queue.is_detached());
        assert!(queue.as_raw().is_null());
    }
}
