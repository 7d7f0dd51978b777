//=========================================================================
// Host Harness
//=========================================================================
//
// In-process stand-in for the game's mod loader.
//
// Architecture:
// ```text
//     HarnessBuilder ──build()──> Harness ──load()──> Main(Load)
//         │                          │
//         ├─ with_tps()              ├─ start_game()  create + register_updates
//         ├─ with_channel_capacity() ├─ tick()        UpdateScheduler
//         ├─ with_runtime()          ├─ invoke()      registered functions
//         └─ with_console_echo()     ├─ end_game()    destroy
//                                    └─ unload()      Main(Unload)
//
//     spawn(): logic thread @ TPS  ◄── Receiver<HostEvent> ◄── Platform
// ```
//
// A harness drives one plugin at a time. Plugins keep process-wide state,
// so only one harness should have a plugin loaded at once.
//
//=========================================================================

//=== Module Declarations =================================================

mod collector;
mod error;
mod keys;
mod scheduler;
mod sdk;

#[cfg(feature = "window")]
pub mod platform;

//=== External Dependencies ===============================================

use std::ffi::c_void;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::host::abi::{
    FileVersion, FrameInfo, MainFn, MainReason, PluginHandle, PluginInfo, QueryFn, Sdk, SemVer,
    SupportsFn, API_VERSION_LATEST, RUNTIME_LATEST,
};
use collector::{EventCollector, TickControl};
use scheduler::UpdateScheduler;
use sdk::PluginRecord;

//=== Public API ==========================================================

pub use error::HarnessError;
pub use keys::{KeyBindings, KeyCode};
pub use sdk::{HostLogLevel, LogLine};

//=== Plugin Exports ======================================================

/// The three entry points a loader resolves from a plugin library.
#[derive(Debug, Clone, Copy)]
pub struct PluginExports {
    pub main: MainFn,
    pub query: QueryFn,
    pub supports: SupportsFn,
}

impl PluginExports {
    /// Exports of the plugin built into this crate.
    pub fn aim_split() -> Self {
        Self {
            main: crate::plugin::Main,
            query: crate::plugin::Query,
            supports: crate::plugin::Supports,
        }
    }
}

/// Owned copy of the metadata a plugin reported through `Query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPlugin {
    pub name: String,
    pub author: String,
    pub version: SemVer,
    pub runtime: FileVersion,
    pub sdk: SemVer,
}

impl From<&PluginInfo> for LoadedPlugin {
    fn from(info: &PluginInfo) -> Self {
        Self {
            name: info.name_lossy(),
            author: info.author_lossy(),
            version: info.version,
            runtime: info.runtime,
            sdk: info.sdk,
        }
    }
}

//=== Events ==============================================================

/// Messages from the platform side to the logic thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Invoke the named global function.
    Action(String),
    /// Tear down and end the run loop.
    Shutdown,
}

/// What a finished run loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub actions: u64,
}

//=== HarnessBuilder ======================================================

/// Builder for configuring a [`Harness`].
///
/// # Default Values
///
/// - **TPS**: 60.0
/// - **Channel capacity**: 128 events
/// - **Runtime**: [`RUNTIME_LATEST`]
/// - **Console echo**: off
///
/// # Examples
///
/// ```
/// use aim_split::harness::{HarnessBuilder, PluginExports};
///
/// let mut harness = HarnessBuilder::new().build();
/// harness.load(PluginExports::aim_split()).unwrap();
/// harness.start_game().unwrap();
/// harness.invoke("AimSplit_OnAction").unwrap();
/// harness.unload().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HarnessBuilder {
    tps: f64,
    channel_capacity: usize,
    runtime: FileVersion,
    echo: bool,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            runtime: RUNTIME_LATEST,
            echo: false,
        }
    }

    /// Sets the logic thread's target ticks per second.
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tps(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "TPS must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the channel returned by [`HarnessBuilder::channel`].
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Runtime version the harness claims to be.
    pub fn with_runtime(mut self, runtime: FileVersion) -> Self {
        self.runtime = runtime;
        self
    }

    /// Mirrors every plugin log line to stderr.
    pub fn with_console_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Creates a bounded event channel sized by this builder.
    pub fn channel(&self) -> (Sender<HostEvent>, Receiver<HostEvent>) {
        bounded(self.channel_capacity)
    }

    pub fn build(self) -> Harness {
        debug!(
            target: "harness",
            "Building harness (TPS: {}, runtime: {}, echo: {})",
            self.tps, self.runtime, self.echo
        );
        let record = Box::new(PluginRecord::new(self.echo));
        let sdk = Box::new(sdk::sdk(self.runtime));

        Harness {
            tps: self.tps,
            runtime: self.runtime,
            record,
            sdk,
            scheduler: Box::new(UpdateScheduler::new()),
            exports: None,
            plugin: None,
            systems: Vec::new(),
            frame: 0,
        }
    }

    /// Runs a plugin on a new logic thread until `Shutdown` or disconnect.
    ///
    /// The thread loads the plugin, starts a game session, ticks at the
    /// configured rate while dispatching actions, then unloads.
    pub fn spawn(
        self,
        exports: PluginExports,
        events: Receiver<HostEvent>,
    ) -> JoinHandle<Result<RunSummary, HarnessError>> {
        thread::spawn(move || {
            let mut harness = self.build();
            harness.run(exports, events)
        })
    }
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Harness =============================================================

/// A live game system created through its descriptor.
struct LiveSystem {
    name: String,
    instance: *mut c_void,
    destroy: Option<extern "C" fn(*mut c_void)>,
}

/// In-process plugin host.
///
/// # Lifecycle
///
/// 1. **Load**: `load()` checks `Supports` and the runtime, then calls
///    `Main(Load)`; a rejected load is answered with `Main(Unload)`
/// 2. **Session**: `start_game()` creates registered systems, `tick()` runs
///    update slots in tick-group order, `invoke()` calls global functions
/// 3. **End**: `end_game()` drops the update slots before destroying systems
/// 4. **Unload**: `unload()` ends the session and calls `Main(Unload)`;
///    dropping a loaded harness does the same
///
/// # Thread Safety
///
/// Not `Send`: it holds raw instance pointers. Build it on the thread
/// that drives it, as [`HarnessBuilder::spawn`] does.
///
/// # Errors
///
/// Loader failures surface as [`HarnessError`]. Plugin log lines are kept
/// in the record and read back with `log_lines()`.
///
/// # Examples
///
/// ```
/// use aim_split::harness::{HarnessBuilder, PluginExports};
///
/// let mut harness = HarnessBuilder::new().build();
/// harness.load(PluginExports::aim_split()).unwrap();
/// harness.start_game().unwrap();
/// harness.tick(1.0 / 60.0);
///
/// assert_eq!(harness.lines_containing("OnUpdate tick").len(), 1);
/// harness.unload().unwrap();
/// assert!(!harness.is_loaded());
/// ```
pub struct Harness {
    tps: f64,
    runtime: FileVersion,
    record: Box<PluginRecord>,
    sdk: Box<Sdk>,
    scheduler: Box<UpdateScheduler>,
    exports: Option<PluginExports>,
    plugin: Option<LoadedPlugin>,
    systems: Vec<LiveSystem>,
    frame: u64,
}

impl Harness {
    //--- Lifecycle --------------------------------------------------------

    /// Checks a plugin's API and runtime, then calls `Main(Load)`.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::AlreadyLoaded`] if a plugin is loaded.
    /// - [`HarnessError::UnsupportedApi`] if `Supports()` disagrees.
    /// - [`HarnessError::RuntimeMismatch`] if the plugin targets another runtime.
    /// - [`HarnessError::LoadRejected`] if `Main(Load)` returns false. The
    ///   plugin has been sent `Main(Unload)` by then.
    pub fn load(&mut self, exports: PluginExports) -> Result<LoadedPlugin, HarnessError> {
        if self.exports.is_some() {
            return Err(HarnessError::AlreadyLoaded);
        }

        let found = (exports.supports)();
        if found != API_VERSION_LATEST {
            return Err(HarnessError::UnsupportedApi { expected: API_VERSION_LATEST, found });
        }

        let mut info = PluginInfo::empty();
        (exports.query)(&mut info);
        let plugin = LoadedPlugin::from(&info);

        if plugin.runtime != self.runtime && plugin.runtime != FileVersion::INDEPENDENT {
            return Err(HarnessError::RuntimeMismatch {
                host: self.runtime,
                plugin: plugin.runtime,
            });
        }

        if !(exports.main)(self.handle(), MainReason::Load.as_raw(), self.sdk_ptr()) {
            (exports.main)(self.handle(), MainReason::Unload.as_raw(), self.sdk_ptr());
            self.record.reset_types();
            return Err(HarnessError::LoadRejected(plugin.name));
        }

        info!(
            target: "harness",
            "Loaded {} {} by {}",
            plugin.name, plugin.version, plugin.author
        );
        self.exports = Some(exports);
        self.plugin = Some(plugin.clone());
        Ok(plugin)
    }

    /// Instantiates every registered system and lets it register updates.
    ///
    /// Returns the number of live systems. Calling it again while a
    /// session is running changes nothing.
    pub fn start_game(&mut self) -> Result<usize, HarnessError> {
        if self.exports.is_none() {
            return Err(HarnessError::NotLoaded);
        }
        if !self.systems.is_empty() {
            warn!(target: "harness", "Game session already running");
            return Ok(self.systems.len());
        }

        for descriptor in self.record.systems() {
            let Some(create) = descriptor.create else {
                warn!(target: "harness", "System {} has no constructor", descriptor.name);
                continue;
            };
            let instance = create();
            if instance.is_null() {
                warn!(target: "harness", "System {} constructor returned null", descriptor.name);
                continue;
            }
            if let Some(register_updates) = descriptor.register_updates {
                register_updates(instance, self.scheduler.as_registrar());
            }
            debug!(
                target: "harness",
                "System {} ({}) started",
                descriptor.name, descriptor.parent
            );
            self.systems.push(LiveSystem {
                name: descriptor.name,
                instance,
                destroy: descriptor.destroy,
            });
        }

        info!(
            target: "harness",
            "Game started: {} systems, {} updates",
            self.systems.len(),
            self.scheduler.len()
        );
        Ok(self.systems.len())
    }

    /// Runs one frame of updates. Returns the new frame number.
    pub fn tick(&mut self, delta_seconds: f32) -> u64 {
        self.frame += 1;
        let frame = FrameInfo { frame: self.frame, delta_seconds };
        self.scheduler.run_frame(&frame);
        self.frame
    }

    /// Calls a registered global function.
    pub fn invoke(&mut self, name: &str) -> Result<(), HarnessError> {
        if self.exports.is_none() {
            return Err(HarnessError::NotLoaded);
        }
        let function = self
            .record
            .function(name)
            .ok_or_else(|| HarnessError::UnknownFunction(name.to_string()))?;
        function();
        Ok(())
    }

    /// Stops updates and destroys systems, newest first. Returns how many.
    pub fn end_game(&mut self) -> usize {
        self.scheduler.clear();
        let count = self.systems.len();
        while let Some(system) = self.systems.pop() {
            if let Some(destroy) = system.destroy {
                destroy(system.instance);
            } else {
                warn!(target: "harness", "System {} has no destructor, leaking it", system.name);
            }
        }
        if count > 0 {
            info!(target: "harness", "Game ended after frame {}", self.frame);
        }
        count
    }

    /// Ends the session and calls `Main(Unload)`.
    pub fn unload(&mut self) -> Result<(), HarnessError> {
        let exports = self.exports.take().ok_or(HarnessError::NotLoaded)?;
        self.end_game();
        (exports.main)(self.handle(), MainReason::Unload.as_raw(), self.sdk_ptr());
        self.record.reset_types();

        if let Some(plugin) = self.plugin.take() {
            info!(target: "harness", "Unloaded {}", plugin.name);
        }
        Ok(())
    }

    //--- Run Loop ---------------------------------------------------------

    /// Drives a plugin at the configured TPS until shutdown.
    pub fn run(
        &mut self,
        exports: PluginExports,
        events: Receiver<HostEvent>,
    ) -> Result<RunSummary, HarnessError> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.tps);
        let delta_seconds = frame_duration.as_secs_f32();

        self.load(exports)?;
        self.start_game()?;

        let mut collector = EventCollector::new(events);
        let mut summary = RunSummary::default();

        info!(target: "harness", "Logic thread running at {} TPS", self.tps);

        loop {
            let frame_start = Instant::now();
            let control = collector.collect_frame();

            for action in collector.take_actions() {
                match self.invoke(&action) {
                    Ok(()) => summary.actions += 1,
                    Err(e) => warn!(target: "harness", "{}", e),
                }
            }

            if control == TickControl::Exit {
                break;
            }

            self.tick(delta_seconds);
            summary.frames += 1;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        self.unload()?;
        info!(
            target: "harness",
            "Logic thread stopped after {} frames, {} actions",
            summary.frames, summary.actions
        );
        Ok(summary)
    }

    //--- Inspection -------------------------------------------------------

    /// Every line the plugin has written through the host logger.
    pub fn log_lines(&self) -> Vec<LogLine> {
        self.record.logs()
    }

    /// Log messages containing `needle`.
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.record
            .logs()
            .into_iter()
            .filter(|line| line.message.contains(needle))
            .map(|line| line.message)
            .collect()
    }

    pub fn clear_log(&self) {
        self.record.clear_logs();
    }

    /// Metadata of the loaded plugin.
    pub fn plugin_info(&self) -> Option<&LoadedPlugin> {
        self.plugin.as_ref()
    }

    /// Update slot names in execution order.
    pub fn update_names(&self) -> Vec<String> {
        self.scheduler.names()
    }

    /// Registered global function names, sorted.
    pub fn function_names(&self) -> Vec<String> {
        self.record.function_names()
    }

    /// Names and parents of registered system types.
    pub fn system_types(&self) -> Vec<(String, String)> {
        self.record
            .systems()
            .into_iter()
            .map(|system| (system.name, system.parent))
            .collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.exports.is_some()
    }

    pub fn live_systems(&self) -> usize {
        self.systems.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    //--- Internal Helpers -------------------------------------------------

    fn handle(&self) -> PluginHandle {
        (&*self.record as *const PluginRecord as *mut PluginRecord).cast()
    }

    fn sdk_ptr(&self) -> *const Sdk {
        &*self.sdk
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        if self.is_loaded() {
            if let Err(e) = self.unload() {
                warn!(target: "harness", "Unload on drop failed: {}", e);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
