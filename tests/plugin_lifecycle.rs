//=========================================================================
// Plugin Lifecycle Tests
//=========================================================================
//
// Drives the real plugin exports through the in-process harness, the way
// the game's loader would.
//
// The plugin keeps process-wide state (instance slot, host context,
// logger), so every test holds `SERIAL` for its whole run.
//
//=========================================================================

use std::error::Error;
use std::sync::{Mutex, MutexGuard, PoisonError};

use aim_split::core::{ACTION_NAME, SYSTEM_PARENT_NAME, SYSTEM_TYPE_NAME, UPDATE_NAME};
use aim_split::harness::{
    Harness, HarnessBuilder, HarnessError, HostLogLevel, LoadedPlugin, PluginExports,
};
use aim_split::host::abi::{FileVersion, PluginInfo, SemVer, RUNTIME_LATEST, SDK_LATEST};
use aim_split::plugin::{Query, PLUGIN_AUTHOR, PLUGIN_NAME};
use aim_split::{AimMode, HostError, AIM_SPLIT};

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
}

fn loaded() -> Harness {
    let mut harness = HarnessBuilder::new().build();
    harness.load(PluginExports::aim_split()).unwrap();
    harness
}

//=========================================================================
// Load / Unload
//=========================================================================

#[test]
fn load_registers_types_and_reports_metadata() {
    let _guard = serial();
    let mut harness = HarnessBuilder::new().build();

    let plugin = harness.load(PluginExports::aim_split()).unwrap();

    assert_eq!(plugin.name, "AimSplit");
    assert_eq!(plugin.version, SemVer::new(1, 0, 0));
    assert_eq!(plugin.runtime, RUNTIME_LATEST);
    assert_eq!(plugin.sdk, SDK_LATEST);
    assert_eq!(harness.plugin_info(), Some(&plugin));

    assert_eq!(
        harness.system_types(),
        vec![(SYSTEM_TYPE_NAME.to_string(), SYSTEM_PARENT_NAME.to_string())]
    );
    assert_eq!(harness.function_names(), vec![ACTION_NAME.to_string()]);
    assert_eq!(
        harness.lines_containing("Loading AimSplit mod and registering updates."),
        vec!["Loading AimSplit mod and registering updates."]
    );

    harness.unload().unwrap();
    assert!(!harness.is_loaded());
    assert_eq!(harness.lines_containing("Unloading AimSplit mod.").len(), 1);
}

#[test]
fn plugin_lines_use_trace_channel() {
    let _guard = serial();
    let harness = loaded();

    let lines = harness.log_lines();

    assert!(!lines.is_empty());
    assert!(lines.iter().all(|line| line.level == HostLogLevel::Trace));
}

#[test]
fn second_load_is_refused() {
    let _guard = serial();
    let mut harness = loaded();

    let result = harness.load(PluginExports::aim_split());

    assert!(matches!(result, Err(HarnessError::AlreadyLoaded)));
}

#[test]
fn runtime_mismatch_is_refused_before_main() {
    let _guard = serial();
    let mut harness = HarnessBuilder::new()
        .with_runtime(FileVersion::new(2, 12, 0, 0))
        .build();

    let result = harness.load(PluginExports::aim_split());

    assert!(matches!(result, Err(HarnessError::RuntimeMismatch { .. })));
    assert!(harness.log_lines().is_empty());
}

#[test]
fn reload_after_unload_works() {
    let _guard = serial();
    let mut harness = HarnessBuilder::new().build();
    let first = harness.load(PluginExports::aim_split()).unwrap();
    harness.unload().unwrap();

    let second = harness.load(PluginExports::aim_split()).unwrap();

    assert_eq!(second, first);
    assert_eq!(harness.function_names(), vec![ACTION_NAME.to_string()]);
    assert_eq!(harness.lines_containing("Loading AimSplit mod").len(), 2);
}

fn query() -> LoadedPlugin {
    let mut info = PluginInfo::empty();
    Query(&mut info);
    LoadedPlugin::from(&info)
}

#[test]
fn query_is_stable_across_load_cycles_and_sessions() {
    let _guard = serial();
    let before = query();
    let mut harness = HarnessBuilder::new().build();

    for _ in 0..3 {
        harness.load(PluginExports::aim_split()).unwrap();
        assert_eq!(query(), before);
        for _ in 0..5 {
            harness.start_game().unwrap();
            harness.invoke(ACTION_NAME).unwrap();
            harness.tick(0.016);
            harness.end_game();
        }
        harness.unload().unwrap();
    }

    let after = query();
    assert_eq!(after, before);
    assert_eq!(after.name, PLUGIN_NAME);
    assert_eq!(after.author, PLUGIN_AUTHOR);
    assert_eq!(after.version, SemVer::new(1, 0, 0));
    assert_eq!(after.runtime, RUNTIME_LATEST);
    assert_eq!(after.sdk, SDK_LATEST);
}

#[test]
fn logger_conflict_keeps_error_source() {
    struct Silent;

    impl log::Log for Silent {
        fn enabled(&self, _: &log::Metadata) -> bool {
            false
        }
        fn log(&self, _: &log::Record) {}
        fn flush(&self) {}
    }

    static SILENT: Silent = Silent;

    let _guard = serial();
    // Loading installs the plugin's logger, so a second backend is refused.
    let harness = loaded();

    let err = HostError::from(log::set_logger(&SILENT).unwrap_err());

    assert!(matches!(err, HostError::LoggerInstall(_)));
    assert!(err.source().is_some());
    assert!(err.to_string().starts_with("Host logger not installed"));
    drop(harness);
}

//=========================================================================
// Game Session
//=========================================================================

#[test]
fn toggle_scenario_across_a_session() {
    let _guard = serial();
    let mut harness = loaded();

    // Before the game starts there is no instance.
    harness.invoke(ACTION_NAME).unwrap();
    assert_eq!(
        harness.lines_containing("called but system instance is null"),
        vec!["AimSplit_OnAction called but system instance is null"]
    );
    assert!(!AIM_SPLIT.is_live());

    assert_eq!(harness.start_game().unwrap(), 1);
    assert_eq!(AIM_SPLIT.mode(), Some(AimMode::Look));

    let mut modes = Vec::new();
    for _ in 0..3 {
        harness.invoke(ACTION_NAME).unwrap();
        modes.push(AIM_SPLIT.mode());
    }
    assert_eq!(
        modes,
        vec![Some(AimMode::Shoot), Some(AimMode::Look), Some(AimMode::Shoot)]
    );
    assert_eq!(
        harness.lines_containing("mode toggled to"),
        vec![
            "AimSplit mode toggled to Shoot",
            "AimSplit mode toggled to Look",
            "AimSplit mode toggled to Shoot",
        ]
    );

    assert_eq!(harness.end_game(), 1);
    assert!(!AIM_SPLIT.is_live());
    assert_eq!(harness.lines_containing("AimSplitSystem destroyed").len(), 1);

    harness.clear_log();
    harness.invoke(ACTION_NAME).unwrap();
    assert_eq!(harness.lines_containing("instance is null").len(), 1);
    assert!(harness.lines_containing("toggled").is_empty());
}

#[test]
fn update_logs_only_first_three_ticks() {
    let _guard = serial();
    let mut harness = loaded();
    harness.start_game().unwrap();

    assert_eq!(harness.update_names(), vec![UPDATE_NAME.to_string()]);

    for _ in 0..5 {
        harness.tick(1.0 / 60.0);
    }

    assert_eq!(harness.frame(), 5);
    assert_eq!(
        harness.lines_containing("OnUpdate tick"),
        vec![
            "AimSplit OnUpdate tick; mode=Look",
            "AimSplit OnUpdate tick; mode=Look",
            "AimSplit OnUpdate tick; mode=Look",
        ]
    );
}

#[test]
fn tick_reports_current_mode() {
    let _guard = serial();
    let mut harness = loaded();
    harness.start_game().unwrap();

    harness.invoke(ACTION_NAME).unwrap();
    harness.tick(0.016);

    assert_eq!(
        harness.lines_containing("OnUpdate tick"),
        vec!["AimSplit OnUpdate tick; mode=Shoot"]
    );
}

#[test]
fn each_session_starts_in_look_mode() {
    let _guard = serial();
    let mut harness = loaded();

    harness.start_game().unwrap();
    harness.invoke(ACTION_NAME).unwrap();
    assert_eq!(AIM_SPLIT.mode(), Some(AimMode::Shoot));
    harness.end_game();

    harness.start_game().unwrap();
    assert_eq!(AIM_SPLIT.mode(), Some(AimMode::Look));
}

#[test]
fn start_game_twice_keeps_one_system() {
    let _guard = serial();
    let mut harness = loaded();

    assert_eq!(harness.start_game().unwrap(), 1);
    assert_eq!(harness.start_game().unwrap(), 1);

    assert_eq!(harness.live_systems(), 1);
    assert_eq!(harness.update_names().len(), 1);
}

#[test]
fn unload_ends_running_session() {
    let _guard = serial();
    let mut harness = loaded();
    harness.start_game().unwrap();

    harness.unload().unwrap();

    assert!(!AIM_SPLIT.is_live());
    assert_eq!(harness.live_systems(), 0);
    assert!(harness.update_names().is_empty());
}

#[test]
fn unload_releases_callbacks_from_every_session() {
    let _guard = serial();
    let mut harness = loaded();
    for _ in 0..3 {
        harness.start_game().unwrap();
        harness.tick(0.016);
        harness.end_game();
    }

    harness.unload().unwrap();

    assert_eq!(
        harness.lines_containing("update callbacks"),
        vec!["Released 3 update callbacks"]
    );
}

#[test]
fn drop_unloads() {
    let _guard = serial();
    {
        let mut harness = loaded();
        harness.start_game().unwrap();
        assert!(AIM_SPLIT.is_live());
    }
    assert!(!AIM_SPLIT.is_live());
}

#[test]
fn unknown_function_is_an_error() {
    let _guard = serial();
    let mut harness = loaded();

    let result = harness.invoke("AimSplit_Missing");

    assert!(matches!(result, Err(HarnessError::UnknownFunction(name)) if name == "AimSplit_Missing"));
}
