//=========================================================================
// AimSplit System
//=========================================================================
//
// The game system the host instantiates per game session.
//
// Architecture:
//   host create() ──► AimSplitSystem::new() ──► slot.install(state)
//   host register_updates(reg) ──► "AimSplitTick" @ PlayerAimUpdate
//        each frame ──► AimState::tick()   (weak ref, no-op once dropped)
//   action binding ──► slot.get() ──► AimState::toggle()
//   host destroy() ──► Drop ──► slot.clear(state)
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{trace, warn};

//=== Internal Dependencies ===============================================

use super::instance::{InstanceSlot, AIM_SPLIT};
use super::mode::AimMode;
use super::{UPDATE_LOG_LIMIT, UPDATE_NAME};
use crate::host::{FrameInfo, JobQueue, UpdateRegistrar, UpdateTickGroup};

//=== GameSystem ==========================================================

/// Capability the host needs from a game system.
pub trait GameSystem {
    /// Claims the system's per-frame update slots.
    fn register_updates(&self, registrar: &mut dyn UpdateRegistrar);
}

//=== AimState ============================================================

/// Mutable state shared between the system, its tick and the action.
#[derive(Debug, Default)]
pub struct AimState {
    mode: AimMode,
    update_log_count: u32,
}

pub(crate) type SharedState = Arc<Mutex<AimState>>;

impl AimState {
    pub fn mode(&self) -> AimMode {
        self.mode
    }

    /// Number of ticks that emitted a diagnostic, saturating at the limit.
    pub fn update_log_count(&self) -> u32 {
        self.update_log_count
    }

    /// Flips the mode and logs the new value.
    pub fn toggle(&mut self) -> AimMode {
        self.mode = self.mode.toggled();
        trace!("AimSplit mode toggled to {}", self.mode);
        self.mode
    }

    /// Per-frame hook. Returns `true` if this tick emitted a diagnostic.
    pub fn tick(&mut self, _frame: &FrameInfo, _jobs: JobQueue) -> bool {
        // TODO: drive the camera/aim split from `self.mode` each frame.
        if self.update_log_count >= UPDATE_LOG_LIMIT {
            return false;
        }

        trace!("AimSplit OnUpdate tick; mode={}", self.mode);
        self.update_log_count += 1;
        true
    }
}

/// Locks the shared state, recovering from poisoning.
pub(crate) fn lock_state(state: &Mutex<AimState>) -> MutexGuard<'_, AimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

//=== AimSplitSystem ======================================================

/// Owns the aim state for one game session.
///
/// # Lifecycle
///
/// 1. **Construction**: `AimSplitSystem::new()` starts in [`AimMode::Look`]
///    and installs the state in [`AIM_SPLIT`]
/// 2. **Registration**: `register_updates` claims `AimSplitTick` once; later
///    calls are ignored
/// 3. **Session**: the action toggles the mode, the tick logs its first
///    three frames
/// 4. **Drop**: the slot is cleared if it still points here
///
/// # Thread Safety
///
/// `Send + Sync`. The state sits behind a `Mutex` shared with the slot and
/// the update closure, which only hold `Weak` references.
///
/// # Examples
///
/// ```
/// use aim_split::{AimMode, AimSplitSystem, AIM_SPLIT};
///
/// let system = AimSplitSystem::new();
/// assert_eq!(AIM_SPLIT.mode(), Some(AimMode::Look));
///
/// system.toggle_mode();
/// assert_eq!(AIM_SPLIT.mode(), Some(AimMode::Shoot));
///
/// drop(system);
/// assert!(!AIM_SPLIT.is_live());
/// ```
pub struct AimSplitSystem {
    state: SharedState,
    slot: &'static InstanceSlot,
    registered: AtomicBool,
}

impl AimSplitSystem {
    /// Creates the system and installs it in the process-wide slot.
    pub fn new() -> Self {
        Self::new_in(&AIM_SPLIT)
    }

    /// Creates the system and installs it in `slot`.
    pub fn new_in(slot: &'static InstanceSlot) -> Self {
        let state = Arc::new(Mutex::new(AimState::default()));
        slot.install(&state);

        trace!("AimSplitSystem constructed");

        Self {
            state,
            slot,
            registered: AtomicBool::new(false),
        }
    }

    pub fn mode(&self) -> AimMode {
        lock_state(&self.state).mode()
    }

    /// Flips the mode and returns the new value.
    pub fn toggle_mode(&self) -> AimMode {
        lock_state(&self.state).toggle()
    }

    /// Runs the per-frame hook directly.
    pub fn on_update(&self, frame: &FrameInfo, jobs: JobQueue) -> bool {
        lock_state(&self.state).tick(frame, jobs)
    }

    pub fn update_log_count(&self) -> u32 {
        lock_state(&self.state).update_log_count()
    }

    /// Returns `true` once the update slot has been claimed.
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }
}

impl Default for AimSplitSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSystem for AimSplitSystem {
    fn register_updates(&self, registrar: &mut dyn UpdateRegistrar) {
        if self.registered.swap(true, Ordering::AcqRel) {
            warn!("AimSplitSystem updates already registered, ignoring");
            return;
        }

        let state = Arc::downgrade(&self.state);
        registrar.register_update(
            UpdateTickGroup::PlayerAimUpdate,
            UPDATE_NAME,
            Box::new(move |frame: &FrameInfo, jobs: JobQueue| {
                if let Some(state) = state.upgrade() {
                    lock_state(&state).tick(frame, jobs);
                }
            }),
        );

        trace!("AimSplitSystem update registered");
    }
}

impl Drop for AimSplitSystem {
    fn drop(&mut self) {
        self.slot.clear(&self.state);
        trace!("AimSplitSystem destroyed");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
