//=========================================================================
// Event Collector
//=========================================================================
//
// Drains host events for the logic thread, a bounded number per frame.
//
// Architecture:
//   Receiver<HostEvent> → collect_frame() → actions → TickControl
//
// Actions that precede a `Shutdown` in the same frame are kept so the
// run loop can dispatch them before tearing down.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{trace, warn};

//=== Internal Dependencies ===============================================

use super::HostEvent;

//=== TickControl =========================================================

/// Run loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

pub(crate) struct EventCollector {
    receiver: Receiver<HostEvent>,
    actions: Vec<String>,
}

impl EventCollector {
    pub(crate) const MAX_EVENTS_PER_FRAME: usize = 100;

    pub(crate) fn new(receiver: Receiver<HostEvent>) -> Self {
        Self {
            receiver,
            actions: Vec::with_capacity(4),
        }
    }

    /// Collects pending events, stopping early on shutdown or disconnect.
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.actions.clear();
        let mut drained = 0;

        while drained < Self::MAX_EVENTS_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(HostEvent::Action(name)) => {
                    trace!(target: "harness", "Action queued: {}", name);
                    self.actions.push(name);
                    drained += 1;
                }
                Ok(HostEvent::Shutdown) => return TickControl::Exit,
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_EVENTS_PER_FRAME {
            warn!(target: "harness", "Event queue backlog: drained {} events this frame", drained);
        }

        TickControl::Continue
    }

    /// Hands this frame's actions to the run loop.
    pub(crate) fn take_actions(&mut self) -> Vec<String> {
        std::mem::take(&mut self.actions)
    }

    //--- Test Accessors ---------------------------------------------------

    /// Actions collected this frame, in arrival order.
    #[cfg(test)]
    pub(crate) fn actions(&self) -> &[String] {
        &self.actions
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
