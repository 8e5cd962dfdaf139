//! The fixed-interval tick loop and the one-shot respawn timer.
//!
//! Both tasks live in a single state enum, so the tick loop can never run while a
//! respawn is pending (and vice versa).

use bevy_ecs::resource::Resource;
use tracing::trace;

/// What the scheduler is currently waiting on. Times are simulation milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Nothing runs: menu, pause, or game over.
    #[default]
    Idle,
    /// The tick loop is running; the next tick is due at `next_tick_ms`.
    Looping { next_tick_ms: u64 },
    /// The tick loop is suspended until the respawn fires at `due_ms`.
    RespawnPending { due_ms: u64 },
}

/// A task that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    /// Run one simulation tick, stamped with its due time.
    Tick(u64),
    /// Run the delayed respawn.
    Respawn(u64),
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopScheduler {
    state: SchedulerState,
    interval_ms: u64,
}

impl LoopScheduler {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            state: SchedulerState::Idle,
            interval_ms,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn is_looping(&self) -> bool {
        matches!(self.state, SchedulerState::Looping { .. })
    }

    /// Starts (or resumes) the tick loop. The first tick fires one interval from `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.state = SchedulerState::Looping {
            next_tick_ms: now_ms + self.interval_ms,
        };
        trace!(now_ms, "Tick loop started");
    }

    /// Stops whatever is running, including a pending respawn.
    pub fn stop(&mut self) {
        self.state = SchedulerState::Idle;
    }

    /// Suspends the tick loop and arms the one-shot respawn.
    pub fn schedule_respawn(&mut self, due_ms: u64) {
        self.state = SchedulerState::RespawnPending { due_ms };
        trace!(due_ms, "Respawn scheduled");
    }

    /// Returns the next task due at or before `now_ms`, advancing the loop past it.
    ///
    /// A fired respawn leaves the scheduler idle; whoever handles it decides whether
    /// to restart the loop.
    pub fn poll(&mut self, now_ms: u64) -> Option<Fired> {
        match self.state {
            SchedulerState::Looping { next_tick_ms } if next_tick_ms <= now_ms => {
                self.state = SchedulerState::Looping {
                    next_tick_ms: next_tick_ms + self.interval_ms,
                };
                Some(Fired::Tick(next_tick_ms))
            }
            SchedulerState::RespawnPending { due_ms } if due_ms <= now_ms => {
                self.state = SchedulerState::Idle;
                Some(Fired::Respawn(due_ms))
            }
            _ => None,
        }
    }

    /// Drops any tick backlog so the next tick is due one interval after `now_ms`.
    ///
    /// Returns how many ticks were skipped.
    pub fn skip_backlog(&mut self, now_ms: u64) -> u64 {
        match self.state {
            SchedulerState::Looping { next_tick_ms } if next_tick_ms <= now_ms => {
                let skipped = (now_ms - next_tick_ms) / self.interval_ms + 1;
                self.state = SchedulerState::Looping {
                    next_tick_ms: next_tick_ms + skipped * self.interval_ms,
                };
                skipped
            }
            _ => 0,
        }
    }
}
