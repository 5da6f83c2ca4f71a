//! Reusable two-phase barrier that moves a fixed set of parties forward one
//! step at a time.
//!
//! The coordinator calls [`StepBarrier::release`] to open a step and
//! [`StepBarrier::wait_step`] to block until every active party has reported
//! back. Parties hold a [`Participant`], wait for the next release, do their
//! work and [`Participant::complete`] it. A party that is done, fails or
//! panics drops its `Participant`, which removes it from every later step so
//! the coordinator never waits on it again.

use std::sync::Arc;

use log::trace;
use parking_lot::{Condvar, Mutex};

/// Result of trying to open a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Step `n` is open for every active party.
    Step(u64),
    /// Every party has left; nothing is left to release.
    Done,
    /// [`StepBarrier::stop`] was called while parties were still active.
    Stopped,
}

#[derive(Debug)]
struct State {
    generation: u64,
    step_ready: bool,
    active: Vec<bool>,
    pending: Vec<bool>,
    stopped: bool,
}

impl State {
    fn any_pending(&self) -> bool {
        self.pending.iter().any(|&p| p)
    }

    fn any_active(&self) -> bool {
        self.active.iter().any(|&a| a)
    }
}

#[derive(Debug)]
pub struct StepBarrier {
    state: Mutex<State>,
    changed: Condvar,
}

impl StepBarrier {
    /// Creates a barrier with `parties` participants, all active.
    pub fn new(parties: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                generation: 0,
                step_ready: false,
                active: vec![true; parties],
                pending: vec![false; parties],
                stopped: false,
            }),
            changed: Condvar::new(),
        })
    }

    /// Hands out the guard for party `id`. Each id must be joined once.
    pub fn participant(self: &Arc<Self>, id: usize) -> Participant {
        Participant {
            barrier: Arc::clone(self),
            id,
        }
    }

    /// Last released step, 0 before the first release.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn active(&self) -> usize {
        self.state.lock().active.iter().filter(|&&a| a).count()
    }

    pub fn any_active(&self) -> bool {
        self.state.lock().any_active()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    /// Opens the next step for every active party.
    ///
    /// A barrier whose parties have all left reports [`Release::Done`] even if
    /// a stop arrived afterwards.
    pub fn release(&self) -> Release {
        let mut state = self.state.lock();

        if !state.any_active() {
            return Release::Done;
        }

        if state.stopped {
            return Release::Stopped;
        }

        state.generation += 1;
        state.step_ready = true;
        state.pending = state.active.clone();

        trace!("released step {}", state.generation);

        self.changed.notify_all();

        Release::Step(state.generation)
    }

    /// Blocks until every party released in the current step completed or left.
    pub fn wait_step(&self) {
        let mut state = self.state.lock();

        while state.any_pending() {
            self.changed.wait(&mut state);
        }

        state.step_ready = false;
    }

    /// Stops handing out steps and wakes every waiting party. A step that is
    /// already released still runs to completion.
    pub fn stop(&self) {
        let mut state = self.state.lock();

        state.stopped = true;
        self.changed.notify_all();
    }

    fn wait_for_release(&self, id: usize, seen: u64) -> Option<u64> {
        let mut state = self.state.lock();

        loop {
            if state.step_ready && state.pending[id] && state.generation > seen {
                return Some(state.generation);
            }

            if state.stopped || !state.active[id] {
                return None;
            }

            self.changed.wait(&mut state);
        }
    }

    fn complete(&self, id: usize) {
        let mut state = self.state.lock();

        state.pending[id] = false;

        if !state.any_pending() {
            self.changed.notify_all();
        }
    }

    fn leave(&self, id: usize) {
        let mut state = self.state.lock();

        state.active[id] = false;
        state.pending[id] = false;

        self.changed.notify_all();
    }
}

/// One party's handle on a [`StepBarrier`]. Dropping it leaves the barrier.
pub struct Participant {
    barrier: Arc<StepBarrier>,
    id: usize,
}

impl Participant {
    /// Waits for a step newer than `seen`. `None` means the barrier stopped.
    pub fn wait_for_release(&self, seen: u64) -> Option<u64> {
        self.barrier.wait_for_release(self.id, seen)
    }

    /// Reports the current step as done.
    pub fn complete(&self) {
        self.barrier.complete(self.id);
    }
}

impl Drop for Participant {
    fn drop(&mut self) {
        self.barrier.leave(self.id);
    }
}
