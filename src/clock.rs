//! Tick driver
//!
//! `TickDriver` turns elapsed frame time into fixed simulation steps. It is
//! the only thing that calls `Simulation::step`, one step at a time, and it
//! stops itself when the game ends. `ClockThread` is the native timer that
//! feeds it.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Anything the driver can step
pub trait Simulation {
    /// Advance exactly one fixed timestep
    fn step(&mut self);
    /// True once stepping should stop (game over, or never started)
    fn is_over(&self) -> bool;
}

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    Stopped,
    Running,
}

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct TickDriver {
    status: ClockStatus,
    accumulator: f32,
    /// Steps taken since the last start
    steps: u64,
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TickDriver {
    pub fn new() -> Self {
        Self {
            status: ClockStatus::Stopped,
            accumulator: 0.0,
            steps: 0,
        }
    }

    pub fn status(&self) -> ClockStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == ClockStatus::Running
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Begin stepping (after a reset)
    pub fn start(&mut self) {
        self.status = ClockStatus::Running;
        self.accumulator = 0.0;
        self.steps = 0;
    }

    pub fn stop(&mut self) {
        self.status = ClockStatus::Stopped;
        self.accumulator = 0.0;
    }

    /// Run as many fixed steps as `dt` seconds of real time cover.
    ///
    /// Returns the number of steps taken.
    pub fn advance(&mut self, dt: f32, sim: &mut dyn Simulation) -> u32 {
        if self.status == ClockStatus::Stopped {
            return 0;
        }
        if sim.is_over() {
            self.stop();
            return 0;
        }

        // Clamp long stalls (tab switch, debugger) instead of fast-forwarding
        let dt = if dt.is_finite() { dt.clamp(0.0, 0.1) } else { 0.0 };
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            sim.step();
            self.accumulator -= SIM_DT;
            self.steps += 1;
            substeps += 1;

            if sim.is_over() {
                log::info!("Tick driver stopped after {} steps", self.steps);
                self.stop();
                break;
            }
        }

        // Drop time we could not catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        substeps
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::ClockThread;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread::{self, JoinHandle};
    use std::time::{Duration, Instant};

    /// Background timer calling `on_tick` at a fixed period.
    ///
    /// Stops when `on_tick` returns false, on `stop`, or on drop; the thread
    /// is always joined.
    pub struct ClockThread {
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    }

    impl ClockThread {
        pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
        where
            F: FnMut() -> bool + Send + 'static,
        {
            let stop = Arc::new(AtomicBool::new(false));
            let flag = stop.clone();
            let handle = thread::spawn(move || {
                let mut next = Instant::now() + period;
                while !flag.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }
                    next += period;
                    if flag.load(Ordering::Acquire) || !on_tick() {
                        break;
                    }
                }
            });
            Self {
                stop,
                handle: Some(handle),
            }
        }

        pub fn is_running(&self) -> bool {
            self.handle
                .as_ref()
                .map(|h| !h.is_finished())
                .unwrap_or(false)
        }

        /// Signal the thread and wait for it to exit
        pub fn stop(&mut self) {
            self.stop.store(true, Ordering::Release);
            if let Some(handle) = self.handle.take() {
                if handle.join().is_err() {
                    log::warn!("Clock thread panicked");
                }
            }
        }
    }

    impl Drop for ClockThread {
        fn drop(&mut self) {
            self.stop();
        }
    }
}
