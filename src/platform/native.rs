//! Native runner
//!
//! Every input (clock ticks, key presses, resets, resizes) is posted as a
//! `Command` into one mailbox. A single consumer applies them to the
//! `Session` in arrival order, so the game state only ever has one writer.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::clock::{ClockThread, TickDriver};
use crate::consts::SIM_DT;
use crate::session::{Session, SessionPhase};
use crate::sim::{Dimensions, Mode};

/// Mailbox message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// One clock period elapsed
    Tick,
    Key(char),
    Reset(Mode),
    Resize(Dimensions),
    Shutdown,
}

/// Single-consumer game loop for native builds
pub struct NativeRunner {
    session: Session,
    driver: TickDriver,
    tx: Sender<Command>,
    rx: Receiver<Command>,
    /// `None` means ticks are posted by hand
    period: Option<Duration>,
    clock: Option<ClockThread>,
}

impl NativeRunner {
    pub fn new(session: Session, period: Option<Duration>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            session,
            driver: TickDriver::new(),
            tx,
            rx,
            period,
            clock: None,
        }
    }

    /// Handle for input threads
    pub fn sender(&self) -> Sender<Command> {
        self.tx.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn clock_running(&self) -> bool {
        self.clock.as_ref().is_some_and(ClockThread::is_running)
    }

    fn start_clock(&mut self) {
        self.stop_clock();
        if let Some(period) = self.period {
            let tx = self.tx.clone();
            self.clock = Some(ClockThread::spawn(period, move || {
                tx.send(Command::Tick).is_ok()
            }));
        }
    }

    fn stop_clock(&mut self) {
        if let Some(mut clock) = self.clock.take() {
            clock.stop();
        }
    }

    /// Apply one command. Returns false once the runner should exit.
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Tick => {
                self.driver.advance(SIM_DT, &mut self.session);
                if self.session.phase() == SessionPhase::GameOver && self.clock.is_some() {
                    log::info!("Game over, stopping clock");
                    self.stop_clock();
                }
            }
            Command::Key(key) => self.session.handle_key(key),
            Command::Reset(mode) => {
                self.session.reset(mode);
                self.driver.start();
                self.start_clock();
            }
            Command::Resize(dims) => self.session.set_dimensions(dims),
            Command::Shutdown => {
                self.stop_clock();
                return false;
            }
        }
        true
    }

    /// Wait up to `timeout` for the next command and apply it.
    ///
    /// Returns false after `Shutdown`; a timeout is not an exit.
    pub fn pump(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(command) => self.apply(command),
            Err(RecvTimeoutError::Timeout) => true,
            // We hold a sender ourselves, so this cannot happen in practice
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Apply everything already queued without blocking
    pub fn pump_pending(&mut self) -> bool {
        while let Ok(command) = self.rx.try_recv() {
            if !self.apply(command) {
                return false;
            }
        }
        true
    }

    /// Block until `Shutdown`
    pub fn run(&mut self) {
        while let Ok(command) = self.rx.recv() {
            if !self.apply(command) {
                break;
            }
        }
        log::info!("Runner shut down");
    }
}

impl Drop for NativeRunner {
    fn drop(&mut self) {
        self.stop_clock();
    }
}
